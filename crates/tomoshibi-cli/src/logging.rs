// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Installs a file-backed subscriber when a level is configured. The
/// terminal owns stdout and stderr while the UI runs, so nothing is
/// written there. Returns the log file in use.
pub fn init(config: &Config) -> Result<Option<PathBuf>> {
    let Some(level) = config.log_level() else {
        return Ok(None);
    };

    let filter = EnvFilter::try_new(&level)
        .with_context(|| format!("invalid log filter {level:?}; try `info` or `tomoshibi_data=debug`"))?;
    let path = config.log_file()?;
    let file = open_log_file(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(Some(path))
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}
