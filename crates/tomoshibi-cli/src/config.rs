// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tomoshibi_app::ViewKind;
use tracing_subscriber::EnvFilter;

const CONFIG_VERSION: i64 = 1;
const LOG_ENV: &str = "TOMOSHIBI_LOG";
const LOG_FILE_NAME: &str = "tomoshibi.log";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data: Data::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

/// Collection sources. Unset paths fall back to the bundled samples.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub images_path: Option<String>,
    pub cards_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub start_view: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            start_view: Some(ViewKind::Images.label().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("TOMOSHIBI_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set TOMOSHIBI_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(tomoshibi_data::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [data], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 1",
                path.display(),
                self.version
            );
        }

        for (key, value) in [
            ("data.images_path", &self.data.images_path),
            ("data.cards_path", &self.data.cards_path),
            ("log.file", &self.log.file),
        ] {
            if let Some(value) = value {
                tomoshibi_data::validate_data_path(value)
                    .with_context(|| format!("{key} in {}", path.display()))?;
            }
        }

        if let Some(view) = &self.ui.start_view
            && ViewKind::parse(view).is_none()
        {
            bail!(
                "ui.start_view in {} must be \"images\" or \"cards\", got {:?}",
                path.display(),
                view
            );
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).with_context(|| {
                format!(
                    "log.level in {} is not a valid filter directive: {:?}",
                    path.display(),
                    level
                )
            })?;
        }

        Ok(())
    }

    pub fn images_path(&self) -> Option<PathBuf> {
        self.data.images_path.as_ref().map(PathBuf::from)
    }

    pub fn cards_path(&self) -> Option<PathBuf> {
        self.data.cards_path.as_ref().map(PathBuf::from)
    }

    pub fn start_view(&self) -> ViewKind {
        self.ui
            .start_view
            .as_deref()
            .and_then(ViewKind::parse)
            .unwrap_or(ViewKind::Images)
    }

    /// `TOMOSHIBI_LOG` wins over `[log].level`. `None` disables logging.
    pub fn log_level(&self) -> Option<String> {
        env::var(LOG_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.log.level.clone())
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        match &self.log.file {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(tomoshibi_data::default_data_dir()?.join(LOG_FILE_NAME)),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# tomoshibi config\n# Place this file at: {}\n\nversion = 1\n\n[data]\n# Optional. Unset paths use the bundled sample collections.\n# images_path = \"/absolute/path/to/gallery.json\"\n# cards_path = \"/absolute/path/to/cards.json\"\n\n[ui]\n# \"images\" or \"cards\"\nstart_view = \"images\"\n\n[log]\n# Logging is off unless a level is set here or in {LOG_ENV}.\n# level = \"info\"\n# file = \"/absolute/path/to/{LOG_FILE_NAME}\"\n",
            path.display(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use tomoshibi_app::ViewKind;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.start_view(), ViewKind::Images);
        assert_eq!(config.images_path(), None);
        assert_eq!(config.cards_path(), None);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\nstart_view = \"cards\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[data], [ui], and [log]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[data]\nimages_path = \"/srv/gallery.json\"\ncards_path = \"/srv/cards.json\"\n[ui]\nstart_view = \"cards\"\n[log]\nlevel = \"tomoshibi_data=debug,info\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.images_path(), Some(PathBuf::from("/srv/gallery.json")));
        assert_eq!(config.cards_path(), Some(PathBuf::from("/srv/cards.json")));
        assert_eq!(config.start_view(), ViewKind::Cards);
        assert_eq!(
            config.log.level.as_deref(),
            Some("tomoshibi_data=debug,info")
        );
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn unknown_start_view_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nstart_view = \"albums\"\n")?;
        let error = Config::load(&path).expect_err("unknown view should fail");
        let message = error.to_string();
        assert!(message.contains("ui.start_view"), "{message}");
        assert!(message.contains("albums"), "{message}");
        Ok(())
    }

    #[test]
    fn invalid_log_level_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"tomoshibi=loud\"\n")?;
        let error = Config::load(&path).expect_err("bad filter should fail");
        assert!(error.to_string().contains("log.level"));
        Ok(())
    }

    #[test]
    fn data_paths_reject_uri_values() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[data]\ncards_path = \"https://example.com/cards.json\"\n",
        )?;
        let error = Config::load(&path).expect_err("URI cards_path should fail validation");
        let message = format!("{error:#}");
        assert!(message.contains("data.cards_path"), "{message}");
        assert!(message.contains("looks like a URI"), "{message}");
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TOMOSHIBI_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TOMOSHIBI_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn default_path_uses_config_toml_suffix_when_no_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("TOMOSHIBI_CONFIG_PATH");
        }
        let path = Config::default_path()?;
        assert!(path.ends_with("config.toml"));
        Ok(())
    }

    #[test]
    fn log_level_env_overrides_config() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"warn\"\n")?;
        let config = Config::load(&path)?;

        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TOMOSHIBI_LOG", "debug");
        }
        let overridden = config.log_level();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TOMOSHIBI_LOG");
        }
        assert_eq!(overridden.as_deref(), Some("debug"));
        assert_eq!(config.log_level().as_deref(), Some("warn"));
        Ok(())
    }

    #[test]
    fn log_is_disabled_without_level() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("TOMOSHIBI_LOG");
        }
        assert_eq!(Config::default().log_level(), None);
        Ok(())
    }

    #[test]
    fn log_file_prefers_config_then_data_dir() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[log]\nfile = \"/var/log/tomoshibi/ui.log\"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.log_file()?, PathBuf::from("/var/log/tomoshibi/ui.log"));

        let data_dir = tempfile::tempdir()?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TOMOSHIBI_DATA_DIR", data_dir.path());
        }
        let resolved = Config::default().log_file();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TOMOSHIBI_DATA_DIR");
        }
        assert_eq!(resolved?, data_dir.path().join("tomoshibi.log"));
        Ok(())
    }

    #[test]
    fn example_config_includes_required_sections() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[data]"));
        assert!(example.contains("[ui]"));
        assert!(example.contains("[log]"));
        Ok(())
    }

    #[test]
    fn example_config_loads_cleanly() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;
        let config = Config::load(&path)?;
        assert_eq!(config.start_view(), ViewKind::Images);
        Ok(())
    }
}
