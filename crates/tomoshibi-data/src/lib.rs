// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tomoshibi_app::{GalleryItem, ImageItem, ItemId, StatusCard};
use tracing::{info, warn};

pub const APP_NAME: &str = "tomoshibi";

const BUNDLED_IMAGES: &str = include_str!("../data/gallery.json");
const BUNDLED_CARDS: &str = include_str!("../data/cards.json");

/// Both collections, loaded once and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Library {
    pub images: Vec<ImageItem>,
    pub cards: Vec<StatusCard>,
}

impl Library {
    pub fn bundled() -> Result<Self> {
        Ok(Self {
            images: bundled_images()?,
            cards: bundled_cards()?,
        })
    }

    /// Each collection falls back to the bundled sample when no path is
    /// given.
    pub fn open(images_path: Option<&Path>, cards_path: Option<&Path>) -> Result<Self> {
        let images = match images_path {
            Some(path) => load_images(path)?,
            None => bundled_images()?,
        };
        let cards = match cards_path {
            Some(path) => load_cards(path)?,
            None => bundled_cards()?,
        };
        let library = Self { images, cards };
        library.report();
        Ok(library)
    }

    fn report(&self) {
        info!(
            images = self.images.len(),
            cards = self.cards.len(),
            "library loaded"
        );
        for (collection, duplicates) in [
            ("images", duplicate_ids(&self.images)),
            ("cards", duplicate_ids(&self.cards)),
        ] {
            for id in duplicates {
                warn!(collection, %id, "duplicate item id; selection resolves to the first entry");
            }
        }
    }
}

pub fn parse_images(raw: &str) -> Result<Vec<ImageItem>> {
    serde_json::from_str(raw).context("decode image gallery JSON")
}

pub fn parse_cards(raw: &str) -> Result<Vec<StatusCard>> {
    serde_json::from_str(raw).context("decode status card JSON")
}

pub fn load_images(path: &Path) -> Result<Vec<ImageItem>> {
    let raw = read_source(path)?;
    parse_images(&raw).with_context(|| {
        format!(
            "load images from {}; each entry needs id, title and tags",
            path.display()
        )
    })
}

pub fn load_cards(path: &Path) -> Result<Vec<StatusCard>> {
    let raw = read_source(path)?;
    parse_cards(&raw).with_context(|| {
        format!(
            "load cards from {}; each entry needs id, name and tags",
            path.display()
        )
    })
}

pub fn bundled_images() -> Result<Vec<ImageItem>> {
    parse_images(BUNDLED_IMAGES).context("bundled image gallery")
}

pub fn bundled_cards() -> Result<Vec<StatusCard>> {
    parse_cards(BUNDLED_CARDS).context("bundled status cards")
}

/// Ids appearing more than once, in sorted order.
pub fn duplicate_ids<T: GalleryItem>(items: &[T]) -> Vec<ItemId> {
    let mut counts = BTreeMap::<&ItemId, usize>::new();
    for item in items {
        *counts.entry(item.id()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id.clone())
        .collect()
}

fn read_source(path: &Path) -> Result<String> {
    validate_data_path(&path.to_string_lossy())?;
    fs::read_to_string(path).with_context(|| format!("read data file {}", path.display()))
}

pub fn default_data_dir() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("TOMOSHIBI_DATA_DIR") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set TOMOSHIBI_DATA_DIR to a writable directory")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir)
}

pub fn validate_data_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("data path must not be empty");
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!("data path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead");
        }
    }

    if path.starts_with("file:") {
        bail!("data path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!("data path {path:?} contains '?'; remove query parameters and use a plain file path");
    }

    Ok(())
}
