// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::mem;
use tomoshibi_app::{ImageItem, StatusCard};
use tomoshibi_data::Library;

/// Hands a loaded library to the UI. Collections are moved out on first
/// load; the UI keeps them for its lifetime.
pub struct LibraryRuntime {
    library: Library,
    fragment: Option<String>,
}

impl LibraryRuntime {
    pub fn new(library: Library, fragment: Option<String>) -> Self {
        Self { library, fragment }
    }
}

impl tomoshibi_tui::AppRuntime for LibraryRuntime {
    fn load_images(&mut self) -> Result<Vec<ImageItem>> {
        Ok(mem::take(&mut self.library.images))
    }

    fn load_cards(&mut self) -> Result<Vec<StatusCard>> {
        Ok(mem::take(&mut self.library.cards))
    }

    fn initial_fragment(&mut self) -> Option<String> {
        self.fragment.take()
    }
}
