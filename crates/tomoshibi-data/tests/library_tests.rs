// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::path::PathBuf;
use tomoshibi_app::{CardTone, Catalog, ItemId, ViewCommand, ViewState};
use tomoshibi_data::{Library, duplicate_ids, load_cards, load_images, parse_images};
use tomoshibi_testkit::{CARDS_JSON, IMAGES_JSON, fox_and_jay, ids, image};

fn write_source(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("source.json");
    std::fs::write(&path, content)?;
    Ok((temp, path))
}

#[test]
fn load_images_reads_file() -> Result<()> {
    let (_temp, path) = write_source(IMAGES_JSON)?;
    let images = load_images(&path)?;
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].owner.as_deref(), Some("Mika"));
    assert_eq!(images[1].alt_text(), "a jay on a branch");
    Ok(())
}

#[test]
fn load_cards_reads_file_and_keeps_raw_status_values() -> Result<()> {
    let (_temp, path) = write_source(CARDS_JSON)?;
    let cards = load_cards(&path)?;
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].tone, Some(CardTone::Sand));
    assert_eq!(cards[0].statuses[1].value, 130.0);
    assert_eq!(cards[0].statuses[1].clamped_value(), 100.0);
    assert_eq!(cards[1].statuses[0].clamped_value(), 0.0);
    Ok(())
}

#[test]
fn missing_file_error_names_path() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("nope.json");
    let error = load_images(&path).expect_err("missing file should fail");
    assert!(format!("{error:#}").contains("nope.json"));
    Ok(())
}

#[test]
fn missing_required_field_fails_with_hint() -> Result<()> {
    let (_temp, path) = write_source(r#"[{"id":"a","title":"no tags"}]"#)?;
    let error = load_images(&path).expect_err("entry without tags should fail");
    let message = format!("{error:#}");
    assert!(message.contains("needs id, title and tags"), "{message}");
    Ok(())
}

#[test]
fn uri_paths_are_rejected_before_reading() {
    let error = load_cards(std::path::Path::new("https://example.com/cards.json"))
        .expect_err("URI path should fail");
    assert!(error.to_string().contains("looks like a URI"));
}

#[test]
fn open_falls_back_to_bundled_collections() -> Result<()> {
    let (_temp, path) = write_source(IMAGES_JSON)?;
    let library = Library::open(Some(path.as_path()), None)?;
    assert_eq!(library.images.len(), 2);
    assert_eq!(library.cards, Library::bundled()?.cards);
    Ok(())
}

#[test]
fn empty_collection_is_valid() -> Result<()> {
    let images = parse_images("[]")?;
    let catalog = Catalog::new(images);
    assert!(catalog.tags().is_empty());
    assert!(catalog.is_empty());
    Ok(())
}

#[test]
fn duplicate_ids_reports_each_repeated_id_once() {
    let mut items = fox_and_jay();
    items.push(image("a", "Another Fox", &[]));
    items.push(image("a", "Third Fox", &[]));
    let duplicates = duplicate_ids(&items);
    assert_eq!(duplicates, vec![ItemId::new("a")]);
}

#[test]
fn catalog_from_loaded_library_filters_by_query() -> Result<()> {
    let (_temp, path) = write_source(IMAGES_JSON)?;
    let catalog = Catalog::new(Library::open(Some(path.as_path()), None)?.images);
    let mut view = ViewState::default();
    view.apply(&catalog, ViewCommand::SetQuery("DUSK".to_owned()));
    assert_eq!(ids(&view.filtered(&catalog)), vec!["b"]);
    Ok(())
}
