// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use runtime::LibraryRuntime;
use std::env;
use std::path::PathBuf;
use tomoshibi_app::{AppState, ViewKind, tag_index};
use tomoshibi_data::Library;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `tomoshibi --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    let log_file = logging::init(&config)?;
    info!(config = %options.config_path.display(), log = ?log_file, "starting");

    let images_path = options.images_path.clone().or_else(|| config.images_path());
    let cards_path = options.cards_path.clone().or_else(|| config.cards_path());
    let library = Library::open(images_path.as_deref(), cards_path.as_deref()).context(
        "load gallery data -- if a path is wrong, fix [data] in the config or pass --images/--cards",
    )?;

    if options.check_only {
        print!("{}", check_summary(&library));
        return Ok(());
    }

    let mut state = AppState {
        active_view: options.start_view.unwrap_or_else(|| config.start_view()),
        ..AppState::default()
    };
    let mut runtime = LibraryRuntime::new(library, options.open_fragment);
    tomoshibi_tui::run_app(&mut state, &mut runtime)
}

fn check_summary(library: &Library) -> String {
    format!(
        "images: {} items, {} tags\ncards: {} items, {} tags\n",
        library.images.len(),
        tag_index(&library.images).len(),
        library.cards.len(),
        tag_index(&library.cards).len(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    images_path: Option<PathBuf>,
    cards_path: Option<PathBuf>,
    start_view: Option<ViewKind>,
    open_fragment: Option<String>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        images_path: None,
        cards_path: None,
        start_view: None,
        open_fragment: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--images" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--images requires a JSON file path"))?;
                options.images_path = Some(PathBuf::from(value.as_ref()));
            }
            "--cards" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--cards requires a JSON file path"))?;
                options.cards_path = Some(PathBuf::from(value.as_ref()));
            }
            "--view" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--view requires images or cards"))?;
                let view = ViewKind::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown view {:?}; expected images or cards",
                        value.as_ref()
                    )
                })?;
                options.start_view = Some(view);
            }
            "--open" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--open requires a fragment such as card-akari"))?;
                options.open_fragment = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("tomoshibi");
    println!("  --config <path>          Use a specific config path");
    println!("  --images <path>          Load the image gallery from a JSON file");
    println!("  --cards <path>           Load the status cards from a JSON file");
    println!("  --view images|cards      Start in the given view");
    println!("  --open <fragment>        Start with a card open, e.g. card-akari");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config + data, print counts");
    println!("  --help                   Show this help");
}
