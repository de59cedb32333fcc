// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # NoteFlow CLI
//!
//! Entry point of the `noteflow` binary: initializes the logger from the
//! verbosity flag and runs the selected command.

use anyhow::Context;
use env_logger::Env;
use log::debug;
use noteflow::cli;

/// Log filter for `-v` repeated `count` times; `RUST_LOG` takes precedence.
fn default_filter(count: u8) -> &'static str {
    match count {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn run() -> anyhow::Result<()> {
    let matches = cli::build().get_matches();

    env_logger::Builder::from_env(
        Env::default().default_filter_or(default_filter(matches.get_count("verbose"))),
    )
    .init();
    debug!("Starting NoteFlow {}", cli::VERSION);

    let command = matches.subcommand_name().unwrap_or("noteflow").to_string();
    cli::execute(&matches)
        .with_context(|| format!("`noteflow {}` failed", command))
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
