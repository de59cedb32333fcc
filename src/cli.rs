// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line interface for NoteFlow
//!
//! Argument parsing and command execution of the `noteflow` binary.
//!
//! # Examples
//!
//! ```
//! use noteflow::cli;
//!
//! let matches = cli::build().get_matches_from(vec![
//!     "noteflow",
//!     "render",
//!     "src/intro.md",
//!     "--tokens",
//! ]);
//!
//! let render = matches.subcommand_matches("render").unwrap();
//! assert!(render.get_flag("tokens"));
//! ```

use crate::core::config::{Config, ConfigBuilder, DEFAULT_ENV_PREFIX};
use crate::core::error::{NoteFlowError, Result};
use crate::NoteFlow;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{debug, info};
use std::path::PathBuf;

/// The current version of NoteFlow, as defined in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds and configures the NoteFlow command-line interface.
pub fn build() -> Command {
    Command::new("noteflow")
        .about("Renders blog markdown with internal notes stripped.")
        .version(VERSION)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Raise log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("build")
                .about("Render every page of the content directory")
                .arg(config_arg())
                .arg(
                    Arg::new("content")
                        .short('d')
                        .long("content")
                        .help("Content directory")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Output directory")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("minify")
                        .short('m')
                        .long("minify")
                        .help("Minify output")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Print the filtered HTML of one page")
                .arg(
                    Arg::new("file")
                        .help("Markdown file to render")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(config_arg())
                .arg(
                    Arg::new("tokens")
                        .short('t')
                        .long("tokens")
                        .help("Print the filtered tokens instead of HTML")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate the configuration and print the resolved navigation")
                .arg(config_arg()),
        )
        .after_help(
            "\x1b[1;4mLicense:\x1b[0m\n  The project is licensed under the terms of \
             both the MIT license and the Apache License (Version 2.0).",
        )
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help("TOML configuration file")
        .value_parser(value_parser!(PathBuf))
}

/// Executes the subcommand selected in `matches`.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("build", sub_matches)) => build_site(sub_matches),
        Some(("render", sub_matches)) => render_page(sub_matches),
        Some(("check", sub_matches)) => check_site(sub_matches),
        _ => Err(NoteFlowError::internal_error("Unknown command")),
    }
}

/// Loads the configuration: file, `NOTEFLOW_` environment, then the
/// command-line overrides.
fn load_config(
    matches: &ArgMatches,
    overrides: Vec<(&str, String)>,
) -> Result<Config> {
    let mut builder = ConfigBuilder::new().with_env_prefix(DEFAULT_ENV_PREFIX);
    if let Some(file) = matches.get_one::<PathBuf>("config") {
        debug!("Using configuration file {}", file.display());
        builder = builder.with_file(file);
    }
    for (key, value) in overrides {
        builder = builder.with_override(key, value);
    }
    let config = builder.build()?;
    let config = config.read().clone();
    Ok(config)
}

fn build_site(matches: &ArgMatches) -> Result<()> {
    let mut overrides = Vec::new();
    if let Some(content) = matches.get_one::<PathBuf>("content") {
        overrides.push(("content_dir", content.display().to_string()));
    }
    if let Some(output) = matches.get_one::<PathBuf>("output") {
        overrides.push(("output_dir", output.display().to_string()));
    }
    if matches.get_flag("minify") {
        overrides.push(("output.minify", true.to_string()));
    }

    let config = load_config(matches, overrides)?;
    info!(
        "Building site with content at '{}' and output to '{}'",
        config.content_dir.display(),
        config.output_dir.display()
    );

    let noteflow = NoteFlow::new(config);
    let report = noteflow.build()?;
    println!(
        "Built {} pages into {} ({} internal notes removed)",
        report.pages.len(),
        noteflow.config().output_dir.display(),
        report.removed_notes
    );
    Ok(())
}

fn render_page(matches: &ArgMatches) -> Result<()> {
    let file = matches
        .get_one::<PathBuf>("file")
        .ok_or_else(|| NoteFlowError::internal_error("Missing file"))?;
    // A bare render must not require a content directory.
    let config = match matches.get_one::<PathBuf>("config") {
        Some(_) => load_config(matches, Vec::new())?,
        None => Config::default(),
    };
    let noteflow = NoteFlow::new(config);

    if matches.get_flag("tokens") {
        let source = std::fs::read_to_string(file)
            .map_err(|e| NoteFlowError::io_error(file.clone(), e))?;
        for token in noteflow.processor().tokens(&source) {
            match &token.text {
                Some(text) => println!("{} {:?}", token.kind, text),
                None => println!("{}", token.kind),
            }
        }
    } else {
        print!("{}", noteflow.render_file(file)?.html);
    }
    Ok(())
}

fn check_site(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches, Vec::new())?;
    let noteflow = NoteFlow::new(config);
    let site = &noteflow.config().site;

    let sidebar = site
        .sidebar
        .resolve(&noteflow.config().content_dir, &noteflow.processor())?;
    let navigation = serde_json::json!({
        "navbar": site.navbar,
        "sidebar": sidebar,
    });
    let rendered = serde_json::to_string_pretty(&navigation).map_err(|e| {
        NoteFlowError::internal_error(format!(
            "Failed to serialize navigation: {}",
            e
        ))
    })?;
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_matches(args: Vec<&str>) -> ArgMatches {
        build().get_matches_from(args)
    }

    #[test]
    fn test_build_command() {
        let matches = get_matches(vec![
            "noteflow",
            "build",
            "--content",
            "docs",
            "--output",
            "public",
            "--minify",
        ]);
        let build_cmd = matches.subcommand_matches("build").unwrap();

        assert_eq!(
            build_cmd.get_one::<PathBuf>("content").unwrap(),
            &PathBuf::from("docs")
        );
        assert!(build_cmd.get_flag("minify"));
        assert!(build_cmd.get_one::<PathBuf>("config").is_none());
    }

    #[test]
    fn test_render_command() {
        let matches = get_matches(vec!["noteflow", "render", "intro.md"]);
        let render_cmd = matches.subcommand_matches("render").unwrap();

        assert_eq!(
            render_cmd.get_one::<PathBuf>("file").unwrap(),
            &PathBuf::from("intro.md")
        );
        assert!(!render_cmd.get_flag("tokens"));
    }

    #[test]
    fn test_global_verbose_count() {
        let matches =
            get_matches(vec!["noteflow", "check", "-vv", "--config", "a.toml"]);
        assert_eq!(matches.get_count("verbose"), 2);
    }

    #[test]
    fn test_render_requires_file() {
        assert!(build()
            .try_get_matches_from(vec!["noteflow", "render"])
            .is_err());
    }
}
