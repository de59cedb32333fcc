// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # NoteFlow Library
//!
//! NoteFlow renders the markdown pages of a blog and strips every inline
//! block flagged `%%internal-notes` before it reaches the HTML. Around the
//! markdown pipeline sits the typed site declaration (navbar, sidebar and
//! theme options) that the pages are published with.
//!
//! For more information, visit the [NoteFlow documentation](https://docs.rs/noteflow).

#![doc = include_str!("../README.md")]
#![doc(html_root_url = "https://docs.rs/noteflow")]
#![crate_name = "noteflow"]
#![crate_type = "lib"]

use crate::content::PageMetadata;
use crate::core::config::Config;
use crate::core::error::{NoteFlowError, Result};
use crate::core::traits::Generator;
use crate::generators::HtmlGenerator;
use crate::processors::internal_notes::{InternalNotesFilter, LogObserver};
use crate::processors::markdown::{MarkdownProcessor, RenderedPage};
use log::{debug, info};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

/// Core utilities: configuration, errors and the pipeline traits.
pub mod core;

/// Provides command-line interface utilities.
pub mod cli;

/// Page metadata.
pub mod content;

/// Provides output generation utilities.
pub mod generators;

/// The markdown pipeline and the internal-notes filter.
pub mod processors;

/// Declarative site configuration.
pub mod site;

pub use crate::core::error::NoteFlowError as Error;
pub use crate::processors::internal_notes::{
    strip_internal_notes, INTERNAL_NOTES_MARKER,
};

/// One page written by [`NoteFlow::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPage {
    /// Markdown source.
    pub source: PathBuf,
    /// Written HTML file.
    pub output: PathBuf,
    /// Metadata of the page.
    pub metadata: PageMetadata,
}

/// Summary of a build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    /// Pages in the order they were written.
    pub pages: Vec<BuiltPage>,
    /// Internal notes removed over all pages.
    pub removed_notes: usize,
}

/// Builds the pages of a content directory.
#[derive(Debug, Clone)]
pub struct NoteFlow {
    config: Config,
}

impl NoteFlow {
    /// Creates a pipeline for `config`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Markdown processor configured from the site's markdown toggles
    /// and the `[notes]` settings.
    pub fn processor(&self) -> MarkdownProcessor {
        self.processor_with(Arc::new(LogObserver::new()))
    }

    fn processor_with(&self, observer: Arc<LogObserver>) -> MarkdownProcessor {
        MarkdownProcessor::without_rules()
            .with_features(&self.config.site.theme.markdown)
            .with_rule(
                InternalNotesFilter::new()
                    .with_marker(self.config.notes.marker.as_str())
                    .with_observer(observer),
            )
    }

    /// Renders one markdown file.
    pub fn render_file(&self, path: &Path) -> Result<RenderedPage> {
        let source = fs::read_to_string(path)
            .map_err(|e| NoteFlowError::io_error(path.to_path_buf(), e))?;
        self.processor().render(&source)
    }

    /// Renders every markdown file under the content directory into the
    /// output directory.
    ///
    /// `a/b.md` is written to `a/b.html`, a directory's `README.md` or
    /// `index.md` to its `index.html`. Hidden entries and the output
    /// directory itself are skipped. Two pages of one directory that map
    /// to the same `index.html` fail the build.
    pub fn build(&self) -> Result<BuildReport> {
        let content_dir = &self.config.content_dir;
        let output_dir = &self.config.output_dir;
        info!(
            "Building {} into {}",
            content_dir.display(),
            output_dir.display()
        );

        let observer = Arc::new(if self.config.notes.log_removals {
            LogObserver::new()
        } else {
            LogObserver::quiet()
        });
        let processor = self.processor_with(Arc::clone(&observer));
        let generator =
            HtmlGenerator::new().with_minification(self.config.output.minify);

        let mut report = BuildReport::default();
        let walker = WalkDir::new(content_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || (!is_hidden(entry) && entry.path() != output_dir)
            });

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(content_dir).to_path_buf();
                NoteFlowError::content_processing_error(
                    format!("Failed to walk {}", path.display()),
                    Some(Box::new(e)),
                )
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown(path) {
                debug!("Skipping {}", path.display());
                continue;
            }

            let relative = path.strip_prefix(content_dir).map_err(|e| {
                NoteFlowError::content_processing_error(
                    format!("Failed to determine relative path: {}", e),
                    None,
                )
            })?;
            let output = output_dir.join(output_path(relative));
            if let Some(earlier) =
                report.pages.iter().find(|page| page.output == output)
            {
                return Err(NoteFlowError::content_processing_error(
                    format!(
                        "{} and {} both render to {}",
                        earlier.source.display(),
                        path.display(),
                        output.display()
                    ),
                    None,
                ));
            }

            let source = fs::read_to_string(path)
                .map_err(|e| NoteFlowError::io_error(path.to_path_buf(), e))?;
            let page = processor.render(&source)?;
            generator.generate(&page.html, &output, None)?;
            debug!("Rendered {} to {}", path.display(), output.display());

            report.pages.push(BuiltPage {
                source: path.to_path_buf(),
                output,
                metadata: page.metadata,
            });
        }

        report.removed_notes = observer.removed();
        info!(
            "Built {} pages, removed {} internal notes",
            report.pages.len(),
            report.removed_notes
        );
        Ok(report)
    }
}

/// Output path of a markdown file relative to the content directory.
pub fn output_path(relative: &Path) -> PathBuf {
    let is_index = matches!(
        relative.file_stem().and_then(OsStr::to_str),
        Some("README" | "readme" | "index")
    );
    if is_index {
        relative.with_file_name("index.html")
    } else {
        relative.with_extension("html")
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(OsStr::to_str),
        Some("md" | "markdown")
    )
}
