// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # HTML Output Generation
//!
//! Writes rendered page fragments to `.html` files, minified on request
//! with `minify-html`.
//!
//! ```rust,no_run
//! use noteflow::core::traits::Generator;
//! use noteflow::generators::html::HtmlGenerator;
//! use std::path::PathBuf;
//!
//! let generator = HtmlGenerator::new().with_minification(true);
//! generator
//!     .generate("<h1>Kafka</h1>\n", &PathBuf::from("dist/kafka.html"), None)
//!     .unwrap();
//! ```

use crate::core::error::{NoteFlowError, Result};
use crate::core::traits::Generator;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, warn};
use minify_html::{minify, Cfg};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Settings of an [`HtmlGenerator`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Minify every written file.
    pub minify: bool,
}

/// Writes HTML files.
///
/// Per-call options are a JSON object; `minify` (boolean) overrides the
/// configured minification for that call.
#[derive(Debug, Default, Clone)]
pub struct HtmlGenerator {
    config: GeneratorConfig,
}

impl HtmlGenerator {
    /// Creates a generator that writes content unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables HTML minification.
    pub fn with_minification(mut self, enable: bool) -> Self {
        self.config.minify = enable;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn process_html(
        &self,
        content: &str,
        options: Option<&JsonValue>,
    ) -> Result<String> {
        let minify_output = options
            .and_then(|opts| opts.get("minify"))
            .and_then(JsonValue::as_bool)
            .unwrap_or(self.config.minify);

        if minify_output {
            minify_html(content)
        } else {
            Ok(content.to_string())
        }
    }
}

fn minify_html(content: &str) -> Result<String> {
    let cfg = Cfg {
        minify_css: true,
        minify_js: true,
        ..Cfg::default()
    };
    String::from_utf8(minify(content.as_bytes(), &cfg)).map_err(|e| {
        NoteFlowError::content_processing_error(
            "HTML minification failed",
            Some(Box::new(e)),
        )
    })
}

impl Generator for HtmlGenerator {
    fn generate(
        &self,
        content: &str,
        path: &Path,
        options: Option<&JsonValue>,
    ) -> Result<()> {
        self.validate(path, options)?;
        let processed = self.process_html(content, options)?;

        let file = File::create(path)
            .map_err(|e| NoteFlowError::io_error(path.to_path_buf(), e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(processed.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| NoteFlowError::io_error(path.to_path_buf(), e))?;

        debug!("Wrote {} bytes to {}", processed.len(), path.display());
        Ok(())
    }

    fn validate(
        &self,
        path: &Path,
        options: Option<&JsonValue>,
    ) -> Result<()> {
        if path.extension().and_then(|s| s.to_str()) != Some("html") {
            return Err(NoteFlowError::output_generation_error(
                "Invalid file extension - expected .html",
                path.to_path_buf(),
                None,
            ));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    NoteFlowError::io_error(parent.to_path_buf(), e)
                })?;
            }
        }
        if let Some(opts) = options {
            let Some(obj) = opts.as_object() else {
                return Err(NoteFlowError::output_generation_error(
                    "Invalid options format - expected JSON object",
                    path.to_path_buf(),
                    None,
                ));
            };
            for (key, value) in obj {
                match key.as_str() {
                    "minify" if !value.is_boolean() => {
                        return Err(NoteFlowError::output_generation_error(
                            "minify option must be a boolean",
                            path.to_path_buf(),
                            None,
                        ));
                    }
                    "minify" => {}
                    _ => warn!("Unknown option key: {}", key),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_basic_output() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output_path = temp_dir.path().join("output.html");
        let content = "<h1>Test</h1>\n<p></p>\n";

        HtmlGenerator::new().generate(content, &output_path, None)?;

        assert_eq!(fs::read_to_string(&output_path)?, content);
        Ok(())
    }

    #[test]
    fn test_minification() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output_path = temp_dir.path().join("output.html");
        let content = "<h1>\n    Test\n</h1>\n\n<p>Body</p>\n";

        let generator = HtmlGenerator::new().with_minification(true);
        assert!(generator.config().minify);
        generator.generate(content, &output_path, None)?;

        let result = fs::read_to_string(&output_path)?;
        assert!(result.len() < content.len());
        assert!(result.contains("Body"));
        Ok(())
    }

    #[test]
    fn test_minify_option_overrides_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output_path = temp_dir.path().join("output.html");
        let content = "<p>\n  Body\n</p>\n";

        HtmlGenerator::new().with_minification(true).generate(
            content,
            &output_path,
            Some(&json!({ "minify": false })),
        )?;

        assert_eq!(fs::read_to_string(&output_path)?, content);
        Ok(())
    }

    #[test]
    fn test_clones_keep_their_own_settings() {
        let plain = HtmlGenerator::new();
        let minifying = plain.clone().with_minification(true);

        assert!(!plain.config().minify);
        assert!(minifying.config().minify);
    }

    #[test]
    fn test_creates_parent_directories() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output_path = temp_dir.path().join("posts/kafka/index.html");

        HtmlGenerator::new().generate("<p>x</p>", &output_path, None)?;
        assert!(output_path.exists());
        Ok(())
    }

    #[test]
    fn test_rejects_other_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let result = HtmlGenerator::new().generate(
            "<p>x</p>",
            &temp_dir.path().join("output.txt"),
            None,
        );
        assert!(matches!(
            result,
            Err(NoteFlowError::OutputGenerationError { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_options() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("output.html");
        let generator = HtmlGenerator::new();

        assert!(generator.validate(&path, Some(&json!([1, 2]))).is_err());
        assert!(generator
            .validate(&path, Some(&json!({ "minify": "yes" })))
            .is_err());
        assert!(generator
            .validate(&path, Some(&json!({ "minify": true })))
            .is_ok());
    }
}
