// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Error Handling for NoteFlow
//!
//! This module defines the error type shared by the configuration loader,
//! the markdown pipeline and the output generator. The `thiserror` crate is
//! used to keep variants and their messages in one place.
//!
//! The internal-notes filter itself never fails and does not appear here.

use std::path::PathBuf;
use thiserror::Error;

/// A unified result type for the NoteFlow library.
pub type Result<T> = std::result::Result<T, NoteFlowError>;

/// The main error type for NoteFlow, encompassing all potential error cases.
#[derive(Error, Debug)]
pub enum NoteFlowError {
    /// Error related to configuration loading or validation.
    ///
    /// Raised for unreadable or malformed configuration files, unknown
    /// override keys and site configuration that fails validation.
    #[error("Configuration error: {message}.")]
    ConfigError {
        /// Detailed description of the configuration error.
        message: String,
        /// Optional path of the configuration file that caused the error.
        path: Option<PathBuf>,
    },

    /// Error encountered while processing markdown content.
    #[error("Content processing error: {message}.")]
    ContentProcessingError {
        /// Detailed description of the content processing error.
        message: String,
        /// Optional source error providing additional context, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error in HTML output generation.
    #[error("Output generation error: {message} at {path:?}.")]
    OutputGenerationError {
        /// Description of the output generation error.
        message: String,
        /// Path associated with the error.
        path: PathBuf,
        /// Optional source error providing additional context, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO error encountered during file operations.
    #[error("File IO error at `{path:?}`: {source}")]
    IOError {
        /// Path associated with the IO error.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// General internal error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for NoteFlowError {
    /// Converts a standard IO error into a `NoteFlowError::IOError` with an
    /// empty path.
    fn from(source: std::io::Error) -> Self {
        NoteFlowError::IOError {
            path: PathBuf::new(),
            source,
        }
    }
}

impl NoteFlowError {
    /// Creates a `ConfigError` with a specific message.
    ///
    /// # Parameters
    /// - `message`: A description of the configuration error.
    /// - `path`: Optional path of the configuration file causing the error.
    pub fn config_error<S: Into<String>>(
        message: S,
        path: Option<PathBuf>,
    ) -> Self {
        NoteFlowError::ConfigError {
            message: message.into(),
            path,
        }
    }

    /// Creates a `ContentProcessingError` with a specific message and optional source.
    pub fn content_processing_error<S: Into<String>>(
        message: S,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        NoteFlowError::ContentProcessingError {
            message: message.into(),
            source,
        }
    }

    /// Creates an `OutputGenerationError` with a specific message, path, and optional source.
    pub fn output_generation_error<S: Into<String>>(
        message: S,
        path: PathBuf,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        NoteFlowError::OutputGenerationError {
            message: message.into(),
            path,
            source,
        }
    }

    /// Wraps an IO error as an `IOError` variant with the specified path.
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        NoteFlowError::IOError { path, source }
    }

    /// Creates a general internal error with a custom message.
    pub fn internal_error<S: Into<String>>(message: S) -> Self {
        NoteFlowError::InternalError(message.into())
    }
}
