// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Core Traits Module
//!
//! The seams of the NoteFlow pipeline.
//!
//! - [`Processor`]: turns page source into a rendered page
//! - [`Generator`]: writes rendered output somewhere
//! - [`Validator`]: checks a value before it is used
//! - [`Shareable`]: wraps a value in a shareable, thread-safe container
//!
//! Token-level hooks have their own trait, `CoreRule`, in
//! [`crate::processors::ruler`], because they operate on tokens borrowed
//! from the page source.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use crate::core::error::Result;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;

/// Core trait for implementing content processors.
///
/// # Type Parameters
///
/// * `Input`: The type of content being processed
/// * `Output`: The type of content produced
/// * `Context`: Additional configuration for a single call
pub trait Processor: Send + Sync + Debug {
    /// The type of input content for the processor.
    type Input;
    /// The type of output content produced by the processor.
    type Output;
    /// The type of context or configuration used by the processor.
    type Context;

    /// Processes the input content using optional context information.
    fn process(
        &self,
        input: Self::Input,
        context: Option<&Self::Context>,
    ) -> Result<Self::Output>;
}

/// Trait for implementing output generation.
pub trait Generator: Send + Sync + Debug {
    /// Generates output from the given content at `path`.
    ///
    /// # Arguments
    ///
    /// * `content` - The content to generate output from
    /// * `path` - The path where the output should be written
    /// * `options` - Optional per-call configuration, a JSON object
    fn generate(
        &self,
        content: &str,
        path: &Path,
        options: Option<&JsonValue>,
    ) -> Result<()>;

    /// Validates the generation parameters without performing the generation.
    fn validate(
        &self,
        path: &Path,
        options: Option<&JsonValue>,
    ) -> Result<()>;
}

/// Trait for implementing validation.
pub trait Validator: Send + Sync + Debug {
    /// The type of value to validate.
    type Input;

    /// Validates the input value.
    fn validate(&self, input: &Self::Input) -> Result<()>;
}

/// Trait for types that can be shared between multiple consumers.
pub trait Shareable: Sized + Send + Sync + Debug {
    /// Converts the type into an `Arc<RwLock<Self>>`.
    fn into_shared(self) -> Arc<RwLock<Self>>;
}

// Blanket implementation of Shareable for all eligible types
impl<T: Send + Sync + Debug + 'static> Shareable for T {
    fn into_shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }
}
