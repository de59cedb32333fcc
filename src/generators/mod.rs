// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Output generators.

/// HTML file generator.
pub mod html;

pub use html::HtmlGenerator;
