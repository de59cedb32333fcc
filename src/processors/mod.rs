// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Content Processors Module
//!
//! The markdown pipeline: parsing into [`token`]s, the post-parse
//! [`ruler`] chain, the [`internal_notes`] filter registered on it, and the
//! [`markdown`] processor tying them to the HTML renderer.
//!
//! ## Usage
//!
//! ```rust
//! use noteflow::processors::markdown::MarkdownProcessor;
//!
//! let processor = MarkdownProcessor::new();
//! let page = processor
//!     .render("Visible\n\n%%internal-notes: remember to fix\n")
//!     .unwrap();
//! assert!(page.html.contains("Visible"));
//! assert!(!page.html.contains("remember"));
//! ```
//!
//! ## Custom rules
//!
//! Additional hooks implement [`ruler::CoreRule`]:
//!
//! ```rust
//! use noteflow::processors::markdown::MarkdownProcessor;
//! use noteflow::processors::ruler::CoreRule;
//! use noteflow::processors::token::{Token, TokenKind};
//!
//! #[derive(Debug)]
//! struct DropRules;
//!
//! impl CoreRule for DropRules {
//!     fn name(&self) -> &str {
//!         "drop_rules"
//!     }
//!
//!     fn apply<'a>(&self, tokens: Vec<Token<'a>>) -> Vec<Token<'a>> {
//!         tokens.into_iter().filter(|t| t.kind != TokenKind::Rule).collect()
//!     }
//! }
//!
//! let processor = MarkdownProcessor::new().with_rule(DropRules);
//! let page = processor.render("a\n\n---\n\nb").unwrap();
//! assert!(!page.html.contains("<hr"));
//! ```

use pulldown_cmark::Options;
use serde::{Deserialize, Serialize};

/// Internal-notes token filter.
pub mod internal_notes;

/// Markdown processing functionality.
pub mod markdown;

/// Post-parse core rule chain.
pub mod ruler;

/// Token model and tokenizer.
pub mod token;

// Re-export commonly used types
pub use internal_notes::{
    strip_internal_notes, InternalNotesFilter, INTERNAL_NOTES_MARKER,
};
pub use markdown::MarkdownProcessor;

/// Markdown extension toggles of the site theme.
///
/// Only some toggles map onto parser options (see [`Self::to_options`]);
/// the others are carried for the theme, which implements them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownFeatures {
    /// Custom text alignment containers.
    pub align: bool,
    /// Attribute syntax; enables heading attributes in the parser.
    pub attrs: bool,
    /// Code tabs.
    pub code_tabs: bool,
    /// Component blocks.
    pub component: bool,
    /// Live demo blocks.
    pub demo: bool,
    /// Images rendered as figures.
    pub figure: bool,
    /// GitHub flavoured markdown: tables, footnotes, strikethrough and task lists.
    pub gfm: bool,
    /// Lazy image loading.
    pub img_lazyload: bool,
    /// Image size syntax.
    pub img_size: bool,
    /// File inclusion.
    pub include: bool,
    /// Mark (highlight) syntax.
    pub mark: bool,
    /// PlantUML diagrams.
    pub plantuml: bool,
    /// Spoiler syntax.
    pub spoiler: bool,
    /// Text stylize rules.
    pub stylize: Vec<StylizeRule>,
    /// Subscript syntax.
    pub sub: bool,
    /// Superscript syntax.
    pub sup: bool,
    /// Tabs containers.
    pub tabs: bool,
    /// Task lists.
    pub tasklist: bool,
    /// `v-pre` containers.
    pub v_pre: bool,
}

impl Default for MarkdownFeatures {
    fn default() -> Self {
        Self {
            align: false,
            attrs: false,
            code_tabs: false,
            component: false,
            demo: false,
            figure: false,
            gfm: true,
            img_lazyload: false,
            img_size: false,
            include: false,
            mark: false,
            plantuml: false,
            spoiler: false,
            stylize: Vec::new(),
            sub: false,
            sup: false,
            tabs: false,
            tasklist: true,
            v_pre: false,
        }
    }
}

impl MarkdownFeatures {
    /// Parser options for these toggles. Leading front matter is always
    /// recognised.
    pub fn to_options(&self) -> Options {
        let mut options = Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
        if self.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_FOOTNOTES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.tasklist {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.attrs {
            options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        options
    }
}

/// Replaces emphasised text matching `matcher` with a theme component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylizeRule {
    /// Exact text to match.
    pub matcher: String,
    /// What the match turns into.
    pub replacer: StylizeReplacement,
}

/// Output of a [`StylizeRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylizeReplacement {
    /// Source tag the rule applies to, e.g. `em`.
    pub tag: String,
    /// Component rendered instead, e.g. `Badge`.
    pub component: String,
    /// Component `type` attribute, e.g. `tip`.
    #[serde(default)]
    pub kind: Option<String>,
    /// Text content of the component.
    pub content: String,
}
