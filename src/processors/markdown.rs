// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Markdown Processing Module
//!
//! Parses a page into tokens, runs the core rule chain over them (the
//! internal-notes filter by default) and renders the surviving tokens to
//! HTML with `pulldown-cmark`.
//!
//! ## Example Usage
//!
//! ```rust
//! use noteflow::core::traits::Processor;
//! use noteflow::processors::markdown::MarkdownProcessor;
//!
//! let processor = MarkdownProcessor::new();
//!
//! let content = r#"---
//! title: Kafka basics
//! tags: [kafka]
//! ---
//! # Partitions
//!
//! %%internal-notes: check the retention numbers
//!
//! Partitions are ordered logs.
//! "#;
//!
//! let page = processor.process(content.to_string(), None).unwrap();
//! assert_eq!(page.metadata.title.as_deref(), Some("Kafka basics"));
//! assert!(!page.html.contains("retention"));
//! ```

use crate::content::PageMetadata;
use crate::core::{
    error::{NoteFlowError, Result},
    traits::Processor,
};
use crate::processors::internal_notes::InternalNotesFilter;
use crate::processors::ruler::{CoreRule, Ruler};
use crate::processors::token::{tokenize, Token, TokenKind};
use crate::processors::MarkdownFeatures;
use log::debug;
use pulldown_cmark::{html, Options};

/// Maximum allowed size for Markdown content in bytes (10MB)
pub const MAX_CONTENT_SIZE: usize = 10 * 1024 * 1024;

/// HTML and metadata of one processed page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedPage {
    /// Rendered HTML fragment.
    pub html: String,
    /// Metadata from front matter and headings.
    pub metadata: PageMetadata,
}

/// Processor for Markdown content with a configurable rule chain.
#[derive(Debug)]
pub struct MarkdownProcessor {
    options: Options,
    ruler: Ruler,
}

impl MarkdownProcessor {
    /// Creates a processor with default features and the internal-notes
    /// filter registered.
    pub fn new() -> Self {
        Self::without_rules().with_rule(InternalNotesFilter::new())
    }

    /// Creates a processor with default features and an empty rule chain.
    pub fn without_rules() -> Self {
        Self {
            options: MarkdownFeatures::default().to_options(),
            ruler: Ruler::new(),
        }
    }

    /// Applies the theme's markdown feature toggles.
    pub fn with_features(mut self, features: &MarkdownFeatures) -> Self {
        self.options = features.to_options();
        self
    }

    /// Appends `rule` to the core rule chain.
    pub fn with_rule<R: CoreRule + 'static>(mut self, rule: R) -> Self {
        self.ruler.push(rule);
        self
    }

    /// Parser options in use.
    pub fn options(&self) -> Options {
        self.options
    }

    /// The core rule chain.
    pub fn ruler(&self) -> &Ruler {
        &self.ruler
    }

    /// Parses `source` into tokens without running any rule.
    pub fn parse<'a>(&self, source: &'a str) -> Vec<Token<'a>> {
        tokenize(source, self.options)
    }

    /// Parses `source` and runs the core rule chain over its tokens.
    pub fn tokens<'a>(&self, source: &'a str) -> Vec<Token<'a>> {
        self.ruler.apply(self.parse(source))
    }

    /// Renders tokens to HTML. Front matter produces no output.
    pub fn render_tokens(tokens: &[Token<'_>]) -> String {
        let events = tokens
            .iter()
            .filter(|token| token.kind != TokenKind::FrontMatter)
            .flat_map(|token| token.events.iter().cloned());
        let mut html_output = String::new();
        html::push_html(&mut html_output, events);
        html_output
    }

    /// Renders one page with this processor's options.
    pub fn render(&self, source: &str) -> Result<RenderedPage> {
        self.render_with(source, self.options)
    }

    /// Extracts the page metadata of `source`, after the rule chain ran.
    pub fn metadata(&self, source: &str) -> PageMetadata {
        PageMetadata::from_tokens(&self.tokens(source))
    }

    fn render_with(
        &self,
        source: &str,
        options: Options,
    ) -> Result<RenderedPage> {
        validate(source)?;

        let tokens = self.ruler.apply(tokenize(source, options));
        debug!("Rendering {} tokens", tokens.len());

        let metadata = PageMetadata::from_tokens(&tokens);
        let html = Self::render_tokens(&tokens);
        Ok(RenderedPage { html, metadata })
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for MarkdownProcessor {
    type Input = String;
    type Output = RenderedPage;
    type Context = MarkdownFeatures;

    fn process(
        &self,
        content: String,
        context: Option<&Self::Context>,
    ) -> Result<Self::Output> {
        let options = context
            .map(MarkdownFeatures::to_options)
            .unwrap_or(self.options);
        self.render_with(&content, options)
    }
}

/// Rejects content the pipeline refuses to process.
fn validate(content: &str) -> Result<()> {
    if content.len() > MAX_CONTENT_SIZE {
        return Err(NoteFlowError::content_processing_error(
            format!(
                "Content exceeds maximum size of {} bytes",
                MAX_CONTENT_SIZE
            ),
            None,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::internal_notes::SilentObserver;
    use std::sync::Arc;

    fn processor() -> MarkdownProcessor {
        MarkdownProcessor::without_rules().with_rule(
            InternalNotesFilter::new().with_observer(Arc::new(SilentObserver)),
        )
    }

    #[test]
    fn test_markdown_processor_basic() {
        let page = processor().render("# Test\n\nThis is a **test**.").unwrap();
        assert!(page.html.contains("<h1>Test</h1>"));
        assert!(page.html.contains("<strong>test</strong>"));
    }

    #[test]
    fn test_internal_note_paragraph_is_emptied() {
        let page = processor()
            .render("Visible\n\n%%internal-notes: secret\n")
            .unwrap();
        assert_eq!(page.html, "<p>Visible</p>\n<p></p>\n");
    }

    #[test]
    fn test_marker_in_code_block_is_rendered() {
        let source = "```text\n%%internal-notes stays here\n```\n";
        let page = processor().render(source).unwrap();
        assert!(page.html.contains("%%internal-notes stays here"));
    }

    #[test]
    fn test_internal_note_in_list_item() {
        let source = "- public\n- %%internal-notes private\n";
        let page = processor().render(source).unwrap();
        assert!(page.html.contains("<li>public</li>"));
        assert!(!page.html.contains("private"));
    }

    #[test]
    fn test_without_rules_keeps_notes() {
        let page = MarkdownProcessor::without_rules()
            .render("%%internal-notes visible")
            .unwrap();
        assert!(page.html.contains("%%internal-notes visible"));
    }

    #[test]
    fn test_front_matter_is_not_rendered() {
        let source = "---\ntitle: Intro\n---\n\nBody\n";
        let page = processor().render(source).unwrap();
        assert_eq!(page.html, "<p>Body</p>\n");
        assert_eq!(page.metadata.title.as_deref(), Some("Intro"));
    }

    #[test]
    fn test_dash_block_after_content_is_rendered() {
        let source = "# Post\n\nIntro\n\n---\n\
                      See the appendix for details\n---\n\nBody\n";
        let page = processor().render(source).unwrap();
        assert!(page.html.contains("See the appendix for details"));
        assert!(page.html.contains("<p>Body</p>"));
        assert_eq!(page.metadata.title.as_deref(), Some("Post"));
    }

    #[test]
    fn test_gfm_tables_by_default() {
        let page = processor()
            .render("| A | B |\n|---|---|\n| 1 | 2 |\n\n~~strike~~")
            .unwrap();
        assert!(page.html.contains("<table>"));
        assert!(page.html.contains("<del>"));
    }

    #[test]
    fn test_context_features_override_options() {
        let features = MarkdownFeatures {
            gfm: false,
            tasklist: false,
            ..MarkdownFeatures::default()
        };
        let page = processor()
            .process(
                "| A | B |\n|---|---|\n| 1 | 2 |".to_string(),
                Some(&features),
            )
            .unwrap();
        assert!(!page.html.contains("<table>"));
    }

    #[test]
    fn test_default_registers_internal_notes_rule() {
        let processor = MarkdownProcessor::new();
        assert!(processor
            .ruler()
            .contains(crate::processors::internal_notes::RULE_NAME));
    }

    #[test]
    fn test_validation_rejects_oversized_content() {
        let large_content = "a".repeat(MAX_CONTENT_SIZE + 1);
        assert!(processor().render(&large_content).is_err());
        assert!(processor().render("").is_ok());
    }

    #[test]
    fn test_empty_document() {
        let page = processor().render("").unwrap();
        assert!(page.html.is_empty());
        assert_eq!(page.metadata, PageMetadata::default());
    }
}
