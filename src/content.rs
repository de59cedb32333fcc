// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Page Metadata
//!
//! Metadata of a page, read from its YAML front matter with the title
//! falling back to the first level-1 heading. Metadata is taken from the
//! token list after the rule chain ran, so a filtered internal note never
//! becomes a page title.

use crate::processors::token::{BlockKind, Token, TokenKind};
use log::debug;
use pulldown_cmark::Event;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_yml::from_str;
use std::collections::HashMap;

/// Metadata extracted from a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Title of the page.
    pub title: Option<String>,
    /// Description of the page.
    pub description: Option<String>,
    /// Publication date of the page.
    pub date: Option<String>,
    /// Tags associated with the page.
    pub tags: Vec<String>,
    /// Any other front matter field.
    pub custom: HashMap<String, JsonValue>,
}

impl PageMetadata {
    /// Builds the metadata of a tokenized page.
    pub fn from_tokens(tokens: &[Token<'_>]) -> Self {
        let mut metadata = tokens
            .first()
            .filter(|token| token.kind == TokenKind::FrontMatter)
            .and_then(|token| token.text.as_deref())
            .map(Self::from_front_matter)
            .unwrap_or_default();

        if metadata.title.is_none() {
            metadata.title = first_heading(tokens);
        }
        metadata
    }

    /// Parses the body of a YAML front matter block.
    ///
    /// Front matter that is not a YAML mapping yields empty metadata.
    pub fn from_front_matter(yaml: &str) -> Self {
        let mut metadata = Self::default();
        match from_str::<HashMap<String, JsonValue>>(yaml) {
            Ok(fields) => metadata.apply_fields(fields),
            Err(e) => debug!("Ignoring unreadable front matter: {}", e),
        }
        metadata
    }

    fn apply_fields(&mut self, fields: HashMap<String, JsonValue>) {
        for (key, value) in fields {
            match key.as_str() {
                "title" => self.title = non_empty(&value),
                "description" => self.description = non_empty(&value),
                "date" => self.date = non_empty(&value),
                "tags" | "tag" => {
                    self.tags = match &value {
                        JsonValue::Array(items) => {
                            items.iter().filter_map(non_empty).collect()
                        }
                        other => non_empty(other).into_iter().collect(),
                    };
                }
                _ => {
                    let _ = self.custom.insert(key, value);
                }
            }
        }
    }
}

fn non_empty(value: &JsonValue) -> Option<String> {
    value
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Plain text of the first level-1 heading.
fn first_heading(tokens: &[Token<'_>]) -> Option<String> {
    tokens
        .windows(2)
        .find(|pair| {
            pair[0].kind == TokenKind::Open(BlockKind::Heading(1))
                && pair[1].is_inline()
        })
        .map(|pair| plain_text(&pair[1]))
        .filter(|title| !title.is_empty())
}

fn plain_text(token: &Token<'_>) -> String {
    let mut text = String::new();
    for event in &token.events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::token::tokenize;
    use pulldown_cmark::Options;

    fn metadata_of(source: &str) -> PageMetadata {
        let tokens =
            tokenize(source, Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        PageMetadata::from_tokens(&tokens)
    }

    #[test]
    fn test_metadata_extraction() {
        let metadata = metadata_of(
            r#"---
title: Test Post
description: A test post
date: 2024-01-01
tags:
  - test
  - example
custom_field: value
---

# Content"#,
        );
        assert_eq!(metadata.title.as_deref(), Some("Test Post"));
        assert_eq!(metadata.description.as_deref(), Some("A test post"));
        assert_eq!(metadata.date.as_deref(), Some("2024-01-01"));
        assert_eq!(metadata.tags, vec!["test", "example"]);
        assert!(metadata.custom.contains_key("custom_field"));
    }

    #[test]
    fn test_title_falls_back_to_heading() {
        let metadata = metadata_of("Intro text\n\n# Kafka `acks` setting\n");
        assert_eq!(metadata.title.as_deref(), Some("Kafka acks setting"));
    }

    #[test]
    fn test_second_level_heading_is_not_a_title() {
        assert!(metadata_of("## Only h2\n").title.is_none());
    }

    #[test]
    fn test_later_dash_block_does_not_replace_title() {
        let metadata = metadata_of("Intro\n\n---\ntitle: Hijacked\n---\n");
        assert_ne!(metadata.title.as_deref(), Some("Hijacked"));
        assert!(metadata.custom.is_empty());
    }

    #[test]
    fn test_single_tag_string() {
        let metadata = metadata_of("---\ntag: docker\n---\n");
        assert_eq!(metadata.tags, vec!["docker"]);
    }

    #[test]
    fn test_invalid_front_matter_is_ignored() {
        let metadata = PageMetadata::from_front_matter("- just\n- a list\n");
        assert_eq!(metadata, PageMetadata::default());
    }

    #[test]
    fn test_blank_title_is_dropped() {
        let metadata = PageMetadata::from_front_matter("title: '  '\n");
        assert!(metadata.title.is_none());
    }
}
