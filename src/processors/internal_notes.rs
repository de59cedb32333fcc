// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Internal Notes Filter
//!
//! Removes every inline-content token whose text contains the internal-notes
//! marker, so that notes flagged `%%internal-notes` never reach rendered
//! output. All other tokens are kept untouched, in their original order.
//!
//! Each token's fate depends only on its own kind and text: a single linear
//! pass with a plain substring search.
//!
//! ```rust
//! use noteflow::processors::internal_notes::strip_internal_notes;
//! use noteflow::processors::token::{Token, TokenKind};
//!
//! let tokens = vec![
//!     Token::inline("hello"),
//!     Token::inline("%%internal-notes: secret"),
//!     Token::with_text(TokenKind::Fence, "%%internal-notes in code"),
//! ];
//! let kept = strip_internal_notes(tokens);
//! assert_eq!(kept.len(), 2);
//! assert_eq!(kept[0].text.as_deref(), Some("hello"));
//! ```

use crate::processors::ruler::CoreRule;
use crate::processors::token::Token;
use log::info;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Marker flagging content that must never appear in rendered output.
pub const INTERNAL_NOTES_MARKER: &str = "%%internal-notes";

/// Name the filter registers under in a [`crate::processors::ruler::Ruler`].
pub const RULE_NAME: &str = "remove_internal_notes";

/// Receives a notice for every token the filter removes.
pub trait RemovalObserver: Send + Sync + Debug {
    /// Called once per removed token, in document order.
    fn token_removed(&self, token: &Token<'_>);
}

/// Logs every removed token through the `log` facade and counts removals.
#[derive(Debug, Default)]
pub struct LogObserver {
    removed: AtomicUsize,
    quiet: bool,
}

impl LogObserver {
    /// Creates an observer with a zeroed counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an observer that only counts.
    pub fn quiet() -> Self {
        Self {
            removed: AtomicUsize::new(0),
            quiet: true,
        }
    }

    /// Number of tokens removed since creation.
    pub fn removed(&self) -> usize {
        self.removed.load(Ordering::Relaxed)
    }
}

impl RemovalObserver for LogObserver {
    fn token_removed(&self, token: &Token<'_>) {
        let _ = self.removed.fetch_add(1, Ordering::Relaxed);
        if self.quiet {
            return;
        }
        info!(
            "skip internal notes: {}",
            token.text.as_deref().unwrap_or_default()
        );
    }
}

/// Discards removal notices.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl RemovalObserver for SilentObserver {
    fn token_removed(&self, _token: &Token<'_>) {}
}

/// Token filter removing internal-notes inline content.
#[derive(Debug, Clone)]
pub struct InternalNotesFilter {
    marker: String,
    observer: Arc<dyn RemovalObserver>,
}

impl InternalNotesFilter {
    /// Creates a filter for [`INTERNAL_NOTES_MARKER`] that logs removals.
    pub fn new() -> Self {
        Self {
            marker: INTERNAL_NOTES_MARKER.to_string(),
            observer: Arc::new(LogObserver::new()),
        }
    }

    /// Replaces the marker substring.
    pub fn with_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.marker = marker.into();
        self
    }

    /// Replaces the removal observer.
    pub fn with_observer(
        mut self,
        observer: Arc<dyn RemovalObserver>,
    ) -> Self {
        self.observer = observer;
        self
    }

    /// The marker substring this filter looks for.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Returns `true` if `token` is inline content containing the marker.
    ///
    /// An inline token without text never matches.
    pub fn is_internal(&self, token: &Token<'_>) -> bool {
        token.is_inline()
            && token
                .text
                .as_deref()
                .is_some_and(|text| text.contains(self.marker.as_str()))
    }

    /// Returns the tokens of `tokens` that are not internal notes, in order.
    pub fn filter<'a>(&self, tokens: Vec<Token<'a>>) -> Vec<Token<'a>> {
        tokens
            .into_iter()
            .filter(|token| {
                let internal = self.is_internal(token);
                if internal {
                    self.observer.token_removed(token);
                }
                !internal
            })
            .collect()
    }
}

impl Default for InternalNotesFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreRule for InternalNotesFilter {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn apply<'a>(&self, tokens: Vec<Token<'a>>) -> Vec<Token<'a>> {
        self.filter(tokens)
    }
}

/// Strips internal notes using the default marker, logging each removal.
pub fn strip_internal_notes(tokens: Vec<Token<'_>>) -> Vec<Token<'_>> {
    InternalNotesFilter::new().filter(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::token::{BlockKind, TokenKind};
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct Recorder {
        removed: Mutex<Vec<String>>,
    }

    impl RemovalObserver for Recorder {
        fn token_removed(&self, token: &Token<'_>) {
            self.removed.lock().push(
                token.text.as_deref().unwrap_or_default().to_string(),
            );
        }
    }

    fn silent() -> InternalNotesFilter {
        InternalNotesFilter::new().with_observer(Arc::new(SilentObserver))
    }

    #[test]
    fn test_removes_marked_inline_token() {
        let block = Token::structural(TokenKind::Close(BlockKind::Paragraph));
        let tokens = vec![
            Token::inline("hello"),
            Token::inline("%%internal-notes: secret"),
            block.clone(),
        ];
        assert_eq!(
            silent().filter(tokens),
            vec![Token::inline("hello"), block]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(silent().filter(Vec::new()).is_empty());
    }

    #[test]
    fn test_no_inline_tokens_unchanged() {
        let tokens = vec![
            Token::structural(TokenKind::Open(BlockKind::List)),
            Token::structural(TokenKind::Rule),
            Token::structural(TokenKind::Close(BlockKind::List)),
        ];
        assert_eq!(silent().filter(tokens.clone()), tokens);
    }

    #[test]
    fn test_marker_in_non_inline_token_is_kept() {
        let tokens = vec![
            Token::with_text(TokenKind::Fence, "%%internal-notes"),
            Token::with_text(TokenKind::HtmlBlock, "<p>%%internal-notes</p>"),
            Token::with_text(TokenKind::FrontMatter, "x: %%internal-notes"),
        ];
        assert_eq!(silent().filter(tokens.clone()), tokens);
    }

    #[test]
    fn test_marker_mid_text_is_removed() {
        let tokens = vec![Token::inline("note %%internal-notes more")];
        assert!(silent().filter(tokens).is_empty());
    }

    #[test]
    fn test_inline_without_text_is_kept() {
        let tokens = vec![Token::structural(TokenKind::Inline)];
        assert_eq!(silent().filter(tokens.clone()), tokens);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let tokens = vec![
            Token::inline("a"),
            Token::inline("b %%internal-notes"),
            Token::structural(TokenKind::Rule),
            Token::inline("c"),
        ];
        let filter = silent();
        let once = filter.filter(tokens);
        assert_eq!(filter.filter(once.clone()), once);
    }

    #[test]
    fn test_observer_receives_removed_text() {
        let recorder = Arc::new(Recorder::default());
        let filter = InternalNotesFilter::new().with_observer(recorder.clone());
        let _ = filter.filter(vec![
            Token::inline("keep"),
            Token::inline("%%internal-notes first"),
            Token::inline("then %%internal-notes second"),
        ]);
        assert_eq!(
            *recorder.removed.lock(),
            vec![
                "%%internal-notes first".to_string(),
                "then %%internal-notes second".to_string(),
            ]
        );
    }

    #[test]
    fn test_log_observer_counts_removals() {
        let observer = Arc::new(LogObserver::new());
        let filter = InternalNotesFilter::new().with_observer(observer.clone());
        let _ = filter.filter(vec![
            Token::inline("%%internal-notes"),
            Token::inline("kept"),
            Token::inline("%%internal-notes again"),
        ]);
        assert_eq!(observer.removed(), 2);
    }

    #[test]
    fn test_quiet_observer_still_counts() {
        let observer = Arc::new(LogObserver::quiet());
        let filter = InternalNotesFilter::new().with_observer(observer.clone());
        let _ = filter.filter(vec![Token::inline("%%internal-notes")]);
        assert_eq!(observer.removed(), 1);
    }

    #[test]
    fn test_custom_marker() {
        let filter = silent().with_marker("@@draft");
        let tokens = vec![
            Token::inline("@@draft only"),
            Token::inline("%%internal-notes stays"),
        ];
        let kept = filter.filter(tokens);
        assert_eq!(kept, vec![Token::inline("%%internal-notes stays")]);
        assert_eq!(filter.marker(), "@@draft");
    }

    #[test]
    fn test_registers_as_core_rule() {
        let filter = silent();
        assert_eq!(CoreRule::name(&filter), RULE_NAME);
        let kept = CoreRule::apply(
            &filter,
            vec![Token::inline("%%internal-notes"), Token::inline("x")],
        );
        assert_eq!(kept, vec![Token::inline("x")]);
    }
}
