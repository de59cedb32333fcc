// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Post-parse token hooks.
//!
//! A [`Ruler`] is the ordered chain of [`CoreRule`]s the markdown processor
//! runs once per document, after parsing and before rendering.

use crate::processors::token::Token;
use log::debug;
use std::fmt::Debug;

/// A named hook over a document's token list.
pub trait CoreRule: Send + Sync + Debug {
    /// Name the rule is registered under.
    fn name(&self) -> &str;

    /// Rewrites the token list of one document.
    fn apply<'a>(&self, tokens: Vec<Token<'a>>) -> Vec<Token<'a>>;
}

/// Ordered chain of core rules.
#[derive(Debug, Default)]
pub struct Ruler {
    rules: Vec<Box<dyn CoreRule>>,
}

impl Ruler {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `rule` to the end of the chain.
    pub fn push<R: CoreRule + 'static>(&mut self, rule: R) {
        debug!("Registering core rule '{}'", rule.name());
        self.rules.push(Box::new(rule));
    }

    /// Returns `true` if a rule named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name() == name)
    }

    /// Names of the registered rules, in invocation order.
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rule is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule over `tokens`, in registration order.
    pub fn apply<'a>(&self, tokens: Vec<Token<'a>>) -> Vec<Token<'a>> {
        self.rules.iter().fold(tokens, |tokens, rule| {
            debug!(
                "Applying core rule '{}' to {} tokens",
                rule.name(),
                tokens.len()
            );
            rule.apply(tokens)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::token::TokenKind;

    #[derive(Debug)]
    struct DropFirst;

    impl CoreRule for DropFirst {
        fn name(&self) -> &str {
            "drop_first"
        }

        fn apply<'a>(&self, tokens: Vec<Token<'a>>) -> Vec<Token<'a>> {
            tokens.into_iter().skip(1).collect()
        }
    }

    #[derive(Debug)]
    struct KeepInline;

    impl CoreRule for KeepInline {
        fn name(&self) -> &str {
            "keep_inline"
        }

        fn apply<'a>(&self, tokens: Vec<Token<'a>>) -> Vec<Token<'a>> {
            tokens.into_iter().filter(Token::is_inline).collect()
        }
    }

    #[test]
    fn test_empty_ruler_is_identity() {
        let ruler = Ruler::new();
        let tokens = vec![Token::inline("a"), Token::inline("b")];
        assert!(ruler.is_empty());
        assert_eq!(ruler.apply(tokens.clone()), tokens);
    }

    #[test]
    fn test_rules_run_in_registration_order() {
        let mut ruler = Ruler::new();
        ruler.push(KeepInline);
        ruler.push(DropFirst);

        let tokens = vec![
            Token::structural(TokenKind::Rule),
            Token::inline("a"),
            Token::inline("b"),
        ];
        assert_eq!(ruler.apply(tokens), vec![Token::inline("b")]);
        assert_eq!(ruler.names(), vec!["keep_inline", "drop_first"]);
        assert_eq!(ruler.len(), 2);
    }

    #[test]
    fn test_contains() {
        let mut ruler = Ruler::new();
        ruler.push(DropFirst);
        assert!(ruler.contains("drop_first"));
        assert!(!ruler.contains("keep_inline"));
    }
}
