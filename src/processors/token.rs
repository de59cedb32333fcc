// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Token Model
//!
//! A flat, markdown-it style view over the `pulldown-cmark` event stream.
//!
//! Block structure becomes `Open`/`Close` token pairs, each run of inline
//! events becomes a single [`TokenKind::Inline`] token whose text is the raw
//! source of that run, and leaf blocks whose body is not markdown (fenced
//! code, HTML blocks, front matter) become one token each. Every token keeps
//! the parser events it was built from, so a filtered token list can be
//! handed straight back to the HTML renderer.
//!
//! ```rust
//! use noteflow::processors::token::{tokenize, TokenKind};
//! use pulldown_cmark::Options;
//!
//! let tokens = tokenize("Hello *world*", Options::empty());
//! let inline = tokens.iter().find(|t| t.kind == TokenKind::Inline).unwrap();
//! assert_eq!(inline.text.as_deref(), Some("Hello *world*"));
//! ```

use pulldown_cmark::{
    CowStr, Event, MetadataBlockKind, Options, Parser, Tag, TagEnd,
};
use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

/// Block-level element a pair of `Open`/`Close` tokens delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Paragraph.
    Paragraph,
    /// Heading with its level (1-6).
    Heading(u8),
    /// Block quote, including GFM alert quotes.
    BlockQuote,
    /// Ordered or bullet list.
    List,
    /// List item.
    Item,
    /// Table.
    Table,
    /// Table header row group.
    TableHead,
    /// Table row.
    TableRow,
    /// Table cell.
    TableCell,
    /// Footnote definition.
    FootnoteDefinition,
    /// Any other container the parser reports.
    Other,
}

impl BlockKind {
    fn from_tag(tag: &Tag<'_>) -> Self {
        match tag {
            Tag::Paragraph => BlockKind::Paragraph,
            Tag::Heading { level, .. } => BlockKind::Heading(*level as u8),
            Tag::BlockQuote(..) => BlockKind::BlockQuote,
            Tag::List(_) => BlockKind::List,
            Tag::Item => BlockKind::Item,
            Tag::Table(_) => BlockKind::Table,
            Tag::TableHead => BlockKind::TableHead,
            Tag::TableRow => BlockKind::TableRow,
            Tag::TableCell => BlockKind::TableCell,
            Tag::FootnoteDefinition(_) => BlockKind::FootnoteDefinition,
            _ => BlockKind::Other,
        }
    }

    /// Short name used in token names, e.g. `paragraph`.
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading(_) => "heading",
            BlockKind::BlockQuote => "blockquote",
            BlockKind::List => "list",
            BlockKind::Item => "list_item",
            BlockKind::Table => "table",
            BlockKind::TableHead => "thead",
            BlockKind::TableRow => "tr",
            BlockKind::TableCell => "td",
            BlockKind::FootnoteDefinition => "footnote",
            BlockKind::Other => "block",
        }
    }
}

/// Discriminator of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Start of a block container.
    Open(BlockKind),
    /// End of a block container.
    Close(BlockKind),
    /// Text-level content of a paragraph, heading, cell or tight list item.
    Inline,
    /// Fenced or indented code block; text is the code.
    Fence,
    /// Raw HTML block; text is the HTML.
    HtmlBlock,
    /// Thematic break.
    Rule,
    /// YAML front matter; text is the YAML body.
    FrontMatter,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Open(block) => write!(f, "{}_open", block.name()),
            TokenKind::Close(block) => {
                write!(f, "{}_close", block.name())
            }
            TokenKind::Inline => f.write_str("inline"),
            TokenKind::Fence => f.write_str("fence"),
            TokenKind::HtmlBlock => f.write_str("html_block"),
            TokenKind::Rule => f.write_str("hr"),
            TokenKind::FrontMatter => f.write_str("front_matter"),
        }
    }
}

/// A unit of parsed document content.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    /// What this token represents.
    pub kind: TokenKind,
    /// Raw textual payload. `None` for structural tokens.
    pub text: Option<Cow<'a, str>>,
    /// Parser events that render this token, in order.
    pub events: Vec<Event<'a>>,
}

impl<'a> Token<'a> {
    /// Creates a token from its parts.
    pub fn new(
        kind: TokenKind,
        text: Option<Cow<'a, str>>,
        events: Vec<Event<'a>>,
    ) -> Self {
        Self { kind, text, events }
    }

    /// Creates an inline token holding `text` as a single text event.
    pub fn inline(text: &'a str) -> Self {
        Self::new(
            TokenKind::Inline,
            Some(Cow::Borrowed(text)),
            vec![Event::Text(CowStr::Borrowed(text))],
        )
    }

    /// Creates a token of any kind carrying `text` but no renderable events.
    pub fn with_text(kind: TokenKind, text: &'a str) -> Self {
        Self::new(kind, Some(Cow::Borrowed(text)), Vec::new())
    }

    /// Creates a structural token without text or events.
    pub fn structural(kind: TokenKind) -> Self {
        Self::new(kind, None, Vec::new())
    }

    /// Returns `true` for inline-content tokens.
    pub fn is_inline(&self) -> bool {
        self.kind == TokenKind::Inline
    }
}

/// Parses `source` with `options` and groups the resulting events into tokens.
///
/// With [`Options::ENABLE_YAML_STYLE_METADATA_BLOCKS`] set, only a `---`
/// block opening the first line of `source` becomes a
/// [`TokenKind::FrontMatter`] token. The rest of the page is parsed without
/// that option, so a later `---` pair stays ordinary markdown.
pub fn tokenize(source: &str, options: Options) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut body = source;
    if options.contains(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS) {
        if let Some((yaml, rest)) = split_front_matter(source) {
            tokens.push(front_matter_token(yaml));
            body = rest;
        }
    }

    let mut body_options = options;
    body_options.remove(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    let mut builder = TokenBuilder::new(body, tokens);
    for (event, range) in
        Parser::new_ext(body, body_options).into_offset_iter()
    {
        builder.push(event, range);
    }
    builder.finish()
}

/// Splits a leading `---` ... `---` (or `...`) block off `source`.
///
/// Returns the YAML body and the remaining source, or `None` when the page
/// does not open with a closed front matter block.
fn split_front_matter(source: &str) -> Option<(&str, &str)> {
    let rest = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))?;
    if rest.starts_with('\n') || rest.starts_with("\r\n") {
        return None;
    }

    let start = source.len() - rest.len();
    let mut offset = start;
    for line in rest.split_inclusive('\n') {
        let fence = line.trim_end_matches(['\n', '\r']);
        if fence == "---" || fence == "..." {
            let body = &source[offset + line.len()..];
            return Some((&source[start..offset], body));
        }
        offset += line.len();
    }
    None
}

fn front_matter_token(yaml: &str) -> Token<'_> {
    Token::new(
        TokenKind::FrontMatter,
        Some(Cow::Borrowed(yaml)),
        vec![
            Event::Start(Tag::MetadataBlock(MetadataBlockKind::YamlStyle)),
            Event::Text(CowStr::Borrowed(yaml)),
            Event::End(TagEnd::MetadataBlock(MetadataBlockKind::YamlStyle)),
        ],
    )
}

/// Non-markdown leaf block being collected.
#[derive(Debug)]
struct Leaf<'a> {
    kind: TokenKind,
    text: String,
    events: Vec<Event<'a>>,
}

/// Run of consecutive inline events.
#[derive(Debug)]
struct InlineRun<'a> {
    span: Range<usize>,
    events: Vec<Event<'a>>,
}

#[derive(Debug)]
struct TokenBuilder<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    open_blocks: Vec<BlockKind>,
    leaf: Option<Leaf<'a>>,
    run: Option<InlineRun<'a>>,
}

impl<'a> TokenBuilder<'a> {
    fn new(source: &'a str, tokens: Vec<Token<'a>>) -> Self {
        Self {
            source,
            tokens,
            open_blocks: Vec::new(),
            leaf: None,
            run: None,
        }
    }

    fn push(&mut self, event: Event<'a>, range: Range<usize>) {
        if let Some(mut leaf) = self.leaf.take() {
            let closes = matches!(event, Event::End(_));
            match &event {
                Event::Text(text) | Event::Html(text) => {
                    leaf.text.push_str(text)
                }
                _ => {}
            }
            leaf.events.push(event);
            if closes {
                self.tokens.push(Token::new(
                    leaf.kind,
                    Some(Cow::Owned(leaf.text)),
                    leaf.events,
                ));
            } else {
                self.leaf = Some(leaf);
            }
            return;
        }

        if is_inline_event(&event) {
            match self.run.as_mut() {
                Some(run) => {
                    run.span.start = run.span.start.min(range.start);
                    run.span.end = run.span.end.max(range.end);
                    run.events.push(event);
                }
                None => {
                    self.run = Some(InlineRun {
                        span: range,
                        events: vec![event],
                    })
                }
            }
            return;
        }

        self.flush_run();
        match event {
            Event::Start(Tag::CodeBlock(_) | Tag::HtmlBlock) => {
                let kind = match &event {
                    Event::Start(Tag::CodeBlock(_)) => TokenKind::Fence,
                    _ => TokenKind::HtmlBlock,
                };
                self.leaf = Some(Leaf {
                    kind,
                    text: String::new(),
                    events: vec![event],
                });
            }
            Event::Start(ref tag) => {
                let block = BlockKind::from_tag(tag);
                self.open_blocks.push(block);
                self.tokens.push(Token::new(
                    TokenKind::Open(block),
                    None,
                    vec![event],
                ));
            }
            Event::End(_) => {
                let block =
                    self.open_blocks.pop().unwrap_or(BlockKind::Other);
                self.tokens.push(Token::new(
                    TokenKind::Close(block),
                    None,
                    vec![event],
                ));
            }
            other => {
                self.tokens.push(Token::new(
                    TokenKind::Rule,
                    None,
                    vec![other],
                ));
            }
        }
    }

    fn flush_run(&mut self) {
        if let Some(run) = self.run.take() {
            let text = self.source.get(run.span).unwrap_or_default();
            self.tokens.push(Token::new(
                TokenKind::Inline,
                Some(Cow::Borrowed(text)),
                run.events,
            ));
        }
    }

    fn finish(mut self) -> Vec<Token<'a>> {
        self.flush_run();
        if let Some(leaf) = self.leaf.take() {
            self.tokens.push(Token::new(
                leaf.kind,
                Some(Cow::Owned(leaf.text)),
                leaf.events,
            ));
        }
        self.tokens
    }
}

fn is_inline_event(event: &Event<'_>) -> bool {
    match event {
        Event::Start(tag) => matches!(
            tag,
            Tag::Emphasis
                | Tag::Strong
                | Tag::Strikethrough
                | Tag::Link { .. }
                | Tag::Image { .. }
        ),
        Event::End(end) => matches!(
            end,
            TagEnd::Emphasis
                | TagEnd::Strong
                | TagEnd::Strikethrough
                | TagEnd::Link
                | TagEnd::Image
        ),
        Event::Rule => false,
        _ => true,
    }
}
