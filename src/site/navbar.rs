// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Navigation bar entries.

use serde::{Deserialize, Serialize};

/// One navigation bar entry.
///
/// In TOML either a bare route string or a table:
///
/// ```toml
/// navbar = ["/", "/intro.md", { text = "Posts", link = "/posts/", icon = "book" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavbarItem {
    /// Route whose label the theme derives from the page.
    Route(String),
    /// Labelled link.
    Link(NavbarLink),
}

/// Labelled navigation bar link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavbarLink {
    /// Label shown in the bar.
    pub text: String,
    /// Target route.
    pub link: String,
    /// Optional icon name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NavbarItem {
    /// Route this entry points at.
    pub fn link(&self) -> &str {
        match self {
            NavbarItem::Route(route) => route,
            NavbarItem::Link(link) => &link.link,
        }
    }

    /// Explicit label, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            NavbarItem::Route(_) => None,
            NavbarItem::Link(link) => Some(&link.text),
        }
    }

    /// Icon name, if any.
    pub fn icon(&self) -> Option<&str> {
        match self {
            NavbarItem::Route(_) => None,
            NavbarItem::Link(link) => link.icon.as_deref(),
        }
    }
}

impl From<&str> for NavbarItem {
    fn from(route: &str) -> Self {
        NavbarItem::Route(route.to_string())
    }
}

/// Ordered list of navigation bar entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Navbar(pub Vec<NavbarItem>);

impl Navbar {
    /// Entries in display order.
    pub fn items(&self) -> &[NavbarItem] {
        &self.0
    }

    /// Returns `true` if the bar has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Problems with the entries, one message each.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (index, item) in self.0.iter().enumerate() {
            if !item.link().starts_with('/') {
                problems.push(format!(
                    "navbar entry {} links to '{}', which is not site-absolute",
                    index,
                    item.link()
                ));
            }
            if matches!(item.text(), Some(text) if text.trim().is_empty()) {
                problems.push(format!("navbar entry {} has an empty text", index));
            }
        }
        problems
    }
}
