// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Theme options: author, blog profile, page encryption, markdown
//! extensions and plugin toggles.

use crate::processors::MarkdownFeatures;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Theme configuration of the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Public host name, e.g. `https://notes.example.org`.
    pub hostname: Option<String>,
    /// Default author of every page.
    pub author: Author,
    /// Logo path, relative to the public directory.
    pub logo: Option<String>,
    /// Source repository shown in the navbar.
    pub repo: Option<String>,
    /// Directory of the sources inside the repository.
    pub docs_dir: String,
    /// Footer HTML.
    pub footer: Option<String>,
    /// Whether the footer is shown on every page.
    pub display_footer: bool,
    /// Blog profile.
    pub blog: BlogOptions,
    /// Password protected routes.
    pub encrypt: EncryptOptions,
    /// Markdown extension toggles.
    pub markdown: MarkdownFeatures,
    /// Plugin toggles.
    pub plugins: PluginOptions,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            hostname: None,
            author: Author::default(),
            logo: None,
            repo: None,
            docs_dir: "src".to_string(),
            footer: None,
            display_footer: false,
            blog: BlogOptions::default(),
            encrypt: EncryptOptions::default(),
            markdown: MarkdownFeatures::default(),
            plugins: PluginOptions::default(),
        }
    }
}

/// Page author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    /// Display name.
    pub name: String,
    /// Home page.
    pub url: Option<String>,
    /// Contact address.
    pub email: Option<String>,
}

/// Blog profile card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogOptions {
    /// Short self description.
    pub description: Option<String>,
    /// Route of the introduction page.
    pub intro: Option<String>,
    /// Social links keyed by media name.
    pub medias: BTreeMap<String, MediaLink>,
}

/// A social media link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaLink {
    /// Link using the theme's built-in icon.
    Url(String),
    /// Link with a custom icon.
    Custom {
        /// Icon URL or inline SVG.
        icon: String,
        /// Target URL.
        link: String,
    },
}

impl MediaLink {
    /// Target URL.
    pub fn link(&self) -> &str {
        match self {
            MediaLink::Url(link) | MediaLink::Custom { link, .. } => link,
        }
    }
}

/// Page encryption settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptOptions {
    /// Protected route prefixes.
    pub config: BTreeMap<String, ProtectedRoute>,
}

/// Password protection of one route prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedRoute {
    /// Hint shown on the password prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Accepted password.
    pub password: String,
}

impl EncryptOptions {
    /// Protection covering `route`: the entry with the longest prefix of it.
    pub fn protected_route(&self, route: &str) -> Option<&ProtectedRoute> {
        self.config
            .iter()
            .filter(|(prefix, _)| route.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, protection)| protection)
    }

    /// Problems with the entries, one message each.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (route, protection) in &self.config {
            if !route.starts_with('/') {
                problems.push(format!(
                    "encrypted route '{}' must start with '/'",
                    route
                ));
            }
            if protection.password.is_empty() {
                problems.push(format!(
                    "encrypted route '{}' has an empty password",
                    route
                ));
            }
        }
        problems
    }
}

/// Plugin toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginOptions {
    /// Blog plugin: article lists, categories and tags.
    pub blog: bool,
    /// Components registered for markdown use, e.g. `Badge`.
    pub components: Vec<String>,
    /// Prefix of icon names, e.g. `fa6-solid:`.
    pub icon_prefix: Option<String>,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            blog: true,
            components: Vec::new(),
            icon_prefix: None,
        }
    }
}
