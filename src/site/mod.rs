// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Site Configuration Module
//!
//! Typed declaration of the blog the pages belong to: navigation bar,
//! sidebar tree and theme options. The data is handed to the theme as is;
//! NoteFlow itself only validates it, resolves `structure` sidebar groups
//! and reads the markdown feature toggles.
//!
//! ```rust
//! use noteflow::site::SiteConfig;
//!
//! let site: SiteConfig = toml::from_str(r#"
//!     title = "Notes"
//!     navbar = ["/", { text = "Posts", link = "/posts/", icon = "book" }]
//!
//!     [sidebar]
//!     "/" = ["", "intro"]
//! "#).unwrap();
//!
//! assert_eq!(site.base, "/");
//! assert_eq!(site.navbar.items().len(), 2);
//! assert!(site.problems().is_empty());
//! ```

use crate::core::error::{NoteFlowError, Result};
use crate::core::traits::Validator;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Navigation bar entries.
pub mod navbar;

/// Sidebar declaration and resolution.
pub mod sidebar;

/// Theme options.
pub mod theme;

pub use navbar::{Navbar, NavbarItem, NavbarLink};
pub use sidebar::{Sidebar, SidebarItem, SidebarLink};
pub use theme::ThemeConfig;

/// Declarative configuration of the whole site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base path the site is served from.
    pub base: String,
    /// Language of the pages.
    pub lang: String,
    /// Site title.
    pub title: String,
    /// Site description.
    pub description: String,
    /// Theme options.
    pub theme: ThemeConfig,
    /// Navigation bar.
    pub navbar: Navbar,
    /// Sidebar tree.
    pub sidebar: Sidebar,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base: "/".to_string(),
            lang: "en-US".to_string(),
            title: String::new(),
            description: String::new(),
            theme: ThemeConfig::default(),
            navbar: Navbar::default(),
            sidebar: Sidebar::default(),
        }
    }
}

impl SiteConfig {
    /// Every problem found in the declaration, without touching the disk.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.base.starts_with('/') || !self.base.ends_with('/') {
            problems.push(format!(
                "base '{}' must start and end with '/'",
                self.base
            ));
        }
        problems.extend(self.navbar.problems());
        problems.extend(self.sidebar.problems());
        problems.extend(self.theme.encrypt.problems());
        problems
    }
}

/// Validates a [`SiteConfig`], optionally against a content directory.
#[derive(Debug, Clone, Default)]
pub struct SiteValidator {
    content_dir: Option<PathBuf>,
}

impl SiteValidator {
    /// Validator that only checks the declaration itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also checks that `structure` groups point at directories under
    /// `content_dir`.
    pub fn with_content_dir<P: Into<PathBuf>>(mut self, content_dir: P) -> Self {
        self.content_dir = Some(content_dir.into());
        self
    }
}

impl Validator for SiteValidator {
    type Input = SiteConfig;

    fn validate(&self, site: &SiteConfig) -> Result<()> {
        let mut problems = site.problems();
        if let Some(content_dir) = &self.content_dir {
            for prefix in site.sidebar.structure_prefixes() {
                let dir = content_dir.join(prefix.trim_start_matches('/'));
                if !dir.is_dir() {
                    problems.push(format!(
                        "sidebar structure group '{}' has no directory at {}",
                        prefix,
                        dir.display()
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(NoteFlowError::config_error(
                format!("Invalid site configuration: {}", problems.join("; ")),
                self.content_dir.clone(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SITE: &str = r#"
        base = "/"
        lang = "zh-CN"
        title = "Notes"
        navbar = ["/", "/intro.md"]

        [theme]
        hostname = "https://notes.example.org"

        [theme.author]
        name = "Jane Doe"

        [sidebar]
        "/" = [
            "",
            { text = "Docker", prefix = "posts/docker/", collapsible = true, children = "structure" },
        ]
    "#;

    #[test]
    fn test_site_from_toml() {
        let site: SiteConfig = toml::from_str(SITE).unwrap();
        assert_eq!(site.lang, "zh-CN");
        assert_eq!(site.theme.author.name, "Jane Doe");
        assert!(site.problems().is_empty());
    }

    #[test]
    fn test_default_site_is_valid() {
        assert!(SiteValidator::new().validate(&SiteConfig::default()).is_ok());
    }

    #[test]
    fn test_validator_collects_problems() {
        let site: SiteConfig = toml::from_str(
            r#"
            base = "blog"
            navbar = ["intro.md"]
            "#,
        )
        .unwrap();
        let err = SiteValidator::new().validate(&site).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("base 'blog'"));
        assert!(message.contains("intro.md"));
    }

    #[test]
    fn test_validator_checks_structure_directories() {
        let site: SiteConfig = toml::from_str(SITE).unwrap();
        let temp_dir = TempDir::new().unwrap();

        let validator = SiteValidator::new().with_content_dir(temp_dir.path());
        assert!(validator.validate(&site).is_err());

        fs::create_dir_all(temp_dir.path().join("posts/docker")).unwrap();
        assert!(validator.validate(&site).is_ok());
    }
}
