// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Sidebar
//!
//! The sidebar is a map from a route prefix (`/`, `/posts/`, ...) to an
//! ordered list of items. An item is either a page name relative to the
//! current prefix or a group with its own prefix and children. Children
//! are listed explicitly or derived from the group's directory with the
//! `structure` directive:
//!
//! ```toml
//! [[sidebar."/"]]
//! text = "Posts"
//! icon = "book"
//! prefix = "posts/"
//! children = [
//!     { text = "Kafka", prefix = "kafka/", collapsible = true, children = "structure" },
//! ]
//! ```
//!
//! [`Sidebar::resolve`] turns the declaration into a tree of
//! [`SidebarLink`]s with concrete routes.

use crate::core::error::{NoteFlowError, Result};
use crate::processors::markdown::MarkdownProcessor;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// File names treated as the index page of a directory.
const INDEX_PAGES: &[&str] = &["README.md", "readme.md", "index.md"];

/// One declared sidebar item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SidebarItem {
    /// Page name relative to the current prefix. `""` is the prefix index.
    Page(String),
    /// Nested group.
    Group(Box<SidebarGroup>),
}

/// A titled group of sidebar items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarGroup {
    /// Group label.
    pub text: String,
    /// Optional icon name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Path prefix added to every child, e.g. `kafka/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Optional route the group label links to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Whether the theme lets readers fold the group.
    #[serde(default)]
    pub collapsible: bool,
    /// Children of the group.
    #[serde(default)]
    pub children: SidebarChildren,
}

/// Children of a [`SidebarGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SidebarChildren {
    /// Children derived at build time.
    Directive(ChildrenDirective),
    /// Explicit ordered children.
    Items(Vec<SidebarItem>),
}

impl Default for SidebarChildren {
    fn default() -> Self {
        SidebarChildren::Items(Vec::new())
    }
}

/// How derived children are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildrenDirective {
    /// List the group's directory.
    Structure,
}

/// A resolved sidebar entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SidebarLink {
    /// Label.
    pub text: String,
    /// Route, if the entry is clickable.
    pub link: Option<String>,
    /// Icon name.
    pub icon: Option<String>,
    /// Whether the entry can be folded.
    pub collapsible: bool,
    /// Nested entries.
    pub children: Vec<SidebarLink>,
}

/// Sidebar declaration keyed by route prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sidebar(pub BTreeMap<String, Vec<SidebarItem>>);

impl Sidebar {
    /// Returns `true` if no prefix has a sidebar.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Items declared for `prefix`.
    pub fn items(&self, prefix: &str) -> Option<&[SidebarItem]> {
        self.0.get(prefix).map(Vec::as_slice)
    }

    /// Route prefixes of every group using the `structure` directive.
    pub fn structure_prefixes(&self) -> Vec<String> {
        let mut prefixes = Vec::new();
        for (key, items) in &self.0 {
            collect_structure_prefixes(items, key, &mut prefixes);
        }
        prefixes
    }

    /// Problems with the declaration, one message each.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (key, items) in &self.0 {
            if !key.starts_with('/') || !key.ends_with('/') {
                problems.push(format!(
                    "sidebar key '{}' must start and end with '/'",
                    key
                ));
            }
            collect_problems(items, key, &mut problems);
        }
        problems
    }

    /// Resolves every prefix against `content_dir`.
    ///
    /// Page labels come from page titles, read with `processor`, falling
    /// back to the page name. A `structure` group lists its directory:
    /// pages sorted by file name, then sub-directories as nested
    /// collapsible groups. A directory's `README.md` becomes the link of
    /// its group rather than a child.
    pub fn resolve(
        &self,
        content_dir: &Path,
        processor: &MarkdownProcessor,
    ) -> Result<BTreeMap<String, Vec<SidebarLink>>> {
        let resolver = Resolver {
            content_dir,
            processor,
        };
        let mut resolved = BTreeMap::new();
        for (key, items) in &self.0 {
            debug!("Resolving sidebar for '{}'", key);
            let links = resolver.items(items, key)?;
            let _ = resolved.insert(key.clone(), links);
        }
        Ok(resolved)
    }
}

fn group_prefix(parent: &str, group: &SidebarGroup) -> String {
    format!("{}{}", parent, group.prefix.as_deref().unwrap_or_default())
}

fn collect_structure_prefixes(
    items: &[SidebarItem],
    prefix: &str,
    out: &mut Vec<String>,
) {
    for item in items {
        if let SidebarItem::Group(group) = item {
            let prefix = group_prefix(prefix, group);
            match &group.children {
                SidebarChildren::Directive(ChildrenDirective::Structure) => {
                    out.push(prefix)
                }
                SidebarChildren::Items(children) => {
                    collect_structure_prefixes(children, &prefix, out)
                }
            }
        }
    }
}

fn collect_problems(
    items: &[SidebarItem],
    prefix: &str,
    problems: &mut Vec<String>,
) {
    for item in items {
        let SidebarItem::Group(group) = item else {
            continue;
        };
        if group.text.trim().is_empty() {
            problems.push(format!(
                "sidebar group under '{}' has an empty text",
                prefix
            ));
        }
        if let Some(own) = &group.prefix {
            if own.starts_with('/') || !own.ends_with('/') {
                problems.push(format!(
                    "sidebar group '{}' prefix '{}' must be relative and end with '/'",
                    group.text, own
                ));
            }
        }
        if let SidebarChildren::Items(children) = &group.children {
            collect_problems(children, &group_prefix(prefix, group), problems);
        }
    }
}

/// Route of page `name` under `prefix`.
///
/// `""` and index names map to the prefix itself, `name/` to a directory
/// index, anything else to `<prefix><name>.html`. Absolute names ignore
/// the prefix.
pub fn page_route(prefix: &str, name: &str) -> String {
    let base = if name.starts_with('/') { "" } else { prefix };
    let stem = name
        .strip_suffix(".md")
        .or_else(|| name.strip_suffix(".html"))
        .unwrap_or(name);
    let file_name = stem.rsplit('/').next().unwrap_or_default();
    if stem.is_empty() || stem.ends_with('/') {
        format!("{}{}", base, stem)
    } else if matches!(file_name, "README" | "readme" | "index") {
        format!("{}{}", base, &stem[..stem.len() - file_name.len()])
    } else {
        format!("{}{}.html", base, stem)
    }
}

#[derive(Debug)]
struct Resolver<'a> {
    content_dir: &'a Path,
    processor: &'a MarkdownProcessor,
}

impl Resolver<'_> {
    fn dir_of(&self, route: &str) -> PathBuf {
        self.content_dir.join(route.trim_start_matches('/'))
    }

    fn items(
        &self,
        items: &[SidebarItem],
        prefix: &str,
    ) -> Result<Vec<SidebarLink>> {
        items
            .iter()
            .map(|item| match item {
                SidebarItem::Page(name) => self.page(prefix, name),
                SidebarItem::Group(group) => self.group(prefix, group),
            })
            .collect()
    }

    fn page(&self, prefix: &str, name: &str) -> Result<SidebarLink> {
        let route = page_route(prefix, name);
        let source = self.source_of(&route);
        let fallback = if name.is_empty() {
            route.clone()
        } else {
            name.trim_end_matches(".md").to_string()
        };
        let text = match source {
            Some(path) => self.title_of(&path)?.unwrap_or(fallback),
            None => fallback,
        };
        Ok(SidebarLink {
            text,
            link: Some(route),
            ..SidebarLink::default()
        })
    }

    fn group(
        &self,
        parent: &str,
        group: &SidebarGroup,
    ) -> Result<SidebarLink> {
        let prefix = group_prefix(parent, group);
        let mut link = group.link.as_ref().map(|link| {
            if link.starts_with('/') {
                link.clone()
            } else {
                format!("{}{}", prefix, link)
            }
        });
        let children = match &group.children {
            SidebarChildren::Items(items) => self.items(items, &prefix)?,
            SidebarChildren::Directive(ChildrenDirective::Structure) => {
                let dir = self.dir_of(&prefix);
                if link.is_none() && index_page(&dir).is_some() {
                    link = Some(prefix.clone());
                }
                self.structure(&dir, &prefix)?
            }
        };
        Ok(SidebarLink {
            text: group.text.clone(),
            link,
            icon: group.icon.clone(),
            collapsible: group.collapsible,
            children,
        })
    }

    fn structure(&self, dir: &Path, prefix: &str) -> Result<Vec<SidebarLink>> {
        if !dir.is_dir() {
            return Err(NoteFlowError::config_error(
                format!(
                    "sidebar structure directory does not exist: {}",
                    dir.display()
                ),
                Some(dir.to_path_buf()),
            ));
        }

        let mut entries = fs::read_dir(dir)
            .map_err(|e| NoteFlowError::io_error(dir.to_path_buf(), e))?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| NoteFlowError::io_error(dir.to_path_buf(), e))?;
        entries.sort();

        let mut pages = Vec::new();
        let mut groups = Vec::new();
        for path in entries {
            let Some(name) = path.file_name().and_then(OsStr::to_str) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if path.is_dir() {
                let child_prefix = format!("{}{}/", prefix, name);
                let index = index_page(&path);
                let text = match &index {
                    Some(index) => self.title_of(index)?,
                    None => None,
                }
                .unwrap_or_else(|| name.to_string());
                groups.push(SidebarLink {
                    text,
                    link: index.map(|_| child_prefix.clone()),
                    icon: None,
                    collapsible: true,
                    children: self.structure(&path, &child_prefix)?,
                });
            } else if is_markdown(&path) && !INDEX_PAGES.contains(&name) {
                let stem = path
                    .file_stem()
                    .and_then(OsStr::to_str)
                    .unwrap_or(name);
                let text =
                    self.title_of(&path)?.unwrap_or_else(|| stem.to_string());
                pages.push(SidebarLink {
                    text,
                    link: Some(format!("{}{}.html", prefix, stem)),
                    ..SidebarLink::default()
                });
            }
        }
        pages.append(&mut groups);
        Ok(pages)
    }

    /// Markdown file backing `route`, if it exists.
    fn source_of(&self, route: &str) -> Option<PathBuf> {
        if route.ends_with('/') {
            return index_page(&self.dir_of(route));
        }
        let stem = route.strip_suffix(".html").unwrap_or(route);
        let path = self.dir_of(&format!("{}.md", stem));
        path.is_file().then_some(path)
    }

    fn title_of(&self, path: &Path) -> Result<Option<String>> {
        let source = fs::read_to_string(path)
            .map_err(|e| NoteFlowError::io_error(path.to_path_buf(), e))?;
        Ok(self.processor.metadata(&source).title)
    }
}

fn index_page(dir: &Path) -> Option<PathBuf> {
    INDEX_PAGES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(OsStr::to_str),
        Some("md" | "markdown")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::internal_notes::{
        InternalNotesFilter, SilentObserver,
    };
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        sidebar: Sidebar,
    }

    fn parse(toml_source: &str) -> Sidebar {
        toml::from_str::<Wrapper>(toml_source).unwrap().sidebar
    }

    fn processor() -> MarkdownProcessor {
        MarkdownProcessor::without_rules().with_rule(
            InternalNotesFilter::new().with_observer(Arc::new(SilentObserver)),
        )
    }

    const DECLARATION: &str = r#"
        [sidebar]
        "/" = [
            "",
            "intro",
            { text = "Posts", icon = "book", prefix = "posts/", children = [
                { text = "Kafka", icon = "mdi:apache-kafka", prefix = "kafka/", collapsible = true, children = "structure" },
            ] },
        ]
    "#;

    #[test]
    fn test_declaration_from_toml() {
        let sidebar = parse(DECLARATION);
        let items = sidebar.items("/").unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], SidebarItem::Page(String::new()));
        let SidebarItem::Group(posts) = &items[2] else {
            panic!("expected a group");
        };
        let SidebarChildren::Items(children) = &posts.children else {
            panic!("expected explicit children");
        };
        let SidebarItem::Group(kafka) = &children[0] else {
            panic!("expected a group");
        };
        assert!(kafka.collapsible);
        assert_eq!(
            kafka.children,
            SidebarChildren::Directive(ChildrenDirective::Structure)
        );
        assert_eq!(sidebar.structure_prefixes(), vec!["/posts/kafka/"]);
    }

    #[test]
    fn test_directive_serializes_as_string() {
        let value = serde_json::to_value(parse(DECLARATION)).unwrap();
        assert_eq!(
            value["/"][2]["children"][0]["children"],
            serde_json::json!("structure")
        );
        assert_eq!(value["/"][0], serde_json::json!(""));
    }

    #[test]
    fn test_page_route() {
        assert_eq!(page_route("/", ""), "/");
        assert_eq!(page_route("/", "intro"), "/intro.html");
        assert_eq!(page_route("/posts/", "kafka.md"), "/posts/kafka.html");
        assert_eq!(page_route("/posts/", "docker/"), "/posts/docker/");
        assert_eq!(page_route("/posts/", "README"), "/posts/");
        assert_eq!(page_route("/posts/", "/quickReview"), "/quickReview.html");
    }

    #[test]
    fn test_problems() {
        let sidebar = parse(
            r#"
            [sidebar]
            "posts" = [{ text = "", prefix = "/abs", children = [] }]
            "#,
        );
        let problems = sidebar.problems();
        assert_eq!(problems.len(), 3);
    }

    #[test]
    fn test_resolve_structure() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let kafka = root.join("posts/kafka");
        fs::create_dir_all(kafka.join("internals")).unwrap();
        fs::write(root.join("README.md"), "# Home\n").unwrap();
        fs::write(root.join("intro.md"), "---\ntitle: About me\n---\n").unwrap();
        fs::write(kafka.join("README.md"), "# Kafka\n").unwrap();
        fs::write(kafka.join("b-consumers.md"), "# Consumers\n").unwrap();
        fs::write(kafka.join("a-producers.md"), "no heading\n").unwrap();
        fs::write(kafka.join("notes.txt"), "skip").unwrap();
        fs::write(kafka.join("internals/log.md"), "# Log segments\n").unwrap();

        let resolved = parse(DECLARATION).resolve(root, &processor()).unwrap();
        let links = &resolved["/"];

        assert_eq!(links[0].text, "Home");
        assert_eq!(links[0].link.as_deref(), Some("/"));
        assert_eq!(links[1].text, "About me");
        assert_eq!(links[1].link.as_deref(), Some("/intro.html"));

        let kafka_group = &links[2].children[0];
        assert_eq!(kafka_group.link.as_deref(), Some("/posts/kafka/"));
        let texts: Vec<_> =
            kafka_group.children.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a-producers", "Consumers", "internals"]);
        assert_eq!(
            kafka_group.children[0].link.as_deref(),
            Some("/posts/kafka/a-producers.html")
        );
        let internals = &kafka_group.children[2];
        assert!(internals.collapsible);
        assert!(internals.link.is_none());
        assert_eq!(internals.children[0].text, "Log segments");
        assert_eq!(
            internals.children[0].link.as_deref(),
            Some("/posts/kafka/internals/log.html")
        );
    }

    #[test]
    fn test_internal_note_heading_is_not_a_title() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("notes");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("draft.md"), "# %%internal-notes draft\n").unwrap();

        let sidebar = parse(
            r#"
            [sidebar]
            "/" = [{ text = "Notes", prefix = "notes/", children = "structure" }]
            "#,
        );
        let resolved =
            sidebar.resolve(temp_dir.path(), &processor()).unwrap();
        assert_eq!(resolved["/"][0].children[0].text, "draft");
    }

    #[test]
    fn test_dotted_page_name_finds_its_title() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("notes");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("kafka-v2.5.md"), "# Kafka 2.5\n").unwrap();
        fs::write(dir.join("kafka-v2.md"), "# Kafka 2\n").unwrap();

        let sidebar = parse(
            r#"
            [sidebar]
            "/notes/" = ["kafka-v2.5", "kafka-v2"]
            "#,
        );
        let resolved =
            sidebar.resolve(temp_dir.path(), &processor()).unwrap();

        let pages = &resolved["/notes/"];
        assert_eq!(pages[0].text, "Kafka 2.5");
        assert_eq!(pages[0].link.as_deref(), Some("/notes/kafka-v2.5.html"));
        assert_eq!(pages[1].text, "Kafka 2");
    }

    #[test]
    fn test_missing_structure_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = parse(DECLARATION).resolve(temp_dir.path(), &processor());
        assert!(matches!(
            result,
            Err(NoteFlowError::ConfigError { .. })
        ));
    }
}
