//! Heading id assignment and table of contents.

use crate::file::FileData;
use markdown::mdast::{Delete, Emphasis, Link, Node, Strong};
use mdxport_core::flatten::flatten_children;
use mdxport_core::slug::{Slugger, extract_custom_id};
use mdxport_core::tree::start_offset;
use mdxport_core::visit::{Visit, visit_mut};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Heading ids keyed by the heading's start offset in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingIds {
    by_offset: BTreeMap<usize, String>,
}

impl HeadingIds {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `id` for the heading starting at `offset`.
    pub fn insert(&mut self, offset: usize, id: impl Into<String>) {
        self.by_offset.insert(offset, id.into());
    }

    /// Id of the heading starting at `offset`.
    pub fn get(&self, offset: usize) -> Option<&str> {
        self.by_offset.get(&offset).map(String::as_str)
    }

    /// Id recorded for `node`; `None` for nodes without a position.
    pub fn for_node(&self, node: &Node) -> Option<&str> {
        start_offset(node).and_then(|offset| self.get(offset))
    }

    /// Number of recorded ids.
    pub fn len(&self) -> usize {
        self.by_offset.len()
    }

    /// Whether no id is recorded.
    pub fn is_empty(&self) -> bool {
        self.by_offset.is_empty()
    }

}

/// One table of contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading text without the custom id marker.
    pub title: String,
    /// Fragment link, `#id`.
    pub url: String,
    /// Heading depth (1-6).
    pub depth: u8,
}

impl TocEntry {
    fn to_value(&self) -> Value {
        json!({ "title": self.title, "url": self.url, "depth": self.depth })
    }
}

/// Assigns an id to every heading of `tree` and records it in `file`.
///
/// A trailing `[#custom-id]` marker sets the id explicitly and is removed
/// from the heading; other headings get a GitHub-style slug of their text.
/// Headings whose slug is empty get no id. When `generate_toc` is set, the
/// entries are also stored in `file.values["toc"]`.
pub fn assign_heading_ids(tree: &mut Node, file: &mut FileData, generate_toc: bool) -> Vec<TocEntry> {
    let mut slugger = Slugger::new();
    let mut toc = Vec::new();

    visit_mut(tree, &mut |node| {
        let offset = start_offset(node);
        let Node::Heading(heading) = node else {
            return Visit::Continue;
        };

        let custom = strip_custom_id(&mut heading.children);
        let title = flatten_children(&heading.children);
        let id = match custom {
            Some(custom) => {
                slugger.reserve(&custom);
                custom
            }
            None => slugger.next_slug(&title),
        };

        if id.is_empty() {
            return Visit::Skip;
        }
        match offset {
            Some(offset) => file.heading_ids.insert(offset, id.clone()),
            None => log::debug!("heading `{title}` has no position; id `{id}` not recorded"),
        }
        toc.push(TocEntry {
            title,
            url: format!("#{id}"),
            depth: heading.depth,
        });
        Visit::Skip
    });

    if generate_toc {
        let entries = toc.iter().map(TocEntry::to_value).collect();
        file.values.insert("toc".to_string(), Value::Array(entries));
    }
    toc
}

/// Removes a `[#id]` marker from the last text node, looking through a
/// trailing strong, emphasis, link or delete.
fn strip_custom_id(children: &mut Vec<Node>) -> Option<String> {
    let id = match children.last_mut()? {
        Node::Text(last) => {
            let (rest, id) = extract_custom_id(&last.value);
            let id = id?.to_string();
            let rest = rest.to_string();
            last.value = rest;
            id
        }
        Node::Strong(Strong { children: inner, .. })
        | Node::Emphasis(Emphasis { children: inner, .. })
        | Node::Link(Link { children: inner, .. })
        | Node::Delete(Delete { children: inner, .. }) => return strip_custom_id(inner),
        _ => return None,
    };

    if matches!(children.last(), Some(Node::Text(text)) if text.value.is_empty()) {
        children.pop();
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Node {
        markdown::to_mdast(input, &markdown::ParseOptions::gfm()).unwrap()
    }

    #[test]
    fn slugs_deduplicate() {
        let mut tree = parse("# Intro\n\n## Intro\n\n## Hello *World*");
        let mut file = FileData::default();
        let toc = assign_heading_ids(&mut tree, &mut file, false);

        let urls: Vec<_> = toc.iter().map(|entry| entry.url.as_str()).collect();
        assert_eq!(urls, ["#intro", "#intro-1", "#hello-world"]);
        assert_eq!(file.heading_ids.len(), 3);
        assert!(!file.values.contains_key("toc"));
    }

    #[test]
    fn custom_id_is_stripped_from_tree() {
        let mut tree = parse("## Install it [#setup]\n\n## Setup");
        let mut file = FileData::default();
        let toc = assign_heading_ids(&mut tree, &mut file, true);

        assert_eq!(toc[0].title, "Install it");
        assert_eq!(toc[0].url, "#setup");
        assert_eq!(toc[1].url, "#setup-1");

        let heading = &tree.children().unwrap()[0];
        assert_eq!(flatten_children(heading.children().unwrap()), "Install it");
        assert_eq!(file.heading_ids.for_node(heading), Some("setup"));
        assert_eq!(file.values["toc"][0]["url"], "#setup");
        assert_eq!(file.values["toc"][1]["depth"], 2);
    }

    #[test]
    fn empty_slug_gets_no_id() {
        let mut tree = parse("# !!!\n\n# Ok");
        let mut file = FileData::default();
        let toc = assign_heading_ids(&mut tree, &mut file, false);
        assert_eq!(toc.len(), 1);
        assert_eq!(file.heading_ids.len(), 1);
        let headings = tree.children().unwrap();
        assert_eq!(file.heading_ids.for_node(&headings[0]), None);
        assert_eq!(file.heading_ids.for_node(&headings[1]), Some("ok"));
    }

    #[test]
    fn custom_id_inside_trailing_formatting() {
        let mut tree = parse(
            "## **Install it [#setup]**\n\n## Read [the docs [#docs]](/docs)\n\n## `code [#no]`",
        );
        let mut file = FileData::default();
        let toc = assign_heading_ids(&mut tree, &mut file, false);

        let entries: Vec<_> = toc
            .iter()
            .map(|entry| (entry.title.as_str(), entry.url.as_str()))
            .collect();
        assert_eq!(
            entries,
            [
                ("Install it", "#setup"),
                ("Read the docs", "#docs"),
                ("code [#no]", "#code-no"),
            ]
        );

        let Node::Strong(strong) = &tree.children().unwrap()[0].children().unwrap()[0] else {
            panic!("expected the strong node to remain");
        };
        assert_eq!(flatten_children(&strong.children), "Install it");
    }
}
