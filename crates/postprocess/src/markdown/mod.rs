//! MDAST to Markdown serialization.
//!
//! # Module Structure
//!
//! - `escape` - Text escaping and fence/tick sizing
//! - `handlers` - Built-in handlers for CommonMark, GFM, frontmatter and math
//! - `mdx` - The MDX extension (ESM, expressions, JSX)
//!
//! Rendering is pure: handlers return a [`Rendered`] value carrying both the
//! text and the imports the text requires, and [`to_markdown`] merges them
//! into a [`MarkdownOutput`].

pub mod escape;
mod handlers;
pub mod mdx;

use markdown::mdast::Node;
use mdxport_core::tree::node_kind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while serializing a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkdownError {
    /// No handler is registered for this node kind.
    #[error("Cannot serialize unknown node `{kind}`")]
    UnknownNode {
        /// mdast type name of the node.
        kind: &'static str,
    },
}

/// Text produced for one node plus the imports it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// Markdown text.
    pub text: String,
    /// Names that must be imported for the text to work, in first-use order.
    pub imports: Vec<String>,
}

impl Rendered {
    /// Text without imports.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            imports: Vec::new(),
        }
    }

    /// Adds a required import, ignoring duplicates.
    pub fn with_import(mut self, name: impl Into<String>) -> Self {
        push_unique(&mut self.imports, name.into());
        self
    }

    /// Moves `other`'s imports into `self` and returns its text.
    pub fn absorb(&mut self, other: Rendered) -> String {
        for import in other.imports {
            push_unique(&mut self.imports, import);
        }
        other.text
    }
}

fn push_unique(imports: &mut Vec<String>, name: String) {
    if !imports.contains(&name) {
        imports.push(name);
    }
}

/// Final serializer output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownOutput {
    /// The serialized document, ending in a single newline when non-empty.
    pub markdown: String,
    /// Imports required by the document, without duplicates.
    pub imports: Vec<String>,
}

/// Serialization entry points available to handlers.
pub trait Render {
    /// Serializes any node, honoring overrides.
    fn node(&self, node: &Node) -> Result<Rendered, MarkdownError>;

    /// Serializes inline children, concatenated.
    fn phrasing(&self, children: &[Node]) -> Result<Rendered, MarkdownError> {
        let mut out = Rendered::default();
        for child in children {
            let rendered = self.node(child)?;
            let text = out.absorb(rendered);
            out.text.push_str(&text);
        }
        Ok(out)
    }

    /// Serializes block children separated by `separator`.
    fn blocks(&self, children: &[Node], separator: &str) -> Result<Rendered, MarkdownError> {
        let mut out = Rendered::default();
        for (i, child) in children.iter().enumerate() {
            let rendered = self.node(child)?;
            let text = out.absorb(rendered);
            if i > 0 {
                out.text.push_str(separator);
            }
            out.text.push_str(&text);
        }
        Ok(out)
    }

    /// Escapes text for the active extensions.
    fn escape(&self, text: &str) -> String;

    /// Formatting settings.
    fn settings(&self) -> &Settings;
}

/// A node handler: renders one node, possibly through the [`Render`] entry points.
pub type Handler<'a> =
    Arc<dyn Fn(&Node, &dyn Render) -> Result<Rendered, MarkdownError> + Send + Sync + 'a>;

/// Handlers keyed by mdast node kind (`"heading"`, `"mdxjsEsm"`, ...).
#[derive(Clone, Default)]
pub struct Handlers<'a> {
    by_kind: HashMap<String, Handler<'a>>,
}

impl<'a> Handlers<'a> {
    /// Empty handler set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`, replacing any previous one.
    pub fn insert<F>(&mut self, kind: impl Into<String>, handler: F)
    where
        F: Fn(&Node, &dyn Render) -> Result<Rendered, MarkdownError> + Send + Sync + 'a,
    {
        self.by_kind.insert(kind.into(), Arc::new(handler));
    }

    /// Adds every handler of `other`; entries in `other` win.
    pub fn extend(&mut self, other: &Handlers<'a>) {
        for (kind, handler) in &other.by_kind {
            self.by_kind.insert(kind.clone(), Arc::clone(handler));
        }
    }

    /// Handler registered for `kind`.
    pub fn get(&self, kind: &str) -> Option<&Handler<'a>> {
        self.by_kind.get(kind)
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

impl std::fmt::Debug for Handlers<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.by_kind.keys().collect();
        kinds.sort();
        f.debug_struct("Handlers").field("kinds", &kinds).finish()
    }
}

/// A named bundle of handlers and extra unsafe characters.
#[derive(Clone, Debug)]
pub struct Extension<'a> {
    /// Extension name, for diagnostics.
    pub name: &'static str,
    /// Handlers contributed by the extension.
    pub handlers: Handlers<'a>,
    /// Characters that must be escaped in text while the extension is active.
    pub unsafe_chars: Vec<char>,
}

/// Formatting settings shared by the built-in handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Marker for unordered list items.
    pub bullet: char,
    /// Delimiter after ordered list numbers (`.` or `)`).
    pub bullet_ordered: char,
    /// Whether ordered list numbers increase per item.
    pub increment_list_marker: bool,
    /// Emphasis marker (`*` or `_`).
    pub emphasis: char,
    /// Strong marker (`*` or `_`).
    pub strong: char,
    /// Code fence character (`` ` `` or `~`).
    pub fence: char,
    /// Thematic break character.
    pub rule: char,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bullet: '*',
            bullet_ordered: '.',
            increment_list_marker: true,
            emphasis: '*',
            strong: '*',
            fence: '`',
            rule: '*',
        }
    }
}

/// Options for [`to_markdown`].
#[derive(Clone, Debug, Default)]
pub struct ToMarkdownOptions<'a> {
    /// Formatting settings.
    pub settings: Settings,
    /// Extensions, in registration order; later extensions win.
    pub extensions: Vec<Extension<'a>>,
    /// Caller overrides; these win over extensions and built-ins.
    pub handlers: Handlers<'a>,
}

struct Serializer<'o, 'a> {
    options: &'o ToMarkdownOptions<'a>,
    unsafe_chars: Vec<char>,
}

impl<'o, 'a> Serializer<'o, 'a> {
    fn new(options: &'o ToMarkdownOptions<'a>) -> Self {
        let mut unsafe_chars = Vec::new();
        for extension in &options.extensions {
            for &c in &extension.unsafe_chars {
                if !unsafe_chars.contains(&c) {
                    unsafe_chars.push(c);
                }
            }
        }
        Self {
            options,
            unsafe_chars,
        }
    }

    fn lookup(&self, kind: &str) -> Option<&Handler<'a>> {
        self.options.handlers.get(kind).or_else(|| {
            self.options
                .extensions
                .iter()
                .rev()
                .find_map(|extension| extension.handlers.get(kind))
        })
    }
}

impl Render for Serializer<'_, '_> {
    fn node(&self, node: &Node) -> Result<Rendered, MarkdownError> {
        match self.lookup(node_kind(node)) {
            Some(handler) => (**handler)(node, self),
            None => handlers::render_builtin(node, self),
        }
    }

    fn escape(&self, text: &str) -> String {
        escape::escape_text(text, &self.unsafe_chars)
    }

    fn settings(&self) -> &Settings {
        &self.options.settings
    }
}

/// Serializes `tree` to Markdown.
///
/// # Examples
///
/// ```
/// use mdxport_postprocess::markdown::{ToMarkdownOptions, to_markdown};
///
/// let tree = markdown::to_mdast("# Hi\n\nSome *text*.", &Default::default()).unwrap();
/// let output = to_markdown(&tree, &ToMarkdownOptions::default()).unwrap();
/// assert_eq!(output.markdown, "# Hi\n\nSome *text*.\n");
/// ```
pub fn to_markdown(
    tree: &Node,
    options: &ToMarkdownOptions<'_>,
) -> Result<MarkdownOutput, MarkdownError> {
    let serializer = Serializer::new(options);
    let rendered = serializer.node(tree)?;

    let mut markdown = rendered.text.trim_end_matches('\n').to_string();
    if !markdown.is_empty() {
        markdown.push('\n');
    }
    Ok(MarkdownOutput {
        markdown,
        imports: rendered.imports,
    })
}

/// Prefixes every line of `text`; the first line gets `first`, others `rest`.
///
/// Blank lines get the prefix with trailing whitespace removed.
pub(crate) fn indent_lines(text: &str, first: &str, rest: &str) -> String {
    let mut out = String::with_capacity(text.len() + rest.len() * 4);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let prefix = if i == 0 { first } else { rest };
        if line.is_empty() {
            out.push_str(prefix.trim_end());
        } else {
            out.push_str(prefix);
            out.push_str(line);
        }
    }
    out
}
