//! The postprocess step: title, references, derived artifacts and exports.

use crate::error::PostprocessError;
use crate::export::{PendingExport, export_node, prepend_exports};
use crate::file::FileData;
use crate::headings::HeadingIds;
use crate::markdown::mdx::mdx_extension;
use crate::markdown::{Extension, Handlers, Render, Rendered, Settings, ToMarkdownOptions, to_markdown};
use crate::options::{IncludeMdast, PostprocessOptions, ProcessedMarkdown};
use crate::references::extract_references;
use markdown::mdast::Node;
use mdxport_core::flatten::flatten;
use mdxport_core::frontmatter::Frontmatter;
use mdxport_core::parse::Format;
use mdxport_core::tree::{node_kind, strip_positions};
use mdxport_core::visit::{Visit, visit};
use serde_json::{Value, json};

/// Runs the postprocess step on parsed documents.
///
/// One instance can process any number of documents, one at a time; `run`
/// takes `&mut self`, so sharing an instance across threads requires one
/// instance per worker.
#[derive(Debug)]
pub struct Postprocessor {
    options: PostprocessOptions,
    settings: Settings,
    extensions: Vec<Extension<'static>>,
    pending: Vec<PendingExport>,
}

impl Postprocessor {
    /// Creates a postprocessor.
    ///
    /// MDX documents get the MDX serializer extension by default, the same
    /// way their parser registers it.
    pub fn new(options: PostprocessOptions) -> Self {
        let extensions = match options.format {
            Format::Mdx => vec![mdx_extension()],
            Format::Md => Vec::new(),
        };
        Self {
            options,
            settings: Settings::default(),
            extensions,
            pending: Vec::new(),
        }
    }

    /// Sets the markdown formatting settings.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the default serializer extensions.
    pub fn with_markdown_extensions(mut self, extensions: Vec<Extension<'static>>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Active options.
    pub fn options(&self) -> &PostprocessOptions {
        &self.options
    }

    /// Number of exports queued and not yet injected. Zero between runs.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Processes one document tree.
    ///
    /// Fills in `file.frontmatter` (deriving `title` from the first depth-1
    /// heading when missing) and prepends the export nodes to the root.
    /// Generated exports come out as `[_mdast, _markdown,
    /// extractedReferences, frontmatter]` (those enabled), preceded by the
    /// `valueToExport` values in reverse request order.
    pub fn run(&mut self, tree: &mut Node, file: &mut FileData) -> Result<(), PostprocessError> {
        if !matches!(tree, Node::Root(_)) {
            return Err(PostprocessError::MalformedTree(format!(
                "expected a root node, found `{}`",
                node_kind(tree)
            )));
        }
        self.pending.clear();

        let frontmatter = file.frontmatter_mut();
        if !has_title(frontmatter) {
            if let Some(title) = first_title(tree) {
                log::trace!("derived title `{title}` from heading");
                frontmatter.insert("title".to_string(), Value::String(title));
            }
        }
        let frontmatter = Value::Object(frontmatter.clone());
        self.pending.push(PendingExport::new("frontmatter", frontmatter));

        if self.options.extract_link_references {
            let references = extract_references(tree, true)
                .into_iter()
                .map(|reference| json!({ "href": reference.href }))
                .collect();
            self.pending
                .push(PendingExport::new("extractedReferences", Value::Array(references)));
        }

        if let ProcessedMarkdown::On { heading_ids } = self.options.include_processed_markdown {
            let ids = heading_ids.then(|| file.heading_ids.clone());
            let markdown = self.processed_markdown(tree, ids)?;
            self.pending
                .push(PendingExport::new("_markdown", Value::String(markdown)));
        }

        if let IncludeMdast::On { remove_position } = self.options.include_mdast {
            let mdast = serialize_tree(tree, remove_position)?;
            self.pending.push(PendingExport::new("_mdast", Value::String(mdast)));
        }

        let mut nodes = Vec::with_capacity(self.pending.len());
        for PendingExport { name, value } in std::mem::take(&mut self.pending) {
            let node = export_node(&name, &value)
                .map_err(|source| PostprocessError::Serialization { name, source })?;
            nodes.push(node);
        }
        nodes.reverse();
        prepend_exports(root_children(tree)?, nodes);

        let mut requested = Vec::new();
        for name in &self.options.value_to_export {
            let Some(value) = file.value(name) else {
                log::debug!("no value named `{name}` to export; skipping");
                continue;
            };
            let node = export_node(name, &value).map_err(|source| PostprocessError::Serialization {
                name: name.clone(),
                source,
            })?;
            requested.push(node);
        }
        requested.reverse();
        prepend_exports(root_children(tree)?, requested);

        Ok(())
    }

    fn processed_markdown(
        &self,
        tree: &Node,
        heading_ids: Option<HeadingIds>,
    ) -> Result<String, PostprocessError> {
        let mut extensions = self.extensions.clone();
        if self.options.format == Format::Md {
            extensions.push(mdx_extension());
        }

        let mut handlers = Handlers::new();
        handlers.insert("heading", move |node: &Node, _: &dyn Render| {
            let content = flatten(node);
            let id = heading_ids.as_ref().and_then(|ids| ids.for_node(node));
            Ok(Rendered::new(match id {
                Some(id) => format!("{content} [#{id}]"),
                None => content,
            }))
        });

        let options = ToMarkdownOptions {
            settings: self.settings.clone(),
            extensions,
            handlers,
        };
        Ok(to_markdown(tree, &options)?.markdown)
    }
}

/// `title` counts as present when it is truthy in the JavaScript sense:
/// missing, `null`, `false`, `0` and `""` titles get replaced.
fn has_title(frontmatter: &Frontmatter) -> bool {
    match frontmatter.get("title") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::Number(number)) => number.as_f64() != Some(0.0),
        Some(Value::String(title)) => !title.is_empty(),
        Some(_) => true,
    }
}

fn first_title(tree: &Node) -> Option<String> {
    let mut title = None;
    visit(tree, &mut |node| match node {
        Node::Heading(heading) if heading.depth == 1 => {
            title = Some(flatten(node));
            Visit::Stop
        }
        _ => Visit::Continue,
    });
    title
}

fn serialize_tree(tree: &Node, remove_position: bool) -> Result<String, PostprocessError> {
    let result = if remove_position {
        let mut copy = tree.clone();
        strip_positions(&mut copy);
        serde_json::to_string(&copy)
    } else {
        serde_json::to_string(tree)
    };
    result.map_err(|err| PostprocessError::MalformedTree(format!("cannot serialize tree: {err}")))
}

fn root_children(tree: &mut Node) -> Result<&mut Vec<Node>, PostprocessError> {
    match tree {
        Node::Root(root) => Ok(&mut root.children),
        other => Err(PostprocessError::MalformedTree(format!(
            "expected a root node, found `{}`",
            node_kind(other)
        ))),
    }
}
