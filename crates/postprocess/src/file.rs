//! Per-file data shared by the processing steps.

use crate::headings::HeadingIds;
use mdxport_core::frontmatter::Frontmatter;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Data attached to one document while it is processed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileData {
    /// Source path, when the document came from a file.
    pub path: Option<PathBuf>,
    /// Frontmatter record; filled in by the postprocessor when absent.
    pub frontmatter: Option<Frontmatter>,
    /// Named values (such as `toc`) that can be exported by name.
    pub values: BTreeMap<String, Value>,
    /// Heading ids keyed by source offset.
    pub heading_ids: HeadingIds,
}

impl FileData {
    /// Empty file data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frontmatter record, created empty when missing.
    pub fn frontmatter_mut(&mut self) -> &mut Frontmatter {
        self.frontmatter.get_or_insert_with(Frontmatter::new)
    }

    /// Stores a named value, replacing any previous one.
    pub fn set_value(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Value stored under `name`; `frontmatter` names the frontmatter record.
    pub fn value(&self, name: &str) -> Option<Value> {
        match name {
            "frontmatter" => self.frontmatter.clone().map(Value::Object),
            _ => self.values.get(name).cloned(),
        }
    }
}
