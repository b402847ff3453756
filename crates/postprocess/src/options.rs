//! Postprocessor configuration.

use mdxport_core::parse::Format;
use serde::{Deserialize, Serialize};

/// Options accepted by [`Postprocessor`](crate::Postprocessor).
///
/// Field names follow the camelCase option bag used in configuration files:
///
/// ```
/// use mdxport_postprocess::{IncludeMdast, PostprocessOptions, ProcessedMarkdown};
///
/// let options = PostprocessOptions::from_json(
///     r#"{"includeProcessedMarkdown": true, "includeMDAST": {"removePosition": true}}"#,
/// )
/// .unwrap();
/// assert_eq!(options.include_processed_markdown, ProcessedMarkdown::On { heading_ids: true });
/// assert_eq!(options.include_mdast, IncludeMdast::On { remove_position: true });
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostprocessOptions {
    /// Dialect of the documents being processed.
    #[serde(alias = "_format")]
    pub format: Format,
    /// Names of file values to export, in order.
    pub value_to_export: Vec<String>,
    /// Whether to export the re-serialized markdown as `_markdown`.
    pub include_processed_markdown: ProcessedMarkdown,
    /// Whether to export link destinations as `extractedReferences`.
    pub extract_link_references: bool,
    /// Whether to export the tree as `_mdast`.
    #[serde(rename = "includeMDAST", alias = "includeMdast")]
    pub include_mdast: IncludeMdast,
}

impl PostprocessOptions {
    /// Parses options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// `includeProcessedMarkdown`: `false`, `true` or `{ headingIds }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawProcessedMarkdown", into = "RawProcessedMarkdown")]
pub enum ProcessedMarkdown {
    /// Not exported.
    #[default]
    Off,
    /// Exported as `_markdown`.
    On {
        /// Append `[#id]` to headings that have an id.
        heading_ids: bool,
    },
}

impl ProcessedMarkdown {
    /// Whether the markdown is exported.
    pub fn is_on(self) -> bool {
        matches!(self, Self::On { .. })
    }
}

/// `includeMDAST`: `false`, `true` or `{ removePosition }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawIncludeMdast", into = "RawIncludeMdast")]
pub enum IncludeMdast {
    /// Not exported.
    #[default]
    Off,
    /// Exported as `_mdast`.
    On {
        /// Strip source positions from the exported copy.
        remove_position: bool,
    },
}

impl IncludeMdast {
    /// Whether the tree is exported.
    pub fn is_on(self) -> bool {
        matches!(self, Self::On { .. })
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum RawProcessedMarkdown {
    Flag(bool),
    Options {
        #[serde(rename = "headingIds", default = "default_true")]
        heading_ids: bool,
    },
}

impl From<RawProcessedMarkdown> for ProcessedMarkdown {
    fn from(raw: RawProcessedMarkdown) -> Self {
        match raw {
            RawProcessedMarkdown::Flag(false) => Self::Off,
            RawProcessedMarkdown::Flag(true) => Self::On { heading_ids: true },
            RawProcessedMarkdown::Options { heading_ids } => Self::On { heading_ids },
        }
    }
}

impl From<ProcessedMarkdown> for RawProcessedMarkdown {
    fn from(value: ProcessedMarkdown) -> Self {
        match value {
            ProcessedMarkdown::Off => Self::Flag(false),
            ProcessedMarkdown::On { heading_ids } => Self::Options { heading_ids },
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum RawIncludeMdast {
    Flag(bool),
    Options {
        #[serde(rename = "removePosition", default)]
        remove_position: bool,
    },
}

impl From<RawIncludeMdast> for IncludeMdast {
    fn from(raw: RawIncludeMdast) -> Self {
        match raw {
            RawIncludeMdast::Flag(false) => Self::Off,
            RawIncludeMdast::Flag(true) => Self::On {
                remove_position: false,
            },
            RawIncludeMdast::Options { remove_position } => Self::On { remove_position },
        }
    }
}

impl From<IncludeMdast> for RawIncludeMdast {
    fn from(value: IncludeMdast) -> Self {
        match value {
            IncludeMdast::Off => Self::Flag(false),
            IncludeMdast::On { remove_position } => Self::Options { remove_position },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_off() {
        let options = PostprocessOptions::from_json("{}").unwrap();
        assert_eq!(options, PostprocessOptions::default());
        assert_eq!(options.format, Format::Mdx);
        assert!(!options.include_processed_markdown.is_on());
        assert!(!options.include_mdast.is_on());
    }

    #[test]
    fn object_forms_fill_defaults() {
        let options = PostprocessOptions::from_json(
            r#"{"_format": "md", "includeProcessedMarkdown": {}, "includeMDAST": {}, "valueToExport": ["toc"]}"#,
        )
        .unwrap();
        assert_eq!(options.format, Format::Md);
        assert_eq!(
            options.include_processed_markdown,
            ProcessedMarkdown::On { heading_ids: true }
        );
        assert_eq!(
            options.include_mdast,
            IncludeMdast::On {
                remove_position: false
            }
        );
        assert_eq!(options.value_to_export, ["toc"]);
    }

    #[test]
    fn heading_ids_can_be_disabled() {
        let options = PostprocessOptions::from_json(
            r#"{"includeProcessedMarkdown": {"headingIds": false}, "extractLinkReferences": true}"#,
        )
        .unwrap();
        assert_eq!(
            options.include_processed_markdown,
            ProcessedMarkdown::On { heading_ids: false }
        );
        assert!(options.extract_link_references);
    }

    #[test]
    fn serializes_back_to_camel_case() {
        let options = PostprocessOptions {
            include_mdast: IncludeMdast::On {
                remove_position: true,
            },
            ..Default::default()
        };
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["includeMDAST"]["removePosition"], true);
        assert_eq!(json["includeProcessedMarkdown"], false);
        assert_eq!(json["format"], "mdx");
    }
}
