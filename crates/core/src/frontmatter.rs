//! Frontmatter loading from the parsed tree.

use markdown::mdast::Node;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Frontmatter record: string keys to arbitrary JSON-compatible values.
pub type Frontmatter = Map<String, JsonValue>;

/// Errors emitted while parsing frontmatter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// YAML or TOML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level node was not a mapping.
    #[error("Frontmatter must be a mapping at the top level")]
    InvalidRootType,
}

/// Reads the frontmatter block the parser produced for `root`.
///
/// Only a `yaml` or `toml` node that is a direct child of the root counts.
/// Returns `Ok(None)` when the document has no frontmatter block.
///
/// # Examples
///
/// ```
/// use mdxport_core::frontmatter::frontmatter_from_tree;
///
/// let options = markdown::ParseOptions {
///     constructs: markdown::Constructs { frontmatter: true, ..Default::default() },
///     ..Default::default()
/// };
/// let tree = markdown::to_mdast("---\ntitle: Hi\n---\n\n# Body", &options).unwrap();
/// let frontmatter = frontmatter_from_tree(&tree).unwrap().unwrap();
/// assert_eq!(frontmatter["title"], "Hi");
/// ```
pub fn frontmatter_from_tree(root: &Node) -> Result<Option<Frontmatter>, FrontmatterError> {
    let Some(children) = root.children() else {
        return Ok(None);
    };

    for child in children {
        match child {
            Node::Yaml(yaml) => return parse_yaml_block(&yaml.value).map(Some),
            Node::Toml(toml) => return parse_toml_block(&toml.value).map(Some),
            _ => {}
        }
    }
    Ok(None)
}

/// Parses a YAML frontmatter body (without fences) into a record.
pub fn parse_yaml_block(block: &str) -> Result<Frontmatter, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Frontmatter::new());
    }

    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    into_record(json_value)
}

/// Parses a TOML frontmatter body (without fences) into a record.
pub fn parse_toml_block(block: &str) -> Result<Frontmatter, FrontmatterError> {
    let table: toml::Table =
        toml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    let json_value =
        serde_json::to_value(table).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    into_record(json_value)
}

fn into_record(value: JsonValue) -> Result<Frontmatter, FrontmatterError> {
    match value {
        JsonValue::Null => Ok(Frontmatter::new()),
        JsonValue::Object(map) => Ok(map),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(input: &str) -> Node {
        let options = markdown::ParseOptions {
            constructs: markdown::Constructs {
                frontmatter: true,
                ..Default::default()
            },
            ..Default::default()
        };
        markdown::to_mdast(input, &options).expect("markdown should parse")
    }

    #[test]
    fn returns_none_without_frontmatter() {
        assert!(frontmatter_from_tree(&tree("# Title\nBody")).unwrap().is_none());
    }

    #[test]
    fn parses_yaml_node() {
        let frontmatter = frontmatter_from_tree(&tree(
            "---\ntitle: Example\ntags:\n  - rust\n  - astro\n---\n# Content",
        ))
        .unwrap()
        .unwrap();
        assert_eq!(frontmatter["title"], "Example");
        assert_eq!(frontmatter["tags"], serde_json::json!(["rust", "astro"]));
    }

    #[test]
    fn parses_toml_node() {
        let frontmatter = frontmatter_from_tree(&tree("+++\ntitle = \"Toml\"\ndraft = true\n+++\n"))
            .unwrap()
            .unwrap();
        assert_eq!(frontmatter["title"], "Toml");
        assert_eq!(frontmatter["draft"], true);
    }

    #[test]
    fn empty_block_is_empty_record() {
        assert_eq!(parse_yaml_block("  \n").unwrap(), Frontmatter::new());
        assert_eq!(parse_yaml_block("~").unwrap(), Frontmatter::new());
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let err = parse_yaml_block("invalid: [unterminated").unwrap_err();
        assert!(matches!(err, FrontmatterError::Parse(_)), "{err:?}");
    }

    #[test]
    fn errors_on_non_mapping_root() {
        let err = parse_yaml_block("- a\n- b").unwrap_err();
        assert!(matches!(err, FrontmatterError::InvalidRootType));
    }
}
