//! JavaScript expression trees for JSON-compatible values.
//!
//! [`value_to_expression`] turns any `serde_json::Value` into an [`Expression`]
//! and [`Expression::to_source`] prints it back as JavaScript literal syntax.
//! The conversion is deterministic and lossless: evaluating the printed source
//! yields a value equal to the input.

use serde_json::Value;
use unicode_id::UnicodeID;

/// A literal JavaScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// Non-negative number literal, kept as its source text.
    Number(String),
    /// String literal.
    String(String),
    /// Unary minus applied to an expression (negative numbers).
    Negate(Box<Expression>),
    /// Array literal.
    Array(Vec<Expression>),
    /// Object literal.
    Object(Vec<Property>),
}

/// One `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property key.
    pub key: PropertyKey,
    /// Property value.
    pub value: Expression,
}

/// Object literal key.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    /// Bare identifier key (`title: ...`).
    Identifier(String),
    /// Quoted key for names that are not identifiers (`"og:image": ...`).
    Literal(String),
}

/// Converts a JSON-compatible value into a literal expression tree.
///
/// # Examples
///
/// ```
/// use mdxport_postprocess::estree::value_to_expression;
/// use serde_json::json;
///
/// let expr = value_to_expression(&json!({ "og:image": null }));
/// assert_eq!(expr.to_source(), r#"{"og:image": null}"#);
///
/// let expr = value_to_expression(&json!(["Hi", -2, true]));
/// assert_eq!(expr.to_source(), r#"["Hi", -2, true]"#);
/// ```
pub fn value_to_expression(value: &Value) -> Expression {
    match value {
        Value::Null => Expression::Null,
        Value::Bool(b) => Expression::Boolean(*b),
        Value::Number(number) => {
            let text = number.to_string();
            match text.strip_prefix('-') {
                Some(magnitude) => {
                    Expression::Negate(Box::new(Expression::Number(magnitude.to_string())))
                }
                None => Expression::Number(text),
            }
        }
        Value::String(s) => Expression::String(s.clone()),
        Value::Array(items) => Expression::Array(items.iter().map(value_to_expression).collect()),
        Value::Object(map) => Expression::Object(
            map.iter()
                .map(|(key, value)| Property {
                    key: property_key(key),
                    value: value_to_expression(value),
                })
                .collect(),
        ),
    }
}

fn property_key(key: &str) -> PropertyKey {
    // `__proto__: x` would set the prototype instead of defining a property.
    if is_identifier_name(key) && key != "__proto__" {
        PropertyKey::Identifier(key.to_string())
    } else {
        PropertyKey::Literal(key.to_string())
    }
}

impl Expression {
    /// Prints the expression as JavaScript source.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    fn write_source(&self, out: &mut String) {
        match self {
            Expression::Null => out.push_str("null"),
            Expression::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Expression::Number(raw) => out.push_str(raw),
            Expression::String(s) => out.push_str(&js_string_literal(s)),
            Expression::Negate(inner) => {
                out.push('-');
                inner.write_source(out);
            }
            Expression::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_source(out);
                }
                out.push(']');
            }
            Expression::Object(properties) => {
                out.push('{');
                for (i, property) in properties.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    match &property.key {
                        PropertyKey::Identifier(name) => out.push_str(name),
                        PropertyKey::Literal(name) => out.push_str(&js_string_literal(name)),
                    }
                    out.push_str(": ");
                    property.value.write_source(out);
                }
                out.push('}');
            }
        }
    }
}

/// Converts a Rust string to a JavaScript string literal.
///
/// JSON string syntax is valid JavaScript, so serde_json does the escaping.
pub fn js_string_literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Whether `name` is a syntactically valid ECMAScript identifier name
/// (reserved words included).
///
/// Starts with `ID_Start`, `$` or `_`; continues with `ID_Continue`, `$`,
/// ZWNJ or ZWJ. Unicode escapes are not accepted.
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '$' || first == '_' || first.is_id_start() => {}
        _ => return false,
    }
    chars.all(|c| matches!(c, '$' | '\u{200c}' | '\u{200d}') || c.is_id_continue())
}

/// Words that cannot be used as a binding name in module code.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield", "arguments",
    "eval",
];

/// Whether `name` is reserved in strict-mode module code.
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}
