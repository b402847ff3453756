//! Just enough JavaScript scanning to tell markdown-rs where MDX ESM blocks
//! and `{expressions}` end.
//!
//! Once an expression parser is registered, markdown-rs stops counting braces
//! itself and asks the parser at every `}`. The scanner answers with
//! [`MdxSignal::Eof`] while something is still open, so nested objects,
//! strings and template literals keep the expression going.

use markdown::{MdxExpressionKind, MdxSignal};

const SOURCE: &str = "mdxport";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Open {
    Paren,
    Bracket,
    Brace,
    /// `${` inside a template literal.
    Substitution,
}

impl Open {
    fn closer(self) -> char {
        match self {
            Open::Paren => ')',
            Open::Bracket => ']',
            Open::Brace | Open::Substitution => '}',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Code,
    String(char),
    Template,
    LineComment,
    BlockComment,
}

#[derive(Debug, PartialEq, Eq)]
enum Scan {
    /// Everything that was opened got closed. Holds the byte offset of every
    /// line that starts at the top level.
    Complete(Vec<usize>),
    /// Input ended while a string, comment or bracket was still open.
    Incomplete(String),
    /// Input that can never become valid by appending more text.
    Invalid { offset: usize, reason: String },
}

fn scan(code: &str) -> Scan {
    let mut stack: Vec<Open> = Vec::new();
    let mut mode = Mode::Code;
    let mut lines = vec![0];
    let mut chars = code.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match mode {
            Mode::Code => match c {
                '\'' | '"' => mode = Mode::String(c),
                '`' => mode = Mode::Template,
                '/' if chars.next_if(|&(_, next)| next == '/').is_some() => {
                    mode = Mode::LineComment
                }
                '/' if chars.next_if(|&(_, next)| next == '*').is_some() => {
                    mode = Mode::BlockComment
                }
                '(' => stack.push(Open::Paren),
                '[' => stack.push(Open::Bracket),
                '{' => stack.push(Open::Brace),
                ')' | ']' | '}' => match stack.pop() {
                    Some(Open::Substitution) if c == '}' => mode = Mode::Template,
                    Some(open) if open.closer() == c => {}
                    _ => {
                        return Scan::Invalid {
                            offset,
                            reason: format!("Unexpected closing `{c}`"),
                        };
                    }
                },
                '\n' if stack.is_empty() => lines.push(offset + 1),
                _ => {}
            },
            Mode::String(quote) => match c {
                '\\' => {
                    chars.next();
                }
                // Quoted strings cannot span lines; a stray apostrophe in JSX
                // text inside an export ends at the line ending.
                '\n' => {
                    mode = Mode::Code;
                    if stack.is_empty() {
                        lines.push(offset + 1);
                    }
                }
                _ if c == quote => mode = Mode::Code,
                _ => {}
            },
            Mode::Template => match c {
                '\\' => {
                    chars.next();
                }
                '`' => mode = Mode::Code,
                '$' if chars.next_if(|&(_, next)| next == '{').is_some() => {
                    stack.push(Open::Substitution);
                    mode = Mode::Code;
                }
                _ => {}
            },
            Mode::LineComment => {
                if c == '\n' {
                    mode = Mode::Code;
                    if stack.is_empty() {
                        lines.push(offset + 1);
                    }
                }
            }
            Mode::BlockComment => {
                if c == '*' && chars.next_if(|&(_, next)| next == '/').is_some() {
                    mode = Mode::Code;
                }
            }
        }
    }

    match mode {
        Mode::String(_) => Scan::Incomplete("Unexpected end of file in string literal".into()),
        Mode::Template => Scan::Incomplete("Unexpected end of file in template literal".into()),
        Mode::BlockComment => Scan::Incomplete("Unexpected end of file in comment".into()),
        Mode::Code | Mode::LineComment => match stack.last() {
            Some(open) => Scan::Incomplete(format!(
                "Unexpected end of file, expected a closing `{}`",
                open.closer()
            )),
            None => Scan::Complete(lines),
        },
    }
}

/// Word at the start of a top-level line that is neither `import` nor `export`.
fn stray_statement(value: &str, offset: usize) -> Option<&str> {
    let line = &value[offset..];
    let end = line
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(line.len());
    match &line[..end] {
        "" | "import" | "export" => None,
        word if word.starts_with(|c: char| c.is_ascii_digit()) => None,
        word => Some(word),
    }
}

fn error(reason: impl Into<String>, offset: usize, rule: &str) -> MdxSignal {
    MdxSignal::Error(
        reason.into(),
        offset,
        Box::new(SOURCE.into()),
        Box::new(rule.into()),
    )
}

fn eof(reason: String, rule: &str) -> MdxSignal {
    MdxSignal::Eof(reason, Box::new(SOURCE.into()), Box::new(rule.into()))
}

/// Checks an ESM block: everything it opens must close, and every top-level
/// line that starts a statement must start with `import` or `export`.
pub(crate) fn parse_esm(value: &str) -> MdxSignal {
    match scan(value) {
        Scan::Complete(lines) => {
            let stray = lines
                .into_iter()
                .find_map(|offset| stray_statement(value, offset).map(|word| (offset, word)));
            match stray {
                Some((offset, word)) => error(
                    format!("Unexpected `{word}` in code: only import/exports are supported"),
                    offset,
                    "non-esm",
                ),
                None => MdxSignal::Ok,
            }
        }
        Scan::Incomplete(reason) => eof(reason, "esm"),
        Scan::Invalid { offset, reason } => error(reason, offset, "esm"),
    }
}

/// Checks the code between an expression's braces.
///
/// Attribute expressions (`<a {...b}>`) must be spreads and attribute
/// values (`<a b={c}>`) must not be empty.
pub(crate) fn parse_expression(value: &str, kind: &MdxExpressionKind) -> MdxSignal {
    match scan(value) {
        Scan::Incomplete(reason) => eof(reason, "expression"),
        Scan::Invalid { offset, reason } => error(reason, offset, "expression"),
        Scan::Complete(_) => match kind {
            MdxExpressionKind::AttributeExpression
                if !value.trim_start().starts_with("...") =>
            {
                error(
                    "Unexpected attribute expression, expected a spread such as `{...props}`",
                    0,
                    "attribute-expression",
                )
            }
            MdxExpressionKind::AttributeValueExpression if value.trim().is_empty() => error(
                "Unexpected empty expression, expected a value",
                0,
                "attribute-value-expression",
            ),
            _ => MdxSignal::Ok,
        },
    }
}
