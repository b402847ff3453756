//! Markdown escaping helpers for the serializer.

/// Escapes characters in `text` that would otherwise be read as markup.
///
/// Always escaped: `\`, `*`, `` ` ``, `[`, `]`, `<`, and any char in `extra`.
/// Context dependent: `_` outside words, `~` next to another `~`, and block
/// markers (`#`, `>`, `-`/`+` bullets, `1.` ordinals) at the start of a line.
/// The start of `text` counts as a line start.
///
/// # Examples
///
/// ```
/// use mdxport_postprocess::markdown::escape::escape_text;
///
/// assert_eq!(escape_text("*bold* snake_case", &[]), "\\*bold\\* snake_case");
/// assert_eq!(escape_text("# not a heading", &[]), "\\# not a heading");
/// assert_eq!(escape_text("{expr}", &['{']), "\\{expr}");
/// ```
pub fn escape_text(text: &str, extra: &[char]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut at_line_start = true;

    for (i, &c) in chars.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();

        let escape = match c {
            '\\' | '*' | '`' | '[' | ']' | '<' => true,
            '_' => !(is_word(prev) && is_word(next)),
            '~' => prev == Some('~') || next == Some('~'),
            '#' | '>' => at_line_start,
            '-' | '+' => at_line_start && matches!(next, None | Some(' ') | Some('\t')),
            '.' | ')' => {
                is_ordinal_marker(&chars, i) && matches!(next, None | Some(' ') | Some('\t'))
            }
            _ => extra.contains(&c),
        };

        if escape {
            out.push('\\');
        }
        out.push(c);

        if c == '\n' {
            at_line_start = true;
        } else if !(at_line_start && (c == ' ' || c == '\t')) {
            at_line_start = false;
        }
    }

    out
}

fn is_word(c: Option<char>) -> bool {
    c.is_some_and(char::is_alphanumeric)
}

/// Whether `chars[i]` closes a run of digits that starts a line.
fn is_ordinal_marker(chars: &[char], i: usize) -> bool {
    let mut start = i;
    while start > 0 && chars[start - 1].is_ascii_digit() {
        start -= 1;
    }
    if start == i {
        return false;
    }
    let mut line_start = start;
    while line_start > 0 && matches!(chars[line_start - 1], ' ' | '\t') {
        line_start -= 1;
    }
    line_start == 0 || chars[line_start - 1] == '\n'
}

/// Smallest fence length (at least 3) longer than any run of `fence_char`
/// inside `content`.
pub fn fence_length(content: &str, fence_char: char) -> usize {
    longest_run(content, fence_char).max(2) + 1
}

/// Smallest number of backticks that does not occur as a run in `content`.
pub fn inline_code_ticks(content: &str) -> usize {
    let mut ticks = 1;
    while has_exact_run(content, '`', ticks) {
        ticks += 1;
    }
    ticks
}

fn longest_run(content: &str, target: char) -> usize {
    let mut max_run = 0;
    let mut current = 0;
    for c in content.chars() {
        if c == target {
            current += 1;
            max_run = max_run.max(current);
        } else {
            current = 0;
        }
    }
    max_run
}

fn has_exact_run(content: &str, target: char, len: usize) -> bool {
    let mut current = 0;
    for c in content.chars() {
        if c == target {
            current += 1;
        } else {
            if current == len {
                return true;
            }
            current = 0;
        }
    }
    current == len
}

/// Formats a link or image destination, wrapping it in `<>` when needed.
pub fn destination(url: &str) -> String {
    let needs_angle = url.is_empty()
        || url
            .chars()
            .any(|c| c.is_whitespace() || c == '(' || c == ')' || c.is_control());
    if needs_angle {
        format!("<{}>", url.replace('<', "\\<").replace('>', "\\>"))
    } else {
        url.to_string()
    }
}

/// Formats an optional link title as ` "title"`.
pub fn title_suffix(title: Option<&str>) -> String {
    match title {
        Some(title) => format!(" \"{}\"", title.replace('\\', "\\\\").replace('"', "\\\"")),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_always_unsafe_characters() {
        assert_eq!(escape_text("a\\b", &[]), "a\\\\b");
        assert_eq!(escape_text("[link]", &[]), "\\[link\\]");
        assert_eq!(escape_text("`code`", &[]), "\\`code\\`");
        assert_eq!(escape_text("<tag>", &[]), "\\<tag>");
    }

    #[test]
    fn underscores_inside_words_are_kept() {
        assert_eq!(escape_text("snake_case", &[]), "snake_case");
        assert_eq!(escape_text("_lead", &[]), "\\_lead");
        assert_eq!(escape_text("trail_", &[]), "trail\\_");
    }

    #[test]
    fn line_start_markers() {
        assert_eq!(escape_text("line\n# heading", &[]), "line\n\\# heading");
        assert_eq!(escape_text("not # heading", &[]), "not # heading");
        assert_eq!(escape_text("- item", &[]), "\\- item");
        assert_eq!(escape_text("a - b", &[]), "a - b");
        assert_eq!(escape_text("> quote", &[]), "\\> quote");
        assert_eq!(escape_text("1. first", &[]), "1\\. first");
        assert_eq!(escape_text("version 1. ok", &[]), "version 1. ok");
        assert_eq!(escape_text("~~strike~~ a~b", &[]), "\\~\\~strike\\~\\~ a~b");
    }

    #[test]
    fn fence_lengths() {
        assert_eq!(fence_length("let x = 1;", '`'), 3);
        assert_eq!(fence_length("```rust\ncode\n```", '`'), 4);
        assert_eq!(fence_length("~~~~", '~'), 5);
    }

    #[test]
    fn inline_code_tick_counts() {
        assert_eq!(inline_code_ticks("code"), 1);
        assert_eq!(inline_code_ticks("a ` b"), 2);
        assert_eq!(inline_code_ticks("a `` b"), 1);
        assert_eq!(inline_code_ticks("` and ``"), 3);
    }

    #[test]
    fn destinations_and_titles() {
        assert_eq!(destination("/docs"), "/docs");
        assert_eq!(destination("a b"), "<a b>");
        assert_eq!(destination(""), "<>");
        assert_eq!(title_suffix(Some("say \"hi\"")), " \"say \\\"hi\\\"\"");
        assert_eq!(title_suffix(None), "");
    }
}
