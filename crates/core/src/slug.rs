use std::collections::HashMap;

/// Splits a trailing `[#custom-id]` marker off heading text.
///
/// The id may contain ASCII alphanumerics, hyphens and underscores. Returns
/// the text before the marker (trailing whitespace removed) and the id, or the
/// original text and `None` when there is no marker.
///
/// # Examples
///
/// ```
/// use mdxport_core::slug::extract_custom_id;
///
/// assert_eq!(extract_custom_id("Install [#setup]"), ("Install", Some("setup")));
/// assert_eq!(extract_custom_id("Plain heading"), ("Plain heading", None));
/// ```
pub fn extract_custom_id(text: &str) -> (&str, Option<&str>) {
    let trimmed = text.trim_end();
    let Some(without_close) = trimmed.strip_suffix(']') else {
        return (text, None);
    };
    let Some(open) = without_close.rfind("[#") else {
        return (text, None);
    };

    let id = &without_close[open + 2..];
    if id.is_empty()
        || !id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return (text, None);
    }

    (trimmed[..open].trim_end(), Some(id))
}

/// Github-slugger compatible slug generator.
///
/// Repeated slugs get `-1`, `-2`, ... suffixes in the order they are requested.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    /// Creates a new slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates the next unique slug for the given heading text.
    pub fn next_slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();
        while self.occurrences.contains_key(&slug) {
            let seen = self.occurrences.entry(base.clone()).or_insert(0);
            *seen += 1;
            slug = format!("{base}-{seen}");
        }
        self.occurrences.insert(slug.clone(), 0);
        slug
    }

    /// Reserves a slug so future generated slugs won't collide with it.
    pub fn reserve(&mut self, slug: &str) {
        self.occurrences.entry(slug.to_string()).or_insert(0);
    }
}

/// Lowercases `text`, drops punctuation and replaces spaces with hyphens.
///
/// Letters, digits, combining marks, `-` and `_` are kept, so non-Latin
/// headings keep their characters.
///
/// # Examples
///
/// ```
/// use mdxport_core::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("API_v2 -- notes"), "api_v2----notes");
/// assert_eq!(slugify("Über Café"), "über-café");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        if ch == ' ' {
            slug.push('-');
        } else if ch.is_alphanumeric() || ch == '-' || ch == '_' || is_combining_mark(ch) {
            slug.extend(ch.to_lowercase());
        }
    }
    slug
}

fn is_combining_mark(ch: char) -> bool {
    matches!(
        ch as u32,
        0x0300..=0x036F
            | 0x0483..=0x0489
            | 0x0591..=0x05BD
            | 0x0610..=0x061A
            | 0x064B..=0x065F
            | 0x0900..=0x0903
            | 0x093A..=0x094F
            | 0x0E31
            | 0x0E34..=0x0E3A
            | 0x0E47..=0x0E4E
            | 0x1AB0..=0x1AFF
            | 0x1DC0..=0x1DFF
            | 0x20D0..=0x20FF
            | 0xFE20..=0xFE2F
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_get_numeric_suffixes() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.next_slug("Intro"), "intro");
        assert_eq!(slugger.next_slug("Intro"), "intro-1");
        assert_eq!(slugger.next_slug("Intro"), "intro-2");
        assert_eq!(slugger.next_slug("intro-1"), "intro-1-1");
    }

    #[test]
    fn reserved_slugs_are_not_reused() {
        let mut slugger = Slugger::new();
        slugger.reserve("setup");
        assert_eq!(slugger.next_slug("Setup"), "setup-1");
        assert_eq!(Slugger::new().next_slug("Setup"), "setup");
    }

    #[test]
    fn custom_id_requires_valid_characters() {
        assert_eq!(extract_custom_id("Title [#a b]"), ("Title [#a b]", None));
        assert_eq!(extract_custom_id("Title [#]"), ("Title [#]", None));
        assert_eq!(extract_custom_id("Title [#my_id-2]  "), ("Title", Some("my_id-2")));
    }

    #[test]
    fn keeps_devanagari_marks() {
        assert_eq!(slugify("नमस्ते"), "नमस्ते");
    }
}
