//! Key, label and path conversions used to build selectors

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());
static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

fn words(key: &str) -> Vec<String> {
    let spaced = WORD_BOUNDARY.replace_all(key, "$1 $2");
    spaced
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-' || c == '.')
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

fn upcase_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `fieldA` -> `Field A`, `first_name` -> `First Name`
pub fn titlecase(key: &str) -> String {
    words(key)
        .iter()
        .map(|w| upcase_first(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human label of a list or section key, as rendered in the navbar
pub fn key_to_label(key: &str) -> String {
    titlecase(key)
}

pub fn slug(value: &str) -> String {
    let lower = value.to_lowercase();
    NON_SLUG
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Naive english plural of the final word
pub fn plural(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.ends_with('s') {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last().map(|c| c.to_ascii_lowercase());
        if !matches!(before, Some('a' | 'e' | 'i' | 'o' | 'u') | None) {
            return format!("{stem}ies");
        }
    }
    if lower.ends_with('x') || lower.ends_with('z') || lower.ends_with("ch") || lower.ends_with("sh") {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// URL path segment of a list key (`OtherList` -> `other-lists` when plural)
pub fn key_to_path(key: &str, plural_form: bool) -> String {
    let path = slug(&key_to_label(key));
    if !plural_form {
        return path;
    }
    match path.rsplit_once('-') {
        Some((head, last)) => format!("{}-{}", head, plural(last)),
        None => plural(&path),
    }
}
