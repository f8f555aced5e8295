//! Form field validators and normalizers.
//!
//! Product and user forms are checked with these before anything is sent to
//! the backend. Validators answer `bool`; normalizers always return a value.

use url::Url;

/// Whether a text value carries any content after trimming.
#[must_use]
pub fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Whether the trimmed value has between `min` and `max` characters.
#[must_use]
pub fn has_length_between(value: Option<&str>, min: usize, max: usize) -> bool {
    value.is_some_and(|v| {
        let len = v.trim().chars().count();
        (min..=max).contains(&len)
    })
}

/// Whether the value is a plausible person name (2-100 letters, spaces,
/// apostrophes and backticks; Latin accented letters allowed).
#[must_use]
pub fn is_valid_name(value: Option<&str>) -> bool {
    if !has_length_between(value, 2, 100) {
        return false;
    }
    value.is_some_and(|v| {
        v.trim()
            .chars()
            .all(|c| c.is_alphabetic() || c == ' ' || c == '\'' || c == '`')
    })
}

/// Whether the value is a lowercase, dash-separated slug (`caneca-azul-2`).
#[must_use]
pub fn is_valid_slug(value: Option<&str>) -> bool {
    let Some(v) = value.map(str::trim) else {
        return false;
    };
    !v.is_empty()
        && v.split('-').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

/// Whether the value parses as an absolute URL with a host.
#[must_use]
pub fn is_valid_url(value: Option<&str>) -> bool {
    value
        .and_then(|v| Url::parse(v.trim()).ok())
        .is_some_and(|url| url.has_host())
}

/// Trim and collapse internal runs of whitespace into single spaces.
#[must_use]
pub fn trim_and_collapse(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build a URL slug from free text, folding Latin accents to ASCII.
///
/// ```
/// use trinket_store_core::fields::to_slug;
///
/// assert_eq!(to_slug("  Caneca Ação  Azul! "), "caneca-acao-azul");
/// ```
#[must_use]
pub fn to_slug(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars().flat_map(char::to_lowercase).map(fold_accent) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}
