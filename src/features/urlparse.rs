//! Permissive URL decomposition: `scheme://netloc/path;params?query#fragment`.
//!
//! Never rejects input except for an unbalanced IPv6 bracket in the netloc;
//! every component that cannot be found is left empty.

use std::collections::BTreeMap;
use url::form_urlencoded;

/// Schemes whose last path segment may carry `;params`.
const PARAM_SCHEMES: &[&str] = &[
    "", "ftp", "hdl", "prospero", "http", "imap", "https", "shttp", "rtsp", "rtsps", "rtspu",
    "sip", "sips", "mms", "sftp", "tel",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: String,
    pub netloc: String,
    pub path: String,
    pub params: String,
    pub query: String,
    pub fragment: String,
}

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}

/// Split a URL into its six components. The only failure is an unbalanced
/// `[`/`]` in the netloc.
pub fn split_url(raw: &str) -> Result<UrlParts, String> {
    let cleaned: String = raw
        .trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
        .collect();

    let mut parts = UrlParts::default();
    let mut rest = cleaned.as_str();

    if let Some(i) = rest.find(':') {
        let candidate = &rest[..i];
        let starts_alpha = candidate.chars().next().map_or(false, |c| c.is_ascii_alphabetic());
        if starts_alpha && candidate.chars().all(is_scheme_char) {
            parts.scheme = candidate.to_ascii_lowercase();
            rest = &rest[i + 1..];
        }
    }

    if let Some(after) = rest.strip_prefix("//") {
        let end = after.find(|c: char| matches!(c, '/' | '?' | '#')).unwrap_or(after.len());
        let netloc = &after[..end];
        if netloc.contains('[') != netloc.contains(']') {
            return Err("Invalid IPv6 URL".to_string());
        }
        parts.netloc = netloc.to_string();
        rest = &after[end..];
    }

    if let Some((head, fragment)) = rest.split_once('#') {
        parts.fragment = fragment.to_string();
        rest = head;
    }
    if let Some((head, query)) = rest.split_once('?') {
        parts.query = query.to_string();
        rest = head;
    }

    if PARAM_SCHEMES.contains(&parts.scheme.as_str()) && rest.contains(';') {
        let (path, params) = split_params(rest);
        parts.path = path.to_string();
        parts.params = params.to_string();
    } else {
        parts.path = rest.to_string();
    }

    Ok(parts)
}

/// `;params` belong to the last path segment only.
fn split_params(path: &str) -> (&str, &str) {
    let search_from = path.rfind('/').unwrap_or(0);
    match path[search_from..].find(';') {
        Some(offset) => {
            let i = search_from + offset;
            (&path[..i], &path[i + 1..])
        }
        None => (path, ""),
    }
}

/// Query string as key → values. Pairs with no `=` or an empty value are
/// dropped; keys and values are `+`/percent decoded.
pub fn parse_query(query: &str) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        out.entry(key.into_owned()).or_default().push(value.into_owned());
    }
    out
}
