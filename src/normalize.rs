use url::Url;

/// Upper bound on tokens kept per text, bounding pairwise comparison cost.
pub const MAX_TOKENS: usize = 200;

/// Canonical form of a URL used as an exact-match key: origin + path + query,
/// fragment dropped, one trailing slash removed from a non-root path.
///
/// Returns an empty string for unparseable URLs and URLs with an opaque origin
/// (`about:`, `data:`), which are never grouped by URL.
pub fn normalize_url(raw: &str) -> String {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return String::new(),
    };

    let origin = url.origin();
    if !origin.is_tuple() {
        return String::new();
    }

    let path = url.path();
    let path = if path.len() > 1 && path.ends_with('/') {
        &path[..path.len() - 1]
    } else {
        path
    };

    let mut key = origin.ascii_serialization();
    key.push_str(path);
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        key.push('?');
        key.push_str(query);
    }
    key
}

pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase word tokens made of `a-z`, `0-9` and CJK ideographs
/// (U+4E00..=U+9FA5); every other character separates tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if is_token_char(c) { c } else { ' ' })
        .collect();

    cleaned
        .split(' ')
        .filter(|token| !token.is_empty())
        .take(MAX_TOKENS)
        .map(str::to_string)
        .collect()
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Split a normalized URL key into the segments compared for URL similarity.
pub fn path_segments(url_key: &str) -> Vec<&str> {
    url_key
        .split(|c| matches!(c, '/' | '?' | '#' | '&' | '='))
        .filter(|segment| !segment.is_empty())
        .collect()
}
