fn is_separator(c: char) -> bool {
    matches!(c, '-' | '_' | '.') || c.is_whitespace()
}

/// `list-view` -> `listView`; separators are dropped and the character
/// following one is upper-cased
pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if is_separator(c) {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Canonical registry key: `ListView`, `list-view` and `listView` all map
/// to `listview`
pub fn normalize_tag_name(name: &str) -> String {
    camelize(name).to_lowercase()
}
