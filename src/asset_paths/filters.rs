use regex::Regex;

fn asset_reference_ignores() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://").expect("invalid scheme regex"),
                Regex::new(r"^//").expect("invalid protocol-relative regex"),
                Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
                Regex::new(r"(?i)^mailto:").expect("invalid mailto regex"),
            ]
        })
        .as_slice()
}

/// Determine whether a stylesheet asset reference points outside the local asset tree.
///
/// External URLs, protocol-relative URLs and data URIs are emitted verbatim, since there is
/// no file on disk to resolve them against.
pub fn should_ignore_asset_reference(value: &str) -> bool {
    let value = value.trim();
    asset_reference_ignores()
        .iter()
        .any(|pattern| pattern.is_match(value))
}

/// Split a reference into its path and any `?query` or `#fragment` suffix.
///
/// Font stacks commonly carry suffixes such as `font.eot?#iefix`; only the path part names a
/// file, while the suffix has to survive into the emitted URL unchanged.
pub fn split_reference_suffix(value: &str) -> (&str, &str) {
    match value.find(['?', '#']) {
        Some(index) => value.split_at(index),
        None => (value, ""),
    }
}
