/// Join the site-absolute URL base with an asset path relative to the site root.
///
/// The generated URL always uses forward slashes and exactly one separator at the join, so
/// that `http_root` is a literal prefix of the result for both `/` and `/static/` style bases.
pub fn join_http_path(http_root: &str, relative_path: &str) -> String {
    let relative_path = relative_path.replace('\\', "/");
    format!(
        "{}/{}",
        http_root.trim_end_matches('/'),
        relative_path.trim_start_matches('/')
    )
}
