//! Rewrite asset helper calls left in compiled stylesheets into plain `url(...)` values.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};

use crate::asset_paths::{absolutize, should_ignore_asset_reference, split_reference_suffix};
use crate::config::BuildConfig;
use crate::error::AssetPathError;
use crate::models::{AssetKind, AssetReference};
use crate::resolver::AssetPathResolver;

const HELPER_PATTERN: &str = concat!(
    r#"(?P<helper>image-url|font-url|javascript-url|stylesheet-url)\(\s*"#,
    r#"(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^'"\s,)]+))\s*"#,
    r#"(?:,\s*(?P<only>true|false)\s*)?"#,
    r#"(?:,\s*(?P<buster>true|false)\s*)?\)"#,
);

fn helper_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(HELPER_PATTERN).expect("invalid asset helper regex"))
}

/// Replace every asset helper in `css` with the resolved URL.
///
/// `css_file_output_path` is where the stylesheet will be written; relative URLs are computed
/// from its directory. External references are passed through unchanged and any `?query` or
/// `#fragment` suffix is kept. The first unresolvable asset fails the whole stylesheet.
pub fn rewrite_stylesheet(
    config: &BuildConfig,
    css: &str,
    css_file_output_path: &Path,
) -> Result<String, AssetPathError> {
    rewrite_with_count(config, css, css_file_output_path).map(|(text, _)| text)
}

/// Rewrite the stylesheet at `input`, writing the result to `output` (which may be `input`).
///
/// Relative `input` and `output` paths are taken from the current directory, and the same
/// absolute output path is used both for writing and for computing relative URLs.
/// Returns the number of helper calls that were replaced.
pub fn rewrite_stylesheet_file(config: &BuildConfig, input: &Path, output: &Path) -> Result<usize> {
    let cwd = std::env::current_dir().context("failed to determine the current directory")?;
    let input = absolutize(input, &cwd);
    let output = absolutize(output, &cwd);

    let css = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let (text, count) = rewrite_with_count(config, &css, &output)
        .with_context(|| format!("failed to rewrite asset helpers in {}", input.display()))?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&output, text).with_context(|| format!("failed to write {}", output.display()))?;

    log::info!("rewrote {count} asset helper(s) into {}", output.display());
    Ok(count)
}

fn rewrite_with_count(
    config: &BuildConfig,
    css: &str,
    css_file_output_path: &Path,
) -> Result<(String, usize), AssetPathError> {
    let resolver = AssetPathResolver::new(config);
    let mut output = String::with_capacity(css.len());
    let mut last = 0;
    let mut count = 0;

    for captures in helper_pattern().captures_iter(css) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if is_identifier_tail(&css[..whole.start()]) {
            continue;
        }
        output.push_str(&css[last..whole.start()]);
        output.push_str(&render_helper(&resolver, &captures, css_file_output_path)?);
        last = whole.end();
        count += 1;
    }
    output.push_str(&css[last..]);

    Ok((output, count))
}

/// Whether the text before a match ends inside an identifier such as `my-image-url`.
fn is_identifier_tail(preceding: &str) -> bool {
    preceding
        .chars()
        .next_back()
        .is_some_and(|ch| ch.is_alphanumeric() || ch == '_' || ch == '-')
}

fn render_helper(
    resolver: &AssetPathResolver<'_>,
    captures: &Captures<'_>,
    css_file_output_path: &Path,
) -> Result<String, AssetPathError> {
    let kind = AssetKind::from_helper(&captures["helper"]).unwrap_or(AssetKind::Image);
    let value = ["dq", "sq", "bare"]
        .iter()
        .find_map(|name| captures.name(name))
        .map(|m| m.as_str().trim())
        .unwrap_or_default();
    let only_path = captures
        .name("only")
        .is_some_and(|flag| flag.as_str() == "true");
    if let Some(buster) = captures.name("buster") {
        log::debug!(
            "ignoring cache buster `{}` on {}({value})",
            buster.as_str(),
            &captures["helper"]
        );
    }

    let url = if should_ignore_asset_reference(value) {
        value.to_string()
    } else {
        let (path, suffix) = split_reference_suffix(value);
        let reference = AssetReference::scoped(kind, path);
        let resolved = resolver.resolve(&reference, css_file_output_path)?;
        format!("{resolved}{suffix}")
    };

    if only_path {
        Ok(url)
    } else {
        Ok(format!("url('{}')", url.replace('\'', "\\'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn project(relative: bool) -> (TempDir, BuildConfig) {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("static/img")).unwrap();
        fs::create_dir_all(root.join("static/css/fonts")).unwrap();
        fs::write(root.join("static/img/logo.png"), b"png").unwrap();
        fs::write(root.join("static/css/fonts/icons.eot"), b"eot").unwrap();

        let config = BuildConfig::builder()
            .css_output_dir("static/css")
            .source_style_dir("static/sass")
            .images_dir("static/img")
            .scripts_dir("static/js")
            .use_relative_asset_paths(relative)
            .build(root)
            .unwrap();
        (temp, config)
    }

    #[test]
    fn rewrites_helpers_in_relative_mode() {
        let (_temp, config) = project(true);
        let css = r#".logo { background: image-url("logo.png") no-repeat; }
@font-face { src: font-url('icons.eot?#iefix') format('embedded-opentype'); }"#;

        let rewritten = rewrite_stylesheet(&config, css, Path::new("static/css/site.css")).unwrap();
        assert_eq!(
            rewritten,
            r#".logo { background: url('../img/logo.png') no-repeat; }
@font-face { src: url('fonts/icons.eot?#iefix') format('embedded-opentype'); }"#
        );
    }

    #[test]
    fn rewrites_helpers_in_site_mode() {
        let (_temp, config) = project(false);
        let rewritten = rewrite_stylesheet(
            &config,
            ".a { background: image-url(logo.png); }",
            Path::new("static/css/site.css"),
        )
        .unwrap();
        assert_eq!(rewritten, ".a { background: url('/img/logo.png'); }");
    }

    #[test]
    fn only_path_flag_emits_bare_path() {
        let (_temp, config) = project(true);
        let rewritten = rewrite_stylesheet(
            &config,
            "$logo: image-url(\"logo.png\", true);",
            Path::new("static/css/site.css"),
        )
        .unwrap();
        assert_eq!(rewritten, "$logo: ../img/logo.png;");
    }

    #[test]
    fn passes_external_references_through() {
        let (_temp, config) = project(true);
        let css = ".a { background: image-url('https://cdn.example.com/logo.png'); }";
        let rewritten = rewrite_stylesheet(&config, css, Path::new("static/css/site.css")).unwrap();
        assert_eq!(rewritten, ".a { background: url('https://cdn.example.com/logo.png'); }");
    }

    #[test]
    fn leaves_plain_urls_untouched() {
        let (_temp, config) = project(true);
        let css = ".a { background: url(../img/logo.png); }";
        let rewritten = rewrite_stylesheet(&config, css, Path::new("static/css/site.css")).unwrap();
        assert_eq!(rewritten, css);
    }

    #[test]
    fn ignores_helpers_embedded_in_longer_identifiers() {
        let (_temp, config) = project(true);
        let css = ".a { background: my-image-url(logo.png); --x: font_font-url(icons.eot); }";
        let rewritten = rewrite_stylesheet(&config, css, Path::new("static/css/site.css")).unwrap();
        assert_eq!(rewritten, css);
    }

    #[test]
    fn accepts_and_ignores_the_cache_buster_argument() {
        let (_temp, config) = project(true);
        let rewritten = rewrite_stylesheet(
            &config,
            concat!(
                ".a { background: image-url(\"logo.png\", false, false); }\n",
                "$p: image-url('logo.png', true, true);",
            ),
            Path::new("static/css/site.css"),
        )
        .unwrap();
        assert_eq!(
            rewritten,
            ".a { background: url('../img/logo.png'); }\n$p: ../img/logo.png;"
        );
    }

    #[test]
    fn missing_asset_fails_the_stylesheet() {
        let (_temp, config) = project(true);
        let err = rewrite_stylesheet(
            &config,
            ".a { background: image-url('logo.png'); } .b { background: image-url('absent.png'); }",
            Path::new("static/css/site.css"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AssetPathError::AssetNotFound { ref asset, .. } if asset == "absent.png"
        ));
    }

    #[test]
    fn rewrites_files_in_place() {
        let (temp, config) = project(true);
        let css_path = temp.path().join("static/css/site.css");
        fs::write(&css_path, ".a { background: image-url('logo.png'); }").unwrap();

        let count = rewrite_stylesheet_file(&config, &css_path, &css_path).unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            fs::read_to_string(&css_path).unwrap(),
            ".a { background: url('../img/logo.png'); }"
        );
    }
}
