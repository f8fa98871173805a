//! Reader for flat `key = value` settings files such as a classic `config.rb`.
//!
//! Only the subset needed for layout settings is understood: one assignment per line,
//! quoted strings, booleans, `nil`, symbols and bare words. `#` starts a comment outside of
//! quotes and `require` lines are skipped.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

/// A line that is neither blank, a comment, a `require` nor an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct SettingsError {
    /// One-based line number.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

fn assignment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+)$").expect("invalid assignment regex")
    })
}

/// Parse settings text into a JSON object keyed by setting name.
///
/// Later assignments to the same key win, matching how the file is evaluated.
pub fn parse_settings(text: &str) -> Result<Map<String, Value>, SettingsError> {
    let mut values = Map::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("require ") || line.starts_with("require(") {
            log::debug!("skipping `{line}` on line {line_number}");
            continue;
        }

        let captures = assignment_pattern()
            .captures(line)
            .ok_or_else(|| SettingsError {
                line: line_number,
                message: format!("expected `key = value`, found `{line}`"),
            })?;

        let key = captures[1].to_string();
        let value = parse_value(captures[2].trim()).map_err(|message| SettingsError {
            line: line_number,
            message,
        })?;
        log::trace!("setting {key} = {value}");
        values.insert(key, value);
    }

    Ok(values)
}

fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '#') => return &line[..index],
            _ => {}
        }
    }

    line
}

fn parse_value(raw: &str) -> Result<Value, String> {
    if let Some(inner) = quoted(raw, '"') {
        return Ok(Value::String(unescape(inner)));
    }
    if let Some(inner) = quoted(raw, '\'') {
        return Ok(Value::String(unescape(inner)));
    }

    match raw {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "nil" => return Ok(Value::Null),
        _ => {}
    }

    if raw.starts_with(['"', '\'']) {
        return Err(format!("unterminated string `{raw}`"));
    }

    let word = raw.strip_prefix(':').unwrap_or(raw);
    if word.is_empty() || word.chars().any(char::is_whitespace) {
        return Err(format!("unsupported value `{raw}`"));
    }
    Ok(Value::String(word.to_string()))
}

fn quoted(raw: &str, quote: char) -> Option<&str> {
    raw.strip_prefix(quote)?.strip_suffix(quote)
}

fn unescape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                result.push(next);
            }
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strings_booleans_and_comments() {
        let values = parse_settings(
            r#"
# Set this to the root of your project when deployed:
http_path = "/"
css_dir = 'kharcha/static/css' # trailing comment
line_comments = false
relative_assets = true
"#,
        )
        .unwrap();

        assert_eq!(values["http_path"], Value::String("/".into()));
        assert_eq!(values["css_dir"], Value::String("kharcha/static/css".into()));
        assert_eq!(values["line_comments"], Value::Bool(false));
        assert_eq!(values["relative_assets"], Value::Bool(true));
    }

    #[test]
    fn keeps_hashes_inside_quotes() {
        let values = parse_settings(r#"images_dir = "assets/#img""#).unwrap();
        assert_eq!(values["images_dir"], Value::String("assets/#img".into()));
    }

    #[test]
    fn accepts_symbols_nil_and_require_lines() {
        let values =
            parse_settings("require 'susy'\noutput_style = :expanded\nfonts_dir = nil\n").unwrap();
        assert_eq!(values["output_style"], Value::String("expanded".into()));
        assert_eq!(values["fonts_dir"], Value::Null);
    }

    #[test]
    fn later_assignments_win() {
        let values = parse_settings("relative_assets = false\nrelative_assets = true\n").unwrap();
        assert_eq!(values["relative_assets"], Value::Bool(true));
    }

    #[test]
    fn reports_line_numbers_for_malformed_lines() {
        let err = parse_settings("http_path = \"/\"\n\ncss_dir \"css\"\n").unwrap_err();
        assert_eq!(err.line, 3);

        let err = parse_settings("css_dir = \"css\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("unterminated"));
    }
}
