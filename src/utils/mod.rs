use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn non_token_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}_-]+").expect("static regex"))
}

/// Lower-cases `value` and collapses runs of anything other than letters,
/// digits, `_` and `-` into single dashes. Letters outside ASCII are kept.
/// Returns `None` when nothing is left.
pub fn class_token(value: &str) -> Option<String> {
    let lower = value.trim().to_lowercase();
    let token = non_token_chars().replace_all(&lower, "-");
    let token = token.trim_matches('-');
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Splits a space separated class list, dropping duplicates but keeping
/// first-seen order.
pub fn split_class_list(value: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    value
        .split_whitespace()
        .filter(|c| seen.insert(*c))
        .map(|c| c.to_string())
        .collect()
}

pub fn parse_css_size(value: &str) -> Result<String, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("size is empty".to_string());
    }
    let digits_end = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(digits_end);
    if number.is_empty() || number.parse::<f32>().is_err() {
        return Err(format!("invalid size '{raw}'"));
    }
    match unit {
        "" => Ok(format!("{number}px")),
        "px" | "rem" | "em" | "vh" | "%" => Ok(raw.to_string()),
        _ => Err(format!("unsupported unit '{unit}'")),
    }
}

/// Parses `LABEL=VALUE`, splitting on the first `=`.
pub fn parse_label_value(value: &str) -> Result<(String, String), String> {
    let (label, rest) = value
        .split_once('=')
        .ok_or_else(|| "expected LABEL=VALUE".to_string())?;
    let label = label.trim();
    let rest = rest.trim();
    if label.is_empty() {
        return Err("label is empty".to_string());
    }
    if rest.is_empty() {
        return Err("value is empty".to_string());
    }
    Ok((label.to_string(), rest.to_string()))
}
