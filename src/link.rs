use crate::config::LinkFieldConfig;
use crate::sheet::{Rgb, TextStyle};
use regex::Regex;
use std::sync::OnceLock;

/// Whether `column` is one of the configured link aliases (case-insensitive,
/// surrounding whitespace ignored).
pub fn is_link_column(column: &str, aliases: &[String]) -> bool {
    let column = column.trim();
    aliases
        .iter()
        .any(|alias| alias.trim().eq_ignore_ascii_case(column))
}

/// Index of the first link column in `schema`.
pub fn find_link_column(schema: &[String], aliases: &[String]) -> Option<usize> {
    schema
        .iter()
        .position(|column| is_link_column(column, aliases))
}

fn escape_formula_text(text: &str) -> String {
    text.replace('"', "\"\"")
}

pub fn hyperlink_formula(url: &str, label: &str) -> String {
    format!(
        "=HYPERLINK(\"{}\", \"{}\")",
        escape_formula_text(url),
        escape_formula_text(label)
    )
}

/// Rewrites a link-column value into a hyperlink formula. Empty values and the
/// sentinel pass through untouched.
pub fn render_link_value(value: &str, config: &LinkFieldConfig) -> Option<String> {
    if value.is_empty() || value == config.sentinel {
        return None;
    }
    Some(hyperlink_formula(value, &config.label))
}

fn hyperlink_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)^=\s*HYPERLINK\s*\(\s*"((?:[^"]|"")*)"\s*(?:[,;]\s*"((?:[^"]|"")*)"\s*)?\)\s*$"#)
            .expect("valid hyperlink pattern")
    })
}

/// A parsed `=HYPERLINK("url", "label")` formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    pub url: String,
    pub label: Option<String>,
}

pub fn parse_hyperlink(formula: &str) -> Option<Hyperlink> {
    let caps = hyperlink_re().captures(formula.trim())?;
    let url = caps.get(1)?.as_str().replace("\"\"", "\"");
    let label = caps.get(2).map(|m| m.as_str().replace("\"\"", "\""));
    Some(Hyperlink { url, label })
}

/// Display text a spreadsheet shows for a hyperlink formula.
pub fn hyperlink_display(formula: &str) -> Option<String> {
    parse_hyperlink(formula).map(|link| link.label.unwrap_or(link.url))
}

pub fn link_style(config: &LinkFieldConfig) -> TextStyle {
    TextStyle {
        foreground: Rgb {
            red: config.color.red,
            green: config.color.green,
            blue: config.color.blue,
        },
        underline: config.underline,
    }
}
