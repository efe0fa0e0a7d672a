//! Highlight rules and path-scoped configurations
//!
//! Configurations are read from a JSON document holding a single top-level
//! key, `"tracesReader.configurations"`, which maps to a list of:
//!
//! ```json
//! {
//!   "lineReg": "^(\\S+) (\\S+) \\[(\\w+)\\] (\\w+)",
//!   "paths": ["*.log", "traces/**"],
//!   "rules": [
//!     { "patterns": ["ERROR", "FATAL"], "color": "BrightRed", "bold": true },
//!     { "patterns": ["deprecated"], "strikeThrough": true, "matchCase": true }
//!   ]
//! }
//! ```
//!
//! Loading is lenient. A value of the wrong JSON type is treated as absent,
//! non-string entries of string lists are dropped, and unknown color names
//! mean "no color".

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::style::{Color, DecorationStyle, FontStyle, FontWeight, TextDecoration};
use crate::error::Result;
use crate::glob;

/// Top-level key of the configuration document
pub const CONFIGURATIONS_KEY: &str = "tracesReader.configurations";

/// A group of rules scoped to the buffers matched by `paths`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Log-line pattern used for thread-id discovery (capture group 4)
    #[serde(default, deserialize_with = "lenient::string")]
    pub line_reg: Option<String>,
    /// Path globs; the configuration applies if any of them matches
    #[serde(default, deserialize_with = "lenient::strings")]
    pub paths: Vec<String>,
    /// Static rules, in priority order (later rules paint over earlier ones)
    #[serde(default, deserialize_with = "lenient::rules")]
    pub rules: Vec<Rule>,
}

impl Configuration {
    /// Create a configuration scoped to `paths`
    pub fn new<S: Into<String>>(paths: impl IntoIterator<Item = S>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Builder: set the thread-id scan pattern
    pub fn with_line_reg(mut self, pattern: &str) -> Self {
        self.line_reg = Some(pattern.to_string());
        self
    }

    /// Builder: append a rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Whether any of this configuration's globs matches a buffer path
    pub fn applies_to(&self, path: &str) -> bool {
        self.paths.iter().any(|pattern| glob::scope_matches(pattern, path))
    }
}

/// A set of patterns and the style applied wherever they match
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Regular expressions, one matcher each
    #[serde(default, deserialize_with = "lenient::strings")]
    pub patterns: Vec<String>,
    #[serde(default, deserialize_with = "lenient::color")]
    pub color: Option<Color>,
    /// Case-sensitive matching; only an explicit `true` enables it
    #[serde(default, deserialize_with = "lenient::flag")]
    pub match_case: bool,
    /// Accepted for compatibility, not used by matching
    #[serde(default, deserialize_with = "lenient::flag")]
    pub match_whole_word: bool,
    #[serde(default, deserialize_with = "lenient::tristate")]
    pub bold: Option<bool>,
    #[serde(default, deserialize_with = "lenient::tristate")]
    pub italic: Option<bool>,
    #[serde(default, deserialize_with = "lenient::tristate")]
    pub underline: Option<bool>,
    #[serde(default, deserialize_with = "lenient::tristate")]
    pub strike_through: Option<bool>,
}

impl Rule {
    /// Create a rule from patterns
    pub fn new<S: Into<String>>(patterns: impl IntoIterator<Item = S>) -> Self {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Builder: set color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Builder: enable case-sensitive matching
    pub fn with_match_case(mut self) -> Self {
        self.match_case = true;
        self
    }

    /// Derive the decoration style for this rule
    pub fn style(&self) -> DecorationStyle {
        let text_decoration = match (self.underline, self.strike_through) {
            (Some(true), Some(true)) => Some(TextDecoration::UnderlineLineThrough),
            (Some(true), _) => Some(TextDecoration::Underline),
            (_, Some(true)) => Some(TextDecoration::LineThrough),
            (Some(false), _) | (_, Some(false)) => Some(TextDecoration::None),
            (None, None) => None,
        };

        DecorationStyle {
            color: self.color,
            font_weight: self
                .bold
                .map(|bold| if bold { FontWeight::Bold } else { FontWeight::Normal }),
            font_style: self
                .italic
                .map(|italic| if italic { FontStyle::Italic } else { FontStyle::Normal }),
            text_decoration,
        }
    }
}

/// Parse a configuration document
///
/// A document without the top-level key yields an empty list, which keeps
/// the engine waiting rather than failing.
pub fn parse_configurations(json: &str) -> Result<Vec<Configuration>> {
    let document: Value = serde_json::from_str(json)?;
    Ok(document
        .get(CONFIGURATIONS_KEY)
        .map(lenient::configurations_from)
        .unwrap_or_default())
}

/// Load a configuration document from a file
pub fn load_configurations(path: &Path) -> Result<Vec<Configuration>> {
    let contents = fs::read_to_string(path)?;
    let configurations = parse_configurations(&contents)?;
    tracing::info!(
        "Loaded {} configuration(s) from {}",
        configurations.len(),
        path.display()
    );
    Ok(configurations)
}

/// Deserializers that treat ill-typed values as absent
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{Color, Configuration, Rule};

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Value::deserialize(d)?.as_str().map(str::to_string))
    }

    pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn color<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Color>, D::Error> {
        Ok(Value::deserialize(d)?.as_str().and_then(Color::from_name))
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(Value::deserialize(d)?.as_bool() == Some(true))
    }

    pub fn tristate<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(Value::deserialize(d)?.as_bool())
    }

    pub fn rules<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Rule>, D::Error> {
        Ok(objects(&Value::deserialize(d)?))
    }

    pub fn configurations_from(value: &Value) -> Vec<Configuration> {
        objects(value)
    }

    fn objects<T: for<'a> Deserialize<'a>>(value: &Value) -> Vec<T> {
        match value {
            Value::Array(items) => items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| T::deserialize(item).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_configurations() {
        let json = r#"{
            "tracesReader.configurations": [
                {
                    "lineReg": "^\\[(\\w+)\\]",
                    "paths": ["*.log"],
                    "rules": [
                        { "patterns": ["ERROR"], "color": "BrightRed", "bold": true },
                        { "patterns": ["debug"], "matchCase": true, "italic": false }
                    ]
                },
                { "paths": ["*.txt"] }
            ]
        }"#;

        let configurations = parse_configurations(json).unwrap();
        assert_eq!(configurations.len(), 2);

        let first = &configurations[0];
        assert_eq!(first.line_reg.as_deref(), Some(r"^\[(\w+)\]"));
        assert_eq!(first.paths, vec!["*.log"]);
        assert_eq!(first.rules.len(), 2);
        assert_eq!(first.rules[0].color, Some(Color::BrightRed));
        assert_eq!(first.rules[0].bold, Some(true));
        assert!(!first.rules[0].match_case);
        assert!(first.rules[1].match_case);
        assert_eq!(first.rules[1].italic, Some(false));

        assert!(configurations[1].rules.is_empty());
        assert_eq!(configurations[1].line_reg, None);
    }

    #[test]
    fn test_missing_key_is_empty() {
        let configurations = parse_configurations(r#"{ "other": [] }"#).unwrap();
        assert!(configurations.is_empty());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(parse_configurations("{ not json").is_err());
    }

    #[test]
    fn test_lenient_values() {
        let json = r#"{
            "tracesReader.configurations": [
                {
                    "paths": ["*.log", 42, null],
                    "rules": [
                        { "patterns": ["a", 1, "b"], "color": "Purple", "bold": "yes", "matchCase": 1 },
                        "not a rule",
                        { "patterns": "ERROR", "underline": false }
                    ]
                },
                17
            ]
        }"#;

        let configurations = parse_configurations(json).unwrap();
        assert_eq!(configurations.len(), 1);
        let configuration = &configurations[0];
        assert_eq!(configuration.paths, vec!["*.log"]);
        assert_eq!(configuration.rules.len(), 2);

        let first = &configuration.rules[0];
        assert_eq!(first.patterns, vec!["a", "b"]);
        assert_eq!(first.color, None);
        assert_eq!(first.bold, None);
        assert!(!first.match_case);

        let second = &configuration.rules[1];
        assert!(second.patterns.is_empty());
        assert_eq!(second.underline, Some(false));
    }

    #[test]
    fn test_rule_style_tristate() {
        let mut rule = Rule::new(["x"]).with_color(Color::Cyan);
        assert_eq!(rule.style(), DecorationStyle::fg(Color::Cyan));

        rule.bold = Some(false);
        rule.italic = Some(true);
        let style = rule.style();
        assert_eq!(style.font_weight, Some(FontWeight::Normal));
        assert_eq!(style.font_style, Some(FontStyle::Italic));
        assert_eq!(style.text_decoration, None);

        rule.underline = Some(true);
        rule.strike_through = Some(true);
        assert_eq!(
            rule.style().text_decoration,
            Some(TextDecoration::UnderlineLineThrough)
        );

        rule.strike_through = Some(false);
        assert_eq!(rule.style().text_decoration, Some(TextDecoration::Underline));

        rule.underline = None;
        assert_eq!(rule.style().text_decoration, Some(TextDecoration::None));

        rule.strike_through = Some(true);
        assert_eq!(rule.style().text_decoration, Some(TextDecoration::LineThrough));
    }

    #[test]
    fn test_applies_to() {
        let configuration = Configuration::new(["*.log", "traces/**"]);
        assert!(configuration.applies_to("a.log"));
        assert!(configuration.applies_to("deep/dir/b.log"));
        assert!(configuration.applies_to("traces/run1/out.txt"));
        assert!(!configuration.applies_to("notes.txt"));
        assert!(!Configuration::default().applies_to("a.log"));
    }
}
