//! URL pattern matching with `:name` placeholders.

use regex::Regex;
use std::collections::HashMap;

/// Compiled URL pattern.
///
/// `http://example.com/users/:id/posts/:post_id` matches
/// `http://example.com/users/1/posts/42` and captures `id = 1` and `post_id = 42`.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    pattern: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl UrlPattern {
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let (regex_str, param_names) = pattern_to_regex(pattern);
        Ok(Self {
            pattern: pattern.to_string(),
            regex: Regex::new(&regex_str)?,
            param_names,
        })
    }

    /// The pattern string this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Placeholder values when `url` matches, `None` otherwise.
    pub fn matches(&self, url: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(url)?;
        Some(
            self.param_names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| caps.get(i + 1).map(|m| (name.clone(), m.as_str().to_owned())))
                .collect(),
        )
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn pattern_to_regex(pattern: &str) -> (String, Vec<String>) {
    let trimmed = match pattern.trim_end_matches('/') {
        "" => pattern,
        t => t,
    };

    let mut param_names = Vec::new();
    let mut regex_str = String::from("^");
    let mut literal = String::new();
    let mut chars = trimmed.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek().copied().is_some_and(is_name_start) {
            regex_str.push_str(&regex::escape(&literal));
            literal.clear();

            let mut name = String::new();
            while let Some(&next) = chars.peek() {
                if !is_name_char(next) {
                    break;
                }
                name.push(next);
                chars.next();
            }
            param_names.push(name);
            regex_str.push_str("([^/]+?)");
        } else {
            literal.push(c);
        }
    }

    regex_str.push_str(&regex::escape(&literal));
    regex_str.push_str("/?$");
    (regex_str, param_names)
}
