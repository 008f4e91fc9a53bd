//! Typed stylesheet for the post template.
//!
//! Declaration values are either trusted keywords written by this crate,
//! `url(...)` references carrying client input, or client-supplied colours.
//! Client input is escaped (URLs) or validated (colours) here so that the
//! stylesheet can't leave its declaration, its rule or its `<style>` element.

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Keyword(&'static str),
    Url(String),
    Color(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: &'static str,
    pub declarations: Vec<(&'static str, Value)>,
}

impl Rule {
    pub fn new(selector: &'static str) -> Self {
        Self {
            selector,
            declarations: Vec::new(),
        }
    }

    /// Add a declaration whose value is fixed by the template
    pub fn set(mut self, property: &'static str, value: &'static str) -> Self {
        self.declarations.push((property, Value::Keyword(value)));
        self
    }

    pub fn url(mut self, property: &'static str, url: impl Into<String>) -> Self {
        self.declarations.push((property, Value::Url(url.into())));
        self
    }

    /// Add a colour declaration. Callers must pass a colour accepted by
    /// [`is_safe_color`].
    pub fn color(mut self, property: &'static str, color: impl Into<String>) -> Self {
        self.declarations.push((property, Value::Color(color.into())));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for rule in &self.rules {
            out.push_str(rule.selector);
            out.push_str(" {\n");
            for (property, value) in &rule.declarations {
                out.push_str("  ");
                out.push_str(property);
                out.push_str(": ");
                match value {
                    Value::Keyword(k) => out.push_str(k),
                    Value::Url(u) => {
                        out.push_str("url('");
                        escape_css_string(u, &mut out);
                        out.push_str("')");
                    }
                    Value::Color(c) => {
                        if is_safe_color(c) {
                            out.push_str(c);
                        } else {
                            out.push_str("transparent");
                        }
                    }
                }
                out.push_str(";\n");
            }
            out.push_str("}\n");
        }
        out
    }
}

/// Whether a colour string only uses characters that appear in CSS colour
/// syntax (hex, named, `rgb()`, `hsl()` and friends) with balanced
/// parentheses. An unclosed function would swallow the rest of the sheet.
pub fn is_safe_color(color: &str) -> bool {
    if color.trim().is_empty() {
        return false;
    }
    let mut depth = 0usize;
    for c in color.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            c if c.is_ascii_alphanumeric() || matches!(c, '#' | ',' | '.' | '%' | '/' | '-' | '+' | ' ') => {}
            _ => return false,
        }
    }
    depth == 0
}

/// Escape a value for a single-quoted CSS string. Angle brackets are hex
/// escaped too so the value can never close the surrounding `<style>`.
fn escape_css_string(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '<' | '>' | '\n' | '\r' | '\u{c}' => {
                let _ = write!(out, "\\{:x} ", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\{:x} ", c as u32);
            }
            c => out.push(c),
        }
    }
}
