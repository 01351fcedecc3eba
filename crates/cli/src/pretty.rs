//! jq-style colored JSON for the developer view.
//!
//! Colors follow jq conventions:
//! - Strings: green
//! - Numbers: cyan
//! - Booleans: yellow
//! - Null: bright black (dimmed)
//! - Keys: blue

use colored::{Color, Colorize};
use serde_json::Value as JsonValue;

/// Configuration for pretty printing.
#[derive(Debug, Clone, Copy)]
pub struct PrettyConfig {
    /// Enable colored output.
    pub color: bool,
    /// Indent string (usually 2 spaces).
    pub indent: &'static str,
    /// Short primitive arrays stay on one line.
    pub inline_arrays: bool,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            color: true,
            indent: "  ",
            inline_arrays: true,
        }
    }
}

/// Pretty-print a JSON value with colors.
pub fn pretty_json(value: &JsonValue, config: &PrettyConfig) -> String {
    let mut printer = Printer {
        config,
        out: String::new(),
    };
    printer.value(value, 0);
    printer.out
}

struct Printer<'a> {
    config: &'a PrettyConfig,
    out: String,
}

impl Printer<'_> {
    fn value(&mut self, value: &JsonValue, depth: usize) {
        match value {
            JsonValue::Null => self.paint("null", Color::BrightBlack),
            JsonValue::Bool(b) => self.paint(&b.to_string(), Color::Yellow),
            JsonValue::Number(n) => self.paint(&n.to_string(), Color::Cyan),
            JsonValue::String(s) => self.paint(&quote(s), Color::Green),
            JsonValue::Array(items) => self.array(items, depth),
            JsonValue::Object(map) => {
                if map.is_empty() {
                    self.out.push_str("{}");
                    return;
                }
                self.out.push_str("{\n");
                for (i, (key, item)) in map.iter().enumerate() {
                    self.pad(depth + 1);
                    self.paint(&quote(key), Color::Blue);
                    self.out.push_str(": ");
                    self.value(item, depth + 1);
                    if i + 1 < map.len() {
                        self.out.push(',');
                    }
                    self.out.push('\n');
                }
                self.pad(depth);
                self.out.push('}');
            }
        }
    }

    fn array(&mut self, items: &[JsonValue], depth: usize) {
        if items.is_empty() {
            self.out.push_str("[]");
            return;
        }

        if self.config.inline_arrays && fits_inline(items) {
            self.out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                self.value(item, depth + 1);
            }
            self.out.push(']');
            return;
        }

        self.out.push_str("[\n");
        for (i, item) in items.iter().enumerate() {
            self.pad(depth + 1);
            self.value(item, depth + 1);
            if i + 1 < items.len() {
                self.out.push(',');
            }
            self.out.push('\n');
        }
        self.pad(depth);
        self.out.push(']');
    }

    fn pad(&mut self, depth: usize) {
        self.out.push_str(&self.config.indent.repeat(depth));
    }

    fn paint(&mut self, text: &str, color: Color) {
        if self.config.color {
            self.out.push_str(&text.color(color).to_string());
        } else {
            self.out.push_str(text);
        }
    }
}

/// At most four primitives whose rendering stays under 60 columns.
fn fits_inline(items: &[JsonValue]) -> bool {
    if items.len() > 4 {
        return false;
    }
    let mut width = items.len() * 2;
    for item in items {
        width += match item {
            JsonValue::Null => 4,
            JsonValue::Bool(b) => b.to_string().len(),
            JsonValue::Number(n) => n.to_string().len(),
            JsonValue::String(s) => s.len() + 2,
            JsonValue::Array(_) | JsonValue::Object(_) => return false,
        };
    }
    width < 60
}

fn quote(s: &str) -> String {
    // Serializing a str cannot fail.
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}
