//! JSON pretty-printer.
//!
//! Walks a `serde_json::Value` and rebuilds it with two spaces of indentation
//! per level. Keys and scalar values are passed through the [`Styler`];
//! braces, brackets, colons and commas are emitted bare.

use serde_json::{Number, Value};

use super::{Category, Styler};

const INDENT: &str = "  ";

pub fn parse(body: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Render `value` at nesting depth `level`. The result has no trailing newline.
pub fn render(value: &Value, level: usize, styler: &dyn Styler) -> String {
    match value {
        Value::Object(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let inner = indent(level + 1);
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| {
                    format!(
                        "{inner}{}: {}",
                        styler.paint(Category::Key, &quote(key)),
                        render(value, level + 1, styler)
                    )
                })
                .collect();
            format!("{{\n{}\n{}}}", entries.join(",\n"), indent(level))
        }
        Value::Array(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            let inner = indent(level + 1);
            let entries: Vec<String> = items
                .iter()
                .map(|item| format!("{inner}{}", render(item, level + 1, styler)))
                .collect();
            format!("[\n{}\n{}]", entries.join(",\n"), indent(level))
        }
        Value::String(s) => styler.paint(Category::String, &quote(s)),
        Value::Number(n) => styler.paint(Category::Number, &format_number(n)),
        Value::Bool(b) => styler.paint(Category::Boolean, if *b { "true" } else { "false" }),
        Value::Null => styler.paint(Category::Null, "null"),
    }
}

/// Magnitudes outside this range print in exponent form.
const EXP_LOWER: f64 = 1e-6;
const EXP_UPPER: f64 = 1e16;

fn indent(level: usize) -> String {
    INDENT.repeat(level)
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

// Integers print exactly. Other numbers print as doubles, so `123.0` prints as `123`.
fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f != 0.0 && !(EXP_LOWER..EXP_UPPER).contains(&f.abs()) => format!("{f:e}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
