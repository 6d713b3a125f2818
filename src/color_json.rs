//! Purpose: Pretty-print API responses with optional ANSI colors.
//! Exports: `render_json`.
//! Invariants: With color off, output is identical to `serde_json::to_string_pretty`.
use serde_json::{Map, Value};

const KEY: &str = "36";
const STRING: &str = "32";
const NUMBER: &str = "33";
const LITERAL: &str = "35";

struct Painter {
    enabled: bool,
    out: String,
}

impl Painter {
    fn paint(&mut self, text: &str, code: &str) {
        if self.enabled {
            self.out.push_str("\u{1b}[");
            self.out.push_str(code);
            self.out.push('m');
            self.out.push_str(text);
            self.out.push_str("\u{1b}[0m");
        } else {
            self.out.push_str(text);
        }
    }

    fn newline(&mut self, depth: usize) {
        self.out.push('\n');
        for _ in 0..depth {
            self.out.push_str("  ");
        }
    }

    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Null => self.paint("null", LITERAL),
            Value::Bool(flag) => self.paint(if *flag { "true" } else { "false" }, LITERAL),
            Value::Number(num) => self.paint(&num.to_string(), NUMBER),
            Value::String(text) => self.paint(&quote(text), STRING),
            Value::Array(items) => self.array(items, depth),
            Value::Object(map) => self.object(map, depth),
        }
    }

    fn array(&mut self, items: &[Value], depth: usize) {
        if items.is_empty() {
            self.out.push_str("[]");
            return;
        }
        self.out.push('[');
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                self.out.push(',');
            }
            self.newline(depth + 1);
            self.value(item, depth + 1);
        }
        self.newline(depth);
        self.out.push(']');
    }

    fn object(&mut self, map: &Map<String, Value>, depth: usize) {
        if map.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push('{');
        for (idx, (key, item)) in map.iter().enumerate() {
            if idx > 0 {
                self.out.push(',');
            }
            self.newline(depth + 1);
            self.paint(&quote(key), KEY);
            self.out.push_str(": ");
            self.value(item, depth + 1);
        }
        self.newline(depth);
        self.out.push('}');
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

pub fn render_json(value: &Value, use_color: bool) -> String {
    let mut painter = Painter {
        enabled: use_color,
        out: String::new(),
    };
    painter.value(value, 0);
    painter.out
}
