//! Message template interpolation.
//!
//! Holes look like `{Name}`, optionally with a capture prefix (`{@Name}`,
//! `{$Name}`), an alignment (`{Name,10}`) and a format (`{Name:l}`). A
//! positive alignment pads on the left, a negative one on the right. Only the
//! `l` ("literal") format has any effect, rendering strings without quotes.
//! `{{` and `}}` escape literal braces.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

// `None` only if the pattern fails to compile, in which case templates are
// passed through untouched.
static HOLE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"\{\{|\}\}|\{[@$]?(?P<name>[A-Za-z0-9_]+)(?:,(?P<align>-?\d+))?(?::(?P<format>[^{}]+))?\}")
        .ok()
});

/// Substitute property values into a template. Holes naming unknown
/// properties are left as they are.
pub fn render(template: &str, properties: &[(String, Value)]) -> String {
    let re = match HOLE.as_ref() {
        Some(re) => re,
        None => return template.to_owned(),
    };

    re.replace_all(template, |caps: &Captures| {
        let whole = &caps[0];

        match caps.name("name") {
            // An escaped brace, `{{` or `}}`.
            None => whole[..1].to_owned(),
            Some(name) => {
                let literal = caps.name("format").map_or(false, |f| f.as_str() == "l");
                let align = caps.name("align").and_then(|a| a.as_str().parse::<i64>().ok());

                properties
                    .iter()
                    .find(|(n, _)| n == name.as_str())
                    .map(|(_, v)| pad(fmt_value(v, literal), align))
                    .unwrap_or_else(|| whole.to_owned())
            }
        }
    })
    .into_owned()
}

fn pad(s: String, align: Option<i64>) -> String {
    let width = match align.and_then(|a| usize::try_from(a.unsigned_abs()).ok()) {
        Some(w) => w,
        None => return s,
    };

    match align {
        Some(a) if a < 0 => format!("{:<w$}", s, w = width),
        _ => format!("{:>w$}", s, w = width),
    }
}

fn fmt_value(v: &Value, literal: bool) -> String {
    match v {
        Value::String(s) if literal => s.to_owned(),
        Value::String(s) => format!("\"{}\"", s),
        x => x.to_string(),
    }
}
