//! SPARQL term escaping.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::vocab;

pub fn escape_uri(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('<');
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '<' | '>') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('>');
    out
}

/// Long-quoted string literal (`"""..."""`), safe for multi-line values.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 6);
    out.push_str("\"\"\"");
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push_str("\"\"\"");
    out
}

pub fn escape_datetime(value: DateTime<Utc>) -> String {
    format!(
        "\"{}\"^^<{}>",
        value.to_rfc3339_opts(SecondsFormat::Millis, true),
        vocab::XSD_DATE_TIME
    )
}
