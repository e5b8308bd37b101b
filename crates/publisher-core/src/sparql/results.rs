//! Query results: `application/sparql-results+json` and its conversion into
//! typed records.
//!
//! 値の型変換（integer / dateTime）は `to_records` の境界で明示的に行います。
//! それ以外の層は `Record` の型付きアクセサだけを使います。

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::escape::{escape_string, escape_uri};
use crate::domain::{PublisherError, Statement, vocab};

/// Raw result document of a SELECT or ASK query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
    #[serde(default)]
    pub head: Head,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultSet>,

    /// ASK queries only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub bindings: Vec<HashMap<String, Binding>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermKind {
    Uri,
    Literal,
    TypedLiteral,
    Bnode,
}

/// One bound value in a result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    #[serde(rename = "type")]
    pub kind: TermKind,
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,

    /// `xml:lang`（SPARQL JSON）と `lang`（RDF/JSON）の両方を受け付ける
    #[serde(
        default,
        rename = "xml:lang",
        alias = "lang",
        skip_serializing_if = "Option::is_none"
    )]
    pub lang: Option<String>,
}

impl Binding {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Uri,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            datatype: Some(datatype.into()),
            lang: None,
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Escape this value back into a SPARQL term.
    pub fn to_sparql_term(&self) -> String {
        match self.kind {
            TermKind::Uri => escape_uri(&self.value),
            TermKind::Literal | TermKind::TypedLiteral => {
                if let Some(datatype) = &self.datatype {
                    format!("{}^^{}", escape_string(&self.value), escape_uri(datatype))
                } else if let Some(lang) = &self.lang {
                    format!("{}@{}", escape_string(&self.value), lang)
                } else {
                    escape_string(&self.value)
                }
            }
            TermKind::Bnode => {
                warn!(
                    value = %self.value,
                    "don't know how to escape a blank node, escaping as a string"
                );
                escape_string(&self.value)
            }
        }
    }
}

impl QueryResults {
    /// Build a SELECT result (used by in-process store implementations).
    pub fn select(vars: &[&str], rows: Vec<HashMap<String, Binding>>) -> Self {
        Self {
            head: Head {
                vars: vars.iter().map(|v| v.to_string()).collect(),
            },
            results: Some(ResultSet { bindings: rows }),
            boolean: None,
        }
    }

    pub fn ask(answer: bool) -> Self {
        Self {
            head: Head::default(),
            results: None,
            boolean: Some(answer),
        }
    }

    pub fn rows(&self) -> &[HashMap<String, Binding>] {
        self.results
            .as_ref()
            .map(|r| r.bindings.as_slice())
            .unwrap_or_default()
    }
}

/// Row helper for building results by hand.
pub fn row<const N: usize>(pairs: [(&str, Binding); N]) -> HashMap<String, Binding> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// `xsd:dateTime` lexical form. A value without a timezone is taken as UTC.
fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .ok()
}

/// A coerced value of a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    DateTime(DateTime<Utc>),
    Text(String),
}

impl FieldValue {
    fn coerce(binding: &Binding) -> Self {
        match binding.datatype.as_deref() {
            Some(vocab::XSD_INTEGER) => binding
                .value
                .trim()
                .parse()
                .map(FieldValue::Integer)
                .unwrap_or_else(|_| FieldValue::Text(binding.value.clone())),
            Some(vocab::XSD_DATE_TIME) => parse_datetime(&binding.value)
                .map(FieldValue::DateTime)
                .unwrap_or_else(|| FieldValue::Text(binding.value.clone())),
            _ => FieldValue::Text(binding.value.clone()),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

/// One result row with head-ordered, coerced fields. Unbound vars are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(FieldValue::to_text)
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::DateTime(_) => None,
        }
    }

    /// Typed date-time, or an untyped literal that parses as one.
    pub fn datetime(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.get(key)? {
            FieldValue::DateTime(dt) => Some(*dt),
            FieldValue::Text(s) => parse_datetime(s),
            FieldValue::Integer(_) => None,
        }
    }

    pub(crate) fn require_text(&self, key: &'static str) -> Result<String, PublisherError> {
        self.text(key).ok_or_else(|| PublisherError::missing(key))
    }

    pub(crate) fn require_datetime(
        &self,
        key: &'static str,
    ) -> Result<DateTime<Utc>, PublisherError> {
        match self.get(key) {
            None => Err(PublisherError::missing(key)),
            Some(_) => self.datetime(key).ok_or_else(|| PublisherError::InvalidRecord {
                field: key,
                reason: "is not a date-time".to_string(),
            }),
        }
    }
}

/// Convert a header-plus-rows result into records.
///
/// Field order follows `head.vars`. Empty when there are no bound rows.
pub fn to_records(results: &QueryResults) -> Vec<Record> {
    results
        .rows()
        .iter()
        .map(|row| Record {
            fields: results
                .head
                .vars
                .iter()
                .filter_map(|var| {
                    row.get(var)
                        .map(|binding| (var.clone(), FieldValue::coerce(binding)))
                })
                .collect(),
        })
        .collect()
}

/// Rows with `subject`/`predicate`/`object` (and optional `graph`) bindings as
/// statements. Rows missing one of the three are skipped.
pub fn statements_from_bindings(results: &QueryResults) -> Vec<Statement> {
    results
        .rows()
        .iter()
        .filter_map(|row| {
            let statement = Statement::new(
                row.get("subject")?.to_sparql_term(),
                row.get("predicate")?.to_sparql_term(),
                row.get("object")?.to_sparql_term(),
            );
            Some(match row.get("graph") {
                Some(graph) => statement.with_graph(graph.to_sparql_term()),
                None => statement,
            })
        })
        .collect()
}
