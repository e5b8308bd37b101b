//! SPARQL helpers: term escaping and typed query results.

pub mod escape;
pub mod results;

pub use self::escape::{escape_datetime, escape_string, escape_uri};
pub use self::results::{
    Binding, FieldValue, Head, QueryResults, Record, ResultSet, TermKind, row,
    statements_from_bindings, to_records,
};
