//! Statement - 書き込み 1 件分の RDF triple
//!
//! 各 term はすでに SPARQL 用に escape 済みのテキストです
//! （`<http://...>`, `"""..."""^^<...>`, `_:b0` など）。

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub subject: String,
    pub predicate: String,
    pub object: String,

    /// 取得元の graph。書き込み先は template 側で決まるので直列化には使わない
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<String>,
}

impl Statement {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            graph: None,
        }
    }

    pub fn with_graph(mut self, graph: impl Into<String>) -> Self {
        self.graph = Some(graph.into());
        self
    }

    /// Object is a quoted literal (never prefix-compacted).
    pub fn has_literal_object(&self) -> bool {
        self.object.starts_with('"')
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}.", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_terminated_triple() {
        let stmt = Statement::new("<http://a>", "<http://b>", "\"c\"");
        assert_eq!(stmt.to_string(), "<http://a> <http://b> \"c\".");
        assert!(stmt.has_literal_object());
    }

    #[test]
    fn graph_does_not_affect_rendering() {
        let stmt =
            Statement::new("<http://a>", "<http://b>", "<http://c>").with_graph("<http://g>");
        assert_eq!(stmt.to_string(), "<http://a> <http://b> <http://c>.");
        assert!(!stmt.has_literal_object());
    }
}
