//! Prefix compaction: rewrite well-known namespace IRIs into short prefixed
//! names so write requests get smaller.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Statement, vocab};

/// A namespace of the fixed compaction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    pub prefix: &'static str,
    pub iri: &'static str,
}

impl Namespace {
    const fn new(prefix: &'static str, iri: &'static str) -> Self {
        Self { prefix, iri }
    }

    pub fn declaration(&self) -> String {
        format!("PREFIX {}: <{}>", self.prefix, self.iri)
    }
}

pub const COMMON_PREFIXES: [Namespace; 23] = [
    Namespace::new("s0", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    Namespace::new("s1", "http://www.w3.org/ns/org#"),
    Namespace::new("s2", "http://www.w3.org/2000/01/rdf-schema#"),
    Namespace::new("s3", "http://www.w3.org/2001/XMLSchema#"),
    Namespace::new("s4", "http://xmlns.com/foaf/0.1/"),
    Namespace::new("s5", "http://purl.org/dc/elements/1.1/"),
    Namespace::new("s6", "http://purl.org/dc/terms/"),
    Namespace::new("s7", "http://www.w3.org/2004/02/skos/core#"),
    Namespace::new("s8", "http://www.w3.org/ns/prov#"),
    Namespace::new("s9", "http://schema.org/"),
    Namespace::new("q0", "http://www.w3.org/ns/dcat#"),
    Namespace::new("q1", "http://www.w3.org/ns/adms#"),
    Namespace::new("q2", "http://mu.semte.ch/vocabularies/core/"),
    Namespace::new("q3", "http://data.vlaanderen.be/ns/besluit#"),
    Namespace::new("q4", "http://data.vlaanderen.be/ns/mandaat#"),
    Namespace::new("q5", "http://data.europa.eu/eli/ontology#"),
    Namespace::new("q6", "http://publications.europa.eu/ontology/euvoc#"),
    Namespace::new("q7", "https://data.vlaanderen.be/ns/mobiliteit#"),
    Namespace::new("q8", "http://w3id.org/ldes#"),
    Namespace::new("q9", "http://www.w3.org/ns/locn#"),
    Namespace::new(
        "m0",
        "http://data.vlaanderen.be/id/concept/BestuursorgaanClassificatieCode/",
    ),
    Namespace::new("m1", "https://data.vlaanderen.be/ns/generiek"),
    Namespace::new("m2", "http://www.w3.org/ns/regorg#"),
];

// local name は prefixed name としてそのまま書けるものだけ（`/` や `.` を含むものは対象外）
static PATTERNS: LazyLock<Vec<(Namespace, Regex)>> = LazyLock::new(|| {
    COMMON_PREFIXES
        .iter()
        .map(|ns| {
            let pattern = format!("<{}([A-Za-z_][A-Za-z0-9_-]*)>", regex::escape(ns.iri));
            let regex = Regex::new(&pattern).expect("namespace patterns are valid regexes");
            (*ns, regex)
        })
        .collect()
});

/// Statements with compacted IRIs plus the namespaces they may reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactedBatch {
    pub namespaces: Vec<Namespace>,
    pub statements: Vec<Statement>,
}

impl CompactedBatch {
    /// `PREFIX` lines, one per namespace, in table order.
    pub fn declarations(&self) -> String {
        self.namespaces
            .iter()
            .map(Namespace::declaration)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn is_rdf_type(predicate: &str) -> bool {
    let bare = predicate
        .strip_prefix('<')
        .and_then(|p| p.strip_suffix('>'))
        .unwrap_or(predicate);
    bare == vocab::RDF_TYPE
}

fn mentions(statement: &Statement, iri: &str) -> bool {
    statement.subject.contains(iri)
        || statement.predicate.contains(iri)
        || (!statement.has_literal_object() && statement.object.contains(iri))
}

fn rewrite(term: &str, used: &[&(Namespace, Regex)]) -> String {
    let mut term = term.to_string();
    for (ns, regex) in used {
        let replacement = format!("{}:${{1}}", ns.prefix);
        term = regex.replace_all(&term, replacement.as_str()).into_owned();
    }
    term
}

/// Rewrite known namespace IRIs to prefixed names and `rdf:type` to `a`.
///
/// Pure and order-preserving. A namespace is returned iff its IRI occurs in
/// at least one statement (literal objects excluded).
pub fn compact_prefixes(statements: &[Statement]) -> CompactedBatch {
    let typed: Vec<Statement> = statements
        .iter()
        .map(|stmt| {
            if is_rdf_type(&stmt.predicate) {
                Statement {
                    predicate: "a".to_string(),
                    ..stmt.clone()
                }
            } else {
                stmt.clone()
            }
        })
        .collect();

    let used: Vec<&(Namespace, Regex)> = PATTERNS
        .iter()
        .filter(|(ns, _)| typed.iter().any(|stmt| mentions(stmt, ns.iri)))
        .collect();

    let statements = typed
        .into_iter()
        .map(|stmt| Statement {
            subject: rewrite(&stmt.subject, &used),
            predicate: rewrite(&stmt.predicate, &used),
            object: if stmt.has_literal_object() {
                stmt.object
            } else {
                rewrite(&stmt.object, &used)
            },
            graph: stmt.graph,
        })
        .collect();

    CompactedBatch {
        namespaces: used.into_iter().map(|(ns, _)| *ns).collect(),
        statements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(s: &str, p: &str, o: &str) -> Statement {
        Statement::new(s, p, o)
    }

    #[test]
    fn rewrites_known_namespaces() {
        let batch = compact_prefixes(&[stmt(
            "<http://data.lblod.info/id/besluiten/1>",
            "<http://purl.org/dc/terms/title>",
            "<http://www.w3.org/ns/prov#Entity>",
        )]);

        assert_eq!(
            batch.statements[0],
            stmt("<http://data.lblod.info/id/besluiten/1>", "s6:title", "s8:Entity")
        );
        assert_eq!(
            batch.declarations(),
            "PREFIX s6: <http://purl.org/dc/terms/>\nPREFIX s8: <http://www.w3.org/ns/prov#>"
        );
    }

    #[test]
    fn rdf_type_becomes_a_without_declaring_rdf() {
        for predicate in ["<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>", vocab::RDF_TYPE] {
            let batch = compact_prefixes(&[stmt("<http://x/1>", predicate, "<http://x/Thing>")]);
            assert_eq!(batch.statements[0].predicate, "a");
            assert!(batch.namespaces.is_empty());
        }
    }

    #[test]
    fn literal_objects_are_untouched() {
        let literal = "\"\"\"see http://purl.org/dc/terms/title\"\"\"";
        let batch = compact_prefixes(&[stmt("<http://x/1>", "<http://x/p>", literal)]);
        assert_eq!(batch.statements[0].object, literal);
        assert!(batch.namespaces.is_empty());
    }

    #[test]
    fn declares_only_what_is_mentioned() {
        let statements = vec![
            stmt("<http://x/1>", "<http://mu.semte.ch/vocabularies/core/uuid>", "\"1\""),
            stmt("<http://x/2>", "<http://x/p>", "<http://schema.org/Thing>"),
        ];
        let batch = compact_prefixes(&statements);
        let prefixes: Vec<&str> = batch.namespaces.iter().map(|ns| ns.prefix).collect();
        assert_eq!(prefixes, vec!["s9", "q2"]);
    }

    #[test]
    fn unsafe_local_names_stay_fully_qualified() {
        let iri = "<http://purl.org/dc/terms/a/b.c>";
        let batch = compact_prefixes(&[stmt(iri, "<http://x/p>", "<http://x/o>")]);
        assert_eq!(batch.statements[0].subject, iri);
    }

    #[test]
    fn compaction_is_idempotent() {
        let statements = vec![
            stmt(
                "<http://data.vlaanderen.be/ns/besluit#Besluit>",
                "<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>",
                "<http://www.w3.org/2000/01/rdf-schema#Class>",
            ),
            stmt("<http://x/1>", "<http://xmlns.com/foaf/0.1/name>", "\"n\"@nl"),
        ];
        let once = compact_prefixes(&statements);
        let twice = compact_prefixes(&once.statements);

        assert_eq!(twice.statements, once.statements);
        assert!(twice.namespaces.is_empty());
    }

    #[test]
    fn no_known_namespace_is_a_no_op() {
        let statements = vec![stmt("<http://x/1>", "<http://x/p>", "<http://x/o>")];
        let batch = compact_prefixes(&statements);
        assert_eq!(batch.statements, statements);
        assert_eq!(batch.declarations(), "");
    }
}
