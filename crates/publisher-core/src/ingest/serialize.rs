//! Triple serialization and chunking.

use std::collections::HashSet;

use crate::domain::Statement;

/// Concatenate statements as `s p o.` with no separator.
///
/// Duplicates (same text) are written once, first occurrence wins. The
/// trailing period is the only boundary between statements.
pub fn serialize_triples(statements: &[Statement]) -> String {
    let mut seen = HashSet::with_capacity(statements.len());
    let mut out = String::new();
    for statement in statements {
        let text = statement.to_string();
        if seen.insert(text.clone()) {
            out.push_str(&text);
        }
    }
    out
}

/// Partition `items` into consecutive chunks of `size` (the last may be shorter).
pub fn chunk<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size);
    for item in items {
        current.push(item);
        if current.len() == size {
            chunks.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_without_separator() {
        let statements = vec![
            Statement::new("<a>", "<b>", "<c>"),
            Statement::new("<d>", "a", "\"e\""),
        ];
        assert_eq!(serialize_triples(&statements), "<a> <b> <c>.<d> a \"e\".");
    }

    #[test]
    fn duplicates_are_written_once() {
        let statements = vec![
            Statement::new("<a>", "<b>", "<c>"),
            Statement::new("<x>", "<y>", "<z>"),
            Statement::new("<a>", "<b>", "<c>").with_graph("<g>"),
        ];
        assert_eq!(serialize_triples(&statements), "<a> <b> <c>.<x> <y> <z>.");
    }

    #[test]
    fn chunks_keep_order() {
        assert_eq!(chunk(vec![1, 2, 3, 4, 5], 2), vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert_eq!(chunk(vec![1, 2, 3, 4], 2), vec![vec![1, 2], vec![3, 4]]);
        assert!(chunk(Vec::<u8>::new(), 3).is_empty());
    }
}
