//! Text blobs: each term repeated by its integer frequency.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Serialize `counts` against `vocabulary`.
///
/// Terms come out in vocabulary order, each one fully repeated before the
/// next begins, separated by single spaces: `["a", "b"]` with `[2, 1]` gives
/// `"a a b"`. An all-zero row gives the empty string.
pub fn serialize(vocabulary: &[String], counts: &[u64]) -> Result<String> {
    if vocabulary.len() != counts.len() {
        return Err(Error::shape(
            format!("{} counts (vocabulary size)", vocabulary.len()),
            format!("{} counts", counts.len()),
        ));
    }

    let capacity: usize = vocabulary
        .iter()
        .zip(counts)
        .map(|(term, &n)| (term.len() + 1) * n as usize)
        .sum();
    let mut blob = String::with_capacity(capacity);
    for (term, &n) in vocabulary.iter().zip(counts) {
        for _ in 0..n {
            if !blob.is_empty() {
                blob.push(' ');
            }
            blob.push_str(term);
        }
    }
    Ok(blob)
}

/// Distinct words of a blob with their repeat counts, in first-seen order.
pub fn term_counts(blob: &str) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for word in blob.split_whitespace() {
        match index.get(word) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(word, counts.len());
                counts.push((word, 1));
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_order_not_interleaved() {
        assert_eq!(serialize(&vocab(&["a", "b"]), &[2, 1]).unwrap(), "a a b");
    }

    #[test]
    fn test_zero_counts_skip_terms() {
        let blob = serialize(&vocab(&["x", "y", "z"]), &[0, 3, 0]).unwrap();
        assert_eq!(blob, "y y y");
    }

    #[test]
    fn test_all_zero_row_is_empty() {
        assert_eq!(serialize(&vocab(&["a", "b"]), &[0, 0]).unwrap(), "");
        assert_eq!(serialize(&[], &[]).unwrap(), "");
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            serialize(&vocab(&["a"]), &[1, 1]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_term_counts() {
        assert_eq!(
            term_counts("pear pear fig pear"),
            vec![("pear", 3), ("fig", 1)]
        );
        assert!(term_counts("").is_empty());
    }
}
