//! Tokenization shared by indexing and querying.

use std::collections::HashSet;

/// Split `text` into lowercase tokens.
///
/// Any character that is not alphanumeric or `_` separates tokens, so
/// `QuanticsTCI.quanticscrossinterpolate` yields `quanticstci` and
/// `quanticscrossinterpolate`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !is_token_char(c))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect()
}

/// Distinct tokens of `text`.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// Distinct query terms in first-appearance order.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(query)
        .into_iter()
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_qualified_names() {
        assert_eq!(
            tokenize("QuanticsTCI.quanticscrossinterpolate"),
            vec!["quanticstci", "quanticscrossinterpolate"]
        );
    }

    #[test]
    fn test_tokenize_keeps_underscores_and_digits() {
        assert_eq!(
            tokenize("nrandominitpivot=5, unfolding_scheme::Symbol"),
            vec!["nrandominitpivot", "5", "unfolding_scheme", "symbol"]
        );
    }

    #[test]
    fn test_tokenize_punctuation_only() {
        assert!(tokenize(" .,;:!? ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_query_terms_dedup_in_order() {
        assert_eq!(query_terms("Grid grid tensor GRID"), vec!["grid", "tensor"]);
    }
}
