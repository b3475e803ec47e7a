//! Search query normalization.

/// Normalize a user question into a search query string: lowercase,
/// punctuation (`? . , !`) stripped, whitespace runs collapsed to `+`.
pub fn normalize_query(input: &str) -> String {
    let cleaned: String = input
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '?' | '.' | ',' | '!'))
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_joins_with_plus() {
        assert_eq!(
            normalize_query("Quelle heure est-il à Paris"),
            "quelle+heure+est-il+à+paris"
        );
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(
            normalize_query("What's the weather today?!"),
            "what's+the+weather+today"
        );
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize_query("  a   b\tc  "), "a+b+c");
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(normalize_query(""), "");
        assert_eq!(normalize_query("?!."), "");
    }
}
