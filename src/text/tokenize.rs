// Tokenizer for the TF-IDF vectorizer.
//
// Lower-cases, turns every ASCII punctuation character into a space, and
// splits on whitespace. No stemming and no stop-word removal: the IDF term
// already downweights words that appear everywhere.

/// Split article text into lower-case word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_splits() {
        assert_eq!(tokenize("The Quick  brown\tFOX"), vec!["the", "quick", "brown", "fox"]);
    }

    #[test]
    fn test_punctuation_becomes_separator() {
        assert_eq!(
            tokenize("state-run media's \"report\": done."),
            vec!["state", "run", "media", "s", "report", "done"]
        );
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ...!!! --- ").is_empty());
    }

    #[test]
    fn test_non_ascii_letters_kept() {
        assert_eq!(tokenize("Café, Ünïon"), vec!["café", "ünïon"]);
    }
}
