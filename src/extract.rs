//! Word-level feature extraction

use std::collections::BTreeSet;

use crate::core::{FeatureExtractor, LearnError, Result};

/// Registered kind name for [`WordExtractor`]
pub const WORD_EXTRACTOR: &str = "words";

/// Unigram word extractor: splits on whitespace and light punctuation,
/// lowercases, drops empty fragments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordExtractor;

fn is_delimiter(c: char) -> bool {
    matches!(c, ' ' | '\t' | ',' | ';' | ':' | '.' | '-' | '_')
}

impl FeatureExtractor for WordExtractor {
    fn extract(&self, text: &str) -> BTreeSet<String> {
        text.split(is_delimiter)
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}

/// Resolve a feature-extractor kind name from a builder descriptor
pub fn extractor_for(kind: &str) -> Result<Box<dyn FeatureExtractor>> {
    match kind {
        WORD_EXTRACTOR => Ok(Box::new(WordExtractor)),
        other => Err(LearnError::MissingBuilder(format!(
            "feature extractor '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<String> {
        WordExtractor.extract(text).into_iter().collect()
    }

    #[test]
    fn test_splits_on_delimiters() {
        assert_eq!(
            extract("breaking-change: html_docs"),
            vec!["breaking", "change", "docs", "html"]
        );
    }

    #[test]
    fn test_lowercases_and_dedups() {
        assert_eq!(extract("Bug BUG bug"), vec!["bug"]);
    }

    #[test]
    fn test_drops_empty_fragments() {
        assert_eq!(extract("  ,, ::  "), Vec::<String>::new());
        assert_eq!(extract(""), Vec::<String>::new());
    }

    #[test]
    fn test_extractor_lookup() {
        assert!(extractor_for(WORD_EXTRACTOR).is_ok());
        assert!(matches!(
            extractor_for("bigrams"),
            Err(LearnError::MissingBuilder(_))
        ));
    }
}
