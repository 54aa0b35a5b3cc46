//! Keyword extraction: normalized unigrams plus adjacent-word bigrams.

use crate::models::KeywordSet;
use crate::normalize::normalize;

/// Words shorter than this carry too little signal to be keywords.
pub const MIN_WORD_LEN: usize = 3;

/// Joins the two words of a bigram keyword.
pub const BIGRAM_SEPARATOR: char = '_';

/// Extract the keyword set of a text.
///
/// Bigrams are built over the filtered word sequence, so a dropped short word
/// does not break adjacency: "the way i are" yields `way_are`.
pub fn extract_keywords(text: &str) -> KeywordSet {
    let normalized = normalize(text);
    let words: Vec<&str> = normalized
        .split_whitespace()
        .filter(|w| w.len() >= MIN_WORD_LEN)
        .collect();

    let mut keywords = KeywordSet::default();
    for word in &words {
        keywords.insert((*word).to_string());
    }
    for pair in words.windows(2) {
        keywords.insert(format!("{}{}{}", pair[0], BIGRAM_SEPARATOR, pair[1]));
    }
    keywords
}

pub fn is_bigram(keyword: &str) -> bool {
    keyword.contains(BIGRAM_SEPARATOR)
}

/// Number of single-word keywords in a set.
pub fn unigram_count(keywords: &KeywordSet) -> usize {
    keywords.iter().filter(|k| !is_bigram(k)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(set: &KeywordSet) -> Vec<&str> {
        let mut v: Vec<&str> = set.iter().map(String::as_str).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_unigrams_and_bigrams() {
        let kw = extract_keywords("Daft Punk - One More Time");
        assert_eq!(
            sorted(&kw),
            vec!["daft", "daft_punk", "more", "more_time", "one", "one_more", "punk", "punk_one", "time"]
        );
    }

    #[test]
    fn test_short_words_dropped_without_breaking_adjacency() {
        let kw = extract_keywords("Way I Are");
        assert!(kw.contains("way"));
        assert!(kw.contains("are"));
        assert!(kw.contains("way_are"));
        assert!(!kw.contains("i"));
    }

    #[test]
    fn test_empty_and_short_input() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("a b cd").is_empty());
        assert!(extract_keywords("!!!").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "Beyoncé & Jay-Z - Crazy In Love";
        assert_eq!(extract_keywords(text), extract_keywords(text));
        assert!(extract_keywords(text).contains("beyonce"));
    }

    #[test]
    fn test_unigram_count_ignores_bigrams() {
        let a = extract_keywords("alpha beta gamma");
        let b = extract_keywords("alpha beta delta");
        let shared: KeywordSet = a.intersection(&b).cloned().collect();
        // alpha_beta is shared too but does not count
        assert_eq!(shared.len(), 3);
        assert_eq!(unigram_count(&shared), 2);
    }
}
