//! Naive text preparation helpers. The retrieval core consumes token
//! streams, so anything heavier (stemming, spellcheck, query expansion)
//! happens outside this crate; these cover the common case of raw text in.

use std::collections::HashSet;
use std::error::Error;
use std::fs;

use regex::Regex;

use crate::TokenizedItem;

/// Splits text into sentences at `.`, `?` and `!`.
pub fn segment_sentences(text: &str) -> Vec<String> {
    let re = Regex::new(r"[.?!]").unwrap();
    re.split(text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Lowercased alphanumeric runs of a single sentence.
pub fn tokenize(sentence: &str) -> Vec<String> {
    let re = Regex::new(r"[a-zA-Z0-9]+").unwrap();
    re.find_iter(sentence)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

pub fn load_stop_words(path: &str) -> Result<HashSet<String>, Box<dyn Error>> {
    let content = fs::read_to_string(path)?;
    let stop_words = content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect();
    Ok(stop_words)
}

pub fn remove_stopwords(tokens: Vec<String>, stop_words: &HashSet<String>) -> Vec<String> {
    tokens
        .into_iter()
        .filter(|token| !stop_words.contains(token))
        .collect()
}

/// Segment, tokenize and strip stop words in one pass. Sentences left empty
/// by stopword removal are kept; the counting logic ignores them anyway.
pub fn preprocess(text: &str, stop_words: &HashSet<String>) -> TokenizedItem {
    segment_sentences(text)
        .iter()
        .map(|sentence| remove_stopwords(tokenize(sentence), stop_words))
        .collect()
}
