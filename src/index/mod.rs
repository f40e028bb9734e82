use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{SENTENCE_TERMINATOR, TokenizedItem};

/// One entry of a posting list: the 1-based ordinal of the item the term
/// occurs in, and how often it occurs there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub item_id: usize,
    pub frequency: usize,
}

/// Term -> posting list, in item order. Built once per corpus and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<Posting>>,
}

impl InvertedIndex {
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(|p| p.as_slice())
    }

    /// Number of items the term occurs in (0 for unseen terms).
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, |p| p.len())
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    fn add_occurrence(&mut self, term: &str, item_id: usize) {
        let list = self.postings.entry(term.to_string()).or_default();
        match list.last_mut() {
            Some(last) if last.item_id == item_id => last.frequency += 1,
            _ => list.push(Posting {
                item_id,
                frequency: 1,
            }),
        }
    }
}

/// The corpus vocabulary: unique terms in first-seen order. Insertion order
/// fixes the column index used by every weight matrix, so the vocabulary is
/// immutable once the index is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Fixed column index of a term, or `None` for out-of-vocabulary terms.
    pub fn position(&self, term: &str) -> Option<usize> {
        self.positions.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.positions.contains_key(term)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    fn add(&mut self, term: &str) {
        if !self.positions.contains_key(term) {
            self.positions.insert(term.to_string(), self.terms.len());
            self.terms.push(term.to_string());
        }
    }
}

/// Builds the inverted index and vocabulary for a document corpus. Items are
/// processed in input order, so item ids are stable 1-based ordinals. The
/// sentence terminator token is excluded from both structures.
pub fn build_inverted_index(items: &[TokenizedItem]) -> (InvertedIndex, Vocabulary) {
    let mut inverted = InvertedIndex::default();
    let mut vocabulary = Vocabulary::default();

    for (ordinal, item) in items.iter().enumerate() {
        let item_id = ordinal + 1;
        for sentence in item {
            for token in sentence {
                if token == SENTENCE_TERMINATOR {
                    continue;
                }
                vocabulary.add(token);
                inverted.add_occurrence(token, item_id);
            }
        }
    }

    (inverted, vocabulary)
}

/// Builds the inverted index for a concept corpus against an existing
/// document vocabulary. Intersection semantics: terms the documents never
/// use are not indexed, and the vocabulary does not grow.
pub fn build_concept_inverted_index(
    concepts: &[TokenizedItem],
    vocabulary: &Vocabulary,
) -> InvertedIndex {
    let mut inverted = InvertedIndex::default();

    for (ordinal, concept) in concepts.iter().enumerate() {
        let concept_id = ordinal + 1;
        for sentence in concept {
            for token in sentence {
                if token == SENTENCE_TERMINATOR || !vocabulary.contains(token) {
                    continue;
                }
                inverted.add_occurrence(token, concept_id);
            }
        }
    }

    inverted
}
