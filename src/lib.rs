//! Vector-space retrieval experiments over the Cranfield collection.
//!
//! Documents and queries arrive as preprocessed token streams, get indexed
//! into a term-document weight matrix, optionally projected into a reduced
//! latent-factor space or an explicit concept space, ranked by cosine
//! similarity, and scored against human relevance judgments.

pub mod concept;
pub mod engine;
pub mod evaluation;
pub mod index;
pub mod matrix;
pub mod preprocessing;
pub mod util;

pub use concept::ConceptIndex;
pub use engine::rank::{RankOptions, rank};
pub use evaluation::Judgment;
pub use index::{InvertedIndex, Posting, Vocabulary};
pub use matrix::DocumentIndex;
pub use util::svd::{REDUCTION_RANK, Reduction};

/// A preprocessed document, query or concept article: a sequence of
/// sentences, each a sequence of lowercase stemmed tokens.
pub type TokenizedItem = Vec<Vec<String>>;

/// Literal terminator token some tokenizers leave at sentence ends.
/// Ignored by all counting logic.
pub const SENTENCE_TERMINATOR: &str = ".";
