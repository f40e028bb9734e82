use std::error::Error;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::TokenizedItem;
use crate::index::{self, InvertedIndex, Vocabulary};
use crate::util::svd::{self, Reduction};

/// Everything the ranking engine needs about a document corpus: the
/// vocabulary, the inverted index it was derived from, per-term IDF weights,
/// the dense docs x terms weight matrix and, when latent-factor retrieval is
/// requested, the truncated decomposition of that matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentIndex {
    pub vocabulary: Vocabulary,
    pub inverted: InvertedIndex,
    pub idf: Vec<f64>,
    pub weights: DMatrix<f64>,
    pub reduction: Option<Reduction>,
}

impl DocumentIndex {
    /// Builds the full index from preprocessed documents. The matrix is
    /// recomputed from scratch on every call; there is no incremental path.
    pub fn build(
        docs: &[TokenizedItem],
        latent_rank: Option<usize>,
    ) -> Result<Self, Box<dyn Error>> {
        println!("Building index for {} documents...", docs.len());
        let (inverted, vocabulary) = index::build_inverted_index(docs);
        let idf = compute_idf(&inverted, &vocabulary, docs.len());
        let weights = build_weight_matrix(docs, &vocabulary, &idf);
        println!(
            "Index built: {} terms, {}x{} weight matrix",
            vocabulary.len(),
            weights.nrows(),
            weights.ncols()
        );

        let reduction = match latent_rank {
            Some(rank) => Some(svd::reduce(&weights, rank)?),
            None => None,
        };

        Ok(DocumentIndex {
            vocabulary,
            inverted,
            idf,
            weights,
            reduction,
        })
    }

    pub fn document_count(&self) -> usize {
        self.weights.nrows()
    }
}

/// IDF(term) = log10(N / document frequency). Terms with no postings get 0,
/// which only happens when a concept-corpus IDF is computed against the
/// primary vocabulary; the zero also guards the division.
pub fn compute_idf(
    inverted: &InvertedIndex,
    vocabulary: &Vocabulary,
    item_count: usize,
) -> Vec<f64> {
    vocabulary
        .terms()
        .iter()
        .map(|term| {
            let df = inverted.document_frequency(term);
            if df == 0 {
                0.0
            } else {
                (item_count as f64 / df as f64).log10()
            }
        })
        .collect()
}

/// Dense items x terms weight matrix. Every occurrence of a vocabulary term
/// adds that term's IDF to its cell, so repeated addition encodes the term
/// frequency without a separate TF pass. Out-of-vocabulary tokens and the
/// sentence terminator contribute nothing.
pub fn build_weight_matrix(
    items: &[TokenizedItem],
    vocabulary: &Vocabulary,
    idf: &[f64],
) -> DMatrix<f64> {
    let mut weights = DMatrix::zeros(items.len(), vocabulary.len());

    for (row, item) in items.iter().enumerate() {
        for sentence in item {
            for token in sentence {
                if let Some(col) = vocabulary.position(token) {
                    weights[(row, col)] += idf[col];
                }
            }
        }
    }

    weights
}
