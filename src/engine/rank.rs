use std::cmp::Ordering;
use std::error::Error;

use nalgebra::{DMatrix, DVector};

use crate::concept::ConceptIndex;
use crate::index::Vocabulary;
use crate::matrix::DocumentIndex;
use crate::util::svd;
use crate::{SENTENCE_TERMINATOR, TokenizedItem};

/// Which representation the ranking runs in. Raw term space when both flags
/// are off; the two reduced spaces are mutually exclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankOptions {
    pub latent: bool,
    pub concepts: bool,
}

/// Builds a query weight vector against the fixed vocabulary, exactly the
/// way a document row is built: comparison is case-insensitive, the
/// sentence terminator and out-of-vocabulary terms are silently dropped,
/// and each occurrence accumulates the term's IDF.
pub fn build_query_vector(
    query: &TokenizedItem,
    vocabulary: &Vocabulary,
    idf: &[f64],
) -> DVector<f64> {
    let mut vector = DVector::zeros(vocabulary.len());

    for sentence in query {
        for token in sentence {
            let token = token.to_lowercase();
            if token == SENTENCE_TERMINATOR {
                continue;
            }
            if let Some(col) = vocabulary.position(&token) {
                vector[col] += idf[col];
            }
        }
    }

    vector
}

/// Dot product over the product of norms; 0 when either operand has zero
/// norm, so empty documents and queries rank last instead of producing NaN.
pub fn cosine_similarity(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        a.dot(b) / (norm_a * norm_b)
    }
}

/// Ranks all documents for each query, most similar first. The returned
/// identifiers are the positional ordinals `1..=N` assigned at index build
/// time; each list contains every document exactly once, with ties kept in
/// ordinal order by the stable sort. One-shot batch ranking, no state.
pub fn rank(
    index: &DocumentIndex,
    concept_index: Option<&ConceptIndex>,
    queries: &[TokenizedItem],
    options: &RankOptions,
) -> Result<Vec<Vec<usize>>, Box<dyn Error>> {
    if options.latent && options.concepts {
        return Err(
            "latent-factor and concept modes cannot be combined: the stored factors are term-space"
                .into(),
        );
    }

    let concepts = if options.concepts {
        Some(concept_index.ok_or("concept mode requested without a concept index")?)
    } else {
        None
    };
    let mapped: Option<DMatrix<f64>> = match concepts {
        Some(ci) => Some(ci.map_documents(&index.weights)?),
        None => None,
    };
    let active = mapped.as_ref().unwrap_or(&index.weights);

    let reduction = if options.latent {
        Some(index.reduction.as_ref().ok_or(
            "latent-factor mode requested but the index was built without a reduction",
        )?)
    } else {
        None
    };

    let mut ranked = Vec::with_capacity(queries.len());

    for query in queries {
        let mut query_vec = build_query_vector(query, &index.vocabulary, &index.idf);
        if let Some(ci) = concepts {
            query_vec = ci.map_query(&query_vec)?;
        }

        let similarities: Vec<f64> = match reduction {
            Some(reduction) => svd::reduced_cosine_similarities(reduction, &query_vec),
            None => (0..active.nrows())
                .map(|row| {
                    let doc = active.row(row).transpose();
                    cosine_similarity(&query_vec, &doc)
                })
                .collect(),
        };

        let mut scored: Vec<(usize, f64)> = similarities
            .iter()
            .enumerate()
            .map(|(ordinal, &score)| (ordinal + 1, score))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.push(scored.into_iter().map(|(id, _)| id).collect());
    }

    Ok(ranked)
}
