use std::error::Error;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::TokenizedItem;
use crate::index::{self, InvertedIndex, Vocabulary};
use crate::matrix;

/// Explicit concept space built from an auxiliary corpus of topical
/// articles. Concepts are indexed only for terms of the document vocabulary,
/// so every concept row lines up column-for-column with the document weight
/// matrix. Build once, then pass by reference wherever mapping is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptIndex {
    pub inverted: InvertedIndex,
    /// The document vocabulary the concepts were indexed against.
    pub vocabulary: Vocabulary,
    /// concepts x vocabulary-terms weight matrix.
    pub weights: DMatrix<f64>,
}

impl ConceptIndex {
    /// Builds the concept index against an existing document vocabulary.
    /// IDF is computed from concept document frequencies; vocabulary terms
    /// absent from every concept get IDF 0 and an all-zero column.
    pub fn build(concepts: &[TokenizedItem], vocabulary: &Vocabulary) -> Self {
        println!(
            "Building concept index for {} concepts over {} terms...",
            concepts.len(),
            vocabulary.len()
        );
        let inverted = index::build_concept_inverted_index(concepts, vocabulary);
        let idf = matrix::compute_idf(&inverted, vocabulary, concepts.len());
        let weights = matrix::build_weight_matrix(concepts, vocabulary, &idf);

        ConceptIndex {
            inverted,
            vocabulary: vocabulary.clone(),
            weights,
        }
    }

    pub fn concept_count(&self) -> usize {
        self.weights.nrows()
    }

    /// Re-expresses every document row as a vector of similarities to
    /// concepts: `documents x concepts = doc_weights * weights^T`. Fails
    /// fast when the term dimensions disagree instead of producing an
    /// undefined product.
    pub fn map_documents(&self, doc_weights: &DMatrix<f64>) -> Result<DMatrix<f64>, Box<dyn Error>> {
        self.check_term_dimension(doc_weights.ncols())?;
        Ok(doc_weights * self.weights.transpose())
    }

    /// Same projection for a single query vector.
    pub fn map_query(&self, query: &DVector<f64>) -> Result<DVector<f64>, Box<dyn Error>> {
        self.check_term_dimension(query.len())?;
        Ok(&self.weights * query)
    }

    fn check_term_dimension(&self, terms: usize) -> Result<(), Box<dyn Error>> {
        if terms != self.weights.ncols() {
            return Err(format!(
                "shape mismatch: input has {} terms, concept matrix has {}",
                terms,
                self.weights.ncols()
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_inverted_index;

    fn item(sentences: &[&[&str]]) -> TokenizedItem {
        sentences
            .iter()
            .map(|s| s.iter().map(|t| t.to_string()).collect())
            .collect()
    }

    fn vocabulary() -> Vocabulary {
        let docs = vec![item(&[&["flow", "layer", "shock"]])];
        build_inverted_index(&docs).1
    }

    #[test]
    fn vocabulary_terms_missing_from_concepts_get_zero_columns() {
        let vocab = vocabulary();
        let concepts = vec![item(&[&["flow", "flow"]]), item(&[&["layer"]])];
        let ci = ConceptIndex::build(&concepts, &vocab);

        assert_eq!(ci.weights.shape(), (2, 3));
        let shock = vocab.position("shock").unwrap();
        assert_eq!(ci.weights[(0, shock)], 0.0);
        assert_eq!(ci.weights[(1, shock)], 0.0);

        // "flow" occurs twice in concept 1 and nowhere else: 2 * log10(2/1).
        let flow = vocab.position("flow").unwrap();
        assert!((ci.weights[(0, flow)] - 2.0 * (2.0f64).log10()).abs() < 1e-12);
    }

    #[test]
    fn document_mapping_multiplies_against_transposed_concepts() {
        let vocab = vocabulary();
        let concepts = vec![item(&[&["flow"]]), item(&[&["layer"]])];
        let ci = ConceptIndex::build(&concepts, &vocab);

        let docs = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 0.0, 1.0, 0.0]);
        let mapped = ci.map_documents(&docs).unwrap();
        assert_eq!(mapped.shape(), (2, 2));

        let expected = &docs * ci.weights.transpose();
        assert_eq!(mapped, expected);
    }

    #[test]
    fn query_mapping_matches_document_mapping() {
        let vocab = vocabulary();
        let concepts = vec![item(&[&["flow", "layer"]]), item(&[&["shock"]])];
        let ci = ConceptIndex::build(&concepts, &vocab);

        let query = DVector::from_vec(vec![0.5, 0.0, 1.5]);
        let mapped = ci.map_query(&query).unwrap();
        assert_eq!(mapped.len(), 2);

        let as_row = ci
            .map_documents(&DMatrix::from_row_slice(1, 3, query.as_slice()))
            .unwrap();
        for c in 0..2 {
            assert!((mapped[c] - as_row[(0, c)]).abs() < 1e-12);
        }
    }

    #[test]
    fn mismatched_term_dimension_is_rejected() {
        let vocab = vocabulary();
        let concepts = vec![item(&[&["flow"]])];
        let ci = ConceptIndex::build(&concepts, &vocab);

        let docs = DMatrix::zeros(2, 4);
        assert!(ci.map_documents(&docs).is_err());
        assert!(ci.map_query(&DVector::zeros(2)).is_err());
    }
}
