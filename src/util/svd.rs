use std::error::Error;
use std::time::Instant;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Default target rank for the latent-factor projection.
pub const REDUCTION_RANK: usize = 300;

/// Truncated decomposition of the term-document matrix:
/// `term_factors * singular_values * doc_factors^T` approximates the
/// original terms x docs matrix at the kept rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reduction {
    /// Effective rank after truncation, never larger than the natural rank
    /// of the decomposition.
    pub rank: usize,
    /// terms x rank left factor (T).
    pub term_factors: DMatrix<f64>,
    /// rank x rank diagonal of singular values (S).
    pub singular_values: DMatrix<f64>,
    /// docs x rank right factor (D).
    pub doc_factors: DMatrix<f64>,
    /// terms x docs reconstruction at the kept rank.
    pub truncated: DMatrix<f64>,
}

/// Factorizes the docs x terms weight matrix (transposed to terms x docs)
/// and keeps the `rank` largest singular values. Singular values come back
/// from the decomposition in descending order, so truncation is a prefix
/// slice; a request beyond the natural rank keeps the natural size with no
/// padding.
pub fn reduce(weights: &DMatrix<f64>, rank: usize) -> Result<Reduction, Box<dyn Error>> {
    let term_doc = weights.transpose();
    println!(
        "Performing SVD on {}x{} term-document matrix (target rank {})...",
        term_doc.nrows(),
        term_doc.ncols(),
        rank
    );
    let start = Instant::now();

    let svd = term_doc
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or("SVD failed to converge")?;
    let u = svd.u.ok_or("SVD did not produce the term factor")?;
    let v_t = svd.v_t.ok_or("SVD did not produce the document factor")?;

    let k = rank.min(svd.singular_values.len());
    let term_factors = u.columns(0, k).into_owned();
    let vt_k = v_t.rows(0, k).into_owned();
    let singular_values = DMatrix::from_diagonal(&svd.singular_values.rows(0, k).into_owned());
    let truncated = &term_factors * &singular_values * &vt_k;

    println!(
        "SVD completed in {:?} (effective rank {})",
        start.elapsed(),
        k
    );

    Ok(Reduction {
        rank: k,
        term_factors,
        singular_values,
        doc_factors: vt_k.transpose(),
        truncated,
    })
}

/// Cosine similarity of a term-space query against every document in the
/// shared latent space: the query is projected through the term factor, the
/// documents through `doc_factors * singular_values`. A zero-norm projection
/// on either side scores 0 instead of dividing by zero.
pub fn reduced_cosine_similarities(reduction: &Reduction, query: &DVector<f64>) -> Vec<f64> {
    let ds_docs = &reduction.doc_factors * &reduction.singular_values;
    let ds_query = reduction.term_factors.transpose() * query;
    let query_norm = ds_query.norm();

    (0..ds_docs.nrows())
        .map(|j| {
            let doc = ds_docs.row(j).transpose();
            let doc_norm = doc.norm();
            if query_norm == 0.0 || doc_norm == 0.0 {
                0.0
            } else {
                ds_query.dot(&doc) / (query_norm * doc_norm)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_weights() -> DMatrix<f64> {
        // 3 docs x 4 terms, rank 3.
        DMatrix::from_row_slice(
            3,
            4,
            &[
                1.0, 0.0, 2.0, 0.5, //
                0.0, 3.0, 1.0, 0.0, //
                2.0, 1.0, 0.0, 4.0,
            ],
        )
    }

    fn frobenius_error(a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
        (a - b).norm()
    }

    #[test]
    fn full_rank_reconstruction_is_exact() {
        let weights = sample_weights();
        let reduction = reduce(&weights, 10).unwrap();

        // Natural rank is min(4, 3) = 3; no padding past it.
        assert_eq!(reduction.rank, 3);
        assert_eq!(reduction.term_factors.shape(), (4, 3));
        assert_eq!(reduction.doc_factors.shape(), (3, 3));
        assert!(frobenius_error(&reduction.truncated, &weights.transpose()) < 1e-9);
    }

    #[test]
    fn truncation_error_shrinks_as_rank_grows() {
        let weights = sample_weights();
        let original = weights.transpose();

        let err1 = frobenius_error(&reduce(&weights, 1).unwrap().truncated, &original);
        let err2 = frobenius_error(&reduce(&weights, 2).unwrap().truncated, &original);
        let err3 = frobenius_error(&reduce(&weights, 3).unwrap().truncated, &original);

        assert!(err1 >= err2);
        assert!(err2 >= err3);
        assert!(err3 < 1e-9);
    }

    #[test]
    fn zero_norm_query_scores_zero_everywhere() {
        let weights = sample_weights();
        let reduction = reduce(&weights, 2).unwrap();
        let query = DVector::zeros(4);

        let sims = reduced_cosine_similarities(&reduction, &query);
        assert_eq!(sims, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn reduced_similarities_stay_in_unit_range() {
        let weights = sample_weights();
        let reduction = reduce(&weights, 2).unwrap();
        let query = DVector::from_vec(vec![1.0, 0.0, 1.0, 0.0]);

        for sim in reduced_cosine_similarities(&reduction, &query) {
            assert!((-1.0 - 1e-12..=1.0 + 1e-12).contains(&sim));
        }
    }
}
