//! Rank-quality metrics: precision, recall, F-score, average precision and
//! nDCG at a cutoff k, per query and averaged over a query set.
//!
//! Per-query functions are pure and total: degenerate cases (no relevant
//! document retrieved, zero ideal gain) resolve to 0. The mean variants are
//! the precondition boundary and reject an empty query set, a missing
//! ranked list, and - where the formula divides by the ground-truth size -
//! a query with no relevance judgments.

use std::error::Error;

use serde::{Deserialize, Serialize};

/// One ground-truth relevance judgment. `position` is the graded relevance
/// of the document for the query, used verbatim as the gain in nDCG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub query_id: usize,
    pub doc_id: usize,
    pub position: u32,
}

/// Document ids judged relevant for a query, in judgment order.
pub fn relevant_docs(judgments: &[Judgment], query_id: usize) -> Vec<usize> {
    judgments
        .iter()
        .filter(|j| j.query_id == query_id)
        .map(|j| j.doc_id)
        .collect()
}

fn graded_docs(judgments: &[Judgment], query_id: usize) -> Vec<(usize, f64)> {
    judgments
        .iter()
        .filter(|j| j.query_id == query_id)
        .map(|j| (j.doc_id, j.position as f64))
        .collect()
}

/// Precision@k: fraction of the top-k retrieved documents that are relevant.
pub fn query_precision(ranked: &[usize], relevant: &[usize], k: usize) -> f64 {
    let hits = ranked
        .iter()
        .take(k)
        .filter(|id| relevant.contains(id))
        .count();
    hits as f64 / k as f64
}

/// Recall@k: fraction of relevant documents found in the top-k. The caller
/// must guarantee a non-empty ground truth.
pub fn query_recall(ranked: &[usize], relevant: &[usize], k: usize) -> f64 {
    let found = relevant
        .iter()
        .filter(|id| ranked[..k.min(ranked.len())].contains(id))
        .count();
    found as f64 / relevant.len() as f64
}

/// F-score@k: harmonic mean of precision and recall, 0 when both are 0.
pub fn query_fscore(ranked: &[usize], relevant: &[usize], k: usize) -> f64 {
    let p = query_precision(ranked, relevant, k);
    let r = query_recall(ranked, relevant, k);
    if p == 0.0 && r == 0.0 {
        0.0
    } else {
        2.0 * p * r / (p + r)
    }
}

/// Average precision@k: mean of precision at each relevant rank within the
/// top-k; 0 when no relevant document is retrieved.
pub fn query_average_precision(ranked: &[usize], relevant: &[usize], k: usize) -> f64 {
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (i, id) in ranked.iter().take(k).enumerate() {
        if relevant.contains(id) {
            hits += 1;
            sum += hits as f64 / (i + 1) as f64;
        }
    }
    if hits == 0 { 0.0 } else { sum / hits as f64 }
}

/// nDCG@k: DCG of the actual ranking over the DCG of the ideal ordering
/// (ground truth sorted by descending grade, cut at k). 0 when the ideal
/// gain is 0, i.e. no relevant documents exist at all.
pub fn query_ndcg(ranked: &[usize], graded: &[(usize, f64)], k: usize) -> f64 {
    let mut dcg = 0.0;
    for (i, id) in ranked.iter().take(k).enumerate() {
        if let Some(&(_, grade)) = graded.iter().find(|(doc, _)| doc == id) {
            dcg += grade / ((i + 2) as f64).log2();
        }
    }

    let mut ideal: Vec<f64> = graded.iter().map(|&(_, grade)| grade).collect();
    ideal.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let idcg: f64 = ideal
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, grade)| grade / ((i + 2) as f64).log2())
        .sum();

    if idcg == 0.0 { 0.0 } else { dcg / idcg }
}

/// Arithmetic mean of a per-query metric over `query_ids`. Query id `i`
/// refers to the `i-1`th ranked list.
fn mean_over_queries<F>(
    ranked_lists: &[Vec<usize>],
    query_ids: &[usize],
    judgments: &[Judgment],
    require_judgments: bool,
    mut metric: F,
) -> Result<f64, Box<dyn Error>>
where
    F: FnMut(&[usize], usize) -> f64,
{
    if query_ids.is_empty() {
        return Err("cannot average a metric over an empty query set".into());
    }

    let mut sum = 0.0;
    for &query_id in query_ids {
        let ranked = ranked_lists
            .get(query_id.wrapping_sub(1))
            .ok_or_else(|| format!("no ranked list for query {query_id}"))?;
        if require_judgments && relevant_docs(judgments, query_id).is_empty() {
            return Err(format!("no relevance judgments for query {query_id}").into());
        }
        sum += metric(ranked, query_id);
    }

    Ok(sum / query_ids.len() as f64)
}

pub fn mean_precision(
    ranked_lists: &[Vec<usize>],
    query_ids: &[usize],
    judgments: &[Judgment],
    k: usize,
) -> Result<f64, Box<dyn Error>> {
    mean_over_queries(ranked_lists, query_ids, judgments, false, |ranked, id| {
        query_precision(ranked, &relevant_docs(judgments, id), k)
    })
}

pub fn mean_recall(
    ranked_lists: &[Vec<usize>],
    query_ids: &[usize],
    judgments: &[Judgment],
    k: usize,
) -> Result<f64, Box<dyn Error>> {
    mean_over_queries(ranked_lists, query_ids, judgments, true, |ranked, id| {
        query_recall(ranked, &relevant_docs(judgments, id), k)
    })
}

pub fn mean_fscore(
    ranked_lists: &[Vec<usize>],
    query_ids: &[usize],
    judgments: &[Judgment],
    k: usize,
) -> Result<f64, Box<dyn Error>> {
    mean_over_queries(ranked_lists, query_ids, judgments, true, |ranked, id| {
        query_fscore(ranked, &relevant_docs(judgments, id), k)
    })
}

pub fn mean_average_precision(
    ranked_lists: &[Vec<usize>],
    query_ids: &[usize],
    judgments: &[Judgment],
    k: usize,
) -> Result<f64, Box<dyn Error>> {
    mean_over_queries(ranked_lists, query_ids, judgments, true, |ranked, id| {
        query_average_precision(ranked, &relevant_docs(judgments, id), k)
    })
}

pub fn mean_ndcg(
    ranked_lists: &[Vec<usize>],
    query_ids: &[usize],
    judgments: &[Judgment],
    k: usize,
) -> Result<f64, Box<dyn Error>> {
    mean_over_queries(ranked_lists, query_ids, judgments, false, |ranked, id| {
        query_ndcg(ranked, &graded_docs(judgments, id), k)
    })
}
