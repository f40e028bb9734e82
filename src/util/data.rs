//! Load/dump helpers: bincode snapshots of the built indices and JSON
//! loaders for relevance judgments and preprocessed token streams. The core
//! owns no on-disk format beyond these snapshots.

use std::error::Error;
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter};

use serde::Deserialize;

use crate::TokenizedItem;
use crate::concept::ConceptIndex;
use crate::evaluation::Judgment;
use crate::matrix::DocumentIndex;

pub fn save_index(index: &DocumentIndex, path: &str) -> Result<(), Box<dyn Error>> {
    println!("Saving document index to {path}...");
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    bincode::serialize_into(writer, index)?;
    Ok(())
}

pub fn load_index(path: &str) -> Result<DocumentIndex, Box<dyn Error>> {
    println!("Loading document index from {path}...");
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let index = bincode::deserialize_from(reader)?;
    Ok(index)
}

pub fn save_concept_index(index: &ConceptIndex, path: &str) -> Result<(), Box<dyn Error>> {
    println!("Saving concept index to {path}...");
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    bincode::serialize_into(writer, index)?;
    Ok(())
}

pub fn load_concept_index(path: &str) -> Result<ConceptIndex, Box<dyn Error>> {
    println!("Loading concept index from {path}...");
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let index = bincode::deserialize_from(reader)?;
    Ok(index)
}

/// Raw qrels record as found in the Cranfield judgment file: integers kept
/// as strings by the upstream tooling.
#[derive(Debug, Deserialize)]
struct QrelRecord {
    query_num: String,
    position: u32,
    id: String,
}

pub fn parse_judgments(json: &str) -> Result<Vec<Judgment>, Box<dyn Error>> {
    let records: Vec<QrelRecord> = serde_json::from_str(json)?;
    records
        .into_iter()
        .map(|record| {
            Ok(Judgment {
                query_id: record.query_num.trim().parse()?,
                doc_id: record.id.trim().parse()?,
                position: record.position,
            })
        })
        .collect()
}

pub fn load_judgments(path: &str) -> Result<Vec<Judgment>, Box<dyn Error>> {
    let content = fs::read_to_string(path)?;
    parse_judgments(&content)
}

/// Reads a JSON file of preprocessed items, each a list of sentences, each
/// a list of tokens - the format the preprocessing stages dump.
pub fn load_tokenized(path: &str) -> Result<Vec<TokenizedItem>, Box<dyn Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let items = serde_json::from_reader(reader)?;
    Ok(items)
}
