use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{DocCode, WordCode};

/// One row per indexed page. Rows are append-only: re-indexing a path adds
/// a second row rather than replacing the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub code: DocCode,
    pub path: String,
    pub description: String,
    /// Char count of the extracted plain text.
    pub length: u64,
}

/// One row per distinct normalized token ever seen across the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub code: WordCode,
    pub text: String,
}

/// One row per (word, document) pair that occurs. `positions` is the coarse
/// position bitmap: bit i set means the word occurs in the i-th of 64
/// equal-length segments of the document text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordInstance {
    pub word_code: WordCode,
    pub document_code: DocCode,
    pub count: u32,
    pub positions: u64,
}

/// Singleton row selecting the synonym heuristic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfiguration {
    pub language: String,
}

/// The index words satisfying one query token: the normalized token itself
/// plus any heuristic synonym matches, in lookup order.
#[derive(Debug, Clone)]
pub struct SynonymSet {
    pub words: Vec<Word>,
}

/// A satisfiable conjunctive query: one synonym set per surviving token,
/// preserving the original token order.
#[derive(Debug, Clone)]
pub struct Query {
    pub sets: Vec<SynonymSet>,
}

impl Query {
    /// Flattened word texts across all sets, for snippet highlighting.
    pub fn highlight_terms(&self) -> HashSet<String> {
        self.sets
            .iter()
            .flat_map(|set| set.words.iter().map(|w| w.text.clone()))
            .collect()
    }
}

/// One ranked hit. `snippet_start`/`snippet_length` are char coordinates
/// into the document's side text file, chosen by the window selector.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub document_path: String,
    pub document_description: String,
    pub document_length: u64,
    pub snippet_start: usize,
    pub snippet_length: usize,
    pub total_instance_count: u64,
}
