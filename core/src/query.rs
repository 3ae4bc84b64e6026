use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::model::{Query, SynonymSet, Word};
use crate::store::Store;
use crate::tokenizer::normalize;

/// Turn raw user tokens into one synonym set per surviving token, or
/// `None` when the query cannot match: a conjunctive search returns
/// nothing at all if any single token resolves to zero index words.
pub fn build_query(store: &Store, raw_tokens: &[String]) -> Result<Option<Query>> {
    let language = store.load_configuration()?.map(|c| c.language).unwrap_or_default();
    let mut seen = HashSet::new();
    let mut sets = Vec::new();
    for raw in raw_tokens {
        let token = normalize(raw);
        if token.is_empty() || !seen.insert(token.clone()) {
            continue;
        }
        let mut words = Vec::new();
        if let Some(word) = store.find_word(&token)? {
            words.push(word);
        }
        // synonyms are additive, attempted even after an exact match
        expand_synonyms(store, &token, &language, &mut words)?;
        if words.is_empty() {
            debug!(token = %token, "query token matches no index words");
            return Ok(None);
        }
        sets.push(SynonymSet { words });
    }
    if sets.is_empty() {
        return Ok(None);
    }
    Ok(Some(Query { sets }))
}

/// Suffix-heuristic synonym expansion, selected by the indexed language.
/// Every trial that resolves to an existing word is added to the set.
fn expand_synonyms(store: &Store, token: &str, language: &str, words: &mut Vec<Word>) -> Result<()> {
    match language {
        "spanish" => {
            if let Some(stem) = token.strip_suffix("es") {
                if !try_word(store, stem, words)? {
                    // the "es" trial missed, fall back to the plain "s" rule
                    try_word(store, &token[..token.len() - 1], words)?;
                }
            } else if token.ends_with('s') {
                try_word(store, &token[..token.len() - 1], words)?;
            } else if !try_word(store, &format!("{token}es"), words)? {
                try_word(store, &format!("{token}s"), words)?;
            }
        }
        "english" => {
            if token.ends_with('s') {
                try_word(store, &token[..token.len() - 1], words)?;
            } else {
                try_word(store, &format!("{token}s"), words)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Look up one trial text; push it when it exists. Returns whether the
/// trial resolved.
fn try_word(store: &Store, text: &str, words: &mut Vec<Word>) -> Result<bool> {
    if text.is_empty() {
        return Ok(false);
    }
    match store.find_word(text)? {
        Some(word) => {
            words.push(word);
            Ok(true)
        }
        None => Ok(false),
    }
}
