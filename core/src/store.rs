use std::path::Path;

use parking_lot::Mutex;
use sled::transaction::{ConflictableTransactionError, Transactional};
use sled::Tree;
use tracing::{debug, info};

use crate::counter::WordStats;
use crate::error::{Error, Result};
use crate::model::{Document, IndexConfiguration, Word, WordInstance};
use crate::{DocCode, WordCode};

const CONFIG_KEY: &[u8] = b"configuration";

/// Fields of a Document row before the store assigns its code.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub path: String,
    pub description: String,
    pub length: u64,
}

/// Row counts, for reporting after a build.
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    pub documents: usize,
    pub words: usize,
    pub instances: usize,
}

/// Embedded persistence for the four record kinds: documents and words
/// keyed by identity, word instances keyed by (word_code, document_code),
/// and the singleton configuration row. Identity codes come from the
/// engine's atomic id generator, never from process-level counters.
pub struct Store {
    db: sled::Db,
    documents: Tree,
    words: Tree,
    word_instances: Tree,
    config: Tree,
    // document commits are single-writer; the lock makes that explicit
    write_lock: Mutex<()>,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())?;
        let documents = db.open_tree("documents")?;
        let words = db.open_tree("words")?;
        let word_instances = db.open_tree("word_instances")?;
        let config = db.open_tree("config")?;
        info!(path = %path.as_ref().display(), "opened index store");
        Ok(Self { db, documents, words, word_instances, config, write_lock: Mutex::new(()) })
    }

    /// Exact-match lookup by normalized word text.
    pub fn find_word(&self, text: &str) -> Result<Option<Word>> {
        match self.words.get(text.as_bytes())? {
            Some(raw) => Ok(Some(bincode::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn load_configuration(&self) -> Result<Option<IndexConfiguration>> {
        match self.config.get(CONFIG_KEY)? {
            Some(raw) => Ok(Some(bincode::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn insert_configuration(&self, language: &str) -> Result<()> {
        let row = IndexConfiguration { language: language.to_string() };
        let prev = self.config.insert(CONFIG_KEY, bincode::serialize(&row)?)?;
        if prev.is_some() {
            return Err(Error::Constraint("configuration row already present".into()));
        }
        self.db.flush()?;
        Ok(())
    }

    pub fn document(&self, code: DocCode) -> Result<Option<Document>> {
        match self.documents.get(code.to_be_bytes())? {
            Some(raw) => Ok(Some(bincode::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// All instance rows for one word, ordered by document code.
    pub fn instances_of(&self, word_code: WordCode) -> Result<Vec<WordInstance>> {
        let mut rows = Vec::new();
        for kv in self.word_instances.scan_prefix(word_code.to_be_bytes()) {
            let (_, raw) = kv?;
            rows.push(bincode::deserialize(&raw)?);
        }
        Ok(rows)
    }

    /// Atomically insert one Document row plus a Word row (created on first
    /// occurrence) and a WordInstance row for every accumulated word. Any
    /// duplicate key aborts the whole transaction with a constraint error;
    /// partial indexing of a document is never observable.
    pub fn commit_document(&self, doc: &NewDocument, entries: &[(String, WordStats)]) -> Result<DocCode> {
        let _writer = self.write_lock.lock();
        // Codes are allocated before the transaction opens: generate_id
        // flushes the idgen counter to the log, and that flush cannot
        // complete while the transaction holds a log reservation. Codes
        // the commit ends up not using leave gaps.
        let doc_code = self.db.generate_id()?;
        let mut word_codes = Vec::with_capacity(entries.len());
        for _ in entries {
            word_codes.push(self.db.generate_id()?);
        }
        (&self.documents, &self.words, &self.word_instances)
            .transaction(|(documents, words, word_instances)| {
                let mut pool = word_codes.iter().copied();
                let row = Document {
                    code: doc_code,
                    path: doc.path.clone(),
                    description: doc.description.clone(),
                    length: doc.length,
                };
                if documents.insert(&doc_code.to_be_bytes()[..], encode(&row)?)?.is_some() {
                    return abort_constraint(format!("document code {doc_code} already present"));
                }
                for (text, stats) in entries {
                    let word_code = match words.get(text.as_bytes())? {
                        Some(raw) => decode::<Word>(&raw)?.code,
                        None => {
                            // the pool holds one id per entry, so it cannot
                            // run out before the new words do
                            let Some(word_code) = pool.next() else {
                                return abort_constraint("word code pool exhausted".into());
                            };
                            let row = Word { code: word_code, text: text.clone() };
                            if words.insert(text.as_bytes(), encode(&row)?)?.is_some() {
                                return abort_constraint(format!("word {text:?} already present"));
                            }
                            word_code
                        }
                    };
                    let row = WordInstance {
                        word_code,
                        document_code: doc_code,
                        count: stats.count,
                        positions: stats.positions,
                    };
                    let key = instance_key(word_code, doc_code);
                    if word_instances.insert(&key[..], encode(&row)?)?.is_some() {
                        return abort_constraint(format!(
                            "word instance ({word_code}, {doc_code}) already present"
                        ));
                    }
                }
                Ok(())
            })
            .map_err(Error::from)?;
        self.db.flush()?;
        debug!(code = doc_code, words = entries.len(), "committed document");
        Ok(doc_code)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            documents: self.documents.len(),
            words: self.words.len(),
            instances: self.word_instances.len(),
        }
    }

}

fn abort_constraint<T>(msg: String) -> std::result::Result<T, ConflictableTransactionError<Error>> {
    Err(ConflictableTransactionError::Abort(Error::Constraint(msg)))
}

fn encode<T: serde::Serialize>(
    row: &T,
) -> std::result::Result<Vec<u8>, ConflictableTransactionError<Error>> {
    bincode::serialize(row).map_err(|e| ConflictableTransactionError::Abort(Error::Codec(e)))
}

fn decode<'a, T: serde::Deserialize<'a>>(
    raw: &'a [u8],
) -> std::result::Result<T, ConflictableTransactionError<Error>> {
    bincode::deserialize(raw).map_err(|e| ConflictableTransactionError::Abort(Error::Codec(e)))
}

fn instance_key(word_code: WordCode, document_code: DocCode) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&word_code.to_be_bytes());
    key[8..].copy_from_slice(&document_code.to_be_bytes());
    key
}
