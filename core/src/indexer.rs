use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::counter::WordCounter;
use crate::error::Result;
use crate::store::{NewDocument, Store};
use crate::tokenizer::tokenize;
use crate::DocCode;

/// Side text file name for a document path, e.g. `"dir/page.htm"` →
/// `"page.txt"`. The snippet extractor reads the raw body back from it.
pub fn text_file_name(path: &str) -> String {
    let stem = Path::new(path).file_stem().and_then(|s| s.to_str()).unwrap_or(path);
    format!("{stem}.txt")
}

/// Drives one atomic indexing operation per page: tokenize body and title,
/// accumulate per-word stats, write the side text file, commit to the
/// store. There is no duplicate-path guard: indexing the same path twice
/// appends a second Document row.
pub struct Indexer<'a> {
    store: &'a Store,
    texts_dir: PathBuf,
}

impl<'a> Indexer<'a> {
    pub fn new(store: &'a Store, texts_dir: impl Into<PathBuf>) -> Self {
        Self { store, texts_dir: texts_dir.into() }
    }

    /// Index one page. The side file write happens before the store
    /// transaction, so a failed commit leaves no rows behind; a failed
    /// write aborts before anything is persisted.
    pub fn index_document(&self, path: &str, title: &str, body: &str) -> Result<DocCode> {
        let length = body.chars().count();
        let mut counter = WordCounter::new(length);
        for token in tokenize(body) {
            counter.add(token.text, token.offset, false);
        }
        for token in tokenize(title) {
            counter.add(token.text, token.offset, true);
        }

        fs::create_dir_all(&self.texts_dir)?;
        fs::write(self.texts_dir.join(text_file_name(path)), body)?;

        let doc = NewDocument {
            path: path.to_string(),
            description: title.to_string(),
            length: length as u64,
        };
        let entries = counter.into_entries();
        let code = self.store.commit_document(&doc, &entries)?;
        debug!(code, path, words = entries.len(), "indexed document");
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_file_name_uses_the_path_stem() {
        assert_eq!(text_file_name("help/intro.htm"), "intro.txt");
        assert_eq!(text_file_name("index.html"), "index.txt");
        assert_eq!(text_file_name("plain"), "plain.txt");
    }
}
