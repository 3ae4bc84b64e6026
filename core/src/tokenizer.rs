use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// A maximal run of word characters, with `offset` and `len` in char
/// coordinates of the source text. `text` is the normalized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub offset: usize,
    pub len: usize,
}

/// Lowercase and accent-fold a single character (á→a, É→e, ñ→n, …).
/// `Some` iff the folded character is alphanumeric, i.e. a word character.
pub fn fold_char(c: char) -> Option<char> {
    let lower = c.to_lowercase().next().unwrap_or(c);
    let base = lower.nfkd().find(|d| !is_combining_mark(*d)).unwrap_or(lower);
    if base.is_alphanumeric() {
        Some(base)
    } else {
        None
    }
}

/// Fold every character of `s` and drop the non-word ones. Idempotent.
pub fn normalize(s: &str) -> String {
    s.chars().filter_map(fold_char).collect()
}

/// Split text into tokens: maximal runs of word characters, everything else
/// is a separator. Scans chars left to right, recording each run's start.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    let mut len = 0;
    for (pos, c) in text.chars().enumerate() {
        match fold_char(c) {
            Some(folded) => {
                if current.is_empty() {
                    start = pos;
                }
                current.push(folded);
                len += 1;
            }
            None => {
                if !current.is_empty() {
                    tokens.push(Token { text: std::mem::take(&mut current), offset: start, len });
                    len = 0;
                }
            }
        }
    }
    if !current.is_empty() {
        tokens.push(Token { text: current, offset: start, len });
    }
    tokens
}
