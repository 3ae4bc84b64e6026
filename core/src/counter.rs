use std::collections::HashMap;

/// Weight added per title occurrence; body occurrences add 1.
pub const TITLE_WEIGHT: u32 = 15;

/// Accumulated weight and position bitmap of one word within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordStats {
    pub count: u32,
    pub positions: u64,
}

/// Per-document accumulator mapping each distinct normalized word to an
/// occurrence weight and a 64-segment position bitmap. One instance per
/// document-indexing operation; drained into the store commit.
#[derive(Debug)]
pub struct WordCounter {
    document_length: usize,
    entries: HashMap<String, WordStats>,
}

impl WordCounter {
    pub fn new(document_length: usize) -> Self {
        Self { document_length, entries: HashMap::new() }
    }

    /// Record one occurrence. Title hits always land in segment 0 and carry
    /// the fixed title weight; body hits land in the segment holding
    /// `char_offset`. Repeat occurrences add counts and OR bitmaps.
    pub fn add(&mut self, word: String, char_offset: usize, is_title: bool) {
        let (bit, weight) = if is_title {
            (0, TITLE_WEIGHT)
        } else {
            (self.segment(char_offset), 1)
        };
        let stats = self.entries.entry(word).or_insert(WordStats { count: 0, positions: 0 });
        stats.count += weight;
        stats.positions |= 1u64 << bit;
    }

    // i-th of 64 equal-length segments; offsets inside the document always
    // map to [0, 63]
    fn segment(&self, char_offset: usize) -> u32 {
        if self.document_length == 0 {
            return 0;
        }
        ((char_offset as f64 / self.document_length as f64) * 63.0) as u32
    }

    pub fn into_entries(self) -> Vec<(String, WordStats)> {
        self.entries.into_iter().collect()
    }
}
