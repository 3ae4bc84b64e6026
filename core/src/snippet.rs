use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::indexer::text_file_name;
use crate::model::SearchResult;
use crate::tokenizer::tokenize;

/// Target display length of a snippet, in characters.
pub const SNIPPET_LENGTH: usize = 100;

const ELLIPSIS: &str = "...";

/// Choose the char window to display: the placement whose position bits,
/// summed across all query-term bitmaps, cover the most occurrences.
/// Returns `(start_offset, display_length)` in chars.
pub fn select_window(document_length: usize, bitmaps: &[u64]) -> (usize, usize) {
    if document_length <= SNIPPET_LENGTH {
        return (0, document_length);
    }
    let chars_per_bit = (document_length as f64 / 63.0).max(1.0);
    let window_bits = ((SNIPPET_LENGTH as f64 / chars_per_bit).ceil() as u32).clamp(1, 63);
    let mask = (1u64 << window_bits) - 1;
    let mut best_offset = 0u32;
    let mut best_score = 0u32;
    // brute-force scan of every start bit; first maximum wins
    for i in 0..(64 - window_bits) {
        let score = bitmaps.iter().map(|bm| ((bm >> i) & mask).count_ones()).sum();
        if score > best_score {
            best_score = score;
            best_offset = i;
        }
    }
    let start = (best_offset as f64 * chars_per_bit) as usize;
    let len = ((window_bits as f64 * chars_per_bit).max(SNIPPET_LENGTH as f64)).ceil() as usize;
    (start, len)
}

/// Render the chosen window as an HTML fragment, bolding every token whose
/// normalized form is one of the query's words. A failed read degrades to
/// an empty snippet so the result list still renders.
pub fn render_snippet(texts_dir: &Path, result: &SearchResult, highlight: &HashSet<String>) -> String {
    let file = texts_dir.join(text_file_name(&result.document_path));
    let text = match fs::read_to_string(&file) {
        Ok(text) => text,
        Err(e) => {
            debug!(file = %file.display(), error = %e, "snippet source unreadable");
            return String::new();
        }
    };
    let slice: String = text
        .chars()
        .skip(result.snippet_start)
        .take(result.snippet_length)
        .collect();
    let taken = slice.chars().count();

    let mut out = String::new();
    if result.snippet_start > 0 {
        out.push_str(ELLIPSIS);
    }
    highlight_into(&mut out, &slice, highlight);
    // a full read suggests there is probably more text after the window
    if taken == result.snippet_length && taken > 0 {
        out.push_str(ELLIPSIS);
    }
    out
}

/// Escaped `<a>` fragment linking a result to its document.
pub fn render_document_link(result: &SearchResult) -> String {
    let mut out = String::new();
    out.push_str("<a href=\"");
    escape_into(&mut out, result.document_path.chars());
    out.push_str("\">");
    escape_into(&mut out, result.document_description.chars());
    out.push_str("</a>");
    out
}

/// HTML-escape `text` into `out`, wrapping word runs that match a
/// highlight term in bold+underline markup. Uses the indexing tokenizer,
/// so matching is accent- and case-insensitive.
fn highlight_into(out: &mut String, text: &str, highlight: &HashSet<String>) {
    let chars: Vec<char> = text.chars().collect();
    let mut cursor = 0;
    for token in tokenize(text) {
        if token.offset > cursor {
            escape_into(out, chars[cursor..token.offset].iter().copied());
        }
        let run = chars[token.offset..token.offset + token.len].iter().copied();
        if highlight.contains(&token.text) {
            out.push_str("<b><u>");
            escape_into(out, run);
            out.push_str("</u></b>");
        } else {
            escape_into(out, run);
        }
        cursor = token.offset + token.len;
    }
    if cursor < chars.len() {
        escape_into(out, chars[cursor..].iter().copied());
    }
}

fn escape_into(out: &mut String, chars: impl Iterator<Item = char>) {
    for c in chars {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_document_shows_everything() {
        let (start, len) = select_window(19, &[0b1, 0b100]);
        assert_eq!(start, 0);
        assert_eq!(len, 19);
    }

    #[test]
    fn boundary_document_length_is_not_windowed() {
        let (start, len) = select_window(SNIPPET_LENGTH, &[u64::MAX]);
        assert_eq!(start, 0);
        assert_eq!(len, SNIPPET_LENGTH);
    }

    #[test]
    fn window_tracks_the_densest_bit_cluster() {
        // 6300 chars -> 100 chars per bit -> 1-bit window
        let bitmap = (1u64 << 40) | (1u64 << 41);
        let (start, len) = select_window(6300, &[bitmap]);
        assert_eq!(start, 4000);
        assert_eq!(len, SNIPPET_LENGTH);
    }

    #[test]
    fn scores_sum_across_term_bitmaps() {
        // one hit early for term A, overlapping hits late for A and B
        let a = (1u64 << 2) | (1u64 << 50);
        let b = 1u64 << 50;
        let (start, _) = select_window(6300, &[a, b]);
        assert_eq!(start, 5000);
    }

    #[test]
    fn first_maximum_wins_ties() {
        let a = (1u64 << 3) | (1u64 << 20);
        let (start, _) = select_window(6300, &[a]);
        assert_eq!(start, 300);
    }

    #[test]
    fn highlight_escapes_and_bolds() {
        let mut out = String::new();
        let highlight: HashSet<String> = ["gatos".to_string()].into_iter().collect();
        highlight_into(&mut out, "<Gatos> & perros", &highlight);
        assert_eq!(out, "&lt;<b><u>Gatos</u></b>&gt; &amp; perros");
    }

    #[test]
    fn missing_side_file_degrades_to_empty_snippet() {
        let result = SearchResult {
            document_path: "missing.htm".into(),
            document_description: "Missing".into(),
            document_length: 500,
            snippet_start: 0,
            snippet_length: 100,
            total_instance_count: 1,
        };
        let rendered = render_snippet(Path::new("/nonexistent-texts"), &result, &HashSet::new());
        assert!(rendered.is_empty());
    }

    #[test]
    fn document_link_is_escaped() {
        let result = SearchResult {
            document_path: "a&b.htm".into(),
            document_description: "A <b> page".into(),
            document_length: 10,
            snippet_start: 0,
            snippet_length: 10,
            total_instance_count: 1,
        };
        assert_eq!(
            render_document_link(&result),
            "<a href=\"a&amp;b.htm\">A &lt;b&gt; page</a>"
        );
    }
}
