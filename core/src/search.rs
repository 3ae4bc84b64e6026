use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::model::{Query, SearchResult};
use crate::snippet::select_window;
use crate::store::Store;
use crate::DocCode;

/// Best-scoring instance of one synonym set within one document.
#[derive(Clone, Copy)]
struct SetHit {
    count: u32,
    positions: u64,
}

/// Conjunctive search: AND across synonym sets, OR within each set. One
/// result per document, scored by the highest-count combination of member
/// instances, ordered by total instance count descending.
pub fn search(store: &Store, query: &Query) -> Result<Vec<SearchResult>> {
    // For each set, the best member instance per document. Picking the
    // per-set maximum is exactly the highest-combined-count combination,
    // since the combined count is a sum over independent set choices.
    let mut per_set: Vec<HashMap<DocCode, SetHit>> = Vec::with_capacity(query.sets.len());
    for set in &query.sets {
        let mut best: HashMap<DocCode, SetHit> = HashMap::new();
        for word in &set.words {
            for inst in store.instances_of(word.code)? {
                let hit = best
                    .entry(inst.document_code)
                    .or_insert(SetHit { count: 0, positions: 0 });
                if inst.count > hit.count {
                    hit.count = inst.count;
                    hit.positions = inst.positions;
                }
            }
        }
        per_set.push(best);
    }

    let Some((first, rest)) = per_set.split_first() else {
        return Ok(Vec::new());
    };

    let mut results = Vec::new();
    'docs: for (&doc_code, first_hit) in first {
        let mut total = first_hit.count as u64;
        let mut bitmaps = vec![first_hit.positions];
        for set in rest {
            let Some(hit) = set.get(&doc_code) else {
                continue 'docs;
            };
            total += hit.count as u64;
            bitmaps.push(hit.positions);
        }
        let Some(doc) = store.document(doc_code)? else {
            continue;
        };
        let (start, len) = select_window(doc.length as usize, &bitmaps);
        results.push(SearchResult {
            document_path: doc.path,
            document_description: doc.description,
            document_length: doc.length,
            snippet_start: start,
            snippet_length: len,
            total_instance_count: total,
        });
    }
    results.sort_by(|a, b| b.total_instance_count.cmp(&a.total_instance_count));
    debug!(sets = query.sets.len(), hits = results.len(), "search complete");
    Ok(results)
}
