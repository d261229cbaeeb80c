//! In-memory posting lists keyed by index term.

use std::collections::{BTreeSet, HashMap};

/// Maps an index term to the sequence numbers of the records filed under it.
#[derive(Debug, Default)]
pub(crate) struct PostingIndex {
    postings: HashMap<String, BTreeSet<u64>>,
}

impl PostingIndex {
    pub fn insert(&mut self, keys: &BTreeSet<String>, seq: u64) {
        for key in keys {
            self.postings.entry(key.clone()).or_default().insert(seq);
        }
    }

    pub fn remove(&mut self, keys: &BTreeSet<String>, seq: u64) {
        for key in keys {
            if let Some(seqs) = self.postings.get_mut(key) {
                seqs.remove(&seq);
                if seqs.is_empty() {
                    self.postings.remove(key);
                }
            }
        }
    }

    /// Union of the postings of every key, in sequence order.
    pub fn lookup(&self, keys: &BTreeSet<String>) -> BTreeSet<u64> {
        keys.iter()
            .filter_map(|key| self.postings.get(key))
            .flatten()
            .copied()
            .collect()
    }

    pub fn clear(&mut self) {
        self.postings.clear();
    }

    #[cfg(test)]
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }
}
