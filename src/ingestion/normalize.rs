//! Address normalisation used by every address comparison

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{LazyLock, Mutex};

/// Repairs for PPR text that went through a bad extended-Latin decode
const TRICKY_CHARS: [(char, &str); 7] = [
    ('Â', ""),
    ('Ã', " "),
    ('\u{82}', ""),
    ('\u{83}', ""),
    ('º', "á"),
    ('¡', ""),
    ('³', ""),
];

pub const COMPARISON_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(size) => size,
    None => panic!("comparison cache size must be non-zero"),
};

static COMPARISON_CACHE: LazyLock<ComparisonCache> =
    LazyLock::new(|| ComparisonCache::new(COMPARISON_CACHE_SIZE));

/// Repair encoding damage and trim. Case is left alone.
pub fn clean_address(raw: Option<&str>) -> Option<String> {
    let raw = raw?;

    let mut repaired = String::with_capacity(raw.len());
    for c in raw.chars() {
        match TRICKY_CHARS.iter().find(|(bad, _)| *bad == c) {
            Some((_, replacement)) => repaired.push_str(replacement),
            None => repaired.push(c),
        }
    }

    Some(repaired.trim().to_string())
}

/// Canonical comparable form: repaired, trimmed, lowercased
pub fn normalize(raw: Option<&str>) -> Option<String> {
    clean_address(raw).map(|address| address.to_lowercase())
}

/// [`normalize`], but `None` when nothing is left to compare. Memoised
/// through a process-wide LRU cache of the last 100 distinct inputs.
pub fn clean_for_comparison(raw: &str) -> Option<String> {
    COMPARISON_CACHE.get_or_normalize(raw)
}

fn normalize_for_comparison(raw: &str) -> Option<String> {
    normalize(Some(raw)).filter(|address| !address.is_empty())
}

/// Bounded least-recently-used memo of comparison forms. A hit refreshes the
/// entry; inserting past capacity evicts the least recently used input.
pub struct ComparisonCache {
    entries: Mutex<LruCache<String, Option<String>>>,
}

impl ComparisonCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get_or_normalize(&self, raw: &str) -> Option<String> {
        // a poisoned cache still holds valid entries
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(cached) = entries.get(raw) {
            return cached.clone();
        }

        let normalized = normalize_for_comparison(raw);
        entries.put(raw.to_string(), normalized.clone());
        normalized
    }

    pub fn contains(&self, raw: &str) -> bool {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.contains(raw)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
