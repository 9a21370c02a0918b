use std::collections::HashMap;

use crate::render::SlideData;

/// Fetched slide content by content key. Entries live until the next full
/// refresh replaces them; a failed refresh keeps the old entry.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: HashMap<String, SlideData>,
}

impl ContentCache {
    pub fn get(&self, key: &str) -> Option<&SlideData> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, data: SlideData) {
        self.entries.insert(key.into(), data);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_entry() {
        let mut cache = ContentCache::default();
        assert!(cache.is_empty());
        cache.insert("production_monthly", SlideData::Records(serde_json::json!([])));
        cache.insert("production_monthly", SlideData::Markdown("x".into()));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("production_monthly"), Some(&SlideData::Markdown("x".into())));
        assert!(!cache.contains("total_value"));
    }
}
