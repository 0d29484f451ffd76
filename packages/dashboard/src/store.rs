//! In-memory point collection keyed by point code.

use std::collections::HashMap;

use mls_locator_point_models::PointRecord;

/// The session's point collection.
///
/// Records keep the order in which their code was first seen. Inserting a
/// record whose code is already present replaces the old record in place.
#[derive(Debug, Clone, Default)]
pub struct PointStore {
    records: Vec<PointRecord>,
    /// code -> index into `records`
    index: HashMap<String, usize>,
}

impl PointStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `records`, resolving duplicate codes
    /// last-write-wins.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = PointRecord>) -> Self {
        let mut store = Self::new();
        store.upsert_many(records);
        store
    }

    /// Inserts or replaces one record.
    pub fn upsert_one(&mut self, record: PointRecord) {
        if let Some(&idx) = self.index.get(&record.code) {
            self.records[idx] = record;
        } else {
            self.index.insert(record.code.clone(), self.records.len());
            self.records.push(record);
        }
    }

    /// Inserts or replaces every record in order.
    pub fn upsert_many(&mut self, records: impl IntoIterator<Item = PointRecord>) {
        for record in records {
            self.upsert_one(record);
        }
    }

    /// Discards the current contents and loads `records`.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = PointRecord>) {
        self.records.clear();
        self.index.clear();
        self.upsert_many(records);
    }

    /// Iterates the collection in insertion order. The iterator is
    /// `Clone`, so it can be restarted without touching the store.
    pub fn all(&self) -> std::slice::Iter<'_, PointRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&PointRecord> {
        self.index.get(code).map(|&idx| &self.records[idx])
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Point codes in insertion order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.code.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mls_locator_point_models::PointStatus;

    fn point(code: &str, name: &str) -> PointRecord {
        PointRecord {
            code: code.to_string(),
            name: name.to_string(),
            ..PointRecord::default()
        }
    }

    #[test]
    fn upsert_replaces_whole_record_in_place() {
        let mut store = PointStore::new();
        store.upsert_many([point("A", "first"), point("B", "b")]);

        let mut replacement = point("A", "second");
        replacement.status = PointStatus::Active;
        store.upsert_one(replacement.clone());

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("A"), Some(&replacement));
        assert_eq!(store.codes().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn one_record_per_code_after_mixed_upserts() {
        let mut store = PointStore::new();
        store.upsert_many([point("A", "1"), point("B", "1"), point("A", "2")]);
        store.upsert_one(point("C", "1"));
        store.upsert_many([point("B", "3"), point("C", "4")]);
        store.upsert_one(point("A", "5"));

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("A").unwrap().name, "5");
        assert_eq!(store.get("B").unwrap().name, "3");
        assert_eq!(store.get("C").unwrap().name, "4");
    }

    #[test]
    fn replace_all_keeps_first_position_for_duplicates() {
        let mut store = PointStore::from_records([point("OLD", "x")]);
        store.replace_all([point("A", "1"), point("B", "1"), point("A", "2")]);

        assert!(!store.contains("OLD"));
        let names: Vec<_> = store.all().map(|r| (r.code.as_str(), r.name.as_str())).collect();
        assert_eq!(names, vec![("A", "2"), ("B", "1")]);
    }

    #[test]
    fn all_is_restartable() {
        let store = PointStore::from_records([point("A", "1"), point("B", "2")]);
        let iter = store.all();
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_store() {
        let store = PointStore::new();
        assert!(store.is_empty());
        assert!(store.get("A").is_none());
        assert_eq!(store.all().count(), 0);
    }
}
