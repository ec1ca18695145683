// src/store/mod.rs

pub mod json_dir;

use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub use json_dir::JsonDirStore;

/// One stored document. Key order is preserved so wide tables keep their
/// column order through a store round trip.
pub type Record = Map<String, Value>;

/// Key assigned by stores that id their documents; never a table column.
pub const ID_KEY: &str = "_id";

/// The pass-through document store the raw tables are cached in.
///
/// Replacing a collection is `delete` followed by `insert`; there is no upsert.
pub trait DocumentStore {
    /// Every document in `collection`, in insertion order. Unknown
    /// collections read as empty.
    fn read_all(&self, collection: &str) -> Result<Vec<Record>>;

    /// Append `records` to `collection`, creating it if needed.
    fn insert(&mut self, collection: &str, records: &[Record]) -> Result<()>;

    /// Remove `collection` and all its documents.
    fn delete(&mut self, collection: &str) -> Result<()>;

    /// Full replace: delete then insert.
    fn replace(&mut self, collection: &str, records: &[Record]) -> Result<()> {
        self.delete(collection)?;
        self.insert(collection, records)
    }
}

/// In-process store; handy for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: BTreeMap<String, Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn read_all(&self, collection: &str) -> Result<Vec<Record>> {
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }

    fn insert(&mut self, collection: &str, records: &[Record]) -> Result<()> {
        let next_id = self.collections.get(collection).map_or(0, Vec::len);
        let docs = self.collections.entry(collection.to_string()).or_default();
        for (i, rec) in records.iter().enumerate() {
            let mut doc = Record::new();
            doc.insert(ID_KEY.into(), Value::from((next_id + i) as u64));
            doc.extend(
                rec.iter()
                    .filter(|(k, _)| k.as_str() != ID_KEY)
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
            docs.push(doc);
        }
        Ok(())
    }

    fn delete(&mut self, collection: &str) -> Result<()> {
        self.collections.remove(collection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn memory_store_replace_is_delete_then_insert() -> Result<()> {
        let mut store = MemoryStore::new();
        store.insert("states_stats", &[rec(json!({"State/Territory": "Alabama"}))])?;
        store.insert("states_stats", &[rec(json!({"State/Territory": "Alaska"}))])?;
        assert_eq!(store.read_all("states_stats")?.len(), 2);

        store.replace("states_stats", &[rec(json!({"State/Territory": "Ohio"}))])?;
        let docs = store.read_all("states_stats")?;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["State/Territory"], "Ohio");
        assert!(docs[0].contains_key(ID_KEY));
        Ok(())
    }

    #[test]
    fn unknown_collection_reads_empty() -> Result<()> {
        let store = MemoryStore::new();
        assert!(store.read_all("nope")?.is_empty());
        Ok(())
    }
}
