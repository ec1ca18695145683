use anyhow::{Context, Result};
use glob::glob;
use serde_json::Value;
use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use super::{DocumentStore, Record, ID_KEY};

/// A directory of `<collection>.jsonl` files, one JSON document per line.
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating store directory {:?}", &dir))?;
        Ok(Self { dir })
    }

    fn path_for(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", collection))
    }

    /// Names of all collections currently on disk, sorted.
    pub fn collections(&self) -> Result<Vec<String>> {
        let pattern = format!("{}/*.jsonl", self.dir.display());
        let mut names: Vec<String> = glob(&pattern)?
            .filter_map(Result::ok)
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn read_path(path: &Path) -> Result<Vec<Record>> {
        let f = File::open(path).with_context(|| format!("opening {:?}", path))?;
        let mut out = Vec::new();
        for (idx, line) in BufReader::new(f).lines().enumerate() {
            let line = line.with_context(|| format!("reading {:?} line {}", path, idx + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(&line)
                .with_context(|| format!("parsing {:?} line {}", path, idx + 1))?
            {
                Value::Object(doc) => out.push(doc),
                other => warn!(path = %path.display(), line = idx + 1, kind = ?other, "skipping non-object document"),
            }
        }
        Ok(out)
    }
}

impl DocumentStore for JsonDirStore {
    fn read_all(&self, collection: &str) -> Result<Vec<Record>> {
        let path = self.path_for(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        Self::read_path(&path)
    }

    /// Rewrites the whole collection: to tmp file, then rename into place.
    fn insert(&mut self, collection: &str, records: &[Record]) -> Result<()> {
        let path = self.path_for(collection);
        let mut docs = self.read_all(collection)?;
        let next_id = docs.len();

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

        let tmp_path = self.dir.join(format!(".{}.jsonl.tmp", collection));
        {
            let tmp = File::create(&tmp_path)
                .with_context(|| format!("creating {:?}", tmp_path))?;
            let mut w = BufWriter::new(tmp);
            for doc in &docs {
                serde_json::to_writer(&mut w, doc).context("serializing document")?;
                w.write_all(b"\n")?;
            }
            w.flush()?;
        }
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;

        debug!(collection, inserted = records.len(), total = docs.len(), "insert");
        Ok(())
    }

    fn delete(&mut self, collection: &str) -> Result<()> {
        let path = self.path_for(collection);
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("removing {:?}", path))?;
            debug!(collection, "deleted collection");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn insert_read_delete() -> Result<()> {
        let tmp = tempdir()?;
        let mut store = JsonDirStore::open(tmp.path())?;

        store.insert(
            "confirmed_ts",
            &[rec(json!({"FIPS": 1001.0, "Admin2": "Autauga", "1/22/20": 0}))],
        )?;
        store.insert("confirmed_ts", &[rec(json!({"FIPS": 1003.0, "Admin2": "Baldwin"}))])?;

        let docs = store.read_all("confirmed_ts")?;
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1][ID_KEY], 1);
        let keys: Vec<&String> = docs[0].keys().collect();
        assert_eq!(keys, vec!["_id", "FIPS", "Admin2", "1/22/20"]);

        assert_eq!(store.collections()?, vec!["confirmed_ts".to_string()]);

        store.delete("confirmed_ts")?;
        assert!(store.read_all("confirmed_ts")?.is_empty());
        assert!(store.collections()?.is_empty());
        Ok(())
    }

    #[test]
    fn persists_across_reopen() -> Result<()> {
        let tmp = tempdir()?;
        {
            let mut store = JsonDirStore::open(tmp.path())?;
            store.replace("states_stats", &[rec(json!({"State/Territory": "Alabama"}))])?;
        }
        let store = JsonDirStore::open(tmp.path())?;
        let docs = store.read_all("states_stats")?;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["State/Territory"], "Alabama");
        Ok(())
    }
}
