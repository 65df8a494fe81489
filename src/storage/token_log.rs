//! Append-only log of tokens deployed through the factory.
//!
//! The log is a port injected into the deployment flow rather than ambient
//! global state: the file-backed implementation serves the app, the
//! in-memory one serves tests. Records are never mutated or removed.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// One successful factory deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedTokenRecord {
    pub address: String,
    pub name: String,
    pub symbol: String,
    /// Unix seconds at deployment time.
    pub timestamp: u64,
}

impl DeployedTokenRecord {
    pub fn now(address: String, name: String, symbol: String) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            address,
            name,
            symbol,
            timestamp,
        }
    }
}

/// Storage port for the deployment log.
pub trait TokenLog {
    fn records(&self) -> Vec<DeployedTokenRecord>;
    fn append(&mut self, record: DeployedTokenRecord) -> Result<(), String>;
}

/// JSON-file log in the OS data directory. Not transactional: the whole
/// list is rewritten on append, last write wins.
pub struct FileTokenLog {
    path: PathBuf,
    records: Vec<DeployedTokenRecord>,
}

impl FileTokenLog {
    /// Open (or start) the log at `path`. A missing or unreadable file
    /// yields an empty log rather than an error.
    pub fn open(path: PathBuf) -> Self {
        let records = fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        Self { path, records }
    }

    /// Default location: `<data dir>/InkMint/deployed_tokens.json`.
    pub fn default_path() -> PathBuf {
        crate::logger::app_data_dir().join("deployed_tokens.json")
    }
}

impl TokenLog for FileTokenLog {
    fn records(&self) -> Vec<DeployedTokenRecord> {
        self.records.clone()
    }

    fn append(&mut self, record: DeployedTokenRecord) -> Result<(), String> {
        self.records.push(record);
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let text = serde_json::to_string_pretty(&self.records)
            .map_err(|e| format!("Could not serialize token log: {}", e))?;
        fs::write(&self.path, text)
            .map_err(|e| format!("Could not write {}: {}", self.path.display(), e))
    }
}

/// In-memory log for tests and dry runs.
#[derive(Default)]
pub struct MemoryTokenLog {
    records: Vec<DeployedTokenRecord>,
}

impl TokenLog for MemoryTokenLog {
    fn records(&self) -> Vec<DeployedTokenRecord> {
        self.records.clone()
    }

    fn append(&mut self, record: DeployedTokenRecord) -> Result<(), String> {
        self.records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_log_appends_in_order() {
        let mut log = MemoryTokenLog::default();
        log.append(DeployedTokenRecord::now("0xaa".into(), "A".into(), "AAA".into()))
            .unwrap();
        log.append(DeployedTokenRecord::now("0xbb".into(), "B".into(), "BBB".into()))
            .unwrap();
        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].address, "0xaa");
        assert_eq!(records[1].symbol, "BBB");
    }

    #[test]
    fn file_log_round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!(
            "inkmint-test-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        let path = dir.join("deployed_tokens.json");
        let _ = fs::remove_file(&path);

        let mut log = FileTokenLog::open(path.clone());
        assert!(log.records().is_empty());
        log.append(DeployedTokenRecord::now(
            "0xcc".into(),
            "Canvas Coin".into(),
            "CNV".into(),
        ))
        .unwrap();

        let reopened = FileTokenLog::open(path.clone());
        let records = reopened.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Canvas Coin");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = std::env::temp_dir().join(format!("inkmint-corrupt-{}", std::process::id()));
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("deployed_tokens.json");
        fs::write(&path, "{not json").unwrap();

        let log = FileTokenLog::open(path);
        assert!(log.records().is_empty());

        let _ = fs::remove_dir_all(&dir);
    }
}
