//! Audit sinks
//!
//! The write path is a trait so file-based, database-backed, or streaming
//! implementations are interchangeable without touching the decision logic.
//! The bundled sink appends one JSON record per line to one file per
//! calendar day, serializes concurrent writers behind a mutex, and chains
//! record hashes within each file for tamper evidence.

use crate::record::AuditRecord;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use promptgate_core::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Append-only destination for audit records
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one record; must be atomic per entry
    async fn append(&self, record: &AuditRecord) -> Result<()>;
}

struct SinkState {
    day: Option<NaiveDate>,
    file: Option<File>,
    chain_hash: Option<String>,
}

/// JSONL audit sink, one file per calendar day.
///
/// Entries are flushed per record; ordering across concurrent callers is
/// not guaranteed, only that no entry interleaves mid-record.
pub struct JsonlAuditSink {
    dir: PathBuf,
    state: Mutex<SinkState>,
}

impl JsonlAuditSink {
    /// Create a sink writing into the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::audit(format!("failed to create audit directory: {}", e)))?;

        Ok(Self {
            dir,
            state: Mutex::new(SinkState {
                day: None,
                file: None,
                chain_hash: None,
            }),
        })
    }

    /// Path of the day file for a given date
    pub fn day_path(&self, day: NaiveDate) -> PathBuf {
        self.dir.join(format!("audit-{}.jsonl", day.format("%Y-%m-%d")))
    }

    /// Read every record from one day file
    pub fn read_day(&self, day: NaiveDate) -> Result<Vec<AuditRecord>> {
        read_records(&self.day_path(day))
    }

    fn roll_to(&self, state: &mut SinkState, day: NaiveDate) -> Result<()> {
        let path = self.day_path(day);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::audit(format!("failed to open {}: {}", path.display(), e)))?;

        // Resume the hash chain if the process restarted mid-day.
        let chain_hash = last_hash(&path)?;
        if chain_hash.is_some() {
            debug!(path = %path.display(), "resumed audit hash chain");
        } else {
            info!(path = %path.display(), "opened new audit day file");
        }

        state.day = Some(day);
        state.file = Some(file);
        state.chain_hash = chain_hash;
        Ok(())
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn append(&self, record: &AuditRecord) -> Result<()> {
        let mut state = self.state.lock().await;

        let today = Utc::now().date_naive();
        if state.day != Some(today) || state.file.is_none() {
            self.roll_to(&mut state, today)?;
        }

        let mut chained = record.clone();
        chained.prev_hash = state.chain_hash.clone();
        let hash = chained.chain_hash();
        chained.hash = Some(hash.clone());

        let line = serde_json::to_string(&chained)?;
        let file = state
            .file
            .as_mut()
            .ok_or_else(|| Error::audit("audit file not open"))?;
        writeln!(file, "{}", line).map_err(|e| Error::audit(format!("append failed: {}", e)))?;
        file.flush()
            .map_err(|e| Error::audit(format!("flush failed: {}", e)))?;

        state.chain_hash = Some(hash);
        Ok(())
    }
}

/// Verify the hash chain of one audit file
pub fn verify_file(path: &Path) -> Result<bool> {
    let mut prev: Option<String> = None;

    for record in read_records(path)? {
        if record.prev_hash != prev {
            return Ok(false);
        }

        let mut unhashed = record.clone();
        unhashed.hash = None;
        if record.hash.as_deref() != Some(unhashed.chain_hash().as_str()) {
            return Ok(false);
        }

        prev = record.hash;
    }

    Ok(true)
}

fn read_records(path: &Path) -> Result<Vec<AuditRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file =
        File::open(path).map_err(|e| Error::audit(format!("failed to open {}: {}", path.display(), e)))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| Error::audit(format!("read failed: {}", e)))?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }

    Ok(records)
}

fn last_hash(path: &Path) -> Result<Option<String>> {
    Ok(read_records(path)?.last().and_then(|record| record.hash.clone()))
}
