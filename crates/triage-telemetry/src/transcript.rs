//! Chat transcript persistence
//!
//! Every exchange the server answers is stored as one JSON line:
//! - Append-only writes to `transcript_current.jsonl`
//! - Rotation to a timestamped file once the size limit is reached
//! - Optional SHA-256 hashing of session identifiers
//! - Read-back with session filter and limit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CURRENT_FILE: &str = "transcript_current.jsonl";

/// Configuration for transcript persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Directory to store transcript files
    pub dir: PathBuf,

    /// Maximum file size before rotation (bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Flush to disk after this many records
    #[serde(default = "default_flush_interval")]
    pub flush_interval: usize,

    /// Store SHA-256 digests instead of raw session identifiers
    #[serde(default = "default_true")]
    pub hash_session_ids: bool,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./transcripts"),
            max_file_size: default_max_file_size(),
            flush_interval: default_flush_interval(),
            hash_session_ids: true,
        }
    }
}

fn default_max_file_size() -> u64 {
    50 * 1024 * 1024 // 50MB
}

fn default_flush_interval() -> usize {
    10
}

fn default_true() -> bool {
    true
}

/// One persisted exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    /// Unique record ID
    pub id: String,

    /// Session identifier (hashed when configured)
    pub session_id: String,

    /// Message as received from the user
    pub message: String,

    /// Reply sent back
    pub response: String,

    /// Rule that produced the reply
    pub branch: String,

    pub timestamp: DateTime<Utc>,
}

impl TranscriptRecord {
    /// Create a record stamped now
    pub fn new(
        session_id: impl Into<String>,
        message: impl Into<String>,
        response: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("msg_{}", uuid::Uuid::new_v4()),
            session_id: session_id.into(),
            message: message.into(),
            response: response.into(),
            branch: branch.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Hex SHA-256 digest of a session identifier
pub fn hash_session_id(session_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Transcript file writer with size-based rotation
pub struct TranscriptWriter {
    config: TranscriptConfig,
    current_file: Option<BufWriter<File>>,
    current_size: u64,
    records_since_flush: usize,
    rotations: u32,
}

impl TranscriptWriter {
    /// Create a new transcript writer
    pub fn new(config: TranscriptConfig) -> std::io::Result<Self> {
        std::fs::create_dir_all(&config.dir)?;

        let mut writer = Self {
            config,
            current_file: None,
            current_size: 0,
            records_since_flush: 0,
            rotations: 0,
        };

        writer.open_current()?;
        info!("Transcript directory: {}", writer.config.dir.display());
        Ok(writer)
    }

    /// Append a record
    pub fn write(&mut self, record: &TranscriptRecord) -> std::io::Result<()> {
        if self.current_size >= self.config.max_file_size {
            self.rotate()?;
        }

        let json = if self.config.hash_session_ids {
            let mut hashed = record.clone();
            hashed.session_id = hash_session_id(&record.session_id);
            serde_json::to_string(&hashed)?
        } else {
            serde_json::to_string(record)?
        };
        let line = format!("{}\n", json);
        let bytes = line.as_bytes();

        if let Some(ref mut writer) = self.current_file {
            writer.write_all(bytes)?;
            self.current_size += bytes.len() as u64;
            self.records_since_flush += 1;

            if self.records_since_flush >= self.config.flush_interval {
                writer.flush()?;
                self.records_since_flush = 0;
            }
        }

        Ok(())
    }

    /// Force flush to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.current_file {
            writer.flush()?;
            self.records_since_flush = 0;
        }
        Ok(())
    }

    fn rotate(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.current_file {
            writer.flush()?;
        }
        self.current_file = None;

        self.rotations += 1;
        let current = self.config.dir.join(CURRENT_FILE);
        let rotated = self.config.dir.join(format!(
            "transcript_{}_{:04}.jsonl",
            Utc::now().timestamp_micros(),
            self.rotations
        ));

        if let Err(e) = std::fs::rename(&current, &rotated) {
            warn!("Failed to rotate transcript file: {}", e);
        } else {
            debug!("Rotated transcript file to: {:?}", rotated);
        }

        self.open_current()
    }

    fn open_current(&mut self) -> std::io::Result<()> {
        let path = self.config.dir.join(CURRENT_FILE);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        self.current_size = file.metadata()?.len();
        self.current_file = Some(BufWriter::new(file));
        self.records_since_flush = 0;
        Ok(())
    }
}

impl Drop for TranscriptWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush transcript on drop: {}", e);
        }
    }
}

/// Filter for reading transcripts back
#[derive(Debug, Clone, Default)]
pub struct TranscriptQuery {
    /// Raw session identifier to filter by
    pub session_id: Option<String>,

    /// Maximum records to return
    pub limit: Option<usize>,
}

impl TranscriptQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Reader over rotated and current transcript files, oldest first
pub struct TranscriptReader {
    config: TranscriptConfig,
}

impl TranscriptReader {
    pub fn new(config: TranscriptConfig) -> Self {
        Self { config }
    }

    /// Read records matching the query
    pub fn query(&self, query: &TranscriptQuery) -> std::io::Result<Vec<TranscriptRecord>> {
        let wanted_session = query.session_id.as_deref().map(|id| {
            if self.config.hash_session_ids {
                hash_session_id(id)
            } else {
                id.to_string()
            }
        });
        let limit = query.limit.unwrap_or(usize::MAX);

        let mut results = Vec::new();
        for path in self.transcript_files()? {
            let reader = BufReader::new(File::open(&path)?);

            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }

                let record: TranscriptRecord = match serde_json::from_str(&line) {
                    Ok(record) => record,
                    Err(e) => {
                        warn!("Skipping malformed transcript line in {:?}: {}", path, e);
                        continue;
                    }
                };

                if wanted_session
                    .as_ref()
                    .is_some_and(|wanted| *wanted != record.session_id)
                {
                    continue;
                }

                results.push(record);
                if results.len() >= limit {
                    return Ok(results);
                }
            }
        }

        Ok(results)
    }

    /// Rotated files in name order, then the current file
    fn transcript_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if !self.config.dir.exists() {
            return Ok(files);
        }

        for entry in std::fs::read_dir(&self.config.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "jsonl") && !is_current(&path) {
                files.push(path);
            }
        }
        files.sort();

        let current = self.config.dir.join(CURRENT_FILE);
        if current.exists() {
            files.push(current);
        }
        Ok(files)
    }
}

fn is_current(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == CURRENT_FILE)
}
