use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::core::LlmError;

use super::accountant::UsageLogRecord;

/// Append-only destination for usage records.
///
/// Implementations must accept concurrent appends. `list` returns records
/// newest first.
#[async_trait]
pub trait UsageSink: Send + Sync {
    async fn append(&self, record: UsageLogRecord) -> Result<(), LlmError>;

    async fn list(&self) -> Result<Vec<UsageLogRecord>, LlmError>;
}

#[derive(Debug, Default)]
pub struct MemoryUsageSink {
    records: Mutex<Vec<UsageLogRecord>>,
}

impl MemoryUsageSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<T>(_: T) -> LlmError {
        LlmError::Sink {
            message: "Usage log lock poisoned".to_string(),
            source: None,
        }
    }
}

#[async_trait]
impl UsageSink for MemoryUsageSink {
    async fn append(&self, record: UsageLogRecord) -> Result<(), LlmError> {
        self.records.lock().map_err(Self::poisoned)?.push(record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<UsageLogRecord>, LlmError> {
        let records = self.records.lock().map_err(Self::poisoned)?;
        Ok(records.iter().rev().cloned().collect())
    }
}

/// One JSON object per line, appended to a file.
#[derive(Debug)]
pub struct JsonlUsageSink {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonlUsageSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, action: &str, e: std::io::Error) -> LlmError {
        LlmError::Sink {
            message: format!("Failed to {action} `{}`", self.path.display()),
            source: Some(Box::new(e)),
        }
    }
}

#[async_trait]
impl UsageSink for JsonlUsageSink {
    async fn append(&self, record: UsageLogRecord) -> Result<(), LlmError> {
        let mut line = serde_json::to_string(&record).map_err(|e| LlmError::Sink {
            message: "Failed to serialize usage record".to_string(),
            source: Some(Box::new(e)),
        })?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error("open", e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.io_error("write", e))?;
        file.flush().await.map_err(|e| self.io_error("flush", e))
    }

    async fn list(&self) -> Result<Vec<UsageLogRecord>, LlmError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error("read", e)),
        };

        let mut records = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| LlmError::Sink {
                    message: "Corrupt usage log line".to_string(),
                    source: Some(Box::new(e)),
                })
            })
            .collect::<Result<Vec<UsageLogRecord>, _>>()?;
        records.reverse();
        Ok(records)
    }
}
