//! Log source abstraction: read log data from files or mocks.

use async_trait::async_trait;

use crate::error::{LogError, LogResult};

/// Where the ingestor reads lines from.
///
/// Swappable so ingestion can be tested against [`crate::MockLogSource`]
/// without touching the filesystem.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Read every line of `path`, without line terminators.
    async fn read_lines(&self, path: &str) -> LogResult<Vec<String>>;

    /// Check if a source path exists and is readable.
    async fn exists(&self, path: &str) -> bool;
}

/// Reads logs from the local filesystem.
///
/// Invalid UTF-8 is replaced rather than rejected; a log with a few bad
/// bytes still ingests.
pub struct FileLogSource;

#[async_trait]
impl LogSource for FileLogSource {
    async fn read_lines(&self, path: &str) -> LogResult<Vec<String>> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogError::NotFound(path.to_string())
            } else {
                LogError::Io(format!("{path}: {e}"))
            }
        })?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(content.lines().map(String::from).collect())
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}
