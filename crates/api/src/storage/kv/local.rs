//! Development key-value store backed by JSON files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{KvError, KvStore, PutOutcome, validate_key};

/// Reads and writes `<dir>/<key>.json`.
///
/// Read failures are logged and reported as absent; write failures are
/// logged and reported as [`PutOutcome::Discarded`].
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    dir: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, KvError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    async fn write(&self, path: &Path, value: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        // Write beside the target and rename so readers never see half a file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, path).await
    }
}

impl KvStore for LocalFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let path = self.path_for(key)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                tracing::warn!(key, path = %path.display(), error = %e, "Failed to read local kv value");
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<PutOutcome, KvError> {
        let path = self.path_for(key)?;

        match self.write(&path, value).await {
            Ok(()) => Ok(PutOutcome::Persisted),
            Err(e) => {
                tracing::warn!(key, path = %path.display(), error = %e, "Failed to write local kv value");
                Ok(PutOutcome::Discarded)
            }
        }
    }
}
