use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::NamedTempFile;

use crate::export::ExportError;

/// Destination of finished exports.
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Stores `bytes` under `file_name` and returns where it ended up.
    async fn save(&self, file_name: &str, bytes: Bytes) -> Result<PathBuf, ExportError>;
}

/// Writes exports into a directory. The file appears under its final name
/// only once it is completely written.
#[derive(Debug, Clone)]
pub struct FsSink {
    dir: PathBuf,
}

impl FsSink {
    pub fn new(dir: impl Into<PathBuf>) -> FsSink {
        FsSink { dir: dir.into() }
    }
}

#[async_trait]
impl ExportSink for FsSink {
    async fn save(&self, file_name: &str, bytes: Bytes) -> Result<PathBuf, ExportError> {
        let dir = self.dir.clone();
        let target = dir.join(file_name);
        tokio::task::spawn_blocking(move || -> Result<PathBuf, ExportError> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(target)
        })
        .await
        .map_err(|e| ExportError::Task(format!("export write task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_sink_writes_only_the_final_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsSink::new(dir.path().join("exports"));
        let path = sink
            .save("Ada Lovelace.pdf", Bytes::from_static(b"%PDF-1.5"))
            .await
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "Ada Lovelace.pdf");
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5");
        let entries = std::fs::read_dir(dir.path().join("exports")).unwrap().count();
        assert_eq!(entries, 1);
    }
}
