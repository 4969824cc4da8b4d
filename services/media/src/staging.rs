//! Scoped temporary storage for incoming uploads
//!
//! The request body is streamed into a named temporary file so the media host
//! client gets a seekable file instead of an in-memory buffer. The file is
//! removed when the [`StagedFile`] is dropped, on success and failure alike.

use std::path::Path;
use tempfile::NamedTempFile;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::debug;

use crate::error::UploadError;

/// Upload bytes parked on local disk
pub struct StagedFile {
    temp: NamedTempFile,
    writer: File,
    size: u64,
}

impl StagedFile {
    /// Create an empty staging file; the suffix keeps the original extension
    pub fn create(original_name: &str) -> Result<Self, UploadError> {
        let suffix = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let temp = tempfile::Builder::new()
            .prefix("feedhub-upload-")
            .suffix(&suffix)
            .tempfile()
            .map_err(UploadError::Staging)?;
        let writer = File::from_std(temp.reopen().map_err(UploadError::Staging)?);

        debug!("Staging upload at {}", temp.path().display());

        Ok(Self {
            temp,
            writer,
            size: 0,
        })
    }

    /// Append a chunk of the upload
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        self.writer
            .write_all(chunk)
            .await
            .map_err(UploadError::Staging)?;
        self.size += chunk.len() as u64;
        Ok(())
    }

    /// Flush everything written so far to disk
    pub async fn finish(&mut self) -> Result<(), UploadError> {
        self.writer.flush().await.map_err(UploadError::Staging)?;
        self.writer.sync_all().await.map_err(UploadError::Staging)
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Bytes written so far
    pub fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_staged_file_keeps_bytes_and_extension() {
        let mut staged = StagedFile::create("holiday.MP4").unwrap();
        staged.write_chunk(b"hello ").await.unwrap();
        staged.write_chunk(b"world").await.unwrap();
        staged.finish().await.unwrap();

        assert_eq!(staged.size(), 11);
        assert!(staged.path().to_string_lossy().ends_with(".MP4"));
        assert_eq!(tokio::fs::read(staged.path()).await.unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_staged_file_is_removed_on_drop() {
        let mut staged = StagedFile::create("no-extension").unwrap();
        staged.write_chunk(b"bytes").await.unwrap();
        staged.finish().await.unwrap();

        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }
}
