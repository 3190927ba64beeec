use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use anyhow::Error;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

/// An upload written to disk for the duration of one analysis. The file is
/// removed when the guard is dropped, whatever path the analysis took.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    bytes: u64,
}

impl StagedUpload {
    /// stage drains `upload` into a uniquely named file under `dir`.
    ///
    /// # Arguments
    /// * `dir` - staging directory, created if missing
    /// * `upload` - the uploaded video body
    ///
    /// # Returns
    /// * `Result<StagedUpload, Error>`
    pub async fn stage<R>(dir: &Path, mut upload: R) -> Result<Self, Error>
    where
        R: AsyncRead + Unpin,
    {
        tokio::fs::create_dir_all(dir).await?;
        let mut staged = StagedUpload {
            path: dir.join(format!("upload-{}.mp4", Uuid::new_v4())),
            bytes: 0,
        };

        let mut file = tokio::fs::File::create(&staged.path).await?;
        staged.bytes = tokio::io::copy(&mut upload, &mut file).await?;
        file.flush().await?;
        debug!(path = %staged.path.display(), bytes = staged.bytes, "staged upload");

        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed staged upload"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove staged upload"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, ReadBuf};
    use uuid::Uuid;
    use crate::utils::staging::StagedUpload;

    pub(crate) fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("staging-test-{}", Uuid::new_v4()))
    }

    pub(crate) fn dir_is_empty(dir: &PathBuf) -> bool {
        std::fs::read_dir(dir).map(|mut entries| entries.next().is_none()).unwrap_or(true)
    }

    /// Yields a few bytes, then fails like a dropped connection.
    struct BrokenUpload {
        sent: bool,
    }

    impl AsyncRead for BrokenUpload {
        fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<std::io::Result<()>> {
            if self.sent {
                return Poll::Ready(Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "upload interrupted")))
            }
            self.sent = true;
            buf.put_slice(b"partial");
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_stage_writes_and_drop_removes() {
        let dir = scratch_dir();
        let staged = StagedUpload::stage(&dir, &b"video bytes"[..]).await.unwrap();

        let path = staged.path().to_path_buf();
        assert_eq!(staged.bytes(), 11);
        assert_eq!(std::fs::read(&path).unwrap(), b"video bytes");

        drop(staged);
        assert!(!path.exists());
        assert!(dir_is_empty(&dir));
        std::fs::remove_dir(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_stages_use_distinct_paths() {
        let dir = scratch_dir();
        let (a, b) = tokio::join!(
            StagedUpload::stage(&dir, &b"first"[..]),
            StagedUpload::stage(&dir, &b"second"[..]),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.path(), b.path());

        drop(a);
        drop(b);
        assert!(dir_is_empty(&dir));
        std::fs::remove_dir(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_interrupted_upload_leaves_nothing_behind() {
        let dir = scratch_dir();
        let result = StagedUpload::stage(&dir, BrokenUpload { sent: false }).await;

        assert!(result.is_err());
        assert!(dir_is_empty(&dir));
        std::fs::remove_dir(&dir).unwrap();
    }
}
