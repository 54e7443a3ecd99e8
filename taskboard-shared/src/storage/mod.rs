/// Profile image storage
///
/// Uploads are written in two steps. [`ImageStore::stage`] writes the bytes
/// beside their final location; [`ImageStore::commit`] moves them into place
/// once the user row records the new path, and [`ImageStore::discard`] drops
/// them when the row update fails. A rejected edit therefore never replaces
/// the image the profile currently points to. A crash between the row update
/// and the commit still leaves the row pointing at a missing file.
///
/// # Layout
///
/// [`LocalImageStore`] writes to `<root>/profiles/<user_id>/<user_id>_<name>`,
/// where `<name>` is the final component of the client-supplied file name.
/// Staged files live in the same directory as `.<user_id>_<name>.upload`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

/// Image store error type
#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    /// The client-supplied file name has no usable final component
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An upload written to a staging location, not yet visible at its final path
#[derive(Debug)]
pub struct StagedImage {
    staging: PathBuf,
    target: PathBuf,
}

impl StagedImage {
    /// Path the image will have once committed, as recorded on the user
    pub fn path(&self) -> String {
        self.target.to_string_lossy().into_owned()
    }
}

/// Destination for uploaded profile images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Writes `bytes` for `user_id` to a staging location
    async fn stage(
        &self,
        user_id: i64,
        filename: &str,
        bytes: &[u8],
    ) -> Result<StagedImage, ImageStoreError>;

    /// Moves a staged image to its final path and returns that path
    async fn commit(&self, staged: StagedImage) -> Result<String, ImageStoreError>;

    /// Removes a staged image; failures are logged only
    async fn discard(&self, staged: StagedImage);
}

/// Writes images under a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Strips any directory part a client may have put in the file name
fn base_name(filename: &str) -> Result<&str, ImageStoreError> {
    filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .ok_or_else(|| ImageStoreError::InvalidFileName(filename.to_string()))
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn stage(
        &self,
        user_id: i64,
        filename: &str,
        bytes: &[u8],
    ) -> Result<StagedImage, ImageStoreError> {
        let name = base_name(filename)?;
        let dir = self.root.join("profiles").join(user_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;

        let staged = StagedImage {
            staging: dir.join(format!(".{}_{}.upload", user_id, name)),
            target: dir.join(format!("{}_{}", user_id, name)),
        };
        tokio::fs::write(&staged.staging, bytes).await?;

        Ok(staged)
    }

    async fn commit(&self, staged: StagedImage) -> Result<String, ImageStoreError> {
        tokio::fs::rename(&staged.staging, &staged.target).await?;

        let path = staged.path();
        info!(path = %path, "Stored profile image");
        Ok(path)
    }

    async fn discard(&self, staged: StagedImage) {
        if let Err(e) = tokio::fs::remove_file(&staged.staging).await {
            warn!(path = %staged.staging.display(), error = %e, "Failed to remove staged image");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("avatar.png").unwrap(), "avatar.png");
        assert_eq!(base_name("../../etc/avatar.png").unwrap(), "avatar.png");
        assert_eq!(base_name("C:\\Users\\me\\avatar.png").unwrap(), "avatar.png");
        assert!(base_name("").is_err());
        assert!(base_name("dir/").is_err());
        assert!(base_name("..").is_err());
    }

    #[tokio::test]
    async fn test_commit_writes_per_user_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());

        let staged = store.stage(5, "me.png", b"\x89PNG").await.unwrap();
        let expected = dir.path().join("profiles").join("5").join("5_me.png");
        assert_eq!(PathBuf::from(staged.path()), expected);
        assert!(!expected.exists());

        let path = store.commit(staged).await.unwrap();
        assert_eq!(PathBuf::from(&path), expected);
        assert_eq!(tokio::fs::read(&expected).await.unwrap(), b"\x89PNG");
    }

    #[tokio::test]
    async fn test_commit_overwrites_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());

        let old = store.stage(1, "a.jpg", b"old").await.unwrap();
        store.commit(old).await.unwrap();
        let new = store.stage(1, "a.jpg", b"new").await.unwrap();
        let path = store.commit(new).await.unwrap();

        assert_eq!(tokio::fs::read(path).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_discard_keeps_committed_image() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());

        let first = store.stage(1, "a.jpg", b"kept").await.unwrap();
        let path = store.commit(first).await.unwrap();

        let second = store.stage(1, "a.jpg", b"dropped").await.unwrap();
        store.discard(second).await;

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"kept");
        let entries = std::fs::read_dir(dir.path().join("profiles").join("1"))
            .unwrap()
            .count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_stage_rejects_unusable_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());

        assert!(matches!(
            store.stage(1, "..", b"x").await,
            Err(ImageStoreError::InvalidFileName(_))
        ));
        assert!(!dir.path().join("profiles").exists());
    }
}
