// File storage for uploaded images

pub mod local;

pub use local::LocalFileStorage;

use async_trait::async_trait;
use bytes::Bytes;

/// Largest accepted upload, in bytes (5 MiB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Image extensions accepted for upload, compared case-insensitively
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "bmp"];

/// A file received from a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name the client gave the file, possibly including a client-side path
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Storage for uploaded files under a web-accessible root
///
/// Failures never escape this boundary: `upload` yields `None` and `delete`
/// yields `false`, after logging the cause.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Whether `file` is present, non-empty, within the size limit, and has
    /// an allowed image extension
    fn is_valid_image(&self, file: Option<&UploadedFile>) -> bool;

    /// Writes `file` under `target_dir` and returns its relative path
    async fn upload(&self, file: &UploadedFile, target_dir: &str) -> Option<String>;

    /// Removes the file at a relative path; a missing file counts as removed
    async fn delete(&self, path: &str) -> bool;
}
