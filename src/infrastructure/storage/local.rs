use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::{FileStorage, UploadedFile, ALLOWED_EXTENSIONS, MAX_FILE_SIZE};

/// Stores uploads on the local filesystem below a web root
///
/// Returned paths are relative to the web root and always use `/`, so they
/// can be stored as-is and served from the static file route.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    web_root: PathBuf,
    max_file_size: usize,
}

impl LocalFileStorage {
    /// Creates a storage rooted at `web_root`
    ///
    /// The directory does not need to exist yet; upload directories are
    /// created on demand.
    pub fn new(web_root: impl Into<PathBuf>) -> Self {
        Self {
            web_root: web_root.into(),
            max_file_size: MAX_FILE_SIZE,
        }
    }

    /// Derives a collision-resistant name from the client's file name
    ///
    /// Keeps the base name and extension and appends eight random hex
    /// characters: `photo.PNG` becomes `photo_1a2b3c4d.PNG`. Any directory
    /// part sent by the client is dropped.
    pub fn unique_file_name(original: &str) -> String {
        let base = client_file_name(original);
        let path = Path::new(base);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("upload");
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();

        format!("{stem}_{suffix}{extension}")
    }

    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = relative.trim_start_matches('/').replace('\\', "/");
        let path = Path::new(&relative);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }
        Some(self.web_root.join(path))
    }
}

/// Strips any client-side directories, handling both separator styles
fn client_file_name(original: &str) -> &str {
    original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
}

fn has_allowed_extension(file_name: &str) -> bool {
    Path::new(client_file_name(file_name))
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    fn is_valid_image(&self, file: Option<&UploadedFile>) -> bool {
        let Some(file) = file else {
            return false;
        };
        if file.is_empty() || file.len() > self.max_file_size {
            return false;
        }
        has_allowed_extension(&file.file_name)
    }

    async fn upload(&self, file: &UploadedFile, target_dir: &str) -> Option<String> {
        if !self.is_valid_image(Some(file)) {
            tracing::warn!(
                file_name = %file.file_name,
                size = file.len(),
                "Invalid file type or size"
            );
            return None;
        }

        let target_dir = target_dir.replace('\\', "/").trim_matches('/').to_string();
        let Some(directory) = self.resolve(&target_dir) else {
            tracing::warn!(target_dir = %target_dir, "Upload directory escapes the web root");
            return None;
        };

        if let Err(e) = fs::create_dir_all(&directory).await {
            tracing::error!(
                directory = %directory.display(),
                error = %e,
                "Failed to create upload directory"
            );
            return None;
        }

        let file_name = Self::unique_file_name(&file.file_name);
        if let Err(e) = fs::write(directory.join(&file_name), &file.bytes).await {
            tracing::error!(file_name = %file.file_name, error = %e, "Error uploading file");
            return None;
        }

        tracing::info!(file_name = %file_name, "File uploaded successfully");
        if target_dir.is_empty() {
            Some(file_name)
        } else {
            Some(format!("{target_dir}/{file_name}"))
        }
    }

    async fn delete(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }

        let Some(full_path) = self.resolve(path) else {
            tracing::warn!(path, "Refusing to delete a path outside the web root");
            return false;
        };

        match fs::remove_file(&full_path).await {
            Ok(()) => {
                tracing::info!(path, "File deleted successfully");
                true
            }
            // Already gone
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                tracing::error!(path, error = %e, "Error deleting file");
                false
            }
        }
    }
}
