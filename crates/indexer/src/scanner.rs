use crate::error::{IndexerError, Result};
use netrag_chunker::{Category, Document, DocumentMetadata};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

const SUPPORTED_EXTENSIONS: &[&str] = &[
    "txt", "text", "cfg", "conf", "config", "ios", "log", "md", "rst", "csv",
];

/// Finds text documents under a file or directory
pub struct DocumentScanner {
    root: PathBuf,
}

impl DocumentScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Supported files under the root; a file root is returned as-is
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Err(IndexerError::InvalidPath(self.root.display().to_string()));
        }
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !Self::is_hidden(entry.path()));

        for result in walker {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > MAX_FILE_SIZE_BYTES {
                            log::debug!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                MAX_FILE_SIZE_BYTES
                            );
                            continue;
                        }
                    }

                    if !Self::is_document_file(path) {
                        continue;
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        log::info!("Found {} documents under {}", files.len(), self.root.display());
        Ok(files)
    }

    /// Read a file into a document tagged with `category`
    pub async fn load(&self, path: &Path, category: &Category) -> Result<Document> {
        let content = tokio::fs::read_to_string(path).await?;
        let size = content.len() as u64;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| IndexerError::InvalidPath(path.display().to_string()))?;

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative = if relative.as_os_str().is_empty() {
            Path::new(&filename)
        } else {
            relative
        };
        let now = chrono::Utc::now();
        let id = format!("{}_{}", slug(relative), now.timestamp_millis());

        Ok(Document::new(
            id,
            content,
            DocumentMetadata::new(filename, file_type(path), now.to_rfc3339(), size)
                .category(category.clone()),
        ))
    }

    fn is_document_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                SUPPORTED_EXTENSIONS.iter().any(|candidate| *candidate == ext)
            })
            .unwrap_or(false)
    }

    fn is_hidden(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'))
    }
}

fn file_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("md") => "text/markdown",
        Some("csv") => "text/csv",
        _ => "text/plain",
    }
}

/// Id-safe form of a relative path
fn slug(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}
