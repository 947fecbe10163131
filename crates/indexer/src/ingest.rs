use crate::documents::DocumentService;
use crate::error::Result;
use crate::scanner::DocumentScanner;
use crate::stats::IngestStats;
use netrag_chunker::{Category, StrategyRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Ingests every supported file under a path
pub struct DirectoryIngestor {
    service: Arc<DocumentService>,
    root: PathBuf,
    category: Category,
    request: StrategyRequest,
}

impl DirectoryIngestor {
    pub fn new(service: Arc<DocumentService>, root: impl AsRef<Path>) -> Self {
        Self {
            service,
            root: root.as_ref().to_path_buf(),
            category: Category::General,
            request: StrategyRequest::Auto,
        }
    }

    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn request(mut self, request: StrategyRequest) -> Self {
        self.request = request;
        self
    }

    /// Scan, load and submit each file in turn
    ///
    /// Per-file failures are recorded in the stats and do not stop the run.
    pub async fn run(&self) -> Result<IngestStats> {
        let start = Instant::now();
        let scanner = DocumentScanner::new(&self.root);
        let files = scanner.scan()?;

        let mut stats = IngestStats::new();
        for path in files {
            stats.files += 1;
            let document = match scanner.load(&path, &self.category).await {
                Ok(document) => document,
                Err(e) => {
                    log::warn!("Failed to read {}: {e}", path.display());
                    stats.add_error(format!("{}: {e}", path.display()));
                    continue;
                }
            };

            match self.service.ingest(&document, &self.request).await {
                Ok(receipt) => stats.add_document(&receipt.strategy, receipt.chunks),
                Err(e) => {
                    log::error!("Error adding document {}: {e}", path.display());
                    stats.add_error(format!("{}: {e}", path.display()));
                }
            }
        }

        stats.time_ms = start.elapsed().as_millis() as u64;
        if stats.time_ms == 0 {
            stats.time_ms = 1;
        }

        log::info!(
            "Ingested {} of {} files ({} chunks) in {} ms",
            stats.documents,
            stats.files,
            stats.chunks,
            stats.time_ms
        );
        Ok(stats)
    }
}
