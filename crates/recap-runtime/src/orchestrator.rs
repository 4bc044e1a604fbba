//! Analyzer: discovery → extraction → prompt → backend → report.

use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use recap_chat::Backend;
use recap_core::{Error, Result, Settings};
use recap_ingest::{discover, DiscoveryOptions, Extractor};

use crate::prompt::{all_skipped_message, build_prompt, NO_FILES_MESSAGE};
use crate::report::{file_type_stats, Report};
use crate::types::Collected;

/// A backend call in flight, or an answer known without one.
#[derive(Debug)]
pub enum PendingAnalysis {
    Ready(String),
    Running(JoinHandle<Result<String>>),
}

/// Runs one analysis over a folder with fixed settings and backend.
pub struct Analyzer {
    settings: Settings,
    backend: Arc<Backend>,
    model: String,
}

impl Analyzer {
    /// The model defaults to the backend's configured one.
    pub fn new(settings: Settings, backend: Backend) -> Self {
        let model = backend.default_model().to_string();
        Self {
            settings,
            backend: Arc::new(backend),
            model,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Walk `root` and extract the newest `max_prompt_files` files.
    pub fn collect(&self, root: &Path) -> Result<Collected> {
        let options = DiscoveryOptions::from(&self.settings);
        let since = Duration::try_days(i64::from(self.settings.days)).unwrap_or(Duration::MAX);
        let discovery = discover(root, since, &options)?;

        let take = self.settings.max_prompt_files.min(discovery.files.len());
        let batch = Extractor::from_settings(&self.settings).extract_batch(&discovery.files[..take]);

        info!(
            "Found {} files, extracted {} ({} failed)",
            discovery.files.len(),
            batch.documents.len(),
            batch.failures.len()
        );
        Ok(Collected { discovery, batch })
    }

    /// Start the backend call for `collected` on a background task.
    ///
    /// No call is made when nothing was discovered or nothing could be read.
    pub fn submit(&self, collected: &Collected) -> PendingAnalysis {
        if collected.is_empty() {
            debug!("No files in window; skipping backend call");
            return PendingAnalysis::Ready(NO_FILES_MESSAGE.to_string());
        }
        if collected.batch.documents.is_empty() {
            debug!("No file could be extracted; skipping backend call");
            return PendingAnalysis::Ready(all_skipped_message(
                collected.discovery.files.len(),
                &collected.skipped(),
            ));
        }
        let prompt = build_prompt(&collected.batch.documents, &self.settings.response_language);
        PendingAnalysis::Running(
            Arc::clone(&self.backend).spawn_complete(prompt, self.model.clone()),
        )
    }

    /// Wait for the analysis and assemble the report.
    pub async fn finish(&self, collected: Collected, pending: PendingAnalysis) -> Result<Report> {
        let analysis = match pending {
            PendingAnalysis::Ready(text) => text,
            PendingAnalysis::Running(handle) => handle
                .await
                .map_err(|e| Error::Internal(format!("Backend task failed: {}", e)))??,
        };

        let skipped = collected.skipped();
        let Collected { discovery, .. } = collected;
        Ok(Report {
            folder: discovery.root,
            days: self.settings.days,
            file_count: discovery.files.len(),
            file_types: file_type_stats(&discovery.files),
            files: discovery.files,
            skipped,
            analysis,
            model: self.model.clone(),
            backend: self.backend.kind(),
            generated_at: Utc::now(),
        })
    }

    /// Full run: collect, call the backend, build the report.
    pub async fn analyze(&self, root: &Path) -> Result<Report> {
        let collected = self.collect(root)?;
        let pending = self.submit(&collected);
        self.finish(collected, pending).await
    }
}
