use async_trait::async_trait;
use coder_core::PendingFile;

use crate::contracts::FeedbackRequest;
use crate::error::BackendError;

/// The remote knowledge-base and code-generation service.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn ingest_text(&self, content: &str) -> Result<(), BackendError>;

    async fn ingest_file(&self, file: &PendingFile) -> Result<(), BackendError>;

    /// Returns the raw answer text, delimiter and all.
    async fn query(&self, query: &str) -> Result<String, BackendError>;

    async fn feedback(&self, request: &FeedbackRequest) -> Result<(), BackendError>;
}
