use serde::Deserialize;
use serde::Serialize;

pub const INGEST_FILE_PATH: &str = "/api/ingest/file";
pub const QUERY_PATH: &str = "/api/query";
pub const FEEDBACK_PATH: &str = "/api/feedback";
pub const SHUTDOWN_PATH: &str = "/api/shutdown";
pub const ROOT_PATH: &str = "/";

/// Multipart field name the backend reads the uploaded document from.
pub const DOCUMENT_FIELD: &str = "document";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestTextRequest {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub query: String,
    pub code: String,
    pub upvoted: bool,
}
