use async_trait::async_trait;
use coder_core::config::BackendConfig;
use coder_core::PendingFile;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use serde::Serialize;

use crate::backend::Backend;
use crate::contracts::FeedbackRequest;
use crate::contracts::IngestTextRequest;
use crate::contracts::QueryRequest;
use crate::contracts::QueryResponse;
use crate::contracts::DOCUMENT_FIELD;
use crate::contracts::FEEDBACK_PATH;
use crate::contracts::INGEST_FILE_PATH;
use crate::contracts::QUERY_PATH;
use crate::contracts::ROOT_PATH;
use crate::contracts::SHUTDOWN_PATH;
use crate::error::BackendError;

#[derive(Clone, Debug)]
pub struct HttpBackend {
    config: BackendConfig,
    http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let config = config.clone();
        let http = reqwest::Client::builder()
            .user_agent(concat!("rust-coder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BackendError::Client)?;
        Ok(Self { config, http })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Welcome text served at the backend root.
    pub async fn ping(&self) -> Result<String, BackendError> {
        let url = self.config.endpoint(ROOT_PATH);
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                method: "GET",
                url: url.clone(),
                source,
            })?;
        let res = ensure_success("GET", &url, res).await?;
        res.text().await.map_err(|source| BackendError::Transport {
            method: "GET",
            url,
            source,
        })
    }

    /// Asks the backend to stop its vector store container.
    pub async fn shutdown(&self) -> Result<(), BackendError> {
        let url = self.config.endpoint(SHUTDOWN_PATH);
        let res = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                method: "POST",
                url: url.clone(),
                source,
            })?;
        ensure_success("POST", &url, res).await.map(|_| ())
    }

    async fn post_json<T>(&self, path: &str, body: &T) -> Result<reqwest::Response, BackendError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "POST json");
        let res = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                method: "POST",
                url: url.clone(),
                source,
            })?;
        ensure_success("POST", &url, res).await
    }
}

async fn ensure_success(
    method: &'static str,
    url: &str,
    res: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(BackendError::Status {
        method,
        url: url.to_string(),
        status,
        body,
    })
}

#[async_trait]
impl Backend for HttpBackend {
    async fn ingest_text(&self, content: &str) -> Result<(), BackendError> {
        let body = IngestTextRequest {
            content: content.to_string(),
        };
        self.post_json(self.config.text_ingest_route.path(), &body)
            .await
            .map(|_| ())
    }

    async fn ingest_file(&self, file: &PendingFile) -> Result<(), BackendError> {
        let bytes = tokio::fs::read(file.path())
            .await
            .map_err(|source| BackendError::ReadFile {
                path: file.path().display().to_string(),
                source,
            })?;
        let url = self.config.endpoint(INGEST_FILE_PATH);
        tracing::debug!(%url, file = %file.name, size = bytes.len(), "POST multipart");

        let part = Part::bytes(bytes).file_name(file.name.clone());
        let form = Form::new().part(DOCUMENT_FIELD, part);
        let res = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                method: "POST",
                url: url.clone(),
                source,
            })?;
        ensure_success("POST", &url, res).await.map(|_| ())
    }

    async fn query(&self, query: &str) -> Result<String, BackendError> {
        let body = QueryRequest {
            query: query.to_string(),
        };
        let res = self.post_json(QUERY_PATH, &body).await?;
        let url = self.config.endpoint(QUERY_PATH);
        let ct = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = res.text().await.map_err(|source| BackendError::Transport {
            method: "POST",
            url: url.clone(),
            source,
        })?;
        match serde_json::from_str::<QueryResponse>(&body) {
            Ok(parsed) => Ok(parsed.response),
            Err(e) => Err(BackendError::Decode {
                url,
                detail: format!("{e}; content-type={ct}"),
                body,
            }),
        }
    }

    async fn feedback(&self, request: &FeedbackRequest) -> Result<(), BackendError> {
        self.post_json(FEEDBACK_PATH, request).await.map(|_| ())
    }
}
