use super::{Backend, ChatReply, HealthStatus, TransportError, UploadReceipt};
use crate::config::Config;
use crate::document::SelectedFile;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use std::time::Duration;
use tracing::debug;

/// Longest error body kept in a `TransportError::Status`.
const MAX_ERROR_BODY: usize = 512;

/// `reqwest`-backed client for the RAG service.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    upload_url: String,
    chat_url: String,
    health_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            upload_url: config.endpoint(&config.upload_path),
            chat_url: config.endpoint(&config.chat_path),
            health_url: config.endpoint("/"),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadReceipt, TransportError> {
        // The request body needs owned bytes; this is the only copy per upload.
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| TransportError::Encode(format!("invalid MIME type {:?}: {e}", file.mime_type)))?;
        let form = multipart::Form::new().part("file", part);

        debug!(url = %self.upload_url, file = %file.name, size = file.size(), "uploading document");
        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        // The receipt is informational; a 2xx with an unexpected body still counts.
        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn chat(&self, query: &str) -> Result<ChatReply, TransportError> {
        let form = multipart::Form::new().text("query", query.to_string());

        debug!(url = %self.chat_url, "sending query");
        let response = self
            .client
            .post(&self.chat_url)
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        let response = self.client.get(&self.health_url).send().await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

async fn ensure_success(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(TransportError::Status {
        status: status.as_u16(),
        body,
    })
}
