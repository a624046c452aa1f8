//! Backend port
//!
//! The remote RAG service owns ingestion, retrieval and generation. This
//! module only describes the three calls the client makes against it.

pub mod http;
pub mod schema;

pub use http::HttpBackend;
pub use schema::{ChatReply, HealthStatus, UploadReceipt};

use crate::document::SelectedFile;
use async_trait::async_trait;

/// Any failure of a backend call. The cause is for logs; users see one
/// generic message per operation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("could not build request: {0}")]
    Encode(String),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("response carried no answer{}", detail_suffix(.0))]
    MissingAnswer(Option<String>),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// An answer extracted from a successful chat reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<String>,
}

impl TryFrom<ChatReply> for Answer {
    type Error = TransportError;

    fn try_from(reply: ChatReply) -> Result<Self, Self::Error> {
        match reply.response {
            Some(text) => Ok(Answer {
                text,
                sources: reply
                    .sources
                    .into_iter()
                    .filter(|s| !s.trim().is_empty())
                    .collect(),
            }),
            None => Err(TransportError::MissingAnswer(reply.error)),
        }
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /upload/` with the document under multipart field `file`.
    async fn upload(&self, file: &SelectedFile) -> Result<UploadReceipt, TransportError>;

    /// `POST /chat/` with the question under form field `query`.
    async fn chat(&self, query: &str) -> Result<ChatReply, TransportError>;

    /// `GET /` liveness check.
    async fn health(&self) -> Result<HealthStatus, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_drops_blank_sources() {
        let reply = ChatReply {
            response: Some("Paris".into()),
            sources: vec!["geo.txt".into(), "  ".into(), "".into()],
            error: None,
        };
        let answer = Answer::try_from(reply).unwrap();
        assert_eq!(answer.text, "Paris");
        assert_eq!(answer.sources, vec!["geo.txt".to_string()]);
    }

    #[test]
    fn reply_without_response_is_missing_answer() {
        let reply = ChatReply {
            error: Some("No documents uploaded".into()),
            ..ChatReply::default()
        };
        let err = Answer::try_from(reply).unwrap_err();
        assert_eq!(
            err.to_string(),
            "response carried no answer (No documents uploaded)"
        );
    }

    #[test]
    fn empty_answer_text_is_still_an_answer() {
        let reply = ChatReply {
            response: Some(String::new()),
            ..ChatReply::default()
        };
        assert_eq!(Answer::try_from(reply).unwrap().text, "");
    }
}
