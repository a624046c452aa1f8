use serde::{Deserialize, Serialize};

/// Body of a `POST /chat/` reply.
///
/// The backend answers with `response` (and usually `sources`) on success,
/// but reports a missing index as `{"error": "..."}` with a 2xx status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of a `POST /upload/` reply. Only logged; success is decided by status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub message: String,
}
