//! Session state machine
//!
//! One `Session` per user session. It owns the observable state and runs the
//! upload and query operations against a [`Backend`]. Each operation goes
//! idle -> in-flight -> idle; the two may overlap freely.

mod error;
mod state;

pub use error::{SessionError, ValidationError};
pub use state::{
    Action, SessionSnapshot, SessionState, QUERY_FAILED, UPLOAD_FAILED, UPLOAD_SUCCEEDED,
};

use crate::backend::{Answer, Backend, HealthStatus, TransportError};
use crate::document::SelectedFile;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Handle to a session. Clones share the same state.
#[derive(Clone)]
pub struct Session {
    id: Uuid,
    state: Arc<Mutex<SessionState>>,
    backend: Arc<dyn Backend>,
}

/// Clears an action's in-flight flag when dropped, so the flag is reset even
/// if the future driving the operation is abandoned.
struct InFlight {
    state: Arc<Mutex<SessionState>>,
    action: Action,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.state.lock().set_in_flight(self.action, false);
    }
}

impl Session {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: Arc::new(Mutex::new(SessionState::default())),
            backend,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().clone()
    }

    pub fn select_file(&self, file: Option<SelectedFile>) {
        self.state.lock().selected_file = file;
    }

    pub fn set_query_text(&self, text: impl Into<String>) {
        self.state.lock().query_text = text.into();
    }

    pub fn is_enabled(&self, action: Action) -> bool {
        self.state.lock().is_enabled(action)
    }

    /// Upload the selected file.
    ///
    /// On success `response_text` becomes [`UPLOAD_SUCCEEDED`]; on failure
    /// `error_text` becomes [`UPLOAD_FAILED`] and `response_text` is kept.
    #[instrument(name = "upload", skip_all, fields(session = %self.id))]
    pub async fn upload(&self) -> Result<&'static str, SessionError> {
        let (file, guard) = {
            let mut state = self.state.lock();
            if state.upload_in_flight {
                return Err(SessionError::Busy(Action::Upload));
            }
            let Some(file) = state.selected_file.clone() else {
                return Err(fail_validation(&mut state, ValidationError::NoFileSelected));
            };
            (file, self.begin(&mut state, Action::Upload))
        };

        info!(file = %file.name, size = file.size(), "upload started");
        let result = self.backend.upload(&file).await;

        let outcome = {
            let mut state = self.state.lock();
            match result {
                Ok(receipt) => {
                    info!(status = ?receipt.status, "upload finished");
                    state.response_text = UPLOAD_SUCCEEDED.to_string();
                    Ok(UPLOAD_SUCCEEDED)
                }
                Err(source) => Err(fail_transport(&mut state, Action::Upload, source)),
            }
        };
        drop(guard);
        outcome
    }

    /// Send the current query text.
    ///
    /// On success the answer replaces `response_text` and `query_text` is
    /// cleared; on failure `error_text` becomes [`QUERY_FAILED`] and both
    /// texts are kept.
    #[instrument(name = "query", skip_all, fields(session = %self.id))]
    pub async fn query(&self) -> Result<Answer, SessionError> {
        let (query, guard) = {
            let mut state = self.state.lock();
            if state.query_in_flight {
                return Err(SessionError::Busy(Action::Query));
            }
            if state.query_text.trim().is_empty() {
                return Err(fail_validation(&mut state, ValidationError::EmptyQuery));
            }
            let query = state.query_text.clone();
            (query, self.begin(&mut state, Action::Query))
        };

        info!(chars = query.chars().count(), "query started");
        let result = self
            .backend
            .chat(&query)
            .await
            .and_then(Answer::try_from);

        let outcome = {
            let mut state = self.state.lock();
            match result {
                Ok(answer) => {
                    info!(sources = answer.sources.len(), "query answered");
                    state.response_text = answer.text.clone();
                    state.query_text.clear();
                    Ok(answer)
                }
                Err(source) => Err(fail_transport(&mut state, Action::Query, source)),
            }
        };
        drop(guard);
        outcome
    }

    /// Set the query text and send it.
    pub async fn ask(&self, text: impl Into<String>) -> Result<Answer, SessionError> {
        self.set_query_text(text);
        self.query().await
    }

    /// Backend liveness. Leaves the session state alone.
    pub async fn health(&self) -> Result<HealthStatus, TransportError> {
        self.backend.health().await
    }

    fn begin(&self, state: &mut SessionState, action: Action) -> InFlight {
        state.error_text.clear();
        state.set_in_flight(action, true);
        InFlight {
            state: Arc::clone(&self.state),
            action,
        }
    }
}

fn fail_validation(state: &mut SessionState, err: ValidationError) -> SessionError {
    state.error_text = err.user_message().to_string();
    err.into()
}

fn fail_transport(state: &mut SessionState, action: Action, source: TransportError) -> SessionError {
    warn!(error = %source, "{action} failed");
    state.error_text = action.failure_message().to_string();
    SessionError::Transport { action, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ChatReply, UploadReceipt};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingBackend {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Backend for CountingBackend {
        async fn upload(&self, _file: &SelectedFile) -> Result<UploadReceipt, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TransportError::Network("connection refused".into()));
            }
            Ok(UploadReceipt {
                status: Some("uploaded".into()),
            })
        }

        async fn chat(&self, query: &str) -> Result<ChatReply, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TransportError::Status {
                    status: 500,
                    body: String::new(),
                });
            }
            Ok(ChatReply {
                response: Some(format!("echo: {query}")),
                ..ChatReply::default()
            })
        }

        async fn health(&self) -> Result<HealthStatus, TransportError> {
            Ok(HealthStatus {
                message: "RAG API is running".into(),
            })
        }
    }

    fn session_with(backend: CountingBackend) -> (Session, Arc<CountingBackend>) {
        let backend = Arc::new(backend);
        (Session::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn upload_without_file_never_calls_backend() {
        let (session, backend) = session_with(CountingBackend::default());

        let err = session.upload().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::NoFileSelected)
        ));

        let state = session.snapshot();
        assert_eq!(state.error_text, "Please select a file to upload.");
        assert!(!state.upload_in_flight);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn blank_query_never_calls_backend() {
        let (session, backend) = session_with(CountingBackend::default());

        for text in ["", "   ", "\n\t "] {
            session.set_query_text(text);
            let err = session.query().await.unwrap_err();
            assert!(matches!(
                err,
                SessionError::Validation(ValidationError::EmptyQuery)
            ));
            let state = session.snapshot();
            assert_eq!(state.error_text, "Please enter your question.");
            assert!(!state.query_in_flight);
            assert_eq!(state.query_text, text);
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_upload_sets_message_and_clears_error() {
        let (session, _) = session_with(CountingBackend::default());
        session.upload().await.unwrap_err();
        assert!(!session.snapshot().error_text.is_empty());

        session.select_file(Some(SelectedFile::new("doc.txt", b"hello".to_vec())));
        assert_eq!(session.upload().await.unwrap(), UPLOAD_SUCCEEDED);

        let state = session.snapshot();
        assert_eq!(state.response_text, "File uploaded successfully!");
        assert!(state.error_text.is_empty());
        assert!(!state.upload_in_flight);
        assert!(state.selected_file.is_some());
    }

    #[tokio::test]
    async fn query_sends_untrimmed_text_and_clears_input() {
        let (session, _) = session_with(CountingBackend::default());

        let answer = session.ask("  spaced  ").await.unwrap();
        assert_eq!(answer.text, "echo:   spaced  ");

        let state = session.snapshot();
        assert_eq!(state.response_text, "echo:   spaced  ");
        assert_eq!(state.query_text, "");
    }

    #[tokio::test]
    async fn failures_keep_previous_response() {
        let (session, _) = session_with(CountingBackend {
            fail: true,
            ..CountingBackend::default()
        });
        session.state.lock().response_text = "earlier answer".into();
        session.select_file(Some(SelectedFile::new("doc.txt", b"x".to_vec())));

        session.upload().await.unwrap_err();
        let state = session.snapshot();
        assert_eq!(state.error_text, UPLOAD_FAILED);
        assert_eq!(state.response_text, "earlier answer");
        assert!(!state.upload_in_flight);

        session.ask("still there?").await.unwrap_err();
        let state = session.snapshot();
        assert_eq!(state.error_text, QUERY_FAILED);
        assert_eq!(state.response_text, "earlier answer");
        assert_eq!(state.query_text, "still there?");
        assert!(!state.query_in_flight);
    }

    #[test]
    fn snapshots_share_document_content() {
        let (session, _) = session_with(CountingBackend::default());
        session.select_file(Some(SelectedFile::new("big.pdf", vec![0u8; 4 << 20])));

        let first = session.snapshot().selected_file.unwrap();
        let second = session.snapshot().selected_file.unwrap();
        assert!(Arc::ptr_eq(&first.bytes, &second.bytes));
    }

    #[tokio::test]
    async fn health_does_not_touch_state() {
        let (session, _) = session_with(CountingBackend::default());
        let status = session.health().await.unwrap();
        assert_eq!(status.message, "RAG API is running");
        assert_eq!(session.snapshot(), SessionState::default());
    }
}
