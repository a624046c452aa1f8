use super::state::Action;
use crate::backend::TransportError;

/// Input problems caught before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("empty query")]
    EmptyQuery,
}

impl ValidationError {
    pub fn user_message(self) -> &'static str {
        match self {
            ValidationError::NoFileSelected => "Please select a file to upload.",
            ValidationError::EmptyQuery => "Please enter your question.",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{action} failed: {source}")]
    Transport {
        action: Action,
        #[source]
        source: TransportError,
    },
    /// The action's trigger is disabled because its request is outstanding.
    #[error("{0} already in flight")]
    Busy(Action),
}

impl SessionError {
    /// The text written to `error_text`, if this error is shown at all.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            SessionError::Validation(v) => Some(v.user_message()),
            SessionError::Transport { action, .. } => Some(action.failure_message()),
            SessionError::Busy(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = SessionError::from(ValidationError::EmptyQuery);
        assert_eq!(err.user_message(), Some("Please enter your question."));
        assert_eq!(err.to_string(), "empty query");

        let err = SessionError::Transport {
            action: Action::Upload,
            source: TransportError::Status {
                status: 502,
                body: "bad gateway".into(),
            },
        };
        assert_eq!(err.user_message(), Some("Upload failed. Please try again."));
        assert_eq!(err.to_string(), "upload failed: backend returned 502: bad gateway");

        assert_eq!(SessionError::Busy(Action::Query).user_message(), None);
    }
}
