use crate::document::SelectedFile;
use std::fmt;

pub const UPLOAD_SUCCEEDED: &str = "File uploaded successfully!";
pub const UPLOAD_FAILED: &str = "Upload failed. Please try again.";
pub const QUERY_FAILED: &str = "Failed to get response. Please try again.";

/// The two user-triggered operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Upload,
    Query,
}

impl Action {
    /// Trigger label while idle.
    pub fn idle_label(self) -> &'static str {
        match self {
            Action::Upload => "Upload",
            Action::Query => "Ask",
        }
    }

    /// Trigger label while the request is outstanding.
    pub fn busy_label(self) -> &'static str {
        match self {
            Action::Upload => "Uploading...",
            Action::Query => "Thinking...",
        }
    }

    /// Generic message shown for any transport failure of this action.
    pub fn failure_message(self) -> &'static str {
        match self {
            Action::Upload => UPLOAD_FAILED,
            Action::Query => QUERY_FAILED,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Upload => "upload",
            Action::Query => "query",
        })
    }
}

/// Everything the user can observe about a session.
///
/// `response_text` and `error_text` are shared by both operations and are
/// last-write-wins: when an upload and a query overlap, whichever completes
/// last decides what is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub selected_file: Option<SelectedFile>,
    pub query_text: String,
    pub response_text: String,
    pub upload_in_flight: bool,
    pub query_in_flight: bool,
    pub error_text: String,
}

/// A detached copy of the state, safe to hold across awaits.
pub type SessionSnapshot = SessionState;

impl SessionState {
    pub fn in_flight(&self, action: Action) -> bool {
        match action {
            Action::Upload => self.upload_in_flight,
            Action::Query => self.query_in_flight,
        }
    }

    pub(crate) fn set_in_flight(&mut self, action: Action, value: bool) {
        match action {
            Action::Upload => self.upload_in_flight = value,
            Action::Query => self.query_in_flight = value,
        }
    }

    /// A trigger is disabled while its own request is outstanding.
    pub fn is_enabled(&self, action: Action) -> bool {
        !self.in_flight(action)
    }

    pub fn label(&self, action: Action) -> &'static str {
        if self.in_flight(action) {
            action.busy_label()
        } else {
            action.idle_label()
        }
    }
}
