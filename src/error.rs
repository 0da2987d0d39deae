use thiserror::Error;

/// Rejections raised by the strict timeline validation path.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimelineError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl TimelineError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HistoryError {
    #[error("edit id '{id}' is present in both the undo and redo stacks")]
    ConflictingSnapshot { id: String },
}

impl HistoryError {
    pub(crate) fn conflicting(id: impl Into<String>) -> Self {
        Self::ConflictingSnapshot { id: id.into() }
    }
}
