use thiserror::Error;

use crate::models::{contractor::ContractorKind, rules::FieldKind};

/// A rule set that cannot be used to validate anything.
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    #[error("Field rule path cannot be empty")]
    EmptyPath,

    #[error("Field rule path '{path}' contains an empty segment")]
    EmptySegment { path: String },

    #[error("Field rule path '{path}' is declared more than once")]
    DuplicatePath { path: String },

    #[error("Field rule '{path}' has an invalid pattern: {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field data is not a mapping")]
    PayloadNotMapping,

    #[error("Field {field} not found")]
    NotFound { field: String },

    #[error("Value of field '{field}' is not of type '{expected}'")]
    WrongType { field: String, expected: FieldKind },

    #[error("Field {field} is required but empty")]
    Empty { field: String, kind: FieldKind },

    #[error("Value of field '{field}' does not match '{pattern}'")]
    PatternMismatch { field: String, pattern: String },
}

impl ValidationError {
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::PayloadNotMapping => None,
            Self::NotFound { field }
            | Self::WrongType { field, .. }
            | Self::Empty { field, .. }
            | Self::PatternMismatch { field, .. } => Some(field),
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::PayloadNotMapping => "not a mapping",
            Self::NotFound { .. } => "not found",
            Self::WrongType { .. } => "wrong type",
            Self::Empty { .. } => "empty",
            Self::PatternMismatch { .. } => "pattern mismatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Empty template data: {}", .keys.join(", "))]
    EmptyData { keys: Vec<&'static str> },
}

/// Failure reported by an external email/SMS transport.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Transport request failed: {0}")]
    Transport(String),

    #[error("Transport rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid transport response: {0}")]
    InvalidResponse(String),
}

impl SendError {
    /// Client-side rejections and unreadable replies will not improve on a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidResponse(_) => false,
        }
    }
}

/// Errors that abort a notification run before any channel is attempted.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unknown notification type {0}")]
    InvalidNotificationType(i64),

    #[error("Client {0} not found")]
    ClientNotFound(i64),

    #[error("Client {id} has invalid type '{kind}'")]
    InvalidClientType { id: i64, kind: ContractorKind },

    #[error("Client {0} is a seller")]
    ClientIsSeller(i64),

    #[error("Creator {0} not found")]
    CreatorNotFound(i64),

    #[error("Expert {0} not found")]
    ExpertNotFound(i64),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl DomainError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Rules(_) => "RULES_MALFORMED",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::InvalidNotificationType(_) => "INVALID_NOTIFICATION_TYPE",
            Self::ClientNotFound(_) => "CLIENT_NOT_FOUND",
            Self::InvalidClientType { .. } => "INVALID_CLIENT_TYPE",
            Self::ClientIsSeller(_) => "CLIENT_IS_SELLER",
            Self::CreatorNotFound(_) => "CREATOR_NOT_FOUND",
            Self::ExpertNotFound(_) => "EXPERT_NOT_FOUND",
            Self::Template(_) => "EMPTY_TEMPLATE_DATA",
        }
    }

    /// HTTP status hint: input and lookup problems are the caller's, broken
    /// rules and incomplete template data are ours.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Rules(_) | Self::Template(_) => 500,
            _ => 400,
        }
    }
}
