use std::error::Error as StdError;

use thiserror::Error;

use crate::errors::domain::{DomainError, NotFoundKind};
use crate::errors::ErrorCode;

type BoxedSource = Box<dyn StdError + Send + Sync>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Validation error: {detail}")]
    Validation { detail: String },
    #[error("Insufficient players: {joined} joined, {required} required")]
    InsufficientPlayers { joined: usize, required: usize },
    #[error("Lock acquisition failed for {resource} after {attempts} attempts")]
    LockAcquisitionFailed { resource: String, attempts: u32 },
    #[error("Store error: {detail}")]
    Store {
        code: ErrorCode,
        detail: String,
        #[source]
        source: BoxedSource,
    },
    #[error("Serialization error: {detail}")]
    Serialization {
        detail: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Data corruption: {detail}")]
    DataCorruption { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    /// Helper method to extract error code from any error variant
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound { code, .. } => *code,
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InsufficientPlayers { .. } => ErrorCode::InsufficientPlayers,
            AppError::LockAcquisitionFailed { .. } => ErrorCode::LockAcquisitionFailed,
            AppError::Store { code, .. } => *code,
            AppError::Serialization { .. } => ErrorCode::SerializationError,
            AppError::DataCorruption { .. } => ErrorCode::DataCorruption,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Whether retrying the whole operation may succeed.
    ///
    /// Lock exhaustion and store unavailability are transient; everything
    /// else will fail the same way again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::LockAcquisitionFailed { .. }
                | AppError::Store {
                    code: ErrorCode::StoreUnavailable,
                    ..
                }
        )
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation {
            detail: detail.into(),
        }
    }

    pub fn store(
        code: ErrorCode,
        detail: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            code,
            detail: detail.into(),
            source: Box::new(source),
        }
    }

    pub fn data_corruption(detail: impl Into<String>) -> Self {
        Self::DataCorruption {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(detail) => AppError::Validation { detail },
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Player => ErrorCode::PlayerNotFound,
                    NotFoundKind::Voting => ErrorCode::VotingNotFound,
                    NotFoundKind::Role => ErrorCode::RoleNotFound,
                };
                AppError::NotFound { code, detail }
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization {
            detail: e.to_string(),
            source: e,
        }
    }
}
