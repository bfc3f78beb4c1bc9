use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Reasons an inbound mail payload cannot become a [`crate::domain::MailItem`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("mail item is missing its identifier")]
    MissingId,
    #[error("mail item {id} is missing its send date")]
    MissingDateSent { id: i64 },
    #[error("mail item {id} has an unparseable send date: {value:?}")]
    InvalidDateSent { id: i64, value: String },
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::new(ErrorCode::Validation, value.to_string())
    }
}
