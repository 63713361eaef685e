use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::error::ChainError;

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl ResponseError for ChainError {
    fn status_code(&self) -> StatusCode {
        match self {
            ChainError::ChainNotFound(_) | ChainError::SnapshotNotFound(_) => StatusCode::NOT_FOUND,
            ChainError::UnsupportedAlgorithm(_)
            | ChainError::IndexOutOfRange { .. }
            | ChainError::InvalidName(_)
            | ChainError::DifficultyTooHigh { .. }
            | ChainError::CorruptSnapshot(_) => StatusCode::BAD_REQUEST,
            ChainError::MiningCancelled { .. } => StatusCode::REQUEST_TIMEOUT,
            ChainError::MiningOverflow | ChainError::Io(_) | ChainError::Serde(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.to_string()))
    }
}
