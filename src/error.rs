use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;

use crate::api::response::{ApiResponse, Message};

/// Errors surfaced by the HTTP layer.
///
/// Classification and aggregation never produce these; they come from
/// request validation, directory lookups and the data source.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{:?}", _0)]
    Validation(Vec<String>),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(vec![message.into()])
    }

    /// Log the underlying failure and hide it behind a generic message.
    pub fn internal(context: &str, err: anyhow::Error) -> Self {
        tracing::error!(error = %format!("{err:#}"), "{}", context);
        ApiError::Internal("Internal Server Error".to_string())
    }

    fn message(&self) -> Message {
        match self {
            ApiError::Validation(problems) if problems.len() == 1 => {
                Message::Single(problems[0].clone())
            }
            ApiError::Validation(problems) => Message::Many(problems.clone()),
            ApiError::NotFound(m) | ApiError::Internal(m) => Message::Single(m.clone()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ApiResponse::<()>::failure(self.message(), status))
    }
}
