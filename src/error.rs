use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::repo::RepoError;
use crate::validate::ValidationError;

/// Error rendition of the `{success, message}` envelope.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Too many requests. Please slow down and try again.")]
    RateLimited,
    #[error("An unexpected error occurred. Please try again.")]
    Internal,
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => ApiError::NotFound("Requested record was not found"),
            RepoError::Internal(msg) => {
                log::error!("repository failure: {msg}");
                ApiError::Internal
            }
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        use actix_web::http::StatusCode;
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        HttpResponse::build(status).json(ApiErrorBody {
            success: false,
            message: self.to_string(),
        })
    }
}
