use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::users::{repo::RepoError, views};

/// Terminal request failures. Validation and uniqueness problems are not errors here;
/// handlers flash them and redirect.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, Html(views::not_found())).into_response(),
            AppError::Repo(e) => {
                error!(error = %e, "storage failure");
                internal()
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                internal()
            }
        }
    }
}

fn internal() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
