use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{store::StoreError, tmdb::TmdbError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Tmdb(#[from] TmdbError),

    #[error("no movie matches id {0:?}")]
    BadId(String),

    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Store(StoreError::NotFound(_)) | AppError::BadId(_) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Tmdb(_) => StatusCode::BAD_GATEWAY,
            AppError::Store(StoreError::Db(_)) | AppError::Db(_) | AppError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Something went wrong. Please try again.".to_string()
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
            self.to_string()
        };

        let body = crate::templates::error_page(status, &message);
        (status, Html(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
