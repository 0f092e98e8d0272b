use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use villa_site_store::ContentError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),

    #[error("Malformed query: {0}")]
    MalformedQuery(#[from] QueryRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Content(err) => match err {
                ContentError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                ContentError::Unauthorized => StatusCode::UNAUTHORIZED,
                ContentError::NotFound(_) => StatusCode::NOT_FOUND,
                ContentError::Conflict(_) => StatusCode::CONFLICT,
                ContentError::BackendUnavailable(_)
                | ContentError::SaveFailed(_)
                | ContentError::ListFailed(_)
                | ContentError::UploadFailed(_)
                | ContentError::DeleteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::MalformedBody(_) | ApiError::MalformedQuery(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
