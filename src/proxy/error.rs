use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::YapScoreError;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Upstream proxy failed")]
    Upstream { status: StatusCode, detail: String },

    #[error("Username is required")]
    MissingUsername,

    #[error("Invalid proxy configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Scoring(#[from] YapScoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::MissingUsername => StatusCode::BAD_REQUEST,
            ProxyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Scoring(e) => match e {
                YapScoreError::UnknownProject(_) => StatusCode::NOT_FOUND,
                YapScoreError::InvalidHandle(_) | YapScoreError::InvalidFdv(_) => StatusCode::BAD_REQUEST,
                YapScoreError::UpstreamStatus { .. }
                | YapScoreError::HttpError(_)
                | YapScoreError::SerializationError(_) => StatusCode::BAD_GATEWAY,
                YapScoreError::ConfigError(_) | YapScoreError::Cancelled(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ProxyError::Upstream { status, detail } => ErrorBody {
                error: if *status == StatusCode::INTERNAL_SERVER_ERROR {
                    "Proxy error".to_string()
                } else {
                    self.to_string()
                },
                detail: Some(detail.clone()),
            },
            ProxyError::MissingUsername => ErrorBody {
                error: self.to_string(),
                detail: None,
            },
            ProxyError::Config(detail) => ErrorBody {
                error: "Proxy error".to_string(),
                detail: Some(detail.clone()),
            },
            ProxyError::Scoring(e) => ErrorBody {
                error: "Request failed".to_string(),
                detail: Some(e.to_string()),
            },
        };

        (status, Json(body)).into_response()
    }
}
