use crate::server::clock::ClockError;
use crate::server::db::StoreError;
use crate::telemetry::parsing::PacketError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no chart on surface {0:?}")]
    UnknownSurface(String),
    #[error(transparent)]
    BadPacket(#[from] PacketError),
    #[error(transparent)]
    BadClockCommand(#[from] ClockError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("dashboard state lock poisoned")]
    Poisoned,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownSurface(_) => StatusCode::NOT_FOUND,
            ApiError::BadPacket(_) | ApiError::BadClockCommand(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) | ApiError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
