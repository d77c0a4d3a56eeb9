// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`FrugalError`] to HTTP responses.

use std::time::Duration;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use frugal_core::FrugalError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// A [`FrugalError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub FrugalError);

impl From<FrugalError> for ApiError {
    fn from(e: FrugalError) -> Self {
        Self(e)
    }
}

/// `15 minutes`, `1 minute`, `30 seconds`.
pub fn human_interval(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s >= 60 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{s} seconds"),
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            FrugalError::Validation(_) => StatusCode::BAD_REQUEST,
            FrugalError::Auth => StatusCode::UNAUTHORIZED,
            FrugalError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 429 naming the window length, with `Retry-After` set to the time left in it.
pub fn rate_limited(window: Duration, retry_after: Duration) -> Response {
    too_many_requests(
        format!(
            "Too many requests from this IP, please try again after {}.",
            human_interval(window)
        ),
        retry_after,
    )
}

fn too_many_requests(error: String, retry_after: Duration) -> Response {
    let secs = retry_after.as_secs().max(1);
    let body = ErrorResponse {
        error,
        retry_after_secs: Some(secs),
    };
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(secs));
    response
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.0 {
            FrugalError::RateLimited { retry_after } => too_many_requests(
                format!(
                    "Too many requests, please try again in {}.",
                    human_interval(retry_after.max(Duration::from_secs(1)))
                ),
                retry_after,
            ),
            other => {
                if status.is_server_error() {
                    tracing::error!(error = %other, "request failed");
                }
                let body = ErrorResponse {
                    error: other.to_string(),
                    retry_after_secs: None,
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
