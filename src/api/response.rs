//! Response envelope and request extractors that fail with envelopes

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use crate::StoreWeatherError;

/// Envelope wrapping every API answer
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub success: bool,
    pub message: String,
    pub status_code: u16,
    pub error_code: Option<u16>,
    /// Unix seconds with fractional part
    pub timestamp: String,
}

fn timestamp() -> String {
    let now = Utc::now();
    format!("{}", now.timestamp_millis() as f64 / 1000.0)
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            success: true,
            message: String::new(),
            status_code: StatusCode::OK.as_u16(),
            error_code: None,
            timestamp: timestamp(),
        }
    }

    pub fn failure(status: StatusCode, error_code: u16, message: impl Into<String>) -> Self {
        Self {
            data: None,
            success: false,
            message: message.into(),
            status_code: status.as_u16(),
            error_code: Some(error_code),
            timestamp: timestamp(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for StoreWeatherError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error_code = code.as_u16(), "{}", self);
        } else {
            warn!(error_code = code.as_u16(), "{}", self);
        }

        ApiResponse::<()>::failure(status, code.as_u16(), self.user_message()).into_response()
    }
}

/// `Json` whose rejections become validation envelopes
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = StoreWeatherError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| StoreWeatherError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `Query` whose rejections become validation envelopes
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = StoreWeatherError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| StoreWeatherError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}
