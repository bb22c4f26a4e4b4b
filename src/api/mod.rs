//! HTTP routes under `/api/v1` plus the root and health endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

use crate::auth::{AuthUser, RoleChecker};
use crate::models::{
    HourlyForecast, Location, LocationCreateRequest, Notification, NotificationView, Page,
    PagingRequest, WeatherByGroupIdRequest, WeatherProvider, WeatherSnapshot,
};
use crate::state::AppState;
use crate::{ErrorCode, Result};

pub mod response;

pub use response::{ApiResponse, ValidatedJson, ValidatedQuery};

pub const API_PREFIX: &str = "/api/v1";

/// Full application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthcheck/database", get(database_health))
        .nest(API_PREFIX, api_routes())
        .fallback(not_found)
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/locations", post(create_location))
        .route("/weather/by-group", post(weather_by_group))
        .route("/weather/{provider}/by-group", post(provider_weather_by_group))
        .route("/weather/{provider}/hourly", post(provider_hourly_forecast))
        .route("/notifications", get(list_notifications))
        .route("/notifications/{id}", get(get_notification))
}

async fn root() -> Json<Value> {
    Json(json!({"message": "Welcome to the StoreWeather API"}))
}

#[derive(Debug, Serialize)]
struct DatabaseHealth {
    timestamp: String,
    connected: bool,
    status: &'static str,
}

async fn database_health(State(state): State<Arc<AppState>>) -> axum::response::Response {
    match state.health.ping().await {
        Ok(()) => Json(DatabaseHealth {
            timestamp: Utc::now().to_rfc3339(),
            connected: true,
            status: "connected",
        })
        .into_response(),
        Err(e) => {
            error!("Database ping failed: {}", e);
            ApiResponse::<()>::failure(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::Storage.as_u16(),
                "Database connection failed",
            )
            .into_response()
        }
    }
}

async fn not_found() -> ApiResponse<()> {
    ApiResponse::failure(
        StatusCode::NOT_FOUND,
        ErrorCode::GenericFailure.as_u16(),
        "Not Found",
    )
}

async fn create_location(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LocationCreateRequest>,
) -> Result<ApiResponse<Location>> {
    let location = state.locations.create(request).await?;
    Ok(ApiResponse::ok(location))
}

async fn weather_by_group(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<WeatherByGroupIdRequest>,
) -> Result<ApiResponse<WeatherSnapshot>> {
    let snapshot = state.weather.weather_by_group_id(&request.group_id).await?;
    Ok(ApiResponse::ok(snapshot))
}

async fn provider_weather_by_group(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    ValidatedJson(request): ValidatedJson<WeatherByGroupIdRequest>,
) -> Result<ApiResponse<WeatherSnapshot>> {
    let provider: WeatherProvider = provider.parse()?;
    let snapshot = state
        .weather
        .current_weather(provider, &request.group_id, request.date.as_deref())
        .await?;
    Ok(ApiResponse::ok(snapshot))
}

async fn provider_hourly_forecast(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    ValidatedJson(request): ValidatedJson<WeatherByGroupIdRequest>,
) -> Result<ApiResponse<HourlyForecast>> {
    let provider: WeatherProvider = provider.parse()?;
    let forecast = state
        .weather
        .hourly_forecast(provider, &request.group_id, request.date.as_deref())
        .await?;
    Ok(ApiResponse::ok(forecast))
}

async fn get_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Option<Notification>>> {
    let notification = state.notifications.get_by_id(&id).await?;
    Ok(ApiResponse::ok(notification))
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedQuery(paging): ValidatedQuery<PagingRequest>,
) -> Result<ApiResponse<Page<NotificationView>>> {
    RoleChecker::any().check(&user)?;
    // tenant scoping uses the caller's user id
    let page = state
        .notifications
        .list_for_user(&user.user_id, &user.user_id, &paging)
        .await?;
    Ok(ApiResponse::ok(page))
}
