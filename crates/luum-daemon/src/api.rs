//! REST API handlers

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use luum_core::{CaptureKind, ErrorKind, WidgetValue};
use luum_session::PREVIEW_CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::state::{AppState, CallError};
use crate::stream::preview_body;

/// API error response
#[derive(Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

impl IntoResponse for CallError {
    fn into_response(self) -> Response {
        let status = match &self {
            CallError::Camera(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Connection => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Device => StatusCode::BAD_GATEWAY,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            CallError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(status = %status, error = %self, "Request failed");
        } else {
            debug!(status = %status, error = %self, "Request rejected");
        }
        (status, Json(ApiError::new(self.to_string()))).into_response()
    }
}

fn bad_request(msg: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ApiError::new(msg))).into_response()
}

/// Machine name addressed by a setting path (its last segment)
fn setting_name(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|name| !name.is_empty())
}

#[derive(Deserialize)]
pub struct PortQuery {
    port: String,
}

#[derive(Deserialize)]
pub struct SettingQuery {
    port: String,
    path: String,
}

#[derive(Deserialize)]
pub struct ImageQuery {
    port: String,
    #[serde(default)]
    size: Option<u32>,
    #[serde(default)]
    quality: Option<u8>,
}

#[derive(Deserialize)]
pub struct DownloadQuery {
    port: String,
    path: String,
    #[serde(default)]
    size: Option<u32>,
    #[serde(default)]
    quality: Option<u8>,
}

/// Setting update request body
#[derive(Deserialize)]
pub struct UpdateSettingRequest {
    port: String,
    setting: SettingUpdate,
}

#[derive(Deserialize)]
pub struct SettingUpdate {
    path: String,
    value: WidgetValue,
}

/// List detected cameras with their summaries
pub async fn list_cameras(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.list_cameras().await {
        Ok(cameras) => Json(cameras).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Every addressable setting of a camera
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PortQuery>,
) -> impl IntoResponse {
    match state
        .with_session(&query.port, |session| session.read_all_config())
        .await
    {
        Ok(settings) => Json(settings).into_response(),
        Err(e) => e.into_response(),
    }
}

/// One setting, addressed by path
pub async fn get_setting(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SettingQuery>,
) -> impl IntoResponse {
    let Some(name) = setting_name(&query.path).map(str::to_string) else {
        return bad_request(format!("Invalid setting path: {}", query.path));
    };

    match state
        .with_session(&query.port, move |session| session.read_one_config(&name))
        .await
    {
        Ok(setting) => Json(setting).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Write one setting
pub async fn update_setting(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateSettingRequest>,
) -> impl IntoResponse {
    let Some(name) = setting_name(&req.setting.path).map(str::to_string) else {
        return bad_request(format!("Invalid setting path: {}", req.setting.path));
    };

    info!(port = %req.port, setting = %name, value = %req.setting.value, "Setting update requested");

    let value = req.setting.value;
    match state
        .with_session(&req.port, move |session| session.write_config(&name, value))
        .await
    {
        Ok(changed) => Json(serde_json::json!({ "changed": changed })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Storage tree of a camera
pub async fn get_hierarchy(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PortQuery>,
) -> impl IntoResponse {
    match state
        .with_session(&query.port, |session| session.get_file_hierarchy())
        .await
    {
        Ok(root) => Json(root).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Endless multipart stream of live-view frames
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImageQuery>,
) -> impl IntoResponse {
    let session = match state.session(&query.port).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    let size = query.size.unwrap_or(state.config.preview.default_size);
    let quality = query.quality.unwrap_or(state.config.preview.default_quality);
    info!(port = %query.port, size, quality, "Starting preview stream");

    let body = preview_body(session.preview_frames(size, quality), query.port);
    ([(header::CONTENT_TYPE, PREVIEW_CONTENT_TYPE)], body).into_response()
}

/// Capture an image and report where the camera stored it
pub async fn capture_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PortQuery>,
) -> impl IntoResponse {
    match state
        .with_session(&query.port, |session| session.capture(CaptureKind::Image))
        .await
    {
        Ok(path) => Json(path).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Capture an image, then return every file it produced as one zip archive
pub async fn capture_download_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PortQuery>,
) -> impl IntoResponse {
    match state
        .with_session(&query.port, |session| {
            session.capture_and_package(CaptureKind::Image)
        })
        .await
    {
        Ok(package) => {
            debug!(name = %package.name, files = package.files.len(), "Capture packaged");
            Json(serde_json::json!({
                "name": package.name,
                "data": STANDARD.encode(&package.data),
            }))
            .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Download a stored file, optionally re-encoded
pub async fn download_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> impl IntoResponse {
    let size = query.size.unwrap_or(0);
    let quality = query.quality.unwrap_or(0);
    let path = query.path;

    match state
        .with_session(&query.port, move |session| {
            session.download(&path, size, quality)
        })
        .await
    {
        Ok(file) => ([(header::CONTENT_TYPE, file.mimetype)], file.data).into_response(),
        Err(e) => e.into_response(),
    }
}
