//! HTTP surface: an upload endpoint answering with the theme color of the
//! posted image, and the single page that talks to it.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};

use serde::Serialize;

use crate::{ColorResult, ThemeColorError, ThemeColorOptions, theme_color_bytes};

pub const API_PATH: &str = "/api/getThemeColor";
pub const IMAGE_FIELD: &str = "image";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub options: ThemeColorOptions,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            options: ThemeColorOptions::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

struct AppState {
    options: ThemeColorOptions,
}

/// JSON envelope shared by every answer of the upload endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ColorResult>,
}

impl ApiResponse {
    pub fn ok(data: ColorResult) -> Self {
        Self { success: true, message: None, data: Some(data) }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), data: None }
    }
}

impl ThemeColorError {
    /// Problems with the request itself are the client's; everything that
    /// goes wrong while analysing a well-formed upload is a 500.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed
            | Self::MissingImage
            | Self::MultipleFiles { .. }
            | Self::InvalidForm(_) => StatusCode::BAD_REQUEST,
            Self::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Decode(_)
            | Self::MalformedBuffer { .. }
            | Self::NoDominantColor { .. }
            | Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ThemeColorError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "theme color request failed");
        } else {
            tracing::debug!(error = %self, "theme color request rejected");
        }
        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}

pub fn router(config: &ServerConfig) -> Router {
    let state = Arc::new(AppState { options: config.options });

    Router::new()
        .route("/", get(|| async { Html(INDEX_HTML) }))
        .route("/healthz", get(|| async { "ok" }))
        .route(API_PATH, any(get_theme_color))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state)
}

/// Bind `config.bind_addr` and serve in a background task.
///
/// Returns the bound address (useful with port 0) and the server task.
pub async fn start_server(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::task::JoinHandle<std::io::Result<()>>)> {
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    let addr = listener.local_addr()?;
    let app = router(&config);

    tracing::info!(
        %addr,
        threshold = config.options.threshold,
        alpha = ?config.options.alpha,
        max_upload_bytes = config.max_upload_bytes,
        "theme color server listening"
    );

    let server = tokio::spawn(async move { axum::serve(listener, app).await });
    Ok((addr, server))
}

async fn get_theme_color(
    State(state): State<Arc<AppState>>,
    method: Method,
    form: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse>, ThemeColorError> {
    if method != Method::POST {
        return Err(ThemeColorError::MethodNotAllowed);
    }
    let form = form.map_err(|e| ThemeColorError::InvalidForm(e.body_text()))?;
    let image = read_single_image(form).await?;

    tracing::debug!(bytes = image.len(), "image received");

    let options = state.options;
    let result = tokio::task::spawn_blocking(move || theme_color_bytes(&image, &options))
        .await
        .map_err(|e| ThemeColorError::Worker(e.to_string()))??;

    Ok(Json(ApiResponse::ok(result)))
}

fn form_error(e: MultipartError) -> ThemeColorError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ThemeColorError::UploadTooLarge
    } else {
        ThemeColorError::InvalidForm(e.body_text())
    }
}

/// Pull exactly one `image` field out of the form. Other fields are ignored.
async fn read_single_image(mut form: Multipart) -> Result<Bytes, ThemeColorError> {
    let mut image = None;
    let mut count = 0usize;

    while let Some(field) = form.next_field().await.map_err(form_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        count += 1;
        if count == 1 {
            image = Some(field.bytes().await.map_err(form_error)?);
        }
    }

    match (count, image) {
        (1, Some(bytes)) => Ok(bytes),
        (0, _) => Err(ThemeColorError::MissingImage),
        (count, _) => Err(ThemeColorError::MultipleFiles { count }),
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Image Theme Color Meter</title>
<style>
  body { margin: 0; min-height: 100vh; font-family: system-ui, sans-serif;
         background: #EEEEEE; color: #333333; transition: background .3s, color .3s; }
  main { max-width: 720px; margin: 0 auto; padding: 48px 16px; display: flex;
         flex-direction: column; align-items: center; gap: 24px; }
  #preview { max-width: 100%; max-height: 360px; display: none; }
  #result { display: none; flex-direction: column; align-items: center; gap: 12px; }
  #swatch { width: 120px; height: 120px; border-radius: 8px; border: 1px solid #888; }
  #error { color: #C0392B; font-family: monospace; }
</style>
</head>
<body>
<main>
  <h2>Image Theme Color Meter</h2>
  <img id="preview" alt="">
  <input type="file" id="file" accept="image/*">
  <div id="result">
    <h3>Theme Color Of This Image</h3>
    <div id="swatch"></div>
    <code id="value"></code>
    <div>This color is <strong id="tone"></strong> than other colors</div>
  </div>
  <div id="error"></div>
</main>
<script>
(function(){
  const $ = (id) => document.getElementById(id);
  $('file').onchange = async (ev) => {
    const file = ev.target.files && ev.target.files[0];
    if (!file) return;
    $('error').textContent = '';
    const form = new FormData();
    form.append('image', file);
    let body;
    try {
      const res = await fetch('/api/getThemeColor', { method: 'POST', body: form });
      body = await res.json();
    } catch (e) {
      $('error').textContent = String(e);
      return;
    }
    if (!body.success) {
      $('result').style.display = 'none';
      $('error').textContent = body.message || 'request failed';
      return;
    }
    const { color, isDark } = body.data;
    document.body.style.background = isDark ? '#EEEEEE' : '#333333';
    document.body.style.color = isDark ? '#333333' : '#EEEEEE';
    $('swatch').style.background = color;
    $('value').textContent = color;
    $('tone').textContent = isDark ? 'darker' : 'lighter';
    $('result').style.display = 'flex';
    const img = $('preview');
    img.src = URL.createObjectURL(file);
    img.style.display = 'block';
  };
})();
</script>
</body>
</html>
"#;
