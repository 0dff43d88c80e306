//! REST endpoint handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use formgen::{FormGenerator, FormSchema, UpstreamError};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub generator: FormGenerator,
}

/// Request body for POST /generate-form.
#[derive(Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

/// JSON body returned when the model could not be reached.
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}

/// Upstream failure rendered as an HTTP response.
pub struct ApiError(pub UpstreamError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            UpstreamError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            UpstreamError::RateLimited { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// POST /generate-form — Generate a form schema from a prompt.
///
/// Returns 200 with `{title, fields}` whenever the model answered, however
/// malformed the answer. Model invocation failures return 502 (504 on
/// timeout, 503 when rate limited) with an [`ErrorBody`].
pub async fn post_generate_form(
    State(app): State<AppState>,
    Json(body): Json<PromptRequest>,
) -> Result<Json<FormSchema>, ApiError> {
    info!(prompt_len = body.prompt.len(), "generate-form request");

    match app.generator.generate(&body.prompt).await {
        Ok(form) => {
            info!(fallback = form.is_fallback(), "form generated");
            Ok(Json(form))
        }
        Err(e) => {
            error!(kind = e.kind(), "model invocation failed: {e}");
            Err(ApiError(e))
        }
    }
}
