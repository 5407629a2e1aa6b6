//! Handlers for the `/aigc` resource.
//!
//! Synchronous operations (matting, sprite animation, embedding) forward one
//! call to the AIGC service and return its reply. Generation is asynchronous:
//! the handler creates a job, returns its ID, and clients poll
//! `/aigc/status/{job_id}`.
//!
//! Every client-supplied URL passes [`validate_fetch_url`] before anything is
//! sent to the AIGC service.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use spx_aigc::api::{EmbeddingInput, EmbeddingOutput};
use spx_core::error::CoreError;
use spx_core::generation::GenerationRequest;
use spx_core::types::JobId;
use spx_core::url_safety::{validate_fetch_url, UrlRejection};
use url::Url;

use crate::engine::{resolve_job_status, JobStatusReport};
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /aigc/matting`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MattingParams {
    #[serde(default, alias = "image_url")]
    pub image_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MattingResult {
    pub image_url: String,
}

/// Request body for the combined `POST /aigc/generate`.
///
/// `width` and `height` decide the asset type; both default to zero.
#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
}

/// Request body for `POST /aigc/generate/sprite`.
#[derive(Debug, Deserialize)]
pub struct SpriteGenerateParams {
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub keyword: String,
}

/// Request body for `POST /aigc/generate/backdrop`.
#[derive(Debug, Deserialize)]
pub struct BackdropGenerateParams {
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub keyword: String,
    pub width: u32,
    pub height: u32,
}

/// Reply to every generation endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    pub image_job_id: JobId,
}

/// Request body for `POST /aigc/sprite`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteAnimationParams {
    #[serde(default, alias = "image_url")]
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct SpriteAnimationResult {
    pub material_url: String,
}

/// Request body for `POST /aigc/embedding`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingParams {
    #[serde(default)]
    pub prompt: String,
    /// Optional. Validated like any other fetch URL when present.
    #[serde(default, alias = "callback_url")]
    pub callback_url: String,
}

/// POST /api/v1/aigc/matting
///
/// Remove the background of the image at `imageUrl`.
pub async fn matting(
    State(state): State<AppState>,
    Json(params): Json<MattingParams>,
) -> AppResult<Json<DataResponse<MattingResult>>> {
    let url = ensure_fetchable(&state, "imageUrl", &params.image_url).await?;

    let output = state.aigc.matting(url.as_str()).await?;

    Ok(Json(DataResponse {
        data: MattingResult {
            image_url: output.image_url,
        },
    }))
}

/// POST /api/v1/aigc/generate
///
/// Start a generation job. Both dimensions zero means a sprite, both
/// positive means a backdrop; anything else is rejected before a job exists.
pub async fn generate(
    State(state): State<AppState>,
    Json(params): Json<GenerateParams>,
) -> AppResult<Json<DataResponse<GenerateResult>>> {
    let request =
        GenerationRequest::classify(params.category, params.keyword, params.width, params.height)?;
    start_generation(&state, request).await
}

/// POST /api/v1/aigc/generate/sprite
pub async fn generate_sprite(
    State(state): State<AppState>,
    Json(params): Json<SpriteGenerateParams>,
) -> AppResult<Json<DataResponse<GenerateResult>>> {
    let request = GenerationRequest::sprite(params.category, params.keyword)?;
    start_generation(&state, request).await
}

/// POST /api/v1/aigc/generate/backdrop
pub async fn generate_backdrop(
    State(state): State<AppState>,
    Json(params): Json<BackdropGenerateParams>,
) -> AppResult<Json<DataResponse<GenerateResult>>> {
    let request = GenerationRequest::backdrop(
        params.category,
        params.keyword,
        params.width,
        params.height,
    )?;
    start_generation(&state, request).await
}

/// POST /api/v1/aigc/sprite
///
/// Turn the still image at `imageUrl` into sprite animation material.
pub async fn generate_sprite_animation(
    State(state): State<AppState>,
    Json(params): Json<SpriteAnimationParams>,
) -> AppResult<Json<DataResponse<SpriteAnimationResult>>> {
    let url = ensure_fetchable(&state, "imageUrl", &params.image_url).await?;

    let output = state.aigc.animate(url.as_str()).await?;

    Ok(Json(DataResponse {
        data: SpriteAnimationResult {
            material_url: output.material_url,
        },
    }))
}

/// POST /api/v1/aigc/embedding
pub async fn embedding(
    State(state): State<AppState>,
    Json(params): Json<EmbeddingParams>,
) -> AppResult<Json<DataResponse<EmbeddingOutput>>> {
    if params.prompt.trim().is_empty() {
        return Err(CoreError::Validation("missing prompt".to_string()).into());
    }

    let callback_url = if params.callback_url.is_empty() {
        String::new()
    } else {
        ensure_fetchable(&state, "callbackUrl", &params.callback_url)
            .await?
            .into()
    };

    let output = state
        .aigc
        .embedding(&EmbeddingInput {
            prompt: params.prompt,
            callback_url,
        })
        .await?;

    Ok(Json(DataResponse { data: output }))
}

/// GET /api/v1/aigc/status/{job_id}
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<DataResponse<JobStatusReport>>> {
    let report = resolve_job_status(state.store.as_ref(), &JobId::new(job_id)).await?;
    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn start_generation(
    state: &AppState,
    request: GenerationRequest,
) -> AppResult<Json<DataResponse<GenerateResult>>> {
    let image_job_id = state.dispatcher.dispatch(request).await?;
    Ok(Json(DataResponse {
        data: GenerateResult { image_job_id },
    }))
}

/// Validate a client-supplied URL, logging the rejection detail that the
/// caller does not get to see.
async fn ensure_fetchable(
    state: &AppState,
    field: &'static str,
    raw: &str,
) -> Result<Url, UrlRejection> {
    validate_fetch_url(field, raw, state.resolver.as_ref())
        .await
        .inspect_err(|rejection| {
            tracing::warn!(
                field,
                kind = ?rejection.kind,
                host = logged_host(raw).as_deref().unwrap_or("-"),
                "Rejected unsafe URL",
            );
        })
}

/// Host of `raw` for log lines. Path, query and userinfo are left out since
/// they may carry credentials.
fn logged_host(raw: &str) -> Option<String> {
    Url::parse(raw).ok()?.host_str().map(str::to_string)
}
