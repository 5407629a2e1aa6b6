pub mod aigc;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /aigc/matting                    remove image background (POST)
/// /aigc/generate                   start generation, type from dimensions (POST)
/// /aigc/generate/sprite            start sprite generation (POST)
/// /aigc/generate/backdrop          start backdrop generation (POST)
/// /aigc/sprite                     image to sprite animation material (POST)
/// /aigc/embedding                  text embedding (POST)
/// /aigc/status/{job_id}            poll a generation job (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/aigc", aigc::router())
}
