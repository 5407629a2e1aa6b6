//! Route definitions for the `/aigc` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::aigc;
use crate::state::AppState;

/// Routes mounted at `/aigc`.
///
/// ```text
/// POST   /matting               -> matting
/// POST   /generate              -> generate
/// POST   /generate/sprite       -> generate_sprite
/// POST   /generate/backdrop     -> generate_backdrop
/// POST   /sprite                -> generate_sprite_animation
/// POST   /embedding             -> embedding
/// GET    /status/{job_id}       -> get_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/matting", post(aigc::matting))
        .route("/generate", post(aigc::generate))
        .route("/generate/sprite", post(aigc::generate_sprite))
        .route("/generate/backdrop", post(aigc::generate_backdrop))
        .route("/sprite", post(aigc::generate_sprite_animation))
        .route("/embedding", post(aigc::embedding))
        .route("/status/{job_id}", get(aigc::get_status))
}
