use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use spx_aigc::AigcError;
use spx_core::error::CoreError;
use spx_core::url_safety::UrlRejection;
use spx_db::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds store and AIGC
/// variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `spx_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A job store failure other than a missing job or a repeated result.
    #[error("Store error: {0}")]
    Store(StoreError),

    /// The AIGC service could not be reached or returned an error.
    #[error("AIGC error: {0}")]
    Aigc(#[from] AigcError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::Core(CoreError::NotFound {
                entity: "AigcJob",
                id: id.to_string(),
            }),
            StoreError::AlreadyFinished(id) => {
                AppError::Core(CoreError::Conflict(format!("AIGC job {id} already finished")))
            }
            other => AppError::Store(other),
        }
    }
}

impl From<UrlRejection> for AppError {
    fn from(rejection: UrlRejection) -> Self {
        AppError::Core(CoreError::Validation(rejection.to_string()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Store errors ---
            AppError::Store(err) => {
                tracing::error!(error = %err, "Job store error");
                internal()
            }

            // --- AIGC errors ---
            AppError::Aigc(err) => {
                tracing::error!(error = %err, "AIGC service error");
                (
                    StatusCode::BAD_GATEWAY,
                    "AIGC_ERROR",
                    "The AIGC service request failed".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
