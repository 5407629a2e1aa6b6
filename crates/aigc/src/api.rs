//! Typed AIGC operations.
//!
//! Wire types use the service's snake_case field names.
//!
//! | Operation   | Path              | Request                   | Response                 |
//! |-------------|-------------------|---------------------------|--------------------------|
//! | matting     | `POST /matting`   | `{image_url}`             | `{image_url}`            |
//! | generate    | `POST /generate`  | `{category, prompt}`      | `{image_url}`            |
//! | animate     | `POST /animate`   | `{image_url}`             | `{material_url}`         |
//! | embedding   | `POST /embedding` | `{prompt, callback_url}`  | `{embedding, desc}`      |

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::{AigcClient, AigcError};

pub const MATTING_PATH: &str = "/matting";
pub const GENERATE_PATH: &str = "/generate";
pub const ANIMATE_PATH: &str = "/animate";
pub const EMBEDDING_PATH: &str = "/embedding";

/// Body for `/matting` and `/animate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInput {
    pub image_url: String,
}

/// Reply from `/matting`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MattingOutput {
    pub image_url: String,
}

/// Body for `/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateInput {
    /// Categories flattened into one comma-separated string.
    pub category: String,
    pub prompt: String,
}

/// Reply from `/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOutput {
    #[serde(default)]
    pub image_url: String,
}

/// Reply from `/animate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimateOutput {
    pub material_url: String,
}

/// Body for `/embedding`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingInput {
    pub prompt: String,
    pub callback_url: String,
}

/// Reply from `/embedding`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingOutput {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub desc: String,
}

impl AigcClient {
    /// Remove the background of an image.
    pub async fn matting(&self, image_url: &str) -> Result<MattingOutput, AigcError> {
        let input = ImageInput {
            image_url: image_url.to_string(),
        };
        self.call(Method::POST, MATTING_PATH, &input).await
    }

    /// Generate an image from a prompt.
    pub async fn generate(&self, input: &GenerateInput) -> Result<GenerateOutput, AigcError> {
        self.call(Method::POST, GENERATE_PATH, input).await
    }

    /// Turn a still image into sprite animation material.
    pub async fn animate(&self, image_url: &str) -> Result<AnimateOutput, AigcError> {
        let input = ImageInput {
            image_url: image_url.to_string(),
        };
        self.call(Method::POST, ANIMATE_PATH, &input).await
    }

    /// Compute a text embedding.
    pub async fn embedding(&self, input: &EmbeddingInput) -> Result<EmbeddingOutput, AigcError> {
        self.call(Method::POST, EMBEDDING_PATH, input).await
    }
}
