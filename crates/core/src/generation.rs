//! Image generation requests and their asset classification.
//!
//! Each generation endpoint builds a [`GenerationRequest`] variant directly,
//! so the asset type is decided by which endpoint the caller used. The
//! combined legacy endpoint goes through [`GenerationRequest::classify`],
//! which only accepts dimensions that unambiguously name one variant.

use crate::asset::AssetType;
use crate::error::CoreError;

/// Separator used when flattening categories for the AIGC service.
pub const CATEGORY_SEPARATOR: &str = ",";

/// A validated request to generate an image asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Sprite {
        category: Vec<String>,
        keyword: String,
    },
    Backdrop {
        category: Vec<String>,
        keyword: String,
        width: u32,
        height: u32,
    },
}

impl GenerationRequest {
    /// Build a sprite request.
    pub fn sprite(category: Vec<String>, keyword: String) -> Result<Self, CoreError> {
        validate_keyword(&keyword)?;
        Ok(Self::Sprite { category, keyword })
    }

    /// Build a backdrop request. Both dimensions must be positive.
    pub fn backdrop(
        category: Vec<String>,
        keyword: String,
        width: u32,
        height: u32,
    ) -> Result<Self, CoreError> {
        validate_keyword(&keyword)?;
        if width == 0 || height == 0 {
            return Err(CoreError::Validation(
                "backdrop width and height must both be positive".to_string(),
            ));
        }
        Ok(Self::Backdrop {
            category,
            keyword,
            width,
            height,
        })
    }

    /// Classify a request that carries optional dimensions.
    ///
    /// | width | height | result            |
    /// |-------|--------|-------------------|
    /// | 0     | 0      | Sprite            |
    /// | > 0   | > 0    | Backdrop          |
    /// | other | other  | validation error  |
    pub fn classify(
        category: Vec<String>,
        keyword: String,
        width: i64,
        height: i64,
    ) -> Result<Self, CoreError> {
        if width < 0 || height < 0 {
            return Err(CoreError::Validation(format!(
                "width and height must not be negative, got {width}x{height}"
            )));
        }
        match (width, height) {
            (0, 0) => Self::sprite(category, keyword),
            (w, h) if w > 0 && h > 0 => {
                let width = u32::try_from(w).map_err(|_| dimension_too_large(w))?;
                let height = u32::try_from(h).map_err(|_| dimension_too_large(h))?;
                Self::backdrop(category, keyword, width, height)
            }
            (w, h) => Err(CoreError::Validation(format!(
                "width and height must be both zero (sprite) or both positive (backdrop), got {w}x{h}"
            ))),
        }
    }

    pub fn asset_type(&self) -> AssetType {
        match self {
            Self::Sprite { .. } => AssetType::Sprite,
            Self::Backdrop { .. } => AssetType::Backdrop,
        }
    }

    pub fn keyword(&self) -> &str {
        match self {
            Self::Sprite { keyword, .. } | Self::Backdrop { keyword, .. } => keyword,
        }
    }

    pub fn categories(&self) -> &[String] {
        match self {
            Self::Sprite { category, .. } | Self::Backdrop { category, .. } => category,
        }
    }

    /// Categories flattened into the single string the AIGC service expects.
    pub fn category_label(&self) -> String {
        self.categories()
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(CATEGORY_SEPARATOR)
    }
}

fn validate_keyword(keyword: &str) -> Result<(), CoreError> {
    if keyword.trim().is_empty() {
        return Err(CoreError::Validation("missing keyword".to_string()));
    }
    Ok(())
}

fn dimension_too_large(value: i64) -> CoreError {
    CoreError::Validation(format!("dimension {value} is too large"))
}
