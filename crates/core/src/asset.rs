//! Asset classification shared by the job store and the status report.
//!
//! `AssetType` discriminants are the values persisted in the `asset_type`
//! column and returned to clients in the `type` field of a status report.

use serde::{Serialize, Serializer};

/// Kind of project asset an AIGC job produces.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    Sprite = 0,
    Backdrop = 1,
    Sound = 2,
}

impl AssetType {
    /// Resolve a stored discriminant to the corresponding variant.
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Sprite),
            1 => Some(Self::Backdrop),
            2 => Some(Self::Sound),
            _ => None,
        }
    }

    /// Return the stored discriminant.
    pub fn id(self) -> i16 {
        self as i16
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sprite => "sprite",
            Self::Backdrop => "backdrop",
            Self::Sound => "sound",
        }
    }
}

impl Serialize for AssetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.id())
    }
}
