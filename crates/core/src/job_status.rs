//! Status of an AIGC job, derived from its stored result marker.
//!
//! Status is never persisted. [`AigcJobStatus::from_result_url`] is the only
//! place that maps a stored record to a status; add new terminal states there.

use serde::{Serialize, Serializer};

/// Three-state job status. Discriminants are the wire values.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AigcJobStatus {
    /// Accepted but not yet durable.
    ///
    /// The dispatcher creates the job record before handing out the job ID,
    /// so a poller can never observe this state.
    Waiting = 0,
    /// Record exists, result not yet written.
    Generating = 1,
    /// Result written.
    Finished = 2,
}

impl AigcJobStatus {
    /// Derive the status of a stored job from its result marker.
    pub fn from_result_url(result_url: &str) -> Self {
        if result_url.is_empty() {
            Self::Generating
        } else {
            Self::Finished
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Serialize for AigcJobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}
