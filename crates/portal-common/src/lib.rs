//! Care Portal Common - Shared types for the tenant configuration core
//!
//! This crate provides:
//! - Error handling (`PortalError`, `PortalResult`)
//! - A millisecond wall-clock timestamp used for generated tenant ids

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};

/// Wall-clock timestamp in milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Current time
    #[inline(always)]
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    /// Build from a raw millisecond value
    #[inline(always)]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Milliseconds since epoch
    #[inline(always)]
    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
