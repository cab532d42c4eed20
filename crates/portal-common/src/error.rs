//! Error types for the care portal core

use thiserror::Error;

/// Care portal error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// Tenant id not present in the registry
    #[error("tenant not found: {0}")]
    NotFound(String),

    /// Built-in tenant cannot be removed
    #[error("tenant is built-in and cannot be removed: {0}")]
    Protected(String),

    /// Tenant id already registered
    #[error("tenant already exists: {0}")]
    AlreadyExists(String),

    /// Unknown preset name
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl PortalError {
    /// True for lookups that missed
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for the care portal core
pub type PortalResult<T> = Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortalError::Protected("metroGeneral".into());
        assert_eq!(
            err.to_string(),
            "tenant is built-in and cannot be removed: metroGeneral"
        );
        assert!(PortalError::NotFound("x".into()).is_not_found());
        assert!(!err.is_not_found());
    }
}
