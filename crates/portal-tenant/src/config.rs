//! Runtime configuration for the tenant core

use crate::model::{ColorPalette, TenantConfig};
use crate::presets::{preset, PresetKind};
use portal_common::{PortalError, PortalResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Metro General Hospital, the default tenant
pub const METRO_GENERAL: &str = "metroGeneral";
/// St. Luke's Family Clinic
pub const ST_LUKES_CLINIC: &str = "stLukesClinic";
/// Barangay Health Center
pub const BARANGAY_HEALTH: &str = "barangayHealth";

/// Portal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortalConfig {
    /// Tenant selected at start and after the active tenant is removed
    pub default_tenant_id: String,
    /// Tenants that exist for the whole session and cannot be removed
    pub builtin_tenants: Vec<TenantConfig>,
    /// Joins the name slug and timestamp in generated ids
    pub custom_id_separator: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            default_tenant_id: METRO_GENERAL.to_string(),
            builtin_tenants: builtin_tenants(),
            custom_id_separator: "_".to_string(),
        }
    }
}

impl PortalConfig {
    /// Parse from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> PortalResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PortalError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the default tenant is a built-in and built-in ids are unique
    pub fn validate(&self) -> PortalResult<()> {
        if self.builtin_tenants.is_empty() {
            return Err(PortalError::Config("at least one built-in tenant is required".into()));
        }

        let mut seen = HashSet::new();
        for tenant in &self.builtin_tenants {
            if tenant.id.is_empty() {
                return Err(PortalError::Config("built-in tenant with empty id".into()));
            }
            if !seen.insert(tenant.id.as_str()) {
                return Err(PortalError::Config(format!(
                    "duplicate built-in tenant id: {}",
                    tenant.id
                )));
            }
        }

        if !seen.contains(self.default_tenant_id.as_str()) {
            return Err(PortalError::Config(format!(
                "default tenant {} is not a built-in",
                self.default_tenant_id
            )));
        }

        if self.custom_id_separator.is_empty() {
            return Err(PortalError::Config("custom id separator must not be empty".into()));
        }

        Ok(())
    }
}

/// The three demo hospitals
pub fn builtin_tenants() -> Vec<TenantConfig> {
    vec![
        TenantConfig {
            id: METRO_GENERAL.to_string(),
            name: "Metro General Hospital".to_string(),
            tagline: Some("Complete care, one portal".to_string()),
            logo_url: "/logos/metro-general.svg".to_string(),
            colors: ColorPalette::with_accents("#1d4ed8", "#0ea5e9"),
            features: preset(PresetKind::FullHospital).features,
        },
        TenantConfig {
            id: ST_LUKES_CLINIC.to_string(),
            name: "St. Luke's Family Clinic".to_string(),
            tagline: Some("Your family's health partner".to_string()),
            logo_url: "/logos/st-lukes.svg".to_string(),
            colors: ColorPalette::with_accents("#047857", "#84cc16"),
            features: preset(PresetKind::StandardClinic).features,
        },
        TenantConfig {
            id: BARANGAY_HEALTH.to_string(),
            name: "Barangay Health Center".to_string(),
            tagline: None,
            logo_url: "/logos/barangay-health.svg".to_string(),
            colors: ColorPalette::with_accents("#b45309", "#f59e0b"),
            features: preset(PresetKind::BasicClinic).features,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PortalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.builtin_tenants.len(), 3);
        assert_eq!(config.builtin_tenants[0].id, METRO_GENERAL);
    }

    #[test]
    fn test_from_json_partial() {
        let config = PortalConfig::from_json(r#"{"defaultTenantId": "stLukesClinic"}"#).unwrap();
        assert_eq!(config.default_tenant_id, ST_LUKES_CLINIC);
        assert_eq!(config.custom_id_separator, "_");
    }

    #[test]
    fn test_unknown_default_rejected() {
        let err = PortalConfig::from_json(r#"{"defaultTenantId": "nowhere"}"#).unwrap_err();
        assert!(matches!(err, PortalError::Config(_)));
    }

    #[test]
    fn test_duplicate_builtin_rejected() {
        let mut config = PortalConfig::default();
        let dup = config.builtin_tenants[1].clone();
        config.builtin_tenants.push(dup);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            PortalConfig::from_json("{not json"),
            Err(PortalError::Config(_))
        ));
    }
}
