//! Tenant Registry

use crate::cascade::enforce_cascade;
use crate::config::PortalConfig;
use crate::model::{TenantConfig, TenantFeatures, TenantId};
use parking_lot::RwLock;
use portal_common::{PortalError, PortalResult};
use std::collections::HashSet;
use tracing::info;

/// Known tenant configurations for the session
///
/// Built-ins keep their fixed order at the front; custom tenants follow in
/// creation order.
pub struct TenantRegistry {
    /// All tenants, in listing order
    tenants: RwLock<Vec<TenantConfig>>,
    /// Ids that can never be removed
    builtin_ids: HashSet<TenantId>,
}

impl TenantRegistry {
    /// Registry seeded with the given built-ins, cascade rules applied
    pub fn new(builtins: Vec<TenantConfig>) -> Self {
        let builtin_ids = builtins.iter().map(|t| t.id.clone()).collect();
        let builtins = builtins.into_iter().map(with_consistent_features).collect();
        Self {
            tenants: RwLock::new(builtins),
            builtin_ids,
        }
    }

    /// Registry seeded from configuration
    pub fn from_config(config: &PortalConfig) -> PortalResult<Self> {
        config.validate()?;
        Ok(Self::new(config.builtin_tenants.clone()))
    }

    /// List all tenants, built-ins first
    pub fn list_tenants(&self) -> Vec<TenantConfig> {
        self.tenants.read().clone()
    }

    /// Custom tenants only, in creation order
    pub fn custom_tenants(&self) -> Vec<TenantConfig> {
        self.tenants
            .read()
            .iter()
            .filter(|t| !self.builtin_ids.contains(&t.id))
            .cloned()
            .collect()
    }

    /// Get tenant
    pub fn get_tenant(&self, id: &str) -> PortalResult<TenantConfig> {
        self.tenants
            .read()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| PortalError::NotFound(id.to_string()))
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: &str) -> bool {
        self.tenants.read().iter().any(|t| t.id == id)
    }

    /// Whether `id` is a built-in
    pub fn is_builtin(&self, id: &str) -> bool {
        self.builtin_ids.contains(id)
    }

    /// Add a custom tenant. The caller picks a unique id.
    pub fn add_tenant(&self, config: TenantConfig) -> PortalResult<()> {
        let config = with_consistent_features(config);
        let mut tenants = self.tenants.write();
        if tenants.iter().any(|t| t.id == config.id) {
            return Err(PortalError::AlreadyExists(config.id));
        }

        info!(tenant_id = %config.id, name = %config.name, "tenant added");
        tenants.push(config);
        Ok(())
    }

    /// Remove a custom tenant
    pub fn remove_tenant(&self, id: &str) -> PortalResult<TenantConfig> {
        if self.is_builtin(id) {
            return Err(PortalError::Protected(id.to_string()));
        }

        let mut tenants = self.tenants.write();
        let index = tenants
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| PortalError::NotFound(id.to_string()))?;

        let removed = tenants.remove(index);
        info!(tenant_id = %id, "tenant removed");
        Ok(removed)
    }

    /// Replace the feature set of an existing entry. Identity is unchanged.
    pub fn replace_features(&self, id: &str, features: TenantFeatures) -> PortalResult<TenantConfig> {
        let mut tenants = self.tenants.write();
        let tenant = tenants
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| PortalError::NotFound(id.to_string()))?;

        tenant.features = enforce_cascade(features);
        Ok(tenant.clone())
    }

    /// Get tenant count
    pub fn len(&self) -> usize {
        self.tenants.read().len()
    }

    /// True when no tenant is registered
    pub fn is_empty(&self) -> bool {
        self.tenants.read().is_empty()
    }
}

fn with_consistent_features(mut config: TenantConfig) -> TenantConfig {
    config.features = enforce_cascade(config.features);
    config
}

impl Default for TenantRegistry {
    fn default() -> Self {
        Self::new(crate::config::builtin_tenants())
    }
}
