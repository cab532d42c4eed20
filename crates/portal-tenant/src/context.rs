//! Active Tenant Context
//!
//! Session-lifetime selection of the current tenant. Constructed explicitly
//! and passed to consumers; there is no global instance.

use crate::badges::{BadgeCounts, Notification};
use crate::builder::{generate_tenant_id, TenantBuilder};
use crate::cascade::{apply_feature_update, enforce_cascade};
use crate::config::PortalConfig;
use crate::model::{FeaturePatch, TenantConfig, TenantFeatures, TenantId};
use crate::presets::{preset, PresetKind};
use crate::registry::TenantRegistry;
use parking_lot::RwLock;
use portal_common::{PortalResult, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Change notification delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantEvent {
    /// Active tenant changed identity
    Switched {
        /// Previously active tenant
        from: TenantId,
        /// Newly active tenant
        to: TenantId,
    },
    /// Active tenant's features were edited in place
    FeaturesUpdated {
        /// Edited tenant
        tenant_id: TenantId,
        /// Features after the cascade ran
        features: TenantFeatures,
    },
    /// Custom tenant registered
    TenantAdded {
        /// Id of the new tenant
        tenant_id: TenantId,
    },
    /// Custom tenant removed
    TenantRemoved {
        /// Id of the removed tenant
        tenant_id: TenantId,
    },
}

/// Subscription handle returned by [`TenantContext::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type TenantSubscriber = Arc<dyn Fn(&TenantEvent) + Send + Sync>;

/// Serializable session state for hosts that want to persist it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextSnapshot {
    /// Tenant selected when the snapshot was taken
    pub active_tenant_id: TenantId,
    /// Custom tenants in creation order
    pub custom_tenants: Vec<TenantConfig>,
    /// Edited feature sets of built-in tenants
    pub feature_overrides: BTreeMap<TenantId, TenantFeatures>,
}

/// Holds the current tenant and fans out changes
pub struct TenantContext {
    config: PortalConfig,
    registry: TenantRegistry,
    current: RwLock<TenantConfig>,
    subscribers: RwLock<Vec<(SubscriptionId, TenantSubscriber)>>,
    next_subscription: AtomicU64,
    current_tx: watch::Sender<TenantConfig>,
}

impl TenantContext {
    /// Context seeded from configuration, resolved to the default tenant
    pub fn new(config: PortalConfig) -> PortalResult<Self> {
        let registry = TenantRegistry::from_config(&config)?;
        let current = registry.get_tenant(&config.default_tenant_id)?;
        Ok(Self::assemble(config, registry, current))
    }

    fn assemble(config: PortalConfig, registry: TenantRegistry, current: TenantConfig) -> Self {
        let (current_tx, _) = watch::channel(current.clone());
        Self {
            config,
            registry,
            current: RwLock::new(current),
            subscribers: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
            current_tx,
        }
    }

    /// Active tenant
    pub fn current(&self) -> TenantConfig {
        self.current.read().clone()
    }

    /// Id of the active tenant
    pub fn current_id(&self) -> TenantId {
        self.current.read().id.clone()
    }

    /// Resolved features of the active tenant
    pub fn features(&self) -> TenantFeatures {
        self.current.read().features
    }

    /// Underlying registry
    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }

    /// Configuration the context was built from
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// All tenants, built-ins first
    pub fn tenants(&self) -> Vec<TenantConfig> {
        self.registry.list_tenants()
    }

    /// Switch to `id`. Unknown ids leave the active tenant unchanged.
    ///
    /// Selecting the tenant that is already active returns `true` without
    /// emitting an event or touching the watch channel.
    pub fn set_tenant_id(&self, id: &str) -> bool {
        match self.registry.get_tenant(id) {
            Ok(tenant) => {
                self.select(tenant);
                true
            }
            Err(e) => {
                warn!(tenant_id = %id, error = %e, "ignoring switch to unknown tenant");
                false
            }
        }
    }

    /// Replace the active tenant's features in place
    pub fn update_tenant_features(&self, next: TenantFeatures) -> TenantConfig {
        let features = enforce_cascade(next);
        let tenant_id = self.current_id();

        if let Err(e) = self.registry.replace_features(&tenant_id, features) {
            warn!(tenant_id = %tenant_id, error = %e, "active tenant missing from registry");
        }

        let updated = {
            let mut current = self.current.write();
            current.features = features;
            current.clone()
        };
        debug!(tenant_id = %tenant_id, enabled = features.enabled_flags().len(), "tenant features updated");

        self.current_tx.send_replace(updated.clone());
        self.notify(&TenantEvent::FeaturesUpdated { tenant_id, features });
        updated
    }

    /// Merge a partial update into the active tenant's features
    pub fn patch_tenant_features(&self, patch: &FeaturePatch) -> TenantConfig {
        let next = apply_feature_update(&self.features(), patch);
        self.update_tenant_features(next)
    }

    /// Overwrite the active tenant's features with a preset
    pub fn apply_preset(&self, kind: PresetKind) -> TenantConfig {
        self.patch_tenant_features(&FeaturePatch::from(preset(kind).features))
    }

    /// Register a custom tenant
    pub fn add_tenant(&self, config: TenantConfig) -> PortalResult<()> {
        let tenant_id = config.id.clone();
        self.registry.add_tenant(config)?;
        self.notify(&TenantEvent::TenantAdded { tenant_id });
        Ok(())
    }

    /// Build and register a custom tenant under a fresh generated id
    pub fn create_tenant(&self, builder: &TenantBuilder) -> PortalResult<TenantConfig> {
        let separator = &self.config.custom_id_separator;
        let mut at = Timestamp::now();
        while self.registry.contains(&generate_tenant_id(builder.name(), separator, at)) {
            at = Timestamp::from_millis(at.as_millis() + 1);
        }

        let tenant = builder.build_at(separator, at);
        self.add_tenant(tenant.clone())?;
        Ok(tenant)
    }

    /// Remove a custom tenant, falling back to the default if it was active
    pub fn remove_tenant(&self, id: &str) -> PortalResult<TenantConfig> {
        let removed = self.registry.remove_tenant(id)?;
        self.notify(&TenantEvent::TenantRemoved { tenant_id: removed.id.clone() });

        if self.current_id() == removed.id {
            info!(tenant_id = %id, "active tenant removed, falling back to default");
            self.select_default()?;
        }
        Ok(removed)
    }

    /// Receiver that always holds the active tenant
    pub fn watch(&self) -> watch::Receiver<TenantConfig> {
        self.current_tx.subscribe()
    }

    /// Register a change callback
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&TenantEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, Arc::new(handler)));
        id
    }

    /// Drop a callback. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    /// Navigation badges for the active tenant
    pub fn badges(&self, notifications: Option<&[Notification]>) -> BadgeCounts {
        BadgeCounts::from_notifications(notifications).gated(&self.features())
    }

    /// Capture custom tenants, built-in feature edits, and the selection
    pub fn snapshot(&self) -> ContextSnapshot {
        let feature_overrides = self
            .config
            .builtin_tenants
            .iter()
            .filter_map(|seed| {
                let live = self.registry.get_tenant(&seed.id).ok()?;
                (live.features != seed.features).then_some((seed.id.clone(), live.features))
            })
            .collect();

        ContextSnapshot {
            active_tenant_id: self.current_id(),
            custom_tenants: self.registry.custom_tenants(),
            feature_overrides,
        }
    }

    /// Re-apply a snapshot. Returns the number of custom tenants restored.
    pub fn restore(&self, snapshot: ContextSnapshot) -> PortalResult<usize> {
        let mut restored = 0;
        for mut tenant in snapshot.custom_tenants {
            if self.registry.contains(&tenant.id) {
                warn!(tenant_id = %tenant.id, "skipping snapshot tenant with colliding id");
                continue;
            }
            tenant.features = enforce_cascade(tenant.features);
            self.add_tenant(tenant)?;
            restored += 1;
        }

        for (id, features) in snapshot.feature_overrides {
            if !self.registry.is_builtin(&id) {
                warn!(tenant_id = %id, "skipping feature override for non built-in tenant");
                continue;
            }
            self.registry.replace_features(&id, enforce_cascade(features))?;
        }

        // Reselect from the registry so restored overrides reach `current`
        if self.registry.contains(&snapshot.active_tenant_id) {
            self.select(self.registry.get_tenant(&snapshot.active_tenant_id)?);
        } else {
            warn!(tenant_id = %snapshot.active_tenant_id, "snapshot tenant unknown, using default");
            self.select_default()?;
        }
        Ok(restored)
    }

    fn select_default(&self) -> PortalResult<()> {
        let tenant = self.registry.get_tenant(&self.config.default_tenant_id)?;
        self.select(tenant);
        Ok(())
    }

    fn select(&self, tenant: TenantConfig) {
        let previous = std::mem::replace(&mut *self.current.write(), tenant.clone());
        if previous == tenant {
            return;
        }
        if previous.id == tenant.id {
            // Same identity, features refreshed from the registry
            self.current_tx.send_replace(tenant);
            return;
        }
        info!(from = %previous.id, to = %tenant.id, "active tenant switched");

        let to = tenant.id.clone();
        self.current_tx.send_replace(tenant);
        self.notify(&TenantEvent::Switched { from: previous.id, to });
    }

    fn notify(&self, event: &TenantEvent) {
        // Handlers run without the subscriber lock held
        let handlers: Vec<TenantSubscriber> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(event);
        }
    }
}

impl Default for TenantContext {
    fn default() -> Self {
        let config = PortalConfig::default();
        let registry = TenantRegistry::new(config.builtin_tenants.clone());
        // metroGeneral leads the default built-ins
        let current = registry.list_tenants().swap_remove(0);
        Self::assemble(config, registry, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BARANGAY_HEALTH, METRO_GENERAL, ST_LUKES_CLINIC};
    use crate::model::FeatureFlag;
    use parking_lot::Mutex;
    use portal_common::PortalError;

    fn recorder(ctx: &TenantContext) -> Arc<Mutex<Vec<TenantEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        ctx.subscribe(move |e| sink.lock().push(e.clone()));
        events
    }

    #[test]
    fn test_starts_on_default() {
        let ctx = TenantContext::default();
        assert_eq!(ctx.current_id(), METRO_GENERAL);

        let config = PortalConfig {
            default_tenant_id: BARANGAY_HEALTH.to_string(),
            ..PortalConfig::default()
        };
        let ctx = TenantContext::new(config).unwrap();
        assert_eq!(ctx.current_id(), BARANGAY_HEALTH);
        assert_eq!(ctx.features(), preset(PresetKind::BasicClinic).features);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PortalConfig {
            default_tenant_id: "nowhere".to_string(),
            ..PortalConfig::default()
        };
        assert!(matches!(TenantContext::new(config), Err(PortalError::Config(_))));
    }

    #[test]
    fn test_switch_notifies() {
        let ctx = TenantContext::default();
        let events = recorder(&ctx);

        assert!(ctx.set_tenant_id(ST_LUKES_CLINIC));
        assert_eq!(ctx.current().name, "St. Luke's Family Clinic");
        assert_eq!(
            events.lock().as_slice(),
            &[TenantEvent::Switched {
                from: METRO_GENERAL.into(),
                to: ST_LUKES_CLINIC.into(),
            }]
        );
    }

    #[test]
    fn test_reselecting_active_tenant_is_silent() {
        let ctx = TenantContext::default();
        let events = recorder(&ctx);
        let rx = ctx.watch();

        assert!(ctx.set_tenant_id(METRO_GENERAL));
        assert_eq!(ctx.current_id(), METRO_GENERAL);
        assert!(events.lock().is_empty());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_added_tenant_switch_stays_consistent() {
        let ctx = TenantContext::default();
        let mut tenant = TenantBuilder::new("Acme")
            .preset(PresetKind::BasicClinic)
            .build_at("_", Timestamp::from_millis(1));
        tenant.features.visits.teleconsult_now_enabled = true;
        let id = tenant.id.clone();

        ctx.add_tenant(tenant).unwrap();
        assert!(ctx.set_tenant_id(&id));
        assert!(!ctx.features().visits.teleconsult_enabled);
        assert!(!ctx.features().visits.teleconsult_now_enabled);
        assert!(ctx.features().is_consistent());
    }

    #[test]
    fn test_json_builtin_seeds_are_cascaded() {
        let json = r##"{
            "defaultTenantId": "rural",
            "builtinTenants": [{
                "id": "rural",
                "name": "Rural Health Unit",
                "logoUrl": "/logos/rural.svg",
                "colors": {
                    "primary": "#000", "secondary": "#111", "background": "#fff",
                    "surface": "#fff", "text": "#000", "textMuted": "#666", "border": "#ddd"
                },
                "features": {
                    "sso": false, "loa": false, "hmo": false, "philHealth": true,
                    "queue": false, "appointments": false, "multiLocation": false,
                    "admissions": false, "cdss": false, "aiAssistant": false,
                    "visits": {
                        "teleconsultEnabled": false, "teleconsultNowEnabled": false,
                        "teleconsultLaterEnabled": false, "clinicVisitEnabled": false,
                        "clinicF2fSchedulingEnabled": true, "clinicLabFulfillmentEnabled": false
                    }
                }
            }]
        }"##;

        let ctx = TenantContext::new(PortalConfig::from_json(json).unwrap()).unwrap();
        assert_eq!(ctx.current_id(), "rural");
        assert!(!ctx.features().visits.clinic_f2f_scheduling_enabled);
        assert!(ctx.features().is_consistent());
    }

    #[test]
    fn test_unknown_switch_is_noop() {
        let ctx = TenantContext::default();
        let events = recorder(&ctx);

        assert!(!ctx.set_tenant_id("ghost"));
        assert_eq!(ctx.current_id(), METRO_GENERAL);
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_feature_edit_persists_across_switch() {
        let ctx = TenantContext::default();
        ctx.patch_tenant_features(&FeaturePatch::flag(FeatureFlag::Admissions, false));

        ctx.set_tenant_id(ST_LUKES_CLINIC);
        ctx.set_tenant_id(METRO_GENERAL);
        assert!(!ctx.features().admissions);
        assert!(ctx.features().hmo);
    }

    #[test]
    fn test_update_runs_cascade() {
        let ctx = TenantContext::default();
        let mut next = ctx.features();
        next.visits.teleconsult_enabled = false;

        let updated = ctx.update_tenant_features(next);
        assert_eq!(updated.id, METRO_GENERAL);
        assert!(!updated.features.visits.teleconsult_now_enabled);
        assert!(ctx.features().is_consistent());
    }

    #[test]
    fn test_apply_preset() {
        let ctx = TenantContext::default();
        let events = recorder(&ctx);

        let updated = ctx.apply_preset(PresetKind::StandardClinic);
        assert_eq!(updated.features, preset(PresetKind::StandardClinic).features);
        assert!(matches!(
            events.lock().as_slice(),
            [TenantEvent::FeaturesUpdated { .. }]
        ));
    }

    #[test]
    fn test_remove_active_falls_back() {
        let ctx = TenantContext::default();
        let acme = ctx.create_tenant(&TenantBuilder::new("Acme")).unwrap();
        assert!(ctx.set_tenant_id(&acme.id));

        ctx.remove_tenant(&acme.id).unwrap();
        assert_eq!(ctx.current_id(), METRO_GENERAL);
    }

    #[test]
    fn test_create_tenant_avoids_collisions() {
        let ctx = TenantContext::default();
        let builder = TenantBuilder::new("Acme");

        let first = ctx.create_tenant(&builder).unwrap();
        let second = ctx.create_tenant(&builder).unwrap();
        assert_ne!(first.id, second.id);
        assert!(first.id.starts_with("acme_"));
        assert_eq!(ctx.tenants().len(), 5);
    }

    #[test]
    fn test_remove_builtin_surfaces_error() {
        let ctx = TenantContext::default();
        assert_eq!(
            ctx.remove_tenant(METRO_GENERAL),
            Err(PortalError::Protected(METRO_GENERAL.into()))
        );
        assert_eq!(ctx.current_id(), METRO_GENERAL);
    }

    #[test]
    fn test_unsubscribe() {
        let ctx = TenantContext::default();
        let events = Arc::new(Mutex::new(0usize));
        let sink = events.clone();
        let id = ctx.subscribe(move |_| *sink.lock() += 1);

        ctx.set_tenant_id(ST_LUKES_CLINIC);
        assert!(ctx.unsubscribe(id));
        assert!(!ctx.unsubscribe(id));
        ctx.set_tenant_id(METRO_GENERAL);

        assert_eq!(*events.lock(), 1);
    }

    #[test]
    fn test_watch_tracks_current() {
        let ctx = TenantContext::default();
        let mut rx = ctx.watch();
        assert_eq!(rx.borrow().id, METRO_GENERAL);

        ctx.set_tenant_id(BARANGAY_HEALTH);
        tokio_test::block_on(rx.changed()).unwrap();
        assert_eq!(rx.borrow_and_update().id, BARANGAY_HEALTH);

        ctx.patch_tenant_features(&FeaturePatch::flag(FeatureFlag::Queue, true));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow().features.queue);
    }

    #[test]
    fn test_badges_follow_active_tenant() {
        let notes = vec![Notification {
            read: false,
            title: "Statement".into(),
            message: "Your invoice is due".into(),
            link: Some("/billing/7".into()),
        }];
        let ctx = TenantContext::default();
        assert_eq!(ctx.badges(Some(notes.as_slice())).finance, 1);

        ctx.patch_tenant_features(
            &FeaturePatch::flag(FeatureFlag::Hmo, false).with(FeatureFlag::PhilHealth, false),
        );
        assert_eq!(ctx.badges(Some(notes.as_slice())).finance, 0);
    }

    #[test]
    fn test_snapshot_restore() {
        let ctx = TenantContext::default();
        let acme = ctx.create_tenant(&TenantBuilder::new("Acme")).unwrap();
        ctx.patch_tenant_features(&FeaturePatch::flag(FeatureFlag::Cdss, false));
        ctx.set_tenant_id(&acme.id);

        let json = serde_json::to_string(&ctx.snapshot()).unwrap();
        let snapshot: ContextSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.feature_overrides.len(), 1);

        let fresh = TenantContext::default();
        assert_eq!(fresh.restore(snapshot.clone()).unwrap(), 1);
        assert_eq!(fresh.current_id(), acme.id);
        assert!(!fresh.registry().get_tenant(METRO_GENERAL).unwrap().features.cdss);

        // Restoring over the same selection refreshes features only
        fresh.set_tenant_id(METRO_GENERAL);
        let events = recorder(&fresh);
        let metro_only = ContextSnapshot {
            active_tenant_id: METRO_GENERAL.into(),
            feature_overrides: BTreeMap::from([(METRO_GENERAL.to_string(), TenantFeatures::default())]),
            ..ContextSnapshot::default()
        };
        fresh.restore(metro_only).unwrap();
        assert_eq!(fresh.features(), TenantFeatures::default());
        assert!(events.lock().is_empty());

        // Second restore collides on every custom id
        assert_eq!(fresh.restore(snapshot).unwrap(), 0);
        assert_eq!(fresh.tenants().len(), 4);
    }

    #[test]
    fn test_restore_unknown_active_falls_back() {
        let ctx = TenantContext::default();
        ctx.set_tenant_id(ST_LUKES_CLINIC);

        let snapshot = ContextSnapshot {
            active_tenant_id: "ghost".into(),
            ..ContextSnapshot::default()
        };
        assert_eq!(ctx.restore(snapshot).unwrap(), 0);
        assert_eq!(ctx.current_id(), METRO_GENERAL);
    }
}
