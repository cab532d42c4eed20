//! Multi-Tenant Feature Configuration
//!
//! One portal codebase, many hospital brands. Each tenant carries its own
//! identity, palette and capability set.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     TENANT CONFIGURATION CORE                           │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      TENANT REGISTRY                             │  │
//! │  │   ┌────────┐  ┌────────┐  ┌────────┐  ┌────────┐                │  │
//! │  │   │ metro  │  │st.lukes│  │barangay│  │custom..│                │  │
//! │  │   └───┬────┘  └───┬────┘  └───┬────┘  └───┬────┘                │  │
//! │  └───────┼───────────┼───────────┼───────────┼──────────────────────┘  │
//! │          └───────────┴─────┬─────┴───────────┘                          │
//! │  ┌─────────────────────────▼────────────────────────────────────────┐  │
//! │  │                   ACTIVE TENANT CONTEXT                           │  │
//! │  │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐      │  │
//! │  │  │ Feature  │  │  Preset  │  │  Badge   │  │ Subscribers  │      │  │
//! │  │  │ Resolver │  │ Library  │  │Aggregator│  │  / watch     │      │  │
//! │  │  └──────────┘  └──────────┘  └──────────┘  └──────────────┘      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod model;
pub mod cascade;
pub mod presets;
pub mod config;
pub mod builder;
pub mod registry;
pub mod badges;
pub mod context;

pub use model::{
    ColorPalette, FeatureFlag, FeaturePatch, TenantConfig, TenantFeatures, TenantId,
    VisitFeaturePatch, VisitFeatures,
};
pub use cascade::{apply_feature_update, enforce_cascade};
pub use presets::{get_preset, preset, Preset, PresetKind};
pub use config::PortalConfig;
pub use builder::TenantBuilder;
pub use registry::TenantRegistry;
pub use badges::{count_unread, BadgeCategory, BadgeCounts, Notification};
pub use context::{ContextSnapshot, SubscriptionId, TenantContext, TenantEvent};
pub use portal_common::{PortalError, PortalResult};
