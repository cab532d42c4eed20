//! Feature Resolver
//!
//! Merges feature patches and enforces parent/child dependencies between
//! visit flags. Turning a parent off turns its children off; a child never
//! turns its parent on.

use crate::model::{FeatureFlag, FeaturePatch, TenantFeatures};
use tracing::debug;

/// A parent flag and the flags that depend on it
#[derive(Debug, Clone, Copy)]
pub struct FeatureDependency {
    /// Flag the children require
    pub parent: FeatureFlag,
    /// Flags forced off while the parent is off
    pub children: &'static [FeatureFlag],
}

/// Dependency table walked by the resolver. New dependent pairs go here.
pub const VISIT_DEPENDENCIES: &[FeatureDependency] = &[
    FeatureDependency {
        parent: FeatureFlag::TeleconsultEnabled,
        children: &[
            FeatureFlag::TeleconsultNowEnabled,
            FeatureFlag::TeleconsultLaterEnabled,
        ],
    },
    FeatureDependency {
        parent: FeatureFlag::ClinicVisitEnabled,
        children: &[
            FeatureFlag::ClinicF2fSchedulingEnabled,
            FeatureFlag::ClinicLabFulfillmentEnabled,
        ],
    },
];

/// Parent of a dependent flag, if any
pub fn parent_of(flag: FeatureFlag) -> Option<FeatureFlag> {
    VISIT_DEPENDENCIES
        .iter()
        .find(|dep| dep.children.contains(&flag))
        .map(|dep| dep.parent)
}

/// Merge `patch` into `current` and return a consistent feature set.
pub fn apply_feature_update(current: &TenantFeatures, patch: &FeaturePatch) -> TenantFeatures {
    let mut next = *current;
    merge(&mut next, patch);
    enforce_cascade(next)
}

/// Force every child of a disabled parent off.
pub fn enforce_cascade(mut features: TenantFeatures) -> TenantFeatures {
    for dep in VISIT_DEPENDENCIES {
        if dep.parent.get(&features) {
            continue;
        }
        for child in dep.children {
            if child.get(&features) {
                debug!(parent = %dep.parent, child = %child, "cascade disabled child feature");
                child.set(&mut features, false);
            }
        }
    }
    features
}

fn merge(f: &mut TenantFeatures, patch: &FeaturePatch) {
    fn put(slot: &mut bool, value: Option<bool>) {
        if let Some(v) = value {
            *slot = v;
        }
    }

    put(&mut f.sso, patch.sso);
    put(&mut f.loa, patch.loa);
    put(&mut f.hmo, patch.hmo);
    put(&mut f.phil_health, patch.phil_health);
    put(&mut f.queue, patch.queue);
    put(&mut f.appointments, patch.appointments);
    put(&mut f.multi_location, patch.multi_location);
    put(&mut f.admissions, patch.admissions);
    put(&mut f.cdss, patch.cdss);
    put(&mut f.ai_assistant, patch.ai_assistant);

    if let Some(visits) = &patch.visits {
        let v = &mut f.visits;
        put(&mut v.teleconsult_enabled, visits.teleconsult_enabled);
        put(&mut v.teleconsult_now_enabled, visits.teleconsult_now_enabled);
        put(&mut v.teleconsult_later_enabled, visits.teleconsult_later_enabled);
        put(&mut v.clinic_visit_enabled, visits.clinic_visit_enabled);
        put(&mut v.clinic_f2f_scheduling_enabled, visits.clinic_f2f_scheduling_enabled);
        put(&mut v.clinic_lab_fulfillment_enabled, visits.clinic_lab_fulfillment_enabled);
    }
}
