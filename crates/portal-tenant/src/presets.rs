//! Preset Library
//!
//! Named, complete feature bundles for initializing or overwriting a
//! tenant's feature set in one step.

use crate::cascade::apply_feature_update;
use crate::model::{FeaturePatch, TenantFeatures, VisitFeatures};
use portal_common::{PortalError, PortalResult};
use serde::{Deserialize, Serialize};

/// Preset identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetKind {
    /// Every capability on
    FullHospital,
    /// Outpatient clinic with HMO billing
    StandardClinic,
    /// PhilHealth-only community clinic
    BasicClinic,
}

impl PresetKind {
    /// Display order
    pub const ALL: [PresetKind; 3] = [Self::FullHospital, Self::StandardClinic, Self::BasicClinic];

    /// Snake-case identifier, also accepted by [`get_preset`]
    pub fn slug(&self) -> &'static str {
        match self {
            Self::FullHospital => "full_hospital",
            Self::StandardClinic => "standard_clinic",
            Self::BasicClinic => "basic_clinic",
        }
    }
}

/// Named feature bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    /// Which preset this is
    pub kind: PresetKind,
    /// Display name
    pub name: &'static str,
    /// One-line summary shown next to the name
    pub description: &'static str,
    /// Complete feature set, cascade-consistent
    pub features: TenantFeatures,
}

impl Preset {
    /// Replace `current` with this preset, cascade rules still applied
    pub fn apply_to(&self, current: &TenantFeatures) -> TenantFeatures {
        apply_feature_update(current, &FeaturePatch::from(self.features))
    }
}

static FULL_HOSPITAL: Preset = Preset {
    kind: PresetKind::FullHospital,
    name: "Full Hospital",
    description: "Every capability: HMO and PhilHealth, admissions, queueing, teleconsult and clinic visits",
    features: TenantFeatures::all_enabled(),
};

static STANDARD_CLINIC: Preset = Preset {
    kind: PresetKind::StandardClinic,
    name: "Standard Clinic",
    description: "Outpatient clinic with HMO billing, scheduled teleconsults and lab fulfillment",
    features: TenantFeatures {
        sso: true,
        loa: true,
        hmo: true,
        phil_health: false,
        queue: true,
        appointments: true,
        multi_location: false,
        admissions: false,
        cdss: false,
        ai_assistant: false,
        visits: VisitFeatures {
            teleconsult_enabled: true,
            teleconsult_now_enabled: false,
            teleconsult_later_enabled: true,
            clinic_visit_enabled: true,
            clinic_f2f_scheduling_enabled: true,
            clinic_lab_fulfillment_enabled: true,
        },
    },
};

static BASIC_CLINIC: Preset = Preset {
    kind: PresetKind::BasicClinic,
    name: "Basic Clinic",
    description: "PhilHealth-only community clinic with face-to-face scheduling",
    features: TenantFeatures {
        sso: false,
        loa: false,
        hmo: false,
        phil_health: true,
        queue: false,
        appointments: false,
        multi_location: false,
        admissions: false,
        cdss: false,
        ai_assistant: false,
        visits: VisitFeatures {
            teleconsult_enabled: false,
            teleconsult_now_enabled: false,
            teleconsult_later_enabled: false,
            clinic_visit_enabled: true,
            clinic_f2f_scheduling_enabled: true,
            clinic_lab_fulfillment_enabled: false,
        },
    },
};

/// Preset for a known kind
pub fn preset(kind: PresetKind) -> &'static Preset {
    match kind {
        PresetKind::FullHospital => &FULL_HOSPITAL,
        PresetKind::StandardClinic => &STANDARD_CLINIC,
        PresetKind::BasicClinic => &BASIC_CLINIC,
    }
}

/// All presets in display order
pub fn list_presets() -> Vec<&'static Preset> {
    PresetKind::ALL.iter().map(|kind| preset(*kind)).collect()
}

/// Look up a preset by display name or slug, ignoring case and separators
pub fn get_preset(name: &str) -> PortalResult<&'static Preset> {
    let wanted = normalize(name);
    PresetKind::ALL
        .iter()
        .map(|kind| preset(*kind))
        .find(|p| normalize(p.name) == wanted || normalize(p.kind.slug()) == wanted)
        .ok_or_else(|| PortalError::PresetNotFound(name.to_string()))
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}
