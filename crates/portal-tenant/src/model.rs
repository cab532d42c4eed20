//! Tenant Data Model

use serde::{Deserialize, Serialize};

/// Tenant ID
pub type TenantId = String;

/// Tenant definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    /// Unique tenant ID, also the registry key
    pub id: TenantId,
    /// Display name
    pub name: String,
    /// Short marketing line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    /// Logo location
    pub logo_url: String,
    /// Branding palette
    pub colors: ColorPalette,
    /// Enabled capabilities
    pub features: TenantFeatures,
}

impl TenantConfig {
    /// Check if a feature is enabled for this tenant
    pub fn has_feature(&self, flag: FeatureFlag) -> bool {
        self.features.is_enabled(flag)
    }
}

/// Seven color roles used by the portal theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorPalette {
    /// Main brand color
    pub primary: String,
    /// Accent color
    pub secondary: String,
    /// Page background
    pub background: String,
    /// Card and panel background
    pub surface: String,
    /// Body text
    pub text: String,
    /// Secondary text
    pub text_muted: String,
    /// Dividers and outlines
    pub border: String,
}

impl ColorPalette {
    /// Palette with the given accents and the portal's neutral surfaces
    pub fn with_accents(primary: &str, secondary: &str) -> Self {
        Self {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
            ..Self::default()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            primary: "#0f766e".to_string(),
            secondary: "#0ea5e9".to_string(),
            background: "#f8fafc".to_string(),
            surface: "#ffffff".to_string(),
            text: "#0f172a".to_string(),
            text_muted: "#64748b".to_string(),
            border: "#e2e8f0".to_string(),
        }
    }
}

/// Full capability set of a tenant. Every flag is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantFeatures {
    /// Single sign-on
    pub sso: bool,
    /// Letter of authorization requests
    pub loa: bool,
    /// HMO coverage and billing
    pub hmo: bool,
    /// PhilHealth coverage
    pub phil_health: bool,
    /// Walk-in queue
    pub queue: bool,
    /// Appointment booking
    pub appointments: bool,
    /// More than one facility
    pub multi_location: bool,
    /// Inpatient admissions
    pub admissions: bool,
    /// Clinical decision support
    pub cdss: bool,
    /// AI assistant
    pub ai_assistant: bool,
    /// Visit sub-features
    pub visits: VisitFeatures,
}

impl TenantFeatures {
    /// Every flag enabled
    pub const fn all_enabled() -> Self {
        Self {
            sso: true,
            loa: true,
            hmo: true,
            phil_health: true,
            queue: true,
            appointments: true,
            multi_location: true,
            admissions: true,
            cdss: true,
            ai_assistant: true,
            visits: VisitFeatures {
                teleconsult_enabled: true,
                teleconsult_now_enabled: true,
                teleconsult_later_enabled: true,
                clinic_visit_enabled: true,
                clinic_f2f_scheduling_enabled: true,
                clinic_lab_fulfillment_enabled: true,
            },
        }
    }

    /// Read a flag by name
    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        flag.get(self)
    }

    /// Flags currently switched on
    pub fn enabled_flags(&self) -> Vec<FeatureFlag> {
        FeatureFlag::ALL
            .iter()
            .copied()
            .filter(|flag| flag.get(self))
            .collect()
    }

    /// True when no child visit flag is on under a disabled parent
    pub fn is_consistent(&self) -> bool {
        crate::cascade::VISIT_DEPENDENCIES.iter().all(|dep| {
            dep.parent.get(self) || dep.children.iter().all(|child| !child.get(self))
        })
    }
}

/// Visit sub-features. Children are only meaningful while their parent is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitFeatures {
    /// Teleconsultation
    pub teleconsult_enabled: bool,
    /// On-demand teleconsult, needs `teleconsult_enabled`
    pub teleconsult_now_enabled: bool,
    /// Scheduled teleconsult, needs `teleconsult_enabled`
    pub teleconsult_later_enabled: bool,
    /// In-person clinic visits
    pub clinic_visit_enabled: bool,
    /// Face-to-face scheduling, needs `clinic_visit_enabled`
    pub clinic_f2f_scheduling_enabled: bool,
    /// Lab fulfillment at the clinic, needs `clinic_visit_enabled`
    pub clinic_lab_fulfillment_enabled: bool,
}

/// Name of a single feature flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureFlag {
    /// `sso`
    Sso,
    /// `loa`
    Loa,
    /// `hmo`
    Hmo,
    /// `phil_health`
    PhilHealth,
    /// `queue`
    Queue,
    /// `appointments`
    Appointments,
    /// `multi_location`
    MultiLocation,
    /// `admissions`
    Admissions,
    /// `cdss`
    Cdss,
    /// `ai_assistant`
    AiAssistant,
    /// `visits.teleconsult_enabled`
    TeleconsultEnabled,
    /// `visits.teleconsult_now_enabled`
    TeleconsultNowEnabled,
    /// `visits.teleconsult_later_enabled`
    TeleconsultLaterEnabled,
    /// `visits.clinic_visit_enabled`
    ClinicVisitEnabled,
    /// `visits.clinic_f2f_scheduling_enabled`
    ClinicF2fSchedulingEnabled,
    /// `visits.clinic_lab_fulfillment_enabled`
    ClinicLabFulfillmentEnabled,
}

impl FeatureFlag {
    /// All flags, scalars first then visit flags
    pub const ALL: [FeatureFlag; 16] = [
        Self::Sso,
        Self::Loa,
        Self::Hmo,
        Self::PhilHealth,
        Self::Queue,
        Self::Appointments,
        Self::MultiLocation,
        Self::Admissions,
        Self::Cdss,
        Self::AiAssistant,
        Self::TeleconsultEnabled,
        Self::TeleconsultNowEnabled,
        Self::TeleconsultLaterEnabled,
        Self::ClinicVisitEnabled,
        Self::ClinicF2fSchedulingEnabled,
        Self::ClinicLabFulfillmentEnabled,
    ];

    /// Wire key, as used in JSON feature objects
    pub fn key(&self) -> &'static str {
        match self {
            Self::Sso => "sso",
            Self::Loa => "loa",
            Self::Hmo => "hmo",
            Self::PhilHealth => "philHealth",
            Self::Queue => "queue",
            Self::Appointments => "appointments",
            Self::MultiLocation => "multiLocation",
            Self::Admissions => "admissions",
            Self::Cdss => "cdss",
            Self::AiAssistant => "aiAssistant",
            Self::TeleconsultEnabled => "teleconsultEnabled",
            Self::TeleconsultNowEnabled => "teleconsultNowEnabled",
            Self::TeleconsultLaterEnabled => "teleconsultLaterEnabled",
            Self::ClinicVisitEnabled => "clinicVisitEnabled",
            Self::ClinicF2fSchedulingEnabled => "clinicF2fSchedulingEnabled",
            Self::ClinicLabFulfillmentEnabled => "clinicLabFulfillmentEnabled",
        }
    }

    /// Reverse of [`FeatureFlag::key`]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|flag| flag.key() == key)
    }

    /// Whether the flag lives under `visits`
    pub fn is_visit_flag(&self) -> bool {
        matches!(
            self,
            Self::TeleconsultEnabled
                | Self::TeleconsultNowEnabled
                | Self::TeleconsultLaterEnabled
                | Self::ClinicVisitEnabled
                | Self::ClinicF2fSchedulingEnabled
                | Self::ClinicLabFulfillmentEnabled
        )
    }

    /// Read this flag from `features`
    pub fn get(&self, features: &TenantFeatures) -> bool {
        let v = &features.visits;
        match self {
            Self::Sso => features.sso,
            Self::Loa => features.loa,
            Self::Hmo => features.hmo,
            Self::PhilHealth => features.phil_health,
            Self::Queue => features.queue,
            Self::Appointments => features.appointments,
            Self::MultiLocation => features.multi_location,
            Self::Admissions => features.admissions,
            Self::Cdss => features.cdss,
            Self::AiAssistant => features.ai_assistant,
            Self::TeleconsultEnabled => v.teleconsult_enabled,
            Self::TeleconsultNowEnabled => v.teleconsult_now_enabled,
            Self::TeleconsultLaterEnabled => v.teleconsult_later_enabled,
            Self::ClinicVisitEnabled => v.clinic_visit_enabled,
            Self::ClinicF2fSchedulingEnabled => v.clinic_f2f_scheduling_enabled,
            Self::ClinicLabFulfillmentEnabled => v.clinic_lab_fulfillment_enabled,
        }
    }

    /// Write this flag into `features`. No cascade is applied.
    pub fn set(&self, features: &mut TenantFeatures, value: bool) {
        *self.field(features) = value;
    }

    fn field<'a>(&self, f: &'a mut TenantFeatures) -> &'a mut bool {
        match self {
            Self::Sso => &mut f.sso,
            Self::Loa => &mut f.loa,
            Self::Hmo => &mut f.hmo,
            Self::PhilHealth => &mut f.phil_health,
            Self::Queue => &mut f.queue,
            Self::Appointments => &mut f.appointments,
            Self::MultiLocation => &mut f.multi_location,
            Self::Admissions => &mut f.admissions,
            Self::Cdss => &mut f.cdss,
            Self::AiAssistant => &mut f.ai_assistant,
            Self::TeleconsultEnabled => &mut f.visits.teleconsult_enabled,
            Self::TeleconsultNowEnabled => &mut f.visits.teleconsult_now_enabled,
            Self::TeleconsultLaterEnabled => &mut f.visits.teleconsult_later_enabled,
            Self::ClinicVisitEnabled => &mut f.visits.clinic_visit_enabled,
            Self::ClinicF2fSchedulingEnabled => &mut f.visits.clinic_f2f_scheduling_enabled,
            Self::ClinicLabFulfillmentEnabled => &mut f.visits.clinic_lab_fulfillment_enabled,
        }
    }
}

impl std::fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Partial update of a feature set. Absent fields keep their current value.
///
/// Unknown keys are ignored when deserializing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeaturePatch {
    /// New `sso` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso: Option<bool>,
    /// New `loa` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loa: Option<bool>,
    /// New `hmo` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hmo: Option<bool>,
    /// New `phil_health` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phil_health: Option<bool>,
    /// New `queue` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<bool>,
    /// New `appointments` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointments: Option<bool>,
    /// New `multi_location` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_location: Option<bool>,
    /// New `admissions` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admissions: Option<bool>,
    /// New `cdss` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdss: Option<bool>,
    /// New `ai_assistant` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_assistant: Option<bool>,
    /// Visit sub-feature changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visits: Option<VisitFeaturePatch>,
}

/// Partial update of the visit sub-features
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisitFeaturePatch {
    /// New `teleconsult_enabled` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teleconsult_enabled: Option<bool>,
    /// New `teleconsult_now_enabled` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teleconsult_now_enabled: Option<bool>,
    /// New `teleconsult_later_enabled` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teleconsult_later_enabled: Option<bool>,
    /// New `clinic_visit_enabled` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_visit_enabled: Option<bool>,
    /// New `clinic_f2f_scheduling_enabled` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_f2f_scheduling_enabled: Option<bool>,
    /// New `clinic_lab_fulfillment_enabled` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_lab_fulfillment_enabled: Option<bool>,
}

impl FeaturePatch {
    /// Single-field patch
    pub fn flag(flag: FeatureFlag, value: bool) -> Self {
        Self::default().with(flag, value)
    }

    /// Add one field to the patch
    pub fn with(mut self, flag: FeatureFlag, value: bool) -> Self {
        let v = Some(value);
        match flag {
            FeatureFlag::Sso => self.sso = v,
            FeatureFlag::Loa => self.loa = v,
            FeatureFlag::Hmo => self.hmo = v,
            FeatureFlag::PhilHealth => self.phil_health = v,
            FeatureFlag::Queue => self.queue = v,
            FeatureFlag::Appointments => self.appointments = v,
            FeatureFlag::MultiLocation => self.multi_location = v,
            FeatureFlag::Admissions => self.admissions = v,
            FeatureFlag::Cdss => self.cdss = v,
            FeatureFlag::AiAssistant => self.ai_assistant = v,
            FeatureFlag::TeleconsultEnabled => self.visits_mut().teleconsult_enabled = v,
            FeatureFlag::TeleconsultNowEnabled => self.visits_mut().teleconsult_now_enabled = v,
            FeatureFlag::TeleconsultLaterEnabled => self.visits_mut().teleconsult_later_enabled = v,
            FeatureFlag::ClinicVisitEnabled => self.visits_mut().clinic_visit_enabled = v,
            FeatureFlag::ClinicF2fSchedulingEnabled => {
                self.visits_mut().clinic_f2f_scheduling_enabled = v
            }
            FeatureFlag::ClinicLabFulfillmentEnabled => {
                self.visits_mut().clinic_lab_fulfillment_enabled = v
            }
        }
        self
    }

    fn visits_mut(&mut self) -> &mut VisitFeaturePatch {
        self.visits.get_or_insert_with(VisitFeaturePatch::default)
    }

    /// Patch containing nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<TenantFeatures> for FeaturePatch {
    /// Full-replacement patch: every key present
    fn from(f: TenantFeatures) -> Self {
        Self {
            sso: Some(f.sso),
            loa: Some(f.loa),
            hmo: Some(f.hmo),
            phil_health: Some(f.phil_health),
            queue: Some(f.queue),
            appointments: Some(f.appointments),
            multi_location: Some(f.multi_location),
            admissions: Some(f.admissions),
            cdss: Some(f.cdss),
            ai_assistant: Some(f.ai_assistant),
            visits: Some(VisitFeaturePatch {
                teleconsult_enabled: Some(f.visits.teleconsult_enabled),
                teleconsult_now_enabled: Some(f.visits.teleconsult_now_enabled),
                teleconsult_later_enabled: Some(f.visits.teleconsult_later_enabled),
                clinic_visit_enabled: Some(f.visits.clinic_visit_enabled),
                clinic_f2f_scheduling_enabled: Some(f.visits.clinic_f2f_scheduling_enabled),
                clinic_lab_fulfillment_enabled: Some(f.visits.clinic_lab_fulfillment_enabled),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_keys_roundtrip() {
        for flag in FeatureFlag::ALL {
            assert_eq!(FeatureFlag::from_key(flag.key()), Some(flag));
        }
        assert_eq!(FeatureFlag::from_key("telemetry"), None);
    }

    #[test]
    fn test_flag_get_set() {
        let mut features = TenantFeatures::default();
        FeatureFlag::PhilHealth.set(&mut features, true);
        FeatureFlag::ClinicVisitEnabled.set(&mut features, true);

        assert!(features.phil_health);
        assert!(features.visits.clinic_visit_enabled);
        assert_eq!(
            features.enabled_flags(),
            vec![FeatureFlag::PhilHealth, FeatureFlag::ClinicVisitEnabled]
        );
    }

    #[test]
    fn test_visit_flags_match_visit_fields() {
        let visits_only = TenantFeatures {
            visits: TenantFeatures::all_enabled().visits,
            ..TenantFeatures::default()
        };
        for flag in FeatureFlag::ALL {
            assert_eq!(flag.is_visit_flag(), flag.get(&visits_only), "{flag}");
        }
    }

    #[test]
    fn test_has_feature_guards_pages() {
        let mut tenant = TenantConfig {
            id: "acme_1".into(),
            name: "Acme".into(),
            tagline: None,
            logo_url: String::new(),
            colors: ColorPalette::default(),
            features: TenantFeatures::default(),
        };
        tenant.features.admissions = true;
        tenant.features.visits.clinic_visit_enabled = true;

        assert!(tenant.has_feature(FeatureFlag::Admissions));
        assert!(tenant.has_feature(FeatureFlag::ClinicVisitEnabled));
        assert!(!tenant.has_feature(FeatureFlag::Hmo));
        assert!(!tenant.has_feature(FeatureFlag::ClinicLabFulfillmentEnabled));
    }

    #[test]
    fn test_patch_with_every_flag() {
        for flag in FeatureFlag::ALL {
            let patch = FeaturePatch::flag(flag, true);
            let next = crate::cascade::apply_feature_update(&TenantFeatures::all_enabled(), &patch);
            assert_eq!(next, TenantFeatures::all_enabled(), "{flag}");
            assert_eq!(patch.visits.is_some(), flag.is_visit_flag(), "{flag}");

            let off = crate::cascade::apply_feature_update(
                &TenantFeatures::all_enabled(),
                &FeaturePatch::flag(flag, false),
            );
            assert!(!off.is_enabled(flag), "{flag}");
        }
    }

    #[test]
    fn test_features_json_shape() {
        let json = serde_json::to_value(TenantFeatures::all_enabled()).unwrap();
        assert_eq!(json["philHealth"], true);
        assert_eq!(json["aiAssistant"], true);
        assert_eq!(json["visits"]["clinicF2fSchedulingEnabled"], true);
    }

    #[test]
    fn test_patch_ignores_unknown_keys() {
        let patch: FeaturePatch = serde_json::from_str(
            r#"{"hmo": true, "billingV2": true, "visits": {"teleconsultEnabled": false, "x": 1}}"#,
        )
        .unwrap();

        assert_eq!(patch.hmo, Some(true));
        assert_eq!(patch.sso, None);
        assert_eq!(patch.visits.unwrap().teleconsult_enabled, Some(false));
    }

    #[test]
    fn test_patch_builder() {
        let patch = FeaturePatch::flag(FeatureFlag::TeleconsultNowEnabled, true)
            .with(FeatureFlag::Queue, false);

        assert_eq!(patch.queue, Some(false));
        assert_eq!(patch.visits.unwrap().teleconsult_now_enabled, Some(true));
        assert_eq!(patch.visits.unwrap().clinic_visit_enabled, None);
        assert!(!patch.is_empty());
        assert!(FeaturePatch::default().is_empty());
    }

    #[test]
    fn test_consistency_check() {
        let mut features = TenantFeatures::default();
        assert!(features.is_consistent());

        features.visits.teleconsult_later_enabled = true;
        assert!(!features.is_consistent());

        features.visits.teleconsult_enabled = true;
        assert!(features.is_consistent());
    }

    #[test]
    fn test_palette_accents() {
        let palette = ColorPalette::with_accents("#b91c1c", "#f59e0b");
        assert_eq!(palette.primary, "#b91c1c");
        assert_eq!(palette.border, ColorPalette::default().border);
    }
}
