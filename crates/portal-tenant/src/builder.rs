//! Custom tenant builder

use crate::model::{ColorPalette, TenantConfig, TenantFeatures};
use crate::presets::{preset, PresetKind};
use portal_common::Timestamp;

/// Builds a custom tenant with a generated `<slug><sep><millis>` id
#[derive(Debug, Clone)]
pub struct TenantBuilder {
    name: String,
    tagline: Option<String>,
    logo_url: String,
    colors: ColorPalette,
    features: TenantFeatures,
}

impl TenantBuilder {
    /// New builder, starting from the Standard Clinic feature set
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            tagline: None,
            logo_url: String::new(),
            colors: ColorPalette::default(),
            features: preset(PresetKind::StandardClinic).features,
        }
    }

    /// Short marketing line
    pub fn tagline(mut self, tagline: &str) -> Self {
        self.tagline = Some(tagline.to_string());
        self
    }

    /// Logo location
    pub fn logo_url(mut self, url: &str) -> Self {
        self.logo_url = url.to_string();
        self
    }

    /// Branding palette
    pub fn colors(mut self, colors: ColorPalette) -> Self {
        self.colors = colors;
        self
    }

    /// Features are cascade-checked at build time
    pub fn features(mut self, features: TenantFeatures) -> Self {
        self.features = features;
        self
    }

    /// Start from a preset's feature set
    pub fn preset(self, kind: PresetKind) -> Self {
        self.features(preset(kind).features)
    }

    /// Display name the builder will use
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build with an id stamped at `at`
    pub fn build_at(&self, separator: &str, at: Timestamp) -> TenantConfig {
        TenantConfig {
            id: generate_tenant_id(&self.name, separator, at),
            name: self.name.clone(),
            tagline: self.tagline.clone(),
            logo_url: self.logo_url.clone(),
            colors: self.colors.clone(),
            features: crate::cascade::enforce_cascade(self.features),
        }
    }

    /// Build with an id stamped now
    pub fn build(&self, separator: &str) -> TenantConfig {
        self.build_at(separator, Timestamp::now())
    }
}

/// `"Acme Medical"` at 1700000000000 becomes `acme-medical_1700000000000`
pub fn generate_tenant_id(name: &str, separator: &str, at: Timestamp) -> String {
    format!("{}{}{}", slugify(name), separator, at)
}

fn slugify(name: &str) -> String {
    let words: Vec<String> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    if words.is_empty() {
        "tenant".to_string()
    } else {
        words.join("-")
    }
}
