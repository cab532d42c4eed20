//! Badge Aggregator
//!
//! Derives navigation badge counts from a tenant's notification list.

use crate::model::TenantFeatures;
use serde::{Deserialize, Serialize};

/// Notification as read from the notification store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Already seen by the patient
    pub read: bool,
    /// Headline
    pub title: String,
    /// Body text
    pub message: String,
    /// Portal route the notification points to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Count unread notifications whose link starts with one of `route_prefixes`
/// or whose title or message contains one of `keywords` (case-insensitive).
pub fn count_unread<P, K>(
    notifications: Option<&[Notification]>,
    route_prefixes: &[P],
    keywords: &[K],
) -> usize
where
    P: AsRef<str>,
    K: AsRef<str>,
{
    let Some(notifications) = notifications else {
        return 0;
    };
    let keywords: Vec<String> = keywords.iter().map(|k| k.as_ref().to_lowercase()).collect();

    notifications
        .iter()
        .filter(|n| !n.read)
        .filter(|n| {
            let by_link = n.link.as_deref().is_some_and(|link| {
                route_prefixes.iter().any(|p| link.starts_with(p.as_ref()))
            });
            by_link || mentions_any(n, &keywords)
        })
        .count()
}

fn mentions_any(n: &Notification, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return false;
    }
    let title = n.title.to_lowercase();
    let message = n.message.to_lowercase();
    keywords
        .iter()
        .any(|k| title.contains(k.as_str()) || message.contains(k.as_str()))
}

/// Prefix and keyword table for one badge
#[derive(Debug, Clone, Copy)]
pub struct BadgeRule {
    /// Link prefixes that count toward the badge
    pub route_prefixes: &'static [&'static str],
    /// Lowercase words matched in title or message
    pub keywords: &'static [&'static str],
}

/// Navigation sections that carry a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    /// Appointments, visits and teleconsults
    Care,
    /// Billing and coverage
    Finance,
    /// Events and outreach
    Community,
    /// Results, medications and immunization history
    Records,
    /// New prescriptions
    NewMedications,
    /// New lab results
    NewLabs,
    /// New immunization entries
    NewImmunizations,
}

impl BadgeCategory {
    /// Every category in navigation order
    pub const ALL: [BadgeCategory; 7] = [
        Self::Care,
        Self::Finance,
        Self::Community,
        Self::Records,
        Self::NewMedications,
        Self::NewLabs,
        Self::NewImmunizations,
    ];

    /// Matching table for this category
    pub fn rule(&self) -> BadgeRule {
        match self {
            Self::Care => BadgeRule {
                route_prefixes: &["/appointments", "/visits", "/teleconsult", "/queue"],
                keywords: &["appointment", "visit", "consult", "queue"],
            },
            Self::Finance => BadgeRule {
                route_prefixes: &["/billing", "/benefits"],
                keywords: &["bill", "invoice", "payment", "hmo", "philhealth", "loa"],
            },
            Self::Community => BadgeRule {
                route_prefixes: &["/events", "/community"],
                keywords: &["event", "webinar", "health fair"],
            },
            Self::Records => BadgeRule {
                route_prefixes: &["/results", "/medications", "/immunizations", "/history"],
                keywords: &["result", "medication", "prescription", "immunization", "vaccine"],
            },
            Self::NewMedications => BadgeRule {
                route_prefixes: &["/medications"],
                keywords: &["medication", "prescription"],
            },
            Self::NewLabs => BadgeRule {
                route_prefixes: &["/results"],
                keywords: &["lab result", "laboratory"],
            },
            Self::NewImmunizations => BadgeRule {
                route_prefixes: &["/immunizations"],
                keywords: &["immunization", "vaccine"],
            },
        }
    }

    /// Count for this category
    pub fn count(&self, notifications: Option<&[Notification]>) -> usize {
        let rule = self.rule();
        count_unread(notifications, rule.route_prefixes, rule.keywords)
    }
}

/// Badge counts for every category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeCounts {
    /// [`BadgeCategory::Care`]
    pub care: usize,
    /// [`BadgeCategory::Finance`]
    pub finance: usize,
    /// [`BadgeCategory::Community`]
    pub community: usize,
    /// [`BadgeCategory::Records`]
    pub records: usize,
    /// [`BadgeCategory::NewMedications`]
    pub new_medications: usize,
    /// [`BadgeCategory::NewLabs`]
    pub new_labs: usize,
    /// [`BadgeCategory::NewImmunizations`]
    pub new_immunizations: usize,
}

impl BadgeCounts {
    /// Count every category over one notification list
    pub fn from_notifications(notifications: Option<&[Notification]>) -> Self {
        Self {
            care: BadgeCategory::Care.count(notifications),
            finance: BadgeCategory::Finance.count(notifications),
            community: BadgeCategory::Community.count(notifications),
            records: BadgeCategory::Records.count(notifications),
            new_medications: BadgeCategory::NewMedications.count(notifications),
            new_labs: BadgeCategory::NewLabs.count(notifications),
            new_immunizations: BadgeCategory::NewImmunizations.count(notifications),
        }
    }

    /// Count for one category
    pub fn get(&self, category: BadgeCategory) -> usize {
        match category {
            BadgeCategory::Care => self.care,
            BadgeCategory::Finance => self.finance,
            BadgeCategory::Community => self.community,
            BadgeCategory::Records => self.records,
            BadgeCategory::NewMedications => self.new_medications,
            BadgeCategory::NewLabs => self.new_labs,
            BadgeCategory::NewImmunizations => self.new_immunizations,
        }
    }

    /// Zero the badges of sections the tenant does not show
    pub fn gated(mut self, features: &TenantFeatures) -> Self {
        if !features.hmo && !features.phil_health {
            self.finance = 0;
        }
        let visits = &features.visits;
        if !features.appointments && !visits.teleconsult_enabled && !visits.clinic_visit_enabled {
            self.care = 0;
        }
        self
    }

    /// Sum of the four section badges. The `new_*` counts overlap `records`.
    pub fn total(&self) -> usize {
        self.care + self.finance + self.community + self.records
    }
}
