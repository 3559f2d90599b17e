//! Shortlist links — the (user × university) interest/commitment records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::university::AcceptanceChance;

/// Dream / target / safe bucketing of a shortlisted university.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Dream,
    Target,
    Safe,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Dream => "dream",
            Category::Target => "target",
            Category::Safe => "safe",
        }
    }

    /// Map an externally supplied category string, case-insensitive.
    /// Unrecognized values default to target.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "dream" => Category::Dream,
            "safe" => Category::Safe,
            _ => Category::Target,
        }
    }

    /// Acceptance-chance estimate derived solely from the category.
    pub fn default_acceptance_chance(&self) -> AcceptanceChance {
        match self {
            Category::Dream => AcceptanceChance::Low,
            Category::Target => AcceptanceChance::Medium,
            Category::Safe => AcceptanceChance::High,
        }
    }
}

/// Commitment level of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Shortlisted,
    Locked,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Shortlisted => "shortlisted",
            LinkStatus::Locked => "locked",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "locked" => LinkStatus::Locked,
            _ => LinkStatus::Shortlisted,
        }
    }
}

/// A user's link to a catalog university. At most one per (user, university),
/// enforced by a DB uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistLink {
    pub id: i64,
    pub user_id: i64,
    pub university_id: i64,
    pub category: Category,
    pub status: LinkStatus,
    pub acceptance_chance: AcceptanceChance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_explanation: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A link about to be inserted.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub user_id: i64,
    pub university_id: i64,
    pub category: Category,
    pub status: LinkStatus,
    pub acceptance_chance: AcceptanceChance,
    pub fit_reason: Option<String>,
    pub risk_explanation: Option<String>,
}

/// A link resolved to its catalog entry, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLink {
    #[serde(flatten)]
    pub link: ShortlistLink,
    pub university: crate::model::University,
}
