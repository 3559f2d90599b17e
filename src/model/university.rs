//! The university catalog — read-only except for one-time seeding.

use serde::{Deserialize, Serialize};

/// Qualitative level used for both cost and competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Unknown values default to medium.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "high" => RiskLevel::High,
            _ => RiskLevel::Medium,
        }
    }
}

/// Acceptance-chance category. A presentation heuristic, not a probability
/// model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceChance {
    Low,
    Medium,
    High,
}

impl AcceptanceChance {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceptanceChance::Low => "low",
            AcceptanceChance::Medium => "medium",
            AcceptanceChance::High => "high",
        }
    }

    /// Unknown values default to medium.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "low" => AcceptanceChance::Low,
            "high" => AcceptanceChance::High,
            _ => AcceptanceChance::Medium,
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct University {
    pub id: i64,
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub field_of_study: String,
    /// bachelors / masters / mba / phd
    pub degree_level: String,
    pub tuition_per_year: i64,
    pub cost_level: RiskLevel,
    pub competition_level: RiskLevel,
    pub base_acceptance_chance: AcceptanceChance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A catalog entry about to be inserted (seeding only).
#[derive(Debug, Clone)]
pub struct NewUniversity {
    pub name: String,
    pub country: String,
    pub city: Option<String>,
    pub field_of_study: String,
    pub degree_level: String,
    pub tuition_per_year: i64,
    pub cost_level: RiskLevel,
    pub competition_level: RiskLevel,
    pub base_acceptance_chance: AcceptanceChance,
    pub description: Option<String>,
}

/// Catalog list filters. All optional; combined with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UniversityFilter {
    pub max_budget_per_year: Option<i64>,
    /// Comma-separated in the query string.
    pub countries: Option<String>,
    pub field_of_study: Option<String>,
    pub degree_level: Option<String>,
}

impl UniversityFilter {
    pub fn country_list(&self) -> Vec<String> {
        self.countries
            .as_deref()
            .map(|c| {
                c.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
