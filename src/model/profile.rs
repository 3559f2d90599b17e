//! Student profile — academic background, study goal, budget, and
//! exam/document readiness.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Readiness of an entrance/language exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ExamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::NotStarted => "not_started",
            ExamStatus::InProgress => "in_progress",
            ExamStatus::Completed => "completed",
        }
    }

    /// Parse a stored/external status string, case-insensitive.
    /// Unknown values default to not started.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "in_progress" => ExamStatus::InProgress,
            "completed" => ExamStatus::Completed,
            _ => ExamStatus::NotStarted,
        }
    }
}

/// Readiness of the statement of purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SopStatus {
    NotStarted,
    Draft,
    Ready,
}

impl SopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SopStatus::NotStarted => "not_started",
            SopStatus::Draft => "draft",
            SopStatus::Ready => "ready",
        }
    }

    /// Parse a stored/external status string, case-insensitive.
    /// Unknown values default to not started.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "draft" => SopStatus::Draft,
            "ready" => SopStatus::Ready,
            _ => SopStatus::NotStarted,
        }
    }
}

/// One profile per user. `is_complete` turns true on first submission and
/// stays true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,

    // Academic background
    pub current_education_level: String,
    pub degree_major: String,
    pub graduation_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,

    // Study goal
    pub intended_degree: String,
    pub field_of_study: String,
    pub target_intake_year: i32,
    /// Order carries no meaning; stored comma-joined.
    pub preferred_countries: Vec<String>,

    // Budget
    pub budget_per_year: i64,
    pub funding_plan: String,

    // Readiness
    pub ielts_toefl_status: ExamStatus,
    pub gre_gmat_status: ExamStatus,
    pub sop_status: SopStatus,

    pub current_stage: Stage,
    pub is_complete: bool,
}

/// Profile fields as submitted through the intake endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSubmission {
    pub current_education_level: String,
    pub degree_major: String,
    pub graduation_year: i32,
    #[serde(default)]
    pub gpa: Option<f64>,
    pub intended_degree: String,
    pub field_of_study: String,
    pub target_intake_year: i32,
    pub preferred_countries: Vec<String>,
    pub budget_per_year: i64,
    pub funding_plan: String,
    pub ielts_toefl_status: ExamStatus,
    pub gre_gmat_status: ExamStatus,
    pub sop_status: SopStatus,
}

impl Profile {
    /// Join preferred countries for the storage column.
    pub fn countries_column(&self) -> String {
        self.preferred_countries.join(",")
    }

    /// Split a storage column back into the country list.
    pub fn split_countries(column: &str) -> Vec<String> {
        if column.is_empty() {
            return Vec::new();
        }
        column.split(',').map(|s| s.trim().to_string()).collect()
    }
}
