//! Profile intake and the dashboard summary.

use axum::extract::State;
use axum::{Json, Router, routing::get, routing::post};
use serde::Serialize;
use tracing::info;

use crate::api::AppState;
use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::counsellor::prompt::profile_strength;
use crate::model::{ExamStatus, LinkStatus, Profile, ProfileSubmission};

async fn save_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(submission): Json<ProfileSubmission>,
) -> Result<Json<Profile>, ApiError> {
    let current = state.db.get_profile(auth.id).await?;
    let stage = current
        .map(|p| p.current_stage)
        .unwrap_or_default()
        .after_profile_saved();

    let profile = state.db.upsert_profile(auth.id, &submission, stage).await?;
    info!(user_id = auth.id, "Profile saved");
    Ok(Json(profile))
}

async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .db
        .get_profile(auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(profile))
}

#[derive(Serialize)]
struct DashboardStrength {
    academics: &'static str,
    exams: &'static str,
    sop: String,
    score: u32,
}

#[derive(Serialize)]
struct DashboardStage {
    current_stage: crate::stage::Stage,
    label: &'static str,
}

#[derive(Serialize)]
struct DashboardSummary {
    profile: Profile,
    strength: DashboardStrength,
    stage: DashboardStage,
}

async fn get_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardSummary>, ApiError> {
    let profile = state
        .db
        .get_profile(auth.id)
        .await?
        .filter(|p| p.is_complete)
        .ok_or_else(|| ApiError::bad_request("Complete onboarding before accessing dashboard."))?;

    let links = state.db.list_links(auth.id).await?;
    let shortlisted = links
        .iter()
        .filter(|l| l.link.status == LinkStatus::Shortlisted)
        .count();
    let locked = links
        .iter()
        .filter(|l| l.link.status == LinkStatus::Locked)
        .count();

    let academics = if profile.gpa.unwrap_or(0.0) >= 8.0 {
        "strong"
    } else {
        "average"
    };
    let exams = if profile.ielts_toefl_status == ExamStatus::Completed
        && profile.gre_gmat_status == ExamStatus::Completed
    {
        "completed"
    } else {
        "in_progress"
    };

    let summary = DashboardSummary {
        strength: DashboardStrength {
            academics,
            exams,
            sop: profile.sop_status.as_str().replace('_', " "),
            score: profile_strength(&profile, shortlisted, locked),
        },
        stage: DashboardStage {
            current_stage: profile.current_stage,
            label: profile.current_stage.label(),
        },
        profile,
    };
    Ok(Json(summary))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile", post(save_profile).get(get_profile))
        .route("/dashboard", get(get_dashboard))
}
