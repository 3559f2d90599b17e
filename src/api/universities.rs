//! Catalog discovery, shortlisting, locking, and application guidance.

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get, routing::post};
use serde_json::{Value, json};
use tracing::info;

use crate::api::AppState;
use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::model::{
    Category, LinkStatus, NewLink, Profile, ResolvedLink, RiskLevel, ShortlistLink, University,
    UniversityFilter,
};
use crate::stage::Stage;

/// GET /universities — filtered catalog. Seeds the built-in set when the
/// table is empty so a fresh install is immediately usable.
async fn list_universities(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<UniversityFilter>,
) -> Result<Json<Vec<University>>, ApiError> {
    state
        .db
        .get_profile(auth.id)
        .await?
        .filter(|p| p.is_complete)
        .ok_or_else(|| {
            ApiError::bad_request("Complete onboarding before discovering universities.")
        })?;

    if state.db.count_universities().await? == 0 {
        info!("Seeding university catalog");
        state
            .db
            .insert_universities(&crate::store::seed::default_catalog())
            .await?;
    }

    let universities = state.db.list_universities(&filter).await?;
    Ok(Json(universities))
}

/// Rule-based category: tuition vs budget with competition as tie-breaker.
fn categorize(university: &University, profile: &Profile) -> Category {
    let budget = profile.budget_per_year as f64;
    let tuition = university.tuition_per_year as f64;
    if tuition > budget * 1.2 || university.competition_level == RiskLevel::High {
        Category::Dream
    } else if tuition < budget * 0.8 && university.competition_level == RiskLevel::Low {
        Category::Safe
    } else {
        Category::Target
    }
}

/// POST /universities/{id}/shortlist — idempotent; re-shortlisting returns
/// the existing link unchanged.
async fn shortlist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(university_id): Path<i64>,
) -> Result<Json<ShortlistLink>, ApiError> {
    let university = state
        .db
        .get_university(university_id)
        .await?
        .ok_or_else(|| ApiError::not_found("University not found"))?;

    if let Some(existing) = state.db.get_link(auth.id, university_id).await? {
        return Ok(Json(existing));
    }

    let profile = state
        .db
        .get_profile(auth.id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Profile required to shortlist."))?;

    let category = categorize(&university, &profile);
    let risk_explanation = if category == Category::Dream {
        "Higher competition and cost relative to your budget."
    } else {
        "Good balance of cost and competition."
    };

    let link = match state
        .db
        .insert_link(&NewLink {
            user_id: auth.id,
            university_id,
            category,
            status: LinkStatus::Shortlisted,
            acceptance_chance: university.base_acceptance_chance,
            fit_reason: Some(format!(
                "Matches your field {} and degree goal {}.",
                profile.field_of_study, profile.intended_degree
            )),
            risk_explanation: Some(risk_explanation.to_string()),
        })
        .await
    {
        Ok(link) => link,
        // Lost a concurrent race; the winner's link is the answer.
        Err(e) if e.is_unique_violation() => state
            .db
            .get_link(auth.id, university_id)
            .await?
            .ok_or_else(|| ApiError::Internal("shortlist link vanished".into()))?,
        Err(e) => return Err(e.into()),
    };

    let next = profile.current_stage.after_shortlist();
    if next != profile.current_stage {
        state.db.set_stage(auth.id, next).await?;
    }

    info!(user_id = auth.id, university_id, "University shortlisted");
    Ok(Json(link))
}

/// POST /universities/{link_id}/lock
async fn lock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(link_id): Path<i64>,
) -> Result<Json<ShortlistLink>, ApiError> {
    let link = state
        .db
        .get_link_by_id(link_id, auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Shortlisted university not found"))?;

    state.db.set_link_status(link.id, LinkStatus::Locked).await?;
    state
        .db
        .set_stage(auth.id, Stage::PreparingApplications)
        .await?;

    let updated = state
        .db
        .get_link_by_id(link.id, auth.id)
        .await?
        .ok_or_else(|| ApiError::Internal("locked link vanished".into()))?;
    info!(user_id = auth.id, link_id, "University locked");
    Ok(Json(updated))
}

/// POST /universities/{link_id}/unlock — reverts the link only; the journey
/// stage stays where it is.
async fn unlock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(link_id): Path<i64>,
) -> Result<Json<ShortlistLink>, ApiError> {
    let link = state
        .db
        .get_link_by_id(link_id, auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Locked university not found"))?;

    state
        .db
        .set_link_status(link.id, LinkStatus::Shortlisted)
        .await?;

    let updated = state
        .db
        .get_link_by_id(link.id, auth.id)
        .await?
        .ok_or_else(|| ApiError::Internal("unlocked link vanished".into()))?;
    Ok(Json(updated))
}

async fn my_universities(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ResolvedLink>>, ApiError> {
    let links = state.db.list_links(auth.id).await?;
    Ok(Json(links))
}

/// GET /application-guidance — document checklist and timeline for the
/// first locked university.
async fn application_guidance(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let links = state.db.list_links(auth.id).await?;
    let locked = links
        .iter()
        .find(|l| l.link.status == LinkStatus::Locked)
        .ok_or_else(|| {
            ApiError::bad_request("Lock at least one university to see application guidance.")
        })?;

    let documents = [
        "Passport",
        "Academic transcripts",
        "IELTS/TOEFL score report",
        "GRE/GMAT score report (if applicable)",
        "Statement of Purpose (SOP)",
        "Letters of Recommendation",
        "Resume / CV",
        "Financial documents / bank statements",
    ];
    let timeline = [
        "Month 1: Finalize university list and prepare for exams.",
        "Month 2: Draft SOP and request recommendation letters.",
        "Month 3: Take language and aptitude exams.",
        "Month 4: Finalize documents and submit application.",
    ];

    Ok(Json(json!({
        "locked_university": {
            "id": locked.link.id,
            "name": locked.university.name,
            "country": locked.university.country,
        },
        "required_documents": documents,
        "timeline": timeline,
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/universities", get(list_universities))
        .route("/universities/{university_id}/shortlist", post(shortlist))
        .route("/universities/{link_id}/lock", post(lock))
        .route("/universities/{link_id}/unlock", post(unlock))
        .route("/my-universities", get(my_universities))
        .route("/application-guidance", get(application_guidance))
}
