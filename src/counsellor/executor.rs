//! Executes the actions the model asked for. Dispatch over a closed command
//! set; every action produces an explicit outcome, and one bad action never
//! aborts the rest of the batch.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::counsellor::actions::RawAction;
use crate::error::DatabaseError;
use crate::model::{Category, LinkStatus, NewLink, NewTodo};
use crate::stage::Stage;
use crate::store::Database;

/// What happened to a single action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Mutation performed (or display-only action accepted).
    Applied,
    /// Target already in the requested state; nothing to do.
    SkippedDuplicate,
    /// Referenced university does not exist.
    SkippedMissingReference,
    /// Payload failed validation (missing id, empty title, wrong shape).
    SkippedInvalid,
    /// Action type outside the known set; passed through untouched.
    Unrecognized,
}

/// Per-action execution record.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub kind: String,
    pub status: OutcomeStatus,
    /// Human-readable confirmation line, present only for applied mutations.
    pub confirmation: Option<String>,
}

// ── Payload shapes ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateTodoPayload {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    university_id: Option<i64>,
}

#[derive(Deserialize)]
struct ShortlistPayload {
    university_id: i64,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct LockPayload {
    #[serde(default)]
    university_id: Option<i64>,
    #[serde(default)]
    user_university_id: Option<i64>,
    #[serde(default)]
    reason: Option<String>,
}

fn decode<T: for<'de> Deserialize<'de>>(payload: &Value) -> Option<T> {
    serde_json::from_value(payload.clone()).ok()
}

/// Runs a batch of actions for one user, sequentially, best-effort.
///
/// Tracks the stage locally across the batch so a shortlist followed by a
/// lock in the same reply applies both transitions.
pub struct ActionExecutor<'a> {
    db: &'a dyn Database,
    user_id: i64,
    stage: Stage,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(db: &'a dyn Database, user_id: i64, stage: Stage) -> Self {
        Self { db, user_id, stage }
    }

    /// Stage after all actions were applied.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub async fn run(
        &mut self,
        actions: &[RawAction],
    ) -> Result<Vec<ActionOutcome>, DatabaseError> {
        let mut outcomes = Vec::with_capacity(actions.len());
        for action in actions {
            let outcome = self.run_one(action).await?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn run_one(&mut self, action: &RawAction) -> Result<ActionOutcome, DatabaseError> {
        let outcome = |status, confirmation: Option<String>| ActionOutcome {
            kind: action.kind.clone(),
            status,
            confirmation,
        };

        match action.kind.as_str() {
            "create_todo" => {
                let Some(payload) = decode::<CreateTodoPayload>(&action.payload) else {
                    debug!("create_todo payload failed to decode");
                    return Ok(outcome(OutcomeStatus::SkippedInvalid, None));
                };
                if payload.title.trim().is_empty() {
                    return Ok(outcome(OutcomeStatus::SkippedInvalid, None));
                }

                // The university reference is soft: attached unvalidated,
                // resolved best-effort for the confirmation line.
                let todo = self
                    .db
                    .insert_todo(
                        self.user_id,
                        &NewTodo {
                            title: payload.title.trim().to_string(),
                            description: payload.description,
                            status: None,
                            related_university_id: payload.university_id,
                            due_date: None,
                        },
                        true,
                    )
                    .await?;

                let for_university = match payload.university_id {
                    Some(id) => self.db.get_university(id).await?.map(|u| u.name),
                    None => None,
                };
                let line = match for_university {
                    Some(name) => format!("✅ Added task: \"{}\" for {}", todo.title, name),
                    None => format!("✅ Added task: \"{}\"", todo.title),
                };
                info!(todo_id = todo.id, "Counsellor created a task");
                Ok(outcome(OutcomeStatus::Applied, Some(line)))
            }

            "shortlist_university" => {
                let Some(payload) = decode::<ShortlistPayload>(&action.payload) else {
                    debug!("shortlist_university payload failed to decode");
                    return Ok(outcome(OutcomeStatus::SkippedInvalid, None));
                };
                let Some(university) = self.db.get_university(payload.university_id).await? else {
                    debug!(university_id = payload.university_id, "Shortlist target not in catalog");
                    return Ok(outcome(OutcomeStatus::SkippedMissingReference, None));
                };
                if self
                    .db
                    .get_link(self.user_id, payload.university_id)
                    .await?
                    .is_some()
                {
                    return Ok(outcome(OutcomeStatus::SkippedDuplicate, None));
                }

                let category = payload
                    .category
                    .as_deref()
                    .map(Category::parse)
                    .unwrap_or(Category::Target);
                let fit_reason = payload.reason.unwrap_or_else(|| {
                    format!(
                        "{} fits your profile as a {} choice.",
                        university.name,
                        category.as_str()
                    )
                });

                let inserted = self
                    .db
                    .insert_link(&NewLink {
                        user_id: self.user_id,
                        university_id: payload.university_id,
                        category,
                        status: LinkStatus::Shortlisted,
                        acceptance_chance: category.default_acceptance_chance(),
                        fit_reason: Some(fit_reason),
                        risk_explanation: None,
                    })
                    .await;
                match inserted {
                    Ok(_) => {}
                    // A concurrent insert won the race; treat as existing.
                    Err(e) if e.is_unique_violation() => {
                        return Ok(outcome(OutcomeStatus::SkippedDuplicate, None));
                    }
                    Err(e) => return Err(e),
                }

                // One transition per action: a shortlist made while still
                // building the profile promotes to discovery only; the
                // discovery to finalizing step needs a further shortlist.
                self.stage = match self.stage {
                    Stage::BuildingProfile => Stage::DiscoveringUniversities,
                    other => other.after_shortlist(),
                };
                self.db.set_stage(self.user_id, self.stage).await?;

                info!(university_id = payload.university_id, "Counsellor shortlisted a university");
                Ok(outcome(
                    OutcomeStatus::Applied,
                    Some(format!(
                        "✅ Added {} to your shortlist as a {} school",
                        university.name,
                        category.as_str().to_uppercase()
                    )),
                ))
            }

            "lock_university" => {
                let Some(payload) = decode::<LockPayload>(&action.payload) else {
                    debug!("lock_university payload failed to decode");
                    return Ok(outcome(OutcomeStatus::SkippedInvalid, None));
                };

                let existing = if let Some(link_id) = payload.user_university_id {
                    self.db.get_link_by_id(link_id, self.user_id).await?
                } else if let Some(university_id) = payload.university_id {
                    self.db.get_link(self.user_id, university_id).await?
                } else {
                    return Ok(outcome(OutcomeStatus::SkippedInvalid, None));
                };

                let link = match existing {
                    Some(link) => link,
                    None => {
                        // Locking without a prior shortlist is allowed; the
                        // link is created on the spot.
                        let Some(university_id) = payload.university_id else {
                            return Ok(outcome(OutcomeStatus::SkippedMissingReference, None));
                        };
                        if self.db.get_university(university_id).await?.is_none() {
                            debug!(university_id, "Lock target not in catalog");
                            return Ok(outcome(OutcomeStatus::SkippedMissingReference, None));
                        }
                        let created = self
                            .db
                            .insert_link(&NewLink {
                                user_id: self.user_id,
                                university_id,
                                category: Category::Target,
                                status: LinkStatus::Shortlisted,
                                acceptance_chance: Category::Target.default_acceptance_chance(),
                                fit_reason: payload.reason.clone(),
                                risk_explanation: None,
                            })
                            .await;
                        match created {
                            Ok(link) => link,
                            Err(e) if e.is_unique_violation() => self
                                .db
                                .get_link(self.user_id, university_id)
                                .await?
                                .ok_or(DatabaseError::NotFound {
                                    entity: "shortlist link".into(),
                                    id: university_id.to_string(),
                                })?,
                            Err(e) => return Err(e),
                        }
                    }
                };

                if link.status == LinkStatus::Locked {
                    return Ok(outcome(OutcomeStatus::SkippedDuplicate, None));
                }

                self.db.set_link_status(link.id, LinkStatus::Locked).await?;
                self.stage = self.stage.after_lock();
                self.db.set_stage(self.user_id, self.stage).await?;

                let name = self
                    .db
                    .get_university(link.university_id)
                    .await?
                    .map(|u| u.name)
                    .unwrap_or_else(|| format!("university #{}", link.university_id));
                info!(university_id = link.university_id, "Counsellor locked a university");
                Ok(outcome(
                    OutcomeStatus::Applied,
                    Some(format!(
                        "🔒 Locked {name} — you're committed! Time to prepare applications."
                    )),
                ))
            }

            // Display-only: the client renders the card from the echoed
            // action record.
            "recommend_university" => Ok(outcome(OutcomeStatus::Applied, None)),

            other => {
                debug!(kind = other, "Unrecognized action type passed through");
                Ok(outcome(OutcomeStatus::Unrecognized, None))
            }
        }
    }
}
