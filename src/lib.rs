//! AI study-abroad counsellor backend.
//!
//! Accounts, profile intake, a university catalog with shortlist/lock flow,
//! to-dos, and an LLM-backed counsellor chat whose replies can carry a
//! fenced actions block that is executed against the store.

pub mod api;
pub mod config;
pub mod counsellor;
pub mod error;
pub mod llm;
pub mod model;
pub mod stage;
pub mod store;

use std::sync::Arc;

use api::{AppState, AuthKeys};
use config::Settings;
use counsellor::CounsellorService;
use store::Database;

/// Wire up shared state from settings and an opened database.
pub fn build_state(settings: &Settings, db: Arc<dyn Database>) -> error::Result<AppState> {
    let llm = llm::LlmClient::new(&settings.llm)?;
    Ok(AppState {
        counsellor: CounsellorService::new(db.clone(), llm),
        auth: AuthKeys::new(&settings.auth),
        db,
    })
}
