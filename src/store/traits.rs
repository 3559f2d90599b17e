//! `Database` trait — single async interface for all persistence.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::model::{
    ChatMessage, ChatRole, NewLink, NewTodo, NewUniversity, Profile, ProfileSubmission,
    ResolvedLink, ShortlistLink, Todo, TodoPatch, University, UniversityFilter, User,
};
use crate::stage::Stage;

/// Backend-agnostic persistence covering accounts, profiles, the catalog,
/// shortlist links, todos, and chat history.
#[async_trait]
pub trait Database: Send + Sync {
    // ── Users ───────────────────────────────────────────────────────

    /// Insert a user. Duplicate email yields a constraint error.
    async fn insert_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, DatabaseError>;

    async fn get_user(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    // ── Profiles ────────────────────────────────────────────────────

    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>, DatabaseError>;

    /// Create or replace the user's profile fields. Marks the profile
    /// complete and records the given stage.
    async fn upsert_profile(
        &self,
        user_id: i64,
        submission: &ProfileSubmission,
        stage: Stage,
    ) -> Result<Profile, DatabaseError>;

    /// Update only the journey stage.
    async fn set_stage(&self, user_id: i64, stage: Stage) -> Result<(), DatabaseError>;

    // ── Catalog ─────────────────────────────────────────────────────

    async fn list_universities(
        &self,
        filter: &UniversityFilter,
    ) -> Result<Vec<University>, DatabaseError>;

    async fn get_university(&self, id: i64) -> Result<Option<University>, DatabaseError>;

    async fn count_universities(&self) -> Result<i64, DatabaseError>;

    /// Bulk insert for one-time seeding.
    async fn insert_universities(
        &self,
        universities: &[NewUniversity],
    ) -> Result<(), DatabaseError>;

    // ── Shortlist links ─────────────────────────────────────────────

    async fn get_link(
        &self,
        user_id: i64,
        university_id: i64,
    ) -> Result<Option<ShortlistLink>, DatabaseError>;

    /// Get a link by its own id, scoped to the owning user.
    async fn get_link_by_id(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<ShortlistLink>, DatabaseError>;

    /// Insert a link. A duplicate (user, university) pair yields a
    /// constraint error — callers treat that as "already exists".
    async fn insert_link(&self, link: &NewLink) -> Result<ShortlistLink, DatabaseError>;

    async fn set_link_status(
        &self,
        id: i64,
        status: crate::model::LinkStatus,
    ) -> Result<(), DatabaseError>;

    /// All of a user's links, each resolved to its catalog entry.
    async fn list_links(&self, user_id: i64) -> Result<Vec<ResolvedLink>, DatabaseError>;

    // ── Todos ───────────────────────────────────────────────────────

    async fn insert_todo(
        &self,
        user_id: i64,
        todo: &NewTodo,
        created_by_ai: bool,
    ) -> Result<Todo, DatabaseError>;

    async fn list_todos(&self, user_id: i64) -> Result<Vec<Todo>, DatabaseError>;

    /// Apply a partial update. Returns `None` when the todo does not exist
    /// or belongs to someone else.
    async fn update_todo(
        &self,
        id: i64,
        user_id: i64,
        patch: &TodoPatch,
    ) -> Result<Option<Todo>, DatabaseError>;

    // ── Chat history ────────────────────────────────────────────────

    async fn append_chat(
        &self,
        user_id: i64,
        role: ChatRole,
        content: &str,
        session_id: Option<&str>,
    ) -> Result<ChatMessage, DatabaseError>;

    /// Most recent `limit` messages, re-ordered chronologically for display.
    async fn recent_chat(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, DatabaseError>;
}
