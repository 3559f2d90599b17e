//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases. `libsql::Connection` is
//! `Send + Sync` and safe for concurrent async use.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::error::DatabaseError;
use crate::model::{
    ChatMessage, ChatRole, LinkStatus, NewLink, NewTodo, NewUniversity, Profile,
    ProfileSubmission, ResolvedLink, ShortlistLink, Todo, TodoPatch, University,
    UniversityFilter, User,
};
use crate::model::{AcceptanceChance, Category, ExamStatus, RiskLevel, SopStatus, TodoStatus};
use crate::stage::Stage;
use crate::store::migrations;
use crate::store::traits::Database;

/// libSQL database backend.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Connection(format!("Failed to open database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        info!(path = %path.display(), "Database opened");
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn parse_optional_datetime(s: &Option<String>) -> Option<DateTime<Utc>> {
    s.as_ref().map(|s| parse_datetime(s))
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

fn opt_real(v: Option<f64>) -> libsql::Value {
    match v {
        Some(v) => libsql::Value::Real(v),
        None => libsql::Value::Null,
    }
}

fn opt_int(v: Option<i64>) -> libsql::Value {
    match v {
        Some(v) => libsql::Value::Integer(v),
        None => libsql::Value::Null,
    }
}

fn query_err(e: libsql::Error) -> DatabaseError {
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint failed") {
        DatabaseError::Constraint(msg)
    } else {
        DatabaseError::Query(msg)
    }
}

// ── Row mappers ─────────────────────────────────────────────────────

const USER_COLUMNS: &str = "id, full_name, email, password_hash, avatar_url, created_at";

fn row_to_user(row: &libsql::Row) -> Result<User, libsql::Error> {
    let created_str: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        avatar_url: row.get(4).ok(),
        created_at: parse_datetime(&created_str),
    })
}

const PROFILE_COLUMNS: &str = "id, user_id, current_education_level, degree_major, \
     graduation_year, gpa, intended_degree, field_of_study, target_intake_year, \
     preferred_countries, budget_per_year, funding_plan, ielts_toefl_status, \
     gre_gmat_status, sop_status, current_stage, is_complete";

fn row_to_profile(row: &libsql::Row) -> Result<Profile, libsql::Error> {
    let countries: String = row.get(9)?;
    let ielts: String = row.get(12)?;
    let gre: String = row.get(13)?;
    let sop: String = row.get(14)?;
    let stage: String = row.get(15)?;
    let is_complete: i64 = row.get(16)?;

    Ok(Profile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        current_education_level: row.get(2)?,
        degree_major: row.get(3)?,
        graduation_year: row.get::<i64>(4)? as i32,
        gpa: row.get(5).ok(),
        intended_degree: row.get(6)?,
        field_of_study: row.get(7)?,
        target_intake_year: row.get::<i64>(8)? as i32,
        preferred_countries: Profile::split_countries(&countries),
        budget_per_year: row.get(10)?,
        funding_plan: row.get(11)?,
        ielts_toefl_status: ExamStatus::parse(&ielts),
        gre_gmat_status: ExamStatus::parse(&gre),
        sop_status: SopStatus::parse(&sop),
        current_stage: Stage::parse(&stage),
        is_complete: is_complete != 0,
    })
}

const UNIVERSITY_COLUMNS: &str = "id, name, country, city, field_of_study, degree_level, \
     tuition_per_year, cost_level, competition_level, base_acceptance_chance, description";

fn row_to_university(row: &libsql::Row) -> Result<University, libsql::Error> {
    let cost: String = row.get(7)?;
    let competition: String = row.get(8)?;
    let chance: String = row.get(9)?;
    Ok(University {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        city: row.get(3).ok(),
        field_of_study: row.get(4)?,
        degree_level: row.get(5)?,
        tuition_per_year: row.get(6)?,
        cost_level: RiskLevel::parse(&cost),
        competition_level: RiskLevel::parse(&competition),
        base_acceptance_chance: AcceptanceChance::parse(&chance),
        description: row.get(10).ok(),
    })
}

const LINK_COLUMNS: &str = "id, user_id, university_id, category, status, acceptance_chance, \
     fit_reason, risk_explanation, created_at";

fn row_to_link(row: &libsql::Row) -> Result<ShortlistLink, libsql::Error> {
    let category: String = row.get(3)?;
    let status: String = row.get(4)?;
    let chance: String = row.get(5)?;
    let created_str: String = row.get(8)?;
    Ok(ShortlistLink {
        id: row.get(0)?,
        user_id: row.get(1)?,
        university_id: row.get(2)?,
        category: Category::parse(&category),
        status: LinkStatus::parse(&status),
        acceptance_chance: AcceptanceChance::parse(&chance),
        fit_reason: row.get(6).ok(),
        risk_explanation: row.get(7).ok(),
        created_at: parse_datetime(&created_str),
    })
}

const TODO_COLUMNS: &str = "id, user_id, title, description, status, due_date, \
     related_university_id, created_by_ai, created_at, updated_at";

fn row_to_todo(row: &libsql::Row) -> Result<Todo, libsql::Error> {
    let status: String = row.get(4)?;
    let due_str: Option<String> = row.get(5).ok();
    let created_by_ai: i64 = row.get(7)?;
    let created_str: String = row.get(8)?;
    let updated_str: String = row.get(9)?;
    Ok(Todo {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3).ok(),
        status: TodoStatus::parse(&status),
        due_date: parse_optional_datetime(&due_str),
        related_university_id: row.get(6).ok(),
        created_by_ai: created_by_ai != 0,
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

fn row_to_chat(row: &libsql::Row) -> Result<ChatMessage, libsql::Error> {
    let role: String = row.get(2)?;
    let created_str: String = row.get(5)?;
    Ok(ChatMessage {
        id: row.get(0)?,
        user_id: row.get(1)?,
        role: ChatRole::parse(&role),
        content: row.get(3)?,
        session_id: row.get(4).ok(),
        created_at: parse_datetime(&created_str),
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl Database for LibSqlBackend {
    async fn insert_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, DatabaseError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO users (full_name, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![full_name, email, password_hash, Utc::now().to_rfc3339()],
        )
        .await
        .map_err(query_err)?;

        let id = conn.last_insert_rowid();
        self.get_user(id).await?.ok_or(DatabaseError::NotFound {
            entity: "user".into(),
            id: id.to_string(),
        })
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_user(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_user(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    // ── Profiles ────────────────────────────────────────────────────

    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
                params![user_id],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_profile(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn upsert_profile(
        &self,
        user_id: i64,
        submission: &ProfileSubmission,
        stage: Stage,
    ) -> Result<Profile, DatabaseError> {
        let countries = submission.preferred_countries.join(",");

        // ON CONFLICT keeps this a single statement — the unique user_id
        // column makes create-or-update atomic.
        self.conn()
            .execute(
                "INSERT INTO profiles (user_id, current_education_level, degree_major, \
                 graduation_year, gpa, intended_degree, field_of_study, target_intake_year, \
                 preferred_countries, budget_per_year, funding_plan, ielts_toefl_status, \
                 gre_gmat_status, sop_status, current_stage, is_complete) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, 1) \
                 ON CONFLICT(user_id) DO UPDATE SET \
                 current_education_level = excluded.current_education_level, \
                 degree_major = excluded.degree_major, \
                 graduation_year = excluded.graduation_year, \
                 gpa = excluded.gpa, \
                 intended_degree = excluded.intended_degree, \
                 field_of_study = excluded.field_of_study, \
                 target_intake_year = excluded.target_intake_year, \
                 preferred_countries = excluded.preferred_countries, \
                 budget_per_year = excluded.budget_per_year, \
                 funding_plan = excluded.funding_plan, \
                 ielts_toefl_status = excluded.ielts_toefl_status, \
                 gre_gmat_status = excluded.gre_gmat_status, \
                 sop_status = excluded.sop_status, \
                 current_stage = excluded.current_stage, \
                 is_complete = 1",
                params![
                    user_id,
                    submission.current_education_level.as_str(),
                    submission.degree_major.as_str(),
                    submission.graduation_year as i64,
                    opt_real(submission.gpa),
                    submission.intended_degree.as_str(),
                    submission.field_of_study.as_str(),
                    submission.target_intake_year as i64,
                    countries,
                    submission.budget_per_year,
                    submission.funding_plan.as_str(),
                    submission.ielts_toefl_status.as_str(),
                    submission.gre_gmat_status.as_str(),
                    submission.sop_status.as_str(),
                    stage.as_str(),
                ],
            )
            .await
            .map_err(query_err)?;

        self.get_profile(user_id)
            .await?
            .ok_or(DatabaseError::NotFound {
                entity: "profile".into(),
                id: user_id.to_string(),
            })
    }

    async fn set_stage(&self, user_id: i64, stage: Stage) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE profiles SET current_stage = ?1 WHERE user_id = ?2",
                params![stage.as_str(), user_id],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    // ── Catalog ─────────────────────────────────────────────────────

    async fn list_universities(
        &self,
        filter: &UniversityFilter,
    ) -> Result<Vec<University>, DatabaseError> {
        let mut sql = format!("SELECT {UNIVERSITY_COLUMNS} FROM universities WHERE 1=1");
        let mut args: Vec<libsql::Value> = Vec::new();

        if let Some(max_budget) = filter.max_budget_per_year {
            sql.push_str(" AND tuition_per_year <= ?");
            args.push(libsql::Value::Integer(max_budget));
        }
        let countries = filter.country_list();
        if !countries.is_empty() {
            let placeholders = vec!["?"; countries.len()].join(", ");
            sql.push_str(&format!(" AND country IN ({placeholders})"));
            for c in countries {
                args.push(libsql::Value::Text(c));
            }
        }
        if let Some(ref field) = filter.field_of_study {
            sql.push_str(" AND field_of_study LIKE ?");
            args.push(libsql::Value::Text(format!("%{field}%")));
        }
        if let Some(ref level) = filter.degree_level {
            sql.push_str(" AND degree_level = ?");
            args.push(libsql::Value::Text(level.clone()));
        }
        sql.push_str(" ORDER BY id");

        let mut rows = self.conn().query(&sql, args).await.map_err(query_err)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            out.push(row_to_university(&row).map_err(query_err)?);
        }
        Ok(out)
    }

    async fn get_university(&self, id: i64) -> Result<Option<University>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {UNIVERSITY_COLUMNS} FROM universities WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_university(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn count_universities(&self) -> Result<i64, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT COUNT(*) FROM universities", ())
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => row.get(0).map_err(query_err),
            None => Ok(0),
        }
    }

    async fn insert_universities(
        &self,
        universities: &[NewUniversity],
    ) -> Result<(), DatabaseError> {
        let conn = self.conn();
        for u in universities {
            conn.execute(
                "INSERT INTO universities (name, country, city, field_of_study, degree_level, \
                 tuition_per_year, cost_level, competition_level, base_acceptance_chance, \
                 description) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    u.name.as_str(),
                    u.country.as_str(),
                    opt_text(u.city.as_deref()),
                    u.field_of_study.as_str(),
                    u.degree_level.as_str(),
                    u.tuition_per_year,
                    u.cost_level.as_str(),
                    u.competition_level.as_str(),
                    u.base_acceptance_chance.as_str(),
                    opt_text(u.description.as_deref()),
                ],
            )
            .await
            .map_err(query_err)?;
        }
        Ok(())
    }

    // ── Shortlist links ─────────────────────────────────────────────

    async fn get_link(
        &self,
        user_id: i64,
        university_id: i64,
    ) -> Result<Option<ShortlistLink>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {LINK_COLUMNS} FROM user_universities \
                     WHERE user_id = ?1 AND university_id = ?2"
                ),
                params![user_id, university_id],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_link(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn get_link_by_id(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<ShortlistLink>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {LINK_COLUMNS} FROM user_universities WHERE id = ?1 AND user_id = ?2"
                ),
                params![id, user_id],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_link(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn insert_link(&self, link: &NewLink) -> Result<ShortlistLink, DatabaseError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO user_universities (user_id, university_id, category, status, \
             acceptance_chance, fit_reason, risk_explanation, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                link.user_id,
                link.university_id,
                link.category.as_str(),
                link.status.as_str(),
                link.acceptance_chance.as_str(),
                opt_text(link.fit_reason.as_deref()),
                opt_text(link.risk_explanation.as_deref()),
                Utc::now().to_rfc3339(),
            ],
        )
        .await
        .map_err(query_err)?;

        let id = conn.last_insert_rowid();
        self.get_link_by_id(id, link.user_id)
            .await?
            .ok_or(DatabaseError::NotFound {
                entity: "shortlist link".into(),
                id: id.to_string(),
            })
    }

    async fn set_link_status(&self, id: i64, status: LinkStatus) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE user_universities SET status = ?1 WHERE id = ?2",
                params![status.as_str(), id],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn list_links(&self, user_id: i64) -> Result<Vec<ResolvedLink>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT uu.id, uu.user_id, uu.university_id, uu.category, uu.status, \
                 uu.acceptance_chance, uu.fit_reason, uu.risk_explanation, uu.created_at, \
                 u.id, u.name, u.country, u.city, u.field_of_study, u.degree_level, \
                 u.tuition_per_year, u.cost_level, u.competition_level, \
                 u.base_acceptance_chance, u.description \
                 FROM user_universities uu \
                 JOIN universities u ON u.id = uu.university_id \
                 WHERE uu.user_id = ?1 ORDER BY uu.id",
                params![user_id],
            )
            .await
            .map_err(query_err)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            let category: String = row.get(3).map_err(query_err)?;
            let status: String = row.get(4).map_err(query_err)?;
            let chance: String = row.get(5).map_err(query_err)?;
            let link_created: String = row.get(8).map_err(query_err)?;
            let cost: String = row.get(16).map_err(query_err)?;
            let competition: String = row.get(17).map_err(query_err)?;
            let base_chance: String = row.get(18).map_err(query_err)?;

            let link = ShortlistLink {
                id: row.get(0).map_err(query_err)?,
                user_id: row.get(1).map_err(query_err)?,
                university_id: row.get(2).map_err(query_err)?,
                category: Category::parse(&category),
                status: LinkStatus::parse(&status),
                acceptance_chance: AcceptanceChance::parse(&chance),
                fit_reason: row.get(6).ok(),
                risk_explanation: row.get(7).ok(),
                created_at: parse_datetime(&link_created),
            };
            let university = University {
                id: row.get(9).map_err(query_err)?,
                name: row.get(10).map_err(query_err)?,
                country: row.get(11).map_err(query_err)?,
                city: row.get(12).ok(),
                field_of_study: row.get(13).map_err(query_err)?,
                degree_level: row.get(14).map_err(query_err)?,
                tuition_per_year: row.get(15).map_err(query_err)?,
                cost_level: RiskLevel::parse(&cost),
                competition_level: RiskLevel::parse(&competition),
                base_acceptance_chance: AcceptanceChance::parse(&base_chance),
                description: row.get(19).ok(),
            };
            out.push(ResolvedLink { link, university });
        }
        Ok(out)
    }

    // ── Todos ───────────────────────────────────────────────────────

    async fn insert_todo(
        &self,
        user_id: i64,
        todo: &NewTodo,
        created_by_ai: bool,
    ) -> Result<Todo, DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let status = todo.status.unwrap_or(TodoStatus::Pending);

        conn.execute(
            "INSERT INTO todos (user_id, title, description, status, due_date, \
             related_university_id, created_by_ai, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user_id,
                todo.title.as_str(),
                opt_text(todo.description.as_deref()),
                status.as_str(),
                opt_text(todo.due_date.map(|d| d.to_rfc3339()).as_deref()),
                opt_int(todo.related_university_id),
                created_by_ai as i64,
                now.as_str(),
                now.as_str(),
            ],
        )
        .await
        .map_err(query_err)?;

        let id = conn.last_insert_rowid();
        let mut rows = conn
            .query(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => row_to_todo(&row).map_err(query_err),
            None => Err(DatabaseError::NotFound {
                entity: "todo".into(),
                id: id.to_string(),
            }),
        }
    }

    async fn list_todos(&self, user_id: i64) -> Result<Vec<Todo>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ?1 ORDER BY id"),
                params![user_id],
            )
            .await
            .map_err(query_err)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            out.push(row_to_todo(&row).map_err(query_err)?);
        }
        Ok(out)
    }

    async fn update_todo(
        &self,
        id: i64,
        user_id: i64,
        patch: &TodoPatch,
    ) -> Result<Option<Todo>, DatabaseError> {
        let conn = self.conn();

        let mut rows = conn
            .query(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1 AND user_id = ?2"),
                params![id, user_id],
            )
            .await
            .map_err(query_err)?;
        let Some(row) = rows.next().await.map_err(query_err)? else {
            return Ok(None);
        };
        let existing = row_to_todo(&row).map_err(query_err)?;

        let title = patch.title.clone().unwrap_or(existing.title);
        let description = patch.description.clone().or(existing.description);
        let status = patch.status.unwrap_or(existing.status);
        let due_date = patch.due_date.or(existing.due_date);
        let related = patch
            .related_university_id
            .or(existing.related_university_id);

        conn.execute(
            "UPDATE todos SET title = ?1, description = ?2, status = ?3, due_date = ?4, \
             related_university_id = ?5, updated_at = ?6 WHERE id = ?7",
            params![
                title.as_str(),
                opt_text(description.as_deref()),
                status.as_str(),
                opt_text(due_date.map(|d| d.to_rfc3339()).as_deref()),
                opt_int(related),
                Utc::now().to_rfc3339(),
                id,
            ],
        )
        .await
        .map_err(query_err)?;

        let mut rows = conn
            .query(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_todo(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    // ── Chat history ────────────────────────────────────────────────

    async fn append_chat(
        &self,
        user_id: i64,
        role: ChatRole,
        content: &str,
        session_id: Option<&str>,
    ) -> Result<ChatMessage, DatabaseError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO chat_messages (user_id, role, content, session_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                role.as_str(),
                content,
                opt_text(session_id),
                Utc::now().to_rfc3339(),
            ],
        )
        .await
        .map_err(query_err)?;

        let id = conn.last_insert_rowid();
        let mut rows = conn
            .query(
                "SELECT id, user_id, role, content, session_id, created_at \
                 FROM chat_messages WHERE id = ?1",
                params![id],
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => row_to_chat(&row).map_err(query_err),
            None => Err(DatabaseError::NotFound {
                entity: "chat message".into(),
                id: id.to_string(),
            }),
        }
    }

    async fn recent_chat(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, user_id, role, content, session_id, created_at \
                 FROM chat_messages WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
                params![user_id, limit as i64],
            )
            .await
            .map_err(query_err)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            out.push(row_to_chat(&row).map_err(query_err)?);
        }
        // Query is newest-first; flip to chronological for display.
        out.reverse();
        Ok(out)
    }
}
