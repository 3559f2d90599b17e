//! The chat flow: persist the inbound turn, assemble context, call the
//! generation client, execute whatever actions came back, persist the
//! assistant turn.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::counsellor::actions::{RawAction, parse_reply};
use crate::counsellor::executor::ActionExecutor;
use crate::counsellor::prompt::build_system_prompt;
use crate::error::{DatabaseError, LlmError};
use crate::llm::{ChatTurn, LlmClient};
use crate::model::{ChatRole, UniversityFilter};
use crate::stage::Stage;
use crate::store::Database;

/// How many prior turns are replayed to the model.
const HISTORY_LIMIT: usize = 20;

const UNCONFIGURED_REPLY: &str = "I'm your AI counsellor. To enable full AI capabilities, \
     please configure the OPENROUTER_API_KEY environment variable. For now, I can provide \
     basic guidance based on your profile.";

const ONBOARDING_REPLY: &str =
    "Let's first complete your onboarding so I can understand your profile.";

/// One turn in the response envelope.
#[derive(Debug, Serialize)]
pub struct ReplyMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ReplyMessage {
    fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// What the chat endpoint returns: an ordered message list (currently a
/// single assistant turn) plus the raw action records.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub messages: Vec<ReplyMessage>,
    /// Every action the model emitted, applied or not, for the client to
    /// render (university cards, etc).
    pub actions: Vec<RawAction>,
    pub current_stage: Stage,
    /// Echoed back so the client can thread follow-up messages. Generated
    /// when the request carried none.
    pub session_id: String,
}

impl ChatResponse {
    /// Text of the single assistant turn.
    pub fn reply(&self) -> &str {
        &self.messages[0].content
    }
}

#[derive(Clone)]
pub struct CounsellorService {
    db: Arc<dyn Database>,
    llm: LlmClient,
}

impl CounsellorService {
    pub fn new(db: Arc<dyn Database>, llm: LlmClient) -> Self {
        Self { db, llm }
    }

    /// Generation-failure policy: the user always gets text back, never an
    /// error. Faults are folded into an apologetic reply.
    fn degraded_reply(err: LlmError) -> String {
        warn!(error = %err, "Generation request failed");
        match err {
            LlmError::HttpStatus { status } => format!(
                "I encountered an error connecting to the AI service. \
                 Please try again. (Error: {status})"
            ),
            other => format!("Something went wrong. Please try again. (Error: {other})"),
        }
    }

    pub async fn chat(
        &self,
        user_id: i64,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<ChatResponse, DatabaseError> {
        let session_id = session_id
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        // History is loaded before the inbound turn is stored so the
        // message is not replayed twice.
        let history = self.db.recent_chat(user_id, HISTORY_LIMIT).await?;
        self.db
            .append_chat(user_id, ChatRole::User, message, Some(&session_id))
            .await?;

        let Some(profile) = self.db.get_profile(user_id).await?.filter(|p| p.is_complete)
        else {
            self.db
                .append_chat(user_id, ChatRole::Assistant, ONBOARDING_REPLY, Some(&session_id))
                .await?;
            return Ok(ChatResponse {
                messages: vec![ReplyMessage::assistant(ONBOARDING_REPLY)],
                actions: Vec::new(),
                current_stage: Stage::BuildingProfile,
                session_id,
            });
        };

        let links = self.db.list_links(user_id).await?;
        let catalog = self
            .db
            .list_universities(&UniversityFilter::default())
            .await?;
        let system = build_system_prompt(&profile, &links, &catalog);

        let mut turns = Vec::with_capacity(history.len() + 2);
        turns.push(ChatTurn::system(system));
        for msg in &history {
            turns.push(match msg.role {
                ChatRole::User => ChatTurn::user(msg.content.clone()),
                ChatRole::Assistant => ChatTurn::assistant(msg.content.clone()),
            });
        }
        turns.push(ChatTurn::user(message.to_string()));

        let raw = if self.llm.is_configured() {
            match self.llm.complete(&turns).await {
                Ok(text) => text,
                Err(err) => Self::degraded_reply(err),
            }
        } else {
            UNCONFIGURED_REPLY.to_string()
        };

        let parsed = parse_reply(&raw);

        let mut executor = ActionExecutor::new(self.db.as_ref(), user_id, profile.current_stage);
        let outcomes = executor.run(&parsed.actions).await?;

        let confirmations: Vec<&str> = outcomes
            .iter()
            .filter_map(|o| o.confirmation.as_deref())
            .collect();
        let reply = if confirmations.is_empty() {
            parsed.visible.clone()
        } else {
            format!("{}\n\n---\n{}", parsed.visible, confirmations.join("\n"))
        };

        self.db
            .append_chat(user_id, ChatRole::Assistant, &reply, Some(&session_id))
            .await?;

        Ok(ChatResponse {
            messages: vec![ReplyMessage::assistant(reply)],
            actions: parsed.actions,
            current_stage: executor.stage(),
            session_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmSettings;
    use crate::model::{ExamStatus, ProfileSubmission, SopStatus};
    use crate::store::LibSqlBackend;
    use axum::Json;
    use axum::routing::post;
    use secrecy::SecretString;
    use serde_json::json;

    async fn serve_reply(content: String) -> String {
        let router = axum::Router::new().route(
            "/chat/completions",
            post(move || {
                let content = content.clone();
                async move {
                    Json(json!({
                        "choices": [{"message": {"role": "assistant", "content": content}}]
                    }))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn llm_with(base_url: String) -> LlmClient {
        LlmClient::new(&LlmSettings {
            api_key: Some(SecretString::from("test-key")),
            model: "test-model".into(),
            base_url,
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn llm_unconfigured() -> LlmClient {
        LlmClient::new(&LlmSettings {
            api_key: None,
            model: "test-model".into(),
            base_url: "http://127.0.0.1:1".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    async fn db_with_profile() -> (Arc<LibSqlBackend>, i64) {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let user = db.insert_user("S", "s@example.com", "h").await.unwrap();
        db.insert_universities(&crate::store::seed::default_catalog())
            .await
            .unwrap();
        let submission = ProfileSubmission {
            current_education_level: "bachelors".into(),
            degree_major: "CS".into(),
            graduation_year: 2025,
            gpa: None,
            intended_degree: "masters".into(),
            field_of_study: "Computer Science".into(),
            target_intake_year: 2027,
            preferred_countries: vec!["Canada".into()],
            budget_per_year: 40_000,
            funding_plan: "loan".into(),
            ielts_toefl_status: ExamStatus::NotStarted,
            gre_gmat_status: ExamStatus::NotStarted,
            sop_status: SopStatus::NotStarted,
        };
        db.upsert_profile(user.id, &submission, Stage::DiscoveringUniversities)
            .await
            .unwrap();
        (Arc::new(db), user.id)
    }

    #[tokio::test]
    async fn incomplete_profile_is_rejected_with_guidance() {
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let user = db.insert_user("S", "s@example.com", "h").await.unwrap();
        let service = CounsellorService::new(db.clone(), llm_unconfigured());

        let response = service.chat(user.id, "hello", None).await.unwrap();
        assert_eq!(response.reply(), ONBOARDING_REPLY);
        assert!(response.actions.is_empty());

        // Both turns were still recorded
        let history = db.recent_chat(user.id, 10).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn missing_api_key_gives_fixed_reply_and_no_actions() {
        let (db, user_id) = db_with_profile().await;
        let service = CounsellorService::new(db, llm_unconfigured());

        let response = service.chat(user_id, "recommend schools", None).await.unwrap();
        assert!(response.reply().contains("OPENROUTER_API_KEY"));
        assert!(response.actions.is_empty());
    }

    #[tokio::test]
    async fn response_envelope_is_a_single_assistant_message() {
        let (db, user_id) = db_with_profile().await;
        let service = CounsellorService::new(db, llm_unconfigured());

        let response = service.chat(user_id, "hi", None).await.unwrap();
        let wire = serde_json::to_value(&response).unwrap();
        let messages = wire["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "assistant");
        assert!(
            messages[0]["content"]
                .as_str()
                .unwrap()
                .contains("OPENROUTER_API_KEY")
        );
    }

    #[tokio::test]
    async fn upstream_http_error_becomes_apologetic_reply() {
        let (db, user_id) = db_with_profile().await;
        let router = axum::Router::new().route(
            "/chat/completions",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "down") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let service = CounsellorService::new(db, llm_with(format!("http://{addr}")));
        let response = service.chat(user_id, "hello", None).await.unwrap();
        assert!(response.reply().contains("502"));
        assert!(response.actions.is_empty());
    }

    #[tokio::test]
    async fn actions_in_reply_are_executed_and_confirmed() {
        let (db, user_id) = db_with_profile().await;
        let content = "You should aim high!\n\n```actions\n\
            [{\"type\": \"shortlist_university\", \"payload\": \
            {\"university_id\": 5, \"category\": \"dream\"}}]\n```"
            .to_string();
        let base = serve_reply(content).await;
        let service = CounsellorService::new(db.clone(), llm_with(base));

        let response = service.chat(user_id, "recommend", None).await.unwrap();
        assert!(response.reply().starts_with("You should aim high!"));
        assert!(response.reply().contains("---"));
        assert!(response.reply().contains("shortlist"));
        assert_eq!(response.actions.len(), 1);
        assert_eq!(response.current_stage, Stage::FinalizingUniversities);

        let link = db.get_link(user_id, 5).await.unwrap().unwrap();
        assert_eq!(link.category, crate::model::Category::Dream);

        // The persisted assistant turn includes the confirmation text
        let history = db.recent_chat(user_id, 10).await.unwrap();
        let last = history.last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert!(last.content.contains("---"));
    }

    #[tokio::test]
    async fn malformed_actions_block_is_hidden_from_the_user() {
        let (db, user_id) = db_with_profile().await;
        let content = "Solid plan ahead.\n```actions\nnot json\n```".to_string();
        let base = serve_reply(content).await;
        let service = CounsellorService::new(db, llm_with(base));

        let response = service.chat(user_id, "plan?", None).await.unwrap();
        assert_eq!(response.reply(), "Solid plan ahead.");
        assert!(response.actions.is_empty());
    }
}
