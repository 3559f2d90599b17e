//! End-to-end tests over the real HTTP surface.
//!
//! Each test boots the full Axum app on a random port with an in-memory
//! database, and where chat is involved, a stub OpenRouter server that
//! returns a canned completion.

use std::sync::Arc;

use axum::Json;
use axum::routing::post;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use ai_counsellor::api;
use ai_counsellor::build_state;
use ai_counsellor::config::Settings;
use ai_counsellor::store::LibSqlBackend;

/// Stub chat-completions server that always replies with `content`.
async fn spawn_llm_stub(content: String) -> String {
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
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Boot the app. `llm_base_url = None` leaves the API key unset so chat
/// runs in degraded mode.
async fn spawn_app(llm_base_url: Option<String>) -> String {
    let mut settings = Settings::default();
    if let Some(base_url) = llm_base_url {
        settings.llm.api_key = Some(secrecy::SecretString::from("test-key"));
        settings.llm.base_url = base_url;
        settings.llm.timeout_secs = 5;
    }

    let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let state = build_state(&settings, db).unwrap();
    let app = api::router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn profile_payload() -> Value {
    json!({
        "current_education_level": "bachelors",
        "degree_major": "Computer Science",
        "graduation_year": 2025,
        "gpa": 8.5,
        "intended_degree": "masters",
        "field_of_study": "Computer Science",
        "target_intake_year": 2027,
        "preferred_countries": ["Canada", "Germany"],
        "budget_per_year": 40000,
        "funding_plan": "self",
        "ielts_toefl_status": "in_progress",
        "gre_gmat_status": "not_started",
        "sop_status": "not_started"
    })
}

/// Sign up, log in, and return a bearer token.
async fn register(client: &reqwest::Client, base: &str, email: &str) -> String {
    let resp = client
        .post(format!("{base}/auth/signup"))
        .json(&json!({"full_name": "Test Student", "email": email, "password": "hunter2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({"email": email, "password": "hunter2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

async fn submit_profile(client: &reqwest::Client, base: &str, token: &str) {
    let resp = client
        .post(format!("{base}/profile"))
        .bearer_auth(token)
        .json(&profile_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn signup_login_me_flow() {
    let base = spawn_app(None).await;
    let client = reqwest::Client::new();
    let token = register(&client, &base, "a@example.com").await;

    let me: Value = client
        .get(format!("{base}/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["email"], "a@example.com");
    assert!(me.get("password_hash").is_none());

    // Duplicate email is rejected
    let resp = client
        .post(format!("{base}/auth/signup"))
        .json(&json!({"full_name": "X", "email": "a@example.com", "password": "pw"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Wrong password
    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({"email": "a@example.com", "password": "nope"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // No token at all
    let resp = client.get(format!("{base}/me")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn profile_intake_sets_stage_and_dashboard_reports_it() {
    let base = spawn_app(None).await;
    let client = reqwest::Client::new();
    let token = register(&client, &base, "b@example.com").await;

    // No profile yet
    let resp = client
        .get(format!("{base}/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let resp = client
        .get(format!("{base}/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    submit_profile(&client, &base, &token).await;

    let profile: Value = client
        .get(format!("{base}/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["current_stage"], "discovering_universities");
    assert_eq!(profile["is_complete"], true);
    assert_eq!(profile["preferred_countries"], json!(["Canada", "Germany"]));

    let dashboard: Value = client
        .get(format!("{base}/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard["strength"]["academics"], "strong");
    assert_eq!(dashboard["stage"]["label"], "Stage 2: Discovering Universities");
}

#[tokio::test]
async fn shortlist_lock_unlock_through_rest() {
    let base = spawn_app(None).await;
    let client = reqwest::Client::new();
    let token = register(&client, &base, "c@example.com").await;
    submit_profile(&client, &base, &token).await;

    // First listing seeds the catalog
    let universities: Vec<Value> = client
        .get(format!("{base}/universities"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(universities.len() >= 30);

    // Budget filter
    let cheap: Vec<Value> = client
        .get(format!("{base}/universities?max_budget_per_year=5000"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!cheap.is_empty());
    assert!(cheap.iter().all(|u| u["tuition_per_year"].as_i64().unwrap() <= 5000));

    // Shortlist university 7 (Arizona State, low competition, under budget → safe)
    let link: Value = client
        .post(format!("{base}/universities/7/shortlist"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(link["status"], "shortlisted");
    assert_eq!(link["category"], "safe");

    // Idempotent: same link comes back, no duplicate
    let again: Value = client
        .post(format!("{base}/universities/7/shortlist"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again["id"], link["id"]);

    // Stage advanced to finalizing
    let profile: Value = client
        .get(format!("{base}/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["current_stage"], "finalizing_universities");

    // Unknown university
    let resp = client
        .post(format!("{base}/universities/99999/shortlist"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Guidance requires a lock first
    let resp = client
        .get(format!("{base}/application-guidance"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Lock by link id
    let link_id = link["id"].as_i64().unwrap();
    let locked: Value = client
        .post(format!("{base}/universities/{link_id}/lock"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(locked["status"], "locked");

    let profile: Value = client
        .get(format!("{base}/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["current_stage"], "preparing_applications");

    let guidance: Value = client
        .get(format!("{base}/application-guidance"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(guidance["locked_university"]["name"], "Arizona State University");
    assert_eq!(guidance["required_documents"].as_array().unwrap().len(), 8);
    assert_eq!(guidance["timeline"].as_array().unwrap().len(), 4);

    // Unlock reverts the link but never the stage
    let unlocked: Value = client
        .post(format!("{base}/universities/{link_id}/unlock"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unlocked["status"], "shortlisted");
    let profile: Value = client
        .get(format!("{base}/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["current_stage"], "preparing_applications");

    // my-universities resolves the catalog entry
    let mine: Vec<Value> = client
        .get(format!("{base}/my-universities"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["university"]["name"], "Arizona State University");
}

#[tokio::test]
async fn todo_crud_and_ownership() {
    let base = spawn_app(None).await;
    let client = reqwest::Client::new();
    let token = register(&client, &base, "d@example.com").await;

    let todo: Value = client
        .post(format!("{base}/todos"))
        .bearer_auth(&token)
        .json(&json!({"title": "Request transcripts"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(todo["status"], "pending");
    assert_eq!(todo["created_by_ai"], false);

    let id = todo["id"].as_i64().unwrap();
    let patched: Value = client
        .patch(format!("{base}/todos/{id}"))
        .bearer_auth(&token)
        .json(&json!({"status": "completed"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(patched["status"], "completed");
    assert_eq!(patched["title"], "Request transcripts");

    // Another user cannot touch it
    let other = register(&client, &base, "e@example.com").await;
    let resp = client
        .patch(format!("{base}/todos/{id}"))
        .bearer_auth(&other)
        .json(&json!({"status": "pending"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let list: Vec<Value> = client
        .get(format!("{base}/todos"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn chat_shortlists_university_five_as_dream() {
    let reply = "MIT-level ambition! Let's add a dream school.\n\n```actions\n\
        [{\"type\": \"shortlist_university\", \"payload\": {\"university_id\": 5, \"category\": \"dream\"}}]\n```";
    let llm = spawn_llm_stub(reply.to_string()).await;
    let base = spawn_app(Some(llm)).await;
    let client = reqwest::Client::new();
    let token = register(&client, &base, "f@example.com").await;
    submit_profile(&client, &base, &token).await;
    // Seed the catalog
    client
        .get(format!("{base}/universities"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let response: Value = client
        .post(format!("{base}/counsellor/chat"))
        .bearer_auth(&token)
        .json(&json!({"role": "user", "content": "Which dream school should I aim for?"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let messages = response["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "assistant");
    let text = messages[0]["content"].as_str().unwrap();
    assert!(text.starts_with("MIT-level ambition!"));
    assert!(!text.contains("```actions"));
    assert!(text.contains("Georgia Institute of Technology"));
    assert_eq!(response["current_stage"], "finalizing_universities");
    assert_eq!(response["actions"].as_array().unwrap().len(), 1);

    let mine: Vec<Value> = client
        .get(format!("{base}/my-universities"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["university_id"], 5);
    assert_eq!(mine[0]["category"], "dream");
    assert_eq!(mine[0]["status"], "shortlisted");
    assert_eq!(mine[0]["acceptance_chance"], "low");
}

#[tokio::test]
async fn chat_creates_ai_todo() {
    let reply = "Exams first.\n\n```actions\n\
        [{\"type\": \"create_todo\", \"payload\": {\"title\": \"Book IELTS\"}}]\n```";
    let llm = spawn_llm_stub(reply.to_string()).await;
    let base = spawn_app(Some(llm)).await;
    let client = reqwest::Client::new();
    let token = register(&client, &base, "g@example.com").await;
    submit_profile(&client, &base, &token).await;

    let response: Value = client
        .post(format!("{base}/counsellor/chat"))
        .bearer_auth(&token)
        .json(&json!({"content": "What next?"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(
        response["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("Book IELTS")
    );

    let todos: Vec<Value> = client
        .get(format!("{base}/todos"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["title"], "Book IELTS");
    assert_eq!(todos[0]["status"], "pending");
    assert_eq!(todos[0]["created_by_ai"], true);
    assert!(todos[0].get("related_university_id").is_none());
}

#[tokio::test]
async fn chat_passes_unrecognized_action_through_untouched() {
    let reply = "Hmm.\n```actions\n[{\"type\": \"noop_action\", \"payload\": {\"x\": 1}}]\n```";
    let llm = spawn_llm_stub(reply.to_string()).await;
    let base = spawn_app(Some(llm)).await;
    let client = reqwest::Client::new();
    let token = register(&client, &base, "h@example.com").await;
    submit_profile(&client, &base, &token).await;

    let response: Value = client
        .post(format!("{base}/counsellor/chat"))
        .bearer_auth(&token)
        .json(&json!({"content": "do nothing"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Action is echoed, no confirmation divider, no mutation
    assert_eq!(response["messages"][0]["content"], "Hmm.");
    assert_eq!(response["actions"][0]["type"], "noop_action");

    let todos: Vec<Value> = client
        .get(format!("{base}/todos"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(todos.is_empty());
    let mine: Vec<Value> = client
        .get(format!("{base}/my-universities"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(mine.is_empty());
}

#[tokio::test]
async fn chat_without_api_key_degrades_and_records_history() {
    let base = spawn_app(None).await;
    let client = reqwest::Client::new();
    let token = register(&client, &base, "i@example.com").await;
    submit_profile(&client, &base, &token).await;

    let response: Value = client
        .post(format!("{base}/counsellor/chat"))
        .bearer_auth(&token)
        .json(&json!({"content": "hello"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(
        response["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("OPENROUTER_API_KEY")
    );
    assert!(response["actions"].as_array().unwrap().is_empty());

    let history: Vec<Value> = client
        .get(format!("{base}/counsellor/history?limit=10"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["role"], "user");
    assert_eq!(history[1]["role"], "assistant");
}

#[tokio::test]
async fn profile_resubmission_resets_stage_to_discovery() {
    let base = spawn_app(None).await;
    let client = reqwest::Client::new();
    let token = register(&client, &base, "j@example.com").await;
    submit_profile(&client, &base, &token).await;

    // Advance the stage by shortlisting
    client
        .get(format!("{base}/universities"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    client
        .post(format!("{base}/universities/1/shortlist"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    // Re-submitting the profile moves the stage back to discovery
    submit_profile(&client, &base, &token).await;
    let profile: Value = client
        .get(format!("{base}/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["current_stage"], "discovering_universities");
}
