//! Configuration — assembled once at startup from environment variables and
//! threaded through component constructors.

use secrecy::SecretString;

/// Default OpenRouter chat-completions endpoint.
pub const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default generation model.
pub const DEFAULT_LLM_MODEL: &str = "qwen/qwen3-next-80b-a3b-instruct:free";

/// Generation service settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// API key. `None` means the chat endpoint degrades to a fixed
    /// informational message and never calls the network.
    pub api_key: Option<SecretString>,
    /// Model identifier sent with every request.
    pub model: String,
    /// Base URL of the chat-completions API (overridable for tests).
    pub base_url: String,
    /// Round-trip timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_LLM_MODEL.to_string(),
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

/// Token issuance settings.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_expiry_minutes: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-change-me".to_string(),
            token_expiry_minutes: 60 * 24,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Path of the local libSQL database file.
    pub db_path: String,
    pub llm: LlmSettings,
    pub auth: AuthSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            db_path: "./data/counsellor.db".to_string(),
            llm: LlmSettings::default(),
            auth: AuthSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults.
    ///
    /// Recognized variables: `COUNSELLOR_BIND_ADDR`, `COUNSELLOR_DB_PATH`,
    /// `OPENROUTER_API_KEY`, `OPENROUTER_MODEL`, `OPENROUTER_BASE_URL`,
    /// `JWT_SECRET_KEY`, `JWT_ACCESS_TOKEN_EXPIRES_MINUTES`.
    pub fn from_env() -> Self {
        let defaults = Settings::default();

        let api_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        Self {
            bind_addr: env_or("COUNSELLOR_BIND_ADDR", defaults.bind_addr),
            db_path: env_or("COUNSELLOR_DB_PATH", defaults.db_path),
            llm: LlmSettings {
                api_key,
                model: env_or("OPENROUTER_MODEL", defaults.llm.model),
                base_url: env_or("OPENROUTER_BASE_URL", defaults.llm.base_url),
                timeout_secs: defaults.llm.timeout_secs,
            },
            auth: AuthSettings {
                jwt_secret: env_or("JWT_SECRET_KEY", defaults.auth.jwt_secret),
                token_expiry_minutes: std::env::var("JWT_ACCESS_TOKEN_EXPIRES_MINUTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.auth.token_expiry_minutes),
            },
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}
