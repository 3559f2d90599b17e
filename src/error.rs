//! Error types for the counsellor backend.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl DatabaseError {
    /// Whether this error came from a UNIQUE constraint violation.
    ///
    /// The shortlist path relies on this to treat a lost check-then-create
    /// race as "link already exists" instead of failing the action.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Constraint(msg) | DatabaseError::Query(msg) => {
                msg.contains("UNIQUE constraint failed")
            }
            _ => false,
        }
    }
}

/// Generation service errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Generation request failed: {0}")]
    RequestFailed(String),

    #[error("Generation service returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Invalid response from generation service: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Missing or malformed Authorization header")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Result type alias for the backend.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_detection() {
        let err = DatabaseError::Query(
            "UNIQUE constraint failed: user_universities.user_id, user_universities.university_id"
                .into(),
        );
        assert!(err.is_unique_violation());

        let err = DatabaseError::Query("no such table: foo".into());
        assert!(!err.is_unique_violation());

        let err = DatabaseError::Constraint("UNIQUE constraint failed: users.email".into());
        assert!(err.is_unique_violation());
    }
}
