//! Error types for the triage assistant

/// Result type alias using the triage Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for triage operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors (rule tables, response catalog, server settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Rule compilation errors
    #[error("rule error: {0}")]
    Rules(String),

    /// Session store errors
    #[error("session error: {0}")]
    Session(String),

    /// No session exists for the identifier
    #[error("no session found for '{0}'")]
    SessionNotFound(String),

    /// The session store refused to open another session
    #[error("session limit of {limit} reached")]
    SessionLimit { limit: usize },
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new rule error
    pub fn rules(msg: impl Into<String>) -> Self {
        Self::Rules(msg.into())
    }

    /// Create a new session error
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Short, stable label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Rules(_) => "rules",
            Self::Session(_) => "session",
            Self::SessionNotFound(_) => "session_not_found",
            Self::SessionLimit { .. } => "session_limit",
        }
    }

    /// Whether this error means the identifier has no session
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound(_))
    }
}
