use thiserror::Error;

/// Main error type for the bot
#[derive(Error, Debug)]
pub enum BotError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    // Discord API errors
    #[error("Discord API error: status={status} body={body}")]
    Discord { status: u16, body: String },

    #[error("Missing permission: {0}")]
    Forbidden(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    // Ranking service errors
    #[error("Ranking response shape unrecognized: {0}")]
    RankingShape(String),

    #[error("Ranking data unavailable: {0}")]
    RankingUnavailable(String),

    // Roster errors
    #[error("Roster error: {0}")]
    Roster(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for BotError
pub type Result<T> = std::result::Result<T, BotError>;

/// Specific error types for roster mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("account id is empty")]
    EmptyId,

    #[error("account id already present: {id}")]
    AlreadyExists { id: String },

    #[error("no roster entry matches: {key}")]
    NotFound { key: String },
}

impl From<RosterError> for BotError {
    fn from(err: RosterError) -> Self {
        BotError::Roster(err.to_string())
    }
}
