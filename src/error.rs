use thiserror::Error;

/// Any failure of the meal ledger. Callers never see partial results.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("date formatting failed: {0}")]
    DateFormat(#[from] time::error::Format),

    #[error("corrupt meal row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}

/// Failure to turn a photo into a nutrition estimate.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("image content is empty")]
    EmptyImage,

    #[error("vision call failed: {0}")]
    Vision(String),

    #[error("vision call timeout after {0}s")]
    Timeout(u64),

    #[error("vision model returned no content")]
    EmptyResponse,

    #[error("response is not valid json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("malformed estimate: {0}")]
    Malformed(String),
}

impl AnalysisError {
    pub fn is_timeout(&self) -> bool {
        match self {
            AnalysisError::Timeout(_) => true,
            AnalysisError::Vision(msg) => msg.to_lowercase().contains("timeout") || msg.contains("timed out"),
            _ => false,
        }
    }
}

/// Weekly chart could not be produced.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("chart render failed: {0}")]
    Render(String),
}

/// A message could not be handed to the chat platform.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("send timeout after {0}s")]
    Timeout(u64),
}
