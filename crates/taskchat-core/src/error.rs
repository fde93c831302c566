use thiserror::Error;

/// The one way a send can fail. `Display` is the human-readable description.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("{description}")]
    Status { status: u16, description: String },

    #[error("Invalid response from assistant: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl SendError {
    pub fn description(&self) -> String {
        self.to_string()
    }
}
