use thiserror::Error;

/**
 * Failure of a single bridge call
 *
 * There is no transient/permanent distinction; callers only need something
 * to show the user, which `message()` provides.
 */
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The backend ran the command and reported a failure
    #[error("{} failed: {}", .command, .message.as_deref().unwrap_or("no message"))]
    Backend {
        command: String,
        message: Option<String>,
    },

    /// The backend could not be reached or the exchange broke off
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Arguments or result did not match the command's shape
    #[error("invalid payload for {command}: {source}")]
    Payload {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BridgeError {
    pub fn backend(command: impl Into<String>, message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        BridgeError::Backend {
            command: command.into(),
            message,
        }
    }

    /**
     * Human-readable message carried by the failure, if any
     * Returns None when the backend reported a failure without text
     */
    pub fn message(&self) -> Option<String> {
        match self {
            BridgeError::Backend { message, .. } => message.clone(),
            BridgeError::Transport(e) => Some(e.to_string()),
            BridgeError::Payload { source, .. } => Some(source.to_string()),
        }
    }
}
