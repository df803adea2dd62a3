use thiserror::Error;

/// Failure taxonomy for tool operations.
///
/// `Validation` is produced locally before any request is built; the other
/// kinds wrap what came back from the backend, the decoder, or the speech
/// engine. Panels show validation messages verbatim and replace everything
/// else with the tool's own generic failure message.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Backend(String),
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Speech(String),
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        ToolError::Validation(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        ToolError::Backend(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ToolError::Decode(message.into())
    }

    pub fn speech(message: impl Into<String>) -> Self {
        ToolError::Speech(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ToolError::Validation(_))
    }

    /// The string a panel displays for this error. Validation and speech
    /// messages pass through; backend and decode failures collapse into the
    /// tool's generic message so raw transport detail never reaches the user.
    pub fn display_message(&self, generic: &str) -> String {
        if self.is_validation() {
            return self.to_string();
        }
        match self {
            ToolError::Speech(msg) => msg.clone(),
            _ => generic.to_string(),
        }
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        ToolError::Backend(format!("request failed: {err}"))
    }
}
