/// Errors from the remote edit call
///
/// Messages are shown to the user verbatim in the error view, so the
/// display strings are written for people, not logs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// No credential in the environment
    #[error("API key is not configured.")]
    MissingApiKey,

    /// The response carried no candidate
    #[error("No response from AI.")]
    NoCandidate,

    /// The first candidate carried no inline image
    #[error("The model did not return an image part.")]
    NoImagePart,

    /// The service answered with a non-success status
    #[error("{message}")]
    Service { status: u16, message: String },

    /// Network or client failure
    #[error("{0}")]
    Transport(String),

    /// A success response whose body could not be understood
    #[error("Unexpected response from AI: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for EditError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            EditError::InvalidResponse(error.to_string())
        } else {
            EditError::Transport(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_messages_pass_through_verbatim() {
        let error = EditError::Service {
            status: 429,
            message: "quota exceeded".to_string(),
        };
        assert_eq!(error.to_string(), "quota exceeded");
        assert_eq!(EditError::Transport("dns failure".into()).to_string(), "dns failure");
    }

    #[test]
    fn fixed_messages() {
        assert_eq!(EditError::MissingApiKey.to_string(), "API key is not configured.");
        assert_eq!(EditError::NoCandidate.to_string(), "No response from AI.");
        assert_eq!(
            EditError::NoImagePart.to_string(),
            "The model did not return an image part."
        );
    }
}
