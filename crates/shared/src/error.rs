use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown when the server rejects a link without saying why.
pub const DEFAULT_REJECTION_MESSAGE: &str = "링크가 유효하지 않아요.";
/// Shown when the validation request never got a response.
pub const NETWORK_FAILURE_MESSAGE: &str = "URL 검증에 실패했습니다.";

/// Body the API returns alongside a non-success status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// The server-provided message, if it carries a usable one.
    pub fn into_message(self) -> Option<String> {
        self.message
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("{message}")]
    Rejected { message: String },
    #[error("{message}")]
    Network { message: String },
}

impl ValidationFailure {
    pub fn rejected(message: Option<String>) -> Self {
        Self::Rejected {
            message: message.unwrap_or_else(|| DEFAULT_REJECTION_MESSAGE.to_string()),
        }
    }

    pub fn network() -> Self {
        Self::Network {
            message: NETWORK_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Message to attach to the entry that failed validation.
    pub fn message(&self) -> &str {
        match self {
            Self::Rejected { message } | Self::Network { message } => message,
        }
    }
}

/// Outcome of a single remote link validation.
pub type ValidationResult = Result<(), ValidationFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_server_message_falls_back_to_default() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"message": "  "}"#).expect("parse");
        assert_eq!(
            ValidationFailure::rejected(body.into_message()).message(),
            DEFAULT_REJECTION_MESSAGE
        );
    }

    #[test]
    fn server_message_is_kept() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"message": "지원하지 않는 링크예요.", "code": 400}"#)
                .expect("parse");
        assert_eq!(body.into_message().as_deref(), Some("지원하지 않는 링크예요."));
    }

    #[test]
    fn network_failure_uses_generic_message() {
        assert_eq!(ValidationFailure::network().to_string(), NETWORK_FAILURE_MESSAGE);
    }
}
