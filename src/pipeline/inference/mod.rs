pub mod gemini;

pub use gemini::{GeminiClient, MockGenerationClient, MockVisionClient};

use thiserror::Error;

/// Error taxonomy for the external inference collaborators.
///
/// Callers never see these as panics: the vision tier converts them to
/// error-tagged outcomes, and the diagnosis builder converts them to a
/// user-facing error string after the retry policy is exhausted.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Inference service is not reachable")]
    NotReachable,

    #[error("Inference service returned an error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not parse service response: {0}")]
    ResponseParsing(String),

    #[error("Service response carried no generated text")]
    EmptyResponse,

    #[error("No credential configured for the inference service")]
    MissingCredential,
}

/// Whether a failure is a rate-limit/quota condition worth retrying.
///
/// Matches an HTTP-429-like signal or a "quota" keyword in the failure
/// description; everything else (auth, network, parse) is terminal.
pub fn is_quota_error(err: &InferenceError) -> bool {
    match err {
        InferenceError::ApiError { status, message } => {
            *status == 429 || message.to_lowercase().contains("quota")
        }
        InferenceError::Network(message) => message.to_lowercase().contains("quota"),
        _ => false,
    }
}

/// Multimodal collaborator: answers an instruction about a page image.
pub trait VisionClient {
    fn describe_image(
        &self,
        image_png: &[u8],
        instruction: &str,
    ) -> Result<String, InferenceError>;
}

/// Text-generation collaborator for the narrative diagnosis.
pub trait GenerationClient {
    fn generate(&self, prompt: &str) -> Result<String, InferenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_429_is_quota() {
        let err = InferenceError::ApiError {
            status: 429,
            message: "Too Many Requests".into(),
        };
        assert!(is_quota_error(&err));
    }

    #[test]
    fn quota_keyword_is_quota() {
        let err = InferenceError::ApiError {
            status: 403,
            message: "Quota exceeded for model".into(),
        };
        assert!(is_quota_error(&err));

        let err = InferenceError::Network("daily quota reached".into());
        assert!(is_quota_error(&err));
    }

    #[test]
    fn other_failures_are_not_quota() {
        assert!(!is_quota_error(&InferenceError::NotReachable));
        assert!(!is_quota_error(&InferenceError::Timeout(120)));
        assert!(!is_quota_error(&InferenceError::MissingCredential));
        assert!(!is_quota_error(&InferenceError::ApiError {
            status: 401,
            message: "invalid key".into(),
        }));
    }
}
