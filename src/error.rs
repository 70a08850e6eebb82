use std::time::Duration;
use thiserror::Error;

/// Terminal outcome of a single analysis attempt. Nothing here is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Received an empty response from the model.")]
    EmptyResponse,

    #[error("Failed to parse the model's response as JSON, even after cleanup attempts: {message}")]
    MalformedJson { message: String, raw_output: String },

    #[error("Could not connect to the inference server at {url}. Ensure it's running and accessible.")]
    ConnectionFailure { url: String },

    #[error("Request to the inference server timed out after {timeout:?}.")]
    Timeout { timeout: Duration },

    #[error("The model '{model}' is not available on the inference server at {url}. Pull it first (`ollama pull {model}`).")]
    ModelNotFound { model: String, url: String },

    #[error("An error occurred during the request to the inference server: {0}")]
    TransportError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::EmptyResponse => "empty_response",
            AnalysisError::MalformedJson { .. } => "malformed_json",
            AnalysisError::ConnectionFailure { .. } => "connection_failure",
            AnalysisError::Timeout { .. } => "timeout",
            AnalysisError::ModelNotFound { .. } => "model_not_found",
            AnalysisError::TransportError(_) => "transport_error",
            AnalysisError::InternalError(_) => "internal_error",
        }
    }

    /// Raw model text that came with the failure, if any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            AnalysisError::MalformedJson { raw_output, .. } => Some(raw_output),
            _ => None,
        }
    }
}
