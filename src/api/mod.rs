pub mod mappers;
pub mod models;

use models::{RequestEnvelope, ResponseEnvelope};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] serde_json::Error),
}

pub fn decode_request(line: &str) -> Result<RequestEnvelope, ProtocolError> {
    Ok(serde_json::from_str(line)?)
}

pub fn encode_response(response: &ResponseEnvelope) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to encode response");
        r#"{"error":"failed to encode response"}"#.to_string()
    })
}
