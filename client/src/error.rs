use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("invalid annotation payload: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode annotations: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("browser window is not available")]
    NoWindow,
}
