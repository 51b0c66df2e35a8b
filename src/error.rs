use thiserror::Error;

/// Failures that stop a query before any GraphQL payload can be handed back.
///
/// A response carrying an `errors` array is not one of these: it is valid
/// JSON and is returned to the caller as-is.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid header value for {name}")]
    InvalidHeader { name: &'static str },

    #[error("Failed to send request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("API Error: HTTP {status}")]
    Status { status: u16 },

    #[error("Failed to parse response: {0}")]
    Decode(#[source] serde_json::Error),
}
