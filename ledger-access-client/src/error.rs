use crate::payload::PayloadError;
use thiserror::Error;
use tonic::Status;

/// A convenience alias used by every fallible operation of the client.
pub type Result<T, E = AccessError> = std::result::Result<T, E>;

/// Defines the error types surfaced by both transports and by subscriptions.
///
/// Subscription failures are split into two families that travel over the same
/// error channel: transport failures ([`AccessError::Stream`]) and failures to
/// turn a received frame into a domain value ([`AccessError::MalformedFrame`],
/// [`AccessError::Payload`]). See [`AccessError::is_conversion`].
#[derive(Error, Debug)]
pub enum AccessError {
    /// A request was rejected locally, before any network activity.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A streaming call could not be established.
    #[error("failed to open subscription: {0}")]
    Open(#[source] Status),

    /// A unary gRPC call failed.
    #[error("rpc failed: {0}")]
    Rpc(#[from] Status),

    /// The stream failed after it was established.
    #[error("subscription stream failed: {0}")]
    Stream(#[source] Status),

    /// A received frame or response is missing data or carries inconsistent fields.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// An event payload could not be decoded with the requested encoding.
    #[error("failed to decode event payload: {0}")]
    Payload(#[from] PayloadError),

    /// The gRPC channel could not be created.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The REST API answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An HTTP request could not be performed.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A REST response did not have the expected shape.
    #[error("failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// A base64 field of a REST response could not be decoded.
    #[error("invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// An account proof nonce is not valid hex or is too short.
    #[error("invalid nonce: {0}")]
    InvalidNonce(String),
}

impl AccessError {
    /// Returns `true` when the error was raised while converting a received
    /// frame rather than by the transport itself.
    ///
    /// A conversion failure will deterministically repeat when the same frame
    /// is received again, so consumers usually re-subscribe past it instead of
    /// from the same height.
    pub fn is_conversion(&self) -> bool {
        matches!(self, AccessError::MalformedFrame(_) | AccessError::Payload(_))
    }

    /// The gRPC status carried by this error, if any.
    pub fn status(&self) -> Option<&Status> {
        match self {
            AccessError::Open(status) | AccessError::Rpc(status) | AccessError::Stream(status) => {
                Some(status)
            }
            _ => None,
        }
    }
}

/// A non-success answer of the REST API.
///
/// It displays as the server-provided message only, so callers see exactly
/// what the access node reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub url: String,
    pub code: u16,
    pub message: String,
}
