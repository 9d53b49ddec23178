use std::time::Duration;

use thiserror::Error;

use crate::service::ServiceError;

/// Everything that can go wrong on the client side.
///
/// Service and transport failures are kept apart from on-chain rejections so
/// callers can retry the former and surface the latter.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("caller declined to sign the decryption authorization: {0}")]
    SignatureRejected(String),

    #[error("decryption service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("decryption service rejected the request: {0}")]
    ServiceRejected(ServiceError),

    #[error("decryption session expired")]
    SessionExpired,

    #[error("a decryption for this account and contract is already in flight")]
    Busy,

    #[error("decryption timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed service response: {0}")]
    MalformedResponse(&'static str),

    #[error("invalid key material: {0}")]
    InvalidKey(&'static str),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("transaction rejected on-chain: {0}")]
    OnChain(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

impl GatewayError {
    /// The chain saw the transaction and refused it.
    pub fn is_on_chain(&self) -> bool {
        matches!(self, Self::OnChain(_))
    }

    /// Failed before reaching the chain or the decryption service's decision;
    /// a retry may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable(_) | Self::Transport(_) | Self::Timeout(_) | Self::Busy
        )
    }
}

impl From<ServiceError> for GatewayError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Unavailable(msg) => Self::ServiceUnavailable(msg),
            other => Self::ServiceRejected(other),
        }
    }
}
