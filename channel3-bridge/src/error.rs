//! Error types for the Channel3 bridge.
//!
//! All errors implement the standard [`std::error::Error`] trait via
//! [`thiserror::Error`]. The handshake variants carry the exact text shown to
//! the store administrator; the orchestrator returns those messages verbatim
//! (see [`crate::connection`]), while everything else is wrapped in a
//! "Connection failed" / "Disconnect failed" prefix at that boundary.

use thiserror::Error;

use crate::{config::ConfigError, platform::PlatformError};

/// Result type alias for bridge operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while linking a store to Channel3.
///
/// # Error Recovery
///
/// - [`HandshakeTransport`](Self::HandshakeTransport): transient — the
///   administrator re-submits the connect form; provisioning is idempotent so
///   the retry is safe.
/// - [`AlreadyConnected`](Self::AlreadyConnected): user-actionable — the store
///   must be disconnected on the Channel3 side first.
/// - [`Platform`](Self::Platform): the host platform rejected an
///   integration/consumer/token call; check the platform logs.
/// - [`InvalidMerchantId`](Self::InvalidMerchantId): fix the input; never
///   reaches the core workflow.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The submitted merchant id is not exactly 4 alphanumeric characters.
    ///
    /// Raised by the admin boundary before any core component runs.
    #[error("Please enter a valid 4-character merchant ID from your Channel3 dashboard.")]
    InvalidMerchantId,

    /// A host-platform API call failed while creating or activating
    /// credentials.
    ///
    /// No rollback is attempted: an integration record left inactive or
    /// without a token is converged on the next connect attempt.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Credential provisioning observed a state it cannot repair, e.g. an
    /// access token that exists in the API view but has no underlying entity.
    #[error("credential provisioning failed: {0}")]
    Provisioning(String),

    /// The Channel3 backend could not be reached (DNS, TLS, timeout).
    ///
    /// The message is shown to the administrator as-is.
    #[error("Could not reach Channel3: {0}")]
    HandshakeTransport(String),

    /// The Channel3 backend answered HTTP 409: this store is already linked
    /// to a merchant account.
    ///
    /// Treated as a distinct, user-actionable outcome, not a generic failure.
    #[error("This store is already connected to Channel3.")]
    AlreadyConnected,

    /// The Channel3 backend rejected the handshake with a non-409 failure.
    ///
    /// Carries the backend-supplied `detail` text when present, otherwise a
    /// generic "Connection failed (HTTP <code>)" message.
    #[error("{0}")]
    HandshakeFailed(String),

    /// Reading or writing the connection state in the configuration store
    /// failed.
    #[error(transparent)]
    StateWrite(#[from] ConfigError),

    /// The connector configuration (endpoint override, timeouts) is invalid.
    #[error("invalid connector configuration: {0}")]
    InvalidConfig(String),

    /// A one-shot pixel delivery (page view or checkout) failed.
    ///
    /// Pixels are fire-and-forget: this error is logged and surfaced to the
    /// caller but never retried and never affects connection state.
    #[error("pixel delivery failed: {0}")]
    PixelDelivery(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_merchant_id_message() {
        let error = BridgeError::InvalidMerchantId;
        assert!(error.to_string().contains("4-character merchant ID"));
    }

    #[test]
    fn test_already_connected_message() {
        let error = BridgeError::AlreadyConnected;
        assert_eq!(error.to_string(), "This store is already connected to Channel3.");
    }

    #[test]
    fn test_transport_message_carries_cause() {
        let error = BridgeError::HandshakeTransport("connection refused".to_owned());
        assert_eq!(error.to_string(), "Could not reach Channel3: connection refused");
    }

    #[test]
    fn test_handshake_failed_is_verbatim() {
        let error = BridgeError::HandshakeFailed("Merchant AB12 does not exist.".to_owned());
        assert_eq!(error.to_string(), "Merchant AB12 does not exist.");
    }
}
