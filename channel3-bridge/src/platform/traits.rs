//! Service traits at the host-platform boundary.
//!
//! The provisioner only needs a handful of calls from the platform's
//! integration and OAuth subsystems. Keeping the traits narrow and
//! object-safe lets the in-memory implementation, the real platform binding,
//! and test doubles all satisfy them.

use thiserror::Error;

use super::models::{
    AccessToken, Consumer, ConsumerId, IntegrationId, IntegrationRecord, IntegrationStatus,
    NewIntegration, OauthToken,
};

/// Errors surfaced by the platform's integration/OAuth services.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// No integration record with the given id exists.
    #[error("integration {0} not found")]
    IntegrationNotFound(IntegrationId),

    /// No consumer with the given id exists.
    #[error("consumer {0} not found")]
    ConsumerNotFound(ConsumerId),

    /// Any other platform API failure (storage, validation, duplicate name).
    #[error("platform API call failed: {0}")]
    Api(String),
}

/// Result alias for platform service calls.
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// The platform's integration registry.
///
/// Mirrors the subset of the integration service the connect workflow
/// exercises. All calls are whole-operation: the backing store is treated as
/// externally transactional and no locks are managed here.
pub trait IntegrationService: Send + Sync {
    /// Looks up an integration record by name.
    ///
    /// Name lookup is the sole de-duplication key for records created by this
    /// system.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails; an absent record is
    /// `Ok(None)`.
    fn find_by_name(&self, name: &str) -> PlatformResult<Option<IntegrationRecord>>;

    /// Registers a new integration record with status
    /// [`IntegrationStatus::Inactive`].
    ///
    /// # Errors
    ///
    /// Returns an error if a record with the same name already exists or the
    /// store fails.
    fn create(&self, new: NewIntegration) -> PlatformResult<IntegrationRecord>;

    /// Loads a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::IntegrationNotFound`] for unknown ids.
    fn get(&self, id: IntegrationId) -> PlatformResult<IntegrationRecord>;

    /// Requests a status change and returns the updated record.
    ///
    /// Activation is platform-managed: switching a record to
    /// [`IntegrationStatus::Active`] may implicitly create and link a
    /// consumer, depending on the platform build. Callers must re-read the
    /// record afterwards rather than assume either behavior.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::IntegrationNotFound`] for unknown ids.
    fn set_status(
        &self,
        id: IntegrationId,
        status: IntegrationStatus,
    ) -> PlatformResult<IntegrationRecord>;

    /// Links a consumer to a record and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::IntegrationNotFound`] for unknown ids.
    fn link_consumer(
        &self,
        id: IntegrationId,
        consumer_id: ConsumerId,
    ) -> PlatformResult<IntegrationRecord>;
}

/// The platform's OAuth1 credential subsystem.
pub trait OauthService: Send + Sync {
    /// Creates a new consumer with a freshly minted key/secret pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn create_consumer(&self, name: &str) -> PlatformResult<Consumer>;

    /// Loads a consumer by id.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::ConsumerNotFound`] for unknown ids.
    fn load_consumer(&self, id: ConsumerId) -> PlatformResult<Consumer>;

    /// Ensures an access token exists for the consumer and returns it.
    ///
    /// Idempotent: when a token already exists it is returned unchanged. The
    /// minted token is NOT authorized — see [`OauthToken::usable`] and the
    /// explicit authorization step in [`crate::provision`].
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::ConsumerNotFound`] for unknown consumers.
    fn create_access_token(&self, consumer_id: ConsumerId) -> PlatformResult<AccessToken>;

    /// Returns the consumer's access token, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn access_token(&self, consumer_id: ConsumerId) -> PlatformResult<Option<AccessToken>>;

    /// Loads the underlying token entity by its token string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails; an absent entity is
    /// `Ok(None)`.
    fn load_token(&self, token: &str) -> PlatformResult<Option<OauthToken>>;

    /// Persists a token entity, replacing any entity with the same token
    /// string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn save_token(&self, token: OauthToken) -> PlatformResult<()>;
}
