//! Credential provisioning against the host platform.
//!
//! Converges the platform onto one active integration record owning one
//! authorized OAuth1 access token, and returns the credential quadruple the
//! Channel3 backend needs for signed API access. Each call inspects the
//! current remote state and performs only the missing steps, so the whole
//! operation is safe to repeat after any partial failure.

use std::{fmt, sync::Arc};

use tracing::info;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    error::{BridgeError, Result},
    platform::{
        AccessToken, Consumer, IntegrationRecord, IntegrationService, IntegrationStatus,
        NewIntegration, OauthService, OauthToken, TokenType,
    },
};

/// Fixed name of the integration record owned by this connector.
pub const INTEGRATION_NAME: &str = "Channel3";

/// API resources granted to the integration: catalog read access plus the
/// store settings Channel3 needs to resolve currencies and base URLs.
pub const REQUIRED_RESOURCES: &[&str] = &[
    "Magento_Catalog::catalog",
    "Magento_Catalog::catalog_inventory",
    "Magento_Catalog::products",
    "Magento_Catalog::categories",
    "Magento_Backend::store",
    "Magento_Backend::stores",
    "Magento_Backend::stores_settings",
];

/// Upper bound on convergence iterations; every step below strictly advances
/// the observed state, so hitting this means the platform is misbehaving.
const MAX_STEPS: usize = 8;

/// The OAuth1 credential quadruple handed to the Channel3 backend.
///
/// Secrets are wiped from memory when the set is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CredentialSet {
    /// OAuth1 consumer key.
    pub consumer_key: String,
    /// OAuth1 consumer secret.
    pub consumer_secret: String,
    /// Access token string.
    pub access_token: String,
    /// Access token secret.
    pub access_token_secret: String,
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

/// What provisioning observed on the platform in one pass.
#[derive(Debug, Default)]
struct Snapshot {
    record: Option<IntegrationRecord>,
    consumer: Option<Consumer>,
    token: Option<AccessToken>,
    entity: Option<OauthToken>,
}

/// The next missing step, derived purely from an observed snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    CreateRecord,
    Activate,
    CreateConsumer,
    CreateToken,
    AuthorizeToken,
    Done,
}

fn next_step(snapshot: &Snapshot) -> Step {
    let Some(record) = &snapshot.record else {
        return Step::CreateRecord;
    };
    if record.status != IntegrationStatus::Active {
        return Step::Activate;
    }
    if snapshot.consumer.is_none() {
        return Step::CreateConsumer;
    }
    if snapshot.token.is_none() {
        return Step::CreateToken;
    }
    if !snapshot.entity.as_ref().is_some_and(OauthToken::usable) {
        return Step::AuthorizeToken;
    }
    Step::Done
}

/// Creates, activates, and authorizes the platform credentials for the
/// Channel3 integration.
///
/// `provision` is idempotent at the platform level: repeated calls converge
/// to a single integration record and a single authorized access token, never
/// duplicating either.
pub struct CredentialProvisioner {
    integrations: Arc<dyn IntegrationService>,
    oauth: Arc<dyn OauthService>,
}

impl CredentialProvisioner {
    /// Creates a provisioner over the platform's integration and OAuth
    /// services.
    #[must_use]
    pub fn new(integrations: Arc<dyn IntegrationService>, oauth: Arc<dyn OauthService>) -> Self {
        Self { integrations, oauth }
    }

    /// Ensures the integration exists, is active, and owns an authorized
    /// access token, then returns the credential quadruple.
    ///
    /// The explicit authorization step is mandatory: a token minted by the
    /// platform's activation flow is rejected for signed API calls until its
    /// `authorized` flag and `access` type are persisted. Skipping it would
    /// regress silently — the connect handshake still succeeds, and every
    /// later catalog call from Channel3 fails with an authorization error.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Platform`] when a platform call fails, or
    /// [`BridgeError::Provisioning`] when the platform reports a state this
    /// workflow cannot repair. No rollback is attempted; the next call
    /// resumes from whatever state was reached.
    pub fn provision(&self) -> Result<CredentialSet> {
        for _ in 0..MAX_STEPS {
            let snapshot = self.observe()?;
            match next_step(&snapshot) {
                Step::CreateRecord => {
                    let record = self.integrations.create(NewIntegration {
                        name: INTEGRATION_NAME.to_owned(),
                        resource_scopes: REQUIRED_RESOURCES
                            .iter()
                            .map(|resource| (*resource).to_owned())
                            .collect(),
                    })?;
                    info!(integration_id = %record.id, "created integration record");
                }
                Step::Activate => {
                    let record = required_record(&snapshot)?;
                    self.integrations.set_status(record.id, IntegrationStatus::Active)?;
                    info!(integration_id = %record.id, "activated integration");
                }
                Step::CreateConsumer => {
                    let record = required_record(&snapshot)?;
                    let consumer = self
                        .oauth
                        .create_consumer(&format!("{INTEGRATION_NAME}_{}", record.id))?;
                    self.integrations.link_consumer(record.id, consumer.id)?;
                    info!(consumer_id = %consumer.id, "created and linked consumer");
                }
                Step::CreateToken => {
                    let consumer = snapshot.consumer.as_ref().ok_or_else(|| {
                        BridgeError::Provisioning("consumer vanished during provisioning".to_owned())
                    })?;
                    self.oauth.create_access_token(consumer.id)?;
                }
                Step::AuthorizeToken => {
                    let mut entity = snapshot.entity.clone().ok_or_else(|| {
                        BridgeError::Provisioning(
                            "no token entity found for the minted access token".to_owned(),
                        )
                    })?;
                    entity.authorized = true;
                    entity.token_type = TokenType::Access;
                    let consumer_id = entity.consumer_id;
                    self.oauth.save_token(entity)?;
                    info!(consumer_id = %consumer_id, "access token authorized");
                }
                Step::Done => {
                    return credentials(&snapshot);
                }
            }
        }

        Err(BridgeError::Provisioning(
            "platform state did not converge; see platform logs".to_owned(),
        ))
    }

    /// Reads the platform state relevant to provisioning in one pass.
    fn observe(&self) -> Result<Snapshot> {
        let Some(found) = self.integrations.find_by_name(INTEGRATION_NAME)? else {
            return Ok(Snapshot::default());
        };

        // Reload after potential activation side effects: the platform may
        // have attached a consumer the record did not carry when found.
        let record = self.integrations.get(found.id)?;
        let Some(consumer_id) = record.consumer_id else {
            return Ok(Snapshot { record: Some(record), ..Snapshot::default() });
        };

        let consumer = self.oauth.load_consumer(consumer_id)?;
        let token = self.oauth.access_token(consumer_id)?;
        let entity = match &token {
            Some(token) => self.oauth.load_token(&token.token)?,
            None => None,
        };

        Ok(Snapshot { record: Some(record), consumer: Some(consumer), token, entity })
    }
}

impl fmt::Debug for CredentialProvisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialProvisioner").finish_non_exhaustive()
    }
}

fn required_record(snapshot: &Snapshot) -> Result<&IntegrationRecord> {
    snapshot.record.as_ref().ok_or_else(|| {
        BridgeError::Provisioning("integration record vanished during provisioning".to_owned())
    })
}

fn credentials(snapshot: &Snapshot) -> Result<CredentialSet> {
    let (Some(consumer), Some(token)) = (&snapshot.consumer, &snapshot.token) else {
        return Err(BridgeError::Provisioning(
            "failed to generate access tokens for the integration".to_owned(),
        ));
    };

    Ok(CredentialSet {
        consumer_key: consumer.key.clone(),
        consumer_secret: consumer.secret.clone(),
        access_token: token.token.clone(),
        access_token_secret: token.secret.clone(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::platform::{ConsumerId, IntegrationId, MemoryPlatform};

    fn snapshot(
        record: Option<IntegrationStatus>,
        consumer: bool,
        token: bool,
        authorized: bool,
    ) -> Snapshot {
        let consumer_id = ConsumerId(1);
        Snapshot {
            record: record.map(|status| IntegrationRecord {
                id: IntegrationId(1),
                name: INTEGRATION_NAME.to_owned(),
                status,
                resource_scopes: vec![],
                consumer_id: consumer.then_some(consumer_id),
                created_at: Utc::now(),
            }),
            consumer: consumer.then(|| Consumer {
                id: consumer_id,
                name: "Channel3_1".to_owned(),
                key: "key".to_owned(),
                secret: "secret".to_owned(),
                created_at: Utc::now(),
            }),
            token: token.then(|| AccessToken { token: "tok".to_owned(), secret: "sec".to_owned() }),
            entity: token.then(|| OauthToken {
                token: "tok".to_owned(),
                secret: "sec".to_owned(),
                consumer_id,
                token_type: if authorized { TokenType::Access } else { TokenType::Request },
                authorized,
                created_at: Utc::now(),
            }),
        }
    }

    #[test]
    fn test_next_step_table() {
        assert_eq!(next_step(&snapshot(None, false, false, false)), Step::CreateRecord);
        assert_eq!(
            next_step(&snapshot(Some(IntegrationStatus::Inactive), false, false, false)),
            Step::Activate
        );
        assert_eq!(
            next_step(&snapshot(Some(IntegrationStatus::Active), false, false, false)),
            Step::CreateConsumer
        );
        assert_eq!(
            next_step(&snapshot(Some(IntegrationStatus::Active), true, false, false)),
            Step::CreateToken
        );
        assert_eq!(
            next_step(&snapshot(Some(IntegrationStatus::Active), true, true, false)),
            Step::AuthorizeToken
        );
        assert_eq!(
            next_step(&snapshot(Some(IntegrationStatus::Active), true, true, true)),
            Step::Done
        );
    }

    #[test]
    fn test_authorize_step_covers_unauthorized_entity() {
        // A token that exists but was never flipped to an authorized access
        // token must still be one step away from Done.
        let mut probe = snapshot(Some(IntegrationStatus::Active), true, true, true);
        if let Some(entity) = &mut probe.entity {
            entity.authorized = false;
        }
        assert_eq!(next_step(&probe), Step::AuthorizeToken);

        let mut probe = snapshot(Some(IntegrationStatus::Active), true, true, true);
        if let Some(entity) = &mut probe.entity {
            entity.token_type = TokenType::Request;
        }
        assert_eq!(next_step(&probe), Step::AuthorizeToken);
    }

    fn provisioner(platform: &Arc<MemoryPlatform>) -> CredentialProvisioner {
        CredentialProvisioner::new(platform.clone(), platform.clone())
    }

    #[test]
    fn test_provision_from_empty_platform() {
        let platform = Arc::new(MemoryPlatform::new());
        let credentials = provisioner(&platform).provision().unwrap();

        assert!(!credentials.consumer_key.is_empty());
        assert!(!credentials.access_token.is_empty());

        let tables = platform.snapshot();
        assert_eq!(tables.integrations.len(), 1);
        assert_eq!(tables.integrations[0].status, IntegrationStatus::Active);
        assert_eq!(tables.integrations[0].resource_scopes.len(), REQUIRED_RESOURCES.len());
        assert_eq!(tables.consumers.len(), 1);
        assert!(tables.tokens[0].usable());
    }

    #[test]
    fn test_provision_is_idempotent() {
        let platform = Arc::new(MemoryPlatform::new());
        let provisioner = provisioner(&platform);

        let first = provisioner.provision().unwrap();
        let second = provisioner.provision().unwrap();

        assert_eq!(first.consumer_key, second.consumer_key);
        assert_eq!(first.access_token, second.access_token);

        let tables = platform.snapshot();
        assert_eq!(tables.integrations.len(), 1);
        assert_eq!(tables.consumers.len(), 1);
        assert_eq!(tables.tokens.len(), 1);
    }

    #[test]
    fn test_provision_authorizes_preexisting_token() {
        // Platform builds whose activation flow mints the consumer and an
        // unauthorized token: provisioning must still end with a usable token.
        let platform = Arc::new(MemoryPlatform::with_implicit_consumer());
        let credentials = provisioner(&platform).provision().unwrap();

        let entity = platform.load_token(&credentials.access_token).unwrap().unwrap();
        assert!(entity.usable());
        assert_eq!(platform.snapshot().tokens.len(), 1);
    }

    #[test]
    fn test_credential_set_debug_redacts_secrets() {
        let set = CredentialSet {
            consumer_key: "key-1".to_owned(),
            consumer_secret: "cs".to_owned(),
            access_token: "at".to_owned(),
            access_token_secret: "ats".to_owned(),
        };
        let rendered = format!("{set:?}");
        assert!(rendered.contains("key-1"));
        assert!(!rendered.contains("ats"));
        assert!(rendered.contains("<redacted>"));
    }
}
