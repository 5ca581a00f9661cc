//! In-memory implementation of the platform services.
//!
//! Backs the integration/consumer/token tables with plain vectors behind a
//! mutex. Row counts are tiny (one integration per installation), so linear
//! scans are fine. The whole table set serializes to a [`PlatformSnapshot`]
//! so embedding callers (the admin binary, tests) can persist state between
//! runs.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    models::{
        AccessToken, Consumer, ConsumerId, IntegrationId, IntegrationRecord, IntegrationStatus,
        NewIntegration, OauthToken, TokenType,
    },
    traits::{IntegrationService, OauthService, PlatformError, PlatformResult},
};

/// Serializable contents of a [`MemoryPlatform`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    /// Integration records.
    #[serde(default)]
    pub integrations: Vec<IntegrationRecord>,
    /// OAuth1 consumers.
    #[serde(default)]
    pub consumers: Vec<Consumer>,
    /// Token entities, keyed by token string.
    #[serde(default)]
    pub tokens: Vec<OauthToken>,
    /// Next integration id to assign.
    #[serde(default = "first_id")]
    pub next_integration_id: u32,
    /// Next consumer id to assign.
    #[serde(default = "first_id")]
    pub next_consumer_id: u32,
    /// Emulate platform builds whose activation flow implicitly creates and
    /// links a consumer (plus an unauthorized token).
    #[serde(default)]
    pub implicit_consumer_on_activate: bool,
}

fn first_id() -> u32 {
    1
}

/// In-memory platform: implements [`IntegrationService`] and
/// [`OauthService`] over mutex-guarded tables.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    tables: Mutex<PlatformSnapshot>,
}

impl MemoryPlatform {
    /// Creates an empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::from_snapshot(PlatformSnapshot { next_integration_id: 1, next_consumer_id: 1, ..PlatformSnapshot::default() })
    }

    /// Creates an empty platform whose activation flow implicitly creates a
    /// consumer and an unauthorized token, the way some platform builds do.
    #[must_use]
    pub fn with_implicit_consumer() -> Self {
        let platform = Self::new();
        {
            let mut tables = platform.tables.lock().expect("fresh mutex cannot be poisoned");
            tables.implicit_consumer_on_activate = true;
        }
        platform
    }

    /// Restores a platform from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: PlatformSnapshot) -> Self {
        Self { tables: Mutex::new(snapshot) }
    }

    /// Returns a copy of the current tables.
    ///
    /// # Panics
    ///
    /// Panics if the table mutex was poisoned by a panicking thread.
    #[must_use]
    pub fn snapshot(&self) -> PlatformSnapshot {
        self.tables.lock().expect("platform tables poisoned").clone()
    }

    fn lock(&self) -> PlatformResult<MutexGuard<'_, PlatformSnapshot>> {
        self.tables.lock().map_err(|_| PlatformError::Api("platform tables poisoned".to_owned()))
    }
}

/// Mints an opaque credential string (key, secret, or token).
fn mint_secret() -> String {
    Uuid::new_v4().simple().to_string()
}

fn attach_consumer(tables: &mut PlatformSnapshot, name: &str) -> Consumer {
    let consumer = Consumer {
        id: ConsumerId(tables.next_consumer_id),
        name: name.to_owned(),
        key: mint_secret(),
        secret: mint_secret(),
        created_at: Utc::now(),
    };
    tables.next_consumer_id += 1;
    tables.consumers.push(consumer.clone());
    consumer
}

fn mint_token(tables: &mut PlatformSnapshot, consumer_id: ConsumerId) -> OauthToken {
    let token = OauthToken {
        token: mint_secret(),
        secret: mint_secret(),
        consumer_id,
        // The platform hands out tokens that its own API will reject until
        // they are explicitly flipped to an authorized access token.
        token_type: TokenType::Request,
        authorized: false,
        created_at: Utc::now(),
    };
    tables.tokens.push(token.clone());
    token
}

impl IntegrationService for MemoryPlatform {
    fn find_by_name(&self, name: &str) -> PlatformResult<Option<IntegrationRecord>> {
        let tables = self.lock()?;
        Ok(tables.integrations.iter().find(|record| record.name == name).cloned())
    }

    fn create(&self, new: NewIntegration) -> PlatformResult<IntegrationRecord> {
        let mut tables = self.lock()?;
        if tables.integrations.iter().any(|record| record.name == new.name) {
            return Err(PlatformError::Api(format!(
                "integration name '{}' already registered",
                new.name
            )));
        }

        let record = IntegrationRecord {
            id: IntegrationId(tables.next_integration_id),
            name: new.name,
            status: IntegrationStatus::Inactive,
            resource_scopes: new.resource_scopes,
            consumer_id: None,
            created_at: Utc::now(),
        };
        tables.next_integration_id += 1;
        tables.integrations.push(record.clone());
        Ok(record)
    }

    fn get(&self, id: IntegrationId) -> PlatformResult<IntegrationRecord> {
        let tables = self.lock()?;
        tables
            .integrations
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or(PlatformError::IntegrationNotFound(id))
    }

    fn set_status(
        &self,
        id: IntegrationId,
        status: IntegrationStatus,
    ) -> PlatformResult<IntegrationRecord> {
        let mut tables = self.lock()?;
        let implicit = tables.implicit_consumer_on_activate;

        let position = tables
            .integrations
            .iter()
            .position(|record| record.id == id)
            .ok_or(PlatformError::IntegrationNotFound(id))?;

        tables.integrations[position].status = status;

        if status == IntegrationStatus::Active
            && implicit
            && tables.integrations[position].consumer_id.is_none()
        {
            let name = format!("{}_{}", tables.integrations[position].name, id);
            let consumer = attach_consumer(&mut tables, &name);
            mint_token(&mut tables, consumer.id);
            tables.integrations[position].consumer_id = Some(consumer.id);
        }

        Ok(tables.integrations[position].clone())
    }

    fn link_consumer(
        &self,
        id: IntegrationId,
        consumer_id: ConsumerId,
    ) -> PlatformResult<IntegrationRecord> {
        let mut tables = self.lock()?;
        let record = tables
            .integrations
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(PlatformError::IntegrationNotFound(id))?;
        record.consumer_id = Some(consumer_id);
        Ok(record.clone())
    }
}

impl OauthService for MemoryPlatform {
    fn create_consumer(&self, name: &str) -> PlatformResult<Consumer> {
        let mut tables = self.lock()?;
        Ok(attach_consumer(&mut tables, name))
    }

    fn load_consumer(&self, id: ConsumerId) -> PlatformResult<Consumer> {
        let tables = self.lock()?;
        tables
            .consumers
            .iter()
            .find(|consumer| consumer.id == id)
            .cloned()
            .ok_or(PlatformError::ConsumerNotFound(id))
    }

    fn create_access_token(&self, consumer_id: ConsumerId) -> PlatformResult<AccessToken> {
        let mut tables = self.lock()?;
        if !tables.consumers.iter().any(|consumer| consumer.id == consumer_id) {
            return Err(PlatformError::ConsumerNotFound(consumer_id));
        }

        if let Some(token) = tables.tokens.iter().find(|token| token.consumer_id == consumer_id) {
            return Ok(AccessToken { token: token.token.clone(), secret: token.secret.clone() });
        }

        let minted = mint_token(&mut tables, consumer_id);
        Ok(AccessToken { token: minted.token, secret: minted.secret })
    }

    fn access_token(&self, consumer_id: ConsumerId) -> PlatformResult<Option<AccessToken>> {
        let tables = self.lock()?;
        Ok(tables
            .tokens
            .iter()
            .find(|token| token.consumer_id == consumer_id)
            .map(|token| AccessToken { token: token.token.clone(), secret: token.secret.clone() }))
    }

    fn load_token(&self, token: &str) -> PlatformResult<Option<OauthToken>> {
        let tables = self.lock()?;
        Ok(tables.tokens.iter().find(|entity| entity.token == token).cloned())
    }

    fn save_token(&self, token: OauthToken) -> PlatformResult<()> {
        let mut tables = self.lock()?;
        if let Some(entity) = tables.tokens.iter_mut().find(|entity| entity.token == token.token) {
            *entity = token;
            return Ok(());
        }
        tables.tokens.push(token);
        Ok(())
    }
}
