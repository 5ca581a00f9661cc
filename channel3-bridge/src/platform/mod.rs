//! Host-platform identity and API-access abstraction.
//!
//! The Channel3 connection workflow drives the commerce platform's
//! integration subsystem: a named integration record grants scoped API
//! permissions, owns an OAuth1 consumer, and is exercised with an access
//! token that the platform only honors once it has been explicitly marked
//! authorized. This module defines the data model for those rows, the narrow
//! service traits the provisioner needs, and an in-memory implementation of
//! both.

pub mod memory;
pub mod models;
pub mod traits;

pub use memory::{MemoryPlatform, PlatformSnapshot};
pub use models::{
    AccessToken, Consumer, ConsumerId, IntegrationId, IntegrationRecord, IntegrationStatus,
    NewIntegration, OauthToken, TokenType,
};
pub use traits::{IntegrationService, OauthService, PlatformError};
