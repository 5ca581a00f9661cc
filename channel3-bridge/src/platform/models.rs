//! Data model for the platform's integration, consumer, and token rows.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an integration record, assigned by the platform on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntegrationId(pub u32);

impl fmt::Display for IntegrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of an OAuth1 consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConsumerId(pub u32);

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Activation status of an integration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    /// Registered but not yet granted credentials.
    Inactive,
    /// Activated; the platform has (or will) attach a consumer.
    Active,
}

/// The platform's named API-client registration.
///
/// At most one record with a given name exists per installation;
/// lookup-by-name is the sole de-duplication key. Records are created on the
/// first connect attempt, reused forever after, and never deleted by this
/// system (disconnect only clears local configuration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationRecord {
    /// Platform-assigned identifier, stable once created.
    pub id: IntegrationId,
    /// Integration name; fixed per connector.
    pub name: String,
    /// Activation status.
    pub status: IntegrationStatus,
    /// Permission strings granted to the integration.
    pub resource_scopes: Vec<String>,
    /// Owning OAuth1 consumer, set once activation completes.
    pub consumer_id: Option<ConsumerId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Request to register a new integration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIntegration {
    /// Integration name.
    pub name: String,
    /// Permission strings to grant.
    pub resource_scopes: Vec<String>,
}

/// OAuth1 client identity (key/secret) tied to an integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consumer {
    /// Platform-assigned identifier.
    pub id: ConsumerId,
    /// Consumer name.
    pub name: String,
    /// OAuth1 consumer key.
    pub key: String,
    /// OAuth1 consumer secret.
    pub secret: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// API-facing view of an access token: the token/secret pair used to sign
/// requests on behalf of an integration.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Token string.
    pub token: String,
    /// Token secret.
    pub secret: String,
}

/// Kind of an OAuth1 token entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Temporary request token.
    Request,
    /// Long-lived access token.
    Access,
}

/// The underlying token row.
///
/// The platform rejects signed requests carrying a token whose `authorized`
/// flag is unset or whose type is not [`TokenType::Access`], even when the
/// token was minted through the integration activation flow. The provisioner
/// must flip both fields explicitly; see [`crate::provision`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthToken {
    /// Token string (primary key).
    pub token: String,
    /// Token secret.
    pub secret: String,
    /// Owning consumer.
    pub consumer_id: ConsumerId,
    /// Token kind.
    pub token_type: TokenType,
    /// Whether the platform will honor this token for signed API calls.
    pub authorized: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl OauthToken {
    /// True when the platform will accept this token for signed requests.
    #[must_use]
    pub fn usable(&self) -> bool {
        self.authorized && self.token_type == TokenType::Access
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_status_serialization() {
        let json = serde_json::to_string(&IntegrationStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
        let parsed: IntegrationStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(parsed, IntegrationStatus::Inactive);
    }

    #[test]
    fn test_integration_record_round_trip() {
        let record = IntegrationRecord {
            id: IntegrationId(7),
            name: "Channel3".to_owned(),
            status: IntegrationStatus::Inactive,
            resource_scopes: vec!["Magento_Catalog::catalog".to_owned()],
            consumer_id: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: IntegrationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, IntegrationId(7));
        assert_eq!(parsed.status, IntegrationStatus::Inactive);
        assert!(parsed.consumer_id.is_none());
    }

    #[test]
    fn test_token_usable_requires_both_fields() {
        let mut token = OauthToken {
            token: "t".to_owned(),
            secret: "s".to_owned(),
            consumer_id: ConsumerId(1),
            token_type: TokenType::Request,
            authorized: false,
            created_at: Utc::now(),
        };
        assert!(!token.usable());

        token.authorized = true;
        assert!(!token.usable());

        token.token_type = TokenType::Access;
        assert!(token.usable());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(IntegrationId(42).to_string(), "42");
        assert_eq!(ConsumerId(9).to_string(), "9");
    }
}
