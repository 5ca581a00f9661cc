//! Connection orchestration.
//!
//! Composes the credential provisioner, the handshake client, and the state
//! store into the two operations the admin surface triggers. The lifecycle
//! is Disconnected → Connecting → Connected; any failure while connecting
//! reverts to Disconnected with nothing persisted, because the state store is
//! only written after the handshake succeeds.
//!
//! Two simultaneous connect submissions are not coordinated against each
//! other; the trigger is a human clicking a form, and the provisioner
//! converges either way on the next attempt.

use std::fmt;

use tracing::{error, info};

use crate::{
    error::{BridgeError, Result},
    handshake::{Handshake, HandshakePayload},
    provision::CredentialProvisioner,
    state::ConnectionStateStore,
};

/// Outcome reported back to the admin surface.
///
/// Errors never escape [`Connection::connect`] or
/// [`Connection::disconnect`]; they are folded into this pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectReport {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Message shown to the administrator.
    pub message: String,
}

impl ConnectReport {
    fn ok(message: &str) -> Self {
        Self { success: true, message: message.to_owned() }
    }

    fn failed(message: String) -> Self {
        Self { success: false, message }
    }
}

/// Drives the connect/disconnect workflow for one store view.
pub struct Connection<H> {
    provisioner: CredentialProvisioner,
    handshake: H,
    state: ConnectionStateStore,
    store_url: String,
}

impl<H: Handshake> Connection<H> {
    /// Composes the orchestrator from its three collaborators plus the
    /// public storefront URL sent along in the handshake.
    #[must_use]
    pub fn new(
        provisioner: CredentialProvisioner,
        handshake: H,
        state: ConnectionStateStore,
        store_url: String,
    ) -> Self {
        Self { provisioner, handshake, state, store_url }
    }

    /// Links this store to the given merchant account.
    ///
    /// `merchant_id` must already be validated by the caller (see
    /// [`crate::admin::validate_merchant_id`]); validation is a boundary
    /// concern, not part of the workflow.
    ///
    /// Provision → handshake → persist, short-circuiting on the first
    /// failure. Handshake failure messages are returned verbatim; everything
    /// else is reported as "Connection failed: <cause>". On failure no state
    /// is persisted — a previously connected store stays connected, a
    /// disconnected one stays disconnected.
    pub async fn connect(&self, merchant_id: &str) -> ConnectReport {
        info!(merchant_id, "connecting store to Channel3");

        match self.try_connect(merchant_id).await {
            Ok(()) => {
                info!(merchant_id, "store connected");
                ConnectReport::ok("Successfully connected to Channel3!")
            }
            Err(e) => {
                error!(merchant_id, error = %e, "connect failed");
                let message = match &e {
                    BridgeError::HandshakeTransport(_)
                    | BridgeError::AlreadyConnected
                    | BridgeError::HandshakeFailed(_) => e.to_string(),
                    other => format!("Connection failed: {other}"),
                };
                ConnectReport::failed(message)
            }
        }
    }

    async fn try_connect(&self, merchant_id: &str) -> Result<()> {
        let credentials = self.provisioner.provision()?;
        let payload = HandshakePayload::new(merchant_id, &self.store_url, &credentials);
        self.handshake.handshake(&payload).await?;
        self.state.set_connected(merchant_id)
    }

    /// Unlinks this store.
    ///
    /// Purely local: clears the persisted state and nothing else. The
    /// platform-side integration record and credentials are kept, which is
    /// what makes a later reconnect cheap and idempotent. Never calls the
    /// provisioner or the handshake client.
    pub fn disconnect(&self) -> ConnectReport {
        match self.state.set_disconnected() {
            Ok(()) => {
                info!("store disconnected");
                ConnectReport::ok("Disconnected from Channel3.")
            }
            Err(e) => {
                error!(error = %e, "disconnect failed");
                ConnectReport::failed(format!("Disconnect failed: {e}"))
            }
        }
    }

    /// The state store this orchestrator writes through.
    #[must_use]
    pub fn state(&self) -> &ConnectionStateStore {
        &self.state
    }
}

impl<H> fmt::Debug for Connection<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state)
            .field("store_url", &self.store_url)
            .finish_non_exhaustive()
    }
}
