//! Channel3 Bridge: connects a Magento storefront to the Channel3 analytics
//! backend.
//!
//! The bridge does three things for a store:
//!
//! - **Connect**: provision OAuth1 API credentials on the host platform and
//!   hand them to Channel3 in a one-time handshake, then persist the
//!   connected state.
//! - **Track**: resolve server-side context (product id, currency) for the
//!   storefront tracking snippet.
//! - **Capture**: build the completed-order event on checkout and relay it
//!   once.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   connect / disconnect   ┌────────────────────────────┐
//! │ Admin surface│ ───────────────────────▶ │ Connection (orchestrator)  │
//! └──────────────┘                          │                            │
//!                  ┌────────────────────────┤ provision → handshake →    │
//!                  │                        │            persist         │
//!                  ▼                        └──────┬──────────────┬──────┘
//!     ┌─────────────────────────┐                  │              │
//!     │ Host platform           │                  │              ▼
//!     │ (integration, consumer, │                  │   ┌────────────────────┐
//!     │  token tables)          │                  │   │ Config store       │
//!     └─────────────────────────┘                  │   │ connected flag +   │
//!                                                  │   │ merchant id        │
//!                                                  ▼   └────────────────────┘
//!                                   ┌───────────────────────┐    ▲
//!                                   │ Channel3 backend      │    │ read-only
//!                                   │ POST /connect-via-    │ ┌──┴──────────┐
//!                                   │      module           │ │ tracking /  │
//!                                   └───────────────────────┘ │ checkout    │
//!                                                             └─────────────┘
//! ```
//!
//! The connection workflow is the only stateful part. Everything downstream
//! (tracking snippet, checkout capture) just reads the persisted
//! [`state::ConnectionState`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use channel3_bridge::{
//!     admin::validate_merchant_id,
//!     config::{ConfigScope, MemoryConfigBackend},
//!     connection::Connection,
//!     handshake::ConnectClient,
//!     platform::MemoryPlatform,
//!     provision::CredentialProvisioner,
//!     state::ConnectionStateStore,
//! };
//!
//! # async fn example() -> channel3_bridge::Result<()> {
//! let platform = Arc::new(MemoryPlatform::new());
//! let config = Arc::new(MemoryConfigBackend::new());
//!
//! let connection = Connection::new(
//!     CredentialProvisioner::new(platform.clone(), platform.clone()),
//!     ConnectClient::new()?,
//!     ConnectionStateStore::new(config, ConfigScope::Default),
//!     "https://shop.example.com/".to_owned(),
//! );
//!
//! let merchant_id = validate_merchant_id("AB12")?;
//! let report = connection.connect(&merchant_id).await;
//! println!("{}", report.message);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`platform`]: host-platform integration/OAuth abstraction + in-memory
//!   implementation
//! - [`config`]: key-value configuration boundary and scopes
//! - [`provision`]: idempotent credential provisioning
//! - [`handshake`]: the connect POST and response classification
//! - [`state`]: persisted connection state
//! - [`connection`]: the connect/disconnect orchestrator
//! - [`tracking`]: snippet context, checkout capture, pixel relay
//! - [`admin`]: input validation and the settings view
//! - [`error`]: error taxonomy
//!
//! # Failure Model
//!
//! No automatic retry anywhere: a failed connect is reported to the
//! administrator, who re-submits the form. That is safe because provisioning
//! converges — it inspects the platform state and performs only the missing
//! steps, so partial failures never duplicate integration records, consumers,
//! or tokens.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod admin;
pub mod config;
pub mod connection;
pub mod error;
pub mod handshake;
pub mod platform;
pub mod provision;
pub mod state;
pub mod tracking;

pub use connection::{ConnectReport, Connection};
pub use error::{BridgeError, Result};
pub use state::ConnectionState;
