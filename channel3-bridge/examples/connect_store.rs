//! Connects an in-memory demo store to Channel3.
//!
//! Run with a staging endpoint to avoid touching production:
//!
//! ```sh
//! CHANNEL3_API_URL=https://staging.trychannel3.com \
//!     cargo run --example connect_store -- AB12
//! ```

use std::sync::Arc;

use channel3_bridge::{
    admin::validate_merchant_id,
    config::{ConfigScope, MemoryConfigBackend},
    connection::Connection,
    handshake::{ClientConfig, ConnectClient},
    platform::MemoryPlatform,
    provision::CredentialProvisioner,
    state::ConnectionStateStore,
};

#[tokio::main]
async fn main() -> channel3_bridge::Result<()> {
    let raw_id = std::env::args().nth(1).unwrap_or_else(|| "AB12".to_owned());
    let merchant_id = validate_merchant_id(&raw_id)?;

    let mut config = ClientConfig::default();
    if let Ok(api_url) = std::env::var("CHANNEL3_API_URL") {
        config.base_url = api_url;
    }

    let platform = Arc::new(MemoryPlatform::new());
    let backend = Arc::new(MemoryConfigBackend::new());

    let connection = Connection::new(
        CredentialProvisioner::new(platform.clone(), platform.clone()),
        ConnectClient::with_config(config)?,
        ConnectionStateStore::new(backend, ConfigScope::Default),
        "https://demo-storefront.example.com/".to_owned(),
    );

    let report = connection.connect(&merchant_id).await;
    println!("{}", report.message);

    let state = connection.state().load()?;
    println!("connected: {}, merchant id: {:?}", state.connected, state.merchant_id);

    Ok(())
}
