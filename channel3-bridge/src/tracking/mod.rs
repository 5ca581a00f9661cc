//! Storefront tracking glue.
//!
//! Everything here is read-only with respect to the connection workflow: it
//! reads the persisted [`crate::state::ConnectionState`] and either resolves
//! context for the client-side tracking snippet or forwards a one-shot pixel
//! event. There is no retry and no state — "connected? then emit".

pub mod checkout;
pub mod page;

pub use checkout::{CheckoutEvent, CheckoutEventSlot, CheckoutLineItem, Order, OrderItem};
pub use page::{PageViewEvent, StorefrontPage, TrackingContext};

use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::{
    error::{BridgeError, Result},
    handshake::{ClientConfig, build_http_client},
};

/// Path of the page-view pixel endpoint, relative to the API origin.
pub(crate) const PAGE_VIEW_PATH: &str = "/v0/magento/pixel/page-view";

/// Path of the checkout pixel endpoint, relative to the API origin.
pub(crate) const CHECKOUT_PATH: &str = "/v0/magento/pixel/checkout";

/// One-shot relay for pixel events.
///
/// Server-side counterpart of the storefront script: posts a JSON event and
/// reports the outcome. Delivery failures are the caller's to log; they are
/// never retried and never touch connection state.
#[derive(Debug, Clone)]
pub struct PixelClient {
    http: Client,
    base_url: String,
}

impl PixelClient {
    /// Creates a relay from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidConfig`] if the configuration is invalid
    /// or the HTTP client cannot be built.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = build_http_client(&config)?;
        Ok(Self { http, base_url: config.base_url })
    }

    /// Forwards a page-view event.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::PixelDelivery`] on transport failure or a
    /// non-success response.
    pub async fn page_view(&self, event: &PageViewEvent) -> Result<()> {
        self.post(PAGE_VIEW_PATH, event).await
    }

    /// Forwards a checkout event.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::PixelDelivery`] on transport failure or a
    /// non-success response.
    pub async fn checkout(&self, event: &CheckoutEvent) -> Result<()> {
        self.post(CHECKOUT_PATH, event).await
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, event: &T) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(event)
            .send()
            .await
            .map_err(|e| BridgeError::PixelDelivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::PixelDelivery(format!("{path} answered HTTP {status}")));
        }

        info!(path, "pixel delivered");
        Ok(())
    }
}
