//! Server-resolved context for the page tracking snippet.
//!
//! Product id and currency are resolved server-side and handed to the
//! snippet, instead of scraping the DOM on the client. Nothing renders unless
//! the store is connected with a merchant id.

use serde::Serialize;

use crate::state::ConnectionState;

/// What the storefront knows about the page being rendered.
#[derive(Debug, Clone, Default)]
pub struct StorefrontPage {
    /// Product id when rendering a product page.
    pub product_id: Option<String>,
    /// Current display currency (ISO 4217), when resolvable.
    pub currency: Option<String>,
}

/// Data injected into the client-side tracking snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingContext {
    /// The merchant id the events are attributed to.
    pub account_id: String,
    /// Fully resolved page-view pixel endpoint.
    pub endpoint: String,
    /// Product id on product pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Display currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl TrackingContext {
    /// Resolves snippet context for a page, or `None` when the snippet must
    /// not render (not connected, or no merchant id).
    #[must_use]
    pub fn resolve(state: &ConnectionState, base_url: &str, page: &StorefrontPage) -> Option<Self> {
        if !state.is_linked() {
            return None;
        }

        Some(Self {
            account_id: state.merchant_id.clone(),
            endpoint: format!("{base_url}{}", super::PAGE_VIEW_PATH),
            product_id: page.product_id.clone(),
            currency: page.currency.clone(),
        })
    }

    /// The page-view event this context produces on the wire.
    #[must_use]
    pub fn event(&self) -> PageViewEvent {
        PageViewEvent {
            account_id: self.account_id.clone(),
            product_id: self.product_id.clone(),
            currency: self.currency.clone(),
        }
    }
}

/// Body of a page-view pixel POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewEvent {
    /// The merchant id the event is attributed to.
    pub account_id: String,
    /// Product id on product pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Display currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}
