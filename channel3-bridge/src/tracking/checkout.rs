//! Completed-order capture for the thank-you page.
//!
//! The checkout observer builds a [`CheckoutEvent`] from the just-placed
//! order and parks it in a [`CheckoutEventSlot`]; the success page takes it
//! exactly once and relays it. Taking clears the slot, so a page refresh
//! cannot double-fire the event.

use std::sync::Mutex;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::state::ConnectionState;

/// Snapshot of a placed order, as read from the platform's sales records.
#[derive(Debug, Clone)]
pub struct Order {
    /// Human-facing order number.
    pub increment_id: String,
    /// Grand total in the order currency.
    pub grand_total: Decimal,
    /// Order currency (ISO 4217).
    pub currency_code: String,
    /// Visible order lines.
    pub items: Vec<OrderItem>,
}

/// One visible order line.
#[derive(Debug, Clone)]
pub struct OrderItem {
    /// Purchased product id.
    pub product_id: String,
    /// Product name at purchase time.
    pub name: String,
    /// Ordered quantity.
    pub quantity: u32,
    /// Unit price in the order currency.
    pub price: Decimal,
}

/// Body of a checkout pixel POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutEvent {
    /// The merchant id the event is attributed to.
    pub account_id: String,
    /// Human-facing order number.
    pub order_id: String,
    /// Grand total, formatted to two decimals.
    pub total_price: String,
    /// Order currency (ISO 4217).
    pub currency_code: String,
    /// Purchased lines.
    pub line_items: Vec<CheckoutLineItem>,
}

/// One purchased line on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLineItem {
    /// Purchased product id.
    pub product_id: String,
    /// Product name at purchase time.
    pub title: String,
    /// Ordered quantity.
    pub quantity: u32,
    /// Unit price, formatted to two decimals.
    pub price: String,
}

impl CheckoutEvent {
    /// Builds the event for a placed order, or `None` when nothing must be
    /// emitted: store not connected, no merchant id, or an order without an
    /// order number (nothing was actually placed).
    #[must_use]
    pub fn from_order(state: &ConnectionState, order: &Order) -> Option<Self> {
        if !state.is_linked() || order.increment_id.is_empty() {
            return None;
        }

        Some(Self {
            account_id: state.merchant_id.clone(),
            order_id: order.increment_id.clone(),
            total_price: format_amount(order.grand_total),
            currency_code: order.currency_code.clone(),
            line_items: order
                .items
                .iter()
                .map(|item| CheckoutLineItem {
                    product_id: item.product_id.clone(),
                    title: item.name.clone(),
                    quantity: item.quantity,
                    price: format_amount(item.price),
                })
                .collect(),
        })
    }
}

/// Formats a monetary amount with exactly two decimals, rounding halves away
/// from zero the way storefront totals are displayed.
fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Hands a checkout event from the observer to the success page, at most
/// once.
#[derive(Debug, Default)]
pub struct CheckoutEventSlot {
    event: Mutex<Option<CheckoutEvent>>,
}

impl CheckoutEventSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks an event, replacing any event not yet taken.
    ///
    /// # Panics
    ///
    /// Panics if the slot mutex was poisoned by a panicking thread.
    pub fn put(&self, event: CheckoutEvent) {
        *self.event.lock().expect("checkout slot poisoned") = Some(event);
    }

    /// Takes the parked event, clearing the slot so a second read (a page
    /// refresh) observes nothing.
    ///
    /// # Panics
    ///
    /// Panics if the slot mutex was poisoned by a panicking thread.
    #[must_use]
    pub fn take(&self) -> Option<CheckoutEvent> {
        self.event.lock().expect("checkout slot poisoned").take()
    }
}
