//! Admin trigger boundary.
//!
//! Input validation and the data behind the settings/status surface. The
//! connect form's merchant id is validated here, before any core component
//! runs; the workflow itself assumes valid input.

use crate::{
    error::{BridgeError, Result},
    state::ConnectionState,
};

/// Channel3 dashboard landing page, shown while disconnected.
pub const DASHBOARD_URL: &str = "https://trychannel3.com/dashboard";

/// Validates a submitted merchant id: exactly 4 ASCII alphanumeric
/// characters after trimming surrounding whitespace.
///
/// # Errors
///
/// Returns [`BridgeError::InvalidMerchantId`], whose message is the exact
/// guidance shown on the settings form.
pub fn validate_merchant_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(trimmed.to_owned())
    } else {
        Err(BridgeError::InvalidMerchantId)
    }
}

/// Data behind the settings/status page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsView {
    /// Whether the store is linked.
    pub connected: bool,
    /// The linked merchant id, or empty.
    pub merchant_id: String,
    /// Where "open dashboard" points: the merchant's ingest page when
    /// linked, the generic dashboard otherwise.
    pub dashboard_url: String,
}

impl SettingsView {
    /// Builds the view from the persisted connection state.
    #[must_use]
    pub fn from_state(state: &ConnectionState) -> Self {
        let dashboard_url = if state.is_linked() {
            format!("https://trychannel3.com/brands/{}/ingest", state.merchant_id)
        } else {
            DASHBOARD_URL.to_owned()
        };

        Self {
            connected: state.connected,
            merchant_id: state.merchant_id.clone(),
            dashboard_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_accepts_valid_ids() {
        assert_eq!(validate_merchant_id("AB12").unwrap(), "AB12");
        assert_eq!(validate_merchant_id("wxyz").unwrap(), "wxyz");
        assert_eq!(validate_merchant_id("0000").unwrap(), "0000");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(validate_merchant_id("  AB12\n").unwrap(), "AB12");
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(validate_merchant_id("").is_err());
        assert!(validate_merchant_id("ABC").is_err());
        assert!(validate_merchant_id("ABCDE").is_err());
    }

    #[test]
    fn test_rejects_non_alphanumeric() {
        assert!(validate_merchant_id("AB-1").is_err());
        assert!(validate_merchant_id("AB 1").is_err());
        assert!(validate_merchant_id("AB1é").is_err());
    }

    #[test]
    fn test_settings_view_when_linked() {
        let state = ConnectionState { connected: true, merchant_id: "AB12".to_owned() };
        let view = SettingsView::from_state(&state);
        assert!(view.connected);
        assert_eq!(view.dashboard_url, "https://trychannel3.com/brands/AB12/ingest");
    }

    #[test]
    fn test_settings_view_when_disconnected() {
        let view = SettingsView::from_state(&ConnectionState::default());
        assert!(!view.connected);
        assert!(view.merchant_id.is_empty());
        assert_eq!(view.dashboard_url, DASHBOARD_URL);
    }

    proptest! {
        #[test]
        fn prop_valid_ids_round_trip(id in "[A-Za-z0-9]{4}") {
            prop_assert_eq!(validate_merchant_id(&id).unwrap(), id);
        }

        #[test]
        fn prop_wrong_lengths_rejected(id in "[A-Za-z0-9]{0,3}|[A-Za-z0-9]{5,8}") {
            prop_assert!(validate_merchant_id(&id).is_err());
        }

        #[test]
        fn prop_never_panics(id in "\\PC*") {
            let _ = validate_merchant_id(&id);
        }
    }
}
