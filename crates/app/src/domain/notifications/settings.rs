//! Notification Settings

use jiff::SignedDuration;

pub const DEFAULT_STOREFRONT_URL: &str = "http://localhost:3000";
pub const DEFAULT_RESERVATION_MINUTES: u32 = 30;

/// Where notification links point and how long a restock reservation is held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    storefront_url: String,
    reservation_minutes: u32,
}

impl NotificationSettings {
    #[must_use]
    pub fn new(storefront_url: impl Into<String>, reservation_minutes: u32) -> Self {
        let storefront_url: String = storefront_url.into();

        Self {
            storefront_url: storefront_url.trim_end_matches('/').to_string(),
            reservation_minutes,
        }
    }

    /// Storefront base URL without a trailing slash.
    #[must_use]
    pub fn storefront_url(&self) -> &str {
        &self.storefront_url
    }

    #[must_use]
    pub fn reservation_minutes(&self) -> u32 {
        self.reservation_minutes
    }

    #[must_use]
    pub fn reservation_window(&self) -> SignedDuration {
        SignedDuration::from_mins(i64::from(self.reservation_minutes))
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self::new(DEFAULT_STOREFRONT_URL, DEFAULT_RESERVATION_MINUTES)
    }
}
