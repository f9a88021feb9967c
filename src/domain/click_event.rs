//! Click event model for asynchronous click accounting.

use chrono::{DateTime, Utc};

use crate::domain::entities::NewClick;

/// A redirect that still has to be accounted for.
///
/// Built by the redirect handler from request metadata and handed to the
/// background worker through a bounded channel, so the redirect response never
/// waits on geolocation or database writes.
///
/// `observed_at` is captured when the redirect is served, not when the worker
/// gets to the event.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub code: String,
    pub client_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a new click event.
    ///
    /// Empty header values are stored as absent.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let event = ClickEvent::new(
    ///     "abc123".to_string(),
    ///     Some("203.0.113.7".to_string()),
    ///     Some("Mozilla/5.0"),
    ///     Some("https://google.com"),
    ///     Utc::now(),
    /// );
    /// ```
    pub fn new(
        code: String,
        client_address: Option<String>,
        user_agent: Option<&str>,
        referrer: Option<&str>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        let non_empty = |s: Option<&str>| s.filter(|v| !v.is_empty()).map(str::to_string);

        Self {
            code,
            client_address: client_address.filter(|v| !v.is_empty()),
            user_agent: non_empty(user_agent),
            referrer: non_empty(referrer),
            observed_at,
        }
    }

    /// Converts the event into a log row with the resolved location.
    pub fn into_new_click(self, country: String, city: String) -> NewClick {
        NewClick {
            link_code: self.code,
            client_address: self.client_address,
            user_agent: self.user_agent,
            referrer: self.referrer,
            country: Some(country),
            city: Some(city),
            observed_at: self.observed_at,
        }
    }
}
