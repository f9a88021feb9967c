//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shortened URL with its creation metadata.
///
/// Links are never deleted. An expired link stays in the store and keeps its
/// analytics; it simply stops resolving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: i64,
    #[serde(rename = "shortCode")]
    pub code: String,
    #[serde(rename = "originalUrl")]
    pub destination: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub owner_identity: String,
    pub is_custom: bool,
}

impl Link {
    /// Returns true if the link's expiry lies strictly before `now`.
    ///
    /// Links without an expiry never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub code: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub owner_identity: String,
    pub is_custom: bool,
}

impl NewLink {
    /// Builds the stored representation once the store has assigned an id.
    pub fn into_link(self, id: i64) -> Link {
        Link {
            id,
            code: self.code,
            destination: self.destination,
            created_at: self.created_at,
            expires_at: self.expires_at,
            click_count: 0,
            owner_identity: self.owner_identity,
            is_custom: self.is_custom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link_expiring(expires_at: Option<DateTime<Utc>>) -> Link {
        NewLink {
            code: "abc123".to_string(),
            destination: "https://example.com".to_string(),
            created_at: Utc::now(),
            expires_at,
            owner_identity: "203.0.113.7".to_string(),
            is_custom: false,
        }
        .into_link(1)
    }

    #[test]
    fn test_link_without_expiry_never_expires() {
        let link = link_expiring(None);
        assert!(!link.is_expired_at(Utc::now() + Duration::days(36500)));
    }

    #[test]
    fn test_link_is_expired_after_deadline() {
        let now = Utc::now();
        let link = link_expiring(Some(now - Duration::seconds(1)));
        assert!(link.is_expired_at(now));
    }

    #[test]
    fn test_link_not_expired_at_exact_deadline() {
        let now = Utc::now();
        let link = link_expiring(Some(now));
        assert!(!link.is_expired_at(now));
    }

    #[test]
    fn test_new_link_starts_with_zero_clicks() {
        let link = link_expiring(None);
        assert_eq!(link.id, 1);
        assert_eq!(link.click_count, 0);
        assert!(!link.is_custom);
    }

    #[test]
    fn test_link_json_shape() {
        let link = link_expiring(None);
        let json = serde_json::to_value(&link).unwrap();

        assert_eq!(json["shortCode"], "abc123");
        assert_eq!(json["originalUrl"], "https://example.com");
        assert_eq!(json["clickCount"], 0);
        assert_eq!(json["ownerIdentity"], "203.0.113.7");
        assert_eq!(json["isCustom"], false);
        assert!(json.get("expiresAt").is_none());
    }
}
