//! Countdown records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CountdownError, Result};

/// Client payload for creating a countdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownInput {
    pub title: String,
    #[serde(default)]
    pub social_accounts: Option<Vec<String>>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub cta_url: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD` date
    pub expiration: String,
    #[serde(default)]
    pub expired_text: Option<String>,
    #[serde(default)]
    pub expired_image_url: Option<String>,
    #[serde(default)]
    pub expired_cta_url: Option<String>,
}

/// A stored countdown page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub id: Uuid,
    pub title: String,
    pub social_accounts: Vec<String>,
    pub text: String,
    pub image_url: String,
    pub cta_url: String,
    pub expiration: DateTime<Utc>,
    pub expired_text: String,
    pub expired_image_url: String,
    pub expired_cta_url: String,
    pub created_at: DateTime<Utc>,
}

impl Countdown {
    /// Validate `input` and build a new record with defaults filled in.
    pub fn from_input(input: CountdownInput, id: Uuid, now: DateTime<Utc>) -> Result<Self> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(CountdownError::Validation("title must not be empty".to_string()));
        }
        let expiration = parse_expiration(&input.expiration)?;

        Ok(Self {
            id,
            title: title.to_string(),
            social_accounts: input.social_accounts.unwrap_or_default(),
            text: input.text.unwrap_or_default(),
            image_url: input.image_url.unwrap_or_default(),
            cta_url: input.cta_url.unwrap_or_default(),
            expiration,
            expired_text: input.expired_text.unwrap_or_default(),
            expired_image_url: input.expired_image_url.unwrap_or_default(),
            expired_cta_url: input.expired_cta_url.unwrap_or_default(),
            created_at: now,
        })
    }
}

/// Parse an RFC 3339 timestamp, or a bare date taken as midnight UTC.
fn parse_expiration(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| CountdownError::Validation(format!("invalid expiration: {:?}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, expiration: &str) -> CountdownInput {
        CountdownInput {
            title: title.to_string(),
            expiration: expiration.to_string(),
            ..CountdownInput::default()
        }
    }

    #[test]
    fn test_defaults_filled_in() {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let countdown =
            Countdown::from_input(input("Launch", "2030-01-01T12:00:00Z"), id, now).unwrap();

        assert_eq!(countdown.id, id);
        assert_eq!(countdown.title, "Launch");
        assert!(countdown.social_accounts.is_empty());
        assert_eq!(countdown.cta_url, "");
        assert_eq!(countdown.created_at, now);
    }

    #[test]
    fn test_expiration_normalized_to_utc() {
        let countdown = Countdown::from_input(
            input("Launch", "2030-01-01T12:00:00+02:00"),
            Uuid::new_v4(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(countdown.expiration.to_rfc3339(), "2030-01-01T10:00:00+00:00");
    }

    #[test]
    fn test_bare_date_expiration() {
        let countdown =
            Countdown::from_input(input("Launch", "2030-01-01"), Uuid::new_v4(), Utc::now())
                .unwrap();
        assert_eq!(countdown.expiration.to_rfc3339(), "2030-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_blank_title_rejected() {
        let result = Countdown::from_input(input("   ", "2030-01-01"), Uuid::new_v4(), Utc::now());
        assert!(matches!(result, Err(CountdownError::Validation(_))));
    }

    #[test]
    fn test_bad_expiration_rejected() {
        let result = Countdown::from_input(input("Launch", "soon"), Uuid::new_v4(), Utc::now());
        assert!(matches!(result, Err(CountdownError::Validation(_))));
    }

    #[test]
    fn test_input_accepts_camel_case() {
        let parsed: CountdownInput = serde_json::from_value(serde_json::json!({
            "title": "Launch",
            "expiration": "2030-01-01",
            "socialAccounts": ["@launch"],
            "expiredCtaUrl": "https://example.com"
        }))
        .unwrap();

        assert_eq!(parsed.social_accounts, Some(vec!["@launch".to_string()]));
        assert_eq!(parsed.expired_cta_url.as_deref(), Some("https://example.com"));
    }
}
