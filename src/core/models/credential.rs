use serde::{Deserialize, Serialize};

/// Billing period that decides which usage counter is "current".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResetCadence {
    Daily,
    Weekly,
    Monthly,
    None,
    /// Any value the provider sends that we don't recognise, kept verbatim.
    Other(String),
}

impl From<String> for ResetCadence {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "" | "none" => Self::None,
            _ => Self::Other(raw),
        }
    }
}

impl From<ResetCadence> for String {
    fn from(cadence: ResetCadence) -> Self {
        match cadence {
            ResetCadence::Daily => "daily".to_string(),
            ResetCadence::Weekly => "weekly".to_string(),
            ResetCadence::Monthly => "monthly".to_string(),
            ResetCadence::None => "none".to_string(),
            ResetCadence::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimit {
    /// Requests allowed per interval; -1 means unlimited
    pub requests: i64,
    pub interval: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One API key as reported by the provider's key listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    /// Hard spending limit in dollars; `None` means unlimited
    #[serde(default)]
    pub limit: Option<f64>,
    #[serde(default)]
    pub limit_remaining: Option<f64>,
    #[serde(default)]
    pub limit_reset: Option<ResetCadence>,
    #[serde(default)]
    pub include_byok_in_limit: bool,
    pub usage: f64,
    pub usage_daily: f64,
    pub usage_weekly: f64,
    pub usage_monthly: f64,
    #[serde(default)]
    pub byok_usage: f64,
    #[serde(default)]
    pub byok_usage_daily: f64,
    #[serde(default)]
    pub byok_usage_weekly: f64,
    #[serde(default)]
    pub byok_usage_monthly: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Raw ISO-8601 timestamp, parsed lazily so bad values degrade to "never"
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub rate_limit: Option<RateLimit>,
}

impl CredentialRecord {
    /// Display name: `name`, then `label`, then a placeholder.
    pub fn identity(&self) -> &str {
        [self.name.as_deref(), self.label.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or("Unknown Key")
    }
}

#[derive(Debug, Deserialize)]
pub struct KeyListResponse {
    #[serde(default)]
    pub data: Vec<CredentialRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RECORD: &str = r#"{
        "hash": "f01d52606dc8f0a8303a7b5cc3fa07109c2e346cec7c0a16b40de462992ce943",
        "name": "prod-backend",
        "label": "sk-or-v1-0e6...1c96",
        "disabled": false,
        "limit": 100,
        "limit_remaining": 74.5,
        "limit_reset": "monthly",
        "include_byok_in_limit": false,
        "usage": 325.5,
        "usage_daily": 1.25,
        "usage_weekly": 8.0,
        "usage_monthly": 25.5,
        "byok_usage": 0,
        "byok_usage_daily": 0,
        "byok_usage_weekly": 0,
        "byok_usage_monthly": 0,
        "created_at": "2025-08-24T10:30:00Z",
        "updated_at": null,
        "expires_at": "2027-01-01T00:00:00Z",
        "rate_limit": { "requests": -1, "interval": "10s", "note": "deprecated" }
    }"#;

    #[test]
    fn deserialize_full_record() {
        let record: CredentialRecord = serde_json::from_str(FULL_RECORD).unwrap();
        assert_eq!(record.name.as_deref(), Some("prod-backend"));
        assert_eq!(record.limit, Some(100.0));
        assert_eq!(record.limit_reset, Some(ResetCadence::Monthly));
        assert!((record.usage_monthly - 25.5).abs() < 1e-10);
        assert_eq!(record.rate_limit.as_ref().unwrap().requests, -1);
        assert!(record.updated_at.is_none());
    }

    #[test]
    fn deserialize_minimal_record() {
        let json = r#"{
            "label": "sk-or-v1-abc",
            "limit": null,
            "limit_reset": null,
            "usage": 50,
            "usage_daily": 0,
            "usage_weekly": 0,
            "usage_monthly": 0,
            "expires_at": null
        }"#;
        let record: CredentialRecord = serde_json::from_str(json).unwrap();
        assert!(record.limit.is_none());
        assert!(record.limit_reset.is_none());
        assert!(record.expires_at.is_none());
        assert!(record.rate_limit.is_none());
        assert!(!record.disabled);
    }

    #[test]
    fn missing_usage_counter_is_rejected() {
        let json = r#"{ "label": "x", "usage": 1, "usage_daily": 0, "usage_weekly": 0 }"#;
        assert!(serde_json::from_str::<CredentialRecord>(json).is_err());
    }

    #[test]
    fn reset_cadence_parses_known_and_unknown() {
        assert_eq!(ResetCadence::from("daily".to_string()), ResetCadence::Daily);
        assert_eq!(ResetCadence::from("weekly".to_string()), ResetCadence::Weekly);
        assert_eq!(ResetCadence::from("none".to_string()), ResetCadence::None);
        assert_eq!(ResetCadence::from(String::new()), ResetCadence::None);
        assert_eq!(
            ResetCadence::from("quarterly".to_string()),
            ResetCadence::Other("quarterly".to_string())
        );
    }

    #[test]
    fn reset_cadence_serializes_back_to_raw_string() {
        let json = serde_json::to_string(&ResetCadence::Other("yearly".into())).unwrap();
        assert_eq!(json, "\"yearly\"");
        let json = serde_json::to_string(&ResetCadence::Daily).unwrap();
        assert_eq!(json, "\"daily\"");
    }

    #[test]
    fn identity_prefers_name_then_label() {
        let mut record: CredentialRecord = serde_json::from_str(FULL_RECORD).unwrap();
        assert_eq!(record.identity(), "prod-backend");
        record.name = Some(String::new());
        assert_eq!(record.identity(), "sk-or-v1-0e6...1c96");
        record.label = None;
        assert_eq!(record.identity(), "Unknown Key");
    }

    #[test]
    fn key_list_without_data_is_empty() {
        let resp: KeyListResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.data.is_empty());
    }
}
