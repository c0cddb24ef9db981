//! Derivation of display facts from a single credential record.
//!
//! Everything here is a pure function of its arguments. The only time input
//! is the explicit `now` parameter; nothing reads the system clock.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::core::models::credential::{CredentialRecord, RateLimit, ResetCadence};
use crate::core::models::facts::{DisplayFacts, ThresholdState};

/// Fraction of the hard limit at which a key counts as near its limit.
const NEAR_LIMIT_FRACTION: f64 = 0.8;

/// Provider sentinel for "no request limit".
const UNLIMITED_REQUESTS: i64 = -1;

/// Usage counter for the window selected by the key's reset cadence.
/// Anything other than daily/weekly/monthly falls back to all-time usage.
pub fn current_usage(record: &CredentialRecord) -> f64 {
    match record.limit_reset {
        Some(ResetCadence::Daily) => record.usage_daily,
        Some(ResetCadence::Weekly) => record.usage_weekly,
        Some(ResetCadence::Monthly) => record.usage_monthly,
        _ => record.usage,
    }
}

/// The limit as a usable denominator, or `None` when the key is unlimited.
fn effective_limit(limit: Option<f64>) -> Option<f64> {
    limit.filter(|l| *l > 0.0)
}

/// Percentage of `limit` consumed by `usage`, clamped to 0.0 - 100.0.
/// A missing or non-positive limit yields 0.0.
pub fn usage_ratio_percent(usage: f64, limit: Option<f64>) -> f64 {
    let Some(limit) = effective_limit(limit) else {
        return 0.0;
    };
    let ratio = usage / limit * 100.0;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 100.0)
}

/// Severity of `usage` against `limit`, compared on raw values so usage
/// beyond the limit is still reported after the percentage is clamped.
pub fn classify_threshold(usage: f64, limit: Option<f64>) -> ThresholdState {
    match effective_limit(limit) {
        Some(limit) if usage >= limit => ThresholdState::OverLimit,
        Some(limit) if usage >= limit * NEAR_LIMIT_FRACTION => ThresholdState::NearLimit,
        _ => ThresholdState::Normal,
    }
}

/// Naive date-time layouts read as UTC, tried in order.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a provider timestamp. Accepts RFC 3339, ISO-8601 with minute
/// precision (with or without `Z`/offset), naive date-times taken as UTC,
/// and a bare date taken as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = raw.strip_suffix(['Z', 'z']).unwrap_or(raw);
    if let Some(dt) = NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(naive, layout).ok())
    {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Human-readable expiry horizon of `expires_at` as seen from `now`.
pub fn describe_expiry(expires_at: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(raw) = expires_at else {
        return "Never expires".to_string();
    };
    let Some(expires) = parse_timestamp(raw) else {
        return "Never expires".to_string();
    };

    let remaining = expires - now;
    if remaining < chrono::Duration::zero() {
        return "Expired".to_string();
    }

    let days = remaining.num_days();
    let hours = remaining.num_hours() % 24;

    if days > 0 {
        if hours > 0 {
            format!("Expires in {} {}", plural(days, "day"), plural(hours, "hour"))
        } else {
            format!("Expires in {}", plural(days, "day"))
        }
    } else if hours > 0 {
        format!("Expires in {}", plural(hours, "hour"))
    } else {
        "Expiring soon".to_string()
    }
}

pub fn describe_rate_limit(rate_limit: Option<&RateLimit>) -> String {
    match rate_limit {
        Some(rl) if rl.requests != UNLIMITED_REQUESTS => {
            format!("{} per {}", rl.requests, rl.interval)
        }
        _ => "Unlimited".to_string(),
    }
}

pub fn describe_reset_cadence(cadence: Option<&ResetCadence>) -> String {
    match cadence {
        None | Some(ResetCadence::None) => "No reset cadence".to_string(),
        Some(ResetCadence::Daily) => "Resets daily at 00:00 UTC".to_string(),
        Some(ResetCadence::Weekly) => "Resets every Monday".to_string(),
        Some(ResetCadence::Monthly) => "Resets on the 1st of each month".to_string(),
        Some(ResetCadence::Other(raw)) => raw.clone(),
    }
}

/// Compute every display fact for `record` at instant `now`.
pub fn derive(record: &CredentialRecord, now: DateTime<Utc>) -> DisplayFacts {
    let usage = current_usage(record);
    DisplayFacts {
        current_usage: usage,
        usage_ratio_percent: usage_ratio_percent(usage, record.limit),
        threshold_state: classify_threshold(usage, record.limit),
        expiry_description: describe_expiry(record.expires_at.as_deref(), now),
        rate_limit_description: describe_rate_limit(record.rate_limit.as_ref()),
        reset_cadence_description: describe_reset_cadence(record.limit_reset.as_ref()),
    }
}
