use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::core::engine;
use crate::core::models::credential::CredentialRecord;
use crate::core::models::facts::{DisplayFacts, ThresholdState};

/// A record paired with the facts derived for it in this run.
pub struct KeyView {
    pub record: CredentialRecord,
    pub facts: DisplayFacts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Usage,
    Ratio,
    Expiry,
}

impl SortKey {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "usage" => Some(Self::Usage),
            "ratio" | "percent" => Some(Self::Ratio),
            "expiry" | "expires" => Some(Self::Expiry),
            _ => None,
        }
    }
}

pub fn parse_state(id: &str) -> Option<ThresholdState> {
    match id.to_lowercase().as_str() {
        "normal" => Some(ThresholdState::Normal),
        "near" | "near_limit" | "nearlimit" => Some(ThresholdState::NearLimit),
        "over" | "over_limit" | "overlimit" => Some(ThresholdState::OverLimit),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub include_disabled: bool,
    pub text: Option<String>,
    pub state: Option<ThresholdState>,
}

/// Drop filtered records, derive facts for the rest with one shared `now`,
/// then sort.
pub fn build_views(
    records: Vec<CredentialRecord>,
    filter: &ListFilter,
    sort: SortKey,
    now: DateTime<Utc>,
) -> Vec<KeyView> {
    let needle = filter.text.as_deref().map(str::to_lowercase);

    let mut views: Vec<KeyView> = records
        .into_iter()
        .filter(|r| filter.include_disabled || !r.disabled)
        .filter(|r| match &needle {
            Some(n) => {
                r.identity().to_lowercase().contains(n)
                    || r.label.as_deref().is_some_and(|l| l.to_lowercase().contains(n))
            }
            None => true,
        })
        .map(|record| {
            if let Some(raw) = record.expires_at.as_deref() {
                if engine::parse_timestamp(raw).is_none() {
                    tracing::warn!(
                        key = record.identity(),
                        expires_at = raw,
                        "unparseable expiry timestamp, treating as never"
                    );
                }
            }
            let facts = engine::derive(&record, now);
            KeyView { record, facts }
        })
        .filter(|v| filter.state.map_or(true, |s| v.facts.threshold_state == s))
        .collect();

    sort_views(&mut views, sort);
    views
}

fn sort_views(views: &mut [KeyView], sort: SortKey) {
    match sort {
        SortKey::Name => {
            views.sort_by(|a, b| natural_cmp(a.record.identity(), b.record.identity()))
        }
        SortKey::Usage => views.sort_by(|a, b| {
            b.facts
                .current_usage
                .total_cmp(&a.facts.current_usage)
                .then_with(|| natural_cmp(a.record.identity(), b.record.identity()))
        }),
        SortKey::Ratio => views.sort_by(|a, b| {
            b.facts
                .usage_ratio_percent
                .total_cmp(&a.facts.usage_ratio_percent)
                .then_with(|| natural_cmp(a.record.identity(), b.record.identity()))
        }),
        SortKey::Expiry => views.sort_by(|a, b| {
            let ea = a.record.expires_at.as_deref().and_then(engine::parse_timestamp);
            let eb = b.record.expires_at.as_deref().and_then(engine::parse_timestamp);
            // Soonest first, keys that never expire last.
            match (ea, eb) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| natural_cmp(a.record.identity(), b.record.identity()))
        }),
    }
}

/// Case-insensitive comparison where runs of digits compare by value,
/// so "key-2" sorts before "key-10".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();

    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let na = take_digits(&mut ai);
                let nb = take_digits(&mut bi);
                let ord = compare_digit_runs(&na, &nb);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(ca), Some(cb)) => {
                let ord = ca.to_lowercase().cmp(cb.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                ai.next();
                bi.next();
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = it.peek().copied().filter(|c| c.is_ascii_digit()) {
        digits.push(c);
        it.next();
    }
    digits
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
