use colored::{control, ColoredString, Colorize};
use serde::Serialize;

use crate::cli::listing::KeyView;
use crate::core::formatter::{
    format_currency, format_limit, format_percent, format_usage_bar, short_label,
};
use crate::core::models::facts::{DisplayFacts, ThresholdState};

const BAR_WIDTH: usize = 20;

/// Render one key as a colored (or plain) block.
///
/// Layout:
/// ```text
///  prod-backend                                    NEAR LIMIT
///   sk-or-v1-0e6...1c96
///   Usage     [█████████████████░░░] 85.0%
///             $85.00 / $100.00
///   Requests  Unlimited
///   Expiry    Expires in 2 days
///   Reset     Resets daily at 00:00 UTC
/// ```
pub fn render_key(view: &KeyView, show_all: bool, use_color: bool) -> String {
    control::set_override(use_color);

    let record = &view.record;
    let facts = &view.facts;
    let mut lines: Vec<String> = Vec::new();

    let title = format!(" {}", short_label(record.identity()));
    let header = match badge(facts.threshold_state) {
        Some(badge) => format!("{}  {}", title.bold(), badge),
        None => title.bold().to_string(),
    };
    lines.push(header);

    if record.disabled {
        lines.push(format!("  {}", "(disabled)".dimmed()));
    }
    if let Some(label) = record.label.as_deref().filter(|l| *l != record.identity()) {
        lines.push(format!("  {}", label.dimmed()));
    }

    let bar = color_by_state(
        facts.threshold_state,
        &format_usage_bar(facts.usage_ratio_percent, BAR_WIDTH),
    );
    lines.push(format!(
        "  {}  {} {}",
        "Usage   ".cyan(),
        bar,
        format_percent(facts.usage_ratio_percent)
    ));

    let spend = format!(
        "{} / {}",
        format_currency(facts.current_usage),
        format_limit(record.limit)
    );
    let spend = if facts.threshold_state == ThresholdState::OverLimit {
        spend.red().bold()
    } else {
        spend.normal()
    };
    lines.push(format!("            {}", spend));

    lines.push(format!("  {}  {}", "Requests".cyan(), facts.rate_limit_description));
    lines.push(format!("  {}  {}", "Expiry  ".cyan(), expiry_line(record.expires_at.is_some(), facts)));
    lines.push(format!(
        "  {}  {}",
        "Reset   ".cyan(),
        facts.reset_cadence_description.dimmed()
    ));

    if show_all {
        if let Some(remaining) = record.limit_remaining {
            lines.push(format!("  {}  {}", "Remain  ".cyan(), format_currency(remaining)));
        }
        lines.push(format!(
            "  {}  {} total, {} today, {} week, {} month",
            "All-time".cyan(),
            format_currency(record.usage),
            format_currency(record.usage_daily),
            format_currency(record.usage_weekly),
            format_currency(record.usage_monthly)
        ));
        let byok_suffix = if record.include_byok_in_limit {
            " (counts toward limit)"
        } else {
            ""
        };
        lines.push(format!(
            "  {}  {} total, {} month{}",
            "BYOK    ".cyan(),
            format_currency(record.byok_usage),
            format_currency(record.byok_usage_monthly),
            byok_suffix
        ));
        if let Some(hash) = record.hash.as_deref() {
            lines.push(format!("  {}  {}", "Hash    ".cyan(), short_label(hash).dimmed()));
        }
    }

    lines.join("\n")
}

fn badge(state: ThresholdState) -> Option<ColoredString> {
    match state {
        ThresholdState::OverLimit => Some("LIMIT EXCEEDED".red().bold()),
        ThresholdState::NearLimit => Some("NEAR LIMIT".yellow().bold()),
        ThresholdState::Normal => None,
    }
}

fn color_by_state(state: ThresholdState, text: &str) -> ColoredString {
    match state {
        ThresholdState::OverLimit => text.red(),
        ThresholdState::NearLimit => text.yellow(),
        ThresholdState::Normal => text.blue(),
    }
}

fn expiry_line(has_expiry: bool, facts: &DisplayFacts) -> ColoredString {
    if has_expiry {
        facts.expiry_description.normal()
    } else {
        facts.expiry_description.green()
    }
}

/// Render the whole listing, or a hint when there is nothing to show.
pub fn render_keys(views: &[KeyView], show_all: bool, use_color: bool) -> String {
    control::set_override(use_color);
    if views.is_empty() {
        return format!(
            "{}\n{}",
            "No API keys found".bold(),
            "Check the provisioning key and filters.".dimmed()
        );
    }
    views
        .iter()
        .map(|v| render_key(v, show_all, use_color))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render a retrieval failure verbatim.
pub fn render_error(message: &str, use_color: bool) -> String {
    control::set_override(use_color);
    format!("{}\n  {}", " Failed to load keys".bold(), message.red())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyPayload<'a> {
    identity: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<&'a str>,
    disabled: bool,
    limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit_remaining: Option<f64>,
    facts: &'a DisplayFacts,
}

pub fn render_json(views: &[KeyView], pretty: bool) -> serde_json::Result<String> {
    let payloads: Vec<KeyPayload> = views
        .iter()
        .map(|v| KeyPayload {
            identity: v.record.identity(),
            label: v.record.label.as_deref(),
            hash: v.record.hash.as_deref(),
            disabled: v.record.disabled,
            limit: v.record.limit,
            limit_remaining: v.record.limit_remaining,
            facts: &v.facts,
        })
        .collect();

    if pretty {
        serde_json::to_string_pretty(&payloads)
    } else {
        serde_json::to_string(&payloads)
    }
}
