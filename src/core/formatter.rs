/// Returns "$12.34".
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Returns "$12.34" for a positive limit, "∞" otherwise.
pub fn format_limit(limit: Option<f64>) -> String {
    match limit {
        Some(l) if l > 0.0 => format_currency(l),
        _ => "∞".to_string(),
    }
}

/// Returns "85.0%" for an already clamped ratio.
pub fn format_percent(ratio_percent: f64) -> String {
    format!("{:.1}%", ratio_percent)
}

/// Returns "[████████░░░░]" where █ = used portion, ░ = headroom.
/// Width is the number of block characters inside the brackets.
pub fn format_usage_bar(used_percent: f64, width: usize) -> String {
    let used_percent = used_percent.clamp(0.0, 100.0);
    let used_blocks = ((used_percent / 100.0) * width as f64).round() as usize;
    let free_blocks = width.saturating_sub(used_blocks);

    format!("[{}{}]", "█".repeat(used_blocks), "░".repeat(free_blocks))
}

/// Shorten long key names to "first10...last6".
pub fn short_label(label: &str) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= 20 {
        return label.to_string();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{}...{}", head, tail)
}
