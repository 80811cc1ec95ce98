//! Presentation strings shared by every renderer: `$1,234.56` and `4.50%`.

use crate::types::{Money, Rate};

/// Format an amount as dollars with thousands separators and 2 decimals.
pub fn format_currency(amount: Money) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // -0.004 prints as $0.00, not -$0.00
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// Format a fraction as a percentage with 2 decimals (0.045 -> "4.50%").
pub fn format_percent(rate: Rate) -> String {
    format!("{:.2}%", rate * 100.0)
}
