use chrono::{DateTime, Local, TimeZone, Utc};

use crate::types::Amount;

/// Anything the explorer shows as a coin amount.
pub trait AmountLike {
    /// Finite numeric value, or `None` when missing or not a number.
    fn amount_value(&self) -> Option<f64>;
}

impl AmountLike for f64 {
    fn amount_value(&self) -> Option<f64> {
        self.is_finite().then_some(*self)
    }
}

impl AmountLike for u64 {
    fn amount_value(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl AmountLike for i64 {
    fn amount_value(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl AmountLike for str {
    fn amount_value(&self) -> Option<f64> {
        Amount::from_decimal_str(self).to_f64()
    }
}

impl AmountLike for String {
    fn amount_value(&self) -> Option<f64> {
        self.as_str().amount_value()
    }
}

impl AmountLike for Amount {
    fn amount_value(&self) -> Option<f64> {
        self.to_f64()
    }
}

impl<T: AmountLike + ?Sized> AmountLike for &T {
    fn amount_value(&self) -> Option<f64> {
        (**self).amount_value()
    }
}

impl<T: AmountLike> AmountLike for Option<T> {
    fn amount_value(&self) -> Option<f64> {
        self.as_ref().and_then(|v| v.amount_value())
    }
}

/// Format a coin amount with thousands separators and up to 8 fraction
/// digits, no forced minimum. Missing or non-numeric input renders as "0".
/// Examples: "1,234.5", "0.00000001", "6"
pub fn format_amount(amount: impl AmountLike) -> String {
    let Some(value) = amount.amount_value() else {
        return "0".to_string();
    };

    let fixed = format!("{:.8}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Unix seconds as a local date-time, e.g. "3/10/2024, 2:05:09 PM".
///
/// The time zone is the host's, the layout is always en-US (month/day/year,
/// 12-hour clock) whatever the host locale, so output is stable across
/// machines.
pub fn format_time(timestamp: i64) -> String {
    format_time_in(timestamp, &Local)
}

/// [`format_time`] in an explicit zone. Same fixed en-US layout;
/// "-" when the timestamp is out of range.
pub fn format_time_in<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(dt) => dt
            .with_timezone(tz)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string(),
        None => "-".to_string(),
    }
}

/// "N days ago" down to "Just now", finest whole unit wins.
pub fn format_time_ago(timestamp: Option<i64>) -> String {
    format_time_ago_at(timestamp, Utc::now().timestamp_millis())
}

pub fn format_time_ago_at(timestamp: Option<i64>, now_ms: i64) -> String {
    let Some(ts) = timestamp else {
        return "Unknown time".to_string();
    };
    let diff_ms = now_ms - ts.saturating_mul(1000);
    let minutes = diff_ms.div_euclid(60_000);
    let hours = minutes.div_euclid(60);
    let days = hours.div_euclid(24);

    let plural = |n: i64| if n > 1 { "s" } else { "" };
    if days > 0 {
        format!("{days} day{} ago", plural(days))
    } else if hours > 0 {
        format!("{hours} hour{} ago", plural(hours))
    } else if minutes > 0 {
        format!("{minutes} minute{} ago", plural(minutes))
    } else {
        "Just now".to_string()
    }
}

/// Rough network hash rate derived from difficulty, two decimals with SI suffix.
/// Examples: "6.20 MH/s", "1.50 GH/s"
pub fn calculate_hash_rate(difficulty: f64) -> String {
    const KILO: f64 = 1e3;
    const MEGA: f64 = 1e6;
    const GIGA: f64 = 1e9;
    const TERA: f64 = 1e12;

    let hash_rate = if difficulty.is_finite() {
        difficulty * MEGA
    } else {
        0.0
    };
    if hash_rate >= TERA {
        format!("{:.2} TH/s", hash_rate / TERA)
    } else if hash_rate >= GIGA {
        format!("{:.2} GH/s", hash_rate / GIGA)
    } else if hash_rate >= MEGA {
        format!("{:.2} MH/s", hash_rate / MEGA)
    } else if hash_rate >= KILO {
        format!("{:.2} KH/s", hash_rate / KILO)
    } else {
        format!("{hash_rate:.2} H/s")
    }
}
