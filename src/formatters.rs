//! Display formatters (zh-CN conventions)

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt::Display;

pub const INVALID_DATE: &str = "无效日期";

const DATE_FORMAT: &str = "%Y/%m/%d";
const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// `YYYY/MM/DD` in the date's own timezone
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    date.format(DATE_FORMAT).to_string()
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` and format it
pub fn format_date_str(input: &str) -> String {
    let input = input.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return format_date(&date);
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return date.format(DATE_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.format(DATE_FORMAT).to_string();
    }

    INVALID_DATE.to_string()
}

/// Format a Unix timestamp in milliseconds (UTC)
pub fn format_timestamp_ms(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|date| format_date(&date))
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

pub fn format_relative_time(date: DateTime<Utc>) -> String {
    format_relative_time_from(date, Utc::now())
}

/// Relative phrasing up to a week, the plain date after that. Future dates
/// read as "just now".
pub fn format_relative_time_from(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(date);
    let minutes = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if minutes < 1 {
        "刚刚".to_string()
    } else if minutes < 60 {
        format!("{}分钟前", minutes)
    } else if hours < 24 {
        format!("{}小时前", hours)
    } else if days < 7 {
        format!("{}天前", days)
    } else {
        format_date(&date)
    }
}

/// Binary units, at most two decimals with trailing zeros dropped
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{} {}", trim_fraction(&format!("{:.2}", value)), SIZE_UNITS[unit])
}

/// Thousands separators, up to three decimals
pub fn format_number(value: f64) -> String {
    format_grouped(value, 0, 3)
}

/// Currency with its zh-CN symbol; `CNY` is the usual choice
pub fn format_currency(amount: f64, currency: &str) -> String {
    let code = currency.to_uppercase();
    let (symbol, decimals) = match code.as_str() {
        "CNY" => ("¥".to_string(), 2),
        "USD" => ("US$".to_string(), 2),
        "EUR" => ("€".to_string(), 2),
        "GBP" => ("£".to_string(), 2),
        "JPY" => ("JP¥".to_string(), 0),
        other => (format!("{} ", other), 2),
    };

    let body = format_grouped(amount.abs(), decimals, decimals);
    if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}{}", symbol, body)
    } else {
        format!("{}{}", symbol, body)
    }
}

/// `0.256` → `25.6%` with one decimal
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{}%", format_grouped(value * 100.0, decimals, decimals))
}

/// Cut to `max_length` characters including the suffix
pub fn truncate_text(text: &str, max_length: usize, suffix: &str) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let keep = max_length.saturating_sub(suffix.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(suffix);
    out
}

/// Mainland mobile numbers (11 digits) become `3-4-4`; anything else is
/// returned untouched
pub fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    if digits.len() == 11 {
        format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..])
    } else {
        phone.to_string()
    }
}

/// Keep `start` leading and `end` trailing characters, mask the rest
pub fn mask_sensitive_info(text: &str, start: usize, end: usize, mask: char) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= start + end {
        return text.to_string();
    }

    let masked = chars.len() - start - end;
    let mut out: String = chars[..start].iter().collect();
    out.extend(std::iter::repeat(mask).take(masked));
    out.extend(&chars[chars.len() - end..]);
    out
}

fn format_grouped(value: f64, min_fraction: usize, max_fraction: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let fixed = format!("{:.*}", max_fraction, value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut fraction = fraction.trim_end_matches('0').to_string();
    while fraction.len() < min_fraction {
        fraction.push('0');
    }

    let mut out = String::new();
    let is_zero = integer.chars().all(|c| c == '0') && fraction.chars().all(|c| c == '0');
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(integer));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(&fraction);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn trim_fraction(fixed: &str) -> String {
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        fixed.to_string()
    }
}
