//! Utility functions and helpers

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (rest, None),
    };

    let mut result = String::new();
    let mut count = 0;
    for c in int_part.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    let grouped: String = result.chars().rev().collect();

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate an id unique within this process, e.g. `temp_1700000000000_3`
pub fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}{}_{}", prefix, millis, seq)
}

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// Render an epoch-millisecond value the way the remote API does
pub fn iso_from_millis(millis: i64) -> Option<String> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
}

/// "12s ago", "5m ago", "3h ago", "2d ago"; older than 30 days shows the date
pub fn format_relative(iso: &str, now: DateTime<Utc>) -> String {
    let Some(ts) = parse_timestamp(iso) else {
        return iso.to_string();
    };

    let secs = (now - ts).num_seconds().max(0);
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3_600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3_600)
    } else if secs < 30 * 86_400 {
        format!("{}d ago", secs / 86_400)
    } else {
        ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
    }
}

/// "Mar 4, 2024 09:15" in local time
pub fn format_full(iso: &str) -> String {
    format_full_in(iso, &Local)
}

pub fn format_full_in<Tz: TimeZone>(iso: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(iso) {
        Some(ts) => ts.with_timezone(tz).format("%b %-d, %Y %H:%M").to_string(),
        None => iso.to_string(),
    }
}

/// Shorten long addresses and hashes to `0x1234...abcd`
pub fn truncate_address(addr: &str) -> String {
    let chars: Vec<char> = addr.chars().collect();
    if chars.len() <= 12 {
        return addr.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn parse_finite(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn fixed_trimmed(value: f64, digits: usize) -> String {
    let s = format!("{:.*}", digits, value);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

/// Amount with at most 6 fraction digits and the currency label
pub fn format_amount(amount: &str, currency: &str) -> String {
    match parse_finite(amount) {
        Some(v) => format!("{} {}", format_number(fixed_trimmed(v, 6)), currency),
        None => format!("{} {}", amount, currency),
    }
}

/// Fee estimate `gas_limit * gas_price`, `None` unless both are numeric
pub fn estimate_fee(gas_limit: &str, gas_price: &str) -> Option<String> {
    let limit = parse_finite(gas_limit)?;
    let price = parse_finite(gas_price)?;
    Some(fixed_trimmed(limit * price, 12))
}

/// Quote a CSV field when it contains a delimiter, quote or line break
pub fn csv_escape(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
