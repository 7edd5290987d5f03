//! Mapping of loosely-shaped API records onto the canonical `Tx`
//!
//! Records from different backends name the same field differently
//! (`txHash` vs `hash`, `sender` vs `from`, ...). Each canonical field
//! has an ordered list of candidate keys. The first candidate holding a
//! usable value wins. Values of the wrong JSON type are skipped.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::models::{Amount, Tx};
use super::types::TxStatus;

const ID_KEYS: &[&str] = &["id", "_id"];
const HASH_KEYS: &[&str] = &["hash", "txHash"];
const FROM_KEYS: &[&str] = &["from", "fromAddress", "sender"];
const TO_KEYS: &[&str] = &["to", "toAddress", "recipient"];
const AMOUNT_KEYS: &[&str] = &["amount", "value"];
const TIMESTAMP_KEYS: &[&str] = &["timestamp", "createdAt"];

/// First candidate usable as text. Numbers are rendered as decimal text.
fn text_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Like [`text_field`], but an empty string falls through to the next key
fn id_field(raw: &Value) -> Option<String> {
    ID_KEYS.iter().find_map(|key| match raw.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn raw_field<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(key))
        .find(|v| matches!(v, Value::String(_) | Value::Number(_)))
}

fn amount_field(raw: &Value) -> Amount {
    match raw_field(raw, AMOUNT_KEYS) {
        Some(Value::Number(n)) => Amount::Number(n.clone()),
        Some(Value::String(s)) => Amount::Text(s.clone()),
        _ => Amount::default(),
    }
}

/// Strings are kept as-is, numbers are epoch milliseconds
fn timestamp_field(raw: &Value) -> Option<String> {
    TIMESTAMP_KEYS.iter().find_map(|key| match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(txscope_utils::iso_from_millis),
        _ => None,
    })
}

fn status_field(raw: &Value) -> TxStatus {
    match raw.get("status") {
        Some(Value::String(s)) => TxStatus::parse(s),
        _ => TxStatus::Pending,
    }
}

/// Stable id for records the API sent without one
fn fallback_id(raw: &Value) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    for keys in [HASH_KEYS, FROM_KEYS, TO_KEYS, AMOUNT_KEYS, TIMESTAMP_KEYS] {
        match raw_field(raw, keys) {
            Some(v) => v.to_string().hash(&mut hasher),
            None => "".hash(&mut hasher),
        }
        '|'.hash(&mut hasher);
    }
    format!("tx-{:016x}", hasher.finish())
}

fn iso(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Normalize a raw record using the current time for a missing timestamp
pub fn normalize(raw: &Value) -> Tx {
    normalize_at(raw, Utc::now())
}

/// Normalize a raw record. Never fails; non-objects yield a default record.
pub fn normalize_at(raw: &Value, now: DateTime<Utc>) -> Tx {
    let id = id_field(raw).unwrap_or_else(|| fallback_id(raw));

    Tx {
        id,
        hash: text_field(raw, HASH_KEYS).unwrap_or_default(),
        from: text_field(raw, FROM_KEYS).unwrap_or_default(),
        to: text_field(raw, TO_KEYS).unwrap_or_default(),
        amount: amount_field(raw),
        status: status_field(raw),
        timestamp: timestamp_field(raw).unwrap_or_else(|| iso(now)),
        gas_limit: text_field(raw, &["gasLimit"]),
        gas_price: text_field(raw, &["gasPrice"]),
        optimistic: false,
    }
}

/// Locally inserted entry shown while a create request is in flight
pub fn placeholder(temp_id: &str, raw: &Value, now: DateTime<Utc>) -> Tx {
    Tx {
        id: temp_id.to_string(),
        status: TxStatus::Pending,
        timestamp: iso(now),
        optimistic: true,
        ..normalize_at(raw, now)
    }
}
