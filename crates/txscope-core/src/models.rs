//! Core data models for the explorer

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::TxStatus;

pub const DEFAULT_GAS_LIMIT: &str = "21000";
pub const DEFAULT_GAS_PRICE: &str = "0.00000002";

/// Transaction amount, either a JSON number or a string, kept as received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Text("0".to_string())
    }
}

impl Amount {
    /// Numeric value, `None` when the text does not parse
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Amount::Number(n) => n.as_f64(),
            Amount::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{}", n),
            Amount::Text(s) => write!(f, "{}", s),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Canonical transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tx {
    pub id: String,
    pub hash: String,
    pub from: String,
    pub to: String,
    pub amount: Amount,
    pub status: TxStatus,
    /// ISO-8601
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    /// Locally inserted, not yet confirmed by the API
    #[serde(rename = "__optimistic__", default, skip_serializing_if = "is_false")]
    pub optimistic: bool,
}

/// Aggregate statistics for the dashboard. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub total_transactions: Option<serde_json::Value>,
    /// In the display currency
    #[serde(default)]
    pub total_volume: Option<serde_json::Value>,
    /// Percentage
    #[serde(default)]
    pub success_rate: Option<serde_json::Value>,
    #[serde(default)]
    pub average_amount: Option<serde_json::Value>,
    #[serde(default)]
    pub pending_count: Option<serde_json::Value>,
    #[serde(default)]
    pub confirmed_count: Option<serde_json::Value>,
    #[serde(default)]
    pub failed_count: Option<serde_json::Value>,
}

/// Body of `POST /transactions` on the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTxRequest {
    pub to_address: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
}

/// Raw create-form input, as posted by the browser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTxForm {
    #[serde(default)]
    pub to_address: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub gas_limit: String,
    #[serde(default)]
    pub gas_price: String,
}

/// A validation failure attached to one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

fn address_regex() -> &'static Regex {
    static ADDRESS: OnceCell<Regex> = OnceCell::new();
    ADDRESS.get_or_init(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").unwrap())
}

impl CreateTxForm {
    /// Check every field and build the request; blank gas values get defaults
    pub fn validate(&self) -> Result<CreateTxRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        let to_address = self.to_address.trim();
        if !address_regex().is_match(to_address) {
            errors.push(FieldError {
                field: "toAddress",
                message: "Enter a valid Ethereum address (0x + 40 hex chars)".to_string(),
            });
        }

        let amount = self.amount.trim();
        let positive = amount
            .parse::<f64>()
            .map(|n| n.is_finite() && n > 0.0)
            .unwrap_or(false);
        if !positive {
            errors.push(FieldError {
                field: "amount",
                message: "Amount must be a positive number".to_string(),
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let or_default = |value: &str, default: &str| {
            let value = value.trim();
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };

        Ok(CreateTxRequest {
            to_address: to_address.to_string(),
            amount: amount.to_string(),
            gas_limit: Some(or_default(&self.gas_limit, DEFAULT_GAS_LIMIT)),
            gas_price: Some(or_default(&self.gas_price, DEFAULT_GAS_PRICE)),
        })
    }

    /// Gas values shown in the form, with defaults for blanks
    pub fn gas_or_defaults(&self) -> (String, String) {
        let limit = if self.gas_limit.trim().is_empty() {
            DEFAULT_GAS_LIMIT.to_string()
        } else {
            self.gas_limit.trim().to_string()
        };
        let price = if self.gas_price.trim().is_empty() {
            DEFAULT_GAS_PRICE.to_string()
        } else {
            self.gas_price.trim().to_string()
        };
        (limit, price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x1111111111111111111111111111111111111111";

    #[test]
    fn test_amount_untagged() {
        let n: Amount = serde_json::from_str("1.25").unwrap();
        assert_eq!(n.as_f64(), Some(1.25));
        let s: Amount = serde_json::from_str("\"0.000000000000000001\"").unwrap();
        assert_eq!(s.to_string(), "0.000000000000000001");
        assert_eq!(Amount::Text("abc".into()).as_f64(), None);
    }

    #[test]
    fn test_optimistic_flag_serialized_only_when_set() {
        let mut tx = Tx {
            id: "1".into(),
            hash: "0xh".into(),
            from: "a".into(),
            to: "b".into(),
            amount: Amount::Text("1".into()),
            status: TxStatus::Pending,
            timestamp: "2024-01-01T00:00:00.000Z".into(),
            gas_limit: None,
            gas_price: None,
            optimistic: false,
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert!(json.get("__optimistic__").is_none());
        assert!(json.get("gasLimit").is_none());

        tx.optimistic = true;
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["__optimistic__"], true);
    }

    #[test]
    fn test_form_valid_with_gas_defaults() {
        let form = CreateTxForm {
            to_address: ADDR.into(),
            amount: "0.5".into(),
            ..Default::default()
        };
        let req = form.validate().unwrap();
        assert_eq!(req.gas_limit.as_deref(), Some("21000"));
        assert_eq!(req.gas_price.as_deref(), Some("0.00000002"));
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["toAddress"], ADDR);
    }

    #[test]
    fn test_form_errors_per_field() {
        let form = CreateTxForm {
            to_address: "0x123".into(),
            amount: "-1".into(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["toAddress", "amount"]);
    }

    #[test]
    fn test_form_rejects_zero_and_text_amount() {
        for amount in ["0", "abc", ""] {
            let form = CreateTxForm {
                to_address: ADDR.into(),
                amount: amount.into(),
                ..Default::default()
            };
            assert!(form.validate().is_err(), "amount {:?} accepted", amount);
        }
    }
}
