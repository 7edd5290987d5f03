//! Basic types for the explorer

use serde::{Deserialize, Serialize};

/// Transaction status. Unknown strings from the API are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
    Other(String),
}

impl Default for TxStatus {
    fn default() -> Self {
        TxStatus::Pending
    }
}

impl TxStatus {
    /// Parse case-insensitively; never fails
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" => TxStatus::Pending,
            "confirmed" => TxStatus::Confirmed,
            "failed" => TxStatus::Failed,
            _ => TxStatus::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Confirmed => "confirmed",
            TxStatus::Failed => "failed",
            TxStatus::Other(s) => s,
        }
    }

    /// Sort rank: pending 0, failed 1, confirmed 2, unknown 0
    pub fn rank(&self) -> u8 {
        match self {
            TxStatus::Pending | TxStatus::Other(_) => 0,
            TxStatus::Failed => 1,
            TxStatus::Confirmed => 2,
        }
    }
}

impl From<String> for TxStatus {
    fn from(s: String) -> Self {
        TxStatus::parse(&s)
    }
}

impl From<TxStatus> for String {
    fn from(status: TxStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status filter applied to the list; `All` disables filtering
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(String),
}

impl StatusFilter {
    /// `"all"` and the empty string mean no filter
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            StatusFilter::All
        } else {
            StatusFilter::Only(s.to_lowercase())
        }
    }

    pub fn matches(&self, status: &TxStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status.as_str().to_lowercase() == *wanted,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(s) => s,
        }
    }
}

/// Column the list is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Date,
    Amount,
    Status,
}

impl std::str::FromStr for SortField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" | "timestamp" => Ok(SortField::Date),
            "amount" => Ok(SortField::Amount),
            "status" => Ok(SortField::Status),
            _ => Err(format!("Invalid sort field: {}", s)),
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortField::Date => write!(f, "date"),
            SortField::Amount => write!(f, "amount"),
            SortField::Status => write!(f, "status"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn flipped(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

impl std::fmt::Display for SortDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDir::Asc => write!(f, "asc"),
            SortDir::Desc => write!(f, "desc"),
        }
    }
}

/// Load state of the transaction list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!(TxStatus::parse("CONFIRMED"), TxStatus::Confirmed);
        assert_eq!(TxStatus::parse("Pending"), TxStatus::Pending);
        assert_eq!(
            TxStatus::parse("dropped"),
            TxStatus::Other("dropped".to_string())
        );
    }

    #[test]
    fn test_status_serde_roundtrip_preserves_unknown() {
        let json = serde_json::to_string(&TxStatus::Other("Replaced".to_string())).unwrap();
        assert_eq!(json, "\"Replaced\"");
        let back: TxStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(back, TxStatus::Failed);
    }

    #[test]
    fn test_status_rank() {
        assert_eq!(TxStatus::Pending.rank(), 0);
        assert_eq!(TxStatus::Failed.rank(), 1);
        assert_eq!(TxStatus::Confirmed.rank(), 2);
        assert_eq!(TxStatus::Other("x".into()).rank(), 0);
    }

    #[test]
    fn test_status_filter() {
        assert_eq!(StatusFilter::parse("ALL"), StatusFilter::All);
        assert_eq!(StatusFilter::parse(""), StatusFilter::All);
        let only = StatusFilter::parse("Confirmed");
        assert!(only.matches(&TxStatus::Confirmed));
        assert!(!only.matches(&TxStatus::Pending));
    }

    #[test]
    fn test_sort_field_from_str() {
        assert_eq!("amount".parse::<SortField>(), Ok(SortField::Amount));
        assert!("nope".parse::<SortField>().is_err());
        assert_eq!(SortDir::Desc.flipped(), SortDir::Asc);
    }
}
