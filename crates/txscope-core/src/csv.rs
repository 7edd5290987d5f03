//! CSV export of the filtered list

use chrono::{DateTime, Utc};
use txscope_utils::csv_escape;

use super::models::Tx;

pub const CSV_HEADER: &str = "id,hash,from,to,amount,status,timestamp,gasLimit,gasPrice";

pub fn to_csv(list: &[Tx]) -> String {
    let mut lines = Vec::with_capacity(list.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for tx in list {
        let amount = tx.amount.to_string();
        let fields = [
            tx.id.as_str(),
            tx.hash.as_str(),
            tx.from.as_str(),
            tx.to.as_str(),
            amount.as_str(),
            tx.status.as_str(),
            tx.timestamp.as_str(),
            tx.gas_limit.as_deref().unwrap_or(""),
            tx.gas_price.as_deref().unwrap_or(""),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
        lines.push(row.join(","));
    }
    lines.join("\n")
}

/// `transactions_2024-05-01T10:00:00.csv`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("transactions_{}.csv", now.format("%Y-%m-%dT%H:%M:%S"))
}
