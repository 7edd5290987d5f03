//! Derived view of the transaction list: filter, search, sort, paginate
//!
//! These functions are pure. The explorer memoizes the filtered list and
//! only repaginates on page changes.

use chrono::{NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use super::models::Tx;
use super::types::{SortDir, SortField, StatusFilter};

/// Inclusive day range, interpreted in the viewer's time zone
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Epoch-millisecond bounds: `from` at 00:00:00.000, `to` at 23:59:59.999
    fn bounds<Tz: TimeZone>(&self, tz: &Tz) -> (Option<i64>, Option<i64>) {
        let start = self.from.and_then(|d| {
            let naive = d.and_hms_opt(0, 0, 0)?;
            tz.from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.timestamp_millis())
                .or_else(|| Some(Utc.from_utc_datetime(&naive).timestamp_millis()))
        });
        let end = self.to.and_then(|d| {
            let naive = d.and_hms_milli_opt(23, 59, 59, 999)?;
            tz.from_local_datetime(&naive)
                .latest()
                .map(|dt| dt.timestamp_millis())
                .or_else(|| Some(Utc.from_utc_datetime(&naive).timestamp_millis()))
        });
        (start, end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Filters {
    pub status: StatusFilter,
    pub range: DateRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Sort {
    pub field: SortField,
    pub dir: SortDir,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::Date,
            dir: SortDir::Desc,
        }
    }
}

impl Sort {
    /// Same field flips direction, a new field starts descending
    pub fn toggled(self, field: SortField) -> Self {
        if self.field == field {
            Self {
                field,
                dir: self.dir.flipped(),
            }
        } else {
            Self {
                field,
                dir: SortDir::Desc,
            }
        }
    }
}

/// Everything the derived view depends on besides the list itself
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub filters: Filters,
    /// Applied search text, already trimmed and lowercased
    pub search: String,
    pub sort: Sort,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            filters: Filters::default(),
            search: String::new(),
            sort: Sort::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }
}

/// One page of the derived view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub items: Vec<Tx>,
    pub page: usize,
    pub page_count: usize,
    /// Size of the filtered list
    pub total: usize,
    /// 1-based index of the first row, 0 when empty
    pub start: usize,
    pub end: usize,
}

pub fn normalize_search(text: &str) -> String {
    text.trim().to_lowercase()
}

fn timestamp_millis(tx: &Tx) -> Option<i64> {
    txscope_utils::parse_timestamp(&tx.timestamp).map(|dt| dt.timestamp_millis())
}

fn compare(a: &Tx, b: &Tx, field: SortField) -> Ordering {
    match field {
        SortField::Date => {
            let ka = timestamp_millis(a).unwrap_or(i64::MIN);
            let kb = timestamp_millis(b).unwrap_or(i64::MIN);
            ka.cmp(&kb)
        }
        SortField::Amount => {
            let ka = a.amount.as_f64().unwrap_or(0.0);
            let kb = b.amount.as_f64().unwrap_or(0.0);
            ka.total_cmp(&kb)
        }
        SortField::Status => a.status.rank().cmp(&b.status.rank()),
    }
}

/// Status filter, date range, search, then a stable sort
pub fn filter_sorted<Tz: TimeZone>(list: &[Tx], state: &ViewState, tz: &Tz) -> Vec<Tx> {
    let (start, end) = state.filters.range.bounds(tz);
    let range_active = state.filters.range.is_active();
    let needle = normalize_search(&state.search);

    let mut out: Vec<Tx> = list
        .iter()
        .filter(|tx| state.filters.status.matches(&tx.status))
        .filter(|tx| {
            if !range_active {
                return true;
            }
            match timestamp_millis(tx) {
                Some(ts) => start.map_or(true, |s| ts >= s) && end.map_or(true, |e| ts <= e),
                None => false,
            }
        })
        .filter(|tx| {
            needle.is_empty()
                || tx.hash.to_lowercase().contains(&needle)
                || tx.from.to_lowercase().contains(&needle)
                || tx.to.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    let Sort { field, dir } = state.sort;
    out.sort_by(|a, b| match dir {
        SortDir::Asc => compare(a, b, field),
        SortDir::Desc => compare(b, a, field),
    });
    out
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    ((total + page_size - 1) / page_size).max(1)
}

/// Slice one page out of an already filtered list. Out-of-range pages fall back to 1.
pub fn paginate(filtered: &[Tx], page: usize, page_size: usize) -> Page {
    let page_size = page_size.max(1);
    let total = filtered.len();
    let pages = page_count(total, page_size);
    let page = if page == 0 || page > pages { 1 } else { page };

    let offset = (page - 1) * page_size;
    let end = (offset + page_size).min(total);
    let items = filtered.get(offset..end).map(<[Tx]>::to_vec).unwrap_or_default();

    Page {
        items,
        page,
        page_count: pages,
        total,
        start: if total == 0 { 0 } else { offset + 1 },
        end,
    }
}

/// Filtered, sorted and paginated view in one step
pub fn derive_view<Tz: TimeZone>(list: &[Tx], state: &ViewState, tz: &Tz) -> Page {
    let filtered = filter_sorted(list, state, tz);
    paginate(&filtered, state.page, state.page_size)
}
