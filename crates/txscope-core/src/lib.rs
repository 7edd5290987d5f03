//! Core transaction explorer logic
//!
//! Normalization of API records, the derived list view, CSV export,
//! notifications, draft persistence and the explorer state machine.

pub mod csv;
pub mod debounce;
pub mod draft;
pub mod error;
pub mod explorer;
pub mod models;
pub mod normalize;
pub mod source;
pub mod timers;
pub mod toast;
pub mod types;
pub mod view;

pub use draft::{Draft, DraftStore};
pub use error::{CoreError, CoreResult, ErrorSeverity};
pub use explorer::{Explorer, Snapshot};
pub use models::{Amount, CreateTxForm, CreateTxRequest, FieldError, Stats, Tx};
pub use normalize::normalize;
pub use source::{RawTx, SourceRef, TransactionSource};
pub use toast::{Toast, ToastVariant};
pub use types::{LoadState, SortDir, SortField, StatusFilter, TxStatus};
pub use view::{DateRange, Page, Sort, ViewState};
