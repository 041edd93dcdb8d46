//! Input dialog form model.
//!
//! - `rows`: the row specifications the host sends
//! - `reconcile`: one entry per row, defaults, edits, submission
//! - `date_format`: date parsing and day.js style formatting

pub mod date_format;
pub mod reconcile;
pub mod rows;

pub use date_format::{format_timestamp, parse_date_millis, to_strftime};
pub use reconcile::{derive_default, FieldEntry, FormReconciler};
pub use rows::{
    CheckboxRow, ColorRow, DateRow, FormRow, NumberRow, RowCommon, SelectOption, SelectRow,
    TextRow, TimeRow,
};
