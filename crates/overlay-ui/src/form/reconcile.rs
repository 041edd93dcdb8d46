//! Keeps the field list of an input dialog aligned with its rows.

use std::fmt;

use chrono::TimeZone;
use serde::Serialize;
use serde_json::Value;

use overlay_common::FormError;

use super::date_format::{format_timestamp, parse_date_millis};
use super::rows::FormRow;

/// The current value of one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEntry {
    pub value: Value,
}

impl FieldEntry {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

/// Rows and their entries for one dialog invocation.
///
/// `load` fills one entry per row, `clear` empties both. In between, the
/// entry list is only changed in place.
#[derive(Debug, Default)]
pub struct FormReconciler {
    rows: Vec<FormRow>,
    entries: Vec<FieldEntry>,
}

impl FormReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a new row list, normalizing it and deriving every default.
    /// `now_ms` is what a date default of `true` resolves to.
    pub fn load(&mut self, mut rows: Vec<FormRow>, now_ms: i64) {
        for row in &mut rows {
            row.normalize();
        }
        self.entries = rows
            .iter()
            .map(|row| FieldEntry::new(derive_default(row, now_ms)))
            .collect();
        self.rows = rows;
        debug_assert!(self.is_aligned(), "entries out of step with rows");
    }

    pub fn rows(&self) -> &[FormRow] {
        &self.rows
    }

    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    /// Raw entry values in row order.
    pub fn values(&self) -> Vec<Value> {
        self.entries.iter().map(|e| e.value.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.entries.is_empty()
    }

    pub fn is_aligned(&self) -> bool {
        self.rows.len() == self.entries.len()
    }

    /// Store a user edit. `null` clears any row; anything else must suit
    /// the row kind.
    pub fn set_value(&mut self, index: usize, value: Value) -> Result<(), FormError> {
        let len = self.rows.len();
        let row = self
            .rows
            .get(index)
            .ok_or(FormError::IndexOutOfRange { index, len })?;

        if !value.is_null() && !accepts(row, &value) {
            return Err(FormError::TypeMismatch {
                index,
                kind: row.kind(),
                got: value_kind(&value),
            });
        }

        let entry = self
            .entries
            .get_mut(index)
            .ok_or(FormError::IndexOutOfRange { index, len })?;
        entry.value = value;
        debug_assert!(self.is_aligned(), "entries out of step with rows");
        Ok(())
    }

    /// Check required rows. Reports the first one left empty.
    pub fn validate(&self) -> Result<(), FormError> {
        for (index, row) in self.rows.iter().enumerate() {
            if !row.is_required() {
                continue;
            }
            let empty = self
                .entries
                .get(index)
                .map_or(true, |entry| is_empty_value(row, &entry.value));
            if empty {
                return Err(FormError::RequiredMissing {
                    index,
                    label: row.label().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Values to report to the host, in row order.
    ///
    /// Date rows flagged `returnString` are formatted with the row format,
    /// or `default_format`, in `tz`. A row without an entry is left out
    /// instead of reported as `null`.
    pub fn submit<Tz>(&self, tz: &Tz, default_format: &str) -> Vec<Value>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let entry = self.entries.get(index)?;
                Some(match row {
                    FormRow::Date(date) | FormRow::DateRange(date) if date.return_string => {
                        let pattern = date.format.as_deref().unwrap_or(default_format);
                        format_date_value(&entry.value, pattern, tz)
                    }
                    _ => entry.value.clone(),
                })
            })
            .collect()
    }

    /// Drop rows and entries.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.entries.clear();
    }
}

/// Initial value of a row.
pub fn derive_default(row: &FormRow, now_ms: i64) -> Value {
    match row {
        FormRow::Checkbox(checkbox) => checkbox
            .checked
            .map(Value::Bool)
            .or_else(|| checkbox.default.clone().filter(Value::is_boolean))
            .unwrap_or(Value::Null),
        FormRow::Date(r) | FormRow::DateRange(r) => date_default(r.default.as_ref(), now_ms),
        FormRow::Time(r) => date_default(r.default.as_ref(), now_ms),
        FormRow::Input(r) | FormRow::Textarea(r) => r.default.clone().unwrap_or(Value::Null),
        FormRow::Select(r) | FormRow::MultiSelect(r) => r.default.clone().unwrap_or(Value::Null),
        FormRow::Number(r) | FormRow::Slider(r) => r.default.clone().unwrap_or(Value::Null),
        FormRow::Color(r) => r.default.clone().unwrap_or(Value::Null),
    }
}

fn date_default(default: Option<&Value>, now_ms: i64) -> Value {
    match default {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Value::Null,
        Some(Value::Bool(true)) => Value::from(now_ms),
        Some(Value::String(s)) if s.is_empty() => Value::Null,
        Some(Value::Array(items)) => items.iter().map(date_or_null).collect(),
        Some(other) => date_or_null(other),
    }
}

fn date_or_null(value: &Value) -> Value {
    parse_date_millis(value).map_or(Value::Null, Value::from)
}

fn format_date_value<Tz>(value: &Value, pattern: &str, tz: &Tz) -> Value
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match value {
        Value::Null => Value::Null,
        Value::Array(items) => items
            .iter()
            .map(|item| format_date_value(item, pattern, tz))
            .collect(),
        other => parse_date_millis(other)
            .and_then(|ms| format_timestamp(ms, pattern, tz))
            .map_or(Value::Null, Value::String),
    }
}

fn accepts(row: &FormRow, value: &Value) -> bool {
    match row {
        FormRow::Input(_) | FormRow::Textarea(_) | FormRow::Color(_) => value.is_string(),
        FormRow::Checkbox(_) => value.is_boolean(),
        FormRow::Select(_) => !value.is_array() && !value.is_object(),
        FormRow::MultiSelect(_) => value.is_array(),
        FormRow::Number(_) | FormRow::Slider(_) | FormRow::Date(_) | FormRow::Time(_) => {
            value.is_number()
        }
        FormRow::DateRange(_) => value
            .as_array()
            .is_some_and(|items| items.iter().all(|v| v.is_null() || v.is_number())),
    }
}

fn is_empty_value(row: &FormRow, value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Bool(false) => matches!(row, FormRow::Checkbox(_)),
        _ => false,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
