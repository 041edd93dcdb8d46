//! Row specifications pushed by the host for the input dialog.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields every row kind carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowCommon {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disabled: bool,
}

/// `input` and `textarea` rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRow {
    #[serde(flatten)]
    pub common: RowCommon,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub password: bool,
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub max: Option<u32>,
    #[serde(default)]
    pub autosize: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxRow {
    #[serde(flatten)]
    pub common: RowCommon,
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub default: Option<Value>,
}

/// One choice of a `select` or `multi-select` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: Value,
    #[serde(default)]
    pub label: Option<String>,
}

impl SelectOption {
    /// Display text for a value, as the host would print it.
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// `select` and `multi-select` rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRow {
    #[serde(flatten)]
    pub common: RowCommon,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub clearable: bool,
    #[serde(default)]
    pub searchable: bool,
}

/// `number` and `slider` rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberRow {
    #[serde(flatten)]
    pub common: RowCommon,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(default)]
    pub precision: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorRow {
    #[serde(flatten)]
    pub common: RowCommon,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub format: Option<String>,
}

/// `date` and `date-range` rows.
///
/// `default` may be `true` (now), a single date, or a list of dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRow {
    #[serde(flatten)]
    pub common: RowCommon,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub return_string: bool,
    #[serde(default)]
    pub clearable: bool,
    #[serde(default)]
    pub min: Option<String>,
    #[serde(default)]
    pub max: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRow {
    #[serde(flatten)]
    pub common: RowCommon,
    #[serde(default)]
    pub default: Option<Value>,
    /// `"12"` or `"24"` hour clock.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub clearable: bool,
}

/// One row of an input dialog, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FormRow {
    Input(TextRow),
    Checkbox(CheckboxRow),
    Select(SelectRow),
    MultiSelect(SelectRow),
    Number(NumberRow),
    Slider(NumberRow),
    Color(ColorRow),
    Date(DateRow),
    DateRange(DateRow),
    Time(TimeRow),
    Textarea(TextRow),
}

impl FormRow {
    /// The `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            FormRow::Input(_) => "input",
            FormRow::Checkbox(_) => "checkbox",
            FormRow::Select(_) => "select",
            FormRow::MultiSelect(_) => "multi-select",
            FormRow::Number(_) => "number",
            FormRow::Slider(_) => "slider",
            FormRow::Color(_) => "color",
            FormRow::Date(_) => "date",
            FormRow::DateRange(_) => "date-range",
            FormRow::Time(_) => "time",
            FormRow::Textarea(_) => "textarea",
        }
    }

    pub fn common(&self) -> &RowCommon {
        match self {
            FormRow::Input(r) | FormRow::Textarea(r) => &r.common,
            FormRow::Checkbox(r) => &r.common,
            FormRow::Select(r) | FormRow::MultiSelect(r) => &r.common,
            FormRow::Number(r) | FormRow::Slider(r) => &r.common,
            FormRow::Color(r) => &r.common,
            FormRow::Date(r) | FormRow::DateRange(r) => &r.common,
            FormRow::Time(r) => &r.common,
        }
    }

    pub fn label(&self) -> &str {
        &self.common().label
    }

    pub fn is_required(&self) -> bool {
        self.common().required
    }

    /// Fill in missing option labels with the option value, so payloads
    /// from hosts that predate labelled options still render.
    pub fn normalize(&mut self) {
        if let FormRow::Select(row) | FormRow::MultiSelect(row) = self {
            for option in &mut row.options {
                if option.label.as_deref().map_or(true, str::is_empty) {
                    option.label = Some(option.value_text());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_every_row_kind() {
        let rows: Vec<FormRow> = serde_json::from_value(json!([
            {"type": "input", "label": "Name", "required": true, "placeholder": "John"},
            {"type": "checkbox", "label": "Agree", "checked": true},
            {"type": "select", "label": "Colour", "options": [{"value": "red"}]},
            {"type": "multi-select", "label": "Tags", "options": [{"value": "a", "label": "A"}]},
            {"type": "number", "label": "Amount", "default": 5, "min": 0, "max": 10},
            {"type": "slider", "label": "Volume", "default": 50},
            {"type": "color", "label": "Paint", "default": "#ff0000", "format": "hex"},
            {"type": "date", "label": "Birthday", "returnString": true, "format": "YYYY-MM-DD"},
            {"type": "date-range", "label": "Stay"},
            {"type": "time", "label": "Alarm", "format": "24"},
            {"type": "textarea", "label": "Notes", "autosize": true}
        ]))
        .unwrap();

        let kinds: Vec<_> = rows.iter().map(FormRow::kind).collect();
        assert_eq!(
            kinds,
            [
                "input",
                "checkbox",
                "select",
                "multi-select",
                "number",
                "slider",
                "color",
                "date",
                "date-range",
                "time",
                "textarea"
            ]
        );
        assert!(rows[0].is_required());
        assert_eq!(rows[0].label(), "Name");
        match &rows[7] {
            FormRow::Date(d) => {
                assert!(d.return_string);
                assert_eq!(d.format.as_deref(), Some("YYYY-MM-DD"));
            }
            other => panic!("expected date row, got {other:?}"),
        }
    }

    #[test]
    fn unknown_row_type_is_rejected() {
        let result = serde_json::from_value::<FormRow>(json!({"type": "file", "label": "Upload"}));
        assert!(result.is_err());
    }

    #[test]
    fn number_default_is_kept_verbatim() {
        let row: FormRow = serde_json::from_value(json!({"type": "number", "default": 5})).unwrap();
        let FormRow::Number(n) = row else {
            panic!("expected number row");
        };
        assert_eq!(n.default, Some(json!(5)));
    }

    #[test]
    fn normalize_labels_unlabelled_options() {
        let mut row: FormRow = serde_json::from_value(json!({
            "type": "select",
            "label": "Weapon",
            "options": [
                {"value": "pistol"},
                {"value": "rifle", "label": "Assault Rifle"},
                {"value": 3},
                {"value": "knife", "label": ""}
            ]
        }))
        .unwrap();
        row.normalize();

        let FormRow::Select(select) = row else {
            panic!("expected select row");
        };
        let labels: Vec<_> = select
            .options
            .iter()
            .map(|o| o.label.clone().unwrap())
            .collect();
        assert_eq!(labels, ["pistol", "Assault Rifle", "3", "knife"]);
    }

    #[test]
    fn normalize_leaves_other_rows_alone() {
        let mut row: FormRow =
            serde_json::from_value(json!({"type": "input", "label": "Name"})).unwrap();
        let before = row.clone();
        row.normalize();
        assert_eq!(row, before);
    }
}
