//! Typed view of a source paradigm template.
//!
//! The source stores a template as a JSON table: a header row, then rows of
//! `[label, endings, descriptor, endings, descriptor, ...]`. Labels and
//! descriptors arrive either as strings or as single-element lists, endings
//! as a string, a list of alternatives, or an empty placeholder. The shape is
//! checked once here so the expander never re-interprets raw JSON.

use serde_json::Value;
use thiserror::Error;

/// Row labels that name a slot outside the paradigm proper.
pub const NON_PARADIGMATIC_LABELS: &[&str] = &["in comps"];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("template is not a table of rows")]
    NotATable,
    #[error("template row {row} is not a list of cells")]
    MalformedRow { row: usize },
    #[error("template row {row}, column {column} holds an unexpected value")]
    MalformedCell { row: usize, column: usize },
}

/// One grammatical slot of a row: its alternative endings and descriptor.
///
/// The position of an ending inside `endings` is its variant ordinal. Empty
/// alternatives are kept so later ordinals do not shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCell {
    pub endings: Vec<String>,
    pub descriptor: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateRow {
    Paradigm { label: String, cells: Vec<TemplateCell> },
    /// e.g. the compounding-only row; excluded from generation and validation.
    NonParadigmatic { label: String },
}

impl TemplateRow {
    pub fn label(&self) -> &str {
        match self {
            TemplateRow::Paradigm { label, .. } | TemplateRow::NonParadigmatic { label } => label,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InflectionTemplate {
    rows: Vec<TemplateRow>,
}

impl InflectionTemplate {
    pub fn new(rows: Vec<TemplateRow>) -> Self {
        Self { rows }
    }

    /// Parses the raw JSON text stored by the source.
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, TemplateError> {
        let table = value.as_array().ok_or(TemplateError::NotATable)?;

        let mut rows = Vec::with_capacity(table.len().saturating_sub(1));
        // Row 0 is the column header
        for (row_idx, row) in table.iter().enumerate().skip(1) {
            let cells = row
                .as_array()
                .ok_or(TemplateError::MalformedRow { row: row_idx })?;
            if cells.len() < 2 {
                continue;
            }

            let label = first_text(&cells[0])
                .ok_or(TemplateError::MalformedCell { row: row_idx, column: 0 })?;

            if is_non_paradigmatic(&label) {
                rows.push(TemplateRow::NonParadigmatic { label });
                continue;
            }

            let mut parsed = Vec::new();
            let mut col = 1;
            while col < cells.len() {
                let endings = parse_endings(&cells[col])
                    .ok_or(TemplateError::MalformedCell { row: row_idx, column: col })?;

                if !endings.is_empty() {
                    let descriptor = match cells.get(col + 1) {
                        Some(value) => first_text(value)
                            .ok_or(TemplateError::MalformedCell { row: row_idx, column: col + 1 })?,
                        None => String::new(),
                    };
                    parsed.push(TemplateCell { endings, descriptor });
                }
                col += 2;
            }

            rows.push(TemplateRow::Paradigm { label, cells: parsed });
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[TemplateRow] {
        &self.rows
    }

    /// Rows that take part in generation, with their cells.
    pub fn paradigm_rows(&self) -> impl Iterator<Item = (&str, &[TemplateCell])> {
        self.rows.iter().filter_map(|row| match row {
            TemplateRow::Paradigm { label, cells } => Some((label.as_str(), cells.as_slice())),
            TemplateRow::NonParadigmatic { .. } => None,
        })
    }
}

fn is_non_paradigmatic(label: &str) -> bool {
    let label = label.trim();
    NON_PARADIGMATIC_LABELS
        .iter()
        .any(|candidate| label.eq_ignore_ascii_case(candidate))
}

/// Label/descriptor cell: a string, a list whose first item is the text, or empty.
fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => match items.first() {
            None | Some(Value::Null) => Some(String::new()),
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => None,
        },
        _ => None,
    }
}

/// Endings cell. An empty result means "no slot here".
fn parse_endings(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null | Value::Bool(false) => Some(Vec::new()),
        Value::String(s) if s.is_empty() => Some(Vec::new()),
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => Some(String::new()),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A_MASC: &str = r#"[
        [[""], ["masc sg"], [""], ["masc pl"], [""]],
        [["nom"], ["o"], ["masc nom sg"], ["ā", "āse"], ["masc nom pl"]],
        [["acc"], ["aṃ"], ["masc acc sg"], ["e"], ["masc acc pl"]],
        [["in comps"], ["a"], ["in comps"], [], [""]]
    ]"#;

    #[test]
    fn test_parse_rows() {
        let template = InflectionTemplate::parse(A_MASC).unwrap();
        assert_eq!(template.rows().len(), 3);

        let rows: Vec<_> = template.paradigm_rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "nom");
        assert_eq!(rows[0].1[1].endings, vec!["ā".to_string(), "āse".to_string()]);
        assert_eq!(rows[0].1[1].descriptor, "masc nom pl");

        assert!(matches!(
            &template.rows()[2],
            TemplateRow::NonParadigmatic { label } if label == "in comps"
        ));
    }

    #[test]
    fn test_scalar_cells_are_normalised() {
        let template = InflectionTemplate::parse(
            r#"[["header"], ["nom", "o", "masc nom sg", "", "masc nom pl"]]"#,
        )
        .unwrap();
        let rows: Vec<_> = template.paradigm_rows().collect();
        assert_eq!(rows[0].1.len(), 1);
        assert_eq!(rows[0].1[0].endings, vec!["o".to_string()]);
    }

    #[test]
    fn test_missing_descriptor_is_empty() {
        let template = InflectionTemplate::parse(r#"[[], [["voc"], ["a"]]]"#).unwrap();
        let rows: Vec<_> = template.paradigm_rows().collect();
        assert_eq!(rows[0].1[0].descriptor, "");
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let template = InflectionTemplate::parse(r#"[[], [["nom"]], []]"#).unwrap();
        assert!(template.rows().is_empty());
    }

    #[test]
    fn test_malformed_templates() {
        assert!(matches!(InflectionTemplate::parse("{not json"), Err(TemplateError::Json(_))));
        assert!(matches!(InflectionTemplate::parse(r#"{"a": 1}"#), Err(TemplateError::NotATable)));
        assert!(matches!(
            InflectionTemplate::parse(r#"[[], "row"]"#),
            Err(TemplateError::MalformedRow { row: 1 })
        ));
        assert!(matches!(
            InflectionTemplate::parse(r#"[[], [["nom"], [1, 2], ["x"]]]"#),
            Err(TemplateError::MalformedCell { row: 1, column: 1 })
        ));
    }
}
