//! Spreadsheet feed decoding.
//!
//! The spreadsheet feed is header driven: column names are matched
//! case-insensitively, ignoring spaces, dashes and underscores, and several
//! aliases are accepted per field. CSV and JSON exports go through the same
//! header resolution.

use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::errors::SourceError;
use tour_search_shared::SheetRecord;

/// Wire format of a spreadsheet export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Json,
}

impl SheetFormat {
    /// Guess the format from the payload itself.
    pub fn detect(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('[') | Some('{') => SheetFormat::Json,
            _ => SheetFormat::Csv,
        }
    }
}

impl FromStr for SheetFormat {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(SheetFormat::Csv),
            "json" => Ok(SheetFormat::Json),
            other => Err(SourceError::parse(format!("unknown sheet format: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Tag,
    Name,
    Description,
    ImageUrl,
    ElementType,
    ParentId,
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn column_for(header: &str) -> Option<Column> {
    let column = match normalize_header(header).as_str() {
        "id" => Column::Id,
        "tag" | "tags" | "matchtag" => Column::Tag,
        "name" | "title" | "label" => Column::Name,
        "description" | "desc" | "subtitle" => Column::Description,
        "imageurl" | "image" | "thumbnail" => Column::ImageUrl,
        "elementtype" | "type" => Column::ElementType,
        "parentid" | "parent" => Column::ParentId,
        _ => return None,
    };
    Some(column)
}

fn assign(record: &mut SheetRecord, column: Column, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    let optional = || Some(value.to_string());
    match column {
        Column::Id => record.id = value.to_string(),
        Column::Tag => record.tag = value.to_string(),
        Column::Name => record.name = value.to_string(),
        Column::Description => record.description = value.to_string(),
        Column::ImageUrl => record.image_url = optional(),
        Column::ElementType => record.element_type = optional(),
        Column::ParentId => record.parent_id = optional(),
    }
}

fn is_blank(record: &SheetRecord) -> bool {
    *record == SheetRecord::default()
}

/// Decode a spreadsheet export, detecting the format when `format` is `None`.
pub fn parse_sheet(text: &str, format: Option<SheetFormat>) -> Result<Vec<SheetRecord>, SourceError> {
    match format.unwrap_or_else(|| SheetFormat::detect(text)) {
        SheetFormat::Csv => parse_csv(text),
        SheetFormat::Json => parse_json(text),
    }
}

/// Decode a CSV export with a header row.
pub fn parse_csv(text: &str) -> Result<Vec<SheetRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns: Vec<Option<Column>> = reader.headers()?.iter().map(column_for).collect();
    if columns.iter().all(Option::is_none) {
        return Err(SourceError::parse("sheet header has no recognized columns"));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut record = SheetRecord::default();
        for (value, column) in row.iter().zip(columns.iter()) {
            if let Some(column) = column {
                assign(&mut record, *column, value);
            }
        }
        if !is_blank(&record) {
            records.push(record);
        }
    }

    debug!(rows = records.len(), "Decoded CSV sheet");
    Ok(records)
}

/// Decode a JSON export: either an array of row objects, or an object
/// holding such an array under `rows` or `data`.
pub fn parse_json(text: &str) -> Result<Vec<SheetRecord>, SourceError> {
    let value: Value = serde_json::from_str(text)?;
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("rows").or_else(|| map.remove("data")) {
            Some(Value::Array(rows)) => rows,
            _ => return Err(SourceError::parse("sheet JSON has no row array")),
        },
        _ => return Err(SourceError::parse("sheet JSON must be an array or object")),
    };

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let Value::Object(fields) = row else {
            debug!("Skipping non-object sheet row");
            continue;
        };
        let mut record = SheetRecord::default();
        for (header, value) in &fields {
            let Some(column) = column_for(header) else {
                continue;
            };
            match value {
                Value::String(s) => assign(&mut record, column, s),
                Value::Number(n) => assign(&mut record, column, &n.to_string()),
                Value::Bool(b) => assign(&mut record, column, &b.to_string()),
                _ => {}
            }
        }
        if !is_blank(&record) {
            records.push(record);
        }
    }

    debug!(rows = records.len(), "Decoded JSON sheet");
    Ok(records)
}
