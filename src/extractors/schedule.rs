// src/extractors/schedule.rs

// --- Imports ---
use crate::extractors::date::{parse_date_token, DateWindow};
use crate::utils::error::ExtractError;
use chrono::{Datelike, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// --- Constants ---
/// Fixed header of column 0, the row key of every schedule tab.
pub const BATCH_HEADER: &str = "Batch";
// Time-row labels containing this are rendered as "Room 1 (31 Jan, Sat)"
const ROOM_MARKER: &str = "Room";

/// Decoded CSV content, rows by columns, text only.
pub type RawTable = Vec<Vec<String>>;

// --- Data Structures ---

/// One batch's row of the schedule, keyed by reconstructed header.
///
/// Keys keep column order. Two columns that reconstruct to the same header share one key:
/// the key stays where it first appeared and the later column's value replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(batch: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(BATCH_HEADER.to_string(), Value::String(batch.to_string()));
        Self(fields)
    }

    /// Sets a field, returning the value it replaced.
    pub fn insert(&mut self, header: &str, value: &str) -> Option<String> {
        self.0
            .insert(header.to_string(), Value::String(value.to_string()))
            .and_then(|old| old.as_str().map(str::to_string))
    }
}

#[cfg(test)]
impl Record {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.0.get(header).and_then(Value::as_str)
    }

    pub fn batch(&self) -> &str {
        self.get(BATCH_HEADER).unwrap_or_default()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.0.len()
    }
}

/// A retained column and the header it is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub index: usize,
    pub header: String,
}

// --- Helpers ---

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|c| c.trim()).unwrap_or("")
}

/// Counts the empty lines at `offset`. The `\n` finishing a `\r\n` that ended the previous row is not one.
fn blank_lines_at(text: &str, offset: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = offset;
    if i > 0 && bytes.get(i - 1) == Some(&b'\r') && bytes.get(i) == Some(&b'\n') {
        i += 1;
    }

    let mut count = 0;
    loop {
        match bytes.get(i) {
            Some(b'\r') if bytes.get(i + 1) == Some(&b'\n') => i += 2,
            Some(b'\r') | Some(b'\n') => i += 1,
            _ => return count,
        }
        count += 1;
    }
}

/// Decodes CSV text into rows. Rows may be ragged.
///
/// Empty lines become empty rows so row indices match line positions in the sheet.
pub fn decode_csv(text: &str) -> Result<RawTable, ExtractError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: RawTable = Vec::new();
    let mut record = StringRecord::new();
    let mut row_end = 0usize;
    while reader.read_record(&mut record)? {
        // The reader skips empty lines between rows; put them back
        rows.extend(std::iter::repeat_with(Vec::new).take(blank_lines_at(text, row_end)));
        rows.push(record.iter().map(str::to_string).collect());
        row_end = usize::try_from(reader.position().byte()).unwrap_or(text.len());
    }
    rows.extend(std::iter::repeat_with(Vec::new).take(blank_lines_at(text, row_end)));

    Ok(rows)
}

/// Returns the date row and the time row directly beneath it.
pub fn locate_header_rows(table: &[Vec<String>], date_row: usize) -> Result<(&[String], &[String]), ExtractError> {
    let required = date_row + 2;
    if table.len() < required {
        return Err(ExtractError::TooShort { rows: table.len(), required });
    }
    Ok((table[date_row].as_slice(), table[date_row + 1].as_slice()))
}

/// Builds the published header for each relevant column, in the order given.
///
/// The most recent non-empty date-row label among the relevant columns carries forward
/// to the columns after it until another label appears.
pub fn reconstruct_headers(date_row: &[String], time_row: &[String], indices: &[usize]) -> Vec<Column> {
    let (_, columns) = indices.iter().fold(
        (String::new(), Vec::with_capacity(indices.len())),
        |(last_date_label, mut columns), &index| {
            if index == 0 {
                columns.push(Column { index, header: BATCH_HEADER.to_string() });
                return (last_date_label, columns);
            }

            let date_label = cell(date_row, index);
            let last_date_label = if date_label.is_empty() { last_date_label } else { date_label.to_string() };

            let time_label = cell(time_row, index);
            let header = if time_label.contains(ROOM_MARKER) {
                format!("{} ({})", time_label, last_date_label)
            } else {
                format!("{} - {}", last_date_label, time_label)
            };
            columns.push(Column { index, header });
            (last_date_label, columns)
        },
    );
    columns
}

// --- Main Extractor Structure ---

/// Extracts the date-windowed part of a schedule tab as batch records.
pub struct ScheduleExtractor {
    window: DateWindow,
    today: NaiveDate,
}

impl ScheduleExtractor {
    /// `today` is fixed for the whole run; date tokens are read in its year.
    pub fn new(window: DateWindow, today: NaiveDate) -> Self {
        Self { window, today }
    }

    /// Decodes a CSV export and extracts its records.
    pub fn extract_csv(&self, csv_text: &str, date_row: usize) -> Result<Vec<Record>, ExtractError> {
        let table = decode_csv(csv_text)?;
        tracing::debug!("Decoded {} rows", table.len());
        Ok(self.extract(&table, date_row))
    }

    /// Extracts records from rows below the time row.
    ///
    /// A table without a time row yields no records; nothing in here fails.
    pub fn extract(&self, table: &[Vec<String>], date_row: usize) -> Vec<Record> {
        let (dates, times) = match locate_header_rows(table, date_row) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("{}", e);
                return Vec::new();
            }
        };

        let indices = self.relevant_columns(dates, times);
        let columns = reconstruct_headers(dates, times, &indices);
        tracing::info!("Keeping {} columns.", columns.len());

        let records: Vec<Record> = table[date_row + 2..]
            .iter()
            .filter_map(|row| build_record(row, &columns))
            .collect();

        tracing::info!("Extracted {} active batches.", records.len());
        records
    }

    /// Column indices to keep, ascending. Column 0 is always kept.
    ///
    /// A relevant date opens a block; columns after it without a date of their own stay in the
    /// block while their time cell is non-empty. An out-of-window date closes the block.
    pub fn relevant_columns(&self, date_row: &[String], time_row: &[String]) -> Vec<usize> {
        let year = self.today.year();
        let (_, indices) = date_row.iter().enumerate().skip(1).fold(
            (None::<NaiveDate>, vec![0]),
            |(active, mut indices), (index, label)| match parse_date_token(label, year) {
                Some(date) if self.window.contains(date, self.today) => {
                    indices.push(index);
                    (Some(date), indices)
                }
                Some(_) => (None, indices),
                None => {
                    if active.is_some() && !cell(time_row, index).is_empty() {
                        indices.push(index);
                    }
                    (active, indices)
                }
            },
        );
        indices
    }
}

/// Builds a record for one data row, or `None` if it has no batch or no values.
fn build_record(row: &[String], columns: &[Column]) -> Option<Record> {
    let batch = cell(row, 0);
    if batch.is_empty() {
        return None;
    }

    let mut record = Record::new(batch);
    let mut has_data = false;
    for column in columns.iter().filter(|c| c.index != 0) {
        let value = cell(row, column.index);
        if !value.is_empty() {
            record.insert(&column.header, value);
            has_data = true;
        }
    }

    has_data.then_some(record)
}
