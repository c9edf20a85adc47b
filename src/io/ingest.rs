//! CSV ingest and normalization.
//!
//! This module is responsible for turning a sales CSV into a `SalesTable`.
//!
//! Design goals:
//! - **Strict schema** for required columns (`product`, `category`, `units_sold`)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Forgiving headers**: case, surrounding spaces, BOM and a few common
//!   aliases (`product_name`, `sale_date`, `price`) are normalized away

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{Category, Column, SaleRecord, SalesTable};
use crate::error::{Result, SalesError};

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the table plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: SalesTable,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a sales table from a CSV file.
pub fn read_table_csv(path: &Path) -> Result<IngestedTable> {
    let file = File::open(path).map_err(|e| {
        SalesError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open CSV '{}': {e}", path.display()),
        ))
    })?;
    let ingested = read_table(file)?;
    debug!(
        path = %path.display(),
        rows = ingested.rows_read,
        used = ingested.table.len(),
        "loaded sales CSV"
    );
    Ok(ingested)
}

/// Load a sales table from any CSV reader.
pub fn read_table<R: Read>(input: R) -> Result<IngestedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);

    for column in Column::REQUIRED {
        if !header_map.contains_key(&column) {
            return Err(SalesError::MissingField(column));
        }
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based after it.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map));
        match parsed {
            Ok(record) => records.push(record),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), "skipped invalid CSV rows");
    }
    if records.is_empty() {
        return Err(SalesError::insufficient(1, 0));
    }

    Ok(IngestedTable {
        table: SalesTable::from_records(records),
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<Column, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        if let Some(column) = column_for_header(&normalize_header_name(name)) {
            // First occurrence wins.
            map.entry(column).or_insert(idx);
        }
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_ascii_lowercase().replace(' ', "_")
}

fn column_for_header(name: &str) -> Option<Column> {
    match name {
        "product" | "product_name" => Some(Column::Product),
        "category" | "product_line" => Some(Column::Category),
        "units_sold" | "units" => Some(Column::UnitsSold),
        "date" | "sale_date" => Some(Column::Date),
        "unit_price" | "price" => Some(Column::UnitPrice),
        _ => None,
    }
}

fn parse_row(record: &StringRecord, header_map: &HashMap<Column, usize>) -> std::result::Result<SaleRecord, String> {
    let product = get_required(record, header_map, Column::Product)?.to_string();
    let category = get_required(record, header_map, Column::Category)?.parse::<Category>()?;
    let units_sold = parse_units(get_required(record, header_map, Column::UnitsSold)?)?;

    // Optional columns: when the header exists every row must carry a value,
    // otherwise the column would silently drop out of the table's schema.
    let date = if header_map.contains_key(&Column::Date) {
        Some(parse_date(get_required(record, header_map, Column::Date)?)?)
    } else {
        None
    };
    let unit_price = if header_map.contains_key(&Column::UnitPrice) {
        Some(parse_price(get_required(record, header_map, Column::UnitPrice)?)?)
    } else {
        None
    };

    Ok(SaleRecord {
        product,
        category,
        units_sold,
        date,
        unit_price,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<Column, usize>,
    column: Column,
) -> std::result::Result<&'a str, String> {
    let idx = header_map
        .get(&column)
        .ok_or_else(|| format!("Missing required column: `{column}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{column}`"))
}

fn parse_units(s: &str) -> std::result::Result<u32, String> {
    if let Ok(v) = s.parse::<u32>() {
        return Ok(v);
    }
    // Spreadsheet exports often write integers as `12.0`.
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) => Ok(v as u32),
        _ => Err(format!("Invalid units_sold '{s}': expected a non-negative integer.")),
    }
}

fn parse_price(s: &str) -> std::result::Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(format!("Invalid unit_price '{s}': expected a non-negative number.")),
    }
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    // ISO dates are preferred, but spreadsheet exports often use `DD/MM/YYYY`
    // or `DD-MM-YYYY`. A small fixed set keeps parsing deterministic.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_full_schema_with_aliases_and_bom() {
        let csv = "\u{feff}Product Name, Category ,Units Sold,Sale Date,Price\n\
                   Home-01,home,12,2024-01-03,19.99\n\
                   Sports-02,Sports,7.0,04/01/2024,5\n";
        let ingested = read_table(csv.as_bytes()).unwrap();
        assert!(ingested.row_errors.is_empty());
        assert_eq!(ingested.rows_read, 2);

        let table = ingested.table;
        assert_eq!(table.units(), vec![12, 7]);
        assert!(table.has_column(Column::Date));
        assert!(table.has_column(Column::UnitPrice));
        assert_eq!(table.records()[1].date, NaiveDate::from_ymd_opt(2024, 1, 4));
        assert_eq!(table.records()[0].category, Category::Home);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv = "product,category,units_sold\nHome-01,Home,3\nHome-02,Home,4\n";
        let table = read_table(csv.as_bytes()).unwrap().table;
        assert!(!table.has_column(Column::Date));
        assert!(!table.has_column(Column::UnitPrice));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let csv = "product,category,units_sold,date\n\
                   Home-01,Home,3,2024-01-01\n\
                   Home-02,Garden,4,2024-01-02\n\
                   Home-03,Home,-4,2024-01-02\n\
                   Home-04,Home,5,yesterday\n\
                   Home-05,Home,6,2024-01-05\n";
        let ingested = read_table(csv.as_bytes()).unwrap();
        assert_eq!(ingested.table.units(), vec![3, 6]);
        let lines: Vec<usize> = ingested.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert!(ingested.row_errors[0].message.contains("Garden"));
    }

    #[test]
    fn missing_required_column_is_reported() {
        let csv = "product,units_sold\nHome-01,3\n";
        assert!(matches!(
            read_table(csv.as_bytes()),
            Err(SalesError::MissingField(Column::Category))
        ));
    }

    #[test]
    fn no_valid_rows_is_insufficient_data() {
        let csv = "product,category,units_sold\nHome-01,Home,lots\n";
        assert!(matches!(
            read_table(csv.as_bytes()),
            Err(SalesError::InsufficientData { .. })
        ));
    }
}
