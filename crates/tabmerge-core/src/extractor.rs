//! Table extraction from delimited text files and spreadsheet workbooks
//!
//! Delimited files yield exactly one table, proposed name = file stem.
//! Workbooks yield one table per sheet: a single-sheet workbook is renamed to
//! its file stem for readability, a multi-sheet workbook keeps its internal
//! sheet names since the filename cannot disambiguate them.

use crate::error::{Error, Result};
use crate::scanner::SourceFile;
use crate::table::{CellValue, Column, Row, Table};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use encoding_rs::Encoding;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// A table paired with its proposed (not yet resolved) sheet name
#[derive(Debug, Clone)]
pub struct ExtractedTable {
    /// Proposed sheet name, possibly illegal or over-long
    pub proposed_name: String,
    /// The extracted table payload
    pub table: Table,
}

/// Options controlling extraction
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Encodings tried in order when a text file is not valid UTF-8
    pub fallback_encodings: Vec<&'static Encoding>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            fallback_encodings: vec![encoding_rs::GBK],
        }
    }
}

/// Extract all tables from one source file, in the file's own order
pub fn extract_tables(source: &SourceFile, opts: &ExtractOptions) -> Result<Vec<ExtractedTable>> {
    match source.format.delimiter() {
        // Delimited formats always carry exactly one table
        Some(delimiter) => {
            let table = read_delimited(&source.path, delimiter, opts)?;
            info!(
                "{}: extracted 1 table as '{}'",
                source.file_name(),
                source.stem
            );
            Ok(vec![ExtractedTable {
                proposed_name: source.stem.clone(),
                table,
            }])
        }
        // Spreadsheet containers: one table per sheet
        None => {
            let mut sheets = read_spreadsheet(&source.path)?;

            if sheets.len() == 1 {
                // Single-sheet workbook: rename to the filename
                let (_, table) = sheets.remove(0);
                info!(
                    "{}: single sheet, renamed to '{}'",
                    source.file_name(),
                    source.stem
                );
                return Ok(vec![ExtractedTable {
                    proposed_name: source.stem.clone(),
                    table,
                }]);
            }

            info!(
                "{}: {} sheets preserved under their own names",
                source.file_name(),
                sheets.len()
            );
            Ok(sheets
                .into_iter()
                .map(|(name, table)| ExtractedTable {
                    proposed_name: name,
                    table,
                })
                .collect())
        }
    }
}

/// Read a delimited text file into a Table, with encoding fallback
pub fn read_delimited(path: &Path, delimiter: u8, opts: &ExtractOptions) -> Result<Table> {
    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let content = decode_text(path, &bytes, opts)?;
    parse_delimited_str(&content, delimiter, path)
}

/// Decode raw bytes as UTF-8, then try each fallback encoding in order
fn decode_text(path: &Path, bytes: &[u8], opts: &ExtractOptions) -> Result<String> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Ok(s.to_string());
    }

    for encoding in &opts.fallback_encodings {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            warn!(
                "{}: not valid UTF-8, decoded with {}",
                path.display(),
                encoding.name()
            );
            return Ok(text.into_owned());
        }
    }

    Err(Error::Decode {
        path: path.to_path_buf(),
        tried: opts
            .fallback_encodings
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Parse delimited content from a string (useful for testing)
pub fn parse_delimited_str(content: &str, delimiter: u8, source: &Path) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    // Parse headers into columns
    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: source.to_path_buf(),
        source: e,
    })?;

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.to_string(), i))
        .collect();

    // Parse rows, padding or truncating to the header width
    let mut rows = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            path: source.to_path_buf(),
            source: e,
        })?;

        let mut cells: Vec<CellValue> = record.iter().map(CellValue::parse).collect();

        while cells.len() < columns.len() {
            cells.push(CellValue::Empty);
        }
        if cells.len() > columns.len() {
            warn!(
                "{}: row {} has more cells than columns, truncating",
                source.display(),
                row_idx + 1
            );
            cells.truncate(columns.len());
        }

        rows.push(Row::new(cells));
    }

    Ok(Table {
        columns,
        rows,
        source_path: source.to_path_buf(),
    })
}

/// Read every sheet of a workbook, in the file's internal sheet order
pub fn read_spreadsheet(path: &Path) -> Result<Vec<(String, Table)>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::Spreadsheet {
        path: path.to_path_buf(),
        source: e,
    })?;

    let sheet_names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| Error::Spreadsheet {
                path: path.to_path_buf(),
                source: e,
            })?;

        sheets.push((name, table_from_range(&range, path)));
    }

    Ok(sheets)
}

/// Build a Table from a sheet range: first row is the header, rest is data
fn table_from_range(range: &calamine::Range<Data>, path: &Path) -> Table {
    let mut rows_iter = range.rows();

    let columns: Vec<Column> = match rows_iter.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(i, cell)| Column::new(cell.to_string(), i))
            .collect(),
        None => Vec::new(),
    };

    let rows: Vec<Row> = rows_iter
        .map(|cells| Row::new(cells.iter().map(cell_from_data).collect()))
        .collect();

    Table {
        columns,
        rows,
        source_path: path.to_path_buf(),
    }
}

/// Map a calamine cell into our cell model
fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => CellValue::String(format_datetime(d)),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
    }
}

/// Render a spreadsheet date cell the way the output workbook shows dates
fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_folder;
    use rust_xlsxwriter::Workbook;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn src(p: &str) -> PathBuf {
        PathBuf::from(p)
    }

    #[test]
    fn test_parse_simple_csv() {
        let csv = "ID,Name,Value\n1,foo,100\n2,bar,200\n";
        let table = parse_delimited_str(csv, b',', &src("test.csv")).unwrap();

        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.columns[0].name, "ID");
        assert_eq!(table.columns[2].name, "Value");

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells[0], CellValue::Integer(1));
        assert_eq!(table.rows[1].cells[1], CellValue::String("bar".to_string()));
    }

    #[test]
    fn test_parse_tab_delimited() {
        let tsv = "A\tB\n1\t2\n";
        let table = parse_delimited_str(tsv, b'\t', &src("test.tsv")).unwrap();

        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.rows[0].cells[1], CellValue::Integer(2));
    }

    #[test]
    fn test_parse_with_empty_cells() {
        let csv = "ID,Name,Value\n1,,100\n2,bar,\n";
        let table = parse_delimited_str(csv, b',', &src("test.csv")).unwrap();

        assert_eq!(table.rows[0].cells[1], CellValue::Empty);
        assert_eq!(table.rows[1].cells[2], CellValue::Empty);
    }

    #[test]
    fn test_parse_short_rows_are_padded() {
        let csv = "A,B,C\n1,2\n";
        let table = parse_delimited_str(csv, b',', &src("test.csv")).unwrap();

        assert_eq!(table.rows[0].cells.len(), 3);
        assert_eq!(table.rows[0].cells[2], CellValue::Empty);
    }

    #[test]
    fn test_parse_empty_content_has_no_columns() {
        let table = parse_delimited_str("", b',', &src("empty.csv")).unwrap();
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_read_delimited_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "Name,Count\nalpha,1\n").unwrap();

        let table = read_delimited(&path, b',', &ExtractOptions::default()).unwrap();
        assert_eq!(table.columns[0].name, "Name");
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_read_delimited_gbk_fallback() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("regional.csv");
        let (bytes, _, _) = encoding_rs::GBK.encode("名称,数量\n你好,1\n");
        std::fs::write(&path, &bytes).unwrap();

        let table = read_delimited(&path, b',', &ExtractOptions::default()).unwrap();
        assert_eq!(table.columns[0].name, "名称");
        assert_eq!(table.rows[0].cells[0], CellValue::String("你好".to_string()));
    }

    #[test]
    fn test_read_delimited_undecodable_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.csv");
        // 0xFF is neither valid UTF-8 nor a valid GBK lead byte
        std::fs::write(&path, [0xFFu8, 0xFF, 0xFF]).unwrap();

        let err = read_delimited(&path, b',', &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_extract_csv_is_named_by_stem() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Report.csv"), "A,B\n1,2\n").unwrap();

        let files = scan_folder(dir.path()).unwrap();
        let entries = extract_tables(&files[0], &ExtractOptions::default()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].proposed_name, "Report");
    }

    #[test]
    fn test_extract_single_sheet_workbook_renamed_to_stem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Budget.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet().set_name("Internal").unwrap();
        sheet.write_string(0, 0, "A").unwrap();
        sheet.write_number(1, 0, 42.0).unwrap();
        workbook.save(&path).unwrap();

        let files = scan_folder(dir.path()).unwrap();
        let entries = extract_tables(&files[0], &ExtractOptions::default()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].proposed_name, "Budget");
        assert_eq!(entries[0].table.columns[0].name, "A");
    }

    #[test]
    fn test_extract_multi_sheet_workbook_keeps_sheet_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Quarters.xlsx");

        let mut workbook = Workbook::new();
        for name in ["Q1", "Q2", "Q3"] {
            let sheet = workbook.add_worksheet().set_name(name).unwrap();
            sheet.write_string(0, 0, "Total").unwrap();
        }
        workbook.save(&path).unwrap();

        let files = scan_folder(dir.path()).unwrap();
        let entries = extract_tables(&files[0], &ExtractOptions::default()).unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.proposed_name.as_str()).collect();
        assert_eq!(names, vec!["Q1", "Q2", "Q3"]);
    }
}
