//! tabmerge-core: Core library for merging folders of tabular files
//!
//! This library provides functionality to:
//! - Scan a folder for supported tabular files (.xlsx/.xls/.csv/.tsv/.txt)
//! - Extract tables: one per delimited file, one per workbook sheet
//! - Resolve sheet names: sanitized, length-bounded, unique per run
//! - Write the resulting tables into a single output workbook

pub mod error;
pub mod extractor;
pub mod names;
pub mod pipeline;
pub mod scanner;
pub mod table;
pub mod writer;

pub use error::{Error, Result};
pub use extractor::{extract_tables, ExtractOptions, ExtractedTable};
pub use names::{resolve_names, sanitize_sheet_name, NameResolver, MAX_SHEET_NAME_LEN};
pub use pipeline::{build_plan, MergeEntry, MergePlan, PlanSummary};
pub use scanner::{scan_folder, SourceFile, SourceFormat};
pub use table::{CellValue, Column, Row, Table};
pub use writer::write_workbook;
