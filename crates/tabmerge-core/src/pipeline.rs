//! Merge pipeline: enumerate sources, extract tables, resolve sheet names
//!
//! Data flows one way: folder -> source files -> extracted tables -> resolved
//! names -> ordered plan. The plan is what the workbook writer materializes.

use crate::error::Result;
use crate::extractor::{extract_tables, ExtractOptions};
use crate::names::NameResolver;
use crate::scanner::scan_folder;
use crate::table::{Column, Table};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Column name substituted for tables with no columns at all.
/// The sink cannot represent a zero-column sheet.
pub const PLACEHOLDER_COLUMN: &str = "(empty)";

/// One sheet of the output workbook: a resolved name and its table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeEntry {
    /// Final sheet name, unique and valid for the output container
    pub name: String,
    /// The table payload
    pub table: Table,
}

/// The full ordered merge plan for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergePlan {
    /// The input folder the plan was built from
    pub folder: PathBuf,
    /// Sheets in output order
    pub entries: Vec<MergeEntry>,
}

impl MergePlan {
    /// Number of sheets in the plan
    pub fn sheet_count(&self) -> usize {
        self.entries.len()
    }

    /// Compact per-sheet summary, for dry-run inspection
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            folder: self.folder.clone(),
            sheets: self
                .entries
                .iter()
                .map(|e| SheetSummary {
                    name: e.name.clone(),
                    source: e.table.source_path.clone(),
                    columns: e.table.column_count(),
                    rows: e.table.row_count(),
                })
                .collect(),
        }
    }
}

/// Summary of a merge plan without the table payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub folder: PathBuf,
    pub sheets: Vec<SheetSummary>,
}

/// Summary of one planned sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetSummary {
    pub name: String,
    pub source: PathBuf,
    pub columns: usize,
    pub rows: usize,
}

/// Build the ordered merge plan for a folder.
///
/// Enumerates supported files, extracts every table in file order, then
/// resolves the concatenated name sequence in one streaming pass. The i-th
/// entry's table always corresponds to the i-th proposed name.
pub fn build_plan<P: AsRef<Path>>(folder: P, opts: &ExtractOptions) -> Result<MergePlan> {
    let folder = folder.as_ref();
    let sources = scan_folder(folder)?;

    let mut proposed: Vec<String> = Vec::new();
    let mut tables: Vec<Table> = Vec::new();

    for source in &sources {
        for extracted in extract_tables(source, opts)? {
            proposed.push(extracted.proposed_name);
            tables.push(extracted.table);
        }
    }

    let names = NameResolver::new().resolve_all(&proposed);

    let entries = names
        .into_iter()
        .zip(tables)
        .map(|(name, mut table)| {
            if table.columns.is_empty() {
                table
                    .columns
                    .push(Column::new(PLACEHOLDER_COLUMN.to_string(), 0));
                table.rows.clear();
            }
            MergeEntry { name, table }
        })
        .collect();

    Ok(MergePlan {
        folder: folder.to_path_buf(),
        entries,
    })
}
