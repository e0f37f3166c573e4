//! Workbook writer: materialize a merge plan as a single xlsx file
//!
//! The writer trusts the sheet names it is given; uniqueness, length, and
//! character constraints are already guaranteed by name resolution.

use crate::error::{Error, Result};
use crate::pipeline::MergePlan;
use crate::table::CellValue;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::fs;
use std::path::Path;
use tracing::info;

/// Write the plan to `path`, one sheet per entry, in plan order.
///
/// The parent directory is created if missing. The first row of each sheet
/// carries the column names in bold; data rows follow.
pub fn write_workbook(path: &Path, plan: &MergePlan) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    write_sheets(path, plan).map_err(|e| Error::Workbook {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!(
        "saved merged workbook with {} sheet(s) -> {}",
        plan.sheet_count(),
        path.display()
    );
    Ok(())
}

fn write_sheets(path: &Path, plan: &MergePlan) -> std::result::Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for entry in &plan.entries {
        let sheet = workbook.add_worksheet().set_name(entry.name.as_str())?;

        for column in &entry.table.columns {
            sheet.write_string_with_format(
                0,
                column.index as u16,
                column.name.as_str(),
                &header_format,
            )?;
        }

        for (r, row) in entry.table.rows.iter().enumerate() {
            let r = (r + 1) as u32;
            for (c, cell) in row.cells.iter().enumerate() {
                let c = c as u16;
                match cell {
                    CellValue::Integer(i) => {
                        sheet.write_number(r, c, *i as f64)?;
                    }
                    CellValue::Float(f) => {
                        sheet.write_number(r, c, *f)?;
                    }
                    CellValue::String(s) => {
                        sheet.write_string(r, c, s.as_str())?;
                    }
                    CellValue::Bool(b) => {
                        sheet.write_boolean(r, c, *b)?;
                    }
                    CellValue::Empty => {}
                }
            }
        }
    }

    workbook.save(path)
}
