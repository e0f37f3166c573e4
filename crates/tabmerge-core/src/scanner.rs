//! Folder scanner for discovering supported tabular source files

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported source file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// Excel workbook (.xlsx)
    Xlsx,
    /// Legacy Excel workbook (.xls)
    Xls,
    /// Comma-separated values (.csv)
    Csv,
    /// Tab-separated values (.tsv)
    Tsv,
    /// Plain text table (.txt), comma-delimited
    Txt,
}

impl SourceFormat {
    /// Match a file extension (case-insensitive) against the supported set
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "xlsx" => Some(SourceFormat::Xlsx),
            "xls" => Some(SourceFormat::Xls),
            "csv" => Some(SourceFormat::Csv),
            "tsv" => Some(SourceFormat::Tsv),
            "txt" => Some(SourceFormat::Txt),
            _ => None,
        }
    }

    /// Whether this format is a multi-sheet spreadsheet container
    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, SourceFormat::Xlsx | SourceFormat::Xls)
    }

    /// Field delimiter for delimited-text formats
    pub fn delimiter(&self) -> Option<u8> {
        match self {
            SourceFormat::Csv | SourceFormat::Txt => Some(b','),
            SourceFormat::Tsv => Some(b'\t'),
            SourceFormat::Xlsx | SourceFormat::Xls => None,
        }
    }
}

/// A discovered source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Filename with the extension removed
    pub stem: String,
    /// Detected format
    pub format: SourceFormat,
}

impl SourceFile {
    /// Filename including the extension
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Scan a folder for supported tabular files.
///
/// Only regular files at the top level of the folder are considered.
/// Results are sorted by case-insensitive filename so output order does not
/// depend on filesystem enumeration order. An empty result is an error:
/// there is nothing to merge.
pub fn scan_folder<P: AsRef<Path>>(folder: P) -> Result<Vec<SourceFile>> {
    let folder = folder.as_ref();

    if !folder.is_dir() {
        return Err(Error::FolderNotFound(folder.to_path_buf()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();

        let format = match path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(SourceFormat::from_extension)
        {
            Some(f) => f,
            None => continue,
        };

        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.push(SourceFile {
                path: path.to_path_buf(),
                stem: stem.to_string(),
                format,
            });
        }
    }

    files.sort_by_key(|f| f.file_name().to_lowercase());

    if files.is_empty() {
        return Err(Error::NoSupportedFiles(folder.to_path_buf()));
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) {
        fs::write(dir.path().join(name), "").unwrap();
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SourceFormat::from_extension("csv"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_extension("XLSX"), Some(SourceFormat::Xlsx));
        assert_eq!(SourceFormat::from_extension("Tsv"), Some(SourceFormat::Tsv));
        assert_eq!(SourceFormat::from_extension("parquet"), None);
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(SourceFormat::Csv.delimiter(), Some(b','));
        assert_eq!(SourceFormat::Txt.delimiter(), Some(b','));
        assert_eq!(SourceFormat::Tsv.delimiter(), Some(b'\t'));
        assert_eq!(SourceFormat::Xlsx.delimiter(), None);
    }

    #[test]
    fn test_scan_filters_unsupported() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.csv");
        touch(&dir, "b.parquet");
        touch(&dir, "notes.md");

        let files = scan_folder(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].stem, "a");
        assert_eq!(files[0].format, SourceFormat::Csv);
    }

    #[test]
    fn test_scan_order_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "beta.csv");
        touch(&dir, "Alpha.csv");
        touch(&dir, "GAMMA.tsv");

        let files = scan_folder(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["Alpha.csv", "beta.csv", "GAMMA.tsv"]);
    }

    #[test]
    fn test_scan_skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "top.csv");
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("inner.csv"), "").unwrap();

        let files = scan_folder(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].stem, "top");
    }

    #[test]
    fn test_scan_empty_folder_is_error() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "readme.md");

        let err = scan_folder(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NoSupportedFiles(_)));
    }

    #[test]
    fn test_scan_missing_folder_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = scan_folder(&missing).unwrap_err();
        assert!(matches!(err, Error::FolderNotFound(_)));
    }

    #[test]
    fn test_scan_is_deterministic() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "x.csv");
        touch(&dir, "y.xlsx");
        touch(&dir, "z.txt");

        let first: Vec<String> = scan_folder(dir.path())
            .unwrap()
            .iter()
            .map(|f| f.file_name())
            .collect();
        let second: Vec<String> = scan_folder(dir.path())
            .unwrap()
            .iter()
            .map(|f| f.file_name())
            .collect();
        assert_eq!(first, second);
    }
}
