//! Sheet loading for the runner.
//!
//! A workbook is either a single CSV file (one sheet, named by its file
//! stem) or a directory whose `*.csv` files are its sheets, ordered by file
//! name. Loading hands the selected sheet to the core as a [`RawDataset`];
//! all typing happens in the normalizer.

use crate::config::SheetSelector;
use indexlab_core::data::{DataError, RawDataset};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One sheet of a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub path: PathBuf,
}

/// List the sheets of a workbook.
pub fn list_sheets(workbook: &Path) -> Result<Vec<Sheet>, DataError> {
    if !workbook.exists() {
        return Err(DataError::unavailable(workbook, "file not found"));
    }

    if workbook.is_file() {
        return Ok(vec![Sheet {
            name: sheet_name(workbook),
            path: workbook.to_path_buf(),
        }]);
    }

    let entries = std::fs::read_dir(workbook)
        .map_err(|e| DataError::unavailable(workbook, format!("read dir: {e}")))?;

    let mut sheets = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DataError::unavailable(workbook, format!("dir entry: {e}")))?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if path.is_file() && is_csv {
            sheets.push(Sheet {
                name: sheet_name(&path),
                path,
            });
        }
    }
    sheets.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(sheets)
}

/// Resolve a sheet selector against a workbook.
pub fn select_sheet(workbook: &Path, selector: &SheetSelector) -> Result<Sheet, DataError> {
    let sheets = list_sheets(workbook)?;
    if sheets.is_empty() {
        return Err(DataError::unavailable(workbook, "workbook contains no CSV sheets"));
    }

    let found = match selector {
        SheetSelector::Index(i) => sheets.get(*i).cloned(),
        SheetSelector::Name(name) => sheets.iter().find(|s| &s.name == name).cloned(),
    };
    found.ok_or_else(|| {
        let available: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        DataError::unavailable(
            workbook,
            format!("sheet {selector} not found (available: {})", available.join(", ")),
        )
    })
}

/// Load the selected sheet of a workbook.
pub fn load_sheet(
    workbook: &Path,
    selector: &SheetSelector,
) -> Result<(Sheet, RawDataset), DataError> {
    let sheet = select_sheet(workbook, selector)?;
    let raw = read_csv_sheet(&sheet.path)?;
    debug!(
        sheet = %sheet.name,
        columns = raw.n_columns(),
        rows = raw.n_rows(),
        "sheet loaded"
    );
    Ok((sheet, raw))
}

/// Read one CSV file into a raw dataset. The first record is the header row.
pub fn read_csv_sheet(path: &Path) -> Result<RawDataset, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let mut headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(String::from)
        .collect();
    if let Some(first) = headers.first_mut() {
        *first = first.trim_start_matches('\u{feff}').to_string();
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        rows.push(record.iter().map(String::from).collect::<Vec<String>>());
    }

    RawDataset::from_rows(&headers, &rows[..])
}

fn csv_error(path: &Path, err: csv::Error) -> DataError {
    if err.is_io_error() {
        DataError::unavailable(path, err.to_string())
    } else {
        DataError::MalformedInput(format!("{}: {err}", path.display()))
    }
}

fn sheet_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_workbook_is_unavailable() {
        let err = list_sheets(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }

    #[test]
    fn reads_csv_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neo.csv");
        fs::write(&path, "\u{feff}Date,NU\n2024-01-02,10\n2024-01-03,\n").unwrap();

        let raw = read_csv_sheet(&path).unwrap();
        assert_eq!(raw.n_columns(), 2);
        assert_eq!(raw.n_rows(), 2);
        assert_eq!(raw.column(0).unwrap().label, "Date");
        assert_eq!(raw.column(1).unwrap().cells, vec!["10", ""]);
    }

    #[test]
    fn ragged_csv_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Date,NU\n2024-01-02,10,extra\n").unwrap();
        let err = read_csv_sheet(&path).unwrap_err();
        assert!(matches!(err, DataError::MalformedInput(_)));
    }

    #[test]
    fn directory_sheets_select_by_index_and_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_prices.csv"), "Date,X\n").unwrap();
        fs::write(dir.path().join("a_notes.csv"), "Date,Y\n").unwrap();
        fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

        let sheets = list_sheets(dir.path()).unwrap();
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a_notes", "b_prices"]);

        let by_index = select_sheet(dir.path(), &SheetSelector::Index(1)).unwrap();
        assert_eq!(by_index.name, "b_prices");
        let by_name = select_sheet(dir.path(), &SheetSelector::Name("a_notes".into())).unwrap();
        assert_eq!(by_name.name, "a_notes");
    }

    #[test]
    fn unknown_sheet_lists_alternatives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neo.csv");
        fs::write(&path, "Date,NU\n").unwrap();
        let err = select_sheet(&path, &SheetSelector::Name("Other".into())).unwrap_err();
        match err {
            DataError::DataUnavailable { reason, .. } => assert!(reason.contains("neo")),
            other => panic!("expected DataUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn empty_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = select_sheet(dir.path(), &SheetSelector::default()).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }
}
