//! Item lists for the bulk price estimator.
//!
//! The first row of the table is the header. Items are read from the column
//! named `Item`: blank cells are skipped and repeated names are kept once, in
//! order of first appearance.
//!
//! - `.csv` is read with the `csv` crate
//! - `.xlsx` / `.xls` are read with `calamine`, first sheet only

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;

use crate::errors::{CalcError, CalcResult};

/// Header of the column holding item names
pub const ITEM_COLUMN: &str = "Item";

/// Distinct item names from a CSV or spreadsheet file.
///
/// # Errors
///
/// * `MissingItemColumn` - No `Item` header
/// * `FileError` - Missing file or unsupported extension
/// * `SerializationError` - The file could not be parsed
pub fn read_item_names(path: &Path) -> CalcResult<Vec<String>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let items = match ext.as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xls" => read_spreadsheet(path)?,
        other => {
            return Err(CalcError::file_error(
                "import",
                path.display().to_string(),
                format!("Unsupported file type '{}'", other),
            ))
        }
    };

    tracing::info!(path = %path.display(), items = items.len(), "item list imported");
    Ok(items)
}

fn read_csv(path: &Path) -> CalcResult<Vec<String>> {
    let file = File::open(path)
        .map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(|v| v.to_string()).collect());
    }
    item_names_from_rows(&headers, rows)
}

fn read_spreadsheet(path: &Path) -> CalcResult<Vec<String>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CalcError::serialization(format!("{} has no sheets", path.display())))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| CalcError::serialization(e.to_string()))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<String>>());
    let headers = rows.next().unwrap_or_default();
    item_names_from_rows(&headers, rows)
}

/// Pull the distinct, non-blank `Item` values out of header + rows.
pub fn item_names_from_rows<I>(headers: &[String], rows: I) -> CalcResult<Vec<String>>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let column = headers
        .iter()
        .position(|h| h.trim() == ITEM_COLUMN)
        .ok_or_else(|| CalcError::missing_item_column(ITEM_COLUMN))?;

    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for row in rows {
        let Some(cell) = row.get(column) else {
            continue;
        };
        let name = cell.trim();
        if name.is_empty() {
            continue;
        }
        if seen.insert(name.to_string()) {
            items.push(name.to_string());
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use std::io::Write;
    use tempfile::{tempdir, Builder};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_distinct_in_order() {
        let headers = strings(&["No", "Item", "Qty"]);
        let rows = vec![
            strings(&["1", "Conveyor belt", "2"]),
            strings(&["2", "Gearbox", "1"]),
            strings(&["3", "", "4"]),
            strings(&["4", "Conveyor belt", "1"]),
            strings(&["5", "  Pulley  ", "1"]),
            strings(&["6"]),
        ];
        let items = item_names_from_rows(&headers, rows).unwrap();
        assert_eq!(items, strings(&["Conveyor belt", "Gearbox", "Pulley"]));
    }

    #[test]
    fn test_missing_item_column() {
        let headers = strings(&["Name", "Qty"]);
        let err = item_names_from_rows(&headers, Vec::new()).unwrap_err();
        assert_eq!(err, CalcError::missing_item_column("Item"));
    }

    #[test]
    fn test_item_column_is_case_sensitive() {
        let headers = strings(&["item"]);
        assert!(item_names_from_rows(&headers, Vec::new()).is_err());
    }

    #[test]
    fn test_read_csv_file() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Item,Qty").unwrap();
        writeln!(file, "Drive pulley,1").unwrap();
        writeln!(file, "Tail pulley,1").unwrap();
        writeln!(file, ",3").unwrap();
        writeln!(file, "Drive pulley,2").unwrap();
        file.flush().unwrap();

        let items = read_item_names(file.path()).unwrap();
        assert_eq!(items, strings(&["Drive pulley", "Tail pulley"]));
    }

    #[test]
    fn test_csv_without_item_column() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Description,Qty").unwrap();
        writeln!(file, "Drive pulley,1").unwrap();
        file.flush().unwrap();

        let err = read_item_names(file.path()).unwrap_err();
        assert!(matches!(err, CalcError::MissingItemColumn { .. }));
    }

    /// Save a one-sheet workbook of string cells, header row first.
    fn write_xlsx(path: &Path, rows: &[&[&str]]) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if !cell.is_empty() {
                    sheet.write_string(r as u32, c as u16, *cell).unwrap();
                }
            }
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_read_xlsx_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("enquiry.xlsx");
        write_xlsx(
            &path,
            &[
                &["No", "Item", "Qty"],
                &["1", "Return idler", "40"],
                &["2", "", "1"],
                &["3", "Impact idler", "12"],
                &["4", "Return idler", "8"],
                &["5", " Belt cleaner ", "2"],
            ],
        );

        let items = read_item_names(&path).unwrap();
        assert_eq!(items, strings(&["Return idler", "Impact idler", "Belt cleaner"]));
    }

    #[test]
    fn test_xlsx_without_item_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("enquiry.xlsx");
        write_xlsx(&path, &[&["Description", "Qty"], &["Return idler", "40"]]);

        let err = read_item_names(&path).unwrap_err();
        assert_eq!(err, CalcError::missing_item_column(ITEM_COLUMN));
    }

    #[test]
    fn test_exported_workbook_has_no_item_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("costing.xlsx");
        std::fs::write(&path, crate::export::workbook_bytes(&[], &[]).unwrap()).unwrap();

        // First sheet is the empty roller table
        let err = read_item_names(&path).unwrap_err();
        assert!(matches!(err, CalcError::MissingItemColumn { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let err = read_item_names(file.path()).unwrap_err();
        assert!(matches!(err, CalcError::FileError { .. }));
    }
}
