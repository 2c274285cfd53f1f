//! # Export
//!
//! Writes the costing tables as CSV or as one Excel workbook, and saves whole
//! sessions as JSON.
//!
//! - CSV columns are the record fields in declaration order, with a header
//!   row. Reading an exported file gives back identical records.
//! - The workbook holds one sheet per table (`ROLLER_COSTING`,
//!   `FRAME_COSTING`) with the same columns. Numeric fields are written as
//!   numbers.
//! - Every file is written atomically: write to `.tmp`, sync, rename.
//!
//! ## Example
//!
//! ```rust,no_run
//! use idler_core::export::{export_session_tables, export_workbook, save_session};
//! use idler_core::session::Session;
//! use std::path::Path;
//!
//! let session = Session::new();
//! let (rollers, frames) = export_session_tables(&session, Path::new("quote"))?;
//! export_workbook(&session, Path::new("quote/idler_costing.xlsx"))?;
//! save_session(&session, Path::new("quote/session.json"))?;
//! # Ok::<(), idler_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, Worksheet};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::calculations::{FrameCostingRecord, RollerCostingRecord};
use crate::errors::{CalcError, CalcResult};
use crate::session::{Session, SCHEMA_VERSION};

/// Default file name of the roller table
pub const ROLLER_TABLE_FILE: &str = "roller_costing.csv";

/// Default file name of the frame table
pub const FRAME_TABLE_FILE: &str = "frame_costing.csv";

/// Default file name of the workbook
pub const WORKBOOK_FILE: &str = "idler_costing.xlsx";

/// Workbook sheet holding the roller table
pub const ROLLER_SHEET: &str = "ROLLER_COSTING";

/// Workbook sheet holding the frame table
pub const FRAME_SHEET: &str = "FRAME_COSTING";

/// Write records as CSV with a header row.
pub fn write_records<W: Write, T: Serialize>(writer: W, records: &[T]) -> CalcResult<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush().map_err(|e| CalcError::serialization(e.to_string()))?;
    Ok(())
}

/// Read records written by [`write_records`].
pub fn read_records<R: Read, T: DeserializeOwned>(reader: R) -> CalcResult<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Records as CSV bytes.
pub fn to_csv_bytes<T: Serialize>(records: &[T]) -> CalcResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_records(&mut buf, records)?;
    Ok(buf)
}

/// Write records to a CSV file atomically.
pub fn export_to_path<T: Serialize>(records: &[T], path: &Path) -> CalcResult<()> {
    let bytes = to_csv_bytes(records)?;
    write_atomic(path, &bytes)?;
    tracing::info!(path = %path.display(), rows = records.len(), "table exported");
    Ok(())
}

/// Read records from a CSV file.
pub fn import_from_path<T: DeserializeOwned>(path: &Path) -> CalcResult<Vec<T>> {
    let file = File::open(path)
        .map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;
    read_records(file)
}

/// Export both tables of a session into `dir` under the default file names.
///
/// Returns the paths written.
pub fn export_session_tables(session: &Session, dir: &Path) -> CalcResult<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).map_err(|e| {
        CalcError::file_error("create directory", dir.display().to_string(), e.to_string())
    })?;
    let rollers = dir.join(ROLLER_TABLE_FILE);
    let frames = dir.join(FRAME_TABLE_FILE);
    export_to_path(session.results.rollers(), &rollers)?;
    export_to_path(session.results.frames(), &frames)?;
    Ok((rollers, frames))
}

/// Both tables as an `.xlsx` workbook in memory.
///
/// An empty table gives an empty sheet.
pub fn workbook_bytes(
    rollers: &[RollerCostingRecord],
    frames: &[FrameCostingRecord],
) -> CalcResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    write_sheet(workbook.add_worksheet(), ROLLER_SHEET, rollers)?;
    write_sheet(workbook.add_worksheet(), FRAME_SHEET, frames)?;
    Ok(workbook.save_to_buffer()?)
}

/// Write both tables of a session to one workbook atomically.
pub fn export_workbook(session: &Session, path: &Path) -> CalcResult<()> {
    let rollers = session.results.rollers();
    let frames = session.results.frames();
    let bytes = workbook_bytes(rollers, frames)?;
    write_atomic(path, &bytes)?;
    tracing::info!(
        path = %path.display(),
        rollers = rollers.len(),
        frames = frames.len(),
        "workbook exported"
    );
    Ok(())
}

/// Fill a sheet with the CSV rendering of `records`, header first.
fn write_sheet<T: Serialize>(sheet: &mut Worksheet, name: &str, records: &[T]) -> CalcResult<()> {
    sheet.set_name(name)?;

    let bytes = to_csv_bytes(records)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes.as_slice());

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let row = u32::try_from(row)
            .map_err(|_| CalcError::serialization(format!("{} has too many rows", name)))?;
        for (col, cell) in record.iter().enumerate() {
            let col = u16::try_from(col)
                .map_err(|_| CalcError::serialization(format!("{} has too many columns", name)))?;
            if cell.is_empty() {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(number) if row > 0 && number.is_finite() => {
                    sheet.write_number(row, col, number)?;
                }
                _ => {
                    sheet.write_string(row, col, cell)?;
                }
            }
        }
    }
    Ok(())
}

/// Save a session as pretty JSON with an atomic write.
pub fn save_session(session: &Session, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(session)
        .map_err(|e| CalcError::serialization(e.to_string()))?;
    write_atomic(path, json.as_bytes())
}

/// Load a session saved by [`save_session`].
pub fn load_session(path: &Path) -> CalcResult<Session> {
    let mut file = File::open(path)
        .map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    let session: Session = serde_json::from_str(&contents).map_err(|e| {
        CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;

    validate_version(&session.meta.version)?;
    Ok(session)
}

/// Only sessions with the current major version can be loaded.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let major = |v: &str| v.split('.').next().map(str::to_string);
    if major(file_version) != major(SCHEMA_VERSION) {
        return Err(CalcError::invalid_input(
            "version",
            file_version,
            format!("Session schema {} is not compatible with {}", file_version, SCHEMA_VERSION),
        ));
    }
    Ok(())
}

/// Write to `<path>.tmp`, sync, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> CalcResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(bytes).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{
        compute_frame_costing, compute_roller_costing, BeltWidthChoice, FrameInput, QuantityMode,
        RollerSpec,
    };
    use crate::catalog::RollerVariant;
    use crate::constants::CostConstants;
    use crate::geometry::{RollerDimensions, WeightMethod};
    use calamine::{open_workbook_auto, Data, DataType, Reader};
    use tempfile::tempdir;

    fn rollers() -> Vec<RollerCostingRecord> {
        [RollerVariant::CarryingWithoutFrame, RollerVariant::Sari, RollerVariant::SariN6012]
            .into_iter()
            .enumerate()
            .map(|(i, variant)| {
                let spec = RollerSpec {
                    variant,
                    dimensions: RollerDimensions {
                        pipe_diameter_mm: 89.0 + i as f64 * 12.5,
                        face_width_mm: 190.0,
                        wall_thickness_mm: 3.2,
                        shaft_diameter_mm: 25.0,
                        shaft_length_mm: 220.0,
                    },
                    quantity: 1 + i as u32,
                    quantity_mode: QuantityMode::Single,
                    weight_method: WeightMethod::ThinShell,
                };
                compute_roller_costing(&spec, &CostConstants::default()).unwrap()
            })
            .collect()
    }

    fn frame() -> FrameCostingRecord {
        compute_frame_costing(
            &FrameInput {
                variant: RollerVariant::Sari,
                belt_width: BeltWidthChoice::Auto {
                    roller_weight_kg: 16.3,
                },
                edited_bom: None,
                declared_quantity: 2,
                set_quantity: 3,
            },
            &CostConstants::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_roller_table_roundtrip() {
        let records = rollers();
        let bytes = to_csv_bytes(&records).unwrap();
        let back: Vec<RollerCostingRecord> = read_records(bytes.as_slice()).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_roller_header_order() {
        let bytes = to_csv_bytes(&rollers()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "variant,belt_width_mm,weight_kg,quantity,quantity_mode,effective_quantity,\
             set_quantity,unit_cost_price,unit_price,total_price"
        );
        assert!(text.contains("SARI,1000,"));
    }

    #[test]
    fn test_frame_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FRAME_TABLE_FILE);
        let records = vec![frame()];

        export_to_path(&records, &path).unwrap();
        assert!(!tmp_path_for(&path).exists());

        let back: Vec<FrameCostingRecord> = import_from_path(&path).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_empty_table_exports() {
        let bytes = to_csv_bytes::<RollerCostingRecord>(&[]).unwrap();
        let back: Vec<RollerCostingRecord> = read_records(bytes.as_slice()).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn test_session_tables_and_json() {
        let dir = tempdir().unwrap();
        let mut session = Session::new();
        for r in rollers() {
            session.record_roller(r);
        }
        session.record_frame(frame());

        let (roller_path, frame_path) = export_session_tables(&session, dir.path()).unwrap();
        assert!(roller_path.ends_with(ROLLER_TABLE_FILE));
        let back: Vec<RollerCostingRecord> = import_from_path(&roller_path).unwrap();
        assert_eq!(back.len(), 3);
        let back: Vec<FrameCostingRecord> = import_from_path(&frame_path).unwrap();
        assert_eq!(back.len(), 1);

        let json_path = dir.path().join("session.json");
        save_session(&session, &json_path).unwrap();
        let loaded = load_session(&json_path).unwrap();
        assert_eq!(loaded.meta.id, session.meta.id);
        assert_eq!(loaded.results, session.results);
    }

    #[test]
    fn test_session_json_keeps_exact_prices() {
        let dir = tempdir().unwrap();
        let mut session = Session::new();
        let record = rollers().remove(0);
        let bits = record.unit_cost_price.to_bits();
        session.record_roller(record);

        let path = dir.path().join("session.json");
        save_session(&session, &path).unwrap();
        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded.results.rollers()[0].unit_cost_price.to_bits(), bits);
    }

    #[test]
    fn test_workbook_sheets() {
        let dir = tempdir().unwrap();
        let mut session = Session::new();
        for r in rollers() {
            session.record_roller(r);
        }
        session.record_frame(frame());

        let path = dir.path().join(WORKBOOK_FILE);
        export_workbook(&session, &path).unwrap();
        assert!(!tmp_path_for(&path).exists());

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![ROLLER_SHEET.to_string(), FRAME_SHEET.to_string()]);

        let rollers_range = workbook.worksheet_range(ROLLER_SHEET).unwrap();
        let rows: Vec<_> = rollers_range.rows().collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][0], Data::String("variant".to_string()));
        assert_eq!(rows[2][0], Data::String("SARI".to_string()));
        // Carrying without frame has no belt width
        assert_eq!(rows[1][1], Data::Empty);
        let total = rows[1][9].get_float().unwrap();
        assert_eq!(total, session.results.rollers()[0].total_price);

        let frames_range = workbook.worksheet_range(FRAME_SHEET).unwrap();
        let rows: Vec<_> = frames_range.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], Data::String("belt_width_mm".to_string()));
        assert_eq!(rows[1][2].get_float(), Some(800.0));
    }

    #[test]
    fn test_workbook_with_empty_tables() {
        let bytes = workbook_bytes(&[], &[]).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.9.3").is_ok());
        assert!(validate_version("1.0.0").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = import_from_path::<RollerCostingRecord>(Path::new("/nonexistent/x.csv")).unwrap_err();
        assert!(matches!(err, CalcError::FileError { .. }));
    }
}
