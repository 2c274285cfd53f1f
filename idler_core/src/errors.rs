//! # Error Types
//!
//! Structured error types for idler_core. Every error is recoverable by
//! returning to an earlier workflow stage; the variants only differ in how far
//! back the caller has to go.
//!
//! ## Example
//!
//! ```rust
//! use idler_core::errors::{CalcError, CalcResult};
//!
//! fn validate_face_width(face_width_mm: f64) -> CalcResult<()> {
//!     if face_width_mm <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "face_width_mm",
//!             face_width_mm.to_string(),
//!             "Face width must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for idler_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for costing operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, not finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The roller variant has no frame (e.g. idlers sold without frame)
    #[error("Frame costing not applicable for roller '{variant}'")]
    UnsupportedFrameFamily { variant: String },

    /// No fabrication table exists for the resolved belt width
    #[error("No frame fabrication table for {family} at {belt_width_mm} mm belt width")]
    NoTemplateForBucket { family: String, belt_width_mm: u32 },

    /// Imported table lacks the column naming the items
    #[error("Imported table must have a column named '{column}'")]
    MissingItemColumn { column: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Serialization/deserialization error (CSV, JSON, TOML, spreadsheet)
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create an UnsupportedFrameFamily error
    pub fn unsupported_frame_family(variant: impl Into<String>) -> Self {
        CalcError::UnsupportedFrameFamily {
            variant: variant.into(),
        }
    }

    /// Create a NoTemplateForBucket error
    pub fn no_template_for_bucket(family: impl Into<String>, belt_width_mm: u32) -> Self {
        CalcError::NoTemplateForBucket {
            family: family.into(),
            belt_width_mm,
        }
    }

    /// Create a MissingItemColumn error
    pub fn missing_item_column(column: impl Into<String>) -> Self {
        CalcError::MissingItemColumn {
            column: column.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Bad or missing user input. The action is not performed and the
    /// workflow stays where it is.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. } | CalcError::MissingField { .. }
        )
    }

    /// Hard stop of the frame sub-flow; the caller goes back to the roller view.
    pub fn is_frame_rejection(&self) -> bool {
        matches!(
            self,
            CalcError::UnsupportedFrameFamily { .. } | CalcError::NoTemplateForBucket { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::UnsupportedFrameFamily { .. } => "UNSUPPORTED_FRAME_FAMILY",
            CalcError::NoTemplateForBucket { .. } => "NO_TEMPLATE_FOR_BUCKET",
            CalcError::MissingItemColumn { .. } => "MISSING_ITEM_COLUMN",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<csv::Error> for CalcError {
    fn from(e: csv::Error) -> Self {
        CalcError::serialization(format!("CSV: {}", e))
    }
}

impl From<rust_xlsxwriter::XlsxError> for CalcError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        CalcError::serialization(format!("XLSX: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("quantity", "0", "Quantity must be at least 1");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("variant").error_code(), "MISSING_FIELD");
        assert_eq!(
            CalcError::no_template_for_bucket("SARI", 1400).error_code(),
            "NO_TEMPLATE_FOR_BUCKET"
        );
        assert_eq!(CalcError::missing_item_column("Item").error_code(), "MISSING_ITEM_COLUMN");
    }

    #[test]
    fn test_error_classes() {
        assert!(CalcError::missing_field("variant").is_validation());
        assert!(!CalcError::missing_field("variant").is_frame_rejection());
        assert!(CalcError::unsupported_frame_family("Impact Idler Without Frame").is_frame_rejection());
        assert!(CalcError::no_template_for_bucket("SACI", 650).is_frame_rejection());
        assert!(!CalcError::missing_item_column("Item").is_validation());
    }

    #[test]
    fn test_error_display() {
        let e = CalcError::no_template_for_bucket("Carrying Idler With Frame", 1600);
        assert_eq!(
            e.to_string(),
            "No frame fabrication table for Carrying Idler With Frame at 1600 mm belt width"
        );
    }
}
