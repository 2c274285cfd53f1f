//! # idler_core - Conveyor Idler Costing Engine
//!
//! `idler_core` prices conveyor idler rollers and their frames: roller weight
//! from pipe and shaft dimensions, unit cost and selling price per roller
//! variant, belt width and frame weight from fabrication tables, and the
//! session workflow that collects it all into costing tables. All inputs and
//! outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless calculations**: Pure functions from input and constants to records
//! - **Explicit session**: The caller owns the [`session::Session`]; [`workflow::step`]
//!   is the only thing that moves it
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use idler_core::calculations::{compute_roller_costing, QuantityMode, RollerSpec};
//! use idler_core::catalog::RollerVariant;
//! use idler_core::constants::CostConstants;
//! use idler_core::geometry::{RollerDimensions, WeightMethod};
//!
//! let spec = RollerSpec {
//!     variant: RollerVariant::CarryingWithFrame,
//!     dimensions: RollerDimensions {
//!         pipe_diameter_mm: 89.0,
//!         face_width_mm: 190.0,
//!         wall_thickness_mm: 3.2,
//!         shaft_diameter_mm: 25.0,
//!         shaft_length_mm: 220.0,
//!     },
//!     quantity: 2,
//!     quantity_mode: QuantityMode::Set,
//!     weight_method: WeightMethod::ThinShell,
//! };
//!
//! let record = compute_roller_costing(&spec, &CostConstants::default()).unwrap();
//! assert_eq!(record.effective_quantity, 6);
//! ```
//!
//! ## Modules
//!
//! - [`geometry`] - Pipe and shaft weight
//! - [`constants`] - Cost constants and their config files
//! - [`catalog`] - Roller variants, belt widths, frame reference tables
//! - [`calculations`] - Roller, frame and set costing
//! - [`accumulator`] - Committed costing tables
//! - [`session`] / [`workflow`] - Session state and the step function
//! - [`export`] - CSV tables and session files
//! - [`import`] / [`bulk_estimate`] - Bulk price estimator
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod accumulator;
pub mod bulk_estimate;
pub mod calculations;
pub mod catalog;
pub mod constants;
pub mod errors;
pub mod export;
pub mod geometry;
pub mod import;
pub mod session;
pub mod units;
pub mod workflow;

// Re-export commonly used types at crate root for convenience
pub use constants::{ConstantKey, CostConstants};
pub use errors::{CalcError, CalcResult};
pub use session::Session;
pub use workflow::{step, Action, Stage, StepEvent, StepOutcome};
