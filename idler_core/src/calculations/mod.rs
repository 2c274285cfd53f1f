//! # Costing Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Spec` / `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Full calculation result (JSON-serializable)
//! - `calculate(input, constants) -> Result<*Result, CalcError>` - Pure calculation function
//! - `*CostingRecord` - The flat row kept in the costing tables
//!
//! ## Available Calculations
//!
//! - [`roller`] - Roller weight, cost and selling price
//! - [`frame`] - Belt width selection and frame costing
//! - [`set`] - Three rollers plus one frame

pub mod frame;
pub mod roller;
pub mod set;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use frame::{
    compute_frame_costing, BeltWidthChoice, BeltWidthResolution, FrameCostingRecord, FrameInput,
    FrameRequest, FrameResult, FrameWeightSource,
};
pub use roller::{
    compute_roller_costing, CostBreakdown, QuantityMode, RollerCostingRecord, RollerResult,
    RollerSpec, ROLLERS_PER_SET,
};
pub use set::{compose_set, SetCosting};

/// Enum wrapper for committed costing records.
///
/// Lets roller and frame lines travel through one channel while each keeps
/// its own table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CostingItem {
    Roller(RollerCostingRecord),
    Frame(FrameCostingRecord),
}

impl From<RollerCostingRecord> for CostingItem {
    fn from(record: RollerCostingRecord) -> Self {
        CostingItem::Roller(record)
    }
}

impl From<FrameCostingRecord> for CostingItem {
    fn from(record: FrameCostingRecord) -> Self {
        CostingItem::Frame(record)
    }
}
