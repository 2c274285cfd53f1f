//! Set pricing: three rollers on one frame.

use serde::{Deserialize, Serialize};

use crate::calculations::frame::FrameCostingRecord;
use crate::calculations::roller::{RollerCostingRecord, ROLLERS_PER_SET};
use crate::catalog::RollerVariant;
use crate::errors::{CalcError, CalcResult};

/// Price of complete sets built from a roller line and its frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCosting {
    pub variant: RollerVariant,
    pub belt_width_mm: u32,
    pub rollers_per_set: u32,
    pub roller_unit_price: f64,
    pub frame_unit_price: f64,
    /// rollers_per_set × roller unit price + frame unit price
    pub set_unit_price: f64,
    pub set_quantity: u32,
    pub total_price: f64,
}

/// Combine a roller line with the frame costed for it.
///
/// The frame must belong to the roller's family.
pub fn compose_set(
    roller: &RollerCostingRecord,
    frame: &FrameCostingRecord,
) -> CalcResult<SetCosting> {
    if roller.variant.frame_family() != Some(frame.family) {
        return Err(CalcError::invalid_input(
            "frame",
            frame.family.display_name(),
            format!("Frame does not fit roller '{}'", roller.variant),
        ));
    }

    let set_unit_price = roller.unit_price * ROLLERS_PER_SET as f64 + frame.unit_price;
    Ok(SetCosting {
        variant: roller.variant,
        belt_width_mm: frame.belt_width_mm,
        rollers_per_set: ROLLERS_PER_SET,
        roller_unit_price: roller.unit_price,
        frame_unit_price: frame.unit_price,
        set_unit_price,
        set_quantity: roller.set_quantity,
        total_price: set_unit_price * roller.set_quantity as f64,
    })
}
