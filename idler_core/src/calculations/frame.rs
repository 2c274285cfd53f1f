//! # Frame Costing
//!
//! Picks the belt width for a frame, weighs it from its fabrication table and
//! prices it for the number of sets the roller line needs.
//!
//! ## Belt Width
//!
//! - `Auto` derives the width from the roller weight through the bracket
//!   table. A bucket the family has no reference weight for is replaced by
//!   the nearest width the family does define.
//! - `Manual` must name a width in the family's reference table.
//!
//! ## Frame Weight
//!
//! The sum of the fabrication table rows, as edited. An edited table with no
//! rows falls back to the reference weight for that width.
//!
//! ## Unit Cost
//!
//! - Welded frames: `weight × frame rate + welding + frame base cost`
//! - SARI frame: `weight × 100 + guide roller + pivot bearing`, at the
//!   baseline rate and markup
//!
//! The frame total is always the unit price times the set quantity of the
//! roller line. The quantity typed on the frame form is kept on the record
//! for reference only.

use serde::{Deserialize, Serialize};

use crate::catalog::{
    bucket_for_weight, frame_tables, nearest_available, FrameBoMLine, FrameCostRule,
    FrameFamily, RollerVariant,
};
use crate::constants::CostConstants;
use crate::errors::{CalcError, CalcResult};

/// How the frame's belt width is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BeltWidthChoice {
    /// Derive from the roller weight
    Auto { roller_weight_kg: f64 },
    /// Use the width given
    Manual { belt_width_mm: u32 },
}

/// Where the frame weight came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameWeightSource {
    /// Sum of the fabrication table rows
    FabricationTable,
    /// Catalog reference weight
    ReferenceTable,
}

/// Input for one frame costing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Roller variant the frame carries
    pub variant: RollerVariant,

    pub belt_width: BeltWidthChoice,

    /// Edited fabrication rows. `None` uses the template as shipped.
    #[serde(default)]
    pub edited_bom: Option<Vec<FrameBoMLine>>,

    /// Frame quantity typed by the user (not used in the total)
    #[serde(default = "default_declared_quantity")]
    pub declared_quantity: u32,

    /// Sets required by the roller line
    pub set_quantity: u32,
}

fn default_declared_quantity() -> u32 {
    1
}

/// Frame parameters collected by the workflow. Set quantity and roller
/// weight come from the last roller costing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRequest {
    /// `None` selects the width from the roller weight
    #[serde(default)]
    pub manual_belt_width_mm: Option<u32>,

    #[serde(default)]
    pub edited_bom: Option<Vec<FrameBoMLine>>,

    #[serde(default = "default_declared_quantity")]
    pub declared_quantity: u32,
}

impl Default for FrameRequest {
    fn default() -> Self {
        Self {
            manual_belt_width_mm: None,
            edited_bom: None,
            declared_quantity: default_declared_quantity(),
        }
    }
}

/// Outcome of belt width selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeltWidthResolution {
    /// Width asked for, or the bucket the roller weight fell in
    pub requested_mm: u32,
    /// Width used
    pub selected_mm: u32,
}

impl BeltWidthResolution {
    /// Whether the bucket was replaced by the nearest defined width
    pub fn was_reselected(&self) -> bool {
        self.requested_mm != self.selected_mm
    }
}

/// One committed line of the frame costing table.
///
/// Field order is the column order of the exported table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameCostingRecord {
    pub family: FrameFamily,
    pub description: String,
    pub belt_width_mm: u32,
    pub frame_weight_kg: f64,
    pub weight_source: FrameWeightSource,
    pub frame_rate_per_kg: f64,
    pub unit_cost_price: f64,
    pub declared_quantity: u32,
    pub set_quantity: u32,
    pub total_cost_price: f64,
    pub markup: f64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Full result of a frame costing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub belt_width: BeltWidthResolution,
    /// Rows the weight was summed from
    pub bom: Vec<FrameBoMLine>,
    pub record: FrameCostingRecord,
}

/// Resolve the belt width of a frame.
///
/// # Errors
///
/// `NoTemplateForBucket` when a manual width has no reference weight for the
/// family.
pub fn resolve_belt_width(
    family: FrameFamily,
    choice: BeltWidthChoice,
) -> CalcResult<BeltWidthResolution> {
    let defined = frame_tables::reference_widths(family);
    match choice {
        BeltWidthChoice::Auto { roller_weight_kg } => {
            let bucket = bucket_for_weight(roller_weight_kg);
            let selected = if defined.contains(&bucket) {
                bucket
            } else {
                nearest_available(bucket, &defined)
                    .ok_or_else(|| CalcError::no_template_for_bucket(family.display_name(), bucket))?
            };
            if selected != bucket {
                tracing::debug!(%family, bucket, selected, "belt width reselected");
            }
            Ok(BeltWidthResolution {
                requested_mm: bucket,
                selected_mm: selected,
            })
        }
        BeltWidthChoice::Manual { belt_width_mm } => {
            if !defined.contains(&belt_width_mm) {
                return Err(CalcError::no_template_for_bucket(
                    family.display_name(),
                    belt_width_mm,
                ));
            }
            Ok(BeltWidthResolution {
                requested_mm: belt_width_mm,
                selected_mm: belt_width_mm,
            })
        }
    }
}

/// Unit cost, frame rate and markup for a frame of known weight.
fn unit_cost(family: FrameFamily, weight_kg: f64, constants: &CostConstants) -> (f64, f64, f64) {
    match family.cost_rule() {
        FrameCostRule::Welded => {
            let rate = constants.frame_rate_per_kg;
            let cost = weight_kg * rate + constants.welding_cost + constants.frame_base_cost;
            (cost, rate, constants.markup)
        }
        FrameCostRule::SelfAligning => {
            let baseline = CostConstants::BASELINE;
            let rate = baseline.frame_rate_per_kg;
            let cost = weight_kg * rate + constants.guide_roller_cost + constants.pivot_bearing_cost;
            (cost, rate, baseline.markup)
        }
    }
}

/// Cost a frame.
///
/// # Returns
///
/// * `Ok(FrameResult)` - Selected width, rows used and the table record
/// * `Err(CalcError)` - `UnsupportedFrameFamily` for loose-roller variants,
///   `NoTemplateForBucket` when the width has no fabrication table, or a
///   validation error for a malformed row or zero set quantity
pub fn calculate(input: &FrameInput, constants: &CostConstants) -> CalcResult<FrameResult> {
    let family = FrameFamily::try_from(input.variant)?;

    if input.set_quantity == 0 {
        return Err(CalcError::invalid_input(
            "set_quantity",
            "0",
            "Set quantity must be at least 1",
        ));
    }

    let belt_width = resolve_belt_width(family, input.belt_width)?;
    let template = frame_tables::template(family, belt_width.selected_mm)?;

    let bom = match &input.edited_bom {
        Some(lines) => {
            for line in lines {
                line.validate()?;
            }
            lines.clone()
        }
        None => template.lines,
    };

    let (frame_weight_kg, weight_source) = if bom.is_empty() {
        let reference = frame_tables::reference_weight(family, belt_width.selected_mm)
            .ok_or_else(|| {
                CalcError::no_template_for_bucket(family.display_name(), belt_width.selected_mm)
            })?;
        (reference, FrameWeightSource::ReferenceTable)
    } else {
        let sum = bom.iter().map(|l| l.total_weight_kg).sum();
        (sum, FrameWeightSource::FabricationTable)
    };

    let (unit_cost_price, frame_rate_per_kg, markup) = unit_cost(family, frame_weight_kg, constants);
    let unit_price = unit_cost_price * markup;
    let sets = input.set_quantity as f64;

    tracing::debug!(
        %family,
        belt_width_mm = belt_width.selected_mm,
        frame_kg = frame_weight_kg,
        unit_cost = unit_cost_price,
        "frame costed"
    );

    let record = FrameCostingRecord {
        family,
        description: family.frame_description(belt_width.selected_mm),
        belt_width_mm: belt_width.selected_mm,
        frame_weight_kg,
        weight_source,
        frame_rate_per_kg,
        unit_cost_price,
        declared_quantity: input.declared_quantity,
        set_quantity: input.set_quantity,
        total_cost_price: unit_cost_price * sets,
        markup,
        unit_price,
        total_price: unit_price * sets,
    };

    Ok(FrameResult {
        belt_width,
        bom,
        record,
    })
}

/// Cost a frame and keep only the table record.
pub fn compute_frame_costing(
    input: &FrameInput,
    constants: &CostConstants,
) -> CalcResult<FrameCostingRecord> {
    calculate(input, constants).map(|r| r.record)
}
