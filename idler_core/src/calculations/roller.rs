//! # Roller Costing
//!
//! Weight, unit cost, unit selling price and line total for one roller line.
//!
//! ## Cost Composition
//!
//! Every variant starts from `weight × steel + housing`, where the housing
//! cost is half the pipe diameter. The rest depends on the variant:
//!
//! | Variant | Added to steel + housing |
//! |---|---|
//! | Carrying without frame | bearings, seal, welding |
//! | Impact without frame | rubber rings (face/35 × 50), bearings, seal, locking ring, welding |
//! | Carrying with frame | locking ring, bearings, seal, welding |
//! | SARI | steel allowance, bearings, seal, welding; always at the baseline prices |
//! | SARI N6012, SACI | bearings, seal, welding, guide roller, pivot bearing |
//!
//! Selling price is the unit cost times the markup; the line total multiplies
//! by the effective quantity (rollers, or sets of three rollers).
//!
//! ## Example
//!
//! ```rust
//! use idler_core::calculations::roller::{calculate, QuantityMode, RollerSpec};
//! use idler_core::catalog::RollerVariant;
//! use idler_core::constants::CostConstants;
//! use idler_core::geometry::{RollerDimensions, WeightMethod};
//!
//! let spec = RollerSpec {
//!     variant: RollerVariant::CarryingWithoutFrame,
//!     dimensions: RollerDimensions {
//!         pipe_diameter_mm: 89.0,
//!         face_width_mm: 190.0,
//!         wall_thickness_mm: 3.2,
//!         shaft_diameter_mm: 25.0,
//!         shaft_length_mm: 220.0,
//!     },
//!     quantity: 1,
//!     quantity_mode: QuantityMode::Single,
//!     weight_method: WeightMethod::ThinShell,
//! };
//!
//! let result = calculate(&spec, &CostConstants::default()).unwrap();
//! assert!((result.record.unit_price - result.record.unit_cost_price * 1.25).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{RollerVariant, SARI_ROLLER_BELT_WIDTH_MM};
use crate::constants::CostConstants;
use crate::errors::{CalcError, CalcResult};
use crate::geometry::{self, RollerDimensions, WeightMethod, WeightResult};

/// Rollers carried by one frame
pub const ROLLERS_PER_SET: u32 = 3;

/// Face width covered by one rubber ring on an impact roller (mm)
pub const RUBBER_RING_PITCH_MM: f64 = 35.0;

/// Price of one rubber ring
pub const RUBBER_RING_COST: f64 = 50.0;

/// How the entered quantity is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityMode {
    /// Quantity is a number of rollers
    #[default]
    Single,
    /// Quantity is a number of sets of three rollers
    Set,
}

impl QuantityMode {
    /// Rollers billed for an entered quantity, `None` if it does not fit a `u32`
    pub fn checked_effective_quantity(&self, quantity: u32) -> Option<u32> {
        match self {
            QuantityMode::Single => Some(quantity),
            QuantityMode::Set => quantity.checked_mul(ROLLERS_PER_SET),
        }
    }

    /// Rollers billed for an entered quantity. Saturates at `u32::MAX`;
    /// `RollerSpec::validate` rejects quantities that would overflow.
    pub fn effective_quantity(&self, quantity: u32) -> u32 {
        self.checked_effective_quantity(quantity).unwrap_or(u32::MAX)
    }

    /// Frames needed for an entered quantity. Loose rollers are grouped
    /// three to a frame, rounding up.
    pub fn set_quantity(&self, quantity: u32) -> u32 {
        match self {
            QuantityMode::Single => quantity.div_ceil(ROLLERS_PER_SET),
            QuantityMode::Set => quantity,
        }
    }
}

/// Input for one roller costing.
///
/// ## JSON Example
///
/// ```json
/// {
///   "variant": "CARRYING_WITH_FRAME",
///   "dimensions": {
///     "pipe_diameter_mm": 89.0,
///     "face_width_mm": 190.0,
///     "wall_thickness_mm": 3.2,
///     "shaft_diameter_mm": 25.0,
///     "shaft_length_mm": 220.0
///   },
///   "quantity": 10,
///   "quantity_mode": "set"
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollerSpec {
    /// Roller product line
    pub variant: RollerVariant,

    /// Pipe and shaft dimensions
    pub dimensions: RollerDimensions,

    /// Number of rollers or sets, see `quantity_mode`
    pub quantity: u32,

    /// Whether `quantity` counts rollers or sets
    #[serde(default)]
    pub quantity_mode: QuantityMode,

    /// Pipe weight formula
    #[serde(default)]
    pub weight_method: WeightMethod,
}

impl RollerSpec {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        self.dimensions.validate()?;
        if self.quantity == 0 {
            return Err(CalcError::invalid_input(
                "quantity",
                "0",
                "Quantity must be at least 1",
            ));
        }
        if self
            .quantity_mode
            .checked_effective_quantity(self.quantity)
            .is_none()
        {
            return Err(CalcError::invalid_input(
                "quantity",
                self.quantity.to_string(),
                "Too many sets: roller count exceeds the supported maximum",
            ));
        }
        Ok(())
    }

    /// Rollers billed on this line
    pub fn effective_quantity(&self) -> u32 {
        self.quantity_mode.effective_quantity(self.quantity)
    }

    /// Frames that go with this line
    pub fn set_quantity(&self) -> u32 {
        self.quantity_mode.set_quantity(self.quantity)
    }
}

/// Itemized unit cost of one roller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Weight × steel price
    pub material_cost: f64,
    /// Half the pipe diameter
    pub housing_cost: f64,
    /// Flat steel allowance (SARI only)
    pub steel_allowance_cost: f64,
    pub bearing_cost: f64,
    pub seal_cost: f64,
    pub welding_cost: f64,
    pub locking_ring_cost: f64,
    /// Rubber rings on impact rollers
    pub rubber_ring_cost: f64,
    pub guide_roller_cost: f64,
    pub pivot_bearing_cost: f64,
    /// Sum of all parts
    pub unit_cost_price: f64,
    /// Markup applied to this roller
    pub markup: f64,
    /// Unit cost × markup
    pub unit_price: f64,
    /// Rollers billed
    pub effective_quantity: u32,
    /// Unit cost × effective quantity
    pub cost_price_for_quantity: f64,
    /// Unit price × effective quantity
    pub total_price: f64,
}

impl CostBreakdown {
    /// Markup as a percentage over cost (1.25 → 25%)
    pub fn markup_percent(&self) -> f64 {
        (self.markup - 1.0) * 100.0
    }
}

/// One committed line of the roller costing table.
///
/// Field order is the column order of the exported table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollerCostingRecord {
    pub variant: RollerVariant,
    /// Fixed belt width the roller is quoted against (SARI only)
    pub belt_width_mm: Option<u32>,
    /// Pipe + shaft weight of one roller (kg)
    pub weight_kg: f64,
    /// Quantity as entered
    pub quantity: u32,
    pub quantity_mode: QuantityMode,
    /// Rollers billed
    pub effective_quantity: u32,
    /// Frames that go with this line
    pub set_quantity: u32,
    pub unit_cost_price: f64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Full result of a roller costing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollerResult {
    pub weight: WeightResult,
    pub breakdown: CostBreakdown,
    pub record: RollerCostingRecord,
}

/// Itemize the unit cost of a roller of known weight.
pub fn cost_breakdown(spec: &RollerSpec, weight_kg: f64, constants: &CostConstants) -> CostBreakdown {
    // SARI is always quoted at the shop baseline
    let c = match spec.variant {
        RollerVariant::Sari => &CostConstants::BASELINE,
        _ => constants,
    };

    let base = CostBreakdown {
        material_cost: weight_kg * c.steel_cost_per_kg,
        housing_cost: spec.dimensions.pipe_diameter_mm / 2.0,
        bearing_cost: c.bearing_pair_cost,
        seal_cost: c.seal_cost,
        welding_cost: c.welding_cost,
        markup: c.markup,
        ..Default::default()
    };

    let mut b = match spec.variant {
        RollerVariant::CarryingWithoutFrame => base,
        RollerVariant::ImpactWithoutFrame => CostBreakdown {
            rubber_ring_cost: spec.dimensions.face_width_mm / RUBBER_RING_PITCH_MM
                * RUBBER_RING_COST,
            locking_ring_cost: c.locking_ring_cost,
            ..base
        },
        RollerVariant::CarryingWithFrame => CostBreakdown {
            locking_ring_cost: c.locking_ring_cost,
            ..base
        },
        RollerVariant::Sari => CostBreakdown {
            steel_allowance_cost: c.steel_cost_per_kg,
            ..base
        },
        RollerVariant::SariN6012 | RollerVariant::Saci => CostBreakdown {
            guide_roller_cost: c.guide_roller_cost,
            pivot_bearing_cost: c.pivot_bearing_cost,
            ..base
        },
    };

    b.unit_cost_price = b.material_cost
        + b.housing_cost
        + b.steel_allowance_cost
        + b.bearing_cost
        + b.seal_cost
        + b.welding_cost
        + b.locking_ring_cost
        + b.rubber_ring_cost
        + b.guide_roller_cost
        + b.pivot_bearing_cost;
    b.unit_price = b.unit_cost_price * b.markup;
    b.effective_quantity = spec.effective_quantity();
    b.cost_price_for_quantity = b.unit_cost_price * b.effective_quantity as f64;
    b.total_price = b.unit_price * b.effective_quantity as f64;
    b
}

/// Cost a roller line.
///
/// # Returns
///
/// * `Ok(RollerResult)` - Weight, itemized cost and the table record
/// * `Err(CalcError)` - If dimensions or quantity are invalid
pub fn calculate(spec: &RollerSpec, constants: &CostConstants) -> CalcResult<RollerResult> {
    spec.validate()?;

    let weight = geometry::calculate(&spec.dimensions, spec.weight_method);
    let breakdown = cost_breakdown(spec, weight.total_weight_kg, constants);

    tracing::debug!(
        variant = %spec.variant,
        pipe_kg = weight.pipe_weight_kg,
        shaft_kg = weight.shaft_weight_kg,
        shaft_d_mm = weight.shaft_diameter_used_mm,
        unit_cost = breakdown.unit_cost_price,
        "roller costed"
    );

    let belt_width_mm = match spec.variant {
        RollerVariant::Sari => Some(SARI_ROLLER_BELT_WIDTH_MM),
        _ => None,
    };

    let record = RollerCostingRecord {
        variant: spec.variant,
        belt_width_mm,
        weight_kg: weight.total_weight_kg,
        quantity: spec.quantity,
        quantity_mode: spec.quantity_mode,
        effective_quantity: breakdown.effective_quantity,
        set_quantity: spec.set_quantity(),
        unit_cost_price: breakdown.unit_cost_price,
        unit_price: breakdown.unit_price,
        total_price: breakdown.total_price,
    };

    Ok(RollerResult {
        weight,
        breakdown,
        record,
    })
}

/// Cost a roller line and keep only the table record.
pub fn compute_roller_costing(
    spec: &RollerSpec,
    constants: &CostConstants,
) -> CalcResult<RollerCostingRecord> {
    calculate(spec, constants).map(|r| r.record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ConstantKey;

    fn test_spec(variant: RollerVariant) -> RollerSpec {
        RollerSpec {
            variant,
            dimensions: RollerDimensions {
                pipe_diameter_mm: 89.0,
                face_width_mm: 190.0,
                wall_thickness_mm: 3.2,
                shaft_diameter_mm: 25.0,
                shaft_length_mm: 220.0,
            },
            quantity: 1,
            quantity_mode: QuantityMode::Single,
            weight_method: WeightMethod::ThinShell,
        }
    }

    #[test]
    fn test_carrying_without_frame_reference() {
        let spec = test_spec(RollerVariant::CarryingWithoutFrame);
        let result = calculate(&spec, &CostConstants::default()).unwrap();
        let w = result.weight.total_weight_kg;

        assert_eq!(result.weight.shaft_diameter_used_mm, 28.0);
        assert!((w - 2.3979).abs() < 1e-3);

        let expected_cost = w * 70.0 + 44.5 + 100.0 + 30.0 + 80.0;
        assert!((result.record.unit_cost_price - expected_cost).abs() < 1e-9);
        assert!((result.record.unit_price - expected_cost * 1.25).abs() < 1e-9);
        assert!((result.record.total_price - expected_cost * 1.25).abs() < 1e-9);
        assert_eq!(result.record.belt_width_mm, None);
    }

    #[test]
    fn test_impact_adds_rubber_rings_and_locking_ring() {
        let mut constants = CostConstants::default();
        constants.set(ConstantKey::LockingRingCost, 15.0).unwrap();

        let carrying = calculate(&test_spec(RollerVariant::CarryingWithoutFrame), &constants).unwrap();
        let impact = calculate(&test_spec(RollerVariant::ImpactWithoutFrame), &constants).unwrap();

        let rings = 190.0 / 35.0 * 50.0;
        assert!((impact.breakdown.rubber_ring_cost - rings).abs() < 1e-9);
        assert!(
            (impact.record.unit_cost_price - carrying.record.unit_cost_price - rings - 15.0).abs()
                < 1e-9
        );
    }

    #[test]
    fn test_carrying_with_frame_adds_locking_ring() {
        let mut constants = CostConstants::default();
        constants.set(ConstantKey::LockingRingCost, 12.0).unwrap();
        let without = calculate(&test_spec(RollerVariant::CarryingWithoutFrame), &constants).unwrap();
        let with = calculate(&test_spec(RollerVariant::CarryingWithFrame), &constants).unwrap();
        assert!((with.record.unit_cost_price - without.record.unit_cost_price - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_sari_ignores_overrides() {
        let mut constants = CostConstants::default();
        constants.set(ConstantKey::SteelCostPerKg, 500.0).unwrap();
        constants.set(ConstantKey::Markup, 3.0).unwrap();
        constants.set(ConstantKey::SealCost, 999.0).unwrap();

        let overridden = calculate(&test_spec(RollerVariant::Sari), &constants).unwrap();
        let baseline = calculate(&test_spec(RollerVariant::Sari), &CostConstants::default()).unwrap();
        assert_eq!(overridden.record, baseline.record);

        let w = baseline.weight.total_weight_kg;
        let expected = w * 70.0 + 44.5 + 70.0 + 100.0 + 30.0 + 80.0;
        assert!((baseline.record.unit_cost_price - expected).abs() < 1e-9);
        assert!((baseline.record.unit_price - expected * 1.25).abs() < 1e-9);
        assert_eq!(baseline.record.belt_width_mm, Some(1000));
    }

    #[test]
    fn test_self_aligning_variants_include_accessories() {
        let constants = CostConstants::default();
        let plain = calculate(&test_spec(RollerVariant::CarryingWithoutFrame), &constants).unwrap();
        for variant in [RollerVariant::SariN6012, RollerVariant::Saci] {
            let r = calculate(&test_spec(variant), &constants).unwrap();
            assert!(
                (r.record.unit_cost_price - plain.record.unit_cost_price - 400.0 - 1000.0).abs()
                    < 1e-9
            );
        }
    }

    #[test]
    fn test_set_mode_triples_quantity() {
        let mut spec = test_spec(RollerVariant::CarryingWithFrame);
        spec.quantity = 4;
        spec.quantity_mode = QuantityMode::Set;

        let r = calculate(&spec, &CostConstants::default()).unwrap();
        assert_eq!(r.record.effective_quantity, 12);
        assert_eq!(r.record.set_quantity, 4);
        assert!((r.record.total_price - r.record.unit_price * 12.0).abs() < 1e-9);
        assert!((r.breakdown.cost_price_for_quantity - r.record.unit_cost_price * 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_mode_groups_three_per_set() {
        assert_eq!(QuantityMode::Single.set_quantity(1), 1);
        assert_eq!(QuantityMode::Single.set_quantity(3), 1);
        assert_eq!(QuantityMode::Single.set_quantity(7), 3);
        assert_eq!(QuantityMode::Set.set_quantity(7), 7);
        assert_eq!(QuantityMode::Single.effective_quantity(7), 7);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut spec = test_spec(RollerVariant::CarryingWithoutFrame);
        spec.quantity = 0;
        let err = calculate(&spec, &CostConstants::default()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_set_quantity_overflow_rejected() {
        let c = CostConstants::default();
        let mut spec = test_spec(RollerVariant::CarryingWithoutFrame);
        spec.quantity_mode = QuantityMode::Set;

        // 1_431_655_765 × 3 == u32::MAX
        spec.quantity = 1_431_655_765;
        let record = compute_roller_costing(&spec, &c).unwrap();
        assert_eq!(record.effective_quantity, u32::MAX);

        for quantity in [1_431_655_766, 1_500_000_000, u32::MAX] {
            spec.quantity = quantity;
            let err = calculate(&spec, &c).unwrap_err();
            assert!(err.is_validation());
            assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "quantity"));
        }

        // Loose rollers never overflow
        spec.quantity_mode = QuantityMode::Single;
        spec.quantity = u32::MAX;
        assert!(calculate(&spec, &c).is_ok());
        assert_eq!(QuantityMode::Set.effective_quantity(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_deterministic() {
        let spec = test_spec(RollerVariant::Saci);
        let c = CostConstants::default();
        assert_eq!(calculate(&spec, &c).unwrap(), calculate(&spec, &c).unwrap());
    }

    #[test]
    fn test_markup_percent() {
        let r = calculate(&test_spec(RollerVariant::CarryingWithoutFrame), &CostConstants::default())
            .unwrap();
        assert!((r.breakdown.markup_percent() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_spec_json_defaults() {
        let json = r#"{
            "variant": "SACI",
            "dimensions": {
                "pipe_diameter_mm": 108.0,
                "face_width_mm": 380.0,
                "wall_thickness_mm": 3.6,
                "shaft_diameter_mm": 30.0,
                "shaft_length_mm": 410.0
            },
            "quantity": 2
        }"#;
        let spec: RollerSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.quantity_mode, QuantityMode::Single);
        assert_eq!(spec.weight_method, WeightMethod::ThinShell);
        assert!(spec.validate().is_ok());
    }
}
