//! Append-only tables of committed costing lines.

use serde::{Deserialize, Serialize};

use crate::calculations::{CostingItem, FrameCostingRecord, RollerCostingRecord};

/// Roller and frame costing tables, in commit order.
///
/// Records can only be appended; the tables are emptied as a whole by
/// [`ResultAccumulator::clear`] when a session resets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultAccumulator {
    rollers: Vec<RollerCostingRecord>,
    frames: Vec<FrameCostingRecord>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a roller line.
    pub fn push_roller(&mut self, record: RollerCostingRecord) {
        tracing::info!(
            variant = %record.variant,
            quantity = record.quantity,
            total = record.total_price,
            "roller line committed"
        );
        self.rollers.push(record);
    }

    /// Append a frame line.
    pub fn push_frame(&mut self, record: FrameCostingRecord) {
        tracing::info!(
            frame = %record.description,
            sets = record.set_quantity,
            total = record.total_price,
            "frame line committed"
        );
        self.frames.push(record);
    }

    /// Append a line to the table it belongs in.
    pub fn push(&mut self, item: CostingItem) {
        match item {
            CostingItem::Roller(r) => self.push_roller(r),
            CostingItem::Frame(f) => self.push_frame(f),
        }
    }

    pub fn rollers(&self) -> &[RollerCostingRecord] {
        &self.rollers
    }

    pub fn frames(&self) -> &[FrameCostingRecord] {
        &self.frames
    }

    /// Most recent roller line
    pub fn last_roller(&self) -> Option<&RollerCostingRecord> {
        self.rollers.last()
    }

    pub fn is_empty(&self) -> bool {
        self.rollers.is_empty() && self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rollers.len() + self.frames.len()
    }

    /// Selling price of every roller line
    pub fn roller_total(&self) -> f64 {
        self.rollers.iter().map(|r| r.total_price).sum()
    }

    /// Selling price of every frame line
    pub fn frame_total(&self) -> f64 {
        self.frames.iter().map(|f| f.total_price).sum()
    }

    /// Selling price of everything committed
    pub fn grand_total(&self) -> f64 {
        self.roller_total() + self.frame_total()
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.rollers.clear();
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{compute_roller_costing, QuantityMode, RollerSpec};
    use crate::catalog::RollerVariant;
    use crate::constants::CostConstants;
    use crate::geometry::{RollerDimensions, WeightMethod};

    fn record(variant: RollerVariant, quantity: u32) -> RollerCostingRecord {
        let spec = RollerSpec {
            variant,
            dimensions: RollerDimensions {
                pipe_diameter_mm: 89.0,
                face_width_mm: 190.0,
                wall_thickness_mm: 3.2,
                shaft_diameter_mm: 25.0,
                shaft_length_mm: 220.0,
            },
            quantity,
            quantity_mode: QuantityMode::Single,
            weight_method: WeightMethod::ThinShell,
        };
        compute_roller_costing(&spec, &CostConstants::default()).unwrap()
    }

    #[test]
    fn test_append_order_preserved() {
        let mut acc = ResultAccumulator::new();
        assert!(acc.is_empty());

        acc.push_roller(record(RollerVariant::CarryingWithoutFrame, 1));
        acc.push(CostingItem::Roller(record(RollerVariant::Saci, 2)));

        assert_eq!(acc.len(), 2);
        assert_eq!(acc.rollers()[0].variant, RollerVariant::CarryingWithoutFrame);
        assert_eq!(acc.last_roller().unwrap().variant, RollerVariant::Saci);
        assert!(acc.frames().is_empty());
    }

    #[test]
    fn test_totals_and_clear() {
        let mut acc = ResultAccumulator::new();
        let a = record(RollerVariant::CarryingWithoutFrame, 2);
        let b = record(RollerVariant::ImpactWithoutFrame, 3);
        let expected = a.total_price + b.total_price;
        acc.push_roller(a);
        acc.push_roller(b);

        assert!((acc.grand_total() - expected).abs() < 1e-9);
        assert_eq!(acc.frame_total(), 0.0);

        acc.clear();
        assert!(acc.is_empty());
        assert_eq!(acc.grand_total(), 0.0);
    }
}
