//! # Cost Constants
//!
//! The price table every calculation in a session reads from. Each field has
//! a shop baseline; a session may override any subset, either field by field
//! through [`ConstantKey`] or from a `.toml`/`.json` file.
//!
//! Missing fields in a file keep their baseline value, so a file containing
//! only `steel_cost_per_kg = 82.0` is a valid override.
//!
//! ## Example
//!
//! ```rust
//! use idler_core::constants::{ConstantKey, CostConstants};
//!
//! let mut constants = CostConstants::default();
//! constants.set(ConstantKey::Markup, 1.4).unwrap();
//! assert_eq!(constants.get(ConstantKey::Markup), 1.4);
//! assert_eq!(constants.steel_cost_per_kg, 70.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Per-component costs and multipliers, in currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConstants {
    /// Steel price per kilogram
    pub steel_cost_per_kg: f64,
    /// Pair of roller bearings
    pub bearing_pair_cost: f64,
    /// Seal set
    pub seal_cost: f64,
    /// Welding per roller
    pub welding_cost: f64,
    /// Selling price = cost price × markup
    pub markup: f64,
    /// Frame fabrication price per kilogram
    pub frame_rate_per_kg: f64,
    /// Fixed per-frame amount on welded frames
    pub frame_base_cost: f64,
    /// Locking ring
    pub locking_ring_cost: f64,
    /// Guide roller on self-aligning idlers
    pub guide_roller_cost: f64,
    /// Pivot bearing on self-aligning idlers
    pub pivot_bearing_cost: f64,
}

impl CostConstants {
    /// Shop baseline
    pub const BASELINE: CostConstants = CostConstants {
        steel_cost_per_kg: 70.0,
        bearing_pair_cost: 100.0,
        seal_cost: 30.0,
        welding_cost: 80.0,
        markup: 1.25,
        frame_rate_per_kg: 100.0,
        frame_base_cost: 0.0,
        locking_ring_cost: 0.0,
        guide_roller_cost: 400.0,
        pivot_bearing_cost: 1000.0,
    };

    /// Read one constant by name.
    pub fn get(&self, key: ConstantKey) -> f64 {
        match key {
            ConstantKey::SteelCostPerKg => self.steel_cost_per_kg,
            ConstantKey::BearingPairCost => self.bearing_pair_cost,
            ConstantKey::SealCost => self.seal_cost,
            ConstantKey::WeldingCost => self.welding_cost,
            ConstantKey::Markup => self.markup,
            ConstantKey::FrameRatePerKg => self.frame_rate_per_kg,
            ConstantKey::FrameBaseCost => self.frame_base_cost,
            ConstantKey::LockingRingCost => self.locking_ring_cost,
            ConstantKey::GuideRollerCost => self.guide_roller_cost,
            ConstantKey::PivotBearingCost => self.pivot_bearing_cost,
        }
    }

    /// Override one constant by name. The table is left untouched when the
    /// value is rejected.
    pub fn set(&mut self, key: ConstantKey, value: f64) -> CalcResult<()> {
        validate_value(key, value)?;
        let slot = match key {
            ConstantKey::SteelCostPerKg => &mut self.steel_cost_per_kg,
            ConstantKey::BearingPairCost => &mut self.bearing_pair_cost,
            ConstantKey::SealCost => &mut self.seal_cost,
            ConstantKey::WeldingCost => &mut self.welding_cost,
            ConstantKey::Markup => &mut self.markup,
            ConstantKey::FrameRatePerKg => &mut self.frame_rate_per_kg,
            ConstantKey::FrameBaseCost => &mut self.frame_base_cost,
            ConstantKey::LockingRingCost => &mut self.locking_ring_cost,
            ConstantKey::GuideRollerCost => &mut self.guide_roller_cost,
            ConstantKey::PivotBearingCost => &mut self.pivot_bearing_cost,
        };
        *slot = value;
        Ok(())
    }

    /// Validate every constant.
    pub fn validate(&self) -> CalcResult<()> {
        for key in ConstantKey::ALL {
            validate_value(key, self.get(key))?;
        }
        Ok(())
    }

    /// Keys whose value differs from the baseline
    pub fn overridden_keys(&self) -> Vec<ConstantKey> {
        ConstantKey::ALL
            .into_iter()
            .filter(|k| self.get(*k) != Self::BASELINE.get(*k))
            .collect()
    }

    /// Load constants from a `.toml` or `.json` file.
    pub fn load_from_file(path: &Path) -> CalcResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CalcError::file_error("read constants", path.display().to_string(), e.to_string())
        })?;

        let constants: Self = match extension(path).as_str() {
            "json" => serde_json::from_str(&content)
                .map_err(|e| CalcError::serialization(format!("Invalid JSON constants: {}", e)))?,
            "toml" => toml::from_str(&content)
                .map_err(|e| CalcError::serialization(format!("Invalid TOML constants: {}", e)))?,
            other => {
                return Err(CalcError::file_error(
                    "read constants",
                    path.display().to_string(),
                    format!("Constants file must be .json or .toml, got '{}'", other),
                ))
            }
        };

        constants.validate()?;
        tracing::info!(
            path = %path.display(),
            overridden = constants.overridden_keys().len(),
            "loaded cost constants"
        );
        Ok(constants)
    }

    /// Save constants to a `.toml` or `.json` file.
    pub fn save_to_file(&self, path: &Path) -> CalcResult<()> {
        self.validate()?;

        let content = match extension(path).as_str() {
            "json" => serde_json::to_string_pretty(self)
                .map_err(|e| CalcError::serialization(e.to_string()))?,
            "toml" => {
                toml::to_string_pretty(self).map_err(|e| CalcError::serialization(e.to_string()))?
            }
            other => {
                return Err(CalcError::file_error(
                    "write constants",
                    path.display().to_string(),
                    format!("Constants file must be .json or .toml, got '{}'", other),
                ))
            }
        };

        std::fs::write(path, content).map_err(|e| {
            CalcError::file_error("write constants", path.display().to_string(), e.to_string())
        })
    }
}

impl Default for CostConstants {
    fn default() -> Self {
        Self::BASELINE
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn validate_value(key: ConstantKey, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::invalid_input(
            key.field_name(),
            value.to_string(),
            "Cost constants must be non-negative numbers",
        ));
    }
    if key == ConstantKey::Markup && value <= 0.0 {
        return Err(CalcError::invalid_input(
            key.field_name(),
            value.to_string(),
            "Markup must be greater than zero",
        ));
    }
    Ok(())
}

/// Name of one field of [`CostConstants`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantKey {
    SteelCostPerKg,
    BearingPairCost,
    SealCost,
    WeldingCost,
    Markup,
    FrameRatePerKg,
    FrameBaseCost,
    LockingRingCost,
    GuideRollerCost,
    PivotBearingCost,
}

impl ConstantKey {
    /// All keys for iteration
    pub const ALL: [ConstantKey; 10] = [
        ConstantKey::SteelCostPerKg,
        ConstantKey::BearingPairCost,
        ConstantKey::SealCost,
        ConstantKey::WeldingCost,
        ConstantKey::Markup,
        ConstantKey::FrameRatePerKg,
        ConstantKey::FrameBaseCost,
        ConstantKey::LockingRingCost,
        ConstantKey::GuideRollerCost,
        ConstantKey::PivotBearingCost,
    ];

    /// Field name as it appears in config files
    pub fn field_name(&self) -> &'static str {
        match self {
            ConstantKey::SteelCostPerKg => "steel_cost_per_kg",
            ConstantKey::BearingPairCost => "bearing_pair_cost",
            ConstantKey::SealCost => "seal_cost",
            ConstantKey::WeldingCost => "welding_cost",
            ConstantKey::Markup => "markup",
            ConstantKey::FrameRatePerKg => "frame_rate_per_kg",
            ConstantKey::FrameBaseCost => "frame_base_cost",
            ConstantKey::LockingRingCost => "locking_ring_cost",
            ConstantKey::GuideRollerCost => "guide_roller_cost",
            ConstantKey::PivotBearingCost => "pivot_bearing_cost",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ConstantKey::SteelCostPerKg => "Steel cost (per kg)",
            ConstantKey::BearingPairCost => "Bearing cost (pair)",
            ConstantKey::SealCost => "Seal cost",
            ConstantKey::WeldingCost => "Welding cost",
            ConstantKey::Markup => "Markup",
            ConstantKey::FrameRatePerKg => "Frame rate (per kg)",
            ConstantKey::FrameBaseCost => "Frame base cost",
            ConstantKey::LockingRingCost => "Locking ring",
            ConstantKey::GuideRollerCost => "Guide roller cost",
            ConstantKey::PivotBearingCost => "Pivot bearing cost",
        }
    }
}

impl std::fmt::Display for ConstantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_baseline() {
        let c = CostConstants::default();
        assert_eq!(c.steel_cost_per_kg, 70.0);
        assert_eq!(c.bearing_pair_cost, 100.0);
        assert_eq!(c.seal_cost, 30.0);
        assert_eq!(c.welding_cost, 80.0);
        assert_eq!(c.markup, 1.25);
        assert_eq!(c.frame_rate_per_kg, 100.0);
        assert!(c.validate().is_ok());
        assert!(c.overridden_keys().is_empty());
    }

    #[test]
    fn test_set_and_get_every_key() {
        let mut c = CostConstants::default();
        for (i, key) in ConstantKey::ALL.into_iter().enumerate() {
            let value = 10.0 + i as f64;
            c.set(key, value).unwrap();
            assert_eq!(c.get(key), value);
        }
        assert_eq!(c.overridden_keys().len(), ConstantKey::ALL.len());
    }

    #[test]
    fn test_rejected_value_leaves_table_untouched() {
        let mut c = CostConstants::default();
        assert!(c.set(ConstantKey::SealCost, -1.0).is_err());
        assert!(c.set(ConstantKey::Markup, 0.0).is_err());
        assert!(c.set(ConstantKey::WeldingCost, f64::INFINITY).is_err());
        assert_eq!(c, CostConstants::default());
    }

    #[test]
    fn test_partial_toml_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "steel_cost_per_kg = 82.0").unwrap();
        writeln!(file, "markup = 1.3").unwrap();

        let c = CostConstants::load_from_file(file.path()).unwrap();
        assert_eq!(c.steel_cost_per_kg, 82.0);
        assert_eq!(c.markup, 1.3);
        assert_eq!(c.seal_cost, 30.0);
        assert_eq!(
            c.overridden_keys(),
            vec![ConstantKey::SteelCostPerKg, ConstantKey::Markup]
        );
    }

    #[test]
    fn test_json_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("constants.json");

        let mut c = CostConstants::default();
        c.set(ConstantKey::GuideRollerCost, 450.0).unwrap();
        c.save_to_file(&path).unwrap();

        let loaded = CostConstants::load_from_file(&path).unwrap();
        assert_eq!(loaded, c);
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "markup = -2.0").unwrap();
        let err = CostConstants::load_from_file(file.path()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = CostConstants::load_from_file(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
