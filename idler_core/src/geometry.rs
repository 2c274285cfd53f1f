//! # Roller Weight from Geometry
//!
//! Mass of the two steel parts of an idler roller: the pipe (shell) and the
//! shaft. All inputs are in millimetres, all outputs in kilograms.
//!
//! ## Formulas
//!
//! - **Pipe, thin shell** (canonical): `π·D·L·t·7.85 / 10⁶`
//! - **Pipe, hollow cylinder**: `π·((D/2)² − (D/2 − t)²)·L·7850` with lengths in metres
//! - **Shaft, solid cylinder**: `(π/4)·(d/10)²·(Ls/10)·7.85 / 1000`
//!
//! where D is the pipe outer diameter, L the face width (used as the pipe
//! length), t the wall thickness, d the shaft diameter after the even
//! correction and Ls the shaft length.
//!
//! A wall of half the diameter or more leaves no bore; the pipe is then
//! weighed as a solid bar.
//!
//! ## Example
//!
//! ```rust
//! use idler_core::geometry::{calculate, RollerDimensions, WeightMethod};
//!
//! let dims = RollerDimensions {
//!     pipe_diameter_mm: 89.0,
//!     face_width_mm: 190.0,
//!     wall_thickness_mm: 3.2,
//!     shaft_diameter_mm: 25.0,
//!     shaft_length_mm: 220.0,
//! };
//! let weight = calculate(&dims, WeightMethod::ThinShell);
//! assert_eq!(weight.shaft_diameter_used_mm, 28.0);
//! assert!(weight.total_weight_kg > weight.pipe_weight_kg);
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::{CubicMeters, KgPerM3, Kilograms, Meters, Millimeters};

/// Steel density on the g/cm³ scale used by the shop formulas
pub const STEEL_DENSITY_G_CM3: f64 = 7.85;

/// Steel density for volume-based formulas
pub const STEEL_DENSITY: KgPerM3 = KgPerM3(7850.0);

/// Amount added to an odd shaft diameter to reach the next stocked bar size
pub const ODD_SHAFT_CORRECTION_MM: f64 = 3.0;

/// How the pipe mass is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMethod {
    /// Thin-wall shell: circumference × wall × length
    #[default]
    ThinShell,
    /// Exact hollow cylinder volume
    HollowCylinder,
}

/// Physical dimensions of one roller, all in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollerDimensions {
    /// Pipe outer diameter D
    pub pipe_diameter_mm: f64,
    /// Face width L (pipe length)
    pub face_width_mm: f64,
    /// Pipe wall thickness t
    pub wall_thickness_mm: f64,
    /// Shaft diameter as entered, before the even correction
    pub shaft_diameter_mm: f64,
    /// Shaft length Ls
    pub shaft_length_mm: f64,
}

impl RollerDimensions {
    /// Validate that every dimension is a positive finite number and the wall
    /// leaves a bore.
    pub fn validate(&self) -> CalcResult<()> {
        let fields = [
            ("pipe_diameter_mm", self.pipe_diameter_mm),
            ("face_width_mm", self.face_width_mm),
            ("wall_thickness_mm", self.wall_thickness_mm),
            ("shaft_diameter_mm", self.shaft_diameter_mm),
            ("shaft_length_mm", self.shaft_length_mm),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Dimension must be a positive number",
                ));
            }
        }
        if self.wall_thickness_mm >= self.pipe_diameter_mm / 2.0 {
            return Err(CalcError::invalid_input(
                "wall_thickness_mm",
                self.wall_thickness_mm.to_string(),
                format!(
                    "Wall thickness must be less than half the pipe diameter ({} mm)",
                    self.pipe_diameter_mm / 2.0
                ),
            ));
        }
        Ok(())
    }
}

/// Weight of one roller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightResult {
    /// Pipe mass (kg)
    pub pipe_weight_kg: f64,
    /// Shaft mass (kg)
    pub shaft_weight_kg: f64,
    /// Pipe + shaft (kg)
    pub total_weight_kg: f64,
    /// Shaft diameter that entered the formula (mm)
    pub shaft_diameter_used_mm: f64,
}

/// Apply the shop rule for shaft diameters: an odd diameter gets 3 mm added,
/// an even one is kept.
///
/// Parity is taken from the whole-millimetre part of the value.
pub fn corrected_shaft_diameter(shaft_diameter_mm: f64) -> f64 {
    let whole = shaft_diameter_mm.trunc() as i64;
    if whole % 2 != 0 {
        shaft_diameter_mm + ODD_SHAFT_CORRECTION_MM
    } else {
        shaft_diameter_mm
    }
}

/// Pipe mass with the thin-shell approximation.
pub fn pipe_weight_thin_shell(
    pipe_diameter: Millimeters,
    length: Millimeters,
    wall: Millimeters,
) -> Kilograms {
    if wall.0 <= 0.0 {
        return Kilograms(0.0);
    }
    if wall.0 >= pipe_diameter.0 / 2.0 {
        return solid_bar_weight(pipe_diameter, length);
    }
    Kilograms(PI * pipe_diameter.0 * length.0 * wall.0 * STEEL_DENSITY_G_CM3 / 1_000_000.0)
}

/// Pipe mass from the exact hollow-cylinder volume. The bore radius is
/// clamped at zero.
pub fn pipe_weight_hollow(
    pipe_diameter: Millimeters,
    length: Millimeters,
    wall: Millimeters,
) -> Kilograms {
    let outer_r: Meters = (pipe_diameter / 2.0).into();
    let wall_m: Meters = wall.into();
    let length_m: Meters = length.into();

    let inner_r = (outer_r.0 - wall_m.0).max(0.0);
    let area = PI * (outer_r.0 * outer_r.0 - inner_r * inner_r);
    CubicMeters((area * length_m.0).max(0.0)).mass(STEEL_DENSITY)
}

/// Shaft mass as a solid cylinder. Expects the corrected diameter.
pub fn shaft_weight(shaft_diameter: Millimeters, shaft_length: Millimeters) -> Kilograms {
    let d_cm = shaft_diameter.0 / 10.0;
    let l_cm = shaft_length.0 / 10.0;
    Kilograms((PI / 4.0) * d_cm * d_cm * l_cm * STEEL_DENSITY_G_CM3 / 1000.0)
}

fn solid_bar_weight(diameter: Millimeters, length: Millimeters) -> Kilograms {
    let r: Meters = (diameter / 2.0).into();
    let l: Meters = length.into();
    CubicMeters(PI * r.0 * r.0 * l.0).mass(STEEL_DENSITY)
}

/// Compute the roller weight. Pure; dimensions are validated by the caller.
pub fn calculate(dims: &RollerDimensions, method: WeightMethod) -> WeightResult {
    let diameter = Millimeters(dims.pipe_diameter_mm);
    let length = Millimeters(dims.face_width_mm);
    let wall = Millimeters(dims.wall_thickness_mm);

    let pipe = match method {
        WeightMethod::ThinShell => pipe_weight_thin_shell(diameter, length, wall),
        WeightMethod::HollowCylinder => pipe_weight_hollow(diameter, length, wall),
    };

    let shaft_d = corrected_shaft_diameter(dims.shaft_diameter_mm);
    let shaft = shaft_weight(Millimeters(shaft_d), Millimeters(dims.shaft_length_mm));

    WeightResult {
        pipe_weight_kg: pipe.value(),
        shaft_weight_kg: shaft.value(),
        total_weight_kg: (pipe + shaft).value(),
        shaft_diameter_used_mm: shaft_d,
    }
}
