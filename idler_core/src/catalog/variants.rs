//! Roller variants and frame families.
//!
//! Every roller sold is one of six variants. Four of them can be supplied on
//! a fabricated frame; the frame family decides which reference tables and
//! which frame cost rule apply.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Roller product line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RollerVariant {
    /// Carrying idler sold as a loose roller
    CarryingWithoutFrame,
    /// Impact idler with rubber rings, sold as a loose roller
    ImpactWithoutFrame,
    /// Carrying idler mounted on a troughing frame
    CarryingWithFrame,
    /// Self-aligning return idler
    Sari,
    /// Self-aligning return idler with 6012 bearings
    SariN6012,
    /// Self-aligning carrying idler
    Saci,
}

impl RollerVariant {
    /// All roller variants for UI selection
    pub const ALL: [RollerVariant; 6] = [
        RollerVariant::CarryingWithoutFrame,
        RollerVariant::ImpactWithoutFrame,
        RollerVariant::CarryingWithFrame,
        RollerVariant::Sari,
        RollerVariant::SariN6012,
        RollerVariant::Saci,
    ];

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            RollerVariant::CarryingWithoutFrame => "Carrying Idler Without Frame",
            RollerVariant::ImpactWithoutFrame => "Impact Idler Without Frame",
            RollerVariant::CarryingWithFrame => "Carrying Idler With Frame",
            RollerVariant::Sari => "SARI",
            RollerVariant::SariN6012 => "SARI N6012",
            RollerVariant::Saci => "SACI",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "CARRYING_WITHOUT_FRAME" | "CARRYING_IDLER_WITHOUT_FRAME" | "CIWF" => {
                Ok(RollerVariant::CarryingWithoutFrame)
            }
            "IMPACT_WITHOUT_FRAME" | "IMPACT_IDLER_WITHOUT_FRAME" | "IMPACT" => {
                Ok(RollerVariant::ImpactWithoutFrame)
            }
            "CARRYING_WITH_FRAME" | "CARRYING_IDLER_WITH_FRAME" | "CIF" => {
                Ok(RollerVariant::CarryingWithFrame)
            }
            "SARI" => Ok(RollerVariant::Sari),
            "SARI_N6012" | "SARIN6012" | "N6012" => Ok(RollerVariant::SariN6012),
            "SACI" => Ok(RollerVariant::Saci),
            _ => Err(CalcError::invalid_input(
                "variant",
                s,
                "Unknown roller type",
            )),
        }
    }

    /// Frame family for variants that can carry a frame
    pub fn frame_family(&self) -> Option<FrameFamily> {
        match self {
            RollerVariant::CarryingWithoutFrame | RollerVariant::ImpactWithoutFrame => None,
            RollerVariant::CarryingWithFrame => Some(FrameFamily::CarryingWithFrame),
            RollerVariant::Sari => Some(FrameFamily::Sari),
            RollerVariant::SariN6012 => Some(FrameFamily::SariN6012),
            RollerVariant::Saci => Some(FrameFamily::Saci),
        }
    }

    /// Whether frame costing applies to this variant
    pub fn supports_frame(&self) -> bool {
        self.frame_family().is_some()
    }
}

impl std::fmt::Display for RollerVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Roller families with frame reference tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrameFamily {
    CarryingWithFrame,
    Sari,
    SariN6012,
    Saci,
}

impl FrameFamily {
    /// All frame families
    pub const ALL: [FrameFamily; 4] = [
        FrameFamily::CarryingWithFrame,
        FrameFamily::Sari,
        FrameFamily::SariN6012,
        FrameFamily::Saci,
    ];

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            FrameFamily::CarryingWithFrame => "Carrying Idler With Frame",
            FrameFamily::Sari => "SARI",
            FrameFamily::SariN6012 => "SARI N6012",
            FrameFamily::Saci => "SACI",
        }
    }

    /// Line description for a frame of the given belt width
    pub fn frame_description(&self, belt_width_mm: u32) -> String {
        match self {
            FrameFamily::CarryingWithFrame => format!("{} MM CARRYING FRAME", belt_width_mm),
            FrameFamily::Sari => format!("SARI FRAME {} MM", belt_width_mm),
            FrameFamily::SariN6012 => format!("SARI N6012 FRAME {} MM", belt_width_mm),
            FrameFamily::Saci => format!("SACI FRAME {} MM", belt_width_mm),
        }
    }

    /// Which cost rule prices this family's frame
    pub fn cost_rule(&self) -> FrameCostRule {
        match self {
            FrameFamily::Sari => FrameCostRule::SelfAligning,
            FrameFamily::CarryingWithFrame | FrameFamily::SariN6012 | FrameFamily::Saci => {
                FrameCostRule::Welded
            }
        }
    }
}

impl std::fmt::Display for FrameFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl TryFrom<RollerVariant> for FrameFamily {
    type Error = CalcError;

    fn try_from(variant: RollerVariant) -> Result<Self, Self::Error> {
        variant
            .frame_family()
            .ok_or_else(|| CalcError::unsupported_frame_family(variant.display_name()))
    }
}

/// How a frame's unit cost is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameCostRule {
    /// weight × frame rate + welding + frame base cost
    Welded,
    /// weight × baseline frame rate + guide roller + pivot bearing
    SelfAligning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_serialization() {
        let json = serde_json::to_string(&RollerVariant::SariN6012).unwrap();
        assert_eq!(json, "\"SARI_N6012\"");
        let json = serde_json::to_string(&RollerVariant::CarryingWithoutFrame).unwrap();
        assert_eq!(json, "\"CARRYING_WITHOUT_FRAME\"");
        let roundtrip: RollerVariant = serde_json::from_str("\"SACI\"").unwrap();
        assert_eq!(roundtrip, RollerVariant::Saci);
    }

    #[test]
    fn test_from_str_flexible() {
        assert_eq!(
            RollerVariant::from_str_flexible("Carrying Idler Without Frame").unwrap(),
            RollerVariant::CarryingWithoutFrame
        );
        assert_eq!(
            RollerVariant::from_str_flexible("sari-n6012").unwrap(),
            RollerVariant::SariN6012
        );
        assert!(RollerVariant::from_str_flexible("Select Roller").is_err());
    }

    #[test]
    fn test_frame_support() {
        assert!(!RollerVariant::CarryingWithoutFrame.supports_frame());
        assert!(!RollerVariant::ImpactWithoutFrame.supports_frame());
        for v in [
            RollerVariant::CarryingWithFrame,
            RollerVariant::Sari,
            RollerVariant::SariN6012,
            RollerVariant::Saci,
        ] {
            assert!(v.supports_frame(), "{} should support frames", v);
        }
    }

    #[test]
    fn test_try_from_variant() {
        assert_eq!(
            FrameFamily::try_from(RollerVariant::Sari).unwrap(),
            FrameFamily::Sari
        );
        let err = FrameFamily::try_from(RollerVariant::ImpactWithoutFrame).unwrap_err();
        assert!(err.is_frame_rejection());
    }

    #[test]
    fn test_frame_description() {
        assert_eq!(
            FrameFamily::CarryingWithFrame.frame_description(800),
            "800 MM CARRYING FRAME"
        );
        assert_eq!(FrameFamily::Sari.frame_description(1000), "SARI FRAME 1000 MM");
        assert_eq!(FrameFamily::Sari.cost_rule(), FrameCostRule::SelfAligning);
        assert_eq!(FrameFamily::Saci.cost_rule(), FrameCostRule::Welded);
    }
}
