//! # Product Catalog
//!
//! Fixed reference data the costing engine reads from:
//!
//! - [`variants`] - Roller variants and the frame families they map to
//! - [`belt_width`] - Catalog belt widths and the weight brackets that select them
//! - [`frame_tables`] - Reference frame weights and fabrication templates
//!
//! ## Example
//!
//! ```rust
//! use idler_core::catalog::{bucket_for_weight, template, FrameFamily};
//!
//! let width = bucket_for_weight(12.0);
//! let frame = template(FrameFamily::CarryingWithFrame, width).unwrap();
//! assert_eq!(frame.belt_width_mm, 650);
//! assert!(frame.total_weight_kg() > 12.0);
//! ```

pub mod belt_width;
pub mod frame_tables;
pub mod variants;

pub use belt_width::{bucket_for_weight, nearest_available, BELT_WIDTHS_MM, SARI_ROLLER_BELT_WIDTH_MM};
pub use frame_tables::{
    reference_weight, reference_weights, reference_widths, template, template_widths,
    FrameBoMLine, FrameTemplate,
};
pub use variants::{FrameCostRule, FrameFamily, RollerVariant};
