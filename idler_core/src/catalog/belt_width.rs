//! Belt widths and the weight brackets that pick one.
//!
//! A heavier roller needs a wider, heavier frame. The bracket table maps a
//! roller weight to one of the eight catalog belt widths; each bracket is
//! half-open, so a weight sitting exactly on a bound belongs to the wider
//! bucket.

/// Catalog belt widths (mm), narrowest first
pub const BELT_WIDTHS_MM: [u32; 8] = [650, 800, 1000, 1200, 1400, 1600, 1800, 2000];

/// Belt width a SARI roller is always quoted against
pub const SARI_ROLLER_BELT_WIDTH_MM: u32 = 1000;

/// Lower weight bound (kg, inclusive) of each bucket
const WEIGHT_BRACKETS: [(f64, u32); 8] = [
    (0.0, 650),
    (15.0, 800),
    (22.0, 1000),
    (30.0, 1200),
    (38.0, 1400),
    (48.0, 1600),
    (60.0, 1800),
    (75.0, 2000),
];

/// Belt-width bucket for a roller weight.
///
/// Total over all weights: anything below the first bound (including
/// negative or NaN values) lands in the narrowest bucket.
///
/// ```rust
/// use idler_core::catalog::belt_width::bucket_for_weight;
///
/// assert_eq!(bucket_for_weight(20.0), 800);
/// assert_eq!(bucket_for_weight(22.0), 1000);
/// assert_eq!(bucket_for_weight(75.0), 2000);
/// ```
pub fn bucket_for_weight(weight_kg: f64) -> u32 {
    WEIGHT_BRACKETS
        .iter()
        .rev()
        .find(|(lower, _)| weight_kg >= *lower)
        .map(|(_, width)| *width)
        .unwrap_or(BELT_WIDTHS_MM[0])
}

/// Width in `available` closest to `target`. Ties go to the narrower width.
pub fn nearest_available(target: u32, available: &[u32]) -> Option<u32> {
    available
        .iter()
        .copied()
        .min_by_key(|w| (w.abs_diff(target), *w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_interiors() {
        assert_eq!(bucket_for_weight(3.5), 650);
        assert_eq!(bucket_for_weight(20.0), 800);
        assert_eq!(bucket_for_weight(25.0), 1000);
        assert_eq!(bucket_for_weight(33.0), 1200);
        assert_eq!(bucket_for_weight(40.0), 1400);
        assert_eq!(bucket_for_weight(55.0), 1600);
        assert_eq!(bucket_for_weight(70.0), 1800);
        assert_eq!(bucket_for_weight(500.0), 2000);
    }

    #[test]
    fn test_bucket_boundaries_select_higher() {
        let expected = [(15.0, 800), (22.0, 1000), (30.0, 1200), (38.0, 1400), (48.0, 1600), (60.0, 1800), (75.0, 2000)];
        for (weight, width) in expected {
            assert_eq!(bucket_for_weight(weight), width, "weight {}", weight);
            assert!(bucket_for_weight(weight - 1e-9) < width);
        }
        assert_eq!(bucket_for_weight(0.0), 650);
    }

    #[test]
    fn test_bucket_degenerate_inputs() {
        assert_eq!(bucket_for_weight(-1.0), 650);
        assert_eq!(bucket_for_weight(f64::NAN), 650);
        assert_eq!(bucket_for_weight(f64::INFINITY), 2000);
    }

    #[test]
    fn test_nearest_available() {
        let n6012 = [800, 1000, 1200];
        assert_eq!(nearest_available(650, &n6012), Some(800));
        assert_eq!(nearest_available(1000, &n6012), Some(1000));
        assert_eq!(nearest_available(2000, &n6012), Some(1200));
        // 900 is 100 from both 800 and 1000
        assert_eq!(nearest_available(900, &n6012), Some(800));
        assert_eq!(nearest_available(900, &[]), None);
    }
}
