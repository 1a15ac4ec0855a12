//! Built-in vertical angle tables
//!
//! Nominal laser elevations from the vendors' published sensor manuals,
//! sorted ascending so that ring 0 is the lowest beam.

use contracts::VendorModel;

/// VLP-16: 16 lasers from -15° to +15° at 2° spacing
const VLP_16_ANGLES: [f64; 16] = [
    -15.0, -13.0, -11.0, -9.0, -7.0, -5.0, -3.0, -1.0, 1.0, 3.0, 5.0, 7.0, 9.0, 11.0, 13.0, 15.0,
];

/// HDL-32E: 32 lasers from -30.67° to +10.67° at 4/3° spacing
const HDL_32_ANGLES: [f64; 32] = [
    -30.67, -29.33, -28.00, -26.67, -25.33, -24.00, -22.67, -21.33, -20.00, -18.67, -17.33,
    -16.00, -14.67, -13.33, -12.00, -10.67, -9.33, -8.00, -6.67, -5.33, -4.00, -2.67, -1.33, 0.00,
    1.33, 2.67, 4.00, 5.33, 6.67, 8.00, 9.33, 10.67,
];

/// HDL-64E upper block: 32 lasers from +2.0° down at 1/3° spacing
const HDL_64_UPPER_TOP: f64 = 2.0;
const HDL_64_UPPER_PITCH: f64 = 1.0 / 3.0;

/// HDL-64E lower block: 32 lasers from -8.83° down at 1/2° spacing
const HDL_64_LOWER_TOP: f64 = -8.83;
const HDL_64_LOWER_PITCH: f64 = 0.5;

const HDL_64_BLOCK_SIZE: usize = 32;

/// Per-ring elevation table (degrees, ascending)
pub(crate) fn ring_angles(model: VendorModel) -> Vec<f64> {
    match model {
        VendorModel::Vlp16 => VLP_16_ANGLES.to_vec(),
        VendorModel::Hdl32 => HDL_32_ANGLES.to_vec(),
        VendorModel::Hdl64e => hdl_64e_angles(),
    }
}

fn hdl_64e_angles() -> Vec<f64> {
    let block = |top: f64, pitch: f64| (0..HDL_64_BLOCK_SIZE).map(move |i| top - i as f64 * pitch);

    let mut angles: Vec<f64> = block(HDL_64_LOWER_TOP, HDL_64_LOWER_PITCH)
        .chain(block(HDL_64_UPPER_TOP, HDL_64_UPPER_PITCH))
        .collect();
    angles.sort_by(f64::total_cmp);
    angles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_match_ring_count() {
        for model in VendorModel::ALL {
            assert_eq!(ring_angles(model).len(), model.ring_count(), "{model}");
        }
    }

    #[test]
    fn test_tables_strictly_ascending() {
        for model in VendorModel::ALL {
            let angles = ring_angles(model);
            assert!(
                angles.windows(2).all(|w| w[0] < w[1]),
                "{model} table not ascending"
            );
        }
    }

    #[test]
    fn test_hdl_64e_span() {
        let angles = ring_angles(VendorModel::Hdl64e);
        assert!((angles[0] + 24.33).abs() < 1e-9);
        assert!((angles[63] - 2.0).abs() < 1e-9);
        // block boundary: lowest upper-block laser sits above the lower block
        assert!((angles[32] - (2.0 - 31.0 / 3.0)).abs() < 1e-9);
        assert!((angles[31] + 8.83).abs() < 1e-9);
    }
}
