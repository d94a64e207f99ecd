//! Small numeric helpers

/// Arithmetic mean, or `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Replace values below `floor` with `floor`; NaN passes through unchanged
pub fn clip_lower(value: f64, floor: f64) -> f64 {
    if value < floor {
        floor
    } else {
        value
    }
}

/// Clip a value at zero
pub fn clip_non_negative(value: f64) -> f64 {
    clip_lower(value, 0.0)
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip_non_negative(-3.0), 0.0);
        assert_eq!(clip_non_negative(0.0), 0.0);
        assert_eq!(clip_non_negative(12.5), 12.5);
        assert!(clip_non_negative(f64::NAN).is_nan());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(-0.04, 1), -0.0);
    }
}
