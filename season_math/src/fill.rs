//! Gap filling for month-aligned series
//!
//! Gaps are `None` entries. Forward fill carries the nearest earlier value
//! into a gap, backward fill the nearest later one.

/// Fill gaps with the nearest earlier value
pub fn forward_fill(values: &mut [Option<f64>]) {
    let mut last = None;
    for value in values.iter_mut() {
        match value {
            Some(v) => last = Some(*v),
            None => *value = last,
        }
    }
}

/// Fill gaps with the nearest later value
pub fn backward_fill(values: &mut [Option<f64>]) {
    let mut next = None;
    for value in values.iter_mut().rev() {
        match value {
            Some(v) => next = Some(*v),
            None => *value = next,
        }
    }
}

/// Forward fill, then backward fill.
///
/// Returns `true` when no gaps remain, which holds whenever at least one
/// entry had a value.
pub fn forward_backward_fill(values: &mut [Option<f64>]) -> bool {
    forward_fill(values);
    backward_fill(values);
    values.iter().all(Option::is_some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_backward_fill() {
        let mut values = vec![None, Some(1.0), None, None, Some(4.0), None];
        assert!(forward_backward_fill(&mut values));
        assert_eq!(
            values,
            vec![Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(4.0), Some(4.0)]
        );
    }

    #[test]
    fn test_all_gaps_stay_gaps() {
        let mut values = vec![None, None];
        assert!(!forward_backward_fill(&mut values));
        assert_eq!(values, vec![None, None]);
    }

    #[test]
    fn test_empty_series() {
        let mut values: Vec<Option<f64>> = Vec::new();
        assert!(forward_backward_fill(&mut values));
    }
}
