//! Equal-width binning of units sold (shared by every histogram renderer).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SalesError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Bin count used by the terminal plot, the dashboard and the SVG chart.
pub const DEFAULT_HISTOGRAM_BINS: usize = 12;

/// Split `[min, max]` into `bins` equal-width bins. The last bin is closed
/// on the right so the maximum is counted.
pub fn histogram(values: &[u32], bins: usize) -> Result<Vec<Bin>> {
    if values.is_empty() {
        return Err(SalesError::insufficient(1, 0));
    }
    if bins == 0 {
        return Err(SalesError::invalid("Histogram needs at least one bin."));
    }

    let lo = f64::from(values.iter().copied().min().unwrap_or_default());
    let mut hi = f64::from(values.iter().copied().max().unwrap_or_default());
    if hi <= lo {
        hi = lo + 1.0;
    }
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            lower: lo + i as f64 * width,
            upper: lo + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = ((f64::from(v) - lo) / width).floor() as usize;
        out[idx.min(bins - 1)].count += 1;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_value_once() {
        let values = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let bins = histogram(&values, 5).unwrap();
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 2, 2, 2, 3]);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[4].upper, 10.0);
    }

    #[test]
    fn constant_values_land_in_first_bin() {
        let bins = histogram(&[7, 7, 7], 4).unwrap();
        assert_eq!(bins[0].count, 3);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn empty_input_fails() {
        assert!(matches!(histogram(&[], 3), Err(SalesError::InsufficientData { .. })));
    }
}
