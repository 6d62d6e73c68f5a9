// Clinical classification of Z-scores into six percentile bands.

use serde::Serialize;
use std::fmt;

/// Ordered partition of the real line with boundaries at -2, -1, 0, +1, +2,
/// plus `NotAvailable` for an undefined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ClinicalBand {
    NotAvailable,
    Critical,
    Low,
    BelowAverage,
    AboveAverage,
    Good,
    Excellent,
}

impl ClinicalBand {
    /// All defined bands, lowest first.
    pub const ORDERED: [ClinicalBand; 6] = [
        ClinicalBand::Critical,
        ClinicalBand::Low,
        ClinicalBand::BelowAverage,
        ClinicalBand::AboveAverage,
        ClinicalBand::Good,
        ClinicalBand::Excellent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ClinicalBand::Excellent => "Excellent",
            ClinicalBand::Good => "Good",
            ClinicalBand::AboveAverage => "Above-average",
            ClinicalBand::BelowAverage => "Below-average",
            ClinicalBand::Low => "Low",
            ClinicalBand::Critical => "Critical",
            ClinicalBand::NotAvailable => "N/A",
        }
    }

    /// Approximate percentile range under a normal distribution.
    pub fn percentile(&self) -> &'static str {
        match self {
            ClinicalBand::Excellent => ">97.5",
            ClinicalBand::Good => "84-97.5",
            ClinicalBand::AboveAverage => "50-84",
            ClinicalBand::BelowAverage => "16-50",
            ClinicalBand::Low => "2.5-16",
            ClinicalBand::Critical => "<2.5",
            ClinicalBand::NotAvailable => "none",
        }
    }
}

impl fmt::Display for ClinicalBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a Z-score to its band. Lower bounds are inclusive. `None` and NaN
/// are `NotAvailable`; infinities land in the outermost bands.
pub fn classify(zscore: Option<f64>) -> ClinicalBand {
    let Some(z) = zscore else {
        return ClinicalBand::NotAvailable;
    };
    if z.is_nan() {
        ClinicalBand::NotAvailable
    } else if z >= 2.0 {
        ClinicalBand::Excellent
    } else if z >= 1.0 {
        ClinicalBand::Good
    } else if z >= 0.0 {
        ClinicalBand::AboveAverage
    } else if z >= -1.0 {
        ClinicalBand::BelowAverage
    } else if z >= -2.0 {
        ClinicalBand::Low
    } else {
        ClinicalBand::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_closed_below() {
        assert_eq!(classify(Some(2.0)), ClinicalBand::Excellent);
        assert_eq!(classify(Some(1.9999)), ClinicalBand::Good);
        assert_eq!(classify(Some(1.0)), ClinicalBand::Good);
        assert_eq!(classify(Some(0.9999)), ClinicalBand::AboveAverage);
        assert_eq!(classify(Some(0.0)), ClinicalBand::AboveAverage);
        assert_eq!(classify(Some(-0.0001)), ClinicalBand::BelowAverage);
        assert_eq!(classify(Some(-1.0)), ClinicalBand::BelowAverage);
        assert_eq!(classify(Some(-1.0001)), ClinicalBand::Low);
        assert_eq!(classify(Some(-2.0)), ClinicalBand::Low);
        assert_eq!(classify(Some(-2.0001)), ClinicalBand::Critical);
    }

    #[test]
    fn undefined_and_extreme_inputs() {
        assert_eq!(classify(None), ClinicalBand::NotAvailable);
        assert_eq!(classify(Some(f64::NAN)), ClinicalBand::NotAvailable);
        assert_eq!(classify(Some(f64::INFINITY)), ClinicalBand::Excellent);
        assert_eq!(classify(Some(f64::NEG_INFINITY)), ClinicalBand::Critical);
    }

    #[test]
    fn bands_are_monotonic() {
        let mut previous = classify(Some(-10.0));
        let mut z = -10.0;
        while z <= 10.0 {
            let band = classify(Some(z));
            assert!(band >= previous, "band dropped at z={z}");
            previous = band;
            z += 0.05;
        }
        assert!(ClinicalBand::ORDERED.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn labels_and_percentiles() {
        assert_eq!(ClinicalBand::Good.to_string(), "Good");
        assert_eq!(ClinicalBand::AboveAverage.label(), "Above-average");
        assert_eq!(ClinicalBand::NotAvailable.label(), "N/A");
        assert_eq!(ClinicalBand::Critical.percentile(), "<2.5");
    }
}
