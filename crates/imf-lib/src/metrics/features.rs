use serde::{Deserialize, Serialize};

use crate::label::MotionLabel;

/// Output table columns, in order.
pub const FEATURE_COLUMNS: [&str; 9] = [
    "acc_rms",
    "acc_var",
    "acc_peak",
    "acc_zcr",
    "gyro_rms",
    "gyro_var",
    "gyro_peak",
    "gyro_zcr",
    "label",
];

/// Per-window statistics of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelFeatures {
    pub rms: f64,
    /// Population variance
    pub var: f64,
    pub peak: f64,
    pub zcr: f64,
}

impl ChannelFeatures {
    pub fn compute(window: &[f64]) -> Self {
        Self {
            rms: rms(window),
            var: population_variance(window),
            peak: peak_abs(window),
            zcr: zero_crossing_rate(window),
        }
    }
}

pub fn rms(window: &[f64]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    (window.iter().map(|x| x * x).sum::<f64>() / window.len() as f64).sqrt()
}

pub fn population_variance(window: &[f64]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n
}

pub fn peak_abs(window: &[f64]) -> f64 {
    window.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Adjacent sign changes divided by the full window length. Zero is its own
/// sign, so `[1, 0, -1]` counts two changes.
pub fn zero_crossing_rate(window: &[f64]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let changes = window
        .windows(2)
        .filter(|pair| sign(pair[0]) != sign(pair[1]))
        .count();
    changes as f64 / window.len() as f64
}

/// One labeled row of the feature table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub acc: ChannelFeatures,
    pub gyro: ChannelFeatures,
    pub label: MotionLabel,
}

impl FeatureVector {
    pub fn compute(acc_window: &[f64], gyro_window: &[f64], label: MotionLabel) -> Self {
        Self {
            acc: ChannelFeatures::compute(acc_window),
            gyro: ChannelFeatures::compute(gyro_window),
            label,
        }
    }

    /// The eight numeric columns in table order.
    pub fn values(&self) -> [f64; 8] {
        [
            self.acc.rms,
            self.acc.var,
            self.acc.peak,
            self.acc.zcr,
            self.gyro.rms,
            self.gyro.var,
            self.gyro.peak,
            self.gyro.zcr,
        ]
    }
}

/// Flat CSV form of [`FeatureVector`]; field order is the table header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub acc_rms: f64,
    pub acc_var: f64,
    pub acc_peak: f64,
    pub acc_zcr: f64,
    pub gyro_rms: f64,
    pub gyro_var: f64,
    pub gyro_peak: f64,
    pub gyro_zcr: f64,
    pub label: MotionLabel,
}

impl From<&FeatureVector> for FeatureRow {
    fn from(v: &FeatureVector) -> Self {
        Self {
            acc_rms: v.acc.rms,
            acc_var: v.acc.var,
            acc_peak: v.acc.peak,
            acc_zcr: v.acc.zcr,
            gyro_rms: v.gyro.rms,
            gyro_var: v.gyro.var,
            gyro_peak: v.gyro.peak,
            gyro_zcr: v.gyro.zcr,
            label: v.label,
        }
    }
}

impl From<FeatureRow> for FeatureVector {
    fn from(r: FeatureRow) -> Self {
        Self {
            acc: ChannelFeatures {
                rms: r.acc_rms,
                var: r.acc_var,
                peak: r.acc_peak,
                zcr: r.acc_zcr,
            },
            gyro: ChannelFeatures {
                rms: r.gyro_rms,
                var: r.gyro_var,
                peak: r.gyro_peak,
                zcr: r.gyro_zcr,
            },
            label: r.label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_window_has_zero_features() {
        let f = ChannelFeatures::compute(&[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(f.rms, 0.0);
        assert_eq!(f.var, 0.0);
        assert_eq!(f.peak, 0.0);
        assert_eq!(f.zcr, 0.0);
    }

    #[test]
    fn alternating_window() {
        let f = ChannelFeatures::compute(&[1.0, -1.0, 1.0, -1.0]);
        assert!((f.rms - 1.0).abs() < 1e-12);
        assert!((f.var - 1.0).abs() < 1e-12);
        assert!((f.peak - 1.0).abs() < 1e-12);
        assert!((f.zcr - 0.75).abs() < 1e-12);
    }

    #[test]
    fn exact_zero_counts_as_sign_change() {
        assert!((zero_crossing_rate(&[1.0, 0.0, -1.0, 0.0]) - 0.75).abs() < 1e-12);
        assert!((zero_crossing_rate(&[2.0, 0.0, 3.0]) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(zero_crossing_rate(&[0.5, 0.1, 0.2]), 0.0);
    }

    #[test]
    fn variance_is_population_variance() {
        // sample variance would give 4/3
        let v = population_variance(&[1.0, 3.0, 1.0, 3.0]);
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn peak_uses_absolute_value() {
        assert_eq!(peak_abs(&[0.2, -3.0, 1.5]), 3.0);
    }

    #[test]
    fn features_are_bounded() {
        let window: Vec<f64> = (0..50)
            .map(|i| ((i * 37 % 23) as f64 - 11.0) * 0.13)
            .collect();
        let f = ChannelFeatures::compute(&window);
        assert!(f.rms >= 0.0);
        assert!(f.var >= 0.0);
        assert!(f.peak >= 0.0);
        assert!((0.0..=1.0).contains(&f.zcr));
        assert_eq!(f, ChannelFeatures::compute(&window));
    }

    #[test]
    fn vector_orders_acc_before_gyro() {
        let v = FeatureVector::compute(&[1.0, -1.0], &[2.0, 2.0], MotionLabel::Slow);
        let values = v.values();
        assert!((values[0] - 1.0).abs() < 1e-12);
        assert!((values[4] - 2.0).abs() < 1e-12);
        assert_eq!(values[7], 0.0);
        let row = FeatureRow::from(&v);
        assert_eq!(FeatureVector::from(row), v);
    }
}
