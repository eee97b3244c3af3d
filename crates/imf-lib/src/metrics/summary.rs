use serde::{Deserialize, Serialize};

use crate::label::MotionLabel;
use crate::metrics::features::{FeatureVector, FEATURE_COLUMNS};

/// Five-number summary of one feature column within one label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub feature: String,
    pub stats: BoxStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSummary {
    pub label: MotionLabel,
    pub count: usize,
    pub features: Vec<FeatureSummary>,
}

/// Group rows by label (first-appearance order) and summarize every column.
pub fn summarize_by_label(rows: &[FeatureVector]) -> Vec<LabelSummary> {
    let mut order: Vec<MotionLabel> = Vec::new();
    for row in rows {
        if !order.contains(&row.label) {
            order.push(row.label);
        }
    }
    order
        .into_iter()
        .map(|label| {
            let group: Vec<[f64; 8]> = rows
                .iter()
                .filter(|r| r.label == label)
                .map(|r| r.values())
                .collect();
            let features = FEATURE_COLUMNS[..8]
                .iter()
                .enumerate()
                .filter_map(|(col, name)| {
                    let column: Vec<f64> = group.iter().map(|v| v[col]).collect();
                    BoxStats::from_values(&column).map(|stats| FeatureSummary {
                        feature: (*name).to_string(),
                        stats,
                    })
                })
                .collect();
            LabelSummary {
                label,
                count: group.len(),
                features,
            }
        })
        .collect()
}
