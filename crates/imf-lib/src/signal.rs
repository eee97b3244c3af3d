use serde::{Deserialize, Serialize};

use crate::filter::{Butterworth, FilterError, FilterSpec};

/// Raw IMU magnitudes from one recording, one entry per CSV row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSeries {
    /// Timestamps in milliseconds
    pub time_ms: Vec<f64>,
    /// Accelerometer magnitude (g)
    pub accel: Vec<f64>,
    /// Gyroscope magnitude (deg/s)
    pub gyro: Vec<f64>,
}

impl SampleSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time_ms: Vec::with_capacity(capacity),
            accel: Vec::with_capacity(capacity),
            gyro: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, time_ms: f64, accel: f64, gyro: f64) {
        self.time_ms.push(time_ms);
        self.accel.push(accel);
        self.gyro.push(gyro);
    }

    pub fn len(&self) -> usize {
        self.accel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accel.is_empty()
    }

    /// Span between first and last timestamp, in seconds.
    pub fn duration_s(&self) -> f64 {
        match (self.time_ms.first(), self.time_ms.last()) {
            (Some(first), Some(last)) => (last - first) / 1000.0,
            _ => 0.0,
        }
    }

    /// Seconds since the first sample.
    pub fn elapsed_s(&self) -> Vec<f64> {
        let t0 = self.time_ms.first().copied().unwrap_or(0.0);
        self.time_ms.iter().map(|t| (t - t0) / 1000.0).collect()
    }
}

/// Both channels after DC removal (accel only) and zero-phase low-pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionedSignal {
    pub accel: Vec<f64>,
    pub gyro: Vec<f64>,
}

impl ConditionedSignal {
    pub fn len(&self) -> usize {
        self.accel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accel.is_empty()
    }
}

pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Subtract the whole-series mean (resting gravity offset).
pub fn remove_mean(data: &[f64]) -> Vec<f64> {
    let m = mean(data);
    data.iter().map(|x| x - m).collect()
}

pub fn condition_accel(accel: &[f64], filter: &Butterworth) -> Result<Vec<f64>, FilterError> {
    filter.filtfilt(&remove_mean(accel))
}

pub fn condition_gyro(gyro: &[f64], filter: &Butterworth) -> Result<Vec<f64>, FilterError> {
    filter.filtfilt(gyro)
}

/// Condition both channels of a recording with one designed filter.
pub fn condition(
    series: &SampleSeries,
    filter: &Butterworth,
) -> Result<ConditionedSignal, FilterError> {
    Ok(ConditionedSignal {
        accel: condition_accel(&series.accel, filter)?,
        gyro: condition_gyro(&series.gyro, filter)?,
    })
}

/// Design the filter from `spec` and condition `series`.
pub fn condition_with_spec(
    series: &SampleSeries,
    spec: &FilterSpec,
) -> Result<ConditionedSignal, FilterError> {
    let filter = Butterworth::lowpass(spec)?;
    condition(series, &filter)
}
