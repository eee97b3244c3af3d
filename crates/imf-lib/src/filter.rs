//! Butterworth low-pass design and zero-phase (forward-backward) application.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("filter order must be at least 1")]
    ZeroOrder,
    #[error("sample rate must be positive and finite, got {0} Hz")]
    InvalidSampleRate(f64),
    #[error("cutoff must be positive and finite, got {0} Hz")]
    InvalidCutoff(f64),
    #[error(
        "cutoff {cutoff_hz} Hz is not below the Nyquist frequency {nyquist_hz} Hz (normalized {normalized})"
    )]
    AboveNyquist {
        cutoff_hz: f64,
        nyquist_hz: f64,
        normalized: f64,
    },
    #[error("signal has {len} samples; zero-phase filtering needs more than {padlen}")]
    SignalTooShort { len: usize, padlen: usize },
}

/// Low-pass filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub order: usize,
    pub cutoff_hz: f64,
    pub sample_rate_hz: f64,
}

impl FilterSpec {
    pub fn nyquist_hz(&self) -> f64 {
        0.5 * self.sample_rate_hz
    }

    /// Cutoff as a fraction of Nyquist.
    pub fn normalized_cutoff(&self) -> f64 {
        self.cutoff_hz / self.nyquist_hz()
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.order == 0 {
            return Err(FilterError::ZeroOrder);
        }
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(FilterError::InvalidSampleRate(self.sample_rate_hz));
        }
        if !(self.cutoff_hz.is_finite() && self.cutoff_hz > 0.0) {
            return Err(FilterError::InvalidCutoff(self.cutoff_hz));
        }
        let normalized = self.normalized_cutoff();
        if normalized >= 1.0 {
            return Err(FilterError::AboveNyquist {
                cutoff_hz: self.cutoff_hz,
                nyquist_hz: self.nyquist_hz(),
                normalized,
            });
        }
        Ok(())
    }
}

/// One biquad, `a[0] == 1`. First-order sections carry zeros in slot 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

impl Section {
    fn normalized(b: [f64; 3], a: [f64; 3]) -> Self {
        let a0 = a[0];
        Self {
            b: b.map(|v| v / a0),
            a: a.map(|v| v / a0),
        }
    }

    fn order(&self) -> usize {
        if self.a[2] == 0.0 && self.b[2] == 0.0 {
            1
        } else {
            2
        }
    }

    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }

    /// Direct form II transposed state after a unit step has settled.
    pub fn steady_state(&self) -> [f64; 2] {
        let gain = self.dc_gain();
        [gain - self.b[0], self.b[2] - self.a[2] * gain]
    }

    fn run(&self, x: &mut [f64], mut z: [f64; 2]) {
        let [b0, b1, b2] = self.b;
        let [_, a1, a2] = self.a;
        for v in x.iter_mut() {
            let xi = *v;
            let yi = b0 * xi + z[0];
            z[0] = b1 * xi + z[1] - a1 * yi;
            z[1] = b2 * xi - a2 * yi;
            *v = yi;
        }
    }
}

/// Digital Butterworth low-pass as a cascade of second-order sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Butterworth {
    pub sections: Vec<Section>,
}

impl Butterworth {
    /// Design a low-pass Butterworth filter via the bilinear transform with
    /// pre-warped cutoff: one section per conjugate pole pair, plus one
    /// first-order section for odd orders. Each section has unity DC gain.
    pub fn lowpass(spec: &FilterSpec) -> Result<Self, FilterError> {
        spec.validate()?;
        let n = spec.order;
        let c = (PI * spec.normalized_cutoff() / 2.0).tan();
        let c2 = c * c;
        let mut sections = Vec::with_capacity(n.div_ceil(2));
        for k in 0..n / 2 {
            let zeta = (PI * (2 * k + 1) as f64 / (2 * n) as f64).sin();
            sections.push(Section::normalized(
                [c2, 2.0 * c2, c2],
                [1.0 + 2.0 * zeta * c + c2, 2.0 * (c2 - 1.0), 1.0 - 2.0 * zeta * c + c2],
            ));
        }
        if n % 2 == 1 {
            sections.push(Section::normalized([c, c, 0.0], [1.0 + c, c - 1.0, 0.0]));
        }
        Ok(Self { sections })
    }

    pub fn order(&self) -> usize {
        self.sections.iter().map(Section::order).sum()
    }

    pub fn dc_gain(&self) -> f64 {
        self.sections.iter().map(Section::dc_gain).product()
    }

    /// Sections multiplied out into one `(b, a)` transfer function.
    pub fn transfer_function(&self) -> (Vec<f64>, Vec<f64>) {
        let mut b = vec![1.0];
        let mut a = vec![1.0];
        for s in &self.sections {
            let taps = s.order() + 1;
            b = poly_mul(&b, &s.b[..taps]);
            a = poly_mul(&a, &s.a[..taps]);
        }
        (b, a)
    }

    /// Edge padding used by [`Butterworth::filtfilt`].
    pub fn padlen(&self) -> usize {
        3 * (self.order() + 1)
    }

    /// Single causal pass through every section, each starting from its
    /// entry in `zi` (zero state when `zi` is shorter).
    pub fn filter(&self, x: &[f64], zi: &[[f64; 2]]) -> Vec<f64> {
        let mut out = x.to_vec();
        for (i, section) in self.sections.iter().enumerate() {
            section.run(&mut out, zi.get(i).copied().unwrap_or([0.0; 2]));
        }
        out
    }

    /// Per-section state for a settled unit step; later sections see the
    /// DC gain of the ones before them.
    pub fn steady_state(&self) -> Vec<[f64; 2]> {
        let mut scale = 1.0;
        self.sections
            .iter()
            .map(|s| {
                let [z0, z1] = s.steady_state();
                let zi = [z0 * scale, z1 * scale];
                scale *= s.dc_gain();
                zi
            })
            .collect()
    }

    /// Zero-phase filtering: odd-extend both edges, run forward, then run
    /// backward over the reversed output, and trim the padding.
    pub fn filtfilt(&self, x: &[f64]) -> Result<Vec<f64>, FilterError> {
        let padlen = self.padlen();
        if x.len() <= padlen {
            return Err(FilterError::SignalTooShort {
                len: x.len(),
                padlen,
            });
        }
        let zi = self.steady_state();
        let scaled = |x0: f64| -> Vec<[f64; 2]> {
            zi.iter().map(|z| [z[0] * x0, z[1] * x0]).collect()
        };
        let ext = odd_extend(x, padlen);

        let mut y = self.filter(&ext, &scaled(ext[0]));
        y.reverse();
        let mut y = self.filter(&y, &scaled(y[0]));
        y.reverse();

        Ok(y[padlen..y.len() - padlen].to_vec())
    }
}

fn odd_extend(x: &[f64], padlen: usize) -> Vec<f64> {
    let n = x.len();
    let first = x[0];
    let last = x[n - 1];
    let mut ext = Vec::with_capacity(n + 2 * padlen);
    ext.extend((1..=padlen).rev().map(|i| 2.0 * first - x[i]));
    ext.extend_from_slice(x);
    ext.extend((1..=padlen).map(|i| 2.0 * last - x[n - 1 - i]));
    ext
}

fn poly_mul(p: &[f64], q: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; p.len() + q.len() - 1];
    for (i, &pi) in p.iter().enumerate() {
        for (j, &qj) in q.iter().enumerate() {
            out[i + j] += pi * qj;
        }
    }
    out
}
