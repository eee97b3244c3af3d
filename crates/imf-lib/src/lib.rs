pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod label;
pub mod metrics;
pub mod pipeline;
pub mod plot;
pub mod signal;
pub mod window;

pub use error::{FeatureError, Result};
pub use filter::{Butterworth, FilterError, FilterSpec, Section};
pub use label::MotionLabel;
pub use metrics::*;
pub use pipeline::*;
pub use signal::*;
