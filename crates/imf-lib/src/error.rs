use std::path::PathBuf;
use thiserror::Error;

use crate::filter::FilterError;

/// Fatal failures of the feature extraction pipeline.
///
/// Malformed rows are not represented here unless the caller opted into
/// [`RowPolicy::Reject`](crate::io::raw::RowPolicy::Reject); under the default
/// policy they are dropped and counted instead.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("invalid filter configuration: {0}")]
    Filter(#[from] FilterError),

    #[error("{}: {source}", .path.display())]
    Signal {
        path: PathBuf,
        #[source]
        source: FilterError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: line {line}, column {column}: '{value}' is not a number", .path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        column: usize,
        value: String,
    },

    #[error("{}: line {line} has {fields} fields, expected 3", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        fields: usize,
    },

    #[error("unknown motion label '{0}' (expected stationary, slow, vibration or tap)")]
    UnknownLabel(String),

    #[error("{}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, FeatureError>;

impl FeatureError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
