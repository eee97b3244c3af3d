pub mod features;
pub mod summary;

pub use features::{ChannelFeatures, FeatureRow, FeatureVector, FEATURE_COLUMNS};
pub use summary::{summarize_by_label, BoxStats, LabelSummary};
