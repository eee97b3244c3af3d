use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FeatureError;

/// Motion class assigned to every window of one recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionLabel {
    Stationary,
    Slow,
    Vibration,
    Tap,
}

impl MotionLabel {
    pub const ALL: [MotionLabel; 4] = [
        MotionLabel::Stationary,
        MotionLabel::Slow,
        MotionLabel::Vibration,
        MotionLabel::Tap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MotionLabel::Stationary => "stationary",
            MotionLabel::Slow => "slow",
            MotionLabel::Vibration => "vibration",
            MotionLabel::Tap => "tap",
        }
    }
}

impl fmt::Display for MotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionLabel {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MotionLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FeatureError::UnknownLabel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_labels() {
        assert_eq!("tap".parse::<MotionLabel>().unwrap(), MotionLabel::Tap);
        assert_eq!(
            " Vibration ".parse::<MotionLabel>().unwrap(),
            MotionLabel::Vibration
        );
        for label in MotionLabel::ALL {
            assert_eq!(label.to_string().parse::<MotionLabel>().unwrap(), label);
        }
    }

    #[test]
    fn rejects_unknown_label() {
        assert!(matches!("walking".parse::<MotionLabel>(), Err(FeatureError::UnknownLabel(_))));
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&MotionLabel::Stationary).unwrap();
        assert_eq!(json, "\"stationary\"");
    }
}
