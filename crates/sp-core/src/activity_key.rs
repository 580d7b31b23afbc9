use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::binding::BindingValidationError;

/// Named media activity a space can be put into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKey {
    Watch,
    Listen,
    Gaming,
    Background,
    Off,
}

impl ActivityKey {
    /// Keys that carry a binding. `Off` never does.
    pub const CONFIGURABLE: [ActivityKey; 4] = [
        ActivityKey::Watch,
        ActivityKey::Listen,
        ActivityKey::Gaming,
        ActivityKey::Background,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKey::Watch => "watch",
            ActivityKey::Listen => "listen",
            ActivityKey::Gaming => "gaming",
            ActivityKey::Background => "background",
            ActivityKey::Off => "off",
        }
    }

    /// Video activities need a screen; their power steps are critical.
    pub fn is_video(&self) -> bool {
        matches!(self, ActivityKey::Watch | ActivityKey::Gaming)
    }

    /// Audio-only activities that yield to a video activity.
    pub fn is_audio_only(&self) -> bool {
        matches!(self, ActivityKey::Listen | ActivityKey::Background)
    }
}

impl fmt::Display for ActivityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKey {
    type Err = BindingValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watch" => Ok(ActivityKey::Watch),
            "listen" => Ok(ActivityKey::Listen),
            "gaming" => Ok(ActivityKey::Gaming),
            "background" => Ok(ActivityKey::Background),
            "off" => Ok(ActivityKey::Off),
            other => Err(BindingValidationError::InvalidActivityKey(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys_and_rejects_others() {
        assert_eq!("gaming".parse::<ActivityKey>().unwrap(), ActivityKey::Gaming);
        assert_eq!("off".parse::<ActivityKey>().unwrap(), ActivityKey::Off);
        assert!(matches!(
            "party".parse::<ActivityKey>(),
            Err(BindingValidationError::InvalidActivityKey(k)) if k == "party"
        ));
    }

    #[test]
    fn off_is_not_configurable() {
        assert!(!ActivityKey::CONFIGURABLE.contains(&ActivityKey::Off));
    }
}
