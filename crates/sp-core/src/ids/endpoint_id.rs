use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DeviceId, SpaceId};
use crate::endpoint::EndpointType;

/// Deterministic identifier of a derived endpoint: `{space}:{type}:{device}`.
///
/// Endpoints are never persisted, so the id is the only thing that survives
/// between two projections of the same device graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
    pub fn derive(space_id: &SpaceId, endpoint_type: EndpointType, device_id: &DeviceId) -> Self {
        Self(format!(
            "{}:{}:{}",
            space_id.as_str(),
            endpoint_type.as_str(),
            device_id.as_str()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EndpointId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EndpointId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<EndpointId> for String {
    fn from(id: EndpointId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_joins_space_type_and_device() {
        let id = EndpointId::derive(
            &SpaceId::from("living-room"),
            EndpointType::AudioOutput,
            &DeviceId::from("avr-1"),
        );
        assert_eq!(id.as_str(), "living-room:audio_output:avr-1");
    }
}
