//! Heuristic default bindings.
//!
//! Every chooser ranks candidates with an integer score and keeps the first
//! endpoint (projector order) among equal scores, so the same endpoints always
//! yield the same defaults.

use sp_core::binding::{BindingSettings, BACKGROUND_DEFAULT_VOLUME};
use sp_core::device::DeviceCategory;
use sp_core::endpoint::{DerivedEndpoint, EndpointMap, EndpointType};
use sp_core::ids::DeviceId;
use sp_core::ActivityKey;

fn best_by<'a>(
    candidates: impl Iterator<Item = &'a DerivedEndpoint>,
    score: impl Fn(&DerivedEndpoint) -> u32,
) -> Option<&'a DerivedEndpoint> {
    let mut best: Option<(&'a DerivedEndpoint, u32)> = None;
    for candidate in candidates {
        let value = score(candidate);
        if best.map_or(true, |(_, top)| value > top) {
            best = Some((candidate, value));
        }
    }
    best.map(|(endpoint, _)| endpoint)
}

fn has_remote(endpoints: &EndpointMap, device_id: &DeviceId) -> bool {
    endpoints
        .for_device(device_id)
        .any(|e| e.endpoint_type == EndpointType::RemoteTarget)
}

fn choose_display(endpoints: &EndpointMap) -> Option<&DerivedEndpoint> {
    best_by(endpoints.of_type(EndpointType::Display), |e| {
        2 * u32::from(e.capabilities.input_select) + u32::from(has_remote(endpoints, &e.device_id))
    })
}

fn audio_category_score(category: DeviceCategory) -> u32 {
    match category {
        DeviceCategory::AvReceiver => 3,
        DeviceCategory::Television | DeviceCategory::Projector => 2,
        DeviceCategory::Speaker => 1,
        _ => 0,
    }
}

fn choose_audio(key: ActivityKey, endpoints: &EndpointMap) -> Option<&DerivedEndpoint> {
    let outputs = endpoints.of_type(EndpointType::AudioOutput);
    if key.is_video() {
        best_by(outputs.filter(|e| e.capabilities.volume), |e| {
            audio_category_score(e.device_category)
        })
    } else {
        best_by(outputs, |e| {
            2 * u32::from(e.capabilities.playback)
                + u32::from(e.device_category == DeviceCategory::Speaker)
        })
    }
}

fn first_source<'a>(
    endpoints: &'a EndpointMap,
    predicate: impl Fn(&DerivedEndpoint) -> bool,
) -> Option<&'a DerivedEndpoint> {
    endpoints.of_type(EndpointType::Source).find(|e| predicate(*e))
}

fn choose_source(key: ActivityKey, endpoints: &EndpointMap) -> Option<&DerivedEndpoint> {
    match key {
        ActivityKey::Watch => {
            first_source(endpoints, |e| e.device_category == DeviceCategory::StreamingService)
                .or_else(|| first_source(endpoints, |e| e.capabilities.playback))
        }
        ActivityKey::Gaming => {
            first_source(endpoints, |e| e.device_category == DeviceCategory::GameConsole)
                .or_else(|| first_source(endpoints, |e| e.name.to_lowercase().contains("game")))
                .or_else(|| first_source(endpoints, |e| e.device_category == DeviceCategory::SetTopBox))
        }
        ActivityKey::Listen => {
            first_source(endpoints, |e| e.capabilities.playback || e.capabilities.track)
        }
        ActivityKey::Background | ActivityKey::Off => None,
    }
}

fn remote_on<'a>(endpoints: &'a EndpointMap, device: Option<&DerivedEndpoint>) -> Option<&'a DerivedEndpoint> {
    let device_id = &device?.device_id;
    endpoints
        .of_type(EndpointType::RemoteTarget)
        .find(|e| &e.device_id == device_id)
}

/// Background is ambient audio with no screen to drive, so it gets no remote
/// even when one exists. Off has no binding at all.
fn choose_remote<'a>(
    key: ActivityKey,
    endpoints: &'a EndpointMap,
    display: Option<&DerivedEndpoint>,
    audio: Option<&DerivedEndpoint>,
    source: Option<&DerivedEndpoint>,
) -> Option<&'a DerivedEndpoint> {
    let preferred = match key {
        ActivityKey::Watch | ActivityKey::Gaming => remote_on(endpoints, display),
        ActivityKey::Listen => remote_on(endpoints, source)
            .or_else(|| remote_on(endpoints, audio))
            .or_else(|| remote_on(endpoints, display)),
        ActivityKey::Background | ActivityKey::Off => return None,
    };
    preferred.or_else(|| endpoints.of_type(EndpointType::RemoteTarget).next())
}

/// Default settings for `key` given the current endpoints of a space.
pub fn propose_default(key: ActivityKey, endpoints: &EndpointMap) -> BindingSettings {
    let display = choose_display(endpoints);
    let audio = choose_audio(key, endpoints);
    let source = choose_source(key, endpoints);
    let remote = choose_remote(key, endpoints, display, audio, source);

    let assigned_display = if key.is_video() { display } else { None };
    // The preset is only valid on a volume-capable output.
    let audio_volume_preset = match (key, audio) {
        (ActivityKey::Background, Some(audio)) if audio.capabilities.volume => {
            Some(BACKGROUND_DEFAULT_VOLUME)
        }
        _ => None,
    };

    let id = |e: Option<&DerivedEndpoint>| e.map(|e| e.endpoint_id.clone());
    BindingSettings {
        display_endpoint_id: id(assigned_display),
        audio_endpoint_id: id(audio),
        source_endpoint_id: id(source),
        remote_endpoint_id: id(remote),
        audio_volume_preset,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_core::endpoint::{EndpointCapabilities, EndpointLinks};
    use sp_core::ids::{EndpointId, SpaceId};

    fn endpoint(
        device: &str,
        category: DeviceCategory,
        endpoint_type: EndpointType,
        capabilities: EndpointCapabilities,
    ) -> DerivedEndpoint {
        let space_id = SpaceId::from("s");
        let device_id = DeviceId::from(device);
        DerivedEndpoint {
            endpoint_id: EndpointId::derive(&space_id, endpoint_type, &device_id),
            space_id,
            device_id,
            device_category: category,
            endpoint_type,
            name: device.to_string(),
            capabilities,
            links: EndpointLinks::default(),
        }
    }

    fn speaker(device: &str, volume: bool) -> DerivedEndpoint {
        endpoint(
            device,
            DeviceCategory::Speaker,
            EndpointType::AudioOutput,
            EndpointCapabilities {
                volume,
                ..Default::default()
            },
        )
    }

    #[test]
    fn equal_scores_keep_the_first_endpoint() {
        let endpoints = EndpointMap::new(vec![speaker("first", true), speaker("second", true)]);

        let settings = propose_default(ActivityKey::Listen, &endpoints);

        assert_eq!(
            settings.audio_endpoint_id.as_ref().map(|id| id.as_str()),
            Some("s:audio_output:first")
        );
    }

    #[test]
    fn background_preset_needs_a_volume_capable_output() {
        let with_volume = EndpointMap::new(vec![speaker("kitchen", true)]);
        let without_volume = EndpointMap::new(vec![speaker("kitchen", false)]);

        assert_eq!(
            propose_default(ActivityKey::Background, &with_volume).audio_volume_preset,
            Some(BACKGROUND_DEFAULT_VOLUME)
        );
        assert_eq!(
            propose_default(ActivityKey::Background, &without_volume).audio_volume_preset,
            None
        );
    }

    #[test]
    fn background_never_gets_a_remote() {
        let endpoints = EndpointMap::new(vec![
            speaker("kitchen", true),
            endpoint(
                "tv",
                DeviceCategory::Television,
                EndpointType::RemoteTarget,
                EndpointCapabilities::default(),
            ),
        ]);

        assert_eq!(propose_default(ActivityKey::Background, &endpoints).remote_endpoint_id, None);
        assert_eq!(
            propose_default(ActivityKey::Listen, &endpoints)
                .remote_endpoint_id
                .as_ref()
                .map(|id| id.as_str()),
            Some("s:remote_target:tv")
        );
    }

    #[test]
    fn video_audio_skips_outputs_without_volume() {
        let endpoints = EndpointMap::new(vec![speaker("mute-only", false)]);

        assert_eq!(propose_default(ActivityKey::Watch, &endpoints).audio_endpoint_id, None);
    }

    #[test]
    fn gaming_source_falls_back_to_a_game_named_device() {
        let endpoints = EndpointMap::new(vec![
            endpoint(
                "streamer",
                DeviceCategory::StreamingService,
                EndpointType::Source,
                EndpointCapabilities::default(),
            ),
            endpoint(
                "Retro Game Box",
                DeviceCategory::Media,
                EndpointType::Source,
                EndpointCapabilities::default(),
            ),
        ]);

        let settings = propose_default(ActivityKey::Gaming, &endpoints);

        assert_eq!(
            settings.source_endpoint_id.as_ref().map(|id| id.as_str()),
            Some("s:source:Retro Game Box")
        );
    }
}
