mod support;

use sp_app::MediaActivityFacade;
use sp_core::activity::ActivationState;
use sp_core::binding::{BindingSettings, NewActivityBinding};
use sp_core::device::PropertyValue;
use sp_core::endpoint::EndpointType;
use sp_core::ids::{EndpointId, SpaceId};
use sp_core::plan::PlanDiagnosticKind;
use sp_core::ActivityKey;

use support::{full_rig, harness, Harness};

fn endpoint(device: &str, endpoint_type: EndpointType) -> EndpointId {
    EndpointId::derive(&SpaceId::from("living"), endpoint_type, &device.into())
}

async fn with_defaults() -> Harness {
    let h = harness(full_rig());
    h.service.apply_defaults(&h.space).await.unwrap();
    h
}

#[tokio::test]
async fn watch_powers_on_bound_devices_in_order() {
    let h = with_defaults().await;

    let result = h.service.activate(&h.space, ActivityKey::Watch).await.unwrap();

    assert_eq!(result.state, ActivationState::Active);
    assert_eq!(result.activity_key, Some(ActivityKey::Watch));
    let summary = result.summary.unwrap();
    assert_eq!(summary.steps_total, 3);
    assert_eq!(summary.steps_succeeded, 3);

    let sent: Vec<String> = h
        .platform
        .sent
        .lock()
        .unwrap()
        .iter()
        .map(|c| c.property_id.to_string())
        .collect();
    assert_eq!(sent, vec!["tv-on", "avr-on", "streamer-on"]);

    let resolved = result.resolved.unwrap();
    assert_eq!(resolved.display_device_id.as_deref().map(String::as_str), Some("tv"));
    assert_eq!(
        resolved.control_targets.volume_target_device_id.as_deref().map(String::as_str),
        Some("avr")
    );

    let names = h.events.names();
    assert_eq!(names.first(), Some(&"media_activity.activating"));
    assert_eq!(names.last(), Some(&"media_activity.activated"));

    let active = h.service.get_active(&h.space).await.unwrap().unwrap();
    assert_eq!(active.state, ActivationState::Active);
}

#[tokio::test]
async fn repeated_activation_is_a_no_op() {
    let h = with_defaults().await;

    let first = h.service.activate(&h.space, ActivityKey::Watch).await.unwrap();
    let emitted = h.events.len();
    let sent = h.platform.sent.lock().unwrap().len();

    let second = h.service.activate(&h.space, ActivityKey::Watch).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(h.events.len(), emitted);
    assert_eq!(h.platform.sent.lock().unwrap().len(), sent);
}

#[tokio::test]
async fn concurrent_activations_of_one_space_run_once() {
    let h = with_defaults().await;

    let (a, b) = tokio::join!(
        h.service.activate(&h.space, ActivityKey::Watch),
        h.service.activate(&h.space, ActivityKey::Watch),
    );

    assert_eq!(a.unwrap().state, ActivationState::Active);
    assert_eq!(b.unwrap().state, ActivationState::Active);
    let activating = h
        .events
        .names()
        .into_iter()
        .filter(|n| *n == "media_activity.activating")
        .count();
    assert_eq!(activating, 1);
}

#[tokio::test]
async fn off_behaves_like_deactivate() {
    let h = with_defaults().await;
    h.service.activate(&h.space, ActivityKey::Watch).await.unwrap();

    let result = h.service.activate(&h.space, ActivityKey::Off).await.unwrap();

    assert_eq!(result.state, ActivationState::Deactivated);
    assert_eq!(result.activity_key, None);
    assert!(result.summary.is_none());
    // the snapshot is kept for the next stop pass
    assert!(result.resolved.is_some());
    assert_eq!(h.events.names().last(), Some(&"media_activity.deactivated"));

    let paused = h.platform.sent_to("streamer-command");
    assert_eq!(paused.len(), 1);
    assert_eq!(paused[0].value, PropertyValue::Text("pause".to_string()));
}

#[tokio::test]
async fn deactivate_without_history_stores_nothing() {
    let h = harness(full_rig());

    let result = h.service.deactivate(&h.space).await.unwrap();

    assert_eq!(result.state, ActivationState::Deactivated);
    assert_eq!(result.activity_key, None);
    assert!(result.warnings.is_empty());
    assert!(h.records.0.lock().unwrap().get(&h.space).is_none());
    assert!(h.service.get_active(&h.space).await.unwrap().is_none());
    assert!(h.platform.sent.lock().unwrap().is_empty());

    let events = h.events.all();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), "media_activity.deactivated");
    assert_eq!(events[0].activity_key(), None);
    assert_eq!(events[0].state(), ActivationState::Deactivated);
}

#[tokio::test]
async fn vanished_display_fails_watch_and_aborts() {
    let h = with_defaults().await;
    h.graph.vanish("tv");

    let result = h.service.activate(&h.space, ActivityKey::Watch).await.unwrap();

    assert_eq!(result.state, ActivationState::Failed);
    let summary = result.summary.unwrap();
    assert_eq!(summary.steps_succeeded, 0);
    assert_eq!(summary.steps_failed, 1);
    assert!(summary.errors[0].reason.contains("not found"));
    assert!(h.platform.sent.lock().unwrap().is_empty());
    assert_eq!(h.events.names().last(), Some(&"media_activity.failed"));

    let stored = h.service.get_active(&h.space).await.unwrap().unwrap();
    assert_eq!(stored.state, ActivationState::Failed);
}

#[tokio::test]
async fn graph_outage_mid_activation_ends_in_failed() {
    let h = with_defaults().await;
    h.graph.fail_lookups();

    let result = h.service.activate(&h.space, ActivityKey::Watch).await.unwrap();

    assert_eq!(result.state, ActivationState::Failed);
    let summary = result.summary.unwrap();
    assert_eq!(summary.steps_total, 3);
    assert_eq!(summary.steps_succeeded, 0);
    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.errors[0].step_index, None);
    assert!(summary.errors[0].critical);
    assert!(summary.errors[0].reason.starts_with("Unexpected error"));
    assert!(h.platform.sent.lock().unwrap().is_empty());

    let stored = h.service.get_active(&h.space).await.unwrap().unwrap();
    assert_eq!(stored.state, ActivationState::Failed);
    assert_eq!(stored.activity_key, Some(ActivityKey::Watch));

    let events = h.events.all();
    let last = events.last().unwrap();
    assert_eq!(last.name(), "media_activity.failed");
    assert_eq!(last.state(), ActivationState::Failed);
    assert_eq!(events[0].state(), ActivationState::Activating);
}

#[tokio::test]
async fn failed_volume_preset_keeps_listen_active() {
    let h = harness(full_rig());
    h.service
        .create_binding(
            &h.space,
            NewActivityBinding {
                activity_key: ActivityKey::Listen,
                settings: BindingSettings {
                    audio_endpoint_id: Some(endpoint("avr", EndpointType::AudioOutput)),
                    audio_volume_preset: Some(35),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();
    h.platform.reject("avr-volume");

    let result = h.service.activate(&h.space, ActivityKey::Listen).await.unwrap();

    assert_eq!(result.state, ActivationState::Active);
    let summary = result.summary.unwrap();
    assert_eq!(summary.steps_succeeded, 1);
    assert_eq!(summary.steps_failed, 1);
    assert_eq!(summary.warning_count, 1);
    assert!(!result.warnings.is_empty());
    assert_eq!(h.platform.sent_to("avr-volume")[0].value, PropertyValue::Int(35));
}

#[tokio::test]
async fn watch_after_listen_pauses_playback() {
    let h = with_defaults().await;
    h.service.activate(&h.space, ActivityKey::Listen).await.unwrap();

    let result = h.service.activate(&h.space, ActivityKey::Watch).await.unwrap();

    assert_eq!(result.state, ActivationState::Active);
    assert_eq!(h.platform.sent_to("speaker-command").len(), 1);
    assert_eq!(h.platform.sent_to("streamer-command").len(), 1);
    assert!(result.warnings.iter().any(|w| w.contains("conflict with listen")));
}

#[tokio::test]
async fn repeated_watch_keeps_the_conflict_warnings() {
    let h = with_defaults().await;
    h.service.activate(&h.space, ActivityKey::Listen).await.unwrap();
    let first = h.service.activate(&h.space, ActivityKey::Watch).await.unwrap();

    let again = h.service.activate(&h.space, ActivityKey::Watch).await.unwrap();

    assert_eq!(again, first);
    assert!(again.warnings.iter().any(|w| w.contains("conflict with listen")));
}

#[tokio::test]
async fn activation_requires_a_binding() {
    let h = harness(full_rig());

    let err = h.service.activate(&h.space, ActivityKey::Gaming).await.unwrap_err();

    assert!(err.to_string().contains("gaming"));
    assert!(h.events.all().is_empty());
}

#[tokio::test]
async fn preview_dispatches_nothing() {
    let h = with_defaults().await;

    let watch = h.service.preview(&h.space, ActivityKey::Watch).await.unwrap();
    let labels: Vec<&str> = watch.steps.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Power on Living TV (Display)",
            "Power on Receiver (Audio Output)",
            "Power on Streamer (Source)",
        ]
    );

    let listen = h.service.preview(&h.space, ActivityKey::Listen).await.unwrap();
    assert!(listen
        .diagnostics
        .iter()
        .any(|d| d.kind == PlanDiagnosticKind::PowerSkipped));

    assert!(h.platform.sent.lock().unwrap().is_empty());
    assert!(h.events.all().is_empty());
    assert!(h.service.get_active(&h.space).await.unwrap().is_none());
}
