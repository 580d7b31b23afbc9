//! In-memory adapters and device rigs shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;

use sp_app::{ExecutionConfig, MediaActivityDeps, MediaActivityService};
use sp_core::activity::ActiveActivityRecord;
use sp_core::binding::ActivityBinding;
use sp_core::device::{
    Channel, ChannelCategory, Device, DeviceCategory, PermissionType, Property, PropertyCategory,
};
use sp_core::events::MediaActivityEvent;
use sp_core::ids::{BindingId, ChannelId, DeviceId, PropertyId, SpaceId};
use sp_core::ports::*;
use sp_core::ActivityKey;

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("sp_app=debug"))
            .with_test_writer()
            .try_init();
    });
}

/// Collects formatted log lines for assertions on what a use case reported.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Routes this thread's events into the buffer until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("sp_app=debug"))
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn snake<T: serde::Serialize>(value: T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default()
}

/// Property ids are `{device}-{property category}`, e.g. `avr-volume`.
pub fn device(
    id: &str,
    name: &str,
    category: DeviceCategory,
    channels: &[(ChannelCategory, &[PropertyCategory])],
) -> Device {
    Device {
        id: DeviceId::from(id),
        name: name.to_string(),
        category,
        platform: "simulator".to_string(),
        online: true,
        channels: channels
            .iter()
            .map(|(channel, properties)| Channel {
                id: ChannelId::from(format!("{id}-{}", snake(channel))),
                category: *channel,
                properties: properties
                    .iter()
                    .map(|property| Property {
                        id: PropertyId::from(format!("{id}-{}", snake(property))),
                        category: *property,
                        permissions: vec![PermissionType::ReadWrite],
                        value: None,
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub fn tv_only() -> Vec<Device> {
    use PropertyCategory::*;
    vec![device(
        "tv",
        "Living TV",
        DeviceCategory::Television,
        &[(ChannelCategory::Television, &[On, Source, RemoteKey])],
    )]
}

/// TV + AV receiver + speaker + streamer + console.
pub fn full_rig() -> Vec<Device> {
    use PropertyCategory::*;
    vec![
        device(
            "tv",
            "Living TV",
            DeviceCategory::Television,
            &[(ChannelCategory::Television, &[On, Source, Volume, RemoteKey])],
        ),
        device(
            "avr",
            "Receiver",
            DeviceCategory::AvReceiver,
            &[
                (ChannelCategory::Switcher, &[On]),
                (ChannelCategory::Speaker, &[Volume, Mute]),
                (ChannelCategory::MediaInput, &[Source]),
            ],
        ),
        device(
            "speaker",
            "Kitchen Speaker",
            DeviceCategory::Speaker,
            &[
                (ChannelCategory::Speaker, &[Volume]),
                (ChannelCategory::MediaPlayback, &[Command, State]),
            ],
        ),
        device(
            "streamer",
            "Streamer",
            DeviceCategory::StreamingService,
            &[
                (ChannelCategory::Switcher, &[On]),
                (ChannelCategory::MediaPlayback, &[Command, State]),
            ],
        ),
        device(
            "console",
            "Console",
            DeviceCategory::GameConsole,
            &[(ChannelCategory::Switcher, &[On])],
        ),
    ]
}

#[derive(Default)]
pub struct InMemoryGraph {
    spaces: Mutex<HashMap<SpaceId, Vec<Device>>>,
    /// Listed in their space but not resolvable by id.
    vanished: Mutex<HashSet<DeviceId>>,
    /// Lookups by id error out while space listings keep working.
    lookups_down: AtomicBool,
}

impl InMemoryGraph {
    pub fn with_space(space_id: &str, devices: Vec<Device>) -> Self {
        let graph = Self::default();
        graph.spaces.lock().unwrap().insert(SpaceId::from(space_id), devices);
        graph
    }

    pub fn add_space(&self, space_id: &str, devices: Vec<Device>) {
        self.spaces.lock().unwrap().insert(SpaceId::from(space_id), devices);
    }

    pub fn vanish(&self, device_id: &str) {
        self.vanished.lock().unwrap().insert(DeviceId::from(device_id));
    }

    pub fn fail_lookups(&self) {
        self.lookups_down.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeviceGraphPort for InMemoryGraph {
    async fn space_exists(&self, space_id: &SpaceId) -> Result<bool, DeviceGraphError> {
        Ok(self.spaces.lock().unwrap().contains_key(space_id))
    }

    async fn list_devices_in_space(&self, space_id: &SpaceId) -> Result<Vec<Device>, DeviceGraphError> {
        Ok(self.spaces.lock().unwrap().get(space_id).cloned().unwrap_or_default())
    }

    async fn find_devices_by_ids(&self, ids: &[DeviceId]) -> Result<Vec<Device>, DeviceGraphError> {
        if self.lookups_down.load(Ordering::SeqCst) {
            return Err(DeviceGraphError::Unavailable("graph connection lost".to_string()));
        }
        let vanished = self.vanished.lock().unwrap();
        Ok(self
            .spaces
            .lock()
            .unwrap()
            .values()
            .flatten()
            .filter(|d| ids.contains(&d.id) && !vanished.contains(&d.id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryBindings {
    rows: Mutex<Vec<ActivityBinding>>,
    /// Inserts for these keys fail with a storage error.
    refused: Mutex<HashSet<ActivityKey>>,
}

impl InMemoryBindings {
    pub fn refuse_inserts(&self, key: ActivityKey) {
        self.refused.lock().unwrap().insert(key);
    }
}

#[async_trait]
impl ActivityBindingRepositoryPort for InMemoryBindings {
    async fn list_by_space(&self, space_id: &SpaceId) -> Result<Vec<ActivityBinding>, BindingRepositoryError> {
        let mut bindings: Vec<ActivityBinding> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|b| &b.space_id == space_id)
            .cloned()
            .collect();
        bindings.sort_by_key(|b| b.activity_key.as_str());
        Ok(bindings)
    }

    async fn find_by_id(&self, id: &BindingId) -> Result<Option<ActivityBinding>, BindingRepositoryError> {
        Ok(self.rows.lock().unwrap().iter().find(|b| &b.id == id).cloned())
    }

    async fn find_by_space_and_key(
        &self,
        space_id: &SpaceId,
        key: ActivityKey,
    ) -> Result<Option<ActivityBinding>, BindingRepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|b| &b.space_id == space_id && b.activity_key == key)
            .cloned())
    }

    async fn insert(&self, binding: &ActivityBinding) -> Result<(), BindingRepositoryError> {
        if self.refused.lock().unwrap().contains(&binding.activity_key) {
            return Err(BindingRepositoryError::Storage("disk full".to_string()));
        }
        let mut bindings = self.rows.lock().unwrap();
        if bindings
            .iter()
            .any(|b| b.space_id == binding.space_id && b.activity_key == binding.activity_key)
        {
            return Err(BindingRepositoryError::Conflict);
        }
        bindings.push(binding.clone());
        Ok(())
    }

    async fn update(&self, binding: &ActivityBinding) -> Result<(), BindingRepositoryError> {
        let mut bindings = self.rows.lock().unwrap();
        let slot = bindings
            .iter_mut()
            .find(|b| b.id == binding.id)
            .ok_or(BindingRepositoryError::NotFound)?;
        *slot = binding.clone();
        Ok(())
    }

    async fn delete(&self, id: &BindingId) -> Result<(), BindingRepositoryError> {
        let mut bindings = self.rows.lock().unwrap();
        let before = bindings.len();
        bindings.retain(|b| &b.id != id);
        if bindings.len() == before {
            return Err(BindingRepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRecords(pub Mutex<HashMap<SpaceId, ActiveActivityRecord>>);

#[async_trait]
impl ActiveActivityRepositoryPort for InMemoryRecords {
    async fn find_by_space(
        &self,
        space_id: &SpaceId,
    ) -> Result<Option<ActiveActivityRecord>, ActiveActivityRepositoryError> {
        Ok(self.0.lock().unwrap().get(space_id).cloned())
    }

    async fn save(&self, record: &ActiveActivityRecord) -> Result<(), ActiveActivityRepositoryError> {
        self.0.lock().unwrap().insert(record.space_id.clone(), record.clone());
        Ok(())
    }
}

/// Accepts every command except those aimed at a rejected property.
#[derive(Default)]
pub struct ScriptedPlatform {
    rejected: Mutex<HashSet<PropertyId>>,
    pub sent: Mutex<Vec<PropertyCommand>>,
}

impl ScriptedPlatform {
    pub fn reject(&self, property_id: &str) {
        self.rejected.lock().unwrap().insert(PropertyId::from(property_id));
    }

    pub fn sent_to(&self, property_id: &str) -> Vec<PropertyCommand> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.property_id.as_str() == property_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DevicePlatformPort for ScriptedPlatform {
    async fn process_batch(&self, commands: Vec<PropertyCommand>) -> Result<bool, PlatformError> {
        let rejected = self.rejected.lock().unwrap();
        let accepted = commands.iter().all(|c| !rejected.contains(&c.property_id));
        self.sent.lock().unwrap().extend(commands);
        Ok(accepted)
    }
}

pub struct SingleRegistry(pub Arc<ScriptedPlatform>);

impl PlatformRegistryPort for SingleRegistry {
    fn get(&self, _device: &Device) -> Option<Arc<dyn DevicePlatformPort>> {
        Some(self.0.clone() as Arc<dyn DevicePlatformPort>)
    }
}

#[derive(Default)]
pub struct EventLog(Mutex<Vec<MediaActivityEvent>>);

impl EventLog {
    pub fn all(&self) -> Vec<MediaActivityEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().iter().map(MediaActivityEvent::name).collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaActivityEventPort for EventLog {
    async fn emit(&self, event: MediaActivityEvent) {
        self.0.lock().unwrap().push(event);
    }
}

/// Advances one millisecond per reading.
pub struct TickClock(AtomicI64);

impl ClockPort for TickClock {
    fn now_ms(&self) -> i64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

pub struct Harness {
    pub service: MediaActivityService,
    pub graph: Arc<InMemoryGraph>,
    pub platform: Arc<ScriptedPlatform>,
    pub events: Arc<EventLog>,
    pub records: Arc<InMemoryRecords>,
    pub bindings: Arc<InMemoryBindings>,
    pub space: SpaceId,
}

pub fn harness(devices: Vec<Device>) -> Harness {
    init_tracing();

    let graph = Arc::new(InMemoryGraph::with_space("living", devices));
    let platform = Arc::new(ScriptedPlatform::default());
    let events = Arc::new(EventLog::default());
    let records = Arc::new(InMemoryRecords::default());
    let bindings = Arc::new(InMemoryBindings::default());

    let service = MediaActivityService::from_deps(MediaActivityDeps {
        device_graph: graph.clone(),
        platforms: Arc::new(SingleRegistry(platform.clone())),
        binding_repo: bindings.clone(),
        activity_repo: records.clone(),
        events: events.clone(),
        clock: Arc::new(TickClock(AtomicI64::new(1_700_000_000_000))),
        execution: ExecutionConfig {
            step_timeout: Duration::from_secs(1),
            settle_delay: Duration::ZERO,
        },
    });

    Harness {
        service,
        graph,
        platform,
        events,
        records,
        bindings,
        space: SpaceId::from("living"),
    }
}
