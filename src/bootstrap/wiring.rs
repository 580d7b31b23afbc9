//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Create infra implementations (db, device graph, event bus) / 创建 infra 层具体实现
//! - ✅ Inject all ports into [`MediaActivityService`] / 将所有端口注入到服务
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No business logic / 禁止包含任何业务逻辑**
//! - Do not decide which bindings a space should have
//! - 不判断空间应该有哪些绑定
//!
//! ❌ **No configuration validation / 禁止做配置验证**
//! - Config already loaded in config.rs
//! - 配置已在 config.rs 加载
//!
//! > **This is the only place allowed to depend on sp-infra and sp-app simultaneously.**
//! > **这是唯一允许同时依赖 sp-infra 和 sp-app 的地方。**

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use sp_app::{ExecutionConfig, MediaActivityDeps, MediaActivityService};
use sp_core::config::MediaConfig;
use sp_infra::db::mappers::{ActiveActivityRowMapper, BindingRowMapper};
use sp_infra::db::repositories::{DieselActiveActivityRepository, DieselActivityBindingRepository};
use sp_infra::db::{init_db_pool, DbPool, DieselSqliteExecutor};
use sp_infra::{BroadcastMediaEventBus, InMemoryDeviceGraph, SimulatedPlatformRegistry, SystemClock};

const DEFAULT_DB_FILE: &str = "media.db";

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入错误（基础设施初始化失败）
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    #[error("Device graph initialization failed: {0}")]
    DeviceGraphInit(String),
}

/// Everything a host needs after startup.
/// 启动后宿主需要的全部对象。
pub struct MediaRuntime {
    pub service: MediaActivityService,
    /// Concrete bus, kept so hosts can subscribe.
    pub events: Arc<BroadcastMediaEventBus>,
    /// Concrete graph, kept so hosts can inspect simulated device state.
    pub graph: Arc<InMemoryDeviceGraph>,
}

/// Where the database lives when the config leaves it empty.
fn resolve_db_path(configured: &Path) -> PathBuf {
    if !configured.as_os_str().is_empty() {
        return configured.to_path_buf();
    }
    dirs::data_local_dir()
        .map(|dir| dir.join("smart-panel").join(DEFAULT_DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
}

/// Create SQLite database connection pool
/// 创建 SQLite 数据库连接池
///
/// # Errors / 错误
///
/// Returns `WiringError::DatabaseInit` if:
/// 如果以下情况返回 `WiringError::DatabaseInit`：
/// - Parent directory creation fails / 父目录创建失败
/// - Database pool creation fails / 数据库池创建失败
/// - Migration fails / 迁移失败
fn create_db_pool(db_path: &Path) -> WiringResult<DbPool> {
    // Ensure parent directory exists
    // 确保父目录存在
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            WiringError::DatabaseInit(format!("Failed to create DB directory: {}", e))
        })?;
    }

    let db_url = db_path
        .to_str()
        .ok_or_else(|| WiringError::DatabaseInit("Invalid database path".to_string()))?;

    init_db_pool(db_url)
        .map_err(|e| WiringError::DatabaseInit(format!("Failed to initialize DB: {}", e)))
}

/// Load the device graph file, or start empty when none is configured.
async fn load_device_graph(path: &Path) -> WiringResult<InMemoryDeviceGraph> {
    if path.as_os_str().is_empty() {
        info!("No device graph configured, starting with an empty graph");
        return Ok(InMemoryDeviceGraph::default());
    }
    InMemoryDeviceGraph::load(path)
        .await
        .map_err(|e| WiringError::DeviceGraphInit(format!("{:#}", e)))
}

/// Wire all dependencies together
/// 将所有依赖连接在一起
///
/// Opens storage, loads the device graph and hands every port to
/// [`MediaActivityService::from_deps`].
pub async fn wire_dependencies(config: &MediaConfig) -> WiringResult<MediaRuntime> {
    let db_path = resolve_db_path(&config.database_path);
    let pool = create_db_pool(&db_path)?;
    let executor = DieselSqliteExecutor::new(pool);
    info!(path = %db_path.display(), "Database ready");

    let graph = Arc::new(load_device_graph(&config.device_graph_path).await?);
    let events = Arc::new(BroadcastMediaEventBus::default());

    let deps = MediaActivityDeps {
        device_graph: graph.clone(),
        platforms: Arc::new(SimulatedPlatformRegistry::new(graph.clone())),
        binding_repo: Arc::new(DieselActivityBindingRepository::new(
            executor.clone(),
            BindingRowMapper,
        )),
        activity_repo: Arc::new(DieselActiveActivityRepository::new(
            executor,
            ActiveActivityRowMapper,
        )),
        events: events.clone(),
        clock: Arc::new(SystemClock),
        execution: ExecutionConfig::from_media_config(config),
    };

    Ok(MediaRuntime {
        service: MediaActivityService::from_deps(deps),
        events,
        graph,
    })
}
