//! # Dependency grouping / 依赖分组
//!
//! Parameter grouping for [`MediaActivityService`](crate::MediaActivityService)
//! construction. Not a builder: every port is required and nothing is defaulted.

use std::sync::Arc;

use sp_core::ports::*;

use crate::usecases::activity::ExecutionConfig;

pub struct MediaActivityDeps {
    // Device graph / 设备图
    pub device_graph: Arc<dyn DeviceGraphPort>,
    pub platforms: Arc<dyn PlatformRegistryPort>,

    // Storage / 存储
    pub binding_repo: Arc<dyn ActivityBindingRepositoryPort>,
    pub activity_repo: Arc<dyn ActiveActivityRepositoryPort>,

    // Events and time / 事件与时间
    pub events: Arc<dyn MediaActivityEventPort>,
    pub clock: Arc<dyn ClockPort>,

    pub execution: ExecutionConfig,
}
