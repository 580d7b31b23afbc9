//! # Configuration Loader / 配置加载器
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Read the TOML file from disk
//! - ✅ Map it onto [`MediaConfig`]
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No validation and no defaults here.**
//! Defaults are applied where values are consumed
//! (`ExecutionConfig::from_media_config`, wiring).
//! 默认值由使用方决定，这里只负责加载。

use std::path::PathBuf;

use anyhow::Context;
use sp_core::config::MediaConfig;

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// - File cannot be read (I/O error)
/// - Content is not valid TOML (parse error)
pub fn load_config(config_path: PathBuf) -> anyhow::Result<MediaConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    MediaConfig::from_toml(&toml_value)
}

/// `<config dir>/smart-panel/media.toml`, or `media.toml` in the working
/// directory when the platform has no config dir.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("smart-panel").join("media.toml"))
        .unwrap_or_else(|| PathBuf::from("media.toml"))
}
