//! # Pure Data Module / 纯数据模块
//!
//! Configuration DTOs. TOML → DTO mapping only: no validation and no
//! defaults. Missing values become empty/zero facts; policy lives in the
//! layers that consume the config.

use std::path::PathBuf;

/// Media engine configuration DTO (pure data, no logic)
/// 媒体引擎配置 DTO（纯数据，无逻辑）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// JSON device graph used by the in-memory graph adapter
    pub device_graph_path: PathBuf,

    /// Per-step dispatch timeout, 0 when absent
    pub step_timeout_ms: u64,

    /// Wait before each step, 0 when absent
    pub step_settle_delay_ms: u64,

    /// Directory for log files, empty when file logging is off
    pub log_directory: PathBuf,
}

impl MediaConfig {
    /// Create MediaConfig from TOML value
    /// 从 TOML 值创建 MediaConfig
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let section_str = |section: &str, key: &str| {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let section_u64 = |section: &str, key: &str| {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_integer())
                .map(|v| v.max(0) as u64)
                .unwrap_or(0)
        };

        Ok(Self {
            database_path: PathBuf::from(section_str("storage", "database_path")),
            device_graph_path: PathBuf::from(section_str("devices", "graph_path")),
            step_timeout_ms: section_u64("activation", "step_timeout_ms"),
            step_settle_delay_ms: section_u64("activation", "step_settle_delay_ms"),
            log_directory: PathBuf::from(section_str("logging", "directory")),
        })
    }

    /// Create empty MediaConfig (all empty/zero values)
    pub fn empty() -> Self {
        Self {
            database_path: PathBuf::new(),
            device_graph_path: PathBuf::new(),
            step_timeout_ms: 0,
            step_settle_delay_ms: 0,
            log_directory: PathBuf::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_sections_to_fields() {
        let value: toml::Value = toml::from_str(
            r#"
            [storage]
            database_path = "/tmp/media.db"

            [devices]
            graph_path = "/tmp/devices.json"

            [activation]
            step_timeout_ms = 4000
            step_settle_delay_ms = 100
            "#,
        )
        .unwrap();

        let config = MediaConfig::from_toml(&value).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/media.db"));
        assert_eq!(config.device_graph_path, PathBuf::from("/tmp/devices.json"));
        assert_eq!(config.step_timeout_ms, 4000);
        assert_eq!(config.step_settle_delay_ms, 100);
        assert_eq!(config.log_directory, PathBuf::new());
    }

    #[test]
    fn missing_sections_are_empty_facts() {
        let value: toml::Value = toml::from_str("").unwrap();
        assert_eq!(MediaConfig::from_toml(&value).unwrap(), MediaConfig::empty());
    }
}
