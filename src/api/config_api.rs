// ==========================================
// 培训考勤系统 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新（写入前按键校验取值）
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::{config_keys, ConfigManager};

/// 配置项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub key: String,
    pub value: String,
}

// ==========================================
// ConfigApi - 配置管理 API
// ==========================================
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 查询所有 global 配置（按键排序）
    pub fn list_configs(&self) -> ApiResult<Vec<ConfigItem>> {
        let configs = self
            .config_manager
            .list_global_configs()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(configs
            .into_iter()
            .map(|(key, value)| ConfigItem { key, value })
            .collect())
    }

    /// 查询单个配置
    pub fn get_config(&self, key: &str) -> ApiResult<Option<ConfigItem>> {
        let value = self
            .config_manager
            .get_global_config_value(key)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(value.map(|value| ConfigItem {
            key: key.to_string(),
            value,
        }))
    }

    /// 更新配置
    ///
    /// # 返回
    /// - Err(InvalidInput): 未知键或取值非法
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<()> {
        validate_config_value(key, value)?;
        self.config_manager
            .set_global_config_value(key, value.trim())
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        info!(key = %key, "配置已通过 API 更新");
        Ok(())
    }
}

fn validate_config_value(key: &str, value: &str) -> ApiResult<()> {
    let value = value.trim();
    let ok = match key {
        config_keys::IRREGULAR_THRESHOLD => value
            .parse::<f64>()
            .map_or(false, |v| (0.0..=100.0).contains(&v)),
        config_keys::MISSING_ROLL_POLICY => {
            matches!(value.to_uppercase().as_str(), "REJECT" | "MARK_ABSENT")
        }
        config_keys::MAX_CONFLICT_RETRIES => value.parse::<u32>().is_ok(),
        _ => return Err(ApiError::InvalidInput(format!("未知配置项: {}", key))),
    };
    if !ok {
        return Err(ApiError::InvalidInput(format!("配置项 {} 取值非法: {}", key, value)));
    }
    Ok(())
}
