// ==========================================
// 培训考勤系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (scope_id + key + value)
// ==========================================

use crate::config::ledger_config_trait::LedgerConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::MissingRollPolicy;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 全局作用域
const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        tracing::info!(key = %key, value = %value, "配置已更新");
        Ok(())
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 列出全部 global 配置
    pub fn list_global_configs(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut configs = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            configs.insert(key, value);
        }
        Ok(configs)
    }
}

// ==========================================
// LedgerConfigReader 实现
// ==========================================
#[async_trait]
impl LedgerConfigReader for ConfigManager {
    async fn get_irregular_threshold(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::IRREGULAR_THRESHOLD, "25")?;
        let threshold: f64 = value
            .trim()
            .parse()
            .map_err(|e| format!("{} 格式错误 ({}): {}", config_keys::IRREGULAR_THRESHOLD, value, e))?;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(format!("{} 超出范围 [0, 100]: {}", config_keys::IRREGULAR_THRESHOLD, threshold).into());
        }
        Ok(threshold)
    }

    async fn get_missing_roll_policy(&self) -> Result<MissingRollPolicy, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::MISSING_ROLL_POLICY, "REJECT")?;
        Ok(MissingRollPolicy::from_str(&value))
    }

    async fn get_max_conflict_retries(&self) -> Result<u32, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::MAX_CONFLICT_RETRIES, "3")?;
        let retries: u32 = value
            .trim()
            .parse()
            .map_err(|e| format!("{} 格式错误 ({}): {}", config_keys::MAX_CONFLICT_RETRIES, value, e))?;
        Ok(retries)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    /// 低出勤阈值（百分比）
    pub const IRREGULAR_THRESHOLD: &str = "irregular_threshold";
    /// 缺席学号处理策略 (REJECT / MARK_ABSENT)
    pub const MISSING_ROLL_POLICY: &str = "missing_roll_policy";
    /// 乐观锁冲突最大重试次数
    pub const MAX_CONFLICT_RETRIES: &str = "max_conflict_retries";
}
