// ==========================================
// 培训考勤系统 - 考勤台账配置读取 Trait
// ==========================================
// 职责: 定义台账与报表所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::MissingRollPolicy;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// LedgerConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）, 测试中的 MockConfig
#[async_trait]
pub trait LedgerConfigReader: Send + Sync {
    /// 获取低出勤阈值（百分比，含等于）
    ///
    /// # 默认值
    /// - 25.0
    async fn get_irregular_threshold(&self) -> Result<f64, Box<dyn Error>>;

    /// 获取缺席学号处理策略
    ///
    /// # 默认值
    /// - REJECT
    async fn get_missing_roll_policy(&self) -> Result<MissingRollPolicy, Box<dyn Error>>;

    /// 获取乐观锁冲突的最大重试次数
    ///
    /// # 默认值
    /// - 3
    async fn get_max_conflict_retries(&self) -> Result<u32, Box<dyn Error>>;
}
