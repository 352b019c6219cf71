// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use std::error::Error;
use training_ledger::config::LedgerConfigReader;
use training_ledger::domain::types::MissingRollPolicy;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub irregular_threshold: f64,
    pub missing_roll_policy: MissingRollPolicy,
    pub max_conflict_retries: u32,
}

impl MockConfig {
    /// 创建默认配置
    pub fn default() -> Self {
        Self {
            irregular_threshold: 25.0,
            missing_roll_policy: MissingRollPolicy::Reject,
            max_conflict_retries: 3,
        }
    }

    /// 缺席学号记为缺勤
    pub fn mark_absent() -> Self {
        let mut config = Self::default();
        config.missing_roll_policy = MissingRollPolicy::MarkAbsent;
        config
    }

    pub fn with_threshold(threshold: f64) -> Self {
        let mut config = Self::default();
        config.irregular_threshold = threshold;
        config
    }
}

#[async_trait]
impl LedgerConfigReader for MockConfig {
    async fn get_irregular_threshold(&self) -> Result<f64, Box<dyn Error>> {
        Ok(self.irregular_threshold)
    }

    async fn get_missing_roll_policy(&self) -> Result<MissingRollPolicy, Box<dyn Error>> {
        Ok(self.missing_roll_policy)
    }

    async fn get_max_conflict_retries(&self) -> Result<u32, Box<dyn Error>> {
        Ok(self.max_conflict_retries)
    }
}
