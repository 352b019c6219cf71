// ==========================================
// 培训考勤系统 - 台账引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::types::SessionDate;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 考勤台账错误类型
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("课次 {date} 的考勤已存在")]
    DuplicateSession { date: SessionDate },

    #[error("记录未找到: {0}")]
    NotFound(String),

    #[error("校验失败: {0}")]
    ValidationFailure(String),

    #[error("存储不可用: {0}")]
    StorageUnavailable(String),

    #[error("并发冲突: {0}")]
    Conflict(String),
}

// 实现 From<RepositoryError>
impl From<RepositoryError> for LedgerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateSession { date, .. } => LedgerError::DuplicateSession { date },
            RepositoryError::NotFound { entity, id } => {
                LedgerError::NotFound(format!("{}(id={})", entity, id))
            }
            e @ RepositoryError::OptimisticLockFailure { .. } => LedgerError::Conflict(e.to_string()),
            RepositoryError::ValidationError(msg) => LedgerError::ValidationFailure(msg),
            RepositoryError::DuplicateName(name) => {
                LedgerError::ValidationFailure(format!("培训名称已存在: {}", name))
            }
            other => LedgerError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type LedgerResult<T> = Result<T, LedgerError>;
