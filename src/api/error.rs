// ==========================================
// 培训考勤系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为调用方可读的错误消息
// ==========================================

use crate::engine::error::LedgerError;
use crate::export::error::ExportError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("培训名称已存在: {0}")]
    DuplicateName(String),

    #[error("课次 {0} 的考勤已存在")]
    DuplicateSession(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("并发冲突: {0}")]
    Conflict(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("存储不可用: {0}")]
    StorageUnavailable(String),

    // ==========================================
    // 导入导出错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("文件导出失败: {0}")]
    ExportError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            e @ RepositoryError::OptimisticLockFailure { .. } => ApiError::Conflict(e.to_string()),
            RepositoryError::DuplicateName(name) => ApiError::DuplicateName(name),
            RepositoryError::DuplicateSession { date, .. } => ApiError::DuplicateSession(date.to_string()),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            e @ (RepositoryError::DatabaseConnectionError(_) | RepositoryError::LockError(_)) => {
                ApiError::StorageUnavailable(e.to_string())
            }
            RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
        }
    }
}

// ==========================================
// 从 LedgerError 转换
// ==========================================
impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::DuplicateSession { date } => ApiError::DuplicateSession(date.to_string()),
            LedgerError::NotFound(msg) => ApiError::NotFound(msg),
            LedgerError::ValidationFailure(msg) => ApiError::InvalidInput(msg),
            LedgerError::StorageUnavailable(msg) => ApiError::StorageUnavailable(msg),
            LedgerError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError(err.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
