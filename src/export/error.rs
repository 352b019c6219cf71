// ==========================================
// 培训考勤系统 - 导出模块错误类型
// ==========================================

use thiserror::Error;

/// 导出错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV 写入失败: {0}")]
    CsvWriteError(String),

    #[error("列不存在: {0}")]
    UnknownColumn(String),

    #[error("列选择为空")]
    EmptyColumnSpec,
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::CsvWriteError(err.to_string())
    }
}

impl<W> From<csv::IntoInnerError<W>> for ExportError {
    fn from(err: csv::IntoInnerError<W>) -> Self {
        ExportError::CsvWriteError(err.error().to_string())
    }
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
