// ==========================================
// 培训考勤系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行与集成方调用
// ==========================================

pub mod attendance_api;
pub mod config_api;
pub mod error;
pub mod training_api;

// 重导出核心类型
pub use attendance_api::{AttendanceApi, SessionReportKind};
pub use config_api::{ConfigApi, ConfigItem};
pub use error::{ApiError, ApiResult};
pub use training_api::TrainingApi;
