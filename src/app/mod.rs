// ==========================================
// 培训考勤系统 - 应用层
// ==========================================
// 职责: 组装存储、配置、引擎与 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
