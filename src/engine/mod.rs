// ==========================================
// 培训考勤系统 - 引擎层
// ==========================================
// 职责: 考勤台账、派生报表、审计查询
// 红线: Engine 不拼 SQL，只通过 RosterStore 访问存储
// ==========================================

pub mod attendance_ledger;
pub mod enrollment_summary;
pub mod error;
pub mod report_builder;
pub mod training_query;

// 重导出核心引擎
pub use attendance_ledger::{
    build_session_roster, AttendanceLedger, LedgerSettings, PresenceMark, SessionState,
};
pub use enrollment_summary::{enrollment_by_year, EnrollmentChart, EnrollmentQuery, EnrollmentSeries};
pub use error::{LedgerError, LedgerResult};
pub use report_builder::{ReportBuilder, StudentSummary, DEFAULT_IRREGULAR_THRESHOLD};
pub use training_query::{
    FieldValue, SortDirection, SortState, TrainingField, TrainingFilter, TrainingQueryEngine,
};
