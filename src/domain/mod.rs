// ==========================================
// 培训考勤系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值类型、报表行
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod report;
pub mod student;
pub mod training;
pub mod types;

// 重导出核心类型
pub use report::{
    CellValue, ExportRow, FlatRecord, IrregularStudentRow, SessionAttendanceRow,
    StudentAttendanceRow, TrainingAuditRow,
};
pub use student::{AttendanceEntry, StudentRecord};
pub use training::{NewTrainingProgram, TrainingProgram, TrainingUpdate};
pub use types::{DeliveryMode, MissingRollPolicy, ProgramStatus, SessionDate};
