// ==========================================
// 培训考勤系统 - 培训项目数据仓储 (SQLite)
// ==========================================
// 表: training_program / program_coordinator / student_record / attendance_entry
// 红线: Repository 不含业务逻辑（出勤率由领域层计算后写入）
// ==========================================

mod core;
mod queries;
mod roster;
mod store;


pub use core::TrainingRepository;
