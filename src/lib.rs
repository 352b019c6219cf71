// ==========================================
// 培训考勤系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 培训项目考勤台账与审计（只追加考勤、可导出报表）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 考勤台账、派生报表、审计查询
pub mod engine;

// 导入层 - 花名册文件
pub mod importer;

// 导出层 - 报表文件
pub mod export;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DeliveryMode, MissingRollPolicy, ProgramStatus, SessionDate};

// 领域实体
pub use domain::{
    AttendanceEntry, FlatRecord, NewTrainingProgram, StudentRecord, TrainingProgram,
    TrainingUpdate,
};

// 引擎
pub use engine::{
    AttendanceLedger, LedgerError, PresenceMark, ReportBuilder, SortState, TrainingFilter,
    TrainingQueryEngine,
};

// 存储
pub use repository::{InMemoryRosterStore, RosterStore, TrainingRepository};

// API
pub use api::{AttendanceApi, TrainingApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "培训考勤系统";
