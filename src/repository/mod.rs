// ==========================================
// 培训考勤系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod memory_store;
pub mod roster_store;
pub mod training_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use memory_store::InMemoryRosterStore;
pub use roster_store::{RosterStore, SessionCommit};
pub use training_repo::TrainingRepository;
