// ==========================================
// 培训考勤系统 - 花名册存储接口
// ==========================================
// 职责: 定义项目聚合的持久化接口（不包含实现）
// 实现者: TrainingRepository (SQLite), InMemoryRosterStore (测试/嵌入)
// 红线: 课次提交必须在单一事务/单一锁内完成校验与写入
// ==========================================

use crate::domain::student::StudentRecord;
use crate::domain::training::{TrainingProgram, TrainingUpdate};
use crate::domain::types::SessionDate;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// SessionCommit - 课次提交单元
// ==========================================
/// 一次课次提交的完整写入内容
///
/// `students` 为追加了本课次条目后的完整花名册（顺序不变），
/// 出勤率已按完整历史重算。
#[derive(Debug, Clone)]
pub struct SessionCommit {
    pub training_id: String,
    pub expected_revision: i32,
    pub session_date: SessionDate,
    pub students: Vec<StudentRecord>,
}

// ==========================================
// RosterStore Trait
// ==========================================
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// 加载项目（含花名册与全部考勤历史）
    ///
    /// # 返回
    /// - Err(NotFound): 项目不存在
    async fn load(&self, training_id: &str) -> RepositoryResult<TrainingProgram>;

    /// 列出全部项目（按创建时间升序）
    async fn list(&self) -> RepositoryResult<Vec<TrainingProgram>>;

    /// 新建项目
    ///
    /// # 返回
    /// - Ok(String): 项目ID
    /// - Err(DuplicateName): 名称已被占用
    async fn create(&self, program: &TrainingProgram) -> RepositoryResult<String>;

    /// 整体保存项目（带 revision 校验）
    ///
    /// # 返回
    /// - Ok(i32): 新 revision
    /// - Err(OptimisticLockFailure): program.revision 与存储不一致
    /// - Err(NotFound): 项目不存在
    async fn save(&self, program: &TrainingProgram) -> RepositoryResult<i32>;

    /// 部分更新项目字段（不触碰花名册）
    async fn update_fields(
        &self,
        training_id: &str,
        update: &TrainingUpdate,
    ) -> RepositoryResult<TrainingProgram>;

    /// 原子提交一个课次
    ///
    /// 在同一事务内完成：revision 校验、课次未记录校验、写入条目与出勤率、revision + 1
    ///
    /// # 返回
    /// - Ok(i32): 新 revision
    /// - Err(OptimisticLockFailure): 期间有其他写入
    /// - Err(DuplicateSession): 该日期已记录
    async fn commit_session(&self, commit: &SessionCommit) -> RepositoryResult<i32>;

    /// 删除项目（级联花名册与考勤）
    async fn delete(&self, training_id: &str) -> RepositoryResult<()>;
}
