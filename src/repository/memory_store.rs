// ==========================================
// 培训考勤系统 - 内存花名册存储
// ==========================================
// 用途: 单元测试、嵌入式场景
// 语义与 SQLite 实现一致: 单锁内完成 revision 校验 + 课次校验 + 写入
// ==========================================

use crate::domain::training::{TrainingProgram, TrainingUpdate};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::roster_store::{RosterStore, SessionCommit};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct InMemoryRosterStore {
    programs: Mutex<Vec<TrainingProgram>>,
}

impl InMemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> RepositoryResult<MutexGuard<'_, Vec<TrainingProgram>>> {
        self.programs
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn find_mut<'a>(
        programs: &'a mut [TrainingProgram],
        training_id: &str,
    ) -> RepositoryResult<&'a mut TrainingProgram> {
        programs
            .iter_mut()
            .find(|p| p.training_id == training_id)
            .ok_or_else(|| RepositoryError::not_found("TrainingProgram", training_id))
    }
}

#[async_trait]
impl RosterStore for InMemoryRosterStore {
    async fn load(&self, training_id: &str) -> RepositoryResult<TrainingProgram> {
        let programs = self.guard()?;
        programs
            .iter()
            .find(|p| p.training_id == training_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("TrainingProgram", training_id))
    }

    async fn list(&self) -> RepositoryResult<Vec<TrainingProgram>> {
        Ok(self.guard()?.clone())
    }

    async fn create(&self, program: &TrainingProgram) -> RepositoryResult<String> {
        let mut programs = self.guard()?;
        if programs
            .iter()
            .any(|p| p.training_name == program.training_name)
        {
            return Err(RepositoryError::DuplicateName(program.training_name.clone()));
        }
        if programs.iter().any(|p| p.training_id == program.training_id) {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "training_id={}",
                program.training_id
            )));
        }
        programs.push(program.clone());
        Ok(program.training_id.clone())
    }

    async fn save(&self, program: &TrainingProgram) -> RepositoryResult<i32> {
        let mut programs = self.guard()?;
        let stored = Self::find_mut(&mut programs, &program.training_id)?;
        if stored.revision != program.revision {
            return Err(RepositoryError::OptimisticLockFailure {
                training_id: program.training_id.clone(),
                expected: program.revision,
                actual: stored.revision,
            });
        }
        *stored = program.clone();
        stored.revision += 1;
        Ok(stored.revision)
    }

    async fn update_fields(
        &self,
        training_id: &str,
        update: &TrainingUpdate,
    ) -> RepositoryResult<TrainingProgram> {
        let mut programs = self.guard()?;
        let stored = Self::find_mut(&mut programs, training_id)?;
        update.apply_to(stored);
        stored.revision += 1;
        Ok(stored.clone())
    }

    async fn commit_session(&self, commit: &SessionCommit) -> RepositoryResult<i32> {
        let mut programs = self.guard()?;
        let stored = Self::find_mut(&mut programs, &commit.training_id)?;

        if stored.revision != commit.expected_revision {
            return Err(RepositoryError::OptimisticLockFailure {
                training_id: commit.training_id.clone(),
                expected: commit.expected_revision,
                actual: stored.revision,
            });
        }
        if stored.has_session(&commit.session_date) {
            return Err(RepositoryError::DuplicateSession {
                training_id: commit.training_id.clone(),
                date: commit.session_date,
            });
        }
        if let Some(unknown) = commit
            .students
            .iter()
            .find(|s| stored.find_student(&s.roll_no).is_none())
        {
            return Err(RepositoryError::ValidationError(format!(
                "学号不在花名册中: {}",
                unknown.roll_no
            )));
        }

        stored.students = commit.students.clone();
        stored.revision += 1;
        Ok(stored.revision)
    }

    async fn delete(&self, training_id: &str) -> RepositoryResult<()> {
        let mut programs = self.guard()?;
        let before = programs.len();
        programs.retain(|p| p.training_id != training_id);
        if programs.len() == before {
            return Err(RepositoryError::not_found("TrainingProgram", training_id));
        }
        Ok(())
    }
}
