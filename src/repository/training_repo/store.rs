use super::core::TrainingRepository;
use crate::domain::training::{TrainingProgram, TrainingUpdate};
use crate::repository::error::RepositoryResult;
use crate::repository::roster_store::{RosterStore, SessionCommit};
use async_trait::async_trait;

// ==========================================
// RosterStore 实现（SQLite）
// ==========================================
// 同步访问在锁内完成，不跨 await 持有连接
#[async_trait]
impl RosterStore for TrainingRepository {
    async fn load(&self, training_id: &str) -> RepositoryResult<TrainingProgram> {
        self.get(training_id)
    }

    async fn list(&self) -> RepositoryResult<Vec<TrainingProgram>> {
        self.find_all()
    }

    async fn create(&self, program: &TrainingProgram) -> RepositoryResult<String> {
        self.insert(program)
    }

    async fn save(&self, program: &TrainingProgram) -> RepositoryResult<i32> {
        TrainingRepository::save(self, program)
    }

    async fn update_fields(
        &self,
        training_id: &str,
        update: &TrainingUpdate,
    ) -> RepositoryResult<TrainingProgram> {
        TrainingRepository::update_fields(self, training_id, update)
    }

    async fn commit_session(&self, commit: &SessionCommit) -> RepositoryResult<i32> {
        TrainingRepository::commit_session(self, commit)
    }

    async fn delete(&self, training_id: &str) -> RepositoryResult<()> {
        TrainingRepository::delete(self, training_id)
    }
}
