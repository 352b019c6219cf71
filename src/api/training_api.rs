// ==========================================
// 培训考勤系统 - 培训项目 API
// ==========================================
// 职责: 项目生命周期（新建/查询/更新/删除）、审计查询与导出、招生统计
// 红线: 新建项目的花名册一律为空历史；更新路径不触碰花名册
// ==========================================

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::report::to_flat_records;
use crate::domain::student::StudentRecord;
use crate::domain::training::{NewTrainingProgram, TrainingProgram, TrainingUpdate};
use crate::domain::types::ProgramStatus;
use crate::engine::enrollment_summary::{enrollment_by_year, EnrollmentChart, EnrollmentQuery};
use crate::engine::training_query::{SortState, TrainingFilter, TrainingQueryEngine};
use crate::export::{ColumnSpec, ExportAdapter, ExportArtifact};
use crate::importer::RosterImporter;
use crate::repository::roster_store::RosterStore;

/// 审计导出的工作表名与文件名
const AUDIT_SHEET_NAME: &str = "Trainings";
const AUDIT_FILE_STEM: &str = "trainings";

// ==========================================
// TrainingApi - 培训项目 API
// ==========================================

/// 培训项目API
///
/// 职责：
/// 1. 项目新建（可附带花名册文件）
/// 2. 项目查询、部分更新、删除
/// 3. 审计表过滤/排序/导出
pub struct TrainingApi {
    store: Arc<dyn RosterStore>,
    exporter: Arc<dyn ExportAdapter>,
    query_engine: TrainingQueryEngine,
}

impl TrainingApi {
    /// 创建新的TrainingApi实例
    ///
    /// # 参数
    /// - store: 花名册存储
    /// - exporter: 导出适配器
    pub fn new(store: Arc<dyn RosterStore>, exporter: Arc<dyn ExportAdapter>) -> Self {
        Self {
            store,
            exporter,
            query_engine: TrainingQueryEngine::new(),
        }
    }

    // ==========================================
    // 生命周期
    // ==========================================

    /// 新建项目
    ///
    /// # 参数
    /// - request: 项目字段
    /// - roster: 初始花名册（历史会被清空）
    ///
    /// # 返回
    /// - Ok(TrainingProgram): 新建后的项目
    /// - Err(InvalidInput): 必填字段缺失
    /// - Err(DuplicateName): 名称已被占用
    #[instrument(skip(self, request, roster), fields(training_name = %request.training_name, students = roster.len()))]
    pub async fn create_training(
        &self,
        request: NewTrainingProgram,
        roster: Vec<StudentRecord>,
    ) -> ApiResult<TrainingProgram> {
        request.validate().map_err(ApiError::InvalidInput)?;

        let training_id = Uuid::new_v4().to_string();
        let program = request.into_program(training_id, roster, Utc::now().naive_utc());
        self.store.create(&program).await?;

        info!(
            training_id = %program.training_id,
            training_name = %program.training_name,
            students = program.students.len(),
            "培训项目已创建"
        );
        Ok(program)
    }

    /// 新建项目，花名册从 CSV / Excel 文件导入
    pub async fn create_training_from_file(
        &self,
        request: NewTrainingProgram,
        roster_file: &Path,
    ) -> ApiResult<TrainingProgram> {
        // 先校验字段，避免无谓的文件解析
        request.validate().map_err(ApiError::InvalidInput)?;
        let roster = RosterImporter::new().import_file(roster_file)?;
        self.create_training(request, roster).await
    }

    /// 查询单个项目
    pub async fn get_training(&self, training_id: &str) -> ApiResult<TrainingProgram> {
        Ok(self.store.load(training_id).await?)
    }

    /// 并发加载多个项目（保持入参顺序）
    ///
    /// # 返回
    /// - Err: 任一项目加载失败
    pub async fn get_trainings(&self, training_ids: &[String]) -> ApiResult<Vec<TrainingProgram>> {
        let tasks = training_ids.iter().map(|id| self.store.load(id));
        let results = join_all(tasks).await;

        let programs = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        debug!(requested = training_ids.len(), loaded = programs.len(), "批量加载项目完成");
        Ok(programs)
    }

    /// 全部项目（按创建时间升序）
    pub async fn list_trainings(&self) -> ApiResult<Vec<TrainingProgram>> {
        Ok(self.store.list().await?)
    }

    /// 指定协调人负责的项目
    pub async fn list_by_coordinator(&self, coordinator_id: &str) -> ApiResult<Vec<TrainingProgram>> {
        if coordinator_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("协调人不能为空".to_string()));
        }
        let programs = self.store.list().await?;
        Ok(programs
            .into_iter()
            .filter(|p| p.has_coordinator(coordinator_id.trim()))
            .collect())
    }

    /// 指定结束学年的项目
    pub async fn list_by_end_year(&self, end_year: i32) -> ApiResult<Vec<TrainingProgram>> {
        let programs = self.store.list().await?;
        Ok(programs.into_iter().filter(|p| p.end_year == end_year).collect())
    }

    /// 进行中的项目
    pub async fn list_ongoing(&self) -> ApiResult<Vec<TrainingProgram>> {
        let programs = self.store.list().await?;
        Ok(programs
            .into_iter()
            .filter(|p| p.status == ProgramStatus::Ongoing)
            .collect())
    }

    /// 部分更新项目字段
    ///
    /// # 返回
    /// - Err(InvalidInput): 未提供任何字段 / 结束学年早于开始学年
    #[instrument(skip(self, update))]
    pub async fn update_training(
        &self,
        training_id: &str,
        update: TrainingUpdate,
    ) -> ApiResult<TrainingProgram> {
        if update.is_empty() {
            return Err(ApiError::InvalidInput("未提供任何更新字段".to_string()));
        }
        if let Some(name) = &update.training_name {
            if name.trim().is_empty() {
                return Err(ApiError::InvalidInput("培训名称不能为空".to_string()));
            }
        }
        if let Some(coordinators) = &update.coordinators {
            if coordinators.iter().all(|c| c.trim().is_empty()) {
                return Err(ApiError::InvalidInput("至少需要一名项目协调人".to_string()));
            }
        }

        let mut preview = self.store.load(training_id).await?;
        update.apply_to(&mut preview);
        if preview.end_year < preview.start_year {
            return Err(ApiError::InvalidInput(format!(
                "结束学年({})不能早于开始学年({})",
                preview.end_year, preview.start_year
            )));
        }

        let updated = self.store.update_fields(training_id, &update).await?;
        info!(training_id = %training_id, revision = updated.revision, "培训项目已更新");
        Ok(updated)
    }

    /// 删除项目（级联花名册与考勤）
    pub async fn delete_training(&self, training_id: &str) -> ApiResult<()> {
        self.store.delete(training_id).await?;
        warn!(training_id = %training_id, "培训项目已删除");
        Ok(())
    }

    // ==========================================
    // 审计
    // ==========================================

    /// 审计表查询（过滤 + 排序）
    pub async fn audit_query(
        &self,
        filter: &TrainingFilter,
        sort: &SortState,
    ) -> ApiResult<Vec<TrainingProgram>> {
        let programs = self.store.list().await?;
        Ok(self.query_engine.query(&programs, filter, sort))
    }

    /// 导出审计表（全部 14 列，表格形式）
    pub async fn export_audit(
        &self,
        filter: &TrainingFilter,
        sort: &SortState,
    ) -> ApiResult<ExportArtifact> {
        let programs = self.store.list().await?;
        let rows = to_flat_records(&self.query_engine.audit_rows(&programs, filter, sort));
        Ok(self.exporter.render(&rows, AUDIT_SHEET_NAME, AUDIT_FILE_STEM)?)
    }

    /// 导出审计表（文档形式，使用列标题）
    pub async fn export_audit_document(
        &self,
        filter: &TrainingFilter,
        sort: &SortState,
    ) -> ApiResult<ExportArtifact> {
        let programs = self.store.list().await?;
        let rows = to_flat_records(&self.query_engine.audit_rows(&programs, filter, sort));
        Ok(self
            .exporter
            .render_columns(&rows, &ColumnSpec::training_audit(), AUDIT_FILE_STEM)?)
    }

    /// 招生人数图表数据
    pub async fn enrollment_chart(&self, query: &EnrollmentQuery) -> ApiResult<EnrollmentChart> {
        if let (Some(from), Some(to)) = (query.from_year, query.to_year) {
            if from > to {
                return Err(ApiError::InvalidInput(format!(
                    "起始学年({})不能晚于结束学年({})",
                    from, to
                )));
            }
        }
        let programs = self.store.list().await?;
        Ok(enrollment_by_year(&programs, query))
    }
}
