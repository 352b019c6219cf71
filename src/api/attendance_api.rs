// ==========================================
// 培训考勤系统 - 考勤 API
// ==========================================
// 职责: 课次提交、派生报表查询与导出
// 红线: 报表只读项目快照，不修改存储
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::config::LedgerConfigReader;
use crate::domain::report::{
    to_flat_records, IrregularStudentRow, SessionAttendanceRow, StudentAttendanceRow,
};
use crate::domain::training::TrainingProgram;
use crate::domain::types::SessionDate;
use crate::engine::attendance_ledger::{AttendanceLedger, PresenceMark, SessionState};
use crate::engine::report_builder::{ReportBuilder, StudentSummary};
use crate::export::{report_file_stem, ExportAdapter, ExportArtifact};
use crate::repository::roster_store::RosterStore;

const ATTENDANCE_SHEET: &str = "Attendance";
const PRESENT_SHEET: &str = "Present";
const ABSENT_SHEET: &str = "Absentees";
const IRREGULAR_SHEET: &str = "Irregular";

/// 课次报表类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionReportKind {
    Present,
    Absent,
}

impl SessionReportKind {
    fn wants_present(self) -> bool {
        self == SessionReportKind::Present
    }

    fn sheet_name(self) -> &'static str {
        match self {
            SessionReportKind::Present => PRESENT_SHEET,
            SessionReportKind::Absent => ABSENT_SHEET,
        }
    }
}

// ==========================================
// AttendanceApi - 考勤 API
// ==========================================
pub struct AttendanceApi<C>
where
    C: LedgerConfigReader,
{
    ledger: Arc<AttendanceLedger>,
    store: Arc<dyn RosterStore>,
    config: Arc<C>,
    exporter: Arc<dyn ExportAdapter>,
    report_builder: ReportBuilder,
}

impl<C> AttendanceApi<C>
where
    C: LedgerConfigReader,
{
    /// 创建新的AttendanceApi实例
    ///
    /// # 参数
    /// - ledger: 考勤台账
    /// - store: 花名册存储（报表读取）
    /// - config: 配置读取器（低出勤阈值）
    /// - exporter: 导出适配器
    pub fn new(
        ledger: Arc<AttendanceLedger>,
        store: Arc<dyn RosterStore>,
        config: Arc<C>,
        exporter: Arc<dyn ExportAdapter>,
    ) -> Self {
        Self {
            ledger,
            store,
            config,
            exporter,
            report_builder: ReportBuilder::new(),
        }
    }

    // ==========================================
    // 课次
    // ==========================================

    /// 提交课次考勤
    ///
    /// # 返回
    /// - Ok(TrainingProgram): 提交后的项目
    /// - Err(DuplicateSession): 该日期已记录
    pub async fn submit_session(
        &self,
        training_id: &str,
        session_date: &str,
        presence: &HashMap<String, PresenceMark>,
    ) -> ApiResult<TrainingProgram> {
        Ok(self.ledger.submit_session(training_id, session_date, presence).await?)
    }

    /// 已记录的课次日期
    pub async fn session_dates(&self, training_id: &str) -> ApiResult<Vec<SessionDate>> {
        Ok(self.ledger.session_dates(training_id).await?)
    }

    pub async fn session_state(&self, training_id: &str, session_date: &str) -> ApiResult<SessionState> {
        Ok(self.ledger.session_state(training_id, session_date).await?)
    }

    // ==========================================
    // 报表
    // ==========================================

    /// 出勤汇总
    pub async fn attendance_report(&self, training_id: &str) -> ApiResult<Vec<StudentAttendanceRow>> {
        let program = self.store.load(training_id).await?;
        Ok(self.report_builder.attendance_report(&program))
    }

    /// 单课次出勤/缺勤名单
    pub async fn session_report(
        &self,
        training_id: &str,
        session_date: &str,
        kind: SessionReportKind,
    ) -> ApiResult<Vec<SessionAttendanceRow>> {
        let date = parse_date(session_date)?;
        let program = self.store.load(training_id).await?;
        Ok(self
            .report_builder
            .session_report(&program, date, kind.wants_present()))
    }

    /// 低出勤学员（阈值取配置）
    pub async fn irregular_students(&self, training_id: &str) -> ApiResult<Vec<IrregularStudentRow>> {
        let threshold = self.irregular_threshold().await?;
        let program = self.store.load(training_id).await?;
        let rows = self.report_builder.irregular_students(&program, threshold);
        debug!(training_id = %training_id, threshold, count = rows.len(), "低出勤学员查询完成");
        Ok(rows)
    }

    /// 单名学员概览
    pub async fn student_summary(&self, training_id: &str, roll_no: &str) -> ApiResult<StudentSummary> {
        let program = self.store.load(training_id).await?;
        self.report_builder
            .student_summary(&program, roll_no)
            .ok_or_else(|| ApiError::NotFound(format!("学号 {} 不在项目 {} 的花名册中", roll_no, training_id)))
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 导出出勤汇总
    pub async fn export_attendance_report(&self, training_id: &str) -> ApiResult<ExportArtifact> {
        let program = self.store.load(training_id).await?;
        let rows = to_flat_records(&self.report_builder.attendance_report(&program));
        let stem = report_file_stem(ATTENDANCE_SHEET, &program.training_name, None);
        Ok(self.exporter.render(&rows, ATTENDANCE_SHEET, &stem)?)
    }

    /// 导出单课次出勤/缺勤名单
    pub async fn export_session_report(
        &self,
        training_id: &str,
        session_date: &str,
        kind: SessionReportKind,
    ) -> ApiResult<ExportArtifact> {
        let date = parse_date(session_date)?;
        let program = self.store.load(training_id).await?;
        let rows = to_flat_records(
            &self
                .report_builder
                .session_report(&program, date, kind.wants_present()),
        );
        let stem = report_file_stem(kind.sheet_name(), &program.training_name, Some(date));
        Ok(self.exporter.render(&rows, kind.sheet_name(), &stem)?)
    }

    /// 导出低出勤学员
    pub async fn export_irregular_students(&self, training_id: &str) -> ApiResult<ExportArtifact> {
        let threshold = self.irregular_threshold().await?;
        let program = self.store.load(training_id).await?;
        let rows = to_flat_records(&self.report_builder.irregular_students(&program, threshold));
        let stem = report_file_stem(IRREGULAR_SHEET, &program.training_name, None);
        Ok(self.exporter.render(&rows, IRREGULAR_SHEET, &stem)?)
    }

    async fn irregular_threshold(&self) -> ApiResult<f64> {
        self.config
            .get_irregular_threshold()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }
}

fn parse_date(raw: &str) -> ApiResult<SessionDate> {
    SessionDate::parse(raw).ok_or_else(|| ApiError::InvalidInput(format!("无法解析课次日期: {}", raw)))
}
