// ==========================================
// 培训考勤系统 - 考勤台账引擎
// ==========================================
// 红线: 考勤历史只追加；同一项目同一日期只能记录一次
// 红线: 提交要么全部生效，要么完全不生效
// ==========================================
// 职责: 校验课次提交 → 构造追加后的花名册 → 通过存储原子提交
// 并发: 乐观锁冲突时重新加载并重试（有上限）
// ==========================================

use crate::config::LedgerConfigReader;
use crate::domain::student::{AttendanceEntry, StudentRecord};
use crate::domain::training::TrainingProgram;
use crate::domain::types::{MissingRollPolicy, SessionDate};
use crate::engine::error::{LedgerError, LedgerResult};
use crate::repository::error::RepositoryError;
use crate::repository::roster_store::{RosterStore, SessionCommit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 单名学员的出勤标记
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceMark {
    pub is_present: bool,
    pub remark: String,
}

impl PresenceMark {
    pub fn present() -> Self {
        Self {
            is_present: true,
            remark: String::new(),
        }
    }

    pub fn absent(remark: impl Into<String>) -> Self {
        Self {
            is_present: false,
            remark: remark.into(),
        }
    }
}

/// 课次状态（按项目 + 日期）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Unrecorded,
    Recorded,
}

// ==========================================
// LedgerSettings - 台账运行参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerSettings {
    pub missing_roll_policy: MissingRollPolicy,
    pub max_conflict_retries: u32,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            missing_roll_policy: MissingRollPolicy::Reject,
            max_conflict_retries: 3,
        }
    }
}

impl LedgerSettings {
    /// 从配置读取器加载
    pub async fn load<C: LedgerConfigReader + ?Sized>(config: &C) -> Result<Self, Box<dyn Error>> {
        let missing_roll_policy = config.get_missing_roll_policy().await?;
        let max_conflict_retries = config.get_max_conflict_retries().await?;
        Ok(Self {
            missing_roll_policy,
            max_conflict_retries,
        })
    }
}

// ==========================================
// AttendanceLedger - 考勤台账
// ==========================================
pub struct AttendanceLedger {
    store: Arc<dyn RosterStore>,
    config: Arc<dyn LedgerConfigReader>,
}

impl AttendanceLedger {
    /// 创建新的 AttendanceLedger 实例
    ///
    /// # 参数
    /// - store: 花名册存储
    /// - config: 配置读取器（每次提交时读取，配置更新立即生效）
    pub fn new(store: Arc<dyn RosterStore>, config: Arc<dyn LedgerConfigReader>) -> Self {
        Self { store, config }
    }

    /// 读取当前运行参数
    pub async fn settings(&self) -> LedgerResult<LedgerSettings> {
        LedgerSettings::load(self.config.as_ref())
            .await
            .map_err(|e| LedgerError::StorageUnavailable(format!("台账配置读取失败: {}", e)))
    }

    /// 提交一个课次的考勤
    ///
    /// # 参数
    /// - training_id: 项目ID
    /// - raw_date: 课次日期（M/D/YYYY、MM/DD/YYYY 或 YYYY-MM-DD）
    /// - presence: 学号 → 出勤标记
    ///
    /// # 返回
    /// - Ok(TrainingProgram): 提交后的项目快照
    /// - Err(DuplicateSession): 该日期已记录（花名册不变）
    /// - Err(ValidationFailure): 日期非法 / 学号不在花名册 / 缺少学号（Reject 策略）
    /// - Err(Conflict): 重试次数耗尽
    #[instrument(skip(self, presence), fields(marks = presence.len()))]
    pub async fn submit_session(
        &self,
        training_id: &str,
        raw_date: &str,
        presence: &HashMap<String, PresenceMark>,
    ) -> LedgerResult<TrainingProgram> {
        let date = SessionDate::parse(raw_date)
            .ok_or_else(|| LedgerError::ValidationFailure(format!("无法解析课次日期: {}", raw_date)))?;
        let settings = self.settings().await?;

        let mut attempt: u32 = 0;
        loop {
            let mut program = self.store.load(training_id).await?;
            if program.has_session(&date) {
                warn!(training_id = %training_id, session_date = %date, "课次重复提交被拒绝");
                return Err(LedgerError::DuplicateSession { date });
            }

            let students = build_session_roster(&program, date, presence, settings.missing_roll_policy)?;
            let commit = SessionCommit {
                training_id: training_id.to_string(),
                expected_revision: program.revision,
                session_date: date,
                students,
            };

            match self.store.commit_session(&commit).await {
                Ok(revision) => {
                    program.students = commit.students;
                    program.revision = revision;
                    info!(
                        training_id = %training_id,
                        session_date = %date,
                        revision,
                        "课次考勤已记录"
                    );
                    return Ok(program);
                }
                Err(RepositoryError::OptimisticLockFailure { expected, actual, .. })
                    if attempt < settings.max_conflict_retries =>
                {
                    attempt += 1;
                    warn!(
                        training_id = %training_id,
                        expected,
                        actual,
                        attempt,
                        "课次提交遇到并发写入，重新加载后重试"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 已记录的课次日期（首次记录顺序）
    pub async fn session_dates(&self, training_id: &str) -> LedgerResult<Vec<SessionDate>> {
        let program = self.store.load(training_id).await?;
        Ok(program.session_dates())
    }

    /// 查询课次状态
    pub async fn session_state(&self, training_id: &str, raw_date: &str) -> LedgerResult<SessionState> {
        let date = SessionDate::parse(raw_date)
            .ok_or_else(|| LedgerError::ValidationFailure(format!("无法解析课次日期: {}", raw_date)))?;
        let program = self.store.load(training_id).await?;
        Ok(if program.has_session(&date) {
            SessionState::Recorded
        } else {
            SessionState::Unrecorded
        })
    }
}

/// 构造追加本课次后的花名册（纯函数，不修改输入）
///
/// # 返回
/// - Ok(Vec<StudentRecord>): 与原花名册同序，每名学员末尾多一条本课次条目
/// - Err(ValidationFailure): 花名册为空 / 出现未知学号 / 缺少学号且策略为 Reject
pub fn build_session_roster(
    program: &TrainingProgram,
    date: SessionDate,
    presence: &HashMap<String, PresenceMark>,
    policy: MissingRollPolicy,
) -> LedgerResult<Vec<StudentRecord>> {
    if program.students.is_empty() {
        return Err(LedgerError::ValidationFailure(format!(
            "项目 {} 的花名册为空，无法记录考勤",
            program.training_name
        )));
    }

    let mut unknown: Vec<&str> = presence
        .keys()
        .filter(|roll| program.find_student(roll).is_none())
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        return Err(LedgerError::ValidationFailure(format!(
            "学号不在花名册中: {}",
            unknown.join(", ")
        )));
    }

    if policy == MissingRollPolicy::Reject {
        let missing: Vec<&str> = program
            .students
            .iter()
            .filter(|s| !presence.contains_key(&s.roll_no))
            .map(|s| s.roll_no.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(LedgerError::ValidationFailure(format!(
                "缺少以下学号的出勤标记: {}",
                missing.join(", ")
            )));
        }
    }

    let roster = program
        .students
        .iter()
        .map(|student| {
            let mark = presence.get(&student.roll_no);
            let entry = AttendanceEntry::new(
                date,
                mark.map(|m| m.is_present).unwrap_or(false),
                mark.map(|m| m.remark.trim().to_string()).unwrap_or_default(),
            );
            let mut updated = student.clone();
            updated.append_entry(entry);
            updated
        })
        .collect();
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::training::NewTrainingProgram;
    use crate::domain::types::{DeliveryMode, ProgramStatus};
    use crate::repository::memory_store::InMemoryRosterStore;
    use chrono::Utc;

    fn program_with(rolls: &[&str]) -> TrainingProgram {
        let students = rolls
            .iter()
            .map(|r| StudentRecord::new(*r, format!("Student {}", r)))
            .collect();
        NewTrainingProgram {
            training_name: "DSA Bootcamp".to_string(),
            start_year: 2024,
            end_year: None,
            student_year: 2,
            semester: 1,
            total_students: rolls.len() as i32,
            venue: "Lab".to_string(),
            no_of_hours: None,
            duration: None,
            mode: DeliveryMode::Offline,
            status: ProgramStatus::Ongoing,
            trainer_name: "T".to_string(),
            designation: "D".to_string(),
            company: "C".to_string(),
            coordinators: vec!["F1".to_string()],
        }
        .into_program("p1".to_string(), students, Utc::now().naive_utc())
    }

    fn marks(pairs: &[(&str, bool, &str)]) -> HashMap<String, PresenceMark> {
        pairs
            .iter()
            .map(|(r, p, m)| {
                (
                    r.to_string(),
                    PresenceMark {
                        is_present: *p,
                        remark: m.to_string(),
                    },
                )
            })
            .collect()
    }

    struct FixedConfig(LedgerSettings);

    #[async_trait::async_trait]
    impl LedgerConfigReader for FixedConfig {
        async fn get_irregular_threshold(&self) -> Result<f64, Box<dyn Error>> {
            Ok(25.0)
        }

        async fn get_missing_roll_policy(&self) -> Result<MissingRollPolicy, Box<dyn Error>> {
            Ok(self.0.missing_roll_policy)
        }

        async fn get_max_conflict_retries(&self) -> Result<u32, Box<dyn Error>> {
            Ok(self.0.max_conflict_retries)
        }
    }

    async fn ledger_with(program: TrainingProgram, settings: LedgerSettings) -> AttendanceLedger {
        let store = Arc::new(InMemoryRosterStore::new());
        store.create(&program).await.unwrap();
        AttendanceLedger::new(store, Arc::new(FixedConfig(settings)))
    }

    #[test]
    fn test_build_roster_rejects_unknown_roll() {
        let program = program_with(&["R1"]);
        let err = build_session_roster(
            &program,
            SessionDate::parse("2024-01-05").unwrap(),
            &marks(&[("R1", true, ""), ("R9", true, "")]),
            MissingRollPolicy::Reject,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::ValidationFailure(msg) if msg.contains("R9")));
    }

    #[test]
    fn test_build_roster_missing_roll_policy() {
        let program = program_with(&["R1", "R2"]);
        let date = SessionDate::parse("2024-01-05").unwrap();
        let presence = marks(&[("R1", true, "")]);

        assert!(build_session_roster(&program, date, &presence, MissingRollPolicy::Reject).is_err());

        let roster =
            build_session_roster(&program, date, &presence, MissingRollPolicy::MarkAbsent).unwrap();
        assert!(roster[0].attendance_history()[0].is_present);
        assert!(!roster[1].attendance_history()[0].is_present);
        assert_eq!(roster[1].attendance_history()[0].remark, "");
        // 输入不被修改
        assert!(program.students[0].attendance_history().is_empty());
    }

    #[test]
    fn test_build_roster_rejects_empty_roster() {
        let program = program_with(&[]);
        let date = SessionDate::parse("2024-01-05").unwrap();
        assert!(build_session_roster(&program, date, &HashMap::new(), MissingRollPolicy::MarkAbsent).is_err());
    }

    #[tokio::test]
    async fn test_submit_session_appends_and_recomputes() {
        let ledger = ledger_with(program_with(&["R1", "R2"]), LedgerSettings::default()).await;

        let after = ledger
            .submit_session("p1", "1/5/2024", &marks(&[("R1", true, ""), ("R2", false, "late")]))
            .await
            .unwrap();
        assert_eq!(after.revision, 1);
        assert_eq!(after.students[0].attendance_percentage(), 100.0);
        assert_eq!(after.students[1].attendance_percentage(), 0.0);

        let after = ledger
            .submit_session("p1", "2024-01-06", &marks(&[("R1", false, ""), ("R2", true, "")]))
            .await
            .unwrap();
        assert_eq!(after.students[0].attendance_percentage(), 50.0);
        assert_eq!(after.students[1].attendance_history()[0].remark, "late");
        assert_eq!(ledger.session_dates("p1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_date_in_any_form_is_rejected() {
        let ledger = ledger_with(program_with(&["R1"]), LedgerSettings::default()).await;
        ledger
            .submit_session("p1", "01/05/2024", &marks(&[("R1", true, "")]))
            .await
            .unwrap();

        let err = ledger
            .submit_session("p1", "2024-01-05", &marks(&[("R1", false, "")]))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateSession { .. }));
        assert_eq!(
            ledger.session_state("p1", "1/5/2024").await.unwrap(),
            SessionState::Recorded
        );
        assert_eq!(
            ledger.session_state("p1", "1/6/2024").await.unwrap(),
            SessionState::Unrecorded
        );
    }

    #[tokio::test]
    async fn test_invalid_date_and_missing_program() {
        let ledger = ledger_with(program_with(&["R1"]), LedgerSettings::default()).await;
        let presence = marks(&[("R1", true, "")]);

        assert!(matches!(
            ledger.submit_session("p1", "not-a-date", &presence).await,
            Err(LedgerError::ValidationFailure(_))
        ));
        assert!(matches!(
            ledger.submit_session("p1", "1/5/24", &presence).await,
            Err(LedgerError::ValidationFailure(_))
        ));
        assert_eq!(ledger.session_dates("p1").await.unwrap().len(), 0);
        assert!(matches!(
            ledger.submit_session("nope", "2024-01-05", &presence).await,
            Err(LedgerError::NotFound(_))
        ));
    }
}
