// ==========================================
// 培训考勤系统 - 派生报表构建器
// ==========================================
// 职责: 从项目快照生成出勤汇总、单课次出勤/缺勤、低出勤学员报表
// 约束: 纯函数、确定性、保持花名册顺序
// ==========================================

use crate::domain::report::{IrregularStudentRow, SessionAttendanceRow, StudentAttendanceRow};
use crate::domain::student::AttendanceEntry;
use crate::domain::training::TrainingProgram;
use crate::domain::types::SessionDate;
use serde::{Deserialize, Serialize};

/// 默认低出勤阈值（含等于）
pub const DEFAULT_IRREGULAR_THRESHOLD: f64 = 25.0;

/// 单名学员的出勤概览
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub roll_no: String,
    pub student_name: String,
    pub attendance_percentage: f64,
    pub present_count: usize,
    pub total_sessions: usize,
    pub history: Vec<AttendanceEntry>,
}

// ==========================================
// ReportBuilder - 派生报表构建器
// ==========================================
pub struct ReportBuilder;

impl ReportBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 出勤汇总：每名学员一行
    pub fn attendance_report(&self, program: &TrainingProgram) -> Vec<StudentAttendanceRow> {
        program
            .students
            .iter()
            .map(|s| StudentAttendanceRow::from_student(program, s))
            .collect()
    }

    /// 单课次出勤（want_present=true）或缺勤（want_present=false）名单
    ///
    /// 备注取该学员所有日期等于 session_date 的条目，以 ", " 连接
    pub fn session_report(
        &self,
        program: &TrainingProgram,
        session_date: SessionDate,
        want_present: bool,
    ) -> Vec<SessionAttendanceRow> {
        program
            .students
            .iter()
            .filter_map(|student| {
                let matching: Vec<&AttendanceEntry> = student
                    .attendance_history()
                    .iter()
                    .filter(|e| e.session_date == session_date)
                    .collect();
                if !matching.iter().any(|e| e.is_present == want_present) {
                    return None;
                }

                let remarks = matching
                    .iter()
                    .map(|e| e.remark.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(SessionAttendanceRow::from_student(
                    program,
                    student,
                    session_date,
                    remarks,
                ))
            })
            .collect()
    }

    /// 低出勤学员（出勤率 <= threshold）
    pub fn irregular_students(
        &self,
        program: &TrainingProgram,
        threshold: f64,
    ) -> Vec<IrregularStudentRow> {
        program
            .students
            .iter()
            .filter(|s| s.attendance_percentage() <= threshold)
            .map(|s| StudentAttendanceRow::from_student(program, s))
            .collect()
    }

    /// 单名学员概览
    pub fn student_summary(&self, program: &TrainingProgram, roll_no: &str) -> Option<StudentSummary> {
        program.find_student(roll_no).map(|s| StudentSummary {
            roll_no: s.roll_no.clone(),
            student_name: s.student_name.clone(),
            attendance_percentage: s.attendance_percentage(),
            present_count: s.present_count(),
            total_sessions: s.attendance_history().len(),
            history: s.attendance_history().to_vec(),
        })
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::student::StudentRecord;
    use crate::domain::types::{DeliveryMode, ProgramStatus};
    use chrono::Utc;

    fn day(s: &str) -> SessionDate {
        SessionDate::parse(s).unwrap()
    }

    fn student(roll: &str, marks: &[(&str, bool, &str)]) -> StudentRecord {
        let history = marks
            .iter()
            .map(|(d, p, r)| AttendanceEntry::new(day(d), *p, *r))
            .collect();
        StudentRecord::new(roll, format!("Name {}", roll)).restore(history)
    }

    fn program(students: Vec<StudentRecord>) -> TrainingProgram {
        TrainingProgram {
            training_id: "p1".to_string(),
            training_name: "DSA".to_string(),
            start_year: 2024,
            end_year: 2025,
            student_year: 2,
            semester: 1,
            total_students: students.len() as i32,
            venue: "Lab".to_string(),
            no_of_hours: None,
            duration: None,
            mode: DeliveryMode::Offline,
            status: ProgramStatus::Ongoing,
            trainer_name: "T".to_string(),
            designation: "D".to_string(),
            company: "C".to_string(),
            coordinators: vec!["F1".to_string()],
            students,
            revision: 0,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_session_report_partitions_roster() {
        let p = program(vec![
            student("R1", &[("2024-01-05", true, ""), ("2024-01-06", false, "sick")]),
            student("R2", &[("2024-01-05", false, "late"), ("2024-01-06", true, "")]),
            student("R3", &[("2024-01-05", true, "front row"), ("2024-01-06", true, "")]),
        ]);
        let builder = ReportBuilder::new();

        let present = builder.session_report(&p, day("1/5/2024"), true);
        let absent = builder.session_report(&p, day("1/5/2024"), false);

        let present_rolls: Vec<&str> = present.iter().map(|r| r.roll_no.as_str()).collect();
        let absent_rolls: Vec<&str> = absent.iter().map(|r| r.roll_no.as_str()).collect();
        assert_eq!(present_rolls, vec!["R1", "R3"]);
        assert_eq!(absent_rolls, vec!["R2"]);
        assert_eq!(absent[0].remarks, "late");
        assert_eq!(present[1].remarks, "front row");
        assert_eq!(present[0].date.to_string(), "1/5/2024");
    }

    #[test]
    fn test_session_report_unknown_date_is_empty() {
        let p = program(vec![student("R1", &[("2024-01-05", true, "")])]);
        let builder = ReportBuilder::new();
        assert!(builder.session_report(&p, day("2024-02-01"), true).is_empty());
        assert!(builder.session_report(&p, day("2024-02-01"), false).is_empty());
    }

    #[test]
    fn test_irregular_threshold_is_inclusive() {
        let p = program(vec![
            student(
                "R1",
                &[
                    ("2024-01-01", true, ""),
                    ("2024-01-02", false, ""),
                    ("2024-01-03", false, ""),
                    ("2024-01-04", false, ""),
                ],
            ),
            student("R2", &[("2024-01-01", true, "")]),
            student("R3", &[]),
        ]);
        let rows = ReportBuilder::new().irregular_students(&p, DEFAULT_IRREGULAR_THRESHOLD);
        let rolls: Vec<&str> = rows.iter().map(|r| r.roll_no.as_str()).collect();
        assert_eq!(rolls, vec!["R1", "R3"]);
    }

    #[test]
    fn test_attendance_report_and_summary() {
        let p = program(vec![
            student("R1", &[("2024-01-05", true, ""), ("2024-01-06", false, "")]),
            student("R2", &[("2024-01-05", true, ""), ("2024-01-06", true, "")]),
        ]);
        let builder = ReportBuilder::new();

        let rows = builder.attendance_report(&p);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].attendance, 50.0);
        assert_eq!(rows[1].attendance, 100.0);
        assert_eq!(rows[0].training_name, "DSA");

        let summary = builder.student_summary(&p, "R1").unwrap();
        assert_eq!(summary.present_count, 1);
        assert_eq!(summary.total_sessions, 2);
        assert!(builder.student_summary(&p, "R9").is_none());
    }
}
