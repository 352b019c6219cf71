// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use std::collections::HashMap;
use training_ledger::domain::student::StudentRecord;
use training_ledger::domain::training::NewTrainingProgram;
use training_ledger::domain::types::{DeliveryMode, ProgramStatus};
use training_ledger::engine::PresenceMark;

// ==========================================
// NewTrainingProgram 构建器
// ==========================================
pub struct ProgramBuilder {
    request: NewTrainingProgram,
}

impl ProgramBuilder {
    pub fn new(training_name: &str) -> Self {
        Self {
            request: NewTrainingProgram {
                training_name: training_name.to_string(),
                start_year: 2024,
                end_year: None,
                student_year: 2,
                semester: 3,
                total_students: 3,
                venue: "Seminar Hall".to_string(),
                no_of_hours: Some(30),
                duration: Some(10),
                mode: DeliveryMode::Offline,
                status: ProgramStatus::Ongoing,
                trainer_name: "Trainer".to_string(),
                designation: "Engineer".to_string(),
                company: "Acme".to_string(),
                coordinators: vec!["coord-a".to_string()],
            },
        }
    }

    pub fn start_year(mut self, year: i32) -> Self {
        self.request.start_year = year;
        self
    }

    pub fn total_students(mut self, total: i32) -> Self {
        self.request.total_students = total;
        self
    }

    pub fn status(mut self, status: ProgramStatus) -> Self {
        self.request.status = status;
        self
    }

    pub fn coordinators(mut self, coordinators: &[&str]) -> Self {
        self.request.coordinators = coordinators.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn build(self) -> NewTrainingProgram {
        self.request
    }
}

/// 按学号生成花名册
pub fn roster(rolls: &[&str]) -> Vec<StudentRecord> {
    rolls
        .iter()
        .map(|roll| {
            let mut s = StudentRecord::new(*roll, format!("Student {}", roll));
            s.parent_mobile_no = format!("90000{}", roll);
            s
        })
        .collect()
}

/// 学号 → 出勤标记；缺勤备注为 "absent"
pub fn presence(marks: &[(&str, bool)]) -> HashMap<String, PresenceMark> {
    marks
        .iter()
        .map(|(roll, present)| {
            let mark = if *present {
                PresenceMark::present()
            } else {
                PresenceMark::absent("absent")
            };
            (roll.to_string(), mark)
        })
        .collect()
}
