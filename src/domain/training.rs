// ==========================================
// 培训考勤系统 - 培训项目领域模型
// ==========================================
// 职责: TrainingProgram 聚合根（含花名册）、新建/部分更新请求
// ==========================================

use crate::domain::student::StudentRecord;
use crate::domain::types::{DeliveryMode, ProgramStatus, SessionDate};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// TrainingProgram - 培训项目（聚合根）
// ==========================================
// 删除项目时级联删除花名册与全部考勤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingProgram {
    pub training_id: String,        // 项目ID（创建后不可变）
    pub training_name: String,      // 项目名称（全局唯一，仅创建时校验）
    pub start_year: i32,            // 学年起
    pub end_year: i32,              // 学年止
    pub student_year: i32,          // 学员年级
    pub semester: i32,              // 学期
    pub total_students: i32,        // 学员总数
    pub venue: String,              // 地点
    pub no_of_hours: Option<i32>,   // 课时（可选）
    pub duration: Option<i32>,      // 时长（可选）
    pub mode: DeliveryMode,         // 授课方式
    pub status: ProgramStatus,      // 状态
    pub trainer_name: String,       // 讲师
    pub designation: String,        // 讲师职务
    pub company: String,            // 讲师单位
    pub coordinators: Vec<String>,  // 项目协调人ID（有序）
    pub students: Vec<StudentRecord>, // 花名册（有序）
    pub revision: i32,              // 乐观锁：修订号
    pub created_at: NaiveDateTime,  // 创建时间
}

impl TrainingProgram {
    /// 按学号查找学员
    pub fn find_student(&self, roll_no: &str) -> Option<&StudentRecord> {
        self.students.iter().find(|s| s.roll_no == roll_no)
    }

    /// 该课次是否已在任一学员的历史中出现
    pub fn has_session(&self, date: &SessionDate) -> bool {
        self.students.iter().any(|s| s.has_session(date))
    }

    /// 已记录的课次日期（按首次记录顺序去重）
    pub fn session_dates(&self) -> Vec<SessionDate> {
        let mut dates: Vec<SessionDate> = Vec::new();
        for student in &self.students {
            for entry in student.attendance_history() {
                if !dates.contains(&entry.session_date) {
                    dates.push(entry.session_date);
                }
            }
        }
        dates
    }

    /// 是否包含指定协调人
    pub fn has_coordinator(&self, coordinator_id: &str) -> bool {
        self.coordinators.iter().any(|c| c == coordinator_id)
    }
}

// ==========================================
// NewTrainingProgram - 新建项目请求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrainingProgram {
    pub training_name: String,
    pub start_year: i32,
    /// 缺省为 start_year + 1
    pub end_year: Option<i32>,
    pub student_year: i32,
    pub semester: i32,
    pub total_students: i32,
    pub venue: String,
    pub no_of_hours: Option<i32>,
    pub duration: Option<i32>,
    pub mode: DeliveryMode,
    pub status: ProgramStatus,
    pub trainer_name: String,
    pub designation: String,
    pub company: String,
    pub coordinators: Vec<String>,
}

impl NewTrainingProgram {
    /// 校验必填字段
    ///
    /// # 返回
    /// - Ok(()): 校验通过
    /// - Err(String): 第一个违反的规则
    pub fn validate(&self) -> Result<(), String> {
        if self.training_name.trim().is_empty() {
            return Err("培训名称不能为空".to_string());
        }
        if self.coordinators.iter().all(|c| c.trim().is_empty()) {
            return Err("至少需要一名项目协调人".to_string());
        }
        if let Some(end_year) = self.end_year {
            if end_year < self.start_year {
                return Err(format!(
                    "结束学年({})不能早于开始学年({})",
                    end_year, self.start_year
                ));
            }
        }
        if self.total_students < 0 {
            return Err("学员总数不能为负".to_string());
        }
        Ok(())
    }

    /// 组装为完整项目（花名册强制为空历史）
    pub fn into_program(
        self,
        training_id: String,
        mut students: Vec<StudentRecord>,
        created_at: NaiveDateTime,
    ) -> TrainingProgram {
        for student in students.iter_mut() {
            student.reset_history();
        }

        TrainingProgram {
            training_id,
            training_name: self.training_name.trim().to_string(),
            start_year: self.start_year,
            end_year: self.end_year.unwrap_or(self.start_year + 1),
            student_year: self.student_year,
            semester: self.semester,
            total_students: self.total_students,
            venue: self.venue,
            no_of_hours: self.no_of_hours,
            duration: self.duration,
            mode: self.mode,
            status: self.status,
            trainer_name: self.trainer_name,
            designation: self.designation,
            company: self.company,
            coordinators: self
                .coordinators
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            students,
            revision: 0,
            created_at,
        }
    }
}

// ==========================================
// TrainingUpdate - 部分更新
// ==========================================
// 只修改提供的字段；不触碰花名册，不做名称唯一性校验
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingUpdate {
    pub training_name: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub student_year: Option<i32>,
    pub semester: Option<i32>,
    pub total_students: Option<i32>,
    pub venue: Option<String>,
    pub no_of_hours: Option<i32>,
    pub duration: Option<i32>,
    pub mode: Option<DeliveryMode>,
    pub status: Option<ProgramStatus>,
    pub trainer_name: Option<String>,
    pub designation: Option<String>,
    pub company: Option<String>,
    pub coordinators: Option<Vec<String>>,
}

impl TrainingUpdate {
    /// 是否未提供任何字段
    pub fn is_empty(&self) -> bool {
        self.training_name.is_none()
            && self.start_year.is_none()
            && self.end_year.is_none()
            && self.student_year.is_none()
            && self.semester.is_none()
            && self.total_students.is_none()
            && self.venue.is_none()
            && self.no_of_hours.is_none()
            && self.duration.is_none()
            && self.mode.is_none()
            && self.status.is_none()
            && self.trainer_name.is_none()
            && self.designation.is_none()
            && self.company.is_none()
            && self.coordinators.is_none()
    }

    /// 将更新应用到项目（不修改 revision，由仓储负责）
    pub fn apply_to(&self, program: &mut TrainingProgram) {
        if let Some(v) = &self.training_name {
            program.training_name = v.trim().to_string();
        }
        if let Some(v) = self.start_year {
            program.start_year = v;
        }
        if let Some(v) = self.end_year {
            program.end_year = v;
        }
        if let Some(v) = self.student_year {
            program.student_year = v;
        }
        if let Some(v) = self.semester {
            program.semester = v;
        }
        if let Some(v) = self.total_students {
            program.total_students = v;
        }
        if let Some(v) = &self.venue {
            program.venue = v.clone();
        }
        if let Some(v) = self.no_of_hours {
            program.no_of_hours = Some(v);
        }
        if let Some(v) = self.duration {
            program.duration = Some(v);
        }
        if let Some(v) = self.mode {
            program.mode = v;
        }
        if let Some(v) = self.status {
            program.status = v;
        }
        if let Some(v) = &self.trainer_name {
            program.trainer_name = v.clone();
        }
        if let Some(v) = &self.designation {
            program.designation = v.clone();
        }
        if let Some(v) = &self.company {
            program.company = v.clone();
        }
        if let Some(v) = &self.coordinators {
            program.coordinators = v.clone();
        }
    }
}
