// ==========================================
// 培训考勤系统 - 学员与考勤记录
// ==========================================
// 红线: 考勤历史只追加，不修改已有条目
// 红线: attendance_percentage 只能由历史重算得到
// ==========================================

use crate::domain::types::SessionDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// AttendanceEntry - 单次课次考勤
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub session_date: SessionDate, // 课次日期
    pub is_present: bool,          // 是否出勤
    pub remark: String,            // 备注（可为空）
}

impl AttendanceEntry {
    pub fn new(session_date: SessionDate, is_present: bool, remark: impl Into<String>) -> Self {
        Self {
            session_date,
            is_present,
            remark: remark.into(),
        }
    }
}

// ==========================================
// StudentRecord - 学员档案
// ==========================================
// 反序列化经由 StudentRecordWire：出勤率不接受外部输入，按历史重算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StudentRecordWire")]
pub struct StudentRecord {
    pub roll_no: String,             // 学号（花名册内唯一）
    pub student_name: String,        // 姓名
    pub student_mobile_no: String,   // 学员电话
    pub parent_mobile_no: String,    // 家长电话
    pub parent_name: String,         // 家长姓名
    pub branch: String,              // 专业
    pub blood_group: String,         // 血型
    pub residential_address: String, // 住址
    pub email: String,               // 邮箱
    /// 导入文件中的其他列，原样保留
    pub extra_fields: BTreeMap<String, String>,

    attendance_percentage: f64,
    attendance_history: Vec<AttendanceEntry>,
}

#[derive(Deserialize)]
struct StudentRecordWire {
    roll_no: String,
    student_name: String,
    student_mobile_no: String,
    parent_mobile_no: String,
    parent_name: String,
    branch: String,
    blood_group: String,
    residential_address: String,
    email: String,
    #[serde(default)]
    extra_fields: BTreeMap<String, String>,
    #[serde(default)]
    attendance_history: Vec<AttendanceEntry>,
}

impl From<StudentRecordWire> for StudentRecord {
    fn from(wire: StudentRecordWire) -> Self {
        let mut record = StudentRecord::new(wire.roll_no, wire.student_name);
        record.student_mobile_no = wire.student_mobile_no;
        record.parent_mobile_no = wire.parent_mobile_no;
        record.parent_name = wire.parent_name;
        record.branch = wire.branch;
        record.blood_group = wire.blood_group;
        record.residential_address = wire.residential_address;
        record.email = wire.email;
        record.extra_fields = wire.extra_fields;
        record.restore(wire.attendance_history)
    }
}

impl StudentRecord {
    /// 创建新学员（空历史，出勤率 0）
    pub fn new(roll_no: impl Into<String>, student_name: impl Into<String>) -> Self {
        Self {
            roll_no: roll_no.into(),
            student_name: student_name.into(),
            student_mobile_no: String::new(),
            parent_mobile_no: String::new(),
            parent_name: String::new(),
            branch: String::new(),
            blood_group: String::new(),
            residential_address: String::new(),
            email: String::new(),
            extra_fields: BTreeMap::new(),
            attendance_percentage: 0.0,
            attendance_history: Vec::new(),
        }
    }

    /// 从持久化数据恢复（出勤率按历史重新计算，不信任存储值）
    pub fn restore(mut self, history: Vec<AttendanceEntry>) -> Self {
        self.attendance_history = history;
        self.attendance_percentage = compute_percentage(&self.attendance_history);
        self
    }

    pub fn attendance_percentage(&self) -> f64 {
        self.attendance_percentage
    }

    pub fn attendance_history(&self) -> &[AttendanceEntry] {
        &self.attendance_history
    }

    /// 是否已有该课次的记录
    pub fn has_session(&self, date: &SessionDate) -> bool {
        self.attendance_history
            .iter()
            .any(|e| &e.session_date == date)
    }

    /// 追加一条考勤并重算出勤率
    pub fn append_entry(&mut self, entry: AttendanceEntry) {
        self.attendance_history.push(entry);
        self.attendance_percentage = compute_percentage(&self.attendance_history);
    }

    /// 清空历史（仅用于导入花名册时强制初始化）
    pub fn reset_history(&mut self) {
        self.attendance_history.clear();
        self.attendance_percentage = 0.0;
    }

    /// 出勤次数
    pub fn present_count(&self) -> usize {
        self.attendance_history.iter().filter(|e| e.is_present).count()
    }
}

/// 出勤率 = 100 * 出勤次数 / 总次数（无记录时为 0）
pub fn compute_percentage(history: &[AttendanceEntry]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let present = history.iter().filter(|e| e.is_present).count() as f64;
    (100.0 * present / history.len() as f64).clamp(0.0, 100.0)
}
