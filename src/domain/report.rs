// ==========================================
// 培训考勤系统 - 报表行模型
// ==========================================
// 职责: 每类报表一个具名行类型，统一转换为有序字段列表供导出
// 列顺序与导出表头一致
// ==========================================

use crate::domain::student::StudentRecord;
use crate::domain::training::TrainingProgram;
use crate::domain::types::SessionDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Number(v) if v.fract() == 0.0 => write!(f, "{}", *v as i64),
            CellValue::Number(v) => write!(f, "{:.2}", v),
            CellValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Integer(v as i64)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<Option<i32>> for CellValue {
    fn from(v: Option<i32>) -> Self {
        v.map(CellValue::from).unwrap_or(CellValue::Empty)
    }
}

// ==========================================
// FlatRecord - 有序字段列表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    fields: Vec<(String, CellValue)>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加字段（保持插入顺序）
    pub fn push(mut self, name: &str, value: impl Into<CellValue>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn fields(&self) -> &[(String, CellValue)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// 可导出的报表行
pub trait ExportRow {
    fn to_flat_record(&self) -> FlatRecord;
}

// ==========================================
// StudentAttendanceRow - 出勤汇总行
// ==========================================
// 用于出勤率报表与低出勤学员报表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAttendanceRow {
    pub student_name: String,
    pub attendance: f64,
    pub training_name: String,
    pub parent_mobile_no: String,
    pub student_mobile_no: String,
    pub roll_no: String,
    pub parent_name: String,
    pub branch: String,
    pub blood_group: String,
    pub residential_address: String,
    pub email: String,
}

/// 低出勤学员报表与出勤汇总共用同一行结构
pub type IrregularStudentRow = StudentAttendanceRow;

impl StudentAttendanceRow {
    pub fn from_student(program: &TrainingProgram, student: &StudentRecord) -> Self {
        Self {
            student_name: student.student_name.clone(),
            attendance: student.attendance_percentage(),
            training_name: program.training_name.clone(),
            parent_mobile_no: student.parent_mobile_no.clone(),
            student_mobile_no: student.student_mobile_no.clone(),
            roll_no: student.roll_no.clone(),
            parent_name: student.parent_name.clone(),
            branch: student.branch.clone(),
            blood_group: student.blood_group.clone(),
            residential_address: student.residential_address.clone(),
            email: student.email.clone(),
        }
    }
}

impl ExportRow for StudentAttendanceRow {
    fn to_flat_record(&self) -> FlatRecord {
        FlatRecord::new()
            .push("Student_Name", self.student_name.as_str())
            .push("Attendance", self.attendance)
            .push("Training_Name", self.training_name.as_str())
            .push("Parent_Mobile_No", self.parent_mobile_no.as_str())
            .push("Student_Mobile_No", self.student_mobile_no.as_str())
            .push("Roll_No", self.roll_no.as_str())
            .push("Parent_Name", self.parent_name.as_str())
            .push("Branch", self.branch.as_str())
            .push("Blood_Group", self.blood_group.as_str())
            .push("Residential_Address", self.residential_address.as_str())
            .push("Email", self.email.as_str())
    }
}

// ==========================================
// SessionAttendanceRow - 单课次出勤/缺勤行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAttendanceRow {
    pub student_name: String,
    pub attendance: f64,
    pub remarks: String, // 该课次所有备注，以 ", " 连接
    pub training_name: String,
    pub parent_mobile_no: String,
    pub student_mobile_no: String,
    pub roll_no: String,
    pub parent_name: String,
    pub branch: String,
    pub blood_group: String,
    pub residential_address: String,
    pub email: String,
    pub date: SessionDate,
}

impl SessionAttendanceRow {
    pub fn from_student(
        program: &TrainingProgram,
        student: &StudentRecord,
        date: SessionDate,
        remarks: String,
    ) -> Self {
        Self {
            student_name: student.student_name.clone(),
            attendance: student.attendance_percentage(),
            remarks,
            training_name: program.training_name.clone(),
            parent_mobile_no: student.parent_mobile_no.clone(),
            student_mobile_no: student.student_mobile_no.clone(),
            roll_no: student.roll_no.clone(),
            parent_name: student.parent_name.clone(),
            branch: student.branch.clone(),
            blood_group: student.blood_group.clone(),
            residential_address: student.residential_address.clone(),
            email: student.email.clone(),
            date,
        }
    }
}

impl ExportRow for SessionAttendanceRow {
    fn to_flat_record(&self) -> FlatRecord {
        FlatRecord::new()
            .push("Student_Name", self.student_name.as_str())
            .push("Attendance", self.attendance)
            .push("Remarks", self.remarks.as_str())
            .push("Training_Name", self.training_name.as_str())
            .push("Parent_Mobile_No", self.parent_mobile_no.as_str())
            .push("Student_Mobile_No", self.student_mobile_no.as_str())
            .push("Roll_No", self.roll_no.as_str())
            .push("Parent_Name", self.parent_name.as_str())
            .push("Branch", self.branch.as_str())
            .push("Blood_Group", self.blood_group.as_str())
            .push("Residential_Address", self.residential_address.as_str())
            .push("Email", self.email.as_str())
            .push("Date", self.date.to_string())
    }
}

// ==========================================
// TrainingAuditRow - 审计导出行（14 列）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingAuditRow {
    pub training_name: String,
    pub start_year: i32,
    pub end_year: i32,
    pub student_year: i32,
    pub semester: i32,
    pub total_students: i32,
    pub venue: String,
    pub no_of_hours: Option<i32>,
    pub duration: Option<i32>,
    pub mode: String,
    pub status: String,
    pub trainer_name: String,
    pub designation: String,
    pub company: String,
}

impl From<&TrainingProgram> for TrainingAuditRow {
    fn from(p: &TrainingProgram) -> Self {
        Self {
            training_name: p.training_name.clone(),
            start_year: p.start_year,
            end_year: p.end_year,
            student_year: p.student_year,
            semester: p.semester,
            total_students: p.total_students,
            venue: p.venue.clone(),
            no_of_hours: p.no_of_hours,
            duration: p.duration,
            mode: p.mode.to_string(),
            status: p.status.to_string(),
            trainer_name: p.trainer_name.clone(),
            designation: p.designation.clone(),
            company: p.company.clone(),
        }
    }
}

impl ExportRow for TrainingAuditRow {
    fn to_flat_record(&self) -> FlatRecord {
        FlatRecord::new()
            .push("Training_Name", self.training_name.as_str())
            .push("Start_Year", self.start_year)
            .push("End_Year", self.end_year)
            .push("Student_Year", self.student_year)
            .push("Semester", self.semester)
            .push("Total_Students", self.total_students)
            .push("Venue", self.venue.as_str())
            .push("No_of_Hours", self.no_of_hours)
            .push("Duration", self.duration)
            .push("Mode", self.mode.as_str())
            .push("Status", self.status.as_str())
            .push("Trainer_Name", self.trainer_name.as_str())
            .push("Designation", self.designation.as_str())
            .push("Company", self.company.as_str())
    }
}

/// 批量转换
pub fn to_flat_records<R: ExportRow>(rows: &[R]) -> Vec<FlatRecord> {
    rows.iter().map(ExportRow::to_flat_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Number(50.0).to_string(), "50");
        assert_eq!(CellValue::Number(100.0 / 3.0).to_string(), "33.33");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::from(Some(12)).to_string(), "12");
    }

    #[test]
    fn test_flat_record_keeps_order() {
        let rec = FlatRecord::new().push("B", "x").push("A", 1);
        assert_eq!(rec.field_names(), vec!["B", "A"]);
        assert_eq!(rec.get("A"), Some(&CellValue::Integer(1)));
        assert!(rec.get("C").is_none());
    }
}
