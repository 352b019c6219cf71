// ==========================================
// 培训考勤系统 - 花名册导入器
// ==========================================
// 流程: 文件解析 → 表头规范化（空白 → "_"）→ 字段映射 → 校验
// 红线: 导入的学员一律为空历史、出勤率 0，忽略文件中的出勤数据
// ==========================================

use crate::domain::student::StudentRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{FileParser, RawRecord, UniversalFileParser};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// 必需列
pub const REQUIRED_COLUMNS: [&str; 2] = ["Roll_No", "Student_Name"];

/// 由系统维护、导入时丢弃的列
const DERIVED_COLUMNS: [&str; 2] = ["Attendance", "attendanceRecords"];

/// 表头规范化：去首尾空白，内部连续空白替换为单个 "_"
pub fn normalize_header(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join("_")
}

// ==========================================
// RosterImporter - 花名册导入器
// ==========================================
pub struct RosterImporter {
    parser: Box<dyn FileParser>,
}

impl RosterImporter {
    pub fn new() -> Self {
        Self {
            parser: Box::new(UniversalFileParser),
        }
    }

    /// 使用自定义解析器
    pub fn with_parser(parser: Box<dyn FileParser>) -> Self {
        Self { parser }
    }

    /// 从文件导入花名册
    ///
    /// # 返回
    /// - Ok(Vec<StudentRecord>): 按文件行序排列的学员
    /// - Err(MissingColumn / DuplicateRollNo / FieldMappingError / EmptyRoster)
    pub fn import_file(&self, file_path: &Path) -> ImportResult<Vec<StudentRecord>> {
        info!(file = %file_path.display(), "开始导入花名册");
        let records = self.parser.parse_to_raw_records(file_path)?;
        let roster = records_to_roster(records)?;
        info!(file = %file_path.display(), students = roster.len(), "花名册导入完成");
        Ok(roster)
    }
}

impl Default for RosterImporter {
    fn default() -> Self {
        Self::new()
    }
}

/// 原始记录 → 学员列表
pub fn records_to_roster(records: Vec<RawRecord>) -> ImportResult<Vec<StudentRecord>> {
    if records.is_empty() {
        return Err(ImportError::EmptyRoster);
    }

    let normalized: Vec<RawRecord> = records
        .into_iter()
        .map(|r| r.into_iter().map(|(k, v)| (normalize_header(&k), v)).collect())
        .collect();

    for column in REQUIRED_COLUMNS {
        if !normalized.iter().any(|r| r.contains_key(column)) {
            return Err(ImportError::MissingColumn(column.to_string()));
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut roster = Vec::with_capacity(normalized.len());

    for (idx, mut record) in normalized.into_iter().enumerate() {
        // 文件行号（表头为第 1 行）
        let row = idx + 2;

        let roll_no = take(&mut record, "Roll_No");
        if roll_no.is_empty() {
            return Err(ImportError::FieldMappingError {
                row,
                message: "Roll_No 为空".to_string(),
            });
        }
        let student_name = take(&mut record, "Student_Name");
        if student_name.is_empty() {
            return Err(ImportError::FieldMappingError {
                row,
                message: format!("学号 {} 的 Student_Name 为空", roll_no),
            });
        }
        if !seen.insert(roll_no.clone()) {
            return Err(ImportError::DuplicateRollNo { row, roll_no });
        }

        let mut student = StudentRecord::new(roll_no, student_name);
        student.student_mobile_no = take(&mut record, "Student_Mobile_No");
        student.parent_mobile_no = take(&mut record, "Parent_Mobile_No");
        student.parent_name = take(&mut record, "Parent_Name");
        student.branch = take(&mut record, "Branch");
        student.blood_group = take(&mut record, "Blood_Group");
        student.residential_address = take(&mut record, "Residential_Address");
        student.email = take(&mut record, "Email");

        for column in DERIVED_COLUMNS {
            record.remove(column);
        }
        student.extra_fields = record
            .into_iter()
            .filter(|(k, _)| !k.is_empty())
            .collect();

        roster.push(student);
    }

    debug!(students = roster.len(), "花名册记录映射完成");
    Ok(roster)
}

fn take(record: &mut RawRecord, key: &str) -> String {
    record.remove(key).unwrap_or_default().trim().to_string()
}
