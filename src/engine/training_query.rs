// ==========================================
// 培训考勤系统 - 培训审计查询引擎
// ==========================================
// 职责: 多字段过滤 + 单键三态排序（升序 → 降序 → 不排序）
// 过滤: 空条件不生效；非空时对字段文本做大小写不敏感的子串匹配；各条件 AND
// 协调人: 逗号分隔的ID集合，项目任一协调人在集合中即通过
// 排序: 稳定排序；缺失值排在最前（升序）
// ==========================================

use crate::domain::report::TrainingAuditRow;
use crate::domain::training::TrainingProgram;
use crate::domain::types::ProgramStatus;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ==========================================
// TrainingField - 审计字段（14 个）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrainingField {
    TrainingName,
    StartYear,
    EndYear,
    StudentYear,
    Semester,
    TotalStudents,
    Venue,
    NoOfHours,
    Duration,
    Mode,
    Status,
    TrainerName,
    Designation,
    Company,
}

impl TrainingField {
    /// 表格列顺序
    pub const ALL: [TrainingField; 14] = [
        TrainingField::TrainingName,
        TrainingField::StartYear,
        TrainingField::EndYear,
        TrainingField::StudentYear,
        TrainingField::Semester,
        TrainingField::TotalStudents,
        TrainingField::Venue,
        TrainingField::NoOfHours,
        TrainingField::Duration,
        TrainingField::Mode,
        TrainingField::Status,
        TrainingField::TrainerName,
        TrainingField::Designation,
        TrainingField::Company,
    ];

    /// 列标题
    pub fn label(&self) -> &'static str {
        match self {
            TrainingField::TrainingName => "Training Name",
            TrainingField::StartYear => "Start Year",
            TrainingField::EndYear => "End Year",
            TrainingField::StudentYear => "Student Year",
            TrainingField::Semester => "Semester",
            TrainingField::TotalStudents => "Total Students",
            TrainingField::Venue => "Venue",
            TrainingField::NoOfHours => "No of Hours",
            TrainingField::Duration => "Duration",
            TrainingField::Mode => "Mode",
            TrainingField::Status => "Status",
            TrainingField::TrainerName => "Trainer Name",
            TrainingField::Designation => "Designation",
            TrainingField::Company => "Company",
        }
    }

    /// 解析字段键（接受 camelCase / snake_case / 列标题，大小写不敏感）
    pub fn parse(key: &str) -> Option<Self> {
        let normalized: String = key
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        Self::ALL.iter().copied().find(|f| {
            let label: String = f
                .label()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            label == normalized
                || (*f == TrainingField::TotalStudents && normalized == "totalnoofstudents")
        })
    }

    /// 取项目的字段值
    pub fn value_of(&self, p: &TrainingProgram) -> FieldValue {
        match self {
            TrainingField::TrainingName => FieldValue::text(&p.training_name),
            TrainingField::StartYear => FieldValue::Int(p.start_year as i64),
            TrainingField::EndYear => FieldValue::Int(p.end_year as i64),
            TrainingField::StudentYear => FieldValue::Int(p.student_year as i64),
            TrainingField::Semester => FieldValue::Int(p.semester as i64),
            TrainingField::TotalStudents => FieldValue::Int(p.total_students as i64),
            TrainingField::Venue => FieldValue::text(&p.venue),
            TrainingField::NoOfHours => p.no_of_hours.map_or(FieldValue::Missing, |v| FieldValue::Int(v as i64)),
            TrainingField::Duration => p.duration.map_or(FieldValue::Missing, |v| FieldValue::Int(v as i64)),
            TrainingField::Mode => FieldValue::text(&p.mode.to_string()),
            TrainingField::Status => FieldValue::text(&p.status.to_string()),
            TrainingField::TrainerName => FieldValue::text(&p.trainer_name),
            TrainingField::Designation => FieldValue::text(&p.designation),
            TrainingField::Company => FieldValue::text(&p.company),
        }
    }
}

impl fmt::Display for TrainingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// FieldValue - 可比较的字段值
// ==========================================
// 全序: Missing < Int < Text；同类按值比较
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue {
    Missing,
    Int(i64),
    Text(String),
}

impl FieldValue {
    fn text(s: &str) -> Self {
        if s.is_empty() {
            FieldValue::Missing
        } else {
            FieldValue::Text(s.to_string())
        }
    }

    /// 过滤用文本（缺失值返回 None）
    pub fn filter_text(&self) -> Option<String> {
        match self {
            FieldValue::Missing => None,
            FieldValue::Int(v) => Some(v.to_string()),
            FieldValue::Text(s) => Some(s.to_lowercase()),
        }
    }
}

// ==========================================
// 排序状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    key: Option<TrainingField>,
    direction: Option<SortDirection>,
}

impl SortState {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ascending(field: TrainingField) -> Self {
        Self {
            key: Some(field),
            direction: Some(SortDirection::Ascending),
        }
    }

    pub fn descending(field: TrainingField) -> Self {
        Self {
            key: Some(field),
            direction: Some(SortDirection::Descending),
        }
    }

    /// 点击列头：同列 升序 → 降序 → 不排序 → 升序；换列重置为升序
    pub fn select(self, field: TrainingField) -> Self {
        if self.key != Some(field) {
            return Self::ascending(field);
        }
        let direction = match self.direction {
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
            None => Some(SortDirection::Ascending),
        };
        Self {
            key: Some(field),
            direction,
        }
    }

    /// 生效的排序（key 与方向都存在时）
    pub fn active(&self) -> Option<(TrainingField, SortDirection)> {
        match (self.key, self.direction) {
            (Some(k), Some(d)) => Some((k, d)),
            _ => None,
        }
    }
}

// ==========================================
// TrainingFilter - 过滤条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingFilter {
    field_filters: BTreeMap<TrainingField, String>,
    coordinator_filter: String,
    ongoing_only: bool,
}

impl TrainingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置字段过滤（空串等价于清除）
    pub fn with_field(mut self, field: TrainingField, needle: impl Into<String>) -> Self {
        self.set_field(field, needle);
        self
    }

    pub fn set_field(&mut self, field: TrainingField, needle: impl Into<String>) {
        let needle = needle.into();
        if needle.is_empty() {
            self.field_filters.remove(&field);
        } else {
            self.field_filters.insert(field, needle);
        }
    }

    pub fn clear_field(&mut self, field: TrainingField) {
        self.field_filters.remove(&field);
    }

    /// 协调人过滤（逗号分隔）
    pub fn with_coordinators(mut self, csv: impl Into<String>) -> Self {
        self.coordinator_filter = csv.into();
        self
    }

    /// 仅显示进行中的项目
    pub fn ongoing_only(mut self) -> Self {
        self.ongoing_only = true;
        self
    }

    /// 协调人集合（去空白、忽略空项）
    pub fn coordinator_set(&self) -> BTreeSet<String> {
        self.coordinator_filter
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// 是否通过全部条件
    pub fn matches(&self, program: &TrainingProgram) -> bool {
        if self.ongoing_only && program.status != ProgramStatus::Ongoing {
            return false;
        }

        let fields_ok = self.field_filters.iter().all(|(field, needle)| {
            field
                .value_of(program)
                .filter_text()
                .map_or(false, |text| text.contains(&needle.to_lowercase()))
        });
        if !fields_ok {
            return false;
        }

        let wanted = self.coordinator_set();
        wanted.is_empty() || program.coordinators.iter().any(|c| wanted.contains(c))
    }
}

// ==========================================
// TrainingQueryEngine - 审计查询引擎
// ==========================================
pub struct TrainingQueryEngine;

impl TrainingQueryEngine {
    pub fn new() -> Self {
        Self
    }

    /// 过滤 + 排序
    ///
    /// # 返回
    /// - 通过过滤的项目；未排序时保持输入顺序
    pub fn query(
        &self,
        programs: &[TrainingProgram],
        filter: &TrainingFilter,
        sort: &SortState,
    ) -> Vec<TrainingProgram> {
        let mut result: Vec<TrainingProgram> = programs
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        self.sort(&mut result, sort);
        result
    }

    /// 稳定排序（原地）
    pub fn sort(&self, programs: &mut [TrainingProgram], sort: &SortState) {
        let Some((field, direction)) = sort.active() else {
            return;
        };
        programs.sort_by(|a, b| {
            let ord: Ordering = field.value_of(a).cmp(&field.value_of(b));
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    /// 审计导出行
    pub fn audit_rows(
        &self,
        programs: &[TrainingProgram],
        filter: &TrainingFilter,
        sort: &SortState,
    ) -> Vec<TrainingAuditRow> {
        self.query(programs, filter, sort)
            .iter()
            .map(TrainingAuditRow::from)
            .collect()
    }
}

impl Default for TrainingQueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
