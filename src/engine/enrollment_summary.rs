// ==========================================
// 培训考勤系统 - 招生人数统计
// ==========================================
// 职责: 按开始学年 × 培训名称汇总 total_students（审计图表数据）
// 过滤: 可选学年区间 [from_year, to_year]、可选单个培训名称
// ==========================================

use crate::domain::training::TrainingProgram;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单个培训名称的序列（与 years 一一对应）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentSeries {
    pub training_name: String,
    pub totals: Vec<i64>,
}

/// 图表数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentChart {
    pub years: Vec<i32>,               // 升序
    pub series: Vec<EnrollmentSeries>, // 按首次出现顺序
}

/// 汇总条件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentQuery {
    pub from_year: Option<i32>,
    pub to_year: Option<i32>,
    pub training_name: Option<String>,
}

impl EnrollmentQuery {
    fn accepts(&self, p: &TrainingProgram) -> bool {
        self.from_year.map_or(true, |y| p.start_year >= y)
            && self.to_year.map_or(true, |y| p.start_year <= y)
            && self
                .training_name
                .as_deref()
                .map_or(true, |name| p.training_name == name)
    }
}

/// 汇总招生人数
pub fn enrollment_by_year(programs: &[TrainingProgram], query: &EnrollmentQuery) -> EnrollmentChart {
    let mut cells: BTreeMap<(i32, String), i64> = BTreeMap::new();
    let mut names: Vec<String> = Vec::new();

    for p in programs.iter().filter(|p| query.accepts(p)) {
        *cells.entry((p.start_year, p.training_name.clone())).or_insert(0) += p.total_students as i64;
        if !names.contains(&p.training_name) {
            names.push(p.training_name.clone());
        }
    }

    let mut years: Vec<i32> = cells.keys().map(|(y, _)| *y).collect();
    years.dedup();

    let series = names
        .into_iter()
        .map(|name| {
            let totals = years
                .iter()
                .map(|y| cells.get(&(*y, name.clone())).copied().unwrap_or(0))
                .collect();
            EnrollmentSeries {
                training_name: name,
                totals,
            }
        })
        .collect();

    EnrollmentChart { years, series }
}
