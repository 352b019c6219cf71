// ==========================================
// 培训考勤系统 - 导出层
// ==========================================
// 职责: 将报表行渲染为可下载的文件
// 表头: 字段名中的 "_" 替换为空格
// ==========================================

pub mod csv_exporter;
pub mod error;

pub use csv_exporter::CsvExporter;
pub use error::{ExportError, ExportResult};

use crate::domain::report::FlatRecord;
use crate::domain::types::SessionDate;
use crate::engine::training_query::TrainingField;
use serde::{Deserialize, Serialize};

// ==========================================
// ExportArtifact - 导出产物
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub sheet_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

// ==========================================
// ColumnSpec - 文档导出的列选择
// ==========================================
/// (字段名, 列标题) 有序列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub title: String,
    pub columns: Vec<(String, String)>,
}

impl ColumnSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, field: &str, label: &str) -> Self {
        self.columns.push((field.to_string(), label.to_string()));
        self
    }

    /// 审计表的 14 列文档视图
    pub fn training_audit() -> Self {
        TrainingField::ALL.iter().fold(Self::new("Trainings"), |spec, f| {
            let field = f.label().replace(' ', "_");
            spec.column(&field, f.label())
        })
    }
}

// ==========================================
// ExportAdapter Trait
// ==========================================
pub trait ExportAdapter: Send + Sync {
    /// 渲染全部字段
    ///
    /// # 参数
    /// - rows: 报表行
    /// - sheet_name: 工作表名
    /// - file_stem: 不含扩展名的文件名
    fn render(&self, rows: &[FlatRecord], sheet_name: &str, file_stem: &str) -> ExportResult<ExportArtifact>;

    /// 按列选择渲染（文档形式）
    fn render_columns(
        &self,
        rows: &[FlatRecord],
        spec: &ColumnSpec,
        file_stem: &str,
    ) -> ExportResult<ExportArtifact>;
}

/// 字段名 → 表头
pub fn header_label(field: &str) -> String {
    field.replace('_', " ")
}

/// 报表文件名: {sheet}_{training_name}[_{M-D-YYYY}]
pub fn report_file_stem(sheet_name: &str, training_name: &str, date: Option<SessionDate>) -> String {
    match date {
        Some(d) => format!("{}_{}_{}", sheet_name, training_name, d.to_file_token()),
        None => format!("{}_{}", sheet_name, training_name),
    }
}
