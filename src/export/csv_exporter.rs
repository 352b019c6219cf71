// ==========================================
// 培训考勤系统 - CSV 导出实现
// ==========================================
// 表格导出: 表头取第一行的字段顺序
// 文档导出: 仅输出 ColumnSpec 选定的列，首行为标题
// ==========================================

use crate::domain::report::FlatRecord;
use crate::export::error::{ExportError, ExportResult};
use crate::export::{header_label, ColumnSpec, ExportAdapter, ExportArtifact};
use csv::Writer;
use tracing::debug;

const CONTENT_TYPE: &str = "text/csv";

pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }

    fn artifact(file_stem: &str, sheet_name: &str, content: Vec<u8>) -> ExportArtifact {
        ExportArtifact {
            file_name: format!("{}.csv", file_stem),
            sheet_name: sheet_name.to_string(),
            content_type: CONTENT_TYPE.to_string(),
            content,
        }
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportAdapter for CsvExporter {
    fn render(&self, rows: &[FlatRecord], sheet_name: &str, file_stem: &str) -> ExportResult<ExportArtifact> {
        // 空报表仍产出文件，但不含表头
        let Some(first) = rows.first() else {
            return Ok(Self::artifact(file_stem, sheet_name, Vec::new()));
        };

        let mut wtr = Writer::from_writer(vec![]);
        let headers: Vec<String> = first.field_names().into_iter().map(header_label).collect();
        wtr.write_record(&headers)?;

        for row in rows {
            let values: Vec<String> = row.fields().iter().map(|(_, v)| v.to_string()).collect();
            wtr.write_record(&values)?;
        }
        wtr.flush().map_err(|e| ExportError::CsvWriteError(e.to_string()))?;
        let content = wtr.into_inner()?;

        debug!(file_stem, rows = rows.len(), bytes = content.len(), "CSV 表格导出完成");
        Ok(Self::artifact(file_stem, sheet_name, content))
    }

    fn render_columns(
        &self,
        rows: &[FlatRecord],
        spec: &ColumnSpec,
        file_stem: &str,
    ) -> ExportResult<ExportArtifact> {
        if spec.columns.is_empty() {
            return Err(ExportError::EmptyColumnSpec);
        }
        if let Some(first) = rows.first() {
            if let Some((field, _)) = spec.columns.iter().find(|(f, _)| first.get(f).is_none()) {
                return Err(ExportError::UnknownColumn(field.clone()));
            }
        }

        let mut wtr = Writer::from_writer(vec![]);
        let labels: Vec<&str> = spec.columns.iter().map(|(_, l)| l.as_str()).collect();
        wtr.write_record(&labels)?;

        for row in rows {
            let values: Vec<String> = spec
                .columns
                .iter()
                .map(|(f, _)| row.get(f).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            wtr.write_record(&values)?;
        }
        wtr.flush().map_err(|e| ExportError::CsvWriteError(e.to_string()))?;
        let content = wtr.into_inner()?;

        debug!(file_stem, title = %spec.title, rows = rows.len(), "CSV 文档导出完成");
        Ok(Self::artifact(file_stem, &spec.title, content))
    }
}
