// ==========================================
// 培训考勤系统 - 导入层
// ==========================================
// 职责: 外部花名册文件导入
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod file_parser;
pub mod roster_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use roster_importer::{normalize_header, records_to_roster, RosterImporter, REQUIRED_COLUMNS};
