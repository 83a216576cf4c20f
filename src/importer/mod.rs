// ==========================================
// 对账单登记控制台 - 导入层
// ==========================================
// 职责: 表格文件批量导入（网点 / 签发人 / 账户登记）
// 管道: 解码 → 字段解析 → 行校验 → 提交
// 支持: CSV, Excel
// ==========================================

// 模块声明
pub mod bulk_importer_impl;
pub mod bulk_importer_trait;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod report;
pub mod row_validator;
pub mod state_snapshot;
pub mod template;

// 重导出核心类型
pub use bulk_importer_impl::{BulkImporterImpl, ImportPhase};
pub use data_cleaner::DataCleaner;
pub use error::{DecodeError, ImportError, ImportOutcome};
pub use field_mapper::{schema_for, AliasFieldResolver, FieldSchema, FieldSpec};
pub use file_parser::{CsvDecoder, SpreadsheetDecoder, UniversalDecoder};
pub use row_validator::{RuleSetValidator, ValidationContext};
pub use state_snapshot::StateSnapshot;
pub use template::{generate_template, TemplateError, TemplateFile};

// 重导出 Trait 接口
pub use bulk_importer_trait::{BulkImporter, FieldResolver, RowStream, RowValidator, TabularDecoder};
