// ==========================================
// 对账单登记控制台 - 核心库
// ==========================================
// 职责: 网点 / 对账单签发人 / 客户账户登记的表格批量导入与校验
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CreatedEntity, DeclaredFormat, EntityDraft, EntityType, ImportResult, ValidationError,
};

// 导入管道
pub use importer::{
    generate_template, BulkImporter, BulkImporterImpl, DecodeError, ImportError, TemplateFile,
};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "对账单登记控制台";
