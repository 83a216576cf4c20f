// ==========================================
// 对账单登记控制台 - 领域模型层
// ==========================================
// 职责: 定义导入管道使用的实体与类型
// 红线: 不含数据访问逻辑,不含校验规则
// ==========================================

pub mod registry;
pub mod types;

// 重导出核心类型
pub use registry::{
    BranchDraft, CanonicalRow, CreatedEntity, EntityDraft, ImportResult, IssuerDraft, RawRow,
    RegistrationDraft, ValidationError,
};
pub use types::{DeclaredFormat, EntityType};
