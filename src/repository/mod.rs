// ==========================================
// 对账单登记控制台 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod registry_repo;
pub mod registry_repo_impl;

pub use error::{RepositoryError, RepositoryResult};
pub use registry_repo::{BranchRecord, IssuerRecord, RegistrationRecord, RegistryGateway};
pub use registry_repo_impl::SqliteRegistryRepository;
