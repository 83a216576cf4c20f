// ==========================================
// 对账单登记控制台 - 登记数据 Repository Trait
// ==========================================
// 职责: 定义导入管道依赖的外部能力（创建实体 / 读取现状）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::{CreatedEntity, EntityDraft, EntityType};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// RegistryGateway Trait
// ==========================================
// 用途: 导入管道的提交目标
// 实现者: SqliteRegistryRepository（使用 rusqlite）
#[async_trait]
pub trait RegistryGateway: Send + Sync {
    /// 创建单个实体
    ///
    /// # 返回
    /// - Ok(CreatedEntity): 已存储实体（含标识键）
    /// - Err: 存储拒绝 / 不可用（导入管道将该行计为失败）
    async fn create(&self, draft: &EntityDraft) -> RepositoryResult<CreatedEntity>;

    /// 读取某实体类型的全部已存在标识键（用于构建现状快照）
    async fn current_state(&self, entity_type: EntityType) -> RepositoryResult<BTreeSet<String>>;
}

// ==========================================
// 已存储记录（查询用）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    pub id: String,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerRecord {
    pub id: String,
    pub name: String,
    pub branch_id: String,
    pub branch_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    pub id: String,
    pub account_number: String,
    pub customer_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub id_number: Option<String>,
    pub branch: String,
    pub issued_by: String,
    pub created_at: DateTime<Utc>,
}
