// ==========================================
// 对账单登记控制台 - 导入管道数据模型
// ==========================================
// 职责: 原始行 / 标准行 / 实体草稿 / 校验错误 / 导入结果
// 流向: RawRow → CanonicalRow → {EntityDraft | ValidationError}
// ==========================================

use crate::domain::types::EntityType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// RawRow - 原始行记录
// ==========================================
// 按文件表头顺序保存 (列名, 值)，仅存活于解码 → 字段解析之间
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.cells.push((label.into(), value.into()));
    }

    /// 精确匹配列名（大小写敏感），重复列名取第一个
    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// 列名大小写不敏感匹配
    pub fn get_ignore_case(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(label))
            .map(|(_, v)| v.as_str())
    }

    /// 所有单元格均为空白
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}

impl<L: Into<String>, V: Into<String>> FromIterator<(L, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (label, value) in iter {
            row.push(label, value);
        }
        row
    }
}

// ==========================================
// CanonicalRow - 标准字段行
// ==========================================
// 字段缺失统一解析为空字符串，"必填" 属于校验层关注点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRow {
    entity_type: EntityType,
    fields: HashMap<&'static str, String>,
}

impl CanonicalRow {
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            fields: HashMap::new(),
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn set(&mut self, field: &'static str, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    /// 读取标准字段，不存在时返回空字符串
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }
}

// ==========================================
// EntityDraft - 待提交实体草稿
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchDraft {
    pub code: String, // 已大写
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerDraft {
    pub name: String,        // 目录用户名（小写）
    pub branch_code: String, // 所属网点代码（大写）
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDraft {
    pub account_number: String,
    pub customer_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub id_number: Option<String>,
    pub branch: String,
    pub issued_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entityType", rename_all = "snake_case")]
pub enum EntityDraft {
    Branch(BranchDraft),
    Issuer(IssuerDraft),
    Registration(RegistrationDraft),
}

impl EntityDraft {
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityDraft::Branch(_) => EntityType::Branch,
            EntityDraft::Issuer(_) => EntityType::Issuer,
            EntityDraft::Registration(_) => EntityType::Registration,
        }
    }

    /// 唯一性检查使用的标识键（已规范化）
    pub fn unique_key(&self) -> &str {
        match self {
            EntityDraft::Branch(d) => &d.code,
            EntityDraft::Issuer(d) => &d.name,
            EntityDraft::Registration(d) => &d.account_number,
        }
    }
}

// ==========================================
// CreatedEntity - 外部创建操作返回的已存储实体
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEntity {
    pub id: String,
    pub entity_type: EntityType,
    pub key: String,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// ValidationError - 单行校验错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub row_index: usize,      // 从 1 开始，仅统计非空数据行
    pub messages: Vec<String>, // 按规则顺序，非空
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row_index, self.messages.join(", "))
    }
}

// ==========================================
// ImportResult - 单次导入运行的结果汇总
// ==========================================
// 不变式: success_count + failed_count == 处理的非空数据行数
// 运行结束后不可变，只通过访问器读取
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    success_count: usize,
    failed_count: usize,
    errors: Vec<String>,
}

impl ImportResult {
    pub(crate) fn new(success_count: usize, failed_count: usize, errors: Vec<String>) -> Self {
        Self {
            success_count,
            failed_count,
            errors,
        }
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    /// 按原始行顺序排列的错误信息，每条自带行号
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn total_processed(&self) -> usize {
        self.success_count + self.failed_count
    }

    pub fn is_clean(&self) -> bool {
        self.failed_count == 0
    }
}
