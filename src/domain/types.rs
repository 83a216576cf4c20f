// ==========================================
// 对账单登记控制台 - 领域类型定义
// ==========================================
// 职责: 导入目标实体类型 / 声明的文件格式
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ==========================================
// 导入目标实体类型 (Entity Type)
// ==========================================
// 序列化格式: snake_case (与命令行参数一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Branch,       // 网点
    Issuer,       // 对账单签发人
    Registration, // 客户账户登记
}

impl EntityType {
    pub const ALL: [EntityType; 3] = [
        EntityType::Branch,
        EntityType::Issuer,
        EntityType::Registration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Branch => "branch",
            EntityType::Issuer => "issuer",
            EntityType::Registration => "registration",
        }
    }

    /// 校验该实体时需要读取的系统现状（唯一性 / 引用检查）
    ///
    /// 签发人除自身名称外还要确认所属网点存在。
    pub fn state_dependencies(&self) -> &'static [EntityType] {
        match self {
            EntityType::Branch => &[EntityType::Branch],
            EntityType::Issuer => &[EntityType::Issuer, EntityType::Branch],
            EntityType::Registration => &[EntityType::Registration],
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "branch" | "branches" => Ok(EntityType::Branch),
            "issuer" | "issuers" => Ok(EntityType::Issuer),
            "registration" | "registrations" | "account" | "accounts" => {
                Ok(EntityType::Registration)
            }
            other => Err(format!(
                "unsupported entity type '{}' (expected branch / issuer / registration)",
                other
            )),
        }
    }
}

// ==========================================
// 声明的文件格式 (Declared Format)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredFormat {
    Csv,
    Spreadsheet, // .xlsx / .xls，仅读取第一个工作表
}

impl DeclaredFormat {
    /// 根据文件扩展名推断格式（大小写不敏感）
    pub fn from_file_name<P: AsRef<Path>>(file_name: P) -> Option<Self> {
        let ext = file_name
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Some(DeclaredFormat::Csv),
            "xlsx" | "xls" => Some(DeclaredFormat::Spreadsheet),
            _ => None,
        }
    }

    /// 模板下载使用的扩展名
    pub fn template_extension(&self) -> &'static str {
        match self {
            DeclaredFormat::Csv => "csv",
            DeclaredFormat::Spreadsheet => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DeclaredFormat::Csv => "text/csv",
            DeclaredFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl fmt::Display for DeclaredFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredFormat::Csv => write!(f, "csv"),
            DeclaredFormat::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

impl std::str::FromStr for DeclaredFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(DeclaredFormat::Csv),
            "spreadsheet" | "xlsx" | "xls" | "excel" => Ok(DeclaredFormat::Spreadsheet),
            other => Err(format!(
                "unsupported format '{}' (expected csv / xlsx)",
                other
            )),
        }
    }
}
