// ==========================================
// 对账单登记控制台 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;

pub type ConfigError = Box<dyn Error + Send + Sync>;

// ==========================================
// ImportSettings - 单次导入运行使用的配置值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportSettings {
    pub csv_delimiter: u8,
    pub registration_branch: String,
    pub registration_issued_by: String,
    pub report_locale: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            csv_delimiter: b',',
            registration_branch: "default-branch".to_string(),
            registration_issued_by: "default-issuer".to_string(),
            report_locale: "en".to_string(),
        }
    }
}

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）, ImportSettings（内存固定值）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取 CSV 分隔符
    ///
    /// # 默认值
    /// - ','
    async fn get_csv_delimiter(&self) -> Result<u8, ConfigError>;

    /// 获取账户登记默认所属网点
    ///
    /// # 默认值
    /// - "default-branch"
    async fn get_registration_branch(&self) -> Result<String, ConfigError>;

    /// 获取账户登记默认签发人
    ///
    /// # 默认值
    /// - "default-issuer"
    async fn get_registration_issued_by(&self) -> Result<String, ConfigError>;

    /// 获取导入报告语言
    ///
    /// # 默认值
    /// - "en"
    async fn get_report_locale(&self) -> Result<String, ConfigError>;

    /// 一次性读取本次运行所需的全部配置
    async fn import_settings(&self) -> Result<ImportSettings, ConfigError> {
        Ok(ImportSettings {
            csv_delimiter: self.get_csv_delimiter().await?,
            registration_branch: self.get_registration_branch().await?,
            registration_issued_by: self.get_registration_issued_by().await?,
            report_locale: self.get_report_locale().await?,
        })
    }
}

#[async_trait]
impl ImportConfigReader for ImportSettings {
    async fn get_csv_delimiter(&self) -> Result<u8, ConfigError> {
        Ok(self.csv_delimiter)
    }

    async fn get_registration_branch(&self) -> Result<String, ConfigError> {
        Ok(self.registration_branch.clone())
    }

    async fn get_registration_issued_by(&self) -> Result<String, ConfigError> {
        Ok(self.registration_issued_by.clone())
    }

    async fn get_report_locale(&self) -> Result<String, ConfigError> {
        Ok(self.report_locale.clone())
    }

    async fn import_settings(&self) -> Result<ImportSettings, ConfigError> {
        Ok(self.clone())
    }
}
