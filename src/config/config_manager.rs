// ==========================================
// 对账单登记控制台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{ConfigError, ImportConfigReader};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, ConfigError> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, ConfigError> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        Ok(self
            .get_config_value(key)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::debug!(config_key = key, "配置已更新");
        Ok(())
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_csv_delimiter(&self) -> Result<u8, ConfigError> {
        // 不做 trim：制表符 / 空格本身就是合法分隔符
        let value = match self.get_config_value(config_keys::CSV_DELIMITER)? {
            Some(v) if !v.is_empty() => v,
            _ => return Ok(b','),
        };
        match value.as_str() {
            "\\t" | "tab" => Ok(b'\t'),
            v if v.len() == 1 && v.is_ascii() => Ok(v.as_bytes()[0]),
            _ => {
                tracing::warn!(
                    config_key = config_keys::CSV_DELIMITER,
                    raw_value = %value,
                    "CSV 分隔符配置无效，使用默认值"
                );
                Ok(b',')
            }
        }
    }

    async fn get_registration_branch(&self) -> Result<String, ConfigError> {
        self.get_config_or_default(config_keys::REGISTRATION_BRANCH, "default-branch")
    }

    async fn get_registration_issued_by(&self) -> Result<String, ConfigError> {
        self.get_config_or_default(config_keys::REGISTRATION_ISSUED_BY, "default-issuer")
    }

    async fn get_report_locale(&self) -> Result<String, ConfigError> {
        self.get_config_or_default(config_keys::REPORT_LOCALE, "en")
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 文件解码
    pub const CSV_DELIMITER: &str = "import.csv_delimiter";

    // 账户登记默认归属
    pub const REGISTRATION_BRANCH: &str = "import.registration_branch";
    pub const REGISTRATION_ISSUED_BY: &str = "import.registration_issued_by";

    // 导入报告
    pub const REPORT_LOCALE: &str = "report.locale";
}
