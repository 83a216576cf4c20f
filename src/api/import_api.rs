// ==========================================
// 批量导入API
// ==========================================
// 职责: 封装网点 / 签发人 / 账户登记的批量导入与模板下载
// 对外: run_import / import_file / import_files / generate_template
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::open_sqlite_connection;
use crate::domain::{DeclaredFormat, EntityType, ImportResult};
use crate::importer::error::DecodeError;
use crate::importer::{generate_template, BulkImporter, BulkImporterImpl, TemplateFile};
use crate::repository::{BranchRecord, IssuerRecord, RegistrationRecord, SqliteRegistryRepository};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;

/// 导入API
pub struct ImportApi {
    importer: BulkImporterImpl<SqliteRegistryRepository, ConfigManager>,
}

impl ImportApi {
    /// 创建新的ImportApi实例（仓储与配置共享同一个连接）
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        let conn = Arc::new(Mutex::new(conn));

        let repo = SqliteRegistryRepository::from_connection(Arc::clone(&conn))?;
        let config = ConfigManager::from_connection(conn)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            importer: BulkImporterImpl::with_defaults(repo, config),
        })
    }

    /// 导入上传的文件内容
    ///
    /// # 返回
    /// - Ok(ImportResult): 每一行都计入成功或失败
    /// - Err(ApiError::FileUnreadable): 文件结构错误，没有任何行被处理
    pub async fn run_import(
        &self,
        file_bytes: Vec<u8>,
        format: DeclaredFormat,
        entity_type: EntityType,
    ) -> ApiResult<ImportResult> {
        Ok(self
            .importer
            .run_import(file_bytes, format, entity_type)
            .await?)
    }

    /// 导入本地文件（按扩展名推断格式）
    pub async fn import_file(&self, path: &Path, entity_type: EntityType) -> ApiResult<ImportResult> {
        let format = format_for(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::FileUnreadable(format!("{}: {}", path.display(), e)))?;

        info!(file = %path.display(), entity_type = %entity_type, "导入本地文件");
        self.run_import(bytes, format, entity_type).await
    }

    /// 批量导入多个本地文件（文件之间并发）
    ///
    /// 无法读取的文件单独报错，不影响其他文件；返回顺序与输入路径一致。
    pub async fn import_files(
        &self,
        paths: &[PathBuf],
        entity_type: EntityType,
    ) -> Vec<(String, ApiResult<ImportResult>)> {
        let mut slots: Vec<(String, Option<ApiResult<ImportResult>>)> = Vec::with_capacity(paths.len());
        let mut batch_slots = Vec::new();
        let mut files = Vec::new();

        for path in paths {
            let name = path.display().to_string();
            let loaded = match format_for(path) {
                Ok(format) => tokio::fs::read(path)
                    .await
                    .map(|bytes| (bytes, format))
                    .map_err(|e| ApiError::FileUnreadable(format!("{}: {}", name, e))),
                Err(e) => Err(e),
            };

            match loaded {
                Ok((bytes, format)) => {
                    batch_slots.push(slots.len());
                    files.push((name.clone(), bytes, format));
                    slots.push((name, None));
                }
                Err(e) => slots.push((name, Some(Err(e)))),
            }
        }

        // join_all 保持输入顺序，按位置回填
        let outcomes = self.importer.batch_import(files, entity_type).await;
        for (slot, (_, outcome)) in batch_slots.into_iter().zip(outcomes) {
            slots[slot].1 = Some(outcome.map_err(ApiError::from));
        }

        slots
            .into_iter()
            .filter_map(|(name, outcome)| outcome.map(|outcome| (name, outcome)))
            .collect()
    }

    /// 生成导入模板（CSV 分隔符与导入配置一致）
    pub async fn generate_template(
        &self,
        entity_type: EntityType,
        format: DeclaredFormat,
    ) -> ApiResult<TemplateFile> {
        let delimiter = self
            .importer
            .config()
            .get_csv_delimiter()
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        Ok(generate_template(entity_type, format, delimiter)?)
    }

    /// 导入报告使用的语言
    pub async fn report_locale(&self) -> ApiResult<String> {
        self.importer
            .config()
            .get_report_locale()
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    /// 写入 global 配置
    pub fn set_config(&self, key: &str, value: &str) -> ApiResult<()> {
        self.importer
            .config()
            .set_global_config_value(key, value)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    // ===== 查询 =====

    pub fn list_branches(&self) -> ApiResult<Vec<BranchRecord>> {
        Ok(self.importer.gateway().list_branches()?)
    }

    pub fn list_issuers(&self) -> ApiResult<Vec<IssuerRecord>> {
        Ok(self.importer.gateway().list_issuers()?)
    }

    pub fn list_registrations(&self) -> ApiResult<Vec<RegistrationRecord>> {
        Ok(self.importer.gateway().list_registrations()?)
    }
}

fn format_for(path: &Path) -> ApiResult<DeclaredFormat> {
    DeclaredFormat::from_file_name(path).ok_or_else(|| {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        ApiError::FileUnreadable(DecodeError::UnsupportedFormat(ext).to_string())
    })
}
