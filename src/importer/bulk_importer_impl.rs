// ==========================================
// 对账单登记控制台 - 批量导入器实现
// ==========================================
// 职责: 整合导入流程，从文件字节到外部创建操作
// 流程: 解码 → (逐行) 字段解析 → 行校验 → 提交 → 快照增量登记
// 红线:
// - 行循环严格顺序，同一运行内不存在并发提交
// - 不回滚：后续行失败不影响已提交的行
// - 行级失败是数据（写入 ImportResult.errors），不是控制流
// ==========================================

use crate::config::{ImportConfigReader, ImportSettings};
use crate::domain::{DeclaredFormat, EntityType, ImportResult, RawRow};
use crate::importer::bulk_importer_trait::{BulkImporter, FieldResolver, RowValidator};
use crate::importer::error::{ImportError, ImportOutcome};
use crate::importer::field_mapper::{schema_for, AliasFieldResolver};
use crate::importer::file_parser::UniversalDecoder;
use crate::importer::row_validator::{RuleSetValidator, ValidationContext};
use crate::importer::state_snapshot::StateSnapshot;
use crate::repository::RegistryGateway;
use async_trait::async_trait;
use futures::future::join_all;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ImportPhase - 单次运行状态机
// ==========================================
// Decoding → RowLoop → Completed
// Decoding → Aborted（结构错误 / 快照不可用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Decoding,
    RowLoop,
    Completed,
    Aborted,
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImportPhase::Decoding => "Decoding",
            ImportPhase::RowLoop => "RowLoop",
            ImportPhase::Completed => "Completed",
            ImportPhase::Aborted => "Aborted",
        };
        write!(f, "{}", s)
    }
}

/// 提交失败时写入报告的固定信息
pub const COMMIT_FAILED_MESSAGE: &str = "Failed to process";

// ==========================================
// BulkImporterImpl - 批量导入器实现
// ==========================================
pub struct BulkImporterImpl<G, C>
where
    G: RegistryGateway,
    C: ImportConfigReader,
{
    // 外部创建操作 + 现状读取
    gateway: G,

    // 配置读取器
    config: C,

    // 导入组件
    field_resolver: Box<dyn FieldResolver>,
    row_validator: Box<dyn RowValidator>,
}

impl<G, C> BulkImporterImpl<G, C>
where
    G: RegistryGateway,
    C: ImportConfigReader,
{
    /// 创建新的 BulkImporter 实例
    ///
    /// # 参数
    /// - gateway: 提交目标（创建实体 / 读取现状）
    /// - config: 配置读取器
    /// - field_resolver: 字段解析器
    /// - row_validator: 行校验器
    pub fn new(
        gateway: G,
        config: C,
        field_resolver: Box<dyn FieldResolver>,
        row_validator: Box<dyn RowValidator>,
    ) -> Self {
        Self {
            gateway,
            config,
            field_resolver,
            row_validator,
        }
    }

    /// 使用默认别名表和规则集
    pub fn with_defaults(gateway: G, config: C) -> Self {
        Self::new(
            gateway,
            config,
            Box::new(AliasFieldResolver),
            Box::new(RuleSetValidator),
        )
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 批次开始时读取一次现状，之后只做增量登记
    async fn load_snapshot(&self, entity_type: EntityType) -> ImportOutcome<StateSnapshot> {
        let mut snapshot = StateSnapshot::new();

        for &dependency in entity_type.state_dependencies() {
            let keys = self
                .gateway
                .current_state(dependency)
                .await
                .map_err(|e| ImportError::SnapshotUnavailable {
                    entity: dependency.to_string(),
                    message: e.to_string(),
                })?;
            snapshot.load(dependency, keys);
            debug!(entity = %dependency, existing = snapshot.count(dependency), "现状快照已载入");
        }

        Ok(snapshot)
    }

    /// 阶段 0: 读取全部原始行（结构错误在任何行被处理之前暴露）
    fn decode_all(
        &self,
        file_bytes: Vec<u8>,
        format: DeclaredFormat,
        settings: &ImportSettings,
    ) -> ImportOutcome<Vec<RawRow>> {
        let decoder = UniversalDecoder::new(settings.csv_delimiter);
        let rows = decoder
            .decode(file_bytes, format)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 阶段 1-3: 逐行 解析 → 校验 → 提交，严格按文件顺序
    async fn row_loop(
        &self,
        rows: Vec<RawRow>,
        entity_type: EntityType,
        snapshot: &mut StateSnapshot,
        settings: &ImportSettings,
    ) -> ImportResult {
        let mut success_count = 0;
        let mut failed_count = 0;
        let mut errors = Vec::new();

        for (idx, raw) in rows.iter().enumerate() {
            let row_index = idx + 1;
            let canonical = self.field_resolver.resolve(raw, entity_type);

            // 校验上下文只在本行内借用快照，提交成功后再可变登记
            let validated = {
                let ctx = ValidationContext::new(snapshot, settings);
                self.row_validator.validate(&canonical, &ctx, row_index)
            };

            let draft = match validated {
                Ok(draft) => draft,
                Err(rejection) => {
                    debug!(row_index, messages = ?rejection.messages, "行校验未通过");
                    failed_count += 1;
                    errors.push(rejection.to_string());
                    continue;
                }
            };

            match self.gateway.create(&draft).await {
                Ok(created) => {
                    success_count += 1;
                    snapshot.register(&created);
                }
                Err(e) => {
                    warn!(row_index, key = draft.unique_key(), error = %e, "提交失败");
                    failed_count += 1;
                    errors.push(format!("Row {}: {}", row_index, COMMIT_FAILED_MESSAGE));
                }
            }
        }

        ImportResult::new(success_count, failed_count, errors)
    }
}

#[async_trait]
impl<G, C> BulkImporter for BulkImporterImpl<G, C>
where
    G: RegistryGateway + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, file_bytes), fields(run_id))]
    async fn run_import(
        &self,
        file_bytes: Vec<u8>,
        format: DeclaredFormat,
        entity_type: EntityType,
    ) -> ImportOutcome<ImportResult> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        info!(
            bytes = file_bytes.len(),
            field_schema_version = schema_for(entity_type).version,
            phase = %ImportPhase::Decoding,
            "开始导入运行"
        );

        let settings = self.config.import_settings().await.map_err(|e| {
            error!(phase = %ImportPhase::Aborted, error = %e, "导入配置读取失败");
            ImportError::SettingsUnavailable(e.to_string())
        })?;

        // 本次运行使用的配置快照，随运行日志留存
        let settings_json = serde_json::to_string(&settings).unwrap_or_default();
        debug!(settings = %settings_json, "导入配置已载入");

        // === Decoding ===
        let rows = match self.decode_all(file_bytes, format, &settings) {
            Ok(rows) => rows,
            Err(e) => {
                error!(phase = %ImportPhase::Aborted, error = %e, "文件解码失败，整批中止");
                return Err(e);
            }
        };

        let mut snapshot = match self.load_snapshot(entity_type).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(phase = %ImportPhase::Aborted, error = %e, "现状快照载入失败，整批中止");
                return Err(e);
            }
        };

        // === RowLoop ===
        info!(phase = %ImportPhase::RowLoop, total_rows = rows.len(), "文件解码完成");
        let result = self
            .row_loop(rows, entity_type, &mut snapshot, &settings)
            .await;

        // === Completed ===
        info!(
            phase = %ImportPhase::Completed,
            success = result.success_count(),
            failed = result.failed_count(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "导入运行完成"
        );

        Ok(result)
    }

    #[instrument(skip(self, files), fields(file_count = files.len()))]
    async fn batch_import(
        &self,
        files: Vec<(String, Vec<u8>, DeclaredFormat)>,
        entity_type: EntityType,
    ) -> Vec<(String, ImportOutcome<ImportResult>)> {
        info!("开始批量导入");

        // 文件之间并发；各自持有独立快照和顺序行循环
        let runs = files.into_iter().map(|(name, bytes, format)| async move {
            let outcome = self.run_import(bytes, format, entity_type).await;
            if let Err(e) = &outcome {
                warn!(file = %name, error = %e, "文件导入中止");
            }
            (name, outcome)
        });

        let results = join_all(runs).await;

        let completed = results.iter().filter(|(_, r)| r.is_ok()).count();
        info!(completed, aborted = results.len() - completed, "批量导入完成");

        results
    }
}
