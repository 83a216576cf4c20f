// ==========================================
// 对账单登记控制台 - 批量导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 解码 → 字段解析 → 行校验 → 提交
// ==========================================

use crate::domain::{
    CanonicalRow, DeclaredFormat, EntityDraft, EntityType, ImportResult, RawRow, ValidationError,
};
use crate::importer::error::{DecodeError, ImportOutcome};
use crate::importer::row_validator::ValidationContext;
use async_trait::async_trait;

/// 单次遍历、按文件顺序产出的原始行序列
pub type RowStream = Box<dyn Iterator<Item = Result<RawRow, DecodeError>> + Send>;

// ==========================================
// BulkImporter Trait
// ==========================================
// 用途: 批量导入主接口
// 实现者: BulkImporterImpl
#[async_trait]
pub trait BulkImporter: Send + Sync {
    /// 执行一次导入运行
    ///
    /// # 参数
    /// - file_bytes: 上传文件内容
    /// - format: 声明的文件格式
    /// - entity_type: 导入目标实体
    ///
    /// # 返回
    /// - Ok(ImportResult): 每一行都计入成功或失败
    /// - Err(ImportError): 文件结构错误等，整批中止，没有任何行被处理
    ///
    /// # 导入流程
    /// 1. Decoding: 读取全部原始行（结构错误在此暴露）
    /// 2. RowLoop: 逐行 解析 → 校验 → 提交，严格按文件顺序
    /// 3. Completed: 返回结果汇总
    async fn run_import(
        &self,
        file_bytes: Vec<u8>,
        format: DeclaredFormat,
        entity_type: EntityType,
    ) -> ImportOutcome<ImportResult>;

    /// 批量导入多个文件（文件之间并发，文件内部严格顺序）
    ///
    /// # 说明
    /// - 每个文件是独立的导入运行，拥有各自的现状快照
    /// - 某个文件失败不影响其他文件
    async fn batch_import(
        &self,
        files: Vec<(String, Vec<u8>, DeclaredFormat)>,
        entity_type: EntityType,
    ) -> Vec<(String, ImportOutcome<ImportResult>)>;
}

// ==========================================
// TabularDecoder Trait
// ==========================================
// 用途: 文件解码接口（阶段 0）
// 实现者: CsvDecoder, SpreadsheetDecoder
pub trait TabularDecoder: Send + Sync {
    /// 解码文件字节为原始行序列
    ///
    /// 表头缺失 / 编码错误 / 压缩包损坏 → DecodeError
    fn decode(&self, bytes: Vec<u8>) -> Result<RowStream, DecodeError>;
}

// ==========================================
// FieldResolver Trait
// ==========================================
// 用途: 列名别名 → 标准字段（阶段 1）
// 实现者: AliasFieldResolver
pub trait FieldResolver: Send + Sync {
    /// 将原始行映射为标准字段行；缺失字段解析为空字符串，不报错
    fn resolve(&self, row: &RawRow, entity_type: EntityType) -> CanonicalRow;
}

// ==========================================
// RowValidator Trait
// ==========================================
// 用途: 行级校验（阶段 2）
// 实现者: RuleSetValidator
pub trait RowValidator: Send + Sync {
    /// 校验标准行
    ///
    /// # 参数
    /// - row: 标准字段行（不会被修改）
    /// - ctx: 当前系统现状 + 本次运行配置（只读）
    /// - row_index: 行号（从 1 开始）
    ///
    /// # 返回
    /// - Ok(EntityDraft): 规范化后的待提交草稿
    /// - Err(ValidationError): 按规则顺序排列的错误信息
    fn validate(
        &self,
        row: &CanonicalRow,
        ctx: &ValidationContext<'_>,
        row_index: usize,
    ) -> Result<EntityDraft, ValidationError>;
}
