// ==========================================
// 对账单登记控制台 - API层错误类型
// ==========================================
// 职责: 将导入层 / 仓储层的技术错误转换为用户可读的错误消息
// ==========================================

use crate::importer::error::ImportError;
use crate::importer::template::TemplateError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 数据错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 导入错误
    // ==========================================
    /// 结构性错误：文件无法读取，没有任何行被处理
    #[error("could not read file: {0}")]
    FileUnreadable(String),

    /// 行循环开始之前中止（现状 / 配置不可用）
    #[error("导入中止: {0}")]
    ImportAborted(String),

    #[error("模板生成失败: {0}")]
    TemplateError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, key } => {
                ApiError::NotFound(format!("{}(key={})不存在", entity, key))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Decode(decode) => ApiError::FileUnreadable(decode.to_string()),
            other => ApiError::ImportAborted(other.to_string()),
        }
    }
}

impl From<TemplateError> for ApiError {
    fn from(err: TemplateError) -> Self {
        ApiError::TemplateError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::DecodeError;

    #[test]
    fn test_decode_error_becomes_file_unreadable() {
        let api_err: ApiError = ImportError::Decode(DecodeError::MissingHeader).into();

        match &api_err {
            ApiError::FileUnreadable(reason) => assert_eq!(reason, "missing header row"),
            other => panic!("Expected FileUnreadable, got {:?}", other),
        }
        assert_eq!(api_err.to_string(), "could not read file: missing header row");
    }

    #[test]
    fn test_snapshot_error_becomes_aborted() {
        let api_err: ApiError = ImportError::SnapshotUnavailable {
            entity: "branch".to_string(),
            message: "locked".to_string(),
        }
        .into();

        assert!(matches!(api_err, ApiError::ImportAborted(_)));
    }

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "branch".to_string(),
            key: "HYE".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("branch"));
                assert!(msg.contains("HYE"));
            }
            _ => panic!("Expected NotFound"),
        }
    }
}
