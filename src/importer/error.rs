// ==========================================
// 对账单登记控制台 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 这里只有"结构性"错误（整批中止）
//       行级错误是数据，写入 ImportResult.errors，不经过这里
// ==========================================

use thiserror::Error;

/// 解码错误：文件无法按声明格式读取，整批中止
#[derive(Error, Debug)]
pub enum DecodeError {
    // ===== 文件相关错误 =====
    #[error("unsupported file format: {0} (only .csv / .xlsx / .xls are accepted)")]
    UnsupportedFormat(String),

    #[error("CSV parse failed: {0}")]
    Csv(String),

    #[error("file is not valid UTF-8 text: {0}")]
    Encoding(String),

    #[error("spreadsheet parse failed: {0}")]
    Spreadsheet(String),

    #[error("workbook contains no worksheet")]
    NoWorksheet,

    // ===== 表头错误 =====
    #[error("missing header row")]
    MissingHeader,
}

// 实现 From<csv::Error>
impl From<csv::Error> for DecodeError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Utf8 { .. } => DecodeError::Encoding(err.to_string()),
            _ => DecodeError::Csv(err.to_string()),
        }
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for DecodeError {
    fn from(err: calamine::Error) -> Self {
        DecodeError::Spreadsheet(err.to_string())
    }
}

/// 导入运行错误：行循环开始之前就失败，不产生 ImportResult
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("could not read file: {0}")]
    Decode(#[from] DecodeError),

    #[error("could not load current {entity} state: {message}")]
    SnapshotUnavailable { entity: String, message: String },

    #[error("could not load import settings: {0}")]
    SettingsUnavailable(String),
}

/// Result 类型别名
pub type ImportOutcome<T> = Result<T, ImportError>;
