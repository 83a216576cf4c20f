// ==========================================
// 对账单登记控制台 - 导入模板生成
// ==========================================
// 职责: 按实体类型生成下载模板（主列名表头 + 一行示例数据）
// 约定: 模板回灌到解码 → 字段解析 → 校验后，示例行零错误
//       （签发人模板引用网点 KGL，需先导入网点模板）
// ==========================================

use crate::domain::{DeclaredFormat, EntityType};
use crate::importer::field_mapper::schema_for;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("csv error: {0}")]
    Csv(String),

    #[error("xlsx error: {0}")]
    Xlsx(#[from] XlsxError),
}

impl From<csv::Error> for TemplateError {
    fn from(err: csv::Error) -> Self {
        TemplateError::Csv(err.to_string())
    }
}

/// 生成的模板文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFile {
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// 示例行（与字段表顺序一致）
pub fn example_row(entity_type: EntityType) -> &'static [&'static str] {
    match entity_type {
        EntityType::Branch => &["KGL", "Kigali Main Branch"],
        EntityType::Issuer => &["jdoe", "KGL"],
        EntityType::Registration => &[
            "4001234567",
            "John Doe",
            "0788123456",
            "john.doe@example.com",
            "1199080012345678",
        ],
    }
}

fn file_stem(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Branch => "branch_template",
        EntityType::Issuer => "issuer_template",
        EntityType::Registration => "bulk_registration_template",
    }
}

fn sheet_name(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Branch => "Branches",
        EntityType::Issuer => "Issuers",
        EntityType::Registration => "Registrations",
    }
}

/// 生成模板
///
/// # 参数
/// - entity_type: 目标实体
/// - format: 模板格式（csv / xlsx）
/// - csv_delimiter: CSV 分隔符（与导入配置一致）
pub fn generate_template(
    entity_type: EntityType,
    format: DeclaredFormat,
    csv_delimiter: u8,
) -> Result<TemplateFile, TemplateError> {
    let headers = schema_for(entity_type).header_labels();
    let example = example_row(entity_type);

    let bytes = match format {
        DeclaredFormat::Csv => csv_bytes(&headers, example, csv_delimiter)?,
        DeclaredFormat::Spreadsheet => xlsx_bytes(sheet_name(entity_type), &headers, example)?,
    };

    tracing::debug!(
        entity_type = %entity_type,
        format = %format,
        size = bytes.len(),
        "模板已生成"
    );

    Ok(TemplateFile {
        file_name: format!("{}.{}", file_stem(entity_type), format.template_extension()),
        mime_type: format.mime_type().to_string(),
        bytes,
    })
}

fn csv_bytes(headers: &[&str], example: &[&str], delimiter: u8) -> Result<Vec<u8>, TemplateError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    writer.write_record(example)?;

    writer
        .into_inner()
        .map_err(|e| TemplateError::Csv(e.to_string()))
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, format)?;
    }
    Ok(())
}

fn xlsx_bytes(name: &str, headers: &[&str], example: &[&str]) -> Result<Vec<u8>, TemplateError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        write_headers(sheet, headers, &header_format)?;

        // 全部按文本写入，避免账号 / 电话被转成数字
        for (col, value) in example.iter().enumerate() {
            sheet.write_string(1, col as u16, *value)?;
            sheet.set_column_width(col as u16, 22)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}
