// ==========================================
// 对账单登记控制台 - 表格解码器实现
// ==========================================
// 阶段 0: 文件字节 → 原始行序列
// 支持: CSV (.csv, UTF-8) / Excel (.xlsx/.xls，仅第一个工作表)
// 约定: 第 1 行为表头，不作为数据；完全空白的行静默跳过
// ==========================================

use crate::domain::{DeclaredFormat, RawRow};
use crate::importer::bulk_importer_trait::{RowStream, TabularDecoder};
use crate::importer::error::DecodeError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

fn strip_bom(mut bytes: Vec<u8>) -> Vec<u8> {
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    bytes
}

fn header_is_missing(headers: &[String]) -> bool {
    headers.iter().all(|h| h.is_empty())
}

/// 按表头位置组装原始行；超出表头的列丢弃，缺失的列不出现
fn zip_row<'a, I>(headers: &[String], values: I) -> RawRow
where
    I: IntoIterator<Item = &'a str>,
{
    headers
        .iter()
        .zip(values)
        .map(|(header, value)| (header.clone(), value.trim().to_string()))
        .collect()
}

// ==========================================
// CSV Decoder 实现
// ==========================================
pub struct CsvDecoder {
    delimiter: u8,
}

impl CsvDecoder {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl TabularDecoder for CsvDecoder {
    fn decode(&self, bytes: Vec<u8>) -> Result<RowStream, DecodeError> {
        let bytes = strip_bom(bytes);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .delimiter(self.delimiter)
            .from_reader(Cursor::new(bytes));

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if header_is_missing(&headers) {
            return Err(DecodeError::MissingHeader);
        }

        // 惰性逐行读取
        let rows = reader
            .into_records()
            .filter_map(move |result| match result {
                Ok(record) => {
                    let row = zip_row(&headers, record.iter());
                    // 跳过完全空白的行
                    if row.is_blank() {
                        None
                    } else {
                        Some(Ok(row))
                    }
                }
                Err(e) => Some(Err(DecodeError::from(e))),
            });

        Ok(Box::new(rows))
    }
}

// ==========================================
// Excel Decoder 实现
// ==========================================
pub struct SpreadsheetDecoder;

fn cell_to_string(cell: &Data) -> String {
    cell.to_string().trim().to_string()
}

impl TabularDecoder for SpreadsheetDecoder {
    fn decode(&self, bytes: Vec<u8>) -> Result<RowStream, DecodeError> {
        // 自动识别 xlsx / xls
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        // 只读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(DecodeError::NoWorksheet)?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = rows.next().ok_or(DecodeError::MissingHeader)?;
        let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

        if header_is_missing(&headers) {
            return Err(DecodeError::MissingHeader);
        }

        // 工作表已整体载入内存，这里只做一次性转换
        let records: Vec<RawRow> = rows
            .map(|data_row| {
                let values: Vec<String> = data_row.iter().map(cell_to_string).collect();
                zip_row(&headers, values.iter().map(String::as_str))
            })
            .filter(|row| !row.is_blank())
            .collect();

        Ok(Box::new(records.into_iter().map(Ok)))
    }
}

// ==========================================
// 通用解码器（按声明格式选择）
// ==========================================
pub struct UniversalDecoder {
    csv: CsvDecoder,
}

impl UniversalDecoder {
    pub fn new(csv_delimiter: u8) -> Self {
        Self {
            csv: CsvDecoder::new(csv_delimiter),
        }
    }

    pub fn decode(&self, bytes: Vec<u8>, format: DeclaredFormat) -> Result<RowStream, DecodeError> {
        match format {
            DeclaredFormat::Csv => self.csv.decode(bytes),
            DeclaredFormat::Spreadsheet => SpreadsheetDecoder.decode(bytes),
        }
    }
}

impl Default for UniversalDecoder {
    fn default() -> Self {
        Self::new(b',')
    }
}
