// ==========================================
// 对账单登记控制台 - 数据清洗器实现
// ==========================================
// 职责: TRIM / UPPER / LOWER / 空白折叠 / NULL 标准化
// 说明: 纯函数，输入不被修改，返回新值
// ==========================================

pub struct DataCleaner;

impl DataCleaner {
    pub fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    pub fn clean_lowercase(&self, value: &str) -> String {
        value.trim().to_lowercase()
    }

    /// 折叠内部连续空白为单个空格（用于姓名 / 网点名称）
    pub fn collapse_whitespace(&self, value: &str) -> String {
        value.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// 去除所有空白（账号 / 证件号）
    pub fn strip_whitespace(&self, value: &str) -> String {
        value.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// 电话号码: 去除空格、连字符、点号和括号，保留前导 '+'
    pub fn clean_phone_number(&self, value: &str) -> String {
        value
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')'))
            .collect()
    }

    /// 空字符串 / 空白 → None
    pub fn normalize_null(&self, value: String) -> Option<String> {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }
}
