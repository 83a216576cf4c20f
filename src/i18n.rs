// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库，支持英文（默认）和中文
// 所有翻译显式传入语言代码，不修改全局 locale
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "en";

/// 支持的语言列表
pub fn available_locales() -> Vec<&'static str> {
    rust_i18n::available_locales!()
}

/// 将请求的语言代码归一为受支持的语言，不支持时回退到默认语言
pub fn resolve_locale(requested: &str) -> &'static str {
    let requested = requested.trim();
    available_locales()
        .into_iter()
        .find(|l| l.eq_ignore_ascii_case(requested))
        .unwrap_or(DEFAULT_LOCALE)
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use statement_registry::i18n::t;
/// let msg = t("en", "report.title");
/// ```
pub fn t(locale: &str, key: &str) -> String {
    rust_i18n::t!(key, locale = resolve_locale(locale)).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use statement_registry::i18n::t_with_args;
/// let msg = t_with_args("en", "report.success", &[("count", "3")]);
/// ```
pub fn t_with_args(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = t(locale, key);
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_locale() {
        assert_eq!(resolve_locale("en"), "en");
        assert_eq!(resolve_locale("zh-cn"), "zh-CN");
        assert_eq!(resolve_locale("fr"), DEFAULT_LOCALE);
    }

    #[test]
    fn test_translate_simple() {
        assert_eq!(t("en", "report.title"), "Upload Results");
        assert_eq!(t("zh-CN", "report.title"), "上传结果");
    }

    #[test]
    fn test_translate_with_args() {
        let msg = t_with_args("en", "report.success", &[("count", "3")]);
        assert_eq!(msg, "Successfully processed: 3");

        let msg = t_with_args("zh-CN", "report.aborted", &[("reason", "missing header row")]);
        assert!(msg.contains("missing header row"));
        assert!(msg.contains("无法读取文件"));
    }

    #[test]
    fn test_unknown_locale_falls_back() {
        assert_eq!(t("de", "report.failed"), "Failed: %{count}");
    }
}
