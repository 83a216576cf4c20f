// ==========================================
// 对账单登记控制台 - 导入结果展示
// ==========================================
// 展示约定:
// - 成功数 / 失败数始终显示
// - 错误列表仅在非空时显示，保持原始行顺序
// - 结构性错误只显示"无法读取文件"，不显示计数
// - 现状 / 配置读取失败显示"导入中止"，与文件无法读取区分
// ==========================================

use crate::domain::ImportResult;
use crate::i18n::{t, t_with_args};

/// 渲染完整导入结果
pub fn render_result(result: &ImportResult, locale: &str) -> String {
    let mut lines = vec![
        t(locale, "report.title"),
        t_with_args(
            locale,
            "report.success",
            &[("count", &result.success_count().to_string())],
        ),
        t_with_args(
            locale,
            "report.failed",
            &[("count", &result.failed_count().to_string())],
        ),
    ];

    if !result.errors().is_empty() {
        lines.push(t(locale, "report.errors"));
        lines.extend(result.errors().iter().map(|e| format!("  {}", e)));
    }

    lines.join("\n")
}

/// 文件无法读取（结构性错误），不显示计数
pub fn render_unreadable(reason: &str, locale: &str) -> String {
    t_with_args(locale, "report.aborted", &[("reason", reason)])
}

/// 运行在行循环之前中止（现状 / 配置不可用），文件本身可读
pub fn render_run_aborted(reason: &str, locale: &str) -> String {
    t_with_args(locale, "report.run_aborted", &[("reason", reason)])
}
