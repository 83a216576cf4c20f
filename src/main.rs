// ==========================================
// 对账单登记控制台 - 命令行入口
// ==========================================
// 用法:
//   statement-registry import <branch|issuer|registration> <file>... [--db <db_path>]
//   statement-registry template <branch|issuer|registration> <csv|xlsx> [out_dir] [--db <db_path>]
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use statement_registry::api::{ApiError, ApiResult, ImportApi};
use statement_registry::db::get_default_db_path;
use statement_registry::domain::{DeclaredFormat, EntityType, ImportResult};
use statement_registry::i18n::{t, t_with_args};
use statement_registry::importer::report::{render_result, render_run_aborted, render_unreadable};
use statement_registry::logging;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", t("en", "cli.usage"));
        std::process::exit(2);
    };

    match command.as_str() {
        "import" => run_import(&args[1..]).await,
        "template" => run_template(&args[1..]).await,
        _ => {
            eprintln!("{}", t("en", "cli.usage"));
            std::process::exit(2);
        }
    }
}

/// 拆分 `--db <path>` 与位置参数
fn split_db_flag(args: &[String]) -> Result<(Option<String>, Vec<String>)> {
    let mut db_path = None;
    let mut positional = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--db" {
            let value = iter.next().ok_or_else(|| anyhow!("--db requires a path"))?;
            db_path = Some(value.clone());
        } else {
            positional.push(arg.clone());
        }
    }

    Ok((db_path, positional))
}

async fn run_import(args: &[String]) -> Result<()> {
    let (db_path, positional) = split_db_flag(args)?;
    let [entity, files @ ..] = positional.as_slice() else {
        bail!("{}", t("en", "cli.usage"));
    };
    if files.is_empty() {
        bail!("{}", t("en", "cli.usage"));
    }

    let entity_type: EntityType = entity.parse().map_err(|e: String| anyhow!(e))?;
    let db_path = db_path.unwrap_or_else(get_default_db_path);
    tracing::info!(db_path = %db_path, "使用数据库");

    let api = ImportApi::new(&db_path).context("无法打开登记数据库")?;
    let locale = api.report_locale().await?;

    let paths: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();
    let outcomes = if paths.len() == 1 {
        vec![(
            paths[0].display().to_string(),
            api.import_file(&paths[0], entity_type).await,
        )]
    } else {
        api.import_files(&paths, entity_type).await
    };

    let mut any_aborted = false;
    for (name, outcome) in outcomes {
        if paths.len() > 1 {
            println!("{}", t_with_args(&locale, "report.batch_file", &[("name", &name)]));
        }
        let (text, aborted) = render_file_outcome(&outcome, &locale);
        println!("{}", text);
        any_aborted |= aborted;
    }

    if any_aborted {
        std::process::exit(1);
    }
    Ok(())
}

/// 渲染单个文件的导入结果；第二个返回值表示该文件是否中止
///
/// 一个文件中止不影响其他文件的报告输出
fn render_file_outcome(outcome: &ApiResult<ImportResult>, locale: &str) -> (String, bool) {
    match outcome {
        Ok(result) => (render_result(result, locale), false),
        Err(ApiError::FileUnreadable(reason)) => (render_unreadable(reason, locale), true),
        Err(ApiError::ImportAborted(reason)) => (render_run_aborted(reason, locale), true),
        Err(other) => (render_run_aborted(&other.to_string(), locale), true),
    }
}

async fn run_template(args: &[String]) -> Result<()> {
    let (db_path, positional) = split_db_flag(args)?;
    let (entity, format, out_dir) = match positional.as_slice() {
        [entity, format] => (entity, format, PathBuf::from(".")),
        [entity, format, out_dir] => (entity, format, PathBuf::from(out_dir)),
        _ => bail!("{}", t("en", "cli.usage")),
    };

    let entity_type: EntityType = entity.parse().map_err(|e: String| anyhow!(e))?;
    let format: DeclaredFormat = format.parse().map_err(|e: String| anyhow!(e))?;

    let db_path = db_path.unwrap_or_else(get_default_db_path);
    let api = ImportApi::new(&db_path).context("无法打开登记数据库")?;
    let locale = api.report_locale().await?;

    let template = api.generate_template(entity_type, format).await?;
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("无法创建输出目录: {}", out_dir.display()))?;
    let out_path = out_dir.join(&template.file_name);
    std::fs::write(&out_path, &template.bytes)
        .with_context(|| format!("无法写入模板: {}", out_path.display()))?;

    println!(
        "{}",
        t_with_args(
            &locale,
            "cli.template_written",
            &[("path", &out_path.display().to_string())]
        )
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use statement_registry::importer::ImportError;

    #[test]
    fn test_aborted_run_reported_and_flagged() {
        let outcome: ApiResult<ImportResult> = Err(ImportError::SnapshotUnavailable {
            entity: "branch".to_string(),
            message: "database locked".to_string(),
        }
        .into());

        let (text, aborted) = render_file_outcome(&outcome, "en");

        assert!(aborted);
        assert_eq!(
            text,
            "Import aborted: could not load current branch state: database locked"
        );
    }

    #[test]
    fn test_unreadable_file_reported_and_flagged() {
        let outcome: ApiResult<ImportResult> = Err(ApiError::FileUnreadable("missing header row".to_string()));

        let (text, aborted) = render_file_outcome(&outcome, "en");

        assert!(aborted);
        assert_eq!(text, "Could not read file: missing header row");
    }

    #[test]
    fn test_split_db_flag() {
        let args: Vec<String> = ["branch", "--db", "/tmp/r.db", "a.csv", "b.csv"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let (db_path, positional) = split_db_flag(&args).unwrap();

        assert_eq!(db_path.as_deref(), Some("/tmp/r.db"));
        assert_eq!(positional, vec!["branch", "a.csv", "b.csv"]);
    }
}
