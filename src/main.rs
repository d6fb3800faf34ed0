use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;
use tracing::{error, info, warn};

use translate_md::config::{Cli, Settings};
use translate_md::pipeline::{self, RunReport};
use translate_md::stats::{format_duration, print_performance_stats};
use translate_md::translator::build_translator;
use translate_md::utils::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志系统
    init_logging(cli.verbose, cli.quiet);

    // 开始性能计时
    let total_start = Instant::now();

    match translate(&cli).await {
        Ok(report) => {
            let total_duration = total_start.elapsed();

            info!(
                "✅ 翻译完成！源语言 {}，共 {} 个语言，总耗时: {}",
                report.source_language,
                report.stats.languages.len(),
                format_duration(total_duration)
            );
            if !report.skipped_languages.is_empty() {
                warn!("⚠️  以下语言未写入译文: {}", report.skipped_languages.join(", "));
            }

            // 显示性能统计
            if cli.stats {
                print_performance_stats(&report.stats, total_duration);
            }
        }
        Err(e) => {
            error!("❌ 翻译失败: {:#}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// 解析配置、创建翻译器并执行翻译流程
async fn translate(cli: &Cli) -> Result<RunReport> {
    let settings = Settings::resolve(cli).context("加载配置失败")?;
    let api_url = cli.api_url()?;

    info!("🚀 启动Markdown翻译");
    info!("📂 模板文件: {}", settings.template.display());
    info!("📁 输出目录: {}", settings.layout.output_dir.display());
    info!(
        "🌐 目标语言: {}",
        settings.languages.codes().collect::<Vec<_>>().join(", ")
    );
    info!("🔗 翻译服务: {:?} ({})", cli.backend, api_url);

    let translator = build_translator(cli.backend, &api_url, cli.timeout)
        .context("翻译器初始化失败")?;

    pipeline::run(settings, translator.as_ref()).await
}
