//! 翻译流程
//!
//! 一次运行处理一个模板文档：检测源语言，提取结构一次，
//! 然后逐个语言翻译、还原、加入导航并写入目标文件。

// 标准库导入
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

// 第三方crate导入
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

// 本地模块导入
use crate::config::Settings;
use crate::extractor::extract;
use crate::navigator::{add_or_update_language_links, index_document, missing_index_links};
use crate::output_manager::OutputManager;
use crate::restorer::restore;
use crate::stats::{LanguageTiming, RunStats};
use crate::translator::Translator;
use crate::utils::{is_filename_in_namespace, validate_template};

/// 运行结果
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// 检测到的源语言代码
    pub source_language: String,
    /// 源语言是否为新加入语言表的条目
    pub source_language_added: bool,
    /// 成功写入译文的文件
    pub written_files: Vec<PathBuf>,
    /// 因缺少占位标记而跳过的语言
    pub skipped_languages: Vec<String>,
    /// 索引文档中缺失的语言链接
    pub missing_index_links: Vec<String>,
    /// 索引文档名不在前缀的命名空间内
    pub namespace_mismatch: bool,
    pub stats: RunStats,
}

impl RunReport {
    pub fn has_warnings(&self) -> bool {
        self.namespace_mismatch
            || !self.skipped_languages.is_empty()
            || !self.missing_index_links.is_empty()
    }
}

/// 执行完整的翻译流程
///
/// 语言检测失败、正文翻译失败和文件操作失败会中止运行；
/// 标题翻译失败、缺少占位标记和索引链接缺失只记录在报告中。
pub async fn run<T: Translator + ?Sized>(settings: Settings, translator: &T) -> Result<RunReport> {
    let Settings {
        template,
        layout,
        languages,
    } = settings;
    let mut report = RunReport::default();
    let mut manager = OutputManager::new(layout);

    manager.ensure_output_dir()?;

    validate_template(&template, &manager.layout().target_paths(&languages))
        .context("模板文件验证失败")?;

    let read_start = Instant::now();
    let content = fs::read_to_string(&template)
        .with_context(|| format!("读取模板文件失败: {}", template.display()))?;
    report.stats.file_read_time = read_start.elapsed();
    report.stats.input_size = content.len();
    info!("📂 模板文件: {} ({} 字节)", template.display(), content.len());

    let detect_start = Instant::now();
    let source_language = translator
        .detect(&content)
        .await
        .context("源语言检测失败")?
        .trim()
        .to_lowercase();
    report.stats.detection_time = detect_start.elapsed();
    info!("🔍 检测到源语言: {}", source_language);

    let (languages, added) = languages.with_source_language(&source_language);
    if added {
        info!("➕ 源语言 {} 不在语言表中，已自动加入", source_language);
    }
    report.source_language = source_language.clone();
    report.source_language_added = added;

    validate_template(&template, &manager.layout().target_paths(&languages))
        .context("模板文件与目标文件冲突")?;

    let layout = manager.layout().clone();
    if !is_filename_in_namespace(&layout.main_doc, &layout.prefix) {
        warn!(
            "⚠️  索引文档名 {} 不在前缀 {} 的命名空间内",
            layout.main_doc, layout.prefix
        );
        report.namespace_mismatch = true;
    }

    manager.write_index(&index_document(&languages, &layout))?;
    let target_files = manager.prepare_target_files(&languages)?;
    debug!("预写了 {} 个目标文件", target_files.len());

    let extract_start = Instant::now();
    let doc = extract(&content);
    report.stats.extraction_time = extract_start.elapsed();
    report.stats.record_extraction(&doc);
    info!(
        "🔒 提取了 {} 个标题和 {} 个受保护片段",
        doc.headers.len(),
        doc.fragment_count()
    );

    for entry in languages.iter() {
        let code = entry.code.as_str();
        info!("🌐 翻译到 {} ({})", entry.name, code);

        let translate_start = Instant::now();
        let translated = translator
            .translate(&doc.body, &source_language, code)
            .await
            .with_context(|| format!("正文翻译失败: {} → {}", source_language, code))?;
        let translation_time = translate_start.elapsed();

        let restore_start = Instant::now();
        let restored = restore(&translated, &doc, translator, &source_language, code).await;
        let final_content =
            add_or_update_language_links(&restored.text, &languages, &layout, Some(code));
        let restore_time = restore_start.elapsed();
        report.stats.header_fallbacks += restored.fallback_headers.len();

        let write_start = Instant::now();
        let path = layout.target_path(code);
        if manager.insert_translated_content(&path, &final_content)? {
            info!("✅ 已写入: {}", path.display());
        } else {
            report.skipped_languages.push(code.to_string());
        }

        report.stats.languages.push(LanguageTiming {
            code: code.to_string(),
            translation_time,
            restore_time,
            write_time: write_start.elapsed(),
            output_size: final_content.len(),
        });
    }

    let index = manager.read_index()?;
    report.missing_index_links = missing_index_links(&index, &languages, &layout);
    report.written_files = manager.written_files().to_vec();

    info!(
        "🎉 翻译流程完成: {} 个文件已写入, 索引文档 {}",
        report.written_files.len(),
        layout.index_path().display()
    );
    if report.has_warnings() {
        warn!("⚠️  运行完成但存在警告，请检查上面的日志");
    }

    Ok(report)
}
