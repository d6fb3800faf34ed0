//! 语言导航模块
//!
//! 在每个译文文档中维护由标记包围的语言导航块，并生成索引文档。

// 第三方crate导入
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use tracing::{debug, warn};

// 本地模块导入
use crate::api_constants::markers;
use crate::config::{LanguageEntry, LanguageTable, OutputLayout};

/// 匹配已有的导航块（含起止标记）
static LANGUAGE_LINKS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?s){}.*?{}",
        regex::escape(markers::LANGUAGE_LINKS_START),
        regex::escape(markers::LANGUAGE_LINKS_END)
    ))
    .expect("导航块正则表达式无效")
});

/// 某语言的导航链接: `[国旗 名称](前缀代码.md)`
pub fn language_link(entry: &LanguageEntry, layout: &OutputLayout) -> String {
    format!("[{}]({})", entry.label(), layout.file_name(&entry.code))
}

/// 当前语言显示为不可点击的灰色文字
fn current_language_label(entry: &LanguageEntry) -> String {
    format!("<span style=\"color: grey;\">{}</span>", entry.label())
}

/// 生成导航块
///
/// 按语言代码排序，`current` 对应的语言不生成链接。
pub fn language_links_block(
    languages: &LanguageTable,
    layout: &OutputLayout,
    current: Option<&str>,
) -> String {
    let links = languages
        .iter()
        .map(|entry| {
            if current == Some(entry.code.as_str()) {
                current_language_label(entry)
            } else {
                language_link(entry, layout)
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");

    format!(
        "{}\n{}\n{}",
        markers::LANGUAGE_LINKS_START,
        links,
        markers::LANGUAGE_LINKS_END
    )
}

/// 更新文档中的导航块，不存在时插入到文档开头
pub fn add_or_update_language_links(
    content: &str,
    languages: &LanguageTable,
    layout: &OutputLayout,
    current: Option<&str>,
) -> String {
    let block = language_links_block(languages, layout, current);

    if LANGUAGE_LINKS_REGEX.is_match(content) {
        debug!("替换已有的语言导航块");
        LANGUAGE_LINKS_REGEX
            .replace_all(content, NoExpand(&block))
            .into_owned()
    } else {
        format!("{}\n\n{}", block, content)
    }
}

/// 生成索引文档内容
pub fn index_document(languages: &LanguageTable, layout: &OutputLayout) -> String {
    format!(
        "# Documentation\n\n\
         This document is available in the following languages:\n\n\
         {}\n\n\
         Please choose your preferred language by clicking on the links above.",
        language_links_block(languages, layout, None)
    )
}

/// 检查索引文档中缺少的语言链接，返回缺失的语言代码
pub fn missing_index_links(
    index_content: &str,
    languages: &LanguageTable,
    layout: &OutputLayout,
) -> Vec<String> {
    let missing = languages
        .iter()
        .filter(|entry| !index_content.contains(&language_link(entry, layout)))
        .map(|entry| entry.code.clone())
        .collect::<Vec<_>>();

    for code in &missing {
        warn!("⚠️  索引文档 {} 中缺少语言链接: {}", layout.main_doc, code);
    }

    missing
}
