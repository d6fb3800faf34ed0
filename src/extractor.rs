//! Markdown结构提取模块
//!
//! 按固定顺序运行九个保护阶段，把不应被翻译的Markdown结构替换为占位符：
//! 代码块 → 锚点 → 标题 → URL → 图片 → HTML标签 → 行内代码 → LaTeX → 表格。
//! 前面的阶段已经把匹配内容换成了不透明的占位符，后面的阶段无法再匹配到其内部。

// 第三方crate导入
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

// 本地模块导入
use crate::fragment::{contains_placeholder, ExtractedDocument, FragmentKind};

static CODE_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```.*?```").expect("代码块正则表达式无效"));

static ANCHOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(#([^)]+)\)").expect("锚点正则表达式无效"));

static HEADER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mR)^(#{1,6})[ \t]+(.+)$").expect("标题正则表达式无效"));

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((https?://[^\s)]+)\)").expect("URL正则表达式无效"));

static IMAGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[.*?\]\(.*?\)").expect("图片正则表达式无效"));

static HTML_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("HTML正则表达式无效"));

static INLINE_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`[^`]+`").expect("行内代码正则表达式无效"));

static LATEX_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\$\$.*?\$\$|\$.*?\$").expect("LaTeX正则表达式无效"));

static TABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\|[^\n]*\|[ \t]*\r?$(?:\n\|[^\n]*\|[ \t]*\r?$)*")
        .expect("表格正则表达式无效")
});

/// 保护阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectStage {
    CodeBlocks,
    Anchors,
    Headers,
    Urls,
    Images,
    HtmlTags,
    InlineCode,
    Latex,
    Tables,
}

/// 保护阶段的执行顺序，不可调整
pub const STAGE_ORDER: [ProtectStage; 9] = [
    ProtectStage::CodeBlocks,
    ProtectStage::Anchors,
    ProtectStage::Headers,
    ProtectStage::Urls,
    ProtectStage::Images,
    ProtectStage::HtmlTags,
    ProtectStage::InlineCode,
    ProtectStage::Latex,
    ProtectStage::Tables,
];

impl ProtectStage {
    fn pattern(self) -> &'static Regex {
        match self {
            ProtectStage::CodeBlocks => &CODE_BLOCK_REGEX,
            ProtectStage::Anchors => &ANCHOR_REGEX,
            ProtectStage::Headers => &HEADER_REGEX,
            ProtectStage::Urls => &URL_REGEX,
            ProtectStage::Images => &IMAGE_REGEX,
            ProtectStage::HtmlTags => &HTML_REGEX,
            ProtectStage::InlineCode => &INLINE_CODE_REGEX,
            ProtectStage::Latex => &LATEX_REGEX,
            ProtectStage::Tables => &TABLE_REGEX,
        }
    }

    /// 该阶段产生的片段类型，标题阶段产生标题记录而非片段
    pub fn fragment_kind(self) -> Option<FragmentKind> {
        match self {
            ProtectStage::CodeBlocks => Some(FragmentKind::CodeBlock),
            ProtectStage::Anchors => Some(FragmentKind::Anchor),
            ProtectStage::Headers => None,
            ProtectStage::Urls => Some(FragmentKind::Url),
            ProtectStage::Images => Some(FragmentKind::Image),
            ProtectStage::HtmlTags => Some(FragmentKind::Html),
            ProtectStage::InlineCode => Some(FragmentKind::InlineCode),
            ProtectStage::Latex => Some(FragmentKind::Latex),
            ProtectStage::Tables => Some(FragmentKind::Table),
        }
    }

    /// 在 `text` 上运行该阶段，把捕获内容记录进 `doc`，返回替换后的文本
    ///
    /// 捕获范围内若包含前面阶段的占位符，会先展开为原文再保存，
    /// 因此任何片段的原文中都不会出现其他片段的占位符。被吞入的标题会被标记。
    pub fn protect(self, text: &str, doc: &mut ExtractedDocument) -> String {
        self.pattern()
            .replace_all(text, |caps: &Captures| match self {
                ProtectStage::Headers => {
                    let level = caps[1].len();
                    doc.push_header(level, caps[2].to_string())
                }
                ProtectStage::Anchors => {
                    let source = doc.absorb(&format!("#{}", &caps[1]));
                    format!("({})", doc.push_fragment(FragmentKind::Anchor, source))
                }
                ProtectStage::Urls => {
                    let source = doc.absorb(&caps[1]);
                    format!("({})", doc.push_fragment(FragmentKind::Url, source))
                }
                _ => {
                    let source = doc.absorb(&caps[0]);
                    match self.fragment_kind() {
                        Some(kind) => doc.push_fragment(kind, source),
                        None => source,
                    }
                }
            })
            .into_owned()
    }
}

/// 提取Markdown中的受保护结构
///
/// 返回带占位符的正文，以及按类型分组的片段和按文档顺序排列的标题记录。
pub fn extract(content: &str) -> ExtractedDocument {
    if contains_placeholder(content) {
        warn!("⚠️  源文档中已包含形如占位符的文本，还原时可能被替换");
    }

    let mut doc = ExtractedDocument::default();
    let mut text = content.to_string();

    for stage in STAGE_ORDER {
        let before = doc.fragment_count() + doc.headers.len();
        text = stage.protect(&text, &mut doc);
        let captured = doc.fragment_count() + doc.headers.len() - before;
        if captured > 0 {
            debug!("🔒 {:?}: 保护了 {} 处内容", stage, captured);
        }
    }

    doc.body = text;
    doc
}
