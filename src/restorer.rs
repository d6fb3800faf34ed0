//! 占位符还原模块
//!
//! 把翻译后的正文中的占位符替换回内容：标题单独翻译并重新生成锚点，
//! 文档内锚点引用改指向新锚点，其余片段按原文放回。

// 第三方crate导入
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

// 本地模块导入
use crate::anchor::generate_anchor;
use crate::fragment::{header_placeholder, ExtractedDocument, Fragment, FragmentKind};
use crate::translator::Translator;

/// 链接 `]` 与 `(` 之间被翻译插入的空白（不跨行）
static LINK_SPACING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\][\s&&[^\r\n]]+\(").expect("链接修复正则表达式无效"));

/// 原样放回的片段类型（锚点单独处理）
const VERBATIM_KINDS: [FragmentKind; 7] = [
    FragmentKind::CodeBlock,
    FragmentKind::Url,
    FragmentKind::Image,
    FragmentKind::Html,
    FragmentKind::InlineCode,
    FragmentKind::Latex,
    FragmentKind::Table,
];

/// 重建后的标题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuiltHeader {
    /// 完整的标题行（含 `#`）
    pub line: String,
    /// 原标题对应的锚点
    pub original_anchor: String,
    /// 译文标题生成的新锚点
    pub anchor: String,
    /// 标题已被其他片段吞入，不参与锚点解析
    pub absorbed: bool,
}

/// 还原结果
#[derive(Debug, Clone, Default)]
pub struct Restored {
    pub text: String,
    /// 翻译失败、退回原文的标题序号
    pub fallback_headers: Vec<usize>,
}

/// 还原翻译后的正文
///
/// 标题翻译失败时该标题退回原文，不中断还原。被片段吞入的标题不翻译，
/// 指向它们的锚点保持原样。
pub async fn restore<T: Translator + ?Sized>(
    translated_body: &str,
    doc: &ExtractedDocument,
    translator: &T,
    source_lang: &str,
    target_lang: &str,
) -> Restored {
    let mut fallback_headers = Vec::new();
    let mut headers = Vec::with_capacity(doc.headers.len());

    for (index, header) in doc.headers.iter().enumerate() {
        let original_anchor = generate_anchor(&doc.expand(&header.text));

        if header.absorbed {
            debug!("标题 '{}' 已被片段吞入，跳过翻译", header.text);
            headers.push(RebuiltHeader {
                line: header.line_with(&header.text),
                anchor: original_anchor.clone(),
                original_anchor,
                absorbed: true,
            });
            continue;
        }

        let translated = match translator
            .translate(&header.text, source_lang, target_lang)
            .await
        {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("⚠️  标题翻译失败，保留原文 '{}': {}", header.text, e);
                fallback_headers.push(index);
                header.text.clone()
            }
        };

        headers.push(RebuiltHeader {
            line: header.line_with(&translated),
            original_anchor,
            anchor: generate_anchor(&doc.expand(&translated)),
            absorbed: false,
        });
    }

    let mut text = translated_body.to_string();

    for (index, header) in headers.iter().enumerate() {
        text = text.replace(&header_placeholder(index), &header.line);
    }

    for fragment in doc.fragments(FragmentKind::Anchor) {
        let anchor = resolve_anchor(fragment, &headers);
        text = text.replace(&fragment.placeholder(), &format!("#{}", anchor));
    }

    text = repair_link_spacing(&text);

    Restored {
        text: doc.expand_kinds(&text, &VERBATIM_KINDS),
        fallback_headers,
    }
}

/// 查找锚点引用对应的标题并返回新锚点，找不到时保留原锚点
pub fn resolve_anchor<'a>(fragment: &'a Fragment, headers: &'a [RebuiltHeader]) -> &'a str {
    let original = fragment.anchor_id().unwrap_or(&fragment.text);

    match headers
        .iter()
        .find(|h| !h.absorbed && h.original_anchor == original)
    {
        Some(header) => header.anchor.as_str(),
        None => {
            debug!("锚点 '#{}' 没有对应的标题，保持不变", original);
            original
        }
    }
}

/// 修复翻译在链接 `]` 和 `(` 之间插入的空白
pub fn repair_link_spacing(text: &str) -> String {
    LINK_SPACING_REGEX.replace_all(text, "](").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::extractor::extract;
    use crate::translate_error;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// 按字典翻译，字典中没有的文本原样返回
    struct DictTranslator {
        entries: HashMap<&'static str, &'static str>,
        failing: Vec<&'static str>,
    }

    impl DictTranslator {
        fn new(entries: &[(&'static str, &'static str)]) -> Self {
            Self {
                entries: entries.iter().copied().collect(),
                failing: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Translator for DictTranslator {
        async fn detect(&self, _text: &str) -> Result<String> {
            Ok("en".to_string())
        }

        async fn translate(&self, text: &str, _source: &str, _target: &str) -> Result<String> {
            if self.failing.iter().any(|f| *f == text) {
                return Err(translate_error!(network, "connection reset"));
            }
            Ok(self.entries.get(text).map(|t| t.to_string()).unwrap_or_else(|| text.to_string()))
        }
    }

    #[tokio::test]
    async fn test_identity_roundtrip() {
        let content = "# Title\n\n```rust\nfn main() {}\n```\n\n## Getting Started\n\n\
                       See [start](#getting-started) and [docs](https://example.com/docs).\n\n\
                       ![logo](img/logo.png) <img src=\"a.png\"/> `code` $E=mc^2$\n\n\
                       $$\n\\int x\n$$\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";
        let doc = extract(content);
        let translator = DictTranslator::new(&[]);

        let restored = restore(&doc.body, &doc, &translator, "en", "en").await;
        assert_eq!(restored.text, content);
        assert!(restored.fallback_headers.is_empty());
    }

    #[tokio::test]
    async fn test_anchor_resolution() {
        let content = "## Getting Started\n\n[a](#getting-started) [b](#unrelated-external-anchor)";
        let doc = extract(content);
        let translator = DictTranslator::new(&[("Getting Started", "Empezando")]);

        let restored = restore(&doc.body, &doc, &translator, "en", "es").await;
        assert_eq!(
            restored.text,
            "## Empezando\n\n[a](#empezando) [b](#unrelated-external-anchor)"
        );
    }

    #[tokio::test]
    async fn test_absorbed_header_keeps_its_anchor() {
        let content = "It costs $5\n## Pricing\nor $6. See [p](#pricing).";
        let doc = extract(content);
        let mut translator = DictTranslator::new(&[("Pricing", "Precios")]);
        // 被吞入的标题不应再请求翻译
        translator.failing.push("Pricing");

        let restored = restore(&doc.body, &doc, &translator, "en", "es").await;
        assert_eq!(restored.text, content);
        assert!(restored.fallback_headers.is_empty());
    }

    #[tokio::test]
    async fn test_absorbed_header_does_not_shadow_live_header() {
        let content = "<div\n## Plans\n>\n\n## Plans\n\n[x](#plans)";
        let doc = extract(content);
        assert!(doc.headers[0].absorbed);
        let translator = DictTranslator::new(&[("Plans", "Planes")]);

        let restored = restore(&doc.body, &doc, &translator, "en", "es").await;
        assert_eq!(restored.text, "<div\n## Plans\n>\n\n## Planes\n\n[x](#planes)");
    }

    #[tokio::test]
    async fn test_placeholder_text_inside_code_block_survives() {
        let content = "```\nuse @HTML_0@ here\n```\nline<br>";
        let doc = extract(content);
        assert_eq!(doc.body, "@CODE_BLOCK_0@\nline@HTML_0@");

        let restored = restore(&doc.body, &doc, &DictTranslator::new(&[]), "en", "de").await;
        assert_eq!(restored.text, content);
    }

    #[tokio::test]
    async fn test_header_translation_failure_falls_back() {
        let doc = extract("# Intro\n\n## Usage\n");
        let mut translator = DictTranslator::new(&[("Intro", "Einleitung"), ("Usage", "Nutzung")]);
        translator.failing.push("Usage");

        let restored = restore(&doc.body, &doc, &translator, "en", "de").await;
        assert_eq!(restored.text, "# Einleitung\n\n## Usage\n");
        assert_eq!(restored.fallback_headers, vec![1]);
    }

    #[tokio::test]
    async fn test_translated_header_is_trimmed() {
        let doc = extract("### Setup\n");
        let translator = DictTranslator::new(&[("Setup", "  Einrichtung \n")]);

        let restored = restore(&doc.body, &doc, &translator, "en", "de").await;
        assert_eq!(restored.text, "### Einrichtung\n");
    }

    #[tokio::test]
    async fn test_link_repair_after_translation() {
        let doc = extract("[text](http://x)");
        let translated = doc.body.replace("](", "] (");
        assert_eq!(translated, "[text] (@URL_PLACEHOLDER_0@)");

        let restored = restore(&translated, &doc, &DictTranslator::new(&[]), "en", "fr").await;
        assert_eq!(restored.text, "[text](http://x)");
    }

    #[test]
    fn test_repair_link_spacing() {
        assert_eq!(repair_link_spacing("[text] (http://x)"), "[text](http://x)");
        assert_eq!(repair_link_spacing("[a]\u{a0}\t(b)"), "[a](b)");
        assert_eq!(repair_link_spacing("[a]\n(b)"), "[a]\n(b)");
    }

    #[tokio::test]
    async fn test_code_block_not_repaired() {
        let content = "```\nlet x = arr[0] (y);\n```";
        let doc = extract(content);
        let restored = restore(&doc.body, &doc, &DictTranslator::new(&[]), "en", "de").await;
        assert_eq!(restored.text, content);
    }

    #[test]
    fn test_resolve_anchor_without_headers() {
        let fragment = Fragment {
            kind: FragmentKind::Anchor,
            index: 0,
            text: "#elsewhere".to_string(),
        };
        assert_eq!(resolve_anchor(&fragment, &[]), "elsewhere");

        let absorbed = RebuiltHeader {
            line: "## Elsewhere".to_string(),
            original_anchor: "elsewhere".to_string(),
            anchor: "anderswo".to_string(),
            absorbed: true,
        };
        assert_eq!(resolve_anchor(&fragment, &[absorbed]), "elsewhere");
    }
}
