//! 受保护片段的数据模型
//!
//! 提取阶段把Markdown结构替换为占位符，这里定义片段、标题记录、
//! 占位符格式以及把占位符展开回原文的逻辑。

// 标准库导入
use std::collections::BTreeMap;

// 第三方crate导入
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// 标题占位符的类型标签
pub const HEADER_TAG: &str = "HEADER_PLACEHOLDER";

/// 匹配本工具生成的所有占位符
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"@(CODE_BLOCK|ANCHOR|HEADER_PLACEHOLDER|URL_PLACEHOLDER|IMAGE|HTML|INLINE_CODE|LATEX|TABLE)_(\d+)@",
    )
    .expect("占位符正则表达式无效")
});

/// 片段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FragmentKind {
    /// 围栏代码块
    CodeBlock,
    /// 文档内锚点引用 `(#id)`
    Anchor,
    /// 括号中的绝对URL
    Url,
    /// Markdown图片
    Image,
    /// HTML标签
    Html,
    /// 行内代码
    InlineCode,
    /// LaTeX公式
    Latex,
    /// 表格
    Table,
}

impl FragmentKind {
    /// 所有片段类型
    pub const ALL: [FragmentKind; 8] = [
        FragmentKind::CodeBlock,
        FragmentKind::Anchor,
        FragmentKind::Url,
        FragmentKind::Image,
        FragmentKind::Html,
        FragmentKind::InlineCode,
        FragmentKind::Latex,
        FragmentKind::Table,
    ];

    /// 占位符中使用的类型标签
    pub fn tag(self) -> &'static str {
        match self {
            FragmentKind::CodeBlock => "CODE_BLOCK",
            FragmentKind::Anchor => "ANCHOR",
            FragmentKind::Url => "URL_PLACEHOLDER",
            FragmentKind::Image => "IMAGE",
            FragmentKind::Html => "HTML",
            FragmentKind::InlineCode => "INLINE_CODE",
            FragmentKind::Latex => "LATEX",
            FragmentKind::Table => "TABLE",
        }
    }

    /// 根据类型标签还原片段类型
    pub fn from_tag(tag: &str) -> Option<Self> {
        FragmentKind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// 生成该类型第 `index` 个片段的占位符
    pub fn placeholder(self, index: usize) -> String {
        format!("@{}_{}@", self.tag(), index)
    }
}

/// 生成第 `index` 个标题的占位符
pub fn header_placeholder(index: usize) -> String {
    format!("@{}_{}@", HEADER_TAG, index)
}

/// 被提取的结构片段
///
/// `text` 是占位符在文本中替换掉的原始内容。锚点和URL的占位符位于
/// 保留下来的括号之内，因此它们的 `text` 不含括号（锚点为 `#id`）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub index: usize,
    pub text: String,
}

impl Fragment {
    pub fn placeholder(&self) -> String {
        self.kind.placeholder(self.index)
    }

    /// 锚点片段引用的目标id（去掉 `#`）
    pub fn anchor_id(&self) -> Option<&str> {
        match self.kind {
            FragmentKind::Anchor => Some(self.text.strip_prefix('#').unwrap_or(&self.text)),
            _ => None,
        }
    }
}

/// 标题记录: 级别(1-6)与标题文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub level: usize,
    pub text: String,
    /// 标题被后面阶段的片段整体吞入，原样还原且不参与锚点重建
    pub absorbed: bool,
}

impl Header {
    /// 以指定文本重建标题行
    pub fn line_with(&self, text: &str) -> String {
        format!("{} {}", "#".repeat(self.level), text)
    }
}

/// 提取结果: 带占位符的正文、按类型分组的片段以及标题记录
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    pub body: String,
    pub headers: Vec<Header>,
    fragments: BTreeMap<FragmentKind, Vec<Fragment>>,
}

impl ExtractedDocument {
    /// 追加一个片段，返回其占位符
    ///
    /// 片段序号由该类型已有的片段数决定，保证同类占位符连续编号。
    pub fn push_fragment(&mut self, kind: FragmentKind, text: String) -> String {
        let list = self.fragments.entry(kind).or_default();
        let fragment = Fragment {
            kind,
            index: list.len(),
            text,
        };
        let placeholder = fragment.placeholder();
        list.push(fragment);
        placeholder
    }

    /// 追加一个标题记录，返回其占位符
    pub fn push_header(&mut self, level: usize, text: String) -> String {
        self.headers.push(Header {
            level,
            text,
            absorbed: false,
        });
        header_placeholder(self.headers.len() - 1)
    }

    /// 某一类型的全部片段，按提取顺序排列
    pub fn fragments(&self, kind: FragmentKind) -> &[Fragment] {
        self.fragments.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fragment(&self, kind: FragmentKind, index: usize) -> Option<&Fragment> {
        self.fragments(kind).get(index)
    }

    /// 所有片段，按类型和序号排列
    pub fn all_fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.values().flatten()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.values().map(Vec::len).sum()
    }

    /// 把文本中的占位符展开为原文
    ///
    /// 标题占位符展开为 `# 标题` 形式，标题文本中嵌套的占位符一并展开。
    /// 无法识别的占位符保持原样。
    pub fn expand(&self, text: &str) -> String {
        PLACEHOLDER_REGEX
            .replace_all(text, |caps: &Captures| self.source_of(caps))
            .into_owned()
    }

    /// 展开即将存入新片段的文本，其中出现的标题被标记为已吞入
    pub fn absorb(&mut self, text: &str) -> String {
        for caps in PLACEHOLDER_REGEX.captures_iter(text) {
            if &caps[1] != HEADER_TAG {
                continue;
            }
            if let Some(header) = caps[2]
                .parse::<usize>()
                .ok()
                .and_then(|index| self.headers.get_mut(index))
            {
                header.absorbed = true;
            }
        }
        self.expand(text)
    }

    /// 一次性展开指定类型的片段占位符，其他占位符保持原样
    ///
    /// 展开后的内容不会被再次扫描，片段原文中形如占位符的文本不受影响。
    pub fn expand_kinds(&self, text: &str, kinds: &[FragmentKind]) -> String {
        PLACEHOLDER_REGEX
            .replace_all(text, |caps: &Captures| {
                FragmentKind::from_tag(&caps[1])
                    .filter(|kind| kinds.contains(kind))
                    .zip(caps[2].parse::<usize>().ok())
                    .and_then(|(kind, index)| self.fragment(kind, index))
                    .map(|fragment| fragment.text.clone())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn source_of(&self, caps: &Captures) -> String {
        let whole = caps[0].to_string();
        let Ok(index) = caps[2].parse::<usize>() else {
            return whole;
        };

        if &caps[1] == HEADER_TAG {
            return match self.headers.get(index) {
                Some(header) => header.line_with(&self.expand(&header.text)),
                None => whole,
            };
        }

        FragmentKind::from_tag(&caps[1])
            .and_then(|kind| self.fragment(kind, index))
            .map(|fragment| fragment.text.clone())
            .unwrap_or(whole)
    }
}

/// 判断文本中是否含有形如占位符的内容
pub fn contains_placeholder(text: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_format() {
        assert_eq!(FragmentKind::CodeBlock.placeholder(0), "@CODE_BLOCK_0@");
        assert_eq!(FragmentKind::Url.placeholder(3), "@URL_PLACEHOLDER_3@");
        assert_eq!(header_placeholder(2), "@HEADER_PLACEHOLDER_2@");
    }

    #[test]
    fn test_tag_roundtrip() {
        for kind in FragmentKind::ALL {
            assert_eq!(FragmentKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(FragmentKind::from_tag(HEADER_TAG), None);
    }

    #[test]
    fn test_push_numbers_per_kind() {
        let mut doc = ExtractedDocument::default();
        assert_eq!(doc.push_fragment(FragmentKind::Html, "<b>".into()), "@HTML_0@");
        assert_eq!(doc.push_fragment(FragmentKind::Latex, "$x$".into()), "@LATEX_0@");
        assert_eq!(doc.push_fragment(FragmentKind::Html, "</b>".into()), "@HTML_1@");
        assert_eq!(doc.fragments(FragmentKind::Html).len(), 2);
        assert_eq!(doc.fragment_count(), 3);
        assert!(doc.fragments(FragmentKind::Table).is_empty());
    }

    #[test]
    fn test_anchor_id() {
        let mut doc = ExtractedDocument::default();
        doc.push_fragment(FragmentKind::Anchor, "#getting-started".into());
        let anchor = doc.fragment(FragmentKind::Anchor, 0).unwrap();
        assert_eq!(anchor.anchor_id(), Some("getting-started"));
    }

    #[test]
    fn test_expand_nested_header() {
        let mut doc = ExtractedDocument::default();
        let anchor = doc.push_fragment(FragmentKind::Anchor, "#intro".into());
        let header = doc.push_header(2, format!("See ({})", anchor));

        assert_eq!(doc.expand(&format!("{}\ntext", header)), "## See (#intro)\ntext");
    }

    #[test]
    fn test_absorb_marks_headers() {
        let mut doc = ExtractedDocument::default();
        let kept = doc.push_header(1, "Intro".into());
        let swallowed = doc.push_header(2, "Pricing".into());

        let text = doc.absorb(&format!("$5\n{}\nor $", swallowed));
        assert_eq!(text, "$5\n## Pricing\nor $");
        assert!(!doc.headers[0].absorbed);
        assert!(doc.headers[1].absorbed);
        assert_eq!(doc.expand(&kept), "# Intro");
    }

    #[test]
    fn test_expand_kinds_single_pass() {
        let mut doc = ExtractedDocument::default();
        let code = doc.push_fragment(FragmentKind::CodeBlock, "```\n@HTML_0@\n```".into());
        let html = doc.push_fragment(FragmentKind::Html, "<br>".into());
        let anchor = doc.push_fragment(FragmentKind::Anchor, "#top".into());

        let text = format!("{} {} ({})", code, html, anchor);
        assert_eq!(
            doc.expand_kinds(&text, &[FragmentKind::CodeBlock, FragmentKind::Html]),
            "```\n@HTML_0@\n``` <br> (@ANCHOR_0@)"
        );
    }

    #[test]
    fn test_expand_keeps_unknown_placeholders() {
        let doc = ExtractedDocument::default();
        assert_eq!(doc.expand("a @TABLE_7@ b"), "a @TABLE_7@ b");
    }

    #[test]
    fn test_contains_placeholder() {
        assert!(contains_placeholder("x @INLINE_CODE_12@ y"));
        assert!(!contains_placeholder("mail me @ home_1"));
    }
}
