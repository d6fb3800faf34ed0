//! 标题锚点生成

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ANCHOR_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("锚点字符正则表达式无效"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("空白正则表达式无效"));

/// 根据标题文本生成锚点
///
/// 删除字母、数字、下划线、空白和连字符以外的字符，去掉首尾空白并转为小写，
/// 最后把连续空白折叠为单个连字符。
pub fn generate_anchor(text: &str) -> String {
    let cleaned = NON_ANCHOR_CHARS.replace_all(text, "");
    let lowered = cleaned.trim().to_lowercase();
    WHITESPACE_RUN.replace_all(&lowered, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_anchor() {
        assert_eq!(generate_anchor("Getting Started"), "getting-started");
        assert_eq!(generate_anchor("  Installation  "), "installation");
    }

    #[test]
    fn test_punctuation_removed() {
        assert_eq!(generate_anchor("What's new? (v2.0)"), "whats-new-v20");
        assert_eq!(generate_anchor("C++ & Rust"), "c-rust");
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(generate_anchor("a \t  b\nc"), "a-b-c");
    }

    #[test]
    fn test_hyphens_and_underscores_kept() {
        assert_eq!(generate_anchor("pre-commit hook_name"), "pre-commit-hook_name");
    }

    #[test]
    fn test_unicode_letters_kept() {
        assert_eq!(generate_anchor("Über die Größe"), "über-die-größe");
        assert_eq!(generate_anchor("快速 开始！"), "快速-开始");
    }

    #[test]
    fn test_idempotent() {
        for text in ["Getting Started", "What's new? (v2.0)", "Über die Größe", "  --x--  y "] {
            let once = generate_anchor(text);
            assert_eq!(generate_anchor(&once), once);
        }
    }
}
