// 标准库导入
use std::path::{Component, Path, PathBuf};

// 第三方crate导入
use isolang::Language;

// 本地模块导入
use crate::api_constants::markers;
use crate::error::Result;
use crate::translate_error;

/// 初始化日志系统，静默模式下只输出错误
pub fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        tracing::Level::ERROR
    } else if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// 把路径转为绝对路径并按字面规整 `.` 和 `..`（不访问文件系统）
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// 验证模板文件
///
/// 模板必须存在、是非空的普通文件、扩展名为 `.md`，且不能与任何目标文件同路径。
pub fn validate_template(path: &Path, target_paths: &[PathBuf]) -> Result<()> {
    let display = path.display();

    if !path.exists() {
        return Err(translate_error!(template, display, "模板文件不存在"));
    }
    if !path.is_file() {
        return Err(translate_error!(template, display, "模板路径不是文件"));
    }
    if path.metadata()?.len() == 0 {
        return Err(translate_error!(template, display, "模板文件为空"));
    }

    let is_markdown = path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(markers::MARKDOWN_EXTENSION))
        .unwrap_or(false);
    if !is_markdown {
        return Err(translate_error!(template, display, "模板文件不是Markdown文件"));
    }

    let template_abs = absolutize(path)?;
    for target in target_paths {
        if absolutize(target)? == template_abs {
            return Err(translate_error!(
                template,
                display,
                format!("模板文件不能与目标文件同名: {}", target.display())
            ));
        }
    }

    Ok(())
}

/// 把两个字母的代码转换为区域指示符号组成的国旗，其他长度返回空字符串
pub fn flag_emoji(code: &str) -> String {
    if code.chars().count() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return String::new();
    }

    code.to_ascii_uppercase()
        .chars()
        .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}

/// 语言代码的英文名称，无法识别时返回首字母大写的代码
pub fn language_display_name(code: &str) -> String {
    if let Some(language) = Language::from_639_1(&code.to_lowercase()) {
        return language.to_name().to_string();
    }
    capitalize(code)
}

/// 首字母大写，其余字母小写
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// 检查索引文档名是否位于前缀的命名空间内
///
/// 前缀去掉末尾的 `_` 后作为基础名（忽略大小写），索引文档名（去掉扩展名）
/// 等于基础名或以 `基础名_` 开头即视为在命名空间内。
pub fn is_filename_in_namespace(main_doc: &str, prefix: &str) -> bool {
    let main_base = Path::new(main_doc)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let expected_base = prefix.strip_suffix('_').unwrap_or(prefix).to_lowercase();

    main_base == expected_base || main_base.starts_with(&format!("{}_", expected_base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslateMdError;
    use std::fs;

    #[test]
    fn test_flag_emoji() {
        assert_eq!(flag_emoji("de"), "\u{1F1E9}\u{1F1EA}");
        assert_eq!(flag_emoji("FR"), "\u{1F1EB}\u{1F1F7}");
        assert_eq!(flag_emoji("zh-cn"), "");
        assert_eq!(flag_emoji("d1"), "");
    }

    #[test]
    fn test_language_display_name() {
        assert_eq!(language_display_name("fr"), "French");
        assert_eq!(language_display_name("zh-cn"), "Zh-cn");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("gERMAN"), "German");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_namespace_check() {
        assert!(is_filename_in_namespace("DOC.md", "DOC_"));
        assert!(is_filename_in_namespace("doc_index.md", "DOC_"));
        assert!(is_filename_in_namespace("README.md", "README"));
        assert!(!is_filename_in_namespace("README.md", "DOC_"));
        assert!(!is_filename_in_namespace("DOCS.md", "DOC_"));
    }

    #[test]
    fn test_absolutize_normalizes() {
        let path = absolutize(Path::new("/a/b/../c/./d.md")).unwrap();
        assert_eq!(path, PathBuf::from("/a/c/d.md"));
    }

    #[test]
    fn test_validate_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.md");
        let empty = dir.path().join("empty.md");
        let text = dir.path().join("notes.txt");
        fs::write(&template, "# Hello\n").unwrap();
        fs::write(&empty, "").unwrap();
        fs::write(&text, "hello").unwrap();

        assert!(validate_template(&template, &[dir.path().join("DOC_de.md")]).is_ok());

        for bad in [&empty, &text, &dir.path().join("missing.md")] {
            assert!(matches!(
                validate_template(bad, &[]),
                Err(TranslateMdError::Template { .. })
            ));
        }

        let collision = dir.path().join("sub/../template.md");
        assert!(matches!(
            validate_template(&template, &[collision]),
            Err(TranslateMdError::Template { .. })
        ));
    }

    #[test]
    fn test_uppercase_markdown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("TEMPLATE.MD");
        fs::write(&template, "x").unwrap();
        assert!(validate_template(&template, &[]).is_ok());
    }
}
