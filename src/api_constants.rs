/// 翻译API与文档生成相关常量
///
/// 该文件定义了翻译服务地址、CLI默认值和文档标记，方便统一管理和维护

/// 默认翻译API配置
pub mod api_config {
    /// Google翻译网页接口地址
    pub const GOOGLE_API_URL: &str = "https://translate.googleapis.com/translate_a/single";

    /// 本地DeepLX服务地址
    pub const DEEPLX_API_URL: &str = "http://localhost:1188/translate";

    /// Google网页接口的客户端标识
    pub const GOOGLE_CLIENT: &str = "gtx";

    /// 默认User-Agent
    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; translate-md/0.1)";
}

/// 翻译服务配置
pub mod service_config {
    /// 请求超时时间（秒）
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// 语言检测时采样的最大字符数
    pub const DETECT_SAMPLE_CHARS: usize = 1000;

    /// 检测接口请求的目标语言（任意有效语言即可）
    pub const DETECT_PROBE_TARGET: &str = "en";
}

/// CLI与配置文件默认值
pub mod defaults {
    /// 默认模板文件
    pub const TEMPLATE_FILE: &str = "template.md";

    /// 默认输出目录
    pub const OUTPUT_DIR: &str = ".";

    /// 默认输出文件前缀
    pub const PREFIX: &str = "DOC_";

    /// 默认索引文档名称
    pub const MAIN_DOC: &str = "DOC.md";

    /// 默认目标语言: (代码, 名称, 国旗)
    pub const TARGET_LANGUAGES: &[(&str, &str, &str)] = &[("de", "German", "🇩🇪")];
}

/// 文档标记
pub mod markers {
    /// 语言导航块起始标记
    pub const LANGUAGE_LINKS_START: &str = "<!-- LANGUAGE_LINKS_START -->";

    /// 语言导航块结束标记
    pub const LANGUAGE_LINKS_END: &str = "<!-- LANGUAGE_LINKS_END -->";

    /// 目标文件中等待替换的翻译内容标记
    pub const TRANSLATED_CONTENT: &str = "<!-- TRANSLATED_CONTENT -->";

    /// Markdown文件扩展名
    pub const MARKDOWN_EXTENSION: &str = "md";
}

/// 实用工具函数
/// 获取API URL，未指定自定义地址时使用后端默认地址
pub fn get_api_url<'a>(default_url: &'a str, custom_api: Option<&'a str>) -> &'a str {
    match custom_api {
        Some(custom) if !custom.trim().is_empty() => custom,
        _ => default_url,
    }
}

/// 验证API URL是否有效（必须是http或https地址）
pub fn is_valid_api_url(api_url: &str) -> bool {
    match url::Url::parse(api_url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some(),
        Err(_) => false,
    }
}
