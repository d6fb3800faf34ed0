//! 配置管理模块
//!
//! 提供CLI参数解析、JSON配置文件加载、语言表和输出文件布局

// 标准库导入
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// 第三方crate导入
use clap::Parser;
use serde::Deserialize;
use tracing::{error, info};

// 本地模块导入
use crate::api_constants::{self, defaults, markers, service_config};
use crate::error::Result;
use crate::translate_error;
use crate::translator::Backend;
use crate::utils::{flag_emoji, language_display_name};

/// CLI参数结构
#[derive(Parser, Debug)]
#[command(author, version, about = "Markdown多语言翻译CLI工具 - 保护代码块、表格、链接等结构并生成语言导航", long_about = None)]
pub struct Cli {
    /// Markdown模板文件路径
    #[arg(short, long, value_name = "TEMPLATE_FILE", default_value = defaults::TEMPLATE_FILE)]
    pub template_md: PathBuf,

    /// 译文输出目录
    #[arg(short, long, value_name = "OUTPUT_DIR", default_value = defaults::OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// 译文文件名前缀
    #[arg(short, long, value_name = "PREFIX", default_value = defaults::PREFIX)]
    pub prefix: String,

    /// 索引文档文件名
    #[arg(short, long, value_name = "MAIN_DOC", default_value = defaults::MAIN_DOC)]
    pub main_doc: String,

    /// JSON配置文件路径 (可选，其中的值覆盖命令行参数)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// 翻译后端
    #[arg(long, value_enum, default_value_t = Backend::Google)]
    pub backend: Backend,

    /// 翻译API地址 (可选，默认使用后端自带地址)
    #[arg(short, long, value_name = "URL")]
    pub api: Option<String>,

    /// 请求超时时间（秒）
    #[arg(long, default_value_t = service_config::REQUEST_TIMEOUT_SECONDS)]
    pub timeout: u64,

    /// 详细输出模式
    #[arg(short, long)]
    pub verbose: bool,

    /// 静默模式 (仅输出错误)
    #[arg(short, long)]
    pub quiet: bool,

    /// 显示性能统计
    #[arg(long)]
    pub stats: bool,
}

impl Cli {
    /// 解析并校验翻译API地址
    pub fn api_url(&self) -> Result<String> {
        let api_url = api_constants::get_api_url(self.backend.default_api_url(), self.api.as_deref());
        if !api_constants::is_valid_api_url(api_url) {
            return Err(translate_error!(config, "api", format!("不是有效的http(s)地址: {}", api_url)));
        }
        Ok(api_url.to_string())
    }
}

/// JSON配置文件内容
///
/// 所有字段可选，存在的字段覆盖对应的命令行参数。
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub template_md: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub prefix: Option<String>,
    pub main_doc: Option<String>,
    /// 语言代码 → [名称, 国旗]，按原始JSON保存以便逐项校验
    pub target_languages: Option<serde_json::Value>,
}

impl FileConfig {
    /// 从JSON文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(translate_error!(
                config,
                "config_file",
                format!("配置文件不存在: {}", path.display())
            ));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| translate_error!(file_op, path.display(), "读取", e))?;
        let config = Self::from_json(&content).map_err(|e| {
            translate_error!(config, "config_file", format!("{}: {}", path.display(), e))
        })?;

        info!("📋 使用外部配置文件: {}", path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// 语言条目: 代码、显示名称、国旗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    pub code: String,
    pub name: String,
    pub flag: String,
}

impl LanguageEntry {
    pub fn new(code: &str, name: &str, flag: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            flag: flag.to_string(),
        }
    }

    /// 导航链接中显示的文字: `国旗 名称`
    pub fn label(&self) -> String {
        format!("{} {}", self.flag, self.name)
    }
}

/// 目标语言表，按语言代码排序
///
/// 在开始翻译前构建完成（包括加入检测到的源语言），之后只读。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    entries: BTreeMap<String, LanguageEntry>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::from_entries(
            defaults::TARGET_LANGUAGES
                .iter()
                .map(|(code, name, flag)| LanguageEntry::new(code, name, flag)),
        )
    }
}

impl LanguageTable {
    pub fn from_entries<I: IntoIterator<Item = LanguageEntry>>(entries: I) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.code.clone(), entry))
                .collect(),
        }
    }

    /// 从配置中的 `target_languages` 构建语言表
    ///
    /// 缺失或空对象时使用默认语言表。每个值必须是 `[名称, 国旗]` 两个字符串，
    /// 所有无效条目都会记录日志后再返回错误。
    pub fn from_config_value(value: Option<&serde_json::Value>) -> Result<Self> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Ok(Self::default());
        };

        let Some(map) = value.as_object() else {
            error!("配置中的 'target_languages' 格式无效，应为对象");
            return Err(translate_error!(config, "target_languages", "应为 语言代码 → [名称, 国旗] 的对象"));
        };

        if map.is_empty() {
            return Ok(Self::default());
        }

        let mut entries = Vec::with_capacity(map.len());
        let mut invalid = Vec::new();

        for (code, entry) in map {
            match entry.as_array().map(Vec::as_slice) {
                Some([name, flag]) if name.is_string() && flag.is_string() => {
                    entries.push(LanguageEntry::new(
                        code,
                        name.as_str().unwrap_or_default(),
                        flag.as_str().unwrap_or_default(),
                    ));
                }
                _ => {
                    error!("语言 '{}' 的格式无效: {}，必须是 [名称, 国旗]", code, entry);
                    invalid.push(code.clone());
                }
            }
        }

        if !invalid.is_empty() {
            return Err(translate_error!(
                config,
                "target_languages",
                format!("以下语言缺少名称或国旗: {}", invalid.join(", "))
            ));
        }

        Ok(Self::from_entries(entries))
    }

    pub fn get(&self, code: &str) -> Option<&LanguageEntry> {
        self.entries.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// 按语言代码顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &LanguageEntry> {
        self.entries.values()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 确保源语言在表中，缺失时根据语言代码生成名称和国旗
    ///
    /// 返回最终的语言表以及是否新增了条目。
    pub fn with_source_language(mut self, code: &str) -> (Self, bool) {
        if self.contains(code) {
            return (self, false);
        }
        let entry = LanguageEntry::new(code, &language_display_name(code), &flag_emoji(code));
        self.entries.insert(code.to_string(), entry);
        (self, true)
    }
}

/// 输出文件布局: 输出目录、文件名前缀和索引文档名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub main_doc: String,
}

impl OutputLayout {
    /// 某语言译文的文件名: `<前缀><代码>.md`
    pub fn file_name(&self, code: &str) -> String {
        format!("{}{}.{}", self.prefix, code, markers::MARKDOWN_EXTENSION)
    }

    pub fn target_path(&self, code: &str) -> PathBuf {
        self.output_dir.join(self.file_name(code))
    }

    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join(&self.main_doc)
    }

    /// 语言表中所有语言的目标文件路径
    pub fn target_paths(&self, languages: &LanguageTable) -> Vec<PathBuf> {
        languages.codes().map(|code| self.target_path(code)).collect()
    }
}

/// 合并命令行与配置文件后的运行设置
#[derive(Debug, Clone)]
pub struct Settings {
    pub template: PathBuf,
    pub layout: OutputLayout,
    pub languages: LanguageTable,
}

impl Settings {
    /// 根据命令行参数解析设置，指定了配置文件时先加载配置文件
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config_file {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// 配置文件中存在的值优先于命令行参数
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        let languages = LanguageTable::from_config_value(file.target_languages.as_ref())?;

        Ok(Self {
            template: file.template_md.unwrap_or_else(|| cli.template_md.clone()),
            layout: OutputLayout {
                output_dir: file.output_dir.unwrap_or_else(|| cli.output_dir.clone()),
                prefix: file.prefix.unwrap_or_else(|| cli.prefix.clone()),
                main_doc: file.main_doc.unwrap_or_else(|| cli.main_doc.clone()),
            },
            languages,
        })
    }
}
