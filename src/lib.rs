//! translate-md - Markdown多语言翻译工具库
//!
//! 这个库提供了Markdown结构保护、翻译服务适配、标题锚点重建和语言导航维护等核心功能。

pub mod anchor;
pub mod api_constants;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fragment;
pub mod navigator;
pub mod output_manager;
pub mod pipeline;
pub mod restorer;
pub mod stats;
pub mod translator;
pub mod utils;

pub use config::{Cli, LanguageEntry, LanguageTable, OutputLayout, Settings};
pub use error::{Result, TranslateMdError};
pub use pipeline::{run, RunReport};
pub use translator::{build_translator, Backend, Translator};
