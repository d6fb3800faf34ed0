//! 输出文件管理模块
//!
//! 此模块负责：
//! - 创建输出目录
//! - 预先写入带占位标记的目标文件，再用译文替换标记
//! - 写入和读取索引文档

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::api_constants::markers;
use crate::config::{LanguageTable, OutputLayout};

/// 输出文件管理器
pub struct OutputManager {
    layout: OutputLayout,
    /// 已写入译文的文件
    written_files: Vec<PathBuf>,
}

impl OutputManager {
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            layout,
            written_files: Vec::new(),
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// 确保输出目录存在
    pub fn ensure_output_dir(&self) -> Result<()> {
        let dir = &self.layout.output_dir;
        if dir.is_dir() {
            debug!("输出目录已存在: {}", dir.display());
            return Ok(());
        }

        fs::create_dir_all(dir).with_context(|| format!("创建输出目录失败: {}", dir.display()))?;
        info!("📁 已创建输出目录: {}", dir.display());
        Ok(())
    }

    /// 为每个语言写入只含占位标记的目标文件
    pub fn prepare_target_files(&self, languages: &LanguageTable) -> Result<Vec<PathBuf>> {
        let placeholder = format!("{}\n", markers::TRANSLATED_CONTENT);
        let mut prepared = Vec::with_capacity(languages.len());

        for path in self.layout.target_paths(languages) {
            fs::write(&path, &placeholder)
                .with_context(|| format!("写入目标文件失败: {}", path.display()))?;
            debug!("预写目标文件: {}", path.display());
            prepared.push(path);
        }

        Ok(prepared)
    }

    /// 用译文替换目标文件中的占位标记
    ///
    /// 文件中找不到占位标记时记录错误并返回 `false`，不写入任何内容。
    pub fn insert_translated_content(&mut self, path: &Path, content: &str) -> Result<bool> {
        let existing = fs::read_to_string(path)
            .with_context(|| format!("读取目标文件失败: {}", path.display()))?;

        if !existing.contains(markers::TRANSLATED_CONTENT) {
            error!(
                "❌ 目标文件中缺少占位标记 {}: {}",
                markers::TRANSLATED_CONTENT,
                path.display()
            );
            return Ok(false);
        }

        let updated = existing.replace(markers::TRANSLATED_CONTENT, content);
        fs::write(path, &updated).with_context(|| format!("写入译文失败: {}", path.display()))?;

        debug!("写入译文完成: {} ({} 字节)", path.display(), updated.len());
        self.written_files.push(path.to_path_buf());
        Ok(true)
    }

    /// 覆盖写入索引文档
    pub fn write_index(&self, content: &str) -> Result<PathBuf> {
        let path = self.layout.index_path();
        fs::write(&path, content)
            .with_context(|| format!("写入索引文档失败: {}", path.display()))?;
        info!("📝 索引文档已生成: {}", path.display());
        Ok(path)
    }

    pub fn read_index(&self) -> Result<String> {
        let path = self.layout.index_path();
        fs::read_to_string(&path).with_context(|| format!("读取索引文档失败: {}", path.display()))
    }

    /// 已写入译文的文件
    pub fn written_files(&self) -> &[PathBuf] {
        &self.written_files
    }
}
