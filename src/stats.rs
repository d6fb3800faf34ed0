use std::time::Duration;

use crate::fragment::{ExtractedDocument, FragmentKind};

/// 单个语言的处理耗时
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageTiming {
    pub code: String,
    pub translation_time: Duration,
    pub restore_time: Duration,
    pub write_time: Duration,
    pub output_size: usize,
}

/// 运行统计
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub file_read_time: Duration,
    pub detection_time: Duration,
    pub extraction_time: Duration,
    pub input_size: usize,
    pub header_count: usize,
    pub fragment_counts: Vec<(FragmentKind, usize)>,
    pub languages: Vec<LanguageTiming>,
    pub header_fallbacks: usize,
}

impl RunStats {
    /// 记录提取结果中的标题数和各类片段数
    pub fn record_extraction(&mut self, doc: &ExtractedDocument) {
        self.header_count = doc.headers.len();
        self.fragment_counts = FragmentKind::ALL
            .iter()
            .map(|&kind| (kind, doc.fragments(kind).len()))
            .collect();
    }

    pub fn total_fragments(&self) -> usize {
        self.fragment_counts.iter().map(|(_, count)| count).sum()
    }

    pub fn output_size(&self) -> usize {
        self.languages.iter().map(|l| l.output_size).sum()
    }

    pub fn translation_time(&self) -> Duration {
        self.languages.iter().map(|l| l.translation_time + l.restore_time).sum()
    }

    pub fn file_write_time(&self) -> Duration {
        self.languages.iter().map(|l| l.write_time).sum()
    }
}

/// 打印性能统计
pub fn print_performance_stats(stats: &RunStats, total_duration: Duration) {
    println!("\n📊 性能统计报告:");
    println!("═══════════════════════════════════════");

    // 时间分解
    println!("⏱️  时间分解:");
    println!("   文件读取: {}", format_duration(stats.file_read_time));
    println!("   语言检测: {}", format_duration(stats.detection_time));
    println!("   结构提取: {}", format_duration(stats.extraction_time));
    println!("   翻译与还原: {}", format_duration(stats.translation_time()));
    println!("   文件写入: {}", format_duration(stats.file_write_time()));
    println!("   总耗时: {}", format_duration(total_duration));

    // 文件统计
    println!("\n📏 文件统计:");
    println!(
        "   输入大小: {} 字节 ({:.1} KB)",
        stats.input_size,
        stats.input_size as f64 / 1024.0
    );
    println!(
        "   输出大小: {} 字节 ({:.1} KB, {} 个文件)",
        stats.output_size(),
        stats.output_size() as f64 / 1024.0,
        stats.languages.len()
    );

    // 结构统计
    println!("\n🔒 受保护结构:");
    println!("   标题: {} 个", stats.header_count);
    for (kind, count) in stats.fragment_counts.iter().filter(|(_, count)| *count > 0) {
        println!("   {}: {} 个", kind.tag(), count);
    }
    println!("   片段合计: {} 个", stats.total_fragments());
    if stats.header_fallbacks > 0 {
        println!("   标题翻译失败(保留原文): {} 个", stats.header_fallbacks);
    }

    // 各语言耗时
    if !stats.languages.is_empty() {
        println!("\n🌐 各语言耗时:");
        for timing in &stats.languages {
            println!(
                "   {}: 翻译 {} / 还原 {} / 写入 {}",
                timing.code,
                format_duration(timing.translation_time),
                format_duration(timing.restore_time),
                format_duration(timing.write_time)
            );
        }
    }
}

/// 格式化持续时间
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
    }

    #[test]
    fn test_record_extraction() {
        let doc = extract("# A\n\n`x` and `y` <br>\n");
        let mut stats = RunStats::default();
        stats.record_extraction(&doc);

        assert_eq!(stats.header_count, 1);
        assert_eq!(stats.total_fragments(), 3);
        assert!(stats
            .fragment_counts
            .contains(&(FragmentKind::InlineCode, 2)));
    }

    #[test]
    fn test_language_totals() {
        let mut stats = RunStats::default();
        for code in ["de", "fr"] {
            stats.languages.push(LanguageTiming {
                code: code.to_string(),
                translation_time: Duration::from_millis(100),
                restore_time: Duration::from_millis(20),
                write_time: Duration::from_millis(5),
                output_size: 10,
            });
        }

        assert_eq!(stats.output_size(), 20);
        assert_eq!(stats.translation_time(), Duration::from_millis(240));
        assert_eq!(stats.file_write_time(), Duration::from_millis(10));
    }
}
