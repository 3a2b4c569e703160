//! 敏感内容扫描核心库
//!
//! 设计要点：
//! - 抽取链（Zip → 表格 → 纯文本）把任意文件变成惰性的文本块序列，命中即停止读取。
//! - 处理器树把单个结论扇出到多个接收端（控制台、属主统计、文本/表格报告），
//!   并保证已打开的输出资源在任何退出路径上都被关闭。
//! - 扫描为单线程顺序执行；报告顺序即遍历顺序。

mod builder;
mod config;
mod error;
mod extract;
mod extract_plain;
mod extract_tabular;
mod extract_zip;
mod handlers;
mod options;
mod pattern;
mod scan;
mod sinks;
mod sniff;
mod types;

pub use builder::HandlerBuilder;
pub use config::{load_config, parse_config, ScanConfig};
pub use error::ScanError;
pub use extract::{Attempt, ChunkStream, ExtractorChain, ExtractorKind, TextExtractor};
pub use extract_plain::PlainExtractor;
pub use extract_tabular::{TabularExtractor, SNIFF_WINDOW};
pub use extract_zip::ZipExtractor;
pub use handlers::{CompositeHandler, HandlerSession, ScanHandler};
pub use options::{Profile, ScanOptions, ScanStats, DEFAULT_MAX_FILE_SIZE};
pub use pattern::SensitivePattern;
pub use scan::{scan_with_options, Scanner};
pub use sinks::{ConsoleHandler, CsvFileHandler, StatsHandler, TextFileHandler};
pub use sniff::{sniff, Dialect, LineTerminator};
pub use types::{ScanTarget, Verdict, VerdictRecord};
