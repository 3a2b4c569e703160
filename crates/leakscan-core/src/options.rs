//! 扫描选项与统计信息（模块）
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::types::Verdict;

/// 默认大小阈值（字节）；超过则跳过
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// 报告档位
/// - Verbose：控制台 + 属主统计，文件输出为逐行文本。
/// - Brief：仅控制台，文件输出为表格（CSV）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Verbose,
    Brief,
}

impl Profile {
    /// 未指定输出路径时使用的默认文件名
    pub fn default_output(self) -> PathBuf {
        match self {
            Profile::Verbose => PathBuf::from("result.txt"),
            Profile::Brief => PathBuf::from("result.csv"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "verbose" => Ok(Profile::Verbose),
            "brief" => Ok(Profile::Brief),
            other => Err(format!("unknown profile `{other}` (expected verbose or brief)")),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Profile::Verbose => "verbose",
            Profile::Brief => "brief",
        })
    }
}

/// 扫描选项
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 扫描根目录
    pub root: PathBuf,
    /// 敏感字面量
    pub pattern: String,
    /// 最大文件大小（字节）；严格大于则跳过
    pub max_file_size: u64,
    pub profile: Profile,
    /// 报告文件路径
    pub output: PathBuf,
    /// 是否同时输出到控制台
    pub console: bool,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        let profile = Profile::default();
        Self {
            root: root.into(),
            pattern: pattern.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            profile,
            output: profile.default_output(),
            console: false,
        }
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub sensitive: usize,
    pub non_sensitive: usize,
    pub skipped: usize,
    /// 抽取或读取失败、未产生结论的文件数
    pub failed: usize,
}

impl ScanStats {
    /// 已产生结论的文件总数
    pub fn files_reported(&self) -> usize {
        self.sensitive + self.non_sensitive + self.skipped
    }

    pub(crate) fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Sensitive => self.sensitive += 1,
            Verdict::NonSensitive => self.non_sensitive += 1,
            Verdict::Skipped => self.skipped += 1,
        }
    }
}
