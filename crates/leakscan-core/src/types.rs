//! 公共类型（对外暴露）
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// 单个文件的扫描结论，三者互斥，每个文件恰好产生一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// 命中敏感字面量
    Sensitive,
    /// 完整读取后未命中
    NonSensitive,
    /// 超过大小阈值，内容从未被打开
    Skipped,
}

impl Verdict {
    /// 生成控制台 / 文本报告共用的一行描述
    pub fn describe(self, path: &Path, pattern: &str, size_limit: u64) -> String {
        match self {
            Verdict::Sensitive => format!(
                "file '{}' contains a sensitive content '{}'",
                path.display(),
                pattern
            ),
            Verdict::NonSensitive => format!(
                "file '{}' does not contain a sensitive content '{}'",
                path.display(),
                pattern
            ),
            Verdict::Skipped => format!(
                "file '{}' exceeds the size threshold {}",
                path.display(),
                size_limit
            ),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Sensitive => "sensitive",
            Verdict::NonSensitive => "non_sensitive",
            Verdict::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// 遍历产生的扫描目标（路径 + 字节大小），仅在单次迭代内存活
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub path: PathBuf,
    pub size: u64,
}

/// 表格化报告中的一行（对应 brief 档位输出文件的单条记录）
#[derive(Debug, Clone, Serialize)]
pub struct VerdictRecord<'a> {
    pub path: &'a str,
    pub verdict: Verdict,
    pub pattern: &'a str,
    pub size_threshold: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_each_verdict() {
        let p = Path::new("samples/a.txt");
        assert_eq!(
            Verdict::Sensitive.describe(p, "Sensitive", 1337),
            "file 'samples/a.txt' contains a sensitive content 'Sensitive'"
        );
        assert_eq!(
            Verdict::NonSensitive.describe(p, "Sensitive", 1337),
            "file 'samples/a.txt' does not contain a sensitive content 'Sensitive'"
        );
        assert_eq!(
            Verdict::Skipped.describe(p, "Sensitive", 1337),
            "file 'samples/a.txt' exceeds the size threshold 1337"
        );
    }

    #[test]
    fn display_matches_serialized_name() {
        assert_eq!(Verdict::NonSensitive.to_string(), "non_sensitive");
        assert_eq!(Verdict::Skipped.to_string(), "skipped");
    }
}
