//! 核心库错误类型
use std::path::PathBuf;
use thiserror::Error;

/// 扫描过程中可能出现的错误
///
/// 抽取类错误（`Io` / `Archive` / `Delimited`）只影响单个文件；
/// 报告类错误（`Destination` / `Report` / `ReportCsv`）会中止整个扫描。
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read zip archive {path}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to parse delimited data in {path}")]
    Delimited {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to open report destination {path}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report to {sink}")]
    Report {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write delimited report to {sink}")]
    ReportCsv {
        sink: String,
        #[source]
        source: csv::Error,
    },

    #[error("handler `{0}` notified outside its open/close bracket")]
    NotOpen(&'static str),

    #[error("sensitive pattern must not be empty")]
    EmptyPattern,

    #[error("invalid sensitive pattern: {0}")]
    Pattern(#[from] aho_corasick::BuildError),

    #[error("scan root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("no extraction strategy accepted {0}")]
    NoExtractor(PathBuf),
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io { path: path.into(), source }
    }
}
