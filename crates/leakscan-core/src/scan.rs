//! 扫描主流程：遍历 → 大小门限 → 抽取 → 匹配 → 分派
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::builder::HandlerBuilder;
use crate::error::ScanError;
use crate::extract::ExtractorChain;
use crate::handlers::{HandlerSession, ScanHandler};
use crate::options::{ScanOptions, ScanStats};
use crate::pattern::SensitivePattern;
use crate::types::{ScanTarget, Verdict};

/// 串行扫描器；抽取链构建一次，跨文件复用
#[derive(Default)]
pub struct Scanner {
    chain: ExtractorChain,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(chain: ExtractorChain) -> Self {
        Self { chain }
    }

    /// 打开处理器、扫描、关闭处理器；任何退出路径都会关闭
    pub fn run(
        &self,
        root: &Path,
        pattern: &SensitivePattern,
        max_file_size: u64,
        handler: &mut dyn ScanHandler,
    ) -> Result<ScanStats, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }
        let mut session = HandlerSession::open(handler)?;
        let stats = self.scan(root, pattern, max_file_size, session.handler())?;
        session.close()?;
        Ok(stats)
    }

    /// 遍历 `root` 下所有普通文件，每个文件恰好通知一次
    /// 调用方负责处理器的 open/close（见 [`Scanner::run`]）。
    pub fn scan(
        &self,
        root: &Path,
        pattern: &SensitivePattern,
        max_file_size: u64,
        handler: &mut dyn ScanHandler,
    ) -> Result<ScanStats, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }
        info!(root = %root.display(), pattern = pattern.as_str(), max_file_size, "starting scan");

        let mut stats = ScanStats::default();
        for entry in WalkDir::new(root).min_depth(1) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "walk entry failed");
                    stats.failed += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let size = match entry.metadata() {
                Ok(md) => md.len(),
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "stat failed");
                    stats.failed += 1;
                    continue;
                }
            };
            let target = ScanTarget { path: entry.into_path(), size };

            match self.classify(&target, pattern, max_file_size) {
                Ok(verdict) => {
                    debug!(path = %target.path.display(), size = target.size, %verdict, "classified");
                    handler.notify(verdict, &target.path, pattern.as_str(), max_file_size)?;
                    stats.record(verdict);
                }
                Err(e) => {
                    // 单个文件读取失败不产生结论，继续扫描其余文件
                    warn!(path = %target.path.display(), error = %e, "extraction failed, no verdict");
                    stats.failed += 1;
                }
            }
        }

        info!(
            sensitive = stats.sensitive,
            non_sensitive = stats.non_sensitive,
            skipped = stats.skipped,
            failed = stats.failed,
            "scan finished"
        );
        Ok(stats)
    }

    /// 单个目标的结论；超限文件不会被打开
    pub fn classify(
        &self,
        target: &ScanTarget,
        pattern: &SensitivePattern,
        max_file_size: u64,
    ) -> Result<Verdict, ScanError> {
        if target.size > max_file_size {
            return Ok(Verdict::Skipped);
        }
        let chunks = self.chain.extract(&target.path)?;
        if contains_pattern(chunks, pattern)? {
            Ok(Verdict::Sensitive)
        } else {
            Ok(Verdict::NonSensitive)
        }
    }
}

/// 顺序检查文本块，首次命中即停止拉取
pub(crate) fn contains_pattern<I, E>(chunks: I, pattern: &SensitivePattern) -> Result<bool, E>
where
    I: IntoIterator<Item = Result<String, E>>,
{
    for chunk in chunks {
        if pattern.is_match(&chunk?) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// 按选项完成一次完整扫描：构建处理器树 → 打开 → 扫描 → 关闭
pub fn scan_with_options(opts: &ScanOptions) -> Result<ScanStats, ScanError> {
    let pattern = SensitivePattern::new(opts.pattern.as_str())?;
    let mut handler = HandlerBuilder::for_options(opts);
    Scanner::new().run(&opts.root, &pattern, opts.max_file_size, &mut handler)
}
