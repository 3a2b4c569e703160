//! 文本抽取链（Zip → 表格 → 纯文本）
//!
//! 设计要点：
//! - 每个文件只打开一次；各策略探测后必须把文件倒回起点，再交给下一个策略。
//! - 抽取结果是惰性的单遍迭代器，消费方命中即可直接丢弃，剩余内容不会被读取。
//! - 策略本身无状态，整条链构建一次后以引用共享。
use std::fmt;
use std::fs::File;
use std::io::{BufRead, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ScanError;
use crate::extract_plain::PlainExtractor;
use crate::extract_tabular::TabularExtractor;
use crate::extract_zip::ZipExtractor;

/// 抽取策略种类（用于日志与断言）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    Archive,
    Tabular,
    Plain,
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtractorKind::Archive => "archive",
            ExtractorKind::Tabular => "tabular",
            ExtractorKind::Plain => "plain",
        };
        f.write_str(s)
    }
}

/// 惰性文本块序列；每个元素是一行或一个单元格
pub struct ChunkStream {
    kind: ExtractorKind,
    inner: Box<dyn Iterator<Item = Result<String, ScanError>> + Send>,
}

impl ChunkStream {
    pub(crate) fn new<I>(kind: ExtractorKind, inner: I) -> Self
    where
        I: Iterator<Item = Result<String, ScanError>> + Send + 'static,
    {
        Self { kind, inner: Box::new(inner) }
    }

    /// 产生该序列的策略
    pub fn kind(&self) -> ExtractorKind {
        self.kind
    }
}

impl Iterator for ChunkStream {
    type Item = Result<String, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkStream").field("kind", &self.kind).finish_non_exhaustive()
    }
}

/// 单个策略的尝试结果：接管文件，或把（已倒回的）文件原样交还
pub enum Attempt {
    Accepted(ChunkStream),
    Declined(File),
}

/// 抽取策略
pub trait TextExtractor: Send + Sync {
    fn kind(&self) -> ExtractorKind;

    /// 探测并（若适用）接管文件。
    /// 不适用时必须返回 `Declined`，且文件游标已回到起点。
    fn attempt(&self, file: File, path: &Path) -> Result<Attempt, ScanError>;
}

/// 固定优先级的策略列表，先适用者胜出
pub struct ExtractorChain {
    strategies: Vec<Box<dyn TextExtractor>>,
}

impl Default for ExtractorChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorChain {
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(ZipExtractor),
                Box::new(TabularExtractor::default()),
                Box::new(PlainExtractor),
            ],
        }
    }

    /// 按优先级列出策略
    pub fn kinds(&self) -> Vec<ExtractorKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// 打开文件并返回第一个适用策略的文本块序列
    pub fn extract(&self, path: &Path) -> Result<ChunkStream, ScanError> {
        let mut file = File::open(path).map_err(|e| ScanError::io(path, e))?;
        for strategy in &self.strategies {
            match strategy.attempt(file, path)? {
                Attempt::Accepted(chunks) => {
                    debug!(path = %path.display(), strategy = %chunks.kind(), "extractor selected");
                    return Ok(chunks);
                }
                Attempt::Declined(returned) => file = returned,
            }
        }
        Err(ScanError::NoExtractor(path.to_path_buf()))
    }
}

pub(crate) fn rewind(file: &mut File, path: &Path) -> Result<(), ScanError> {
    file.rewind().map_err(|e| ScanError::io(path, e))
}

/// 逐行产出（保留行尾换行符，非 UTF-8 字节做有损转换）
pub(crate) struct LineChunks<R> {
    reader: R,
    path: PathBuf,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> LineChunks<R> {
    pub(crate) fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self { reader, path: path.into(), buf: Vec::new(), done: false }
    }
}

impl<R: BufRead> Iterator for LineChunks<R> {
    type Item = Result<String, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => Some(Ok(String::from_utf8_lossy(&self.buf).into_owned())),
            Err(e) => {
                self.done = true;
                Some(Err(ScanError::io(&self.path, e)))
            }
        }
    }
}
