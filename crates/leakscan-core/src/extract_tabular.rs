//! 表格策略：对前缀窗口做方言嗅探，成功则按行优先顺序逐个单元格产出
use csv::ByteRecord;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::ScanError;
use crate::extract::{rewind, Attempt, ChunkStream, ExtractorKind, TextExtractor};
use crate::sniff::sniff;

/// 默认探测窗口（字节）
pub const SNIFF_WINDOW: usize = 1024;

#[derive(Debug, Clone, Copy)]
pub struct TabularExtractor {
    window: usize,
}

impl Default for TabularExtractor {
    fn default() -> Self {
        Self { window: SNIFF_WINDOW }
    }
}

impl TabularExtractor {
    pub fn with_window(window: usize) -> Self {
        Self { window: window.max(1) }
    }
}

impl TextExtractor for TabularExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Tabular
    }

    fn attempt(&self, mut file: File, path: &Path) -> Result<Attempt, ScanError> {
        // 多读一个字节，用于判断样本之后是否还有数据
        let mut sample = Vec::with_capacity(self.window + 1);
        (&mut file)
            .take(self.window as u64 + 1)
            .read_to_end(&mut sample)
            .map_err(|e| ScanError::io(path, e))?;
        let truncated = sample.len() > self.window;
        sample.truncate(self.window);

        let dialect = sniff(&sample, truncated);
        rewind(&mut file, path)?;

        match dialect {
            None => Ok(Attempt::Declined(file)),
            Some(dialect) => {
                let cells = CellChunks {
                    records: dialect.reader(file).into_byte_records(),
                    path: path.to_path_buf(),
                    row: None,
                    col: 0,
                    done: false,
                };
                Ok(Attempt::Accepted(ChunkStream::new(ExtractorKind::Tabular, cells)))
            }
        }
    }
}

/// 按行读取记录，逐个单元格产出；一次只持有一行
struct CellChunks {
    records: csv::ByteRecordsIntoIter<File>,
    path: PathBuf,
    row: Option<ByteRecord>,
    col: usize,
    done: bool,
}

impl Iterator for CellChunks {
    type Item = Result<String, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = &self.row {
                if self.col < row.len() {
                    let cell = String::from_utf8_lossy(&row[self.col]).into_owned();
                    self.col += 1;
                    return Some(Ok(cell));
                }
            }
            if self.done {
                return None;
            }
            match self.records.next() {
                None => {
                    self.done = true;
                    self.row = None;
                }
                Some(Ok(record)) => {
                    self.row = Some(record);
                    self.col = 0;
                }
                Some(Err(source)) => {
                    self.done = true;
                    self.row = None;
                    return Some(Err(ScanError::Delimited { path: self.path.clone(), source }));
                }
            }
        }
    }
}
