//! 压缩包策略：文件是合法 zip 时，按条目顺序把每个条目当作纯文本逐行产出
//!
//! 条目只在消费方推进到它时才解压；已打开的条目整体读入内存后再分行。
//! 条目头声明的大小不可信，只作为预分配的提示且有上限。
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

use crate::error::ScanError;
use crate::extract::{rewind, Attempt, ChunkStream, ExtractorKind, LineChunks, TextExtractor};

/// 单个条目按声明大小预分配的上限；实际内容更大时由 `read_to_end` 逐步扩容
const ENTRY_PREALLOC_MAX: u64 = 64 * 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl TextExtractor for ZipExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Archive
    }

    fn attempt(&self, mut file: File, path: &Path) -> Result<Attempt, ScanError> {
        // 只解析一次中央目录：克隆句柄交给归档，解析失败时原句柄回到开头后交还
        let reader = file.try_clone().map_err(|e| ScanError::io(path, e))?;
        let archive = match ZipArchive::new(BufReader::new(reader)) {
            Ok(archive) => archive,
            Err(_) => {
                rewind(&mut file, path)?;
                return Ok(Attempt::Declined(file));
            }
        };
        let entries = ArchiveChunks {
            archive,
            path: path.to_path_buf(),
            next_entry: 0,
            current: None,
            done: false,
        };
        Ok(Attempt::Accepted(ChunkStream::new(ExtractorKind::Archive, entries)))
    }
}

struct ArchiveChunks {
    archive: ZipArchive<BufReader<File>>,
    path: PathBuf,
    next_entry: usize,
    current: Option<LineChunks<Cursor<Vec<u8>>>>,
    done: bool,
}

impl ArchiveChunks {
    fn open_entry(&mut self, index: usize) -> Result<Vec<u8>, ScanError> {
        let mut entry = self
            .archive
            .by_index(index)
            .map_err(|source| ScanError::Archive { path: self.path.clone(), source })?;
        debug!(archive = %self.path.display(), entry = entry.name(), "reading archive entry");
        let mut data = Vec::with_capacity(entry.size().min(ENTRY_PREALLOC_MAX) as usize);
        entry.read_to_end(&mut data).map_err(|e| ScanError::io(&self.path, e))?;
        Ok(data)
    }
}

impl Iterator for ArchiveChunks {
    type Item = Result<String, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(lines) = self.current.as_mut() {
                match lines.next() {
                    Some(line) => return Some(line),
                    None => self.current = None,
                }
            }
            if self.done || self.next_entry >= self.archive.len() {
                self.done = true;
                return None;
            }
            let index = self.next_entry;
            self.next_entry += 1;
            match self.open_entry(index) {
                Ok(data) => self.current = Some(LineChunks::new(Cursor::new(data), &self.path)),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
