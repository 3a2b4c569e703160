//! 纯文本策略：无条件适用，逐行产出
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::ScanError;
use crate::extract::{Attempt, ChunkStream, ExtractorKind, LineChunks, TextExtractor};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainExtractor;

impl TextExtractor for PlainExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Plain
    }

    fn attempt(&self, file: File, path: &Path) -> Result<Attempt, ScanError> {
        let lines = LineChunks::new(BufReader::new(file), path);
        Ok(Attempt::Accepted(ChunkStream::new(ExtractorKind::Plain, lines)))
    }
}
