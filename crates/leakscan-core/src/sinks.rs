//! 具体的结果接收端：控制台、属主统计、文本报告、表格报告
use chrono::{DateTime, Local};
use std::fs::{File, Metadata};
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::ScanError;
use crate::handlers::ScanHandler;
use crate::types::{Verdict, VerdictRecord};

/// 表格报告的列
const CSV_HEADER: [&str; 4] = ["path", "verdict", "pattern", "size_threshold"];

fn console_err(source: io::Error) -> ScanError {
    ScanError::Report { sink: "stdout".to_string(), source }
}

/// 每条通知向标准输出写一行可读消息；无需生命周期
pub struct ConsoleHandler<W = Stdout> {
    out: W,
}

impl ConsoleHandler {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConsoleHandler<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, verdict: Verdict, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        writeln!(self.out, "{}", verdict.describe(path, pattern, size_limit)).map_err(console_err)
    }
}

impl<W: Write> ScanHandler for ConsoleHandler<W> {
    fn name(&self) -> &'static str {
        "console"
    }

    fn on_sensitive(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        self.emit(Verdict::Sensitive, path, pattern, size_limit)
    }

    fn on_non_sensitive(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        self.emit(Verdict::NonSensitive, path, pattern, size_limit)
    }

    fn on_skipped(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        self.emit(Verdict::Skipped, path, pattern, size_limit)
    }
}

/// 命中时额外报告文件属主与最后修改时间（通知时实时查询，不缓存）
///
/// 元数据查询失败（文件已被删除、无权限）时两项都记为 `unknown`，不影响其他接收端。
pub struct StatsHandler<W = Stdout> {
    out: W,
}

impl StatsHandler {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StatsHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> StatsHandler<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ScanHandler for StatsHandler<W> {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn on_sensitive(&mut self, path: &Path, _pattern: &str, _size_limit: u64) -> Result<(), ScanError> {
        let (owner, modified) = match std::fs::metadata(path) {
            Ok(md) => {
                let modified = md
                    .modified()
                    .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|_| "unknown".to_string());
                (owner_of(&md), modified)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "file metadata unavailable for stats");
                ("unknown".to_string(), "unknown".to_string())
            }
        };
        writeln!(self.out, "file '{}' owner: {}, last modified: {}", path.display(), owner, modified)
            .map_err(console_err)
    }

    fn on_non_sensitive(&mut self, _: &Path, _: &str, _: u64) -> Result<(), ScanError> {
        Ok(())
    }

    fn on_skipped(&mut self, _: &Path, _: &str, _: u64) -> Result<(), ScanError> {
        Ok(())
    }
}

#[cfg(unix)]
fn owner_of(md: &Metadata) -> String {
    use std::os::unix::fs::MetadataExt;
    format!("uid {}", md.uid())
}

#[cfg(not(unix))]
fn owner_of(_md: &Metadata) -> String {
    "unknown".to_string()
}

/// 逐行文本报告（verbose 档位）
///
/// `open` 截断并打开目标文件；`close` 无条件释放输出流。
pub struct TextFileHandler {
    destination: PathBuf,
    out: Option<BufWriter<File>>,
}

impl TextFileHandler {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self { destination: destination.into(), out: None }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    fn report(&mut self, verdict: Verdict, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        let out = self.out.as_mut().ok_or(ScanError::NotOpen("text-file"))?;
        writeln!(out, "{}", verdict.describe(path, pattern, size_limit)).map_err(|source| ScanError::Report {
            sink: self.destination.display().to_string(),
            source,
        })
    }
}

impl ScanHandler for TextFileHandler {
    fn name(&self) -> &'static str {
        "text-file"
    }

    fn open(&mut self) -> Result<(), ScanError> {
        let file = File::create(&self.destination)
            .map_err(|source| ScanError::Destination { path: self.destination.clone(), source })?;
        self.out = Some(BufWriter::new(file));
        Ok(())
    }

    fn on_sensitive(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        self.report(Verdict::Sensitive, path, pattern, size_limit)
    }

    fn on_non_sensitive(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        self.report(Verdict::NonSensitive, path, pattern, size_limit)
    }

    fn on_skipped(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        self.report(Verdict::Skipped, path, pattern, size_limit)
    }

    fn close(&mut self) -> Result<(), ScanError> {
        // 先取出再刷新：即使刷新失败，流也随之释放
        match self.out.take() {
            Some(mut out) => out.flush().map_err(|source| ScanError::Report {
                sink: self.destination.display().to_string(),
                source,
            }),
            None => Ok(()),
        }
    }
}

/// 表格报告（brief 档位）：表头 + 每个文件一条记录
pub struct CsvFileHandler {
    destination: PathBuf,
    writer: Option<csv::Writer<File>>,
}

impl CsvFileHandler {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self { destination: destination.into(), writer: None }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    fn csv_err(&self, source: csv::Error) -> ScanError {
        ScanError::ReportCsv { sink: self.destination.display().to_string(), source }
    }

    fn record(&mut self, verdict: Verdict, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        let path = path.to_string_lossy();
        let row = VerdictRecord { path: &path, verdict, pattern, size_threshold: size_limit };
        let writer = self.writer.as_mut().ok_or(ScanError::NotOpen("csv-file"))?;
        match writer.serialize(row) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.csv_err(e)),
        }
    }
}

impl ScanHandler for CsvFileHandler {
    fn name(&self) -> &'static str {
        "csv-file"
    }

    fn open(&mut self) -> Result<(), ScanError> {
        let file = File::create(&self.destination)
            .map_err(|source| ScanError::Destination { path: self.destination.clone(), source })?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(CSV_HEADER).map_err(|e| self.csv_err(e))?;
        self.writer = Some(writer);
        Ok(())
    }

    fn on_sensitive(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        self.record(Verdict::Sensitive, path, pattern, size_limit)
    }

    fn on_non_sensitive(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        self.record(Verdict::NonSensitive, path, pattern, size_limit)
    }

    fn on_skipped(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        self.record(Verdict::Skipped, path, pattern, size_limit)
    }

    fn close(&mut self) -> Result<(), ScanError> {
        match self.writer.take() {
            Some(mut writer) => writer.flush().map_err(|source| ScanError::Report {
                sink: self.destination.display().to_string(),
                source,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn all_three(h: &mut dyn ScanHandler) {
        h.on_sensitive(Path::new("d/a.txt"), "Sensitive", 1337).unwrap();
        h.on_non_sensitive(Path::new("d/b.txt"), "Sensitive", 1337).unwrap();
        h.on_skipped(Path::new("d/c.bin"), "Sensitive", 1337).unwrap();
    }

    #[test]
    fn console_writes_one_line_per_notification() {
        let mut h = ConsoleHandler::with_writer(Vec::new());
        h.open().unwrap();
        all_three(&mut h);
        h.close().unwrap();
        let text = String::from_utf8(h.into_inner()).unwrap();
        assert_eq!(
            text,
            "file 'd/a.txt' contains a sensitive content 'Sensitive'\n\
             file 'd/b.txt' does not contain a sensitive content 'Sensitive'\n\
             file 'd/c.bin' exceeds the size threshold 1337\n"
        );
    }

    #[test]
    fn stats_reports_only_sensitive_files() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("hit.txt");
        std::fs::write(&p, "Sensitive").unwrap();

        let mut h = StatsHandler::with_writer(Vec::new());
        h.on_non_sensitive(&p, "Sensitive", 10).unwrap();
        h.on_skipped(&p, "Sensitive", 10).unwrap();
        h.on_sensitive(&p, "Sensitive", 10).unwrap();

        let text = String::from_utf8(h.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("hit.txt"));
        assert!(text.contains("last modified: "));
        #[cfg(unix)]
        assert!(text.contains("owner: uid "));
    }

    #[test]
    fn stats_reports_unknown_when_file_vanished() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("gone");
        let mut h = StatsHandler::with_writer(Vec::new());
        h.on_sensitive(&gone, "p", 1).unwrap();
        let text = String::from_utf8(h.into_inner()).unwrap();
        assert_eq!(
            text,
            format!("file '{}' owner: unknown, last modified: unknown\n", gone.display())
        );
    }

    #[test]
    fn vanished_file_still_reaches_report_after_stats() {
        use crate::handlers::CompositeHandler;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("result.txt");
        let vanished = dir.path().join("vanished.txt");

        // verbose 档位的形状：[[控制台, 属主统计], 文本报告]
        let mut console = CompositeHandler::new();
        console
            .add_handler(ConsoleHandler::with_writer(Vec::new()))
            .add_handler(StatsHandler::with_writer(Vec::new()));
        let mut root = CompositeHandler::new();
        root.add_handler(console).add_handler(TextFileHandler::new(&dest));

        root.open().unwrap();
        root.on_sensitive(&vanished, "Sensitive", 1337).unwrap();
        root.close().unwrap();

        let text = std::fs::read_to_string(&dest).unwrap();
        assert!(text.contains("vanished.txt' contains a sensitive content 'Sensitive'"));
    }

    #[test]
    fn text_file_truncates_and_writes_lines() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("result.txt");
        std::fs::write(&dest, "stale content\n").unwrap();

        let mut h = TextFileHandler::new(&dest);
        h.open().unwrap();
        all_three(&mut h);
        h.close().unwrap();

        let text = std::fs::read_to_string(&dest).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "file 'd/a.txt' contains a sensitive content 'Sensitive'");
        assert_eq!(lines[2], "file 'd/c.bin' exceeds the size threshold 1337");
        assert!(!text.contains("stale"));
    }

    #[test]
    fn text_file_rejects_notifications_outside_bracket() {
        let dir = TempDir::new().unwrap();
        let mut h = TextFileHandler::new(dir.path().join("r.txt"));
        let err = h.on_sensitive(Path::new("x"), "p", 1).unwrap_err();
        assert!(matches!(err, ScanError::NotOpen("text-file")));

        h.open().unwrap();
        h.close().unwrap();
        // close 之后再次 close 是空操作
        h.close().unwrap();
        assert!(h.on_skipped(Path::new("x"), "p", 1).is_err());
    }

    #[test]
    fn text_file_open_fails_for_missing_directory() {
        let dir = TempDir::new().unwrap();
        let mut h = TextFileHandler::new(dir.path().join("no/such/dir/r.txt"));
        assert!(matches!(h.open(), Err(ScanError::Destination { .. })));
    }

    #[test]
    fn csv_file_writes_header_and_records() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("result.csv");
        let mut h = CsvFileHandler::new(&dest);
        h.open().unwrap();
        all_three(&mut h);
        h.on_sensitive(Path::new("d/odd, \"name\".txt"), "a,b", 7).unwrap();
        h.close().unwrap();

        let mut rdr = csv::Reader::from_path(&dest).unwrap();
        assert_eq!(rdr.headers().unwrap(), &csv::StringRecord::from(CSV_HEADER.to_vec()));
        let rows: Vec<Vec<String>> = rdr
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec!["d/a.txt", "sensitive", "Sensitive", "1337"]);
        assert_eq!(rows[1], vec!["d/b.txt", "non_sensitive", "Sensitive", "1337"]);
        assert_eq!(rows[2], vec!["d/c.bin", "skipped", "Sensitive", "1337"]);
        assert_eq!(rows[3], vec!["d/odd, \"name\".txt", "sensitive", "a,b", "7"]);
    }

    #[test]
    fn csv_header_written_even_without_records() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("empty.csv");
        let mut h = CsvFileHandler::new(&dest);
        h.open().unwrap();
        h.close().unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "path,verdict,pattern,size_threshold\n");
    }
}
