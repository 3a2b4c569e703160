//! 按档位组装处理器树
//!
//! 构建器在组装期间累积到一个组合处理器中，`build` 消耗自身，
//! 因此同一个构建器不可能被构建两次。
use std::path::PathBuf;

use crate::handlers::CompositeHandler;
use crate::options::{Profile, ScanOptions};
use crate::sinks::{ConsoleHandler, CsvFileHandler, StatsHandler, TextFileHandler};

pub struct HandlerBuilder {
    profile: Profile,
    root: CompositeHandler,
}

impl HandlerBuilder {
    pub fn new(profile: Profile) -> Self {
        Self { profile, root: CompositeHandler::new() }
    }

    /// 按选项一次性组装（CLI 使用）
    pub fn for_options(opts: &ScanOptions) -> CompositeHandler {
        let mut builder = Self::new(opts.profile);
        if opts.console {
            builder.add_console();
        }
        builder.add_output_file(&opts.output);
        builder.build()
    }

    /// verbose：嵌套一组 [控制台, 属主统计]；brief：仅控制台
    pub fn add_console(&mut self) -> &mut Self {
        match self.profile {
            Profile::Verbose => {
                let mut console = CompositeHandler::new();
                console.add_handler(ConsoleHandler::new()).add_handler(StatsHandler::new());
                self.root.add_handler(console);
            }
            Profile::Brief => {
                self.root.add_handler(ConsoleHandler::new());
            }
        }
        self
    }

    /// verbose：逐行文本；brief：表格
    pub fn add_output_file(&mut self, destination: impl Into<PathBuf>) -> &mut Self {
        let destination = destination.into();
        match self.profile {
            Profile::Verbose => self.root.add_handler(TextFileHandler::new(destination)),
            Profile::Brief => self.root.add_handler(CsvFileHandler::new(destination)),
        };
        self
    }

    pub fn build(self) -> CompositeHandler {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ScanHandler;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn verbose_with_console_nests_console_group() {
        let mut b = HandlerBuilder::new(Profile::Verbose);
        b.add_console().add_output_file("out.txt");
        let root = b.build();
        // [控制台组, 文本文件]
        assert_eq!(root.len(), 2);
    }

    #[test]
    fn brief_without_console_has_only_file_writer() {
        let mut opts = ScanOptions::new("root", "p");
        opts.profile = Profile::Brief;
        opts.output = "out.csv".into();
        assert_eq!(HandlerBuilder::for_options(&opts).len(), 1);
    }

    #[test]
    fn verbose_writes_text_report() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("report.txt");
        let mut b = HandlerBuilder::new(Profile::Verbose);
        b.add_output_file(&dest);
        let mut h = b.build();
        h.open().unwrap();
        h.on_skipped(Path::new("big.bin"), "Sensitive", 1337).unwrap();
        h.close().unwrap();
        assert_eq!(
            std::fs::read_to_string(&dest).unwrap(),
            "file 'big.bin' exceeds the size threshold 1337\n"
        );
    }

    #[test]
    fn brief_writes_tabular_report() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("report.csv");
        let mut b = HandlerBuilder::new(Profile::Brief);
        b.add_output_file(&dest);
        let mut h = b.build();
        h.open().unwrap();
        h.on_non_sensitive(Path::new("b.txt"), "Sensitive", 1337).unwrap();
        h.close().unwrap();
        assert_eq!(
            std::fs::read_to_string(&dest).unwrap(),
            "path,verdict,pattern,size_threshold\nb.txt,non_sensitive,Sensitive,1337\n"
        );
    }

    #[test]
    fn unopenable_destination_fails_whole_tree_open() {
        let dir = TempDir::new().unwrap();
        let mut b = HandlerBuilder::new(Profile::Brief);
        b.add_output_file(dir.path().join("ok.csv"))
            .add_output_file(dir.path().join("missing/dir.csv"))
            .add_output_file(dir.path().join("never.csv"));
        let mut h = b.build();
        assert!(h.open().is_err());
        // 第三个从未被打开，文件不应存在
        assert!(dir.path().join("ok.csv").exists());
        assert!(!dir.path().join("never.csv").exists());
    }
}
