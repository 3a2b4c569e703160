//! 扫描结果处理器：统一接口、组合处理器与作用域会话
//!
//! 生命周期约定：`open` / `close` 各调用一次，包住整次扫描；
//! 三个通知方法只能在两者之间调用。
use std::path::Path;
use tracing::warn;

use crate::error::ScanError;
use crate::types::Verdict;

/// 单个结果接收端
pub trait ScanHandler {
    /// 调试与日志用名称
    fn name(&self) -> &'static str;

    fn open(&mut self) -> Result<(), ScanError> {
        Ok(())
    }

    fn on_sensitive(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError>;

    fn on_non_sensitive(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError>;

    fn on_skipped(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError>;

    fn close(&mut self) -> Result<(), ScanError> {
        Ok(())
    }

    /// 按结论分派到对应的通知方法
    fn notify(&mut self, verdict: Verdict, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        match verdict {
            Verdict::Sensitive => self.on_sensitive(path, pattern, size_limit),
            Verdict::NonSensitive => self.on_non_sensitive(path, pattern, size_limit),
            Verdict::Skipped => self.on_skipped(path, pattern, size_limit),
        }
    }
}

/// 组合处理器：按注册顺序把所有调用转发给每个子处理器，可嵌套
#[derive(Default)]
pub struct CompositeHandler {
    children: Vec<Box<dyn ScanHandler>>,
    /// 已成功 open 的子处理器数量（总是前缀）
    opened: usize,
}

impl CompositeHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_handler(&mut self, handler: impl ScanHandler + 'static) -> &mut Self {
        self.children.push(Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn each(&mut self, mut f: impl FnMut(&mut dyn ScanHandler) -> Result<(), ScanError>) -> Result<(), ScanError> {
        for child in self.children.iter_mut() {
            f(child.as_mut())?;
        }
        Ok(())
    }

    /// 关闭前 `upto` 个子处理器；全部尝试，返回第一个错误
    fn close_prefix(&mut self, upto: usize) -> Result<(), ScanError> {
        let mut first_err = None;
        for child in self.children.iter_mut().take(upto) {
            if let Err(e) = child.close() {
                warn!(handler = child.name(), error = %e, "handler close failed");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl ScanHandler for CompositeHandler {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn open(&mut self) -> Result<(), ScanError> {
        for i in 0..self.children.len() {
            if let Err(e) = self.children[i].open() {
                // 已打开的兄弟节点必须先释放，再把失败向上传播
                if let Err(close_err) = self.close_prefix(i) {
                    warn!(error = %close_err, "rollback after partial open failed");
                }
                self.opened = 0;
                return Err(e);
            }
            self.opened = i + 1;
        }
        Ok(())
    }

    fn on_sensitive(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        self.each(|h| h.on_sensitive(path, pattern, size_limit))
    }

    fn on_non_sensitive(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        self.each(|h| h.on_non_sensitive(path, pattern, size_limit))
    }

    fn on_skipped(&mut self, path: &Path, pattern: &str, size_limit: u64) -> Result<(), ScanError> {
        self.each(|h| h.on_skipped(path, pattern, size_limit))
    }

    fn close(&mut self) -> Result<(), ScanError> {
        let opened = std::mem::take(&mut self.opened);
        self.close_prefix(opened)
    }
}

/// 已打开的处理器；离开作用域时（包括 `?` 提前返回与 panic 展开）保证调用 `close`
pub struct HandlerSession<'h, H: ScanHandler + ?Sized> {
    handler: &'h mut H,
    open: bool,
}

impl<'h, H: ScanHandler + ?Sized> HandlerSession<'h, H> {
    /// 打开处理器；失败时不产生会话，也不会调用 `close`
    pub fn open(handler: &'h mut H) -> Result<Self, ScanError> {
        handler.open()?;
        Ok(Self { handler, open: true })
    }

    pub fn handler(&mut self) -> &mut H {
        &mut *self.handler
    }

    /// 显式关闭并返回关闭结果
    pub fn close(mut self) -> Result<(), ScanError> {
        self.open = false;
        self.handler.close()
    }
}

impl<H: ScanHandler + ?Sized> Drop for HandlerSession<'_, H> {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            if let Err(e) = self.handler.close() {
                warn!(handler = self.handler.name(), error = %e, "close on drop failed");
            }
        }
    }
}
