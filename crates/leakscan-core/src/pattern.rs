//! 敏感字面量匹配（Aho-Corasick 单模式）
use aho_corasick::AhoCorasick;

use crate::error::ScanError;

/// 扫描开始时给定的敏感字面量；区分大小写的子串包含判定
#[derive(Debug, Clone)]
pub struct SensitivePattern {
    literal: String,
    matcher: AhoCorasick,
}

impl SensitivePattern {
    pub fn new(literal: impl Into<String>) -> Result<Self, ScanError> {
        let literal = literal.into();
        if literal.is_empty() {
            return Err(ScanError::EmptyPattern);
        }
        let matcher = AhoCorasick::new([literal.as_str()])?;
        Ok(Self { literal, matcher })
    }

    /// 单个文本块是否包含该字面量
    pub fn is_match(&self, chunk: &str) -> bool {
        self.matcher.is_match(chunk)
    }

    pub fn as_str(&self) -> &str {
        &self.literal
    }
}
