//! 分隔符格式嗅探（基于有界前缀样本）
//!
//! 启发式：
//! - 含 NUL 字节的样本视为二进制，直接放弃；
//! - 样本被截断时丢弃最后一行（可能不完整）；
//! - 至少两行非空记录，且候选分隔符在每一行（引号外）出现次数相同且非零；
//! - 空格不是候选分隔符，普通文本会回退到纯文本策略。
use csv::{ReaderBuilder, Terminator};
use std::io::Read;

/// 候选分隔符，按优先级排列
const DELIMITERS: [u8; 5] = [b',', b'\t', b';', b'|', b':'];
const QUOTES: [u8; 2] = [b'"', b'\''];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    Lf,
    CrLf,
    Cr,
}

/// 嗅探得到的表格方言
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
    pub terminator: LineTerminator,
}

impl Dialect {
    /// 以该方言构建 csv 读取器（不区分表头，允许行长不一）
    pub(crate) fn reader<R: Read>(&self, rdr: R) -> csv::Reader<R> {
        let terminator = match self.terminator {
            LineTerminator::CrLf => Terminator::CRLF,
            LineTerminator::Lf => Terminator::Any(b'\n'),
            LineTerminator::Cr => Terminator::Any(b'\r'),
        };
        ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .terminator(terminator)
            .has_headers(false)
            .flexible(true)
            .from_reader(rdr)
    }
}

/// 对样本做方言嗅探；无法确定时返回 None
///
/// `truncated` 表示样本之后文件还有数据。
pub fn sniff(sample: &[u8], truncated: bool) -> Option<Dialect> {
    if sample.is_empty() || sample.contains(&0) {
        return None;
    }
    let text = String::from_utf8_lossy(sample);
    let terminator = detect_terminator(&text);

    let mut rows: Vec<&str> = match terminator {
        LineTerminator::Cr => text.split('\r').collect(),
        _ => text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect(),
    };
    if truncated {
        rows.pop();
    }
    rows.retain(|r| !r.trim().is_empty());
    if rows.len() < 2 {
        return None;
    }

    let quote = detect_quote(&rows);
    for &delimiter in DELIMITERS.iter() {
        let first = count_outside_quotes(rows[0], delimiter, quote);
        if first == 0 {
            continue;
        }
        if rows.iter().all(|r| count_outside_quotes(r, delimiter, quote) == first) {
            return Some(Dialect { delimiter, quote, terminator });
        }
    }
    None
}

fn detect_terminator(text: &str) -> LineTerminator {
    if text.contains("\r\n") {
        LineTerminator::CrLf
    } else if text.contains('\r') {
        LineTerminator::Cr
    } else {
        LineTerminator::Lf
    }
}

/// 单引号仅在它开启过字段、而双引号从未开启过字段时才采用
fn detect_quote(rows: &[&str]) -> u8 {
    let opens = |q: u8| rows.iter().any(|r| opens_field(r.as_bytes(), q));
    let [double, single] = QUOTES;
    if opens(single) && !opens(double) {
        single
    } else {
        double
    }
}

fn opens_field(row: &[u8], quote: u8) -> bool {
    row.iter().enumerate().any(|(i, &b)| {
        b == quote && (i == 0 || DELIMITERS.contains(&row[i - 1]))
    })
}

fn count_outside_quotes(row: &str, delimiter: u8, quote: u8) -> usize {
    let mut in_quotes = false;
    let mut n = 0;
    for &b in row.as_bytes() {
        if b == quote {
            in_quotes = !in_quotes;
        } else if b == delimiter && !in_quotes {
            n += 1;
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_comma_separated_rows() {
        let d = sniff(b"id,name,token\n1,alice,x\n2,bob,y\n", false).unwrap();
        assert_eq!(d.delimiter, b',');
        assert_eq!(d.quote, b'"');
        assert_eq!(d.terminator, LineTerminator::Lf);
    }

    #[test]
    fn sniffs_tab_and_crlf() {
        let d = sniff(b"a\tb\r\nc\td\r\n", false).unwrap();
        assert_eq!(d.delimiter, b'\t');
        assert_eq!(d.terminator, LineTerminator::CrLf);
    }

    #[test]
    fn quoted_delimiters_are_ignored_when_counting() {
        let d = sniff(b"k;v\n\"a;b\";c\n", false).unwrap();
        assert_eq!(d.delimiter, b';');
    }

    #[test]
    fn single_quote_detected_when_it_opens_fields() {
        let d = sniff(b"'a|b'|c\nd|'e'\n", false).unwrap();
        assert_eq!(d.delimiter, b'|');
        assert_eq!(d.quote, b'\'');
    }

    #[test]
    fn prose_is_not_tabular() {
        assert!(sniff(b"hello Sensitive world\n", false).is_none());
        assert!(sniff(b"just some words\nand more words here\n", false).is_none());
    }

    #[test]
    fn inconsistent_counts_are_not_tabular() {
        assert!(sniff(b"a,b,c\nd,e\n", false).is_none());
    }

    #[test]
    fn binary_sample_is_rejected() {
        assert!(sniff(b"a,b\n\0,c\n", false).is_none());
    }

    #[test]
    fn truncated_last_row_is_ignored() {
        // 最后一行被窗口截断，若参与计数会导致不一致
        assert!(sniff(b"a,b,c\nd,e,f\ng,h", true).is_some());
        assert!(sniff(b"a,b,c\nd,e,f\ng,h", false).is_none());
    }
}
