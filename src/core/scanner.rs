//! 基于关键字边界的 SQL 文本扫描。
//!
//! 这里不做语法解析：兼容模式只认关键字的单词边界，作用域模式额外跳过
//! 括号内部、字符串/引号标识符和注释中的命中。

use regex::Regex;
use std::sync::LazyLock;

static CLAUSE_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:GROUP\s+BY|HAVING|ORDER\s+BY|LIMIT)\b").expect("clause keyword pattern")
});

static WHERE_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bWHERE\b").expect("where keyword pattern"));

pub struct Scanner<'a> {
    text: &'a str,
    // None 表示兼容模式：所有位置都可见
    top_level: Option<Vec<bool>>,
}

impl<'a> Scanner<'a> {
    pub fn compatible(text: &'a str) -> Self {
        Self {
            text,
            top_level: None,
        }
    }

    pub fn scoped(text: &'a str) -> Self {
        Self {
            text,
            top_level: Some(top_level_mask(text)),
        }
    }

    fn visible(&self, idx: usize) -> bool {
        self.top_level
            .as_ref()
            .map_or(true, |mask| mask.get(idx).copied().unwrap_or(false))
    }

    /// 插入边界：最早出现的 GROUP BY / HAVING / ORDER BY / LIMIT，
    /// 作用域模式下顶层的 `;` 也算；都没有时为文本末尾。
    pub fn clause_boundary(&self) -> usize {
        let keyword = CLAUSE_KEYWORDS
            .find_iter(self.text)
            .map(|m| m.start())
            .find(|&idx| self.visible(idx));

        let terminator = match self.top_level {
            Some(_) => self
                .text
                .bytes()
                .enumerate()
                .find(|&(idx, b)| b == b';' && self.visible(idx))
                .map(|(idx, _)| idx),
            None => None,
        };

        [keyword, terminator]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(self.text.len())
    }

    /// `text[..end]` 中第一个 WHERE 关键字之后的位置
    pub fn where_end(&self, end: usize) -> Option<usize> {
        WHERE_KEYWORD
            .find_iter(&self.text[..end])
            .find(|m| self.visible(m.start()))
            .map(|m| m.end())
    }
}

/// 标记每个字节是否处于顶层：括号外，且不在字符串、引号标识符或注释里。
/// 只比较 ASCII 定界符，多字节 UTF-8 字符的字节不会误判。
fn top_level_mask(text: &str) -> Vec<bool> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut mask = vec![false; len];
    let mut depth: usize = 0;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < len {
                    if bytes[i] == b'\\' && quote != b'`' {
                        i += 2;
                        continue;
                    }
                    if bytes[i] == quote {
                        // 连写两个引号是转义
                        if i + 1 < len && bytes[i + 1] == quote {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < len && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'#' => {
                while i < len && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < len && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 1;
            }
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ => mask[i] = depth == 0,
        }
        i += 1;
    }
    mask
}
