//! Placeholder formats and the `?` marker scanner.
//!
//! Every builder renders its SQL with neutral `?` markers. The format attached to a
//! statement rewrites those markers only at the final render, so nested builders and
//! raw fragments never need to know which database dialect is in use.
//!
//! Markers inside single-quoted string literals, double-quoted identifiers, `--` line
//! comments and `/* */` block comments are left alone. Block comments do not nest. A doubled `??` is an escaped literal question mark: it is never counted and
//! numbered formats turn it into a single `?`.

use std::fmt::Write;

/// How `?` markers are written in the final SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderFormat {
    /// `?` (MySQL, SQLite). Text passes through unchanged.
    #[default]
    Question,
    /// `$1`, `$2`, ... (PostgreSQL)
    Dollar,
    /// `:1`, `:2`, ... (Oracle)
    Colon,
    /// `@p1`, `@p2`, ... (SQL Server)
    AtP,
}

impl PlaceholderFormat {
    /// Rewrite neutral `?` markers into this format.
    ///
    /// Numbering starts at 1 and follows the left-to-right order of markers, which is
    /// also the order of the bound arguments.
    pub fn replace_placeholders(self, sql: &str) -> String {
        if self == PlaceholderFormat::Question {
            return sql.to_string();
        }

        let mut out = String::with_capacity(sql.len() + 8);
        let mut index = 0usize;
        for segment in Segments::new(sql) {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Escaped => out.push('?'),
                Segment::Marker => {
                    index += 1;
                    self.write_marker(&mut out, index);
                }
            }
        }
        out
    }

    fn write_marker(self, out: &mut String, index: usize) {
        let _ = match self {
            PlaceholderFormat::Question => write!(out, "?"),
            PlaceholderFormat::Dollar => write!(out, "${index}"),
            PlaceholderFormat::Colon => write!(out, ":{index}"),
            PlaceholderFormat::AtP => write!(out, "@p{index}"),
        };
    }
}

/// Count the `?` markers a piece of neutral SQL expects arguments for.
pub fn count_placeholders(sql: &str) -> usize {
    Segments::new(sql)
        .filter(|segment| matches!(segment, Segment::Marker))
        .count()
}

/// `count` neutral markers separated by commas, e.g. `?,?,?`.
pub fn placeholders(count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let mut out = String::with_capacity(count * 2 - 1);
    out.push('?');
    for _ in 1..count {
        out.push_str(",?");
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// SQL text containing no marker outside quotes.
    Text(&'a str),
    /// A single `?` marker.
    Marker,
    /// A `??` pair.
    Escaped,
}

#[derive(Clone, Copy)]
enum Scan {
    Plain,
    Quoted(u8),
    LineComment,
    BlockComment,
}

/// Splits neutral SQL into text runs and markers.
pub(crate) struct Segments<'a> {
    sql: &'a str,
    pos: usize,
}

impl<'a> Segments<'a> {
    pub(crate) fn new(sql: &'a str) -> Self {
        Self { sql, pos: 0 }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.sql.as_bytes();
        let len = bytes.len();
        if self.pos >= len {
            return None;
        }

        if bytes[self.pos] == b'?' {
            if self.pos + 1 < len && bytes[self.pos + 1] == b'?' {
                self.pos += 2;
                return Some(Segment::Escaped);
            }
            self.pos += 1;
            return Some(Segment::Marker);
        }

        let start = self.pos;
        let mut i = self.pos;
        let mut state = Scan::Plain;
        while i < len {
            let b = bytes[i];
            let next = bytes.get(i + 1).copied();
            match state {
                Scan::Quoted(q) => {
                    if b == q {
                        // A doubled quote character stays inside the literal.
                        if next == Some(q) {
                            i += 2;
                            continue;
                        }
                        state = Scan::Plain;
                    }
                    i += 1;
                }
                Scan::LineComment => {
                    if b == b'\n' {
                        state = Scan::Plain;
                    }
                    i += 1;
                }
                Scan::BlockComment => {
                    if b == b'*' && next == Some(b'/') {
                        state = Scan::Plain;
                        i += 2;
                        continue;
                    }
                    i += 1;
                }
                Scan::Plain => {
                    match (b, next) {
                        (b'?', _) => break,
                        (b'\'' | b'"', _) => {
                            state = Scan::Quoted(b);
                            i += 1;
                        }
                        (b'-', Some(b'-')) => {
                            state = Scan::LineComment;
                            i += 2;
                        }
                        (b'/', Some(b'*')) => {
                            state = Scan::BlockComment;
                            i += 2;
                        }
                        _ => i += 1,
                    }
                }
            }
        }

        // Markers, quotes and comment delimiters are ASCII, so `i` always lands on a
        // char boundary.
        self.pos = i;
        Some(Segment::Text(&self.sql[start..i]))
    }
}
