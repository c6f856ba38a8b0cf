//! Character cursor over a source text.
//!
//! Tracks the byte offset, 1-based line and character column, and the indentation (count of leading
//! spaces) of the current line.

use std::sync::Arc;

use crate::ast::Position;

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    file: Arc<str>,
    offset: usize,
    line: u32,
    col: u32,
    indent: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(file: impl Into<Arc<str>>, text: &'a str) -> Self {
        Self {
            text,
            file: file.into(),
            offset: 0,
            line: 1,
            col: 1,
            indent: leading_spaces(text),
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.text[self.offset..].chars().next()
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.text.len()
    }

    pub fn take(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
            self.indent = leading_spaces(&self.text[self.offset..]);
        } else {
            self.col += 1;
        }
        Some(c)
    }

    /// Take characters while `pred` holds.
    pub fn take_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let start = self.offset;
        while self.peek().is_some_and(&mut pred) {
            self.take();
        }
        &self.text[start..self.offset]
    }

    pub fn position(&self) -> Position {
        Position {
            file: Arc::clone(&self.file),
            offset: self.offset,
            line: self.line,
            col: self.col,
        }
    }

    /// Move back to a position previously returned by [`Cursor::position`].
    pub fn revert(&mut self, to: &Position) {
        self.offset = to.offset;
        self.line = to.line;
        self.col = to.col;
        let line_start = self.text[..to.offset].rfind('\n').map_or(0, |i| i + 1);
        self.indent = leading_spaces(&self.text[line_start..]);
    }

    /// Leading spaces of the line the cursor is on.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Text between a saved position and the cursor.
    pub fn slice_from(&self, from: &Position) -> &'a str {
        &self.text[from.offset..self.offset]
    }
}

fn leading_spaces(text: &str) -> usize {
    text.bytes().take_while(|b| *b == b' ').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_lines_columns_and_indent() {
        let mut c = Cursor::new("t", "ab\n  cd");
        assert_eq!(c.indent(), 0);
        assert_eq!(c.take(), Some('a'));
        assert_eq!(c.take(), Some('b'));
        assert_eq!(c.position().col, 3);
        assert_eq!(c.take(), Some('\n'));
        let p = c.position();
        assert_eq!((p.line, p.col, p.offset), (2, 1, 3));
        assert_eq!(c.indent(), 2);
        assert_eq!(c.take_while(|ch| ch == ' '), "  ");
        assert_eq!(c.take_while(|ch| ch.is_ascii_alphabetic()), "cd");
        assert!(c.is_at_end());
        assert_eq!(c.take(), None);
    }

    #[test]
    fn columns_count_characters() {
        let mut c = Cursor::new("t", "éa");
        c.take();
        let p = c.position();
        assert_eq!(p.col, 2);
        assert_eq!(p.offset, 2);
        assert_eq!(c.peek(), Some('a'));
    }

    #[test]
    fn revert_restores_position_and_indent() {
        let mut c = Cursor::new("t", "   x\ny");
        let start = c.position();
        c.take_while(|_| true);
        assert_eq!(c.indent(), 0);
        c.revert(&start);
        assert_eq!(c.position(), start);
        assert_eq!(c.indent(), 3);
        c.take_while(|ch| ch != '\n');
        assert_eq!(c.slice_from(&start), "   x");
    }
}
