//! Byte cursor over project-file source
//!
//! The cursor knows about the lexical layer only: blanks, line
//! continuations and comments. Everything it skips is ASCII, so byte
//! positions always stay on character boundaries.

/// A saved cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pos: usize,
    line: u32,
}

/// Position-tracking cursor
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
}

impl<'a> Cursor<'a> {
    /// Start at the beginning of `src`, which begins on `line`
    pub fn new(src: &'a str, line: u32) -> Self {
        Self { src, pos: 0, line }
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    /// The next full character
    pub fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    /// Whether the remaining input starts with `s`
    pub fn starts_with(&self, s: &str) -> bool {
        self.src[self.pos..].starts_with(s)
    }

    /// Consume one character
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Consume `n` ASCII bytes
    pub fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    /// Consume bytes while `pred` holds and return them
    pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.bump();
        }
        &self.src[start..self.pos]
    }

    pub fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
        }
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
    }

    /// Whether a backslash here ends the physical line
    pub fn at_continuation(&self) -> bool {
        if self.peek() != Some(b'\\') {
            return false;
        }
        let rest = &self.src.as_bytes()[self.pos + 1..];
        for &b in rest {
            match b {
                b' ' | b'\t' | b'\r' => continue,
                b'\n' => return true,
                _ => return false,
            }
        }
        true
    }

    fn skip_continuation(&mut self) {
        self.bump();
        while let Some(b) = self.peek() {
            self.bump();
            if b == b'\n' {
                break;
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.bump();
        }
    }

    /// Skip spaces, continuations and comments, stopping at a newline
    pub fn skip_blanks(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\r' => {
                    self.bump();
                }
                b'\\' if self.at_continuation() => self.skip_continuation(),
                b'#' => self.skip_comment(),
                _ => break,
            }
        }
    }

    /// Skip blanks and whole empty lines
    pub fn skip_blank_lines(&mut self) {
        loop {
            self.skip_blanks();
            if self.peek() == Some(b'\n') {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Whether only blanks remain on this line
    pub fn at_line_end(&mut self) -> bool {
        self.skip_blanks();
        matches!(self.peek(), None | Some(b'\n'))
    }

    /// Whether `keyword` starts here as a complete word
    pub fn at_keyword(&self, keyword: &str) -> bool {
        self.starts_with(keyword)
            && !self
                .src
                .as_bytes()
                .get(self.pos + keyword.len())
                .is_some_and(|&b| is_name_byte(b))
    }
}

/// Bytes allowed in `$$NAME` references
#[inline]
pub fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blanks_and_comments() {
        let mut cur = Cursor::new("  # comment\nX", 1);
        cur.skip_blanks();
        assert_eq!(cur.peek(), Some(b'\n'));
        cur.skip_blank_lines();
        assert_eq!(cur.peek(), Some(b'X'));
        assert_eq!(cur.line(), 2);
    }

    #[test]
    fn test_continuation() {
        let mut cur = Cursor::new("\\  \n  b", 1);
        assert!(cur.at_continuation());
        cur.skip_blanks();
        assert_eq!(cur.peek(), Some(b'b'));
        assert_eq!(cur.line(), 2);

        let cur = Cursor::new("\\\"", 1);
        assert!(!cur.at_continuation());
    }

    #[test]
    fn test_mark_and_reset() {
        let mut cur = Cursor::new("ab\ncd", 5);
        let mark = cur.mark();
        cur.advance(3);
        assert_eq!(cur.line(), 6);
        cur.reset(mark);
        assert_eq!(cur.line(), 5);
        assert_eq!(cur.take_while(|b| b != b'\n'), "ab");
    }

    #[test]
    fn test_keyword() {
        assert!(Cursor::new("else {", 1).at_keyword("else"));
        assert!(Cursor::new("else:", 1).at_keyword("else"));
        assert!(!Cursor::new("elsewhere", 1).at_keyword("else"));
    }
}
