use std::fmt;

/// A position in the source text.
///
/// `line` and `column` are 0-based and count characters; `index` is the byte offset into the
/// source, which is what diagnostics use for their spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mark {
    pub index: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line + 1, self.column + 1)
    }
}

/// Sequential, peekable character source over a borrowed string.
///
/// Every consumed character advances the position; any line break (`\n`, `\r\n` or a lone `\r`)
/// moves to the next line and resets the column to 0.
#[derive(Debug, Clone)]
pub struct Stream<'a> {
    input: &'a str,
    index: usize,
    line: usize,
    column: usize,
}

impl<'a> Stream<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            index: 0,
            line: 0,
            column: 0,
        }
    }

    pub fn mark(&self) -> Mark {
        Mark {
            index: self.index,
            line: self.line,
            column: self.column,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The unread part of the input. Pattern matching runs against this slice.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.index..]
    }

    pub fn is_eof(&self) -> bool {
        self.index >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    /// Consumes one character and updates the position.
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += c.len_utf8();
        match c {
            '\n' => self.new_line(),
            '\r' if self.peek() != Some('\n') => self.new_line(),
            _ => self.column += 1,
        }
        Some(c)
    }

    /// Consumes `n` characters (fewer if the input ends first).
    pub fn eat(&mut self, n: usize) {
        for _ in 0..n {
            if self.next_char().is_none() {
                break;
            }
        }
    }

    /// Consumes `n` characters and returns them.
    pub fn take(&mut self, n: usize) -> String {
        let mut taken = String::new();
        for _ in 0..n {
            match self.next_char() {
                Some(c) => taken.push(c),
                None => break,
            }
        }
        taken
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_tracking() {
        let mut stream = Stream::new("ab\ncd");
        assert_eq!(stream.next_char(), Some('a'));
        assert_eq!(stream.next_char(), Some('b'));
        assert_eq!(stream.mark(), Mark { index: 2, line: 0, column: 2 });
        assert_eq!(stream.next_char(), Some('\n'));
        assert_eq!(stream.mark(), Mark { index: 3, line: 1, column: 0 });
        stream.eat(5);
        assert!(stream.is_eof());
        assert_eq!(stream.next_char(), None);
        assert_eq!(stream.column(), 2);
    }

    #[test]
    fn test_crlf_counts_as_one_break() {
        let mut stream = Stream::new("a\r\nb\rc");
        stream.eat(3);
        assert_eq!(stream.line(), 1);
        assert_eq!(stream.column(), 0);
        stream.eat(2);
        assert_eq!(stream.line(), 2);
        assert_eq!(stream.peek(), Some('c'));
    }

    #[test]
    fn test_multibyte_characters() {
        let mut stream = Stream::new("é: ü");
        assert_eq!(stream.take(2), "é:");
        assert_eq!(stream.index(), 3);
        assert_eq!(stream.column(), 2);
        assert_eq!(stream.peek_nth(1), Some('ü'));
        assert_eq!(stream.remaining(), " ü");
    }
}
