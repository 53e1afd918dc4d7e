//! A cursor over the commit message text.

use crate::tree::Position;

/// Tracks line, column and byte offset while the parser walks the text.
///
/// The position is the only mutable state; productions snapshot it with
/// [`Scanner::position`] and backtrack with [`Scanner::rewind`].
#[derive(Clone, Debug)]
pub(crate) struct Scanner<'a> {
    text: &'a str,
    pos: Position,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self::with_position(text, Position::START)
    }

    pub(crate) fn with_position(text: &'a str, pos: Position) -> Self {
        Self { text, pos }
    }

    pub(crate) fn eof(&self) -> bool {
        self.pos.offset >= self.text.len()
    }

    fn rest(&self) -> &'a str {
        self.text.get(self.pos.offset..).unwrap_or_default()
    }

    /// The next logical token, without consuming it.
    ///
    /// This is a single character, except for `\r\n` and `!:` which are
    /// returned whole. Empty at EOF.
    pub(crate) fn peek(&self) -> &'a str {
        let rest = self.rest();
        let mut chars = rest.chars();
        let Some(first) = chars.next() else {
            return "";
        };
        let len = match (first, chars.next()) {
            ('\r', Some('\n')) | ('!', Some(':')) => 2,
            _ => first.len_utf8(),
        };
        &rest[..len]
    }

    pub(crate) fn peek_literal(&self, literal: &str) -> bool {
        self.rest().starts_with(literal)
    }

    /// Consume the next logical token, see [`Scanner::peek`].
    pub(crate) fn next(&mut self) -> &'a str {
        let token = self.peek();
        self.advance(token);
        token
    }

    /// Consume exactly `n` characters.
    pub(crate) fn next_chars(&mut self, n: usize) -> &'a str {
        let rest = self.rest();
        let len = rest.char_indices().nth(n).map_or(rest.len(), |(i, _)| i);
        let token = &rest[..len];
        self.advance(token);
        token
    }

    fn advance(&mut self, token: &str) {
        self.pos.offset += token.len();
        let mut chars = token.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                // `\r\n` is a single line break, counted on the `\n`
                '\r' if chars.peek() == Some(&'\n') => {}
                '\r' | '\n' => {
                    self.pos.line += 1;
                    self.pos.column = 1;
                }
                _ => self.pos.column += 1,
            }
        }
    }

    pub(crate) fn position(&self) -> Position {
        self.pos
    }

    pub(crate) fn rewind(&mut self, pos: Position) {
        self.pos = pos;
    }

    pub(crate) fn consume_whitespace(&mut self) {
        while is_whitespace(self.peek()) {
            self.next();
        }
    }

    /// The text between two positions previously reported by this scanner.
    pub(crate) fn slice(&self, start: Position, end: Position) -> &'a str {
        &self.text[start.offset..end.offset]
    }
}

// <ZWNBSP>          ::= "U+FEFF"
// <TAB>             ::= "U+0009"
// <VT>              ::= "U+000B"
// <FF>              ::= "U+000C"
// <SP>              ::= "U+0020"
// <NBSP>            ::= "U+00A0"
// <whitespace>      ::= <ZWNBSP> | <TAB> | <VT> | <FF> | <SP> | <NBSP>
pub(crate) fn is_whitespace(token: &str) -> bool {
    matches!(
        token,
        "\u{feff}" | "\u{0009}" | "\u{000b}" | "\u{000c}" | "\u{0020}" | "\u{00a0}"
    )
}

// <CR>              ::= "0x000D"
// <LF>              ::= "0x000A"
// <newline>         ::= [<CR>], <LF>
pub(crate) fn is_newline(token: &str) -> bool {
    token.starts_with(&['\r', '\n'][..])
}

// <parens>          ::= "(" | ")"
pub(crate) fn is_parens(token: &str) -> bool {
    token == "(" || token == ")"
}

#[cfg(test)]
#[allow(clippy::non_ascii_literal)]
mod tests {
    use super::*;

    #[test]
    fn test_peek() {
        assert_eq!(Scanner::new("").peek(), "");
        assert_eq!(Scanner::new("abc").peek(), "a");
        assert_eq!(Scanner::new("\r\nabc").peek(), "\r\n");
        assert_eq!(Scanner::new("\rabc").peek(), "\r");
        assert_eq!(Scanner::new("!: abc").peek(), "!:");
        assert_eq!(Scanner::new("! abc").peek(), "!");
        assert_eq!(Scanner::new("ünï").peek(), "ü");
    }

    #[test]
    fn test_next_tracks_position() {
        let mut scanner = Scanner::new("ab\r\nc\nü!:");
        assert_eq!(scanner.next(), "a");
        assert_eq!(scanner.next(), "b");
        assert_eq!(scanner.position(), Position::new(1, 3, 2));
        assert_eq!(scanner.next(), "\r\n");
        assert_eq!(scanner.position(), Position::new(2, 1, 4));
        assert_eq!(scanner.next(), "c");
        assert_eq!(scanner.next(), "\n");
        assert_eq!(scanner.position(), Position::new(3, 1, 6));
        assert_eq!(scanner.next(), "ü");
        assert_eq!(scanner.position(), Position::new(3, 2, 8));
        assert_eq!(scanner.next(), "!:");
        assert_eq!(scanner.position(), Position::new(3, 4, 10));
        assert!(scanner.eof());
        assert_eq!(scanner.next(), "");
        assert_eq!(scanner.position(), Position::new(3, 4, 10));
    }

    #[test]
    fn test_lone_carriage_return_breaks_line() {
        let mut scanner = Scanner::new("a\rb");
        scanner.next();
        scanner.next();
        assert_eq!(scanner.position(), Position::new(2, 1, 2));
    }

    #[test]
    fn test_next_chars() {
        let mut scanner = Scanner::new("BREAKING CHANGE: oops");
        assert!(scanner.peek_literal("BREAKING CHANGE"));
        assert!(!scanner.peek_literal("BREAKING-CHANGE"));
        assert_eq!(scanner.next_chars("BREAKING CHANGE".len()), "BREAKING CHANGE");
        assert_eq!(scanner.position(), Position::new(1, 16, 15));
        assert_eq!(scanner.next_chars(1), ":");

        let mut scanner = Scanner::new("añ");
        assert_eq!(scanner.next_chars(5), "añ");
        assert_eq!(scanner.position(), Position::new(1, 3, 3));
    }

    #[test]
    fn test_rewind() {
        let mut scanner = Scanner::new("foo\nbar");
        let start = scanner.position();
        scanner.next_chars(5);
        assert_eq!(scanner.position(), Position::new(2, 2, 5));
        scanner.rewind(start);
        assert_eq!(scanner.position(), Position::START);
        assert_eq!(scanner.peek(), "f");
    }

    #[test]
    fn test_with_position() {
        let scanner = Scanner::with_position("fix: x\nfeat: y", Position::new(2, 1, 7));
        assert_eq!(scanner.peek(), "f");
        assert!(scanner.peek_literal("feat"));
        assert_eq!(scanner.position().line, 2);
    }

    #[test]
    fn test_consume_whitespace() {
        let mut scanner = Scanner::new(" \t\u{a0}\u{feff}x");
        scanner.consume_whitespace();
        assert_eq!(scanner.peek(), "x");
        assert_eq!(scanner.position(), Position::new(1, 5, 7));

        let mut scanner = Scanner::new("\nx");
        scanner.consume_whitespace();
        assert_eq!(scanner.position(), Position::START);
    }

    #[test]
    fn test_slice() {
        let mut scanner = Scanner::new("feat(api): ok");
        let start = scanner.position();
        scanner.next_chars(4);
        assert_eq!(scanner.slice(start, scanner.position()), "feat");
    }

    #[test]
    fn test_classifiers() {
        for ws in ["\u{feff}", "\t", "\u{b}", "\u{c}", " ", "\u{a0}"] {
            assert!(is_whitespace(ws), "{ws:?}");
        }
        assert!(!is_whitespace("\n"));
        assert!(!is_whitespace("\u{2003}"));
        assert!(!is_whitespace(""));
        assert!(!is_whitespace("  "));

        assert!(is_newline("\n"));
        assert!(is_newline("\r\n"));
        assert!(is_newline("\r"));
        assert!(!is_newline(""));
        assert!(!is_newline(" "));

        assert!(is_parens("("));
        assert!(is_parens(")"));
        assert!(!is_parens("["));
        assert!(!is_parens(""));
    }
}
