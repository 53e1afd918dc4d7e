//! All errors related to parsing commit messages.

use std::fmt;

use crate::tree::Position;

/// The error returned when parsing a commit message fails.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,

    token: String,
    position: Position,
    expected: Vec<&'static str>,
}

impl Error {
    /// Report `token` as unexpected at `position`, where one of `expected`
    /// would have been valid.
    pub(crate) fn unexpected(token: &str, position: Position, expected: Vec<&'static str>) -> Self {
        let kind = if token.is_empty() {
            ErrorKind::UnexpectedEof
        } else {
            ErrorKind::UnexpectedToken
        };

        Self {
            kind,
            token: token.to_owned(),
            position,
            expected,
        }
    }

    /// The kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The offending token, `None` when the input ended.
    pub fn token(&self) -> Option<&str> {
        match self.kind {
            ErrorKind::UnexpectedEof => None,
            ErrorKind::UnexpectedToken => Some(&self.token),
        }
    }

    /// Where the offending token was found.
    pub fn position(&self) -> Position {
        self.position
    }

    /// The tokens that would have been accepted instead.
    ///
    /// Productions without literal alternatives are listed by name, e.g.
    /// `<type>`.
    pub fn expected(&self) -> &[&'static str] {
        &self.expected
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::UnexpectedEof => f.write_str("unexpected token EOF")?,
            ErrorKind::UnexpectedToken => write!(f, "unexpected token '{}'", self.token)?,
        }
        write!(
            f,
            " at {}, valid tokens [{}]",
            self.position,
            self.expected.join(", ")
        )
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// All possible error kinds returned when parsing a commit message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The next token does not match any alternative of the grammar.
    UnexpectedToken,

    /// The message ended in the middle of a production.
    UnexpectedEof,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::unexpected(" ", Position::new(1, 5, 4), vec!["(", "!", ":"]);
        assert_eq!(err.kind(), ErrorKind::UnexpectedToken);
        assert_eq!(err.token(), Some(" "));
        assert_eq!(
            err.to_string(),
            "unexpected token ' ' at 1:5, valid tokens [(, !, :]"
        );

        let err = Error::unexpected("", Position::new(1, 33, 32), vec![")"]);
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
        assert_eq!(err.token(), None);
        assert_eq!(
            err.to_string(),
            "unexpected token EOF at 1:33, valid tokens [)]"
        );
    }
}
