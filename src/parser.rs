use crate::scanner::{is_newline, is_parens, is_whitespace, Scanner};
use crate::tree::{Leaf, LeafKind, Node, Parent, ParentKind, Position, Range};
use crate::Error;

pub(crate) const BREAKING_PHRASE: &str = "BREAKING CHANGE";
pub(crate) const BREAKING_ARROW: &str = "BREAKING-CHANGE";

type PResult<'a> = Result<Node<'a>, Error>;

pub(crate) fn parse(text: &str) -> PResult<'_> {
    let mut scanner = Scanner::new(text.trim_end_matches(is_trimmed));
    // Leading blanks are skipped rather than cut so positions stay relative
    // to the caller's text.
    loop {
        scanner.consume_whitespace();
        if !is_newline(scanner.peek()) {
            break;
        }
        scanner.next();
    }

    let message = message(&mut scanner)?;
    debug_assert!(scanner.eof(), "{:?} remaining", scanner.position());
    Ok(message)
}

fn is_trimmed(c: char) -> bool {
    let mut buf = [0; 4];
    let token = c.encode_utf8(&mut buf);
    is_whitespace(token) || is_newline(token)
}

/// Parse a standalone component, such as a type, requiring all of `text` to
/// be consumed.
pub(crate) fn parse_component<'a>(
    text: &'a str,
    production: fn(&mut Scanner<'a>) -> PResult<'a>,
) -> PResult<'a> {
    let mut scanner = Scanner::new(text);
    let node = production(&mut scanner)?;
    if !scanner.eof() {
        return Err(unexpected(&scanner, &["EOF"]));
    }
    Ok(node)
}

/// Run `production`, restoring the scanner to where it started when the
/// production fails.
fn backtrack<'a, T>(
    scanner: &mut Scanner<'a>,
    production: impl FnOnce(&mut Scanner<'a>) -> Result<T, Error>,
) -> Result<T, Error> {
    let entry = scanner.position();
    let result = production(scanner);
    if result.is_err() {
        scanner.rewind(entry);
    }
    result
}

fn unexpected(scanner: &Scanner<'_>, expected: &[&'static str]) -> Error {
    Error::unexpected(scanner.peek(), scanner.position(), expected.to_vec())
}

fn leaf<'a>(scanner: &Scanner<'a>, kind: LeafKind, start: Position) -> Node<'a> {
    let end = scanner.position();
    Leaf::new(kind, scanner.slice(start, end), Range::new(start, end)).into()
}

fn parent<'a>(
    scanner: &Scanner<'a>,
    kind: ParentKind,
    start: Position,
    children: Vec<Node<'a>>,
) -> Node<'a> {
    Parent::new(kind, children, Range::new(start, scanner.position())).into()
}

/// Consume one or more tokens matching `accept` into a single leaf.
fn take_while1<'a>(
    scanner: &mut Scanner<'a>,
    kind: LeafKind,
    expected: &'static str,
    accept: impl Fn(&str) -> bool,
) -> PResult<'a> {
    let start = scanner.position();
    while !scanner.eof() && accept(scanner.peek()) {
        scanner.next();
    }
    if scanner.position() == start {
        return Err(unexpected(scanner, &[expected]));
    }
    Ok(leaf(scanner, kind, start))
}

// <message>         ::= <summary>, <newline>+, <body>, (<newline>+, <footer>)*
//                    |  <summary>, (<newline>+, <footer>)*
//                    |  <summary>
//
// Line breaks between sections are consumed without producing nodes.
fn message<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    let start = scanner.position();
    let mut children = vec![summary(scanner)?];

    if !scanner.eof() {
        newline(scanner)?;

        if let Ok(body) = body(scanner) {
            children.push(body);
            if !scanner.eof() {
                newline(scanner)?;
            }
        }

        while !scanner.eof() {
            children.push(footer(scanner)?);
            if !scanner.eof() {
                newline(scanner)?;
            }
        }
    }

    Ok(parent(scanner, ParentKind::Message, start, children))
}

// /* "!:" is split into a <breaking-change> node "!" and a <separator> node ":" */
// <summary>         ::= <type>, "(", <scope>, ")", ["!"], <separator>, <whitespace>*, [<text>]
//                    |  <type>, ["!"], <separator>, <whitespace>*, [<text>]
fn summary<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    backtrack(scanner, |scanner| {
        let start = scanner.position();
        let mut children = vec![type_(scanner)?];

        let scope = parenthesized_scope(scanner)?;
        let scoped = scope.is_some();
        children.extend(scope);

        if scanner.peek() == "!:" {
            let (bang, colon) = ligature(scanner);
            children.push(bang);
            children.push(colon);
        } else {
            let bang = breaking_change(scanner).ok();
            let breaking = bang.is_some();
            children.extend(bang);

            match separator(scanner) {
                Ok(separator) => children.push(separator),
                Err(_) => {
                    let mut expected = Vec::new();
                    if !scoped {
                        expected.push("(");
                    }
                    if !breaking {
                        expected.push("!");
                    }
                    expected.push(":");
                    return Err(Error::unexpected(
                        scanner.peek(),
                        scanner.position(),
                        expected,
                    ));
                }
            }
        }

        children.extend(whitespace(scanner).ok());
        children.push(text_or_empty(scanner));

        Ok(parent(scanner, ParentKind::Summary, start, children))
    })
}

// <type>            ::= <any UTF8-octets except newline or parens or ":" or "!:" or whitespace>+
pub(crate) fn type_<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    take_while1(scanner, LeafKind::Type, "<type>", |token| {
        !is_parens(token)
            && !is_whitespace(token)
            && !is_newline(token)
            && !token.starts_with(&['!', ':'][..])
    })
}

// <scope>           ::= <any UTF8-octets except newline or parens>+
pub(crate) fn scope<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    take_while1(scanner, LeafKind::Scope, "<scope>", |token| {
        !is_parens(token) && !is_newline(token)
    })
}

fn parenthesized_scope<'a>(scanner: &mut Scanner<'a>) -> Result<Option<Node<'a>>, Error> {
    if scanner.peek() != "(" {
        return Ok(None);
    }
    backtrack(scanner, |scanner| {
        scanner.next();
        let scope = scope(scanner)?;
        if scanner.peek() != ")" {
            return Err(unexpected(scanner, &[")"]));
        }
        scanner.next();
        Ok(Some(scope))
    })
}

// <text>            ::= <any UTF8-octets except newline>+
fn text<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    take_while1(scanner, LeafKind::Text, "<text>", |token| !is_newline(token))
}

/// `<text>`, or a zero-width text leaf when the line ends right away.
fn text_or_empty<'a>(scanner: &mut Scanner<'a>) -> Node<'a> {
    let start = scanner.position();
    text(scanner).unwrap_or_else(|_| leaf(scanner, LeafKind::Text, start))
}

// <whitespace>+
fn whitespace<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    take_while1(scanner, LeafKind::Whitespace, " ", is_whitespace)
}

// <newline>+
fn newline<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    take_while1(scanner, LeafKind::Newline, "<newline>", is_newline)
}

// <breaking-change> ::= "!" | "BREAKING CHANGE" | "BREAKING-CHANGE"
fn breaking_change<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    let start = scanner.position();
    let keyword = [BREAKING_PHRASE, BREAKING_ARROW]
        .into_iter()
        .find(|keyword| scanner.peek_literal(keyword));
    if scanner.peek().starts_with('!') {
        scanner.next_chars(1);
    } else if let Some(keyword) = keyword {
        scanner.next_chars(keyword.len());
    } else {
        return Err(unexpected(scanner, &["!", BREAKING_PHRASE, BREAKING_ARROW]));
    }
    Ok(leaf(scanner, LeafKind::BreakingChange, start))
}

/// Consume a fused `!:` as adjoining `breaking-change` and `separator` leaves.
fn ligature<'a>(scanner: &mut Scanner<'a>) -> (Node<'a>, Node<'a>) {
    let start = scanner.position();
    let token = scanner.next();
    let (bang, colon) = Range::new(start, scanner.position()).split_ligature(token);
    let at = bang.end.offset - bang.start.offset;
    (
        Leaf::new(LeafKind::BreakingChange, &token[..at], bang).into(),
        Leaf::new(LeafKind::Separator, &token[at..], colon).into(),
    )
}

// <separator>       ::= ":" | " #"
fn separator<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    let start = scanner.position();
    if scanner.peek() == ":" {
        scanner.next();
    } else if scanner.peek_literal(" #") {
        scanner.next_chars(2);
    } else {
        return Err(unexpected(scanner, &[":", " #"]));
    }
    Ok(leaf(scanner, LeafKind::Separator, start))
}

// <body>            ::= [<breaking-change>, ":", <whitespace>*], <text>, [<newline>+, <body>]
//
// Each line is only body text if the rest of the message, starting at that
// line, is not a block of footers.
fn body<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    backtrack(scanner, |scanner| {
        let start = scanner.position();
        if pre_footer(scanner) {
            return Err(unexpected(scanner, &["<body>"]));
        }

        let mut children = body_line(scanner)?;
        loop {
            let line_end = scanner.position();
            let Ok(line_break) = newline(scanner) else {
                break;
            };
            if scanner.eof() || pre_footer(scanner) {
                scanner.rewind(line_end);
                break;
            }
            match body_line(scanner) {
                Ok(line) => {
                    children.push(line_break);
                    children.extend(line);
                }
                Err(_) => {
                    scanner.rewind(line_end);
                    break;
                }
            }
        }

        Ok(parent(scanner, ParentKind::Body, start, children))
    })
}

fn body_line<'a>(scanner: &mut Scanner<'a>) -> Result<Vec<Node<'a>>, Error> {
    backtrack(scanner, |scanner| {
        let mut line = inline_breaking_change(scanner).unwrap_or_default();
        line.push(text(scanner)?);
        Ok(line)
    })
}

/// A `BREAKING CHANGE: ` prefix of a body line, when text follows it.
fn inline_breaking_change<'a>(scanner: &mut Scanner<'a>) -> Option<Vec<Node<'a>>> {
    backtrack(scanner, |scanner| {
        if !scanner.peek_literal(BREAKING_PHRASE) && !scanner.peek_literal(BREAKING_ARROW) {
            return Err(unexpected(scanner, &[BREAKING_PHRASE, BREAKING_ARROW]));
        }
        let marker = breaking_change(scanner)?;
        if scanner.peek() != ":" {
            return Err(unexpected(scanner, &[":"]));
        }
        let mut nodes = vec![marker, separator(scanner)?];
        nodes.extend(whitespace(scanner).ok());
        if scanner.eof() || is_newline(scanner.peek()) {
            return Err(unexpected(scanner, &["<text>"]));
        }
        Ok(nodes)
    })
    .ok()
}

// <pre-footer>      ::= <newline>*, <footer>, (<newline>+, <footer>)*
//
// Lookahead only: never produces nodes and always leaves the scanner where
// it was.
fn pre_footer(scanner: &mut Scanner<'_>) -> bool {
    let entry = scanner.position();
    let matched = footer_block(scanner);
    scanner.rewind(entry);
    matched
}

fn footer_block(scanner: &mut Scanner<'_>) -> bool {
    let _ = newline(scanner);
    loop {
        if footer(scanner).is_err() {
            return false;
        }
        if scanner.eof() {
            return true;
        }
        if newline(scanner).is_err() {
            return false;
        }
        if scanner.eof() {
            return true;
        }
    }
}

// <footer>          ::= <token>, <separator>, <whitespace>*, <value>
fn footer<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    backtrack(scanner, |scanner| {
        let start = scanner.position();
        let token = token(scanner)?;
        let typed = matches!(
            token.children().first(),
            Some(Node::Leaf(leaf)) if leaf.kind() == LeafKind::Type
        );
        let mut children = vec![token];

        if typed && scanner.peek() == "!:" {
            let (bang, colon) = ligature(scanner);
            children.push(bang);
            children.push(colon);
        } else {
            children.push(separator(scanner)?);
        }
        children.extend(whitespace(scanner).ok());
        children.push(value(scanner));

        Ok(parent(scanner, ParentKind::Footer, start, children))
    })
}

// <token>           ::= <breaking-change>
//                    |  <type>, "(", <scope>, ")"
//                    |  <type>
pub(crate) fn token<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    if let Ok(token) = backtrack(scanner, breaking_token) {
        return Ok(token);
    }
    backtrack(scanner, |scanner| {
        let start = scanner.position();
        let mut children = vec![type_(scanner)?];
        children.extend(parenthesized_scope(scanner)?);
        Ok(parent(scanner, ParentKind::Token, start, children))
    })
}

fn breaking_token<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    let start = scanner.position();
    if !scanner.peek_literal(BREAKING_PHRASE) && !scanner.peek_literal(BREAKING_ARROW) {
        return Err(unexpected(scanner, &[BREAKING_PHRASE, BREAKING_ARROW]));
    }
    let marker = breaking_change(scanner)?;
    // `BREAKING-CHANGES: ...` is an ordinary token
    if !(scanner.eof() || scanner.peek() == ":" || scanner.peek_literal(" #")) {
        return Err(unexpected(scanner, &[":", " #"]));
    }
    Ok(parent(scanner, ParentKind::Token, start, vec![marker]))
}

// <value>           ::= [<text>], <continuation>*
fn value<'a>(scanner: &mut Scanner<'a>) -> Node<'a> {
    let start = scanner.position();
    let mut children = vec![text_or_empty(scanner)];
    while let Ok(continuation) = continuation(scanner) {
        children.push(continuation);
    }
    parent(scanner, ParentKind::Value, start, children)
}

// <continuation>    ::= <newline>, <whitespace>, <text>
fn continuation<'a>(scanner: &mut Scanner<'a>) -> PResult<'a> {
    backtrack(scanner, |scanner| {
        let start = scanner.position();
        let children = vec![newline(scanner)?, whitespace(scanner)?, text(scanner)?];
        Ok(parent(scanner, ParentKind::Continuation, start, children))
    })
}
