//! A parser for [Conventional Commit] messages that keeps track of where
//! everything came from.
//!
//! [`parse`] turns a message into a syntax [`Node`] tree in which every
//! node knows its line, column and byte offset. [`project`] flattens that
//! tree into a [`ChangelogRecord`], the shape changelog generators expect.
//!
//! [conventional commit]: https://www.conventionalcommits.org
//!
//! # Example
//!
//! ```rust
//! use indoc::indoc;
//!
//! let message = indoc!("
//!     docs(example)!: add tested usage example
//!
//!     This example is tested using Rust's doctest capabilities. Having this
//!     example helps people understand how to use the parser.
//!
//!     Co-Authored-By: Lisa Simpson <lisa@simpsons.fam>
//!     Closes #12
//! ");
//!
//! let tree = conventional_ast::parse(message).unwrap();
//!
//! // The tree mirrors the grammar, down to the whitespace.
//! let summary = tree.children()[0].as_parent().unwrap();
//! assert_eq!(summary.child("type").unwrap().value(), Some("docs"));
//! assert_eq!(summary.child("breaking-change").unwrap().value(), Some("!"));
//!
//! // Each node knows where it was found.
//! let body = tree.as_parent().unwrap().child("body").unwrap();
//! assert_eq!(body.range().start.line, 3);
//! assert_eq!(body.range().start.to_string(), "3:1");
//!
//! // The projection gathers what a changelog needs.
//! let record = conventional_ast::project(&tree);
//! assert_eq!(record.type_(), conventional_ast::DOCS);
//! assert_eq!(record.scope().unwrap(), "example");
//! assert_eq!(record.header(), "docs(example)!: add tested usage example");
//! assert!(record.body().unwrap().contains("helps people understand"));
//!
//! // A bang after the type (or a `BREAKING CHANGE` marker) makes a note.
//! assert!(record.breaking());
//! assert_eq!(record.notes()[0].text(), "add tested usage example");
//!
//! // Footers pointing at issues become references.
//! assert_eq!(record.references()[0].action(), "Closes");
//! assert_eq!(record.references()[0].issue(), "12");
//! ```
//!
//! Messages that do not follow the grammar are rejected with the position
//! of the offending token:
//!
//! ```rust
//! let err = conventional_ast::parse("feat add a feature").unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "unexpected token ' ' at 1:5, valid tokens [(, !, :]"
//! );
//! ```

#![warn(missing_docs)]

mod changelog;
mod error;
mod parser;
mod scanner;
mod tree;

pub use changelog::{ChangelogRecord, FooterToken, Note, Reference, Scope, Type};
pub use error::{Error, ErrorKind};
pub use tree::{Leaf, LeafKind, Node, Parent, ParentKind, Position, Range};

/// Parse a commit message into a syntax tree rooted at a `message` node.
///
/// Leading and trailing whitespace and line breaks are ignored; positions
/// still refer to `text` as given.
///
/// # Errors
///
/// This function returns an error if the message does not conform to the
/// Conventional Commit grammar.
pub fn parse(text: &str) -> Result<Node<'_>, Error> {
    parser::parse(text)
}

/// Flatten a `message` tree into a changelog record.
pub fn project<'a>(tree: &Node<'a>) -> ChangelogRecord<'a> {
    ChangelogRecord::from_tree(tree)
}

/// Commit type when introducing new features (correlates with `minor` in semver)
pub const FEAT: Type<'static> = Type::FEAT;
/// Commit type when patching a bug (correlates with `patch` in semver)
pub const FIX: Type<'static> = Type::FIX;
/// Possible commit type when reverting changes.
pub const REVERT: Type<'static> = Type::REVERT;
/// Possible commit type for changing documentation.
pub const DOCS: Type<'static> = Type::DOCS;
/// Possible commit type for changing code style.
pub const STYLE: Type<'static> = Type::STYLE;
/// Possible commit type for refactoring code structure.
pub const REFACTOR: Type<'static> = Type::REFACTOR;
/// Possible commit type for performance optimizations.
pub const PERF: Type<'static> = Type::PERF;
/// Possible commit type for addressing tests.
pub const TEST: Type<'static> = Type::TEST;
/// Possible commit type for other things.
pub const CHORE: Type<'static> = Type::CHORE;
