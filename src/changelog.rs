//! The flat record consumed by changelog generators.

use std::fmt;
use std::ops::Deref;

use winnow::ascii::digit1;
use winnow::combinator::trace;
use winnow::error::ContextError;
use winnow::Parser;

use crate::parser::{parse_component, BREAKING_ARROW, BREAKING_PHRASE};
use crate::tree::{LeafKind, Node, ParentKind};
use crate::Error;

/// A commit message, flattened into the fields a changelog needs.
///
/// Built from a syntax tree with [`ChangelogRecord::from_tree`] (or
/// [`crate::project`]), or straight from text with
/// [`ChangelogRecord::parse`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangelogRecord<'a> {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    ty: Type<'a>,
    scope: Option<Scope<'a>>,
    subject: &'a str,
    header: String,
    body: Option<String>,
    notes: Vec<Note>,
    references: Vec<Reference<'a>>,
}

impl<'a> ChangelogRecord<'a> {
    /// Parse a commit message and project it into a record.
    ///
    /// # Errors
    ///
    /// This function returns an error if the message does not conform to the
    /// Conventional Commit grammar.
    pub fn parse(text: &'a str) -> Result<Self, Error> {
        let tree = crate::parser::parse(text)?;
        Ok(Self::from_tree(&tree))
    }

    /// Project a `message` tree into a record.
    ///
    /// Fields missing from the tree are left empty.
    pub fn from_tree(tree: &Node<'a>) -> Self {
        use LeafKind as L;
        use ParentKind as P;

        let mut ty = "";
        let mut scope = None;
        let mut subject = "";
        let mut summary_breaking = false;
        let mut body = Vec::new();
        let mut body_note: Option<Vec<&'a str>> = None;
        let mut footer: Option<FooterScan<'a>> = None;
        let mut footers = Vec::new();

        let mut pending = vec![(tree, 0)];
        let mut ancestors: Vec<ParentKind> = Vec::new();
        while let Some((node, depth)) = pending.pop() {
            ancestors.truncate(depth);
            let leaf = match node {
                Node::Parent(parent) => {
                    if parent.kind() == P::Footer && ancestors == [P::Message] {
                        footers.extend(footer.replace(FooterScan::default()));
                    }
                    ancestors.push(parent.kind());
                    pending.extend(parent.children().iter().rev().map(|child| (child, depth + 1)));
                    continue;
                }
                Node::Leaf(leaf) => leaf,
            };

            let value = leaf.value();
            match (ancestors.as_slice(), leaf.kind()) {
                ([P::Message, P::Summary], L::Type) => ty = value,
                ([P::Message, P::Summary], L::Scope) => scope = Some(value),
                ([P::Message, P::Summary], L::BreakingChange) => summary_breaking = true,
                ([P::Message, P::Summary], L::Text) => subject = value,
                ([P::Message, P::Body], L::BreakingChange) => {
                    body_note.get_or_insert_with(Vec::new);
                }
                ([P::Message, P::Body], L::Text) => {
                    body.push(value);
                    if let Some(note) = body_note.as_mut() {
                        note.push(value);
                    }
                }
                ([P::Message, P::Footer, path @ ..], kind) => {
                    if let Some(footer) = footer.as_mut() {
                        footer.visit(path, kind, value);
                    }
                }
                _ => {}
            }
        }
        footers.extend(footer);

        let mut header = ty.to_owned();
        if let Some(scope) = scope {
            header.push('(');
            header.push_str(scope);
            header.push(')');
        }
        if summary_breaking {
            header.push('!');
        }
        header.push_str(": ");
        header.push_str(subject);

        // Only one note is kept: summary, then body, then footers.
        let note = summary_breaking
            .then(|| subject.to_owned())
            .or_else(|| body_note.map(|lines| lines.join("\n")))
            .or_else(|| {
                footers
                    .iter()
                    .find(|footer| footer.breaking)
                    .map(|footer| footer.lines.join("\n"))
            })
            .map(|text| Note {
                title: BREAKING_PHRASE,
                text,
            });

        Self {
            ty: Type::new_unchecked(ty),
            scope: scope.map(Scope::new_unchecked),
            subject,
            header,
            body: (!body.is_empty()).then(|| body.join("\n")),
            notes: note.into_iter().collect(),
            references: footers.iter().filter_map(FooterScan::reference).collect(),
        }
    }

    /// The type of the commit.
    pub fn type_(&self) -> Type<'a> {
        self.ty
    }

    /// The optional scope of the commit.
    pub fn scope(&self) -> Option<Scope<'a>> {
        self.scope
    }

    /// The text of the summary line after the separator.
    pub fn subject(&self) -> &'a str {
        self.subject
    }

    /// The summary line rebuilt from its components, e.g.
    /// `feat(parser)!: add scopes`.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The free-form body lines, joined by newlines.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Notes about breaking changes.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Issues referenced by footers, e.g. `Closes #12`.
    pub fn references(&self) -> &[Reference<'a>] {
        &self.references
    }

    /// A flag to signal that the commit contains breaking changes.
    ///
    /// This flag is set when the summary has an exclamation mark after the
    /// type and scope, when a body line starts with `BREAKING CHANGE: `, or
    /// when a footer has the `BREAKING CHANGE` token:
    /// ```text
    /// feat: my commit description
    ///
    /// BREAKING CHANGE: this is a breaking change
    /// ```
    pub fn breaking(&self) -> bool {
        !self.notes.is_empty()
    }
}

/// What one footer contributes to the record.
#[derive(Default)]
struct FooterScan<'a> {
    action: Option<&'a str>,
    breaking: bool,
    separator: &'a str,
    lines: Vec<&'a str>,
}

impl<'a> FooterScan<'a> {
    /// Record a leaf found at `path` below the footer.
    fn visit(&mut self, path: &[ParentKind], kind: LeafKind, value: &'a str) {
        match (path, kind) {
            ([ParentKind::Token], LeafKind::Type) => self.action = Some(value),
            ([ParentKind::Token], LeafKind::BreakingChange) => {
                self.action = Some(value);
                self.breaking = true;
            }
            ([], LeafKind::Separator) => self.separator = value,
            ([ParentKind::Value], LeafKind::Text)
            | ([ParentKind::Value, ParentKind::Continuation], LeafKind::Text) => {
                if !value.is_empty() {
                    self.lines.push(value);
                }
            }
            _ => {}
        }
    }

    /// Only the first non-empty line of the value can name an issue.
    fn reference(&self) -> Option<Reference<'a>> {
        let action = self.action?;
        let text = *self.lines.first()?;
        let (issue, referenced) = match text.strip_prefix('#') {
            Some(issue) => (issue, true),
            None => (text, self.separator == " #"),
        };
        (referenced && is_issue_number(issue)).then(|| Reference {
            action: FooterToken::new_unchecked(action),
            issue,
            prefix: "#",
        })
    }
}

fn is_issue_number(issue: &str) -> bool {
    trace("issue", digit1::<&str, ContextError>)
        .parse(issue)
        .is_ok()
}

/// A note attached to the commit, such as a breaking change description.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Note {
    title: &'static str,
    text: String,
}

impl Note {
    /// The kind of note, always `BREAKING CHANGE`.
    pub fn title(&self) -> &'static str {
        self.title
    }

    /// The description of the change.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// An issue referenced from a footer.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reference<'a> {
    action: FooterToken<'a>,
    issue: &'a str,
    prefix: &'static str,
}

impl<'a> Reference<'a> {
    /// The footer token, e.g. `Closes` or `Refs`.
    pub const fn action(&self) -> FooterToken<'a> {
        self.action
    }

    /// The issue number, without prefix.
    pub const fn issue(&self) -> &'a str {
        self.issue
    }

    /// The issue prefix, always `#`.
    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }
}

impl fmt::Display for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.action, self.prefix, self.issue)
    }
}

macro_rules! unicase_components {
    ($($ty:ident),+) => (
        $(
            /// A component of the conventional commit.
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $ty<'a>(unicase::UniCase<&'a str>);

            impl<'a> $ty<'a> {
                /// See `parse` for ensuring the data is valid.
                pub const fn new_unchecked(value: &'a str) -> Self {
                    $ty(unicase::UniCase::unicode(value))
                }

                /// Access `str` representation
                pub fn as_str(&self) -> &'a str {
                    self.0.into_inner()
                }
            }

            impl Deref for $ty<'_> {
                type Target = str;

                fn deref(&self) -> &Self::Target {
                    self.as_str()
                }
            }

            impl PartialEq<&'_ str> for $ty<'_> {
                fn eq(&self, other: &&str) -> bool {
                    *self == $ty::new_unchecked(*other)
                }
            }

            impl fmt::Display for $ty<'_> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(&self.0, f)
                }
            }

            #[cfg(feature = "serde")]
            impl serde::Serialize for $ty<'_> {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    serializer.serialize_str(self)
                }
            }
        )+
    )
}

unicase_components![Type, Scope, FooterToken];

impl<'a> Type<'a> {
    /// Parse a `str` into a `Type`.
    ///
    /// # Errors
    ///
    /// The text is not a single commit type.
    pub fn parse(text: &'a str) -> Result<Self, Error> {
        parse_component(text, crate::parser::type_)?;
        Ok(Type::new_unchecked(text))
    }
}

/// Common commit types
impl Type<'static> {
    /// Commit type when introducing new features (correlates with `minor` in semver)
    pub const FEAT: Type<'static> = Type::new_unchecked("feat");
    /// Commit type when patching a bug (correlates with `patch` in semver)
    pub const FIX: Type<'static> = Type::new_unchecked("fix");
    /// Possible commit type when reverting changes.
    pub const REVERT: Type<'static> = Type::new_unchecked("revert");
    /// Possible commit type for changing documentation.
    pub const DOCS: Type<'static> = Type::new_unchecked("docs");
    /// Possible commit type for changing code style.
    pub const STYLE: Type<'static> = Type::new_unchecked("style");
    /// Possible commit type for refactoring code structure.
    pub const REFACTOR: Type<'static> = Type::new_unchecked("refactor");
    /// Possible commit type for performance optimizations.
    pub const PERF: Type<'static> = Type::new_unchecked("perf");
    /// Possible commit type for addressing tests.
    pub const TEST: Type<'static> = Type::new_unchecked("test");
    /// Possible commit type for other things.
    pub const CHORE: Type<'static> = Type::new_unchecked("chore");
}

impl<'a> Scope<'a> {
    /// Parse a `str` into a `Scope`.
    ///
    /// # Errors
    ///
    /// The text is empty or contains parens or newlines.
    pub fn parse(text: &'a str) -> Result<Self, Error> {
        parse_component(text, crate::parser::scope)?;
        Ok(Scope::new_unchecked(text))
    }
}

impl<'a> FooterToken<'a> {
    /// Parse a `str` into a `FooterToken`.
    ///
    /// # Errors
    ///
    /// The text is neither a breaking change keyword nor a type with an
    /// optional scope.
    pub fn parse(text: &'a str) -> Result<Self, Error> {
        parse_component(text, crate::parser::token)?;
        Ok(FooterToken::new_unchecked(text))
    }

    /// A flag to signal that the footer describes a breaking change.
    pub fn breaking(&self) -> bool {
        self == &BREAKING_PHRASE || self == &BREAKING_ARROW
    }
}
