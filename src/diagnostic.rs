//! Compile-time diagnostics: one [`Diagnostic`] variant per reportable
//! condition in the lexer, parser and verifier, plus the caret-pointing
//! pretty-printer used to show them to the user.
//!
//! Ported in shape (not in code) from `bragi/parser.py`'s `report_message`
//! and `expected_to_human_readable`: a source line is printed with a `^`
//! marker under the offending column, followed by an optional note.

use std::fmt;

/// A 1-based line/column position in a single source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Diagnostic {
    #[error("unexpected character {found:?}")]
    UnexpectedCharacter { span: Span, found: char },

    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("unexpected token {found}")]
    UnexpectedToken {
        span: Span,
        found: String,
        expected: Vec<&'static str>,
    },

    #[error("unexpected end of file")]
    UnexpectedEof { span: Span, expected: Vec<&'static str> },

    #[error("name `{name}` is already in use")]
    DuplicateName { span: Span, name: String },

    #[error("tag {tag} is used more than once in this tags block")]
    DuplicateTag { span: Span, tag: u32 },

    #[error("tag value 0 is reserved as the tags-block terminator")]
    ZeroTag { span: Span },

    #[error("duplicate message id {id}")]
    DuplicateMessageId { span: Span, id: u32 },

    #[error("duplicate member name `{name}`")]
    DuplicateMemberName { span: Span, name: String },

    #[error("tagged member `{name}` appears outside of a tags block")]
    TaggedMemberOutsideTagsBlock { span: Span, name: String },

    #[error("untagged member `{name}` appears inside a tags block")]
    UntaggedMemberInTagsBlock { span: Span, name: String },

    #[error("tags blocks cannot be nested")]
    NestedTagsBlock { span: Span },

    #[error("a tail section's direct members must each belong to a tags block")]
    BareMemberInTail { span: Span, name: String },

    #[error("unknown type `{name}`")]
    UnknownType { span: Span, name: String },

    #[error("`{name}`'s underlying type `{underlying}` is not an integer type")]
    NonIntegerUnderlying {
        span: Span,
        name: String,
        underlying: String,
    },

    #[error(
        "head section is {shortfall} byte(s) too short to fit its fixed-width members \
         (note: the head has two hidden uint32 members for the message id and tail size)"
    )]
    HeadTooSmall { span: Span, shortfall: u64 },

    #[error("unexpected declaration at top level")]
    UnexpectedTopLevelItem { span: Span },

    #[error("groups cannot be nested")]
    NestedGroup { span: Span },
}

impl Diagnostic {
    pub fn span(&self) -> Span {
        match self {
            Diagnostic::UnexpectedCharacter { span, .. }
            | Diagnostic::UnterminatedString { span }
            | Diagnostic::UnexpectedToken { span, .. }
            | Diagnostic::UnexpectedEof { span, .. }
            | Diagnostic::DuplicateName { span, .. }
            | Diagnostic::DuplicateTag { span, .. }
            | Diagnostic::ZeroTag { span }
            | Diagnostic::DuplicateMessageId { span, .. }
            | Diagnostic::DuplicateMemberName { span, .. }
            | Diagnostic::TaggedMemberOutsideTagsBlock { span, .. }
            | Diagnostic::UntaggedMemberInTagsBlock { span, .. }
            | Diagnostic::NestedTagsBlock { span }
            | Diagnostic::BareMemberInTail { span, .. }
            | Diagnostic::UnknownType { span, .. }
            | Diagnostic::NonIntegerUnderlying { span, .. }
            | Diagnostic::HeadTooSmall { span, .. }
            | Diagnostic::UnexpectedTopLevelItem { span }
            | Diagnostic::NestedGroup { span } => *span,
        }
    }

    /// Render a caret-pointing rendition of this diagnostic against `filename`/`source`,
    /// matching the teacher's terse single-message-per-line CLI reporting style.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let span = self.span();
        let line_text = source
            .split('\n')
            .nth(span.line.saturating_sub(1) as usize)
            .unwrap_or("");
        let line_no = span.line.to_string();
        let gutter = " ".repeat(line_no.len());
        let caret_padding = " ".repeat(span.column.saturating_sub(1) as usize);

        let mut out = format!("{filename}:{span}: error: {self}\n");
        out += &format!(" {line_no} | {line_text}\n");
        out += &format!(" {gutter} | {caret_padding}^\n");
        out
    }
}
