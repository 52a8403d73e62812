//! Raw parse tree — the "token tree" the parser (component C) produces
//! directly from the grammar in SPEC_FULL.md §6, before type resolution.
//! Everything here is a thin, positional record; `verify` (component D) is
//! what turns this into the resolved, immutable model in `crate::model`.

use crate::diagnostic::Span;

#[derive(Debug, Clone)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

#[derive(Debug)]
pub struct RawUnit {
    pub decls: Vec<RawDecl>,
}

#[derive(Debug)]
pub enum RawDecl {
    Message(RawMessage),
    Struct(RawStruct),
    Enum(RawEnum),
    Namespace(Spanned<String>),
    Using(RawUsing),
    Group(RawGroup),
}

#[derive(Debug)]
pub struct RawMessage {
    pub name: Spanned<String>,
    pub id: Spanned<u32>,
    pub head: Option<RawHead>,
    pub tail: Option<RawTail>,
    pub span: Span,
}

#[derive(Debug)]
pub struct RawHead {
    pub size: Spanned<u32>,
    pub members: Vec<RawMember>,
    pub span: Span,
}

#[derive(Debug)]
pub struct RawTail {
    pub members: Vec<RawMember>,
    pub span: Span,
}

#[derive(Debug)]
pub struct RawStruct {
    pub name: Spanned<String>,
    pub members: Vec<RawMember>,
    pub span: Span,
}

#[derive(Debug)]
pub enum RawMember {
    Field {
        tag: Option<Spanned<u32>>,
        type_name: Spanned<String>,
        name: Spanned<String>,
        span: Span,
    },
    Tags {
        members: Vec<RawMember>,
        span: Span,
    },
}

impl RawMember {
    pub fn span(&self) -> Span {
        match self {
            RawMember::Field { span, .. } | RawMember::Tags { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMode {
    Enum,
    Consts,
}

#[derive(Debug)]
pub struct RawEnum {
    pub name: Spanned<String>,
    pub mode: EnumMode,
    pub underlying: Spanned<String>,
    pub members: Vec<RawEnumMember>,
    pub span: Span,
}

#[derive(Debug)]
pub struct RawEnumMember {
    pub name: Spanned<String>,
    pub value: Option<Spanned<i64>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct RawUsing {
    pub from: Spanned<String>,
    pub to: Spanned<String>,
    pub span: Span,
}

#[derive(Debug)]
pub struct RawGroup {
    pub messages: Vec<RawMessage>,
    pub span: Span,
}
