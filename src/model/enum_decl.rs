//! The resolved `Enum`/`Consts` declaration (SPEC_FULL.md §3).

use std::rc::Rc;

use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMode {
    Enum,
    Consts,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: Rc<str>,
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: Rc<str>,
    pub mode: EnumMode,
    /// Always an Integer type (verified before this model is built).
    pub underlying: Type,
    pub members: Vec<EnumMember>,
    /// The output namespace latched at this declaration's point in the
    /// source file, if any (SPEC_FULL.md §3 "Namespace tag").
    pub namespace: Option<Rc<str>>,
}
