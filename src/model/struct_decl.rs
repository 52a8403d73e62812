//! The resolved `Struct` declaration (SPEC_FULL.md §3).
//!
//! A struct body has no pointer indirection at all: it is the flat
//! concatenation of its members' dynamic encodings, in declaration order
//! (SPEC_FULL.md §4.3 "Dynamic encoding of a value — Struct"). A struct is
//! therefore always treated as dynamic-size wherever it is referenced.

use std::rc::Rc;

use crate::model::member::MemberSlot;

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Rc<str>,
    pub members: Vec<MemberSlot>,
    /// The output namespace latched at this declaration's point in the
    /// source file, if any (SPEC_FULL.md §3 "Namespace tag").
    pub namespace: Option<Rc<str>>,
}
