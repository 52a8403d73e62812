//! Component A — the resolved source model.
//!
//! Everything here is built once, by `verify`, from the raw parse tree in
//! `crate::ast`, and is immutable thereafter (SPEC_FULL.md §3
//! "Lifecycles"). Grounded on the tagged-variant restructuring the spec's
//! own Design Notes mandate (a closed `Decl` enum in place of duck-typed
//! parse tokens), laid out the way the teacher splits one file per
//! type-shape under `til/` (`til/array.rs`, `til/struct_def.rs`, ... here
//! `model/message.rs`, `model/struct_decl.rs`, `model/enum_decl.rs`, ...).

pub mod enum_decl;
pub mod group;
pub mod member;
pub mod message;
pub mod namespace;
pub mod struct_decl;

use std::rc::Rc;

pub use enum_decl::{EnumDecl, EnumMember, EnumMode};
pub use group::Group;
pub use member::{Member, MemberSlot, TagsBlock};
pub use message::{HeadSection, Message, TailSection};
pub use namespace::UsingAlias;
pub use struct_decl::StructDecl;

/// A fully-resolved compilation unit: the output of `verify` and the sole
/// input to the layout planner and emission core.
#[derive(Debug, Clone, Default)]
pub struct Unit {
    pub messages: Vec<Rc<Message>>,
    pub groups: Vec<Group>,
    pub structs: Vec<Rc<StructDecl>>,
    pub enums: Vec<Rc<EnumDecl>>,
    pub usings: Vec<UsingAlias>,
}

impl Unit {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in the unit, top-level and grouped alike — used by
    /// passes that don't care about id-uniqueness scoping (e.g. emission).
    pub fn all_messages(&self) -> impl Iterator<Item = &Rc<Message>> {
        self.messages.iter().chain(self.groups.iter().flat_map(|g| g.messages.iter()))
    }
}
