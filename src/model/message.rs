//! The resolved `Message` declaration and its Head/Tail sections
//! (SPEC_FULL.md §3, §4.3).

use std::rc::Rc;

use crate::layout::PointerWidth;
use crate::model::member::MemberSlot;

#[derive(Debug, Clone)]
pub struct HeadSection {
    /// The user-declared byte budget for the whole fixed head region,
    /// including the 8 implicit header bytes.
    pub declared_size: u32,
    pub members: Vec<MemberSlot>,
    pub pointer_width: PointerWidth,
}

#[derive(Debug, Clone)]
pub struct TailSection {
    /// Every entry here is a `TagsBlock`; the verifier rejects a bare
    /// (untagged) direct member of a tail (SPEC_FULL.md §3 TailSection).
    pub members: Vec<MemberSlot>,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub name: Rc<str>,
    pub id: u32,
    pub head: Option<HeadSection>,
    pub tail: Option<TailSection>,
    /// The output namespace latched at this declaration's point in the
    /// source file, if any (SPEC_FULL.md §3 "Namespace tag").
    pub namespace: Option<Rc<str>>,
}
