//! A `Group`: scopes message-id uniqueness to its own members
//! (SPEC_FULL.md §3 "Group", global invariant 2).

use std::rc::Rc;

use crate::model::message::Message;

#[derive(Debug, Clone)]
pub struct Group {
    pub messages: Vec<Rc<Message>>,
}
