//! Component D — the verifier.
//!
//! Ported in shape from `bragi/parser.py`'s `verify_member`/
//! `verify_message`/`determine_pointer_size`: walks the raw parse tree,
//! builds the type registry as it goes, and turns the whole thing into the
//! immutable model in `crate::model` — or the first `Diagnostic` it hits.
//! Re-expressed as explicit `Result`-returning passes instead of the
//! original's exception-driven mutation of a shared registry.

use std::collections::HashSet;
use std::rc::Rc;

use crate::ast::{
    EnumMode as RawEnumMode, RawDecl, RawEnum, RawGroup, RawHead, RawMember, RawMessage, RawStruct,
    RawTail, RawUnit,
};
use crate::diagnostic::Diagnostic;
use crate::layout::{choose_pointer_width, head_fixed_part_size};
use crate::model::{
    EnumDecl, EnumMember, EnumMode, Group, HeadSection, Member, MemberSlot, Message, StructDecl,
    TagsBlock, TailSection, Unit, UsingAlias,
};
use crate::types::{Type, TypeRegistry};

/// Verify a raw parse tree, returning the resolved, immutable model or the
/// first diagnostic encountered. Declarations are visited in two passes so
/// that a struct/enum may be referenced by name before its own declaration
/// appears later in the file: pass one registers every type-producing
/// declaration's *name and shape*; pass two resolves message/struct bodies
/// against the now-complete registry.
pub fn verify(raw: &RawUnit) -> Result<Unit, Diagnostic> {
    let mut names: HashSet<String> = RESERVED_NAMES.iter().map(|s| s.to_string()).collect();
    let mut registry = TypeRegistry::new();
    let mut enums: Vec<Rc<EnumDecl>> = Vec::new();
    let mut structs: Vec<Rc<StructDecl>> = Vec::new();

    // A `namespace "a.b";` tag latches for every subsequent top-level
    // declaration until the next one (or end of file). Computed once,
    // up front, so both passes below can look up "whose namespace was
    // active at declaration index i" without re-walking the decl list.
    let namespace_at = latch_namespaces(raw);

    // Pass one: register struct/enum/consts names and shapes.
    for (i, decl) in raw.decls.iter().enumerate() {
        match decl {
            RawDecl::Struct(s) => {
                declare_name(&mut names, &s.name.value, s.span)?;
                registry
                    .register(s.name.value.clone(), Type::Struct { name: Rc::from(s.name.value.as_str()) })
                    .map_err(|_| Diagnostic::DuplicateName { span: s.span, name: s.name.value.clone() })?;
            }
            RawDecl::Enum(e) => {
                declare_name(&mut names, &e.name.value, e.span)?;
                let enum_decl = build_enum_decl(e, &registry, namespace_at[i].clone())?;
                let ty = match enum_decl.mode {
                    EnumMode::Enum => Type::Enum {
                        name: Rc::from(e.name.value.as_str()),
                        underlying: Rc::new(enum_decl.underlying.clone()),
                    },
                    EnumMode::Consts => Type::Consts {
                        name: Rc::from(e.name.value.as_str()),
                        underlying: Rc::new(enum_decl.underlying.clone()),
                    },
                };
                registry
                    .register(e.name.value.clone(), ty)
                    .map_err(|_| Diagnostic::DuplicateName { span: e.span, name: e.name.value.clone() })?;
                enums.push(Rc::new(enum_decl));
            }
            _ => {}
        }
    }

    // Pass two: struct bodies, messages (top-level and grouped), namespaces/usings.
    let mut top_level_ids: HashSet<u32> = HashSet::new();
    let mut messages: Vec<Rc<Message>> = Vec::new();
    let mut groups: Vec<Group> = Vec::new();
    let mut usings: Vec<UsingAlias> = Vec::new();

    for (i, decl) in raw.decls.iter().enumerate() {
        match decl {
            RawDecl::Struct(s) => {
                structs.push(Rc::new(build_struct(s, &registry, namespace_at[i].clone())?))
            }
            RawDecl::Enum(_) => {} // handled in pass one
            RawDecl::Message(m) => {
                declare_name(&mut names, &m.name.value, m.span)?;
                declare_id(&mut top_level_ids, m.id.value, m.span)?;
                messages.push(Rc::new(build_message(m, &registry, namespace_at[i].clone())?));
            }
            RawDecl::Group(g) => {
                groups.push(build_group(g, &mut names, &registry, namespace_at[i].clone())?)
            }
            RawDecl::Namespace(_) => {} // latched above; no per-declaration record needed here
            RawDecl::Using(u) => usings.push(UsingAlias { from: u.from.value.clone(), to: u.to.value.clone() }),
        }
    }

    Ok(Unit { messages, groups, structs, enums, usings })
}

/// For each index in `raw.decls`, the namespace latched by the nearest
/// preceding `namespace` tag, if any (SPEC_FULL.md §3 "process-wide
/// latching of an output namespace for subsequent declarations").
fn latch_namespaces(raw: &RawUnit) -> Vec<Option<Rc<str>>> {
    let mut current: Option<Rc<str>> = None;
    let mut out = Vec::with_capacity(raw.decls.len());
    for decl in &raw.decls {
        if let RawDecl::Namespace(ns) = decl {
            current = Some(Rc::from(ns.value.as_str()));
        }
        out.push(current.clone());
    }
    out
}

const RESERVED_NAMES: &[&str] = &[
    "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64", "byte", "char",
    "string",
];

fn declare_name(
    names: &mut HashSet<String>,
    name: &str,
    span: crate::diagnostic::Span,
) -> Result<(), Diagnostic> {
    if !names.insert(name.to_string()) {
        return Err(Diagnostic::DuplicateName { span, name: name.to_string() });
    }
    Ok(())
}

fn declare_id(ids: &mut HashSet<u32>, id: u32, span: crate::diagnostic::Span) -> Result<(), Diagnostic> {
    if !ids.insert(id) {
        return Err(Diagnostic::DuplicateMessageId { span, id });
    }
    Ok(())
}

fn resolve_type(registry: &TypeRegistry, name: &str, span: crate::diagnostic::Span) -> Result<Type, Diagnostic> {
    registry
        .parse_type_expression(name)
        .ok_or_else(|| Diagnostic::UnknownType { span, name: name.to_string() })
}

fn build_enum_decl(
    raw: &RawEnum,
    registry: &TypeRegistry,
    namespace: Option<Rc<str>>,
) -> Result<EnumDecl, Diagnostic> {
    let underlying = resolve_type(registry, &raw.underlying.value, raw.underlying.span)?;
    if !underlying.is_integer() {
        return Err(Diagnostic::NonIntegerUnderlying {
            span: raw.underlying.span,
            name: raw.name.value.clone(),
            underlying: raw.underlying.value.clone(),
        });
    }

    let mode = match raw.mode {
        RawEnumMode::Enum => EnumMode::Enum,
        RawEnumMode::Consts => EnumMode::Consts,
    };

    let mut members = Vec::new();
    let mut next_value: i64 = 0;
    let mut seen = HashSet::new();
    for m in &raw.members {
        if !seen.insert(m.name.value.clone()) {
            return Err(Diagnostic::DuplicateMemberName { span: m.span, name: m.name.value.clone() });
        }
        let value = m.value.as_ref().map(|v| v.value).unwrap_or(next_value);
        next_value = value + 1;
        members.push(EnumMember { name: Rc::from(m.name.value.as_str()), value });
    }

    Ok(EnumDecl { name: Rc::from(raw.name.value.as_str()), mode, underlying, members, namespace })
}

/// Shared member-list verification for struct bodies, head sections and
/// tail sections. `in_tail` enforces that every top-level slot is a
/// TagsBlock (SPEC_FULL.md §3 TailSection).
fn build_member_slots(
    raw_members: &[RawMember],
    registry: &TypeRegistry,
    in_tail: bool,
) -> Result<Vec<MemberSlot>, Diagnostic> {
    let mut names = HashSet::new();
    let mut slots = Vec::new();

    for raw in raw_members {
        match raw {
            RawMember::Field { tag, type_name, name, span } => {
                if in_tail {
                    return Err(Diagnostic::BareMemberInTail { span: *span, name: name.value.clone() });
                }
                if let Some(tag) = tag {
                    return Err(Diagnostic::TaggedMemberOutsideTagsBlock {
                        span: tag.span,
                        name: name.value.clone(),
                    });
                }
                if !names.insert(name.value.clone()) {
                    return Err(Diagnostic::DuplicateMemberName { span: *span, name: name.value.clone() });
                }
                let ty = resolve_type(registry, &type_name.value, type_name.span)?;
                slots.push(MemberSlot::Field(Member { name: Rc::from(name.value.as_str()), tag: None, ty }));
            }
            RawMember::Tags { members, .. } => {
                let mut tag_values = HashSet::new();
                let mut tagged_members = Vec::new();
                for inner in members {
                    let RawMember::Field { tag, type_name, name, span } = inner else {
                        unreachable!("parser rejects nested tags blocks")
                    };
                    if !names.insert(name.value.clone()) {
                        return Err(Diagnostic::DuplicateMemberName { span: *span, name: name.value.clone() });
                    }
                    let Some(tag) = tag else {
                        return Err(Diagnostic::UntaggedMemberInTagsBlock {
                            span: *span,
                            name: name.value.clone(),
                        });
                    };
                    if tag.value == 0 {
                        return Err(Diagnostic::ZeroTag { span: tag.span });
                    }
                    if !tag_values.insert(tag.value) {
                        return Err(Diagnostic::DuplicateTag { span: tag.span, tag: tag.value });
                    }
                    let ty = resolve_type(registry, &type_name.value, type_name.span)?;
                    tagged_members.push(Member {
                        name: Rc::from(name.value.as_str()),
                        tag: Some(tag.value),
                        ty,
                    });
                }
                slots.push(MemberSlot::Tags(TagsBlock { members: tagged_members }));
            }
        }
    }

    Ok(slots)
}

fn build_struct(
    raw: &RawStruct,
    registry: &TypeRegistry,
    namespace: Option<Rc<str>>,
) -> Result<StructDecl, Diagnostic> {
    let members = build_member_slots(&raw.members, registry, false)?;
    Ok(StructDecl { name: Rc::from(raw.name.value.as_str()), members, namespace })
}

fn build_head(raw: &RawHead, registry: &TypeRegistry) -> Result<HeadSection, Diagnostic> {
    let members = build_member_slots(&raw.members, registry, false)?;
    let pointer_width = choose_pointer_width(raw.size.value);
    let fixed_part_size = head_fixed_part_size(&members, pointer_width);
    if fixed_part_size > raw.size.value as u64 {
        return Err(Diagnostic::HeadTooSmall {
            span: raw.span,
            shortfall: fixed_part_size - raw.size.value as u64,
        });
    }
    Ok(HeadSection { declared_size: raw.size.value, members, pointer_width })
}

fn build_tail(raw: &RawTail, registry: &TypeRegistry) -> Result<TailSection, Diagnostic> {
    let members = build_member_slots(&raw.members, registry, true)?;
    Ok(TailSection { members })
}

fn build_message(
    raw: &RawMessage,
    registry: &TypeRegistry,
    namespace: Option<Rc<str>>,
) -> Result<Message, Diagnostic> {
    let head = raw.head.as_ref().map(|h| build_head(h, registry)).transpose()?;
    let tail = raw.tail.as_ref().map(|t| build_tail(t, registry)).transpose()?;
    Ok(Message { name: Rc::from(raw.name.value.as_str()), id: raw.id.value, head, tail, namespace })
}

fn build_group(
    raw: &RawGroup,
    names: &mut HashSet<String>,
    registry: &TypeRegistry,
    namespace: Option<Rc<str>>,
) -> Result<Group, Diagnostic> {
    let mut ids = HashSet::new();
    let mut messages = Vec::new();
    for m in &raw.messages {
        declare_name(names, &m.name.value, m.span)?;
        declare_id(&mut ids, m.id.value, m.span)?;
        messages.push(Rc::new(build_message(m, registry, namespace.clone())?));
    }
    Ok(Group { messages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn verify_src(src: &str) -> Result<Unit, Diagnostic> {
        verify(&Parser::parse_str(src).unwrap())
    }

    #[test]
    fn verifies_minimal_message() {
        let unit = verify_src("message Empty 1 { head(8): }").unwrap();
        assert_eq!(unit.messages.len(), 1);
        assert_eq!(unit.messages[0].id, 1);
    }

    #[test]
    fn head_too_small_is_reported() {
        let err = verify_src("message M 1 { head(4): uint64 x; }").unwrap_err();
        assert!(matches!(err, Diagnostic::HeadTooSmall { .. }));
    }

    #[test]
    fn duplicate_message_name_is_reported() {
        let err = verify_src("message M 1 { head(8): } message M 2 { head(8): }").unwrap_err();
        assert!(matches!(err, Diagnostic::DuplicateName { .. }));
    }

    #[test]
    fn duplicate_message_id_is_reported() {
        let err = verify_src("message A 1 { head(8): } message B 1 { head(8): }").unwrap_err();
        assert!(matches!(err, Diagnostic::DuplicateMessageId { .. }));
    }

    #[test]
    fn group_scopes_message_ids_independently() {
        let unit = verify_src(
            "message A 1 { head(8): } group { message B 1 { head(8): } message C 2 { head(8): } }",
        )
        .unwrap();
        assert_eq!(unit.messages.len(), 1);
        assert_eq!(unit.groups[0].messages.len(), 2);
    }

    #[test]
    fn unknown_type_is_reported() {
        let err = verify_src("message M 1 { head(8): bogus x; }").unwrap_err();
        assert!(matches!(err, Diagnostic::UnknownType { .. }));
    }

    #[test]
    fn tagged_member_outside_tags_block_is_reported() {
        let err = verify_src("message M 1 { head(16): tag(1) uint32 x; }").unwrap_err();
        assert!(matches!(err, Diagnostic::TaggedMemberOutsideTagsBlock { .. }));
    }

    #[test]
    fn untagged_member_inside_tags_block_is_reported() {
        let err = verify_src("message M 1 { head(16): tags { uint32 x; } }").unwrap_err();
        assert!(matches!(err, Diagnostic::UntaggedMemberInTagsBlock { .. }));
    }

    #[test]
    fn zero_tag_is_reported() {
        let err = verify_src("message M 1 { head(16): tags { tag(0) uint32 x; } }").unwrap_err();
        assert!(matches!(err, Diagnostic::ZeroTag { .. }));
    }

    #[test]
    fn duplicate_tag_is_reported() {
        let src = "message M 1 { head(24): tags { tag(1) uint32 x; tag(1) uint32 y; } }";
        let err = verify_src(src).unwrap_err();
        assert!(matches!(err, Diagnostic::DuplicateTag { .. }));
    }

    #[test]
    fn bare_member_in_tail_is_reported() {
        let err = verify_src("message M 1 { head(8): tail: uint32 x; }").unwrap_err();
        assert!(matches!(err, Diagnostic::BareMemberInTail { .. }));
    }

    #[test]
    fn enum_with_non_integer_underlying_is_reported() {
        let err = verify_src("consts Flags string { A = 1 }").unwrap_err();
        assert!(matches!(err, Diagnostic::NonIntegerUnderlying { .. }));
    }

    #[test]
    fn enum_default_values_auto_increment() {
        let unit = verify_src("enum Color { Red, Green, Blue = 10, Purple }").unwrap();
        let values: Vec<i64> = unit.enums[0].members.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![0, 1, 10, 11]);
    }

    #[test]
    fn struct_referenced_before_its_own_declaration_resolves() {
        let src = "message M 1 { head(8): tail: tags { tag(1) Point p; } } struct Point { int32 x; int32 y; }";
        let unit = verify_src(src).unwrap();
        assert_eq!(unit.messages.len(), 1);
        assert_eq!(unit.structs.len(), 1);
    }

    #[test]
    fn dynamic_field_in_head_gets_a_pointer_slot() {
        let unit = verify_src("message M 1 { head(16): string name; }").unwrap();
        let head = unit.messages[0].head.as_ref().unwrap();
        assert_eq!(head.members.len(), 1);
        assert!(head.members[0].is_dynamic_slot());
    }
}
