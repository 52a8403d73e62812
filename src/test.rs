//! Integration tests exercising the full pipeline — lex, parse, verify,
//! layout, emit — against the concrete scenarios from SPEC_FULL.md §8.

use rstest::rstest;

use crate::diagnostic::Diagnostic;
use crate::emit::cpp::{generate as generate_cpp, CppDialect};
use crate::emit::rust_target::generate as generate_rust;
use crate::emit::wireshark::generate as generate_wireshark;
use crate::layout::{choose_pointer_width, PointerWidth};
use crate::varint::size_of_varint;
use crate::*;

#[test]
fn empty_message_head_is_exactly_eight_bytes() {
    let unit = compile("message E 7 { head(8): }").unwrap();
    let head = unit.messages[0].head.as_ref().unwrap();
    assert_eq!(head.declared_size, 8);
    assert_eq!(crate::layout::head_fixed_part_size(&head.members, head.pointer_width), 8);
}

#[test]
fn single_u32_in_head_layout_matches_scenario() {
    let unit = compile("message M 1 { head(12): uint32 x; }").unwrap();
    let head = unit.messages[0].head.as_ref().unwrap();
    assert_eq!(head.pointer_width, PointerWidth::One);
    assert_eq!(crate::layout::head_fixed_part_size(&head.members, head.pointer_width), 12);
}

#[rstest]
#[case(0, 1)]
#[case(1, 1)]
#[case(127, 1)]
#[case(128, 2)]
#[case(1u64 << 56, 9)]
fn varint_samples_match_scenario_table(#[case] v: u64, #[case] expected: usize) {
    assert_eq!(size_of_varint(v), expected);
}

#[test]
fn tags_block_with_one_present_member_resolves_to_a_single_pointer_slot() {
    let src = "message M 1 { head(16): tags { tag(1) uint32 a; tag(2) string s; } }";
    let unit = compile(src).unwrap();
    let head = unit.messages[0].head.as_ref().unwrap();
    assert_eq!(head.members.len(), 1);
    assert!(head.members[0].is_dynamic_slot());
}

#[test]
fn fixed_array_type_reports_its_declared_element_count() {
    let unit = compile("message M 1 { head(16): uint16[4] xs; }").unwrap();
    let head = unit.messages[0].head.as_ref().unwrap();
    match &head.members[0] {
        crate::model::MemberSlot::Field(m) => {
            assert_eq!(m.ty.fixed_size(), Some(8));
            assert!(!m.ty.is_dynamic());
        }
        _ => panic!("expected a field"),
    }
}

#[test]
fn group_id_reuse_scenarios() {
    assert!(matches!(
        compile("group { message A 1 { head(8): } message B 1 { head(8): } }").unwrap_err(),
        Diagnostic::DuplicateMessageId { .. }
    ));
    assert!(matches!(
        compile("message A 1 { head(8): } message B 1 { head(8): }").unwrap_err(),
        Diagnostic::DuplicateMessageId { .. }
    ));
    assert!(compile("message A 1 { head(8): } group { message B 1 { head(8): } }").is_ok());
}

#[test]
fn pointer_width_minimality_boundary() {
    assert_eq!(choose_pointer_width(256), PointerWidth::One);
    assert_eq!(choose_pointer_width(257), PointerWidth::Two);
}

#[test]
fn cpp_backend_emits_both_dialects() {
    let unit = compile("message Ping 1 { head(8): } struct Point { int32 x; int32 y; }").unwrap();
    let std_out = generate_cpp(&unit, CppDialect::StdCxx, false);
    assert!(std_out.contains("std::vector") || std_out.contains("struct Ping"));
    assert!(std_out.contains("struct Point"));

    let frigg_out = generate_cpp(&unit, CppDialect::Frigg, false);
    assert!(frigg_out.contains("frg::"));

    let proto_out = generate_cpp(&unit, CppDialect::StdCxx, true);
    assert!(proto_out.contains("--protobuf"));
}

#[test]
fn rust_backend_emits_struct_and_plan_functions() {
    let unit = compile("message Ping 1 { head(12): uint32 seq; }").unwrap();
    let out = generate_rust(&unit);
    assert!(out.contains("struct Ping"));
    assert!(out.contains("size_of_head"));
    assert!(out.contains("encode_head"));
    assert!(out.contains("decode_head"));
}

#[test]
fn rust_backend_emits_real_rust_syntax_not_cpp() {
    let unit = compile("message Ping 1 { head(12): uint32 seq; }").unwrap();
    let out = generate_rust(&unit);
    assert!(out.contains("pub fn encode_head(&self, w: &mut Writer) -> bool {"));
    assert!(out.contains("pub fn decode_head(&mut self, r: &mut Reader) -> bool {"));
    assert!(out.contains("self.seq"));
    assert!(!out.contains("static constexpr"));
    assert!(!out.contains("size_t"));
    assert!(!out.contains("decltype"));
    assert!(!out.contains("::"));
}

#[test]
fn rust_backend_renders_consts_as_a_module_of_constants() {
    let unit = compile("consts Flags uint32 { A = 1, B = 2 } message M 1 { head(8): }").unwrap();
    let out = generate_rust(&unit);
    assert!(out.contains("pub mod Flags"));
    assert!(out.contains("pub const A: u32 = 1;"));
    assert!(out.contains("pub const B: u32 = 2;"));
}

#[test]
fn cpp_backend_emits_real_cpp_switch_dispatch_for_tags() {
    let src = "message M 1 { head(16): tail: tags { tag(1) uint32 a; tag(2) string s; } }";
    let unit = compile(src).unwrap();
    let out = generate_cpp(&unit, CppDialect::StdCxx, false);
    assert!(out.contains("switch (tag) {"));
    assert!(out.contains("case 1: {"));
    assert!(out.contains("break;"));
    assert!(out.contains("default: return false; // unknown tag"));
}

#[test]
fn namespace_tag_groups_declarations_into_nested_blocks() {
    let src = r#"namespace "net.wire"; message Ping 1 { head(8): } struct Point { int32 x; int32 y; }"#;
    let unit = compile(src).unwrap();
    assert_eq!(unit.messages[0].namespace.as_deref(), Some("net.wire"));
    assert_eq!(unit.structs[0].namespace.as_deref(), Some("net.wire"));

    let rust_out = generate_rust(&unit);
    assert!(rust_out.contains("pub mod net {"));
    assert!(rust_out.contains("pub mod wire {"));

    let cpp_out = generate_cpp(&unit, CppDialect::StdCxx, false);
    assert!(cpp_out.contains("namespace net {"));
    assert!(cpp_out.contains("namespace wire {"));
}

#[test]
fn using_alias_renames_a_field_type_reference() {
    let src = concat!(
        "namespace \"a\"; struct Point { int32 x; int32 y; } ",
        "using \"a.Point\" = \"lib.Point\"; ",
        "message M 1 { head(16): tail: tags { tag(1) Point p; } }"
    );
    let unit = compile(src).unwrap();
    let rust_out = generate_rust(&unit);
    assert!(rust_out.contains("lib::Point"));
}

#[test]
fn wireshark_backend_emits_one_proto_per_message() {
    let unit = compile(
        "message Ping 1 { head(12): uint32 seq; } message Pong 2 { head(12): uint32 seq; }",
    )
    .unwrap();
    let out = generate_wireshark(&unit);
    assert!(out.contains("idlc_ping"));
    assert!(out.contains("idlc_pong"));
    assert!(out.contains("Proto("));
}

#[test]
fn head_too_small_diagnostic_renders_with_caret() {
    let src = "message M 1 { head(4): uint64 x; }";
    let err = compile(src).unwrap_err();
    let rendered = err.render("schema.idl", src);
    assert!(rendered.contains("schema.idl:1:"));
    assert!(rendered.contains('^'));
}
