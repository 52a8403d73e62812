//! Component G — the systems-language (C++) backend.
//!
//! Behavior ported in shape from `original_source/bragi/cpp_generator.py`.
//! Supports the two dialects the original targets: one against the
//! standard library, one against an injected allocator type for
//! freestanding/embedded use (the `frigg` library in the original; kept
//! under that name here since it names a real third-party dependency of
//! the generated code, not of this compiler).

use crate::emit::render_unit;
use crate::emit::traits::LanguageTraits;
use crate::model::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CppDialect {
    /// `std::vector`/`std::string`/`std::optional`, plain `assert`.
    StdCxx,
    /// Allocator-parameterized containers from `frigg`, for environments
    /// with no libstdc++.
    Frigg,
}

struct CppTraits {
    dialect: CppDialect,
    protobuf: bool,
}

impl LanguageTraits for CppTraits {
    fn container_of(&self, elem: &str) -> String {
        match self.dialect {
            CppDialect::StdCxx => format!("std::vector<{elem}>"),
            CppDialect::Frigg => format!("frg::vector<{elem}, Allocator>"),
        }
    }

    fn string_type(&self) -> &str {
        match self.dialect {
            CppDialect::StdCxx => "std::string",
            CppDialect::Frigg => "frg::string<Allocator>",
        }
    }

    fn integer_type(&self, fixed_size: u8, signed: bool) -> String {
        let width = fixed_size as u32 * 8;
        format!("{}int{width}_t", if signed { "" } else { "u" })
    }

    fn assert_stmt(&self, condition: &str) -> String {
        format!("assert({condition});")
    }

    fn includes(&self) -> Vec<&'static str> {
        let mut v = match self.dialect {
            CppDialect::StdCxx => vec!["#include <cstdint>", "#include <string>", "#include <vector>", "#include <optional>", "#include <cassert>"],
            CppDialect::Frigg => vec!["#include <frg/vector.hpp>", "#include <frg/string.hpp>", "#include <frg/optional.hpp>", "#include <cstdint>", "#include <cassert>"],
        };
        if self.protobuf {
            v.push("#include <google/protobuf/message.h>");
        }
        v
    }

    fn optional_wrapper(&self, inner: &str) -> String {
        match self.dialect {
            CppDialect::StdCxx => format!("std::optional<{inner}>"),
            CppDialect::Frigg => format!("frg::optional<{inner}>"),
        }
    }

    fn struct_open(&self, name: &str) -> String {
        format!("struct {name} {{")
    }

    fn field_decl(&self, ty: &str, name: &str) -> String {
        format!("{ty} {name};")
    }

    fn const_decl(&self, ty: &str, name: &str, value: &str) -> String {
        format!("static constexpr {ty} {name} = {value};")
    }

    fn namespace_open(&self, segment: &str) -> String {
        format!("namespace {segment} {{")
    }

    fn method_open(&self, name: &str, ret_ty: &str) -> String {
        format!("{ret_ty} {name}() const {{")
    }

    fn method_open_mut(
        &self,
        name: &str,
        param_name: &str,
        param_ty: &str,
        ret_ty: &str,
        mutates_self: bool,
    ) -> String {
        let const_suffix = if mutates_self { "" } else { " const" };
        format!("{ret_ty} {name}({param_ty}& {param_name}){const_suffix} {{")
    }

    fn var_decl(&self, name: &str, expr: &str) -> String {
        format!("auto {name} = {expr};")
    }

    fn mut_var_decl(&self, name: &str, expr: &str) -> String {
        format!("auto {name} = {expr};")
    }

    fn self_prefix(&self) -> &str {
        ""
    }

    fn if_open(&self, cond: &str) -> String {
        format!("if ({cond}) {{")
    }

    fn if_break_stmt(&self, cond: &str) -> String {
        format!("if ({cond}) break;")
    }

    fn loop_open(&self) -> String {
        "for (;;) {".to_string()
    }

    fn ternary(&self, cond: &str, if_true: &str, if_false: &str) -> String {
        format!("{cond} ? {if_true} : {if_false}")
    }

    fn dispatch_open(&self, expr: &str) -> String {
        format!("switch ({expr}) {{")
    }

    fn dispatch_arm_open(&self, tag: u32) -> String {
        format!("case {tag}: {{")
    }

    fn dispatch_arm_terminator(&self) -> Option<&str> {
        Some("break;")
    }

    fn dispatch_default_line(&self) -> String {
        "default: return false; // unknown tag".to_string()
    }

    fn dynamic_read_call(&self, target: &str) -> String {
        format!("r.read_dynamic<decltype({target})>()")
    }

    fn fixed_read_call(&self, ty: &str) -> String {
        format!("r.read_fixed<{ty}>()")
    }

    fn enum_open(&self, name: &str, underlying: &str) -> String {
        format!("enum class {name} : {underlying} {{")
    }
}

/// Generate a single C++ header for `unit`, in the requested `dialect`.
/// `protobuf` additionally emits a `.proto`-style comment block per
/// message, per the CLI's `--protobuf` flag (SPEC_FULL.md §6).
pub fn generate(unit: &Unit, dialect: CppDialect, protobuf: bool) -> String {
    let traits = CppTraits { dialect, protobuf };
    let mut out = render_unit(unit, &traits);
    if protobuf {
        out.push_str("\n// --protobuf: field numbers mirror each TagsBlock's declared tags.\n");
    }
    out
}
