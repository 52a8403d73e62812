//! Component G — the Rust target backend.
//!
//! Behavior ported in shape from `original_source/bragi/rust_generator.py`,
//! rebuilt atop the shared `LanguageTraits`/`CodeBuilder` plan instead of
//! re-deriving layout rules per backend.

use crate::emit::render_unit;
use crate::emit::traits::LanguageTraits;
use crate::model::Unit;

struct RustTraits;

impl LanguageTraits for RustTraits {
    fn container_of(&self, elem: &str) -> String {
        format!("Vec<{elem}>")
    }

    fn string_type(&self) -> &str {
        "String"
    }

    fn integer_type(&self, fixed_size: u8, signed: bool) -> String {
        format!("{}{}", if signed { "i" } else { "u" }, fixed_size as u32 * 8)
    }

    fn assert_stmt(&self, condition: &str) -> String {
        format!("assert!({condition});")
    }

    fn includes(&self) -> Vec<&'static str> {
        vec!["#![allow(dead_code)]"]
    }

    fn optional_wrapper(&self, inner: &str) -> String {
        format!("Option<{inner}>")
    }

    fn struct_open(&self, name: &str) -> String {
        format!("pub struct {name} {{")
    }

    fn field_decl(&self, ty: &str, name: &str) -> String {
        format!("pub {name}: {ty},")
    }

    fn const_decl(&self, ty: &str, name: &str, value: &str) -> String {
        format!("pub const {name}: {ty} = {value};")
    }

    fn namespace_open(&self, segment: &str) -> String {
        format!("pub mod {segment} {{")
    }

    fn method_open(&self, name: &str, ret_ty: &str) -> String {
        format!("pub fn {name}(&self) -> {ret_ty} {{")
    }

    fn method_open_mut(
        &self,
        name: &str,
        param_name: &str,
        param_ty: &str,
        ret_ty: &str,
        mutates_self: bool,
    ) -> String {
        let receiver = if mutates_self { "&mut self" } else { "&self" };
        format!("pub fn {name}({receiver}, {param_name}: &mut {param_ty}) -> {ret_ty} {{")
    }

    fn var_decl(&self, name: &str, expr: &str) -> String {
        format!("let {name} = {expr};")
    }

    fn mut_var_decl(&self, name: &str, expr: &str) -> String {
        format!("let mut {name} = {expr};")
    }

    fn self_prefix(&self) -> &str {
        "self."
    }

    fn if_open(&self, cond: &str) -> String {
        format!("if {cond} {{")
    }

    fn if_break_stmt(&self, cond: &str) -> String {
        format!("if {cond} {{ break; }}")
    }

    fn loop_open(&self) -> String {
        "loop {".to_string()
    }

    fn ternary(&self, cond: &str, if_true: &str, if_false: &str) -> String {
        format!("if {cond} {{ {if_true} }} else {{ {if_false} }}")
    }

    fn dispatch_open(&self, expr: &str) -> String {
        format!("match {expr} {{")
    }

    fn dispatch_arm_open(&self, tag: u32) -> String {
        format!("{tag} => {{")
    }

    fn dispatch_arm_terminator(&self) -> Option<&str> {
        None
    }

    fn dispatch_default_line(&self) -> String {
        "_ => return false, // unknown tag".to_string()
    }

    fn dynamic_read_call(&self, _target: &str) -> String {
        "r.read_dynamic()".to_string()
    }

    fn fixed_read_call(&self, _ty: &str) -> String {
        "r.read_fixed()".to_string()
    }

    fn enum_attr_line(&self, underlying: &str) -> Option<String> {
        Some(format!("#[repr({underlying})]"))
    }

    fn enum_open(&self, name: &str, _underlying: &str) -> String {
        format!("pub enum {name} {{")
    }
}

pub fn generate(unit: &Unit) -> String {
    render_unit(unit, &RustTraits)
}
