//! The `LanguageTraits` abstraction (SPEC_FULL.md §4.5 "ADDED — traits
//! abstraction"): the one thing each target backend supplies so the
//! emission core's plan functions can stay target-agnostic. Besides naming
//! types, a backend also supplies the surrounding statement *shape* — how a
//! struct/method/conditional/dispatch opens and closes in that language —
//! so the core never bakes one target's syntax into another's output.

use crate::types::Type;

pub trait LanguageTraits {
    /// Rendered name for a container of `elem` (e.g. a dynamic array).
    fn container_of(&self, elem: &str) -> String;

    /// Rendered name of the target's string type.
    fn string_type(&self) -> &str;

    /// Rendered numeric type name for a fixed-width integer.
    fn integer_type(&self, fixed_size: u8, signed: bool) -> String;

    /// An assertion statement rendering `condition` as a bare expression.
    fn assert_stmt(&self, condition: &str) -> String;

    /// Include/import lines to place at the top of the generated file.
    fn includes(&self) -> Vec<&'static str>;

    /// How a dynamic/absent member is wrapped when read back (e.g.
    /// `std::optional<T>`, `Option<T>`, or "N/A" for a backend with no
    /// accessor concept of its own, like the dissector generator).
    fn optional_wrapper(&self, inner: &str) -> String;

    /// Rendered name for the user-declared type `name` (struct/enum/consts),
    /// already fully resolved to its output-namespace/using-alias form.
    fn named_type(&self, name: &str) -> String {
        name.to_string()
    }

    /// Render any resolved `Type` using the traits above (no namespace
    /// resolution — callers referencing a user-declared name go through
    /// `emit::render_type_resolved` instead, which resolves namespaces/
    /// aliases before calling into `named_type`).
    fn render_type(&self, ty: &Type) -> String {
        match ty {
            Type::Integer { fixed_size, signed } => self.integer_type(*fixed_size, *signed),
            Type::Enum { name, .. } | Type::Consts { name, .. } | Type::Struct { name } => {
                self.named_type(name)
            }
            Type::String => self.string_type().to_string(),
            Type::Array { subtype, .. } => self.container_of(&self.render_type(subtype)),
        }
    }

    // --- statement shape -------------------------------------------------

    /// Opening line of a struct/record/message declaration.
    fn struct_open(&self, name: &str) -> String;

    /// Closing line of any block opened above (struct, method, if, loop,
    /// dispatch, namespace) — shared: both targets use a brace.
    fn block_close(&self) -> &str {
        "}"
    }

    /// A field declaration line, with whatever trailing punctuation the
    /// target's struct-body syntax requires.
    fn field_decl(&self, ty: &str, name: &str) -> String;

    /// A named compile-time constant declaration (e.g. `MESSAGE_ID`).
    fn const_decl(&self, ty: &str, name: &str, value: &str) -> String;

    /// Opens the namespace/module block latched for one output namespace
    /// segment (SPEC_FULL.md §3 "Namespace tag"); one call per dotted
    /// segment, nested.
    fn namespace_open(&self, segment: &str) -> String;

    /// Opening line of a read-only method named `name`, no parameters
    /// beyond the implicit receiver, returning `ret_ty`.
    fn method_open(&self, name: &str, ret_ty: &str) -> String;

    /// Opening line of a method named `name` taking one extra parameter
    /// `(param_name: param_ty)`. `mutates_self` selects a mutable receiver.
    fn method_open_mut(
        &self,
        name: &str,
        param_name: &str,
        param_ty: &str,
        ret_ty: &str,
        mutates_self: bool,
    ) -> String;

    /// An immutable local binding.
    fn var_decl(&self, name: &str, expr: &str) -> String;

    /// A mutable local binding.
    fn mut_var_decl(&self, name: &str, expr: &str) -> String;

    /// Prefix applied to an implicit-receiver field/method reference
    /// (`self.` in Rust, empty in C++, where member names are visible
    /// unqualified from inside their own struct's methods).
    fn self_prefix(&self) -> &str;

    /// Opens a conditional whose body runs only when `cond` holds.
    fn if_open(&self, cond: &str) -> String;

    /// A single-statement `if cond { break }`-shaped line (no separate
    /// close — the body is one word).
    fn if_break_stmt(&self, cond: &str) -> String;

    /// Opens an unconditional loop (`for (;;)` / `loop`).
    fn loop_open(&self) -> String;

    /// A ternary-shaped value expression (C++ `?:` / Rust `if {} else {}`).
    fn ternary(&self, cond: &str, if_true: &str, if_false: &str) -> String;

    /// Opens a tag-dispatch construct (`switch` / `match`) over `expr`.
    fn dispatch_open(&self, expr: &str) -> String;

    /// Opening line of one dispatch arm matching `tag`.
    fn dispatch_arm_open(&self, tag: u32) -> String;

    /// A statement appended at the end of an arm's body before its closing
    /// brace (`break;` for `switch`, absent for `match`).
    fn dispatch_arm_terminator(&self) -> Option<&str>;

    /// The complete fallback-arm line (`default: ...` / `_ => ...`).
    fn dispatch_default_line(&self) -> String;

    /// A call expression reading one dynamic member back (C++ needs the
    /// target's type spelled via `decltype`; Rust infers it from the
    /// assignment target).
    fn dynamic_read_call(&self, target: &str) -> String;

    /// A call expression reading one fixed-width member back.
    fn fixed_read_call(&self, ty: &str) -> String;

    /// A `return expr;` statement — shared: both targets use this keyword.
    fn return_stmt(&self, expr: &str) -> String {
        format!("return {expr};")
    }

    /// An attribute line placed immediately above an `Enum`-mode
    /// declaration to pin its underlying representation, if the target
    /// needs one separate from the declaration header itself.
    fn enum_attr_line(&self, underlying: &str) -> Option<String> {
        let _ = underlying;
        None
    }

    /// Opening line of an `Enum`-mode declaration.
    fn enum_open(&self, name: &str, underlying: &str) -> String;

    /// One member line inside an `Enum`-mode declaration's body.
    fn enum_member_line(&self, name: &str, value: i64) -> String {
        format!("{name} = {value},")
    }
}
