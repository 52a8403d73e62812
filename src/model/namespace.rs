//! Output-namespace bookkeeping (SPEC_FULL.md §3 "Namespace tag", "Using
//! alias"). Neither affects the wire format; both steer how `emit::render_unit`
//! groups declarations into namespace/module blocks and how it resolves a
//! named type reference to its output name (`emit::mod::build_name_resolver`).

#[derive(Debug, Clone)]
pub struct UsingAlias {
    /// A fully-qualified declared name (`namespace.Name`), renamed in
    /// generated output.
    pub from: String,
    /// The fully-qualified replacement name, dot-separated; converted to
    /// each target's scope-resolution syntax at emission time.
    pub to: String,
}
