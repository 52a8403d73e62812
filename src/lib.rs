#![forbid(unsafe_code)]

pub mod ast;
pub mod diagnostic;
pub mod emit;
pub mod layout;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod types;
pub mod varint;
pub mod verify;

#[cfg(test)]
mod test;

use diagnostic::Diagnostic;
use model::Unit;

/// Run the full front end — lex, parse, verify — over one source file's
/// text, producing the resolved model or the first diagnostic hit along
/// the way (SPEC_FULL.md §2, components C/D).
pub fn compile(source: &str) -> Result<Unit, Diagnostic> {
    let raw = parser::Parser::parse_str(source)?;
    verify::verify(&raw)
}
