//! Component B — the type registry (SPEC_FULL.md §4.1).
//!
//! Ported in shape from `original_source/bragi/types.py`'s `Type`/
//! `TypeRegistry`, re-expressed as a closed Rust enum the way the teacher's
//! own `til::Type` represents a fixed set of type shapes rather than a
//! duck-typed object.

use std::collections::HashMap;
use std::rc::Rc;

/// A canonical, fully-resolved type. Once built, a `Type` is immutable and
/// cheaply cloned (array/enum/consts subtypes are `Rc`-shared).
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Integer { fixed_size: u8, signed: bool },
    Enum { name: Rc<str>, underlying: Rc<Type> },
    Consts { name: Rc<str>, underlying: Rc<Type> },
    Struct { name: Rc<str> },
    Array { subtype: Rc<Type>, n_elements: Option<u64>, dynamic: bool },
    String,
}

impl Type {
    /// True iff this type's wire size cannot be determined from the type
    /// alone (SPEC_FULL.md §3).
    pub fn is_dynamic(&self) -> bool {
        match self {
            Type::Integer { .. } | Type::Enum { .. } | Type::Consts { .. } => false,
            Type::Struct { .. } | Type::String => true,
            Type::Array { dynamic, .. } => *dynamic,
        }
    }

    /// Size in bytes of the fixed encoding, or `None` if this type is dynamic.
    pub fn fixed_size(&self) -> Option<u64> {
        match self {
            Type::Integer { fixed_size, .. } => Some(*fixed_size as u64),
            Type::Enum { underlying, .. } | Type::Consts { underlying, .. } => {
                underlying.fixed_size()
            }
            Type::Struct { .. } | Type::String => None,
            Type::Array { subtype, n_elements, dynamic } => {
                if *dynamic {
                    None
                } else {
                    Some(n_elements.unwrap_or(0) * subtype.fixed_size()?)
                }
            }
        }
    }

    /// True iff this is (or resolves through enum/consts to) an Integer.
    pub fn is_integer(&self) -> bool {
        matches!(self.underlying_integer(), Some(_))
    }

    /// The Integer type backing this type, peeling through Enum/Consts.
    pub fn underlying_integer(&self) -> Option<&Type> {
        match self {
            Type::Integer { .. } => Some(self),
            Type::Enum { underlying, .. } | Type::Consts { underlying, .. } => {
                underlying.underlying_integer()
            }
            _ => None,
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Type::Struct { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("type `{0}` is already registered")]
    AlreadyRegistered(String),
}

/// Maps surface type names to canonical `Type`s. Pre-populated with the
/// predefined integer types and `string`; user enums/consts/structs are
/// added with [`TypeRegistry::register`] as the verifier walks the schema.
pub struct TypeRegistry {
    types: HashMap<String, Type>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut types = HashMap::new();
        let int = |fixed_size, signed| Type::Integer { fixed_size, signed };

        types.insert("int8".to_string(), int(1, true));
        types.insert("int16".to_string(), int(2, true));
        types.insert("int32".to_string(), int(4, true));
        types.insert("int64".to_string(), int(8, true));
        types.insert("uint8".to_string(), int(1, false));
        types.insert("uint16".to_string(), int(2, false));
        types.insert("uint32".to_string(), int(4, false));
        types.insert("uint64".to_string(), int(8, false));
        types.insert("byte".to_string(), int(1, false));
        // char's signedness is left unspecified by the source language;
        // this implementation treats it as an unsigned raw byte (spec §9).
        types.insert("char".to_string(), int(1, false));
        types.insert("string".to_string(), Type::String);

        Self { types }
    }

    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn register(&mut self, name: impl Into<String>, ty: Type) -> Result<(), RegisterError> {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Err(RegisterError::AlreadyRegistered(name));
        }
        self.types.insert(name, ty);
        Ok(())
    }

    /// Parse a surface type expression: a base name followed by zero or
    /// more `[N]`/`[]` suffixes, peeled right to left (SPEC_FULL.md §4.1).
    pub fn parse_type_expression(&self, text: &str) -> Option<Type> {
        match text.rfind('[') {
            None => self.lookup(text).cloned(),
            Some(open) => {
                if !text.ends_with(']') {
                    return None;
                }
                let base = &text[..open];
                let inner = &text[open + 1..text.len() - 1];
                let base_type = self.parse_type_expression(base)?;

                let n_elements = if inner.is_empty() {
                    None
                } else {
                    Some(inner.parse::<u64>().ok()?)
                };

                let dynamic = base_type.is_dynamic() || n_elements.is_none();
                Some(Type::Array {
                    subtype: Rc::new(base_type),
                    n_elements,
                    dynamic,
                })
            }
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_integers_have_expected_sizes() {
        let reg = TypeRegistry::new();
        assert_eq!(reg.lookup("uint32").unwrap().fixed_size(), Some(4));
        assert_eq!(reg.lookup("int8").unwrap().fixed_size(), Some(1));
        assert!(!reg.lookup("uint32").unwrap().is_dynamic());
        assert!(reg.lookup("string").unwrap().is_dynamic());
    }

    #[test]
    fn fixed_size_array_suffix() {
        let reg = TypeRegistry::new();
        let ty = reg.parse_type_expression("uint16[4]").unwrap();
        assert_eq!(ty.fixed_size(), Some(8));
        assert!(!ty.is_dynamic());
    }

    #[test]
    fn dynamic_count_array_suffix() {
        let reg = TypeRegistry::new();
        let ty = reg.parse_type_expression("uint16[]").unwrap();
        assert_eq!(ty.fixed_size(), None);
        assert!(ty.is_dynamic());
    }

    #[test]
    fn dynamic_subtype_forces_array_dynamic() {
        let reg = TypeRegistry::new();
        let ty = reg.parse_type_expression("string[4]").unwrap();
        assert!(ty.is_dynamic());
        assert_eq!(ty.fixed_size(), None);
    }

    #[test]
    fn nested_array_suffixes_peel_right_to_left() {
        let reg = TypeRegistry::new();
        let ty = reg.parse_type_expression("uint8[2][3]").unwrap();
        // outer: n_elements=3 of (uint8[2])
        match ty {
            Type::Array { subtype, n_elements, dynamic } => {
                assert_eq!(n_elements, Some(3));
                assert!(!dynamic);
                assert_eq!(subtype.fixed_size(), Some(2));
            }
            _ => panic!("expected array"),
        }
        assert_eq!(reg.parse_type_expression("uint8[2][3]").unwrap().fixed_size(), Some(6));
    }

    #[test]
    fn unknown_type_is_none() {
        let reg = TypeRegistry::new();
        assert!(reg.parse_type_expression("bogus").is_none());
        assert!(reg.parse_type_expression("bogus[4]").is_none());
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut reg = TypeRegistry::new();
        reg.register("Foo", Type::Struct { name: "Foo".into() }).unwrap();
        assert!(reg.register("Foo", Type::Struct { name: "Foo".into() }).is_err());
    }
}
