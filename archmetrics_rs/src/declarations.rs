//! Single-line detectors for Java declarations.
//!
//! Scanners work on one trimmed line at a time; these helpers answer "does
//! this line declare a type / method / instance field, and what is its
//! name?" without tracking any state.

use serde::Serialize;

use crate::lexical::{is_java_keyword, normalize_generic_type, split_top_level};
use crate::regexes::{regex_field_decl, regex_method_signature, regex_type_decl};

const PRIMITIVES: &[&str] = &[
    "void", "int", "long", "double", "float", "boolean", "byte", "short", "char",
];

pub fn is_primitive(word: &str) -> bool {
    PRIMITIVES.contains(&word)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "class" => Some(TypeKind::Class),
            "interface" => Some(TypeKind::Interface),
            "enum" => Some(TypeKind::Enum),
            _ => None,
        }
    }
}

/// A `class|interface|enum` header with its supertypes.
///
/// Supertype names keep their generic arguments in normalized form
/// (`Comparable<Pair<A,B>>`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: String,
    pub extends: Vec<String>,
    pub implements: Vec<String>,
}

/// Every type declaration in `source`, in source order.
///
/// Expects comment- and string-stripped text so that prose such as
/// "this class provides" is not mistaken for a header.
pub fn type_declarations(source: &str) -> Vec<TypeDecl> {
    regex_type_decl()
        .captures_iter(source)
        .filter_map(|caps| {
            let kind = TypeKind::parse(caps.get(1)?.as_str())?;
            let name = caps.get(2)?.as_str().to_string();
            let list = |idx: usize| -> Vec<String> {
                caps.get(idx)
                    .map(|m| {
                        split_top_level(m.as_str())
                            .iter()
                            .filter(|item| !item.is_empty())
                            .map(|item| normalize_generic_type(item))
                            .collect()
                    })
                    .unwrap_or_default()
            };
            Some(TypeDecl {
                kind,
                name,
                extends: list(3),
                implements: list(4),
            })
        })
        .collect()
}

/// Name of the first declared type whose kind is in `kinds`, honouring the
/// order of `kinds` as a priority (a class wins over an earlier interface
/// when `kinds` starts with `Class`).
pub fn primary_type_name(decls: &[TypeDecl], kinds: &[TypeKind]) -> Option<String> {
    kinds.iter().find_map(|kind| {
        decls
            .iter()
            .find(|decl| decl.kind == *kind)
            .map(|decl| decl.name.clone())
    })
}

/// Method or constructor name when `line` (trimmed) is a signature with a
/// body on this line or the next.
pub fn method_name(line: &str) -> Option<&str> {
    let caps = regex_method_signature().captures(line)?;
    let name = caps.get(3)?.as_str();
    if is_java_keyword(name) {
        return None;
    }
    if let Some(ty) = caps.get(2) {
        let ty = ty.as_str();
        if is_java_keyword(ty) && !is_primitive(ty) {
            return None;
        }
    }
    Some(name)
}

/// Instance field name when `line` (trimmed) declares a non-static field.
pub fn instance_field_name(line: &str) -> Option<&str> {
    let caps = regex_field_decl().captures(line)?;
    let modifiers = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    if modifiers.split_whitespace().any(|m| m == "static") {
        return None;
    }
    let ty = caps.get(2)?.as_str();
    if is_java_keyword(ty) && !is_primitive(ty) {
        return None;
    }
    let name = caps.get(3)?.as_str();
    if is_java_keyword(name) {
        return None;
    }
    Some(name)
}
