//! Efferent coupling: distinct external types this file depends on.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::declarations::{is_primitive, type_declarations};
use crate::error::Result;
use crate::fs_utils::read_source;
use crate::lexical::{
    is_java_identifier, is_java_keyword, split_top_level, strip_comments_and_strings,
    strip_generic_arguments,
};
use crate::regexes::{regex, regex_field_decl, regex_import};

/// `java.lang` and annotation types that every file uses implicitly.
const PLATFORM_TYPES: &[&str] = &[
    "String",
    "Integer",
    "Long",
    "Double",
    "Float",
    "Boolean",
    "Byte",
    "Short",
    "Character",
    "Object",
    "Class",
    "System",
    "Math",
    "StringBuilder",
    "StringBuffer",
    "Number",
    "Void",
    "Enum",
    "Record",
    "Iterable",
    "Comparable",
    "CharSequence",
    "Runnable",
    "Thread",
    "Throwable",
    "Exception",
    "RuntimeException",
    "Error",
    "Override",
    "Deprecated",
    "SuppressWarnings",
    "FunctionalInterface",
    "SafeVarargs",
];

/// Per-line usage shapes. Every capture group is a candidate type name.
fn usage_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            // Foo foo; / Foo foo = ...
            r"^\s*(\w+)\s+\w+\s*[;=]",
            // new Foo(
            r"new\s+(\w+)\s*\(",
            // (Foo foo) / (Foo foo, Bar bar)
            r"\(\s*(\w+)\s+\w+(?:\s*,\s*(\w+)\s+\w+)*\s*\)",
            // public Foo name(
            r"(?:public|protected|private)\s+(\w+)\s+\w+\s*\(",
            // (Foo) value
            r"\(\s*(\w+)\s*\)",
            // Foo.method(
            r"(\w+)\.\w+\s*\(",
        ]
        .iter()
        .map(|p| regex(p))
        .collect()
    })
}

/// Generic argument list, outermost brackets: `Map<Key, List<Door>>`.
fn regex_generic_arguments() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"<([\w\s,.?\[\]<>]+)>"))
}

fn regex_identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"[A-Za-z_$][\w$]*"))
}

/// Every type name inside a type expression such as `Map<Key, Door>[]`.
fn type_names(type_expr: &str) -> impl Iterator<Item = &str> {
    regex_identifier().find_iter(type_expr).map(|m| m.as_str())
}

fn regex_throws() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"\bthrows\s+([\w,\s]+)"))
}

/// Usage candidates must look like a class name: `Foo`, not `foo`,
/// `T` or `MAX_SIZE`.
fn is_type_like(name: &str) -> bool {
    is_java_identifier(name)
        && !is_java_keyword(name)
        && name.starts_with(|c: char| c.is_ascii_uppercase())
        && name.chars().any(|c| c.is_ascii_lowercase())
}

/// Class named by an import path; `None` for wildcards and `java.*`.
pub(crate) fn imported_class(import_path: &str, is_static: bool) -> Option<&str> {
    if import_path.starts_with("java.") {
        return None;
    }
    let mut segments = import_path.rsplit('.');
    let last = segments.next()?;
    let class = if is_static { segments.next()? } else { last };
    (class != "*" && !class.is_empty()).then_some(class)
}

pub fn efferent_coupling(path: &Path) -> Result<u32> {
    Ok(efferent_from_source(&read_source(path)?))
}

pub fn efferent_from_source(source: &str) -> u32 {
    dependency_set(source).len() as u32
}

/// The filtered dependency set behind the Ce count.
pub fn dependency_set(source: &str) -> BTreeSet<String> {
    let stripped = strip_comments_and_strings(source);
    let mut deps: BTreeSet<String> = BTreeSet::new();

    // Types imported from `java.*` are platform types wherever they appear.
    let mut platform_imports: BTreeSet<String> = BTreeSet::new();
    for caps in regex_import().captures_iter(&stripped) {
        let is_static = caps.get(1).is_some();
        let import_path: String = caps[2].split_whitespace().collect();
        if let Some(class) = imported_class(&import_path, is_static) {
            deps.insert(class.to_string());
        } else if !is_static
            && import_path.starts_with("java.")
            && let Some(class) = import_path.rsplit('.').next()
        {
            platform_imports.insert(class.to_string());
        }
    }

    let decls = type_declarations(&stripped);
    for decl in &decls {
        for parent in decl.extends.iter().chain(&decl.implements) {
            deps.insert(strip_generic_arguments(parent).to_string());
        }
    }

    for raw in stripped.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("import ") || line.starts_with("package ") {
            continue;
        }
        // Declared type of a field or local: `private final Foo[] foos;`
        if let Some(caps) = regex_field_decl().captures(line) {
            for name in type_names(&caps[2]) {
                if is_type_like(name) {
                    deps.insert(name.to_string());
                }
            }
        }
        for caps in regex_generic_arguments().captures_iter(line) {
            for item in split_top_level(&caps[1]) {
                for name in type_names(&item) {
                    if is_type_like(name) {
                        deps.insert(name.to_string());
                    }
                }
            }
        }
        for re in usage_patterns() {
            for caps in re.captures_iter(line) {
                for name in caps.iter().skip(1).flatten() {
                    if is_type_like(name.as_str()) {
                        deps.insert(name.as_str().to_string());
                    }
                }
            }
        }
        if let Some(caps) = regex_throws().captures(line) {
            for name in caps[1].split(',').map(str::trim) {
                if is_type_like(name) {
                    deps.insert(name.to_string());
                }
            }
        }
    }

    deps.retain(|dep| {
        !is_primitive(dep)
            && !PLATFORM_TYPES.contains(&dep.as_str())
            && !platform_imports.contains(dep)
            && !decls.iter().any(|decl| decl.name == *dep)
    });
    deps
}
