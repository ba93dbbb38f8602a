//! Afferent coupling: sibling files that reference this file's class.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::declarations::{TypeKind, primary_type_name, type_declarations};
use crate::error::Result;
use crate::fs_utils::{read_source, sibling_sources};
use crate::lexical::strip_comments_and_strings;

/// One alternation of every shape in which a file can depend on `class`.
fn dependency_pattern(class: &str) -> Option<Regex> {
    let c = regex::escape(class);
    let shapes = [
        format!(r"\b{c}\s+\w+"),
        format!(r"\bnew\s+{c}\s*\("),
        format!(r"\b{c}\."),
        format!(r"\bextends\s+{c}\b"),
        format!(r"\bimplements\s+[^{{]*\b{c}\b"),
        format!(r"\(\s*{c}\s+"),
        format!(r"<[^>]*\b{c}\b[^>]*>"),
        format!(r"\b{c}\[\]"),
        format!(r"\bimport\s+[^;]*\.{c}\s*;"),
    ];
    Regex::new(&shapes.join("|")).ok()
}

pub fn afferent_coupling(path: &Path) -> Result<u32> {
    let source = read_source(path)?;
    let siblings = sibling_sources(path)?;
    Ok(afferent_from_sources(&source, &siblings))
}

/// Number of `siblings` referencing the first class declared in `source`.
/// A file without a class has no dependents.
pub fn afferent_from_sources(source: &str, siblings: &[(PathBuf, String)]) -> u32 {
    let stripped = strip_comments_and_strings(source);
    let decls = type_declarations(&stripped);
    let Some(class) = primary_type_name(&decls, &[TypeKind::Class]) else {
        return 0;
    };
    let Some(pattern) = dependency_pattern(&class) else {
        return 0;
    };

    let dependents = siblings
        .iter()
        .filter(|(path, content)| {
            let hit = pattern.is_match(&strip_comments_and_strings(content));
            if hit {
                debug!("{} depends on {class}", path.display());
            }
            hit
        })
        .count();
    dependents as u32
}
