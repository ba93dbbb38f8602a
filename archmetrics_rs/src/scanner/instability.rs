//! Instability: `Ce / (Ce + Ca)`.
//!
//! Uses its own narrower coupling rules rather than the Ce and Ca
//! scanners, so the ratio can diverge slightly from those two metrics.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::efferent::imported_class;
use crate::declarations::{TypeKind, primary_type_name, type_declarations};
use crate::error::{MetricError, Result};
use crate::fs_utils::{read_source, sibling_sources};
use crate::lexical::{split_top_level, strip_comments_and_strings, strip_generic_arguments};
use crate::regexes::{regex, regex_import};

const COMMON_TYPES: &[&str] = &["String", "Integer", "Boolean", "Object", "List", "Map"];

const DECLARATION_WORDS: &[&str] = &["class", "interface", "enum", "extends", "implements"];

fn outgoing_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            r"\bextends\s+(\w+)",
            r"(\w+)\s+\w+\s*[;=]",
            r"<(\w+)>",
            r"\bnew\s+(\w+)\s*\(",
        ]
        .iter()
        .map(|p| regex(p))
        .collect()
    })
}

fn regex_implements_list() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"\bimplements\s+([^{]+)"))
}

fn is_candidate(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !DECLARATION_WORDS.contains(&name)
}

fn incoming_pattern(class: &str) -> Option<Regex> {
    let c = regex::escape(class);
    let shapes = [
        format!(r"\b{c}\s+\w+"),
        format!(r"\bnew\s+{c}\s*\("),
        format!(r"\b{c}\.\w+"),
        format!(r"\bextends\s+{c}\b"),
        format!(r"\bimplements\s+.*{c}"),
        format!(r"\(\s*{c}\s+\w+\s*\)"),
        format!(r"<\s*{c}\s*>"),
        format!(r"\b{c}\[\]"),
    ];
    Regex::new(&shapes.join("|")).ok()
}

fn outgoing_count(stripped: &str, own_name: &str) -> usize {
    let mut deps: BTreeSet<String> = BTreeSet::new();

    for caps in regex_import().captures_iter(stripped) {
        // The last segment, even for static imports.
        if let Some(class) = imported_class(caps[2].trim(), false) {
            deps.insert(class.to_string());
        }
    }

    for re in outgoing_patterns() {
        for caps in re.captures_iter(stripped) {
            if let Some(name) = caps.get(1).map(|m| m.as_str())
                && is_candidate(name)
            {
                deps.insert(name.to_string());
            }
        }
    }

    for caps in regex_implements_list().captures_iter(stripped) {
        for item in split_top_level(&caps[1]) {
            let base = strip_generic_arguments(&item);
            if is_candidate(base) {
                deps.insert(base.to_string());
            }
        }
    }

    deps.retain(|dep| dep != own_name && !COMMON_TYPES.contains(&dep.as_str()));
    deps.len()
}

pub fn instability(path: &Path) -> Result<f64> {
    let source = read_source(path)?;
    let siblings = sibling_sources(path)?;
    instability_from_sources(&source, &siblings).ok_or_else(|| MetricError::no_type(path))
}

/// `None` when the file declares neither a class nor an interface.
pub fn instability_from_sources(source: &str, siblings: &[(PathBuf, String)]) -> Option<f64> {
    let stripped = strip_comments_and_strings(source);
    let decls = type_declarations(&stripped);
    let name = primary_type_name(&decls, &[TypeKind::Class, TypeKind::Interface])?;

    let ce = outgoing_count(&stripped, &name);
    let ca = match incoming_pattern(&name) {
        Some(pattern) => siblings
            .iter()
            .filter(|(_, content)| pattern.is_match(&strip_comments_and_strings(content)))
            .count(),
        None => 0,
    };

    let total = ce + ca;
    if total == 0 {
        return Some(0.0);
    }
    Some(ce as f64 / total as f64)
}
