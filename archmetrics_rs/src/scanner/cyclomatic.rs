//! Cyclomatic complexity: one baseline path plus one per decision point.
//!
//! Purely textual: constructs are counted anywhere in the file, including
//! inside comments and literals.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;
use crate::fs_utils::read_source;
use crate::regexes::{regex, regex_logical_op};

fn decision_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            r"\bif\s*\(",
            r"\belse\s+if\s*\(",
            r"\bwhile\s*\(",
            r"\bfor\s*\(",
            r"\bcase\s+[^:\n]+:",
            r"\bcatch\s*\(",
            r"\?[^:;\n]+:",
        ]
        .iter()
        .map(|p| regex(p))
        .collect()
    })
}

pub fn cyclomatic_complexity(path: &Path) -> Result<u32> {
    Ok(cyclomatic_from_source(&read_source(path)?))
}

pub fn cyclomatic_from_source(source: &str) -> u32 {
    let decisions: usize = decision_patterns()
        .iter()
        .map(|re| re.find_iter(source).count())
        .sum();
    let logical = regex_logical_op().find_iter(source).count();
    1 + (decisions + logical) as u32
}
