//! Weighted Method Count: sum of per-method complexities.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::declarations::method_name;
use crate::error::Result;
use crate::fs_utils::read_source;
use crate::lexical::{brace_counts, strip_comments_and_strings};
use crate::regexes::{regex, regex_logical_op};

fn regex_branch() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"\b(?:if|else|for|while|do|switch|case|catch|finally)\b"))
}

struct OpenMethod {
    complexity: u32,
    depth: i64,
    opened: bool,
}

pub fn weighted_method_count(path: &Path) -> Result<u32> {
    Ok(wmc_from_source(&read_source(path)?))
}

pub fn wmc_from_source(source: &str) -> u32 {
    let stripped = strip_comments_and_strings(source);
    let mut total = 0u32;
    let mut current: Option<OpenMethod> = None;

    for raw in stripped.lines() {
        let line = raw.trim();

        if current.is_none() && method_name(line).is_some() {
            current = Some(OpenMethod {
                complexity: 1,
                depth: 0,
                opened: false,
            });
        }
        let Some(method) = current.as_mut() else {
            continue;
        };

        // Scored before braces so a one-line method counts its own body.
        if regex_branch().is_match(line) {
            method.complexity += 1;
        }
        method.complexity += regex_logical_op().find_iter(line).count() as u32;

        let (open, close) = brace_counts(line);
        method.depth += open as i64 - close as i64;
        method.opened |= open > 0;
        if method.opened && method.depth <= 0 {
            total += method.complexity;
            current = None;
        }
    }
    total
}
