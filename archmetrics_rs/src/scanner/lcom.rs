//! Lack of Cohesion of Methods.

use std::path::Path;

use regex::Regex;

use super::cohesion::{ClassShape, pair_counts};
use crate::error::Result;
use crate::fs_utils::read_source;
use crate::lexical::strip_comments_and_strings;

pub fn lack_of_cohesion(path: &Path) -> Result<u32> {
    Ok(lcom_from_source(&read_source(path)?))
}

/// `max(0, disjoint pairs - sharing pairs)`; zero with fewer than two
/// methods.
pub fn lcom_from_source(source: &str) -> u32 {
    let shape = ClassShape::extract(&strip_comments_and_strings(source));
    if shape.methods.len() < 2 {
        return 0;
    }
    let graph = shape.usage_graph(|field| {
        Regex::new(&format!(r"\b(?:this\.)?{}\b", regex::escape(field))).ok()
    });
    let (sharing, disjoint) = pair_counts(&graph);
    disjoint.saturating_sub(sharing)
}
