//! Method/field extraction shared by the cohesion metrics.
//!
//! A class body is cut into instance fields and method bodies. Each metric
//! then decides what counts as "touching" a field and reduces the resulting
//! usage graph on its own.

use std::collections::BTreeSet;

use regex::Regex;

use crate::declarations::{instance_field_name, method_name};
use crate::lexical::brace_counts;
use crate::regexes::regex_class_line;

/// Fields declared before the first method, and method bodies, of the first
/// class in a stripped source.
#[derive(Debug, Default)]
pub(crate) struct ClassShape {
    pub fields: Vec<String>,
    /// Method name and body text, in declaration order. Overloads share one
    /// entry whose body is the concatenation of every overload.
    pub methods: Vec<(String, String)>,
}

/// Method name to the set of instance fields it touches, in source order.
pub(crate) type UsageGraph = Vec<(String, BTreeSet<String>)>;

impl ClassShape {
    /// Expects comment- and string-stripped text.
    pub(crate) fn extract(stripped: &str) -> Self {
        let mut shape = ClassShape::default();
        let mut in_class = false;
        let mut current: Option<usize> = None;
        let mut depth = 0i64;

        for raw in stripped.lines() {
            let line = raw.trim();
            if !in_class {
                in_class = regex_class_line().is_match(line);
                continue;
            }

            if current.is_none() {
                // Fields count only while no method has been seen yet.
                if shape.methods.is_empty()
                    && let Some(field) = instance_field_name(line)
                {
                    if !shape.fields.iter().any(|f| f == field) {
                        shape.fields.push(field.to_string());
                    }
                    continue;
                }
                let Some(name) = method_name(line) else {
                    continue;
                };
                let idx = match shape.methods.iter().position(|(m, _)| m == name) {
                    Some(idx) => idx,
                    None => {
                        shape.methods.push((name.to_string(), String::new()));
                        shape.methods.len() - 1
                    }
                };
                current = Some(idx);
                depth = 0;
            }

            let Some(idx) = current else {
                continue;
            };
            let body = &mut shape.methods[idx].1;
            body.push_str(line);
            body.push('\n');

            let (open, close) = brace_counts(line);
            depth += open as i64 - close as i64;
            if depth <= 0 && close > 0 {
                current = None;
            }
        }
        shape
    }

    /// Build the usage graph; `access` yields the pattern that detects a
    /// use of the given field name.
    pub(crate) fn usage_graph<F>(&self, access: F) -> UsageGraph
    where
        F: Fn(&str) -> Option<Regex>,
    {
        let matchers: Vec<(&str, Regex)> = self
            .fields
            .iter()
            .filter_map(|field| access(field).map(|re| (field.as_str(), re)))
            .collect();

        self.methods
            .iter()
            .map(|(name, body)| {
                let touched = matchers
                    .iter()
                    .filter(|(_, re)| re.is_match(body))
                    .map(|(field, _)| field.to_string())
                    .collect();
                (name.clone(), touched)
            })
            .collect()
    }
}

/// `(sharing, disjoint)` counts over every unordered method pair.
pub(crate) fn pair_counts(graph: &UsageGraph) -> (u32, u32) {
    let mut sharing = 0u32;
    let mut disjoint = 0u32;
    for (i, (_, left)) in graph.iter().enumerate() {
        for (_, right) in &graph[i + 1..] {
            if left.is_disjoint(right) {
                disjoint += 1;
            } else {
                sharing += 1;
            }
        }
    }
    (sharing, disjoint)
}
