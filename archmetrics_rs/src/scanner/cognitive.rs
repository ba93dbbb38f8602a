//! Cognitive complexity: control flow weighted by nesting depth.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;
use crate::fs_utils::read_source;
use crate::lexical::strip_comments_and_strings;
use crate::regexes::{regex, regex_logical_op};

/// Keywords that open a nesting level: the keyword directly followed by
/// `(` on a line that also opens a brace. A plain `try {` does not nest.
fn regex_nesting_opener() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"\b(?:if|for|while|switch|try|catch)\s*\("))
}

/// Scored constructs. `else if` is listed first so it wins over `else`.
fn regex_control_flow() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"\b(else\s+if|if|else|for|while|do|switch|catch|finally)\b"))
}

fn regex_ternary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"\?[^:]*:"))
}

pub fn cognitive_complexity(path: &Path) -> Result<u32> {
    Ok(cognitive_from_source(&read_source(path)?))
}

pub fn cognitive_from_source(source: &str) -> u32 {
    let stripped = strip_comments_and_strings(source);
    let mut nesting: Vec<&str> = Vec::new();
    let mut total = 0u32;

    for raw in stripped.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        // `} else if (...) {` closes the previous block before scoring.
        let leading_close = line.starts_with('}');
        if leading_close {
            nesting.pop();
        }
        let level = nesting.len() as u32;

        if line.contains('{')
            && let Some(opener) = regex_nesting_opener().find(line)
        {
            nesting.push(opener.as_str());
        }

        if let Some(caps) = regex_control_flow().captures(line) {
            total += 1 + level;
            if caps[1].starts_with("else") && caps[1].ends_with("if") {
                total += 1;
            }
        }
        total += regex_logical_op().find_iter(line).count() as u32;
        total += regex_ternary().find_iter(line).count() as u32;

        // A body closed on its own line (`if (x) { y(); }`).
        let body = if leading_close { &line[1..] } else { line };
        if body.contains('}') {
            nesting.pop();
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_control_flow_scores_zero() {
        let src = r#"
class A {
    int x;
    int get() {
        return x;
    }
}
"#;
        assert_eq!(cognitive_from_source(src), 0);
    }

    #[test]
    fn nested_if_scores_three() {
        let src = r#"
class A {
    void f(int a, int b) {
        if (a > 0) {
            if (b > 0) {
                a++;
            }
        }
    }
}
"#;
        assert_eq!(cognitive_from_source(src), 3);
    }

    #[test]
    fn sequential_ifs_do_not_nest() {
        let src = r#"
void f(int a) {
    if (a > 0) {
        a++;
    }
    if (a > 1) {
        a++;
    }
}
"#;
        assert_eq!(cognitive_from_source(src), 2);
    }

    #[test]
    fn else_if_chain_pays_extra() {
        let src = r#"
void f(int a) {
    if (a > 0) {
        a++;
    } else if (a < 0) {
        a--;
    } else {
        a = 1;
    }
}
"#;
        // if: 1, else if: 1 + 1, else: 1
        assert_eq!(cognitive_from_source(src), 4);
    }

    #[test]
    fn logical_operators_and_ternaries_add_one_each() {
        let src = r#"
int f(boolean a, boolean b, boolean c) {
    if (a && b || c) {
        return a ? 1 : 2;
    }
    return 0;
}
"#;
        // if: 1, &&: 1, ||: 1, ternary: 1
        assert_eq!(cognitive_from_source(src), 4);
    }

    #[test]
    fn keywords_in_comments_and_strings_are_ignored() {
        let src = r#"
void f() {
    // if (x) { while (y) { } }
    log("for (;;) if else");
}
"#;
        assert_eq!(cognitive_from_source(src), 0);
    }

    #[test]
    fn plain_try_block_adds_no_nesting() {
        let src = r#"
void f(boolean x) {
    try {
        if (x) {
            g();
        }
    } catch (Exception e) {
        h();
    }
}
"#;
        // if: 1, catch: 1
        assert_eq!(cognitive_from_source(src), 2);
    }

    #[test]
    fn try_with_resources_nests() {
        let src = r#"
void f(boolean x) {
    try (Reader r = open()) {
        if (x) {
            g();
        }
    }
}
"#;
        // if inside try (...): 1 + 1
        assert_eq!(cognitive_from_source(src), 2);
    }
}
