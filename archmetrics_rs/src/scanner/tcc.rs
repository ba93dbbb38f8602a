//! Tight Class Cohesion: share of method pairs connected through a field.

use std::path::Path;

use regex::Regex;

use super::cohesion::{ClassShape, pair_counts};
use crate::error::Result;
use crate::fs_utils::read_source;
use crate::lexical::strip_comments_and_strings;

/// Any of the ways a method body can touch `field`: `this.f`, bare use,
/// use beside an operator, inside a parenthesized expression, as an array
/// index or array object, or followed by a member access.
///
/// The last few forms match without a leading word boundary, which makes
/// this test deliberately wider than the LCOM one.
fn field_access(field: &str) -> Option<Regex> {
    let f = regex::escape(field);
    let forms = [
        format!(r"\bthis\.{f}\b"),
        format!(r"\b{f}\b"),
        format!(r"\b{f}\s*[-+*/%=<>!]"),
        format!(r"[-+*/%=<>!]\s*{f}\b"),
        format!(r"\(.*{f}.*\)"),
        format!(r"\[{f}\]"),
        format!(r"{f}\["),
        format!(r"{f}\.\w+"),
    ];
    Regex::new(&forms.join("|")).ok()
}

pub fn tight_class_cohesion(path: &Path) -> Result<f64> {
    Ok(tcc_from_source(&read_source(path)?))
}

/// Connected pairs over `C(n, 2)`; zero with fewer than two methods.
pub fn tcc_from_source(source: &str) -> f64 {
    let shape = ClassShape::extract(&strip_comments_and_strings(source));
    let n = shape.methods.len();
    if n < 2 {
        return 0.0;
    }
    let graph = shape.usage_graph(field_access);
    let (connected, _) = pair_counts(&graph);
    let total = n * (n - 1) / 2;
    f64::from(connected) / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_methods_are_zero() {
        let src = r#"
class Split {
    private int a;
    private int b;
    void f() {
        a = 1;
    }
    void g() {
        b = 2;
    }
}
"#;
        assert_eq!(tcc_from_source(src), 0.0);
    }

    #[test]
    fn shared_field_is_one() {
        let src = r#"
class Together {
    private int[] slots;
    void fill() {
        slots[0] = 1;
    }
    int size() {
        return slots.length;
    }
}
"#;
        assert_eq!(tcc_from_source(src), 1.0);
    }

    #[test]
    fn partial_connectivity_is_a_ratio() {
        let src = r#"
class Partial {
    private int a;
    private int b;
    void f() { a++; }
    void g() { print(a); }
    void h() { b--; }
}
"#;
        // f-g connected, f-h and g-h not: 1 of 3
        let tcc = tcc_from_source(src);
        assert!((tcc - 1.0 / 3.0).abs() < 1e-9, "got {tcc}");
    }

    #[test]
    fn fewer_than_two_methods_is_zero() {
        assert_eq!(tcc_from_source("class Empty {}\n"), 0.0);
        assert_eq!(
            tcc_from_source("class One {\n    private int a;\n    void f() { a++; }\n}\n"),
            0.0
        );
    }

    #[test]
    fn result_is_within_unit_interval() {
        let src = r#"
class Busy {
    private int a;
    void f() { a++; }
    void g() { a--; }
    void h() { this.a = 0; }
    void k() { }
}
"#;
        let tcc = tcc_from_source(src);
        assert!((0.0..=1.0).contains(&tcc));
        assert!((tcc - 0.5).abs() < 1e-9, "got {tcc}");
    }

    #[test]
    fn trailing_field_declarations_are_ignored() {
        let src = r#"
class Late {
    void f() { z++; }
    void g() { z--; }
    private int z;
}
"#;
        assert_eq!(tcc_from_source(src), 0.0);
    }
}
