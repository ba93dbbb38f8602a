//! Shared, lazily compiled patterns.
//!
//! Patterns used by a single scanner live next to that scanner; the ones
//! here are shared between several of them.

use std::sync::OnceLock;

use regex::Regex;

pub(crate) fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex literal")
}

/// `&&` or `||`.
pub(crate) fn regex_logical_op() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"&&|\|\|"))
}

/// `import a.b.C;` / `import static a.b.C.member;`
/// Group 1 is `static ` when present, group 2 the imported path.
pub(crate) fn regex_import() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"\bimport\s+(static\s+)?([^;]+);"))
}

/// A type declaration header up to its opening brace.
/// Groups: kind, name, extends-list, implements-list.
pub(crate) fn regex_type_decl() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex(
            r"\b(class|interface|enum)\s+([A-Za-z_$][\w$]*)(?:\s*<[^{]*?>)?(?:\s+extends\s+([^{;]+?))?(?:\s+implements\s+([^{;]+?))?(?:\s+permits\s+[^{;]+?)?\s*\{",
        )
    })
}

/// Any line that opens a class body: `class Name`.
pub(crate) fn regex_class_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"\bclass\s+[A-Za-z_$][\w$]*"))
}

/// Method or constructor signature on a single trimmed line, ending in `{`
/// or at end of line. Groups: modifiers, return type (absent for
/// constructors), name.
pub(crate) fn regex_method_signature() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex(concat!(
            r"^(?:@[\w$.]+(?:\([^)]*\))?\s+)*",
            r"((?:(?:public|private|protected|static|final|abstract|synchronized|native|default|strictfp)\s+)*)",
            r"(?:<[^()]*?>\s+)?",
            r"(?:([\w$.]+(?:\s*<.*>)?(?:\s*\[\s*\])*)\s+)?",
            r"([A-Za-z_$][\w$]*)\s*\([^)]*\)",
            r"\s*(?:throws\s+[\w$.,\s<>]+?)?\s*(?:\{.*)?$",
        ))
    })
}

/// Field declaration on a single trimmed line: `[mods] Type name [= ...];`.
/// Groups: modifiers, type, name.
pub(crate) fn regex_field_decl() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex(concat!(
            r"^(?:@[\w$.]+(?:\([^)]*\))?\s+)*",
            r"((?:(?:public|private|protected|static|final|transient|volatile)\s+)*)",
            r"([\w$.]+(?:\s*<.*>)?(?:\s*\[\s*\])*)\s+",
            r"([A-Za-z_$][\w$]*)\s*(?:\[\s*\])*\s*(?:=.*)?;\s*$",
        ))
    })
}
