//! Lexical helpers shared by every scanner.
//!
//! None of these build a syntax tree. They strip noise (comments, literal
//! contents) and split declaration lists well enough for line-oriented
//! pattern matching.

/// Reserved words and literals that can never name a type.
pub const JAVA_KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "try",
    "void",
    "volatile",
    "while",
    "true",
    "false",
    "null",
];

pub fn is_java_keyword(word: &str) -> bool {
    JAVA_KEYWORDS.contains(&word)
}

/// `[A-Za-z_$][A-Za-z0-9_$]*`
pub fn is_java_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Remove block and line comments and empty out string/char literals.
///
/// Literals become `""` / `''` so call shapes like `log("x")` survive.
/// Newlines inside comments and text blocks are preserved, so line-based
/// scanners see the same line numbering as the original text.
pub fn strip_comments_and_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev_star = false;
                for next in chars.by_ref() {
                    if prev_star && next == '/' {
                        break;
                    }
                    prev_star = next == '*';
                    if next == '\n' {
                        out.push('\n');
                    }
                }
            }
            '"' => {
                out.push_str("\"\"");
                let mut lookahead = chars.clone();
                let is_text_block = lookahead.next() == Some('"') && lookahead.next() == Some('"');
                if is_text_block {
                    chars.next();
                    chars.next();
                    skip_text_block(&mut chars, &mut out);
                } else {
                    skip_literal(&mut chars, '"');
                }
            }
            '\'' => {
                out.push_str("''");
                skip_literal(&mut chars, '\'');
            }
            _ => out.push(ch),
        }
    }
    out
}

fn skip_literal(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, delim: char) {
    let mut escaped = false;
    while let Some(&next) = chars.peek() {
        // Unterminated literal: stop at end of line.
        if next == '\n' {
            return;
        }
        chars.next();
        if escaped {
            escaped = false;
        } else if next == '\\' {
            escaped = true;
        } else if next == delim {
            return;
        }
    }
}

fn skip_text_block(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, out: &mut String) {
    let mut quotes = 0;
    let mut escaped = false;
    for next in chars.by_ref() {
        if next == '\n' {
            out.push('\n');
        }
        if escaped {
            escaped = false;
            quotes = 0;
            continue;
        }
        match next {
            '\\' => {
                escaped = true;
                quotes = 0;
            }
            '"' => {
                quotes += 1;
                if quotes == 3 {
                    return;
                }
            }
            _ => quotes = 0,
        }
    }
}

/// Split a declaration list on commas that are not nested inside `<...>`.
///
/// `Comparable<Pair<A, B>>, Serializable` yields two items. Items are
/// trimmed; an empty trailing item is dropped.
pub fn split_top_level(list: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for ch in list.chars() {
        match ch {
            '<' => {
                depth += 1;
                current.push(ch);
            }
            '>' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                items.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let last = current.trim();
    if !last.is_empty() {
        items.push(last.to_string());
    }
    items
}

/// Base type of a possibly parameterized type reference:
/// `Map<String, List<Foo>>` becomes `Map`.
pub fn strip_generic_arguments(type_name: &str) -> &str {
    match type_name.find('<') {
        Some(idx) => type_name[..idx].trim(),
        None => type_name,
    }
}

/// Canonical spelling of a type reference: base type with its generic
/// arguments kept but the whitespace after commas collapsed, so
/// `Map<String,  Foo>` and `Map<String,Foo>` compare equal.
pub fn normalize_generic_type(type_name: &str) -> String {
    let Some(open) = type_name.find('<') else {
        return type_name.to_string();
    };

    let base = type_name[..open].trim();
    let mut args = String::new();
    let mut in_literal = false;
    let mut skip_space = false;

    for ch in type_name[open..].chars() {
        match ch {
            '"' | '\'' => {
                in_literal = !in_literal;
                args.push(ch);
            }
            ',' if !in_literal => {
                args.push(ch);
                skip_space = true;
            }
            c if c.is_whitespace() && skip_space && !in_literal => {}
            _ => {
                skip_space = false;
                args.push(ch);
            }
        }
    }

    format!("{base}{args}")
}

/// Number of `{` and `}` on a line.
pub fn brace_counts(line: &str) -> (usize, usize) {
    line.chars().fold((0, 0), |(open, close), ch| match ch {
        '{' => (open + 1, close),
        '}' => (open, close + 1),
        _ => (open, close),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments() {
        let src = "int a; // Foo here\n/* Bar\n baz */ int b;";
        let out = strip_comments_and_strings(src);
        assert_eq!(out, "int a; \n\n int b;");
        assert_eq!(out.lines().count(), src.lines().count());
    }

    #[test]
    fn empties_string_and_char_literals() {
        let src = r#"log("new Target() // not code", 'x', '\'');"#;
        let out = strip_comments_and_strings(src);
        assert_eq!(out, r#"log("", '', '');"#);
    }

    #[test]
    fn keeps_escaped_quotes_inside_literal() {
        let src = r#"String s = "say \"Target\" now"; Target t;"#;
        let out = strip_comments_and_strings(src);
        assert_eq!(out, r#"String s = ""; Target t;"#);
    }

    #[test]
    fn strips_text_blocks_preserving_lines() {
        let src = "String q = \"\"\"\n  SELECT Target\n  \"\"\";\nint x;";
        let out = strip_comments_and_strings(src);
        assert!(!out.contains("Target"));
        assert!(out.ends_with("int x;"));
        assert_eq!(out.lines().count(), src.lines().count());
    }

    #[test]
    fn split_respects_generic_nesting() {
        assert_eq!(
            split_top_level("Comparable<Pair<A, B>>, Serializable"),
            vec!["Comparable<Pair<A, B>>", "Serializable"]
        );
        assert_eq!(split_top_level(" Runnable ,"), vec!["Runnable"]);
        assert!(split_top_level("   ").is_empty());
    }

    #[test]
    fn strip_generics_returns_base_type() {
        assert_eq!(strip_generic_arguments("Map<String, List<Foo>>"), "Map");
        assert_eq!(strip_generic_arguments("Runnable"), "Runnable");
    }

    #[test]
    fn normalize_collapses_space_after_commas() {
        assert_eq!(
            normalize_generic_type("Map<String,   List<Foo>>"),
            "Map<String,List<Foo>>"
        );
        assert_eq!(normalize_generic_type("Plain"), "Plain");
    }

    #[test]
    fn identifier_and_keyword_checks() {
        assert!(is_java_identifier("Foo$Bar_1"));
        assert!(!is_java_identifier("1Foo"));
        assert!(!is_java_identifier("Foo Bar"));
        assert!(is_java_keyword("instanceof"));
        assert!(!is_java_keyword("Instanceof"));
    }

    #[test]
    fn counts_braces() {
        assert_eq!(brace_counts("} else {"), (1, 1));
        assert_eq!(brace_counts("int x;"), (0, 0));
    }
}
