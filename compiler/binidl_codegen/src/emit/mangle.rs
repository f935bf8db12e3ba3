//! Identifier mangling for emitted Rust.

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn",
    "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Mangle a schema field name into a snake_case Rust field identifier.
///
/// Word boundaries are lower-to-upper transitions and the last capital of
/// an acronym (`HTTPServer` becomes `http_server`). Characters that cannot
/// appear in an identifier become `_`.
pub fn field_ident(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p)).copied();
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    finish(out)
}

/// Mangle a schema type name into a Rust type identifier.
///
/// The spelling is kept; only characters that cannot appear in an
/// identifier are replaced.
pub fn type_ident(name: &str) -> String {
    let out = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    finish(out)
}

fn finish(mut ident: String) -> String {
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if RESERVED.contains(&ident.as_str()) {
        ident.push('_');
    } else if KEYWORDS.contains(&ident.as_str()) {
        ident.insert_str(0, "r#");
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn go_style_names_become_snake_case() {
        assert_eq!(field_ident("A"), "a");
        assert_eq!(field_ident("FooBar"), "foo_bar");
        assert_eq!(field_ident("ID"), "id");
        assert_eq!(field_ident("HTTPServer"), "http_server");
        assert_eq!(field_ident("Crc32Sum"), "crc32_sum");
    }

    #[test]
    fn snake_case_is_unchanged() {
        assert_eq!(field_ident("already_snake"), "already_snake");
        assert_eq!(field_ident("x"), "x");
    }

    #[test]
    fn keywords_and_odd_characters() {
        assert_eq!(field_ident("Type"), "r#type");
        assert_eq!(field_ident("self"), "self_");
        assert_eq!(field_ident("my-field"), "my_field");
        assert_eq!(field_ident("9lives"), "_9lives");
        assert_eq!(type_ident("Self"), "Self_");
        assert_eq!(type_ident("Wire.Header"), "Wire_Header");
    }
}
