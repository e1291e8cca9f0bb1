use heck::{ToSnakeCase, ToUpperCamelCase};

/// Struct name for a table: `user_accounts` -> `UserAccounts`.
pub fn type_ident(table: &str) -> String {
    let mut s = table
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .to_upper_camel_case();

    if s.is_empty() {
        s.push('_');
    }
    if s.starts_with(|c: char| c.is_ascii_digit()) {
        s.insert(0, '_');
    }
    if s == "Self" {
        s.push('_');
    }
    s
}

/// Field, method or module identifier; keywords become raw identifiers.
pub fn field_ident(column: &str) -> String {
    let mut s = column
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .to_snake_case();

    if s.is_empty() {
        s.push('_');
    }
    if s.starts_with(|c: char| c.is_ascii_digit()) {
        s.insert(0, '_');
    }
    // these cannot be raw identifiers
    if matches!(s.as_str(), "self" | "super" | "crate") {
        s.push('_');
        return s;
    }
    if is_rust_keyword(&s) {
        format!("r#{s}")
    } else {
        s
    }
}

/// Identifier text without the `r#` prefix, for file names and suffixes.
pub fn bare(ident: &str) -> &str {
    ident.trim_start_matches("r#")
}

fn is_rust_keyword(s: &str) -> bool {
    matches!(
        s,
        "as" | "break"
            | "const"
            | "continue"
            | "crate"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "self"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "async"
            | "await"
            | "dyn"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "gen"
            | "macro"
            | "override"
            | "priv"
            | "try"
            | "typeof"
            | "unsized"
            | "virtual"
            | "yield"
    )
}
