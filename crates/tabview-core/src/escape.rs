//! Identifier and literal escaping for generated SQL fragments
//!
//! Quoting follows the PostgreSQL client rules. The `escape_*` variants
//! additionally double every `%` because generated fragments are later fed
//! through a printf-style template step where a lone `%` is a placeholder.

/// Quote a string as a PostgreSQL literal.
///
/// Single quotes are doubled. A value containing a backslash has its
/// backslashes doubled and is emitted as an escape string (` E'...'`).
pub fn quote_literal(value: &str) -> String {
    let mut has_backslash = false;
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\'' => quoted.push_str("''"),
            '\\' => {
                quoted.push_str("\\\\");
                has_backslash = true;
            }
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');

    if has_backslash {
        format!(" E{}", quoted)
    } else {
        quoted
    }
}

/// Quote a string as a PostgreSQL identifier
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Double every `%` so the text survives a printf-style template step
pub fn double_percent(text: &str) -> String {
    text.replace('%', "%%")
}

/// Literal quoting plus `%` doubling
pub fn escape_literal(value: &str) -> String {
    double_percent(&quote_literal(value))
}

/// Identifier quoting plus `%` doubling
pub fn escape_identifier(name: &str) -> String {
    double_percent(&quote_identifier(name))
}

#[cfg(test)]
mod tests;
