use super::*;
use pretty_assertions::assert_eq;

/// What the downstream template step does to a fragment with no arguments
fn render_template(fragment: &str) -> String {
    fragment.replace("%%", "%")
}

#[test]
fn quote_literal_doubles_single_quotes() {
    assert_eq!(quote_literal("it's"), "'it''s'");
    assert_eq!(quote_literal(""), "''");
}

#[test]
fn quote_literal_uses_escape_string_for_backslashes() {
    assert_eq!(quote_literal(r"C:\temp"), r" E'C:\\temp'");
    assert_eq!(quote_literal(r"a'\b"), r" E'a''\\b'");
}

#[test]
fn quote_identifier_doubles_double_quotes() {
    assert_eq!(quote_identifier("users"), "\"users\"");
    assert_eq!(quote_identifier("my \"odd\" col"), "\"my \"\"odd\"\" col\"");
}

#[test]
fn escape_literal_doubles_percent_after_quoting() {
    assert_eq!(escape_literal("100%"), "'100%%'");
    assert_eq!(escape_literal("%'%"), "'%%''%%'");
}

#[test]
fn escape_identifier_doubles_percent() {
    assert_eq!(escape_identifier("growth_%"), "\"growth_%%\"");
}

#[test]
fn escaped_output_never_has_a_lone_percent() {
    for value in ["%", "a%b", "%%", "50% off", "it's 5%", r"\%"] {
        let escaped = escape_literal(value);
        let without_pairs = escaped.replace("%%", "");
        assert!(!without_pairs.contains('%'), "lone % in {escaped}");
    }
}

#[test]
fn template_rendering_restores_the_quoted_literal() {
    for value in ["50% off", "%start", "end%", "plain", "it's"] {
        assert_eq!(render_template(&escape_literal(value)), quote_literal(value));
        assert_eq!(render_template(&escape_identifier(value)), quote_identifier(value));
    }
}
