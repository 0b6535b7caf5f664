//! Escaping of literal text for LaTeX output

/// Escape LaTeX control characters in literal text
///
/// Handles `\ { } # $ % & _ ^ ~` in a single pass so that the replacement
/// sequences themselves are never escaped again.
pub fn escape_latex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '#' => out.push_str("\\#"),
            '$' => out.push_str("\\$"),
            '%' => out.push_str("\\%"),
            '&' => out.push_str("\\&"),
            '_' => out.push_str("\\_"),
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a ratio without trailing noise (`0.8`, `1`, `0.25`)
pub(crate) fn format_ratio(value: f32) -> String {
    let s = format!("{}", value);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_latex_plain() {
        assert_eq!(escape_latex("hello"), "hello");
        assert_eq!(escape_latex(""), "");
    }

    #[test]
    fn test_escape_latex_specials() {
        assert_eq!(escape_latex("50% done"), "50\\% done");
        assert_eq!(escape_latex("a & b"), "a \\& b");
        assert_eq!(escape_latex("snake_case"), "snake\\_case");
        assert_eq!(escape_latex("#1"), "\\#1");
        assert_eq!(escape_latex("$5"), "\\$5");
        assert_eq!(escape_latex("{x}"), "\\{x\\}");
    }

    #[test]
    fn test_escape_latex_no_double_escape() {
        assert_eq!(escape_latex("\\"), "\\textbackslash{}");
        assert_eq!(escape_latex("a^b~c"), "a\\textasciicircum{}b\\textasciitilde{}c");
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(0.8), "0.8");
        assert_eq!(format_ratio(1.0), "1");
        assert_eq!(format_ratio(0.25), "0.25");
    }
}
