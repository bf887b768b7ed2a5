//! Numeric and percentage literal recognition

use lazy_regex::{lazy_regex, Lazy, Regex};

static NUMBER: Lazy<Regex> = lazy_regex!(r"^-?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)$");
static PERCENT: Lazy<Regex> = lazy_regex!(r"^(-?[0-9]+(?:\.[0-9]+)?)%$");
static NUMERIC_SHAPED: Lazy<Regex> = lazy_regex!(r"^[0-9.]+$");

/// The characters that split a formula into operands
pub const SPECIAL_CHARS: [char; 6] = ['(', ')', '*', '/', '+', '-'];

pub fn is_special(c: char) -> bool {
    SPECIAL_CHARS.contains(&c)
}

/// True if `text` is a plain number such as `12`, `-3.5` or `.5`
pub fn is_number(text: &str) -> bool {
    NUMBER.is_match(text)
}

/// Parse a plain number
pub fn parse_number(text: &str) -> Option<f64> {
    if !is_number(text) {
        return None;
    }
    text.parse().ok()
}

/// Parse a percentage such as `-20.22%` into its fraction (`-0.2022`)
pub fn parse_percent(text: &str) -> Option<f64> {
    let caps = PERCENT.captures(text)?;
    let number: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(number / 100.0)
}

/// Why a bare token cannot be a variable name, if it cannot
pub fn reject_bare_token(text: &str) -> Option<&'static str> {
    if text.chars().any(char::is_whitespace) {
        Some("missing operator")
    } else if NUMERIC_SHAPED.is_match(text) {
        Some("invalid number")
    } else if text.contains('%') {
        Some("invalid percentage")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(parse_number("12.5"), Some(12.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("007"), Some(7.0));

        assert_eq!(parse_number("5."), None);
        assert_eq!(parse_number("1.2.3"), None);
        assert_eq!(parse_number("1e10"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("+5"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_percentages() {
        assert_eq!(parse_percent("50%"), Some(0.5));
        assert_eq!(parse_percent("-20%"), Some(-0.2));
        assert!((parse_percent("-20.22%").unwrap() + 0.2022).abs() < 1e-12);

        assert_eq!(parse_percent("%"), None);
        assert_eq!(parse_percent("5%%"), None);
        assert_eq!(parse_percent(".5%"), None);
        assert_eq!(parse_percent("50"), None);
    }

    #[test]
    fn test_bare_tokens() {
        assert_eq!(reject_bare_token("revenue"), None);
        assert_eq!(reject_bare_token("毛利率"), None);
        assert_eq!(reject_bare_token("q3_total.usd"), None);
        assert_eq!(reject_bare_token("2 3"), Some("missing operator"));
        assert_eq!(reject_bare_token("1.2.3"), Some("invalid number"));
        assert_eq!(reject_bare_token("5%%"), Some("invalid percentage"));
    }
}
