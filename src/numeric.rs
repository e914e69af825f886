//! Number parsing and formatting with the conventions of the RQL wire format.
//!
//! The query endpoint and the clients that produce queries agree on the
//! JavaScript notion of "a string that is a number" and on the JavaScript
//! textual form of numbers. Both are reproduced here so that the encoder, the
//! decoder and the local comparator classify values the same way.

/// Whitespace that `Number(" 42 ")` ignores around a numeric literal: the
/// ECMAScript WhiteSpace and LineTerminator characters. U+0085 is not one.
fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t'
            | '\n'
            | '\u{b}'
            | '\u{c}'
            | '\r'
            | ' '
            | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
            | '\u{feff}'
    )
}

/// Removes the Java-only parts of a numeric literal: `_` digit separators
/// and a single trailing `L`, `F` or `D` type suffix (any case).
///
/// ```
/// use rql_engine::numeric::strip_java_number_syntax;
///
/// assert_eq!(strip_java_number_syntax("1_000L"), "1000");
/// assert_eq!(strip_java_number_syntax("2.5f"), "2.5");
/// assert_eq!(strip_java_number_syntax("a_b"), "a_b");
/// ```
pub fn strip_java_number_syntax(val: &str) -> String {
    let chars: Vec<char> = val.chars().collect();
    let mut result = String::with_capacity(val.len());

    for (i, &ch) in chars.iter().enumerate() {
        let separator = ch == '_'
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit());
        if !separator {
            result.push(ch);
        }
    }

    if result.ends_with(['L', 'l', 'F', 'f', 'D', 'd']) {
        result.pop();
    }
    result
}

/// Parses a string the way `Number(string)` does: surrounding whitespace is
/// ignored, the empty string is zero, `0x`/`0o`/`0b` prefixes select a radix,
/// `Infinity` is accepted with an optional sign, and anything else that is not
/// a complete decimal literal yields `NaN`.
pub fn parse_js_number(input: &str) -> f64 {
    let s = input.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return 0.0;
    }

    if let Some(value) = parse_radix_literal(s) {
        return value;
    }

    let (sign, body) = match s.as_bytes()[0] {
        b'+' => (1.0, &s[1..]),
        b'-' => (-1.0, &s[1..]),
        _ => (1.0, s),
    };

    if body == "Infinity" {
        return sign * f64::INFINITY;
    }
    if !is_decimal_literal(body) {
        return f64::NAN;
    }

    body.parse::<f64>().map(|v| sign * v).unwrap_or(f64::NAN)
}

fn parse_radix_literal(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };

    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }

    let mut value = 0.0f64;
    for ch in digits.chars() {
        match ch.to_digit(radix) {
            Some(d) => value = value * f64::from(radix) + f64::from(d),
            None => return Some(f64::NAN),
        }
    }
    Some(value)
}

/// `digits [. digits] [exp]` or `. digits [exp]`, unsigned.
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut pos = 0;

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = pos - int_start;

    let mut frac_digits = 0;
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        let frac_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        frac_digits = pos - frac_start;
    }

    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        pos += 1;
        if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
            pos += 1;
        }
        let exp_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == exp_start {
            return false;
        }
    }

    pos == bytes.len()
}

/// Whether a string would be read back as a number by a Java endpoint.
///
/// The string is first stripped of Java separators and suffixes. Note that
/// it is as loose as `Number()`: the empty string and a bare
/// suffix letter such as `"L"` both count as numbers.
pub fn is_number_like(val: &str) -> bool {
    !parse_js_number(&strip_java_number_syntax(val)).is_nan()
}

/// Formats a number the way `String(number)` does.
///
/// ```
/// use rql_engine::numeric::format_js_number;
///
/// assert_eq!(format_js_number(1.0), "1");
/// assert_eq!(format_js_number(-0.0), "0");
/// assert_eq!(format_js_number(1e21), "1e+21");
/// assert_eq!(format_js_number(f64::NEG_INFINITY), "-Infinity");
/// ```
pub fn format_js_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let formatted = format!("{:e}", n);
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => formatted,
        }
    } else {
        n.to_string()
    }
}

/// Parses a decoded wire token into an integer when it is written as one,
/// falling back to a float. Returns `None` for blank or non-numeric text.
pub fn parse_wire_number(val: &str) -> Option<NumberLiteral> {
    let canonical = strip_java_number_syntax(val);
    let trimmed = canonical.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return None;
    }

    let value = parse_js_number(trimmed);
    if value.is_nan() {
        return None;
    }

    let unsigned = trimmed.trim_start_matches(['+', '-']);
    let is_integer_text = !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit());
    if is_integer_text && let Ok(n) = trimmed.parse::<i64>() {
        return Some(NumberLiteral::Integer(n));
    }

    if parse_radix_literal(trimmed).is_some() && value.fract() == 0.0 && value <= i64::MAX as f64 {
        return Some(NumberLiteral::Integer(value as i64));
    }

    Some(NumberLiteral::Float(value))
}

/// A number read from the wire, keeping integers apart from floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLiteral {
    Integer(i64),
    Float(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_js_number() {
        assert_eq!(parse_js_number(" 42 "), 42.0);
        assert_eq!(parse_js_number(""), 0.0);
        assert_eq!(parse_js_number("0x1f"), 31.0);
        assert_eq!(parse_js_number("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(parse_js_number(".5"), 0.5);
        assert!(parse_js_number("1.").is_finite());
        assert!(parse_js_number("1e").is_nan());
        assert!(parse_js_number("12abc").is_nan());
        assert!(parse_js_number("inf").is_nan());
    }

    #[test]
    fn test_js_whitespace_set() {
        assert_eq!(parse_js_number("\u{a0}5\u{2028}"), 5.0);
        assert_eq!(parse_js_number("\u{feff}\u{3000}7\t"), 7.0);
        assert!(parse_js_number("\u{85}5").is_nan());
        assert!(parse_js_number("5\u{180e}").is_nan());
        assert!(!is_number_like("\u{85}5"));
        assert!(is_number_like("\u{2009}5"));
    }

    #[test]
    fn test_number_like() {
        assert!(is_number_like("123"));
        assert!(is_number_like("1_000"));
        assert!(is_number_like("5L"));
        assert!(is_number_like("L"));
        assert!(!is_number_like("1__0"));
        assert!(!is_number_like("abc"));
    }

    #[test]
    fn test_format_small_numbers() {
        assert_eq!(format_js_number(0.000001), "0.000001");
        assert_eq!(format_js_number(1e-7), "1e-7");
        assert_eq!(format_js_number(-2.5), "-2.5");
    }

    #[test]
    fn test_parse_wire_number() {
        assert_eq!(parse_wire_number("7"), Some(NumberLiteral::Integer(7)));
        assert_eq!(parse_wire_number("0x10"), Some(NumberLiteral::Integer(16)));
        assert_eq!(parse_wire_number("2.5"), Some(NumberLiteral::Float(2.5)));
        assert_eq!(parse_wire_number("99999999999999999999"), Some(NumberLiteral::Float(1e20)));
        assert_eq!(parse_wire_number("L"), None);
        assert_eq!(parse_wire_number("x"), None);
    }
}
