//! Value quoting and splitting

use super::pro_string::{ProString, ProStringList};

/// Render a value so that reading it back yields the same value
///
/// Control characters are escaped, `$`, `\`, `"` and `'` are backslash
/// escaped, and values that are empty or contain a space are wrapped in
/// double quotes.
pub fn format_value(value: &str) -> String {
    format_value_with(value, false)
}

/// Like [`format_value`], optionally forcing quotes
pub fn format_value_with(value: &str, force_quote: bool) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    let mut quote = force_quote || value.is_empty();
    for c in value.chars() {
        match c {
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 32 => out.push_str(&format!("\\x{:02x}", c as u32)),
            '$' => out.push_str("\\$"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            ' ' => {
                quote = true;
                out.push(' ');
            }
            c => out.push(c),
        }
    }
    if quote {
        out.insert(0, '"');
        out.push('"');
    }
    out
}

/// Split a string on unquoted whitespace
///
/// Double quotes group words and are removed; `\"` keeps a literal quote.
pub fn split_value_list(input: &str) -> ProStringList {
    let mut out = ProStringList::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut had_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => {
                in_quotes = !in_quotes;
                had_quotes = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || had_quotes {
                    out.push(ProString::from(std::mem::take(&mut current)));
                }
                had_quotes = false;
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() || had_quotes {
        out.push(ProString::from(current));
    }
    out
}

/// Parse an integer the way C's `strtol(s, _, 0)` does
///
/// Accepts an optional sign, `0x`/`0X` for hexadecimal and a leading `0` for
/// octal. The whole (trimmed) string must be consumed.
pub fn parse_c_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = i64::from_str_radix(body, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_plain() {
        assert_eq!(format_value("abc"), "abc");
        assert_eq!(format_value(""), "\"\"");
    }

    #[test]
    fn test_format_value_escapes() {
        assert_eq!(format_value("a b"), "\"a b\"");
        assert_eq!(format_value("$HOME"), "\\$HOME");
        assert_eq!(format_value("C:\\dir"), "C:\\\\dir");
        assert_eq!(format_value("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(format_value("tab\there"), "tab\\there");
        assert_eq!(format_value("\u{1}"), "\\x01");
    }

    #[test]
    fn test_split_value_list() {
        let parts = split_value_list("a  \"b c\" d");
        assert_eq!(parts.join("|"), "a|b c|d");

        let parts = split_value_list("x \"\" y");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].as_str(), "");

        assert!(split_value_list("   ").is_empty());
    }

    #[test]
    fn test_parse_c_int() {
        assert_eq!(parse_c_int("42"), Some(42));
        assert_eq!(parse_c_int("-7"), Some(-7));
        assert_eq!(parse_c_int("0xFF"), Some(255));
        assert_eq!(parse_c_int("010"), Some(8));
        assert_eq!(parse_c_int("0"), Some(0));
        assert_eq!(parse_c_int(" 12 "), Some(12));
        assert_eq!(parse_c_int("abc"), None);
        assert_eq!(parse_c_int("12abc"), None);
        assert_eq!(parse_c_int("0x"), None);
        assert_eq!(parse_c_int(""), None);
        assert_eq!(parse_c_int("09"), None);
    }
}
