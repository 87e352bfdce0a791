//! String-literal lexing for minified JavaScript.
//!
//! Only quote and backslash semantics are modelled. The surrounding bundle is
//! opaque generated code, so nothing here tries to understand statements,
//! comments, regex literals or template strings.

use crate::error::ExtractError;

/// A string literal located in bundle source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StringLiteral<'a> {
    /// Content between the quotes, escapes not yet resolved.
    pub raw: &'a str,
    /// Byte offset of the closing quote.
    pub end: usize,
}

/// Reads the string literal whose opening `quote` sits at byte offset `start`.
///
/// A quote closes the literal only when it is preceded by an even number of
/// consecutive backslashes.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedLiteral`] if `start` does not hold `quote`
/// or the source ends before an unescaped closing quote.
pub(crate) fn read_string_literal(
    source: &str,
    start: usize,
    quote: u8,
) -> Result<StringLiteral<'_>, ExtractError> {
    let bytes = source.as_bytes();
    if bytes.get(start) != Some(&quote) {
        return Err(ExtractError::MalformedLiteral {
            offset: start,
            reason: format!("expected opening {:?}", char::from(quote)),
        });
    }

    let mut backslashes = 0usize;
    for (i, &byte) in bytes.iter().enumerate().skip(start + 1) {
        if byte == b'\\' {
            backslashes += 1;
            continue;
        }
        if byte == quote && backslashes % 2 == 0 {
            return Ok(StringLiteral {
                raw: &source[start + 1..i],
                end: i,
            });
        }
        backslashes = 0;
    }

    Err(ExtractError::MalformedLiteral {
        offset: start,
        reason: "source ended before the closing quote".to_string(),
    })
}

/// Resolves JavaScript string escapes in `raw`.
///
/// Handles the single-character escapes, `\xHH`, `\uHHHH`, `\u{H..}`,
/// surrogate pairs, and line continuations. Unknown escapes yield the escaped
/// character itself, as JavaScript does. `offset` is only used for error
/// reporting.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedLiteral`] for a trailing backslash or a
/// truncated or invalid hex escape.
pub(crate) fn unescape_js_string(raw: &str, offset: usize) -> Result<String, ExtractError> {
    let malformed = |reason: &str| ExtractError::MalformedLiteral {
        offset,
        reason: reason.to_string(),
    };

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let escaped = chars.next().ok_or_else(|| malformed("trailing backslash"))?;
        match escaped {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'x' => {
                let code = read_hex(&mut chars, 2).ok_or_else(|| malformed("bad \\x escape"))?;
                out.push(char::from_u32(code).ok_or_else(|| malformed("bad \\x escape"))?);
            }
            'u' => {
                let code = read_unicode_escape(&mut chars)
                    .ok_or_else(|| malformed("bad \\u escape"))?;
                out.push(combine_surrogates(code, &mut chars));
            }
            // Line continuation.
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }

    Ok(out)
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

fn read_hex(chars: &mut Chars<'_>, digits: usize) -> Option<u32> {
    let mut code = 0u32;
    for _ in 0..digits {
        let digit = chars.next()?.to_digit(16)?;
        code = code * 16 + digit;
    }
    Some(code)
}

fn read_unicode_escape(chars: &mut Chars<'_>) -> Option<u32> {
    if chars.peek() != Some(&'{') {
        return read_hex(chars, 4);
    }
    chars.next();

    let mut code = 0u32;
    let mut digits = 0;
    loop {
        let c = chars.next()?;
        if c == '}' {
            break;
        }
        code = code.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
        digits += 1;
    }
    (digits > 0 && code <= 0x10_FFFF).then_some(code)
}

/// Joins a high surrogate with a following `\uDC00`-`\uDFFF` escape.
///
/// Lone surrogates become U+FFFD.
fn combine_surrogates(code: u32, chars: &mut Chars<'_>) -> char {
    if (0xD800..0xDC00).contains(&code) {
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            if let Some(low) = read_hex(&mut lookahead, 4) {
                if (0xDC00..0xE000).contains(&low) {
                    *chars = lookahead;
                    let combined = 0x1_0000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER);
                }
            }
        }
    }
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_literal_with_escaped_quote_and_backslash() {
        let source = r#""a\"b\\""#;
        let literal = read_string_literal(source, 0, b'"').unwrap();
        assert_eq!(literal.raw, r#"a\"b\\"#);
        assert_eq!(literal.end, source.len() - 1);
    }

    #[test]
    fn reads_literal_in_the_middle_of_code() {
        let source = r"x=JSON.parse('[{\'a\':1}]');y()";
        let start = source.find('\'').unwrap();
        let literal = read_string_literal(source, start, b'\'').unwrap();
        assert_eq!(literal.raw, r"[{\'a\':1}]");
        assert_eq!(&source[literal.end..=literal.end], "'");
        assert_eq!(&source[literal.end + 1..], ");y()");
    }

    #[test]
    fn other_quote_kind_does_not_close() {
        let source = r#"'say "hi"' + 1"#;
        let literal = read_string_literal(source, 0, b'\'').unwrap();
        assert_eq!(literal.raw, r#"say "hi""#);
    }

    #[test]
    fn odd_backslash_runs_escape_the_quote() {
        for n in 0..6 {
            let slashes = "\\".repeat(n);
            let source = format!("\"{slashes}\"tail\"");
            let literal = read_string_literal(&source, 0, b'"').unwrap();
            if n % 2 == 0 {
                assert_eq!(literal.raw, slashes, "{n} backslashes");
            } else {
                assert_eq!(literal.raw, format!("{slashes}\"tail"), "{n} backslashes");
            }
        }
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        let source = "'Café – ☕'";
        let literal = read_string_literal(source, 0, b'\'').unwrap();
        assert_eq!(literal.raw, "Café – ☕");
    }

    #[test]
    fn unterminated_literal_is_malformed() {
        let result = read_string_literal(r#""abc\""#, 0, b'"');
        assert!(matches!(
            result,
            Err(ExtractError::MalformedLiteral { offset: 0, .. })
        ));
    }

    #[test]
    fn start_must_point_at_quote() {
        let result = read_string_literal("abc'def'", 0, b'\'');
        assert!(matches!(result, Err(ExtractError::MalformedLiteral { .. })));
    }

    #[test]
    fn unescapes_standard_sequences() {
        let raw = r#"a\'b\"c\\d\ne\tf\x41é\u{1F600}\/"#;
        assert_eq!(
            unescape_js_string(raw, 0).unwrap(),
            "a'b\"c\\d\ne\tfAé😀/"
        );
    }

    #[test]
    fn unescapes_surrogate_pairs() {
        assert_eq!(unescape_js_string(r"\ud83c\udf55", 0).unwrap(), "🍕");
        assert_eq!(unescape_js_string(r"\ud83c!", 0).unwrap(), "\u{FFFD}!");
    }

    #[test]
    fn drops_line_continuations() {
        assert_eq!(unescape_js_string("ab\\\ncd", 0).unwrap(), "abcd");
        assert_eq!(unescape_js_string("ab\\\r\ncd", 0).unwrap(), "abcd");
    }

    #[test]
    fn keeps_json_escapes_decodable() {
        // JSON inside a JS literal: `\\"` in source is `\"` in the JSON text.
        let raw = r#"[{\"title\":\"Caf\\u00e9 \\\"X\\\"\"}]"#;
        let json = unescape_js_string(raw, 0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["title"], "Café \"X\"");
    }

    #[test]
    fn rejects_truncated_escapes() {
        assert!(unescape_js_string("abc\\", 0).is_err());
        assert!(unescape_js_string(r"\x4", 0).is_err());
        assert!(unescape_js_string(r"\u12", 0).is_err());
        assert!(unescape_js_string(r"\u{110000}", 0).is_err());
    }
}
