//! Brace matching over bundle source and page state.

use super::lexer::read_string_literal;
use crate::error::ExtractError;

/// Returns the byte offset of the `}` matching the `{` at `open`.
///
/// Braces inside string literals or comments are counted like any other, so
/// callers must only start at positions where the enclosed region is known
/// not to contain stray braces.
///
/// # Errors
///
/// Returns [`ExtractError::UnbalancedDelimiters`] if `open` is not a `{` or
/// the source ends before the depth returns to zero.
pub(crate) fn find_matching_brace(source: &str, open: usize) -> Result<usize, ExtractError> {
    let bytes = source.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return Err(ExtractError::UnbalancedDelimiters { offset: open });
    }

    let mut depth = 0usize;
    for (i, &byte) in bytes.iter().enumerate().skip(open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }

    Err(ExtractError::UnbalancedDelimiters { offset: open })
}

/// Returns the `{...}` slice starting at `open`, braces included.
pub(crate) fn balanced_object(source: &str, open: usize) -> Result<&str, ExtractError> {
    let close = find_matching_brace(source, open)?;
    Ok(&source[open..=close])
}

/// Like [`find_matching_brace`], but `"` and `'` string literals are skipped
/// whole, so braces inside them are not counted.
///
/// For page state such as `window.__NUXT__`, where free-text values may hold
/// braces.
///
/// # Errors
///
/// Returns [`ExtractError::UnbalancedDelimiters`] as above, or
/// [`ExtractError::MalformedLiteral`] if a string literal never closes.
pub(crate) fn find_matching_brace_outside_strings(
    source: &str,
    open: usize,
) -> Result<usize, ExtractError> {
    let bytes = source.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return Err(ExtractError::UnbalancedDelimiters { offset: open });
    }

    let mut depth = 0usize;
    let mut i = open;
    while let Some(&byte) = bytes.get(i) {
        match byte {
            quote @ (b'"' | b'\'') => i = read_string_literal(source, i, quote)?.end,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    Err(ExtractError::UnbalancedDelimiters { offset: open })
}

/// Returns the `{...}` slice starting at `open`, skipping string literals.
pub(crate) fn balanced_object_outside_strings(
    source: &str,
    open: usize,
) -> Result<&str, ExtractError> {
    let close = find_matching_brace_outside_strings(source, open)?;
    Ok(&source[open..=close])
}
