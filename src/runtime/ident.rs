////////////////////////////////////////////////////////////////////////////////
// This file is part of "Altair", an embeddable scripting programming         //
// language platform.                                                         //
//                                                                            //
// This work is free software, distributed under the terms of the MIT         //
// license, as published in the LICENSE file of the source code distribution. //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
////////////////////////////////////////////////////////////////////////////////

use std::sync::OnceLock;

use ahash::AHashSet;
use compact_str::CompactString;

use crate::runtime::{RuntimeError, RuntimeResult};

/// The maximum byte length of a raw (unquoted) identifier token.
///
/// Longer member and slot names are still valid, but they must be rendered
/// as escape-quoted string literals. See [to_id_or_literal].
pub const MAX_ID_LENGTH: usize = 255;

static RESERVED: OnceLock<AHashSet<&'static str>> = OnceLock::new();

fn reserved_words() -> &'static AHashSet<&'static str> {
    RESERVED.get_or_init(|| {
        AHashSet::from_iter([
            "and", "as", "break", "catch", "continue", "do", "else", "false",
            "finally", "for", "foreach", "function", "global", "if", "in",
            "is", "local", "mod", "new", "not", "null", "or", "ref", "return",
            "static", "then", "throw", "true", "try", "unless", "until",
            "var", "while", "xor", "yield",
        ])
    })
}

/// Returns true if the string is a reserved keyword of the scripting
/// language.
///
/// Reserved keywords never round-trip as raw identifier tokens; they
/// require quoting. The check is case-sensitive, because all keywords are
/// lower-case by definition.
#[inline(always)]
pub fn is_reserved_word(string: &str) -> bool {
    reserved_words().contains(string)
}

/// Returns true if the string round-trips as a raw identifier token
/// without quoting.
///
/// A valid identifier starts with an ASCII letter or an underscore,
/// continues with ASCII letters, digits, or underscores, is at most
/// [MAX_ID_LENGTH] bytes long, and is not a [reserved
/// keyword](is_reserved_word).
///
/// ```
/// use altair::runtime::ident::is_valid_id;
///
/// assert!(is_valid_id("total_2"));
/// assert!(!is_valid_id("2nd"));
/// assert!(!is_valid_id("while"));
/// assert!(!is_valid_id("per cent"));
/// ```
pub fn is_valid_id(string: &str) -> bool {
    if string.is_empty() || string.len() > MAX_ID_LENGTH {
        return false;
    }

    let mut chars = string.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => (),
        _ => return false,
    }

    if !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return false;
    }

    !is_reserved_word(string)
}

/// Escapes a string for embedding into a double-quoted literal.
///
/// Backslashes, double quotes, and control characters are replaced with
/// their escape sequences. All other characters, including non-ASCII
/// Unicode, pass through verbatim.
///
/// [unescape] reverses this transformation for any input:
/// `unescape(&escape(s))` reproduces `s` exactly.
pub fn escape(string: &str) -> String {
    let mut result = String::with_capacity(string.len());

    for ch in string.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\0' => result.push_str("\\0"),
            '\u{07}' => result.push_str("\\a"),
            '\u{08}' => result.push_str("\\b"),
            '\t' => result.push_str("\\t"),
            '\n' => result.push_str("\\n"),
            '\u{0B}' => result.push_str("\\v"),
            '\u{0C}' => result.push_str("\\f"),
            '\r' => result.push_str("\\r"),

            ch if (ch as u32) < 0x20 || ch == '\u{7F}' => {
                result.push_str(&format!("\\x{:02X}", ch as u32));
            }

            ch => result.push(ch),
        }
    }

    result
}

/// Reverses [escape].
///
/// The reader is more liberal than the writer: in addition to everything
/// [escape] emits, it accepts `\'`, `\uXXXX` (four hex digits), and
/// `\UXXXXXXXX` (eight hex digits) sequences.
///
/// Malformed escape sequences and hex sequences that do not form a Unicode
/// scalar value fail with a [Conversion](RuntimeError::Conversion) error.
pub fn unescape(string: &str) -> RuntimeResult<String> {
    let mut result = String::with_capacity(string.len());
    let mut chars = string.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        let Some(escape) = chars.next() else {
            return Err(literal_error(string));
        };

        match escape {
            '\\' => result.push('\\'),
            '"' => result.push('"'),
            '\'' => result.push('\''),
            '0' => result.push('\0'),
            'a' => result.push('\u{07}'),
            'b' => result.push('\u{08}'),
            't' => result.push('\t'),
            'n' => result.push('\n'),
            'v' => result.push('\u{0B}'),
            'f' => result.push('\u{0C}'),
            'r' => result.push('\r'),

            'x' => result.push(hex_scalar(string, &mut chars, 2)?),
            'u' => result.push(hex_scalar(string, &mut chars, 4)?),
            'U' => result.push(hex_scalar(string, &mut chars, 8)?),

            _ => return Err(literal_error(string)),
        }
    }

    Ok(result)
}

/// Renders a member or slot name as a source token.
///
/// Names that qualify as [valid identifiers](is_valid_id) are returned
/// as is. Everything else (reserved keywords, names with exotic
/// characters, overlong names) is rendered as an escape-quoted literal
/// that parses back to the same string.
///
/// ```
/// use altair::runtime::ident::to_id_or_literal;
///
/// assert_eq!(to_id_or_literal("count"), "count");
/// assert_eq!(to_id_or_literal("while"), "\"while\"");
/// assert_eq!(to_id_or_literal("a\nb"), "\"a\\nb\"");
/// ```
pub fn to_id_or_literal(string: &str) -> String {
    match is_valid_id(string) {
        true => String::from(string),
        false => format!("\"{}\"", escape(string)),
    }
}

fn hex_scalar(
    source: &str,
    chars: &mut std::str::Chars<'_>,
    digits: usize,
) -> RuntimeResult<char> {
    let mut code = 0u32;

    for _ in 0..digits {
        let Some(digit) = chars.next().and_then(|ch| ch.to_digit(16)) else {
            return Err(literal_error(source));
        };

        code = code * 16 + digit;
    }

    char::from_u32(code).ok_or_else(|| literal_error(source))
}

#[inline]
fn literal_error(source: &str) -> RuntimeError {
    RuntimeError::Conversion {
        from: CompactString::from("escaped string literal"),
        to: CompactString::from("String"),
        value: CompactString::from(source),
    }
}
