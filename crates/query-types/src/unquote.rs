//! Unquoting of quoted query values.
//!
//! Double-quoted values use the usual escape sequences (`\n`, `\t`, `\"`,
//! `\xHH`, `\ooo`, `\uXXXX`, `\UXXXXXXXX`, ...), back-quoted values are raw.
//! Single-quoted values may hold any number of characters, including bare
//! double quotes: `'say "hi"'` unquotes to `say "hi"`.

use std::str::Chars;

use crate::error::TypeErrorKind;

/// Unquotes a quoted query value.
pub fn unquote_string(s: &str) -> Result<String, TypeErrorKind> {
    let rewritten;
    let mut quoted = s;
    if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
        rewritten = format!("\"{}\"", s[1..s.len() - 1].replace('"', "\\\""));
        quoted = &rewritten;
    }
    unquote(quoted).ok_or_else(|| TypeErrorKind::InvalidQuotedString(s.to_string()))
}

fn unquote(s: &str) -> Option<String> {
    let quote = s.chars().next().filter(|ch| matches!(ch, '"' | '`'))?;
    if s.len() < 2 || !s.ends_with(quote) {
        return None;
    }
    let body = &s[1..s.len() - 1];

    if quote == '`' {
        (!body.contains('`')).then(|| body.replace('\r', ""))
    } else {
        unescape_double_quoted(body)
    }
}

fn unescape_double_quoted(body: &str) -> Option<String> {
    if body.contains('\n') {
        return None;
    }

    // Byte escapes may produce partial UTF-8 sequences, so collect bytes and
    // validate once at the end.
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => return None,
            '\\' => unescape_sequence(&mut chars, &mut out)?,
            _ => push_char(&mut out, ch),
        }
    }
    String::from_utf8(out).ok()
}

fn unescape_sequence(chars: &mut Chars<'_>, out: &mut Vec<u8>) -> Option<()> {
    let byte = match chars.next()? {
        'a' => 0x07,
        'b' => 0x08,
        'f' => 0x0c,
        'n' => b'\n',
        'r' => b'\r',
        't' => b'\t',
        'v' => 0x0b,
        '\\' => b'\\',
        '"' => b'"',
        'x' => u8::try_from(hex_value(chars, 2)?).ok()?,
        'u' => {
            push_char(out, char::from_u32(hex_value(chars, 4)?)?);
            return Some(());
        }
        'U' => {
            push_char(out, char::from_u32(hex_value(chars, 8)?)?);
            return Some(());
        }
        first @ '0'..='7' => {
            let mut value = first.to_digit(8)?;
            for _ in 0..2 {
                value = value * 8 + chars.next()?.to_digit(8)?;
            }
            u8::try_from(value).ok()?
        }
        _ => return None,
    };
    out.push(byte);
    Some(())
}

fn hex_value(chars: &mut Chars<'_>, digits: usize) -> Option<u32> {
    (0..digits).try_fold(0u32, |acc, _| Some(acc * 16 + chars.next()?.to_digit(16)?))
}

fn push_char(out: &mut Vec<u8>, ch: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
}
