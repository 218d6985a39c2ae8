//! Regular expression compilation with a best-effort repair pass.
//!
//! Search users routinely type patterns that are not quite valid regular
//! expressions: a literal `$` in the middle of a term, a leading `*` meant
//! as a wildcard, an unbalanced `(` or `[`. Compilation goes through two
//! stages:
//!
//! 1. Preprocessing fixes mistakes that compile but change meaning
//!    (an unescaped `$` before the end of the pattern).
//! 2. If compilation fails, the failure is classified and a single repair
//!    is attempted. When the repaired pattern also fails, the error for the
//!    pattern as written is returned.

use std::iter::Peekable;
use std::str::CharIndices;

use memchr::memchr_iter;
use regex::Regex;

/// Compiles a search pattern, repairing common mistakes.
pub fn compile_regexp(value: &str) -> Result<Regex, regex::Error> {
    let preprocessed = preprocess_regexp_query(value);
    match Regex::new(&preprocessed) {
        Ok(regex) => Ok(regex),
        Err(err) => fixup_regexp_compile_error(&preprocessed, err),
    }
}

/// Escapes every `$` that is neither escaped nor the last character.
///
/// A trailing `$` is kept as an end-of-line anchor; anywhere else it is
/// taken to be a literal dollar sign.
pub fn preprocess_regexp_query(value: &str) -> String {
    let bytes = value.as_bytes();
    let last = bytes.len().saturating_sub(1);
    let mut out = String::with_capacity(value.len() + 2);
    let mut copied = 0;

    for index in memchr_iter(b'$', bytes) {
        if index == last || is_escaped(bytes, index) {
            continue;
        }
        out.push_str(&value[copied..index]);
        out.push('\\');
        copied = index;
    }
    out.push_str(&value[copied..]);
    out
}

/// A byte is escaped when preceded by an odd run of backslashes.
fn is_escaped(bytes: &[u8], index: usize) -> bool {
    bytes[..index]
        .iter()
        .rev()
        .take_while(|&&byte| byte == b'\\')
        .count()
        % 2
        == 1
}

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

/// The two families of compile failure that can be repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompileDefect {
    /// A repetition operator with nothing to repeat, e.g. `*.go`. Carries
    /// the operator and its byte offset.
    MissingRepetitionArgument(char, usize),
    /// A group or class that is never closed; carries the missing closer.
    MissingClosing(char),
}

type Scanner<'a> = Peekable<CharIndices<'a>>;

fn next_is(chars: &mut Scanner<'_>, expected: char) -> bool {
    chars.peek().is_some_and(|&(_, ch)| ch == expected)
}

/// Scans `pattern` for the first repairable defect.
///
/// Only the constructs relevant to the two defect families are tracked:
/// escapes, classes, groups (including `(?flags)` and named groups),
/// alternation and repetition operators.
fn diagnose_compile_defect(pattern: &str) -> Option<CompileDefect> {
    let mut chars = pattern.char_indices().peekable();
    // One entry per open group; true for a `(?flags)` group, which has no
    // body and leaves nothing to repeat.
    let mut open_groups: Vec<bool> = Vec::new();
    let mut has_atom = false;

    while let Some((index, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
                has_atom = true;
            }
            '[' => {
                if !skip_class(&mut chars) {
                    return Some(CompileDefect::MissingClosing(']'));
                }
                has_atom = true;
            }
            '(' => {
                has_atom = false;
                let flags_only = next_is(&mut chars, '?') && {
                    chars.next();
                    skip_group_prefix(&mut chars)
                };
                open_groups.push(flags_only);
            }
            ')' => {
                let flags_only = open_groups.pop().unwrap_or(false);
                has_atom = !flags_only;
            }
            '|' => has_atom = false,
            '*' | '+' | '?' => {
                if !has_atom {
                    return Some(CompileDefect::MissingRepetitionArgument(ch, index));
                }
                // Lazy suffix, e.g. `a*?`.
                if next_is(&mut chars, '?') {
                    chars.next();
                }
            }
            _ => has_atom = true,
        }
    }

    (!open_groups.is_empty()).then_some(CompileDefect::MissingClosing(')'))
}

/// Consumes a class body after its `[`. Returns false if it never closes.
fn skip_class(chars: &mut Scanner<'_>) -> bool {
    let mut depth = 1usize;
    skip_class_prefix(chars);

    while let Some((_, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '[' => {
                depth += 1;
                skip_class_prefix(chars);
            }
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// A leading `^` negates and a `]` right after the opener is literal.
fn skip_class_prefix(chars: &mut Scanner<'_>) {
    if next_is(chars, '^') {
        chars.next();
    }
    if next_is(chars, ']') {
        chars.next();
    }
}

/// Consumes the flags or name after `(?`, stopping before a bare `)`.
///
/// Returns true when the prefix ends at that `)`, i.e. the group only sets
/// flags.
fn skip_group_prefix(chars: &mut Scanner<'_>) -> bool {
    while let Some(&(_, ch)) = chars.peek() {
        match ch {
            ')' => return true,
            ':' | '>' => {
                chars.next();
                return false;
            }
            _ => {
                chars.next();
            }
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Repair
// ---------------------------------------------------------------------------

/// Maps a closing delimiter to its opener. Other characters map to
/// themselves.
fn opening_delimiter(ch: char) -> char {
    match ch {
        ')' => '(',
        ']' | '}' => '[',
        other => other,
    }
}

fn closing_delimiter(ch: char) -> Option<char> {
    match ch {
        '(' => Some(')'),
        '[' => Some(']'),
        _ => None,
    }
}

/// Attempts one repair of a pattern that failed to compile.
///
/// Returns `err` (the failure of the pattern as written) when no repair
/// applies or the repaired pattern fails as well.
fn fixup_regexp_compile_error(value: &str, err: regex::Error) -> Result<Regex, regex::Error> {
    let Some(defect) = diagnose_compile_defect(value) else {
        log::debug!("no repair for regexp {value:?}");
        return Err(err);
    };

    let corrected = match defect {
        CompileDefect::MissingRepetitionArgument('*', _) => escape_unescaped(value, '*'),
        // `+` and `?` also appear in lazy quantifiers and `(?flags)` groups,
        // so only the bare operator itself is escaped.
        CompileDefect::MissingRepetitionArgument(_, index) => {
            format!("{}\\{}", &value[..index], &value[index..])
        }
        CompileDefect::MissingClosing(closer) => {
            let opener = opening_delimiter(closer);
            let Some(index) = unmatched_opening_index(value, opener) else {
                return Err(err);
            };
            format!("{}\\{}", &value[..index], &value[index..])
        }
    };

    match Regex::new(&corrected) {
        Ok(regex) => {
            log::debug!("repaired regexp {value:?} as {corrected:?} ({defect:?})");
            Ok(regex)
        }
        Err(retry_err) => {
            log::debug!("repair of regexp {value:?} as {corrected:?} failed: {retry_err}");
            Err(err)
        }
    }
}

/// Inserts a backslash before every unescaped `target`.
fn escape_unescaped(value: &str, target: char) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let mut escaped = false;
    for ch in value.chars() {
        if ch == target && !escaped {
            out.push('\\');
        }
        escaped = ch == '\\' && !escaped;
        out.push(ch);
    }
    out
}

/// Finds the opener that starts the trailing run with no closer after it.
fn unmatched_opening_index(value: &str, opener: char) -> Option<usize> {
    let closer = closing_delimiter(opener)?;
    let tail_start = value.rfind(closer).map_or(0, |index| index + closer.len_utf8());
    value[tail_start..]
        .find(opener)
        .map(|index| tail_start + index)
}
