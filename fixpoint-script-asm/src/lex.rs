//! §4.4 "Lexer". Identifier characters are `[A-Za-z0-9_]` with the first
//! non-digit; reserved keywords are classified at scan time; comments run
//! from `#` or `//` to end of line; string literals are `"..."` and char
//! literals `'x'`, both with no escape processing; numbers are integer or
//! float by the presence of a single `.`.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::token::{Keyword, Token, TokenBuffer, TokenKind};

pub fn lex(source: &str, diagnostics: &mut impl Diagnostics) -> TokenBuffer {
    let bytes = source.as_bytes();
    let mut buffer = TokenBuffer::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'#' => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = skip_line_comment(bytes, i),
            b'"' => {
                let start = i;
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    i += 1;
                }
                if i >= bytes.len() {
                    tracing::warn!(offset = start, "unterminated string literal");
                    diagnostics.report(Diagnostic {
                        offset: start,
                        message: "unterminated string literal".into(),
                    });
                    break;
                }
                i += 1;
                buffer.push(Token {
                    kind: TokenKind::String,
                    offset: start as u32,
                    len: (i - start) as u32,
                });
            }
            b'\'' => {
                let start = i;
                i += 1;
                if i < bytes.len() {
                    i += 1;
                }
                if bytes.get(i) != Some(&b'\'') {
                    tracing::warn!(offset = start, "unterminated char literal");
                    diagnostics.report(Diagnostic {
                        offset: start,
                        message: "unterminated char literal".into(),
                    });
                    break;
                }
                i += 1;
                buffer.push(Token {
                    kind: TokenKind::Char,
                    offset: start as u32,
                    len: (i - start) as u32,
                });
            }
            b'0'..=b'9' => {
                let start = i;
                let mut seen_dot = false;
                while i < bytes.len() {
                    match bytes[i] {
                        b'0'..=b'9' => i += 1,
                        b'.' if !seen_dot && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => {
                            seen_dot = true;
                            i += 1;
                        }
                        _ => break,
                    }
                }
                buffer.push(Token {
                    kind: TokenKind::Number,
                    offset: start as u32,
                    len: (i - start) as u32,
                });
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
                let start = i;
                while i < bytes.len() && is_ident_byte(bytes[i]) {
                    i += 1;
                }
                let text = &source[start..i];
                let kind = match Keyword::from_str(text) {
                    Some(kw) => TokenKind::Keyword(kw),
                    None => TokenKind::Identifier,
                };
                buffer.push(Token {
                    kind,
                    offset: start as u32,
                    len: (i - start) as u32,
                });
            }
            _ if is_punct_byte(c) => {
                let start = i;
                i += punct_len(bytes, i);
                buffer.push(Token {
                    kind: TokenKind::Punct,
                    offset: start as u32,
                    len: (i - start) as u32,
                });
            }
            _ => {
                tracing::warn!(offset = i, byte = format!("0x{c:02x}"), "unexpected byte");
                diagnostics.report(Diagnostic {
                    offset: i,
                    message: format!("unexpected byte 0x{c:02x}"),
                });
                i += 1;
            }
        }
    }
    buffer.push(Token {
        kind: TokenKind::Eof,
        offset: bytes.len() as u32,
        len: 0,
    });
    buffer
}

fn is_ident_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Skip a `#`/`//` line comment starting at `i`, returning the index of
/// the terminating `\n` (or `bytes.len()` at EOF). Exposed so other
/// scanners — e.g. the config-file parser in the `fixpoint` facade crate —
/// can reuse the same comment rule without pulling in the rest of the
/// lexer's keyword/opcode machinery.
pub fn skip_line_comment(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    i
}

/// Scan a `"..."` string literal starting at the opening quote, returning
/// the index just past the closing quote, or `None` if unterminated. No
/// escape processing, matching the lexer's own string handling. Exposed
/// for the same reuse-without-the-rest-of-the-lexer reason as
/// [`skip_line_comment`].
pub fn scan_string_literal(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() && bytes[i] != b'"' {
        i += 1;
    }
    if i >= bytes.len() {
        None
    } else {
        Some(i + 1)
    }
}

fn is_punct_byte(c: u8) -> bool {
    matches!(
        c,
        b'+' | b'-'
            | b'*'
            | b'/'
            | b'%'
            | b'='
            | b'<'
            | b'>'
            | b'!'
            | b'&'
            | b'|'
            | b'^'
            | b'~'
            | b'('
            | b')'
            | b'{'
            | b'}'
            | b'['
            | b']'
            | b';'
            | b','
            | b'.'
    )
}

/// Greedily matches the longest operator punctuation run (`<<<`, `>>>`,
/// `<<`, `>>`, `==`, `<=`, `>=`, `!=`), falling back to a single byte.
fn punct_len(bytes: &[u8], i: usize) -> usize {
    let three = bytes.get(i..i + 3);
    if three == Some(b"<<<") || three == Some(b">>>") {
        return 3;
    }
    let two = bytes.get(i..i + 2);
    if matches!(
        two,
        Some(b"<<") | Some(b">>") | Some(b"==") | Some(b"<=") | Some(b">=") | Some(b"!=")
    ) {
        return 2;
    }
    1
}
