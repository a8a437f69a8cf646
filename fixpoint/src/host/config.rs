//! §6 "Config parser" — `scope.member = value;` entries. Reuses only the
//! script lexer's comment- and string-literal-scanning primitives
//! (`fixpoint_script_asm::lex::{skip_line_comment, scan_string_literal}`),
//! never its keyword table or opcode machinery — a config file is not a
//! script, per spec.md's explicit warning against conflating the two.

use std::collections::HashMap;

use fixpoint_script_asm::lex::{scan_string_literal, skip_line_comment};
use fixpoint_script_asm::{Diagnostic, Diagnostics};

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Number(f64),
    Bool(bool),
    Identifier(String),
}

#[derive(Debug, Default, Clone)]
pub struct Config {
    entries: HashMap<String, ConfigValue>,
}

impl Config {
    pub fn get(&self, scope: &str, member: &str) -> Option<&ConfigValue> {
        self.entries.get(&format!("{scope}.{member}"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stop collecting entries after this many diagnostics — matches spec.md's
/// "accumulate up to 16 errors before bailing" convention for this parser.
const MAX_ERRORS: usize = 16;

pub fn parse(source: &str, diagnostics: &mut impl Diagnostics) -> Config {
    let bytes = source.as_bytes();
    let mut entries = HashMap::new();
    let mut i = 0usize;
    let mut error_count = 0usize;

    while i < bytes.len() && error_count < MAX_ERRORS {
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
                continue;
            }
            b'#' => {
                i = skip_line_comment(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = skip_line_comment(bytes, i);
                continue;
            }
            _ => {}
        }

        let key_start = i;
        while i < bytes.len()
            && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
        {
            i += 1;
        }
        if i == key_start {
            tracing::warn!(offset = i, "unexpected byte where a key was expected");
            diagnostics.report(Diagnostic {
                offset: i,
                message: format!("unexpected byte 0x{:02x} where a key was expected", bytes[i]),
            });
            error_count += 1;
            i += 1;
            continue;
        }
        let key = &source[key_start..i];
        if !key.contains('.') {
            tracing::warn!(key, "config key is missing a scope");
            diagnostics.report(Diagnostic {
                offset: key_start,
                message: format!("key '{key}' must be of the form scope.member"),
            });
            error_count += 1;
        }

        i = skip_spaces(bytes, i);
        if bytes.get(i) != Some(&b'=') {
            tracing::warn!(offset = i, "expected '=' after key");
            diagnostics.report(Diagnostic {
                offset: i,
                message: "expected '=' after key".into(),
            });
            error_count += 1;
            i = skip_to_semicolon(bytes, i);
            continue;
        }
        i += 1;
        i = skip_spaces(bytes, i);

        let (value, next) = match parse_value(source, bytes, i, diagnostics) {
            Some(v) => v,
            None => {
                error_count += 1;
                (ConfigValue::Bool(false), skip_to_semicolon(bytes, i))
            }
        };
        i = next;
        i = skip_spaces(bytes, i);
        if bytes.get(i) == Some(&b';') {
            i += 1;
        } else {
            tracing::warn!(offset = i, "expected ';' after value");
            diagnostics.report(Diagnostic {
                offset: i,
                message: "expected ';' after value".into(),
            });
            error_count += 1;
        }

        entries.insert(key.to_string(), value);
    }

    Config { entries }
}

fn skip_spaces(bytes: &[u8], mut i: usize) -> usize {
    while matches!(bytes.get(i), Some(b' ') | Some(b'\t')) {
        i += 1;
    }
    i
}

fn skip_to_semicolon(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] != b';' {
        i += 1;
    }
    if i < bytes.len() {
        i + 1
    } else {
        i
    }
}

fn parse_value(
    source: &str,
    bytes: &[u8],
    i: usize,
    diagnostics: &mut impl Diagnostics,
) -> Option<(ConfigValue, usize)> {
    match *bytes.get(i)? {
        b'"' => {
            let end = scan_string_literal(bytes, i)?;
            Some((
                ConfigValue::String(source[i + 1..end - 1].to_string()),
                end,
            ))
        }
        b'0'..=b'9' | b'-' => {
            let start = i;
            let mut j = i;
            if bytes[j] == b'-' {
                j += 1;
            }
            while j < bytes.len() && (bytes[j].is_ascii_digit() || bytes[j] == b'.') {
                j += 1;
            }
            let text = &source[start..j];
            match text.parse::<f64>() {
                Ok(n) => Some((ConfigValue::Number(n), j)),
                Err(_) => {
                    tracing::warn!(offset = start, text, "malformed number literal");
                    diagnostics.report(Diagnostic {
                        offset: start,
                        message: format!("malformed number literal '{text}'"),
                    });
                    None
                }
            }
        }
        b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
            let start = i;
            let mut j = i;
            while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                j += 1;
            }
            let text = &source[start..j];
            let value = match text {
                "true" => ConfigValue::Bool(true),
                "false" => ConfigValue::Bool(false),
                _ => ConfigValue::Identifier(text.to_string()),
            };
            Some((value, j))
        }
        other => {
            tracing::warn!(offset = i, "unexpected byte where a value was expected");
            diagnostics.report(Diagnostic {
                offset: i,
                message: format!("unexpected byte 0x{other:02x} where a value was expected"),
            });
            None
        }
    }
}
