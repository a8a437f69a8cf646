//! §4.4 "Scripting runtime" (lexer/parser/emitter half) — turns script
//! source text into the flat opcode [`Program`] that `fixpoint-script-vm`
//! executes. The interpreter itself, including namespaces and system
//! variable lifecycle, lives in the sibling `fixpoint-script-vm` crate.

pub mod ast;
pub mod diagnostics;
pub mod emitter;
pub mod lex;
pub mod opcode;
pub mod parser;
pub mod program;
pub mod token;

pub use diagnostics::{Diagnostic, DiagnosticLog, Diagnostics};
pub use emitter::Emitter;
pub use lex::lex;
pub use opcode::{BaseType, Op, Opcode};
pub use parser::Parser;
pub use program::{Program, ProgramCounter};
pub use token::{Keyword, Token, TokenBuffer, TokenKind};

/// Lex, parse and emit `source` in one call; the common case for a host
/// that doesn't need the intermediate token buffer or AST.
pub fn compile(source: &str, diagnostics: &mut impl Diagnostics) -> Program {
    let tokens = lex(source, diagnostics);
    let stmts = Parser::new(source, &tokens).parse_program(diagnostics);
    Emitter::new().emit_program(&stmts, diagnostics)
}
