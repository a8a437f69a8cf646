//! §7 — host-facing error type for the interpreter. Uses `thiserror` per
//! the workspace's stated error-handling convention; note in DESIGN.md that
//! the teacher's own `fuel-vm/src/error.rs` reaches for `derive_more`
//! instead — `thiserror` is kept here since it's already the workspace's
//! declared dependency for this concern.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum InterpreterError {
    #[error("execution stack depth exceeded the configured limit of {0} bytes")]
    StackOverflow(u32),
    #[error("unknown system function '{0}'")]
    UnknownSysFunction(String),
    #[error("unknown system variable '{0}'")]
    UnknownSysVariable(String),
    #[error("system variable '{0}' is disabled")]
    SysVariableDisabled(String),
    #[error("program counter ran past the end of the program")]
    ProgramCounterOutOfRange,
    #[error("division by zero")]
    DivisionByZero,
    #[error("call to an opcode whose name table entry is missing")]
    MissingNameEntry,
}
