//! §4.4/§9 "Interpreter" — executes `fixpoint-script-asm` bytecode: scope
//! chaining, the system namespace, and the `Alive`/`Disabled` system
//! variable lifecycle.

pub mod error;
pub mod interpreter;
pub mod namespace;
pub mod scope;
pub mod sysvar;

pub use error::InterpreterError;
pub use interpreter::{Interpreter, SysFunction, DEFAULT_STACK_BYTES};
pub use namespace::Namespace;
pub use scope::ScopeStack;
pub use sysvar::{SysStorage, SysVar, SysVarState};
