//! §4.4 "Interpreter" — executes a flat [`Program`] against a
//! byte-addressed execution stack. The emitter infers a basetype per typed
//! local and stamps it onto every opcode it emits, but this interpreter's
//! arithmetic path still only executes the F64 lane: every value on the
//! stack is read and written as an 8-byte `f64` regardless of the opcode's
//! own basetype. The other eleven `BaseType`s decode correctly through
//! `Opcode::decode_head` (round-trip tested in `fixpoint-script-asm`) and
//! now reach the interpreter from real source via typed declarations, but
//! have no dedicated per-width numeric kernel wired up yet — an open item
//! for whoever adds integer-width codegen here.

use std::collections::HashMap;

use fixpoint_script_asm::{Diagnostic, Diagnostics, Op, Opcode, Program, ProgramCounter};

use crate::error::InterpreterError;
use crate::scope::ScopeStack;
use crate::sysvar::SysVar;

/// Size of the execution stack every [`Interpreter`] starts with. A script
/// whose local-slot allocation runs past this returns
/// [`InterpreterError::StackOverflow`] rather than growing silently —
/// scripts are expected to be small, per spec.md's scripting runtime scope.
pub const DEFAULT_STACK_BYTES: u32 = 4096;

/// A host-registered function reachable from script via `CallSysFunction`.
pub trait SysFunction {
    fn call(&mut self, args: &[f64]) -> Result<f64, InterpreterError>;
}

pub struct Interpreter {
    stack: Vec<u8>,
    scopes: ScopeStack,
    sys_vars: HashMap<String, SysVar>,
    sys_functions: HashMap<String, Box<dyn SysFunction>>,
    pending_args: Vec<f64>,
    return_value: f64,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_stack_size(DEFAULT_STACK_BYTES)
    }

    pub fn with_stack_size(bytes: u32) -> Self {
        Self {
            stack: vec![0u8; bytes as usize],
            scopes: ScopeStack::new(),
            sys_vars: HashMap::new(),
            sys_functions: HashMap::new(),
            pending_args: Vec::new(),
            return_value: 0.0,
        }
    }

    pub fn register_sys_function(&mut self, name: impl Into<String>, f: Box<dyn SysFunction>) {
        self.sys_functions.insert(name.into(), f);
    }

    pub fn declare_sys_var(&mut self, name: impl Into<String>, type_name: impl Into<String>) {
        self.sys_vars
            .insert(name.into(), SysVar::new_disabled(type_name));
    }

    fn read_f64(&self, offset: u32) -> f64 {
        let offset = offset as usize;
        let bytes: [u8; 8] = self.stack[offset..offset + 8]
            .try_into()
            .expect("slot is always 8 bytes");
        f64::from_le_bytes(bytes)
    }

    fn write_f64(&mut self, offset: u32, value: f64) -> Result<(), InterpreterError> {
        let offset = offset as usize;
        if offset + 8 > self.stack.len() {
            return Err(InterpreterError::StackOverflow(self.stack.len() as u32));
        }
        self.stack[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn run(
        &mut self,
        program: &Program,
        diagnostics: &mut impl Diagnostics,
    ) -> Result<f64, InterpreterError> {
        let mut pc = program.start();
        loop {
            let op = *program
                .get(pc)
                .ok_or(InterpreterError::ProgramCounterOutOfRange)?;
            match self.step(program, op, pc, diagnostics)? {
                Some(next_pc) => pc = next_pc,
                None => return Ok(self.return_value),
            }
        }
    }

    #[tracing::instrument(name = "step", skip(self, program, diagnostics))]
    fn step(
        &mut self,
        program: &Program,
        op: Opcode,
        pc: ProgramCounter,
        diagnostics: &mut impl Diagnostics,
    ) -> Result<Option<ProgramCounter>, InterpreterError> {
        tracing::trace!("op: {:?} @ {:?}", op.op, pc);
        match op.op {
            Op::Imm => {
                let bits = (op.operands[1] as u64) | ((op.operands[2] as u64) << 32);
                self.write_f64(op.operands[0], f64::from_bits(bits))?;
            }
            Op::Cast => {
                let v = self.read_f64(op.operands[1]);
                self.write_f64(op.operands[0], v)?;
            }
            Op::Add => self.binop(op, |a, b| a + b)?,
            Op::Sub => self.binop(op, |a, b| a - b)?,
            Op::Mul => self.binop(op, |a, b| a * b)?,
            Op::Div => {
                if self.read_f64(op.operands[2]) == 0.0 {
                    return Err(InterpreterError::DivisionByZero);
                }
                self.binop(op, |a, b| a / b)?;
            }
            Op::Mod => {
                if self.read_f64(op.operands[2]) == 0.0 {
                    return Err(InterpreterError::DivisionByZero);
                }
                self.binop(op, |a, b| a % b)?;
            }
            Op::BitOr => self.bitop(op, |a, b| a | b)?,
            Op::BitAnd => self.bitop(op, |a, b| a & b)?,
            Op::BitXor => self.bitop(op, |a, b| a ^ b)?,
            Op::BitNot => {
                let a = self.read_f64(op.operands[1]) as i64;
                self.write_f64(op.operands[0], !a as f64)?;
            }
            Op::Shl => self.bitop(op, |a, b| a.wrapping_shl(b as u32))?,
            Op::Shr => self.bitop(op, |a, b| a.wrapping_shr(b as u32))?,
            Op::Rol => self.bitop(op, |a, b| a.rotate_left(b as u32))?,
            Op::Ror => self.bitop(op, |a, b| a.rotate_right(b as u32))?,
            Op::Not => {
                let a = self.read_f64(op.operands[1]);
                self.write_f64(op.operands[0], if a == 0.0 { 1.0 } else { 0.0 })?;
            }
            Op::SetEq => self.cmpop(op, |a, b| a == b)?,
            Op::SetNe => self.cmpop(op, |a, b| a != b)?,
            Op::SetLt => self.cmpop(op, |a, b| a < b)?,
            Op::SetLe => self.cmpop(op, |a, b| a <= b)?,
            Op::SetGt => self.cmpop(op, |a, b| a > b)?,
            Op::SetGe => self.cmpop(op, |a, b| a >= b)?,
            Op::JumpIfZero => {
                if self.read_f64(op.operands[0]) == 0.0 {
                    return Ok(Some(program.index_to_pc(op.operands[1] as usize)));
                }
            }
            Op::JumpIfNotZero => {
                if self.read_f64(op.operands[0]) != 0.0 {
                    return Ok(Some(program.index_to_pc(op.operands[1] as usize)));
                }
            }
            Op::Jump => {
                return Ok(Some(program.index_to_pc(op.operands[0] as usize)));
            }
            Op::PushArg => self.pending_args.push(self.read_f64(op.operands[0])),
            Op::PushRet => self.return_value = self.read_f64(op.operands[0]),
            Op::CallSysFunction => {
                let name = program
                    .name(op.operands[1])
                    .ok_or(InterpreterError::MissingNameEntry)?
                    .to_string();
                let args = std::mem::take(&mut self.pending_args);
                let result = self
                    .sys_functions
                    .get_mut(&name)
                    .ok_or_else(|| InterpreterError::UnknownSysFunction(name.clone()))?
                    .call(&args)?;
                self.write_f64(op.operands[0], result)?;
            }
            Op::CallSysMethod => {
                let name = program
                    .name(op.operands[1])
                    .ok_or(InterpreterError::MissingNameEntry)?
                    .to_string();
                let var = self
                    .sys_vars
                    .get(&name)
                    .ok_or_else(|| InterpreterError::UnknownSysVariable(name.clone()))?;
                if !var.is_alive() {
                    return Err(InterpreterError::SysVariableDisabled(name));
                }
                tracing::trace!("method call on '{name}' delegated to host handler");
                diagnostics.report(Diagnostic {
                    offset: 0,
                    message: format!("method call on '{name}' delegated to host handler"),
                });
            }
            Op::SysRead | Op::SysReadMember => {
                let name = program
                    .name(op.operands[1])
                    .ok_or(InterpreterError::MissingNameEntry)?;
                let var = self
                    .sys_vars
                    .get(name)
                    .ok_or_else(|| InterpreterError::UnknownSysVariable(name.to_string()))?;
                if !var.is_alive() {
                    tracing::warn!("read of disabled system variable '{name}'");
                    return Err(InterpreterError::SysVariableDisabled(name.to_string()));
                }
            }
            Op::SysWrite | Op::SysWriteMember => {
                let name = program
                    .name(op.operands[1])
                    .ok_or(InterpreterError::MissingNameEntry)?;
                let var = self
                    .sys_vars
                    .get(name)
                    .ok_or_else(|| InterpreterError::UnknownSysVariable(name.to_string()))?;
                if !var.is_alive() {
                    tracing::warn!("write to disabled system variable '{name}'");
                    return Err(InterpreterError::SysVariableDisabled(name.to_string()));
                }
            }
            Op::SysEnable => {
                let name = program
                    .name(op.operands[1])
                    .ok_or(InterpreterError::MissingNameEntry)?
                    .to_string();
                let var = self
                    .sys_vars
                    .get_mut(&name)
                    .ok_or_else(|| InterpreterError::UnknownSysVariable(name.clone()))?;
                var.enable(|| Box::new(()));
            }
            Op::SysDisable => {
                let name = program
                    .name(op.operands[1])
                    .ok_or(InterpreterError::MissingNameEntry)?
                    .to_string();
                let var = self
                    .sys_vars
                    .get_mut(&name)
                    .ok_or_else(|| InterpreterError::UnknownSysVariable(name.clone()))?;
                var.disable(|_| {});
            }
            Op::Return => return Ok(None),
        }
        Ok(Some(program.advance(pc)))
    }

    fn binop(&mut self, op: Opcode, f: impl Fn(f64, f64) -> f64) -> Result<(), InterpreterError> {
        let a = self.read_f64(op.operands[1]);
        let b = self.read_f64(op.operands[2]);
        self.write_f64(op.operands[0], f(a, b))
    }

    fn bitop(&mut self, op: Opcode, f: impl Fn(i64, i64) -> i64) -> Result<(), InterpreterError> {
        let a = self.read_f64(op.operands[1]) as i64;
        let b = self.read_f64(op.operands[2]) as i64;
        self.write_f64(op.operands[0], f(a, b) as f64)
    }

    fn cmpop(&mut self, op: Opcode, f: impl Fn(f64, f64) -> bool) -> Result<(), InterpreterError> {
        let a = self.read_f64(op.operands[1]);
        let b = self.read_f64(op.operands[2]);
        self.write_f64(op.operands[0], if f(a, b) { 1.0 } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixpoint_script_asm::{compile, BaseType, DiagnosticLog};

    #[test]
    fn executes_simple_arithmetic_and_returns() {
        let mut diags = DiagnosticLog::default();
        let program = compile("return 1 + 2;", &mut diags);
        assert!(diags.is_empty());
        let mut interp = Interpreter::new();
        let result = interp.run(&program, &mut diags).unwrap();
        assert_eq!(result, 3.0);
    }

    #[test]
    fn division_by_zero_is_reported() {
        let mut diags = DiagnosticLog::default();
        let program = compile("return 1 / 0;", &mut diags);
        let mut interp = Interpreter::new();
        let err = interp.run(&program, &mut diags).unwrap_err();
        assert_eq!(err, InterpreterError::DivisionByZero);
    }

    #[test]
    fn while_loop_counts_down_to_zero() {
        let mut diags = DiagnosticLog::default();
        let program = compile("x = 3; while (x) { x = x - 1; } return x;", &mut diags);
        assert!(diags.is_empty());
        let mut interp = Interpreter::new();
        let result = interp.run(&program, &mut diags).unwrap();
        assert_eq!(result, 0.0);
    }

    #[test]
    fn sysvar_enable_disable_lifecycle_round_trips() {
        let mut program = Program::new();
        let name_index = program.intern_name("timer");
        program.push(Opcode {
            op: Op::SysEnable,
            basetype: BaseType::F64,
            operands: [0, name_index, 0],
        });
        program.push(Opcode {
            op: Op::SysDisable,
            basetype: BaseType::F64,
            operands: [0, name_index, 0],
        });
        program.push(Opcode {
            op: Op::Return,
            basetype: BaseType::F64,
            operands: [0, 0, 0],
        });

        let mut interp = Interpreter::new();
        interp.declare_sys_var("timer", "Timer");
        let mut diags = DiagnosticLog::default();
        interp.run(&program, &mut diags).unwrap();
    }

    #[test]
    fn unknown_sys_function_call_is_an_error() {
        let mut diags = DiagnosticLog::default();
        let program = compile("return foo();", &mut diags);
        assert!(diags.is_empty());
        let mut interp = Interpreter::new();
        let err = interp.run(&program, &mut diags).unwrap_err();
        assert_eq!(err, InterpreterError::UnknownSysFunction("foo".to_string()));
    }
}
