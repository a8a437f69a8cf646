//! §4.4 "Emitter" — lowers the AST to a flat [`Program`] of [`Opcode`]s.
//! No constant folding: `1 + 2` emits two `Imm` opcodes and an `Add`,
//! exactly as written, per spec.md's explicit note that folding belongs to
//! whatever consumes the bytecode, not the emitter.
//!
//! Operands are byte offsets into the interpreter's execution stack, a
//! flat region the emitter hands out via a simple bump allocator
//! (`next_slot`); nothing is ever freed mid-function, matching the
//! teacher's register allocator having no live-range analysis either.

use crate::ast::{BinaryOp, Expr, Stmt, UnaryOp};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::opcode::{BaseType, Op, Opcode};
use crate::program::Program;
use std::collections::HashMap;

const SLOT_SIZE: u32 = 8;

/// Tracks the innermost enclosing loop so `continue`/`break` can be lowered
/// to jumps without the emitter's statement walk needing to return anything
/// back up to its caller. `continue_target` is known immediately for a
/// `while` loop (the condition re-check); for a `for` loop it isn't known
/// until the step expression has been emitted, so `continue` defers through
/// `continue_patches` the same way `break` always does.
struct LoopCtx {
    continue_target: Option<u32>,
    continue_patches: Vec<usize>,
    break_patches: Vec<usize>,
}

/// `SetEq..SetNe` always carry this fixed basetype — the size of the
/// host's natural integer — regardless of what basetype their operands
/// happen to be.
const CMP_BASETYPE: BaseType = BaseType::I32;

/// Maps a `SysType name;` declaration's type name to a [`BaseType`] when it
/// names one of the twelve primitive types directly (`I32 count;`), rather
/// than a host-registered system type (`Timer t;`). This is how a typed
/// local variable is declared in source: anything that isn't one of these
/// twelve names is assumed to be a genuine system variable instead.
fn basetype_from_name(name: &str) -> Option<BaseType> {
    Some(match name {
        "Char" => BaseType::Char,
        "I8" => BaseType::I8,
        "U8" => BaseType::U8,
        "I16" => BaseType::I16,
        "U16" => BaseType::U16,
        "I32" => BaseType::I32,
        "U32" => BaseType::U32,
        "I64" => BaseType::I64,
        "U64" => BaseType::U64,
        "F32" => BaseType::F32,
        "F64" => BaseType::F64,
        "Pointer" => BaseType::Pointer,
        _ => return None,
    })
}

pub struct Emitter {
    program: Program,
    next_slot: u32,
    locals: HashMap<String, u32>,
    /// Inferred basetype of each typed local declared via `BaseTypeName
    /// name;` (e.g. `U32 count;`). Locals never declared this way default
    /// to `F64`, matching every numeric literal's own type.
    local_types: HashMap<String, BaseType>,
    /// Names declared via `SysType name;` where `SysType` isn't one of the
    /// twelve basetype names — i.e. an actual host-registered system
    /// variable rather than a typed local.
    sys_vars: HashMap<String, String>,
    loop_stack: Vec<LoopCtx>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            program: Program::new(),
            next_slot: 0,
            locals: HashMap::new(),
            local_types: HashMap::new(),
            sys_vars: HashMap::new(),
            loop_stack: Vec::new(),
        }
    }

    fn alloc_slot(&mut self) -> u32 {
        let slot = self.next_slot;
        self.next_slot += SLOT_SIZE;
        slot
    }

    fn slot_for(&mut self, name: &str) -> u32 {
        if let Some(&slot) = self.locals.get(name) {
            return slot;
        }
        let slot = self.alloc_slot();
        self.locals.insert(name.to_string(), slot);
        slot
    }

    /// Basic type unification: a typed local carries the type it was
    /// declared with, a binary op's result carries its left (accumulator)
    /// operand's type, and everything else not otherwise known defaults to
    /// `F64`. A bare system-variable or member read has no locally-known
    /// type (the host owns that schema), so it also defaults to `F64`
    /// until read into a typed context.
    fn infer_type(&self, expr: &Expr) -> BaseType {
        match expr {
            Expr::Number(_) => BaseType::F64,
            Expr::Identifier(name) => {
                self.local_types.get(name).copied().unwrap_or(BaseType::F64)
            }
            Expr::Unary(_, inner) => self.infer_type(inner),
            Expr::Binary(_, lhs, _) => self.infer_type(lhs),
            // Assignment is itself a cast into the target's type (the
            // left/accumulator side) when the target is a typed local;
            // an untyped target has no type of its own yet, so it takes
            // on the value's.
            Expr::Assign(name, value) => self
                .local_types
                .get(name)
                .copied()
                .unwrap_or_else(|| self.infer_type(value)),
            Expr::MemberAssign(_, _, value) => self.infer_type(value),
            Expr::Call(..) | Expr::Member(..) | Expr::MethodCall(..) => BaseType::F64,
        }
    }

    pub fn emit_program(mut self, stmts: &[Stmt], diagnostics: &mut impl Diagnostics) -> Program {
        for stmt in stmts {
            self.emit_stmt(stmt, diagnostics);
        }
        self.program.push(Opcode {
            op: Op::Return,
            basetype: BaseType::F64,
            operands: [0, 0, 0],
        });
        self.program
    }

    fn emit_stmt(&mut self, stmt: &Stmt, diagnostics: &mut impl Diagnostics) {
        match stmt {
            Stmt::Expr(e) => {
                self.emit_expr(e, diagnostics);
            }
            Stmt::Return(Some(e)) => {
                let slot = self.emit_expr(e, diagnostics);
                self.program.push(Opcode {
                    op: Op::PushRet,
                    basetype: BaseType::F64,
                    operands: [slot, 0, 0],
                });
                self.program.push(Opcode {
                    op: Op::Return,
                    basetype: BaseType::F64,
                    operands: [0, 0, 0],
                });
            }
            Stmt::Return(None) => {
                self.program.push(Opcode {
                    op: Op::Return,
                    basetype: BaseType::F64,
                    operands: [0, 0, 0],
                });
            }
            Stmt::If(cond, then_branch, else_branch) => {
                let cond_slot = self.emit_expr(cond, diagnostics);
                let jz_index = self.program.push(Opcode {
                    op: Op::JumpIfZero,
                    basetype: BaseType::F64,
                    operands: [cond_slot, 0, 0],
                });
                for s in then_branch {
                    self.emit_stmt(s, diagnostics);
                }
                let jmp_index = if !else_branch.is_empty() {
                    Some(self.program.push(Opcode {
                        op: Op::Jump,
                        basetype: BaseType::F64,
                        operands: [0, 0, 0],
                    }))
                } else {
                    None
                };
                let else_target = self.program.next_index() as u32;
                self.patch_target(jz_index, else_target);
                for s in else_branch {
                    self.emit_stmt(s, diagnostics);
                }
                if let Some(jmp_index) = jmp_index {
                    let end_target = self.program.next_index() as u32;
                    self.patch_target(jmp_index, end_target);
                }
            }
            Stmt::While(cond, body) => {
                let loop_start = self.program.next_index() as u32;
                let cond_slot = self.emit_expr(cond, diagnostics);
                let jz_index = self.program.push(Opcode {
                    op: Op::JumpIfZero,
                    basetype: BaseType::F64,
                    operands: [cond_slot, 0, 0],
                });
                self.loop_stack.push(LoopCtx {
                    continue_target: Some(loop_start),
                    continue_patches: Vec::new(),
                    break_patches: Vec::new(),
                });
                for s in body {
                    self.emit_stmt(s, diagnostics);
                }
                self.program.push(Opcode {
                    op: Op::Jump,
                    basetype: BaseType::F64,
                    operands: [loop_start, 0, 0],
                });
                let end_target = self.program.next_index() as u32;
                self.patch_target(jz_index, end_target);
                let ctx = self.loop_stack.pop().expect("loop ctx pushed above");
                for index in ctx.break_patches {
                    self.patch_jump_target(index, end_target);
                }
            }
            Stmt::For(init, cond, step, body) => {
                if let Some(init) = init {
                    self.emit_stmt(init, diagnostics);
                }
                let loop_start = self.program.next_index() as u32;
                let jz_index = cond.as_ref().map(|c| {
                    let slot = self.emit_expr(c, diagnostics);
                    self.program.push(Opcode {
                        op: Op::JumpIfZero,
                        basetype: BaseType::F64,
                        operands: [slot, 0, 0],
                    })
                });
                self.loop_stack.push(LoopCtx {
                    continue_target: None,
                    continue_patches: Vec::new(),
                    break_patches: Vec::new(),
                });
                for s in body {
                    self.emit_stmt(s, diagnostics);
                }
                let step_target = self.program.next_index() as u32;
                if let Some(step) = step {
                    self.emit_stmt(step, diagnostics);
                }
                self.program.push(Opcode {
                    op: Op::Jump,
                    basetype: BaseType::F64,
                    operands: [loop_start, 0, 0],
                });
                let end_target = self.program.next_index() as u32;
                if let Some(jz_index) = jz_index {
                    self.patch_target(jz_index, end_target);
                }
                let ctx = self.loop_stack.pop().expect("loop ctx pushed above");
                for index in ctx.continue_patches {
                    self.patch_jump_target(index, step_target);
                }
                for index in ctx.break_patches {
                    self.patch_jump_target(index, end_target);
                }
            }
            Stmt::Continue => {
                if self.loop_stack.is_empty() {
                    tracing::warn!("continue outside of a loop");
                    diagnostics.report(Diagnostic {
                        offset: 0,
                        message: "continue outside of a loop".into(),
                    });
                    return;
                }
                let continue_target = self.loop_stack.last().unwrap().continue_target;
                match continue_target {
                    Some(target) => {
                        self.program.push(Opcode {
                            op: Op::Jump,
                            basetype: BaseType::F64,
                            operands: [target, 0, 0],
                        });
                    }
                    None => {
                        let index = self.program.push(Opcode {
                            op: Op::Jump,
                            basetype: BaseType::F64,
                            operands: [0, 0, 0],
                        });
                        self.loop_stack
                            .last_mut()
                            .unwrap()
                            .continue_patches
                            .push(index);
                    }
                }
            }
            Stmt::Break => {
                if self.loop_stack.is_empty() {
                    tracing::warn!("break outside of a loop");
                    diagnostics.report(Diagnostic {
                        offset: 0,
                        message: "break outside of a loop".into(),
                    });
                    return;
                }
                let index = self.program.push(Opcode {
                    op: Op::Jump,
                    basetype: BaseType::F64,
                    operands: [0, 0, 0],
                });
                self.loop_stack.last_mut().unwrap().break_patches.push(index);
            }
            Stmt::SysVarDecl(type_name, var_name) => {
                if let Some(bt) = basetype_from_name(type_name) {
                    self.local_types.insert(var_name.clone(), bt);
                    self.slot_for(var_name);
                } else {
                    self.sys_vars.insert(var_name.clone(), type_name.clone());
                }
                // The namespace layer (fixpoint-script-vm) handles the
                // actual system-variable registration; nothing further for
                // the emitter to lower here.
            }
            Stmt::Delete(_) => {
                // The namespace layer (fixpoint-script-vm) handles this at
                // registration time; nothing for the emitter to lower.
            }
            Stmt::Block(stmts) => {
                for s in stmts {
                    self.emit_stmt(s, diagnostics);
                }
            }
        }
    }

    /// Patches a conditional jump's target, carried in `operands[1]`
    /// (`operands[0]` holds the condition slot for `JumpIfZero`/`JumpIfNotZero`).
    fn patch_target(&mut self, index: usize, target: u32) {
        let pc = self.program.index_to_pc(index);
        if let Some(op) = self.program.get_mut(pc) {
            op.operands[1] = target;
        }
    }

    /// Patches an unconditional `Jump`'s target, carried in `operands[0]`.
    fn patch_jump_target(&mut self, index: usize, target: u32) {
        let pc = self.program.index_to_pc(index);
        if let Some(op) = self.program.get_mut(pc) {
            op.operands[0] = target;
        }
    }

    fn emit_expr(&mut self, expr: &Expr, diagnostics: &mut impl Diagnostics) -> u32 {
        let basetype = self.infer_type(expr);
        match expr {
            Expr::Number(n) => {
                let slot = self.alloc_slot();
                let bits = n.to_bits();
                self.program.push(Opcode {
                    op: Op::Imm,
                    basetype,
                    operands: [slot, bits as u32, (bits >> 32) as u32],
                });
                slot
            }
            Expr::Identifier(name) => {
                if self.sys_vars.contains_key(name) {
                    let slot = self.alloc_slot();
                    let name_index = self.program.intern_name(name);
                    self.program.push(Opcode {
                        op: Op::SysRead,
                        basetype,
                        operands: [slot, name_index, 0],
                    });
                    slot
                } else {
                    self.slot_for(name)
                }
            }
            Expr::Member(base, member) => {
                let slot = self.alloc_slot();
                let base_index = self.program.intern_name(base);
                let member_index = self.program.intern_name(member);
                self.program.push(Opcode {
                    op: Op::SysReadMember,
                    basetype,
                    operands: [slot, base_index, member_index],
                });
                slot
            }
            Expr::Assign(name, value) => {
                let value_slot = self.emit_expr(value, diagnostics);
                if self.sys_vars.contains_key(name) {
                    let name_index = self.program.intern_name(name);
                    self.program.push(Opcode {
                        op: Op::SysWrite,
                        basetype,
                        operands: [value_slot, name_index, 0],
                    });
                    value_slot
                } else {
                    let target_slot = self.slot_for(name);
                    self.program.push(Opcode {
                        op: Op::Cast,
                        basetype,
                        operands: [target_slot, value_slot, 0],
                    });
                    target_slot
                }
            }
            Expr::MemberAssign(base, member, value) => {
                let value_slot = self.emit_expr(value, diagnostics);
                let base_index = self.program.intern_name(base);
                let member_index = self.program.intern_name(member);
                self.program.push(Opcode {
                    op: Op::SysWriteMember,
                    basetype,
                    operands: [value_slot, base_index, member_index],
                });
                value_slot
            }
            Expr::Unary(op, inner) => {
                let inner_slot = self.emit_expr(inner, diagnostics);
                let dst = self.alloc_slot();
                let vm_op = match op {
                    UnaryOp::Neg => Op::Sub,
                    UnaryOp::Pos => Op::Cast,
                    UnaryOp::BitNot => Op::BitNot,
                    UnaryOp::Not => Op::Not,
                };
                if matches!(op, UnaryOp::Neg) {
                    // `0 - x`: materialise a zero immediate rather than add
                    // a dedicated negate opcode for one case.
                    let zero_slot = self.alloc_slot();
                    self.program.push(Opcode {
                        op: Op::Imm,
                        basetype,
                        operands: [zero_slot, 0, 0],
                    });
                    self.program.push(Opcode {
                        op: vm_op,
                        basetype,
                        operands: [dst, zero_slot, inner_slot],
                    });
                } else {
                    self.program.push(Opcode {
                        op: vm_op,
                        basetype,
                        operands: [dst, inner_slot, 0],
                    });
                }
                dst
            }
            Expr::Binary(op, lhs, rhs) => {
                let lhs_slot = self.emit_expr(lhs, diagnostics);
                let rhs_slot = self.emit_expr(rhs, diagnostics);
                let dst = self.alloc_slot();
                let (vm_op, op_basetype) = match op {
                    BinaryOp::Add => (Op::Add, basetype),
                    BinaryOp::Sub => (Op::Sub, basetype),
                    BinaryOp::Mul => (Op::Mul, basetype),
                    BinaryOp::Div => (Op::Div, basetype),
                    BinaryOp::Mod => (Op::Mod, basetype),
                    BinaryOp::Shl => (Op::Shl, basetype),
                    BinaryOp::Shr => (Op::Shr, basetype),
                    BinaryOp::Rol => (Op::Rol, basetype),
                    BinaryOp::Ror => (Op::Ror, basetype),
                    BinaryOp::BitOr => (Op::BitOr, basetype),
                    BinaryOp::BitAnd => (Op::BitAnd, basetype),
                    BinaryOp::BitXor => (Op::BitXor, basetype),
                    // Comparisons always produce the fixed cmp basetype,
                    // regardless of their operands' own inferred type.
                    BinaryOp::Eq => (Op::SetEq, CMP_BASETYPE),
                    BinaryOp::Ne => (Op::SetNe, CMP_BASETYPE),
                    BinaryOp::Lt => (Op::SetLt, CMP_BASETYPE),
                    BinaryOp::Le => (Op::SetLe, CMP_BASETYPE),
                    BinaryOp::Gt => (Op::SetGt, CMP_BASETYPE),
                    BinaryOp::Ge => (Op::SetGe, CMP_BASETYPE),
                };
                self.program.push(Opcode {
                    op: vm_op,
                    basetype: op_basetype,
                    operands: [dst, lhs_slot, rhs_slot],
                });
                dst
            }
            Expr::Call(name, args) => {
                for arg in args {
                    let slot = self.emit_expr(arg, diagnostics);
                    self.program.push(Opcode {
                        op: Op::PushArg,
                        basetype: self.infer_type(arg),
                        operands: [slot, 0, 0],
                    });
                }
                let dst = self.alloc_slot();
                let name_index = self.program.intern_name(name);
                self.program.push(Opcode {
                    op: Op::CallSysFunction,
                    basetype,
                    operands: [dst, name_index, args.len() as u32],
                });
                dst
            }
            Expr::MethodCall(base, method, args) => {
                for arg in args {
                    let slot = self.emit_expr(arg, diagnostics);
                    self.program.push(Opcode {
                        op: Op::PushArg,
                        basetype: self.infer_type(arg),
                        operands: [slot, 0, 0],
                    });
                }
                let dst = self.alloc_slot();
                let base_index = self.program.intern_name(base);
                let method_index = self.program.intern_name(method);
                self.program.push(Opcode {
                    op: Op::CallSysMethod,
                    basetype,
                    operands: [dst, base_index, method_index],
                });
                dst
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticLog;
    use crate::lex::lex;
    use crate::parser::Parser;

    fn compile(src: &str) -> Program {
        let mut diags = DiagnosticLog::default();
        let tokens = lex(src, &mut diags);
        let mut parser = Parser::new(src, &tokens);
        let stmts = parser.parse_program(&mut diags);
        assert!(diags.is_empty(), "{:?}", diags.entries());
        Emitter::new().emit_program(&stmts, &mut diags)
    }

    #[test]
    fn no_constant_folding_emits_both_immediates() {
        let program = compile("x = 1 + 2;");
        let imm_count = (0..program.len())
            .filter(|&i| program.get(program.index_to_pc(i)).unwrap().op == Op::Imm)
            .count();
        assert_eq!(imm_count, 2);
    }

    #[test]
    fn if_emits_a_conditional_jump_past_the_then_branch() {
        let program = compile("if (x) { x = 1; }");
        let has_jz = (0..program.len())
            .any(|i| program.get(program.index_to_pc(i)).unwrap().op == Op::JumpIfZero);
        assert!(has_jz);
    }

    #[test]
    fn while_jumps_back_to_the_loop_condition() {
        let program = compile("while (x) { x = x - 1; }");
        let jump_back = (0..program.len())
            .filter_map(|i| {
                let op = program.get(program.index_to_pc(i)).unwrap();
                (op.op == Op::Jump).then_some(op.operands[0])
            })
            .next();
        assert_eq!(jump_back, Some(0));
    }

    #[test]
    fn break_and_continue_are_lowered_without_diagnostics() {
        let program = compile("while (x) { if (x) { break; } continue; x = x - 1; }");
        let jump_count = (0..program.len())
            .filter(|&i| program.get(program.index_to_pc(i)).unwrap().op == Op::Jump)
            .count();
        // the loop's own back-edge, plus one for `break` and one for `continue`.
        assert_eq!(jump_count, 3);
    }

    #[test]
    fn continue_in_a_for_loop_jumps_to_the_step() {
        let program = compile("for (i = 0; i; i = i - 1) { continue; }");
        let jump_targets: Vec<u32> = (0..program.len())
            .filter_map(|i| {
                let op = program.get(program.index_to_pc(i)).unwrap();
                (op.op == Op::Jump).then_some(op.operands[0])
            })
            .collect();
        // `continue`'s jump lands on the step expression, which comes after
        // the loop's own condition re-check (the final back-edge's target).
        assert_eq!(jump_targets.len(), 2);
        assert!(jump_targets[0] > jump_targets[1]);
    }

    #[test]
    fn typed_local_declaration_stamps_its_basetype() {
        let program = compile("U32 count; count = 5;");
        let cast = (0..program.len())
            .map(|i| *program.get(program.index_to_pc(i)).unwrap())
            .find(|op| op.op == Op::Cast)
            .expect("assignment emits a Cast");
        assert_eq!(cast.basetype, BaseType::U32);
    }

    #[test]
    fn untyped_locals_default_to_f64() {
        let program = compile("x = 5;");
        let cast = (0..program.len())
            .map(|i| *program.get(program.index_to_pc(i)).unwrap())
            .find(|op| op.op == Op::Cast)
            .expect("assignment emits a Cast");
        assert_eq!(cast.basetype, BaseType::F64);
    }

    #[test]
    fn binary_op_takes_its_left_operands_type() {
        let program = compile("I16 a; I16 b; a = a + b;");
        let add = (0..program.len())
            .map(|i| *program.get(program.index_to_pc(i)).unwrap())
            .find(|op| op.op == Op::Add)
            .expect("addition emits an Add");
        assert_eq!(add.basetype, BaseType::I16);
    }

    #[test]
    fn comparisons_always_use_the_fixed_cmp_basetype() {
        let program = compile("I16 a; I16 b; a == b;");
        let cmp = (0..program.len())
            .map(|i| *program.get(program.index_to_pc(i)).unwrap())
            .find(|op| op.op == Op::SetEq)
            .expect("comparison emits SetEq");
        assert_eq!(cmp.basetype, CMP_BASETYPE);
    }

    #[test]
    fn member_read_emits_sys_read_member_with_base_and_member_names() {
        let program = compile("Timer t; x = t.elapsed;");
        let read = (0..program.len())
            .map(|i| *program.get(program.index_to_pc(i)).unwrap())
            .find(|op| op.op == Op::SysReadMember)
            .expect("member access emits SysReadMember");
        assert_eq!(program.name(read.operands[1]), Some("t"));
        assert_eq!(program.name(read.operands[2]), Some("elapsed"));
    }

    #[test]
    fn member_assignment_emits_sys_write_member() {
        let program = compile("Timer t; t.elapsed = 0;");
        let write = (0..program.len())
            .map(|i| *program.get(program.index_to_pc(i)).unwrap())
            .find(|op| op.op == Op::SysWriteMember)
            .expect("member assignment emits SysWriteMember");
        assert_eq!(program.name(write.operands[1]), Some("t"));
        assert_eq!(program.name(write.operands[2]), Some("elapsed"));
    }

    #[test]
    fn bare_sys_var_read_and_write_use_sys_read_and_sys_write() {
        let program = compile("Timer t; x = t; t = x;");
        let ops: Vec<Op> = (0..program.len())
            .map(|i| program.get(program.index_to_pc(i)).unwrap().op)
            .collect();
        assert!(ops.contains(&Op::SysRead));
        assert!(ops.contains(&Op::SysWrite));
    }

    #[test]
    fn method_call_emits_call_sys_method_with_base_and_method_names() {
        let program = compile("Timer t; t.reset(1);");
        let call = (0..program.len())
            .map(|i| *program.get(program.index_to_pc(i)).unwrap())
            .find(|op| op.op == Op::CallSysMethod)
            .expect("method call emits CallSysMethod");
        assert_eq!(program.name(call.operands[1]), Some("t"));
        assert_eq!(program.name(call.operands[2]), Some("reset"));
    }
}
