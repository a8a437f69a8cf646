//! End-to-end compile-then-run coverage of the scripting runtime, driven
//! entirely through `fixpoint_script_asm::compile` and `Interpreter::run` —
//! no hand-assembled `Opcode` sequences, unlike this crate's unit tests.

use fixpoint_script_asm::{compile, DiagnosticLog};
use fixpoint_script_vm::{Interpreter, InterpreterError, SysFunction};

fn run(source: &str) -> Result<f64, InterpreterError> {
    let mut diags = DiagnosticLog::default();
    let program = compile(source, &mut diags);
    assert!(diags.is_empty(), "compile diagnostics: {:?}", diags.entries());
    Interpreter::new().run(&program, &mut diags)
}

#[test]
fn arithmetic_expression_evaluates() {
    let result = run("return (2 + 3) * 4 - 1;").unwrap();
    assert_eq!(result, 19.0);
}

#[test]
fn while_loop_sums_to_ten() {
    let result = run("i = 0; sum = 0; while (i < 10) { sum = sum + i; i = i + 1; } return sum;")
        .unwrap();
    assert_eq!(result, 45.0);
}

#[test]
fn for_loop_with_continue_skips_even_numbers() {
    let src = "sum = 0; for (i = 0; i < 10; i = i + 1) { if (i % 2 == 0) { continue; } sum = sum + i; } return sum;";
    let result = run(src).unwrap();
    assert_eq!(result, 25.0); // 1 + 3 + 5 + 7 + 9
}

#[test]
fn break_exits_the_loop_early() {
    let src = "i = 0; while (1) { if (i == 5) { break; } i = i + 1; } return i;";
    let result = run(src).unwrap();
    assert_eq!(result, 5.0);
}

struct Double;

impl SysFunction for Double {
    fn call(&mut self, args: &[f64]) -> Result<f64, InterpreterError> {
        Ok(args[0] * 2.0)
    }
}

#[test]
fn sys_function_call_round_trips_through_the_host() {
    let mut diags = DiagnosticLog::default();
    let program = compile("return double(21);", &mut diags);
    assert!(diags.is_empty());
    let mut interp = Interpreter::new();
    interp.register_sys_function("double", Box::new(Double));
    let result = interp.run(&program, &mut diags).unwrap();
    assert_eq!(result, 42.0);
}

#[test]
fn division_by_zero_is_reported_not_panicked() {
    let err = run("return 1 / 0;").unwrap_err();
    assert_eq!(err, InterpreterError::DivisionByZero);
}

#[test]
fn member_access_syntax_compiles_and_reaches_the_declared_sys_var() {
    // `t.elapsed` now compiles to a real `SysReadMember` op; it still
    // reports `SysVariableDisabled` because nothing in this source enables
    // `t`, but that's the interpreter's own lifecycle check firing on a
    // real opcode, not a compile failure or an unreachable opcode.
    let mut diags = DiagnosticLog::default();
    let program = compile("Timer t; return t.elapsed;", &mut diags);
    assert!(diags.is_empty());
    let mut interp = Interpreter::new();
    interp.declare_sys_var("t", "Timer");
    let err = interp.run(&program, &mut diags).unwrap_err();
    assert_eq!(err, InterpreterError::SysVariableDisabled("t".to_string()));
}

#[test]
fn typed_local_declaration_compiles_and_runs_like_any_other_local() {
    let result = run("U32 count; count = 3; count = count + 4; return count;").unwrap();
    assert_eq!(result, 7.0);
}
