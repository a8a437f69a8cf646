//! §4.4 "Parser" — recursive-descent over the token buffer, implementing
//! the full precedence chain element → unary → term → arithmetic → shift →
//! bitwise → set-compare → assignment, with no constant folding (spec.md's
//! explicit note: folding is left to the interpreter's own immediate-value
//! handling, not the emitter).

use crate::ast::{BinaryOp, Expr, Stmt, UnaryOp};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::token::{Keyword, Token, TokenBuffer, TokenKind};

pub struct Parser<'s> {
    source: &'s str,
    tokens: &'s TokenBuffer,
    pos: usize,
    brace_depth: u32,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str, tokens: &'s TokenBuffer) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            brace_depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).expect("EOF token always present")
    }

    fn peek_text(&self) -> &'s str {
        self.peek().text(self.source)
    }

    fn advance(&mut self) -> Token {
        let t = *self.tokens.get(self.pos).unwrap();
        self.pos += 1;
        t
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn is_punct(&self, s: &str) -> bool {
        matches!(self.peek().kind, TokenKind::Punct) && self.peek_text() == s
    }

    fn eat_punct(&mut self, s: &str) -> bool {
        if self.is_punct(s) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn parse_program(&mut self, diagnostics: &mut impl Diagnostics) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !self.at_eof() {
            stmts.push(self.parse_stmt(diagnostics));
        }
        stmts
    }

    #[tracing::instrument(name = "parse_stmt", skip(self, diagnostics))]
    fn parse_stmt(&mut self, diagnostics: &mut impl Diagnostics) -> Stmt {
        tracing::trace!("statement at offset {}", self.peek().offset);
        match self.peek().kind {
            TokenKind::Keyword(Keyword::If) => self.parse_if(diagnostics),
            TokenKind::Keyword(Keyword::While) => self.parse_while(diagnostics),
            TokenKind::Keyword(Keyword::For) => self.parse_for(diagnostics),
            TokenKind::Keyword(Keyword::Return) => {
                self.advance();
                let expr = if self.eat_punct(";") {
                    None
                } else {
                    let e = self.parse_expr(diagnostics);
                    self.eat_punct(";");
                    Some(e)
                };
                Stmt::Return(expr)
            }
            TokenKind::Keyword(Keyword::Continue) => {
                self.advance();
                self.eat_punct(";");
                Stmt::Continue
            }
            TokenKind::Keyword(Keyword::Break) => {
                self.advance();
                self.eat_punct(";");
                Stmt::Break
            }
            TokenKind::Keyword(Keyword::Delete) => {
                self.advance();
                let name = self.expect_identifier(diagnostics);
                self.eat_punct(";");
                if self.brace_depth != 0 {
                    tracing::warn!(offset = self.peek().offset, "delete inside a block");
                    diagnostics.report(Diagnostic {
                        offset: self.peek().offset as usize,
                        message: "delete of a system variable is only valid at brace depth 0"
                            .into(),
                    });
                }
                Stmt::Delete(name)
            }
            TokenKind::Punct if self.peek_text() == "{" => {
                self.advance();
                self.brace_depth += 1;
                let mut stmts = Vec::new();
                while !self.at_eof() && !self.is_punct("}") {
                    stmts.push(self.parse_stmt(diagnostics));
                }
                self.eat_punct("}");
                self.brace_depth -= 1;
                Stmt::Block(stmts)
            }
            TokenKind::Identifier if self.looks_like_sysvar_decl() => {
                self.parse_sysvar_decl(diagnostics)
            }
            _ => {
                let e = self.parse_expr(diagnostics);
                self.eat_punct(";");
                Stmt::Expr(e)
            }
        }
    }

    fn looks_like_sysvar_decl(&self) -> bool {
        matches!(
            self.tokens.get(self.pos).map(|t| t.kind),
            Some(TokenKind::Identifier)
        ) && matches!(
            self.tokens.get(self.pos + 1).map(|t| t.kind),
            Some(TokenKind::Identifier)
        )
    }

    fn parse_sysvar_decl(&mut self, diagnostics: &mut impl Diagnostics) -> Stmt {
        let type_name = self.expect_identifier(diagnostics);
        let var_name = self.expect_identifier(diagnostics);
        self.eat_punct(";");
        if self.brace_depth != 0 {
            tracing::warn!(offset = self.peek().offset, "sysvar decl inside a block");
            diagnostics.report(Diagnostic {
                offset: self.peek().offset as usize,
                message: "system variable declarations are only valid at brace depth 0".into(),
            });
        }
        Stmt::SysVarDecl(type_name, var_name)
    }

    fn expect_identifier(&mut self, diagnostics: &mut impl Diagnostics) -> String {
        if matches!(self.peek().kind, TokenKind::Identifier) {
            let text = self.peek_text().to_string();
            self.advance();
            text
        } else {
            tracing::warn!(offset = self.peek().offset, "expected identifier");
            diagnostics.report(Diagnostic {
                offset: self.peek().offset as usize,
                message: "expected identifier".into(),
            });
            String::new()
        }
    }

    fn parse_if(&mut self, diagnostics: &mut impl Diagnostics) -> Stmt {
        self.advance();
        self.eat_punct("(");
        let cond = self.parse_expr(diagnostics);
        self.eat_punct(")");
        let then_branch = vec![self.parse_stmt(diagnostics)];
        let else_branch = if matches!(self.peek().kind, TokenKind::Keyword(Keyword::Else)) {
            self.advance();
            vec![self.parse_stmt(diagnostics)]
        } else {
            Vec::new()
        };
        Stmt::If(cond, then_branch, else_branch)
    }

    fn parse_while(&mut self, diagnostics: &mut impl Diagnostics) -> Stmt {
        self.advance();
        self.eat_punct("(");
        let cond = self.parse_expr(diagnostics);
        self.eat_punct(")");
        let body = vec![self.parse_stmt(diagnostics)];
        Stmt::While(cond, body)
    }

    fn parse_for(&mut self, diagnostics: &mut impl Diagnostics) -> Stmt {
        self.advance();
        self.eat_punct("(");
        let init = if self.eat_punct(";") {
            None
        } else {
            Some(Box::new(self.parse_stmt(diagnostics)))
        };
        let cond = if self.is_punct(";") {
            None
        } else {
            Some(self.parse_expr(diagnostics))
        };
        self.eat_punct(";");
        let step = if self.is_punct(")") {
            None
        } else {
            Some(Box::new(Stmt::Expr(self.parse_expr(diagnostics))))
        };
        self.eat_punct(")");
        let body = vec![self.parse_stmt(diagnostics)];
        Stmt::For(init, cond, step, body)
    }

    fn parse_expr(&mut self, diagnostics: &mut impl Diagnostics) -> Expr {
        self.parse_assign(diagnostics)
    }

    fn parse_assign(&mut self, diagnostics: &mut impl Diagnostics) -> Expr {
        let lhs = self.parse_compare(diagnostics);
        if self.is_punct("=") {
            self.advance();
            let rhs = self.parse_assign(diagnostics);
            match lhs {
                Expr::Identifier(name) => return Expr::Assign(name, Box::new(rhs)),
                Expr::Member(base, member) => {
                    return Expr::MemberAssign(base, member, Box::new(rhs))
                }
                _ => {
                    tracing::warn!(
                        offset = self.peek().offset,
                        "non-identifier assignment target"
                    );
                    diagnostics.report(Diagnostic {
                        offset: self.peek().offset as usize,
                        message: "left-hand side of assignment must be an identifier".into(),
                    });
                    return rhs;
                }
            }
        }
        lhs
    }

    fn parse_compare(&mut self, diagnostics: &mut impl Diagnostics) -> Expr {
        let mut lhs = self.parse_bitwise(diagnostics);
        loop {
            let op = if self.is_punct("==") {
                BinaryOp::Eq
            } else if self.is_punct("!=") {
                BinaryOp::Ne
            } else if self.is_punct("<=") {
                BinaryOp::Le
            } else if self.is_punct(">=") {
                BinaryOp::Ge
            } else if self.is_punct("<") {
                BinaryOp::Lt
            } else if self.is_punct(">") {
                BinaryOp::Gt
            } else {
                break;
            };
            self.advance();
            let rhs = self.parse_bitwise(diagnostics);
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        lhs
    }

    fn parse_bitwise(&mut self, diagnostics: &mut impl Diagnostics) -> Expr {
        let mut lhs = self.parse_shift(diagnostics);
        loop {
            let op = if self.is_punct("|") {
                BinaryOp::BitOr
            } else if self.is_punct("^") {
                BinaryOp::BitXor
            } else if self.is_punct("&") {
                BinaryOp::BitAnd
            } else {
                break;
            };
            self.advance();
            let rhs = self.parse_shift(diagnostics);
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        lhs
    }

    fn parse_shift(&mut self, diagnostics: &mut impl Diagnostics) -> Expr {
        let mut lhs = self.parse_arith(diagnostics);
        loop {
            let op = if self.is_punct("<<<") {
                BinaryOp::Rol
            } else if self.is_punct(">>>") {
                BinaryOp::Ror
            } else if self.is_punct("<<") {
                BinaryOp::Shl
            } else if self.is_punct(">>") {
                BinaryOp::Shr
            } else {
                break;
            };
            self.advance();
            let rhs = self.parse_arith(diagnostics);
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        lhs
    }

    fn parse_arith(&mut self, diagnostics: &mut impl Diagnostics) -> Expr {
        let mut lhs = self.parse_term(diagnostics);
        loop {
            let op = if self.is_punct("+") {
                BinaryOp::Add
            } else if self.is_punct("-") {
                BinaryOp::Sub
            } else {
                break;
            };
            self.advance();
            let rhs = self.parse_term(diagnostics);
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        lhs
    }

    fn parse_term(&mut self, diagnostics: &mut impl Diagnostics) -> Expr {
        let mut lhs = self.parse_unary(diagnostics);
        loop {
            let op = if self.is_punct("*") {
                BinaryOp::Mul
            } else if self.is_punct("/") {
                BinaryOp::Div
            } else if self.is_punct("%") {
                BinaryOp::Mod
            } else {
                break;
            };
            self.advance();
            let rhs = self.parse_unary(diagnostics);
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        lhs
    }

    fn parse_unary(&mut self, diagnostics: &mut impl Diagnostics) -> Expr {
        let op = if self.is_punct("-") {
            Some(UnaryOp::Neg)
        } else if self.is_punct("+") {
            Some(UnaryOp::Pos)
        } else if self.is_punct("~") {
            Some(UnaryOp::BitNot)
        } else if self.is_punct("!") {
            Some(UnaryOp::Not)
        } else {
            None
        };
        if let Some(op) = op {
            self.advance();
            return Expr::Unary(op, Box::new(self.parse_unary(diagnostics)));
        }
        self.parse_element(diagnostics)
    }

    /// Parses `(arg, arg, ...)` — the shared argument list grammar for both
    /// plain calls and `name.method(...)` calls. Assumes the opening `(` is
    /// the current token.
    fn parse_call_args(&mut self, diagnostics: &mut impl Diagnostics) -> Vec<Expr> {
        self.advance();
        let mut args = Vec::new();
        if !self.is_punct(")") {
            loop {
                args.push(self.parse_assign(diagnostics));
                if !self.eat_punct(",") {
                    break;
                }
            }
        }
        self.eat_punct(")");
        args
    }

    fn parse_element(&mut self, diagnostics: &mut impl Diagnostics) -> Expr {
        match self.peek().kind {
            TokenKind::Number => {
                let text = self.peek_text();
                let value: f64 = text.parse().unwrap_or_else(|_| {
                    tracing::warn!(offset = self.peek().offset, text, "malformed number literal");
                    diagnostics.report(Diagnostic {
                        offset: self.peek().offset as usize,
                        message: format!("malformed number literal '{text}'"),
                    });
                    0.0
                });
                self.advance();
                Expr::Number(value)
            }
            TokenKind::Identifier => {
                let name = self.peek_text().to_string();
                self.advance();
                if self.is_punct("(") {
                    let args = self.parse_call_args(diagnostics);
                    Expr::Call(name, args)
                } else if self.eat_punct(".") {
                    let member = self.expect_identifier(diagnostics);
                    if self.is_punct("(") {
                        let args = self.parse_call_args(diagnostics);
                        Expr::MethodCall(name, member, args)
                    } else {
                        Expr::Member(name, member)
                    }
                } else {
                    Expr::Identifier(name)
                }
            }
            TokenKind::Punct if self.peek_text() == "(" => {
                self.advance();
                let e = self.parse_assign(diagnostics);
                self.eat_punct(")");
                e
            }
            _ => {
                tracing::warn!(offset = self.peek().offset, "expected an expression");
                diagnostics.report(Diagnostic {
                    offset: self.peek().offset as usize,
                    message: "expected an expression".into(),
                });
                if !self.at_eof() {
                    self.advance();
                }
                Expr::Number(0.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticLog;
    use crate::lex::lex;

    fn parse(src: &str) -> (Vec<Stmt>, DiagnosticLog) {
        let mut diags = DiagnosticLog::default();
        let tokens = lex(src, &mut diags);
        let mut parser = Parser::new(src, &tokens);
        let stmts = parser.parse_program(&mut diags);
        (stmts, diags)
    }

    #[test]
    fn precedence_binds_mul_tighter_than_add() {
        let (stmts, diags) = parse("1 + 2 * 3;");
        assert!(diags.is_empty());
        match &stmts[0] {
            Stmt::Expr(Expr::Binary(BinaryOp::Add, lhs, rhs)) => {
                assert!(matches!(**lhs, Expr::Number(n) if n == 1.0));
                assert!(matches!(**rhs, Expr::Binary(BinaryOp::Mul, _, _)));
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn shift_binds_looser_than_arithmetic() {
        let (stmts, diags) = parse("1 + 2 << 3;");
        assert!(diags.is_empty());
        match &stmts[0] {
            Stmt::Expr(Expr::Binary(BinaryOp::Shl, lhs, _)) => {
                assert!(matches!(**lhs, Expr::Binary(BinaryOp::Add, _, _)));
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn assignment_targets_an_identifier() {
        let (stmts, diags) = parse("x = y + 1;");
        assert!(diags.is_empty());
        assert!(matches!(&stmts[0], Stmt::Expr(Expr::Assign(name, _)) if name == "x"));
    }

    #[test]
    fn sysvar_decl_only_at_top_level() {
        let (stmts, diags) = parse("Timer t; { Timer u; }");
        assert!(matches!(&stmts[0], Stmt::SysVarDecl(ty, name) if ty == "Timer" && name == "t"));
        assert!(!diags.is_empty(), "nested decl should have been flagged");
    }

    #[test]
    fn member_access_parses_as_a_member_expression() {
        let (stmts, diags) = parse("x = t.elapsed;");
        assert!(diags.is_empty());
        match &stmts[0] {
            Stmt::Expr(Expr::Assign(name, value)) => {
                assert_eq!(name, "x");
                assert!(matches!(**value, Expr::Member(ref base, ref member)
                    if base == "t" && member == "elapsed"));
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn member_assignment_parses_as_a_member_assign_expression() {
        let (stmts, diags) = parse("t.elapsed = 0;");
        assert!(diags.is_empty());
        assert!(matches!(&stmts[0], Stmt::Expr(Expr::MemberAssign(base, member, _))
            if base == "t" && member == "elapsed"));
    }

    #[test]
    fn method_call_parses_with_its_arguments() {
        let (stmts, diags) = parse("t.reset(1, 2);");
        assert!(diags.is_empty());
        match &stmts[0] {
            Stmt::Expr(Expr::MethodCall(base, method, args)) => {
                assert_eq!(base, "t");
                assert_eq!(method, "reset");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn if_else_and_while_parse() {
        let (stmts, diags) = parse("if (x) { y = 1; } else { y = 2; } while (x) { x = x - 1; }");
        assert!(diags.is_empty());
        assert!(matches!(stmts[0], Stmt::If(..)));
        assert!(matches!(stmts[1], Stmt::While(..)));
    }
}
