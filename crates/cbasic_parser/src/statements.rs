//! Statement parsing: dispatch, assignments, control flow and the
//! simple keyword statements.

use cbasic_ast::*;
use cbasic_diagnostics::messages::*;

use crate::parser::Parser;
use crate::precedence::relational_operator;
use crate::utilities::{can_start_bare_argument, opener_of};

/// Why a construct is rejected in the classic dialect, and what to write instead.
struct Gate {
    construct: &'static str,
    hint: &'static str,
}

const SINGLE_LINE_IF: Gate = Gate {
    construct: "single-line IF",
    hint: "put the statement on its own line and close the block with ENDIF",
};
const IF_WITHOUT_THEN: Gate = Gate {
    construct: "IF without THEN",
    hint: "write IF <condition> THEN, put the statement on its own line and close the block with ENDIF",
};
const DO_LOOP: Gate = Gate {
    construct: "DO...LOOP",
    hint: "use WHILE 1 ... WEND and leave it with EXIT WHILE",
};
const REPEAT_UNTIL: Gate = Gate {
    construct: "REPEAT...UNTIL",
    hint: "use WHILE NOT <condition> ... WEND",
};
const BARE_CONTINUE: Gate = Gate {
    construct: "CONTINUE without a loop keyword",
    hint: "name the loop: CONTINUE FOR, CONTINUE WHILE or CONTINUE DO",
};

impl<'d> Parser<'d> {
    /// Parse one statement. Returns `None` after reporting if it failed;
    /// the caller recovers.
    pub(crate) fn statement(&mut self) -> Option<Stmt> {
        let within = self.enter();
        let stmt = if within { self.dispatch_statement() } else { None };
        self.leave();
        stmt
    }

    fn dispatch_statement(&mut self) -> Option<Stmt> {
        if let Some(closer) = self.closer_at_current() {
            let closer_text = closer.describe();
            self.error(&_0_WITHOUT_1, &[&closer_text, opener_of(closer)]);
            return None;
        }
        match self.kind() {
            TokenKind::Let | TokenKind::Var => self.let_statement(),
            TokenKind::Const => self.const_statement(),
            TokenKind::Print => {
                self.advance();
                Some(Stmt::Print(self.print_items()))
            }
            TokenKind::PrintC => {
                self.advance();
                Some(Stmt::PrintC(self.print_items()))
            }
            TokenKind::Input => self.input_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::Do => self.do_statement(),
            TokenKind::Repeat => self.repeat_statement(),
            TokenKind::Break => {
                self.advance();
                Some(Stmt::Break)
            }
            TokenKind::Continue => self.continue_statement(),
            TokenKind::Exit => self.exit_statement(),
            TokenKind::Sub => self.sub_declaration().map(Stmt::Sub),
            TokenKind::Function => self.function_declaration().map(Stmt::Function),
            TokenKind::Return => {
                self.advance();
                let value = (!self.at_statement_end()).then(|| self.expression());
                Some(Stmt::Return(value))
            }
            TokenKind::Gosub => {
                self.advance();
                self.label_name("GOSUB").map(Stmt::Gosub)
            }
            TokenKind::Goto => {
                self.advance();
                self.label_name("GOTO").map(Stmt::Goto)
            }
            TokenKind::End => {
                self.advance();
                Some(Stmt::End)
            }
            TokenKind::Dim => self.dim_statement(),
            TokenKind::Redim => self.redim_statement(),
            TokenKind::Select => self.select_statement(),
            TokenKind::Option => {
                self.advance();
                self.expect_after(TokenKind::Explicit, "OPTION")?;
                Some(Stmt::OptionExplicit)
            }
            TokenKind::Try => self.try_statement(),
            TokenKind::Throw => {
                self.advance();
                Some(Stmt::Throw(self.expression()))
            }
            TokenKind::Type => self.type_declaration().map(Stmt::Type),
            TokenKind::Enum => self.enum_declaration().map(Stmt::Enum),
            TokenKind::Union => self.union_declaration().map(Stmt::Union),
            TokenKind::Module => self.module_declaration().map(Stmt::Module),
            TokenKind::Operator => self.operator_declaration().map(Stmt::Operator),
            TokenKind::Using => self.using_statement(),
            TokenKind::Import | TokenKind::Include => self.import_statement(),
            TokenKind::Assert => {
                self.advance();
                let condition = self.expression();
                let message = self.eat(TokenKind::Comma).then(|| self.expression());
                Some(Stmt::Assert { condition, message })
            }
            TokenKind::Breakpoint => {
                self.advance();
                Some(Stmt::Breakpoint)
            }
            TokenKind::Debug => self.debug_statement(),
            TokenKind::Yield => {
                self.advance();
                let value = (!self.at_statement_end()).then(|| self.expression());
                Some(Stmt::Yield(value))
            }
            TokenKind::Await => {
                self.advance();
                Some(Stmt::Await(self.expression()))
            }
            TokenKind::Match => Some(Stmt::Expr(self.expression())),
            TokenKind::Local => {
                self.advance();
                self.name_list("LOCAL").map(Stmt::Local)
            }
            TokenKind::Global => {
                self.advance();
                self.name_list("GLOBAL").map(Stmt::Global)
            }
            TokenKind::Call => self.call_statement(),
            TokenKind::LParen => self.destructure_statement(),
            TokenKind::Super => Some(Stmt::Expr(self.expression())),
            TokenKind::On => self.on_statement(),
            TokenKind::Event => {
                self.advance();
                self.expect_ident("EVENT").map(Stmt::EventDecl)
            }
            TokenKind::State => self.state_declaration().map(Stmt::State),
            TokenKind::Transition => self.transition().map(Stmt::Transition),
            TokenKind::Group => self.state_group().map(Stmt::StateGroup),
            TokenKind::Parallel => self.parallel_block().map(Stmt::Parallel),
            TokenKind::Define => self.state_system().map(Stmt::StateSystem),
            TokenKind::Attach => self.attach_statement(),
            TokenKind::Enable | TokenKind::Disable => self.enable_statement(),
            TokenKind::Override => self.override_statement(),
            TokenKind::Ident => {
                let word = self.current_token().lexeme.as_str();
                if matches!(word, "ADD" | "REMOVE") && self.peek_kind(1) == TokenKind::State {
                    self.add_remove_state()
                } else {
                    self.ident_statement()
                }
            }
            TokenKind::Error => {
                self.invalid_token();
                None
            }
            _ => {
                let at = self.mark();
                self.error_hint(
                    at,
                    &UNEXPECTED_STATEMENT,
                    &[],
                    "a statement starts with a keyword such as PRINT or IF, or with a variable name",
                );
                None
            }
        }
    }

    // ========================================================================
    // Dialect gating
    // ========================================================================

    /// Accept `gate` in the permissive dialect; in the classic dialect,
    /// report it at the token with index `at` and reject it.
    fn permissive_only(&mut self, at: usize, gate: &Gate) -> bool {
        if self.dialect().is_permissive() {
            return true;
        }
        self.error_hint(at, &_0_REQUIRES_PERMISSIVE_DIALECT, &[gate.construct], gate.hint);
        false
    }

    // ========================================================================
    // Assignment and declaration
    // ========================================================================

    /// `LET|VAR name [AS T] = v`, `LET name[i] = v` or `LET (a, b) = v`.
    fn let_statement(&mut self) -> Option<Stmt> {
        let keyword = self.advance();
        if self.check(TokenKind::LParen) {
            return self.destructure_statement();
        }
        let name = self.expect_ident(&keyword.lexeme)?;
        let type_name = if self.eat(TokenKind::As) {
            Some(self.type_name()?)
        } else {
            None
        };
        if type_name.is_none() && self.check(TokenKind::LBracket) {
            let indices = self.index_suffixes();
            self.expect_after(TokenKind::Eq, "index")?;
            let value = self.expression();
            return Some(Stmt::AssignIndex { name, indices, value });
        }
        if !self.eat(TokenKind::Eq) && !self.eat(TokenKind::TypeInfer) {
            let at = self.mark();
            self.error_hint(
                at,
                &_0_EXPECTED_AFTER_1,
                &["'='", "variable name"],
                &format!("{} {} = <value>", keyword.lexeme, name),
            );
            return None;
        }
        let value = self.expression();
        Some(Stmt::Let { name, type_name, value })
    }

    fn const_statement(&mut self) -> Option<Stmt> {
        self.advance();
        let name = self.expect_ident("CONST")?;
        self.expect_after(TokenKind::Eq, "constant name")?;
        let value = self.expression();
        Some(Stmt::Const { name, value })
    }

    /// `(a, b) = expr`, with or without a leading `LET`/`VAR`.
    fn destructure_statement(&mut self) -> Option<Stmt> {
        self.expect_token(TokenKind::LParen)?;
        let mut names = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                names.push(self.expect_ident("'('")?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_after(TokenKind::RParen, "destructuring names")?;
        self.expect_after(TokenKind::Eq, "destructuring names")?;
        let value = self.expression();
        Some(Stmt::DestructureAssign { names, value })
    }

    /// `[i][j]...` after a name.
    fn index_suffixes(&mut self) -> Vec<Expr> {
        let mut indices = Vec::new();
        while self.eat(TokenKind::LBracket) {
            indices.push(self.expression());
            self.expect_token(TokenKind::RBracket);
        }
        indices
    }

    /// `INPUT ["prompt" (,|;)] x`, lowered to `x = INPUT(prompt)`.
    fn input_statement(&mut self) -> Option<Stmt> {
        self.advance();
        let mut args = Vec::new();
        if self.check(TokenKind::String) {
            let prompt = self.advance().lexeme;
            args.push(Expr::string(prompt));
            if !self.eat(TokenKind::Comma) {
                self.expect_after(TokenKind::Semicolon, "INPUT prompt")?;
            }
        }
        let name = self.expect_ident("INPUT")?;
        Some(Stmt::Assign {
            name,
            value: Expr::call("INPUT", args),
        })
    }

    /// Statements that begin with a bare identifier: labels, assignments,
    /// member and index assignment, and calls with or without parentheses.
    fn ident_statement(&mut self) -> Option<Stmt> {
        let name = self.advance().lexeme;
        match self.kind() {
            // The colon stays behind as the separator.
            TokenKind::Colon => return Some(Stmt::Label(name)),
            TokenKind::Eq => {
                self.advance();
                let value = self.expression();
                return Some(Stmt::Assign { name, value });
            }
            TokenKind::TypeInfer => {
                self.advance();
                let value = self.expression();
                return Some(Stmt::Let {
                    name,
                    type_name: None,
                    value,
                });
            }
            TokenKind::LParen => {
                self.advance();
                let args = self.call_args();
                if !self.is_postfix_start() {
                    return Some(Stmt::Call { name, args });
                }
                let call = Expr::Call { callee: name, args };
                let target = self.postfix(call);
                return self.finish_target(target);
            }
            kind if can_start_bare_argument(kind) => {
                let args = self.bare_args();
                return Some(Stmt::Call { name, args });
            }
            _ => {}
        }
        if !self.is_postfix_start() {
            return Some(Stmt::Call {
                name,
                args: CallArgs::default(),
            });
        }
        let target = self.postfix(Expr::Variable(name));
        self.finish_target(target)
    }

    /// After a postfix chain at statement level: `target = value` becomes
    /// an index or member assignment, anything else an expression statement.
    fn finish_target(&mut self, target: Expr) -> Option<Stmt> {
        let at = self.mark();
        if !self.eat(TokenKind::Eq) {
            return Some(Stmt::Expr(target));
        }
        let value = self.expression();
        match target {
            Expr::MemberAccess { object, member } => Some(Stmt::AssignMember {
                object: *object,
                member,
                value,
            }),
            Expr::Index { .. } => match flatten_index(target) {
                Ok((name, indices)) => Some(Stmt::AssignIndex { name, indices, value }),
                Err(_) => {
                    self.error_at(at, &INVALID_ASSIGNMENT_TARGET, &[]);
                    None
                }
            },
            _ => {
                self.error_at(at, &INVALID_ASSIGNMENT_TARGET, &[]);
                None
            }
        }
    }

    /// `CALL name[(args)]`
    fn call_statement(&mut self) -> Option<Stmt> {
        self.advance();
        let name = self.expect_ident("CALL")?;
        let args = if self.eat(TokenKind::LParen) {
            self.call_args()
        } else {
            CallArgs::default()
        };
        Some(Stmt::Call { name, args })
    }

    // ========================================================================
    // Output and simple keyword statements
    // ========================================================================

    /// Items after `PRINT`, separated by `,` or `;`. May be empty.
    fn print_items(&mut self) -> Vec<Expr> {
        let mut items = Vec::new();
        while !self.at_statement_end() {
            items.push(self.expression());
            if !self.eat(TokenKind::Comma) && !self.eat(TokenKind::Semicolon) {
                break;
            }
        }
        items
    }

    /// A jump target: a name or a line number.
    fn label_name(&mut self, after: &str) -> Option<String> {
        if self.check(TokenKind::Number) {
            return Some(self.advance().lexeme);
        }
        self.expect_ident(after)
    }

    fn name_list(&mut self, after: &str) -> Option<Vec<String>> {
        let mut names = vec![self.expect_ident(after)?];
        while self.eat(TokenKind::Comma) {
            names.push(self.expect_ident("','")?);
        }
        Some(names)
    }

    fn dim_statement(&mut self) -> Option<Stmt> {
        self.advance();
        let name = self.expect_ident("DIM")?;
        let sizes = self.dimensions()?;
        let type_name = if self.eat(TokenKind::As) {
            Some(self.type_name()?)
        } else {
            None
        };
        Some(Stmt::Dim { name, sizes, type_name })
    }

    fn redim_statement(&mut self) -> Option<Stmt> {
        self.advance();
        let preserve = self.eat(TokenKind::Preserve);
        let name = self.expect_ident("REDIM")?;
        let sizes = self.dimensions()?;
        Some(Stmt::Redim { name, sizes, preserve })
    }

    /// `(n, m)` or `[n, m]` after an array name. Absent means no sizes.
    fn dimensions(&mut self) -> Option<Vec<Expr>> {
        let close = match self.kind() {
            TokenKind::LParen => TokenKind::RParen,
            TokenKind::LBracket => TokenKind::RBracket,
            _ => return Some(Vec::new()),
        };
        self.advance();
        let mut sizes = Vec::new();
        if !self.check(close) {
            loop {
                sizes.push(self.expression());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_after(close, "array sizes")?;
        Some(sizes)
    }

    /// `IMPORT "path"`, `IMPORT name[.ext]` or `IMPORT ("path")`.
    fn import_statement(&mut self) -> Option<Stmt> {
        let keyword = self.advance();
        let parenthesized = self.eat(TokenKind::LParen);
        let path = match self.kind() {
            TokenKind::String => self.advance().lexeme,
            TokenKind::Ident => {
                let name = self.advance().lexeme;
                if self.eat(TokenKind::Dot) {
                    let ext = self.member_name()?;
                    format!("{}.{}", name, ext.to_ascii_lowercase())
                } else {
                    format!("{}.bas", name)
                }
            }
            _ => {
                self.error(&_0_EXPECTED_AFTER_1, &["file name", &keyword.lexeme]);
                return None;
            }
        };
        if parenthesized {
            self.expect_after(TokenKind::RParen, "file name")?;
        }
        Some(Stmt::Import(path))
    }

    /// `DEBUG PRINT expr` or `DEBUG STATES [system]`.
    fn debug_statement(&mut self) -> Option<Stmt> {
        self.advance();
        if self.eat(TokenKind::Print) {
            return Some(Stmt::DebugPrint(self.expression()));
        }
        if self.check(TokenKind::Ident) && self.current_token().lexeme == "STATES" {
            self.advance();
            let system = self.optional_token(TokenKind::Ident).map(|t| t.lexeme);
            return Some(Stmt::DebugStates(system));
        }
        self.error(&_0_EXPECTED_AFTER_1, &["PRINT or STATES", "DEBUG"]);
        None
    }

    // ========================================================================
    // Jumps
    // ========================================================================

    fn exit_statement(&mut self) -> Option<Stmt> {
        self.advance();
        match loop_or_procedure(self.kind()) {
            Some(target) => {
                self.advance();
                Some(Stmt::Exit(target))
            }
            None => {
                let at = self.mark();
                self.error_hint(
                    at,
                    &INVALID_EXIT_TARGET,
                    &["EXIT", "FOR, WHILE, DO, SUB or FUNCTION"],
                    "EXIT FOR",
                );
                None
            }
        }
    }

    fn continue_statement(&mut self) -> Option<Stmt> {
        let start = self.mark();
        self.advance();
        match loop_or_procedure(self.kind()).filter(|b| b.is_loop()) {
            Some(target) => {
                self.advance();
                Some(Stmt::Continue(Some(target)))
            }
            None if self.at_statement_end() => {
                if !self.permissive_only(start, &BARE_CONTINUE) {
                    return None;
                }
                Some(Stmt::Continue(None))
            }
            None => {
                self.error(&INVALID_EXIT_TARGET, &["CONTINUE", "FOR, WHILE or DO"]);
                None
            }
        }
    }

    // ========================================================================
    // IF
    // ========================================================================

    fn if_statement(&mut self) -> Option<Stmt> {
        let start = self.mark();
        self.advance();
        let condition = self.expression();
        let has_then = self.eat(TokenKind::Then);

        if !self.at_line_end() && self.closer_at_current().is_none() {
            let body = self.inline_body()?;
            let else_body = if self.eat(TokenKind::Else) {
                Some(self.inline_body()?)
            } else {
                None
            };
            let gate = if has_then { &SINGLE_LINE_IF } else { &IF_WITHOUT_THEN };
            if !self.permissive_only(start, gate) {
                return None;
            }
            return Some(Stmt::If {
                branches: vec![IfBranch { condition, body }],
                else_body,
            });
        }

        let terminators = [TokenKind::ElseIf, TokenKind::Else, TokenKind::EndIf];
        let body = self.block_until(&terminators);
        let mut branches = vec![IfBranch { condition, body }];
        while self.eat(TokenKind::ElseIf) {
            let condition = self.expression();
            self.expect_after(TokenKind::Then, "ELSEIF condition")?;
            let body = self.block_until(&terminators);
            branches.push(IfBranch { condition, body });
        }
        let else_body = if self.eat(TokenKind::Else) {
            Some(self.block_until(&[TokenKind::EndIf]))
        } else {
            None
        };
        if !self.expect_closer(TokenKind::EndIf, "IF") {
            return None;
        }
        Some(Stmt::If { branches, else_body })
    }

    /// Colon-separated statements on the rest of the line, for the
    /// single-line `IF` forms. Stops before `ELSE`.
    fn inline_body(&mut self) -> Option<Vec<Stmt>> {
        let mut body = Vec::new();
        loop {
            if !self.statement_into(&mut body) {
                return None;
            }
            if !self.eat(TokenKind::Colon) {
                break;
            }
            if self.at_line_end() || self.closer_at_current().is_some() {
                break;
            }
        }
        Some(body)
    }

    // ========================================================================
    // Loops
    // ========================================================================

    fn while_statement(&mut self) -> Option<Stmt> {
        self.advance();
        let condition = self.expression();
        let body = self.block_until(&[TokenKind::Wend]);
        if !self.expect_closer(TokenKind::Wend, "WHILE") {
            return None;
        }
        Some(Stmt::While { condition, body })
    }

    fn do_statement(&mut self) -> Option<Stmt> {
        let start = self.mark();
        self.advance();
        let body = self.block_until(&[TokenKind::Loop]);
        if !self.expect_closer(TokenKind::Loop, "DO") {
            return None;
        }
        if !self.permissive_only(start, &DO_LOOP) {
            return None;
        }
        Some(Stmt::DoLoop { body })
    }

    fn repeat_statement(&mut self) -> Option<Stmt> {
        let start = self.mark();
        self.advance();
        let body = self.block_until(&[TokenKind::Until]);
        if !self.expect_closer(TokenKind::Until, "REPEAT") {
            return None;
        }
        let condition = self.expression();
        if !self.permissive_only(start, &REPEAT_UNTIL) {
            return None;
        }
        Some(Stmt::RepeatUntil { body, condition })
    }

    /// `FOR v = a TO b [STEP s]`, `FOR EACH v IN xs` and `FOR v IN xs`.
    fn for_statement(&mut self) -> Option<Stmt> {
        self.advance();
        if self.eat(TokenKind::Each) {
            let var = self.expect_ident("FOR EACH")?;
            self.expect_after(TokenKind::In, "FOR EACH variable")?;
            let collection = self.expression();
            let body = self.for_body()?;
            return Some(Stmt::ForEach { var, collection, body });
        }

        let var = self.expect_ident("FOR")?;
        if self.eat(TokenKind::In) {
            let collection = self.expression();
            let body = self.for_body()?;
            return Some(self.desugar_for_in(var, collection, body));
        }

        self.expect_after(TokenKind::Eq, "FOR variable")?;
        let start = self.expression();
        self.expect_after(TokenKind::To, "FOR start value")?;
        let limit = self.expression();
        let step = self.eat(TokenKind::Step).then(|| self.expression());
        let body = self.for_body()?;
        Some(Stmt::ForNext {
            var,
            start,
            limit,
            step,
            body,
        })
    }

    /// The loop body up to and including `NEXT [var]`.
    fn for_body(&mut self) -> Option<Vec<Stmt>> {
        let body = self.block_until(&[TokenKind::Next]);
        if !self.expect_closer(TokenKind::Next, "FOR") {
            return None;
        }
        self.eat(TokenKind::Ident);
        Some(body)
    }

    /// Lower `FOR v IN xs ... NEXT` to an indexed `WHILE`. The list and
    /// index temporaries are queued to precede the loop. Their names are
    /// lower-case, which no upper-cased source identifier can spell.
    fn desugar_for_in(&mut self, var: String, collection: Expr, user_body: Vec<Stmt>) -> Stmt {
        let id = self.next_gensym();
        let list = format!("__list{}", id);
        let index = format!("__i{}", id);

        self.enqueue(Stmt::Let {
            name: list.clone(),
            type_name: None,
            value: collection,
        });
        self.enqueue(Stmt::Let {
            name: index.clone(),
            type_name: None,
            value: Expr::number("0"),
        });

        let mut body = Vec::with_capacity(user_body.len() + 2);
        body.push(Stmt::Assign {
            name: var,
            value: Expr::index(Expr::var(&list), Expr::var(&index)),
        });
        body.extend(user_body);
        body.push(Stmt::Assign {
            name: index.clone(),
            value: Expr::binary(BinaryOp::Add, Expr::var(&index), Expr::number("1")),
        });

        Stmt::While {
            condition: Expr::binary(BinaryOp::Lt, Expr::var(index), Expr::call("LEN", vec![Expr::var(list)])),
            body,
        }
    }

    // ========================================================================
    // SELECT CASE
    // ========================================================================

    fn select_statement(&mut self) -> Option<Stmt> {
        self.advance();
        self.expect_after(TokenKind::Case, "SELECT")?;
        let selector = self.expression();
        let mut branches = Vec::new();
        let mut seen_else = false;
        loop {
            self.skip_separators();
            if self.eat_closer(TokenKind::EndSelect) {
                break;
            }
            if self.check(TokenKind::Case) {
                let at = self.mark();
                self.advance();
                let label = if self.eat(TokenKind::Else) {
                    CaseLabel::Else
                } else {
                    CaseLabel::Tests(self.case_tests())
                };
                if seen_else {
                    let message = if label == CaseLabel::Else {
                        &DUPLICATE_CASE_ELSE
                    } else {
                        &UNREACHABLE_CASE
                    };
                    self.warn_at(at, message, &[]);
                }
                seen_else |= label == CaseLabel::Else;
                let body = self.block_until(&[TokenKind::Case, TokenKind::EndSelect]);
                branches.push(CaseBranch { label, body });
                continue;
            }
            if self.check(TokenKind::Eof) || self.closer_at_current().is_some() {
                self.expect_closer(TokenKind::EndSelect, "SELECT CASE");
                return None;
            }
            let found = self.current_token().describe();
            self.error(&CASE_EXPECTED, &[&found]);
            self.advance();
            self.skip_to_separator();
        }
        Some(Stmt::SelectCase { selector, branches })
    }

    /// Comma-separated `CASE` tests: values or `IS <op> expr`.
    fn case_tests(&mut self) -> Vec<CaseTest> {
        let mut tests = Vec::new();
        loop {
            if self.eat(TokenKind::Is) {
                let op = match relational_operator(self.kind()) {
                    Some(op) => {
                        self.advance();
                        op
                    }
                    None => {
                        self.error(&_0_EXPECTED_AFTER_1, &["comparison operator", "IS"]);
                        BinaryOp::Eq
                    }
                };
                let value = self.expression();
                tests.push(CaseTest::Is { op, value });
            } else {
                tests.push(CaseTest::Value(self.expression()));
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        tests
    }

    // ========================================================================
    // TRY
    // ========================================================================

    fn try_statement(&mut self) -> Option<Stmt> {
        self.advance();
        let body = self.block_until(&[TokenKind::Catch, TokenKind::Finally, TokenKind::EndTry]);
        let catch = if self.eat(TokenKind::Catch) {
            let var = self.optional_token(TokenKind::Ident).map(|t| t.lexeme);
            let body = self.block_until(&[TokenKind::Finally, TokenKind::EndTry]);
            Some(CatchClause { var, body })
        } else {
            None
        };
        let finally = if self.eat(TokenKind::Finally) {
            Some(self.block_until(&[TokenKind::EndTry]))
        } else {
            None
        };
        if !self.expect_closer(TokenKind::EndTry, "TRY") {
            return None;
        }
        Some(Stmt::TryCatch { body, catch, finally })
    }

    /// `USING v = e ... END USING`
    fn using_statement(&mut self) -> Option<Stmt> {
        self.advance();
        let name = self.expect_ident("USING")?;
        self.expect_after(TokenKind::Eq, "USING variable")?;
        let value = self.expression();
        let body = self.block_until(&[TokenKind::EndUsing]);
        if !self.expect_closer(TokenKind::EndUsing, "USING") {
            return None;
        }
        Some(Stmt::Using { name, value, body })
    }
}

/// The block named by the keyword after `EXIT` or `CONTINUE`.
fn loop_or_procedure(kind: TokenKind) -> Option<BlockKind> {
    match kind {
        TokenKind::For => Some(BlockKind::For),
        TokenKind::While => Some(BlockKind::While),
        TokenKind::Do => Some(BlockKind::Do),
        TokenKind::Sub => Some(BlockKind::Sub),
        TokenKind::Function => Some(BlockKind::Function),
        _ => None,
    }
}

/// Split `a[i][j]` into `("A", [i, j])`. Fails unless the chain is rooted
/// at a plain variable.
fn flatten_index(expr: Expr) -> Result<(String, Vec<Expr>), Expr> {
    match expr {
        Expr::Variable(name) => Ok((name, Vec::new())),
        Expr::Index { target, index } => {
            let (name, mut indices) = flatten_index(*target)?;
            indices.push(*index);
            Ok((name, indices))
        }
        other => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_index() {
        let expr = Expr::index(Expr::index(Expr::var("A"), Expr::number("1")), Expr::number("2"));
        let (name, indices) = flatten_index(expr).unwrap();
        assert_eq!(name, "A");
        assert_eq!(indices, vec![Expr::number("1"), Expr::number("2")]);
    }

    #[test]
    fn test_flatten_rejects_calls() {
        let expr = Expr::index(Expr::call("F", vec![]), Expr::number("1"));
        assert!(flatten_index(expr).is_err());
    }

    #[test]
    fn test_loop_targets() {
        assert_eq!(loop_or_procedure(TokenKind::Do), Some(BlockKind::Do));
        assert_eq!(loop_or_procedure(TokenKind::Next), None);
    }
}
