//! Procedure and type declarations.

use cbasic_ast::*;
use cbasic_diagnostics::messages::*;

use crate::parser::Parser;
use crate::precedence::overloadable_operator;

impl<'d> Parser<'d> {
    /// `SUB name[(params)] ... END SUB`
    ///
    /// A broken header still consumes the body through `END SUB`, so the
    /// enclosing block never sees an orphaned closer.
    pub(crate) fn sub_declaration(&mut self) -> Option<SubDecl> {
        self.advance();
        let header = self
            .expect_ident("SUB")
            .and_then(|name| Some((name, self.param_list()?)));
        if header.is_none() {
            self.skip_to_separator();
        }
        let body = self.block_until(&[TokenKind::EndSub]);
        let closed = self.expect_closer(TokenKind::EndSub, "SUB");
        let (name, params) = header?;
        closed.then_some(SubDecl { name, params, body })
    }

    /// `FUNCTION name[(params)] [AS T] ... END FUNCTION`
    pub(crate) fn function_declaration(&mut self) -> Option<FunctionDecl> {
        self.advance();
        let header = self.function_header();
        if header.is_none() {
            self.skip_to_separator();
        }
        let body = self.block_until(&[TokenKind::EndFunction]);
        let closed = self.expect_closer(TokenKind::EndFunction, "FUNCTION");
        let (name, params, return_type) = header?;
        closed.then_some(FunctionDecl {
            name,
            params,
            return_type,
            body,
        })
    }

    fn function_header(&mut self) -> Option<(String, Vec<Param>, Option<String>)> {
        let name = self.expect_ident("FUNCTION")?;
        let params = self.param_list()?;
        let return_type = if self.eat(TokenKind::As) {
            Some(self.type_name()?)
        } else {
            None
        };
        Some((name, params, return_type))
    }

    /// An optional parenthesized parameter list:
    /// `(name [AS T] [= default], ...)`.
    pub(crate) fn param_list(&mut self) -> Option<Vec<Param>> {
        let mut params = Vec::new();
        if !self.eat(TokenKind::LParen) || self.eat(TokenKind::RParen) {
            return Some(params);
        }
        loop {
            let name = self.expect_ident("parameter list")?;
            let type_name = if self.eat(TokenKind::As) {
                Some(self.type_name()?)
            } else {
                None
            };
            let default = self.eat(TokenKind::Eq).then(|| self.expression());
            params.push(Param {
                name,
                type_name,
                default,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect_after(TokenKind::RParen, "parameters")?;
        Some(params)
    }

    /// A type annotation after `AS`. A trailing `[]` marks an array type.
    pub(crate) fn type_name(&mut self) -> Option<String> {
        let mut name = self.expect_ident("AS")?;
        if self.check(TokenKind::LBracket) && self.peek_kind(1) == TokenKind::RBracket {
            self.advance();
            self.advance();
            name.push_str("[]");
        }
        Some(name)
    }

    /// `TYPE Name [EXTENDS Parent]`, then fields (`name [AS T]`) and
    /// `SUB`/`FUNCTION` methods, then `END TYPE`. A bad member is skipped
    /// on its own; the rest of the type still parses.
    pub(crate) fn type_declaration(&mut self) -> Option<TypeDecl> {
        self.advance();
        let header = self.type_header();
        if header.is_none() {
            self.skip_to_separator();
        }
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        loop {
            self.skip_separators();
            if self.eat_closer(TokenKind::EndType) {
                break;
            }
            let start = self.mark();
            let parsed = match self.kind() {
                TokenKind::Sub => self.sub_declaration().map(|d| methods.push(Stmt::Sub(d))).is_some(),
                TokenKind::Function => self
                    .function_declaration()
                    .map(|d| methods.push(Stmt::Function(d)))
                    .is_some(),
                TokenKind::Ident | TokenKind::Var | TokenKind::Let | TokenKind::Dim => {
                    self.field_declaration().map(|f| fields.push(f)).is_some()
                }
                TokenKind::Eof => {
                    self.expect_closer(TokenKind::EndType, "TYPE");
                    return None;
                }
                _ if self.closer_at_current().is_some() => {
                    self.expect_closer(TokenKind::EndType, "TYPE");
                    return None;
                }
                _ => {
                    let found = self.current_token().describe();
                    self.error(&UNEXPECTED_IN_0, &[&found, "TYPE"]);
                    self.advance();
                    self.skip_to_separator();
                    continue;
                }
            };
            if parsed {
                self.finish_statement();
            } else {
                self.synchronize(start);
            }
        }
        let (name, parent) = header?;
        Some(TypeDecl {
            name,
            parent,
            fields,
            methods,
        })
    }

    fn type_header(&mut self) -> Option<(String, Option<String>)> {
        let name = self.expect_ident("TYPE")?;
        let parent = if self.eat(TokenKind::Extends) {
            Some(self.expect_ident("EXTENDS")?)
        } else {
            None
        };
        Some((name, parent))
    }

    /// `[VAR|LET|DIM] name [AS T]` inside a TYPE.
    fn field_declaration(&mut self) -> Option<FieldDecl> {
        if !self.check(TokenKind::Ident) {
            self.advance();
        }
        let name = self.expect_ident("field declaration")?;
        let type_name = if self.eat(TokenKind::As) {
            Some(self.type_name()?)
        } else {
            None
        };
        Some(FieldDecl { name, type_name })
    }

    /// `ENUM Name` with members separated by commas or newlines, each
    /// `name [= value]`, then `END ENUM`.
    pub(crate) fn enum_declaration(&mut self) -> Option<EnumDecl> {
        self.advance();
        let name = self.expect_ident("ENUM")?;
        let mut members = Vec::new();
        loop {
            while self.kind().is_separator() || self.check(TokenKind::Comma) {
                self.advance();
            }
            if self.eat_closer(TokenKind::EndEnum) {
                break;
            }
            if self.check(TokenKind::Ident) {
                let name = self.advance().lexeme;
                let value = self.eat(TokenKind::Eq).then(|| self.expression());
                members.push(EnumMember { name, value });
                continue;
            }
            if self.check(TokenKind::Eof) || self.closer_at_current().is_some() {
                self.expect_closer(TokenKind::EndEnum, "ENUM");
                return None;
            }
            let found = self.current_token().describe();
            self.error(&UNEXPECTED_IN_0, &[&found, "ENUM"]);
            self.advance();
        }
        Some(EnumDecl { name, members })
    }

    /// `UNION Name AS T1, T2 ... END UNION`
    pub(crate) fn union_declaration(&mut self) -> Option<UnionDecl> {
        self.advance();
        let name = self.expect_ident("UNION")?;
        let mut types = Vec::new();
        if self.eat(TokenKind::As) {
            loop {
                self.skip_newlines();
                types.push(self.type_name()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.skip_separators();
        if !self.expect_closer(TokenKind::EndUnion, "UNION") {
            return None;
        }
        Some(UnionDecl { name, types })
    }

    /// `MODULE Name [PUBLIC|PRIVATE] ... END MODULE`. Modules are public
    /// unless marked `PRIVATE`.
    pub(crate) fn module_declaration(&mut self) -> Option<ModuleDecl> {
        self.advance();
        let name = self.expect_ident("MODULE")?;
        let public = !self.eat(TokenKind::Private);
        if public {
            self.eat(TokenKind::Public);
        }
        let body = self.block_until(&[TokenKind::EndModule]);
        if !self.expect_closer(TokenKind::EndModule, "MODULE") {
            return None;
        }
        Some(ModuleDecl { name, public, body })
    }

    /// `OPERATOR <op> FOR Type (params) ... END OPERATOR`
    pub(crate) fn operator_declaration(&mut self) -> Option<OperatorDecl> {
        self.advance();
        let Some(op) = overloadable_operator(self.kind()) else {
            let found = self.current_token().describe();
            self.error(&OPERATOR_EXPECTED, &[&found]);
            return None;
        };
        self.advance();
        self.expect_after(TokenKind::For, "OPERATOR symbol")?;
        let type_name = self.expect_ident("FOR")?;
        let params = self.param_list()?;
        let body = self.block_until(&[TokenKind::EndOperator]);
        if !self.expect_closer(TokenKind::EndOperator, "OPERATOR") {
            return None;
        }
        Some(OperatorDecl {
            op,
            type_name,
            params,
            body,
        })
    }
}
