//! Expression parsing by precedence climbing.
//!
//! `expression -> range -> coalesce -> binary(Or ..= Power) -> unary ->
//! primary -> postfix`. Every method returns an `Expr`: when a piece is
//! missing the error is reported and `Expr::placeholder()` stands in, so
//! the surrounding statement stays well-formed.

use cbasic_ast::*;
use cbasic_diagnostics::messages::*;
use cbasic_lexer::Token;

use crate::parser::Parser;
use crate::precedence::{binary_operator, Precedence};

impl<'d> Parser<'d> {
    pub(crate) fn expression(&mut self) -> Expr {
        let within = self.enter();
        let expr = if within { self.range() } else { Expr::placeholder() };
        self.leave();
        expr
    }

    /// `a .. b`
    fn range(&mut self) -> Expr {
        let start = self.coalesce();
        if !self.eat(TokenKind::Spread) {
            return start;
        }
        let end = self.coalesce();
        Expr::RangeLiteral {
            start: Box::new(start),
            end: Box::new(end),
        }
    }

    /// `a ?? b ?? c`, left-associative.
    fn coalesce(&mut self) -> Expr {
        let mut value = self.binary(Precedence::LOWEST);
        let mut links = 0;
        while self.check(TokenKind::NullCoalesce) && self.enter_link(&mut links) {
            self.advance();
            let fallback = self.binary(Precedence::LOWEST);
            value = Expr::NullCoalesce {
                value: Box::new(value),
                fallback: Box::new(fallback),
            };
        }
        self.leave_links(links);
        value
    }

    /// One binary precedence level: a left-associated chain of operands
    /// from the next tighter level. Each link deepens the tree, so each
    /// counts against the nesting limit.
    fn binary(&mut self, level: Precedence) -> Expr {
        let mut left = self.operand(level);
        let mut links = 0;
        while let Some(op) = binary_operator(self.current_token(), level) {
            if !self.enter_link(&mut links) {
                break;
            }
            self.advance();
            let right = self.operand(level);
            left = Expr::binary(op, left, right);
        }
        self.leave_links(links);
        left
    }

    #[inline]
    fn operand(&mut self, level: Precedence) -> Expr {
        match level.next() {
            Some(next) => self.binary(next),
            None => self.unary(),
        }
    }

    fn unary(&mut self) -> Expr {
        let op = match self.kind() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.primary(),
        };
        self.advance();
        let within = self.enter();
        let operand = if within { self.unary() } else { Expr::placeholder() };
        self.leave();
        Expr::unary(op, operand)
    }

    fn primary(&mut self) -> Expr {
        let base = self.primary_base();
        self.postfix(base)
    }

    fn primary_base(&mut self) -> Expr {
        match self.kind() {
            TokenKind::Number => Expr::number(self.advance().lexeme),
            TokenKind::String => Expr::string(self.advance().lexeme),
            TokenKind::FString => {
                let token = self.advance();
                self.interpolated_string(&token)
            }
            TokenKind::True => {
                self.advance();
                Expr::Literal(Literal::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Expr::Literal(Literal::Bool(false))
            }
            TokenKind::Nil => {
                self.advance();
                Expr::Literal(Literal::Nil)
            }
            TokenKind::LBracket => self.array_literal(),
            TokenKind::LBrace => self.map_literal(),
            TokenKind::LParen => self.parenthesized(),
            TokenKind::Ident => self.identifier_expression(),
            // `INPUT(prompt)` reads a line in expression position.
            TokenKind::Input if self.peek_kind(1) == TokenKind::LParen => {
                self.advance();
                self.advance();
                Expr::Call {
                    callee: "INPUT".to_string(),
                    args: self.call_args(),
                }
            }
            TokenKind::Super => self.super_call(),
            TokenKind::Lambda => self.lambda(),
            TokenKind::Match => self.match_expression(),
            TokenKind::Spread => {
                self.advance();
                let within = self.enter();
                let operand = if within { self.unary() } else { Expr::placeholder() };
                self.leave();
                Expr::Spread(Box::new(operand))
            }
            TokenKind::Error => {
                self.invalid_token();
                Expr::placeholder()
            }
            _ => {
                self.error(&EXPRESSION_EXPECTED, &[]);
                Expr::placeholder()
            }
        }
    }

    // ========================================================================
    // Postfix chains
    // ========================================================================

    #[inline]
    pub(crate) fn is_postfix_start(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::LBracket | TokenKind::Dot | TokenKind::NullSafeDot | TokenKind::NullSafeIndex
        )
    }

    /// Chain `[i]`, `.m`, `.m(args)`, `?.m` and `?[i]` onto `expr`.
    pub(crate) fn postfix(&mut self, expr: Expr) -> Expr {
        let mut links = 0;
        let expr = self.postfix_links(expr, &mut links);
        self.leave_links(links);
        expr
    }

    fn postfix_links(&mut self, mut expr: Expr, links: &mut u32) -> Expr {
        loop {
            if !self.is_postfix_start() || !self.enter_link(links) {
                return expr;
            }
            expr = match self.kind() {
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.bracketed_index();
                    Expr::index(expr, index)
                }
                TokenKind::Dot => {
                    self.advance();
                    let Some(member) = self.member_name() else {
                        return expr;
                    };
                    if self.eat(TokenKind::LParen) {
                        Expr::MethodCall {
                            object: Box::new(expr),
                            method: member,
                            args: self.call_args(),
                        }
                    } else {
                        Expr::MemberAccess {
                            object: Box::new(expr),
                            member,
                        }
                    }
                }
                TokenKind::NullSafeDot => {
                    self.advance();
                    let Some(member) = self.member_name() else {
                        return expr;
                    };
                    Expr::NullSafe {
                        object: Box::new(expr),
                        access: NullSafeAccess::Member(member),
                    }
                }
                TokenKind::NullSafeIndex => {
                    self.advance();
                    let index = self.bracketed_index();
                    Expr::NullSafe {
                        object: Box::new(expr),
                        access: NullSafeAccess::Index(Box::new(index)),
                    }
                }
                _ => return expr,
            };
        }
    }

    /// The index expression and closing `]` after an opening bracket.
    fn bracketed_index(&mut self) -> Expr {
        self.skip_newlines();
        let index = self.expression();
        self.skip_newlines_before(&[TokenKind::RBracket]);
        self.expect_token(TokenKind::RBracket);
        index
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Arguments after an opening `(`, through the closing `)`. `name =`
    /// or `name :=` introduces a named argument.
    pub(crate) fn call_args(&mut self) -> CallArgs {
        let mut args = CallArgs::default();
        self.skip_newlines();
        if self.eat(TokenKind::RParen) {
            return args;
        }
        loop {
            self.skip_newlines();
            self.argument_into(&mut args);
            self.skip_newlines_before(&[TokenKind::Comma, TokenKind::RParen]);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect_after(TokenKind::RParen, "arguments");
        args
    }

    /// Comma-separated arguments of a call written without parentheses.
    pub(crate) fn bare_args(&mut self) -> CallArgs {
        let mut args = CallArgs::default();
        loop {
            self.argument_into(&mut args);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        args
    }

    fn argument_into(&mut self, args: &mut CallArgs) {
        if self.check(TokenKind::Ident) && self.at_named_argument() {
            let name = self.advance().lexeme;
            self.advance();
            let value = self.expression();
            args.named.push(NamedArg { name, value });
        } else {
            args.positional.push(self.expression());
        }
    }

    /// The token after the current identifier is `=` or `:=` (not `==`).
    fn at_named_argument(&self) -> bool {
        match self.peek_kind(1) {
            TokenKind::Eq => true,
            TokenKind::TypeInfer => self.peek_lexeme(1) == Some(":="),
            _ => false,
        }
    }

    fn identifier_expression(&mut self) -> Expr {
        let name = self.advance().lexeme;
        if !self.check(TokenKind::LParen) {
            return Expr::Variable(name);
        }
        self.advance();
        let wrap: fn(Box<Expr>) -> Expr = match name.as_str() {
            "TYPEOF" => Expr::TypeOf,
            "GETPROPERTIES" => Expr::GetProperties,
            "GETMETHODS" => Expr::GetMethods,
            _ => {
                return Expr::Call {
                    callee: name,
                    args: self.call_args(),
                }
            }
        };
        let operand = self.expression();
        self.expect_after(TokenKind::RParen, &name);
        wrap(Box::new(operand))
    }

    /// `SUPER.method(args)`
    fn super_call(&mut self) -> Expr {
        self.advance();
        if self.expect_after(TokenKind::Dot, "SUPER").is_none() {
            return Expr::placeholder();
        }
        let Some(method) = self.member_name() else {
            return Expr::placeholder();
        };
        let args = if self.eat(TokenKind::LParen) {
            self.call_args()
        } else {
            CallArgs::default()
        };
        Expr::SuperCall { method, args }
    }

    // ========================================================================
    // Bracketed literals
    // ========================================================================

    /// `(e)` or the tuple `(a, b, ...)`.
    fn parenthesized(&mut self) -> Expr {
        let open = self.mark();
        self.advance();
        self.skip_newlines();
        if self.check(TokenKind::RParen) {
            self.error_at(open, &EMPTY_PARENTHESES, &[]);
            self.advance();
            return Expr::placeholder();
        }
        let first = self.expression();
        self.skip_newlines_before(&[TokenKind::Comma, TokenKind::RParen]);
        if !self.check(TokenKind::Comma) {
            self.expect_token(TokenKind::RParen);
            return first;
        }
        let mut items = vec![first];
        while self.eat(TokenKind::Comma) {
            self.skip_newlines();
            items.push(self.expression());
            self.skip_newlines_before(&[TokenKind::Comma, TokenKind::RParen]);
        }
        self.expect_after(TokenKind::RParen, "tuple elements");
        Expr::TupleLiteral(items)
    }

    /// `[a, b, ...]` or the comprehension `[e FOR v IN xs [IF c]]`.
    fn array_literal(&mut self) -> Expr {
        self.advance();
        self.skip_newlines();
        if self.eat(TokenKind::RBracket) {
            return Expr::ArrayLiteral(Vec::new());
        }
        let first = self.expression();
        self.skip_newlines_before(&[TokenKind::For, TokenKind::Comma, TokenKind::RBracket]);
        if self.eat(TokenKind::For) {
            return self.comprehension(first);
        }
        let mut items = vec![first];
        while self.eat(TokenKind::Comma) {
            self.skip_newlines();
            if self.check(TokenKind::RBracket) {
                break;
            }
            items.push(self.expression());
            self.skip_newlines_before(&[TokenKind::Comma, TokenKind::RBracket]);
        }
        self.expect_after(TokenKind::RBracket, "array elements");
        Expr::ArrayLiteral(items)
    }

    fn comprehension(&mut self, element: Expr) -> Expr {
        let var = self.expect_ident("FOR").unwrap_or_default();
        self.expect_after(TokenKind::In, "comprehension variable");
        let collection = self.expression();
        self.skip_newlines_before(&[TokenKind::If, TokenKind::RBracket]);
        let condition = if self.eat(TokenKind::If) {
            let condition = self.expression();
            self.skip_newlines_before(&[TokenKind::RBracket]);
            Some(Box::new(condition))
        } else {
            None
        };
        self.expect_after(TokenKind::RBracket, "comprehension");
        Expr::ArrayComprehension {
            element: Box::new(element),
            var,
            collection: Box::new(collection),
            condition,
        }
    }

    /// `{key: value, ...}`
    fn map_literal(&mut self) -> Expr {
        self.advance();
        let mut entries = Vec::new();
        self.skip_newlines();
        if self.eat(TokenKind::RBrace) {
            return Expr::MapLiteral(entries);
        }
        loop {
            self.skip_newlines();
            if self.check(TokenKind::RBrace) {
                break;
            }
            let key = self.expression();
            if self.expect_after(TokenKind::Colon, "map key").is_none() {
                break;
            }
            self.skip_newlines();
            let value = self.expression();
            entries.push(MapEntry { key, value });
            self.skip_newlines_before(&[TokenKind::Comma, TokenKind::RBrace]);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect_after(TokenKind::RBrace, "map entries");
        Expr::MapLiteral(entries)
    }

    // ========================================================================
    // LAMBDA and MATCH
    // ========================================================================

    /// `LAMBDA (params) [AS T] <body> END LAMBDA`, or the one-line form
    /// `LAMBDA (params) expr`, which returns `expr`.
    fn lambda(&mut self) -> Expr {
        self.advance();
        let Some(params) = self.param_list() else {
            return Expr::placeholder();
        };
        let return_type = if self.eat(TokenKind::As) {
            self.type_name()
        } else {
            None
        };
        let body = if self.at_line_end() {
            let body = self.block_until(&[TokenKind::EndLambda]);
            self.expect_closer(TokenKind::EndLambda, "LAMBDA");
            body
        } else {
            vec![Stmt::Return(Some(self.expression()))]
        };
        Expr::Lambda {
            params,
            return_type,
            body,
        }
    }

    /// `MATCH v` then `CASE pattern: result` lines, an optional
    /// `CASE ELSE: default`, and `END MATCH`.
    fn match_expression(&mut self) -> Expr {
        self.advance();
        let value = self.expression();
        let mut cases = Vec::new();
        let mut default = None;
        loop {
            self.skip_separators();
            if self.eat_closer(TokenKind::EndMatch) {
                break;
            }
            if !self.eat(TokenKind::Case) {
                self.expect_closer(TokenKind::EndMatch, "MATCH");
                break;
            }
            if self.eat(TokenKind::Else) {
                self.expect_after(TokenKind::Colon, "CASE ELSE");
                self.skip_newlines();
                default = Some(Box::new(self.expression()));
                continue;
            }
            let pattern = self.expression();
            self.expect_after(TokenKind::Colon, "MATCH pattern");
            self.skip_newlines();
            let result = self.expression();
            cases.push(MatchCase { pattern, result });
        }
        Expr::Match {
            value: Box::new(value),
            cases,
            default,
        }
    }

    // ========================================================================
    // Interpolated strings
    // ========================================================================

    /// Split an f-string body into text and embedded expressions. `{{`
    /// and `}}` are literal braces.
    fn interpolated_string(&mut self, token: &Token) -> Expr {
        let chars: Vec<char> = token.lexeme.chars().collect();
        // Source column of each body char. The body starts after `f"` and
        // every `"` in it was written `""`.
        let mut columns = Vec::with_capacity(chars.len() + 1);
        let mut column = token.column + 2;
        for &c in &chars {
            columns.push(column);
            column += if c == '"' { 2 } else { 1 };
        }
        columns.push(column);
        let column_of = |offset: usize| columns[offset];
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '{' if chars.get(i + 1) == Some(&'{') => {
                    text.push('{');
                    i += 2;
                }
                '}' if chars.get(i + 1) == Some(&'}') => {
                    text.push('}');
                    i += 2;
                }
                '}' => {
                    self.diag.report(token.line, column_of(i), &UNMATCHED_CLOSING_BRACE, &[]);
                    text.push('}');
                    i += 1;
                }
                '{' => {
                    let Some(close) = closing_brace(&chars, i + 1) else {
                        self.diag.report(token.line, column_of(i), &UNTERMINATED_INTERPOLATION, &[]);
                        text.extend(&chars[i..]);
                        break;
                    };
                    if !text.is_empty() {
                        parts.push(InterpolationPart::Text(std::mem::take(&mut text)));
                    }
                    let source: String = chars[i + 1..close].iter().collect();
                    if source.trim().is_empty() {
                        self.diag.report(token.line, column_of(i), &EMPTY_INTERPOLATION, &[]);
                    } else {
                        let expr = self.embedded_expression(&source, token.line, &columns[i + 1..=close]);
                        parts.push(InterpolationPart::Expr(expr));
                    }
                    i = close + 1;
                }
                c => {
                    text.push(c);
                    i += 1;
                }
            }
        }
        if !text.is_empty() {
            parts.push(InterpolationPart::Text(text));
        }
        Expr::InterpolatedString(parts)
    }

    /// Lex and parse the text of one `{...}`, with token positions moved to
    /// where the text sits in the enclosing line. `columns[k]` is the source
    /// column of char `k` of `source`, plus one entry for its end.
    fn embedded_expression(&mut self, source: &str, line: u32, columns: &[u32]) -> Expr {
        let end = columns.last().copied().unwrap_or_default();
        let mut tokens = cbasic_lexer::lex(source);
        for token in &mut tokens {
            token.line = line;
            token.column = columns.get(token.column as usize - 1).copied().unwrap_or(end);
        }
        let mut sub = self.sub_parser(tokens);
        let expr = sub.expression();
        if !sub.check(TokenKind::Eof) {
            let found = sub.current_token().describe();
            sub.error(&UNEXPECTED_IN_0, &[&found, "interpolated string"]);
        }
        expr
    }
}

/// Index of the `}` closing a `{` whose body starts at `from`. Braces
/// inside string literals do not count.
fn closing_brace(chars: &[char], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    for (offset, &c) in chars[from..].iter().enumerate() {
        match c {
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                if depth == 0 {
                    return Some(from + offset);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_closing_brace() {
        assert_eq!(closing_brace(&chars("{a}"), 1), Some(2));
        assert_eq!(closing_brace(&chars("{m[{1: 2}]}x"), 1), Some(10));
        assert_eq!(closing_brace(&chars("{\"}\"}"), 1), Some(4));
        assert_eq!(closing_brace(&chars("{abc"), 1), None);
    }
}
