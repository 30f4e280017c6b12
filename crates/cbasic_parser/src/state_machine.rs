//! State machine and event declarations.

use cbasic_ast::*;
use cbasic_diagnostics::messages::*;

use crate::parser::Parser;

fn hook_kind(kind: TokenKind) -> Option<HookKind> {
    match kind {
        TokenKind::Enter => Some(HookKind::Enter),
        TokenKind::Exit => Some(HookKind::Exit),
        TokenKind::Update => Some(HookKind::Update),
        _ => None,
    }
}

impl<'d> Parser<'d> {
    /// `ON ENTER|EXIT|UPDATE ... END ON` or `ON <event> <handler> ... END ON`.
    pub(crate) fn on_statement(&mut self) -> Option<Stmt> {
        if hook_kind(self.peek_kind(1)).is_some() {
            return self.state_hook().map(Stmt::StateHook);
        }
        self.advance();
        let event = self.expect_ident("ON")?;
        let name = self.expect_ident("event name")?;
        let body = self.block_until(&[TokenKind::EndOn]);
        if !self.expect_closer(TokenKind::EndOn, "ON") {
            return None;
        }
        Some(Stmt::EventHandler { event, name, body })
    }

    fn state_hook(&mut self) -> Option<StateHook> {
        self.advance();
        let Some(kind) = hook_kind(self.kind()) else {
            self.error(&_0_EXPECTED_AFTER_1, &["ENTER, EXIT or UPDATE", "ON"]);
            return None;
        };
        self.advance();
        let body = self.block_until(&[TokenKind::EndOn]);
        if !self.expect_closer(TokenKind::EndOn, "ON") {
            return None;
        }
        Some(StateHook { kind, body })
    }

    /// `STATE name [ANIMATION "a"] [BLEND n] [WAIT n]`, then statements,
    /// hooks and transitions, then `END STATE`.
    pub(crate) fn state_declaration(&mut self) -> Option<StateDecl> {
        self.advance();
        let name = self.expect_ident("STATE");
        let mut header_ok = name.is_some();
        let mut state = StateDecl {
            name: name.unwrap_or_default(),
            animation: None,
            blend: None,
            wait: None,
            body: Vec::new(),
            hooks: Vec::new(),
            transitions: Vec::new(),
        };
        if header_ok {
            header_ok = self.state_attributes(&mut state);
        }
        if !header_ok {
            self.skip_to_separator();
        }

        loop {
            self.skip_separators();
            if self.eat_closer(TokenKind::EndState) {
                break;
            }
            if self.check(TokenKind::Eof) || self.closer_at_current().is_some() {
                self.expect_closer(TokenKind::EndState, "STATE");
                return None;
            }
            let start = self.mark();
            let parsed = match self.kind() {
                TokenKind::On if hook_kind(self.peek_kind(1)).is_some() => {
                    self.state_hook().map(|hook| state.hooks.push(hook)).is_some()
                }
                TokenKind::Transition => self
                    .transition()
                    .map(|transition| state.transitions.push(transition))
                    .is_some(),
                _ => self.statement_into(&mut state.body),
            };
            if parsed {
                self.finish_statement();
            } else {
                self.synchronize(start);
            }
        }
        header_ok.then_some(state)
    }

    fn state_attributes(&mut self, state: &mut StateDecl) -> bool {
        while self.check(TokenKind::Ident) {
            match self.current_token().lexeme.as_str() {
                "ANIMATION" => {
                    self.advance();
                    match self.expect_after(TokenKind::String, "ANIMATION") {
                        Some(token) => state.animation = Some(token.lexeme),
                        None => return false,
                    }
                }
                "BLEND" => {
                    self.advance();
                    state.blend = Some(self.expression());
                }
                "WAIT" => {
                    self.advance();
                    state.wait = Some(self.expression());
                }
                _ => break,
            }
        }
        true
    }

    /// `TRANSITION a TO b [WHEN cond] [PRIORITY n]`
    pub(crate) fn transition(&mut self) -> Option<Transition> {
        self.advance();
        let from = self.expect_ident("TRANSITION")?;
        self.expect_after(TokenKind::To, "transition source")?;
        let to = self.expect_ident("TO")?;
        let condition = if self.check(TokenKind::Ident) && self.current_token().lexeme == "WHEN" {
            self.advance();
            Some(self.expression())
        } else {
            None
        };
        let priority = self.eat(TokenKind::Priority).then(|| self.expression());
        Some(Transition {
            from,
            to,
            condition,
            priority,
        })
    }

    /// `GROUP name` then states, then `END GROUP`.
    pub(crate) fn state_group(&mut self) -> Option<StateGroup> {
        self.advance();
        let name = self.expect_ident("GROUP");
        if name.is_none() {
            self.skip_to_separator();
        }
        let states = self.state_list(TokenKind::EndGroup, "GROUP");
        Some(StateGroup { name: name?, states: states? })
    }

    /// `PARALLEL` then states, then `END PARALLEL`.
    pub(crate) fn parallel_block(&mut self) -> Option<Vec<StateDecl>> {
        self.advance();
        self.state_list(TokenKind::EndParallel, "PARALLEL")
    }

    /// States up to `closer`. A state that fails is dropped and the list
    /// carries on with the next one.
    fn state_list(&mut self, closer: TokenKind, opener: &str) -> Option<Vec<StateDecl>> {
        let mut states = Vec::new();
        loop {
            self.skip_separators();
            if self.eat_closer(closer) {
                break;
            }
            if self.check(TokenKind::State) {
                let start = self.mark();
                match self.state_declaration() {
                    Some(state) => {
                        states.push(state);
                        self.finish_statement();
                    }
                    None => self.synchronize(start),
                }
                continue;
            }
            if self.check(TokenKind::Eof) || self.closer_at_current().is_some() {
                self.expect_closer(closer, opener);
                return None;
            }
            let found = self.current_token().describe();
            self.error(&UNEXPECTED_IN_0, &[&found, opener]);
            self.advance();
            self.skip_to_separator();
        }
        Some(states)
    }

    /// `DEFINE STATE SYSTEM name` then states, groups, parallel blocks
    /// and transitions, then `END SYSTEM`. Members recover one at a time.
    pub(crate) fn state_system(&mut self) -> Option<StateSystemDecl> {
        self.advance();
        let name = self.state_system_header();
        if name.is_none() {
            self.skip_to_separator();
        }
        let mut system = StateSystemDecl::default();
        loop {
            self.skip_separators();
            if self.eat_closer(TokenKind::EndSystem) {
                break;
            }
            let start = self.mark();
            let parsed = match self.kind() {
                TokenKind::State => self.state_declaration().map(|s| system.states.push(s)).is_some(),
                TokenKind::Group => self.state_group().map(|g| system.groups.push(g)).is_some(),
                TokenKind::Parallel => self.parallel_block().map(|p| system.parallel.push(p)).is_some(),
                TokenKind::Transition => self.transition().map(|t| system.transitions.push(t)).is_some(),
                TokenKind::Eof => {
                    self.expect_closer(TokenKind::EndSystem, "DEFINE STATE SYSTEM");
                    return None;
                }
                _ if self.closer_at_current().is_some() => {
                    self.expect_closer(TokenKind::EndSystem, "DEFINE STATE SYSTEM");
                    return None;
                }
                _ => {
                    let found = self.current_token().describe();
                    self.error(&UNEXPECTED_IN_0, &[&found, "DEFINE STATE SYSTEM"]);
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
        system.name = name?;
        Some(system)
    }

    fn state_system_header(&mut self) -> Option<String> {
        self.expect_after(TokenKind::State, "DEFINE")?;
        self.expect_after(TokenKind::System, "DEFINE STATE")?;
        self.expect_ident("SYSTEM")
    }

    /// `ATTACH SYSTEM s TO target`
    pub(crate) fn attach_statement(&mut self) -> Option<Stmt> {
        self.advance();
        self.expect_after(TokenKind::System, "ATTACH")?;
        let system = self.expect_ident("SYSTEM")?;
        self.expect_after(TokenKind::To, "system name")?;
        let target = self.expression();
        Some(Stmt::AttachSystem { system, target })
    }

    /// `ADD STATE s TO sys` or `REMOVE STATE s FROM sys`.
    pub(crate) fn add_remove_state(&mut self) -> Option<Stmt> {
        let adding = self.advance().lexeme == "ADD";
        self.advance();
        let state = self.expect_ident("STATE")?;
        if adding {
            self.expect_after(TokenKind::To, "state name")?;
            let system = self.expect_ident("TO")?;
            Some(Stmt::AddState { state, system })
        } else {
            self.expect_after(TokenKind::From, "state name")?;
            let system = self.expect_ident("FROM")?;
            Some(Stmt::RemoveState { state, system })
        }
    }

    /// `ENABLE STATE s` or `DISABLE STATE s`.
    pub(crate) fn enable_statement(&mut self) -> Option<Stmt> {
        let keyword = self.advance();
        self.expect_after(TokenKind::State, &keyword.lexeme)?;
        let state = self.expect_ident("STATE")?;
        Some(Stmt::EnableState {
            state,
            enabled: keyword.kind == TokenKind::Enable,
        })
    }

    /// `OVERRIDE STATE s ... END STATE`
    pub(crate) fn override_statement(&mut self) -> Option<Stmt> {
        self.advance();
        self.expect_after(TokenKind::State, "OVERRIDE")?;
        let state = self.expect_ident("STATE")?;
        let body = self.block_until(&[TokenKind::EndState]);
        if !self.expect_closer(TokenKind::EndState, "OVERRIDE STATE") {
            return None;
        }
        Some(Stmt::OverrideState { state, body })
    }
}
