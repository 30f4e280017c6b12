//! AST visitor trait for traversing the syntax tree.
//!
//! `Visitor` has one hook per node category; the default implementations
//! call the matching `walk_*` function, which descends into children. An
//! implementation overrides the hooks it cares about and calls `walk_*`
//! itself to keep descending.

use crate::node::*;

pub trait Visitor {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_param(&mut self, param: &Param) {
        if let Some(ref default) = param.default {
            self.visit_expr(default);
        }
    }

    fn visit_call_args(&mut self, args: &CallArgs) {
        for arg in &args.positional {
            self.visit_expr(arg);
        }
        for named in &args.named {
            self.visit_expr(&named.value);
        }
    }

    fn visit_state(&mut self, state: &StateDecl) {
        walk_state(self, state);
    }
}

pub fn walk_program<V: Visitor + ?Sized>(v: &mut V, program: &Program) {
    walk_block(v, &program.statements);
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, body: &[Stmt]) {
    for stmt in body {
        v.visit_stmt(stmt);
    }
}

fn walk_params<V: Visitor + ?Sized>(v: &mut V, params: &[Param]) {
    for param in params {
        v.visit_param(param);
    }
}

pub fn walk_transition<V: Visitor + ?Sized>(v: &mut V, transition: &Transition) {
    if let Some(ref condition) = transition.condition {
        v.visit_expr(condition);
    }
    if let Some(ref priority) = transition.priority {
        v.visit_expr(priority);
    }
}

pub fn walk_state<V: Visitor + ?Sized>(v: &mut V, state: &StateDecl) {
    if let Some(ref blend) = state.blend {
        v.visit_expr(blend);
    }
    if let Some(ref wait) = state.wait {
        v.visit_expr(wait);
    }
    walk_block(v, &state.body);
    for hook in &state.hooks {
        walk_block(v, &hook.body);
    }
    for transition in &state.transitions {
        walk_transition(v, transition);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::OptionExplicit
        | Stmt::Local(_)
        | Stmt::Global(_)
        | Stmt::Break
        | Stmt::Continue(_)
        | Stmt::Exit(_)
        | Stmt::Goto(_)
        | Stmt::Gosub(_)
        | Stmt::Label(_)
        | Stmt::End
        | Stmt::Import(_)
        | Stmt::Union(_)
        | Stmt::Breakpoint
        | Stmt::EventDecl(_)
        | Stmt::AddState { .. }
        | Stmt::RemoveState { .. }
        | Stmt::EnableState { .. }
        | Stmt::DebugStates(_) => {}

        Stmt::Let { value, .. }
        | Stmt::Const { value, .. }
        | Stmt::Assign { value, .. }
        | Stmt::DestructureAssign { value, .. }
        | Stmt::Throw(value)
        | Stmt::DebugPrint(value)
        | Stmt::Await(value)
        | Stmt::Expr(value) => v.visit_expr(value),

        Stmt::AssignIndex { indices, value, .. } => {
            for index in indices {
                v.visit_expr(index);
            }
            v.visit_expr(value);
        }
        Stmt::AssignMember { object, value, .. } => {
            v.visit_expr(object);
            v.visit_expr(value);
        }
        Stmt::Print(items) | Stmt::PrintC(items) => {
            for item in items {
                v.visit_expr(item);
            }
        }
        Stmt::Call { args, .. } => v.visit_call_args(args),
        Stmt::If { branches, else_body } => {
            for branch in branches {
                v.visit_expr(&branch.condition);
                walk_block(v, &branch.body);
            }
            if let Some(body) = else_body {
                walk_block(v, body);
            }
        }
        Stmt::While { condition, body } => {
            v.visit_expr(condition);
            walk_block(v, body);
        }
        Stmt::DoLoop { body } => walk_block(v, body),
        Stmt::RepeatUntil { body, condition } => {
            walk_block(v, body);
            v.visit_expr(condition);
        }
        Stmt::ForNext {
            start,
            limit,
            step,
            body,
            ..
        } => {
            v.visit_expr(start);
            v.visit_expr(limit);
            if let Some(step) = step {
                v.visit_expr(step);
            }
            walk_block(v, body);
        }
        Stmt::ForEach {
            collection, body, ..
        } => {
            v.visit_expr(collection);
            walk_block(v, body);
        }
        Stmt::Sub(decl) => {
            walk_params(v, &decl.params);
            walk_block(v, &decl.body);
        }
        Stmt::Function(decl) => {
            walk_params(v, &decl.params);
            walk_block(v, &decl.body);
        }
        Stmt::Return(value) | Stmt::Yield(value) => {
            if let Some(value) = value {
                v.visit_expr(value);
            }
        }
        Stmt::Dim { sizes, .. } | Stmt::Redim { sizes, .. } => {
            for size in sizes {
                v.visit_expr(size);
            }
        }
        Stmt::SelectCase { selector, branches } => {
            v.visit_expr(selector);
            for branch in branches {
                if let CaseLabel::Tests(tests) = &branch.label {
                    for test in tests {
                        match test {
                            CaseTest::Value(value) | CaseTest::Is { value, .. } => v.visit_expr(value),
                        }
                    }
                }
                walk_block(v, &branch.body);
            }
        }
        Stmt::TryCatch {
            body,
            catch,
            finally,
        } => {
            walk_block(v, body);
            if let Some(catch) = catch {
                walk_block(v, &catch.body);
            }
            if let Some(finally) = finally {
                walk_block(v, finally);
            }
        }
        Stmt::Type(decl) => walk_block(v, &decl.methods),
        Stmt::Enum(decl) => {
            for member in &decl.members {
                if let Some(ref value) = member.value {
                    v.visit_expr(value);
                }
            }
        }
        Stmt::Module(decl) => walk_block(v, &decl.body),
        Stmt::Operator(decl) => {
            walk_params(v, &decl.params);
            walk_block(v, &decl.body);
        }
        Stmt::Using { value, body, .. } => {
            v.visit_expr(value);
            walk_block(v, body);
        }
        Stmt::Assert { condition, message } => {
            v.visit_expr(condition);
            if let Some(message) = message {
                v.visit_expr(message);
            }
        }
        Stmt::EventHandler { body, .. } | Stmt::OverrideState { body, .. } => walk_block(v, body),
        Stmt::State(state) => v.visit_state(state),
        Stmt::StateHook(hook) => walk_block(v, &hook.body),
        Stmt::Transition(transition) => walk_transition(v, transition),
        Stmt::StateGroup(group) => {
            for state in &group.states {
                v.visit_state(state);
            }
        }
        Stmt::Parallel(states) => {
            for state in states {
                v.visit_state(state);
            }
        }
        Stmt::StateSystem(system) => {
            for state in system
                .states
                .iter()
                .chain(system.groups.iter().flat_map(|g| g.states.iter()))
                .chain(system.parallel.iter().flatten())
            {
                v.visit_state(state);
            }
            for transition in &system.transitions {
                walk_transition(v, transition);
            }
        }
        Stmt::AttachSystem { target, .. } => v.visit_expr(target),
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Literal(_) | Expr::Variable(_) => {}
        Expr::Unary { operand, .. } => v.visit_expr(operand),
        Expr::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        Expr::Call { args, .. } | Expr::SuperCall { args, .. } => v.visit_call_args(args),
        Expr::Index { target, index } => {
            v.visit_expr(target);
            v.visit_expr(index);
        }
        Expr::MemberAccess { object, .. } => v.visit_expr(object),
        Expr::MethodCall { object, args, .. } => {
            v.visit_expr(object);
            v.visit_call_args(args);
        }
        Expr::ArrayLiteral(items) | Expr::TupleLiteral(items) => {
            for item in items {
                v.visit_expr(item);
            }
        }
        Expr::MapLiteral(entries) => {
            for entry in entries {
                v.visit_expr(&entry.key);
                v.visit_expr(&entry.value);
            }
        }
        Expr::InterpolatedString(parts) => {
            for part in parts {
                if let InterpolationPart::Expr(e) = part {
                    v.visit_expr(e);
                }
            }
        }
        Expr::RangeLiteral { start, end } => {
            v.visit_expr(start);
            v.visit_expr(end);
        }
        Expr::Lambda { params, body, .. } => {
            walk_params(v, params);
            walk_block(v, body);
        }
        Expr::Match {
            value,
            cases,
            default,
        } => {
            v.visit_expr(value);
            for case in cases {
                v.visit_expr(&case.pattern);
                v.visit_expr(&case.result);
            }
            if let Some(default) = default {
                v.visit_expr(default);
            }
        }
        Expr::TypeOf(inner) | Expr::GetProperties(inner) | Expr::GetMethods(inner) | Expr::Spread(inner) => {
            v.visit_expr(inner)
        }
        Expr::NullSafe { object, access } => {
            v.visit_expr(object);
            if let NullSafeAccess::Index(index) = access {
                v.visit_expr(index);
            }
        }
        Expr::NullCoalesce { value, fallback } => {
            v.visit_expr(value);
            v.visit_expr(fallback);
        }
        Expr::ArrayComprehension {
            element,
            collection,
            condition,
            ..
        } => {
            v.visit_expr(collection);
            if let Some(condition) = condition {
                v.visit_expr(condition);
            }
            v.visit_expr(element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        stmts: usize,
        exprs: usize,
        variables: Vec<String>,
    }

    impl Visitor for Counter {
        fn visit_stmt(&mut self, stmt: &Stmt) {
            self.stmts += 1;
            walk_stmt(self, stmt);
        }

        fn visit_expr(&mut self, expr: &Expr) {
            self.exprs += 1;
            if let Expr::Variable(name) = expr {
                self.variables.push(name.clone());
            }
            walk_expr(self, expr);
        }
    }

    #[test]
    fn test_walks_nested_bodies() {
        let program = Program::new(vec![Stmt::While {
            condition: Expr::binary(BinaryOp::Lt, Expr::var("I"), Expr::number("10")),
            body: vec![Stmt::Print(vec![Expr::var("I")])],
        }]);
        let mut counter = Counter::default();
        counter.visit_program(&program);
        assert_eq!(counter.stmts, 2);
        assert_eq!(counter.exprs, 4);
        assert_eq!(counter.variables, vec!["I", "I"]);
    }

    #[test]
    fn test_walks_state_system() {
        let state = StateDecl {
            name: "IDLE".into(),
            animation: None,
            blend: None,
            wait: None,
            body: vec![Stmt::Break],
            hooks: vec![StateHook {
                kind: HookKind::Enter,
                body: vec![Stmt::End],
            }],
            transitions: vec![Transition {
                from: "IDLE".into(),
                to: "RUN".into(),
                condition: Some(Expr::var("SPEED")),
                priority: None,
            }],
        };
        let program = Program::new(vec![Stmt::StateSystem(StateSystemDecl {
            name: "PLAYER".into(),
            states: vec![state],
            ..Default::default()
        })]);
        let mut counter = Counter::default();
        counter.visit_program(&program);
        assert_eq!(counter.stmts, 3);
        assert_eq!(counter.variables, vec!["SPEED"]);
    }
}
