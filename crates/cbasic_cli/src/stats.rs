//! Program summary for `cbasic parse --stats`.

use cbasic_ast::visit::{walk_expr, walk_stmt, Visitor};
use cbasic_ast::{Expr, Program, Stmt};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramStats {
    pub top_level: usize,
    pub statements: usize,
    pub expressions: usize,
    pub procedures: usize,
    pub types: usize,
    pub max_depth: usize,
    #[serde(skip)]
    depth: usize,
}

impl ProgramStats {
    pub fn collect(program: &Program) -> Self {
        let mut stats = Self {
            top_level: program.statements.len(),
            ..Self::default()
        };
        stats.visit_program(program);
        stats
    }
}

impl Visitor for ProgramStats {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        self.statements += 1;
        match stmt {
            Stmt::Sub(_) | Stmt::Function(_) | Stmt::Operator(_) => self.procedures += 1,
            Stmt::Type(_) | Stmt::Enum(_) | Stmt::Union(_) => self.types += 1,
            _ => {}
        }
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        walk_stmt(self, stmt);
        self.depth -= 1;
    }

    fn visit_expr(&mut self, expr: &Expr) {
        self.expressions += 1;
        walk_expr(self, expr);
    }
}

impl fmt::Display for ProgramStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "top-level statements: {}", self.top_level)?;
        writeln!(f, "statements:           {}", self.statements)?;
        writeln!(f, "expressions:          {}", self.expressions)?;
        writeln!(f, "procedures:           {}", self.procedures)?;
        writeln!(f, "types:                {}", self.types)?;
        write!(f, "max block depth:      {}", self.max_depth)
    }
}
