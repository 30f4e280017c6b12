//! Dialect gating tests.
//!
//! The permissive dialect accepts the shorthand forms; the classic
//! dialect parses them, reports one error at the opening keyword, and
//! drops the construct.

use cbasic_ast::*;
use cbasic_diagnostics::Diagnostics;
use cbasic_parser::{parse_source, Dialect, Pragmas};

fn parse(source: &str, dialect: Dialect) -> (Program, Diagnostics) {
    let mut diag = Diagnostics::new();
    let program = parse_source(source, &mut diag, dialect);
    (program, diag)
}

fn assert_classic_rejects(source: &str, construct: &str) {
    let (program, diag) = parse(source, Dialect::Classic);
    let errors: Vec<_> = diag.errors().collect();
    assert_eq!(errors.len(), 1, "{:?}: {:#?}", source, errors);
    assert_eq!(
        errors[0].message,
        format!("{} is only allowed in the permissive dialect", construct)
    );
    assert_eq!(errors[0].line, 1);
    assert_eq!(errors[0].column, 1);
    assert_eq!(errors[0].code, Some(1301));
    assert!(errors[0].suggestion.is_some());
    // Only the trailing PRINT survives.
    assert_eq!(program.statements, vec![Stmt::Print(vec![Expr::number("9")])]);
}

fn assert_permissive_accepts(source: &str) -> Vec<Stmt> {
    let (program, diag) = parse(source, Dialect::Permissive);
    assert!(!diag.has_errors(), "{:?}: {:#?}", source, diag);
    program.statements
}

#[test]
fn test_single_line_if() {
    let source = "IF X > 0 THEN PRINT X\nPRINT 9";
    let stmts = assert_permissive_accepts(source);
    assert_eq!(
        stmts[0],
        Stmt::If {
            branches: vec![IfBranch {
                condition: Expr::binary(BinaryOp::Gt, Expr::var("X"), Expr::number("0")),
                body: vec![Stmt::Print(vec![Expr::var("X")])],
            }],
            else_body: None,
        }
    );
    assert_classic_rejects(source, "single-line IF");
}

#[test]
fn test_single_line_if_with_else_and_colons() {
    let stmts = assert_permissive_accepts("IF X THEN A = 1 : B = 2 ELSE C = 3");
    let assign = |name: &str, n: &str| Stmt::Assign {
        name: name.into(),
        value: Expr::number(n),
    };
    assert_eq!(
        stmts,
        vec![Stmt::If {
            branches: vec![IfBranch {
                condition: Expr::var("X"),
                body: vec![assign("A", "1"), assign("B", "2")],
            }],
            else_body: Some(vec![assign("C", "3")]),
        }]
    );
}

#[test]
fn test_if_without_then() {
    let source = "IF X PRINT X\nPRINT 9";
    assert_eq!(assert_permissive_accepts(source).len(), 2);
    assert_classic_rejects(source, "IF without THEN");
}

#[test]
fn test_multi_line_if_in_both_dialects() {
    let source = "IF X > 0 THEN\n  PRINT X\nELSE\n  PRINT 0\nENDIF";
    let (classic, classic_diag) = parse(source, Dialect::Classic);
    let (permissive, permissive_diag) = parse(source, Dialect::Permissive);
    assert!(classic_diag.is_empty());
    assert!(permissive_diag.is_empty());
    assert_eq!(classic, permissive);
}

#[test]
fn test_do_loop() {
    let source = "DO\n  X = X + 1\n  IF X > 3 THEN\n    EXIT DO\n  ENDIF\nLOOP\nPRINT 9";
    let stmts = assert_permissive_accepts(source);
    match &stmts[0] {
        Stmt::DoLoop { body } => assert_eq!(body.len(), 2),
        other => panic!("expected DO loop, got {:?}", other),
    }
    assert_classic_rejects(source, "DO...LOOP");
}

#[test]
fn test_repeat_until() {
    let source = "REPEAT\n  X = X + 1\nUNTIL X > 3\nPRINT 9";
    let stmts = assert_permissive_accepts(source);
    assert_eq!(
        stmts[0],
        Stmt::RepeatUntil {
            body: vec![Stmt::Assign {
                name: "X".into(),
                value: Expr::binary(BinaryOp::Add, Expr::var("X"), Expr::number("1")),
            }],
            condition: Expr::binary(BinaryOp::Gt, Expr::var("X"), Expr::number("3")),
        }
    );
    assert_classic_rejects(source, "REPEAT...UNTIL");
}

#[test]
fn test_bare_continue() {
    let source = "CONTINUE\nPRINT 9";
    assert_eq!(assert_permissive_accepts(source)[0], Stmt::Continue(None));
    assert_classic_rejects(source, "CONTINUE without a loop keyword");
}

#[test]
fn test_named_continue_is_classic() {
    let (program, diag) = parse("CONTINUE FOR", Dialect::Classic);
    assert!(diag.is_empty());
    assert_eq!(program.statements, vec![Stmt::Continue(Some(BlockKind::For))]);
}

#[test]
fn test_gated_construct_inside_block() {
    // The enclosing WHILE survives; only the inner shorthand is dropped.
    let (program, diag) = parse("WHILE X\n  IF X THEN X = 0\n  PRINT X\nWEND", Dialect::Classic);
    assert_eq!(diag.error_count(), 1);
    assert_eq!(diag.errors().next().unwrap().line, 2);
    assert_eq!(
        program.statements,
        vec![Stmt::While {
            condition: Expr::var("X"),
            body: vec![Stmt::Print(vec![Expr::var("X")])],
        }]
    );
}

#[test]
fn test_pragma_selects_dialect() {
    let source = "#PRAGMA DIALECT CLASSIC\nIF X THEN PRINT X\n";
    let pragmas = Pragmas::scan(source);
    assert_eq!(pragmas.dialect, Some(Dialect::Classic));
    assert_eq!(pragmas.dialect_line, Some(1));

    let dialect = pragmas.dialect.unwrap_or_default();
    let (_, diag) = parse(source, dialect);
    assert_eq!(diag.error_count(), 1);
    // The pragma line is a comment to the parser.
    assert_eq!(diag.errors().next().unwrap().line, 2);
}

#[test]
fn test_dialect_names() {
    assert_eq!("strict".parse::<Dialect>(), Ok(Dialect::Classic));
    assert_eq!("AGK".parse::<Dialect>(), Ok(Dialect::Permissive));
    let err = "cobol".parse::<Dialect>().unwrap_err();
    assert_eq!(err.to_string(), "unknown dialect 'cobol' (expected 'classic' or 'permissive')");
}
