use super::parse;
use wl_core::{BinaryOp, ErrorKind, Expr, ForeachKind, Stmt, Type};

fn single_statement(root: &Stmt) -> &Stmt {
    match root {
        Stmt::Sequence { statements } if statements.len() == 1 => &statements[0],
        other => panic!("expected a one-statement program, got {:?}", other),
    }
}

#[test]
fn parses_a_complete_program() {
    let outcome = parse(
        "double x;\n\
         bool armed;\n\
         entity target;\n\
         x := 0;\n\
         while (x < 10) {\n\
             x := x + 1;\n\
         }\n\
         target := searchobj(0);\n\
         if (isworm(target) && !sameteam(target)) {\n\
             fire 30;\n\
         } else {\n\
             toggleweap;\n\
         }\n\
         foreach (food, target) {\n\
             armed := armed || isfood(target);\n\
         }\n\
         print x;\n",
    )
    .expect("program should parse");

    assert_eq!(outcome.variables.len(), 3);
    assert_eq!(
        outcome.variables.get("x").expect("x").ty(),
        Type::Number
    );
    assert_eq!(
        outcome.variables.get("armed").expect("armed").ty(),
        Type::Boolean
    );
    assert_eq!(
        outcome.variables.get("target").expect("target").ty(),
        Type::Entity
    );

    let Stmt::Sequence { statements } = &outcome.root else {
        panic!("root must be a sequence");
    };
    assert_eq!(statements.len(), 6);
    assert!(matches!(statements[1], Stmt::While { .. }));
    assert!(matches!(statements[3], Stmt::If { .. }));
    assert!(matches!(
        statements[4],
        Stmt::ForEach {
            kind: ForeachKind::Food,
            ..
        }
    ));
    assert!(matches!(statements[5], Stmt::Print { .. }));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let outcome = parse("double x; x := 1 + 2 * 3;").expect("parse");
    let Stmt::Assignment { rhs, .. } = single_statement(&outcome.root) else {
        panic!("expected an assignment");
    };
    let Expr::Binary {
        op: BinaryOp::Add,
        rhs: product,
        ..
    } = rhs
    else {
        panic!("expected addition at the top, got {:?}", rhs);
    };
    assert!(matches!(
        **product,
        Expr::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn negation_parses_as_subtraction_from_zero() {
    let outcome = parse("double x; x := -(1 + 2) * 3;").expect("parse");
    let Stmt::Assignment { rhs, .. } = single_statement(&outcome.root) else {
        panic!("expected an assignment");
    };
    let Expr::Binary {
        op: BinaryOp::Mul,
        lhs,
        ..
    } = rhs
    else {
        panic!("expected multiplication at the top, got {:?}", rhs);
    };
    assert!(matches!(
        **lhs,
        Expr::Binary {
            op: BinaryOp::Sub,
            ..
        }
    ));
}

#[test]
fn missing_else_becomes_an_empty_branch() {
    let outcome = parse("double x; if (x < 1) x := 1;").expect("parse");
    let Stmt::If { else_branch, .. } = single_statement(&outcome.root) else {
        panic!("expected an if");
    };
    assert!(matches!(
        **else_branch,
        Stmt::Sequence { ref statements } if statements.is_empty()
    ));
}

#[test]
fn comments_are_ignored() {
    let outcome = parse(
        "double x; // the counter\n\
         x := 1; // set it\n",
    )
    .expect("parse");
    assert!(matches!(
        single_statement(&outcome.root),
        Stmt::Assignment { .. }
    ));
}

#[test]
fn one_parse_reports_every_error() {
    // Three independent problems: a reserved declaration name, an
    // undeclared variable read, and an unknown character.
    let errors = parse(
        "double while;\n\
         print missing;\n\
         skip @;\n",
    )
    .expect_err("must fail");
    assert!(errors.len() >= 3, "got {:?}", errors);
    assert!(errors.iter().any(|error| error.kind == ErrorKind::Syntax));
    assert!(errors.iter().any(|error| error.kind == ErrorKind::Argument));
}

#[test]
fn builder_type_errors_surface_through_parse() {
    let errors = parse("double x; x := 1 + true;").expect_err("must fail");
    assert!(errors.iter().any(|error| error.kind == ErrorKind::Type));
}

#[test]
fn parser_recovers_at_the_next_semicolon() {
    let errors = parse("double x; x := ; x := 2;").expect_err("must fail");
    // The bad statement yields exactly one error; the one after it parses.
    assert_eq!(errors.len(), 1, "got {:?}", errors);
    assert_eq!(errors[0].kind, ErrorKind::Syntax);
}

#[test]
fn foreach_with_an_action_body_is_rejected() {
    let errors = parse("entity e; foreach (worm, e) { skip; }").expect_err("must fail");
    assert!(errors.iter().any(|error| error.kind == ErrorKind::Argument));
}

#[test]
fn duplicate_declarations_are_reported_with_a_position() {
    let errors = parse("double x;\ndouble x;\nx := 1;").expect_err("must fail");
    assert_eq!(errors.len(), 1, "got {:?}", errors);
    assert_eq!(errors[0].kind, ErrorKind::Argument);
    assert_eq!(errors[0].pos.map(|pos| pos.line), Some(2));
}

#[test]
fn error_positions_point_at_the_offending_token() {
    let errors = parse("double x;\nx := nope;").expect_err("must fail");
    assert_eq!(errors.len(), 1, "got {:?}", errors);
    let pos = errors[0].pos.expect("position");
    assert_eq!(pos.line, 2);
    assert_eq!(pos.column, 6);
}
