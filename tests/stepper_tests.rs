use redex::ast::expression::{Expr, Op};
use redex::eval::PathStep;
use redex::{defs_to_env, eval_all, parse_defs, parse_expr, step, EvalEnv, EvalError};

fn env() -> EvalEnv {
    let program = parse_defs(
        "length [] = 0;\n\
         length (_:xs) = 1 + length xs;\n\
         inc x = x + 1;\n\
         double x = x * 2",
    )
    .unwrap();
    defs_to_env(&program.defs)
}

fn expr(source: &str) -> Expr<()> {
    parse_expr(source).unwrap()
}

#[test]
fn path_selects_the_condition_of_an_if() {
    let result = step(&env(), &[PathStep::Fst], &expr("if 1 == 1 then 1 else 2")).unwrap();
    assert_eq!(
        result,
        Expr::if_expr(Expr::boolean(true), Expr::int(1), Expr::int(2))
    );
}

#[test]
fn path_selects_an_application_argument() {
    let result = step(&env(), &[PathStep::Nth(0)], &expr("length (length [])")).unwrap();
    assert_eq!(
        result,
        Expr::app(Expr::name("length"), vec![Expr::int(0)])
    );
}

#[test]
fn path_selects_operands_of_a_binary_node() {
    let start = expr("(1 + 2) * (3 + 4)");
    let left = step(&env(), &[PathStep::Fst], &start).unwrap();
    assert_eq!(
        left,
        Expr::binary(
            Op::Mul,
            Expr::int(3),
            Expr::binary(Op::Add, Expr::int(3), Expr::int(4))
        )
    );
    let right = step(&env(), &[PathStep::Snd], &start).unwrap();
    assert_eq!(
        right,
        Expr::binary(
            Op::Mul,
            Expr::binary(Op::Add, Expr::int(1), Expr::int(2)),
            Expr::int(7)
        )
    );
}

#[test]
fn nested_paths_descend_several_levels() {
    // Step the `1 + 2` inside the list inside the application.
    let start = expr("length [1 + 2]");
    let result = step(&env(), &[PathStep::Nth(0), PathStep::Nth(0)], &start).unwrap();
    assert_eq!(
        result,
        Expr::app(
            Expr::name("length"),
            vec![Expr::list(vec![Expr::int(3)])]
        )
    );
}

#[test]
fn invalid_navigation_is_a_path_error() {
    assert!(matches!(
        step(&env(), &[PathStep::Thrd], &expr("1 + 2")),
        Err(EvalError::PathError { .. })
    ));
}

#[test]
fn out_of_range_child_is_an_index_error() {
    assert_eq!(
        step(&env(), &[PathStep::Nth(5)], &expr("[1, 2]")),
        Err(EvalError::IndexError { index: 5, len: 2 })
    );
}

#[test]
fn composition_rewrites_to_nested_application() {
    let result = step(&env(), &[], &expr("(inc . double) 1")).unwrap();
    assert_eq!(
        result,
        Expr::app(
            Expr::name("inc"),
            vec![Expr::app(Expr::name("double"), vec![Expr::int(1)])]
        )
    );
    assert_eq!(eval_all(&env(), &expr("(inc . double) 1")), Expr::int(3));
}

#[test]
fn sections_apply_their_missing_operand() {
    assert_eq!(step(&env(), &[], &expr("(1 +) 2")), Ok(Expr::int(3)));
    assert_eq!(step(&env(), &[], &expr("(+ 1) 2")), Ok(Expr::int(3)));
    assert_eq!(step(&env(), &[], &expr("(+) 1 2")), Ok(Expr::int(3)));
}

#[test]
fn dollar_becomes_plain_application() {
    assert_eq!(
        step(&env(), &[], &expr("inc $ 1")),
        Ok(Expr::app(Expr::name("inc"), vec![Expr::int(1)]))
    );
}

#[test]
fn eval_all_reaches_a_fixpoint_of_step() {
    for source in [
        "length [1, 2, 3]",
        "[1, 3 .. 10]",
        "(inc . double) 10",
        "let x = 1 in x + x",
    ] {
        let value = eval_all(&env(), &expr(source));
        assert!(
            step(&env(), &[], &value).is_err(),
            "{} still steps at the root",
            source
        );
        assert_eq!(eval_all(&env(), &value), value, "{} not a fixpoint", source);
    }
}

#[test]
fn failed_steps_leave_the_expression_intact() {
    // The caller keeps its expression; a failed step only returns the error.
    let start = expr("length [1]");
    let _ = step(&env(), &[PathStep::Thrd], &start);
    assert_eq!(start, expr("length [1]"));
}

#[test]
fn zero_argument_definitions_step_by_name() {
    let program = parse_defs("answer = 40 + 2").unwrap();
    let env = defs_to_env(&program.defs);
    assert_eq!(
        step(&env, &[], &expr("answer")),
        Ok(Expr::binary(Op::Add, Expr::int(40), Expr::int(2)))
    );
}
