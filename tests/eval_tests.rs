use redex::ast::expression::{Expr, Op};
use redex::{defs_to_env, eval_all, parse_defs, parse_expr, program_envs, step, EvalEnv, EvalError};

const PRELUDE: &str = "length [] = 0;\n\
                       length (_:xs) = 1 + length xs;\n\
                       map f [] = [];\n\
                       map f (x:xs) = f x : map f xs";

fn prelude_env() -> EvalEnv {
    defs_to_env(&parse_defs(PRELUDE).unwrap().defs)
}

fn expr(source: &str) -> Expr<()> {
    parse_expr(source).unwrap()
}

#[test]
fn length_first_step_forces_only_the_outermost_cons() {
    let env = prelude_env();
    let result = step(&env, &[], &expr("length [1, 2, 3]")).unwrap();
    assert_eq!(
        result,
        Expr::app(
            Expr::name("length"),
            vec![Expr::binary(
                Op::Colon,
                Expr::int(1),
                Expr::list(vec![Expr::int(2), Expr::int(3)])
            )]
        )
    );
}

#[test]
fn length_second_step_fires_the_cons_clause() {
    let env = prelude_env();
    let once = step(&env, &[], &expr("length [1, 2, 3]")).unwrap();
    let twice = step(&env, &[], &once).unwrap();
    assert_eq!(
        twice,
        Expr::binary(
            Op::Add,
            Expr::int(1),
            Expr::app(
                Expr::name("length"),
                vec![Expr::list(vec![Expr::int(2), Expr::int(3)])]
            )
        )
    );
}

#[test]
fn length_reduces_to_three() {
    let env = prelude_env();
    assert_eq!(eval_all(&env, &expr("length [1, 2, 3]")), Expr::int(3));
}

#[test]
fn map_applies_a_lambda_over_a_list() {
    let env = prelude_env();
    assert_eq!(
        eval_all(&env, &expr("map (\\x -> x * 2) [1, 2, 3]")),
        Expr::list(vec![Expr::int(2), Expr::int(4), Expr::int(6)])
    );
}

#[test]
fn stepped_sequence_expands_fully() {
    let env = prelude_env();
    assert_eq!(
        eval_all(&env, &expr("[1, 3 .. 10]")),
        Expr::list(vec![
            Expr::int(1),
            Expr::int(3),
            Expr::int(5),
            Expr::int(7),
            Expr::int(9)
        ])
    );
}

#[test]
fn bounded_sequence_expands_fully() {
    let env = prelude_env();
    assert_eq!(
        eval_all(&env, &expr("[5 .. 7]")),
        Expr::list(vec![Expr::int(5), Expr::int(6), Expr::int(7)])
    );
}

#[test]
fn char_sequence_is_inclusive() {
    let env = prelude_env();
    assert_eq!(
        eval_all(&env, &expr("['a' .. 'd']")),
        Expr::list(vec![
            Expr::character('a'),
            Expr::character('b'),
            Expr::character('c'),
            Expr::character('d')
        ])
    );
}

#[test]
fn partial_application_wraps_into_a_lambda() {
    let env = prelude_env();
    let result = step(&env, &[], &expr("(\\x y -> x) 1")).unwrap();
    assert_eq!(
        result,
        Expr::lambda(
            vec![redex::ast::pattern::Binding::var("y")],
            Expr::int(1)
        )
    );
}

#[test]
fn division_by_zero_is_reported() {
    let env = prelude_env();
    assert_eq!(
        step(&env, &[], &expr("div 5 0")),
        Err(EvalError::DivByZero)
    );
    assert_eq!(eval_all(&env, &expr("div 7 2")), Expr::int(3));
    assert_eq!(eval_all(&env, &expr("7 `mod` 2")), Expr::int(1));
}

#[test]
fn power_of_a_negative_exponent_is_one() {
    let env = prelude_env();
    assert_eq!(eval_all(&env, &expr("2 ^ (- 3)")), Expr::int(1));
    assert_eq!(eval_all(&env, &expr("2 ^ 10")), Expr::int(1024));
}

#[test]
fn matching_never_forces_what_no_pattern_looks_at() {
    let program = parse_defs("bottom = bottom;\nfirst (a, _) = a").unwrap();
    let env = defs_to_env(&program.defs);
    assert_eq!(eval_all(&env, &expr("first (1, bottom)")), Expr::int(1));
}

#[test]
fn boolean_operators_short_circuit_in_both_directions() {
    let program = parse_defs("bottom = bottom").unwrap();
    let env = defs_to_env(&program.defs);
    assert_eq!(
        eval_all(&env, &expr("False && bottom")),
        Expr::boolean(false)
    );
    assert_eq!(
        eval_all(&env, &expr("bottom || True")),
        Expr::boolean(true)
    );
}

#[test]
fn let_substitutes_into_the_body() {
    let env = prelude_env();
    assert_eq!(eval_all(&env, &expr("let x = 2 in x * x")), Expr::int(4));
    assert_eq!(
        eval_all(&env, &expr("let x = 1; y = 2 in x + y")),
        Expr::int(3)
    );
}

#[test]
fn list_comprehension_filters_and_maps() {
    let env = prelude_env();
    assert_eq!(
        eval_all(&env, &expr("[x * x | x <- [1, 2, 3], x /= 2]")),
        Expr::list(vec![Expr::int(1), Expr::int(9)])
    );
}

#[test]
fn list_comprehension_with_two_generators() {
    let env = prelude_env();
    assert_eq!(
        eval_all(&env, &expr("[(x, y) | x <- [1, 2], y <- [1, 2], x < y]")),
        Expr::list(vec![Expr::ntuple(vec![Expr::int(1), Expr::int(2)])])
    );
}

#[test]
fn constructors_are_matched_by_clauses() {
    let program = parse_defs(
        "data Maybe a = Nothing | Just a;\n\
         fromJust (Just x) = x;\n\
         orElse Nothing d = d;\n\
         orElse (Just x) _ = x",
    )
    .unwrap();
    let (env, _) = program_envs(&program).unwrap();
    assert_eq!(eval_all(&env, &expr("fromJust (Just 5)")), Expr::int(5));
    assert_eq!(eval_all(&env, &expr("orElse Nothing 9")), Expr::int(9));
    assert_eq!(eval_all(&env, &expr("orElse (Just 1) 9")), Expr::int(1));
}

#[test]
fn infix_constructors_build_and_match() {
    let program = parse_defs(
        "data Pair a b = a :*: b;\n\
         swap (x :*: y) = y :*: x",
    )
    .unwrap();
    let (env, _) = program_envs(&program).unwrap();
    assert_eq!(
        eval_all(&env, &expr("swap (1 :*: 2)")),
        Expr::binary(Op::InfixConstr(":*:".to_string()), Expr::int(2), Expr::int(1))
    );
}

#[test]
fn substitution_refuses_name_capture() {
    let program = parse_defs("k y = \\x -> y").unwrap();
    let env = defs_to_env(&program.defs);
    let result = step(&env, &[], &expr("k x"));
    assert_eq!(
        result,
        Err(EvalError::NameCaptureError {
            names: vec!["x".to_string()]
        })
    );
}

#[test]
fn unknown_function_is_reported() {
    let env = prelude_env();
    assert!(matches!(
        step(&env, &[], &expr("ghost 1")),
        Err(EvalError::UnknownFunction { .. })
    ));
}

#[test]
fn no_clause_matches_is_reported() {
    let program = parse_defs("only0 0 = 1").unwrap();
    let env = defs_to_env(&program.defs);
    assert!(matches!(
        step(&env, &[], &expr("only0 5")),
        Err(EvalError::NoMatchingFunction { .. })
    ));
}
