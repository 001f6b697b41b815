use redex::ast::expression::Expr;
use redex::types::ty::Type;
use redex::{
    build_type_env, defs_to_env, expr_scheme, parse_defs, parse_expr, program_envs, step,
    type_tree, type_tree_partial, TypeEnv, TypeError,
};

const PRELUDE: &str = "length [] = 0;\n\
                       length (_:xs) = 1 + length xs;\n\
                       map f [] = [];\n\
                       map f (x:xs) = f x : map f xs";

fn prelude_type_env() -> TypeEnv {
    let program = parse_defs(PRELUDE).unwrap();
    build_type_env(&TypeEnv::empty(), &program.defs).unwrap()
}

fn expr(source: &str) -> Expr<()> {
    parse_expr(source).unwrap()
}

#[test]
fn prelude_definitions_get_their_classic_schemes() {
    let env = prelude_type_env();
    assert_eq!(env.lookup("length").unwrap().ty.pretty(), "[a] -> Int");
    assert_eq!(
        env.lookup("map").unwrap().ty.pretty(),
        "(a -> b) -> [a] -> [b]"
    );
}

#[test]
fn identity_lambda_is_polymorphic() {
    let env = prelude_type_env();
    let scheme = expr_scheme(&env, &expr("\\x -> x")).unwrap();
    assert_eq!(scheme.ty.pretty(), "a -> a");
}

#[test]
fn increment_lambda_is_monomorphic() {
    let env = prelude_type_env();
    let scheme = expr_scheme(&env, &expr("\\x -> x + 1")).unwrap();
    assert_eq!(scheme.ty.pretty(), "Int -> Int");
}

#[test]
fn fully_typed_trees_carry_a_type_on_every_node() {
    let env = prelude_type_env();
    let typed = type_tree(&env, &expr("length [1, 2]")).unwrap();
    fn check(node: &Expr<Option<Type>>) {
        assert!(node.meta().is_some(), "untyped node in {:?}", node);
        for child in node.children() {
            check(child);
        }
    }
    check(&typed);
}

#[test]
fn partial_typing_marks_the_failing_ancestor_only() {
    let env = prelude_type_env();
    let typed = type_tree_partial(&env, &expr("if 1 then 2 else 3"));
    match &typed {
        Expr::IfExpr {
            cond,
            then_branch,
            else_branch,
            info,
        } => {
            match info {
                Some(Type::TypeError(err)) => {
                    assert_eq!(
                        **err,
                        TypeError::unification_fail(Type::int(), Type::boolean())
                    );
                }
                other => panic!("expected a localised error, got {:?}", other),
            }
            assert_eq!(cond.meta(), &Some(Type::int()));
            assert_eq!(then_branch.meta(), &Some(Type::int()));
            assert_eq!(else_branch.meta(), &Some(Type::int()));
        }
        other => panic!("unexpected shape: {:?}", other),
    }
}

#[test]
fn partial_typing_never_fails_outward() {
    let env = prelude_type_env();
    // Unbound variable, enum abuse, self-application: always a tree.
    for source in ["ghost", "[[1] ..]", "\\x -> x x", "length 5"] {
        let _ = type_tree_partial(&env, &expr(source));
    }
}

#[test]
fn stepping_preserves_the_scheme() {
    let program = parse_defs(PRELUDE).unwrap();
    let eval_env = defs_to_env(&program.defs);
    let type_env = prelude_type_env();

    for source in [
        "length [1, 2, 3]",
        "map (\\x -> x * 2) [1, 2]",
        "if True then 1 else 2",
        "[1 .. 3]",
    ] {
        let mut current = expr(source);
        let scheme = expr_scheme(&type_env, &current).unwrap();
        for _ in 0..20 {
            match step(&eval_env, &[], &current) {
                Ok(next) => current = next,
                Err(_) => break,
            }
            let stepped_scheme = expr_scheme(&type_env, &current).unwrap();
            assert_eq!(
                scheme.ty.pretty(),
                stepped_scheme.ty.pretty(),
                "scheme changed while stepping {}",
                source
            );
        }
    }
}

#[test]
fn demand_driven_ordering_resolves_forward_references() {
    let program = parse_defs("double x = twice x;\ntwice x = x + x").unwrap();
    let env = build_type_env(&TypeEnv::empty(), &program.defs).unwrap();
    assert_eq!(env.lookup("double").unwrap().ty.pretty(), "Int -> Int");
    assert_eq!(env.lookup("twice").unwrap().ty.pretty(), "Int -> Int");
}

#[test]
fn constructors_type_like_functions() {
    let program = parse_defs("data Maybe a = Nothing | Just a").unwrap();
    let (_, type_env) = program_envs(&program).unwrap();
    assert_eq!(
        expr_scheme(&type_env, &expr("Just 5")).unwrap().ty.pretty(),
        "Maybe Int"
    );
    assert_eq!(
        expr_scheme(&type_env, &expr("Nothing")).unwrap().ty.pretty(),
        "Maybe a"
    );
    assert_eq!(
        expr_scheme(&type_env, &expr("Just")).unwrap().ty.pretty(),
        "a -> Maybe a"
    );
}

#[test]
fn constructor_patterns_refine_clause_types() {
    let program = parse_defs(
        "data Maybe a = Nothing | Just a;\n\
         fromMaybe d Nothing = d;\n\
         fromMaybe _ (Just x) = x",
    )
    .unwrap();
    let (_, type_env) = program_envs(&program).unwrap();
    assert_eq!(
        type_env.lookup("fromMaybe").unwrap().ty.pretty(),
        "a -> Maybe a -> a"
    );
}

#[test]
fn conflicting_pattern_variables_are_rejected() {
    let program = parse_defs("bad x x = x").unwrap();
    let result = build_type_env(&TypeEnv::empty(), &program.defs);
    assert_eq!(
        result,
        Err(TypeError::unknown("Conflicting definitions for 'x'"))
    );
}

#[test]
fn unknown_constructor_is_reported() {
    let env = prelude_type_env();
    assert_eq!(
        expr_scheme(&env, &expr("Foo 1")),
        Err(TypeError::unknown_data_constructor("Foo"))
    );
}

#[test]
fn sequences_over_non_enumerable_types_are_rejected() {
    let env = prelude_type_env();
    assert!(matches!(
        expr_scheme(&env, &expr("[[1] ..]")),
        Err(TypeError::NoInstanceOfEnum { .. })
    ));
    assert_eq!(
        expr_scheme(&env, &expr("['a' .. 'z']")).unwrap().ty.pretty(),
        "[Char]"
    );
}

#[test]
fn errors_are_canonically_renamed() {
    let env = prelude_type_env();
    // map True does not apply: the function slot wants a function type.
    let err = expr_scheme(&env, &expr("map 1 []")).unwrap_err();
    match err {
        TypeError::UnificationFail { expected, found } => {
            for ty in [expected, found] {
                for var in ty.free_type_vars() {
                    assert!(var.name.is_some(), "unrenamed variable in error");
                }
            }
        }
        other => panic!("expected a unification failure, got {:?}", other),
    }
}
