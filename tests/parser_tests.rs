use redex::ast::expression::{Expr, Op};
use redex::ast::pattern::Binding;
use redex::{parse_defs, parse_expr};

#[test]
fn parses_the_prelude() {
    let program = parse_defs(
        "length [] = 0;\n\
         length (_:xs) = 1 + length xs;\n\
         map f [] = [];\n\
         map f (x:xs) = f x : map f xs",
    )
    .unwrap();
    assert_eq!(program.defs.len(), 4);
    assert_eq!(program.defs[3].name, "map");
    assert_eq!(
        program.defs[3].patterns,
        vec![
            Binding::var("f"),
            Binding::cons(Binding::var("x"), Binding::var("xs"))
        ]
    );
}

#[test]
fn parse_errors_carry_a_position() {
    let err = parse_defs("f = )").unwrap_err();
    assert_eq!(err.line(), Some(0));
    assert!(err.column().is_some());

    let err = parse_defs("f =\n  )").unwrap_err();
    assert_eq!(err.line(), Some(1));
}

#[test]
fn trailing_tokens_are_rejected() {
    assert!(parse_expr("1 + 2 )").is_err());
    assert!(parse_expr("1 +").is_err());
}

#[test]
fn pretty_printing_round_trips_through_the_parser() {
    for source in [
        "1 + 2 * 3",
        "f x (g y)",
        "\\x -> x : xs",
        "if a then b else c",
        "[1, 3 .. 9]",
        "[x | x <- xs, x < 3]",
        "let x = 1 in x",
        "(1 +)",
        "(+ 1)",
        "(a, b, c)",
    ] {
        let parsed = parse_expr(source).unwrap();
        let reparsed = parse_expr(&parsed.to_string()).unwrap();
        assert_eq!(parsed, reparsed, "round trip changed {}", source);
    }
}

#[test]
fn operator_precedence_matches_haskell() {
    assert_eq!(
        parse_expr("a && b || c").unwrap(),
        Expr::binary(
            Op::Or,
            Expr::binary(Op::And, Expr::name("a"), Expr::name("b")),
            Expr::name("c")
        )
    );
    assert_eq!(
        parse_expr("x : xs ++ ys").unwrap(),
        Expr::binary(
            Op::Colon,
            Expr::name("x"),
            Expr::binary(Op::Append, Expr::name("xs"), Expr::name("ys"))
        )
    );
}

#[test]
fn character_literals_with_escapes() {
    assert_eq!(parse_expr("'a'").unwrap(), Expr::character('a'));
    assert_eq!(parse_expr("'\\n'").unwrap(), Expr::character('\n'));
    assert_eq!(parse_expr("'\\\\'").unwrap(), Expr::character('\\'));
}

#[test]
fn semicolons_separate_definitions_robustly() {
    let program = parse_defs(";;f = 1;;\ng = 2;").unwrap();
    assert_eq!(program.defs.len(), 2);

    assert!(parse_defs("f = 1 g = 2").is_err());
}

#[test]
fn data_declarations_mix_with_definitions() {
    let program = parse_defs(
        "data Color = Red | Green | Blue;\n\
         favourite = Blue",
    )
    .unwrap();
    assert_eq!(program.adts.len(), 1);
    assert_eq!(program.defs.len(), 1);
    assert_eq!(program.defs[0].body, Expr::constr("Blue"));
}
