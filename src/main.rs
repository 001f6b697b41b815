use std::process;

use redex::{eval_all, expr_scheme, parse_defs, parse_expr, program_envs, step};

const USAGE: &str = "usage: redex <program-file> <expression> [--type | --all]";

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (file, expr_text, mode) = match args.as_slice() {
        [file, expr] => (file, expr, "steps"),
        [file, expr, flag] if flag == "--type" => (file, expr, "type"),
        [file, expr, flag] if flag == "--all" => (file, expr, "all"),
        _ => {
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };

    let source = std::fs::read_to_string(file)?;
    let program = match parse_defs(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let (eval_env, type_env) = match program_envs(&program) {
        Ok(envs) => envs,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let expr = match parse_expr(expr_text) {
        Ok(expr) => expr,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    match mode {
        "type" => match expr_scheme(&type_env, &expr) {
            Ok(scheme) => println!("{} :: {}", expr, scheme),
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        "all" => println!("{}", eval_all(&eval_env, &expr)),
        _ => {
            // Root-directed reduction chain, one line per step. The cap
            // keeps divergent programs from scrolling forever.
            const MAX_STEPS: usize = 1000;
            let mut current = expr;
            println!("{}", current);
            for _ in 0..MAX_STEPS {
                match step(&eval_env, &[], &current) {
                    Ok(next) => {
                        println!("=> {}", next);
                        current = next;
                    }
                    Err(_) => break,
                }
            }
        }
    }

    Ok(())
}
