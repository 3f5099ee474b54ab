use std::fs;

use sigil_lang::{interpreter::Interpreter, lexer::Lexer, parser::Parser, resolver::Resolver};

fn run_file(path: &str) -> String {
    let source = fs::read_to_string(path).expect("demo file exists");
    let (tokens, errors) = Lexer::new(&source).scan_tokens();
    assert!(errors.is_empty(), "lex errors: {errors:?}");
    let statements = Parser::new(tokens).parse().expect("parse failed");
    let locals = Resolver::new().resolve(&statements).expect("resolve failed");
    let mut interpreter = Interpreter::with_output(Vec::new());
    interpreter
        .interpret(&statements, locals)
        .expect("runtime error");
    String::from_utf8(interpreter.into_output()).expect("utf8 output")
}

#[test]
fn fib() {
    assert_eq!(run_file("./demos/fib.sig"), "6765\n");
}

#[test]
fn counter() {
    assert_eq!(run_file("./demos/counter.sig"), "1\n2\n3\n");
}

#[test]
fn count_to_ten() {
    assert_eq!(
        run_file("./demos/loop.sig"),
        "0\n1\n2\n3\n4\n5\n6\n7\n8\n9\n"
    );
}
