use sigil_lang::{interpreter::Interpreter, lexer::Lexer, parser::Parser, resolver::Resolver};

fn run(source: &str) -> String {
    let (tokens, errors) = Lexer::new(source).scan_tokens();
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
fn closure_keeps_its_declaration_environment_alive() {
    let source = "\
ƒ mk() { • i ← 0; ƒ inc() { i ← i + 1; ↵ i; } ↵ inc; }
• c ← mk(); ✉ c(); ✉ c(); ✉ c();";
    assert_eq!(run(source), "1\n2\n3\n");
}

#[test]
fn separate_calls_capture_separate_environments() {
    let source = "\
ƒ mk() { • i ← 0; ƒ inc() { i ← i + 1; ↵ i; } ↵ inc; }
• a ← mk();
• b ← mk();
✉ a(); ✉ a(); ✉ b();";
    assert_eq!(run(source), "1\n2\n1\n");
}

#[test]
fn capture_follows_scope_not_call_site() {
    let source = "\
• x ← \"global\";
{
    ƒ show() { ✉ x; }
    show();
    • x ← \"block\";
    show();
}";
    // show resolved x before the block declared its own; both calls see the
    // global.
    assert_eq!(run(source), "global\nglobal\n");
}

#[test]
fn two_closures_share_one_captured_variable() {
    let source = "\
ƒ mk() {
    • i ← 0;
    ƒ inc() { i ← i + 1; ↵ i; }
    ƒ get() { ↵ i; }
    inc();
    ✉ get();
    inc();
    ✉ get();
}
mk();";
    assert_eq!(run(source), "1\n2\n");
}
