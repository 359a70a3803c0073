mod common;

use pretty_assertions::assert_eq;

use rox::ast::{Expr, Stmt};
use rox::ast_printer::AstPrinter;

use common::parse;

fn printed(source: &str) -> String {
    let (statements, diagnostics) = parse(source);
    assert!(
        !diagnostics.had_error(),
        "unexpected errors: {:?}",
        diagnostics.errors()
    );
    AstPrinter::print_program(&statements)
}

fn error_strings(source: &str) -> Vec<String> {
    let (_, diagnostics) = parse(source);
    diagnostics.errors().iter().map(|e| e.to_string()).collect()
}

#[test]
fn precedence_levels_nest_innermost_first() {
    assert_eq!(
        printed("print 1 + 2 * 3 - -4 / (5);"),
        "(print (- (+ 1.0 (* 2.0 3.0)) (/ (- 4.0) (group 5.0))))"
    );
    assert_eq!(
        printed("print a or b and c == d < e;"),
        "(print (or a (and b (== c (< d e)))))"
    );
    assert_eq!(printed("!!true;"), "(; (! (! true)))");
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(printed("a = b = 1;"), "(; (= a (= b 1.0)))");
}

#[test]
fn calls_chain_and_take_arguments() {
    assert_eq!(
        printed("f(1, \"two\")(g());"),
        "(; (call (call f 1.0 two) (call g)))"
    );
}

#[test]
fn declarations_and_control_flow() {
    assert_eq!(
        printed("var a; var b = nil; if (a) print 1; else { print 2; } while (false) b = a;"),
        "(var a)\n(var b nil)\n(if a (print 1.0) (block (print 2.0)))\n(while false (; (= b a)))"
    );
    assert_eq!(
        printed("fun add(x, y) { return x + y; } fun f() { return; }"),
        "(fun add (x y) (return (+ x y)))\n(fun f () (return))"
    );
}

#[test]
fn for_desugars_into_while() {
    assert_eq!(
        printed("for (var i = 0; i < 3; i = i + 1) print i;"),
        "(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
    );
    // No initializer: no outer block.  No increment: body untouched.
    assert_eq!(printed("for (; x;) print x;"), "(while x (print x))");
    // Missing condition defaults to `true`.
    assert_eq!(printed("for (;;) f();"), "(while true (; (call f)))");
    assert_eq!(
        printed("for (i = 0;;) {}"),
        "(block (; (= i 0.0)) (while true (block)))"
    );
}

#[test]
fn variable_nodes_get_distinct_ids() {
    let (statements, _) = parse("a; a;");
    let ids: Vec<_> = statements
        .iter()
        .map(|stmt| match stmt {
            Stmt::Expression(Expr::Variable { id, .. }) => *id,
            other => panic!("unexpected statement {:?}", other),
        })
        .collect();
    assert_ne!(ids[0], ids[1]);
}

#[test]
fn missing_primary_is_an_error() {
    assert_eq!(
        error_strings("print ;"),
        vec!["[line 1] Error at ';': Expect expression.".to_string()]
    );
    assert_eq!(
        error_strings("print 1"),
        vec!["[line 1] Error at end: Expect ';' after value.".to_string()]
    );
}

#[test]
fn invalid_assignment_target_does_not_panic_the_parser() {
    let (statements, diagnostics) = parse("1 = 2; print 3;");
    assert_eq!(
        diagnostics
            .errors()
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>(),
        vec!["[line 1] Error at '=': Invalid assignment target.".to_string()]
    );
    // Both statements survive: no tokens were skipped.
    assert_eq!(statements.len(), 2);
    assert_eq!(AstPrinter::print_stmt(&statements[1]), "(print 3.0)");
}

#[test]
fn too_many_arguments_is_reported_but_parsed() {
    let args = vec!["1"; 256].join(", ");
    let (statements, diagnostics) = parse(&format!("f({});", args));

    assert_eq!(diagnostics.errors().len(), 1);
    assert_eq!(
        diagnostics.errors()[0].message(),
        "Can't have more than 255 arguments."
    );
    match &statements[0] {
        Stmt::Expression(Expr::Call { arguments, .. }) => assert_eq!(arguments.len(), 256),
        other => panic!("expected call, got {:?}", other),
    }

    let params = (0..256).map(|i| format!("p{}", i)).collect::<Vec<_>>().join(", ");
    let (_, diagnostics) = parse(&format!("fun f({}) {{}}", params));
    assert_eq!(
        diagnostics.errors()[0].message(),
        "Can't have more than 255 parameters."
    );
}

#[test]
fn recovery_resumes_at_the_next_statement() {
    let (statements, diagnostics) = parse("var = 1;\nprint 2;\nvar x = (;\nfun ok() {}");

    assert_eq!(
        diagnostics
            .errors()
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>(),
        vec![
            "[line 1] Error at '=': Expect variable name.".to_string(),
            "[line 3] Error at ';': Expect expression.".to_string(),
        ]
    );
    assert_eq!(
        AstPrinter::print_program(&statements),
        "(print 2.0)\n(fun ok ())"
    );
}

#[test]
fn recovery_inside_a_block_keeps_the_rest_of_the_block() {
    let (statements, diagnostics) = parse("{ print 1; print ); print 3; }");

    assert_eq!(diagnostics.errors().len(), 1);
    assert_eq!(
        AstPrinter::print_program(&statements),
        "(block (print 1.0) (print 3.0))"
    );
}

#[test]
fn class_keyword_is_not_a_statement() {
    let (statements, diagnostics) = parse("class Foo {} print 1;");
    assert!(diagnostics.had_error());
    assert_eq!(AstPrinter::print_program(&statements), "(print 1.0)");
}
