mod common;

use pretty_assertions::assert_eq;

use std::io::{self, Write};

use rox::lox::{Lox, EXIT_RUNTIME_ERROR, EXIT_STATIC_ERROR};

use common::{messages, output_of, run, session};

fn lines(expected: &[&str]) -> Vec<String> {
    expected.iter().map(|s| s.to_string()).collect()
}

#[test]
fn arithmetic_and_printing() {
    assert_eq!(
        output_of("print 1 + 2 * 3; print 7 / 2; print -(4 - 6); print \"a\" + \"b\";"),
        lines(&["7", "3.5", "2", "ab"])
    );
    assert_eq!(output_of("print 1 / 0;"), lines(&["inf"]));
    assert_eq!(output_of("print nil; print true; print !nil;"), lines(&["nil", "true", "true"]));
}

#[test]
fn truthiness_and_equality() {
    assert_eq!(
        output_of(
            "if (0) print \"zero\"; if (\"\") print \"empty\"; if (nil) print \"nil\"; else print \"no\";"
        ),
        lines(&["zero", "empty", "no"])
    );
    assert_eq!(
        output_of("print 1 == 1; print nil == false; print \"1\" == 1; print nil == nil; print 2 != 3;"),
        lines(&["true", "false", "false", "true", "true"])
    );
    // Host float equality: NaN is never equal to itself.
    assert_eq!(
        output_of("var n = 0 / 0; print n == n; print n != n;"),
        lines(&["false", "true"])
    );
}

#[test]
fn logical_operators_yield_operands() {
    assert_eq!(
        output_of("print nil or \"yes\"; print 0 and \"right\"; print false and undefined; print 1 or undefined;"),
        lines(&["yes", "right", "false", "1"])
    );
}

#[test]
fn shadowed_variable_is_restored_after_the_block() {
    assert_eq!(
        output_of("var a = 1; { var a = a + 1; print a; } print a;"),
        lines(&["2", "1"])
    );

    // Shadowing a local from its own initializer is rejected outright.
    let (out, lox) = run("{ var a = 1; { var a = a; print a; } }");
    assert!(out.is_empty());
    assert_eq!(
        messages(&lox),
        lines(&["Can't read local variable in its own initializer."])
    );
}

#[test]
fn native_names_are_known_globals() {
    assert_eq!(
        output_of("{ var clock = clock; print clock; }"),
        lines(&["<native fn>"])
    );
}

#[test]
fn deep_recursion_is_a_runtime_error() {
    // Run on a roomy stack so the limit, not the host, stops the recursion.
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let shallow = output_of(
                "fun count(n) { if (n == 0) return 0; return 1 + count(n - 1); } print count(200);",
            );
            let (out, lox) = run(
                "fun count(n) { if (n == 0) return 0; return 1 + count(n - 1); }\nprint count(100000);\n",
            );
            let error = lox.diagnostics().errors()[0].to_string();
            (shallow, out, error, lox.exit_code())
        })
        .expect("spawn interpreter thread");

    let (shallow, out, error, code) = handle.join().expect("interpreter thread");
    assert_eq!(shallow, lines(&["200"]));
    assert!(out.is_empty());
    assert_eq!(error, "Stack overflow.\n[line 1]");
    assert_eq!(code, EXIT_RUNTIME_ERROR);
}

#[test]
fn failed_print_is_a_runtime_error() {
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let mut lox = Lox::with_output(Box::new(Closed));
    lox.run("print 1;");

    assert!(lox.diagnostics().had_runtime_error());
    assert!(!lox.diagnostics().had_error());
    assert_eq!(lox.exit_code(), EXIT_RUNTIME_ERROR);
}

#[test]
fn for_loop_counts() {
    assert_eq!(
        output_of("for (var i = 0; i < 3; i = i + 1) print i;"),
        lines(&["0", "1", "2"])
    );
    assert_eq!(
        output_of("var i = 0; while (i < 2) { print i; i = i + 1; }"),
        lines(&["0", "1"])
    );
}

#[test]
fn closures_keep_their_own_state() {
    let source = "
        fun makeCounter() {
            var count = 0;
            fun counter() {
                count = count + 1;
                return count;
            }
            return counter;
        }
        var c = makeCounter();
        print c();
        print c();
        var d = makeCounter();
        print d();
    ";
    assert_eq!(output_of(source), lines(&["1", "2", "1"]));
}

#[test]
fn closures_bind_lexically() {
    // The inner function keeps seeing the global `a`, even after a local
    // `a` appears in the same block.
    let source = "
        var a = \"global\";
        {
            fun show() { print a; }
            show();
            var a = \"block\";
            show();
        }
    ";
    assert_eq!(output_of(source), lines(&["global", "global"]));
}

#[test]
fn closures_observe_later_assignments() {
    let source = "
        var x = 1;
        fun get() { return x; }
        x = 2;
        print get();
    ";
    assert_eq!(output_of(source), lines(&["2"]));
}

#[test]
fn recursion_and_return() {
    let source = "
        fun fib(n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        print fib(10);
        fun early() { while (true) { return \"out\"; } }
        print early();
        fun nothing() {}
        print nothing();
    ";
    assert_eq!(output_of(source), lines(&["55", "out", "nil"]));
}

#[test]
fn callables_display() {
    assert_eq!(
        output_of("fun add(a, b) { return a + b; } print add; print clock; print add == add;"),
        lines(&["<fn add>", "<native fn>", "true"])
    );
    assert_eq!(output_of("print clock() > 0;"), lines(&["true"]));
}

#[test]
fn runtime_errors_report_message_and_line() {
    let (out, lox) = run("print 1;\nprint \"a\" + 1;\nprint 2;");
    assert_eq!(out, lines(&["1"]));
    assert_eq!(
        lox.diagnostics().errors()[0].to_string(),
        "Operands must be two numbers or two strings.\n[line 2]"
    );
    assert_eq!(lox.exit_code(), EXIT_RUNTIME_ERROR);

    let cases = [
        ("-\"x\";", "Operand must be a number."),
        ("1 < \"2\";", "Operands must be numbers."),
        ("\"f\"();", "Can only call functions."),
        ("fun f() {} f(1);", "Expected 0 arguments but got 1."),
        ("print y;", "Undefined variable 'y'."),
        ("y = 1;", "Undefined variable 'y'."),
    ];
    for (source, message) in cases {
        let (_, lox) = run(source);
        assert_eq!(messages(&lox), lines(&[message]), "for {:?}", source);
        assert!(lox.diagnostics().had_runtime_error());
    }
}

#[test]
fn session_survives_a_runtime_error() {
    let (mut lox, capture) = session();

    lox.run("var a = \"outer\";");
    lox.run("{ var a = \"inner\"; print nope; }");
    assert!(lox.diagnostics().had_runtime_error());

    // Back in the global scope, with earlier definitions intact.
    lox.diagnostics_mut().reset();
    lox.run("print a;");
    assert_eq!(capture.lines(), lines(&["outer"]));
    assert_eq!(lox.exit_code(), 0);
}

#[test]
fn session_remembers_earlier_lines() {
    let (mut lox, capture) = session();

    lox.run("var n = 2;");
    lox.run("fun twice(x) { var y = x * n; return y; }");
    lox.run("{ var n = n + 1; print twice(n); }");
    lox.run("print twice(5);");

    assert!(lox.diagnostics().errors().is_empty());
    assert_eq!(capture.lines(), lines(&["6", "10"]));
}

#[test]
fn static_errors_prevent_execution() {
    let (out, lox) = run("print 1;\nprint ;");
    assert!(out.is_empty());
    assert_eq!(lox.exit_code(), EXIT_STATIC_ERROR);

    let (out, lox) = run("print 1; { var b = b; }");
    assert!(out.is_empty());
    assert_eq!(
        messages(&lox),
        lines(&["Can't read local variable in its own initializer."])
    );
    assert_eq!(lox.exit_code(), EXIT_STATIC_ERROR);

    let (out, lox) = run("print 1; return 2;");
    assert!(out.is_empty());
    assert_eq!(messages(&lox), lines(&["Can't return from top-level code."]));
}

#[test]
fn lexical_errors_are_reported_before_parsing_continues() {
    let (out, lox) = run("print 1 @ 2;");
    assert!(out.is_empty());
    assert_eq!(
        lox.diagnostics().errors()[0].to_string(),
        "[line 1] Error: Unexpected character: @"
    );
    assert_eq!(lox.exit_code(), EXIT_STATIC_ERROR);
}
