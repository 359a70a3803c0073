#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::ast::Stmt;
use rox::diagnostics::Diagnostics;
use rox::lox::Lox;
use rox::parser::Parser;
use rox::scanner::Scanner;

/// `Write` sink whose contents stay readable after the interpreter owns it.
#[derive(Clone, Default)]
pub struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("utf-8 output")
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A session wired to a capture buffer.
pub fn session() -> (Lox, Capture) {
    let capture = Capture::default();
    let lox = Lox::with_output(Box::new(capture.clone()));
    (lox, capture)
}

/// Run `source` in a fresh session; returns printed lines and the session.
pub fn run(source: &str) -> (Vec<String>, Lox) {
    let (mut lox, capture) = session();
    lox.run(source);
    (capture.lines(), lox)
}

/// Printed lines of a program expected to run cleanly.
pub fn output_of(source: &str) -> Vec<String> {
    let (lines, lox) = run(source);
    let errors: Vec<String> = lox.diagnostics().errors().iter().map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);
    lines
}

/// Bare messages of everything the session reported.
pub fn messages(lox: &Lox) -> Vec<String> {
    lox.diagnostics().errors().iter().map(|e| e.message()).collect()
}

pub fn parse(source: &str) -> (Vec<Stmt>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let tokens = Scanner::new(source).scan(&mut diagnostics);
    let statements = Parser::new(&tokens).parse(&mut diagnostics);
    (statements, diagnostics)
}
