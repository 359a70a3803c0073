//! A running Rox session: scanner → parser → resolver → interpreter, with one
//! resolver and interpreter kept alive across calls so the REPL remembers
//! earlier lines.

use std::io::Write;

use log::{debug, info};

use crate::diagnostics::Diagnostics;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;

/// Process exit status for a script with syntax or resolution errors.
pub const EXIT_STATIC_ERROR: i32 = 65;

/// Process exit status for a script that failed at runtime.
pub const EXIT_RUNTIME_ERROR: i32 = 70;

pub struct Lox {
    resolver: Resolver,
    interpreter: Interpreter,
    diagnostics: Diagnostics,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    /// Session whose `print` output goes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self::with_interpreter(Interpreter::with_output(out))
    }

    fn with_interpreter(interpreter: Interpreter) -> Self {
        Self {
            resolver: Resolver::new(),
            interpreter,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Run one source unit through the whole pipeline.
    ///
    /// Execution only starts if scanning, parsing and resolving reported
    /// nothing.  Every problem ends up in [`diagnostics`](Self::diagnostics).
    pub fn run(&mut self, source: &str) {
        let tokens = Scanner::new(source).scan(&mut self.diagnostics);

        let statements = Parser::new(&tokens).parse(&mut self.diagnostics);
        if self.diagnostics.had_error() {
            debug!("Syntax errors reported; not resolving");
            return;
        }

        let bindings = self.resolver.resolve(&statements, &mut self.diagnostics);
        if self.diagnostics.had_error() {
            debug!("Resolution errors reported; not executing");
            return;
        }

        self.interpreter.resolve(bindings);

        if let Err(e) = self.interpreter.interpret(&statements) {
            self.diagnostics.report(e);
        }

        info!("Run finished");
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Exit status for run‑file mode, based on what has been reported.
    pub fn exit_code(&self) -> i32 {
        if self.diagnostics.had_error() {
            EXIT_STATIC_ERROR
        } else if self.diagnostics.had_runtime_error() {
            EXIT_RUNTIME_ERROR
        } else {
            0
        }
    }
}
