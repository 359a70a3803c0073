//! Diagnostic sink shared by every pipeline stage.
//!
//! Stages never print.  They hand each [`LoxError`] to [`Diagnostics::report`],
//! which keeps it (in report order) and raises one of two flags:
//!
//! * `had_error`: a lexical, syntax or resolution error.  The driver refuses
//!   to execute a program once this is set.
//! * `had_runtime_error`: only used to pick the process exit status.

use log::debug;

use crate::error::LoxError;

#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<LoxError>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one diagnostic.
    pub fn report(&mut self, error: LoxError) {
        debug!("Diagnostic reported: {}", error);

        if error.is_runtime() {
            self.had_runtime_error = true;
        } else {
            self.had_error = true;
        }

        self.errors.push(error);
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Everything reported since the last [`take_errors`](Self::take_errors)
    /// or [`reset`](Self::reset).
    pub fn errors(&self) -> &[LoxError] {
        &self.errors
    }

    /// Hand the accumulated errors to the caller (usually for printing),
    /// leaving the flags untouched.
    pub fn take_errors(&mut self) -> Vec<LoxError> {
        std::mem::take(&mut self.errors)
    }

    /// Clear errors and both flags.  The REPL calls this between lines.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.had_error = false;
        self.had_runtime_error = false;
    }
}
