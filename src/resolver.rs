//! Static resolver pass for the **Rox** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of `HashMap<String, bool>` tracking declared/defined).
//!    Only block and function scopes are pushed; the global scope never is.
//! 2. Report static errors (redeclaration, read in own initializer, top‑level
//!    `return`).  Resolution keeps going after an error so one pass reports
//!    as many as it can.
//!
//!    A block‑scope initializer that names the variable being declared is
//!    reported, unless no enclosing local binds the name and a global of that
//!    name is already known (declared earlier, or a native).  That read stays
//!    dynamic and sees the global.
//! 3. Record, for each variable occurrence found in a local scope, how many
//!    scopes out its binding lives.  Anything not found stays out of the
//!    table and is looked up dynamically in the globals at runtime.

use std::collections::hash_map;
use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::callable;
use crate::diagnostics::Diagnostics;
use crate::error::LoxError;
use crate::token::Token;

/// Are we inside a user function?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
}

/// The binding side table: expression id → hop count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(HashMap<ExprId, usize>);

impl Bindings {
    /// Hops from the scope active at `id` to the scope holding its binding,
    /// or `None` for a global (dynamic) reference.
    pub fn depth(&self, id: ExprId) -> Option<usize> {
        self.0.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Bindings {
    type Item = (ExprId, usize);
    type IntoIter = hash_map::IntoIter<ExprId, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Resolver: tracks scopes, enforces static rules, and records binding
/// distances for locals.
pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    /// Top‑level names declared so far; survives across `resolve` calls.
    globals: HashSet<String>,
    current_function: FunctionType,
    bindings: Bindings,
    errors: Vec<LoxError>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        info!("Resolver instantiated");
        Resolver {
            scopes: Vec::new(),
            globals: callable::natives()
                .iter()
                .map(|native| native.name.to_string())
                .collect(),
            current_function: FunctionType::None,
            bindings: Bindings::default(),
            errors: Vec::new(),
        }
    }

    /// Walk all top‑level statements, report static errors to `diagnostics`
    /// and return the binding table.
    pub fn resolve(&mut self, statements: &[Stmt], diagnostics: &mut Diagnostics) -> Bindings {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        self.scopes.clear();
        self.current_function = FunctionType::None;

        self.resolve_stmts(statements);

        for error in self.errors.drain(..) {
            diagnostics.report(error);
        }

        let bindings = std::mem::take(&mut self.bindings);
        info!("Resolved {} local reference(s)", bindings.len());
        bindings
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define, so the initializer
                // sees the name as not‑ready.
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function(declaration) => {
                // The name is ready before the body is walked: recursion.
                self.declare(&declaration.name);
                self.define(&declaration.name);
                self.resolve_function(declaration, FunctionType::Function);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword, "Can't return from top-level code.");
                }
                if let Some(expr) = value {
                    self.resolve_expr(expr);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                let declared_not_ready = self
                    .scopes
                    .last()
                    .is_some_and(|scope| scope.get(&name.lexeme) == Some(&false));

                if declared_not_ready {
                    self.resolve_own_initializer(name);
                } else {
                    self.resolve_local(*id, name);
                }
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function’s parameters + body.
    fn resolve_function(&mut self, declaration: &FunctionDecl, kind: FunctionType) {
        let enclosing = std::mem::replace(&mut self.current_function, kind);

        self.begin_scope();
        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&declaration.body);
        self.end_scope();

        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            self.globals.insert(name.lexeme.clone());
            return;
        };

        let duplicate = scope.insert(name.lexeme.clone(), false).is_some();

        if duplicate {
            self.error(name, "Already a variable with this name in this scope.");
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn error(&mut self, token: &Token, message: &str) {
        self.errors.push(LoxError::resolve(token, message));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this variable occurrence as a local at depth `d` (innermost = 0),
    /// or leave it out of the table when no scope declares it (global).
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.bindings.0.insert(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }

    /// `name` is declared but not ready in the innermost scope, i.e. we are
    /// inside its own initializer.  Only a known global may be read here.
    fn resolve_own_initializer(&mut self, name: &Token) {
        let shadows_local = self
            .scopes
            .iter()
            .rev()
            .skip(1)
            .any(|scope| scope.contains_key(&name.lexeme));

        if !shadows_local && self.globals.contains(&name.lexeme) {
            debug!("Initializer of '{}' reads the global", name.lexeme);
            return;
        }

        self.error(name, "Can't read local variable in its own initializer.");
    }
}
