//! Decaf Semantic Analysis
//!
//! Scopes, symbols and type checking for an already parsed Decaf program.
//! Analysis runs in two passes over a mutable AST: [`declare_program`]
//! builds the symbol table, then [`check_program`] types every expression
//! and resolves every reference. Both passes collect [`Diagnostics`] instead
//! of stopping at the first error.

pub mod ast;
pub mod check;
pub mod declare;
pub mod error;
pub mod scope;
pub mod symbol;
pub mod types;
pub mod util;

pub use ast::{Program, Span};
pub use check::{CheckOptions, TypeChecker, check_program, check_program_with};
pub use declare::{declare_program, declare_program_with};
pub use error::{Diagnostics, ErrorKind, SemanticError};
pub use symbol::SymbolTable;

/// Result of analyzing one program
#[derive(Debug)]
pub struct Analysis {
    pub table: SymbolTable,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Runs both passes with default options.
pub fn analyze(program: &mut Program) -> Analysis {
    analyze_with(program, &CheckOptions::default())
}

/// Runs both passes. Analysis is repeatable: a second run over the same
/// tree rebuilds the table and reports the same diagnostics.
#[tracing::instrument(skip_all)]
pub fn analyze_with(program: &mut Program, options: &CheckOptions) -> Analysis {
    let (mut table, mut diagnostics) = declare_program_with(program, options);
    diagnostics.extend(check_program_with(program, &mut table, options));
    if options.sort_diagnostics {
        diagnostics = diagnostics.into_sorted();
    }
    tracing::debug!(errors = diagnostics.len(), "analysis complete");
    Analysis { table, diagnostics }
}
