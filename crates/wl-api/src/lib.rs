//! The embedding facade: one call from source text to a runnable
//! [`Program`].
//!
//! Hosts that need finer control (token streams, custom-built trees) can use
//! `wl-parser` and `wl-compiler` directly; this crate wires the common path.

pub use wl_core::{EntityId, ErrorKind, Position, ProgramError, SourcePos, TeamId, Type, Value};
pub use wl_runtime::{ActionHandler, Program, WorldView, MAX_STATEMENT_BUDGET};

use wl_parser::parse;

/// Parse, build and validate a worm-program.
///
/// All lexical, syntactic and construction-time errors are collected and
/// returned as one batch. A tree that builds cleanly still runs the deferred
/// semantic pass (assignment types against declared variable types, for-each
/// variables being entity-typed) before the program is handed out.
pub fn parse_program(source: &str) -> Result<Program, Vec<ProgramError>> {
    let outcome = parse(source)?;
    let program = Program::new(outcome.root, outcome.variables);
    let errors = program.validate();
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(program)
}
