//! Execution of worm-program trees: the expression evaluator, the budgeted
//! statement executor with its suspend/resume protocol, and the `Program`
//! controller the turn scheduler drives.

mod context;
mod eval;
mod exec;
mod host;
mod program;

pub use context::ExecutionContext;
pub use host::{ActionHandler, WorldView};
pub use program::{Program, MAX_STATEMENT_BUDGET};
