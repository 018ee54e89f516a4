pub mod ast;
pub mod error;
pub mod fuzzy;
pub mod types;
pub mod value;
pub mod variable;

pub use ast::*;
pub use error::{ErrorKind, ProgramError};
pub use types::*;
pub use value::*;
pub use variable::{Variable, VariableTable};
