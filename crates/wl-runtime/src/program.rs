use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use wl_compiler::check_semantics;
use wl_core::{EntityId, ProgramError, Stmt, StmtId, VariableTable};

use crate::context::ExecutionContext;
use crate::exec::{execute, RunCx, RunState};
use crate::host::{ActionHandler, WorldView};

/// The fixed per-run cap on executed statements before forced suspension.
pub const MAX_STATEMENT_BUDGET: u32 = 1000;

/// One worm-program: the statement tree, its global variable table, and the
/// run-state that survives across `run()` invocations.
///
/// The tree and the table's shape are immutable for the program's lifetime;
/// only variable values, the budget counter, the finished flag and the
/// resumption cursor change. A fatal error permanently kills the program.
pub struct Program {
    root: Stmt,
    variables: VariableTable,
    state: RunState,
    context: Option<ExecutionContext>,
    dead: bool,
}

impl Program {
    pub fn new(root: Stmt, variables: VariableTable) -> Self {
        Self {
            root,
            variables,
            state: RunState::new(),
            context: None,
            dead: false,
        }
    }

    /// Bind the program to the entity it acts as, the handler performing its
    /// actions and the world it queries. Allowed exactly once.
    pub fn bind(
        &mut self,
        entity: EntityId,
        handler: Rc<RefCell<dyn ActionHandler>>,
        world: Rc<dyn WorldView>,
    ) -> Result<(), ProgramError> {
        if self.context.is_some() {
            return Err(ProgramError::illegal_state(
                "this program is already bound to an entity",
            ));
        }
        self.context = Some(ExecutionContext::new(entity, handler, world));
        Ok(())
    }

    /// Execute one budgeted run.
    ///
    /// Resets the counter to [`MAX_STATEMENT_BUDGET`] and executes the root.
    /// If the previous run suspended, the walk first seeks the stored cursor
    /// and goes live from there. Budget exhaustion and handler-refused
    /// actions are not errors: the run returns `Ok` with partial work done
    /// and the cursor set. A returned `Err` is fatal and the program refuses
    /// to run again.
    pub fn run(&mut self) -> Result<(), ProgramError> {
        if self.dead {
            return Err(ProgramError::illegal_state(
                "this program was aborted by an earlier fatal error",
            ));
        }
        let Some(context) = &self.context else {
            return Err(ProgramError::illegal_state(
                "run() requires a bound execution context",
            ));
        };

        self.state.counter = MAX_STATEMENT_BUDGET;
        let completed = {
            let mut run = RunCx {
                state: &mut self.state,
                vars: &mut self.variables,
                ctx: context,
            };
            execute(&self.root, &mut run)
        };

        match completed {
            Ok(true) => {
                self.state.cursor = None;
                self.state.finished = true;
                Ok(())
            }
            Ok(false) => {
                self.state.finished = false;
                Ok(())
            }
            Err(error) => {
                self.dead = true;
                Err(error)
            }
        }
    }

    /// Whether the previous run completed the whole tree.
    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    /// Budget left over from the previous run.
    pub fn remaining_budget(&self) -> u32 {
        self.state.counter
    }

    /// The conditional statement where the previous run stopped, if any.
    pub fn resumption_cursor(&self) -> Option<StmtId> {
        self.state.cursor
    }

    /// The deferred semantic pass: assignment types against declared
    /// variable types, and for-each loop variables being entity-typed.
    pub fn validate(&self) -> Vec<ProgramError> {
        check_semantics(&self.root, &self.variables)
    }

    pub fn root(&self) -> &Stmt {
        &self.root
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }
}

// The bound context holds trait objects, so Debug is written by hand and
// reports whether a binding exists rather than what it is.
impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("variables", &self.variables)
            .field("state", &self.state)
            .field("bound", &self.context.is_some())
            .field("dead", &self.dead)
            .finish_non_exhaustive()
    }
}
