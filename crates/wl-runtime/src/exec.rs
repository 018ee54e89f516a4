//! The statement executor and its suspend/resume protocol.
//!
//! Every statement executes through [`execute`], which returns `Ok(false)`
//! when the run cannot continue (budget exhausted or an action the handler
//! refused) and `Ok(true)` when the statement completed. `Err` is reserved
//! for fatal errors that kill the program.
//!
//! One run is either *live* (`finished == true`: statements take effect and
//! cost budget) or *seeking* (`finished == false`: a previous run suspended
//! and the tree is re-walked from the root, effect- and cost-free, to find
//! the conditional recorded as the resumption cursor). Reaching the cursor
//! clears it and flips the run live; the resuming node re-enters its body
//! from the start, which is safe because everything below a valid cursor is
//! re-runnable: actions are gated on live mode and non-action statements
//! carry no external cost.

use wl_core::{
    Action, Expr, ForeachKind, ProgramError, Stmt, StmtId, Type, Value, VariableTable,
};

use crate::context::ExecutionContext;
use crate::eval::eval;
use crate::program::MAX_STATEMENT_BUDGET;

/// The only mutable state of a run: the per-invocation budget counter, the
/// live/seek flag, and the resumption cursor that survives across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunState {
    pub(crate) counter: u32,
    pub(crate) finished: bool,
    pub(crate) cursor: Option<StmtId>,
}

impl RunState {
    pub(crate) fn new() -> Self {
        Self {
            counter: MAX_STATEMENT_BUDGET,
            finished: true,
            cursor: None,
        }
    }
}

pub(crate) struct RunCx<'a> {
    pub(crate) state: &'a mut RunState,
    pub(crate) vars: &'a mut VariableTable,
    pub(crate) ctx: &'a ExecutionContext,
}

pub(crate) fn execute(stmt: &Stmt, run: &mut RunCx<'_>) -> Result<bool, ProgramError> {
    match stmt {
        Stmt::Sequence { statements } => {
            for statement in statements {
                if !execute(statement, run)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }

        Stmt::Assignment { name, rhs, .. } => {
            if run.state.counter == 0 {
                return Ok(false);
            }
            if run.state.finished {
                run.state.counter -= 1;
                let value = eval(rhs, run.vars, run.ctx)?;
                let Some(variable) = run.vars.get_mut(name) else {
                    return Err(ProgramError::illegal_state(format!(
                        "the assignment target \"{}\" is no longer an existing variable",
                        name
                    )));
                };
                if value.ty() != variable.ty() {
                    return Err(ProgramError::illegal_state(format!(
                        "a {} value is not valid for the {} variable \"{}\"",
                        value.ty(),
                        variable.ty(),
                        name
                    )));
                }
                variable.assign(value)?;
            }
            Ok(true)
        }

        Stmt::Print { value } => {
            if run.state.counter == 0 {
                return Ok(false);
            }
            if run.state.finished {
                run.state.counter -= 1;
                let value = eval(value, run.vars, run.ctx)?;
                run.ctx.handler().borrow_mut().print(&value.to_string());
            }
            Ok(true)
        }

        Stmt::Action { action, .. } => {
            if run.state.counter == 0 {
                return Ok(false);
            }
            if run.state.finished {
                // The budget unit is spent before the handler is asked, but a
                // refused action fails the whole run, so the retry on the next
                // run starts from a fresh counter: nothing is double-charged.
                run.state.counter -= 1;
                if !perform_action(action, run)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }

        Stmt::If {
            id,
            condition,
            then_branch,
            else_branch,
        } => {
            if !enter_conditional(*id, run.state) {
                return Ok(false);
            }
            let completed = perform_if(condition, then_branch, else_branch, run)?;
            Ok(conditional_outcome(*id, completed, run.state))
        }

        Stmt::While {
            id,
            condition,
            body,
        } => {
            if !enter_conditional(*id, run.state) {
                return Ok(false);
            }
            let completed = perform_while(condition, body, run)?;
            Ok(conditional_outcome(*id, completed, run.state))
        }

        Stmt::ForEach {
            id,
            kind,
            variable,
            body,
            ..
        } => {
            if !enter_conditional(*id, run.state) {
                return Ok(false);
            }
            let completed = perform_foreach(*kind, variable, body, run)?;
            Ok(conditional_outcome(*id, completed, run.state))
        }
    }
}

/// Shared entry protocol of the three conditional statements.
///
/// Live mode pays one budget unit and fails on exhaustion, recording this
/// node as the cursor. In seek mode entry is free unless this node *is* the
/// cursor, in which case the cursor is consumed and the run flips live
/// before the node performs, so its body re-runs from the start.
fn enter_conditional(id: StmtId, state: &mut RunState) -> bool {
    if state.finished && state.counter == 0 {
        if state.cursor.is_none() {
            state.cursor = Some(id);
        }
        return false;
    }

    let resuming = state.cursor == Some(id);
    if state.finished || resuming {
        state.counter = state.counter.saturating_sub(1);
        if resuming && !state.finished {
            state.finished = true;
            state.cursor = None;
        }
    }
    true
}

/// A conditional that could not complete records itself as the cursor, but
/// only if nothing deeper in this failed descent claimed it first.
fn conditional_outcome(id: StmtId, completed: bool, state: &mut RunState) -> bool {
    if !completed && state.cursor.is_none() {
        state.cursor = Some(id);
    }
    completed
}

fn perform_if(
    condition: &Expr,
    then_branch: &Stmt,
    else_branch: &Stmt,
    run: &mut RunCx<'_>,
) -> Result<bool, ProgramError> {
    if run.state.finished {
        if eval(condition, run.vars, run.ctx)?.as_boolean()? {
            execute(then_branch, run)
        } else {
            execute(else_branch, run)
        }
    } else {
        // Seeking: probe "then" first; only probe "else" if the cursor was
        // not in there. If the condition's value changed since the suspended
        // run, this blind rediscovery can resume into the wrong branch; that
        // is a known property of the single-cursor design.
        if !execute(then_branch, run)? {
            return Ok(false);
        }
        if !run.state.finished && !execute(else_branch, run)? {
            return Ok(false);
        }
        Ok(true)
    }
}

fn perform_while(
    condition: &Expr,
    body: &Stmt,
    run: &mut RunCx<'_>,
) -> Result<bool, ProgramError> {
    if !run.state.finished {
        // Seeking: the body is walked once regardless of the condition's
        // current value, since the cursor may be anywhere inside it.
        if !execute(body, run)? {
            return Ok(false);
        }
        if !run.state.finished {
            // Cursor not in this loop; keep seeking after it.
            return Ok(true);
        }
    }

    while eval(condition, run.vars, run.ctx)?.as_boolean()? {
        if !execute(body, run)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn perform_foreach(
    kind: ForeachKind,
    variable: &str,
    body: &Stmt,
    run: &mut RunCx<'_>,
) -> Result<bool, ProgramError> {
    // Re-checked at run time even though validate() covers it: the table is
    // reachable by name and the loop is about to write through it.
    match run.vars.get(variable) {
        None => {
            return Err(ProgramError::illegal_state(format!(
                "the for-each variable \"{}\" does not exist",
                variable
            )));
        }
        Some(var) if var.ty() != Type::Entity => {
            return Err(ProgramError::illegal_state(format!(
                "the for-each variable \"{}\" is not of the entity type",
                variable
            )));
        }
        Some(_) => {}
    }

    let collection = match kind {
        ForeachKind::Worm => run.ctx.world().worms(),
        ForeachKind::Food => run.ctx.world().food(),
        ForeachKind::Any => run.ctx.world().entities(),
    };

    // In live mode every element is visited. In seek mode one pass over the
    // body is enough to decide whether the cursor is inside; the element
    // binding still happens first so a hit resumes with the variable bound.
    let mut performed_once = false;
    for entity in collection {
        if performed_once && !run.state.finished {
            break;
        }
        run.vars
            .get_mut(variable)
            .ok_or_else(|| {
                ProgramError::illegal_state(format!(
                    "the for-each variable \"{}\" does not exist",
                    variable
                ))
            })?
            .assign(Value::Entity(Some(entity)))?;
        if !execute(body, run)? {
            return Ok(false);
        }
        performed_once = true;
    }
    Ok(true)
}

fn perform_action(action: &Action, run: &mut RunCx<'_>) -> Result<bool, ProgramError> {
    let entity = run.ctx.entity();
    let performed = match action {
        Action::Turn { angle } => {
            let angle = eval(angle, run.vars, run.ctx)?.as_number()?;
            run.ctx.handler().borrow_mut().turn(entity, angle)
        }
        Action::Move => run.ctx.handler().borrow_mut().move_forward(entity),
        Action::Jump => run.ctx.handler().borrow_mut().jump(entity),
        Action::ToggleWeapon => run.ctx.handler().borrow_mut().toggle_weapon(entity),
        Action::Fire { yield_points } => {
            let yield_points = eval(yield_points, run.vars, run.ctx)?.as_number()?;
            run.ctx
                .handler()
                .borrow_mut()
                .fire(entity, yield_points as u32)
        }
        Action::Skip => true,
    };
    Ok(performed)
}
