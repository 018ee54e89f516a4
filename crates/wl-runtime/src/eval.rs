//! The pure expression evaluator.
//!
//! Expressions never mutate the variable table or the world; the only
//! observable outcomes are a value or a fatal error (a capability the entity
//! does not support, or a variable name that no longer resolves).

use wl_core::fuzzy;
use wl_core::{
    BinaryOp, EntityId, EntityQuery, Expr, ProgramError, UnaryOp, Value, VariableTable,
};

use crate::context::ExecutionContext;

pub(crate) fn eval(
    expr: &Expr,
    vars: &VariableTable,
    ctx: &ExecutionContext,
) -> Result<Value, ProgramError> {
    match expr {
        Expr::NumberLiteral { value } => Ok(Value::Number(*value)),
        Expr::BooleanLiteral { value } => Ok(Value::Boolean(*value)),
        Expr::Null => Ok(Value::Entity(None)),
        Expr::SelfEntity => Ok(Value::Entity(Some(ctx.entity()))),
        Expr::Variable { name, .. } => match vars.get(name) {
            Some(variable) => Ok(variable.value()),
            None => Err(ProgramError::reference(format!(
                "the variable \"{}\" no longer exists",
                name
            ))),
        },
        Expr::Unary { op, operand } => eval_unary(*op, operand, vars, ctx),
        Expr::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, vars, ctx),
        Expr::Query { query, target } => {
            let target = eval(target, vars, ctx)?.as_entity()?;
            eval_query(*query, target, ctx)
        }
        Expr::SearchObject { angle_offset } => {
            let offset = eval(angle_offset, vars, ctx)?.as_number()?;
            let world = ctx.world();
            let origin = world.position(ctx.entity())?;
            let direction = world.direction(ctx.entity())?;
            Ok(Value::Entity(world.search_object(origin, direction + offset)))
        }
    }
}

fn eval_unary(
    op: UnaryOp,
    operand: &Expr,
    vars: &VariableTable,
    ctx: &ExecutionContext,
) -> Result<Value, ProgramError> {
    match op {
        UnaryOp::Not => Ok(Value::Boolean(!eval(operand, vars, ctx)?.as_boolean()?)),
        UnaryOp::Sqrt => Ok(Value::Number(eval(operand, vars, ctx)?.as_number()?.sqrt())),
        UnaryOp::Sin => Ok(Value::Number(eval(operand, vars, ctx)?.as_number()?.sin())),
        UnaryOp::Cos => Ok(Value::Number(eval(operand, vars, ctx)?.as_number()?.cos())),
    }
}

fn eval_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    vars: &VariableTable,
    ctx: &ExecutionContext,
) -> Result<Value, ProgramError> {
    // Logical operators short-circuit; the rhs of a decided chain is never
    // evaluated, so an error hiding in it cannot fire.
    match op {
        BinaryOp::And => {
            if !eval(lhs, vars, ctx)?.as_boolean()? {
                return Ok(Value::Boolean(false));
            }
            return Ok(Value::Boolean(eval(rhs, vars, ctx)?.as_boolean()?));
        }
        BinaryOp::Or => {
            if eval(lhs, vars, ctx)?.as_boolean()? {
                return Ok(Value::Boolean(true));
            }
            return Ok(Value::Boolean(eval(rhs, vars, ctx)?.as_boolean()?));
        }
        _ => {}
    }

    let left = eval(lhs, vars, ctx)?;
    let right = eval(rhs, vars, ctx)?;
    match op {
        BinaryOp::Add => Ok(Value::Number(left.as_number()? + right.as_number()?)),
        BinaryOp::Sub => Ok(Value::Number(left.as_number()? - right.as_number()?)),
        BinaryOp::Mul => Ok(Value::Number(left.as_number()? * right.as_number()?)),
        BinaryOp::Div => Ok(Value::Number(left.as_number()? / right.as_number()?)),
        BinaryOp::LessThan => Ok(Value::Boolean(left.as_number()? < right.as_number()?)),
        BinaryOp::GreaterThan => Ok(Value::Boolean(left.as_number()? > right.as_number()?)),
        // Only the inclusive comparisons are tolerance-based.
        BinaryOp::LessThanOrEqual => Ok(Value::Boolean(fuzzy::fuzzy_less_than_or_equal(
            left.as_number()?,
            right.as_number()?,
        ))),
        BinaryOp::GreaterThanOrEqual => Ok(Value::Boolean(fuzzy::fuzzy_greater_than_or_equal(
            left.as_number()?,
            right.as_number()?,
        ))),
        BinaryOp::Equal => Ok(Value::Boolean(left == right)),
        BinaryOp::NotEqual => Ok(Value::Boolean(left != right)),
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

fn eval_query(
    query: EntityQuery,
    target: Option<EntityId>,
    ctx: &ExecutionContext,
) -> Result<Value, ProgramError> {
    // Type tests tolerate the absent entity; every real capability read
    // needs one to ask.
    match query {
        EntityQuery::IsWorm => {
            return Ok(Value::Boolean(
                target.is_some_and(|id| ctx.world().is_worm(id)),
            ));
        }
        EntityQuery::IsFood => {
            return Ok(Value::Boolean(
                target.is_some_and(|id| ctx.world().is_food(id)),
            ));
        }
        _ => {}
    }

    let Some(id) = target else {
        return Err(ProgramError::capability(format!(
            "cannot query {} of the null entity",
            query_name(query)
        )));
    };

    let world = ctx.world();
    match query {
        EntityQuery::PositionX => Ok(Value::Number(world.position(id)?.x)),
        EntityQuery::PositionY => Ok(Value::Number(world.position(id)?.y)),
        EntityQuery::Radius => Ok(Value::Number(world.radius(id)?)),
        EntityQuery::Direction => Ok(Value::Number(world.direction(id)?)),
        EntityQuery::ActionPoints => Ok(Value::Number(world.action_points(id)?)),
        EntityQuery::MaxActionPoints => Ok(Value::Number(world.max_action_points(id)?)),
        EntityQuery::HitPoints => Ok(Value::Number(world.hit_points(id)?)),
        EntityQuery::MaxHitPoints => Ok(Value::Number(world.max_hit_points(id)?)),
        EntityQuery::SameTeam => {
            let mine = world.team(ctx.entity())?;
            let theirs = world.team(id)?;
            Ok(Value::Boolean(match (mine, theirs) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }))
        }
        EntityQuery::IsWorm | EntityQuery::IsFood => unreachable!("handled above"),
    }
}

fn query_name(query: EntityQuery) -> &'static str {
    match query {
        EntityQuery::PositionX => "the x position",
        EntityQuery::PositionY => "the y position",
        EntityQuery::Radius => "the radius",
        EntityQuery::Direction => "the direction",
        EntityQuery::ActionPoints => "the action points",
        EntityQuery::MaxActionPoints => "the maximum action points",
        EntityQuery::HitPoints => "the hit points",
        EntityQuery::MaxHitPoints => "the maximum hit points",
        EntityQuery::SameTeam => "the team",
        EntityQuery::IsWorm => "is-worm",
        EntityQuery::IsFood => "is-food",
    }
}
