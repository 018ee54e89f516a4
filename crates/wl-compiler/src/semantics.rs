//! The deferred semantic pass.
//!
//! Two checks cannot be made while nodes are constructed, because a
//! variable's final declared type is only known once the entire global
//! declaration set has been parsed: an assignment's rhs type against its
//! target variable, and a for-each loop variable being entity-typed. This
//! pass walks the finished tree and reports every violation.

use wl_core::{ProgramError, Stmt, Type, VariableTable};

pub fn check_semantics(root: &Stmt, variables: &VariableTable) -> Vec<ProgramError> {
    let mut errors = Vec::new();
    walk(root, variables, &mut errors);
    errors
}

fn walk(stmt: &Stmt, variables: &VariableTable, errors: &mut Vec<ProgramError>) {
    match stmt {
        Stmt::Assignment { name, rhs, pos } => match variables.get(name) {
            None => errors.push(ProgramError::argument(
                *pos,
                format!("assignment to undeclared variable \"{}\"", name),
            )),
            Some(variable) if variable.ty() != rhs.ty() => {
                errors.push(ProgramError::type_error(
                    *pos,
                    format!(
                        "the variable \"{}\" has type {} but is assigned a {} expression",
                        name,
                        variable.ty(),
                        rhs.ty()
                    ),
                ));
            }
            Some(_) => {}
        },
        Stmt::ForEach {
            variable,
            body,
            pos,
            ..
        } => {
            match variables.get(variable) {
                None => errors.push(ProgramError::argument(
                    *pos,
                    format!("for-each over undeclared variable \"{}\"", variable),
                )),
                Some(var) if var.ty() != Type::Entity => errors.push(ProgramError::type_error(
                    *pos,
                    format!(
                        "the for-each variable \"{}\" must have type entity, found {}",
                        variable,
                        var.ty()
                    ),
                )),
                Some(_) => {}
            }
            walk(body, variables, errors);
        }
        Stmt::Sequence { statements } => {
            for statement in statements {
                walk(statement, variables, errors);
            }
        }
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            walk(then_branch, variables, errors);
            walk(else_branch, variables, errors);
        }
        Stmt::While { body, .. } => walk(body, variables, errors),
        Stmt::Print { .. } | Stmt::Action { .. } => {}
    }
}
