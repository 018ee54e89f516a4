use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ErrorKind, ProgramError};
use crate::types::{EntityId, Type};

/// A run-time value of a worm-program expression or variable.
///
/// Entity values may be absent (the script literal `null`); numbers and
/// booleans never have an absent state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Entity(Option<EntityId>),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Number(_) => Type::Number,
            Value::Boolean(_) => Type::Boolean,
            Value::Entity(_) => Type::Entity,
        }
    }

    pub fn as_number(&self) -> Result<f64, ProgramError> {
        match self {
            Value::Number(value) => Ok(*value),
            other => Err(ProgramError::new(
                ErrorKind::Type,
                format!("expected a number, found a {} value", other.ty()),
            )),
        }
    }

    pub fn as_boolean(&self) -> Result<bool, ProgramError> {
        match self {
            Value::Boolean(value) => Ok(*value),
            other => Err(ProgramError::new(
                ErrorKind::Type,
                format!("expected a boolean, found a {} value", other.ty()),
            )),
        }
    }

    pub fn as_entity(&self) -> Result<Option<EntityId>, ProgramError> {
        match self {
            Value::Entity(value) => Ok(*value),
            other => Err(ProgramError::new(
                ErrorKind::Type,
                format!("expected an entity, found a {} value", other.ty()),
            )),
        }
    }
}

/// The value a freshly declared variable of the given type holds.
pub fn default_value(ty: Type) -> Value {
    match ty {
        Type::Number => Value::Number(0.0),
        Type::Boolean => Value::Boolean(false),
        Type::Entity => Value::Entity(None),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(value) => write!(f, "{}", value),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Entity(None) => f.write_str("null"),
            Value::Entity(Some(id)) => write!(f, "entity#{}", id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_declared_types() {
        assert_eq!(default_value(Type::Number), Value::Number(0.0));
        assert_eq!(default_value(Type::Boolean), Value::Boolean(false));
        assert_eq!(default_value(Type::Entity), Value::Entity(None));
    }

    #[test]
    fn accessors_reject_mismatched_values() {
        assert!(Value::Boolean(true).as_number().is_err());
        assert!(Value::Number(1.0).as_entity().is_err());
        assert_eq!(Value::Entity(None).as_entity().expect("entity"), None);
    }

    #[test]
    fn display_renders_absent_entity_as_null() {
        assert_eq!(Value::Entity(None).to_string(), "null");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }
}
