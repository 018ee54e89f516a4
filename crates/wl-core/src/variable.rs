use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ErrorKind, ProgramError};
use crate::types::Type;
use crate::value::{default_value, Value};

/// A global variable: a type fixed at declaration plus a current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    ty: Type,
    value: Value,
}

impl Variable {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            value: default_value(ty),
        }
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn value(&self) -> Value {
        self.value
    }

    /// Replace the current value. The declared type never changes; a value
    /// of another type is rejected.
    pub fn assign(&mut self, value: Value) -> Result<(), ProgramError> {
        if value.ty() != self.ty {
            return Err(ProgramError::new(
                ErrorKind::Type,
                format!(
                    "cannot assign a {} value to a {} variable",
                    value.ty(),
                    self.ty
                ),
            ));
        }
        self.value = value;
        Ok(())
    }
}

/// The flat global name→variable table shared by one program's whole tree.
///
/// Declared once while parsing; its shape (names and declared types) never
/// changes during a run, only the stored values do. Lookups stay name-based
/// so a vanished name keeps its reference-error semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableTable {
    variables: BTreeMap<String, Variable>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str, ty: Type) -> Result<(), ProgramError> {
        if self.variables.contains_key(name) {
            return Err(ProgramError::new(
                ErrorKind::Argument,
                format!("variable \"{}\" is declared twice", name),
            ));
        }
        self.variables.insert(name.to_string(), Variable::new(ty));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.variables.iter()
    }
}
