//! The worm-program syntax tree.
//!
//! Expression nodes are pure and carry enough typing information for their
//! result type to be derived from their shape alone (`Expr::ty`). Statement
//! nodes are plain data; execution semantics live in the runtime crate.
//! Conditional statements carry a builder-assigned [`StmtId`] so the
//! resumption cursor can name the node where a run suspended.

use serde::{Deserialize, Serialize};

use crate::types::{SourcePos, Type};

/// Identity of a conditional statement node, unique within one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StmtId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForeachKind {
    Worm,
    Food,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnaryOp {
    Not,
    Sqrt,
    Sin,
    Cos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl BinaryOp {
    /// The result type of an (already type-checked) application.
    pub fn result_type(&self) -> Type {
        match self {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => Type::Number,
            _ => Type::Boolean,
        }
    }
}

/// A capability query on an entity-typed operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityQuery {
    PositionX,
    PositionY,
    Radius,
    Direction,
    ActionPoints,
    MaxActionPoints,
    HitPoints,
    MaxHitPoints,
    SameTeam,
    IsWorm,
    IsFood,
}

impl EntityQuery {
    pub fn result_type(&self) -> Type {
        match self {
            EntityQuery::SameTeam | EntityQuery::IsWorm | EntityQuery::IsFood => Type::Boolean,
            _ => Type::Number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Expr {
    NumberLiteral {
        value: f64,
    },
    BooleanLiteral {
        value: bool,
    },
    /// The absent-entity literal `null`.
    Null,
    /// The entity this program is bound to.
    SelfEntity,
    /// Name-based read of a global variable. The declared type is recorded
    /// at construction so enclosing nodes can be checked statically.
    Variable {
        name: String,
        ty: Type,
        pos: SourcePos,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Query {
        query: EntityQuery,
        target: Box<Expr>,
    },
    /// The world's directional nearest-entity search, offset relative to the
    /// bound entity's current direction.
    SearchObject {
        angle_offset: Box<Expr>,
    },
}

impl Expr {
    /// The statically known result type of this expression.
    pub fn ty(&self) -> Type {
        match self {
            Expr::NumberLiteral { .. } => Type::Number,
            Expr::BooleanLiteral { .. } => Type::Boolean,
            Expr::Null | Expr::SelfEntity | Expr::SearchObject { .. } => Type::Entity,
            Expr::Variable { ty, .. } => *ty,
            Expr::Unary { op, .. } => match op {
                UnaryOp::Not => Type::Boolean,
                UnaryOp::Sqrt | UnaryOp::Sin | UnaryOp::Cos => Type::Number,
            },
            Expr::Binary { op, .. } => op.result_type(),
            Expr::Query { query, .. } => query.result_type(),
        }
    }
}

/// A statement with an externally visible game-world side effect, gated by
/// the statement budget and the handler's success report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Action {
    Turn { angle: Expr },
    Move,
    Jump,
    ToggleWeapon,
    Fire { yield_points: Expr },
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Stmt {
    Sequence {
        statements: Vec<Stmt>,
    },
    Assignment {
        name: String,
        rhs: Expr,
        pos: SourcePos,
    },
    Print {
        value: Expr,
    },
    Action {
        action: Action,
        pos: SourcePos,
    },
    If {
        id: StmtId,
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Box<Stmt>,
    },
    While {
        id: StmtId,
        condition: Expr,
        body: Box<Stmt>,
    },
    ForEach {
        id: StmtId,
        // Serialized as "collection": the enum's tag field is already "kind".
        #[serde(rename = "collection")]
        kind: ForeachKind,
        variable: String,
        body: Box<Stmt>,
        pos: SourcePos,
    },
}

impl Stmt {
    pub fn empty() -> Self {
        Stmt::Sequence {
            statements: Vec::new(),
        }
    }

    /// Whether this subtree contains at least one action statement.
    ///
    /// Checked once at construction time to forbid actions inside for-each
    /// bodies, whose iteration set is recomputed on every resumption.
    pub fn has_action(&self) -> bool {
        match self {
            Stmt::Action { .. } => true,
            Stmt::Assignment { .. } | Stmt::Print { .. } => false,
            Stmt::Sequence { statements } => statements.iter().any(Stmt::has_action),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => then_branch.has_action() || else_branch.has_action(),
            Stmt::While { body, .. } | Stmt::ForEach { body, .. } => body.has_action(),
        }
    }

    /// The cursor id of this node, if it is a valid resumption point.
    pub fn cursor_id(&self) -> Option<StmtId> {
        match self {
            Stmt::If { id, .. } | Stmt::While { id, .. } | Stmt::ForEach { id, .. } => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(value: f64) -> Expr {
        Expr::NumberLiteral { value }
    }

    #[test]
    fn expression_types_derive_from_shape() {
        let sum = Expr::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(number(1.0)),
            rhs: Box::new(number(2.0)),
        };
        assert_eq!(sum.ty(), Type::Number);

        let comparison = Expr::Binary {
            op: BinaryOp::LessThanOrEqual,
            lhs: Box::new(number(1.0)),
            rhs: Box::new(number(2.0)),
        };
        assert_eq!(comparison.ty(), Type::Boolean);

        let search = Expr::SearchObject {
            angle_offset: Box::new(number(0.0)),
        };
        assert_eq!(search.ty(), Type::Entity);

        let query = Expr::Query {
            query: EntityQuery::IsWorm,
            target: Box::new(search),
        };
        assert_eq!(query.ty(), Type::Boolean);
    }

    #[test]
    fn has_action_sees_through_nesting() {
        let action = Stmt::Action {
            action: Action::Move,
            pos: SourcePos::new(1, 1),
        };
        let wrapped = Stmt::While {
            id: StmtId(0),
            condition: Expr::BooleanLiteral { value: true },
            body: Box::new(Stmt::Sequence {
                statements: vec![
                    Stmt::Print {
                        value: number(0.0),
                    },
                    action,
                ],
            }),
        };
        assert!(wrapped.has_action());
        assert!(!Stmt::empty().has_action());
    }

    #[test]
    fn statement_trees_round_trip_through_json() {
        let tree = Stmt::If {
            id: StmtId(3),
            condition: Expr::Query {
                query: EntityQuery::IsFood,
                target: Box::new(Expr::SearchObject {
                    angle_offset: Box::new(number(0.5)),
                }),
            },
            then_branch: Box::new(Stmt::Action {
                action: Action::Fire {
                    yield_points: number(30.0),
                },
                pos: SourcePos::new(2, 5),
            }),
            else_branch: Box::new(Stmt::empty()),
        };

        let json = serde_json::to_string(&tree).expect("serialize");
        assert!(json.contains("\"kind\":\"if\""));
        let back: Stmt = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, tree);
    }

    #[test]
    fn foreach_collection_does_not_collide_with_the_node_tag() {
        let tree = Stmt::ForEach {
            id: StmtId(0),
            kind: ForeachKind::Food,
            variable: "f".to_string(),
            body: Box::new(Stmt::empty()),
            pos: SourcePos::new(1, 1),
        };

        let json = serde_json::to_string(&tree).expect("serialize");
        assert!(json.contains("\"kind\":\"forEach\""));
        assert!(json.contains("\"collection\":\"food\""));
        let back: Stmt = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, tree);
    }
}
