//! Construction-time builder and type checker for worm-program trees.
//!
//! Every node constructor checks the statically known types of its operands
//! once, at build time. A mismatch is recorded into the builder's error list
//! together with the source position, and a type-correct placeholder node is
//! returned so construction can continue and one parse surfaces *all*
//! construction errors instead of stopping at the first.

mod semantics;

pub use semantics::check_semantics;

use wl_core::{
    Action, BinaryOp, EntityQuery, Expr, ForeachKind, ProgramError, SourcePos, Stmt, StmtId, Type,
    UnaryOp,
};

#[derive(Debug, Default)]
pub struct AstBuilder {
    next_id: u32,
    errors: Vec<ProgramError>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[ProgramError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ProgramError> {
        self.errors
    }

    fn fresh_id(&mut self) -> StmtId {
        let id = StmtId(self.next_id);
        self.next_id += 1;
        id
    }

    fn expect_type(&mut self, pos: SourcePos, expr: Expr, wanted: Type, context: &str) -> Expr {
        if expr.ty() == wanted {
            return expr;
        }
        self.errors.push(ProgramError::type_error(
            pos,
            format!("{} must be of type {}, found {}", context, wanted, expr.ty()),
        ));
        placeholder(wanted)
    }

    // ---- expressions ----

    pub fn number_literal(&mut self, value: f64) -> Expr {
        Expr::NumberLiteral { value }
    }

    pub fn boolean_literal(&mut self, value: bool) -> Expr {
        Expr::BooleanLiteral { value }
    }

    pub fn null_literal(&mut self) -> Expr {
        Expr::Null
    }

    pub fn self_entity(&mut self) -> Expr {
        Expr::SelfEntity
    }

    /// Build a variable read. The declared type must be known by the time a
    /// statement mentions the name; an undeclared name is an argument error
    /// and the access decays to a number-typed placeholder.
    pub fn variable_access(&mut self, pos: SourcePos, name: &str, declared: Option<Type>) -> Expr {
        match declared {
            Some(ty) => Expr::Variable {
                name: name.to_string(),
                ty,
                pos,
            },
            None => {
                self.errors.push(ProgramError::argument(
                    pos,
                    format!("variable \"{}\" is not declared", name),
                ));
                placeholder(Type::Number)
            }
        }
    }

    pub fn unary(&mut self, pos: SourcePos, op: UnaryOp, operand: Expr) -> Expr {
        let operand = match op {
            UnaryOp::Not => self.expect_type(pos, operand, Type::Boolean, "the operand of \"!\""),
            UnaryOp::Sqrt | UnaryOp::Sin | UnaryOp::Cos => {
                self.expect_type(pos, operand, Type::Number, "the argument")
            }
        };
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(&mut self, pos: SourcePos, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        let (lhs, rhs) = match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => (
                self.expect_type(pos, lhs, Type::Number, "the left operand"),
                self.expect_type(pos, rhs, Type::Number, "the right operand"),
            ),
            BinaryOp::LessThan
            | BinaryOp::GreaterThan
            | BinaryOp::LessThanOrEqual
            | BinaryOp::GreaterThanOrEqual => (
                self.expect_type(pos, lhs, Type::Number, "the left operand"),
                self.expect_type(pos, rhs, Type::Number, "the right operand"),
            ),
            BinaryOp::And | BinaryOp::Or => (
                self.expect_type(pos, lhs, Type::Boolean, "the left operand"),
                self.expect_type(pos, rhs, Type::Boolean, "the right operand"),
            ),
            BinaryOp::Equal | BinaryOp::NotEqual => {
                if lhs.ty() != rhs.ty() {
                    self.errors.push(ProgramError::type_error(
                        pos,
                        format!(
                            "both sides of an equality must have the same type, found {} and {}",
                            lhs.ty(),
                            rhs.ty()
                        ),
                    ));
                }
                (lhs, rhs)
            }
        };
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn entity_query(&mut self, pos: SourcePos, query: EntityQuery, target: Expr) -> Expr {
        let target = self.expect_type(pos, target, Type::Entity, "the query target");
        Expr::Query {
            query,
            target: Box::new(target),
        }
    }

    pub fn search_object(&mut self, pos: SourcePos, angle_offset: Expr) -> Expr {
        let angle_offset =
            self.expect_type(pos, angle_offset, Type::Number, "the search angle offset");
        Expr::SearchObject {
            angle_offset: Box::new(angle_offset),
        }
    }

    // ---- statements ----

    /// Build an assignment. The rhs type is *not* checked against the
    /// variable's declared type here: the global table is only complete once
    /// the whole declaration set has been parsed, so that check belongs to
    /// the deferred semantic pass ([`check_semantics`]).
    pub fn assignment(&mut self, pos: SourcePos, name: &str, rhs: Expr) -> Stmt {
        Stmt::Assignment {
            name: name.to_string(),
            rhs,
            pos,
        }
    }

    pub fn print(&mut self, value: Expr) -> Stmt {
        Stmt::Print { value }
    }

    pub fn turn(&mut self, pos: SourcePos, angle: Expr) -> Stmt {
        let angle = self.expect_type(pos, angle, Type::Number, "the turn angle");
        Stmt::Action {
            action: Action::Turn { angle },
            pos,
        }
    }

    pub fn fire(&mut self, pos: SourcePos, yield_points: Expr) -> Stmt {
        let yield_points = self.expect_type(pos, yield_points, Type::Number, "the fire yield");
        Stmt::Action {
            action: Action::Fire { yield_points },
            pos,
        }
    }

    pub fn move_forward(&mut self, pos: SourcePos) -> Stmt {
        Stmt::Action {
            action: Action::Move,
            pos,
        }
    }

    pub fn jump(&mut self, pos: SourcePos) -> Stmt {
        Stmt::Action {
            action: Action::Jump,
            pos,
        }
    }

    pub fn toggle_weapon(&mut self, pos: SourcePos) -> Stmt {
        Stmt::Action {
            action: Action::ToggleWeapon,
            pos,
        }
    }

    pub fn skip(&mut self, pos: SourcePos) -> Stmt {
        Stmt::Action {
            action: Action::Skip,
            pos,
        }
    }

    pub fn if_statement(
        &mut self,
        pos: SourcePos,
        condition: Expr,
        then_branch: Stmt,
        else_branch: Stmt,
    ) -> Stmt {
        let condition =
            self.expect_type(pos, condition, Type::Boolean, "the condition of an if");
        Stmt::If {
            id: self.fresh_id(),
            condition,
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    pub fn while_statement(&mut self, pos: SourcePos, condition: Expr, body: Stmt) -> Stmt {
        let condition =
            self.expect_type(pos, condition, Type::Boolean, "the condition of a while");
        Stmt::While {
            id: self.fresh_id(),
            condition,
            body: Box::new(body),
        }
    }

    /// Build a for-each loop. A body containing an action statement is
    /// rejected: the iteration set is recomputed on every resumption, so a
    /// side effect inside it would be non-deterministic across suspend/resume
    /// boundaries.
    pub fn foreach(
        &mut self,
        pos: SourcePos,
        kind: ForeachKind,
        variable: &str,
        body: Stmt,
    ) -> Stmt {
        if body.has_action() {
            self.errors.push(ProgramError::argument(
                pos,
                "the body of a for-each may not contain an action statement",
            ));
        }
        Stmt::ForEach {
            id: self.fresh_id(),
            kind,
            variable: variable.to_string(),
            body: Box::new(body),
            pos,
        }
    }

    pub fn sequence(&mut self, statements: Vec<Stmt>) -> Stmt {
        Stmt::Sequence { statements }
    }
}

/// A neutral, type-correct stand-in for a node that failed its checks.
fn placeholder(ty: Type) -> Expr {
    match ty {
        Type::Number => Expr::NumberLiteral { value: 0.0 },
        Type::Boolean => Expr::BooleanLiteral { value: false },
        Type::Entity => Expr::Null,
    }
}
