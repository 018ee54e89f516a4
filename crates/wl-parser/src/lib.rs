//! Recursive-descent parser for worm-program source text.
//!
//! The parser is a thin front end over [`wl_compiler::AstBuilder`]: it
//! recognizes the surface grammar and calls the builder, which owns all type
//! checking. Syntax errors never abort the parse; the parser records them
//! and resynchronizes at the next `;` or `}`, so a single parse reports
//! every problem it can find.

mod lexer;

pub use lexer::{tokenize, Token, TokenKind};

use wl_compiler::AstBuilder;
use wl_core::{
    BinaryOp, EntityQuery, ForeachKind, ProgramError, SourcePos, Stmt, Type, UnaryOp,
    VariableTable,
};

/// A successfully parsed program: the statement tree plus the global
/// variable table built from the declaration block.
#[derive(Debug)]
pub struct ParseOutcome {
    pub root: Stmt,
    pub variables: VariableTable,
}

/// Parse a complete worm-program. Returns every lexical, syntactic and
/// construction-time error found, or the finished tree if there were none.
pub fn parse(source: &str) -> Result<ParseOutcome, Vec<ProgramError>> {
    let mut errors = Vec::new();
    let tokens = tokenize(source, &mut errors);

    let mut parser = Parser {
        tokens: &tokens,
        index: 0,
        builder: AstBuilder::new(),
        variables: VariableTable::new(),
        errors,
    };
    let root = parser.parse_program();

    let Parser {
        builder,
        variables,
        mut errors,
        ..
    } = parser;
    errors.extend(builder.into_errors());
    if errors.is_empty() {
        Ok(ParseOutcome { root, variables })
    } else {
        Err(errors)
    }
}

const KEYWORDS: &[&str] = &[
    "double",
    "bool",
    "entity",
    "if",
    "else",
    "while",
    "foreach",
    "worm",
    "food",
    "any",
    "turn",
    "move",
    "jump",
    "toggleweap",
    "fire",
    "skip",
    "print",
    "true",
    "false",
    "null",
    "self",
    "getx",
    "gety",
    "getradius",
    "getdir",
    "getap",
    "getmaxap",
    "gethp",
    "getmaxhp",
    "sameteam",
    "searchobj",
    "isworm",
    "isfood",
    "sqrt",
    "sin",
    "cos",
];

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

struct Parser<'a> {
    tokens: &'a [Token],
    index: usize,
    builder: AstBuilder,
    variables: VariableTable,
    errors: Vec<ProgramError>,
}

impl Parser<'_> {
    // ---- token plumbing ----

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    /// Position for an error at the current token, or just past the last
    /// token when the input ended early.
    fn here(&self) -> SourcePos {
        match self.peek() {
            Some(token) => token.pos,
            None => self
                .tokens
                .last()
                .map(|token| SourcePos::new(token.pos.line, token.pos.column + 1))
                .unwrap_or_else(|| SourcePos::new(1, 1)),
        }
    }

    fn at_kind(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|token| token.kind == kind)
    }

    fn at_word(&self, word: &str) -> bool {
        self.peek()
            .is_some_and(|token| token.kind == TokenKind::Identifier && token.text == word)
    }

    fn eat_kind(&mut self, kind: TokenKind) -> bool {
        if self.at_kind(kind) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Option<Token> {
        if self.at_kind(kind) {
            return self.advance();
        }
        let found = match self.peek() {
            Some(token) => format!("\"{}\"", token.text),
            None => "the end of the program".to_string(),
        };
        self.errors.push(ProgramError::syntax(
            self.here(),
            format!("expected {}, found {}", what, found),
        ));
        None
    }

    /// Skip forward past the next `;`, or up to (but not over) a `}`, so the
    /// statement after a syntax error still gets parsed.
    fn resync(&mut self) {
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::RightBrace {
                return;
            }
            let kind = token.kind;
            self.index += 1;
            if kind == TokenKind::Semicolon {
                return;
            }
        }
    }

    // ---- grammar ----

    fn parse_program(&mut self) -> Stmt {
        self.parse_declarations();
        let mut statements = Vec::new();
        while self.peek().is_some() {
            statements.push(self.parse_statement());
        }
        self.builder.sequence(statements)
    }

    fn parse_declarations(&mut self) {
        loop {
            let ty = if self.at_word("double") {
                Type::Number
            } else if self.at_word("bool") {
                Type::Boolean
            } else if self.at_word("entity") {
                Type::Entity
            } else {
                return;
            };
            self.index += 1;

            let Some(name) = self.expect(TokenKind::Identifier, "a variable name") else {
                self.resync();
                continue;
            };
            if is_keyword(&name.text) {
                self.errors.push(ProgramError::syntax(
                    name.pos,
                    format!("\"{}\" is a reserved word", name.text),
                ));
                self.resync();
                continue;
            }
            if let Err(error) = self.variables.declare(&name.text, ty) {
                self.errors
                    .push(ProgramError::at(error.kind, name.pos, error.message));
            }
            if self.expect(TokenKind::Semicolon, "\";\"").is_none() {
                self.resync();
            }
        }
    }

    fn parse_statement(&mut self) -> Stmt {
        if self.eat_kind(TokenKind::LeftBrace) {
            let mut statements = Vec::new();
            while !self.at_kind(TokenKind::RightBrace) && self.peek().is_some() {
                statements.push(self.parse_statement());
            }
            if self.expect(TokenKind::RightBrace, "\"}\"").is_none() {
                self.resync();
            }
            return self.builder.sequence(statements);
        }

        let pos = self.here();
        if self.eat_word("if") {
            return self.parse_if(pos);
        }
        if self.eat_word("while") {
            return self.parse_while(pos);
        }
        if self.eat_word("foreach") {
            return self.parse_foreach(pos);
        }
        if self.eat_word("turn") {
            let angle = self.parse_expr();
            self.end_statement();
            return self.builder.turn(pos, angle);
        }
        if self.eat_word("fire") {
            let yield_points = self.parse_expr();
            self.end_statement();
            return self.builder.fire(pos, yield_points);
        }
        if self.eat_word("move") {
            self.end_statement();
            return self.builder.move_forward(pos);
        }
        if self.eat_word("jump") {
            self.end_statement();
            return self.builder.jump(pos);
        }
        if self.eat_word("toggleweap") {
            self.end_statement();
            return self.builder.toggle_weapon(pos);
        }
        if self.eat_word("skip") {
            self.end_statement();
            return self.builder.skip(pos);
        }
        if self.eat_word("print") {
            let value = self.parse_expr();
            self.end_statement();
            return self.builder.print(value);
        }

        // Anything else must be an assignment target.
        let Some(token) = self.peek().cloned() else {
            self.errors.push(ProgramError::syntax(
                self.here(),
                "expected a statement, found the end of the program",
            ));
            return Stmt::empty();
        };
        if token.kind != TokenKind::Identifier || is_keyword(&token.text) {
            self.errors.push(ProgramError::syntax(
                token.pos,
                format!("expected a statement, found \"{}\"", token.text),
            ));
            // Consume the offending token first: resync() stops in front of
            // "}" and a stray one would otherwise never be passed.
            self.index += 1;
            if token.kind != TokenKind::Semicolon && token.kind != TokenKind::RightBrace {
                self.resync();
            }
            return Stmt::empty();
        }
        self.index += 1;
        if self.expect(TokenKind::Assign, "\":=\"").is_none() {
            self.resync();
            return Stmt::empty();
        }
        let rhs = self.parse_expr();
        self.end_statement();
        self.builder.assignment(token.pos, &token.text, rhs)
    }

    fn end_statement(&mut self) {
        if self.expect(TokenKind::Semicolon, "\";\"").is_none() {
            self.resync();
        }
    }

    fn parse_if(&mut self, pos: SourcePos) -> Stmt {
        let condition = self.parse_parenthesized_condition();
        let then_branch = self.parse_statement();
        let else_branch = if self.eat_word("else") {
            self.parse_statement()
        } else {
            Stmt::empty()
        };
        self.builder
            .if_statement(pos, condition, then_branch, else_branch)
    }

    fn parse_while(&mut self, pos: SourcePos) -> Stmt {
        let condition = self.parse_parenthesized_condition();
        let body = self.parse_statement();
        self.builder.while_statement(pos, condition, body)
    }

    fn parse_foreach(&mut self, pos: SourcePos) -> Stmt {
        if self.expect(TokenKind::LeftParen, "\"(\"").is_none() {
            self.resync();
            return Stmt::empty();
        }
        let kind = if self.eat_word("worm") {
            ForeachKind::Worm
        } else if self.eat_word("food") {
            ForeachKind::Food
        } else if self.eat_word("any") {
            ForeachKind::Any
        } else {
            self.errors.push(ProgramError::syntax(
                self.here(),
                "expected \"worm\", \"food\" or \"any\"",
            ));
            self.resync();
            return Stmt::empty();
        };
        if self.expect(TokenKind::Comma, "\",\"").is_none() {
            self.resync();
            return Stmt::empty();
        }
        let Some(variable) = self.expect(TokenKind::Identifier, "a variable name") else {
            self.resync();
            return Stmt::empty();
        };
        if self.expect(TokenKind::RightParen, "\")\"").is_none() {
            self.resync();
            return Stmt::empty();
        }
        let body = self.parse_statement();
        self.builder.foreach(pos, kind, &variable.text, body)
    }

    fn parse_parenthesized_condition(&mut self) -> wl_core::Expr {
        if self.expect(TokenKind::LeftParen, "\"(\"").is_none() {
            return self.builder.boolean_literal(false);
        }
        let condition = self.parse_expr();
        self.expect(TokenKind::RightParen, "\")\"");
        condition
    }

    // ---- expressions, by descending precedence ----

    fn parse_expr(&mut self) -> wl_core::Expr {
        let mut lhs = self.parse_and();
        while self.at_kind(TokenKind::Or) {
            let pos = self.here();
            self.index += 1;
            let rhs = self.parse_and();
            lhs = self.builder.binary(pos, BinaryOp::Or, lhs, rhs);
        }
        lhs
    }

    fn parse_and(&mut self) -> wl_core::Expr {
        let mut lhs = self.parse_equality();
        while self.at_kind(TokenKind::And) {
            let pos = self.here();
            self.index += 1;
            let rhs = self.parse_equality();
            lhs = self.builder.binary(pos, BinaryOp::And, lhs, rhs);
        }
        lhs
    }

    fn parse_equality(&mut self) -> wl_core::Expr {
        let mut lhs = self.parse_comparison();
        loop {
            let op = if self.at_kind(TokenKind::Equal) {
                BinaryOp::Equal
            } else if self.at_kind(TokenKind::NotEqual) {
                BinaryOp::NotEqual
            } else {
                return lhs;
            };
            let pos = self.here();
            self.index += 1;
            let rhs = self.parse_comparison();
            lhs = self.builder.binary(pos, op, lhs, rhs);
        }
    }

    fn parse_comparison(&mut self) -> wl_core::Expr {
        let mut lhs = self.parse_additive();
        loop {
            let op = if self.at_kind(TokenKind::LessThanOrEqual) {
                BinaryOp::LessThanOrEqual
            } else if self.at_kind(TokenKind::GreaterThanOrEqual) {
                BinaryOp::GreaterThanOrEqual
            } else if self.at_kind(TokenKind::LessThan) {
                BinaryOp::LessThan
            } else if self.at_kind(TokenKind::GreaterThan) {
                BinaryOp::GreaterThan
            } else {
                return lhs;
            };
            let pos = self.here();
            self.index += 1;
            let rhs = self.parse_additive();
            lhs = self.builder.binary(pos, op, lhs, rhs);
        }
    }

    fn parse_additive(&mut self) -> wl_core::Expr {
        let mut lhs = self.parse_term();
        loop {
            let op = if self.at_kind(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.at_kind(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                return lhs;
            };
            let pos = self.here();
            self.index += 1;
            let rhs = self.parse_term();
            lhs = self.builder.binary(pos, op, lhs, rhs);
        }
    }

    fn parse_term(&mut self) -> wl_core::Expr {
        let mut lhs = self.parse_unary();
        loop {
            let op = if self.at_kind(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.at_kind(TokenKind::Slash) {
                BinaryOp::Div
            } else {
                return lhs;
            };
            let pos = self.here();
            self.index += 1;
            let rhs = self.parse_unary();
            lhs = self.builder.binary(pos, op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> wl_core::Expr {
        let pos = self.here();
        if self.eat_kind(TokenKind::Minus) {
            // Negation is subtraction from zero; the language has no
            // dedicated negate node.
            let operand = self.parse_unary();
            let zero = self.builder.number_literal(0.0);
            return self.builder.binary(pos, BinaryOp::Sub, zero, operand);
        }
        if self.eat_kind(TokenKind::Not) {
            let operand = self.parse_unary();
            return self.builder.unary(pos, UnaryOp::Not, operand);
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> wl_core::Expr {
        let pos = self.here();
        if self.eat_kind(TokenKind::LeftParen) {
            let inner = self.parse_expr();
            self.expect(TokenKind::RightParen, "\")\"");
            return inner;
        }

        // Structural tokens stay put so the statement level can recover at
        // them; everything else is consumed to guarantee forward progress.
        if matches!(
            self.peek().map(|token| token.kind),
            Some(TokenKind::Semicolon)
                | Some(TokenKind::RightBrace)
                | Some(TokenKind::RightParen)
                | Some(TokenKind::Comma)
        ) {
            let token = self.peek().expect("just matched").clone();
            self.errors.push(ProgramError::syntax(
                token.pos,
                format!("expected an expression, found \"{}\"", token.text),
            ));
            return self.builder.number_literal(0.0);
        }

        let Some(token) = self.advance() else {
            self.errors.push(ProgramError::syntax(
                pos,
                "expected an expression, found the end of the program",
            ));
            return self.builder.number_literal(0.0);
        };

        match token.kind {
            TokenKind::Number => match token.text.parse::<f64>() {
                Ok(value) => self.builder.number_literal(value),
                Err(_) => {
                    self.errors.push(ProgramError::syntax(
                        token.pos,
                        format!("\"{}\" is not a valid number", token.text),
                    ));
                    self.builder.number_literal(0.0)
                }
            },
            TokenKind::Identifier => self.parse_named_primary(token),
            _ => {
                self.errors.push(ProgramError::syntax(
                    token.pos,
                    format!("expected an expression, found \"{}\"", token.text),
                ));
                self.builder.number_literal(0.0)
            }
        }
    }

    fn parse_named_primary(&mut self, token: Token) -> wl_core::Expr {
        match token.text.as_str() {
            "true" => return self.builder.boolean_literal(true),
            "false" => return self.builder.boolean_literal(false),
            "null" => return self.builder.null_literal(),
            "self" => return self.builder.self_entity(),
            _ => {}
        }

        let query = match token.text.as_str() {
            "getx" => Some(EntityQuery::PositionX),
            "gety" => Some(EntityQuery::PositionY),
            "getradius" => Some(EntityQuery::Radius),
            "getdir" => Some(EntityQuery::Direction),
            "getap" => Some(EntityQuery::ActionPoints),
            "getmaxap" => Some(EntityQuery::MaxActionPoints),
            "gethp" => Some(EntityQuery::HitPoints),
            "getmaxhp" => Some(EntityQuery::MaxHitPoints),
            "sameteam" => Some(EntityQuery::SameTeam),
            "isworm" => Some(EntityQuery::IsWorm),
            "isfood" => Some(EntityQuery::IsFood),
            _ => None,
        };
        if let Some(query) = query {
            let argument = self.parse_function_argument();
            return self.builder.entity_query(token.pos, query, argument);
        }

        let unary = match token.text.as_str() {
            "sqrt" => Some(UnaryOp::Sqrt),
            "sin" => Some(UnaryOp::Sin),
            "cos" => Some(UnaryOp::Cos),
            _ => None,
        };
        if let Some(op) = unary {
            let argument = self.parse_function_argument();
            return self.builder.unary(token.pos, op, argument);
        }

        if token.text == "searchobj" {
            let argument = self.parse_function_argument();
            return self.builder.search_object(token.pos, argument);
        }

        if is_keyword(&token.text) {
            self.errors.push(ProgramError::syntax(
                token.pos,
                format!("\"{}\" cannot start an expression", token.text),
            ));
            return self.builder.number_literal(0.0);
        }

        let declared = self.variables.get(&token.text).map(|variable| variable.ty());
        self.builder
            .variable_access(token.pos, &token.text, declared)
    }

    fn parse_function_argument(&mut self) -> wl_core::Expr {
        if self.expect(TokenKind::LeftParen, "\"(\"").is_none() {
            return self.builder.number_literal(0.0);
        }
        let argument = self.parse_expr();
        self.expect(TokenKind::RightParen, "\")\"");
        argument
    }
}

#[cfg(test)]
mod tests;
