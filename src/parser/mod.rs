pub mod ast;

use crate::{
    error::ParseError,
    lexer::{
        token::{Token, TokenKind},
        Lexer,
    },
    parser::ast::{Block, Expr, Ident, Infix, Literal, Precedence, Prefix, Program, Statement},
};
use tracing::debug;

type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> Option<Expr>;
type InfixParseFn<'a> = fn(&mut Parser<'a>, Expr) -> Option<Expr>;

/// Pratt parser over a [`Lexer`] with one token of lookahead.
///
/// Syntax errors are accumulated rather than aborting the parse: a failing
/// production yields no node, the enclosing statement is dropped, and parsing
/// resumes at the next token.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();

        Self {
            lexer,
            current,
            peek,
            errors: vec![],
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = vec![];

        while !self.current_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        Program::new(statements)
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        self.expect_peek(TokenKind::Ident)?;
        let ident = self.current.literal.clone();
        self.expect_peek(TokenKind::Assign)?;
        self.next_token();

        let expr = self.parse_expression(Precedence::Lowest)?;
        self.parse_to_semicolon_if_exists();

        Some(Statement::Let(ident, expr))
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();

        let expr = self.parse_expression(Precedence::Lowest)?;
        self.parse_to_semicolon_if_exists();

        Some(Statement::Return(expr))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.parse_to_semicolon_if_exists();

        Some(Statement::Expression(expr))
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let prefix = match Self::prefix_rule(self.current.kind) {
            Some(prefix) => prefix,
            None => {
                self.push_error(ParseError::NoPrefixParseFn(self.current.kind));
                return None;
            }
        };

        let mut left = prefix(self)?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let infix = match Self::infix_rule(self.peek.kind) {
                Some(infix) => infix,
                None => return Some(left),
            };

            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn prefix_rule(kind: TokenKind) -> Option<PrefixParseFn<'a>> {
        let rule: PrefixParseFn<'a> = match kind {
            TokenKind::Ident => Self::parse_identifier,
            TokenKind::Int => Self::parse_integer_literal,
            TokenKind::Str => Self::parse_string_literal,
            TokenKind::True | TokenKind::False => Self::parse_boolean,
            TokenKind::Bang | TokenKind::Minus => Self::parse_prefix,
            TokenKind::LParen => Self::parse_paren,
            TokenKind::If => Self::parse_if,
            TokenKind::Function => Self::parse_function,
            TokenKind::LBracket => Self::parse_vector,
            TokenKind::LBrace => Self::parse_dict,
            _ => return None,
        };

        Some(rule)
    }

    fn infix_rule(kind: TokenKind) -> Option<InfixParseFn<'a>> {
        let rule: InfixParseFn<'a> = match kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Gt => Self::parse_infix,
            TokenKind::LParen => Self::parse_call,
            TokenKind::LBracket => Self::parse_index,
            _ => return None,
        };

        Some(rule)
    }

    fn precedence_of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen => Precedence::Call,
            TokenKind::LBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }

    fn parse_identifier(&mut self) -> Option<Expr> {
        Some(Expr::Ident(self.current.literal.clone()))
    }

    fn parse_integer_literal(&mut self) -> Option<Expr> {
        match self.current.literal.parse::<i64>() {
            Ok(int) => Some(Expr::Literal(Literal::Int(int))),
            Err(_) => {
                self.push_error(ParseError::InvalidInteger(self.current.literal.clone()));
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expr> {
        Some(Expr::Literal(Literal::Str(self.current.literal.clone())))
    }

    fn parse_boolean(&mut self) -> Option<Expr> {
        Some(Expr::Literal(Literal::Bool(
            self.current_is(TokenKind::True),
        )))
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        let prefix = match self.current.kind {
            TokenKind::Bang => Prefix::Bang,
            TokenKind::Minus => Prefix::Minus,
            kind => unreachable!("prefix rule registered for {}", kind),
        };
        self.next_token();

        let expr = self.parse_expression(Precedence::Prefix)?;

        Some(Expr::Prefix(prefix, Box::new(expr)))
    }

    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        let infix = match self.current.kind {
            TokenKind::Plus => Infix::Plus,
            TokenKind::Minus => Infix::Minus,
            TokenKind::Asterisk => Infix::Multiply,
            TokenKind::Slash => Infix::Divide,
            TokenKind::Eq => Infix::Equal,
            TokenKind::NotEq => Infix::NotEqual,
            TokenKind::Lt => Infix::LessThan,
            TokenKind::Gt => Infix::GreaterThan,
            kind => unreachable!("infix rule registered for {}", kind),
        };
        let precedence = self.current_precedence();
        self.next_token();

        let right = self.parse_expression(precedence)?;

        Some(Expr::Infix(infix, Box::new(left), Box::new(right)))
    }

    fn parse_paren(&mut self) -> Option<Expr> {
        self.next_token();

        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;

        Some(expr)
    }

    fn parse_if(&mut self) -> Option<Expr> {
        self.expect_peek(TokenKind::LParen)?;
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        self.expect_peek(TokenKind::LBrace)?;
        let consequence = self.parse_block()?;

        let alternative = if self.peek_is(TokenKind::Else) {
            self.next_token();
            self.expect_peek(TokenKind::LBrace)?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Some(Expr::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function(&mut self) -> Option<Expr> {
        self.expect_peek(TokenKind::LParen)?;
        let params = self.parse_function_params()?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block()?;

        Some(Expr::Function { params, body })
    }

    fn parse_function_params(&mut self) -> Option<Vec<Ident>> {
        if self.peek_is(TokenKind::RParen) {
            self.next_token();
            return Some(vec![]);
        }

        self.expect_peek(TokenKind::Ident)?;
        let mut idents = vec![self.current.literal.clone()];

        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.expect_peek(TokenKind::Ident)?;
            idents.push(self.current.literal.clone());
        }

        self.expect_peek(TokenKind::RParen)?;

        Some(idents)
    }

    /// Parses statements up to the closing `}`; the current token is the opening `{`.
    fn parse_block(&mut self) -> Option<Block> {
        let mut statements = vec![];
        self.next_token();

        while !self.current_is(TokenKind::RBrace) {
            if self.current_is(TokenKind::Eof) {
                self.push_error(ParseError::UnexpectedToken {
                    expected: TokenKind::RBrace,
                    got: TokenKind::Eof,
                });
                return None;
            }
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        Some(Block::new(statements))
    }

    fn parse_call(&mut self, function: Expr) -> Option<Expr> {
        let arguments = self.parse_expr_list(TokenKind::RParen)?;

        Some(Expr::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_vector(&mut self) -> Option<Expr> {
        let elements = self.parse_expr_list(TokenKind::RBracket)?;

        Some(Expr::Vector(elements))
    }

    /// Comma-separated expressions up to `end`; the current token is the opening delimiter.
    fn parse_expr_list(&mut self, end: TokenKind) -> Option<Vec<Expr>> {
        if self.peek_is(end) {
            self.next_token();
            return Some(vec![]);
        }

        self.next_token();
        let mut exprs = vec![self.parse_expression(Precedence::Lowest)?];

        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            exprs.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;

        Some(exprs)
    }

    fn parse_index(&mut self, left: Expr) -> Option<Expr> {
        self.next_token();

        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RBracket)?;

        Some(Expr::Index(Box::new(left), Box::new(index)))
    }

    fn parse_dict(&mut self) -> Option<Expr> {
        let mut pairs = vec![];

        while !self.peek_is(TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_is(TokenKind::RBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }

        self.expect_peek(TokenKind::RBrace)?;

        Some(Expr::Dict(pairs))
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    /// Advances when the peek token has the expected kind, otherwise records an error.
    fn expect_peek(&mut self, kind: TokenKind) -> Option<()> {
        if self.peek_is(kind) {
            self.next_token();
            Some(())
        } else {
            self.push_error(ParseError::UnexpectedToken {
                expected: kind,
                got: self.peek.kind,
            });
            None
        }
    }

    fn peek_precedence(&self) -> Precedence {
        Self::precedence_of(self.peek.kind)
    }

    fn current_precedence(&self) -> Precedence {
        Self::precedence_of(self.current.kind)
    }

    fn parse_to_semicolon_if_exists(&mut self) {
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    fn push_error(&mut self, error: ParseError) {
        debug!(%error, "syntax error");
        self.errors.push(error);
    }
}

/// Parses `input` into a program plus every syntax error encountered, in order.
pub fn parse(input: &str) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();

    (program, parser.into_errors())
}
