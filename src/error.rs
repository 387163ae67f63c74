use crate::lexer::token::TokenKind;
use thiserror::Error;

/// A syntax error recorded by the parser. Parsing continues after one is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no prefix parse function for {0}")]
    NoPrefixParseFn(TokenKind),
    #[error("expected next token to be {expected}, got {got} instead")]
    UnexpectedToken { expected: TokenKind, got: TokenKind },
    #[error("could not parse {0} as integer")]
    InvalidInteger(String),
}
