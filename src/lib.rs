pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod repl;

pub use error::ParseError;
pub use eval::{
    environment::{Env, Environment},
    evaluate,
    value::Value,
    Evaluate, Evaluator,
};
pub use lexer::{lex, Lexer};
pub use parser::parse;
