// PQL Parser Module
//
// This module turns a PQL statement into a parse tree: the lexer produces
// tokens, the table builder derives a predictive table from the grammar, and
// the parser drives that table over the tokens.

pub mod grammar;
pub mod lexer;
pub mod parse_tree;
pub mod parser;
pub mod table;

use thiserror::Error;

// Export key types
pub use self::grammar::{Grammar, NonTerminal, Production, Symbol, Terminal};
pub use self::lexer::{Lexer, Token, TokenType};
pub use self::parse_tree::{NodeId, ParseNode, ParseTree};
pub use self::parser::Parser;
pub use self::table::{ParseTable, TableBuilder};

/// Lexical and syntax errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown symbol '{0}' at position {1}")]
    UnknownSymbol(char, usize),
    #[error("unterminated quote starting at position {0}")]
    UnterminatedQuote(usize),
    #[error("syntax error: expected {expected}, found {found}")]
    SyntaxError { expected: String, found: String },
}
