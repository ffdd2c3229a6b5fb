// PQL Parser Implementation
//
// This module implements a table-driven predictive parser. A symbol stack
// drives the derivation; a parallel node stack and a boundary stack record
// which tree node the symbols of each expanded production belong to.

use crate::query::executor::result::{QueryError, QueryResult};

use super::ParseError;
use super::grammar::{Symbol, Terminal};
use super::lexer::{Lexer, Token};
use super::parse_tree::{NodeId, ParseTree};
use super::table::ParseTable;

/// PQL Parser for constructing a parse tree from tokens
pub struct Parser<'t> {
    table: &'t ParseTable,
}

impl Parser<'static> {
    /// Parser over the shared PQL table
    pub fn new() -> Self {
        Parser {
            table: ParseTable::pql(),
        }
    }
}

impl Default for Parser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t> Parser<'t> {
    pub fn with_table(table: &'t ParseTable) -> Self {
        Parser { table }
    }

    /// Scan and parse a statement
    pub fn parse_str(&self, input: &str) -> QueryResult<ParseTree> {
        let tokens = Lexer::tokenize(input)?;
        self.parse(&tokens)
    }

    /// Parse a token sequence. Parsing stops once the start symbol is fully
    /// derived, tokens past that point are not examined.
    pub fn parse(&self, tokens: &[Token]) -> QueryResult<ParseTree> {
        if tokens.is_empty() {
            return Err(QueryError::InvalidArguments("empty statement".to_string()));
        }

        let mut tree = ParseTree::new();
        let mut symbols: Vec<Symbol> = vec![
            Symbol::Terminal(Terminal::End),
            Symbol::NonTerminal(self.table.grammar().start()),
        ];
        let mut nodes: Vec<NodeId> = Vec::new();
        let mut boundaries: Vec<usize> = Vec::new();
        let mut cursor = 0;

        loop {
            // Close every production whose symbols are all consumed
            while boundaries.last() == Some(&symbols.len()) {
                boundaries.pop();
                nodes.pop();
            }

            let Some(symbol) = symbols.pop() else {
                break;
            };
            let current = tokens.get(cursor);
            let lookahead = current.map(Terminal::for_token).unwrap_or(Terminal::End);

            match symbol {
                Symbol::Terminal(Terminal::End) => break,
                Symbol::Terminal(Terminal::Epsilon) => {}
                Symbol::Terminal(expected) => {
                    let token = match current {
                        Some(token) if lookahead == expected => token,
                        _ => return Err(syntax_error(expected.to_string(), current)),
                    };
                    tree.add_node(nodes.last().copied(), symbol, Some(token.clone()));
                    cursor += 1;
                }
                Symbol::NonTerminal(non_terminal) => {
                    let production = self.table.get(non_terminal, lookahead).ok_or_else(|| {
                        let expected: Vec<String> = self
                            .table
                            .lookaheads(non_terminal)
                            .iter()
                            .map(|t| t.to_string())
                            .collect();
                        syntax_error(expected.join(" or "), current)
                    })?;

                    let node = tree.add_node(nodes.last().copied(), symbol, None);
                    boundaries.push(symbols.len());
                    nodes.push(node);
                    symbols.extend(production.symbols.iter().rev().copied());
                }
            }
        }

        Ok(tree)
    }
}

fn syntax_error(expected: String, found: Option<&Token>) -> QueryError {
    let found = match found {
        Some(token) => format!("'{}'", token.literal),
        None => "end of input".to_string(),
    };
    QueryError::Parse(ParseError::SyntaxError { expected, found })
}
