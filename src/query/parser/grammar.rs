// PQL Grammar Model
//
// This module declares the grammar symbols of PQL and its fixed LL(1)
// production set. Symbols form a closed enum so the table builder, the
// parser and the interpreter can all pattern match on them.

use std::fmt;

use super::lexer::{Token, TokenType};

/// Terminal symbols: the 16 keywords, punctuation, variables and the two
/// markers used by table construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Terminal {
    Create,
    Use,
    Drop,
    Select,
    Update,
    Insert,
    Delete,
    KeySpace,
    ColumnFamily,
    Key,
    From,
    Where,
    Set,
    Into,
    Values,
    Kill,
    LeftParen,
    RightParen,
    Equal,
    Comma,
    Var,
    Epsilon,
    End,
}

impl Terminal {
    pub const ALL: [Terminal; 23] = [
        Terminal::Create,
        Terminal::Use,
        Terminal::Drop,
        Terminal::Select,
        Terminal::Update,
        Terminal::Insert,
        Terminal::Delete,
        Terminal::KeySpace,
        Terminal::ColumnFamily,
        Terminal::Key,
        Terminal::From,
        Terminal::Where,
        Terminal::Set,
        Terminal::Into,
        Terminal::Values,
        Terminal::Kill,
        Terminal::LeftParen,
        Terminal::RightParen,
        Terminal::Equal,
        Terminal::Comma,
        Terminal::Var,
        Terminal::Epsilon,
        Terminal::End,
    ];

    /// Terminal for an uppercased keyword literal
    pub fn from_keyword(word: &str) -> Option<Terminal> {
        let terminal = match word {
            "CREATE" => Terminal::Create,
            "USE" => Terminal::Use,
            "DROP" => Terminal::Drop,
            "SELECT" => Terminal::Select,
            "UPDATE" => Terminal::Update,
            "INSERT" => Terminal::Insert,
            "DELETE" => Terminal::Delete,
            "KEYSPACE" => Terminal::KeySpace,
            "COLUMNFAMILY" => Terminal::ColumnFamily,
            "KEY" => Terminal::Key,
            "FROM" => Terminal::From,
            "WHERE" => Terminal::Where,
            "SET" => Terminal::Set,
            "INTO" => Terminal::Into,
            "VALUES" => Terminal::Values,
            "KILL" => Terminal::Kill,
            _ => return None,
        };
        Some(terminal)
    }

    /// Grammar code of a scanned token. Keyword tokens always carry one of
    /// the reserved words, anything else would not have been classified as
    /// a keyword by the lexer.
    pub fn for_token(token: &Token) -> Terminal {
        match token.token_type {
            TokenType::Keyword => Terminal::from_keyword(&token.literal).unwrap_or(Terminal::Var),
            TokenType::Variable => Terminal::Var,
            TokenType::LeftParen => Terminal::LeftParen,
            TokenType::RightParen => Terminal::RightParen,
            TokenType::Equal => Terminal::Equal,
            TokenType::Comma => Terminal::Comma,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Terminal::Create => "CREATE",
            Terminal::Use => "USE",
            Terminal::Drop => "DROP",
            Terminal::Select => "SELECT",
            Terminal::Update => "UPDATE",
            Terminal::Insert => "INSERT",
            Terminal::Delete => "DELETE",
            Terminal::KeySpace => "KEYSPACE",
            Terminal::ColumnFamily => "COLUMNFAMILY",
            Terminal::Key => "KEY",
            Terminal::From => "FROM",
            Terminal::Where => "WHERE",
            Terminal::Set => "SET",
            Terminal::Into => "INTO",
            Terminal::Values => "VALUES",
            Terminal::Kill => "KILL",
            Terminal::LeftParen => "(",
            Terminal::RightParen => ")",
            Terminal::Equal => "=",
            Terminal::Comma => ",",
            Terminal::Var => "VAR",
            Terminal::Epsilon => "EPSILON",
            Terminal::End => "END",
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NonTerminal {
    Start,
    CreateKeySpace,
    DropKeySpace,
    UseKeySpace,
    CreateColumnFamily,
    DropColumnFamily,
    Insert,
    Update,
    Select,
    Delete,
    Where,
    KvList,
    KvTail,
}

impl NonTerminal {
    pub const ALL: [NonTerminal; 13] = [
        NonTerminal::Start,
        NonTerminal::CreateKeySpace,
        NonTerminal::DropKeySpace,
        NonTerminal::UseKeySpace,
        NonTerminal::CreateColumnFamily,
        NonTerminal::DropColumnFamily,
        NonTerminal::Insert,
        NonTerminal::Update,
        NonTerminal::Select,
        NonTerminal::Delete,
        NonTerminal::Where,
        NonTerminal::KvList,
        NonTerminal::KvTail,
    ];

    /// The nine statement non-terminals reachable from `start`
    pub const STATEMENTS: [NonTerminal; 9] = [
        NonTerminal::CreateKeySpace,
        NonTerminal::DropKeySpace,
        NonTerminal::UseKeySpace,
        NonTerminal::CreateColumnFamily,
        NonTerminal::DropColumnFamily,
        NonTerminal::Insert,
        NonTerminal::Update,
        NonTerminal::Select,
        NonTerminal::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NonTerminal::Start => "start",
            NonTerminal::CreateKeySpace => "createKS",
            NonTerminal::DropKeySpace => "dropKS",
            NonTerminal::UseKeySpace => "useKS",
            NonTerminal::CreateColumnFamily => "createCF",
            NonTerminal::DropColumnFamily => "dropCF",
            NonTerminal::Insert => "insert",
            NonTerminal::Update => "update",
            NonTerminal::Select => "select",
            NonTerminal::Delete => "delete",
            NonTerminal::Where => "where",
            NonTerminal::KvList => "kvList",
            NonTerminal::KvTail => "kvTail",
        }
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grammar symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

impl From<Terminal> for Symbol {
    fn from(terminal: Terminal) -> Self {
        Symbol::Terminal(terminal)
    }
}

impl From<NonTerminal> for Symbol {
    fn from(non_terminal: NonTerminal) -> Self {
        Symbol::NonTerminal(non_terminal)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => write!(f, "{}", t),
            Symbol::NonTerminal(n) => write!(f, "{}", n),
        }
    }
}

/// One alternative of a non-terminal: a non-empty ordered symbol sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub head: NonTerminal,
    pub symbols: Vec<Symbol>,
}

impl Production {
    pub fn new(head: NonTerminal, symbols: Vec<Symbol>) -> Self {
        debug_assert!(!symbols.is_empty(), "production of {} is empty", head);
        Production { head, symbols }
    }

    pub fn is_epsilon(&self) -> bool {
        self.symbols.first() == Some(&Symbol::Terminal(Terminal::Epsilon))
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} :=", self.head)?;
        for symbol in &self.symbols {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// Ordered production set with a start symbol
#[derive(Debug, Clone)]
pub struct Grammar {
    start: NonTerminal,
    productions: Vec<Production>,
}

impl Grammar {
    pub fn new(start: NonTerminal, productions: Vec<Production>) -> Self {
        Grammar { start, productions }
    }

    /// The fixed PQL grammar
    pub fn pql() -> Self {
        use NonTerminal as N;
        use Terminal as T;

        fn p(head: NonTerminal, symbols: &[Symbol]) -> Production {
            Production::new(head, symbols.to_vec())
        }
        let t = Symbol::Terminal;
        let n = Symbol::NonTerminal;

        let mut productions: Vec<Production> = N::STATEMENTS.iter().map(|&s| p(N::Start, &[n(s)])).collect();
        productions.extend([
            p(N::CreateKeySpace, &[t(T::KeySpace), t(T::Var)]),
            p(N::DropKeySpace, &[t(T::Kill), t(T::Var)]),
            p(N::UseKeySpace, &[t(T::Use), t(T::Var)]),
            p(N::CreateColumnFamily, &[t(T::Create), t(T::ColumnFamily), t(T::Var)]),
            p(N::DropColumnFamily, &[t(T::Drop), t(T::ColumnFamily), t(T::Var)]),
            p(
                N::Insert,
                &[t(T::Insert), t(T::Into), t(T::Var), t(T::LeftParen), n(N::KvList), t(T::RightParen)],
            ),
            p(N::Update, &[t(T::Update), t(T::Var), t(T::Set), n(N::KvList)]),
            p(N::Select, &[t(T::Select), t(T::From), t(T::Var), n(N::Where)]),
            p(N::Delete, &[t(T::Delete), t(T::From), t(T::Var), n(N::Where)]),
            p(N::Where, &[t(T::Where), t(T::Key), t(T::Equal), t(T::Var)]),
            p(N::KvList, &[t(T::Key), t(T::Equal), t(T::Var), n(N::KvTail)]),
            p(N::KvTail, &[t(T::Comma), t(T::Var), t(T::Equal), t(T::Var), n(N::KvTail)]),
            p(N::KvTail, &[t(T::Epsilon)]),
        ]);

        Grammar::new(N::Start, productions)
    }

    pub fn start(&self) -> NonTerminal {
        self.start
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> Option<&Production> {
        self.productions.get(index)
    }

    /// Productions of `head` with their indices, in declaration order
    pub fn productions_of(&self, head: NonTerminal) -> impl Iterator<Item = (usize, &Production)> {
        self.productions.iter().enumerate().filter(move |(_, p)| p.head == head)
    }
}
