// PQL Lexer Implementation
//
// This module implements a table-driven finite-state scanner that splits a
// PQL statement into tokens.

use std::fmt;

use super::ParseError;

/// Reserved words of PQL, matched case-insensitively
pub const KEYWORDS: [&str; 16] = [
    "CREATE", "USE", "DROP", "SELECT", "UPDATE", "INSERT", "DELETE", "KEYSPACE",
    "COLUMNFAMILY", "KEY", "FROM", "WHERE", "SET", "INTO", "VALUES", "KILL",
];

/// PQL token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Keyword,
    Variable,
    LeftParen,
    RightParen,
    Equal,
    Comma,
}

/// A Token represents a lexical unit of a PQL statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    /// Uppercased keyword, verbatim variable text, or the punctuation mark
    pub literal: String,
}

impl Token {
    pub fn new(token_type: TokenType, literal: impl Into<String>) -> Self {
        Token {
            token_type,
            literal: literal.into(),
        }
    }

    pub fn keyword(word: &str) -> Self {
        Token::new(TokenType::Keyword, word.to_uppercase())
    }

    pub fn variable(value: impl Into<String>) -> Self {
        Token::new(TokenType::Variable, value)
    }

    fn symbol(ch: char) -> Option<Self> {
        let token_type = match ch {
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            '=' => TokenType::Equal,
            ',' => TokenType::Comma,
            _ => return None,
        };
        Some(Token::new(token_type, ch.to_string()))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}({})", self.token_type, self.literal)
    }
}

/// Scanner states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Init,
    ReadingWord,
    WordDone,
    SymbolDone,
    ReadingQuoted,
    QuotedDone,
    Error,
}

impl LexState {
    fn is_accepting(self) -> bool {
        matches!(self, LexState::WordDone | LexState::SymbolDone | LexState::QuotedDone)
    }
}

/// Character classes seen by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputClass {
    Letter,
    Whitespace,
    Symbol,
    Quote,
    Other,
    End,
}

impl InputClass {
    fn of(ch: Option<char>) -> Self {
        match ch {
            None => InputClass::End,
            Some(c) if c.is_ascii_alphabetic() => InputClass::Letter,
            Some(' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r') => InputClass::Whitespace,
            Some('(' | ')' | '=' | ',') => InputClass::Symbol,
            Some('"') => InputClass::Quote,
            Some(_) => InputClass::Other,
        }
    }
}

/// Transition table of the scanner. Accepting states have no successors.
fn transition(state: LexState, input: InputClass) -> LexState {
    use InputClass as I;
    use LexState as S;

    match (state, input) {
        (S::Init, I::Letter) => S::ReadingWord,
        (S::Init, I::Whitespace) => S::Init,
        (S::Init, I::Symbol) => S::SymbolDone,
        (S::Init, I::Quote) => S::ReadingQuoted,

        (S::ReadingWord, I::Letter | I::Quote) => S::ReadingWord,
        (S::ReadingWord, I::Whitespace | I::Symbol | I::End) => S::WordDone,

        (S::ReadingQuoted, I::Quote) => S::QuotedDone,
        (S::ReadingQuoted, I::End) => S::Error,
        (S::ReadingQuoted, _) => S::ReadingQuoted,

        _ => S::Error,
    }
}

/// PQL Lexer producing tokens lazily from a statement string
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    failed: bool,
}

impl Lexer {
    /// Create a new lexer from a PQL statement
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            pos: 0,
            failed: false,
        }
    }

    /// True while unread characters remain. Trailing whitespace counts as
    /// input even though it yields no further token.
    pub fn has_next(&self) -> bool {
        !self.failed && self.pos < self.input.len()
    }

    /// Scan the whole statement
    pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
        Lexer::new(input).collect()
    }

    /// Scan the next token, `Ok(None)` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        let mut state = LexState::Init;
        let mut lexeme = String::new();
        let mut token_start = self.pos;

        while !state.is_accepting() {
            let ch = self.input.get(self.pos).copied();
            let input = InputClass::of(ch);

            if state == LexState::Init && input == InputClass::End {
                return Ok(None);
            }

            let next = transition(state, input);
            match next {
                LexState::Error => {
                    return Err(match (state, ch) {
                        (LexState::ReadingQuoted, None) => ParseError::UnterminatedQuote(token_start),
                        (_, Some(c)) => ParseError::UnknownSymbol(c, self.pos),
                        (_, None) => ParseError::UnterminatedQuote(token_start),
                    });
                }
                // The terminating character belongs to the next token
                LexState::WordDone => {}
                _ => {
                    if state == LexState::Init && next != LexState::Init {
                        token_start = self.pos;
                    }
                    self.pos += 1;
                    if input != InputClass::Quote
                        && matches!(next, LexState::ReadingWord | LexState::ReadingQuoted | LexState::SymbolDone)
                    {
                        if let Some(c) = ch {
                            lexeme.push(c);
                        }
                    }
                }
            }
            state = next;
        }

        let token = match state {
            LexState::SymbolDone => lexeme.chars().next().and_then(Token::symbol),
            LexState::QuotedDone => Some(Token::variable(lexeme)),
            LexState::WordDone => {
                if is_keyword(&lexeme) {
                    Some(Token::keyword(&lexeme))
                } else {
                    Some(Token::variable(lexeme))
                }
            }
            _ => None,
        };
        token
            .map(Some)
            .ok_or(ParseError::UnknownSymbol('\0', token_start))
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Check if a bare word is a reserved keyword
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|keyword| keyword.eq_ignore_ascii_case(word))
}
