// Predictive Parse Table
//
// This module computes FIRST and FOLLOW sets over a grammar and derives the
// LL(1) decision table used by the parser. The PQL table is built once per
// process and shared read-only.

use std::collections::{HashMap, HashSet};

use log::debug;
use once_cell::sync::Lazy;

use super::grammar::{Grammar, NonTerminal, Production, Symbol, Terminal};

static PQL_TABLE: Lazy<ParseTable> = Lazy::new(|| TableBuilder::new(&Grammar::pql()).build());

/// Decision table mapping (non-terminal, lookahead) to a production
#[derive(Debug, Clone)]
pub struct ParseTable {
    grammar: Grammar,
    entries: HashMap<(NonTerminal, Terminal), usize>,
}

impl ParseTable {
    /// Shared table for the PQL grammar
    pub fn pql() -> &'static ParseTable {
        &PQL_TABLE
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Production to expand `non_terminal` with when `lookahead` is next
    pub fn get(&self, non_terminal: NonTerminal, lookahead: Terminal) -> Option<&Production> {
        self.entries
            .get(&(non_terminal, lookahead))
            .and_then(|&index| self.grammar.production(index))
    }

    /// Lookaheads with an entry for `non_terminal`, in terminal order
    pub fn lookaheads(&self, non_terminal: NonTerminal) -> Vec<Terminal> {
        let mut terminals: Vec<Terminal> = self
            .entries
            .keys()
            .filter(|(head, _)| *head == non_terminal)
            .map(|(_, terminal)| *terminal)
            .collect();
        terminals.sort();
        terminals
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Computes FIRST/FOLLOW sets and the predictive table for a grammar
pub struct TableBuilder<'g> {
    grammar: &'g Grammar,
}

impl<'g> TableBuilder<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        TableBuilder { grammar }
    }

    /// FIRST of a symbol sequence. Only the first non-EPSILON symbol is
    /// considered; a sequence with none contributes EPSILON.
    pub fn first(&self, symbols: &[Symbol]) -> Vec<Terminal> {
        let mut result = Vec::new();
        self.collect_first(symbols, &mut HashSet::new(), &mut result);
        result
    }

    fn collect_first(&self, symbols: &[Symbol], visiting: &mut HashSet<NonTerminal>, out: &mut Vec<Terminal>) {
        let head = symbols
            .iter()
            .find(|symbol| **symbol != Symbol::Terminal(Terminal::Epsilon));

        match head {
            None => push_unique(out, Terminal::Epsilon),
            Some(Symbol::Terminal(terminal)) => push_unique(out, *terminal),
            Some(Symbol::NonTerminal(non_terminal)) => {
                if !visiting.insert(*non_terminal) {
                    return;
                }
                for (_, production) in self.grammar.productions_of(*non_terminal) {
                    self.collect_first(&production.symbols, visiting, out);
                }
                visiting.remove(non_terminal);
            }
        }
    }

    /// FOLLOW of a non-terminal. END is not included here, the table builder
    /// adds it for every vanishing production.
    pub fn follow(&self, non_terminal: NonTerminal) -> Vec<Terminal> {
        let mut result = Vec::new();
        self.collect_follow(non_terminal, &mut HashSet::new(), &mut result);
        result
    }

    fn collect_follow(&self, target: NonTerminal, visited: &mut HashSet<NonTerminal>, out: &mut Vec<Terminal>) {
        if !visited.insert(target) {
            return;
        }

        for production in self.grammar.productions() {
            for (position, symbol) in production.symbols.iter().enumerate() {
                if *symbol != Symbol::NonTerminal(target) {
                    continue;
                }

                let rest = &production.symbols[position + 1..];
                let mut vanishes = rest.is_empty();
                if !rest.is_empty() {
                    for terminal in self.first(rest) {
                        if terminal == Terminal::Epsilon {
                            vanishes = true;
                        } else {
                            push_unique(out, terminal);
                        }
                    }
                }
                if vanishes {
                    self.collect_follow(production.head, visited, out);
                }
            }
        }
    }

    /// Build the predictive table. Entries are written in production order
    /// and a later production overwrites an earlier one for the same cell.
    pub fn build(&self) -> ParseTable {
        let mut entries = HashMap::new();

        for (index, production) in self.grammar.productions().iter().enumerate() {
            let first = self.first(&production.symbols);
            for terminal in &first {
                if *terminal != Terminal::Epsilon {
                    entries.insert((production.head, *terminal), index);
                }
            }

            if first.contains(&Terminal::Epsilon) {
                for terminal in self.follow(production.head) {
                    entries.insert((production.head, terminal), index);
                }
                entries.insert((production.head, Terminal::End), index);
            }
        }

        debug!(
            "Built parse table with {} entries for {} productions",
            entries.len(),
            self.grammar.productions().len()
        );

        ParseTable {
            grammar: self.grammar.clone(),
            entries,
        }
    }
}

fn push_unique(out: &mut Vec<Terminal>, terminal: Terminal) {
    if !out.contains(&terminal) {
        out.push(terminal);
    }
}
