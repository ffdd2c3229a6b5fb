// Parse Tree
//
// Ordered n-ary tree of grammar symbols. Nodes live in an arena and refer to
// each other by index, so the parser can grow the tree from its stacks
// without shared mutable references.

use std::fmt;

use super::grammar::{NonTerminal, Symbol, Terminal};
use super::lexer::Token;

/// Index of a node inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    pub symbol: Symbol,
    /// Matched token, present on terminal leaves only
    pub token: Option<Token>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<ParseNode>,
    root: Option<NodeId>,
}

impl ParseTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under `parent`, or as the root when `parent` is `None`
    pub fn add_node(&mut self, parent: Option<NodeId>, symbol: Symbol, token: Option<Token>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ParseNode {
            symbol,
            token,
            children: Vec::new(),
        });
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => {
                if self.root.is_none() {
                    self.root = Some(id);
                }
            }
        }
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &ParseNode {
        &self.nodes[id.0]
    }

    pub fn symbol(&self, id: NodeId) -> Symbol {
        self.nodes[id.0].symbol
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Child at `position`, if any
    pub fn child(&self, id: NodeId, position: usize) -> Option<NodeId> {
        self.nodes[id.0].children.get(position).copied()
    }

    pub fn token(&self, id: NodeId) -> Option<&Token> {
        self.nodes[id.0].token.as_ref()
    }

    /// Non-terminal of the node, if it is an inner node
    pub fn non_terminal(&self, id: NodeId) -> Option<NonTerminal> {
        match self.nodes[id.0].symbol {
            Symbol::NonTerminal(n) => Some(n),
            Symbol::Terminal(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn fmt_node(&self, f: &mut fmt::Formatter, id: NodeId, depth: usize) -> fmt::Result {
        let node = self.node(id);
        write!(f, "{:indent$}{}", "", node.symbol, indent = depth * 2)?;
        if let Some(token) = &node.token {
            if node.symbol == Symbol::Terminal(Terminal::Var) {
                write!(f, " {:?}", token.literal)?;
            }
        }
        writeln!(f)?;
        for child in &node.children {
            self.fmt_node(f, *child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.root {
            Some(root) => self.fmt_node(f, root, 0),
            None => Ok(()),
        }
    }
}
