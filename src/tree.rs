//! The binary tree produced by the parser.

use crate::expr::{BinaryOperation, Symbol};
use num_bigint::BigInt;
use std::fmt::{self, Display, Formatter};

/// The index of a node inside an [`ExpressionTree`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The unary functions which may appear in a tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Function {
    Sine,
    Cosine,
    /// The natural logarithm.
    Log,
    Exp,
}

impl Function {
    /// The token which opens a call to this function, including its
    /// parenthesis.
    pub fn token(self) -> &'static str {
        match self {
            Function::Sine => "sin(",
            Function::Cosine => "cos(",
            Function::Log => "log(",
            Function::Exp => "exp(",
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// The token held by a single node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A node which hasn't been filled in yet.
    Empty,
    Operator(BinaryOperation),
    Function(Function),
    Integer(BigInt),
    Symbol(Symbol),
}

impl Value {
    /// Is this a literal number?
    pub fn is_literal(&self) -> bool {
        match self {
            Value::Integer(_) => true,
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Operator(op) => write!(f, "{}", op.symbol()),
            Value::Function(function) => write!(f, "{}", function),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    value: Value,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// A binary tree where operators and functions are internal nodes, and
/// literals or symbols are leaves.
///
/// Nodes live in a single arena and refer to their children by [`NodeId`].
/// Children can only be created with [`ExpressionTree::insert_left()`] and
/// [`ExpressionTree::insert_right()`], so every node except the root has
/// exactly one parent.
///
/// # Panics
///
/// Methods accepting a [`NodeId`] will panic if it came from a different
/// tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTree {
    nodes: Vec<Node>,
}

impl ExpressionTree {
    /// Create a tree containing a single node.
    pub fn new(value: Value) -> Self {
        ExpressionTree {
            nodes: vec![Node {
                value,
                left: None,
                right: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId { NodeId(0) }

    pub fn len(&self) -> usize { self.nodes.len() }

    /// Give `parent` a new left child holding `value`.
    ///
    /// If `parent` already has a left child, the new node is inserted between
    /// them and the old left subtree becomes the new node's left child.
    pub fn insert_left(&mut self, parent: NodeId, value: Value) -> NodeId {
        let existing = self.node(parent).left;
        let child = self.push(Node {
            value,
            left: existing,
            right: None,
        });
        self.node_mut(parent).left = Some(child);

        child
    }

    /// Give `parent` a new right child holding `value`.
    ///
    /// If `parent` already has a right child, the new node is inserted
    /// between them and the old right subtree becomes the new node's right
    /// child.
    pub fn insert_right(&mut self, parent: NodeId, value: Value) -> NodeId {
        let existing = self.node(parent).right;
        let child = self.push(Node {
            value,
            left: None,
            right: existing,
        });
        self.node_mut(parent).right = Some(child);

        child
    }

    pub fn set_value(&mut self, node: NodeId, value: Value) {
        self.node_mut(node).value = value;
    }

    pub fn value(&self, node: NodeId) -> &Value { &self.node(node).value }

    pub fn left(&self, node: NodeId) -> Option<NodeId> { self.node(node).left }

    pub fn right(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).right
    }

    /// Get a read-only view of a node.
    pub fn get(&self, node: NodeId) -> NodeRef<'_> {
        assert!(node.0 < self.nodes.len(), "{} isn't in this tree", node);
        NodeRef { tree: self, id: node }
    }

    pub(crate) fn root_ref(&self) -> NodeRef<'_> { self.get(self.root()) }

    /// Find the first node whose value doesn't agree with its children.
    ///
    /// Binary operators need both children, functions need only a right
    /// child, literals and symbols must be leaves, and nothing may be
    /// [`Value::Empty`].
    pub(crate) fn find_incomplete_node(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| !node.is_complete())
            .map(NodeId)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn node(&self, id: NodeId) -> &Node { &self.nodes[id.0] }

    fn node_mut(&mut self, id: NodeId) -> &mut Node { &mut self.nodes[id.0] }
}

impl Node {
    fn is_complete(&self) -> bool {
        match (&self.value, self.left, self.right) {
            (Value::Operator(_), Some(_), Some(_)) => true,
            (Value::Function(_), None, Some(_)) => true,
            (Value::Integer(_), None, None)
            | (Value::Symbol(_), None, None) => true,
            _ => false,
        }
    }
}

impl Default for ExpressionTree {
    fn default() -> Self { ExpressionTree::new(Value::Empty) }
}

/// Writes the tree back out as space-separated tokens.
impl Display for ExpressionTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_node(self.root_ref(), f)
    }
}

fn write_node(node: NodeRef<'_>, f: &mut Formatter<'_>) -> fmt::Result {
    match (node.value(), node.left(), node.right()) {
        (Value::Function(function), None, Some(argument)) => {
            write!(f, "{} ", function)?;
            write_node(argument, f)?;
            write!(f, " )")
        },
        (value, Some(left), Some(right)) => {
            write!(f, "( ")?;
            write_node(left, f)?;
            write!(f, " {} ", value)?;
            write_node(right, f)?;
            write!(f, " )")
        },
        (value, _, _) => write!(f, "{}", value),
    }
}

/// A read-only cursor pointing at one node in an [`ExpressionTree`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NodeRef<'a> {
    tree: &'a ExpressionTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(self) -> NodeId { self.id }

    pub fn value(self) -> &'a Value { self.tree.value(self.id) }

    pub fn left(self) -> Option<NodeRef<'a>> {
        self.tree.left(self.id).map(|id| self.tree.get(id))
    }

    pub fn right(self) -> Option<NodeRef<'a>> {
        self.tree.right(self.id).map(|id| self.tree.get(id))
    }

    pub fn is_leaf(self) -> bool {
        self.tree.left(self.id).is_none() && self.tree.right(self.id).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(name: &str) -> Value { Value::Symbol(Symbol::named(name)) }

    fn integer(value: i64) -> Value { Value::Integer(value.into()) }

    #[test]
    fn a_new_tree_has_a_single_leaf() {
        let tree = ExpressionTree::new(symbol("x"));

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.value(tree.root()), &symbol("x"));
        assert!(tree.root_ref().is_leaf());
    }

    #[test]
    fn insert_children() {
        let mut tree =
            ExpressionTree::new(Value::Operator(BinaryOperation::Plus));
        let root = tree.root();

        let left = tree.insert_left(root, symbol("x"));
        let right = tree.insert_right(root, integer(1));

        assert_eq!(tree.left(root), Some(left));
        assert_eq!(tree.right(root), Some(right));
        assert_eq!(tree.value(left), &symbol("x"));
        assert_eq!(tree.value(right), &integer(1));
        assert_eq!(tree.to_string(), "( x + 1 )");
    }

    #[test]
    fn inserting_left_twice_shifts_the_old_child_down() {
        let mut tree = ExpressionTree::default();
        let root = tree.root();

        let first = tree.insert_left(root, integer(1));
        let second = tree.insert_left(root, integer(2));

        assert_eq!(tree.left(root), Some(second));
        assert_eq!(tree.left(second), Some(first));
        assert_eq!(tree.right(second), None);
        assert!(tree.get(first).is_leaf());
    }

    #[test]
    fn inserting_right_twice_shifts_the_old_child_down() {
        let mut tree = ExpressionTree::default();
        let root = tree.root();

        let first = tree.insert_right(root, integer(1));
        let second = tree.insert_right(root, integer(2));

        assert_eq!(tree.right(root), Some(second));
        assert_eq!(tree.right(second), Some(first));
        assert_eq!(tree.left(second), None);
    }

    #[test]
    fn set_value_replaces_the_token() {
        let mut tree = ExpressionTree::default();
        let root = tree.root();

        tree.set_value(root, Value::Function(Function::Sine));

        assert_eq!(tree.value(root), &Value::Function(Function::Sine));
    }

    #[test]
    fn detect_incomplete_nodes() {
        let mut tree = ExpressionTree::new(Value::Function(Function::Exp));
        let root = tree.root();
        assert_eq!(tree.find_incomplete_node(), Some(root));

        let argument = tree.insert_right(root, Value::Empty);
        assert_eq!(tree.find_incomplete_node(), Some(argument));

        tree.set_value(argument, symbol("y"));
        assert_eq!(tree.find_incomplete_node(), None);
        assert_eq!(tree.to_string(), "exp( y )");

        tree.insert_left(root, integer(2));
        assert_eq!(tree.find_incomplete_node(), Some(root));
    }
}
