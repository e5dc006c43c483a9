use crate::ast::{BinOp, RelOp, UnaryOp};
use crate::value::Value;

/// Abstract Syntax Tree node.
///
/// A parsed template is a tree rooted at [`Node::Composite`]. Every node owns
/// its children exclusively; dropping the root drops the whole tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Constant: template text, number, string, boolean or null
    ///
    /// `image` is the decoded source text (the literal text itself for
    /// template text and strings).
    Literal { value: Value, image: String },

    /// Named reference with its postfix access chain
    ///
    /// # Examples
    /// ```text
    /// user                 // Identifier { name: "user", designators: [] }
    /// user.address[0]      // [Member("address"), Index(0)]
    /// fn:length(items)     // name "fn:length", [Call([items])]
    /// ```
    Identifier {
        name: String,
        designators: Vec<Designator>,
    },

    /// Parenthesized sub-expression `( expr )`
    Grouping(Box<Node>),

    /// Ternary choice `condition ? then : otherwise`
    Choice {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },

    /// Single relational comparison
    Relation {
        op: RelOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// Prefix operator
    Unary { op: UnaryOp, operand: Box<Node> },

    /// Left-folded chain of one operator: `a + b + c` holds three operands
    ///
    /// Always at least two operands.
    Binary { op: BinOp, operands: Vec<Node> },

    /// Top-level template: literal text and `${}`/`#{}` bodies in order
    Composite(Vec<Node>),
}

/// Postfix access step attached to an [`Node::Identifier`].
#[derive(Debug, Clone, PartialEq)]
pub enum Designator {
    /// `.name`
    Member(String),
    /// `[expr]`
    Index(Node),
    /// `(arg, ...)`
    Call(Vec<Node>),
}

impl Node {
    /// Template text or string literal.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Node::Literal {
            value: Value::String(text.clone()),
            image: text,
        }
    }

    pub fn literal(value: Value, image: impl Into<String>) -> Self {
        Node::Literal {
            value,
            image: image.into(),
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Node::Identifier {
            name: name.into(),
            designators: Vec::new(),
        }
    }

    /// Human-readable image of this node: the literal text, identifier name or
    /// operator symbol.
    pub fn image(&self) -> &str {
        match self {
            Node::Literal { image, .. } => image,
            Node::Identifier { name, .. } => name,
            Node::Grouping(_) => "()",
            Node::Choice { .. } => "?:",
            Node::Relation { op, .. } => op.symbol(),
            Node::Unary { op, .. } => op.symbol(),
            Node::Binary { op, .. } => op.symbol(),
            Node::Composite(_) => "",
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Literal { .. } => Vec::new(),
            Node::Identifier { designators, .. } => designators
                .iter()
                .flat_map(|d| match d {
                    Designator::Member(_) => Vec::new(),
                    Designator::Index(index) => vec![index],
                    Designator::Call(args) => args.iter().collect(),
                })
                .collect(),
            Node::Grouping(inner) => vec![inner],
            Node::Choice {
                condition,
                then,
                otherwise,
            } => vec![condition, then, otherwise],
            Node::Relation { left, right, .. } => vec![left, right],
            Node::Unary { operand, .. } => vec![operand],
            Node::Binary { operands, .. } => operands.iter().collect(),
            Node::Composite(parts) => parts.iter().collect(),
        }
    }

    /// Pre-order traversal: visits this node, then each child subtree in order.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a Node),
    {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}
