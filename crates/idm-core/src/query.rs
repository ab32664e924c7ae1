//! Search query expressions.
//!
//! Queries are immutable trees built bottom-up: comparison and membership
//! leaves combined with [`Expression::and`] / [`Expression::or`]. The algebra
//! only models the tree; rendering it into a wire filter is the directory
//! layer's concern.
//!
//! Combining two nodes of the same boolean type flattens into a single node
//! (children in insertion order); combining different types nests exactly one
//! level. A one-child boolean node is unrepresentable through this API.

use serde::{Deserialize, Serialize};

use crate::group::Group;

/// Searchable attributes of a user entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchAttribute {
    /// Durable unique id.
    Guid,
    /// Single-sign-on federated guid.
    SsoGuid,
    /// Partner-system federated guid.
    PartnerGuid,
    /// Email address.
    Email,
    /// Proxy email address.
    ProxyAddress,
    /// First name.
    FirstName,
    /// Last name.
    LastName,
    /// Employee number.
    EmployeeId,
    /// Staff designation.
    Designation,
}

/// How a comparison leaf matches its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonKind {
    /// Exact match.
    Eq,
    /// Prefix match.
    StartsWith,
    /// Pattern match; `*` wildcards in the value are honored.
    Like,
}

/// A single attribute comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// The attribute matched against.
    pub attribute: SearchAttribute,
    /// The match semantics.
    pub kind: ComparisonKind,
    /// The value matched for.
    pub value: String,
}

/// Boolean operator of an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BooleanOp {
    /// Every child must match.
    And,
    /// At least one child must match.
    Or,
}

/// An internal AND/OR node with two or more children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanExpression {
    op: BooleanOp,
    components: Vec<Expression>,
}

impl BooleanExpression {
    /// The node's boolean operator.
    #[must_use]
    pub const fn op(&self) -> BooleanOp {
        self.op
    }

    /// The children, in insertion order.
    #[must_use]
    pub fn components(&self) -> &[Expression] {
        &self.components
    }
}

/// A search expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Attribute comparison leaf.
    Comparison(Comparison),
    /// Group membership leaf.
    Membership(Group),
    /// AND/OR node.
    Boolean(BooleanExpression),
}

impl Expression {
    /// Creates an exact-match leaf.
    #[must_use]
    pub fn eq(attribute: SearchAttribute, value: impl Into<String>) -> Self {
        Self::comparison(attribute, ComparisonKind::Eq, value)
    }

    /// Creates a prefix-match leaf.
    #[must_use]
    pub fn starts_with(attribute: SearchAttribute, value: impl Into<String>) -> Self {
        Self::comparison(attribute, ComparisonKind::StartsWith, value)
    }

    /// Creates a pattern-match leaf.
    #[must_use]
    pub fn like(attribute: SearchAttribute, value: impl Into<String>) -> Self {
        Self::comparison(attribute, ComparisonKind::Like, value)
    }

    /// Creates a group-membership leaf.
    #[must_use]
    pub const fn member_of(group: Group) -> Self {
        Self::Membership(group)
    }

    fn comparison(attribute: SearchAttribute, kind: ComparisonKind, value: impl Into<String>) -> Self {
        Self::Comparison(Comparison {
            attribute,
            kind,
            value: value.into(),
        })
    }

    /// Combines this expression with another under AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::combine(BooleanOp::And, self, other)
    }

    /// Combines this expression with another under OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::combine(BooleanOp::Or, self, other)
    }

    fn combine(op: BooleanOp, left: Self, right: Self) -> Self {
        let mut components = left.into_operands(op);
        components.extend(right.into_operands(op));
        Self::Boolean(BooleanExpression { op, components })
    }

    /// Unwraps a node of the requested type into its children so same-type
    /// combination flattens instead of nesting.
    fn into_operands(self, op: BooleanOp) -> Vec<Self> {
        match self {
            Self::Boolean(node) if node.op == op => node.components,
            other => vec![other],
        }
    }
}
