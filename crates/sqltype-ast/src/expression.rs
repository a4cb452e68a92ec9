//! Expression tree nodes
//!
//! Every node owns its operands. Rewrites build a replacement node and hand
//! it back to the parent slot instead of relinking siblings in place.

use crate::{Operator, Query};
use serde::{Deserialize, Serialize};
use sqltype_diagnostics::Span;
use sqltype_types::{CollationId, Domain, TypeTag, Value};

/// Aggregate and set-constructor function codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionCode {
    CountStar,
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Stddev,
    Variance,
    GroupConcat,
}

impl FunctionCode {
    pub const fn name(self) -> &'static str {
        match self {
            Self::CountStar => "COUNT(*)",
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Stddev => "STDDEV",
            Self::Variance => "VARIANCE",
            Self::GroupConcat => "GROUP_CONCAT",
        }
    }
}

/// Kind of a collection constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Set,
    Multiset,
    Sequence,
}

impl CollectionKind {
    pub const fn type_tag(self) -> TypeTag {
        match self {
            Self::Set => TypeTag::Set,
            Self::Multiset => TypeTag::Multiset,
            Self::Sequence => TypeTag::Sequence,
        }
    }

    pub const fn from_tag(tag: TypeTag) -> Option<Self> {
        match tag {
            TypeTag::Set => Some(Self::Set),
            TypeTag::Multiset => Some(Self::Multiset),
            TypeTag::Sequence => Some(Self::Sequence),
            _ => None,
        }
    }
}

/// Per-node markers set by the caller or by the checker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeFlags {
    /// Caller asked to keep this subtree unfolded
    pub do_not_fold: bool,
    /// Cast inserted by the checker rather than written by the user
    pub implicit_cast: bool,
    /// Cast that only changes collation, never codeset or type
    pub collation_only_cast: bool,
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ExpressionKind {
    Value { value: Value },
    /// Column or other resolved name; its domain comes from the catalog
    Name { name: String },
    /// Not-yet-bound external parameter
    HostVar { index: u32 },
    Expr { op: Operator, args: Vec<Expression> },
    Function { code: FunctionCode, args: Vec<Expression> },
    Collection { kind: CollectionKind, elements: Vec<Expression> },
    Subquery { query: Box<Query> },
}

fn unresolved() -> TypeTag {
    TypeTag::Maybe
}

/// An expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    #[serde(flatten)]
    pub kind: ExpressionKind,
    /// Resolved type; operator nodes are typed by the checker
    #[serde(rename = "type", default = "unresolved")]
    pub type_tag: TypeTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    /// Domain a deferred value must be bound to at execution time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_domain: Option<Domain>,
    /// Explicit COLLATE modifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collate: Option<CollationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(default)]
    pub flags: NodeFlags,
}

impl Expression {
    pub fn new(kind: ExpressionKind, type_tag: TypeTag) -> Self {
        Self {
            kind,
            type_tag,
            domain: None,
            expected_domain: None,
            collate: None,
            span: None,
            flags: NodeFlags::default(),
        }
    }

    // === Builders ===

    /// Literal node typed after its value
    pub fn literal(value: Value) -> Self {
        let domain = value.literal_domain();
        let tag = value.type_tag();
        let mut expr = Self::new(ExpressionKind::Value { value }, tag);
        if tag != TypeTag::Null {
            expr.domain = Some(domain);
        }
        expr
    }

    pub fn null() -> Self {
        Self::literal(Value::Null)
    }

    pub fn integer(value: i32) -> Self {
        Self::literal(Value::Integer(value))
    }

    pub fn double(value: f64) -> Self {
        Self::literal(Value::Double(value))
    }

    pub fn varchar(text: impl Into<String>) -> Self {
        Self::literal(Value::VarChar(text.into()))
    }

    pub fn logical(value: bool) -> Self {
        Self::literal(Value::Logical(value))
    }

    /// Resolved name of the given domain
    pub fn name(name: impl Into<String>, domain: Domain) -> Self {
        let mut expr = Self::new(ExpressionKind::Name { name: name.into() }, domain.tag);
        expr.domain = Some(domain);
        expr
    }

    pub fn host_var(index: u32) -> Self {
        Self::new(ExpressionKind::HostVar { index }, TypeTag::Maybe)
    }

    pub fn op(op: Operator, args: Vec<Expression>) -> Self {
        Self::new(ExpressionKind::Expr { op, args }, TypeTag::Maybe)
    }

    pub fn unary(op: Operator, arg: Expression) -> Self {
        Self::op(op, vec![arg])
    }

    pub fn binary(op: Operator, left: Expression, right: Expression) -> Self {
        Self::op(op, vec![left, right])
    }

    /// Explicit cast to `target`
    pub fn cast(arg: Expression, target: Domain) -> Self {
        let mut expr = Self::op(Operator::Cast, vec![arg]);
        expr.type_tag = target.tag;
        expr.domain = Some(target);
        expr
    }

    /// Cast inserted by the checker
    pub fn implicit_cast(arg: Expression, target: Domain) -> Self {
        let span = arg.span;
        let mut expr = Self::cast(arg, target);
        expr.flags.implicit_cast = true;
        expr.span = span;
        expr
    }

    pub fn function(code: FunctionCode, args: Vec<Expression>) -> Self {
        Self::new(ExpressionKind::Function { code, args }, TypeTag::Maybe)
    }

    pub fn collection(kind: CollectionKind, elements: Vec<Expression>) -> Self {
        Self::new(ExpressionKind::Collection { kind, elements }, kind.type_tag())
    }

    pub fn subquery(query: Query) -> Self {
        Self::new(
            ExpressionKind::Subquery {
                query: Box::new(query),
            },
            TypeTag::Maybe,
        )
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_collate(mut self, collation: CollationId) -> Self {
        self.collate = Some(collation);
        self
    }

    pub fn with_do_not_fold(mut self) -> Self {
        self.flags.do_not_fold = true;
        self
    }

    // === Accessors ===

    pub fn operator(&self) -> Option<Operator> {
        match &self.kind {
            ExpressionKind::Expr { op, .. } => Some(*op),
            _ => None,
        }
    }

    pub fn is_op(&self, op: Operator) -> bool {
        self.operator() == Some(op)
    }

    /// Operands of an operator, function or collection node
    pub fn args(&self) -> &[Expression] {
        match &self.kind {
            ExpressionKind::Expr { args, .. }
            | ExpressionKind::Function { args, .. }
            | ExpressionKind::Collection { elements: args, .. } => args,
            _ => &[],
        }
    }

    pub fn args_mut(&mut self) -> Option<&mut Vec<Expression>> {
        match &mut self.kind {
            ExpressionKind::Expr { args, .. }
            | ExpressionKind::Function { args, .. }
            | ExpressionKind::Collection { elements: args, .. } => Some(args),
            _ => None,
        }
    }

    pub fn arg(&self, index: usize) -> Option<&Expression> {
        self.args().get(index)
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            ExpressionKind::Value { value } => Some(value),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ExpressionKind::Value { .. })
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self.value(), Some(Value::Null))
    }

    pub fn is_host_var(&self) -> bool {
        matches!(self.kind, ExpressionKind::HostVar { .. })
    }

    /// Host variable, possibly under a unary minus (`-?`)
    pub fn host_var_operand(&self) -> Option<&Expression> {
        match &self.kind {
            ExpressionKind::HostVar { .. } => Some(self),
            ExpressionKind::Expr {
                op: Operator::UnaryMinus,
                args,
            } if args.len() == 1 && args[0].is_host_var() => Some(&args[0]),
            _ => None,
        }
    }

    /// Literal collection: every element is a literal
    pub fn is_literal_collection(&self) -> bool {
        match &self.kind {
            ExpressionKind::Collection { elements, .. } => elements.iter().all(Expression::is_literal),
            ExpressionKind::Value { value } => value.as_collection().is_some(),
            _ => false,
        }
    }

    /// Domain of the node, synthesised from the tag when not recorded
    pub fn effective_domain(&self) -> Domain {
        self.domain.clone().unwrap_or_else(|| Domain::new(self.type_tag))
    }

    /// Set type and domain together
    pub fn set_domain(&mut self, domain: Domain) {
        self.type_tag = domain.tag;
        self.domain = Some(domain);
    }

    /// Set the type tag, keeping only domain parameters meaningful for it
    pub fn set_type(&mut self, tag: TypeTag) {
        self.type_tag = tag;
        self.domain = match &self.domain {
            Some(domain) if domain.tag == tag => Some(domain.clone()),
            Some(domain) if tag.is_concrete() => Some(domain.retag(tag)),
            _ if tag.is_concrete() && tag != TypeTag::Null => Some(Domain::new(tag)),
            _ => None,
        };
    }

    /// Mark the node untypeable
    pub fn set_none(&mut self) {
        self.type_tag = TypeTag::None;
        self.domain = None;
    }

    /// Take the node out of its slot, leaving a NULL literal behind
    pub fn take(&mut self) -> Expression {
        std::mem::replace(self, Expression::null())
    }

    /// Number of nodes in the subtree
    pub fn node_count(&self) -> usize {
        let nested = match &self.kind {
            ExpressionKind::Subquery { query } => query.node_count(),
            _ => 0,
        };
        1 + nested + self.args().iter().map(Expression::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_builder_types() {
        let lit = Expression::varchar("abc");
        assert_eq!(lit.type_tag, TypeTag::VarChar);
        assert_eq!(lit.domain.as_ref().and_then(|d| d.precision), Some(3));
        assert_eq!(Expression::null().domain, None);
    }

    #[test]
    fn test_host_var_under_unary_minus() {
        let neg = Expression::unary(Operator::UnaryMinus, Expression::host_var(0));
        assert!(neg.host_var_operand().is_some());
        assert!(Expression::integer(1).host_var_operand().is_none());
    }

    #[test]
    fn test_set_type_retags_domain() {
        let mut expr = Expression::name("c", Domain::varchar(Some(10)));
        expr.set_type(TypeTag::Double);
        assert_eq!(expr.domain, Some(Domain::new(TypeTag::Double)));
        expr.set_none();
        assert_eq!(expr.type_tag, TypeTag::None);
    }

    #[test]
    fn test_json_shape() {
        let expr = Expression::binary(
            Operator::Plus,
            Expression::varchar("3"),
            Expression::integer(5),
        );
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["node"], "expr");
        assert_eq!(json["op"], "PLUS");
        assert_eq!(json["args"][1]["value"]["value"], 5);

        let back: Expression = serde_json::from_value(json).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn test_minimal_json_input() {
        let json = r#"{"node": "expr", "op": "ABS", "args": [{"node": "host_var", "index": 0}]}"#;
        let expr: Expression = serde_json::from_str(json).unwrap();
        assert_eq!(expr.type_tag, TypeTag::Maybe);
        assert!(expr.arg(0).is_some_and(Expression::is_host_var));
        assert_eq!(expr.node_count(), 2);
    }
}
