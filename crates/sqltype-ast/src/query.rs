//! Query nodes reachable from expressions (subqueries)

use crate::Expression;
use serde::{Deserialize, Serialize};

/// LIMIT clause awaiting rewrite into a row-numbering predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Expression>,
    pub row_count: Expression,
}

/// A single SELECT block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Select {
    pub select_list: Vec<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Expression>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub having: Option<Expression>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<Expression>,
    /// ORDER BY ... FOR predicate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orderby_for: Option<Expression>,
}

impl Select {
    pub fn new(select_list: Vec<Expression>) -> Self {
        Self {
            select_list,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryKind {
    Select { select: Box<Select> },
    Union { left: Box<Query>, right: Box<Query> },
    Difference { left: Box<Query>, right: Box<Query> },
    Intersection { left: Box<Query>, right: Box<Query> },
}

/// A query: one SELECT or a set operation over two queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(flatten)]
    pub kind: QueryKind,
    /// The query is the inner side of an outer join
    #[serde(default)]
    pub is_outer_join_subquery: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Limit>,
}

impl Query {
    pub fn select(select: Select) -> Self {
        Self::from_kind(QueryKind::Select {
            select: Box::new(select),
        })
    }

    pub fn union(left: Query, right: Query) -> Self {
        Self::from_kind(QueryKind::Union {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn difference(left: Query, right: Query) -> Self {
        Self::from_kind(QueryKind::Difference {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn intersection(left: Query, right: Query) -> Self {
        Self::from_kind(QueryKind::Intersection {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn from_kind(kind: QueryKind) -> Self {
        Self {
            kind,
            is_outer_join_subquery: false,
            limit: None,
        }
    }

    pub fn with_limit(mut self, offset: Option<Expression>, row_count: Expression) -> Self {
        self.limit = Some(Limit { offset, row_count });
        self
    }

    /// Left and right operands of a set operation
    pub fn set_operands_mut(&mut self) -> Option<(&mut Query, &mut Query)> {
        match &mut self.kind {
            QueryKind::Union { left, right }
            | QueryKind::Difference { left, right }
            | QueryKind::Intersection { left, right } => Some((left, right)),
            QueryKind::Select { .. } => None,
        }
    }

    /// Select list of the leftmost SELECT, which names the result columns
    pub fn result_columns(&self) -> &[Expression] {
        match &self.kind {
            QueryKind::Select { select } => &select.select_list,
            QueryKind::Union { left, .. }
            | QueryKind::Difference { left, .. }
            | QueryKind::Intersection { left, .. } => left.result_columns(),
        }
    }

    pub fn node_count(&self) -> usize {
        match &self.kind {
            QueryKind::Select { select } => {
                let lists = select
                    .select_list
                    .iter()
                    .chain(&select.group_by)
                    .chain(&select.order_by)
                    .chain(&select.where_clause)
                    .chain(&select.having)
                    .chain(&select.orderby_for);
                lists.map(Expression::node_count).sum()
            }
            QueryKind::Union { left, right }
            | QueryKind::Difference { left, right }
            | QueryKind::Intersection { left, right } => left.node_count() + right.node_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_columns_follow_left_branch() {
        let left = Query::select(Select::new(vec![Expression::integer(1)]));
        let right = Query::select(Select::new(vec![
            Expression::integer(2),
            Expression::integer(3),
        ]));
        let union = Query::union(left, right);
        assert_eq!(union.result_columns().len(), 1);
        assert_eq!(union.node_count(), 3);
    }

    #[test]
    fn test_json_round_trip() {
        let query = Query::select(Select::new(vec![Expression::varchar("a")]))
            .with_limit(None, Expression::integer(10));
        let json = serde_json::to_string(&query).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
    }
}
