//! Tree-walk driver
//!
//! [`TypeChecker`] types an expression tree in one traversal:
//! - pre-order: subqueries (outer-join flag, LIMIT rewrite) and the shared
//!   common type of CASE/DECODE/GREATEST/LEAST/COALESCE chains
//! - post-order, per operator node: operand defaults, signature lookup,
//!   overload resolution and coercion, collation reconciliation, result
//!   domain derivation, then constant folding
//!
//! A failing node is reported with its span and typed `None`; its ancestors
//! are typed `None` silently.

use crate::collation::check_expression_collation;
use crate::context::CheckContext;
use crate::error::{CheckError, CheckResult};
use crate::fold::{fold_inserted_casts, try_fold};
use crate::lattice::infer_symmetric_common_type;
use crate::resolver::{coerce_arguments, coerce_operand, expect_domain, range_coerce_arguments, resolve};
use crate::result_type::{derive_return_type, result_domain};
use crate::signatures::lookup;
use sqltype_ast::{CollectionKind, Expression, ExpressionKind, FunctionCode, Operator, Query, QueryKind, Select};
use sqltype_diagnostics::{SQT0004, Span};
use sqltype_eval::operators::datetime::is_sub_day_unit;
use sqltype_types::{Domain, TypeCoercer, TypeTag, Value, common_type_of};

/// Types expressions and queries against one [`CheckContext`]
pub struct TypeChecker<'a> {
    ctx: &'a mut CheckContext,
    /// Folding is off while walking the select list of an outer-join subquery
    fold_enabled: bool,
}

impl<'a> TypeChecker<'a> {
    pub fn new(ctx: &'a mut CheckContext) -> Self {
        Self { ctx, fold_enabled: true }
    }

    pub fn context(&self) -> &CheckContext {
        &*self.ctx
    }

    /// Type `expr` in place
    pub fn check(&mut self, expr: &mut Expression) {
        self.walk(expr);
    }

    /// Type every clause of `query` in place
    pub fn check_query(&mut self, query: &mut Query) {
        if query.is_outer_join_subquery {
            mark_outer_join(query);
        }
        rewrite_limit(query, self.ctx);

        let outer_join = query.is_outer_join_subquery;
        match &mut query.kind {
            QueryKind::Select { select } => self.check_select(select, outer_join),
            QueryKind::Union { left, right }
            | QueryKind::Difference { left, right }
            | QueryKind::Intersection { left, right } => {
                self.check_query(left);
                self.check_query(right);
            }
        }
    }

    fn check_select(&mut self, select: &mut Select, outer_join: bool) {
        let saved = self.fold_enabled;
        self.fold_enabled = saved && !outer_join;
        for expr in &mut select.select_list {
            self.walk(expr);
        }
        self.fold_enabled = saved;

        let clauses = select
            .where_clause
            .iter_mut()
            .chain(select.group_by.iter_mut())
            .chain(select.having.iter_mut())
            .chain(select.order_by.iter_mut())
            .chain(select.orderby_for.iter_mut());
        for expr in clauses {
            self.walk(expr);
        }
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    fn walk(&mut self, expr: &mut Expression) {
        if let ExpressionKind::Subquery { query } = &mut expr.kind {
            self.check_query(query);
            type_subquery(expr);
            return;
        }

        if let Some(op) = expr.operator()
            && op.is_chain()
        {
            self.check_chain(expr, op);
            return;
        }

        if let Some(args) = expr.args_mut() {
            for arg in args.iter_mut() {
                self.walk(arg);
            }
        }
        self.type_node(expr, None);
    }

    /// Type a CASE/DECODE/GREATEST/LEAST/COALESCE chain.
    ///
    /// Every leaf is typed first, then one common type is computed over all
    /// value leaves and forced onto each link from the innermost outwards.
    fn check_chain(&mut self, expr: &mut Expression, op: Operator) {
        self.walk_chain_leaves(expr, op);

        let mut leaves = Vec::new();
        collect_leaf_types(expr, op, &mut leaves);
        let hint = expr.expected_domain.as_ref().map(|d| d.tag);
        let common = infer_symmetric_common_type(op, &leaves, hint, self.ctx.mode());
        let chain_type = (common.is_concrete() && common != TypeTag::Null).then_some(common);
        log::trace!("{} chain over {:?} has common type {}", op, leaves, common);

        self.type_chain_links(expr, op, chain_type);
    }

    fn walk_chain_leaves(&mut self, expr: &mut Expression, op: Operator) {
        if matches!(op, Operator::Greatest | Operator::Least) {
            nest_binary_chain(expr, op);
        }
        let Some(args) = expr.args_mut() else {
            return;
        };
        for (i, arg) in args.iter_mut().enumerate() {
            if is_chain_link(op, i, arg) {
                self.walk_chain_leaves(arg, op);
            } else {
                self.walk(arg);
            }
        }
    }

    fn type_chain_links(&mut self, expr: &mut Expression, op: Operator, chain_type: Option<TypeTag>) {
        if let Some(args) = expr.args_mut() {
            for (i, arg) in args.iter_mut().enumerate() {
                if is_chain_link(op, i, arg) {
                    self.type_chain_links(arg, op, chain_type);
                }
            }
        }
        self.type_node(expr, chain_type);
    }

    // ========================================================================
    // Per-node typing
    // ========================================================================

    fn type_node(&mut self, expr: &mut Expression, chain_type: Option<TypeTag>) {
        match &expr.kind {
            ExpressionKind::Value { value } => {
                if expr.type_tag == TypeTag::Maybe {
                    let (domain, null) = (value.literal_domain(), value.is_null());
                    if null {
                        expr.set_type(TypeTag::Null);
                    } else {
                        expr.set_domain(domain);
                    }
                }
            }
            ExpressionKind::Name { .. } | ExpressionKind::HostVar { .. } | ExpressionKind::Subquery { .. } => {}
            ExpressionKind::Collection { kind, .. } => {
                let kind = *kind;
                self.type_collection(expr, kind);
            }
            ExpressionKind::Function { code, .. } => {
                let code = *code;
                let span = expr.span;
                if let Err(err) = self.type_aggregate(expr, code) {
                    self.fail(expr, &err, span);
                }
            }
            ExpressionKind::Expr { op, .. } => {
                let op = *op;
                self.type_operator(expr, op, chain_type);
            }
        }
    }

    fn type_collection(&mut self, expr: &mut Expression, kind: CollectionKind) {
        if expr.args().iter().any(|e| e.type_tag.is_none()) {
            expr.set_none();
            return;
        }
        let element = common_type_of(
            expr.args()
                .iter()
                .map(|e| e.type_tag)
                .filter(|t| t.is_concrete() && *t != TypeTag::Null),
            self.ctx.mode(),
        );
        let elements = match element {
            TypeTag::None | TypeTag::Maybe | TypeTag::Null => Vec::new(),
            tag => vec![Domain::new(tag)],
        };
        expr.set_domain(Domain::collection(kind.type_tag(), elements));
        if self.fold_enabled {
            try_fold(expr, self.ctx);
        }
    }

    fn type_aggregate(&mut self, expr: &mut Expression, code: FunctionCode) -> CheckResult<()> {
        if expr.args().iter().any(|a| a.type_tag.is_none()) {
            expr.set_none();
            return Ok(());
        }
        if code == FunctionCode::CountStar {
            expr.set_domain(Domain::new(TypeTag::BigInt));
            return Ok(());
        }

        let arg = expr
            .args()
            .first()
            .ok_or_else(|| CheckError::missing_operand(code.name(), "argument"))?;
        let arg_domain = arg.effective_domain();
        let numeric_arg = arg_domain.tag.is_numeric() || arg_domain.tag == TypeTag::Null;

        let domain = match code {
            FunctionCode::CountStar | FunctionCode::Count => Domain::new(TypeTag::BigInt),
            FunctionCode::GroupConcat => Domain::varchar(None),
            _ if arg_domain.tag == TypeTag::Maybe => {
                expr.set_type(TypeTag::Maybe);
                return Ok(());
            }
            FunctionCode::Min | FunctionCode::Max => arg_domain,
            FunctionCode::Sum => match arg_domain.tag {
                TypeTag::SmallInt | TypeTag::Integer => Domain::new(TypeTag::BigInt),
                TypeTag::BigInt | TypeTag::Numeric => Domain::numeric(38, arg_domain.scale),
                TypeTag::Float | TypeTag::Double | TypeTag::Monetary | TypeTag::Null => {
                    Domain::new(arg_domain.tag)
                }
                _ => Domain::new(TypeTag::Double),
            },
            FunctionCode::Avg | FunctionCode::Stddev | FunctionCode::Variance => Domain::new(TypeTag::Double),
        };

        if matches!(
            code,
            FunctionCode::Sum | FunctionCode::Avg | FunctionCode::Stddev | FunctionCode::Variance
        ) && !numeric_arg
            && let Some(arg) = expr.args_mut().and_then(|a| a.first_mut())
        {
            coerce_operand(arg, Domain::new(TypeTag::Double), false)?;
        }
        expr.set_domain(domain);
        Ok(())
    }

    fn type_operator(&mut self, expr: &mut Expression, op: Operator, chain_type: Option<TypeTag>) {
        if expr.args().iter().any(|a| a.type_tag.is_none()) {
            expr.set_none();
            return;
        }
        let span = expr.span;

        fill_default_operands(expr, op);
        if op.is_date_arithmetic()
            && let Some(first) = expr.args_mut().and_then(|a| a.first_mut())
            && first.is_null_literal()
        {
            first.set_type(TypeTag::Datetime);
        }

        let shape = flatten(expr, op);
        let result = match self.resolve_operator(expr, op, chain_type) {
            Ok(tag) => {
                self.finish_domain(expr, op, tag);
                check_expression_collation(expr, self.ctx).map(|_| ())
            }
            Err(err) => Err(err),
        };
        if let Some(args) = expr.args_mut() {
            fold_inserted_casts(args, self.ctx);
        }
        restore(expr, shape);

        match result {
            Ok(()) => {
                if self.fold_enabled {
                    try_fold(expr, self.ctx);
                }
            }
            Err(err) => self.fail(expr, &err, span),
        }
    }

    fn fail(&mut self, expr: &mut Expression, err: &CheckError, span: Option<Span>) {
        log::debug!("type check failed: {}", err);
        self.ctx.report(err, span);
        expr.set_none();
    }

    /// Pick the overload, coerce the operands and return the result type
    fn resolve_operator(
        &mut self,
        expr: &mut Expression,
        op: Operator,
        chain_type: Option<TypeTag>,
    ) -> CheckResult<TypeTag> {
        let hint = expected_hint(expr);
        let Some(signature) = lookup(op, self.ctx.config()) else {
            return self.propagate(expr, op, chain_type, hint);
        };

        let operands: Vec<TypeTag> = expr.args().iter().map(|a| a.type_tag).collect();
        let resolution = resolve(op, &signature, &operands)?;
        let args = expr
            .args_mut()
            .ok_or_else(|| CheckError::internal(format!("{} without operands", op)))?;
        if op.is_set_membership() {
            range_coerce_arguments(op, args, self.ctx)?;
        } else {
            coerce_arguments(op, args, &resolution.overload, chain_type, hint, self.ctx)?;
        }

        let coerced: Vec<TypeTag> = args.iter().map(|a| a.type_tag).collect();
        Ok(derive_return_type(op, resolution.overload.ret, &coerced, self.ctx.mode()))
    }

    /// Type operators that have no catalog entry
    fn propagate(
        &mut self,
        expr: &mut Expression,
        op: Operator,
        chain_type: Option<TypeTag>,
        hint: Option<TypeTag>,
    ) -> CheckResult<TypeTag> {
        let mode = self.ctx.mode();
        let target = expr.effective_domain();
        let args = expr
            .args_mut()
            .ok_or_else(|| CheckError::internal(format!("{} without operands", op)))?;

        match op {
            Operator::And | Operator::Or | Operator::Xor | Operator::Not => {
                let arity = if op == Operator::Not { 1 } else { 2 };
                if args.len() != arity {
                    return Err(CheckError::missing_operand(op.name(), "operand"));
                }
                for arg in args.iter_mut() {
                    coerce_operand(arg, Domain::new(TypeTag::Logical), false)?;
                }
                Ok(TypeTag::Logical)
            }
            Operator::Case | Operator::Decode => {
                let [then, otherwise, condition] = args.as_mut_slice() else {
                    return Err(CheckError::missing_operand(op.name(), "branch"));
                };
                coerce_operand(condition, Domain::new(TypeTag::Logical), false)?;
                let common = match chain_type {
                    Some(tag) => tag,
                    None => infer_symmetric_common_type(op, &[then.type_tag, otherwise.type_tag], hint, mode),
                };
                if common == TypeTag::None {
                    return Err(CheckError::IncompatibleOperands {
                        operator: op.name().to_string(),
                        left: then.type_tag,
                        right: otherwise.type_tag,
                    });
                }
                if common.is_concrete() && common != TypeTag::Null {
                    let domain = branch_domain(common, then, otherwise);
                    coerce_operand(then, domain.clone(), true)?;
                    coerce_operand(otherwise, domain, true)?;
                }
                Ok(common)
            }
            Operator::Cast => {
                let [arg] = args.as_mut_slice() else {
                    return Err(CheckError::missing_operand(op.name(), "operand"));
                };
                if arg.type_tag == TypeTag::Maybe {
                    expect_domain(arg, &target);
                } else if !TypeCoercer::new().can_cast(arg.type_tag, target.tag) {
                    return Err(CheckError::InvalidCast {
                        from: arg.type_tag,
                        to: target.tag,
                    });
                }
                Ok(target.tag)
            }
            Operator::Range => {
                let Some((subject, items)) = args.split_first_mut() else {
                    return Err(CheckError::missing_operand(op.name(), "range subject"));
                };
                if items.is_empty() {
                    return Err(CheckError::missing_operand(op.name(), "range item"));
                }
                let mut types = vec![subject.type_tag];
                types.extend(items.iter().flat_map(|item| item.args().iter().map(|b| b.type_tag)));
                let common = infer_symmetric_common_type(Operator::Eq, &types, hint, mode);
                if common == TypeTag::None {
                    return Err(CheckError::IncompatibleOperands {
                        operator: op.name().to_string(),
                        left: subject.type_tag,
                        right: types.iter().copied().find(|t| *t != subject.type_tag).unwrap_or(subject.type_tag),
                    });
                }
                if common.is_primitive() && common.is_concrete() && common != TypeTag::Null {
                    coerce_operand(subject, Domain::new(common), false)?;
                    for item in items.iter_mut() {
                        if let Some(bounds) = item.args_mut() {
                            for bound in bounds.iter_mut() {
                                coerce_operand(bound, Domain::new(common), false)?;
                            }
                        }
                        item.set_type(common);
                    }
                }
                Ok(TypeTag::Logical)
            }
            Operator::LikeEscape => Ok(args.first().map_or(TypeTag::Maybe, |a| a.type_tag)),
            op if op == Operator::BetweenAnd || op.is_range_item() => {
                let types: Vec<TypeTag> = args.iter().map(|a| a.type_tag).collect();
                Ok(infer_symmetric_common_type(Operator::Eq, &types, hint, mode))
            }
            _ => Err(CheckError::internal(format!("{} has no signature", op))),
        }
    }

    /// Record the result type and its parameterized domain
    fn finish_domain(&self, expr: &mut Expression, op: Operator, tag: TypeTag) {
        let mut tag = tag;
        if tag == TypeTag::Maybe
            && let Some(fixed) = op.fixed_result_type()
        {
            tag = fixed;
        }
        if matches!(op, Operator::DateAdd | Operator::DateSub)
            && tag == TypeTag::Date
            && expr
                .arg(2)
                .and_then(Expression::value)
                .and_then(Value::as_str)
                .is_some_and(is_sub_day_unit)
        {
            tag = TypeTag::Datetime;
        }
        if op == Operator::Plus
            && tag.is_char_string()
            && self.ctx.config().plus_as_concat
            && let ExpressionKind::Expr { op, .. } = &mut expr.kind
        {
            *op = Operator::Strcat;
        }

        if tag == TypeTag::Maybe {
            expr.set_type(TypeTag::Maybe);
            if op.is_late_bind() && expr.expected_domain.is_none() {
                expr.expected_domain = expr.args().iter().find_map(|a| a.expected_domain.clone());
            }
            return;
        }
        if op == Operator::Cast || !tag.is_concrete() {
            expr.set_type(tag);
            return;
        }
        let op = expr.operator().unwrap_or(op);
        let domain = result_domain(op, tag, expr.args(), self.ctx.config());
        expr.set_domain(domain);
    }
}

// ============================================================================
// Query rewrites
// ============================================================================

fn mark_outer_join(query: &mut Query) {
    if let Some((left, right)) = query.set_operands_mut() {
        left.is_outer_join_subquery = true;
        right.is_outer_join_subquery = true;
        mark_outer_join(left);
        mark_outer_join(right);
    }
}

/// Turn a pending LIMIT into a row-numbering predicate.
///
/// `LIMIT n` becomes `num <= n` and `LIMIT m, n` becomes
/// `num > m AND num <= m + n`, where `num` is ORDERBY_NUM() on the ORDER BY
/// FOR clause, GROUPBY_NUM() on HAVING or INST_NUM() on WHERE.
fn rewrite_limit(query: &mut Query, ctx: &mut CheckContext) {
    let QueryKind::Select { select } = &mut query.kind else {
        if query.limit.is_some() {
            ctx.warn(SQT0004, "LIMIT over a set operation is left to the planner");
        }
        return;
    };
    let Some(limit) = query.limit.take() else {
        return;
    };

    let (numbering, clause) = if !select.order_by.is_empty() {
        (Operator::OrderbyNum, &mut select.orderby_for)
    } else if !select.group_by.is_empty() {
        (Operator::GroupbyNum, &mut select.having)
    } else {
        (Operator::InstNum, &mut select.where_clause)
    };
    let number = || Expression::op(numbering, Vec::new());

    let predicate = match limit.offset {
        None => Expression::binary(Operator::Le, number(), limit.row_count),
        Some(offset) => {
            let upper = Expression::binary(Operator::Plus, offset.clone(), limit.row_count);
            Expression::binary(
                Operator::And,
                Expression::binary(Operator::Gt, number(), offset),
                Expression::binary(Operator::Le, number(), upper),
            )
        }
    };
    log::trace!("LIMIT rewritten over {}", numbering);

    *clause = Some(match clause.take() {
        Some(existing) => Expression::binary(Operator::And, existing, predicate),
        None => predicate,
    });
}

fn type_subquery(expr: &mut Expression) {
    let ExpressionKind::Subquery { query } = &expr.kind else {
        return;
    };
    match query.result_columns() {
        [column] if column.type_tag.is_concrete() && column.type_tag != TypeTag::Null => {
            let domain = column.effective_domain();
            expr.set_domain(domain);
        }
        [column] => expr.set_type(column.type_tag),
        _ => expr.set_domain(Domain::collection(TypeTag::Sequence, Vec::new())),
    }
}

// ============================================================================
// Shape helpers
// ============================================================================

/// Whether operand `index` of a chain node continues the chain
fn is_chain_link(op: Operator, index: usize, arg: &Expression) -> bool {
    arg.is_op(op) && (!matches!(op, Operator::Case | Operator::Decode) || index == 1)
}

fn collect_leaf_types(expr: &Expression, op: Operator, out: &mut Vec<TypeTag>) {
    for (i, arg) in expr.args().iter().enumerate() {
        if is_chain_link(op, i, arg) {
            collect_leaf_types(arg, op, out);
        } else if !matches!(op, Operator::Case | Operator::Decode) || i < 2 {
            out.push(arg.type_tag);
        }
    }
}

/// `GREATEST(a, b, c, d)` becomes `GREATEST(GREATEST(GREATEST(a, b), c), d)`
fn nest_binary_chain(expr: &mut Expression, op: Operator) {
    let Some(args) = expr.args_mut() else {
        return;
    };
    if args.len() <= 2 {
        return;
    }
    let mut operands = std::mem::take(args).into_iter();
    let (Some(first), Some(second)) = (operands.next(), operands.next()) else {
        return;
    };
    let mut head = Expression::binary(op, first, second);
    let last = operands.next_back();
    for next in operands {
        head = Expression::binary(op, head, next);
    }
    if let (Some(args), Some(last)) = (expr.args_mut(), last) {
        args.push(head);
        args.push(last);
    }
}

/// Supply the operands a function form may omit
fn fill_default_operands(expr: &mut Expression, op: Operator) {
    let Some(args) = expr.args_mut() else {
        return;
    };
    match op {
        Operator::Trim | Operator::Ltrim | Operator::Rtrim if args.len() == 1 => {
            let national = args[0].type_tag.is_national();
            let space = if national {
                Expression::literal(Value::NChar(" ".to_string()))
            } else {
                Expression::literal(Value::Char(" ".to_string()))
            };
            args.push(space);
        }
        Operator::Lpad | Operator::Rpad if args.len() == 2 => {
            args.push(Expression::literal(Value::Char(" ".to_string())));
        }
        Operator::Replace | Operator::Translate if args.len() == 2 => {
            args.push(Expression::varchar(""));
        }
        _ => {}
    }
}

/// The nested operator a ternary shape was flattened from
type Shape = Option<(Operator, Option<Span>)>;

/// `BETWEEN(x, BETWEEN_AND(lo, hi))` to `BETWEEN(x, lo, hi)`, likewise for
/// `LIKE(s, LIKE_ESCAPE(p, e))`
fn flatten(expr: &mut Expression, op: Operator) -> Shape {
    let inner = match op {
        Operator::Between | Operator::NotBetween => Operator::BetweenAnd,
        Operator::Like | Operator::NotLike => Operator::LikeEscape,
        _ => return None,
    };
    let args = expr.args_mut()?;
    if args.len() != 2 || !args[1].is_op(inner) {
        return None;
    }
    let mut nested = args.pop()?;
    let span = nested.span;
    if let Some(operands) = nested.args_mut() {
        args.append(operands);
    }
    Some((inner, span))
}

fn restore(expr: &mut Expression, shape: Shape) {
    let Some((inner, span)) = shape else {
        return;
    };
    let Some(args) = expr.args_mut() else {
        return;
    };
    if args.len() < 2 {
        return;
    }
    let operands = args.split_off(1);
    let first = operands[0].effective_domain();
    let mut nested = Expression::op(inner, operands);
    nested.span = span;
    if first.tag.is_concrete() {
        nested.set_domain(first);
    } else {
        nested.set_type(first.tag);
    }
    args.push(nested);
}

fn expected_hint(expr: &Expression) -> Option<TypeTag> {
    expr.expected_domain
        .as_ref()
        .or_else(|| expr.args().iter().find_map(|a| a.expected_domain.as_ref()))
        .map(|d| d.tag)
}

/// Cast target of CASE branches: the branch already of the common type
/// donates its parameters
fn branch_domain(common: TypeTag, then: &Expression, otherwise: &Expression) -> Domain {
    [then, otherwise]
        .into_iter()
        .filter(|b| b.type_tag == common)
        .filter_map(|b| b.domain.clone())
        .next()
        .unwrap_or_else(|| Domain::new(common))
}
