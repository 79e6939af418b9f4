//! Turning an [`ExpressionTree`] into an [`Expression`], either directly or
//! by differentiating it.

use crate::{
    expr::{BinaryOperation, Expression, Symbol},
    ops::EvaluationError,
    tree::{ExpressionTree, Function, NodeRef, Value},
};
use tracing::instrument;

/// The variable used when the caller doesn't care which one is picked.
pub const DEFAULT_VARIABLE: &str = "x";

/// Convert a tree into the symbolic [`Expression`] it represents.
///
/// This can only fail for trees which were built by hand, every tree returned
/// by [`crate::parse()`] is complete.
#[instrument(level = "trace", skip(tree), fields(tree = %tree))]
pub fn evaluate(tree: &ExpressionTree) -> Result<Expression, EvaluationError> {
    evaluate_node(tree.root_ref())
}

/// Differentiate a tree with respect to `variable`.
///
/// The result is not simplified, use [`crate::ops::simplify()`] for that.
#[instrument(level = "trace", skip(tree), fields(tree = %tree))]
pub fn derivative(
    tree: &ExpressionTree,
    variable: &str,
) -> Result<Expression, EvaluationError> {
    differentiate(tree.root_ref(), &Symbol::named(variable))
}

impl ExpressionTree {
    /// See [`evaluate()`].
    pub fn evaluate(&self) -> Result<Expression, EvaluationError> {
        evaluate(self)
    }

    /// See [`derivative()`].
    pub fn derivative(
        &self,
        variable: &str,
    ) -> Result<Expression, EvaluationError> {
        derivative(self, variable)
    }
}

fn evaluate_node(node: NodeRef<'_>) -> Result<Expression, EvaluationError> {
    let got = match (node.value(), node.left(), node.right()) {
        (Value::Operator(op), Some(left), Some(right)) => Expression::binary(
            evaluate_node(left)?,
            evaluate_node(right)?,
            *op,
        ),
        (Value::Function(function), None, Some(argument)) => {
            let argument = evaluate_node(argument)?;

            match function {
                Function::Sine => argument.sin(),
                Function::Cosine => argument.cos(),
                Function::Log => argument.ln(),
                Function::Exp => argument.exp(),
            }
        },
        (Value::Integer(value), None, None) => {
            Expression::Integer(value.clone())
        },
        (Value::Symbol(symbol), None, None) => {
            Expression::Symbol(symbol.clone())
        },
        _ => return Err(incomplete(node)),
    };

    Ok(got)
}

fn differentiate(
    node: NodeRef<'_>,
    variable: &Symbol,
) -> Result<Expression, EvaluationError> {
    let got = match (node.value(), node.left(), node.right()) {
        (Value::Operator(op), Some(left), Some(right)) => {
            differentiate_binary_op(*op, left, right, variable)?
        },
        (Value::Function(function), None, Some(argument)) => {
            // the chain rule: (f o g)' = (f' o g) * g'
            let g_dash = differentiate(argument, variable)?;
            let g = evaluate_node(argument)?;

            match function {
                Function::Sine => g_dash * g.cos(),
                Function::Cosine => -g_dash * g.sin(),
                Function::Log => g_dash * (Expression::integer(1) / g),
                Function::Exp => g_dash * g.exp(),
            }
        },
        (Value::Symbol(symbol), None, None) if symbol == variable => {
            Expression::integer(1)
        },
        (Value::Symbol(_), None, None) | (Value::Integer(_), None, None) => {
            Expression::integer(0)
        },
        _ => return Err(incomplete(node)),
    };

    Ok(got)
}

fn differentiate_binary_op(
    op: BinaryOperation,
    left: NodeRef<'_>,
    right: NodeRef<'_>,
    variable: &Symbol,
) -> Result<Expression, EvaluationError> {
    let d_left = differentiate(left, variable)?;
    let d_right = differentiate(right, variable)?;

    let got = match op {
        BinaryOperation::Plus => d_left + d_right,
        BinaryOperation::Minus => d_left - d_right,
        BinaryOperation::Times => {
            // The product rule
            let left = evaluate_node(left)?;
            let right = evaluate_node(right)?;

            d_left * right + left * d_right
        },
        BinaryOperation::Divide => {
            // The quotient rule
            let left = evaluate_node(left)?;
            let right = evaluate_node(right)?;

            (d_left * right.clone() - left * d_right)
                / right.pow(Expression::integer(2))
        },
        BinaryOperation::Power => {
            let rule = PowerRule::classify(left.value(), right.value());
            let base = evaluate_node(left)?;
            let exponent = evaluate_node(right)?;

            rule.apply(base, exponent, d_left, d_right)
        },
    };

    Ok(got)
}

/// The formula used to differentiate `base**exponent`.
///
/// The choice is made by looking at the tokens at the top of each operand,
/// so only literal integers count as constants. Something like
/// `( ( 2 + 3 ) ** x )` uses the [`PowerRule::General`] formula, which gives
/// the same answer but in a more complicated form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PowerRule {
    /// Both the base and exponent are constant.
    ConstantValue,
    /// `c**f(x)`.
    ConstantBase,
    /// The power rule, `f(x)**c`.
    ConstantExponent,
    /// `f(x)**g(x)`.
    General,
}

impl PowerRule {
    pub fn classify(base: &Value, exponent: &Value) -> PowerRule {
        if base.is_literal() {
            if exponent.is_literal() {
                PowerRule::ConstantValue
            } else {
                PowerRule::ConstantBase
            }
        } else if exponent.is_literal() {
            PowerRule::ConstantExponent
        } else {
            PowerRule::General
        }
    }

    fn apply(
        self,
        base: Expression,
        exponent: Expression,
        d_base: Expression,
        d_exponent: Expression,
    ) -> Expression {
        match self {
            PowerRule::ConstantValue => Expression::integer(0),
            PowerRule::ConstantBase => {
                d_exponent * base.clone().ln() * base.pow(exponent)
            },
            PowerRule::ConstantExponent => {
                let reduced = exponent.clone() - Expression::integer(1);
                exponent * d_base * base.pow(reduced)
            },
            PowerRule::General => {
                let ln_base = base.clone().ln();
                let power = base.clone().pow(exponent.clone());

                power * (d_exponent * ln_base + exponent * d_base / base)
            },
        }
    }
}

fn incomplete(node: NodeRef<'_>) -> EvaluationError {
    EvaluationError::IncompleteNode { node: node.id() }
}
