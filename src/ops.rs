//! [`Expression`] operations.

use crate::{
    expr::{BinaryOperation, Builtin, Expression, Symbol},
    tree::NodeId,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Pow, Signed, ToPrimitive, Zero};
use smol_str::SmolStr;
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// No value was provided for a symbol.
    UnknownSymbol { name: SmolStr },
    /// A tree node which doesn't have the children its value requires.
    IncompleteNode { node: NodeId },
}

impl Display for EvaluationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::UnknownSymbol { name } => {
                write!(f, "No value was provided for \"{}\"", name)
            },
            EvaluationError::IncompleteNode { node } => {
                write!(f, "Node {} is incomplete", node)
            },
        }
    }
}

impl Error for EvaluationError {}

/// Simplify an expression by evaluating all constant operations and applying
/// some basic identity laws.
///
/// The result always has the same value as the original expression wherever
/// the original is defined.
pub fn simplify(expr: &Expression) -> Expression {
    match expr {
        Expression::Binary { left, right, op } => {
            combine(simplify(left), simplify(right), *op)
        },
        Expression::Negate(inner) => negate(simplify(inner)),
        Expression::FunctionCall { function, argument } => {
            simplify_function_call(*function, simplify(argument))
        },
        _ => expr.clone(),
    }
}

/// Powers whose result would need more bits than this are left unevaluated.
const MAX_FOLDED_POWER_BITS: u64 = 1 << 20;

fn is(expr: &Expression, value: i64) -> bool {
    match expr {
        Expression::Integer(integer) => *integer == BigInt::from(value),
        _ => false,
    }
}

fn negate(expr: Expression) -> Expression {
    match expr {
        Expression::Integer(value) => Expression::Integer(-value),
        // double negative
        Expression::Negate(inner) => *inner,
        other => -other,
    }
}

fn simplify_function_call(
    function: Builtin,
    argument: Expression,
) -> Expression {
    match (function, argument) {
        (Builtin::Sine, argument) if is(&argument, 0) => Expression::integer(0),
        (Builtin::Cosine, argument) if is(&argument, 0) => {
            Expression::integer(1)
        },
        (Builtin::Ln, argument) if is(&argument, 1) => Expression::integer(0),
        (Builtin::Ln, Expression::E) => Expression::integer(1),
        (function, argument) => Expression::FunctionCall {
            function,
            argument: Box::new(argument),
        },
    }
}

/// Combine two already-simplified operands.
fn combine(
    left: Expression,
    right: Expression,
    op: BinaryOperation,
) -> Expression {
    if let (Expression::Integer(l), Expression::Integer(r)) = (&left, &right)
    {
        if let Some(folded) = fold_integers(l, r, op) {
            return folded;
        }
    }

    if op == BinaryOperation::Times {
        if let Some(merged) = merge_constant_factors(&left, &right) {
            return merged;
        }
    }

    match (left, right, op) {
        // x + 0 = x
        (left, right, BinaryOperation::Plus) if is(&left, 0) => right,
        (left, right, BinaryOperation::Plus) if is(&right, 0) => left,

        // x - 0 = x
        (left, right, BinaryOperation::Minus) if is(&right, 0) => left,
        // 0 - x = -x
        (left, right, BinaryOperation::Minus) if is(&left, 0) => {
            negate(right)
        },

        // 0 * x = 0
        (left, right, BinaryOperation::Times)
            if is(&left, 0) || is(&right, 0) =>
        {
            Expression::integer(0)
        },

        // 1 * x = x
        (left, right, BinaryOperation::Times) if is(&left, 1) => right,
        (left, right, BinaryOperation::Times) if is(&right, 1) => left,
        (left, right, BinaryOperation::Times) if is(&left, -1) => {
            negate(right)
        },
        (left, right, BinaryOperation::Times) if is(&right, -1) => {
            negate(left)
        },

        // 0 / x = 0
        (left, right, BinaryOperation::Divide)
            if is(&left, 0) && !is(&right, 0) =>
        {
            Expression::integer(0)
        },
        // x / 1 = x
        (left, right, BinaryOperation::Divide) if is(&right, 1) => left,
        // -c / x = -(c / x)
        (Expression::Integer(numerator), right, BinaryOperation::Divide)
            if numerator.is_negative() =>
        {
            negate(combine(
                Expression::Integer(-numerator),
                right,
                BinaryOperation::Divide,
            ))
        },

        // x**0 = 1
        (_, right, BinaryOperation::Power) if is(&right, 0) => {
            Expression::integer(1)
        },
        // x**1 = x
        (left, right, BinaryOperation::Power) if is(&right, 1) => left,
        // 1**x = 1
        (left, _, BinaryOperation::Power) if is(&left, 1) => {
            Expression::integer(1)
        },

        // pull negations outwards
        (left, Expression::Negate(right), BinaryOperation::Plus) => {
            combine(left, *right, BinaryOperation::Minus)
        },
        (left, Expression::Negate(right), BinaryOperation::Minus) => {
            combine(left, *right, BinaryOperation::Plus)
        },
        (Expression::Negate(left), right, BinaryOperation::Plus) => {
            combine(right, *left, BinaryOperation::Minus)
        },
        (Expression::Negate(left), right, BinaryOperation::Times) => {
            negate(combine(*left, right, BinaryOperation::Times))
        },
        (left, Expression::Negate(right), BinaryOperation::Times) => {
            negate(combine(left, *right, BinaryOperation::Times))
        },
        (Expression::Negate(left), right, BinaryOperation::Divide) => {
            negate(combine(*left, right, BinaryOperation::Divide))
        },
        (left, Expression::Negate(right), BinaryOperation::Divide) => {
            negate(combine(left, *right, BinaryOperation::Divide))
        },

        // identical operands
        (left, right, BinaryOperation::Plus) if left == right => {
            combine(Expression::integer(2), right, BinaryOperation::Times)
        },
        (left, right, BinaryOperation::Minus) if left == right => {
            Expression::integer(0)
        },
        (left, right, BinaryOperation::Divide)
            if left == right && !is(&left, 0) =>
        {
            Expression::integer(1)
        },
        (left, right, BinaryOperation::Times) if left == right => {
            combine(right, Expression::integer(2), BinaryOperation::Power)
        },

        // x * x**n = x**(n + 1)
        (
            left,
            Expression::Binary {
                left: base,
                right: exponent,
                op: BinaryOperation::Power,
            },
            BinaryOperation::Times,
        ) if *base == left => {
            let exponent = combine(
                *exponent,
                Expression::integer(1),
                BinaryOperation::Plus,
            );
            combine(left, exponent, BinaryOperation::Power)
        },
        (
            Expression::Binary {
                left: base,
                right: exponent,
                op: BinaryOperation::Power,
            },
            right,
            BinaryOperation::Times,
        ) if *base == right => {
            let exponent = combine(
                *exponent,
                Expression::integer(1),
                BinaryOperation::Plus,
            );
            combine(right, exponent, BinaryOperation::Power)
        },

        // constants go first, so x*3 becomes 3*x
        (left, Expression::Integer(constant), BinaryOperation::Times)
            if !left.is_integer() =>
        {
            combine(
                Expression::Integer(constant),
                left,
                BinaryOperation::Times,
            )
        },

        // Oh well, we tried
        (left, right, op) => Expression::binary(left, right, op),
    }
}

/// Evaluate an operation on two integers, returning `None` when the result
/// isn't defined or would be unreasonably large.
fn fold_integers(
    left: &BigInt,
    right: &BigInt,
    op: BinaryOperation,
) -> Option<Expression> {
    match op {
        BinaryOperation::Plus => Some(Expression::Integer(left + right)),
        BinaryOperation::Minus => Some(Expression::Integer(left - right)),
        BinaryOperation::Times => Some(Expression::Integer(left * right)),
        BinaryOperation::Divide => fraction(left.clone(), right.clone()),
        BinaryOperation::Power => {
            let exponent = right.abs().to_u32()?;
            let bits = left.bits().saturating_mul(u64::from(exponent));
            if bits > MAX_FOLDED_POWER_BITS {
                return None;
            }

            let power = Pow::pow(left, exponent);

            if right.is_negative() {
                // x**-n = 1/x**n
                fraction(BigInt::one(), power)
            } else {
                Some(Expression::Integer(power))
            }
        },
    }
}

/// An exact `numerator/denominator`, in lowest terms with the sign on the
/// numerator.
fn fraction(numerator: BigInt, denominator: BigInt) -> Option<Expression> {
    if denominator.is_zero() {
        return None;
    }

    let ratio = BigRational::new(numerator, denominator);

    if ratio.is_integer() {
        Some(Expression::Integer(ratio.to_integer()))
    } else {
        Some(
            Expression::Integer(ratio.numer().clone())
                / Expression::Integer(ratio.denom().clone()),
        )
    }
}

/// Merge the constants in `c1 * (c2 * x)` and `(c2 * x) * c1`.
fn merge_constant_factors(
    left: &Expression,
    right: &Expression,
) -> Option<Expression> {
    let (constant_a, other) = match (left, right) {
        (Expression::Integer(constant), other)
        | (other, Expression::Integer(constant)) => (constant, other),
        _ => return None,
    };

    let (constant_b, rest) = match other {
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Times,
        } => match (&**left, &**right) {
            (Expression::Integer(constant), rest)
            | (rest, Expression::Integer(constant)) => (constant, rest),
            _ => return None,
        },
        _ => return None,
    };

    Some(combine(
        Expression::Integer(constant_a * constant_b),
        Expression::clone(rest),
        BinaryOperation::Times,
    ))
}

/// Replace all references to a [`Symbol`] with an [`Expression`].
pub fn substitute(
    expression: &Expression,
    symbol: &Symbol,
    value: &Expression,
) -> Expression {
    match expression {
        Expression::Symbol(s) => {
            if s == symbol {
                value.clone()
            } else {
                Expression::Symbol(s.clone())
            }
        },
        Expression::Integer(value) => Expression::Integer(value.clone()),
        Expression::E => Expression::E,
        Expression::Binary { left, right, op } => {
            let left = substitute(left, symbol, value);
            let right = substitute(right, symbol, value);
            Expression::binary(left, right, *op)
        },
        Expression::Negate(inner) => -substitute(inner, symbol, value),
        Expression::FunctionCall { function, argument } => {
            Expression::FunctionCall {
                function: *function,
                argument: Box::new(substitute(argument, symbol, value)),
            }
        },
    }
}

/// Numerically evaluate an [`Expression`], using `lookup_symbol_value` to
/// find the value of each [`Symbol`].
pub fn evaluate<F>(
    expr: &Expression,
    lookup_symbol_value: F,
) -> Result<f64, EvaluationError>
where
    F: Fn(&Symbol) -> Option<f64>,
{
    evaluate_with(expr, &lookup_symbol_value)
}

fn evaluate_with(
    expr: &Expression,
    lookup: &dyn Fn(&Symbol) -> Option<f64>,
) -> Result<f64, EvaluationError> {
    match expr {
        Expression::Integer(value) => {
            Ok(value.to_f64().unwrap_or(std::f64::NAN))
        },
        Expression::Symbol(symbol) => {
            lookup(symbol).ok_or_else(|| EvaluationError::UnknownSymbol {
                name: symbol.name().into(),
            })
        },
        Expression::E => Ok(std::f64::consts::E),
        Expression::Binary { left, right, op } => {
            let left = evaluate_with(left, lookup)?;
            let right = evaluate_with(right, lookup)?;

            let value = match op {
                BinaryOperation::Plus => left + right,
                BinaryOperation::Minus => left - right,
                BinaryOperation::Times => left * right,
                BinaryOperation::Divide => left / right,
                BinaryOperation::Power => left.powf(right),
            };

            Ok(value)
        },
        Expression::Negate(inner) => Ok(-evaluate_with(inner, lookup)?),
        Expression::FunctionCall { function, argument } => {
            let argument = evaluate_with(argument, lookup)?;

            let value = match function {
                Builtin::Sine => argument.sin(),
                Builtin::Cosine => argument.cos(),
                Builtin::Ln => argument.ln(),
            };

            Ok(value)
        },
    }
}
