use num_bigint::BigInt;
use num_traits::Signed;
use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Div, Mul, Neg, Sub},
};

/// A symbolic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Integer(BigInt),
    Symbol(Symbol),
    /// Euler's number, written as `E` so it can't be mistaken for a symbol
    /// called `e`.
    E,
    /// An expression involving two operands.
    Binary {
        left: Box<Expression>,
        right: Box<Expression>,
        op: BinaryOperation,
    },
    /// Negate the expression.
    Negate(Box<Expression>),
    /// Invoke a builtin function.
    FunctionCall {
        function: Builtin,
        argument: Box<Expression>,
    },
}

impl Expression {
    pub fn integer<I: Into<BigInt>>(value: I) -> Self {
        Expression::Integer(value.into())
    }

    pub fn symbol<S: Into<SmolStr>>(name: S) -> Self {
        Expression::Symbol(Symbol::named(name))
    }

    pub fn euler() -> Self { Expression::E }

    /// Raise this expression to some power.
    pub fn pow(self, exponent: Expression) -> Expression {
        Expression::binary(self, exponent, BinaryOperation::Power)
    }

    pub fn binary(
        left: Expression,
        right: Expression,
        op: BinaryOperation,
    ) -> Expression {
        Expression::Binary {
            left: Box::new(left),
            right: Box::new(right),
            op,
        }
    }

    pub fn sin(self) -> Expression { self.call(Builtin::Sine) }

    pub fn cos(self) -> Expression { self.call(Builtin::Cosine) }

    /// The natural logarithm.
    pub fn ln(self) -> Expression { self.call(Builtin::Ln) }

    /// Euler's number raised to this expression.
    pub fn exp(self) -> Expression { Expression::E.pow(self) }

    fn call(self, function: Builtin) -> Expression {
        Expression::FunctionCall {
            function,
            argument: Box::new(self),
        }
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Expression::Integer(_) => true,
            _ => false,
        }
    }

    /// Iterate over all the [`Symbol`]s this [`Expression`] mentions.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> + '_ {
        let mut symbols = Vec::new();
        collect_symbols(self, &mut symbols);
        symbols.into_iter()
    }

    pub fn depends_on(&self, symbol: &Symbol) -> bool {
        self.symbols().any(|s| s == symbol)
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Integer(value) if value.is_negative() => {
                NEGATE_PRECEDENCE
            },
            Expression::Negate(_) => NEGATE_PRECEDENCE,
            Expression::Binary { op, .. } => op.precedence(),
            Expression::Integer(_)
            | Expression::Symbol(_)
            | Expression::E
            | Expression::FunctionCall { .. } => ATOM_PRECEDENCE,
        }
    }
}

const NEGATE_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 5;

fn collect_symbols<'a>(expr: &'a Expression, symbols: &mut Vec<&'a Symbol>) {
    match expr {
        Expression::Symbol(symbol) => symbols.push(symbol),
        Expression::Integer(_) | Expression::E => {},
        Expression::Binary { left, right, .. } => {
            collect_symbols(left, symbols);
            collect_symbols(right, symbols);
        },
        Expression::Negate(inner) => collect_symbols(inner, symbols),
        Expression::FunctionCall { argument, .. } => {
            collect_symbols(argument, symbols)
        },
    }
}

/// A named symbol (e.g. `x`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    name: SmolStr,
}

impl Symbol {
    pub fn named<S: Into<SmolStr>>(name: S) -> Self {
        Symbol { name: name.into() }
    }

    pub fn name(&self) -> &str { &self.name }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An operation that can be applied to two arguments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOperation {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

impl BinaryOperation {
    /// The textual form of this operator, as it appears in a token stream.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperation::Plus => "+",
            BinaryOperation::Minus => "-",
            BinaryOperation::Times => "*",
            BinaryOperation::Divide => "/",
            BinaryOperation::Power => "**",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOperation::Plus | BinaryOperation::Minus => 1,
            BinaryOperation::Times | BinaryOperation::Divide => 2,
            BinaryOperation::Power => 4,
        }
    }
}

/// Various builtin functions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Builtin {
    Sine,
    Cosine,
    /// The natural logarithm.
    Ln,
}

impl Display for Builtin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Builtin::Sine => write!(f, "sin"),
            Builtin::Cosine => write!(f, "cos"),
            Builtin::Ln => write!(f, "log"),
        }
    }
}

// define some operator overloads to make constructing an expression easier.

macro_rules! binary_operator {
    ($operator:ident, $method:ident, $op:ident) => {
        impl $operator for Expression {
            type Output = Expression;

            fn $method(self, rhs: Expression) -> Expression {
                Expression::binary(self, rhs, BinaryOperation::$op)
            }
        }
    };
}

binary_operator!(Add, add, Plus);
binary_operator!(Sub, sub, Minus);
binary_operator!(Mul, mul, Times);
binary_operator!(Div, div, Divide);

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Self::Output { Expression::Negate(Box::new(self)) }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Integer(value) => write!(f, "{}", value),
            Expression::Symbol(symbol) => write!(f, "{}", symbol),
            Expression::E => write!(f, "E"),
            Expression::Binary { left, right, op } => {
                let precedence = op.precedence();

                // powers group to the right, so a nested power on the left
                // always needs parentheses
                let left_needs_parens = match op {
                    BinaryOperation::Power => left.precedence() <= precedence,
                    _ => left.precedence() < precedence,
                };
                let right_needs_parens = match op {
                    BinaryOperation::Minus
                    | BinaryOperation::Divide
                    | BinaryOperation::Power => {
                        right.precedence() <= precedence
                    },
                    _ => right.precedence() < precedence,
                };

                write_operand(left, left_needs_parens, f)?;

                let op = match op {
                    BinaryOperation::Plus => " + ",
                    BinaryOperation::Minus => " - ",
                    BinaryOperation::Times => "*",
                    BinaryOperation::Divide => "/",
                    BinaryOperation::Power => "**",
                };
                write!(f, "{}", op)?;

                write_operand(right, right_needs_parens, f)?;

                Ok(())
            },
            Expression::Negate(inner) => {
                write!(f, "-")?;
                write_operand(
                    inner,
                    inner.precedence() < BinaryOperation::Times.precedence(),
                    f,
                )
            },
            Expression::FunctionCall { function, argument } => {
                write!(f, "{}({})", function, argument)
            },
        }
    }
}

fn write_operand(
    expr: &Expression,
    parens: bool,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    if parens {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}
