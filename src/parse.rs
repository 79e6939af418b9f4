use crate::{
    expr::{BinaryOperation, Symbol},
    tree::{ExpressionTree, Function, NodeId, Value},
};
use num_bigint::BigInt;
use smol_str::SmolStr;
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    str::FromStr,
};
use tracing::debug;

/// Parse an [`ExpressionTree`] from whitespace-separated tokens.
///
/// Every binary operation must be wrapped in its own parentheses (e.g.
/// `( ( x * 2 ) + 1 )`) and function calls are written with the name and
/// opening parenthesis fused together (e.g. `sin( x )`).
pub fn parse(src: &str) -> Result<ExpressionTree, ParseError> {
    parse_tokens(src.split_whitespace())
}

/// Parse an [`ExpressionTree`] from raw bytes, failing if they aren't text.
pub fn parse_bytes(src: &[u8]) -> Result<ExpressionTree, ParseError> {
    let src = std::str::from_utf8(src).map_err(|e| {
        ParseError::InvalidInput {
            valid_up_to: e.valid_up_to(),
        }
    })?;

    parse(src)
}

/// Parse an [`ExpressionTree`] from a sequence of tokens which have already
/// been split.
pub fn parse_tokens<I, S>(tokens: I) -> Result<ExpressionTree, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let result = Parser::new().parse(tokens);

    match &result {
        Ok(tree) => debug!(nodes = tree.len(), "Parsed an expression tree"),
        Err(e) => debug!(error = %e, "Unable to parse the expression"),
    }

    result
}

impl FromStr for ExpressionTree {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s) }
}

/// A parser which builds the tree top-down, keeping an explicit stack of the
/// nodes to return to once a subexpression is finished.
#[derive(Debug, Clone)]
pub(crate) struct Parser {
    tree: ExpressionTree,
    stack: Vec<NodeId>,
    cursor: NodeId,
    tokens_seen: usize,
}

impl Parser {
    pub(crate) fn new() -> Self {
        let tree = ExpressionTree::default();
        let root = tree.root();

        Parser {
            tree,
            stack: vec![root],
            cursor: root,
            tokens_seen: 0,
        }
    }

    pub(crate) fn parse<I, S>(
        mut self,
        tokens: I,
    ) -> Result<ExpressionTree, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (index, text) in tokens.into_iter().enumerate() {
            let token = Token::classify(text.as_ref(), index)?;
            self.step(token, index)?;
        }

        self.finish()
    }

    fn step(&mut self, token: Token, index: usize) -> Result<(), ParseError> {
        self.tokens_seen += 1;

        match token {
            Token::OpenParen => {
                let child = self.tree.insert_left(self.cursor, Value::Empty);
                self.stack.push(self.cursor);
                self.cursor = child;
            },
            Token::Operator(op) => self.descend_right(Value::Operator(op)),
            Token::Function(function) => {
                self.descend_right(Value::Function(function))
            },
            Token::Integer(value) => {
                self.tree.set_value(self.cursor, Value::Integer(value));
                self.return_to_parent(index)?;
            },
            Token::Symbol(symbol) => {
                self.tree.set_value(self.cursor, Value::Symbol(symbol));
                self.return_to_parent(index)?;
            },
            Token::CloseParen => self.return_to_parent(index)?,
        }

        Ok(())
    }

    /// Store an operator in the current node then move on to its (right)
    /// operand.
    fn descend_right(&mut self, value: Value) {
        self.tree.set_value(self.cursor, value);
        let child = self.tree.insert_right(self.cursor, Value::Empty);
        self.stack.push(self.cursor);
        self.cursor = child;
    }

    fn return_to_parent(&mut self, index: usize) -> Result<(), ParseError> {
        self.cursor = self.stack.pop().ok_or(ParseError::Malformed(
            MalformedKind::NothingToClose { index },
        ))?;

        Ok(())
    }

    fn finish(self) -> Result<ExpressionTree, ParseError> {
        if self.tokens_seen == 0 {
            return Err(ParseError::Malformed(MalformedKind::EmptyInput));
        }

        if !self.stack.is_empty() {
            return Err(ParseError::Malformed(MalformedKind::Unclosed {
                depth: self.stack.len(),
            }));
        }

        if let Some(node) = self.tree.find_incomplete_node() {
            return Err(ParseError::Malformed(MalformedKind::IncompleteNode {
                node,
            }));
        }

        Ok(self.tree)
    }
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The input wasn't valid UTF-8 text.
    InvalidInput { valid_up_to: usize },
    UnrecognizedToken { token: SmolStr, index: usize },
    /// A number which isn't an integer.
    UnsupportedLiteral { token: SmolStr, index: usize },
    Malformed(MalformedKind),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidInput { valid_up_to } => write!(
                f,
                "The input isn't valid text (invalid byte at {})",
                valid_up_to
            ),
            ParseError::UnrecognizedToken { token, index } => {
                write!(f, "Unrecognized token \"{}\" at {}", token, index)
            },
            ParseError::UnsupportedLiteral { token, index } => write!(
                f,
                "\"{}\" at {} isn't a supported integer literal",
                token, index
            ),
            ParseError::Malformed(kind) => {
                write!(f, "Malformed expression: {}", kind)
            },
        }
    }
}

impl Error for ParseError {}

/// The ways in which a sequence of valid tokens may still not form an
/// expression.
#[derive(Debug, Clone, PartialEq)]
pub enum MalformedKind {
    EmptyInput,
    /// There was no enclosing expression to return to.
    NothingToClose { index: usize },
    /// The input finished with subexpressions still open.
    Unclosed { depth: usize },
    IncompleteNode { node: NodeId },
}

impl Display for MalformedKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MalformedKind::EmptyInput => write!(f, "there were no tokens"),
            MalformedKind::NothingToClose { index } => {
                write!(f, "nothing left to close at token {}", index)
            },
            MalformedKind::Unclosed { depth } => {
                write!(f, "{} subexpression(s) were never closed", depth)
            },
            MalformedKind::IncompleteNode { node } => {
                write!(f, "node {} is missing its value or operands", node)
            },
        }
    }
}

/// The tokens which can appear in an [`ExpressionTree`]'s text form.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    OpenParen,
    CloseParen,
    Operator(BinaryOperation),
    /// A function name fused with its opening parenthesis (e.g. `sin(`).
    Function(Function),
    Integer(BigInt),
    Symbol(Symbol),
}

impl Token {
    /// Figure out what kind of token some text is. The `index` is only used
    /// for error reporting.
    pub fn classify(text: &str, index: usize) -> Result<Token, ParseError> {
        let token = match text {
            "(" => Token::OpenParen,
            ")" => Token::CloseParen,
            "+" => Token::Operator(BinaryOperation::Plus),
            "-" => Token::Operator(BinaryOperation::Minus),
            "*" => Token::Operator(BinaryOperation::Times),
            "/" => Token::Operator(BinaryOperation::Divide),
            "**" => Token::Operator(BinaryOperation::Power),
            "sin(" => Token::Function(Function::Sine),
            "cos(" => Token::Function(Function::Cosine),
            "log(" => Token::Function(Function::Log),
            "exp(" => Token::Function(Function::Exp),
            _ => return Token::operand(text, index),
        };

        Ok(token)
    }

    fn operand(text: &str, index: usize) -> Result<Token, ParseError> {
        let mut chars = text.chars();

        // single letters are symbols
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_alphabetic() {
                return Ok(Token::Symbol(Symbol::named(text)));
            }
        }

        if is_integer_literal(text) {
            if let Ok(value) = text.parse::<BigInt>() {
                return Ok(Token::Integer(value));
            }
        }

        if looks_numeric(text) {
            Err(ParseError::UnsupportedLiteral {
                token: text.into(),
                index,
            })
        } else {
            Err(ParseError::UnrecognizedToken {
                token: text.into(),
                index,
            })
        }
    }
}

fn strip_sign(text: &str) -> &str {
    if text.starts_with('+') || text.starts_with('-') {
        &text[1..]
    } else {
        text
    }
}

/// An optional sign followed by one or more decimal digits.
fn is_integer_literal(text: &str) -> bool {
    let digits = strip_sign(text);

    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn looks_numeric(text: &str) -> bool {
    let mut chars = strip_sign(text).chars();

    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().map_or(false, |c| c.is_ascii_digit()),
        _ => false,
    }
}

#[cfg(test)]
mod token_tests {
    use super::*;

    macro_rules! token_test {
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let got = Token::classify($src, 0).unwrap();

                assert_eq!(got, $should_be);
            }
        };
    }

    token_test!(open_paren, "(", Token::OpenParen);
    token_test!(close_paren, ")", Token::CloseParen);
    token_test!(plus, "+", Token::Operator(BinaryOperation::Plus));
    token_test!(minus, "-", Token::Operator(BinaryOperation::Minus));
    token_test!(times, "*", Token::Operator(BinaryOperation::Times));
    token_test!(divide, "/", Token::Operator(BinaryOperation::Divide));
    token_test!(power, "**", Token::Operator(BinaryOperation::Power));
    token_test!(sine, "sin(", Token::Function(Function::Sine));
    token_test!(cosine, "cos(", Token::Function(Function::Cosine));
    token_test!(log, "log(", Token::Function(Function::Log));
    token_test!(exp, "exp(", Token::Function(Function::Exp));
    token_test!(single_digit_integer, "3", Token::Integer(3.into()));
    token_test!(multi_digit_integer, "31", Token::Integer(31.into()));
    token_test!(negative_integer, "-31", Token::Integer((-31).into()));
    token_test!(explicitly_positive_integer, "+7", Token::Integer(7.into()));
    token_test!(
        integer_wider_than_64_bits,
        "99999999999999999999",
        Token::Integer("99999999999999999999".parse().unwrap())
    );
    token_test!(single_letter, "x", Token::Symbol(Symbol::named("x")));
    token_test!(upper_case_letter, "Q", Token::Symbol(Symbol::named("Q")));

    #[test]
    fn unsupported_literals() {
        let inputs = vec!["2.5", ".5", "-0.5", "1e3", "2x", "1_000"];

        for (index, src) in inputs.into_iter().enumerate() {
            let got = Token::classify(src, index).unwrap_err();

            assert_eq!(
                got,
                ParseError::UnsupportedLiteral {
                    token: src.into(),
                    index
                }
            );
        }
    }

    #[test]
    fn unrecognized_tokens() {
        let inputs =
            vec!["tan(", "xy", "sin", "$", "--5", "+-5", "^", "(("];

        for (index, src) in inputs.into_iter().enumerate() {
            let got = Token::classify(src, index).unwrap_err();

            assert_eq!(
                got,
                ParseError::UnrecognizedToken {
                    token: src.into(),
                    index
                }
            );
        }
    }
}
