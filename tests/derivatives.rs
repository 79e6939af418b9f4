#[macro_use]
extern crate approx;

use derivatives::{ops, parse, Expression, Symbol};

const X: f64 = 1.3;
const Y: f64 = 2.1;
const Z: f64 = 0.7;

fn lookup(symbol: &Symbol) -> Option<f64> {
    match symbol.name() {
        "x" => Some(X),
        "y" => Some(Y),
        "z" => Some(Z),
        _ => None,
    }
}

fn derivative_at_sample_point(src: &str, variable: &str) -> f64 {
    let tree = parse(src).unwrap();
    let derivative = tree.derivative(variable).unwrap();

    let raw = ops::evaluate(&derivative, lookup).unwrap();
    let simplified =
        ops::evaluate(&ops::simplify(&derivative), lookup).unwrap();
    assert_relative_eq!(
        raw,
        simplified,
        epsilon = 1e-12,
        max_relative = 1e-9
    );

    raw
}

macro_rules! derivative_test {
    ($name:ident, $src:expr, $variable:expr, $should_be:expr) => {
        #[test]
        fn $name() {
            let got = derivative_at_sample_point($src, $variable);

            assert_relative_eq!(
                got,
                $should_be,
                epsilon = 1e-12,
                max_relative = 1e-9
            );
        }
    };
}

derivative_test!(sum, "( x + 1 )", "x", 1.0);
derivative_test!(difference, "( 5 - x )", "x", -1.0);
derivative_test!(
    with_respect_to_a_missing_variable,
    "( ( x - 3 ) + ( x + 1 ) )",
    "y",
    0.0
);
derivative_test!(partial_derivative, "( ( x * y ) + y )", "y", X + 1.0);
derivative_test!(product, "( x * x )", "x", 2.0 * X);
derivative_test!(
    quotient,
    "( x / ( z + 1 ) )",
    "z",
    -X / (Z + 1.0).powi(2)
);
derivative_test!(
    sine_of_a_difference,
    "sin( ( ( 5 * x ) - y ) )",
    "x",
    5.0 * (5.0 * X - Y).cos()
);
derivative_test!(
    nested_chain_rule,
    "cos( sin( ( 1 / x ) ) )",
    "x",
    (1.0 / X).sin().sin() * (1.0 / X).cos() / X.powi(2)
);
derivative_test!(
    exponential,
    "exp( ( ( x ** 2 ) * 3 ) )",
    "x",
    6.0 * X * (3.0 * X * X).exp()
);
derivative_test!(
    nested_logarithm,
    "( log( log( y ) ) * ( 1 / x ) )",
    "y",
    1.0 / (X * Y * Y.ln())
);
derivative_test!(
    constant_bases,
    "( ( 3 ** y ) * ( 2 ** x ) )",
    "x",
    3_f64.powf(Y) * 2_f64.powf(X) * 2_f64.ln()
);
derivative_test!(
    constant_base_with_a_function_exponent,
    "( 5 ** sin( ( x / 3 ) ) )",
    "x",
    5_f64.powf((X / 3.0).sin()) * 5_f64.ln() * (X / 3.0).cos() / 3.0
);
derivative_test!(
    power_of_a_power,
    "( ( sin( x ) ** 3 ) ** 2 )",
    "x",
    6.0 * X.sin().powi(5) * X.cos()
);
derivative_test!(
    function_to_the_power_of_a_function,
    "( sin( x ) ** sin( x ) )",
    "x",
    X.sin().powf(X.sin()) * X.cos() * (X.sin().ln() + 1.0)
);
derivative_test!(
    variable_to_the_power_of_a_variable,
    "( ( x ** x ) ** x )",
    "x",
    X.powf(X * X) * (2.0 * X * X.ln() + X)
);
derivative_test!(bare_symbol, "x", "x", 1.0);

#[test]
fn simplified_forms() {
    let inputs = vec![
        ("( x + 1 )", "x", Expression::integer(1)),
        ("( x + 1 )", "y", Expression::integer(0)),
        (
            "( x * x )",
            "x",
            Expression::integer(2) * Expression::symbol("x"),
        ),
        (
            "( x / ( z + 1 ) )",
            "z",
            -(Expression::symbol("x")
                / (Expression::symbol("z") + Expression::integer(1))
                    .pow(Expression::integer(2))),
        ),
    ];

    for (src, variable, should_be) in inputs {
        let derivative = parse(src).unwrap().derivative(variable).unwrap();

        let got = ops::simplify(&derivative);

        assert_eq!(got, should_be, "d/d{} {}", variable, src);
    }
}

#[test]
fn constant_expressions_match_arithmetic() {
    let inputs = vec![
        ("( ( 2 * 3 ) + ( 8 / 4 ) )", 8.0),
        ("( ( 1 - 4 ) * ( 2 ** 5 ) )", -96.0),
        ("( 7 / 2 )", 3.5),
        ("( 2 ** 100 )", 2_f64.powi(100)),
        ("( 99999999999999999999 - 1 )", 99_999_999_999_999_999_998.0),
        ("( ( 10 - 4 ) / ( 3 * 3 ) )", 6.0 / 9.0),
        ("exp( 0 )", 1.0),
        ("( sin( 0 ) + cos( 0 ) )", 1.0),
    ];

    for (src, should_be) in inputs {
        let value = parse(src).unwrap().evaluate().unwrap();

        let got = ops::evaluate(&value, lookup).unwrap();

        assert_relative_eq!(got, should_be, max_relative = 1e-12);
    }
}
