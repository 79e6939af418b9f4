use derivatives::{ops, ExpressionTree, DEFAULT_VARIABLE};
use std::io::{BufRead, BufReader};

/// Reads lines like `( x * ( y + 1 ) ) ; y` from stdin and prints their
/// derivatives. The variable defaults to `x` when left out.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();

    for line in BufReader::new(stdin.lock()).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let (src, variable) = match line.find(';') {
            Some(index) => (&line[..index], line[index + 1..].trim()),
            None => (line.as_str(), DEFAULT_VARIABLE),
        };

        let tree: ExpressionTree = match src.parse() {
            Ok(tree) => tree,
            Err(e) => {
                eprintln!("Unable to parse \"{}\": {}", src.trim(), e);
                continue;
            },
        };

        let derivative = tree.derivative(variable)?;
        let compact: String = src.split_whitespace().collect();
        println!("{}'{}: {}", compact, variable, ops::simplify(&derivative));
    }

    Ok(())
}
