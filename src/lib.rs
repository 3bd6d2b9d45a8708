pub mod calculator;
pub mod config;
pub mod decimal;
pub mod error;
pub mod extractor;
pub mod functions;
pub mod lexer;
pub mod postfix;
pub mod repl;
pub mod shunting_yard;
pub mod variables;

pub use calculator::{Calculator, Evaluation, Outcome};
pub use config::Config;
pub use decimal::{Decimal, SCALE};
pub use error::{Error, ErrorKind, SessionError};
pub use lexer::{Operator, Token};
pub use variables::VariableStore;

/// Evaluate an expression with no variables bound.
pub fn evaluate(input: &str) -> Result<Decimal, Error> {
    evaluate_with(input, &VariableStore::new())
}

/// Evaluate an expression against existing variable bindings.
pub fn evaluate_with(input: &str, vars: &VariableStore) -> Result<Decimal, Error> {
    let calculator = Calculator::with_variables(vars.clone());
    Ok(calculator.evaluate(input)?.value)
}
