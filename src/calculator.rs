use crate::decimal::Decimal;
use crate::error::Error;
use crate::extractor::resolve_functions;
use crate::lexer::tokenize;
use crate::postfix::evaluate_postfix;
use crate::shunting_yard::to_postfix;
use crate::variables::VariableStore;

/// Result of evaluating one expression.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub value: Decimal,
    /// Variable-store snapshots requested with `vars()`, in call order.
    pub dumps: Vec<VariableStore>,
}

/// What a single input line turned into.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Blank line.
    Empty,
    Value(Evaluation),
    Assigned { name: String, evaluation: Evaluation },
    /// A bare `$name` line. Nothing is evaluated or printed.
    Declared(String),
}

/// An evaluation context owning the variable bindings of one session.
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    vars: VariableStore,
}

impl Calculator {
    pub fn new() -> Self {
        Self { vars: VariableStore::new() }
    }

    pub fn with_variables(vars: VariableStore) -> Self {
        Self { vars }
    }

    pub fn variables(&self) -> &VariableStore {
        &self.vars
    }

    /// Run an expression through tokenizer, function resolution, shunting-yard
    /// and postfix evaluation. Variables are read but never written.
    pub fn evaluate(&self, expression: &str) -> Result<Evaluation, Error> {
        let tokens = tokenize(expression);
        let (tokens, dumps) = resolve_functions(tokens, &self.vars)?;
        let postfix = to_postfix(&tokens);
        let value = evaluate_postfix(&postfix, &self.vars)?;
        Ok(Evaluation { value, dumps })
    }

    /// Evaluate `expression` and bind the result to `name`. An empty
    /// right-hand side binds zero. On error the binding is left untouched.
    pub fn assign(&mut self, name: &str, expression: &str) -> Result<Evaluation, Error> {
        let evaluation = if expression.trim().is_empty() {
            Evaluation { value: Decimal::zero(), dumps: Vec::new() }
        } else {
            self.evaluate(expression)?
        };
        log::debug!("${} = {}", name, evaluation.value);
        self.vars.set(name, evaluation.value.clone());
        Ok(evaluation)
    }

    /// Route one input line: `$name = expr` assigns, a bare `$name` is a no-op,
    /// anything else is evaluated.
    pub fn process_line(&mut self, line: &str) -> Result<Outcome, Error> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Outcome::Empty);
        }

        if let Some((name, rest)) = split_declaration(line) {
            let rest = rest.trim_start();
            if rest.is_empty() {
                log::debug!("bare declaration of ${} ignored", name);
                return Ok(Outcome::Declared(name.to_string()));
            }
            if let Some(rhs) = rest.strip_prefix('=') {
                let evaluation = self.assign(name, rhs)?;
                return Ok(Outcome::Assigned { name: name.to_string(), evaluation });
            }
        }

        Ok(Outcome::Value(self.evaluate(line)?))
    }
}

/// Split `$name...` into the variable name and the remainder of the line.
fn split_declaration(line: &str) -> Option<(&str, &str)> {
    let body = line.strip_prefix('$')?;
    let first = body.bytes().next()?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let end = body
        .bytes()
        .position(|b| !(b.is_ascii_alphanumeric() || b == b'_'))
        .unwrap_or(body.len());
    Some(body.split_at(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_splitting() {
        assert_eq!(split_declaration("$x = 5"), Some(("x", " = 5")));
        assert_eq!(split_declaration("$Total_2"), Some(("Total_2", "")));
        assert_eq!(split_declaration("$1 = 2"), None);
        assert_eq!(split_declaration("x = 2"), None);
    }

    #[test]
    fn failed_assignment_keeps_previous_binding() {
        let mut calc = Calculator::new();
        calc.process_line("$x = 2").unwrap();
        assert!(calc.process_line("$x = 1 / 0").is_err());
        assert_eq!(calc.variables().get("x"), Decimal::from(2));
    }
}
