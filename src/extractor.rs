use crate::decimal::Decimal;
use crate::error::Error;
use crate::functions::{CallContext, FunctionRegistry, BUILTINS};
use crate::lexer::Token;
use crate::postfix::evaluate_postfix;
use crate::shunting_yard::to_postfix;
use crate::variables::VariableStore;
use std::iter::Peekable;

/// Replaces every function call in a token sequence with its result.
///
/// Arguments are split on top-level commas and each one is resolved and
/// evaluated on its own, so calls nest to any depth. Identifiers that name no
/// registered function are dropped with a warning; any parenthesized group that
/// followed them stays behind as ordinary grouping.
pub struct FunctionResolver<'a> {
    registry: &'a FunctionRegistry,
    vars: &'a VariableStore,
    dumps: Vec<VariableStore>,
}

impl<'a> FunctionResolver<'a> {
    pub fn new(vars: &'a VariableStore) -> Self {
        Self::with_registry(&BUILTINS, vars)
    }

    pub fn with_registry(registry: &'a FunctionRegistry, vars: &'a VariableStore) -> Self {
        Self { registry, vars, dumps: Vec::new() }
    }

    /// Variable-store snapshots taken by `vars()` calls so far.
    pub fn into_dumps(self) -> Vec<VariableStore> {
        self.dumps
    }

    pub fn resolve(&mut self, tokens: Vec<Token>) -> Result<Vec<Token>, Error> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut iter = tokens.into_iter().peekable();

        while let Some(token) = iter.next() {
            match token {
                Token::Ident(name) if self.registry.has_function(&name) => {
                    let raw_args = collect_arguments(&name, &mut iter);
                    let mut args = Vec::with_capacity(raw_args.len());
                    for arg in raw_args {
                        args.push(self.evaluate_argument(arg)?);
                    }
                    let mut ctx = CallContext { vars: self.vars, dumps: &mut self.dumps };
                    let result = self.registry.execute(&name, args, &mut ctx)?;
                    out.push(Token::Number(result));
                }
                Token::Ident(name) => {
                    log::warn!("unknown function '{}' ignored", name);
                }
                other => out.push(other),
            }
        }

        Ok(out)
    }

    fn evaluate_argument(&mut self, arg: Vec<Token>) -> Result<Decimal, Error> {
        let resolved = self.resolve(arg)?;
        evaluate_postfix(&to_postfix(&resolved), self.vars)
    }
}

/// Consume `( arg, arg, ... )` following a function name and split it into
/// argument token lists. A name without `(` takes no arguments; a missing
/// closing parenthesis is supplied at end of input.
fn collect_arguments<I>(name: &str, iter: &mut Peekable<I>) -> Vec<Vec<Token>>
where
    I: Iterator<Item = Token>,
{
    if iter.next_if_eq(&Token::LParen).is_none() {
        return Vec::new();
    }

    let mut args: Vec<Vec<Token>> = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut depth = 1usize;
    let mut closed = false;

    for token in iter.by_ref() {
        match token {
            Token::LParen => {
                depth += 1;
                current.push(token);
            }
            Token::RParen => {
                depth -= 1;
                if depth == 0 {
                    closed = true;
                    break;
                }
                current.push(token);
            }
            Token::Comma if depth == 1 => args.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }

    if !closed {
        log::warn!("call to '{}' is missing ')', closing it at end of input", name);
    }
    // `f()` has no arguments, but `f(1,)` has an empty second one
    if !current.is_empty() || !args.is_empty() {
        args.push(current);
    }
    args
}

/// Resolve all function calls in `tokens`, returning the rewritten sequence and
/// any variable dumps requested along the way.
pub fn resolve_functions(tokens: Vec<Token>, vars: &VariableStore) -> Result<(Vec<Token>, Vec<VariableStore>), Error> {
    let mut resolver = FunctionResolver::new(vars);
    let resolved = resolver.resolve(tokens)?;
    Ok((resolved, resolver.into_dumps()))
}
