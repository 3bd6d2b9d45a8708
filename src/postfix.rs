use crate::decimal::Decimal;
use crate::error::{Error, ErrorKind};
use crate::lexer::{Operator, Token};
use crate::variables::VariableStore;

pub fn apply_binary(op: Operator, lhs: &Decimal, rhs: &Decimal) -> Result<Decimal, Error> {
    match op {
        Operator::Add => Ok(lhs.add(rhs)),
        Operator::Sub => Ok(lhs.sub(rhs)),
        Operator::Mul => Ok(lhs.mul(rhs)),
        Operator::Div => lhs.div(rhs),
        Operator::Rem => lhs.rem(rhs),
        Operator::Pow => lhs.pow(rhs),
        Operator::Neg => Err(Error::malformed("Negation is not a binary operator")),
    }
}

/// Evaluate a postfix sequence; unbound variables read as zero.
pub fn evaluate_postfix(postfix: &[Token], vars: &VariableStore) -> Result<Decimal, Error> {
    let mut stack: Vec<Decimal> = Vec::new();

    for token in postfix {
        match token {
            Token::Number(n) => stack.push(n.clone()),
            Token::Variable(name) => stack.push(vars.get(name)),
            Token::Operator(Operator::Neg) => {
                let operand = stack
                    .pop()
                    .ok_or_else(|| Error::malformed("Missing operand for '-'"))?;
                stack.push(operand.neg());
            }
            Token::Operator(op) => {
                let rhs = stack.pop();
                let lhs = stack.pop();
                let (lhs, rhs) = match (lhs, rhs) {
                    (Some(l), Some(r)) => (l, r),
                    _ => return Err(Error::malformed(format!("Missing operand for '{}'", op.symbol()))),
                };
                stack.push(apply_binary(*op, &lhs, &rhs)?);
            }
            Token::LParen | Token::RParen | Token::Comma | Token::Ident(_) => {
                return Err(Error::malformed(format!("Unexpected '{}' in postfix sequence", token)));
            }
        }
    }

    let result = stack.pop().ok_or_else(|| Error::new(ErrorKind::EmptyExpression, "Empty expression"))?;
    if !stack.is_empty() {
        return Err(Error::malformed(format!(
            "Expression leaves {} values, expected one (missing operator?)",
            stack.len() + 1
        )));
    }
    Ok(result)
}
