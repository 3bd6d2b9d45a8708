use crate::lexer::{render_tokens, Operator, Token};

impl Operator {
    /// Binding strength: `+ -` 1, `* / %` 2, prefix minus 3, `^` 4.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div | Operator::Rem => 2,
            Operator::Neg => 3,
            Operator::Pow => 4,
        }
    }
}

/// Reorder an infix token sequence into postfix.
///
/// Every binary operator is left-associative, `^` included, so `2 ^ 3 ^ 2` is
/// `(2 ^ 3) ^ 2`. Prefix minus sits between `*` and `^`, so `-3 ^ 2` is
/// `-(3 ^ 2)` while `2 ^ -3` still negates the exponent. Unbalanced parentheses
/// are tolerated: a stray `)` is ignored and an unclosed `(` is discarded when
/// the stack is flushed. Commas and identifiers have no meaning at this stage
/// and are skipped.
pub fn to_postfix(tokens: &[Token]) -> Vec<Token> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(_) | Token::Variable(_) => output.push(token.clone()),
            Token::LParen => stack.push(Token::LParen),
            Token::RParen => {
                let mut matched = false;
                while let Some(top) = stack.pop() {
                    if top == Token::LParen {
                        matched = true;
                        break;
                    }
                    output.push(top);
                }
                if !matched {
                    log::warn!("unbalanced ')' ignored");
                }
            }
            Token::Operator(op) if op.is_unary() => stack.push(token.clone()),
            Token::Operator(op) => {
                while let Some(Token::Operator(top)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    if let Some(popped) = stack.pop() {
                        output.push(popped);
                    }
                }
                stack.push(token.clone());
            }
            Token::Comma | Token::Ident(_) => {
                log::debug!("skipping '{}' outside of a function call", token);
            }
        }
    }

    while let Some(top) = stack.pop() {
        if top == Token::LParen {
            log::warn!("unbalanced '(' discarded");
            continue;
        }
        output.push(top);
    }

    log::debug!("postfix: {}", render_tokens(&output));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn postfix(input: &str) -> String {
        render_tokens(&to_postfix(&tokenize(input)))
    }

    #[test]
    fn precedence_orders_operators() {
        assert_eq!(postfix("2 + 3 * 4"), "2 3 4 * +");
        assert_eq!(postfix("2 * 3 + 4"), "2 3 * 4 +");
        assert_eq!(postfix("8 % 3 - 1"), "8 3 % 1 -");
    }

    #[test]
    fn all_binary_operators_are_left_associative() {
        assert_eq!(postfix("10 - 4 - 3"), "10 4 - 3 -");
        assert_eq!(postfix("2 ^ 3 ^ 2"), "2 3 ^ 2 ^");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(postfix("(2 + 3) * 4"), "2 3 + 4 *");
        assert_eq!(postfix("2 * (3 + (4 - 1))"), "2 3 4 1 - + *");
    }

    #[test]
    fn prefix_minus_binds_below_exponent() {
        assert_eq!(postfix("-3 ^ 2"), "3 2 ^ neg");
        assert_eq!(postfix("-(3) ^ 2"), "3 2 ^ neg");
        assert_eq!(postfix("-2 * 3"), "2 neg 3 *");
        assert_eq!(postfix("2 ^ -3"), "2 3 neg ^");
        assert_eq!(postfix("- -4"), "4 neg neg");
    }

    #[test]
    fn unbalanced_parentheses_are_tolerated() {
        assert_eq!(postfix("(2 + 3"), "2 3 +");
        assert_eq!(postfix("2 + 3) * 4"), "2 3 + 4 *");
    }
}
