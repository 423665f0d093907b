use thiserror::Error;

use super::functions;
use super::tokenizer::Token;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("insufficient values for operator '{0}'")]
    MissingOperands(char),
    #[error("unsupported operator: '{0}'")]
    UnsupportedOperator(char),
    #[error("insufficient values for function '{0}'")]
    MissingArgument(String),
    #[error("unsupported function: '{0}'")]
    UnsupportedFunction(String),
    #[error("invalid expression")]
    InvalidExpression,
}

/// Reduces an RPN token sequence with a single value stack, binding
/// `Var` tokens to `value`. Arithmetic is plain IEEE `f64`: dividing
/// by zero yields an infinity, `sqrt` of a negative yields NaN.
pub fn eval_rpn(rpn: &[Token], value: f64) -> Result<f64, EvalError> {
    let mut stack: Vec<f64> = Vec::new();

    for token in rpn {
        match token {
            Token::Number(n) => stack.push(*n),
            Token::Var => stack.push(value),

            Token::Op(op) => {
                let right = stack.pop().ok_or(EvalError::MissingOperands(*op))?;
                let left = stack.pop().ok_or(EvalError::MissingOperands(*op))?;
                let result = match op {
                    '+' => left + right,
                    '-' => left - right,
                    '*' => left * right,
                    '/' => left / right,
                    '^' => left.powf(right),
                    _ => return Err(EvalError::UnsupportedOperator(*op)),
                };
                stack.push(result);
            }

            Token::Func(name) => {
                let arg = stack
                    .pop()
                    .ok_or_else(|| EvalError::MissingArgument(name.clone()))?;
                let result = functions::apply(name, arg)
                    .ok_or_else(|| EvalError::UnsupportedFunction(name.clone()))?;
                stack.push(result);
            }

            // raw infix leftovers have no place in a postfix sequence
            Token::Ident(_) | Token::LParen | Token::RParen => {
                return Err(EvalError::InvalidExpression);
            }
        }
    }

    if stack.len() != 1 {
        return Err(EvalError::InvalidExpression);
    }
    Ok(stack[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr_engine::{to_rpn, tokenize};

    fn eval_str(input: &str, x: f64) -> Result<f64, EvalError> {
        let rpn = to_rpn(&tokenize(input).unwrap(), "x").unwrap();
        eval_rpn(&rpn, x)
    }

    #[test]
    fn binds_the_variable() {
        assert_eq!(eval_str("x*x+1", 3.0), Ok(10.0));
        assert_eq!(eval_str("x*x+1", -3.0), Ok(10.0));
    }

    #[test]
    fn right_operand_pops_first() {
        assert_eq!(eval_str("8/4", 0.0), Ok(2.0));
        assert_eq!(eval_str("8-4", 0.0), Ok(4.0));
    }

    #[test]
    fn division_by_zero_is_ieee_infinity() {
        assert_eq!(eval_str("1/0", 0.0), Ok(f64::INFINITY));
        assert_eq!(eval_str("-1/0", 0.0), Ok(f64::NEG_INFINITY));
    }

    #[test]
    fn dangling_operator_underflows() {
        let rpn = to_rpn(&tokenize("2+").unwrap(), "x").unwrap();
        assert_eq!(eval_rpn(&rpn, 0.0), Err(EvalError::MissingOperands('+')));
    }

    #[test]
    fn function_without_argument_underflows() {
        let rpn = vec![Token::Func("sin".to_string())];
        assert_eq!(
            eval_rpn(&rpn, 0.0),
            Err(EvalError::MissingArgument("sin".to_string()))
        );
    }

    #[test]
    fn operator_outside_the_five_is_unsupported() {
        let rpn = vec![Token::Number(2.0), Token::Number(3.0), Token::Op('%')];
        assert_eq!(
            eval_rpn(&rpn, 0.0),
            Err(EvalError::UnsupportedOperator('%'))
        );
    }

    #[test]
    fn function_outside_the_table_is_unsupported() {
        let rpn = vec![Token::Number(2.0), Token::Func("floor".to_string())];
        assert_eq!(
            eval_rpn(&rpn, 0.0),
            Err(EvalError::UnsupportedFunction("floor".to_string()))
        );
    }

    #[test]
    fn leftover_values_are_invalid() {
        let rpn = vec![Token::Number(2.0), Token::Number(3.0)];
        assert_eq!(eval_rpn(&rpn, 0.0), Err(EvalError::InvalidExpression));
    }

    #[test]
    fn empty_sequence_is_invalid() {
        assert_eq!(eval_rpn(&[], 0.0), Err(EvalError::InvalidExpression));
    }

    #[test]
    fn infix_tokens_are_invalid_in_rpn() {
        assert_eq!(
            eval_rpn(&[Token::LParen], 0.0),
            Err(EvalError::InvalidExpression)
        );
    }
}
