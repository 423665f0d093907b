use thiserror::Error;

use super::functions::is_function;
use super::tokenizer::Token;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("unknown identifier: '{0}'")]
    UnknownIdentifier(String),
    #[error("mismatched parentheses")]
    MismatchedParens,
}

fn precedence(op: char) -> u8 {
    match op {
        '+' | '-' => 1,
        '*' | '/' => 2,
        '^' => 3,
        _ => 0,
    }
}

fn is_right_associative(op: char) -> bool {
    op == '^'
}

/// A `-` negates the value that follows it instead of subtracting when
/// it opens the expression, or sits right after an operator, an
/// opening parenthesis, or a function name.
fn is_unary_minus(prev: Option<&Token>) -> bool {
    match prev {
        None => true,
        Some(Token::Op(_)) | Some(Token::LParen) => true,
        Some(Token::Ident(name)) => is_function(name),
        Some(Token::Func(_)) => true,
        _ => false,
    }
}

/// Shunting-yard conversion of an infix token sequence into RPN.
/// Identifiers are classified here: the free-variable name becomes a
/// `Var` token, a function-table name becomes a `Func` pushed on the
/// operator stack, anything else is rejected.
///
/// Example: `sin(x)+1` becomes `[Var, Func("sin"), Number(1.0), Op('+')]`.
pub fn to_rpn(tokens: &[Token], variable: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut output: Vec<Token> = Vec::new();
    let mut ops: Vec<Token> = Vec::new();
    let mut prev: Option<&Token> = None;

    for token in tokens {
        match token {
            Token::Number(_) | Token::Var => output.push(token.clone()),

            Token::Ident(name) => {
                if name == variable {
                    output.push(Token::Var);
                } else if is_function(name) {
                    ops.push(Token::Func(name.clone()));
                } else {
                    return Err(SyntaxError::UnknownIdentifier(name.clone()));
                }
            }

            Token::Func(name) => ops.push(Token::Func(name.clone())),

            Token::Op('-') if is_unary_minus(prev) => {
                ops.push(Token::Func("neg".to_string()));
            }

            Token::Op(op) => {
                while let Some(top) = ops.last() {
                    match top {
                        // a function's argument binds tighter than any
                        // operator that follows it
                        Token::Func(_) => {
                            let func = ops.pop().unwrap();
                            output.push(func);
                        }
                        Token::Op(top_op) => {
                            let pops = if is_right_associative(*op) {
                                precedence(*top_op) > precedence(*op)
                            } else {
                                precedence(*top_op) >= precedence(*op)
                            };
                            if !pops {
                                break;
                            }
                            let top = ops.pop().unwrap();
                            output.push(top);
                        }
                        _ => break,
                    }
                }
                ops.push(Token::Op(*op));
            }

            Token::LParen => ops.push(Token::LParen),

            Token::RParen => {
                loop {
                    match ops.pop() {
                        Some(Token::LParen) => break,
                        Some(inner) => output.push(inner),
                        None => return Err(SyntaxError::MismatchedParens),
                    }
                }
                // the closing parenthesis completes a function argument
                if matches!(ops.last(), Some(Token::Func(_))) {
                    let func = ops.pop().unwrap();
                    output.push(func);
                }
            }
        }
        prev = Some(token);
    }

    while let Some(op) = ops.pop() {
        if matches!(op, Token::LParen) {
            return Err(SyntaxError::MismatchedParens);
        }
        output.push(op);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr_engine::tokenize;

    fn rpn(input: &str) -> Result<Vec<Token>, SyntaxError> {
        to_rpn(&tokenize(input).unwrap(), "x")
    }

    fn num(n: f64) -> Token {
        Token::Number(n)
    }

    fn func(name: &str) -> Token {
        Token::Func(name.to_string())
    }

    #[test]
    fn multiplication_before_addition() {
        assert_eq!(
            rpn("2+3*4").unwrap(),
            vec![num(2.0), num(3.0), num(4.0), Token::Op('*'), Token::Op('+')]
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(
            rpn("(2+3)*4").unwrap(),
            vec![num(2.0), num(3.0), Token::Op('+'), num(4.0), Token::Op('*')]
        );
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(
            rpn("2^3^2").unwrap(),
            vec![num(2.0), num(3.0), num(2.0), Token::Op('^'), Token::Op('^')]
        );
    }

    #[test]
    fn same_precedence_resolves_left_to_right() {
        assert_eq!(
            rpn("8-3-2").unwrap(),
            vec![num(8.0), num(3.0), Token::Op('-'), num(2.0), Token::Op('-')]
        );
    }

    #[test]
    fn free_variable_becomes_var_token() {
        assert_eq!(
            rpn("x+1").unwrap(),
            vec![Token::Var, num(1.0), Token::Op('+')]
        );
        assert_eq!(
            to_rpn(&tokenize("t+1").unwrap(), "t").unwrap(),
            vec![Token::Var, num(1.0), Token::Op('+')]
        );
    }

    #[test]
    fn function_follows_its_argument() {
        assert_eq!(rpn("sin(x)").unwrap(), vec![Token::Var, func("sin")]);
        assert_eq!(
            rpn("sin(x)+1").unwrap(),
            vec![Token::Var, func("sin"), num(1.0), Token::Op('+')]
        );
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        assert_eq!(
            rpn("foo(x)"),
            Err(SyntaxError::UnknownIdentifier("foo".to_string()))
        );
        assert_eq!(
            rpn("y+1"),
            Err(SyntaxError::UnknownIdentifier("y".to_string()))
        );
    }

    #[test]
    fn leading_minus_is_negation() {
        assert_eq!(rpn("-x").unwrap(), vec![Token::Var, func("neg")]);
    }

    #[test]
    fn minus_after_operator_is_negation() {
        assert_eq!(
            rpn("2*-3").unwrap(),
            vec![num(2.0), num(3.0), func("neg"), Token::Op('*')]
        );
        assert_eq!(
            rpn("2^-3").unwrap(),
            vec![num(2.0), num(3.0), func("neg"), Token::Op('^')]
        );
    }

    #[test]
    fn minus_after_open_paren_is_negation() {
        assert_eq!(rpn("(-x)").unwrap(), vec![Token::Var, func("neg")]);
    }

    #[test]
    fn minus_between_values_subtracts() {
        assert_eq!(
            rpn("2-3").unwrap(),
            vec![num(2.0), num(3.0), Token::Op('-')]
        );
        assert_eq!(
            rpn("(x)-3").unwrap(),
            vec![Token::Var, num(3.0), Token::Op('-')]
        );
    }

    #[test]
    fn chained_negations_stack() {
        assert_eq!(
            rpn("--x").unwrap(),
            vec![Token::Var, func("neg"), func("neg")]
        );
    }

    #[test]
    fn negation_pops_before_power() {
        // the function always leaves the stack before a following
        // operator, so -x^2 reads as (-x)^2
        assert_eq!(
            rpn("-x^2").unwrap(),
            vec![Token::Var, func("neg"), num(2.0), Token::Op('^')]
        );
    }

    #[test]
    fn unclosed_paren_is_mismatched() {
        assert_eq!(rpn("(2+3"), Err(SyntaxError::MismatchedParens));
        assert_eq!(rpn("sin(x"), Err(SyntaxError::MismatchedParens));
    }

    #[test]
    fn stray_closing_paren_is_mismatched() {
        assert_eq!(rpn("2+3)"), Err(SyntaxError::MismatchedParens));
    }
}
