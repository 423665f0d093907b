use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Op(char),
    Ident(String),
    LParen,
    RParen,
    /// The free variable, resolved from an identifier during RPN conversion.
    Var,
    /// A function name, resolved from an identifier during RPN conversion.
    Func(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character: '{0}'")]
    UnexpectedChar(char),
    #[error("invalid number: '{0}'")]
    InvalidNumber(String),
}

/// Splits an expression string into tokens. Whitespace is stripped up
/// front, so `1 2` reads as the number 12. No exponent notation: `1e3`
/// is the number 1 followed by the identifier `e3`.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    let mut tokens = Vec::new();
    let mut chars = stripped.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            '+' | '-' | '*' | '/' | '^' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut num_str = String::new();
                let mut dots = 0;

                while let Some(&ch) = chars.peek() {
                    match ch {
                        '0'..='9' => {
                            num_str.push(ch);
                            chars.next();
                        }
                        '.' => {
                            dots += 1;
                            num_str.push(ch);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                if dots > 1 {
                    return Err(LexError::InvalidNumber(num_str));
                }
                match num_str.parse::<f64>() {
                    Ok(value) => tokens.push(Token::Number(value)),
                    Err(_) => return Err(LexError::InvalidNumber(num_str)),
                }
            }
            'a'..='z' | 'A'..='Z' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            _ => return Err(LexError::UnexpectedChar(c)),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_expression_into_tokens() {
        let tokens = tokenize("2*(x+1)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(2.0),
                Token::Op('*'),
                Token::LParen,
                Token::Ident("x".to_string()),
                Token::Op('+'),
                Token::Number(1.0),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn strips_all_whitespace_first() {
        assert_eq!(tokenize(" 1 +\t2 ").unwrap(), tokenize("1+2").unwrap());
        assert_eq!(tokenize("1 2").unwrap(), vec![Token::Number(12.0)]);
    }

    #[test]
    fn parses_decimal_numbers() {
        assert_eq!(tokenize("3.25").unwrap(), vec![Token::Number(3.25)]);
        assert_eq!(tokenize(".5").unwrap(), vec![Token::Number(0.5)]);
    }

    #[test]
    fn rejects_multiple_decimal_points() {
        assert_eq!(
            tokenize("1.2.3"),
            Err(LexError::InvalidNumber("1.2.3".to_string()))
        );
        assert_eq!(tokenize("."), Err(LexError::InvalidNumber(".".to_string())));
    }

    #[test]
    fn rejects_unknown_characters() {
        assert_eq!(tokenize("2~3"), Err(LexError::UnexpectedChar('~')));
        assert_eq!(tokenize("2%3"), Err(LexError::UnexpectedChar('%')));
    }

    #[test]
    fn reads_identifiers_with_digits_and_underscores() {
        assert_eq!(
            tokenize("log2_a").unwrap(),
            vec![Token::Ident("log2_a".to_string())]
        );
    }

    #[test]
    fn no_exponent_notation() {
        assert_eq!(
            tokenize("1e3").unwrap(),
            vec![Token::Number(1.0), Token::Ident("e3".to_string())]
        );
    }

    #[test]
    fn sign_is_not_part_of_the_literal() {
        assert_eq!(
            tokenize("-4").unwrap(),
            vec![Token::Op('-'), Token::Number(4.0)]
        );
    }
}
