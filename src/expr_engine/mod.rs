mod eval;
mod functions;
mod rpn;
mod tokenizer;

pub use eval::{eval_rpn, EvalError};
pub use functions::is_function;
pub use rpn::{to_rpn, SyntaxError};
pub use tokenizer::{tokenize, LexError, Token};

use thiserror::Error;

/// A failure from any of the three pipeline stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Failure to evaluate an expression at a concrete variable binding.
/// Always names the binding that was attempted, so a caller can show
/// one message regardless of which stage gave up.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot evaluate '{expression}' at {variable} = {value}: {source}")]
pub struct EvaluationError {
    pub expression: String,
    pub variable: String,
    pub value: f64,
    pub source: ExprError,
}

/// An expression tokenized and converted to RPN once, ready to run at
/// many variable bindings. This is what a plotting caller should hold
/// on to instead of calling [`evaluate`] per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    variable: String,
    rpn: Vec<Token>,
}

impl CompiledExpression {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Runs the evaluation stage at `variable = value`.
    pub fn eval(&self, value: f64) -> Result<f64, EvalError> {
        eval_rpn(&self.rpn, value)
    }
}

/// Runs the tokenizer and the shunting-yard conversion once. The
/// alternate `**` exponent spelling is normalized to `^` up front;
/// identifiers cannot contain `*`, so the whole-string replacement
/// cannot touch any other token.
pub fn compile(expression: &str, variable: &str) -> Result<CompiledExpression, ExprError> {
    let normalized = expression.replace("**", "^");
    let tokens = tokenize(&normalized)?;
    let rpn = to_rpn(&tokens, variable)?;
    Ok(CompiledExpression {
        source: expression.to_string(),
        variable: variable.to_string(),
        rpn,
    })
}

/// Evaluates `expression` at `x = value`.
pub fn evaluate(expression: &str, value: f64) -> Result<f64, EvaluationError> {
    evaluate_named(expression, value, "x")
}

/// Evaluates `expression` at `variable = value`, running all three
/// stages. Nothing is cached between calls; a caller sampling the same
/// expression repeatedly should [`compile`] it once instead.
pub fn evaluate_named(
    expression: &str,
    value: f64,
    variable: &str,
) -> Result<f64, EvaluationError> {
    compile(expression, variable)
        .and_then(|compiled| compiled.eval(value).map_err(ExprError::from))
        .map_err(|source| EvaluationError {
            expression: expression.to_string(),
            variable: variable.to_string(),
            value,
            source,
        })
}
