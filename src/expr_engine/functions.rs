/// Name set of the fixed unary function table. `neg` is arithmetic
/// negation and only ever enters an expression as a reclassified
/// unary minus.
pub fn is_function(name: &str) -> bool {
    matches!(
        name,
        "sin" | "cos" | "tan" | "sqrt" | "ln" | "log" | "exp" | "abs" | "neg"
    )
}

/// Applies a table function to its argument. `log` is base-10, `ln`
/// natural. Returns `None` for names outside the table.
pub fn apply(name: &str, x: f64) -> Option<f64> {
    let value = match name {
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "sqrt" => x.sqrt(),
        "ln" => x.ln(),
        "log" => x.log10(),
        "exp" => x.exp(),
        "abs" => x.abs(),
        "neg" => -x,
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_membership() {
        assert!(is_function("sin"));
        assert!(is_function("neg"));
        assert!(!is_function("foo"));
        assert!(!is_function("Sin"));
    }

    #[test]
    fn log_is_base_ten_and_ln_is_natural() {
        assert!((apply("log", 100.0).unwrap() - 2.0).abs() < 1e-12);
        assert!((apply("ln", std::f64::consts::E).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn neg_flips_sign() {
        assert_eq!(apply("neg", 3.0), Some(-3.0));
        assert_eq!(apply("neg", -3.0), Some(3.0));
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(apply("floor", 1.5), None);
    }
}
