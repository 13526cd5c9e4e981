//! Loose number parsing for free-text answers.
//!
//! Accepts the first numeric token in the input, so `"17.3"`, `"17.3 m/s"`,
//! `"1.2e-3"` and `"-.5"` all parse.

use crate::error::QuizError;
use regex::Regex;
use std::sync::LazyLock;

/// Message shown when the input has no usable number.
pub const NOT_A_NUMBER: &str = "Enter a numeric value.";

static NUMBER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?(\d+(\.\d*)?|\.\d+)([eE][-+]?\d+)?").expect("number token pattern")
});

/// Extract the first numeric token from `input`.
pub fn parse_number_loose(input: &str) -> Result<f64, QuizError> {
    let token = NUMBER_TOKEN
        .find(input.trim())
        .ok_or_else(not_a_number)?
        .as_str();

    let value: f64 = token.parse().map_err(|_| not_a_number())?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(not_a_number())
    }
}

/// Fixed-point rendering with `decimals` digits after the point.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        value.to_string()
    }
}

fn not_a_number() -> QuizError {
    QuizError::Parse {
        message: NOT_A_NUMBER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_decorated_numbers() {
        assert_eq!(parse_number_loose("17.3").unwrap(), 17.3);
        assert_eq!(parse_number_loose("  17.3 m/s ").unwrap(), 17.3);
        assert_eq!(parse_number_loose("v = -4").unwrap(), -4.0);
        assert_eq!(parse_number_loose("1.2e-3").unwrap(), 0.0012);
        assert_eq!(parse_number_loose("-.5").unwrap(), -0.5);
        assert_eq!(parse_number_loose("+.25").unwrap(), 0.25);
        assert_eq!(parse_number_loose("3.").unwrap(), 3.0);
    }

    #[test]
    fn takes_first_token_only() {
        assert_eq!(parse_number_loose("12 or 13").unwrap(), 12.0);
    }

    #[test]
    fn rejects_input_without_digits() {
        for input in ["", "   ", "abc", "-", ".", "e"] {
            let err = parse_number_loose(input).unwrap_err();
            assert_eq!(err.to_string(), NOT_A_NUMBER, "input {input:?}");
        }
    }

    #[test]
    fn rejects_overflowing_values() {
        assert!(matches!(
            parse_number_loose("1e999"),
            Err(QuizError::Parse { .. })
        ));
    }

    #[test]
    fn formats_fixed_point() {
        assert_eq!(format_fixed(17.3216, 3), "17.322");
        assert_eq!(format_fixed(2.0, 0), "2");
        assert_eq!(format_fixed(-0.5, 2), "-0.50");
        assert_eq!(format_fixed(f64::INFINITY, 3), "inf");
    }
}
