//! Types and functions related to validating OpenQASM identifiers

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror;

use crate::reserved::ReservedToken;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum IdentifierValidationError {
    #[error("{0} is a reserved token")]
    Reserved(ReservedToken),

    #[error("{0} is not a valid identifier")]
    Invalid(String),
}

/// A regex that matches only valid OpenQASM identifiers
static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("regex should be valid"));

/// Returns an error if the given identifier is not a valid OpenQASM identifier
pub fn validate_identifier(ident: &str) -> Result<(), IdentifierValidationError> {
    if IDENTIFIER_REGEX.is_match(ident) {
        Ok(())
    } else {
        Err(IdentifierValidationError::Invalid(ident.to_string()))
    }
}

/// Returns an error if the given identifier is reserved, or if it is not a valid
/// OpenQASM identifier
pub fn validate_user_identifier(ident: &str) -> Result<(), IdentifierValidationError> {
    ReservedToken::from_str(ident).map_or(validate_identifier(ident), |t| {
        Err(IdentifierValidationError::Reserved(t))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bell", true)]
    #[case("_q0", true)]
    #[case("ch2", true)]
    #[case("2ch", false)]
    #[case("my-gate", false)]
    #[case("", false)]
    fn test_validate_identifier(#[case] ident: &str, #[case] ok: bool) {
        assert_eq!(validate_identifier(ident).is_ok(), ok);
    }

    #[rstest]
    #[case("gate")]
    #[case("measure")]
    #[case("qubit")]
    fn test_reserved_rejected(#[case] ident: &str) {
        assert!(matches!(
            validate_user_identifier(ident),
            Err(IdentifierValidationError::Reserved(_))
        ));
    }
}
