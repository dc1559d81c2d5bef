//! This module contains enums for reserved tokens in [OpenQASM 3.0](https://openqasm.com)

use std::{fmt::Display, str::FromStr};

use strum;

/// An enum that can represent any reserved token in OpenQASM 3.0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReservedToken {
    Keyword(ReservedKeyword),
    Type(ReservedType),
    Constant(ReservedConstant),
}

#[derive(Clone, Debug)]
pub struct NotReservedToken(String);

impl FromStr for ReservedToken {
    type Err = NotReservedToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(keyword) = ReservedKeyword::from_str(s) {
            Ok(Self::Keyword(keyword))
        } else if let Ok(scalar_type) = ReservedType::from_str(s) {
            Ok(Self::Type(scalar_type))
        } else if let Ok(constant) = ReservedConstant::from_str(s) {
            Ok(Self::Constant(constant))
        } else {
            Err(NotReservedToken(format!("{s} is not a reserved token")))
        }
    }
}

impl Display for ReservedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword(keyword) => write!(f, "{keyword}"),
            Self::Type(scalar_type) => write!(f, "{scalar_type}"),
            Self::Constant(constant) => write!(f, "{constant}"),
        }
    }
}

/// Any reserved keyword that isn't specifically a type name or constant
#[derive(Clone, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ReservedKeyword {
    Barrier,
    Box,
    Cal,
    Const,
    Ctrl,
    Def,
    Defcal,
    Defcalgrammar,
    Delay,
    Else,
    End,
    Extern,
    For,
    Gate,
    Gphase,
    If,
    In,
    Include,
    Input,
    Inv,
    Let,
    Measure,
    Negctrl,
    #[strum(serialize = "OPENQASM")]
    OpenQasm,
    Output,
    Pow,
    Pragma,
    Reset,
    Return,
    While,
}

/// A reserved classical or quantum type name
#[derive(Clone, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ReservedType {
    Angle,
    Array,
    Bit,
    Bool,
    Complex,
    Creg,
    Duration,
    Float,
    Int,
    Qreg,
    Qubit,
    Stretch,
    Uint,
}

/// A reserved constant name
#[derive(Clone, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ReservedConstant {
    Euler,
    Pi,
    Tau,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("gate", ReservedToken::Keyword(ReservedKeyword::Gate))]
    #[case("OPENQASM", ReservedToken::Keyword(ReservedKeyword::OpenQasm))]
    #[case("qubit", ReservedToken::Type(ReservedType::Qubit))]
    #[case("pi", ReservedToken::Constant(ReservedConstant::Pi))]
    fn test_reserved_token_from_str(#[case] input: &str, #[case] expected: ReservedToken) {
        assert_eq!(ReservedToken::from_str(input).unwrap(), expected);
    }

    #[test]
    fn test_not_reserved() {
        assert!(ReservedToken::from_str("bell").is_err());
    }
}
