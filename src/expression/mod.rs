// Copyright 2021 Rigetti Computing
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Classical expressions: gate parameters, loop bounds, and conditional predicates.

use std::f64::consts::PI;
use std::fmt;
use std::num::NonZeroI32;
use std::ops::{Add, Div, Mul, Neg, Sub};

use lexical::{format, to_string_with_options, WriteFloatOptions};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::qasm::{Qasm, SerializationError, ToQasmResult};

/// A classical expression as it appears in a program: a gate or pulse argument,
/// a loop bound, or a conditional predicate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Infix(InfixExpression),
    Number(f64),
    PiConstant,
    Prefix(PrefixExpression),
    Variable(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InfixExpression {
    pub left: Box<Expression>,
    pub operator: InfixOperator,
    pub right: Box<Expression>,
}

impl InfixExpression {
    pub fn new(left: Expression, operator: InfixOperator, right: Expression) -> Self {
        Self {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrefixExpression {
    pub operator: PrefixOperator,
    pub expression: Box<Expression>,
}

impl PrefixExpression {
    pub fn new(operator: PrefixOperator, expression: Expression) -> Self {
        Self {
            operator,
            expression: Box::new(expression),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixOperator {
    Plus,
    Minus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOperator {
    Caret,
    Plus,
    Minus,
    Slash,
    Star,
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

impl Expression {
    pub fn variable<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Expression::Variable(name.into())
    }

    /// The build-time numeric value of this expression, if it has one.
    ///
    /// Variables never reduce to a number; `pi` and arithmetic over numbers do.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expression::Number(value) => Some(*value),
            Expression::PiConstant => Some(PI),
            Expression::Variable(_) => None,
            Expression::Prefix(PrefixExpression {
                operator,
                expression,
            }) => expression.as_number().map(|value| match operator {
                PrefixOperator::Plus => value,
                PrefixOperator::Minus => -value,
            }),
            Expression::Infix(InfixExpression {
                left,
                operator,
                right,
            }) => {
                let (left, right) = (left.as_number()?, right.as_number()?);
                match operator {
                    InfixOperator::Caret => Some(left.powf(right)),
                    InfixOperator::Plus => Some(left + right),
                    InfixOperator::Minus => Some(left - right),
                    InfixOperator::Slash => Some(left / right),
                    InfixOperator::Star => Some(left * right),
                    _ => None,
                }
            }
        }
    }

    /// Collect every variable name referenced within this expression.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expression::Number(_) | Expression::PiConstant => {}
            Expression::Variable(name) => names.push(name),
            Expression::Prefix(prefix) => prefix.expression.collect_variables(names),
            Expression::Infix(infix) => {
                infix.left.collect_variables(names);
                infix.right.collect_variables(names);
            }
        }
    }

    /// Replace every occurrence of a variable with the expression mapped to its name.
    pub(crate) fn substitute_variables(
        &mut self,
        substitutions: &std::collections::HashMap<String, Expression>,
    ) {
        match self {
            Expression::Number(_) | Expression::PiConstant => {}
            Expression::Variable(name) => {
                if let Some(replacement) = substitutions.get(name) {
                    *self = replacement.clone();
                }
            }
            Expression::Prefix(prefix) => prefix.expression.substitute_variables(substitutions),
            Expression::Infix(infix) => {
                infix.left.substitute_variables(substitutions);
                infix.right.substitute_variables(substitutions);
            }
        }
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::Number(value)
    }
}

impl From<u64> for Expression {
    fn from(value: u64) -> Self {
        Expression::Number(value as f64)
    }
}

macro_rules! impl_expr_op {
    ($trait:ident, $function:ident, $operator:ident) => {
        impl $trait for Expression {
            type Output = Expression;
            fn $function(self, other: Self) -> Self {
                Expression::Infix(InfixExpression::new(self, InfixOperator::$operator, other))
            }
        }
    };
}

impl_expr_op!(Add, add, Plus);
impl_expr_op!(Sub, sub, Minus);
impl_expr_op!(Mul, mul, Star);
impl_expr_op!(Div, div, Slash);

impl Neg for Expression {
    type Output = Expression;
    fn neg(self) -> Self {
        Expression::Prefix(PrefixExpression::new(PrefixOperator::Minus, self))
    }
}

static FORMAT_REAL_OPTIONS: Lazy<WriteFloatOptions> = Lazy::new(|| {
    WriteFloatOptions::builder()
        .negative_exponent_break(NonZeroI32::new(-5))
        .positive_exponent_break(NonZeroI32::new(15))
        .trim_floats(true)
        .build()
        .expect("options are valid")
});

/// Format a real value without a trailing `.0`, identically across runs.
pub(crate) fn format_real(value: f64) -> String {
    const FORMAT: u128 = format::STANDARD;
    to_string_with_options::<_, FORMAT>(value, &FORMAT_REAL_OPTIONS)
}

/// Parenthesize nested infix expressions so that precedence survives the round trip.
fn format_inner_expression(
    f: &mut impl std::fmt::Write,
    expression: &Expression,
) -> ToQasmResult<()> {
    match expression {
        Expression::Infix(InfixExpression {
            left,
            operator,
            right,
        }) => {
            write!(f, "(")?;
            format_inner_expression(f, left)?;
            write!(f, "{operator}")?;
            format_inner_expression(f, right)?;
            write!(f, ")")?;
            Ok(())
        }
        _ => expression.write(f),
    }
}

impl Qasm for Expression {
    fn write(&self, f: &mut impl std::fmt::Write) -> Result<(), SerializationError> {
        match self {
            Expression::Infix(InfixExpression {
                left,
                operator,
                right,
            }) => {
                format_inner_expression(f, left)?;
                write!(f, "{operator}")?;
                format_inner_expression(f, right)
            }
            Expression::Number(value) => write!(f, "{}", format_real(*value)).map_err(Into::into),
            Expression::PiConstant => write!(f, "pi").map_err(Into::into),
            Expression::Prefix(PrefixExpression {
                operator,
                expression,
            }) => {
                write!(f, "{operator}")?;
                format_inner_expression(f, expression)
            }
            Expression::Variable(name) => write!(f, "{name}").map_err(Into::into),
        }
    }
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use PrefixOperator::*;
        write!(
            f,
            "{}",
            match self {
                Plus => "+",
                Minus => "-",
            }
        )
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use InfixOperator::*;
        write!(
            f,
            "{}",
            match self {
                Caret => "^",
                Plus => "+",
                Minus => "-",
                Slash => "/",
                Star => "*",
                Equal => "==",
                NotEqual => "!=",
                LessThan => "<",
                LessThanEqual => "<=",
                GreaterThan => ">",
                GreaterThanEqual => ">=",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Expression::Number(0.5), "0.5")]
    #[case(Expression::Number(1.0), "1")]
    #[case(Expression::Number(-2.5), "-2.5")]
    #[case(Expression::PiConstant, "pi")]
    #[case(Expression::variable("theta"), "theta")]
    #[case(-(Expression::PiConstant / Expression::Number(4.0)), "-(pi/4)")]
    #[case(Expression::variable("i") + Expression::Number(1.0), "i+1")]
    #[case(
        Expression::Infix(InfixExpression::new(
            Expression::variable("__bit_0__"),
            InfixOperator::Equal,
            Expression::Number(1.0),
        )),
        "__bit_0__==1"
    )]
    fn test_write(#[case] expression: Expression, #[case] expected: &str) {
        assert_eq!(expression.to_qasm().unwrap(), expected);
    }

    #[test]
    fn test_as_number() {
        let bound = Expression::Number(4.0) + Expression::Number(1.0);
        assert_eq!(bound.as_number(), Some(5.0));
        assert_eq!(Expression::variable("n").as_number(), None);
    }

    #[test]
    fn test_variables() {
        let expression = Expression::variable("i") + Expression::variable("n");
        assert_eq!(expression.variables(), vec!["i", "n"]);
    }

    #[test]
    fn test_substitution() {
        let mut expression = Expression::variable("theta") / Expression::Number(2.0);
        let substitutions = std::collections::HashMap::from([(
            "theta".to_string(),
            Expression::PiConstant,
        )]);
        expression.substitute_variables(&substitutions);
        assert_eq!(expression.to_qasm().unwrap(), "pi/2");
    }
}
