use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::instruction::{write_statement_block, Instruction};
use crate::qasm::{Qasm, SerializationError, ToQasmResult};

/// A classical scalar type, as declared on subroutine parameters.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    Angle,
    Bit,
    Bool,
    Float,
    Int,
}

impl Qasm for ScalarType {
    fn write(&self, f: &mut impl std::fmt::Write) -> ToQasmResult<()> {
        use ScalarType::*;
        write!(
            f,
            "{}",
            match self {
                Angle => "angle[32]",
                Bit => "bit",
                Bool => "bool",
                Float => "float[64]",
                Int => "int[32]",
            }
        )
        .map_err(Into::into)
    }
}

/// A fully-typed subroutine parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub data_type: ScalarType,
}

impl Parameter {
    pub fn new<S: Into<String>>(name: S, data_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

impl Qasm for Parameter {
    fn write(&self, f: &mut impl std::fmt::Write) -> ToQasmResult<()> {
        self.data_type.write(f)?;
        write!(f, " {}", self.name).map_err(Into::into)
    }
}

/// A parameter as declared at the dynamic entry surface, where a type annotation
/// may be absent. Registration rejects hints without a type; a stored
/// [`SubroutineDefinition`] is always fully typed.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterHint {
    pub name: String,
    pub data_type: Option<ScalarType>,
}

impl ParameterHint {
    pub fn typed<S: Into<String>>(name: S, data_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            data_type: Some(data_type),
        }
    }

    pub fn untyped<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            data_type: None,
        }
    }
}

/// A named, reusable instruction fragment with typed parameters.
///
/// Serialized exactly once per registered name; every invocation lowers to a
/// call expression, never to an inline expansion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubroutineDefinition {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub body: Vec<Instruction>,
}

impl SubroutineDefinition {
    pub fn new(name: String, parameters: Vec<Parameter>, body: Vec<Instruction>) -> Self {
        Self {
            name,
            parameters,
            body,
        }
    }
}

impl Qasm for SubroutineDefinition {
    fn write(&self, f: &mut impl std::fmt::Write) -> ToQasmResult<()> {
        write!(f, "def {}(", self.name)?;
        crate::qasm::write_join_qasm(f, &self.parameters, ", ")?;
        write!(f, ") {{")?;
        write_statement_block(f, &self.body)?;
        write!(f, "}}").map_err(Into::into)
    }
}

/// A call to a registered subroutine, by name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubroutineCall {
    pub name: String,
    pub arguments: Vec<Expression>,
}

impl Qasm for SubroutineCall {
    fn write(&self, f: &mut impl std::fmt::Write) -> Result<(), SerializationError> {
        write!(f, "{}(", self.name)?;
        crate::qasm::write_join_qasm(f, &self.arguments, ", ")?;
        write!(f, ");").map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Gate, Qubit};
    use insta::assert_snapshot;
    use rstest::rstest;

    #[rstest]
    #[case(ScalarType::Int, "int[32]")]
    #[case(ScalarType::Float, "float[64]")]
    #[case(ScalarType::Bit, "bit")]
    fn test_scalar_type_display(#[case] data_type: ScalarType, #[case] expected: &str) {
        assert_eq!(data_type.to_qasm().unwrap(), expected);
    }

    #[test]
    fn test_call_display() {
        let call = SubroutineCall {
            name: "bell".to_string(),
            arguments: vec![Expression::Number(0.0), Expression::Number(1.0)],
        };
        assert_eq!(call.to_qasm().unwrap(), "bell(0, 1);");
    }

    #[test]
    fn test_definition_display() {
        let definition = SubroutineDefinition::new(
            "bell".to_string(),
            vec![
                Parameter::new("q0", ScalarType::Int),
                Parameter::new("q1", ScalarType::Int),
            ],
            vec![
                Instruction::Gate(Gate {
                    name: "h".to_string(),
                    parameters: vec![],
                    qubits: vec![Qubit::Indexed(Expression::variable("q0"))],
                }),
                Instruction::Gate(Gate {
                    name: "cnot".to_string(),
                    parameters: vec![],
                    qubits: vec![
                        Qubit::Indexed(Expression::variable("q0")),
                        Qubit::Indexed(Expression::variable("q1")),
                    ],
                }),
            ],
        );

        assert_snapshot!(definition.to_qasm().unwrap(), @r###"
        def bell(int[32] q0, int[32] q1) {
            h __qubits__[q0];
            cnot __qubits__[q0], __qubits__[q1];
        }
        "###);
    }
}
