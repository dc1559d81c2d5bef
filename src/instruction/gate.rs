use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::instruction::{write_parenthesized, write_statement_block, Instruction, Qubit};
use crate::qasm::{Qasm, ToQasmResult};
use crate::validation::identifier::{validate_user_identifier, IdentifierValidationError};

/// An application of a built-in gate to one or more qubits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub name: String,
    pub parameters: Vec<Expression>,
    pub qubits: Vec<Qubit>,
}

#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum GateError {
    #[error("invalid name: {0}")]
    InvalidIdentifier(#[from] IdentifierValidationError),

    #[error("a gate must operate on 1 or more qubits")]
    EmptyQubits,

    #[error("gate definition `{name}` must declare at least one qubit parameter")]
    NoQubitParameters { name: String },
}

impl Gate {
    /// Build a new gate application.
    ///
    /// # Errors
    ///
    /// Returns an error if the given name isn't a valid identifier or if no qubits
    /// are given.
    pub fn new(
        name: &str,
        parameters: Vec<Expression>,
        qubits: Vec<Qubit>,
    ) -> Result<Self, GateError> {
        if qubits.is_empty() {
            return Err(GateError::EmptyQubits);
        }

        validate_user_identifier(name)?;

        Ok(Self {
            name: name.to_string(),
            parameters,
            qubits,
        })
    }
}

impl Qasm for Gate {
    fn write(&self, f: &mut impl std::fmt::Write) -> ToQasmResult<()> {
        write_gate_application(f, &self.name, &self.parameters, &self.qubits)
    }
}

/// A call to a registered gate definition.
///
/// Lowered identically to a [`Gate`]; the distinct node kind records that the
/// callee is a definition resolved by name at trace time and that the serialized
/// declaration must precede this call site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateCall {
    pub name: String,
    pub parameters: Vec<Expression>,
    pub qubits: Vec<Qubit>,
}

impl Qasm for GateCall {
    fn write(&self, f: &mut impl std::fmt::Write) -> ToQasmResult<()> {
        write_gate_application(f, &self.name, &self.parameters, &self.qubits)
    }
}

fn write_gate_application(
    f: &mut impl std::fmt::Write,
    name: &str,
    parameters: &[Expression],
    qubits: &[Qubit],
) -> ToQasmResult<()> {
    write!(f, "{name}")?;
    write_parenthesized(f, parameters)?;
    write!(f, " ")?;
    crate::qasm::write_join_qasm(f, qubits, ", ")?;
    write!(f, ";").map_err(Into::into)
}

/// A named, reusable gate decomposition.
///
/// The body is restricted to gate applications; qubit parameters are kept apart
/// from classical parameters so the declaration header can place each correctly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateDefinition {
    pub name: String,
    /// Classical (angle) parameter names, emitted parenthesized.
    pub parameters: Vec<String>,
    /// Formal qubit names; these cannot be concrete qubits.
    pub qubit_parameters: Vec<String>,
    pub body: Vec<Instruction>,
}

impl GateDefinition {
    /// Build a new gate definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid identifier or if no qubit
    /// parameters are declared.
    pub fn new(
        name: &str,
        parameters: Vec<String>,
        qubit_parameters: Vec<String>,
        body: Vec<Instruction>,
    ) -> Result<Self, GateError> {
        validate_user_identifier(name)?;
        if qubit_parameters.is_empty() {
            return Err(GateError::NoQubitParameters {
                name: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            parameters,
            qubit_parameters,
            body,
        })
    }

    /// The formal calibration-target signature of this definition: classical
    /// parameters first, then qubit parameters, in declared order.
    pub fn signature(&self) -> GateSignature {
        GateSignature {
            name: self.name.clone(),
            arguments: self
                .parameters
                .iter()
                .map(|name| GateArgument::angle(name.clone()))
                .chain(
                    self.qubit_parameters
                        .iter()
                        .map(|name| GateArgument::qubit(name.clone())),
                )
                .collect(),
        }
    }
}

impl Qasm for GateDefinition {
    fn write(&self, f: &mut impl std::fmt::Write) -> ToQasmResult<()> {
        write!(f, "gate {}", self.name)?;
        if !self.parameters.is_empty() {
            write!(f, "({})", self.parameters.join(", "))?;
        }
        write!(f, " {} {{", self.qubit_parameters.join(", "))?;
        write_statement_block(f, &self.body)?;
        write!(f, "}}").map_err(Into::into)
    }
}

/// The formal argument surface of a gate, as targeted by a calibration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateSignature {
    pub name: String,
    pub arguments: Vec<GateArgument>,
}

impl GateSignature {
    pub fn new(name: &str, arguments: Vec<GateArgument>) -> Result<Self, GateError> {
        validate_user_identifier(name)?;
        Ok(Self {
            name: name.to_string(),
            arguments,
        })
    }

    pub fn argument_names(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().map(|argument| argument.name.as_str())
    }
}

/// One formal argument of a gate signature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateArgument {
    pub name: String,
    pub kind: GateArgumentKind,
}

impl GateArgument {
    pub fn qubit<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            kind: GateArgumentKind::Qubit,
        }
    }

    pub fn angle<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            kind: GateArgumentKind::Angle,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateArgumentKind {
    Qubit,
    Angle,
}

#[cfg(test)]
mod test_gate {
    use super::*;
    use crate::expression::Expression;

    #[test]
    fn test_application_display() {
        let gate = Gate::new(
            "cnot",
            vec![],
            vec![Qubit::Virtual(0), Qubit::Virtual(1)],
        )
        .unwrap();
        assert_eq!(
            gate.to_qasm().unwrap(),
            "cnot __qubits__[0], __qubits__[1];"
        );
    }

    #[test]
    fn test_parameterized_application_display() {
        let gate = Gate::new(
            "rx",
            vec![Expression::PiConstant / Expression::Number(2.0)],
            vec![Qubit::Physical(0)],
        )
        .unwrap();
        assert_eq!(gate.to_qasm().unwrap(), "rx(pi/2) $0;");
    }

    #[test]
    fn test_empty_qubits_rejected() {
        assert_eq!(
            Gate::new("h", vec![], vec![]).unwrap_err(),
            GateError::EmptyQubits
        );
    }

    #[test]
    fn test_reserved_name_rejected() {
        assert!(matches!(
            Gate::new("measure", vec![], vec![Qubit::Virtual(0)]),
            Err(GateError::InvalidIdentifier(_))
        ));
    }
}

#[cfg(test)]
mod test_gate_definition {
    use super::*;
    use crate::expression::Expression;
    use crate::instruction::Instruction;
    use insta::assert_snapshot;

    #[test]
    fn test_definition_display() {
        let definition = GateDefinition::new(
            "ch",
            vec![],
            vec!["q0".to_string(), "q1".to_string()],
            vec![
                Instruction::Gate(Gate {
                    name: "ry".to_string(),
                    parameters: vec![-(Expression::PiConstant / Expression::Number(4.0))],
                    qubits: vec![Qubit::variable("q1")],
                }),
                Instruction::Gate(Gate {
                    name: "cz".to_string(),
                    parameters: vec![],
                    qubits: vec![Qubit::variable("q0"), Qubit::variable("q1")],
                }),
                Instruction::Gate(Gate {
                    name: "ry".to_string(),
                    parameters: vec![Expression::PiConstant / Expression::Number(4.0)],
                    qubits: vec![Qubit::variable("q1")],
                }),
            ],
        )
        .unwrap();

        assert_snapshot!(definition.to_qasm().unwrap(), @r###"
        gate ch q0, q1 {
            ry(-(pi/4)) q1;
            cz q0, q1;
            ry(pi/4) q1;
        }
        "###);
    }

    #[test]
    fn test_no_qubit_parameters_rejected() {
        assert!(matches!(
            GateDefinition::new("phase_only", vec!["theta".to_string()], vec![], vec![]),
            Err(GateError::NoQubitParameters { .. })
        ));
    }
}
