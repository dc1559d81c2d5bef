use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::instruction::{write_statement_block, Instruction, Qubit};
use crate::qasm::{Qasm, ToQasmResult};

/// Signature-based identity for calibrations: only one calibration may exist per
/// signature, and replacement is keyed on it.
pub trait CalibrationSignature {
    type Signature<'a>: PartialEq
    where
        Self: 'a;

    fn signature(&self) -> Self::Signature<'_>;

    fn has_signature(&self, signature: &Self::Signature<'_>) -> bool;
}

/// A pulse-level implementation of one concrete gate instance.
///
/// The body is restricted to pulse operations. At bind time the body is inlined
/// in place of every matching gate call, with the call site's concrete values
/// substituted for the free parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationDefinition {
    pub identifier: CalibrationIdentifier,
    pub body: Vec<Instruction>,
}

impl CalibrationDefinition {
    pub fn new(identifier: CalibrationIdentifier, body: Vec<Instruction>) -> Self {
        Self { identifier, body }
    }
}

impl CalibrationSignature for CalibrationDefinition {
    type Signature<'a> = <CalibrationIdentifier as CalibrationSignature>::Signature<'a>;

    fn signature(&self) -> Self::Signature<'_> {
        self.identifier.signature()
    }

    fn has_signature(&self, signature: &Self::Signature<'_>) -> bool {
        self.identifier.has_signature(signature)
    }
}

impl Qasm for CalibrationDefinition {
    fn write(&self, f: &mut impl std::fmt::Write) -> ToQasmResult<()> {
        self.identifier.write(f)?;
        write!(f, " {{")?;
        write_statement_block(f, &self.body)?;
        write!(f, "}}").map_err(Into::into)
    }
}

/// The target instance a calibration implements: the gate name plus, for each
/// formal argument of the gate, either a concrete bound value or a free
/// pass-through variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationIdentifier {
    /// The name of the gate being implemented.
    pub name: String,

    /// One entry per classical formal: a concrete expression when the argument
    /// was bound at registration, or a [`Expression::Variable`] naming the free
    /// parameter.
    pub parameters: Vec<Expression>,

    /// One entry per qubit formal: a physical literal when bound, or a
    /// [`Qubit::Variable`] naming the free parameter.
    pub qubits: Vec<Qubit>,
}

impl CalibrationIdentifier {
    pub fn new(name: String, parameters: Vec<Expression>, qubits: Vec<Qubit>) -> Self {
        Self {
            name,
            parameters,
            qubits,
        }
    }

    /// Whether this calibration implements the given gate application.
    ///
    /// Free parameters match any concrete value; bound values must be equal.
    /// Abstract qubits at the call site (formals inside a definition body) never
    /// match, since they carry no concrete target.
    pub fn matches(&self, name: &str, parameters: &[Expression], qubits: &[Qubit]) -> bool {
        if self.name != name
            || self.parameters.len() != parameters.len()
            || self.qubits.len() != qubits.len()
        {
            return false;
        }

        let qubits_match = self
            .qubits
            .iter()
            .zip(qubits)
            .all(|(calibration_qubit, gate_qubit)| match calibration_qubit {
                // A free qubit parameter matches any concrete qubit
                Qubit::Variable(_) => gate_qubit.is_concrete(),
                bound => bound == gate_qubit,
            });
        if !qubits_match {
            return false;
        }

        self.parameters
            .iter()
            .zip(parameters)
            .all(
                |(calibration_parameter, gate_parameter)| match calibration_parameter {
                    Expression::Variable(_) => true,
                    bound => match (bound.as_number(), gate_parameter.as_number()) {
                        (Some(left), Some(right)) => left == right,
                        _ => bound == gate_parameter,
                    },
                },
            )
    }

    /// The count of concretely-bound qubits, used to rank competing matches.
    pub(crate) fn fixed_qubit_count(&self) -> usize {
        self.qubits
            .iter()
            .filter(|qubit| !matches!(qubit, Qubit::Variable(_)))
            .count()
    }
}

impl CalibrationSignature for CalibrationIdentifier {
    type Signature<'a> = (&'a str, &'a [Expression], &'a [Qubit]);

    fn signature(&self) -> Self::Signature<'_> {
        let Self {
            name,
            parameters,
            qubits,
        } = self;
        (name.as_str(), parameters.as_slice(), qubits.as_slice())
    }

    fn has_signature(&self, signature: &Self::Signature<'_>) -> bool {
        &self.signature() == signature
    }
}

impl Qasm for CalibrationIdentifier {
    fn write(&self, f: &mut impl std::fmt::Write) -> ToQasmResult<()> {
        write!(f, "defcal {}", self.name)?;
        if !self.parameters.is_empty() {
            write!(f, "(")?;
            let mut first = true;
            for parameter in &self.parameters {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                match parameter {
                    Expression::Variable(name) => write!(f, "angle[32] {name}")?,
                    bound => bound.write(f)?,
                }
            }
            write!(f, ")")?;
        }
        write!(f, " ")?;
        crate::qasm::write_join_qasm(f, &self.qubits, ", ")?;
        Ok(())
    }
}
