use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::qasm::{Qasm, SerializationError};

/// The name of the global qubit register declared by a program.
pub const QUBIT_REGISTER: &str = "__qubits__";

/// A reference to a qubit within a program.
///
/// Qubits are never block-scoped locals: every reference resolves against the
/// program's single global register, a hardware qubit literal, or a formal
/// parameter of the enclosing definition body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Qubit {
    /// An index into the program's global qubit register, e.g. `__qubits__[3]`.
    Virtual(u64),
    /// A register slot selected by a classical expression, e.g. `__qubits__[q0]`
    /// inside a subroutine body or `__qubits__[i+1]` inside a loop body.
    Indexed(Expression),
    /// A bare formal qubit parameter of a gate definition or calibration body.
    Variable(String),
    /// A hardware qubit literal, e.g. `$3`, stored verbatim and never resolved
    /// against the register.
    Physical(u64),
}

impl Qubit {
    pub fn variable<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Qubit::Variable(name.into())
    }

    /// Whether this reference carries a concrete target rather than a formal name.
    pub fn is_concrete(&self) -> bool {
        match self {
            Qubit::Virtual(_) | Qubit::Physical(_) => true,
            Qubit::Indexed(expression) => expression.as_number().is_some(),
            Qubit::Variable(_) => false,
        }
    }
}

impl Qasm for Qubit {
    fn write(&self, writer: &mut impl std::fmt::Write) -> Result<(), SerializationError> {
        use Qubit::*;
        match self {
            Virtual(index) => write!(writer, "{QUBIT_REGISTER}[{index}]").map_err(Into::into),
            Indexed(expression) => {
                write!(writer, "{QUBIT_REGISTER}[")?;
                expression.write(writer)?;
                write!(writer, "]").map_err(Into::into)
            }
            Variable(name) => write!(writer, "{name}").map_err(Into::into),
            Physical(index) => write!(writer, "${index}").map_err(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;
    use rstest::rstest;

    #[rstest]
    #[case(Qubit::Virtual(0), "__qubits__[0]")]
    #[case(Qubit::Indexed(Expression::variable("q0")), "__qubits__[q0]")]
    #[case(
        Qubit::Indexed(Expression::variable("i") + Expression::Number(1.0)),
        "__qubits__[i+1]"
    )]
    #[case(Qubit::variable("a"), "a")]
    #[case(Qubit::Physical(5), "$5")]
    fn test_write(#[case] qubit: Qubit, #[case] expected: &str) {
        assert_eq!(qubit.to_qasm().unwrap(), expected);
    }
}
