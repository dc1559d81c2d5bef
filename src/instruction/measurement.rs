use serde::{Deserialize, Serialize};

use crate::instruction::{Qubit, QUBIT_REGISTER};
use crate::qasm::{Qasm, SerializationError};

/// A measurement of one or more qubits into a program-scoped bit register.
///
/// The target register name is assigned when the measurement is traced
/// (`__bit_0__`, `__bit_1__`, ...), so the result can be referenced by later
/// predicates and the lowered text is stable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// The bit register receiving the results.
    pub target: String,
    pub source: MeasurementSource,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MeasurementSource {
    /// The entire qubit register, measured in a single statement.
    EntireRegister { size: u64 },
    /// An explicit list of qubits, measured slot by slot.
    Qubits(Vec<Qubit>),
}

impl Qasm for Measurement {
    fn write(&self, writer: &mut impl std::fmt::Write) -> Result<(), SerializationError> {
        let target = &self.target;
        match &self.source {
            MeasurementSource::EntireRegister { size } => {
                writeln!(writer, "bit[{size}] {target};")?;
                write!(writer, "{target} = measure {QUBIT_REGISTER};").map_err(Into::into)
            }
            MeasurementSource::Qubits(qubits) if qubits.len() == 1 => {
                writeln!(writer, "bit {target};")?;
                write!(writer, "{target} = measure ")?;
                qubits[0].write(writer)?;
                write!(writer, ";").map_err(Into::into)
            }
            MeasurementSource::Qubits(qubits) => {
                writeln!(writer, "bit[{}] {target};", qubits.len())?;
                for (slot, qubit) in qubits.iter().enumerate() {
                    if slot > 0 {
                        writeln!(writer)?;
                    }
                    write!(writer, "{target}[{slot}] = measure ")?;
                    qubit.write(writer)?;
                    write!(writer, ";")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_single_qubit() {
        let measurement = Measurement {
            target: "__bit_0__".to_string(),
            source: MeasurementSource::Qubits(vec![Qubit::Virtual(0)]),
        };
        assert_snapshot!(measurement.to_qasm().unwrap(), @r###"
        bit __bit_0__;
        __bit_0__ = measure __qubits__[0];
        "###);
    }

    #[test]
    fn test_entire_register() {
        let measurement = Measurement {
            target: "__bit_0__".to_string(),
            source: MeasurementSource::EntireRegister { size: 5 },
        };
        assert_snapshot!(measurement.to_qasm().unwrap(), @r###"
        bit[5] __bit_0__;
        __bit_0__ = measure __qubits__;
        "###);
    }

    #[test]
    fn test_qubit_list() {
        let measurement = Measurement {
            target: "__bit_1__".to_string(),
            source: MeasurementSource::Qubits(vec![Qubit::Virtual(0), Qubit::Physical(5)]),
        };
        assert_snapshot!(measurement.to_qasm().unwrap(), @r###"
        bit[2] __bit_1__;
        __bit_1__[0] = measure __qubits__[0];
        __bit_1__[1] = measure $5;
        "###);
    }
}
