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

use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::qasm::{Qasm, ToQasmResult};

mod calibration;
mod control_flow;
mod gate;
mod measurement;
mod pulse;
mod qubit;
mod subroutine;

pub use self::calibration::{CalibrationDefinition, CalibrationIdentifier, CalibrationSignature};
pub use self::control_flow::{Conditional, Loop};
pub use self::gate::{
    Gate, GateArgument, GateArgumentKind, GateCall, GateDefinition, GateError, GateSignature,
};
pub use self::measurement::{Measurement, MeasurementSource};
pub use self::pulse::{Pulse, PulseKind};
pub use self::qubit::{Qubit, QUBIT_REGISTER};
pub use self::subroutine::{
    Parameter, ParameterHint, ScalarType, SubroutineCall, SubroutineDefinition,
};

/// One node of a program graph.
///
/// Loop and conditional nodes own their nested body graphs; call nodes reference
/// registered definitions by name and are never inlined at the call site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Conditional(Conditional),
    Gate(Gate),
    GateCall(GateCall),
    Loop(Loop),
    Measurement(Measurement),
    Pulse(Pulse),
    SubroutineCall(SubroutineCall),
}

/// The role an instruction plays within a program, which is what the build-mode
/// legality rules are written against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstructionRole {
    /// A unitary gate application, built-in or defined.
    Unitary,
    /// Readout into a bit register.
    Measurement,
    /// Structured classical control flow.
    ControlFlow,
    /// A subroutine invocation.
    Call,
    /// Pulse-level control below the gate abstraction.
    PulseControl,
}

impl From<&Instruction> for InstructionRole {
    fn from(instruction: &Instruction) -> Self {
        match instruction {
            Instruction::Gate(_) | Instruction::GateCall(_) => InstructionRole::Unitary,
            Instruction::Measurement(_) => InstructionRole::Measurement,
            Instruction::Conditional(_) | Instruction::Loop(_) => InstructionRole::ControlFlow,
            Instruction::SubroutineCall(_) => InstructionRole::Call,
            Instruction::Pulse(_) => InstructionRole::PulseControl,
        }
    }
}

impl Instruction {
    /// A short human-readable name for the node kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Instruction::Conditional(_) => "conditional",
            Instruction::Gate(_) => "gate",
            Instruction::GateCall(_) => "gate call",
            Instruction::Loop(_) => "loop",
            Instruction::Measurement(_) => "measurement",
            Instruction::Pulse(_) => "pulse operation",
            Instruction::SubroutineCall(_) => "subroutine call",
        }
    }
}

impl Qasm for Instruction {
    fn write(&self, f: &mut impl std::fmt::Write) -> ToQasmResult<()> {
        match self {
            Instruction::Conditional(conditional) => conditional.write(f),
            Instruction::Gate(gate) => gate.write(f),
            Instruction::GateCall(call) => call.write(f),
            Instruction::Loop(traced_loop) => traced_loop.write(f),
            Instruction::Measurement(measurement) => measurement.write(f),
            Instruction::Pulse(pulse) => pulse.write(f),
            Instruction::SubroutineCall(call) => call.write(f),
        }
    }
}

/// Write a brace-delimited statement body: a newline, then every instruction's
/// lowered form indented one level. The caller writes the surrounding braces.
pub(crate) fn write_statement_block(
    f: &mut impl std::fmt::Write,
    instructions: &[Instruction],
) -> ToQasmResult<()> {
    writeln!(f)?;
    for instruction in instructions {
        crate::qasm::write_indented_block(f, &instruction.to_qasm()?)?;
    }
    Ok(())
}

/// Write expressions as a parenthesized argument list, or nothing when empty.
pub(crate) fn write_parenthesized(
    f: &mut impl std::fmt::Write,
    parameters: &[Expression],
) -> ToQasmResult<()> {
    if parameters.is_empty() {
        return Ok(());
    }

    write!(f, "(")?;
    crate::qasm::write_join_qasm(f, parameters, ", ")?;
    write!(f, ")")?;
    Ok(())
}
