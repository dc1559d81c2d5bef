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

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::instruction::{
    CalibrationDefinition, GateDefinition, Instruction, ScalarType, SubroutineDefinition,
    QUBIT_REGISTER,
};
use crate::qasm::{write_indented_block, Qasm, SerializationError, ToQasmResult};

pub use self::calibration::CalibrationSet;

mod calibration;

/// A finished program: the root instruction graph together with the registries
/// snapshotted at the end of its build pass.
///
/// A `Program` is the only build product that outlives the build pass. It is an
/// immutable value from the caller's perspective: the calibration binder derives
/// new programs rather than mutating, and exporting the same program twice
/// yields byte-identical text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// The bound calibration overlay; empty unless produced by
    /// [`Program::with_calibrations`].
    pub calibrations: CalibrationSet,
    /// Declared input parameters, in declaration order.
    pub inputs: IndexMap<String, ScalarType>,
    /// Registered subroutines, in registration order.
    pub subroutines: IndexMap<String, SubroutineDefinition>,
    /// Registered gate definitions, in registration order.
    pub gate_definitions: IndexMap<String, GateDefinition>,
    /// The size of the global qubit register, when one was declared.
    pub register_size: Option<u64>,
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the instructions that make up the body of the
    /// program.
    pub fn body_instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    pub fn into_body_instructions(self) -> impl Iterator<Item = Instruction> {
        self.instructions.into_iter()
    }

    /// Add an instruction to the end of the program body.
    pub fn add_instruction(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn add_instructions<I>(&mut self, instructions: I)
    where
        I: IntoIterator<Item = Instruction>,
    {
        self.instructions.extend(instructions);
    }

    /// Derive a program with the given calibrations bound as an overlay.
    ///
    /// The receiver is left untouched, so one traced program can be re-bound
    /// against different calibration sets. At export time, every gate call
    /// matching a bound calibration's target is replaced in place by the
    /// calibration's pulse body; other calls lower unchanged.
    pub fn with_calibrations<I>(&self, calibrations: I) -> Self
    where
        I: IntoIterator<Item = CalibrationDefinition>,
    {
        let mut bound = self.clone();
        bound.calibrations.extend(calibrations);
        bound
    }
}

impl Qasm for Program {
    fn write(&self, f: &mut impl std::fmt::Write) -> ToQasmResult<()> {
        write!(f, "OPENQASM 3.0;")?;

        for (name, data_type) in &self.inputs {
            write!(f, "\ninput ")?;
            data_type.write(f)?;
            write!(f, " {name};")?;
        }

        for name in dependency_ordered_names(&self.gate_definitions, gate_definition_callees)? {
            writeln!(f)?;
            self.gate_definitions[name].write(f)?;
        }

        for name in dependency_ordered_names(&self.subroutines, subroutine_callees)? {
            writeln!(f)?;
            self.subroutines[name].write(f)?;
        }

        if let Some(size) = self.register_size {
            write!(f, "\nqubit[{size}] {QUBIT_REGISTER};")?;
        }

        for instruction in &self.instructions {
            let mut lowered = String::new();
            write_bound_instruction(&mut lowered, instruction, &self.calibrations)?;
            write!(f, "\n{lowered}")?;
        }

        Ok(())
    }
}

/// Lower one body instruction, replacing gate calls that match a bound
/// calibration with the calibration's pulse body, inlined in place.
///
/// Definition bodies never pass through here: they are shared across call sites
/// and lower without the overlay.
fn write_bound_instruction(
    f: &mut impl std::fmt::Write,
    instruction: &Instruction,
    calibrations: &CalibrationSet,
) -> ToQasmResult<()> {
    match instruction {
        Instruction::Gate(gate) => {
            match calibrations.expand(&gate.name, &gate.parameters, &gate.qubits) {
                Some(expanded) => crate::qasm::write_join_qasm(f, &expanded, "\n"),
                None => gate.write(f),
            }
        }
        Instruction::GateCall(call) => {
            match calibrations.expand(&call.name, &call.parameters, &call.qubits) {
                Some(expanded) => crate::qasm::write_join_qasm(f, &expanded, "\n"),
                None => call.write(f),
            }
        }
        Instruction::Loop(traced_loop) => {
            write!(f, "for int {} in [", traced_loop.variable)?;
            traced_loop.start.write(f)?;
            write!(f, ":")?;
            traced_loop.end.write(f)?;
            write!(f, "] {{")?;
            write_bound_block(f, &traced_loop.body, calibrations)?;
            write!(f, "}}").map_err(Into::into)
        }
        Instruction::Conditional(conditional) => {
            write!(f, "if (")?;
            conditional.condition.write(f)?;
            write!(f, ") {{")?;
            write_bound_block(f, &conditional.then_body, calibrations)?;
            write!(f, "}}")?;
            if let Some(else_body) = &conditional.else_body {
                write!(f, " else {{")?;
                write_bound_block(f, else_body, calibrations)?;
                write!(f, "}}")?;
            }
            Ok(())
        }
        other => other.write(f),
    }
}

fn write_bound_block(
    f: &mut impl std::fmt::Write,
    instructions: &[Instruction],
    calibrations: &CalibrationSet,
) -> ToQasmResult<()> {
    writeln!(f)?;
    for instruction in instructions {
        let mut lowered = String::new();
        write_bound_instruction(&mut lowered, instruction, calibrations)?;
        write_indented_block(f, &lowered)?;
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

/// Order definition names such that every definition is preceded by the
/// definitions it calls, keeping registration order otherwise.
///
/// Registration through the builder cannot produce cycles (a callee must be
/// registered before its call site is traced), but a hand-assembled program can;
/// a cycle fails serialization rather than recursing without bound.
fn dependency_ordered_names<'a, T>(
    registry: &'a IndexMap<String, T>,
    callees_of: impl Fn(&'a T) -> Vec<&'a str>,
) -> Result<Vec<&'a str>, SerializationError> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut order = Vec::with_capacity(registry.len());

    fn visit<'a, T>(
        name: &'a str,
        registry: &'a IndexMap<String, T>,
        callees_of: &impl Fn(&'a T) -> Vec<&'a str>,
        marks: &mut HashMap<&'a str, Mark>,
        order: &mut Vec<&'a str>,
    ) -> Result<(), SerializationError> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                return Err(SerializationError::CyclicDefinition {
                    name: name.to_string(),
                })
            }
            None => {}
        }
        marks.insert(name, Mark::InProgress);

        if let Some(definition) = registry.get(name) {
            for callee in callees_of(definition) {
                if registry.contains_key(callee) {
                    visit(callee, registry, callees_of, marks, order)?;
                }
            }
        }

        marks.insert(name, Mark::Done);
        order.push(name);
        Ok(())
    }

    for name in registry.keys() {
        visit(name.as_str(), registry, &callees_of, &mut marks, &mut order)?;
    }

    Ok(order)
}

fn gate_definition_callees(definition: &GateDefinition) -> Vec<&str> {
    definition
        .body
        .iter()
        .filter_map(|instruction| match instruction {
            Instruction::Gate(gate) => Some(gate.name.as_str()),
            Instruction::GateCall(call) => Some(call.name.as_str()),
            _ => None,
        })
        .collect()
}

fn subroutine_callees(definition: &SubroutineDefinition) -> Vec<&str> {
    let mut names = Vec::new();
    collect_subroutine_calls(&definition.body, &mut names);
    names
}

fn collect_subroutine_calls<'a>(instructions: &'a [Instruction], names: &mut Vec<&'a str>) {
    for instruction in instructions {
        match instruction {
            Instruction::SubroutineCall(call) => names.push(call.name.as_str()),
            Instruction::Loop(traced_loop) => collect_subroutine_calls(&traced_loop.body, names),
            Instruction::Conditional(conditional) => {
                collect_subroutine_calls(&conditional.then_body, names);
                if let Some(else_body) = &conditional.else_body {
                    collect_subroutine_calls(else_body, names);
                }
            }
            _ => {}
        }
    }
}
