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

//! Build [OpenQASM 3.0](https://openqasm.com) programs by tracing ordinary
//! imperative build logic.
//!
//! Within this crate you'll find:
//!
//! * A [build-mode dispatcher] which runs user logic exactly once at build time,
//!   capturing operations and structured control flow into an instruction graph
//!   instead of executing them
//! * Builder types for [programs], [instructions], and [expressions]
//! * Registries for typed [subroutines], [gate definitions], and pulse-level
//!   [gate calibrations], with a binder for substituting calibrated
//!   implementations into a finished program
//! * A deterministic [serializer] from a finished program to OpenQASM 3.0 text
//!
//! A traced loop or conditional is captured as a single structured node owning
//! its body graph, so loops whose bounds are only resolvable when the emitted
//! program runs still trace in constant time. Registries are owned per build
//! pass; independent builds never observe each other's registrations.
//!
//! [build-mode dispatcher]: crate::builder::build_program
//! [expressions]: crate::expression::Expression
//! [gate calibrations]: crate::builder::build_calibration
//! [gate definitions]: crate::instruction::GateDefinition
//! [instructions]: crate::instruction::Instruction
//! [programs]: crate::program::Program
//! [serializer]: crate::qasm::Qasm
//! [subroutines]: crate::instruction::SubroutineDefinition

pub mod builder;
pub mod expression;
pub mod instruction;
pub mod program;
pub mod qasm;
pub mod reserved;
pub mod validation;

pub use program::Program;
