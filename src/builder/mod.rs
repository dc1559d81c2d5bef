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

//! The build-mode dispatcher: runs user build logic exactly once, capturing
//! operations and structured control flow into a [`Program`].
//!
//! A build pass is a *trace pass*, not the program's eventual runtime: loops and
//! conditionals are recorded structurally rather than executed, so a loop whose
//! bound is only known when the emitted program runs still traces in constant
//! time.

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools as _;

use crate::expression::Expression;
use crate::instruction::{
    CalibrationDefinition, CalibrationIdentifier, Conditional, Gate, GateArgumentKind, GateCall,
    GateDefinition, GateError, GateSignature, Instruction, InstructionRole, Loop, Measurement,
    MeasurementSource, Parameter, ParameterHint, Pulse, PulseKind, Qubit, ScalarType,
    SubroutineCall, SubroutineDefinition,
};
use crate::program::Program;
use crate::validation::identifier::{
    validate_identifier, validate_user_identifier, IdentifierValidationError,
};

pub use self::register::{QubitRegister, QubitScopeError};

mod register;

const BIT_PREFIX: &str = "__bit_";

/// The four modes a trace can run in. Each mode admits a different subset of
/// the instruction vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum BuildMode {
    Main,
    Subroutine,
    Gate,
    Calibration,
}

/// An error raised while tracing a program build.
///
/// All build errors are structural and synchronous: the build either completes
/// and returns a full [`Program`], or fails with no partial result.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BuildError {
    #[error("a {instruction} is not allowed in {mode} mode")]
    ModeViolation {
        instruction: String,
        mode: BuildMode,
    },

    #[error("`{name}` must be registered at the top level of a program build, not inside another trace")]
    DefinitionInsideTrace { name: String },

    #[error(transparent)]
    QubitScope(#[from] QubitScopeError),

    #[error("parameter `{parameter}` of subroutine `{subroutine}` is missing a declared type")]
    UntypedParameter {
        subroutine: String,
        parameter: String,
    },

    #[error("call to `{name}`, which has no registered definition")]
    UndefinedCallee { name: String },

    #[error("calibration for gate `{gate}` does not cover argument `{argument}`")]
    UnboundCalibrationArgument { gate: String, argument: String },

    #[error("`{argument}` is not a formal argument of gate `{gate}`")]
    UnknownCalibrationArgument { gate: String, argument: String },

    #[error("calibration argument `{argument}` of gate `{gate}` is covered more than once")]
    DuplicateCalibrationArgument { gate: String, argument: String },

    #[error("calibration argument `{argument}` of gate `{gate}` must be bound to a {expected}")]
    CalibrationArgumentType {
        gate: String,
        argument: String,
        expected: &'static str,
    },

    #[error("expected {expected} arguments for `{name}`, got {actual}")]
    ArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("parameter `{name}` is declared more than once")]
    DuplicateParameter { name: String },

    #[error("variable `{name}` is not defined in the current scope")]
    UndefinedVariable { name: String },

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierValidationError),
}

/// Options for a program build.
#[derive(Clone, Debug, Default)]
pub struct ProgramConfig {
    /// The total number of qubits to declare in the program register. When
    /// absent, the program declares no register and may only address physical
    /// qubits.
    pub num_qubits: Option<u64>,
}

/// Run one program build pass.
///
/// The closure is the traced user logic; it runs exactly once, synchronously,
/// and every operation it performs through the builder is captured into the
/// returned [`Program`].
pub fn build_program<F>(config: ProgramConfig, body: F) -> Result<Program, BuildError>
where
    F: FnOnce(&mut ProgramBuilder) -> Result<(), BuildError>,
{
    let mut builder = ProgramBuilder::new(BuildMode::Main, IndexSet::new(), IndexSet::new());
    if let Some(num_qubits) = config.num_qubits {
        builder.register.declare(num_qubits)?;
    }
    body(&mut builder)?;
    Ok(builder.into_program())
}

/// Run one calibration build pass, producing a definition to be bound into a
/// program via [`Program::with_calibrations`].
///
/// The bindings must cover the target signature's formal arguments exactly:
/// each formal is either bound to a concrete value here or declared as a free
/// pass-through parameter of the calibration body.
pub fn build_calibration<F>(
    target: &GateSignature,
    bindings: CalibrationBindings,
    body: F,
) -> Result<CalibrationDefinition, BuildError>
where
    F: FnOnce(&mut ProgramBuilder) -> Result<(), BuildError>,
{
    let identifier = bindings.into_identifier(target)?;

    let free_qubits: IndexSet<String> = identifier
        .qubits
        .iter()
        .filter_map(|qubit| match qubit {
            Qubit::Variable(name) => Some(name.clone()),
            _ => None,
        })
        .collect();
    let free_angles: IndexSet<String> = identifier
        .parameters
        .iter()
        .filter_map(|parameter| match parameter {
            Expression::Variable(name) => Some(name.clone()),
            _ => None,
        })
        .collect();

    let mut builder = ProgramBuilder::new(BuildMode::Calibration, free_angles, free_qubits);
    body(&mut builder)?;
    let frame = builder.pop_frame();
    Ok(CalibrationDefinition::new(identifier, frame.instructions))
}

/// The concrete values and free parameters a calibration supplies for its
/// target gate's formal arguments.
#[derive(Clone, Debug, Default)]
pub struct CalibrationBindings {
    bound: IndexMap<String, BoundValue>,
    free: Vec<String>,
}

#[derive(Clone, Debug)]
enum BoundValue {
    Qubit(Qubit),
    Angle(Expression),
}

impl CalibrationBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a qubit formal to a concrete physical qubit.
    pub fn bind_qubit<S: Into<String>>(mut self, name: S, qubit: Qubit) -> Self {
        self.bound.insert(name.into(), BoundValue::Qubit(qubit));
        self
    }

    /// Bind an angle formal to a concrete value.
    pub fn bind_angle<S: Into<String>, E: Into<Expression>>(mut self, name: S, value: E) -> Self {
        self.bound.insert(name.into(), BoundValue::Angle(value.into()));
        self
    }

    /// Declare a formal as a free parameter of the calibration body.
    pub fn free_parameter<S: Into<String>>(mut self, name: S) -> Self {
        self.free.push(name.into());
        self
    }

    /// Validate coverage against the target signature and produce the
    /// calibration identifier.
    fn into_identifier(self, target: &GateSignature) -> Result<CalibrationIdentifier, BuildError> {
        let gate = target.name.clone();

        if let Some(duplicate) = self
            .bound
            .keys()
            .chain(self.free.iter())
            .duplicates()
            .next()
        {
            return Err(BuildError::DuplicateCalibrationArgument {
                gate,
                argument: duplicate.clone(),
            });
        }

        for name in self.bound.keys().chain(self.free.iter()) {
            if !target.argument_names().any(|formal| formal == name) {
                return Err(BuildError::UnknownCalibrationArgument {
                    gate,
                    argument: name.clone(),
                });
            }
        }

        let mut parameters = Vec::new();
        let mut qubits = Vec::new();
        for argument in &target.arguments {
            let bound = self.bound.get(&argument.name);
            let free = self.free.contains(&argument.name);
            match (argument.kind, bound, free) {
                (GateArgumentKind::Qubit, Some(BoundValue::Qubit(qubit)), false) => {
                    if !matches!(qubit, Qubit::Physical(_)) {
                        return Err(BuildError::CalibrationArgumentType {
                            gate,
                            argument: argument.name.clone(),
                            expected: "physical qubit",
                        });
                    }
                    qubits.push(qubit.clone());
                }
                (GateArgumentKind::Qubit, None, true) => {
                    qubits.push(Qubit::Variable(argument.name.clone()));
                }
                (GateArgumentKind::Angle, Some(BoundValue::Angle(value)), false) => {
                    parameters.push(value.clone());
                }
                (GateArgumentKind::Angle, None, true) => {
                    parameters.push(Expression::Variable(argument.name.clone()));
                }
                (kind, Some(_), false) => {
                    return Err(BuildError::CalibrationArgumentType {
                        gate,
                        argument: argument.name.clone(),
                        expected: match kind {
                            GateArgumentKind::Qubit => "physical qubit",
                            GateArgumentKind::Angle => "value",
                        },
                    });
                }
                (_, None, false) => {
                    return Err(BuildError::UnboundCalibrationArgument {
                        gate,
                        argument: argument.name.clone(),
                    });
                }
                (_, Some(_), true) => {
                    return Err(BuildError::DuplicateCalibrationArgument {
                        gate,
                        argument: argument.name.clone(),
                    });
                }
            }
        }

        Ok(CalibrationIdentifier::new(gate, parameters, qubits))
    }
}

enum FrameKind {
    Context(BuildMode),
    Block,
}

/// One entry of the dispatcher's stack: a mode context (entered per decorated
/// function) or a block (a loop or conditional body within the same context).
struct Frame {
    kind: FrameKind,
    instructions: Vec<Instruction>,
    /// Classical names introduced by this frame: parameters, the loop variable,
    /// measurement result registers.
    locals: IndexSet<String>,
    /// Formal qubit names, populated on GATE and CALIBRATION context frames.
    qubit_formals: IndexSet<String>,
}

impl Frame {
    fn context(mode: BuildMode, locals: IndexSet<String>, qubit_formals: IndexSet<String>) -> Self {
        Self {
            kind: FrameKind::Context(mode),
            instructions: Vec::new(),
            locals,
            qubit_formals,
        }
    }

    fn block() -> Self {
        Self {
            kind: FrameKind::Block,
            instructions: Vec::new(),
            locals: IndexSet::new(),
            qubit_formals: IndexSet::new(),
        }
    }
}

/// The stack-based dispatcher driving one build pass.
///
/// All registries are owned here, per build: two independent passes never
/// observe each other's registrations.
pub struct ProgramBuilder {
    register: QubitRegister,
    inputs: IndexMap<String, ScalarType>,
    subroutines: IndexMap<String, SubroutineDefinition>,
    gate_definitions: IndexMap<String, GateDefinition>,
    frames: Vec<Frame>,
    bit_counter: usize,
}

impl ProgramBuilder {
    fn new(mode: BuildMode, locals: IndexSet<String>, qubit_formals: IndexSet<String>) -> Self {
        Self {
            register: QubitRegister::new(),
            inputs: IndexMap::new(),
            subroutines: IndexMap::new(),
            gate_definitions: IndexMap::new(),
            frames: vec![Frame::context(mode, locals, qubit_formals)],
            bit_counter: 0,
        }
    }

    fn into_program(mut self) -> Program {
        let frame = self.pop_frame();
        let mut program = Program::new();
        program.register_size = self.register.size();
        program.inputs = self.inputs;
        program.subroutines = self.subroutines;
        program.gate_definitions = self.gate_definitions;
        program.add_instructions(frame.instructions);
        program
    }

    fn pop_frame(&mut self) -> Frame {
        self.frames.pop().expect("a frame is always active")
    }

    /// The mode of the innermost context frame.
    pub fn mode(&self) -> BuildMode {
        match self.frames[self.context_frame_index()].kind {
            FrameKind::Context(mode) => mode,
            FrameKind::Block => unreachable!("index points at a context frame"),
        }
    }

    fn context_frame_index(&self) -> usize {
        self.frames
            .iter()
            .rposition(|frame| matches!(frame.kind, FrameKind::Context(_)))
            .expect("a context frame is always active")
    }

    fn at_root(&self) -> bool {
        self.frames.len() == 1 && self.mode() == BuildMode::Main
    }

    /// Append a node to the active graph, enforcing the mode's legality rules.
    fn push(&mut self, instruction: Instruction) -> Result<(), BuildError> {
        let mode = self.mode();
        let allowed = match mode {
            BuildMode::Main | BuildMode::Subroutine => true,
            BuildMode::Gate => InstructionRole::from(&instruction) == InstructionRole::Unitary,
            BuildMode::Calibration => {
                InstructionRole::from(&instruction) == InstructionRole::PulseControl
            }
        };
        if !allowed {
            return Err(BuildError::ModeViolation {
                instruction: instruction.kind_name().to_string(),
                mode,
            });
        }

        let frame = self.frames.last_mut().expect("a frame is always active");
        frame.instructions.push(instruction);
        Ok(())
    }

    fn classical_in_scope(&self, name: &str) -> bool {
        if self.inputs.contains_key(name) {
            return true;
        }
        for frame in self.frames.iter().rev() {
            if frame.locals.contains(name) {
                return true;
            }
            if matches!(frame.kind, FrameKind::Context(_)) {
                break;
            }
        }
        false
    }

    fn check_expression(&self, expression: &Expression) -> Result<(), BuildError> {
        for name in expression.variables() {
            if !self.classical_in_scope(name) {
                return Err(BuildError::UndefinedVariable {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Resolve one qubit reference against the current scope.
    fn resolve_qubit(&self, qubit: &Qubit) -> Result<(), BuildError> {
        let mode = self.mode();
        match qubit {
            Qubit::Virtual(index) => match mode {
                BuildMode::Main | BuildMode::Subroutine => {
                    self.register.resolve(*index)?;
                    Ok(())
                }
                _ => Err(QubitScopeError::RegisterAccessNotAllowed { mode }.into()),
            },
            Qubit::Indexed(expression) => match mode {
                BuildMode::Main | BuildMode::Subroutine => {
                    if !self.register.is_declared() {
                        return Err(QubitScopeError::NoRegisterDeclared.into());
                    }
                    for name in expression.variables() {
                        if !self.classical_in_scope(name) {
                            return Err(QubitScopeError::UndefinedIndex {
                                name: name.to_string(),
                            }
                            .into());
                        }
                    }
                    if let Some(index) = expression.as_number() {
                        self.register.resolve(index as u64)?;
                    }
                    Ok(())
                }
                _ => Err(QubitScopeError::RegisterAccessNotAllowed { mode }.into()),
            },
            Qubit::Variable(name) => {
                let frame = &self.frames[self.context_frame_index()];
                match mode {
                    BuildMode::Gate | BuildMode::Calibration
                        if frame.qubit_formals.contains(name) =>
                    {
                        Ok(())
                    }
                    _ => Err(QubitScopeError::UndefinedFormal {
                        name: name.to_string(),
                    }
                    .into()),
                }
            }
            Qubit::Physical(index) => match mode {
                BuildMode::Gate => Err(QubitScopeError::PhysicalNotAllowed { index: *index }.into()),
                _ => Ok(()),
            },
        }
    }

    /// Declare the global qubit register. Must happen at the top level of a
    /// MAIN build, at most once, before any register qubit is referenced.
    pub fn declare_qubits(&mut self, size: u64) -> Result<(), BuildError> {
        if !self.at_root() {
            return Err(BuildError::DefinitionInsideTrace {
                name: "the qubit register".to_string(),
            });
        }
        self.register.declare(size)?;
        Ok(())
    }

    /// Declare a program input parameter and return an expression referencing it.
    pub fn free_parameter<S>(&mut self, name: S, data_type: ScalarType) -> Result<Expression, BuildError>
    where
        S: Into<String>,
    {
        let name = name.into();
        if !self.at_root() {
            return Err(BuildError::DefinitionInsideTrace { name });
        }
        validate_user_identifier(&name)?;
        self.inputs.insert(name.clone(), data_type);
        Ok(Expression::Variable(name))
    }

    /// Apply a built-in gate.
    pub fn gate(
        &mut self,
        name: &str,
        parameters: Vec<Expression>,
        qubits: Vec<Qubit>,
    ) -> Result<(), BuildError> {
        for qubit in &qubits {
            self.resolve_qubit(qubit)?;
        }
        for parameter in &parameters {
            self.check_expression(parameter)?;
        }
        let gate = Gate::new(name, parameters, qubits)?;
        self.push(Instruction::Gate(gate))
    }

    /// Apply a registered gate definition by name.
    pub fn call_gate(
        &mut self,
        name: &str,
        parameters: Vec<Expression>,
        qubits: Vec<Qubit>,
    ) -> Result<(), BuildError> {
        let (expected_parameters, expected_qubits) = match self.gate_definitions.get(name) {
            Some(definition) => (definition.parameters.len(), definition.qubit_parameters.len()),
            None => {
                return Err(BuildError::UndefinedCallee {
                    name: name.to_string(),
                })
            }
        };
        if parameters.len() != expected_parameters {
            return Err(BuildError::ArgumentCount {
                name: name.to_string(),
                expected: expected_parameters,
                actual: parameters.len(),
            });
        }
        if qubits.len() != expected_qubits {
            return Err(BuildError::ArgumentCount {
                name: name.to_string(),
                expected: expected_qubits,
                actual: qubits.len(),
            });
        }

        for qubit in &qubits {
            self.resolve_qubit(qubit)?;
        }
        for parameter in &parameters {
            self.check_expression(parameter)?;
        }
        self.push(Instruction::GateCall(GateCall {
            name: name.to_string(),
            parameters,
            qubits,
        }))
    }

    /// Call a registered subroutine by name.
    pub fn call_subroutine(
        &mut self,
        name: &str,
        arguments: Vec<Expression>,
    ) -> Result<(), BuildError> {
        let expected = match self.subroutines.get(name) {
            Some(definition) => definition.parameters.len(),
            None => {
                return Err(BuildError::UndefinedCallee {
                    name: name.to_string(),
                })
            }
        };
        if arguments.len() != expected {
            return Err(BuildError::ArgumentCount {
                name: name.to_string(),
                expected,
                actual: arguments.len(),
            });
        }
        for argument in &arguments {
            self.check_expression(argument)?;
        }
        self.push(Instruction::SubroutineCall(SubroutineCall {
            name: name.to_string(),
            arguments,
        }))
    }

    /// Measure the given qubits into a fresh bit register, returning an
    /// expression referencing the result.
    pub fn measure(&mut self, qubits: Vec<Qubit>) -> Result<Expression, BuildError> {
        for qubit in &qubits {
            self.resolve_qubit(qubit)?;
        }
        self.push_measurement(MeasurementSource::Qubits(qubits))
    }

    /// Measure the entire declared qubit register in a single statement.
    pub fn measure_register(&mut self) -> Result<Expression, BuildError> {
        let size = self
            .register
            .size()
            .ok_or(QubitScopeError::NoRegisterDeclared)?;
        self.push_measurement(MeasurementSource::EntireRegister { size })
    }

    fn push_measurement(&mut self, source: MeasurementSource) -> Result<Expression, BuildError> {
        let target = format!("{BIT_PREFIX}{}__", self.bit_counter);
        self.push(Instruction::Measurement(Measurement {
            target: target.clone(),
            source,
        }))?;
        self.bit_counter += 1;
        let frame = self.frames.last_mut().expect("a frame is always active");
        frame.locals.insert(target.clone());
        Ok(Expression::Variable(target))
    }

    /// Record a pulse operation. Legal only in CALIBRATION mode.
    ///
    /// Arguments are not resolved against the classical scope: besides the
    /// calibration's free parameters they may name device-defined symbols such
    /// as waveforms, which this crate treats as opaque.
    pub fn pulse(
        &mut self,
        kind: PulseKind,
        frame: &str,
        arguments: Vec<Expression>,
    ) -> Result<(), BuildError> {
        validate_identifier(frame)?;
        self.push(Instruction::Pulse(Pulse::new(kind, frame, arguments)))
    }

    /// Trace a structured loop over an inclusive range.
    ///
    /// The body runs exactly once, against the loop variable symbolically; the
    /// captured node covers every iteration of the emitted program. Bounds must
    /// be build-time values or expressions over declared symbols.
    pub fn for_range<F>(
        &mut self,
        variable: &str,
        start: Expression,
        end: Expression,
        body: F,
    ) -> Result<(), BuildError>
    where
        F: FnOnce(&mut ProgramBuilder) -> Result<(), BuildError>,
    {
        self.check_control_flow("loop")?;
        validate_user_identifier(variable)?;
        self.check_expression(&start)?;
        self.check_expression(&end)?;

        let mut frame = Frame::block();
        frame.locals.insert(variable.to_string());
        self.frames.push(frame);
        body(self)?;
        let frame = self.pop_frame();

        self.push(Instruction::Loop(Loop {
            variable: variable.to_string(),
            start,
            end,
            body: frame.instructions,
        }))
    }

    /// Trace a structured conditional with no else branch.
    pub fn if_then<F>(&mut self, condition: Expression, then_body: F) -> Result<(), BuildError>
    where
        F: FnOnce(&mut ProgramBuilder) -> Result<(), BuildError>,
    {
        self.trace_conditional(
            condition,
            then_body,
            None::<fn(&mut ProgramBuilder) -> Result<(), BuildError>>,
        )
    }

    /// Trace a structured conditional with both branches.
    pub fn if_then_else<F, G>(
        &mut self,
        condition: Expression,
        then_body: F,
        else_body: G,
    ) -> Result<(), BuildError>
    where
        F: FnOnce(&mut ProgramBuilder) -> Result<(), BuildError>,
        G: FnOnce(&mut ProgramBuilder) -> Result<(), BuildError>,
    {
        self.trace_conditional(condition, then_body, Some(else_body))
    }

    fn trace_conditional<F, G>(
        &mut self,
        condition: Expression,
        then_body: F,
        else_body: Option<G>,
    ) -> Result<(), BuildError>
    where
        F: FnOnce(&mut ProgramBuilder) -> Result<(), BuildError>,
        G: FnOnce(&mut ProgramBuilder) -> Result<(), BuildError>,
    {
        self.check_control_flow("conditional")?;
        self.check_expression(&condition)?;

        self.frames.push(Frame::block());
        then_body(self)?;
        let then_frame = self.pop_frame();

        let else_instructions = match else_body {
            Some(else_body) => {
                self.frames.push(Frame::block());
                else_body(self)?;
                Some(self.pop_frame().instructions)
            }
            None => None,
        };

        self.push(Instruction::Conditional(Conditional {
            condition,
            then_body: then_frame.instructions,
            else_body: else_instructions,
        }))
    }

    fn check_control_flow(&self, construct: &str) -> Result<(), BuildError> {
        let mode = self.mode();
        match mode {
            BuildMode::Main | BuildMode::Subroutine => Ok(()),
            _ => Err(BuildError::ModeViolation {
                instruction: construct.to_string(),
                mode,
            }),
        }
    }

    /// Register a subroutine: trace its body once in SUBROUTINE mode and store
    /// the definition for later calls.
    ///
    /// Every parameter must carry a declared type; registering the same name
    /// again replaces the definition for subsequent calls.
    pub fn subroutine<F>(
        &mut self,
        name: &str,
        parameters: Vec<ParameterHint>,
        body: F,
    ) -> Result<(), BuildError>
    where
        F: FnOnce(&mut ProgramBuilder) -> Result<(), BuildError>,
    {
        if !self.at_root() {
            return Err(BuildError::DefinitionInsideTrace {
                name: name.to_string(),
            });
        }
        validate_user_identifier(name)?;

        let parameters = parameters
            .into_iter()
            .map(|hint| match hint.data_type {
                Some(data_type) => Ok(Parameter::new(hint.name, data_type)),
                None => Err(BuildError::UntypedParameter {
                    subroutine: name.to_string(),
                    parameter: hint.name,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(duplicate) = parameters
            .iter()
            .map(|parameter| parameter.name.as_str())
            .duplicates()
            .next()
        {
            return Err(BuildError::DuplicateParameter {
                name: duplicate.to_string(),
            });
        }

        let locals = parameters
            .iter()
            .map(|parameter| parameter.name.clone())
            .collect();
        self.frames
            .push(Frame::context(BuildMode::Subroutine, locals, IndexSet::new()));
        body(self)?;
        let frame = self.pop_frame();

        self.subroutines.insert(
            name.to_string(),
            SubroutineDefinition::new(name.to_string(), parameters, frame.instructions),
        );
        Ok(())
    }

    /// Register a gate definition: trace its body once in GATE mode, which
    /// admits only gate applications, and store the definition for later calls.
    pub fn gate_definition<F>(
        &mut self,
        name: &str,
        parameters: Vec<String>,
        qubit_parameters: Vec<String>,
        body: F,
    ) -> Result<(), BuildError>
    where
        F: FnOnce(&mut ProgramBuilder) -> Result<(), BuildError>,
    {
        if !self.at_root() {
            return Err(BuildError::DefinitionInsideTrace {
                name: name.to_string(),
            });
        }
        validate_user_identifier(name)?;
        if qubit_parameters.is_empty() {
            return Err(GateError::NoQubitParameters {
                name: name.to_string(),
            }
            .into());
        }
        if let Some(duplicate) = parameters
            .iter()
            .chain(qubit_parameters.iter())
            .duplicates()
            .next()
        {
            return Err(BuildError::DuplicateParameter {
                name: duplicate.clone(),
            });
        }

        let locals = parameters.iter().cloned().collect();
        let qubit_formals = qubit_parameters.iter().cloned().collect();
        self.frames
            .push(Frame::context(BuildMode::Gate, locals, qubit_formals));
        body(self)?;
        let frame = self.pop_frame();

        let definition =
            GateDefinition::new(name, parameters, qubit_parameters, frame.instructions)?;
        self.gate_definitions.insert(name.to_string(), definition);
        Ok(())
    }
}
