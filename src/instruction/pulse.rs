use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::qasm::{Qasm, SerializationError};

/// A pulse-level operation, legal only inside calibration bodies.
///
/// The frame is an opaque identifier; waveform synthesis and hardware frame
/// semantics live outside this crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    pub kind: PulseKind,
    pub frame: String,
    pub arguments: Vec<Expression>,
}

impl Pulse {
    pub fn new<S: Into<String>>(kind: PulseKind, frame: S, arguments: Vec<Expression>) -> Self {
        Self {
            kind,
            frame: frame.into(),
            arguments,
        }
    }

    /// Replace free parameter references in the arguments, used when a
    /// calibration body is inlined at a matching call site.
    pub(crate) fn substitute_variables(
        &mut self,
        substitutions: &std::collections::HashMap<String, Expression>,
    ) {
        for argument in &mut self.arguments {
            argument.substitute_variables(substitutions);
        }
    }
}

/// Every supported pulse operation kind, lowered as `kind(frame, arguments...)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PulseKind {
    Barrier,
    Capture,
    Delay,
    Play,
    SetFrequency,
    SetPhase,
    SetScale,
    ShiftFrequency,
    ShiftPhase,
}

impl Qasm for Pulse {
    fn write(&self, writer: &mut impl std::fmt::Write) -> Result<(), SerializationError> {
        write!(writer, "{}({}", self.kind, self.frame)?;
        for argument in &self.arguments {
            write!(writer, ", ")?;
            argument.write(writer)?;
        }
        write!(writer, ");").map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        Pulse::new(PulseKind::Play, "q0_drive", vec![Expression::variable("wf_rx")]),
        "play(q0_drive, wf_rx);"
    )]
    #[case(
        Pulse::new(
            PulseKind::ShiftPhase,
            "q0_drive",
            vec![Expression::variable("theta") / Expression::Number(2.0)],
        ),
        "shift_phase(q0_drive, theta/2);"
    )]
    #[case(Pulse::new(PulseKind::Barrier, "q0_drive", vec![]), "barrier(q0_drive);")]
    fn test_write(#[case] pulse: Pulse, #[case] expected: &str) {
        assert_eq!(pulse.to_qasm().unwrap(), expected);
    }
}
