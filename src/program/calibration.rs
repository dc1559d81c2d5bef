use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::instruction::{CalibrationDefinition, CalibrationSignature, Instruction, Qubit};

/// A collection of pulse calibrations with utility methods.
///
/// During binding, calibrations are matched to gate calls using their
/// [`CalibrationSignature`]; only one calibration can exist per signature, so
/// re-registering a signature replaces the previous definition. Insertion order
/// is maintained so that the same set always lowers identically.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CalibrationSet {
    // The amount of calibrations in a program tends to be small enough that a
    // Vec outperforms a typical set, and it preserves insertion order.
    data: Vec<CalibrationDefinition>,
}

impl CalibrationSet {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns an iterator of references to the values in the set.
    pub fn iter(&self) -> std::slice::Iter<'_, CalibrationDefinition> {
        self.data.iter()
    }

    /// Adds a calibration to the set, replacing and returning an existing value
    /// with the same signature, if it exists.
    pub fn replace_signature(
        &mut self,
        value: CalibrationDefinition,
    ) -> Option<CalibrationDefinition> {
        let signature = value.signature();
        if let Some(index) = self
            .data
            .iter()
            .position(|element| element.has_signature(&signature))
        {
            let replaced = std::mem::replace(&mut self.data[index], value);
            Some(replaced)
        } else {
            self.data.push(value);
            None
        }
    }

    /// Return the calibration which the given gate application matches, if any.
    ///
    /// Of multiple matches, the one binding the most concrete qubits wins; among
    /// equally specific matches the most recently registered one is used.
    pub fn get_match_for_gate(
        &self,
        name: &str,
        parameters: &[Expression],
        qubits: &[Qubit],
    ) -> Option<&CalibrationDefinition> {
        self.data
            .iter()
            .filter(|calibration| calibration.identifier.matches(name, parameters, qubits))
            .max_by_key(|calibration| calibration.identifier.fixed_qubit_count())
    }

    /// Return the pulse instructions which replace the given gate application,
    /// with the call site's concrete parameter values substituted for the
    /// calibration's free parameters. `None` when no calibration matches.
    pub fn expand(
        &self,
        name: &str,
        parameters: &[Expression],
        qubits: &[Qubit],
    ) -> Option<Vec<Instruction>> {
        let calibration = self.get_match_for_gate(name, parameters, qubits)?;

        // Free parameters in the body take the concrete expressions used by the
        // call site, so `defcal rx(angle[32] theta)` applied to `rx(pi)` sees
        // `theta` replaced by `pi` throughout.
        let substitutions: HashMap<String, Expression> = calibration
            .identifier
            .parameters
            .iter()
            .zip(parameters)
            .filter_map(|(formal, concrete)| match formal {
                Expression::Variable(name) => Some((name.clone(), concrete.clone())),
                _ => None,
            })
            .collect();

        Some(
            calibration
                .body
                .iter()
                .cloned()
                .map(|instruction| match instruction {
                    Instruction::Pulse(mut pulse) => {
                        pulse.substitute_variables(&substitutions);
                        Instruction::Pulse(pulse)
                    }
                    other => other,
                })
                .collect(),
        )
    }
}

impl Extend<CalibrationDefinition> for CalibrationSet {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = CalibrationDefinition>,
    {
        for value in iter {
            self.replace_signature(value);
        }
    }
}

impl IntoIterator for CalibrationSet {
    type IntoIter = std::vec::IntoIter<Self::Item>;
    type Item = CalibrationDefinition;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl From<Vec<CalibrationDefinition>> for CalibrationSet {
    fn from(data: Vec<CalibrationDefinition>) -> Self {
        let mut set = Self::new();
        for element in data {
            set.replace_signature(element);
        }
        set
    }
}

// Calibrations are global: their order in a program makes no semantic
// difference, so two sets are equal when they contain the same definitions.
impl PartialEq for CalibrationSet {
    fn eq(&self, other: &Self) -> bool {
        self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .all(|element| other.data.iter().any(|candidate| candidate == element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{CalibrationIdentifier, Pulse, PulseKind};

    fn shift_phase(argument: Expression) -> Instruction {
        Instruction::Pulse(Pulse::new(PulseKind::ShiftPhase, "q0_drive", vec![argument]))
    }

    fn rx_calibration(parameter: Expression) -> CalibrationDefinition {
        CalibrationDefinition::new(
            CalibrationIdentifier::new(
                "rx".to_string(),
                vec![parameter],
                vec![Qubit::Physical(0)],
            ),
            vec![shift_phase(Expression::variable("theta"))],
        )
    }

    #[test]
    fn test_replace_same_signature() {
        let mut set = CalibrationSet::new();
        set.replace_signature(rx_calibration(Expression::variable("theta")));
        let replaced = set.replace_signature(rx_calibration(Expression::variable("theta")));
        assert_eq!(set.len(), 1);
        assert!(replaced.is_some());
    }

    #[test]
    fn test_expand_substitutes_free_parameters() {
        let set = CalibrationSet::from(vec![rx_calibration(Expression::variable("theta"))]);
        let expanded = set
            .expand("rx", &[Expression::PiConstant], &[Qubit::Physical(0)])
            .unwrap();
        assert_eq!(expanded, vec![shift_phase(Expression::PiConstant)]);
    }

    #[test]
    fn test_no_match_for_other_qubit() {
        let set = CalibrationSet::from(vec![rx_calibration(Expression::variable("theta"))]);
        assert!(set
            .expand("rx", &[Expression::PiConstant], &[Qubit::Physical(1)])
            .is_none());
    }

    #[test]
    fn test_most_specific_match_wins() {
        let any_qubit = CalibrationDefinition::new(
            CalibrationIdentifier::new(
                "x".to_string(),
                vec![],
                vec![Qubit::variable("target")],
            ),
            vec![shift_phase(Expression::Number(0.25))],
        );
        let fixed_qubit = CalibrationDefinition::new(
            CalibrationIdentifier::new("x".to_string(), vec![], vec![Qubit::Physical(3)]),
            vec![shift_phase(Expression::Number(0.5))],
        );

        let set = CalibrationSet::from(vec![any_qubit, fixed_qubit]);
        let matched = set
            .get_match_for_gate("x", &[], &[Qubit::Physical(3)])
            .unwrap();
        assert_eq!(matched.identifier.qubits, vec![Qubit::Physical(3)]);
    }
}
