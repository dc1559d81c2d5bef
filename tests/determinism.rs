//! Property tests for export determinism over generated programs.

use proptest::prelude::*;

use qasm_builder::expression::Expression;
use qasm_builder::instruction::{
    Conditional, Gate, Instruction, Loop, Measurement, MeasurementSource, Qubit,
};
use qasm_builder::program::Program;
use qasm_builder::qasm::Qasm;

fn arb_qubit() -> impl Strategy<Value = Qubit> {
    prop_oneof![
        (0u64..5).prop_map(Qubit::Virtual),
        (0u64..5).prop_map(Qubit::Physical),
    ]
}

fn arb_parameter() -> impl Strategy<Value = Expression> {
    prop_oneof![
        // Dyadic values survive text and JSON round trips exactly
        (0u32..1000).prop_map(|n| Expression::Number(f64::from(n) / 8.0)),
        Just(Expression::PiConstant),
    ]
}

fn arb_gate() -> impl Strategy<Value = Instruction> {
    (
        prop_oneof![Just("h"), Just("x"), Just("cnot"), Just("rx")],
        proptest::collection::vec(arb_parameter(), 0..2),
        proptest::collection::vec(arb_qubit(), 1..3),
    )
        .prop_map(|(name, parameters, qubits)| {
            Instruction::Gate(Gate {
                name: name.to_string(),
                parameters,
                qubits,
            })
        })
}

fn arb_instruction() -> impl Strategy<Value = Instruction> {
    arb_gate().prop_recursive(2, 12, 4, |inner| {
        prop_oneof![
            inner.clone(),
            (
                0u64..4,
                proptest::collection::vec(inner.clone(), 1..3),
            )
                .prop_map(|(end, body)| {
                    Instruction::Loop(Loop {
                        variable: "i".to_string(),
                        start: Expression::Number(0.0),
                        end: Expression::Number(end as f64),
                        body,
                    })
                }),
            (
                proptest::collection::vec(inner.clone(), 1..3),
                proptest::option::of(proptest::collection::vec(inner, 1..3)),
            )
                .prop_map(|(then_body, else_body)| {
                    Instruction::Conditional(Conditional {
                        condition: Expression::variable("__bit_0__"),
                        then_body,
                        else_body,
                    })
                }),
        ]
    })
}

fn arb_program() -> impl Strategy<Value = Program> {
    (
        proptest::collection::vec(arb_instruction(), 0..6),
        proptest::bool::ANY,
    )
        .prop_map(|(instructions, measure)| {
            let mut program = Program::new();
            program.register_size = Some(5);
            program.add_instructions(instructions);
            if measure {
                program.add_instruction(Instruction::Measurement(Measurement {
                    target: "__bit_0__".to_string(),
                    source: MeasurementSource::EntireRegister { size: 5 },
                }));
            }
            program
        })
}

proptest! {
    #[test]
    fn exporting_twice_yields_identical_text(program in arb_program()) {
        prop_assert_eq!(program.to_qasm().unwrap(), program.to_qasm().unwrap());
    }

    #[test]
    fn cloned_programs_export_identically(program in arb_program()) {
        let cloned = program.clone();
        prop_assert_eq!(program.to_qasm().unwrap(), cloned.to_qasm().unwrap());
    }

    #[test]
    fn programs_survive_a_serde_round_trip(program in arb_program()) {
        let encoded = serde_json::to_string(&program).unwrap();
        let decoded: Program = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(&decoded, &program);
        prop_assert_eq!(decoded.to_qasm().unwrap(), program.to_qasm().unwrap());
    }
}
