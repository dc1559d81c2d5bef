use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::instruction::{write_statement_block, Instruction};
use crate::qasm::{Qasm, ToQasmResult};

/// A structured loop over an inclusive integer range.
///
/// The body graph is owned by the node and captured once at build time; the
/// range bounds may be symbolic, so the loop is never unrolled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    pub variable: String,
    pub start: Expression,
    pub end: Expression,
    pub body: Vec<Instruction>,
}

impl Qasm for Loop {
    fn write(&self, f: &mut impl std::fmt::Write) -> ToQasmResult<()> {
        write!(f, "for int {} in [", self.variable)?;
        self.start.write(f)?;
        write!(f, ":")?;
        self.end.write(f)?;
        write!(f, "] {{")?;
        write_statement_block(f, &self.body)?;
        write!(f, "}}").map_err(Into::into)
    }
}

/// A structured conditional with an optional else branch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub condition: Expression,
    pub then_body: Vec<Instruction>,
    pub else_body: Option<Vec<Instruction>>,
}

impl Qasm for Conditional {
    fn write(&self, f: &mut impl std::fmt::Write) -> ToQasmResult<()> {
        write!(f, "if (")?;
        self.condition.write(f)?;
        write!(f, ") {{")?;
        write_statement_block(f, &self.then_body)?;
        write!(f, "}}")?;
        if let Some(else_body) = &self.else_body {
            write!(f, " else {{")?;
            write_statement_block(f, else_body)?;
            write!(f, "}}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::InfixOperator;
    use crate::instruction::{Gate, Qubit};
    use insta::assert_snapshot;

    fn x_on(index: u64) -> Instruction {
        Instruction::Gate(Gate {
            name: "x".to_string(),
            parameters: vec![],
            qubits: vec![Qubit::Virtual(index)],
        })
    }

    #[test]
    fn test_loop_display() {
        let traced = Loop {
            variable: "i".to_string(),
            start: Expression::Number(0.0),
            end: Expression::Number(3.0),
            body: vec![Instruction::Gate(Gate {
                name: "cnot".to_string(),
                parameters: vec![],
                qubits: vec![
                    Qubit::Indexed(Expression::variable("i")),
                    Qubit::Indexed(Expression::variable("i") + Expression::Number(1.0)),
                ],
            })],
        };

        assert_snapshot!(traced.to_qasm().unwrap(), @r###"
        for int i in [0:3] {
            cnot __qubits__[i], __qubits__[i+1];
        }
        "###);
    }

    #[test]
    fn test_conditional_display() {
        let conditional = Conditional {
            condition: Expression::Infix(crate::expression::InfixExpression::new(
                Expression::variable("__bit_0__"),
                InfixOperator::Equal,
                Expression::Number(1.0),
            )),
            then_body: vec![x_on(1)],
            else_body: Some(vec![x_on(2)]),
        };

        assert_snapshot!(conditional.to_qasm().unwrap(), @r###"
        if (__bit_0__==1) {
            x __qubits__[1];
        } else {
            x __qubits__[2];
        }
        "###);
    }

    #[test]
    fn test_conditional_without_else() {
        let conditional = Conditional {
            condition: Expression::variable("__bit_0__"),
            then_body: vec![x_on(0)],
            else_body: None,
        };

        assert_snapshot!(conditional.to_qasm().unwrap(), @r###"
        if (__bit_0__) {
            x __qubits__[0];
        }
        "###);
    }
}
