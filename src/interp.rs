//! Concrete execution of decoded programs, and the randomized acceptance check
//! run after every successful solve.

use crate::{Error, Program, Target, Value};
use rand::Rng;
use std::fmt;

impl Program {
    /// Run the program, returning the value of every register in slot order.
    ///
    /// Operands are register references resolved through the values computed
    /// so far; registers an opcode does not read are ignored entirely.
    pub fn evaluate(&self, inputs: &[Value]) -> Result<Vec<Value>, Error> {
        if inputs.len() != self.num_inputs {
            return Err(Error::InputCountMismatch {
                expected: self.num_inputs,
                actual: inputs.len(),
            });
        }

        let mut state = Vec::with_capacity(self.len());
        state.extend_from_slice(inputs);
        for inst in &self.instructions {
            let mut ops = inst.resolve(&state, 0)?;
            ops.imm = inst.imm;
            state.push(inst.opcode.evaluate(&ops));
        }
        Ok(state)
    }

    /// The value of the last register.
    pub fn output(&self, inputs: &[Value]) -> Result<Value, Error> {
        self.evaluate(inputs)?
            .pop()
            .ok_or(Error::LengthTooShort {
                length: self.len(),
                num_inputs: self.num_inputs,
            })
    }
}

/// A program can stand in as the target for a shorter program.
impl Target for Program {
    fn arity(&self) -> usize {
        self.num_inputs
    }

    fn evaluate(&self, inputs: &[Value]) -> Value {
        // `verify` keeps malformed programs out of the search, so this never
        // falls back in practice.
        self.output(inputs).unwrap_or(0)
    }

    fn verify(&self) -> Result<(), Error> {
        self.check_well_formed()
    }
}

/// The first input on which a program disagreed with its target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub inputs: Vec<Value>,
    pub expected: Value,
    pub actual: Value,
}

/// Outcome of running a program against its target on random inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    pub passed: usize,
    pub trials: usize,
    pub first_mismatch: Option<Mismatch>,
}

impl Validation {
    pub fn all_passed(&self) -> bool {
        self.passed == self.trials
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} / {} passed", self.passed, self.trials)?;
        if let Some(m) = &self.first_mismatch {
            write!(
                f,
                " (first mismatch: inputs {:?}, expected {}, got {})",
                m.inputs, m.expected, m.actual
            )?;
        }
        Ok(())
    }
}

/// Compare `program` with `target` on `trials` fresh random inputs.
///
/// Each trial draws exactly `target.arity()` values from `rng`.
pub fn validate<T, R>(
    program: &Program,
    target: &T,
    trials: usize,
    rng: &mut R,
) -> Result<Validation, Error>
where
    T: Target + ?Sized,
    R: Rng + ?Sized,
{
    let mut passed = 0;
    let mut first_mismatch = None;
    let mut inputs = vec![0; target.arity()];

    for _ in 0..trials {
        inputs.iter_mut().for_each(|v| *v = rng.gen());
        let expected = target.evaluate(&inputs);
        let actual = program.output(&inputs)?;
        if expected == actual {
            passed += 1;
        } else if first_mismatch.is_none() {
            first_mismatch = Some(Mismatch {
                inputs: inputs.clone(),
                expected,
                actual,
            });
        }
    }

    Ok(Validation {
        passed,
        trials,
        first_mismatch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{target, Instruction, Opcode, ProgramBuilder, Reg};
    use rand::{rngs::SmallRng, SeedableRng};

    fn abs_program() -> Program {
        let mut b = ProgramBuilder::new(1);
        let x = b.input(0);
        let zero = b.set(0);
        let mask = b.gt(zero, x);
        let flipped = b.xor(x, mask);
        let _ = b.sub(flipped, mask);
        b.finish()
    }

    #[test]
    fn evaluate_returns_every_register() {
        let state = abs_program().evaluate(&[-5]).unwrap();
        assert_eq!(state, vec![-5, 0, -1, 4, 5]);
    }

    #[test]
    fn output_is_last_register() {
        let p = abs_program();
        assert_eq!(p.output(&[7]).unwrap(), 7);
        assert_eq!(p.output(&[-7]).unwrap(), 7);
        assert_eq!(p.output(&[Value::MIN]).unwrap(), Value::MIN);
    }

    #[test]
    fn set_ignores_its_register_operands() {
        let mut p = abs_program();
        let before = p.evaluate(&[-42]).unwrap();

        // Out of range, but `set` never reads them.
        p.instructions[0].x = Reg(1000);
        p.instructions[0].y = Reg(usize::MAX);
        assert_eq!(p.evaluate(&[-42]).unwrap(), before);
    }

    #[test]
    fn read_operand_out_of_range_is_an_error() {
        let p = Program {
            num_inputs: 1,
            instructions: vec![Instruction {
                result: Reg(1),
                opcode: Opcode::Add,
                x: Reg(0),
                y: Reg(1),
                imm: 0,
            }],
        };
        assert!(matches!(
            p.evaluate(&[3]),
            Err(Error::OperandOutOfRange { result: Reg(1), operand: Reg(1) })
        ));
    }

    #[test]
    fn wrong_input_count_is_an_error() {
        assert!(matches!(
            abs_program().evaluate(&[1, 2]),
            Err(Error::InputCountMismatch { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn validate_counts_passes() {
        let mut rng = SmallRng::seed_from_u64(1);
        let v = validate(&abs_program(), &target::abs(), 1000, &mut rng).unwrap();
        assert!(v.all_passed());
        assert_eq!(v.to_string(), "1000 / 1000 passed");
    }

    #[test]
    fn validate_reports_first_mismatch() {
        let mut rng = SmallRng::seed_from_u64(1);
        let v = validate(&abs_program(), &target::negate(), 100, &mut rng).unwrap();
        assert!(!v.all_passed());
        let m = v.first_mismatch.unwrap();
        assert_eq!(m.inputs.len(), 1);
        assert_eq!(m.expected, m.inputs[0].wrapping_neg());
    }

    #[test]
    fn program_as_target() {
        let p = abs_program();
        assert_eq!(Target::arity(&p), 1);
        assert_eq!(Target::evaluate(&p, &[-9]), 9);
        assert!(p.verify().is_ok());
    }

    #[test]
    fn malformed_program_fails_target_verification() {
        let mut b = ProgramBuilder::new(1);
        let x = b.input(0);
        let _ = b.binary(Opcode::Sub, x, Reg(5));
        assert!(matches!(
            b.finish().verify(),
            Err(Error::OperandOutOfRange { result: Reg(1), operand: Reg(5) })
        ));
    }
}
