use crate::component::{bit_vec_from_value, zero};
use crate::{Error, Opcode, Operands, Reg, Value};
use std::fmt::{self, Display};
use z3::ast::BV as BitVec;

/// One decoded slot: `result = opcode x y imm`.
///
/// Register operands the opcode does not read (both for `set`, `y` for the
/// shifts) and the immediate of opcodes that ignore it carry whatever the
/// model happened to assign and are never looked at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub result: Reg,
    pub opcode: Opcode,
    pub x: Reg,
    pub y: Reg,
    pub imm: Value,
}

impl Instruction {
    /// The registers this instruction actually reads.
    pub fn operands(&self, mut f: impl FnMut(Reg)) {
        match self.opcode.operand_arity() {
            0 => {}
            1 => f(self.x),
            _ => {
                f(self.x);
                f(self.y);
            }
        }
    }

    /// Resolve the register operands through `state`, which holds the value of
    /// every register below `self.result`. Operands the opcode does not read
    /// resolve to `unused`.
    pub(crate) fn resolve<T: Clone>(&self, state: &[T], unused: T) -> Result<Operands<T>, Error> {
        let arity = self.opcode.operand_arity();
        let fetch = |reg: Reg, used: bool| -> Result<T, Error> {
            if !used {
                return Ok(unused.clone());
            }
            if reg >= self.result {
                return Err(Error::OperandOutOfRange {
                    result: self.result,
                    operand: reg,
                });
            }
            state.get(reg.0).cloned().ok_or(Error::OperandOutOfRange {
                result: self.result,
                operand: reg,
            })
        };
        let x = fetch(self.x, arity >= 1)?;
        let y = fetch(self.y, arity >= 2)?;
        Ok(Operands::new(x, y, unused))
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.opcode.fmt_step(f, self.result, self.x, self.y, self.imm)
    }
}

/// A straight-line program: `num_inputs` input registers followed by one
/// instruction per remaining slot. The last slot holds the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    pub num_inputs: usize,
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Total number of slots, inputs included.
    pub fn len(&self) -> usize {
        self.num_inputs + self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every instruction sits in its own slot, in order, and only reads
    /// registers defined before it.
    pub fn is_well_formed(&self) -> bool {
        self.check_well_formed().is_ok()
    }

    /// Like [`Program::is_well_formed`], reporting the first offending
    /// instruction.
    pub fn check_well_formed(&self) -> Result<(), Error> {
        for (i, inst) in self.instructions.iter().enumerate() {
            let expected = Reg(self.num_inputs + i);
            if inst.result != expected {
                return Err(Error::MisplacedInstruction {
                    expected,
                    actual: inst.result,
                });
            }
            let mut bad = None;
            inst.operands(|reg| {
                if reg >= inst.result && bad.is_none() {
                    bad = Some(reg);
                }
            });
            if let Some(operand) = bad {
                return Err(Error::OperandOutOfRange {
                    result: inst.result,
                    operand,
                });
            }
        }
        Ok(())
    }

    /// Replay the program over symbolic inputs, returning the expression for
    /// the output register.
    pub fn simulate<'a>(
        &self,
        context: &'a z3::Context,
        inputs: &[BitVec<'a>],
    ) -> Result<BitVec<'a>, Error> {
        if inputs.len() != self.num_inputs {
            return Err(Error::InputCountMismatch {
                expected: self.num_inputs,
                actual: inputs.len(),
            });
        }

        let mut vars: Vec<_> = inputs.to_vec();
        for inst in &self.instructions {
            let mut ops = inst.resolve(&vars, zero(context))?;
            ops.imm = bit_vec_from_value(context, inst.imm);
            vars.push(inst.opcode.simulate(context, &ops));
        }

        vars.pop().ok_or(Error::LengthTooShort {
            length: self.len(),
            num_inputs: self.num_inputs,
        })
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for i in 0..self.num_inputs {
            writeln!(f, "{} = <input>", Reg(i))?;
        }
        for inst in &self.instructions {
            writeln!(f, "{}", inst)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProgramBuilder;

    fn abs_program() -> Program {
        let mut b = ProgramBuilder::new(1);
        let x = b.input(0);
        let sign = b.shr(x, 31);
        let flipped = b.xor(x, sign);
        let _ = b.sub(flipped, sign);
        b.finish()
    }

    #[test]
    fn built_programs_are_well_formed() {
        let p = abs_program();
        assert_eq!(p.len(), 4);
        assert!(p.is_well_formed());
    }

    #[test]
    fn forward_reference_is_not_well_formed() {
        let mut p = abs_program();
        p.instructions[1].y = Reg(3);
        assert!(!p.is_well_formed());
        assert!(matches!(
            p.check_well_formed(),
            Err(Error::OperandOutOfRange { result: Reg(2), operand: Reg(3) })
        ));

        let mut p = abs_program();
        p.instructions[2].result = Reg(7);
        assert!(matches!(
            p.check_well_formed(),
            Err(Error::MisplacedInstruction { expected: Reg(3), actual: Reg(7) })
        ));

        // `shr` never reads `y`, so a wild value there is harmless.
        let mut p = abs_program();
        p.instructions[0].y = Reg(99);
        assert!(p.is_well_formed());
    }

    #[test]
    fn operands_skip_unread_registers() {
        let inst = Instruction {
            result: Reg(2),
            opcode: Opcode::Set,
            x: Reg(7),
            y: Reg(8),
            imm: 5,
        };
        let mut read = vec![];
        inst.operands(|r| read.push(r));
        assert!(read.is_empty());
    }

    #[test]
    fn simulate_matches_evaluate_on_constants() {
        use z3::ast::Ast;

        let context = z3::Context::new(&z3::Config::new());
        let p = abs_program();
        for x in [0, 1, -1, 12345, -12345, Value::MAX, Value::MIN] {
            let out = p
                .simulate(&context, &[bit_vec_from_value(&context, x)])
                .unwrap()
                .simplify()
                .as_u64()
                .unwrap() as u32 as Value;
            assert_eq!(out, p.output(&[x]).unwrap());
        }
    }

    #[test]
    fn simulate_checks_input_count() {
        let context = z3::Context::new(&z3::Config::new());
        assert!(matches!(
            abs_program().simulate(&context, &[]),
            Err(Error::InputCountMismatch { expected: 1, actual: 0 })
        ));
    }
}
