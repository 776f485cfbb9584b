use crate::{Instruction, Opcode, Program, Reg, Value};

/// Write a [`Program`] by hand, one instruction per call.
#[derive(Debug)]
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    pub fn new(num_inputs: usize) -> ProgramBuilder {
        ProgramBuilder {
            program: Program {
                num_inputs,
                instructions: vec![],
            },
        }
    }

    pub fn finish(self) -> Program {
        self.program
    }

    /// The register holding input `i`.
    pub fn input(&self, i: usize) -> Reg {
        assert!(i < self.program.num_inputs, "no input {}", i);
        Reg(i)
    }

    fn next_reg(&self) -> Reg {
        Reg(self.program.len())
    }

    fn push(&mut self, opcode: Opcode, x: Reg, y: Reg, imm: Value) -> Reg {
        let result = self.next_reg();
        self.program.instructions.push(Instruction {
            result,
            opcode,
            x,
            y,
            imm,
        });
        result
    }

    /// Append a register-register instruction.
    pub fn binary(&mut self, opcode: Opcode, a: Reg, b: Reg) -> Reg {
        self.push(opcode, a, b, 0)
    }

    pub fn set(&mut self, imm: Value) -> Reg {
        self.push(Opcode::Set, Reg(0), Reg(0), imm)
    }

    pub fn add(&mut self, a: Reg, b: Reg) -> Reg {
        self.binary(Opcode::Add, a, b)
    }

    pub fn sub(&mut self, a: Reg, b: Reg) -> Reg {
        self.binary(Opcode::Sub, a, b)
    }

    pub fn mul(&mut self, a: Reg, b: Reg) -> Reg {
        self.binary(Opcode::Mul, a, b)
    }

    pub fn xor(&mut self, a: Reg, b: Reg) -> Reg {
        self.binary(Opcode::Xor, a, b)
    }

    pub fn and(&mut self, a: Reg, b: Reg) -> Reg {
        self.binary(Opcode::And, a, b)
    }

    pub fn or(&mut self, a: Reg, b: Reg) -> Reg {
        self.binary(Opcode::Or, a, b)
    }

    pub fn xor_not(&mut self, a: Reg, b: Reg) -> Reg {
        self.binary(Opcode::XorNot, a, b)
    }

    pub fn and_not(&mut self, a: Reg, b: Reg) -> Reg {
        self.binary(Opcode::AndNot, a, b)
    }

    pub fn or_not(&mut self, a: Reg, b: Reg) -> Reg {
        self.binary(Opcode::OrNot, a, b)
    }

    pub fn shl(&mut self, a: Reg, amount: Value) -> Reg {
        self.push(Opcode::Shl, a, Reg(0), amount)
    }

    pub fn shr(&mut self, a: Reg, amount: Value) -> Reg {
        self.push(Opcode::Shr, a, Reg(0), amount)
    }

    pub fn gt(&mut self, a: Reg, b: Reg) -> Reg {
        self.binary(Opcode::Gt, a, b)
    }
}
