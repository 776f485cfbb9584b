use crate::{Error, Reg, Value};
use std::fmt;

/// A set of instruction kinds, used to scope extra constraints to the opcodes
/// that need them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Kind(u32);

impl Kind {
    pub const NONE: Kind = Kind(0);

    /// The immediate is a shift amount and must lie in `1..=31`.
    pub const SHIFT: Kind = Kind(1 << 0);

    pub fn intersects(self, mask: Kind) -> bool {
        self.0 & mask.0 != 0
    }
}

impl std::ops::BitOr for Kind {
    type Output = Kind;

    fn bitor(self, rhs: Kind) -> Kind {
        Kind(self.0 | rhs.0)
    }
}

/// How a decoded step is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// `rI = op rJ rK`
    RegReg,
    /// `rI = op rJ 0xIMM`
    RegImm,
    /// `rI = op 0xIMM`
    Imm,
}

/// Every operation the synthesizer knows about. The discriminant is the
/// opcode's global id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Load an immediate. A single immediate-introducing opcode keeps the
    // search space much smaller than immediate variants of every operator.
    Set,

    // Arithmetic.
    Add,
    Sub,
    Mul,

    // Bitwise.
    Xor,
    And,
    Or,
    XorNot,
    AndNot,
    OrNot,

    // Shifts by an immediate.
    Shl,
    Shr,

    // Signed comparison producing all ones or zero.
    Gt,
}

impl Opcode {
    pub const ALL: [Opcode; 13] = [
        Opcode::Set,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Xor,
        Opcode::And,
        Opcode::Or,
        Opcode::XorNot,
        Opcode::AndNot,
        Opcode::OrNot,
        Opcode::Shl,
        Opcode::Shr,
        Opcode::Gt,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn from_id(id: usize) -> Option<Opcode> {
        Self::ALL.get(id).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Set => "set",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Xor => "xor",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::XorNot => "xor_not",
            Opcode::AndNot => "and_not",
            Opcode::OrNot => "or_not",
            Opcode::Shl => "shl",
            Opcode::Shr => "shr",
            Opcode::Gt => "gt",
        }
    }

    pub fn from_name(name: &str) -> Result<Opcode, Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == name)
            .ok_or_else(|| Error::UnknownOpcode(name.to_string()))
    }

    pub fn kind(self) -> Kind {
        match self {
            Opcode::Shl | Opcode::Shr => Kind::SHIFT,
            _ => Kind::NONE,
        }
    }

    /// All global opcodes whose kind intersects `mask`.
    pub fn for_kind_mask(mask: Kind) -> impl Iterator<Item = Opcode> {
        Self::ALL
            .iter()
            .copied()
            .filter(move |op| op.kind().intersects(mask))
    }

    pub fn layout(self) -> Layout {
        match self {
            Opcode::Set => Layout::Imm,
            Opcode::Shl | Opcode::Shr => Layout::RegImm,
            _ => Layout::RegReg,
        }
    }

    /// How many register operands this opcode reads.
    pub fn operand_arity(self) -> usize {
        match self.layout() {
            Layout::Imm => 0,
            Layout::RegImm => 1,
            Layout::RegReg => 2,
        }
    }

    /// Render one decoded step.
    pub fn fmt_step(
        self,
        f: &mut fmt::Formatter,
        dest: Reg,
        x: Reg,
        y: Reg,
        imm: Value,
    ) -> fmt::Result {
        match self.layout() {
            Layout::RegReg => write!(f, "{} = {} {} {}", dest, self, x, y),
            Layout::RegImm => write!(f, "{} = {} {} {:#x}", dest, self, x, imm as u32),
            Layout::Imm => write!(f, "{} = {} {:#x}", dest, self, imm as u32),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
