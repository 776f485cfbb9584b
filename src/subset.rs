use crate::{Error, Kind, Opcode};
use tracing::warn;

/// The opcode alphabet for one synthesis run.
///
/// Local ids (`0..len()`) index into this list and are what the solver
/// chooses between; each maps back to a global [`Opcode`]. The same opcode may
/// appear more than once, giving it several local ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IsaSubset {
    opcodes: Vec<Opcode>,
}

impl IsaSubset {
    pub fn new() -> Self {
        IsaSubset::default()
    }

    /// Build a subset from opcode names, in order.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, Error> {
        let mut subset = IsaSubset::new();
        for name in names {
            subset.add_opcode(Opcode::from_name(name.as_ref())?);
        }
        Ok(subset)
    }

    /// Every opcode in the table, in global id order.
    pub fn full() -> Self {
        IsaSubset {
            opcodes: Opcode::ALL.to_vec(),
        }
    }

    /// Append `opcode` and return its local id.
    pub fn add_opcode(&mut self, opcode: Opcode) -> usize {
        if self.opcodes.contains(&opcode) {
            warn!(opcode = opcode.name(), "opcode added to subset more than once");
        }
        self.opcodes.push(opcode);
        self.opcodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.opcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }

    pub fn get(&self, local: usize) -> Option<Opcode> {
        self.opcodes.get(local).copied()
    }

    pub fn op_name(&self, local: usize) -> Option<&'static str> {
        self.get(local).map(Opcode::name)
    }

    /// The first local id whose opcode is called `name`.
    pub fn op_code_for_name(&self, name: &str) -> Option<usize> {
        self.opcodes.iter().position(|op| op.name() == name)
    }

    /// Every local id mapped to `opcode`.
    pub fn local_ids_of(&self, opcode: Opcode) -> Vec<usize> {
        self.iter()
            .filter(|&(_, op)| op == opcode)
            .map(|(local, _)| local)
            .collect()
    }

    /// Every local id whose opcode's kind intersects `mask`.
    pub fn op_codes_for_kind_mask(&self, mask: Kind) -> Vec<usize> {
        self.iter()
            .filter(|(_, op)| op.kind().intersects(mask))
            .map(|(local, _)| local)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Opcode)> + '_ {
        self.opcodes.iter().copied().enumerate()
    }
}
