//! Encoding "a program of this length computes the target" for z3, and
//! decoding the solver's model back into a [`Program`].

use crate::component::{bit_vec_from_value, zero};
use crate::mux::select;
use crate::{
    Error, Instruction, IsaSubset, Kind, Opcode, Operands, Program, Reg, Target, Value, VALUE_BITS,
};
use rand::Rng;
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};
use z3::ast::{Ast, Int, BV as BitVec};

/// Result of one satisfiability check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Sat,
    Unsat,
    /// The solver gave up; carries its reason (timeout, resource limit, ...).
    Unknown(String),
}

/// The decision variables of one slot, shared by every chain.
#[derive(Debug)]
struct SlotVars<'a> {
    opcode: Int<'a>,
    x: Int<'a>,
    y: Int<'a>,
    imm: BitVec<'a>,
}

/// Variables and solver for one length attempt.
///
/// Every chain has its own register variables, one per slot, but all chains
/// share the per-slot opcode, operand, and immediate choices; that sharing is
/// what forces a single program to fit every example.
pub struct Encoder<'a, 's> {
    context: &'a z3::Context,
    solver: z3::Solver<'a>,
    subset: &'s IsaSubset,
    num_inputs: usize,
    length: usize,
    slots: Vec<SlotVars<'a>>,
    chains: Vec<Vec<BitVec<'a>>>,
}

impl fmt::Debug for Encoder<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("subset", &self.subset)
            .field("num_inputs", &self.num_inputs)
            .field("num_chains", &self.chains.len())
            .field("length", &self.length)
            .finish()
    }
}

impl<'a, 's> Encoder<'a, 's> {
    /// Allocate the chain registers and slot variables for a program of
    /// `length` slots, the first `num_inputs` of which are inputs.
    pub fn new(
        context: &'a z3::Context,
        subset: &'s IsaSubset,
        num_inputs: usize,
        num_chains: usize,
        length: usize,
    ) -> Result<Self, Error> {
        if subset.is_empty() {
            return Err(Error::EmptySubset);
        }
        if num_chains == 0 {
            return Err(Error::NoChains);
        }
        if length <= num_inputs {
            return Err(Error::LengthTooShort { length, num_inputs });
        }

        let chains: Vec<Vec<BitVec>> = (0..num_chains)
            .map(|c| {
                (0..length)
                    .map(|slot| BitVec::new_const(context, format!("r{}_c{}", slot, c), VALUE_BITS))
                    .collect()
            })
            .collect();

        let slots: Vec<SlotVars> = (0..length)
            .map(|slot| SlotVars {
                opcode: Int::new_const(context, format!("opcode_s{}", slot)),
                x: Int::new_const(context, format!("x_s{}", slot)),
                y: Int::new_const(context, format!("y_s{}", slot)),
                imm: BitVec::new_const(context, format!("imm_s{}", slot), VALUE_BITS),
            })
            .collect();

        Ok(Encoder {
            context,
            solver: z3::Solver::new(context),
            subset,
            num_inputs,
            length,
            slots,
            chains,
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_chains(&self) -> usize {
        self.chains.len()
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Reset the solver and assert the structural constraints: opcode in
    /// range, operands strictly earlier than their slot, and a valid shift
    /// amount whenever a shift is chosen.
    pub fn add_constraints(&mut self) {
        self.solver.reset();

        let context = self.context;
        let zero_index = Int::from_u64(context, 0);
        let num_opcodes = Int::from_u64(context, self.subset.len() as u64);
        let min_shift = bit_vec_from_value(context, 1);
        let max_shift = bit_vec_from_value(context, VALUE_BITS as Value - 1);
        let shift_ops = self.subset.op_codes_for_kind_mask(Kind::SHIFT);

        for slot in self.num_inputs..self.length {
            let vars = &self.slots[slot];
            let bound = Int::from_u64(context, slot as u64);

            self.solver.assert(&vars.opcode.ge(&zero_index));
            self.solver.assert(&vars.opcode.lt(&num_opcodes));

            self.solver.assert(&vars.x.ge(&zero_index));
            self.solver.assert(&vars.x.lt(&bound));

            self.solver.assert(&vars.y.ge(&zero_index));
            self.solver.assert(&vars.y.lt(&bound));

            for &local in &shift_ops {
                let is_shift = vars.opcode._eq(&Int::from_u64(context, local as u64));
                self.solver.assert(&is_shift.implies(&vars.imm.bvsge(&min_shift)));
                self.solver.assert(&is_shift.implies(&vars.imm.bvsle(&max_shift)));
            }
        }
    }

    /// Sample fresh inputs for every chain, pin them and the target's output,
    /// and tie every non-input register to the multiplexed result of its
    /// slot's instruction.
    pub fn add_chain_constraints<T, R>(&mut self, target: &T, rng: &mut R) -> Result<(), Error>
    where
        T: Target + ?Sized,
        R: Rng + ?Sized,
    {
        if target.arity() != self.num_inputs {
            return Err(Error::InputCountMismatch {
                expected: self.num_inputs,
                actual: target.arity(),
            });
        }

        let context = self.context;
        let opcodes: Vec<Opcode> = self.subset.iter().map(|(_, op)| op).collect();
        // `set` reads no register, so its right operand is tied to the
        // immediate instead of a register choice.
        let set_ids = self.subset.local_ids_of(Opcode::Set);

        for (c, chain) in self.chains.iter().enumerate() {
            let inputs: Vec<Value> = (0..self.num_inputs).map(|_| rng.gen()).collect();
            let expected = target.evaluate(&inputs);
            debug!(chain = c, ?inputs, expected, "pinned chain");

            for (reg, &input) in chain.iter().zip(&inputs) {
                self.solver.assert(&reg._eq(&bit_vec_from_value(context, input)));
            }
            self.solver
                .assert(&chain[self.length - 1]._eq(&bit_vec_from_value(context, expected)));

            for slot in self.num_inputs..self.length {
                let vars = &self.slots[slot];

                let x = self.select_operand(chain, &vars.x, slot);
                let y = set_ids
                    .iter()
                    .fold(self.select_operand(chain, &vars.y, slot), |y, &local| {
                        vars.opcode
                            ._eq(&Int::from_u64(context, local as u64))
                            .ite(&vars.imm, &y)
                    });
                let ops = Operands::new(x, y, vars.imm.clone());

                let result = select(context, &vars.opcode, opcodes.len(), zero(context), |local| {
                    opcodes[local].simulate(context, &ops)
                });
                self.solver.assert(&chain[slot]._eq(&result));
            }
        }

        Ok(())
    }

    /// The register of `chain` whose index `index` picks, among slots below
    /// `slot`.
    fn select_operand(&self, chain: &[BitVec<'a>], index: &Int<'a>, slot: usize) -> BitVec<'a> {
        select(self.context, index, slot, zero(self.context), |i| {
            chain[i].clone()
        })
    }

    /// Bound every subsequent `check`. Call after `add_constraints`, which
    /// resets the solver.
    pub fn set_timeout(&mut self, timeout: Duration) {
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let mut params = z3::Params::new(self.context);
        params.set_u32("timeout", millis);
        self.solver.set_params(&params);
    }

    /// Run the solver. Blocks until it answers.
    pub fn check(&self) -> Verdict {
        match self.solver.check() {
            z3::SatResult::Sat => Verdict::Sat,
            z3::SatResult::Unsat => Verdict::Unsat,
            z3::SatResult::Unknown => Verdict::Unknown(
                self.solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "unknown".to_string()),
            ),
        }
    }

    /// The model of the last satisfiable `check`.
    pub fn model(&self) -> Option<z3::Model<'a>> {
        self.solver.get_model()
    }

    /// Read one slot's instruction out of `model`.
    ///
    /// The immediate is left unconstrained for opcodes that ignore it, in
    /// which case the model may not give it a value; it then decodes as 0.
    pub fn decode_slot(&self, model: &z3::Model<'a>, slot: usize) -> Result<Instruction, Error> {
        let vars = self
            .slots
            .get(slot)
            .filter(|_| slot >= self.num_inputs)
            .ok_or(Error::MissingAssignment { slot, var: "slot" })?;

        let index = |var: &Int<'a>, name: &'static str| {
            model
                .eval(var, true)
                .and_then(|v| v.as_u64())
                .map(|v| v as usize)
                .ok_or(Error::MissingAssignment { slot, var: name })
        };

        let local = index(&vars.opcode, "opcode")?;
        let opcode = self.subset.get(local).ok_or(Error::OpcodeOutOfRange {
            local,
            len: self.subset.len(),
        })?;
        let x = Reg(index(&vars.x, "x")?);
        let y = Reg(index(&vars.y, "y")?);
        let imm = model
            .eval(&vars.imm, false)
            .and_then(|v| v.as_u64())
            .map_or(0, |v| v as u32 as Value);

        trace!(slot, %opcode, ?x, ?y, imm, "decoded slot");
        Ok(Instruction {
            result: Reg(slot),
            opcode,
            x,
            y,
            imm,
        })
    }

    /// Decode every non-input slot.
    pub fn decode(&self, model: &z3::Model<'a>) -> Result<Program, Error> {
        let instructions = (self.num_inputs..self.length)
            .map(|slot| self.decode_slot(model, slot))
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Program {
            num_inputs: self.num_inputs,
            instructions,
        })
    }
}
