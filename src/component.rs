//! Semantics of each opcode, both as a bit-vector expression for the solver
//! and as a concrete 32-bit computation.
//!
//! Both forms are driven by the same [`Operands`] shape, one arm per opcode in
//! each `match`, so the two definitions sit next to each other and can be
//! checked against one another.

use crate::{Opcode, Value, VALUE_BITS};
use z3::ast::BV as BitVec;

/// The inputs to one step: two register values and an immediate.
///
/// `T` is a bit-vector expression when simulating and a [`Value`] when
/// evaluating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operands<T> {
    pub x: T,
    pub y: T,
    pub imm: T,
}

impl<T> Operands<T> {
    pub fn new(x: T, y: T, imm: T) -> Self {
        Operands { x, y, imm }
    }
}

pub(crate) fn bit_vec_from_value(context: &z3::Context, val: Value) -> BitVec {
    BitVec::from_i64(context, val as i64, VALUE_BITS)
}

pub(crate) fn zero(context: &z3::Context) -> BitVec {
    bit_vec_from_value(context, 0)
}

fn all_ones(context: &z3::Context) -> BitVec {
    bit_vec_from_value(context, -1)
}

impl Opcode {
    /// Build the expression for this opcode's result.
    pub fn simulate<'a>(self, context: &'a z3::Context, ops: &Operands<BitVec<'a>>) -> BitVec<'a> {
        match self {
            Opcode::Set => ops.imm.clone(),

            Opcode::Add => ops.x.bvadd(&ops.y),
            Opcode::Sub => ops.x.bvsub(&ops.y),
            Opcode::Mul => ops.x.bvmul(&ops.y),

            Opcode::Xor => ops.x.bvxor(&ops.y),
            Opcode::And => ops.x.bvand(&ops.y),
            Opcode::Or => ops.x.bvor(&ops.y),

            Opcode::XorNot => ops.x.bvxor(&ops.y.bvnot()),
            Opcode::AndNot => ops.x.bvand(&ops.y.bvnot()),
            Opcode::OrNot => ops.x.bvor(&ops.y.bvnot()),

            Opcode::Shl => ops.x.bvshl(&ops.imm),
            Opcode::Shr => ops.x.bvashr(&ops.imm),

            Opcode::Gt => ops
                .x
                .bvsgt(&ops.y)
                .ite(&all_ones(context), &zero(context)),
        }
    }

    /// Compute this opcode's result on concrete values.
    ///
    /// Shift amounts outside `0..32` follow the bit-vector rules (everything
    /// shifted out) rather than wrapping, so this agrees with
    /// [`Opcode::simulate`] for every possible immediate.
    pub fn evaluate(self, ops: &Operands<Value>) -> Value {
        match self {
            Opcode::Set => ops.imm,

            Opcode::Add => ops.x.wrapping_add(ops.y),
            Opcode::Sub => ops.x.wrapping_sub(ops.y),
            Opcode::Mul => ops.x.wrapping_mul(ops.y),

            Opcode::Xor => ops.x ^ ops.y,
            Opcode::And => ops.x & ops.y,
            Opcode::Or => ops.x | ops.y,

            Opcode::XorNot => ops.x ^ !ops.y,
            Opcode::AndNot => ops.x & !ops.y,
            Opcode::OrNot => ops.x | !ops.y,

            Opcode::Shl => {
                let amount = ops.imm as u32;
                if amount >= VALUE_BITS {
                    0
                } else {
                    ops.x << amount
                }
            }
            Opcode::Shr => ops.x >> (ops.imm as u32).min(VALUE_BITS - 1),

            Opcode::Gt => {
                if ops.x > ops.y {
                    -1
                } else {
                    0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use z3::ast::Ast;

    fn context() -> z3::Context {
        z3::Context::new(&z3::Config::new())
    }

    fn simulate_concrete(context: &z3::Context, op: Opcode, ops: &Operands<Value>) -> Value {
        let sym = Operands::new(
            bit_vec_from_value(context, ops.x),
            bit_vec_from_value(context, ops.y),
            bit_vec_from_value(context, ops.imm),
        );
        op.simulate(context, &sym)
            .simplify()
            .as_u64()
            .expect("constant operands should simplify to a numeral") as u32 as Value
    }

    #[test]
    fn evaluate_examples() {
        let ops = Operands::new(-7, 3, 2);
        assert_eq!(Opcode::Set.evaluate(&ops), 2);
        assert_eq!(Opcode::Add.evaluate(&ops), -4);
        assert_eq!(Opcode::Sub.evaluate(&ops), -10);
        assert_eq!(Opcode::Mul.evaluate(&ops), -21);
        assert_eq!(Opcode::AndNot.evaluate(&ops), -7 & !3);
        assert_eq!(Opcode::Shl.evaluate(&ops), -28);
        assert_eq!(Opcode::Shr.evaluate(&ops), -2);
        assert_eq!(Opcode::Gt.evaluate(&ops), 0);
        assert_eq!(Opcode::Gt.evaluate(&Operands::new(3, -7, 0)), -1);
    }

    #[test]
    fn arithmetic_wraps() {
        let ops = Operands::new(Value::MAX, 1, 0);
        assert_eq!(Opcode::Add.evaluate(&ops), Value::MIN);
        assert_eq!(Opcode::Sub.evaluate(&Operands::new(Value::MIN, 1, 0)), Value::MAX);
    }

    #[test]
    fn oversized_shifts_match_bit_vector_rules() {
        assert_eq!(Opcode::Shl.evaluate(&Operands::new(1, 0, 32)), 0);
        assert_eq!(Opcode::Shr.evaluate(&Operands::new(-8, 0, 40)), -1);
        assert_eq!(Opcode::Shr.evaluate(&Operands::new(8, 0, -1)), 0);
    }

    #[test]
    fn gt_is_signed_in_both_forms() {
        let context = context();
        let ops = Operands::new(1, -1, 0);
        assert_eq!(Opcode::Gt.evaluate(&ops), -1);
        assert_eq!(simulate_concrete(&context, Opcode::Gt, &ops), -1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn simulate_agrees_with_evaluate(x in any::<i32>(), y in any::<i32>(), imm in any::<i32>()) {
            let context = context();
            let ops = Operands::new(x, y, imm);
            for op in Opcode::ALL {
                prop_assert_eq!(
                    simulate_concrete(&context, op, &ops),
                    op.evaluate(&ops),
                    "opcode {}", op
                );
            }
        }

        #[test]
        fn valid_shift_amounts_agree(x in any::<i32>(), imm in 1i32..=31) {
            let context = context();
            let ops = Operands::new(x, 0, imm);
            for op in [Opcode::Shl, Opcode::Shr] {
                prop_assert_eq!(simulate_concrete(&context, op, &ops), op.evaluate(&ops));
            }
        }
    }
}
