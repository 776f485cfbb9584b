//! Functions the synthesizer can be asked to reproduce.

use crate::{Error, Value};
use std::fmt;

/// A pure function of `arity()` inputs to one output.
pub trait Target {
    fn arity(&self) -> usize;

    fn evaluate(&self, inputs: &[Value]) -> Value;

    /// Reject a target that cannot be evaluated meaningfully, before any
    /// search starts.
    fn verify(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// A [`Target`] backed by a plain function.
#[derive(Clone, Copy)]
pub struct FnTarget<F> {
    name: &'static str,
    arity: usize,
    f: F,
}

impl<F> FnTarget<F>
where
    F: Fn(&[Value]) -> Value,
{
    pub fn new(name: &'static str, arity: usize, f: F) -> Self {
        FnTarget { name, arity, f }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<F> fmt::Debug for FnTarget<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FnTarget")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl<F> Target for FnTarget<F>
where
    F: Fn(&[Value]) -> Value,
{
    fn arity(&self) -> usize {
        self.arity
    }

    fn evaluate(&self, inputs: &[Value]) -> Value {
        (self.f)(inputs)
    }
}

type Builtin = FnTarget<fn(&[Value]) -> Value>;

fn builtin(name: &'static str, arity: usize, f: fn(&[Value]) -> Value) -> Builtin {
    FnTarget::new(name, arity, f)
}

/// `x` for non-negative inputs, `-x` otherwise (wrapping at `MIN`).
pub fn abs() -> Builtin {
    builtin("abs", 1, |x| x[0].wrapping_abs())
}

/// `-x`, wrapping at `MIN`.
pub fn negate() -> Builtin {
    builtin("negate", 1, |x| x[0].wrapping_neg())
}

pub fn identity() -> Builtin {
    builtin("identity", 1, |x| x[0])
}

/// Always zero.
pub fn zero() -> Builtin {
    builtin("zero", 1, |_| 0)
}

/// All ones for negative inputs, zero otherwise.
pub fn sign_mask() -> Builtin {
    builtin("sign_mask", 1, |x| if x[0] < 0 { -1 } else { 0 })
}

/// `x` for non-negative inputs, `1 - x` otherwise.
pub fn abs_plus_one() -> Builtin {
    builtin("abs_plus_one", 1, |x| {
        if x[0] >= 0 {
            x[0]
        } else {
            1i32.wrapping_sub(x[0])
        }
    })
}

/// The larger of two signed inputs.
pub fn max() -> Builtin {
    builtin("max", 2, |x| x[0].max(x[1]))
}

pub const BUILTIN_NAMES: &[&str] = &[
    "abs",
    "negate",
    "identity",
    "zero",
    "sign_mask",
    "abs_plus_one",
    "max",
];

/// Look up a built-in target by name.
pub fn by_name(name: &str) -> Result<Builtin, Error> {
    Ok(match name {
        "abs" => abs(),
        "negate" => negate(),
        "identity" => identity(),
        "zero" => zero(),
        "sign_mask" => sign_mask(),
        "abs_plus_one" => abs_plus_one(),
        "max" => max(),
        _ => return Err(Error::UnknownTarget(name.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abs_wraps_at_min() {
        let t = abs();
        assert_eq!(t.evaluate(&[-3]), 3);
        assert_eq!(t.evaluate(&[3]), 3);
        assert_eq!(t.evaluate(&[Value::MIN]), Value::MIN);
    }

    #[test]
    fn builtins_resolve_by_name() {
        for name in BUILTIN_NAMES {
            let t = by_name(name).unwrap();
            assert_eq!(t.name(), *name);
        }
        assert_eq!(by_name("max").unwrap().arity(), 2);
        assert!(matches!(by_name("popcount"), Err(Error::UnknownTarget(_))));
    }

    #[test]
    fn closures_are_targets() {
        let t = FnTarget::new("double", 1, |x: &[Value]| x[0].wrapping_mul(2));
        assert_eq!(t.evaluate(&[21]), 42);
        assert_eq!(format!("{:?}", t), "FnTarget { name: \"double\", arity: 1 }");
    }
}
