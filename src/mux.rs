use z3::ast::{Ast, Int};

/// Select `case(index)` for a symbolic `index` in `0..count`.
///
/// Builds `ite(index == 0, case(0), ite(index == 1, case(1), ... fallback))`.
/// The fallback is what the expression evaluates to when `index` matches none
/// of the cases; callers range-constrain `index` so it is never reached.
pub(crate) fn select<'a, T, F>(
    context: &'a z3::Context,
    index: &Int<'a>,
    count: usize,
    fallback: T,
    mut case: F,
) -> T
where
    T: Ast<'a>,
    F: FnMut(usize) -> T,
{
    (0..count).rev().fold(fallback, |rest, i| {
        index
            ._eq(&Int::from_u64(context, i as u64))
            .ite(&case(i), &rest)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{bit_vec_from_value, zero};

    fn pick(context: &z3::Context, index: u64) -> i64 {
        let index = Int::from_u64(context, index);
        let values = [10, 20, 30];
        select(context, &index, values.len(), zero(context), |i| {
            bit_vec_from_value(context, values[i])
        })
        .simplify()
        .as_i64()
        .unwrap()
    }

    #[test]
    fn selects_matching_case() {
        let context = z3::Context::new(&z3::Config::new());
        assert_eq!(pick(&context, 0), 10);
        assert_eq!(pick(&context, 1), 20);
        assert_eq!(pick(&context, 2), 30);
    }

    #[test]
    fn falls_back_when_nothing_matches() {
        let context = z3::Context::new(&z3::Config::new());
        assert_eq!(pick(&context, 7), 0);
    }

    #[test]
    fn empty_select_is_the_fallback() {
        let context = z3::Context::new(&z3::Config::new());
        let index = Int::new_const(&context, "index");
        let picked = select(&context, &index, 0, zero(&context), |_| unreachable!());
        assert_eq!(picked.simplify().as_i64(), Some(0));
    }
}
