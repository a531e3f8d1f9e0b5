//! Bitvector algebra over [`SymValue`]s.
//!
//! These are the operations instruction semantics are written in. Every
//! function validates operand widths, builds the node, and returns the
//! simplified result; literal operands never allocate an expression tree.
//!
//! Predicates are 1-bit values (1 = true). The plain comparison functions
//! ([`less`], [`greater`], ...) are signed, matching how the interpreter
//! compares machine words; [`compare`] reaches the unsigned variants.
//!
//! # Examples
//!
//! ```rust
//! use concolic_sym::symbolic::{algebra, SymValue};
//!
//! let a = SymValue::concrete(0xffu32, 8);
//! let b = SymValue::concrete(0x02u32, 8);
//! assert_eq!(algebra::add(&a, &b)?.as_u64(), Some(0x01));
//!
//! let x = SymValue::symbol("x", 8);
//! let y = algebra::sub(&algebra::add(&x, &b)?, &b)?;
//! assert_eq!(y, x);
//! # Ok::<(), concolic_sym::Error>(())
//! ```

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::{
    symbolic::{
        expr::BvExpr,
        ops::{BinaryOp, CmpOp, UnaryOp},
        simplify::{
            simplify_binary, simplify_compare, simplify_concat, simplify_extract,
            simplify_sign_ext, simplify_unary, simplify_zero_ext,
        },
        value::SymValue,
    },
    Error, Result,
};

fn same_width(x: &SymValue, y: &SymValue) -> Result<u32> {
    if x.width() == y.width() {
        Ok(x.width())
    } else {
        Err(Error::WidthMismatch {
            expected: x.width(),
            found: y.width(),
        })
    }
}

fn predicate_width(p: &SymValue) -> Result<()> {
    if p.width() == 1 {
        Ok(())
    } else {
        Err(Error::WidthMismatch {
            expected: 1,
            found: p.width(),
        })
    }
}

/// Applies a width-preserving binary operator.
///
/// # Arguments
///
/// * `op` - The operator.
/// * `x` - The left operand.
/// * `y` - The right operand, of the same width as `x`.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn binary(op: BinaryOp, x: &SymValue, y: &SymValue) -> Result<SymValue> {
    same_width(x, y)?;
    Ok(SymValue::from_simplified(simplify_binary(
        op,
        x.to_expr(),
        y.to_expr(),
    )))
}

/// Two's-complement addition, wrapping at the operand width.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn add(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::Add, x, y)
}

/// Two's-complement subtraction, wrapping at the operand width.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn sub(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::Sub, x, y)
}

/// Multiplication modulo `2^width`.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn mul(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::Mul, x, y)
}

/// Unsigned division; division by zero yields all ones.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn udiv(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::UDiv, x, y)
}

/// Unsigned remainder; remainder by zero yields the dividend.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn urem(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::URem, x, y)
}

/// Signed division, truncating toward zero.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn sdiv(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::SDiv, x, y)
}

/// Signed remainder, taking the sign of the dividend.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn srem(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::SRem, x, y)
}

/// Bitwise AND. On predicates this is logical conjunction.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn and(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::And, x, y)
}

/// Bitwise OR. On predicates this is logical disjunction.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn or(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::Or, x, y)
}

/// Bitwise XOR.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn xor(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::Xor, x, y)
}

/// Left shift; shifting by the width or more yields zero.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn shl(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::Shl, x, y)
}

/// Logical right shift.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn lshr(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::LShr, x, y)
}

/// Arithmetic right shift.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn ashr(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    binary(BinaryOp::AShr, x, y)
}

/// Applies an arithmetic operator given by its textual symbol.
///
/// Accepts `+` and `-` as well as every other [`BinaryOp`] symbol
/// (`*`, `/u`, `%u`, `/`, `%`, `&`, `|`, `^`, `<<`, `>>>`, `>>`).
///
/// # Errors
///
/// Returns [`Error::UnsupportedFeature`] for an unknown operator, or
/// [`Error::WidthMismatch`] if the operand widths differ.
pub fn arith(op: &str, x: &SymValue, y: &SymValue) -> Result<SymValue> {
    let op = BinaryOp::from_str(op)
        .map_err(|_| Error::UnsupportedFeature(format!("arithmetic operator `{op}`")))?;
    binary(op, x, y)
}

/// Compares two values, producing a predicate.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn compare(op: CmpOp, x: &SymValue, y: &SymValue) -> Result<SymValue> {
    same_width(x, y)?;
    Ok(SymValue::from_simplified(simplify_compare(
        op,
        x.to_expr(),
        y.to_expr(),
    )))
}

/// Compares two values using a textual operator.
///
/// Accepts `==`, `!=`, `<>`, `<`, `>`, `<=`, `>=` (signed) and the unsigned
/// forms `<u`, `>u`, `<=u`, `>=u`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFeature`] for an unknown operator, or
/// [`Error::WidthMismatch`] if the operand widths differ.
pub fn logic(op: &str, x: &SymValue, y: &SymValue) -> Result<SymValue> {
    let op = CmpOp::from_str(op)
        .map_err(|_| Error::UnsupportedFeature(format!("comparison operator `{op}`")))?;
    compare(op, x, y)
}

/// `x == y`.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn equal(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    compare(CmpOp::Eq, x, y)
}

/// `x != y`.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn not_equal(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    compare(CmpOp::Ne, x, y)
}

/// Signed `x < y`.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn less(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    compare(CmpOp::SLt, x, y)
}

/// Signed `x > y`.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn greater(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    compare(CmpOp::SGt, x, y)
}

/// Signed `x <= y`.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn less_equal(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    compare(CmpOp::SLe, x, y)
}

/// Signed `x >= y`.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the operand widths differ.
pub fn greater_equal(x: &SymValue, y: &SymValue) -> Result<SymValue> {
    compare(CmpOp::SGe, x, y)
}

/// Predicate testing whether `v` is negative as a signed value.
#[must_use]
pub fn is_negative(v: &SymValue) -> SymValue {
    let zero = BvExpr::zero(v.width());
    SymValue::from_simplified(simplify_compare(CmpOp::SLt, v.to_expr(), zero))
}

/// Predicate testing whether `v` is zero or positive as a signed value.
#[must_use]
pub fn is_non_negative(v: &SymValue) -> SymValue {
    let zero = BvExpr::zero(v.width());
    SymValue::from_simplified(simplify_compare(CmpOp::SGe, v.to_expr(), zero))
}

/// Bitwise complement `~v`.
#[must_use]
pub fn bit_not(v: &SymValue) -> SymValue {
    SymValue::from_simplified(simplify_unary(UnaryOp::Not, v.to_expr()))
}

/// Two's-complement negation `-v`.
#[must_use]
pub fn neg(v: &SymValue) -> SymValue {
    SymValue::from_simplified(simplify_unary(UnaryOp::Neg, v.to_expr()))
}

/// Logical negation of a predicate.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if `p` is not 1 bit wide.
pub fn bool_not(p: &SymValue) -> Result<SymValue> {
    predicate_width(p)?;
    Ok(bit_not(p))
}

/// XNOR-reduction of all bits, as a predicate.
///
/// Folds `r = ~(r ^ bit_i)` over the bits of `v` starting from bit 0, then
/// tests `r == 1`. This is the building block of parity-flag semantics.
#[must_use]
pub fn xnor_reduce(v: &SymValue) -> SymValue {
    let expr = v.to_expr();
    let mut acc = simplify_extract(0, 0, expr.clone());
    for i in 1..v.width() {
        let bit = simplify_extract(i, i, expr.clone());
        acc = simplify_unary(UnaryOp::Not, simplify_binary(BinaryOp::Xor, acc, bit));
    }
    SymValue::from_simplified(simplify_compare(CmpOp::Eq, acc, BvExpr::boolean(true)))
}

/// Returns bit `index` of `v` as a 1-bit value.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] if `index` is outside the value's width.
pub fn bit_at(v: &SymValue, index: u32) -> Result<SymValue> {
    extract(v, index, index)
}

/// Returns bits `high..=low` of `v` (inclusive, 0-based).
///
/// # Arguments
///
/// * `v` - The value to extract from.
/// * `high` - The upper bit index (inclusive).
/// * `low` - The lower bit index (inclusive).
///
/// # Returns
///
/// A value of width `high - low + 1`.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] if `high < low` or `high` is outside the
/// value's width.
pub fn extract(v: &SymValue, high: u32, low: u32) -> Result<SymValue> {
    let width = v.width();
    if high < low || high >= width {
        return Err(Error::InvalidRange { high, low, width });
    }
    Ok(SymValue::from_simplified(simplify_extract(
        high,
        low,
        v.to_expr(),
    )))
}

/// Extracts a byte range: bits `high*8-1 ..= low*8`.
///
/// `high` is the exclusive upper byte index and `low` the inclusive lower one,
/// so `extract_bytes(v, 2, 0)` is the low 16 bits.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] (in byte units) if `high <= low`, or (in bit
/// units) if the bit range exceeds the value's width.
pub fn extract_bytes(v: &SymValue, high: u32, low: u32) -> Result<SymValue> {
    let bits = high
        .checked_mul(8)
        .zip(low.checked_mul(8))
        .filter(|_| high > low);
    match bits {
        Some((high_bit, low_bit)) => extract(v, high_bit - 1, low_bit),
        None => Err(Error::InvalidRange {
            high,
            low,
            width: v.width(),
        }),
    }
}

/// Zero-extends `v` by `bits` bits.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] (`[bits:0]`) if the extended width does
/// not fit in a `u32`.
pub fn zero_extend(v: &SymValue, bits: u32) -> Result<SymValue> {
    extended_width(v, bits)?;
    Ok(SymValue::from_simplified(simplify_zero_ext(bits, v.to_expr())))
}

/// Sign-extends `v` by `bits` bits.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] (`[bits:0]`) if the extended width does
/// not fit in a `u32`.
pub fn sign_extend(v: &SymValue, bits: u32) -> Result<SymValue> {
    extended_width(v, bits)?;
    Ok(SymValue::from_simplified(simplify_sign_ext(bits, v.to_expr())))
}

fn extended_width(v: &SymValue, bits: u32) -> Result<u32> {
    v.width().checked_add(bits).ok_or(Error::InvalidRange {
        high: bits,
        low: 0,
        width: v.width(),
    })
}

/// Concatenates values, most-significant first.
///
/// # Errors
///
/// Returns [`Error::Empty`] if `values` is empty.
pub fn concat(values: &[SymValue]) -> Result<SymValue> {
    if values.is_empty() {
        return Err(Error::Empty);
    }
    let parts = values.iter().map(SymValue::to_expr).collect();
    Ok(SymValue::from_simplified(simplify_concat(parts)))
}

/// Keeps the low `width` bits of `v`.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] if `width` is zero or exceeds the value's
/// width.
pub fn truncate_to(v: &SymValue, width: u32) -> Result<SymValue> {
    if width == 0 {
        return Err(Error::InvalidRange {
            high: 0,
            low: 0,
            width: v.width(),
        });
    }
    extract(v, width - 1, 0)
}

fn half(v: &SymValue) -> Result<u32> {
    let width = v.width();
    if width % 2 == 0 {
        Ok(width / 2)
    } else {
        Err(Error::InvalidRange {
            high: width - 1,
            low: width / 2,
            width,
        })
    }
}

/// Returns the upper half of an even-width value.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] if the width is odd.
pub fn upper_half(v: &SymValue) -> Result<SymValue> {
    let half = half(v)?;
    extract(v, v.width() - 1, half)
}

/// Returns the lower half of an even-width value.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] if the width is odd.
pub fn lower_half(v: &SymValue) -> Result<SymValue> {
    let half = half(v)?;
    extract(v, half - 1, 0)
}

fn bit_is_set(v: &SymValue, index: u32) -> SymValue {
    let bit = simplify_extract(index, index, v.to_expr());
    SymValue::from_simplified(simplify_compare(CmpOp::Eq, bit, BvExpr::boolean(true)))
}

/// Predicate `msb(v) == 1` (the sign flag).
#[must_use]
pub fn most_significant_bit(v: &SymValue) -> SymValue {
    bit_is_set(v, v.width() - 1)
}

/// Predicate testing the bit just below the most significant one.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] if `v` is narrower than 2 bits.
pub fn second_most_significant_bit(v: &SymValue) -> Result<SymValue> {
    let width = v.width();
    if width < 2 {
        return Err(Error::InvalidRange {
            high: 0,
            low: 0,
            width,
        });
    }
    Ok(bit_is_set(v, width - 2))
}

/// Predicate `lsb(v) == 1`.
#[must_use]
pub fn least_significant_bit(v: &SymValue) -> SymValue {
    bit_is_set(v, 0)
}

/// Replaces every structural occurrence of `from` in `v` by `to` and
/// re-simplifies.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if `from` and `to` differ in width.
pub fn substitute(v: &SymValue, from: &SymValue, to: &SymValue) -> Result<SymValue> {
    same_width(from, to)?;
    match v {
        SymValue::Concrete { .. } => Ok(v.clone()),
        SymValue::Expression { expr, .. } => {
            let replaced = expr.substitute(&from.to_expr(), &to.to_expr());
            Ok(SymValue::from_expr(&replaced))
        }
    }
}

/// How [`combine`] extends an existing path predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Relation {
    /// `current | update`
    Or,
    /// `current & update`
    And,
    /// `update`, discarding the current predicate
    #[strum(serialize = "replace", serialize = "r")]
    Replace,
}

/// Extends a predicate (or any value) by another under `relation`.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the widths differ.
pub fn combine(relation: Relation, current: &SymValue, update: &SymValue) -> Result<SymValue> {
    match relation {
        Relation::Or => or(current, update),
        Relation::And => and(current, update),
        Relation::Replace => {
            same_width(current, update)?;
            Ok(update.clone())
        }
    }
}

/// Strict structural equality of two values.
///
/// True when the widths agree and either both are concrete with the same
/// value, or both are symbolic and simplify to the same term. A concrete and
/// a symbolic value are never strictly equal, even if the formula is valid.
#[must_use]
pub fn strict_equal(a: &SymValue, b: &SymValue) -> bool {
    match (a, b) {
        (
            SymValue::Concrete {
                width: wa,
                value: va,
            },
            SymValue::Concrete {
                width: wb,
                value: vb,
            },
        ) => wa == wb && va == vb,
        (
            SymValue::Expression {
                width: wa,
                expr: ea,
            },
            SymValue::Expression {
                width: wb,
                expr: eb,
            },
        ) => wa == wb && (ea == eb || ea.simplify() == eb.simplify()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        symbolic::{
            algebra::{self, Relation},
            ops::CmpOp,
            value::SymValue,
        },
        Error,
    };

    fn c(value: u64, width: u32) -> SymValue {
        SymValue::concrete(value, width)
    }

    #[test]
    fn test_add_sub_wrap() {
        let x = c(0xffff_ffff, 32);
        assert_eq!(algebra::add(&x, &c(1, 32)).unwrap(), c(0, 32));
        assert_eq!(
            algebra::sub(&c(0, 32), &c(1, 32)).unwrap(),
            c(0xffff_ffff, 32)
        );
    }

    #[test]
    fn test_width_mismatch() {
        let result = algebra::add(&c(1, 32), &c(1, 64));
        assert!(matches!(
            result,
            Err(Error::WidthMismatch {
                expected: 32,
                found: 64
            })
        ));
    }

    #[test]
    fn test_arith_operator_strings() {
        let x = c(10, 8);
        let y = c(3, 8);
        assert_eq!(algebra::arith("+", &x, &y).unwrap(), c(13, 8));
        assert_eq!(algebra::arith("-", &x, &y).unwrap(), c(7, 8));
        assert_eq!(algebra::arith("%u", &x, &y).unwrap(), c(1, 8));
        assert!(matches!(
            algebra::arith("**", &x, &y),
            Err(Error::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn test_signed_comparisons() {
        let minus_one = SymValue::from_i64(-1, 8);
        let one = c(1, 8);
        assert_eq!(algebra::less(&minus_one, &one).unwrap(), SymValue::boolean(true));
        assert_eq!(algebra::greater(&minus_one, &one).unwrap(), SymValue::boolean(false));
        assert_eq!(
            algebra::compare(CmpOp::ULt, &minus_one, &one).unwrap(),
            SymValue::boolean(false)
        );
        assert_eq!(algebra::logic("<>", &one, &one).unwrap(), SymValue::boolean(false));
        assert_eq!(algebra::logic(">=", &one, &minus_one).unwrap(), SymValue::boolean(true));
        assert_eq!(algebra::is_negative(&minus_one), SymValue::boolean(true));
        assert_eq!(algebra::is_non_negative(&one), SymValue::boolean(true));
    }

    #[test]
    fn test_symbolic_comparison_is_predicate() {
        let x = SymValue::symbol("x", 32);
        let p = algebra::less(&x, &c(5, 32)).unwrap();
        assert_eq!(p.width(), 1);
        assert!(p.is_symbolic());
        let not_p = algebra::bool_not(&p).unwrap();
        assert_eq!(
            not_p,
            algebra::greater_equal(&x, &c(5, 32)).unwrap()
        );
        assert!(algebra::bool_not(&x).is_err());
    }

    #[test]
    fn test_extract() {
        let v = c(0xabcd, 16);
        assert_eq!(algebra::extract(&v, 15, 8).unwrap(), c(0xab, 8));
        assert_eq!(algebra::bit_at(&v, 0).unwrap(), c(1, 1));
        assert!(matches!(
            algebra::extract(&v, 16, 0),
            Err(Error::InvalidRange {
                high: 16,
                low: 0,
                width: 16
            })
        ));
        assert!(matches!(
            algebra::extract(&v, 3, 5),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_extract_bytes() {
        let v = c(0x1122_3344, 32);
        assert_eq!(algebra::extract_bytes(&v, 2, 0).unwrap(), c(0x3344, 16));
        assert_eq!(algebra::extract_bytes(&v, 4, 3).unwrap(), c(0x11, 8));
        assert!(algebra::extract_bytes(&v, 0, 0).is_err());
        assert!(algebra::extract_bytes(&v, 5, 0).is_err());
    }

    #[test]
    fn test_sizing() {
        let v = c(0x80, 8);
        assert_eq!(algebra::zero_extend(&v, 8).unwrap(), c(0x0080, 16));
        assert_eq!(algebra::sign_extend(&v, 8).unwrap(), c(0xff80, 16));
        assert!(matches!(
            algebra::zero_extend(&v, u32::MAX - 7),
            Err(Error::InvalidRange { high, low: 0, width: 8 }) if high == u32::MAX - 7
        ));
        let s = SymValue::symbol("s", 64);
        assert!(algebra::sign_extend(&s, u32::MAX).is_err());
        assert_eq!(algebra::zero_extend(&s, u32::MAX - 64).unwrap().width(), u32::MAX);
        assert_eq!(
            algebra::concat(&[c(0x12, 8), c(0x34, 8)]).unwrap(),
            c(0x1234, 16)
        );
        assert!(matches!(algebra::concat(&[]), Err(Error::Empty)));
        assert_eq!(algebra::truncate_to(&c(0x1234, 16), 8).unwrap(), c(0x34, 8));
        assert_eq!(algebra::upper_half(&c(0x1234, 16)).unwrap(), c(0x12, 8));
        assert_eq!(algebra::lower_half(&c(0x1234, 16)).unwrap(), c(0x34, 8));
        assert!(matches!(
            algebra::upper_half(&c(0, 7)),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_symbolic_halves_rebuild() {
        let x = SymValue::symbol("x", 64);
        let hi = algebra::upper_half(&x).unwrap();
        let lo = algebra::lower_half(&x).unwrap();
        assert_eq!(algebra::concat(&[hi, lo]).unwrap(), x);
    }

    #[test]
    fn test_flag_helpers() {
        let v = c(0b1000_0001, 8);
        assert_eq!(algebra::most_significant_bit(&v), SymValue::boolean(true));
        assert_eq!(
            algebra::second_most_significant_bit(&v).unwrap(),
            SymValue::boolean(false)
        );
        assert_eq!(algebra::least_significant_bit(&v), SymValue::boolean(true));
        assert!(algebra::second_most_significant_bit(&c(1, 1)).is_err());
    }

    #[test]
    fn test_xnor_reduce_concrete() {
        // Fold over bits 0..3 of 0b1011: r=1, ~(1^1)=1, ~(1^0)=0, ~(0^1)=0
        assert_eq!(algebra::xnor_reduce(&c(0b1011, 4)), SymValue::boolean(false));
        // 0b0000: r=0, ~(0^0)=1, ~(1^0)=0, ~(0^0)=1
        assert_eq!(algebra::xnor_reduce(&c(0, 4)), SymValue::boolean(true));
    }

    #[test]
    fn test_substitute() {
        let x = SymValue::symbol("x", 32);
        let v = algebra::add(&x, &c(4, 32)).unwrap();
        let replaced = algebra::substitute(&v, &x, &c(6, 32)).unwrap();
        assert_eq!(replaced, c(10, 32));
        assert!(algebra::substitute(&v, &x, &c(6, 8)).is_err());
    }

    #[test]
    fn test_combine() {
        let p = SymValue::symbol("p", 1);
        let q = SymValue::symbol("q", 1);
        let both = algebra::combine(Relation::And, &p, &q).unwrap();
        assert_eq!(both, algebra::and(&p, &q).unwrap());
        assert_eq!(algebra::combine(Relation::Replace, &p, &q).unwrap(), q);
        assert_eq!("r".parse::<Relation>().unwrap(), Relation::Replace);
        assert_eq!("or".parse::<Relation>().unwrap(), Relation::Or);
    }

    #[test]
    fn test_strict_equal() {
        let x = SymValue::symbol("x", 8);
        assert!(algebra::strict_equal(&c(3, 8), &c(3, 8)));
        assert!(!algebra::strict_equal(&c(3, 8), &c(3, 16)));
        assert!(!algebra::strict_equal(&c(3, 8), &x));
        let a = algebra::add(&x, &c(1, 8)).unwrap();
        let b = algebra::add(&c(1, 8), &x).unwrap();
        assert!(algebra::strict_equal(&a, &b));
    }
}
