//! Bitvector operator types.
//!
//! This module defines the operators that appear in [`BvExpr`](super::BvExpr)
//! trees:
//!
//! - [`UnaryOp`] - bitwise and arithmetic negation
//! - [`BinaryOp`] - arithmetic, bitwise and shift operators (width preserving)
//! - [`CmpOp`] - comparisons producing a 1-bit predicate
//!
//! Every operator knows how to evaluate itself on concrete operands of a given
//! width, which is what the simplifier uses for constant folding. Division and
//! remainder follow SMT-LIB semantics, so folding agrees with the solver.
//!
//! Operators display as their usual infix symbols and can be parsed back from
//! them, which is how textual operators coming from the interpreter (`"+"`,
//! `"<>"`, `">="`, ...) reach the algebra.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive, Zero};
use strum::{Display, EnumIter, EnumString};

/// Returns the all-ones mask `2^width - 1`.
#[must_use]
pub fn mask(width: u32) -> BigUint {
    (BigUint::one() << width) - BigUint::one()
}

/// Reduces `value` modulo `2^width`.
#[must_use]
pub fn truncate(value: &BigUint, width: u32) -> BigUint {
    value & &mask(width)
}

/// Checks the sign bit of a `width`-bit two's-complement value.
#[must_use]
pub fn is_negative(value: &BigUint, width: u32) -> bool {
    width > 0 && value.bit(u64::from(width - 1))
}

/// Interprets a `width`-bit value as a two's-complement signed integer.
#[must_use]
pub fn to_signed(value: &BigUint, width: u32) -> BigInt {
    if is_negative(value, width) {
        BigInt::from(value.clone()) - (BigInt::one() << width)
    } else {
        BigInt::from(value.clone())
    }
}

/// Encodes a signed integer as a `width`-bit two's-complement value.
#[must_use]
pub fn from_signed(value: &BigInt, width: u32) -> BigUint {
    let modulus = BigInt::one() << width;
    let reduced = ((value % &modulus) + &modulus) % &modulus;
    reduced.to_biguint().unwrap_or_default()
}

/// Two's-complement negation modulo `2^width`.
#[must_use]
pub fn negate(value: &BigUint, width: u32) -> BigUint {
    truncate(&((BigUint::one() << width) - truncate(value, width)), width)
}

/// A unary bitvector operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum UnaryOp {
    /// Bitwise complement (`~x`). On a 1-bit predicate this is boolean negation.
    #[strum(to_string = "~")]
    Not,
    /// Two's-complement negation (`-x`).
    #[strum(to_string = "-")]
    Neg,
}

impl UnaryOp {
    /// Evaluates the operator on a concrete `width`-bit operand.
    #[must_use]
    pub fn evaluate(self, value: &BigUint, width: u32) -> BigUint {
        match self {
            Self::Not => mask(width) ^ truncate(value, width),
            Self::Neg => negate(value, width),
        }
    }
}

/// A width-preserving binary bitvector operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum BinaryOp {
    // Arithmetic operations
    /// Addition, wrapping at the operand width.
    #[strum(serialize = "+")]
    Add,
    /// Subtraction, wrapping at the operand width.
    #[strum(serialize = "-")]
    Sub,
    /// Multiplication, wrapping at the operand width.
    #[strum(serialize = "*")]
    Mul,
    /// Unsigned division. Division by zero yields all ones.
    #[strum(serialize = "/u")]
    UDiv,
    /// Unsigned remainder. Remainder by zero yields the dividend.
    #[strum(serialize = "%u")]
    URem,
    /// Signed division, truncating toward zero.
    #[strum(serialize = "/")]
    SDiv,
    /// Signed remainder, taking the sign of the dividend.
    #[strum(serialize = "%")]
    SRem,

    // Bitwise operations
    /// Bitwise AND. On predicates this is conjunction.
    #[strum(serialize = "&")]
    And,
    /// Bitwise OR. On predicates this is disjunction.
    #[strum(serialize = "|")]
    Or,
    /// Bitwise XOR.
    #[strum(serialize = "^")]
    Xor,

    // Shifts
    /// Shift left. Shift amounts at or above the width yield zero.
    #[strum(serialize = "<<")]
    Shl,
    /// Logical shift right (zero-fill).
    #[strum(serialize = ">>>")]
    LShr,
    /// Arithmetic shift right (sign-fill).
    #[strum(serialize = ">>")]
    AShr,
}

impl BinaryOp {
    /// Checks if this operation is commutative.
    ///
    /// The simplifier uses this to move constants to the right-hand side so
    /// that `5 + x` and `x + 5` share one canonical form.
    #[must_use]
    pub const fn is_commutative(self) -> bool {
        matches!(self, Self::Add | Self::Mul | Self::And | Self::Or | Self::Xor)
    }

    /// Checks if `(x op c1) op c2 == x op (c1 op c2)` for constants `c1`, `c2`.
    #[must_use]
    pub const fn is_associative(self) -> bool {
        self.is_commutative()
    }

    /// Evaluates the operator on two concrete `width`-bit operands.
    ///
    /// # Arguments
    ///
    /// * `lhs` - The left operand.
    /// * `rhs` - The right operand.
    /// * `width` - The bit-width both operands share.
    ///
    /// # Returns
    ///
    /// The result reduced modulo `2^width`.
    #[must_use]
    pub fn evaluate(self, lhs: &BigUint, rhs: &BigUint, width: u32) -> BigUint {
        let lhs = truncate(lhs, width);
        let rhs = truncate(rhs, width);
        match self {
            Self::Add => truncate(&(lhs + rhs), width),
            Self::Sub => truncate(&(lhs + negate(&rhs, width)), width),
            Self::Mul => truncate(&(lhs * rhs), width),
            Self::UDiv => udiv(&lhs, &rhs, width),
            Self::URem => urem(&lhs, &rhs),
            Self::SDiv => sdiv(&lhs, &rhs, width),
            Self::SRem => srem(&lhs, &rhs, width),
            Self::And => lhs & rhs,
            Self::Or => lhs | rhs,
            Self::Xor => lhs ^ rhs,
            Self::Shl => match shift_amount(&rhs, width) {
                Some(amount) => truncate(&(lhs << amount), width),
                None => BigUint::zero(),
            },
            Self::LShr => match shift_amount(&rhs, width) {
                Some(amount) => lhs >> amount,
                None => BigUint::zero(),
            },
            Self::AShr => {
                let negative = is_negative(&lhs, width);
                match shift_amount(&rhs, width) {
                    Some(amount) if negative => {
                        let fill = mask(width) ^ (mask(width) >> amount);
                        (lhs >> amount) | fill
                    }
                    Some(amount) => lhs >> amount,
                    None if negative => mask(width),
                    None => BigUint::zero(),
                }
            }
        }
    }
}

fn shift_amount(amount: &BigUint, width: u32) -> Option<u32> {
    amount.to_u32().filter(|shift| *shift < width)
}

fn udiv(lhs: &BigUint, rhs: &BigUint, width: u32) -> BigUint {
    if rhs.is_zero() {
        mask(width)
    } else {
        lhs / rhs
    }
}

fn urem(lhs: &BigUint, rhs: &BigUint) -> BigUint {
    if rhs.is_zero() {
        lhs.clone()
    } else {
        lhs % rhs
    }
}

fn sdiv(lhs: &BigUint, rhs: &BigUint, width: u32) -> BigUint {
    let lhs_neg = is_negative(lhs, width);
    let rhs_neg = is_negative(rhs, width);
    let abs_lhs = if lhs_neg { negate(lhs, width) } else { lhs.clone() };
    let abs_rhs = if rhs_neg { negate(rhs, width) } else { rhs.clone() };
    let quotient = udiv(&abs_lhs, &abs_rhs, width);
    if lhs_neg == rhs_neg {
        quotient
    } else {
        negate(&quotient, width)
    }
}

fn srem(lhs: &BigUint, rhs: &BigUint, width: u32) -> BigUint {
    let lhs_neg = is_negative(lhs, width);
    let rhs_neg = is_negative(rhs, width);
    let abs_lhs = if lhs_neg { negate(lhs, width) } else { lhs.clone() };
    let abs_rhs = if rhs_neg { negate(rhs, width) } else { rhs.clone() };
    let remainder = urem(&abs_lhs, &abs_rhs);
    if lhs_neg {
        negate(&remainder, width)
    } else {
        remainder
    }
}

/// A comparison operator producing a 1-bit predicate (1 = true).
///
/// The plain symbols (`<`, `>`, `<=`, `>=`) denote signed comparisons, matching
/// how the interpreter compares machine words; unsigned variants carry a `u`
/// suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum CmpOp {
    /// Equal.
    #[strum(serialize = "==")]
    Eq,
    /// Not equal.
    #[strum(to_string = "!=", serialize = "<>")]
    Ne,
    /// Signed less than.
    #[strum(serialize = "<")]
    SLt,
    /// Signed greater than.
    #[strum(serialize = ">")]
    SGt,
    /// Signed less than or equal.
    #[strum(serialize = "<=")]
    SLe,
    /// Signed greater than or equal.
    #[strum(serialize = ">=")]
    SGe,
    /// Unsigned less than.
    #[strum(serialize = "<u")]
    ULt,
    /// Unsigned greater than.
    #[strum(serialize = ">u")]
    UGt,
    /// Unsigned less than or equal.
    #[strum(serialize = "<=u")]
    ULe,
    /// Unsigned greater than or equal.
    #[strum(serialize = ">=u")]
    UGe,
}

impl CmpOp {
    /// Returns the comparison that holds exactly when this one does not.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::SLt => Self::SGe,
            Self::SGe => Self::SLt,
            Self::SGt => Self::SLe,
            Self::SLe => Self::SGt,
            Self::ULt => Self::UGe,
            Self::UGe => Self::ULt,
            Self::UGt => Self::ULe,
            Self::ULe => Self::UGt,
        }
    }

    /// Returns the comparison with its operands exchanged (`a < b` ⇔ `b > a`).
    #[must_use]
    pub const fn swap(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::SLt => Self::SGt,
            Self::SGt => Self::SLt,
            Self::SLe => Self::SGe,
            Self::SGe => Self::SLe,
            Self::ULt => Self::UGt,
            Self::UGt => Self::ULt,
            Self::ULe => Self::UGe,
            Self::UGe => Self::ULe,
        }
    }

    /// Checks if the comparison holds for a value compared with itself.
    #[must_use]
    pub const fn is_reflexive(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::SLe | Self::SGe | Self::ULe | Self::UGe
        )
    }

    /// Evaluates the comparison on two concrete `width`-bit operands.
    #[must_use]
    pub fn evaluate(self, lhs: &BigUint, rhs: &BigUint, width: u32) -> bool {
        let lhs = truncate(lhs, width);
        let rhs = truncate(rhs, width);
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::ULt => lhs < rhs,
            Self::UGt => lhs > rhs,
            Self::ULe => lhs <= rhs,
            Self::UGe => lhs >= rhs,
            Self::SLt => to_signed(&lhs, width) < to_signed(&rhs, width),
            Self::SGt => to_signed(&lhs, width) > to_signed(&rhs, width),
            Self::SLe => to_signed(&lhs, width) <= to_signed(&rhs, width),
            Self::SGe => to_signed(&lhs, width) >= to_signed(&rhs, width),
        }
    }
}
