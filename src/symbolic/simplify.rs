//! Canonicalizing simplification of [`BvExpr`] trees.
//!
//! Simplification is not cosmetic: structural equality of simplified trees is
//! what the merge operator, [`algebra::strict_equal`](super::algebra::strict_equal)
//! and the callers' own value comparisons rely on. Every [`algebra`](super::algebra)
//! operation therefore returns simplified expressions only.
//!
//! The rewrite rules are bottom-up and local:
//!
//! - constant folding of every operator, using SMT-LIB semantics
//! - constants on the right of commutative operators and comparisons
//! - `x - c` → `x + (-c)`, merged constant chains for `+ * & | ^`
//! - the usual identities (`x + 0`, `x * 1`, `x & -1`, `x ^ x`, `~~x`, ...)
//! - `~(a < b)` → `a >= b`, `b == 1` → `b` and `b == 0` → `~b` for 1-bit `b`
//! - extraction through extraction, concatenation and zero-extension
//! - merged adjacent literal and contiguous-extract concatenation parts
//!
//! The extraction and concatenation rules are chosen so that concatenating the
//! single-bit extracts of any simplified value rebuilds exactly that value.

use num_traits::{One, Zero};

use crate::symbolic::{
    expr::BvExpr,
    ops::{self, BinaryOp, CmpOp, UnaryOp},
};

impl BvExpr {
    /// Simplifies the expression into its canonical form.
    ///
    /// # Returns
    ///
    /// A simplified expression that is semantically equivalent to this one and
    /// has the same width. Literal results are always [`BvExpr::Const`].
    #[must_use]
    pub fn simplify(&self) -> Self {
        match self {
            Self::Const { .. } | Self::Symbol { .. } => self.clone(),
            Self::Unary { op, operand } => simplify_unary(*op, operand.simplify()),
            Self::Binary { op, lhs, rhs } => simplify_binary(*op, lhs.simplify(), rhs.simplify()),
            Self::Compare { op, lhs, rhs } => {
                simplify_compare(*op, lhs.simplify(), rhs.simplify())
            }
            Self::Extract { high, low, operand } => {
                simplify_extract(*high, *low, operand.simplify())
            }
            Self::Concat(parts) => simplify_concat(parts.iter().map(Self::simplify).collect()),
            Self::ZeroExt { bits, operand } => simplify_zero_ext(*bits, operand.simplify()),
            Self::SignExt { bits, operand } => simplify_sign_ext(*bits, operand.simplify()),
            Self::Apply { func, args, width } => Self::Apply {
                func: func.clone(),
                args: args.iter().map(Self::simplify).collect(),
                width: *width,
            },
            Self::Select {
                array,
                index,
                width,
            } => Self::Select {
                array: array.clone(),
                index: Box::new(index.simplify()),
                width: *width,
            },
        }
    }
}

pub(crate) fn simplify_unary(op: UnaryOp, operand: BvExpr) -> BvExpr {
    let width = operand.width();
    if let Some(value) = operand.as_const() {
        return BvExpr::constant(op.evaluate(value, width), width);
    }

    match (op, operand) {
        // ~~x = x, --x = x
        (op, BvExpr::Unary {
            op: inner,
            operand,
        }) if inner == op => *operand,
        // ~(a < b) = a >= b
        (UnaryOp::Not, BvExpr::Compare { op: cmp, lhs, rhs }) => BvExpr::Compare {
            op: cmp.negate(),
            lhs,
            rhs,
        },
        (op, operand) => BvExpr::unary(op, operand),
    }
}

#[allow(clippy::match_same_arms)] // Documents distinct algebraic identities: x*0=0 vs x&0=0
pub(crate) fn simplify_binary(op: BinaryOp, lhs: BvExpr, rhs: BvExpr) -> BvExpr {
    let width = lhs.width();

    // Both constants - fold
    if let (Some(l), Some(r)) = (lhs.as_const(), rhs.as_const()) {
        return BvExpr::constant(op.evaluate(l, r, width), width);
    }

    // Constants go to the right of commutative operators
    let (lhs, rhs) = if op.is_commutative() && lhs.is_const() {
        (rhs, lhs)
    } else {
        (lhs, rhs)
    };

    // x - c = x + (-c)
    if op == BinaryOp::Sub {
        if let Some(c) = rhs.as_const() {
            let negated = BvExpr::constant(ops::negate(c, width), width);
            return simplify_binary(BinaryOp::Add, lhs, negated);
        }
    }

    // Self-cancellation patterns
    if lhs == rhs {
        match op {
            // x ^ x = 0, x - x = 0
            BinaryOp::Xor | BinaryOp::Sub => return BvExpr::zero(width),
            // x | x = x, x & x = x
            BinaryOp::Or | BinaryOp::And => return lhs,
            _ => {}
        }
    }

    if let Some(c) = rhs.as_const().cloned() {
        if c.is_zero() {
            match op {
                BinaryOp::Add
                | BinaryOp::Sub
                | BinaryOp::Or
                | BinaryOp::Xor
                | BinaryOp::Shl
                | BinaryOp::LShr
                | BinaryOp::AShr => return lhs,
                BinaryOp::Mul => return BvExpr::zero(width),
                BinaryOp::And => return BvExpr::zero(width),
                _ => {}
            }
        }
        if c.is_one() {
            match op {
                BinaryOp::Mul | BinaryOp::UDiv | BinaryOp::SDiv => return lhs,
                BinaryOp::URem | BinaryOp::SRem => return BvExpr::zero(width),
                _ => {}
            }
        }
        if rhs.is_all_ones() {
            match op {
                BinaryOp::And => return lhs,
                BinaryOp::Or => return rhs,
                // x ^ -1 = ~x
                BinaryOp::Xor => return simplify_unary(UnaryOp::Not, lhs),
                _ => {}
            }
        }

        // (x op c1) op c2 = x op (c1 op c2)
        if op.is_associative() {
            if let BvExpr::Binary {
                op: inner,
                lhs: x,
                rhs: c1,
            } = &lhs
            {
                if *inner == op {
                    if let Some(c1) = c1.as_const() {
                        let merged = BvExpr::constant(op.evaluate(c1, &c, width), width);
                        return simplify_binary(op, (**x).clone(), merged);
                    }
                }
            }
        }
    }

    if lhs.is_zero() {
        match op {
            // 0 - x = -x
            BinaryOp::Sub => return simplify_unary(UnaryOp::Neg, rhs),
            BinaryOp::Shl | BinaryOp::LShr | BinaryOp::AShr | BinaryOp::URem => {
                return BvExpr::zero(width)
            }
            _ => {}
        }
    }

    BvExpr::binary(op, lhs, rhs)
}

pub(crate) fn simplify_compare(op: CmpOp, lhs: BvExpr, rhs: BvExpr) -> BvExpr {
    let width = lhs.width();

    if let (Some(l), Some(r)) = (lhs.as_const(), rhs.as_const()) {
        return BvExpr::boolean(op.evaluate(l, r, width));
    }

    if lhs == rhs {
        return BvExpr::boolean(op.is_reflexive());
    }

    // Constants go to the right
    if lhs.is_const() {
        return simplify_compare(op.swap(), rhs, lhs);
    }

    if let (CmpOp::Eq | CmpOp::Ne, Some(c)) = (op, rhs.as_const().cloned()) {
        // b == 1 = b, b == 0 = ~b, b != 1 = ~b, b != 0 = b
        if width == 1 {
            let positive = (op == CmpOp::Eq) == c.is_one();
            return if positive {
                lhs
            } else {
                simplify_unary(UnaryOp::Not, lhs)
            };
        }

        match &lhs {
            // (x + c1) == c2 = x == c2 - c1
            BvExpr::Binary {
                op: BinaryOp::Add,
                lhs: x,
                rhs: c1,
            } => {
                if let Some(c1) = c1.as_const() {
                    let moved = BvExpr::constant(BinaryOp::Sub.evaluate(&c, c1, width), width);
                    return simplify_compare(op, (**x).clone(), moved);
                }
            }
            // (x ^ c1) == c2 = x == c2 ^ c1
            BvExpr::Binary {
                op: BinaryOp::Xor,
                lhs: x,
                rhs: c1,
            } => {
                if let Some(c1) = c1.as_const() {
                    let moved = BvExpr::constant(BinaryOp::Xor.evaluate(&c, c1, width), width);
                    return simplify_compare(op, (**x).clone(), moved);
                }
            }
            // ~x == c = x == ~c, -x == c = x == -c
            BvExpr::Unary { op: unary, operand } => {
                let moved = BvExpr::constant(unary.evaluate(&c, width), width);
                return simplify_compare(op, (**operand).clone(), moved);
            }
            _ => {}
        }
    }

    BvExpr::compare(op, lhs, rhs)
}

pub(crate) fn simplify_extract(high: u32, low: u32, operand: BvExpr) -> BvExpr {
    let width = operand.width();
    if low == 0 && high + 1 == width {
        return operand;
    }
    let out_width = high - low + 1;

    match operand {
        BvExpr::Const { value, .. } => BvExpr::constant(value >> low, out_width),
        BvExpr::Extract {
            low: inner_low,
            operand,
            ..
        } => simplify_extract(high + inner_low, low + inner_low, *operand),
        BvExpr::Concat(parts) => {
            let mut pieces = Vec::new();
            let mut offset = 0;
            for part in parts.into_iter().rev() {
                let part_width = part.width();
                let part_low = offset;
                let part_high = offset + part_width - 1;
                offset += part_width;
                if part_high < low || part_low > high {
                    continue;
                }
                let piece_high = high.min(part_high) - part_low;
                let piece_low = low.max(part_low) - part_low;
                pieces.push(simplify_extract(piece_high, piece_low, part));
            }
            pieces.reverse();
            simplify_concat(pieces)
        }
        BvExpr::ZeroExt { operand, .. } => {
            let inner = operand.width();
            if high < inner {
                simplify_extract(high, low, *operand)
            } else if low >= inner {
                BvExpr::zero(out_width)
            } else {
                simplify_concat(vec![
                    BvExpr::zero(high - inner + 1),
                    simplify_extract(inner - 1, low, *operand),
                ])
            }
        }
        operand => BvExpr::extract(high, low, operand),
    }
}

pub(crate) fn simplify_concat(parts: Vec<BvExpr>) -> BvExpr {
    let mut merged: Vec<BvExpr> = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            BvExpr::Concat(inner) => {
                for nested in inner {
                    push_part(&mut merged, nested);
                }
            }
            other => push_part(&mut merged, other),
        }
    }

    if merged.len() == 1 {
        return merged.remove(0);
    }

    // concat(0, x) = zext(x)
    if merged.len() > 1 && merged[0].is_zero() {
        let zeros = merged.remove(0).width();
        let rest = if merged.len() == 1 {
            merged.remove(0)
        } else {
            BvExpr::Concat(merged)
        };
        return simplify_zero_ext(zeros, rest);
    }

    BvExpr::Concat(merged)
}

fn push_part(merged: &mut Vec<BvExpr>, part: BvExpr) {
    if let Some(last) = merged.last_mut() {
        if let Some(joined) = join_parts(last, &part) {
            *last = joined;
            return;
        }
    }
    merged.push(part);
}

fn join_parts(upper: &BvExpr, lower: &BvExpr) -> Option<BvExpr> {
    match (upper, lower) {
        (
            BvExpr::Const {
                value: upper_value,
                width: upper_width,
            },
            BvExpr::Const {
                value: lower_value,
                width: lower_width,
            },
        ) => Some(BvExpr::constant(
            (upper_value << *lower_width) | lower_value,
            upper_width + lower_width,
        )),
        (
            BvExpr::Extract {
                high,
                low,
                operand: upper_operand,
            },
            BvExpr::Extract {
                high: lower_high,
                low: lower_low,
                operand: lower_operand,
            },
        ) if upper_operand == lower_operand && *low == lower_high + 1 => Some(simplify_extract(
            *high,
            *lower_low,
            (**upper_operand).clone(),
        )),
        _ => None,
    }
}

pub(crate) fn simplify_zero_ext(bits: u32, operand: BvExpr) -> BvExpr {
    if bits == 0 {
        return operand;
    }
    match operand {
        BvExpr::Const { value, width } => BvExpr::constant(value, width + bits),
        BvExpr::ZeroExt {
            bits: inner,
            operand,
        } => BvExpr::zero_ext(bits + inner, *operand),
        operand => BvExpr::zero_ext(bits, operand),
    }
}

pub(crate) fn simplify_sign_ext(bits: u32, operand: BvExpr) -> BvExpr {
    if bits == 0 {
        return operand;
    }
    match operand {
        BvExpr::Const { value, width } => {
            let extended = if ops::is_negative(&value, width) {
                value | (ops::mask(width + bits) ^ ops::mask(width))
            } else {
                value
            };
            BvExpr::constant(extended, width + bits)
        }
        operand => BvExpr::sign_ext(bits, operand),
    }
}
