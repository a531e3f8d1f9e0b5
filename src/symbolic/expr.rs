//! Bitvector expression tree representation.
//!
//! This module defines [`BvExpr`], the backend-independent intermediate
//! representation for symbolic machine values. Every node has a fixed
//! bit-width; predicates are 1-bit expressions. Expressions are built by the
//! [`algebra`](super::algebra) functions, canonicalized by
//! [`BvExpr::simplify`], and translated to a solver only inside a
//! [`SolverBackend`](crate::solver::SolverBackend).
//!
//! ```text
//! Interpreter → algebra → BvExpr (simplified) → SolverSession → Model
//! ```

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::symbolic::ops::{self, BinaryOp, CmpOp, UnaryOp};

/// A bitvector expression of fixed width.
///
/// Constructors do not validate widths; the [`algebra`](super::algebra) layer
/// checks operands before building nodes, so a tree reachable from a
/// [`SymValue`](super::SymValue) is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BvExpr {
    /// A literal, always reduced modulo `2^width`.
    Const {
        /// The unsigned value.
        value: BigUint,
        /// The bit-width.
        width: u32,
    },

    /// A free bitvector constant (an unknown input).
    Symbol {
        /// The symbol name.
        name: Arc<str>,
        /// The bit-width.
        width: u32,
    },

    /// A unary operation.
    Unary {
        /// The operation to perform.
        op: UnaryOp,
        /// The operand.
        operand: Box<BvExpr>,
    },

    /// A width-preserving binary operation.
    Binary {
        /// The operation to perform.
        op: BinaryOp,
        /// The left operand.
        lhs: Box<BvExpr>,
        /// The right operand.
        rhs: Box<BvExpr>,
    },

    /// A comparison, producing a 1-bit predicate.
    Compare {
        /// The comparison to perform.
        op: CmpOp,
        /// The left operand.
        lhs: Box<BvExpr>,
        /// The right operand.
        rhs: Box<BvExpr>,
    },

    /// Bits `high..=low` of the operand.
    Extract {
        /// The upper bit index (inclusive).
        high: u32,
        /// The lower bit index (inclusive).
        low: u32,
        /// The operand.
        operand: Box<BvExpr>,
    },

    /// Concatenation, most-significant part first.
    Concat(Vec<BvExpr>),

    /// Zero-extension by `bits` bits.
    ZeroExt {
        /// The number of zero bits prepended.
        bits: u32,
        /// The operand.
        operand: Box<BvExpr>,
    },

    /// Sign-extension by `bits` bits.
    SignExt {
        /// The number of sign bits prepended.
        bits: u32,
        /// The operand.
        operand: Box<BvExpr>,
    },

    /// Application of an uninterpreted function.
    Apply {
        /// The function name.
        func: Arc<str>,
        /// The arguments.
        args: Vec<BvExpr>,
        /// The result width.
        width: u32,
    },

    /// A read from a named array (an uninterpreted memory).
    Select {
        /// The array name.
        array: Arc<str>,
        /// The index expression; its width is the array's index width.
        index: Box<BvExpr>,
        /// The element width.
        width: u32,
    },
}

/// A free name a formula depends on, as the solver must declare it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Declaration {
    /// A bitvector constant.
    Constant {
        /// The symbol name.
        name: Arc<str>,
        /// The bit-width.
        width: u32,
    },
    /// An uninterpreted function.
    Function {
        /// The function name.
        name: Arc<str>,
        /// The argument widths.
        domain: Vec<u32>,
        /// The result width.
        width: u32,
    },
    /// An array from `index_width`-bit indices to `width`-bit elements.
    Array {
        /// The array name.
        name: Arc<str>,
        /// The index width.
        index_width: u32,
        /// The element width.
        width: u32,
    },
}

impl Declaration {
    /// Returns the declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Constant { name, .. } | Self::Function { name, .. } | Self::Array { name, .. } => {
                name
            }
        }
    }

    /// Returns the width of the declared bitvector (the result width of a
    /// function, the element width of an array).
    #[must_use]
    pub const fn width(&self) -> u32 {
        match self {
            Self::Constant { width, .. }
            | Self::Function { width, .. }
            | Self::Array { width, .. } => *width,
        }
    }

    /// Checks if this is a plain bitvector constant.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self, Self::Constant { .. })
    }
}

fn declare(seen: &mut HashSet<Declaration>, decls: &mut Vec<Declaration>, declaration: Declaration) {
    if seen.insert(declaration.clone()) {
        decls.push(declaration);
    }
}

impl BvExpr {
    /// Creates a literal of the given width, reducing `value` modulo `2^width`.
    #[must_use]
    pub fn constant(value: impl Into<BigUint>, width: u32) -> Self {
        Self::Const {
            value: ops::truncate(&value.into(), width),
            width,
        }
    }

    /// Creates the all-zero literal of the given width.
    #[must_use]
    pub fn zero(width: u32) -> Self {
        Self::Const {
            value: BigUint::zero(),
            width,
        }
    }

    /// Creates a 1-bit boolean literal.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::Const {
            value: if value { BigUint::one() } else { BigUint::zero() },
            width: 1,
        }
    }

    /// Creates a free symbol.
    #[must_use]
    pub fn symbol(name: impl Into<Arc<str>>, width: u32) -> Self {
        Self::Symbol {
            name: name.into(),
            width,
        }
    }

    /// Creates a unary operation node.
    #[must_use]
    pub fn unary(op: UnaryOp, operand: Self) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Creates a binary operation node.
    #[must_use]
    pub fn binary(op: BinaryOp, lhs: Self, rhs: Self) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Creates a comparison node.
    #[must_use]
    pub fn compare(op: CmpOp, lhs: Self, rhs: Self) -> Self {
        Self::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Creates an extraction node for bits `high..=low`.
    #[must_use]
    pub fn extract(high: u32, low: u32, operand: Self) -> Self {
        Self::Extract {
            high,
            low,
            operand: Box::new(operand),
        }
    }

    /// Creates a zero-extension node.
    #[must_use]
    pub fn zero_ext(bits: u32, operand: Self) -> Self {
        Self::ZeroExt {
            bits,
            operand: Box::new(operand),
        }
    }

    /// Creates a sign-extension node.
    #[must_use]
    pub fn sign_ext(bits: u32, operand: Self) -> Self {
        Self::SignExt {
            bits,
            operand: Box::new(operand),
        }
    }

    /// Creates an uninterpreted function application.
    #[must_use]
    pub fn apply(func: impl Into<Arc<str>>, args: Vec<Self>, width: u32) -> Self {
        Self::Apply {
            func: func.into(),
            args,
            width,
        }
    }

    /// Creates a read from a named array.
    #[must_use]
    pub fn select(array: impl Into<Arc<str>>, index: Self, width: u32) -> Self {
        Self::Select {
            array: array.into(),
            index: Box::new(index),
            width,
        }
    }

    /// Returns the bit-width of this expression.
    #[must_use]
    pub fn width(&self) -> u32 {
        match self {
            Self::Const { width, .. }
            | Self::Symbol { width, .. }
            | Self::Apply { width, .. }
            | Self::Select { width, .. } => *width,
            Self::Unary { operand, .. } => operand.width(),
            Self::Binary { lhs, .. } => lhs.width(),
            Self::Compare { .. } => 1,
            Self::Extract { high, low, .. } => high - low + 1,
            Self::Concat(parts) => parts.iter().map(Self::width).sum(),
            // Saturates; the algebra rejects extensions past `u32::MAX`
            Self::ZeroExt { bits, operand } | Self::SignExt { bits, operand } => {
                bits.saturating_add(operand.width())
            }
        }
    }

    /// Checks if this expression is a literal.
    #[must_use]
    pub const fn is_const(&self) -> bool {
        matches!(self, Self::Const { .. })
    }

    /// Returns the literal value if this is a constant expression.
    #[must_use]
    pub const fn as_const(&self) -> Option<&BigUint> {
        match self {
            Self::Const { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Checks if this is a literal zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.as_const().is_some_and(Zero::is_zero)
    }

    /// Checks if this is a literal one.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.as_const().is_some_and(One::is_one)
    }

    /// Checks if this is a literal with every bit set.
    #[must_use]
    pub fn is_all_ones(&self) -> bool {
        match self {
            Self::Const { value, width } => *value == ops::mask(*width),
            _ => false,
        }
    }

    /// Collects every free name this expression depends on.
    ///
    /// Declarations are returned in order of first occurrence (left to right,
    /// depth first). Duplicates are dropped only when name and sort both
    /// agree, so a name used at two widths yields two declarations.
    #[must_use]
    pub fn declarations(&self) -> Vec<Declaration> {
        let mut seen = HashSet::new();
        let mut decls = Vec::new();
        self.collect_declarations(&mut seen, &mut decls);
        decls
    }

    fn collect_declarations(&self, seen: &mut HashSet<Declaration>, decls: &mut Vec<Declaration>) {
        match self {
            Self::Const { .. } => {}
            Self::Symbol { name, width } => declare(
                seen,
                decls,
                Declaration::Constant {
                    name: name.clone(),
                    width: *width,
                },
            ),
            Self::Unary { operand, .. }
            | Self::Extract { operand, .. }
            | Self::ZeroExt { operand, .. }
            | Self::SignExt { operand, .. } => operand.collect_declarations(seen, decls),
            Self::Binary { lhs, rhs, .. } | Self::Compare { lhs, rhs, .. } => {
                lhs.collect_declarations(seen, decls);
                rhs.collect_declarations(seen, decls);
            }
            Self::Concat(parts) => {
                for part in parts {
                    part.collect_declarations(seen, decls);
                }
            }
            Self::Apply { func, args, width } => {
                declare(
                    seen,
                    decls,
                    Declaration::Function {
                        name: func.clone(),
                        domain: args.iter().map(Self::width).collect(),
                        width: *width,
                    },
                );
                for arg in args {
                    arg.collect_declarations(seen, decls);
                }
            }
            Self::Select {
                array,
                index,
                width,
            } => {
                declare(
                    seen,
                    decls,
                    Declaration::Array {
                        name: array.clone(),
                        index_width: index.width(),
                        width: *width,
                    },
                );
                index.collect_declarations(seen, decls);
            }
        }
    }

    /// Checks if `needle` occurs structurally inside this expression.
    #[must_use]
    pub fn contains(&self, needle: &Self) -> bool {
        if self == needle {
            return true;
        }
        match self {
            Self::Const { .. } | Self::Symbol { .. } => false,
            Self::Unary { operand, .. }
            | Self::Extract { operand, .. }
            | Self::ZeroExt { operand, .. }
            | Self::SignExt { operand, .. } => operand.contains(needle),
            Self::Binary { lhs, rhs, .. } | Self::Compare { lhs, rhs, .. } => {
                lhs.contains(needle) || rhs.contains(needle)
            }
            Self::Concat(parts) | Self::Apply { args: parts, .. } => {
                parts.iter().any(|part| part.contains(needle))
            }
            Self::Select { index, .. } => index.contains(needle),
        }
    }

    /// Replaces every structural occurrence of `from` with `to`.
    ///
    /// The result is not simplified; callers go through
    /// [`algebra::substitute`](super::algebra::substitute), which is.
    #[must_use]
    pub fn substitute(&self, from: &Self, to: &Self) -> Self {
        if self == from {
            return to.clone();
        }
        match self {
            Self::Const { .. } | Self::Symbol { .. } => self.clone(),
            Self::Unary { op, operand } => Self::unary(*op, operand.substitute(from, to)),
            Self::Binary { op, lhs, rhs } => {
                Self::binary(*op, lhs.substitute(from, to), rhs.substitute(from, to))
            }
            Self::Compare { op, lhs, rhs } => {
                Self::compare(*op, lhs.substitute(from, to), rhs.substitute(from, to))
            }
            Self::Extract { high, low, operand } => {
                Self::extract(*high, *low, operand.substitute(from, to))
            }
            Self::Concat(parts) => {
                Self::Concat(parts.iter().map(|part| part.substitute(from, to)).collect())
            }
            Self::ZeroExt { bits, operand } => Self::zero_ext(*bits, operand.substitute(from, to)),
            Self::SignExt { bits, operand } => Self::sign_ext(*bits, operand.substitute(from, to)),
            Self::Apply { func, args, width } => Self::Apply {
                func: func.clone(),
                args: args.iter().map(|arg| arg.substitute(from, to)).collect(),
                width: *width,
            },
            Self::Select {
                array,
                index,
                width,
            } => Self::Select {
                array: array.clone(),
                index: Box::new(index.substitute(from, to)),
                width: *width,
            },
        }
    }

    /// Evaluates the expression under an assignment of its free symbols.
    ///
    /// # Arguments
    ///
    /// * `bindings` - Map from symbol names to their concrete values.
    ///
    /// # Returns
    ///
    /// `Some(value)` reduced to this expression's width, or `None` if a symbol
    /// is unbound or the expression reads an uninterpreted function or array.
    #[must_use]
    pub fn evaluate(&self, bindings: &HashMap<String, BigUint>) -> Option<BigUint> {
        match self {
            Self::Const { value, .. } => Some(value.clone()),
            Self::Symbol { name, width } => bindings
                .get(&**name)
                .map(|value| ops::truncate(value, *width)),
            Self::Unary { op, operand } => {
                let value = operand.evaluate(bindings)?;
                Some(op.evaluate(&value, operand.width()))
            }
            Self::Binary { op, lhs, rhs } => {
                let l = lhs.evaluate(bindings)?;
                let r = rhs.evaluate(bindings)?;
                Some(op.evaluate(&l, &r, lhs.width()))
            }
            Self::Compare { op, lhs, rhs } => {
                let l = lhs.evaluate(bindings)?;
                let r = rhs.evaluate(bindings)?;
                let holds = op.evaluate(&l, &r, lhs.width());
                Some(if holds { BigUint::one() } else { BigUint::zero() })
            }
            Self::Extract { high, low, operand } => {
                let value = operand.evaluate(bindings)?;
                Some(ops::truncate(&(value >> *low), high - low + 1))
            }
            Self::Concat(parts) => {
                let mut acc = BigUint::zero();
                for part in parts {
                    acc = (acc << part.width()) | part.evaluate(bindings)?;
                }
                Some(acc)
            }
            Self::ZeroExt { operand, .. } => operand.evaluate(bindings),
            Self::SignExt { bits, operand } => {
                let width = operand.width();
                let value = operand.evaluate(bindings)?;
                if ops::is_negative(&value, width) {
                    Some(value | (ops::mask(width + bits) ^ ops::mask(width)))
                } else {
                    Some(value)
                }
            }
            Self::Apply { .. } | Self::Select { .. } => None,
        }
    }

    /// Returns the depth of the expression tree.
    ///
    /// Literals and symbols have depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Const { .. } | Self::Symbol { .. } => 0,
            Self::Unary { operand, .. }
            | Self::Extract { operand, .. }
            | Self::ZeroExt { operand, .. }
            | Self::SignExt { operand, .. } => 1 + operand.depth(),
            Self::Select { index, .. } => 1 + index.depth(),
            Self::Binary { lhs, rhs, .. } | Self::Compare { lhs, rhs, .. } => {
                1 + lhs.depth().max(rhs.depth())
            }
            Self::Concat(parts) | Self::Apply { args: parts, .. } => {
                1 + parts.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }
}

impl fmt::Display for BvExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const { value, .. } => write!(f, "{value:#x}"),
            Self::Symbol { name, .. } => write!(f, "{name}"),
            Self::Unary { op, operand } => write!(f, "({op}{operand})"),
            Self::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Self::Compare { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Self::Extract { high, low, operand } => write!(f, "{operand}[{high}:{low}]"),
            Self::Concat(parts) => {
                write!(f, "concat(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{part}")?;
                }
                write!(f, ")")
            }
            Self::ZeroExt { bits, operand } => write!(f, "zext{bits}({operand})"),
            Self::SignExt { bits, operand } => write!(f, "sext{bits}({operand})"),
            Self::Apply { func, args, .. } => {
                write!(f, "{func}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Self::Select { array, index, .. } => write!(f, "{array}[{index}]"),
        }
    }
}
