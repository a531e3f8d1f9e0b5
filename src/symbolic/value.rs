//! The symbolic machine value.
//!
//! [`SymValue`] is what the interpreter stores in registers and memory cells:
//! either a literal of known width or a shared, already simplified
//! [`BvExpr`]. Keeping the concrete case as its own variant lets the hot path
//! of concrete execution skip the expression machinery entirely.

use std::{fmt, sync::Arc};

use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;

use crate::symbolic::{expr::BvExpr, ops};

/// A fixed-width bitvector value that is either known or symbolic.
///
/// An expression that simplifies to a literal is always stored as
/// [`SymValue::Concrete`]; the two variants therefore never describe the same
/// value, which makes the derived equality meaningful.
///
/// # Examples
///
/// ```rust
/// use concolic_sym::symbolic::SymValue;
///
/// let value = SymValue::concrete(0x1234u32, 16);
/// assert_eq!(value.width(), 16);
/// assert_eq!(value.as_u64(), Some(0x1234));
/// assert_eq!(value.to_string(), "0x1234");
///
/// let sym = SymValue::symbol("rax", 64);
/// assert!(sym.is_symbolic());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymValue {
    /// A literal value, reduced modulo `2^width`.
    Concrete {
        /// The bit-width.
        width: u32,
        /// The unsigned value.
        value: BigUint,
    },
    /// A symbolic formula.
    Expression {
        /// The bit-width.
        width: u32,
        /// The simplified expression.
        expr: Arc<BvExpr>,
    },
}

impl SymValue {
    /// Creates a concrete value, reducing `value` modulo `2^width`.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    #[must_use]
    pub fn concrete(value: impl Into<BigUint>, width: u32) -> Self {
        assert!(width > 0, "bitvector width must be at least 1");
        Self::Concrete {
            width,
            value: ops::truncate(&value.into(), width),
        }
    }

    /// Creates a concrete value from a signed integer in two's complement.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    #[must_use]
    pub fn from_i64(value: i64, width: u32) -> Self {
        assert!(width > 0, "bitvector width must be at least 1");
        Self::Concrete {
            width,
            value: ops::from_signed(&BigInt::from(value), width),
        }
    }

    /// Creates a 1-bit predicate literal.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::concrete(u8::from(value), 1)
    }

    /// Creates a free symbol of the given width.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    #[must_use]
    pub fn symbol(name: impl Into<Arc<str>>, width: u32) -> Self {
        assert!(width > 0, "bitvector width must be at least 1");
        Self::Expression {
            width,
            expr: Arc::new(BvExpr::symbol(name, width)),
        }
    }

    /// Simplifies an expression and wraps it as a value.
    ///
    /// # Arguments
    ///
    /// * `expr` - Any well-formed expression of non-zero width.
    ///
    /// # Returns
    ///
    /// [`SymValue::Concrete`] if the expression folds to a literal, otherwise
    /// [`SymValue::Expression`] holding the simplified tree.
    #[must_use]
    pub fn from_expr(expr: &BvExpr) -> Self {
        Self::from_simplified(expr.simplify())
    }

    /// Wraps an expression that is already in canonical form.
    pub(crate) fn from_simplified(expr: BvExpr) -> Self {
        match expr {
            BvExpr::Const { value, width } => Self::Concrete { width, value },
            expr => Self::Expression {
                width: expr.width(),
                expr: Arc::new(expr),
            },
        }
    }

    /// Returns the bit-width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        match self {
            Self::Concrete { width, .. } | Self::Expression { width, .. } => *width,
        }
    }

    /// Checks if the value is a literal.
    #[must_use]
    pub const fn is_concrete(&self) -> bool {
        matches!(self, Self::Concrete { .. })
    }

    /// Checks if the value is a formula.
    #[must_use]
    pub const fn is_symbolic(&self) -> bool {
        matches!(self, Self::Expression { .. })
    }

    /// Returns the literal value, if concrete.
    #[must_use]
    pub const fn as_biguint(&self) -> Option<&BigUint> {
        match self {
            Self::Concrete { value, .. } => Some(value),
            Self::Expression { .. } => None,
        }
    }

    /// Returns the literal value as `u64`, if concrete and small enough.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_biguint().and_then(ToPrimitive::to_u64)
    }

    /// Returns the literal value interpreted as a signed two's-complement
    /// integer, if concrete and representable as `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Concrete { value, width } => ops::to_signed(value, *width).to_i64(),
            Self::Expression { .. } => None,
        }
    }

    /// Returns the expression, if symbolic.
    #[must_use]
    pub fn expr(&self) -> Option<&BvExpr> {
        match self {
            Self::Concrete { .. } => None,
            Self::Expression { expr, .. } => Some(expr.as_ref()),
        }
    }

    /// Returns the symbol name if this value is a bare symbol.
    #[must_use]
    pub fn symbol_name(&self) -> Option<&str> {
        match self.expr() {
            Some(BvExpr::Symbol { name, .. }) => Some(&**name),
            _ => None,
        }
    }

    /// Converts the value into an expression tree.
    #[must_use]
    pub fn to_expr(&self) -> BvExpr {
        match self {
            Self::Concrete { width, value } => BvExpr::Const {
                value: value.clone(),
                width: *width,
            },
            Self::Expression { expr, .. } => (**expr).clone(),
        }
    }
}

impl From<bool> for SymValue {
    fn from(value: bool) -> Self {
        Self::boolean(value)
    }
}

impl fmt::Display for SymValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete { value, .. } => write!(f, "{value:#x}"),
            Self::Expression { expr, .. } => write!(f, "{expr}"),
        }
    }
}
