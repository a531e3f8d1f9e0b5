//! Symbolic machine values and the algebra over them.
//!
//! This module contains everything the interpreter needs to compute with
//! values that may be unknown:
//!
//! - [`SymValue`] - a fixed-width value that is either concrete or a formula
//! - [`BvExpr`] - the backend-independent formula representation
//! - [`algebra`] - arithmetic, comparison, extraction and sizing operations
//! - [`SymbolFactory`] - allocation of uniquely named fresh symbols
//! - [`merge_values`] - the join applied when two paths are merged
//!
//! # Architecture
//!
//! ```text
//! SymbolFactory ──► SymValue ──► algebra ──► BvExpr::simplify ──► SymValue
//!                                                 │
//!                                                 └──► solver (via BvExpr)
//! ```
//!
//! Every value leaving this module is simplified. Downstream code compares
//! values structurally, so the canonical form produced by
//! [`BvExpr::simplify`] is part of the contract rather than an optimization.
//!
//! # Usage
//!
//! ```rust
//! use concolic_sym::symbolic::{algebra, SymValue, SymbolFactory};
//!
//! let mut factory = SymbolFactory::new(64);
//! let rax = factory.new_value();
//! let eax = algebra::truncate_to(&rax, 32)?;
//! let zf = algebra::equal(&eax, &SymValue::concrete(0u32, 32))?;
//! assert_eq!(zf.width(), 1);
//! # Ok::<(), concolic_sym::Error>(())
//! ```

pub mod algebra;
mod expr;
mod factory;
mod merge;
mod ops;
mod simplify;
mod value;

pub use algebra::Relation;
pub use expr::{BvExpr, Declaration};
pub use factory::{
    counter_name, SymbolFactory, BOTTOM_SYMBOL, GENERAL_PREFIX, GENERATED_SIGIL, MEMORY_PREFIX,
    OUTPUT_STREAM_SYMBOL, SEGMENT_PREFIX, SKIPPED_COUNTER, TERM_ADDRESS_SYMBOL,
};
pub use merge::merge_values;
pub use ops::{BinaryOp, CmpOp, UnaryOp};
pub use value::SymValue;
