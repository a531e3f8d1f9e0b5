// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # concolic-sym
//!
//! The symbolic value layer of a concolic (concrete + symbolic) execution
//! engine for binary code. An instruction interpreter walks a binary with
//! registers and memory cells holding either concrete bitvectors or symbolic
//! expressions; this crate supplies everything underneath that interpreter:
//!
//! - **📐 Bitvector algebra** - Width-checked arithmetic, comparisons, bit
//!   slicing and extension over mixed concrete/symbolic operands, with
//!   constant folding and a canonicalizing simplifier
//! - **🏷️ Symbol allocation** - Deterministic fresh names for unknown
//!   inputs, memory cells and output-stream bytes
//! - **🔀 State merging** - Agreement-preserving merge of values from two
//!   execution states
//! - **🧮 Constraint solving** - Satisfiability checks and distinct-model
//!   enumeration over a pluggable SMT backend (Z3 by default)
//! - **🗺️ Memory regions** - Classification of concrete addresses against a
//!   binary's section layout
//! - **📄 Predefined constraints** - Loader for hand-written constraints on
//!   unmodelled library calls
//!
//! ## Quick Start
//!
//! ```rust
//! use concolic_sym::prelude::*;
//!
//! let mut symbols = SymbolFactory::from_config(&EngineConfig::x86_64());
//! let rax = symbols.new_value();
//! assert_eq!(rax.symbol_name(), Some("v#a"));
//!
//! // rax + 8 - 8 folds back to rax
//! let eight = SymValue::concrete(8u32, 64);
//! let back = algebra::sub(&algebra::add(&rax, &eight)?, &eight)?;
//! assert_eq!(back, rax);
//!
//! // Concrete operands fold immediately
//! let sum = algebra::add(&SymValue::concrete(0xffu32, 8), &SymValue::concrete(1u32, 8))?;
//! assert_eq!(sum.as_u64(), Some(0));
//! # Ok::<(), concolic_sym::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`symbolic`] - Values, the expression IR, the algebra, symbol
//!   allocation and merging
//! - [`solver`] - [`ConstraintSolver`](solver::ConstraintSolver) over a
//!   [`SolverBackend`](solver::SolverBackend)
//! - [`memory`] - Binary layout and region predicates
//! - [`constraints`] - [`PredefinedConstraints`] file loader
//! - [`config`] - [`EngineConfig`] shared by all components
//! - [`prelude`] - Convenient re-exports
//!
//! ### Values
//!
//! A [`SymValue`] is either a concrete bitvector or a symbolic expression,
//! and always carries its width. Operations whose operands are all concrete
//! produce concrete results; anything else produces a simplified expression.
//! Booleans are 1-bit values.
//!
//! ### Solving
//!
//! Formulas reach a backend as [`symbolic::BvExpr`] trees; no backend type
//! leaks into the algebra. A backend is any type implementing
//! [`SolverBackend`](solver::SolverBackend), which keeps the facade testable
//! without a native solver.
//!
//! ## Features
//!
//! | Feature      | Default | Description                                 |
//! |--------------|---------|---------------------------------------------|
//! | `z3`         | yes     | Z3 backend, linked against the system `libz3` |
//! | `bundled-z3` | no      | Z3 backend, built from source and linked statically |
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: `trace` for symbol allocation,
//! `debug` for solver queries and loaded inputs, `warn` for refused or
//! undecided solver queries. Install any `log` implementation to see them.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result). Nothing is
//! retried internally:
//!
//! ```rust
//! use concolic_sym::{symbolic::{algebra, SymValue}, Error};
//!
//! let a = SymValue::concrete(1u32, 8);
//! let b = SymValue::concrete(1u32, 16);
//! match algebra::add(&a, &b) {
//!     Err(Error::WidthMismatch { expected, found }) => assert_eq!((expected, found), (8, 16)),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ### Fuzzing
//!
//! ```bash
//! cargo +nightly fuzz run constraints --release
//! ```
//!
//! ### Testing
//!
//! ```bash
//! cargo test
//! cargo test --no-default-features  # without a native solver
//! ```

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// ```rust
/// use concolic_sym::prelude::*;
///
/// let x = SymValue::symbol("x", 32);
/// let p = algebra::compare(CmpOp::ULt, &x, &SymValue::concrete(4u32, 32))?;
/// assert_eq!(p.width(), 1);
/// # Ok::<(), concolic_sym::Error>(())
/// ```
pub mod prelude;

/// Engine-wide configuration.
pub mod config;

/// Predefined constraints for external functions.
pub mod constraints;

/// Address classification against the analyzed binary's layout.
pub mod memory;

/// Satisfiability checking and model enumeration.
pub mod solver;

/// Symbolic bitvector values and operations on them.
pub mod symbolic;

/// `concolic-sym` Result type.
///
/// A type alias for `std::result::Result<T, Error>` where the error type is
/// always [`Error`]. This is used consistently throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// `concolic-sym` Error type.
///
/// Every variant documents the failure category it reports.
pub use error::Error;

pub use config::EngineConfig;
pub use constraints::PredefinedConstraints;
pub use symbolic::{SymValue, SymbolFactory};
