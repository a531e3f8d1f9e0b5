//! # concolic-sym Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the concolic-sym library. Import this module to get quick access to the essential
//! types for building symbolic values and querying the solver.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all concolic-sym operations
pub use crate::Error;

/// The result type used throughout concolic-sym
pub use crate::Result;

/// Engine-wide configuration
pub use crate::config::EngineConfig;

// ================================================================================================
// Symbolic Values
// ================================================================================================

/// Values, expressions and operators
pub use crate::symbolic::{BinaryOp, BvExpr, CmpOp, Declaration, SymValue, UnaryOp};

/// The value algebra and its update relations
pub use crate::symbolic::{algebra, algebra::Relation};

/// Symbol allocation and state merging
pub use crate::symbolic::{merge_values, SymbolFactory};

// ================================================================================================
// Solving
// ================================================================================================

/// Solver facade, backend traits and results
pub use crate::solver::{
    ConstraintSolver, Model, ModelEnumerator, Satisfiability, SolverBackend, SolverSession,
};

/// Z3 backend
#[cfg(feature = "z3")]
pub use crate::solver::Z3Backend;

// ================================================================================================
// Binary Inputs
// ================================================================================================

/// Memory-region classification
pub use crate::memory::{BinaryLayout, MemoryRegion};

/// Predefined external-function constraints
pub use crate::constraints::PredefinedConstraints;
