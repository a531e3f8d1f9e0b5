//! Engine configuration.
//!
//! [`EngineConfig`] gathers the few knobs the engine has: the native address
//! width, the default bound on model enumeration, the heap and stack bounds
//! used by the memory-region classifier, the solver timeout and an optional
//! symbol namespace for parallel workers.
//!
//! # Configuration Presets
//!
//! - [`EngineConfig::x86_64()`] - 64-bit binaries (the default)
//! - [`EngineConfig::x86()`] - 32-bit binaries
//!
//! # Example
//!
//! ```rust
//! use concolic_sym::{EngineConfig, SymbolFactory};
//!
//! let config = EngineConfig::x86_64()
//!     .with_model_limit(4)
//!     .with_namespace("worker-3");
//! let factory = SymbolFactory::from_config(&config);
//! assert_eq!(factory.width(), 64);
//!
//! // Or customize with struct update syntax
//! let config = EngineConfig {
//!     solver_timeout_ms: 5_000,
//!     ..EngineConfig::x86()
//! };
//! assert_eq!(config.address_width, 32);
//! ```

use std::ops::Range;

/// Lowest heap address of a 64-bit process.
pub const MIN_HEAP_ADDR: u64 = 0x1000_0000;

/// Upper (exclusive) heap bound of a 64-bit process.
pub const MAX_HEAP_ADDR: u64 = 0x7fff_0000_0000;

/// Lowest stack address of a 64-bit process.
pub const MIN_STACK_FRAME_POINTER: u64 = 0x7fff_0000_0000;

/// Upper (exclusive) heap bound of a 32-bit process.
pub const MAX_HEAP_ADDR_32: u64 = 0xbfff_0000;

/// Lowest stack address of a 32-bit process.
pub const MIN_STACK_FRAME_POINTER_32: u64 = 0xbfff_0000;

/// Configuration of the symbolic-value engine.
///
/// # Default Values
///
/// | Setting | Default Value |
/// |---------|---------------|
/// | `address_width` | 64 |
/// | `model_limit` | 10 |
/// | `heap` | `MIN_HEAP_ADDR..MAX_HEAP_ADDR` |
/// | `stack_floor` | `MIN_STACK_FRAME_POINTER` |
/// | `solver_timeout_ms` | 0 (no timeout) |
/// | `namespace` | none |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Native address width in bits; the default width of fresh symbols.
    pub address_width: u32,

    /// Default maximum number of models returned by enumeration.
    ///
    /// Set to 0 for unbounded enumeration.
    pub model_limit: usize,

    /// Half-open heap address range.
    pub heap: Range<u64>,

    /// Lowest address considered part of the stack.
    pub stack_floor: u64,

    /// Per-query solver timeout in milliseconds; 0 disables the timeout.
    ///
    /// A query that times out is reported as
    /// [`Error::SolverUnavailable`](crate::Error::SolverUnavailable).
    pub solver_timeout_ms: u64,

    /// Prefix for counter-derived symbol names, for parallel workers.
    pub namespace: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::x86_64()
    }
}

impl EngineConfig {
    /// Creates the default (x86-64) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for 64-bit binaries.
    #[must_use]
    pub fn x86_64() -> Self {
        Self {
            address_width: 64,
            model_limit: 10,
            heap: MIN_HEAP_ADDR..MAX_HEAP_ADDR,
            stack_floor: MIN_STACK_FRAME_POINTER,
            solver_timeout_ms: 0,
            namespace: None,
        }
    }

    /// Configuration for 32-bit binaries.
    #[must_use]
    pub fn x86() -> Self {
        Self {
            address_width: 32,
            heap: MIN_HEAP_ADDR..MAX_HEAP_ADDR_32,
            stack_floor: MIN_STACK_FRAME_POINTER_32,
            ..Self::x86_64()
        }
    }

    /// Sets the native address width.
    #[must_use]
    pub fn with_address_width(mut self, width: u32) -> Self {
        self.address_width = width;
        self
    }

    /// Sets the default enumeration bound (0 = unbounded).
    #[must_use]
    pub fn with_model_limit(mut self, limit: usize) -> Self {
        self.model_limit = limit;
        self
    }

    /// Sets the heap address range.
    #[must_use]
    pub fn with_heap(mut self, heap: Range<u64>) -> Self {
        self.heap = heap;
        self
    }

    /// Sets the stack floor.
    #[must_use]
    pub fn with_stack_floor(mut self, floor: u64) -> Self {
        self.stack_floor = floor;
        self
    }

    /// Sets the solver timeout in milliseconds (0 = none).
    #[must_use]
    pub fn with_solver_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.solver_timeout_ms = timeout_ms;
        self
    }

    /// Sets the symbol namespace.
    #[must_use]
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = Some(ns.into());
        self
    }
}
