//! Fresh symbol allocation.
//!
//! The [`SymbolFactory`] hands out the unknowns the interpreter introduces:
//! unconstrained registers, unread memory cells, words written to the output
//! stream and segment pseudo-registers. It owns three independent counters so
//! that names of different origin can never collide.
//!
//! # Naming
//!
//! | Origin | Name | Counter |
//! |--------|------|---------|
//! | general | `v#a`, `v#b`, ..., `v#z`, `v#aa`, ... (`v#x` is never produced) | general |
//! | memory | `m#a`, `m#b`, ... | memory |
//! | output stream | `#stdout + N` (an expression, not a name) | output |
//! | segment | `_<name>` | none |
//! | named | `<name>` | none |
//! | terminal address | `x` | none |
//! | bottom | `Bottom` | none |
//!
//! Every generated name contains [`GENERATED_SIGIL`], and caller-supplied
//! segment and named symbols must not, so a caller can never obtain a symbol
//! that aliases a counter-derived one (for instance a register called `rax`
//! and the 12217th general symbol).
//!
//! With [`SymbolFactory::with_namespace`] every counter-derived name and the
//! output-stream root gain a `<ns>:` prefix, so factories owned by parallel
//! workers never hand out the same symbol.

use log::trace;

use crate::{
    config::EngineConfig,
    Error, Result,
    symbolic::{
        expr::BvExpr,
        ops::BinaryOp,
        simplify::simplify_binary,
        value::SymValue,
    },
};

/// Name of the symbol marking a terminal (exit) address.
pub const TERM_ADDRESS_SYMBOL: &str = "x";

/// Name of the symbol standing for an undefined value.
pub const BOTTOM_SYMBOL: &str = "Bottom";

/// Character reserved for generated names.
pub const GENERATED_SIGIL: char = '#';

/// Root symbol of the abstract output stream.
pub const OUTPUT_STREAM_SYMBOL: &str = "#stdout";

/// Prefix of general-purpose symbols.
pub const GENERAL_PREFIX: &str = "v#";

/// Prefix of memory-origin symbols.
pub const MEMORY_PREFIX: &str = "m#";

/// Prefix of segment pseudo-register symbols.
pub const SEGMENT_PREFIX: &str = "_";

/// General counter value that is never assigned.
///
/// It is the index whose letters are `x`, the name of
/// [`TERM_ADDRESS_SYMBOL`]. The skip is inherited behaviour; since general
/// names carry [`GENERAL_PREFIX`], nothing depends on it.
pub const SKIPPED_COUNTER: u64 = 23;

/// Renders a counter as bijective base-26 lowercase letters (`0` → `a`,
/// `25` → `z`, `26` → `aa`).
#[must_use]
pub fn counter_name(mut counter: u64) -> String {
    let mut letters = Vec::new();
    loop {
        // `counter % 26` is below 26, so the cast cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        letters.push(char::from(b'a' + (counter % 26) as u8));
        if counter < 26 {
            break;
        }
        counter = counter / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Allocator of fresh symbolic values.
///
/// One factory is owned by each execution context. Counters start at zero and
/// only move forward, except through [`reset`](Self::reset) and
/// [`reset_output_stream`](Self::reset_output_stream).
///
/// # Examples
///
/// ```rust
/// use concolic_sym::symbolic::SymbolFactory;
///
/// let mut factory = SymbolFactory::new(64);
/// assert_eq!(factory.new_value().to_string(), "v#a");
/// assert_eq!(factory.new_memory_value().to_string(), "m#a");
/// assert_eq!(factory.new_value_of(32).width(), 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolFactory {
    width: u32,
    namespace: Option<String>,
    general: u64,
    memory: u64,
    output: u64,
}

impl Default for SymbolFactory {
    fn default() -> Self {
        Self::new(64)
    }
}

impl SymbolFactory {
    /// Creates a factory whose default symbol width is `width` bits.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    #[must_use]
    pub fn new(width: u32) -> Self {
        assert!(width > 0, "bitvector width must be at least 1");
        Self {
            width,
            namespace: None,
            general: 0,
            memory: 0,
            output: 0,
        }
    }

    /// Creates a factory from an engine configuration.
    ///
    /// Uses the configured address width and namespace.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        let factory = Self::new(config.address_width);
        match &config.namespace {
            Some(ns) => factory.with_namespace(ns.clone()),
            None => factory,
        }
    }

    /// Prefixes every counter-derived name and the output-stream root with
    /// `<ns>:`.
    #[must_use]
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = Some(ns.into());
        self
    }

    /// Returns the default symbol width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Returns the namespace, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn qualify(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}:{name}"),
            None => name.to_string(),
        }
    }

    /// Checks that a caller-supplied name stays outside the generated namespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedName`] if `name` contains [`GENERATED_SIGIL`].
    pub fn check_name(name: &str) -> Result<()> {
        if name.contains(GENERATED_SIGIL) {
            return Err(Error::ReservedName(name.to_string()));
        }
        Ok(())
    }

    /// Returns a fresh general-purpose symbol of the default width.
    pub fn new_value(&mut self) -> SymValue {
        self.new_value_of(self.width)
    }

    /// Returns a fresh general-purpose symbol of `width` bits.
    ///
    /// The name is derived from the general counter, which then advances;
    /// counter value [`SKIPPED_COUNTER`] is never used.
    pub fn new_value_of(&mut self, width: u32) -> SymValue {
        if self.general == SKIPPED_COUNTER {
            self.general += 1;
        }
        let name = self.qualify(&format!("{GENERAL_PREFIX}{}", counter_name(self.general)));
        self.general += 1;
        trace!("allocated symbol {name} ({width} bits)");
        SymValue::symbol(name, width)
    }

    /// Returns a fresh memory-cell symbol of the default width.
    pub fn new_memory_value(&mut self) -> SymValue {
        self.new_memory_value_of(self.width)
    }

    /// Returns a fresh memory-cell symbol of `width` bits, named `m#<letters>`.
    pub fn new_memory_value_of(&mut self, width: u32) -> SymValue {
        let name = self.qualify(&format!("{MEMORY_PREFIX}{}", counter_name(self.memory)));
        self.memory += 1;
        trace!("allocated memory symbol {name} ({width} bits)");
        SymValue::symbol(name, width)
    }

    /// Returns the next output-stream word of the default width.
    pub fn new_output_value(&mut self) -> SymValue {
        self.new_output_value_of(self.width)
    }

    /// Returns the next output-stream word of `width` bits: `#stdout + N`.
    pub fn new_output_value_of(&mut self, width: u32) -> SymValue {
        let root = BvExpr::symbol(self.qualify(OUTPUT_STREAM_SYMBOL), width);
        let offset = BvExpr::constant(self.output, width);
        self.output += 1;
        let value = SymValue::from_simplified(simplify_binary(BinaryOp::Add, root, offset));
        trace!("allocated output word {value} ({width} bits)");
        value
    }

    /// Returns the segment pseudo-register symbol `_<name>` of the default width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedName`] if `name` contains [`GENERATED_SIGIL`].
    pub fn new_segment_value(&self, name: &str) -> Result<SymValue> {
        self.new_segment_value_of(name, self.width)
    }

    /// Returns the segment pseudo-register symbol `_<name>` of `width` bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedName`] if `name` contains [`GENERATED_SIGIL`].
    pub fn new_segment_value_of(&self, name: &str, width: u32) -> Result<SymValue> {
        Self::check_name(name)?;
        Ok(SymValue::symbol(format!("{SEGMENT_PREFIX}{name}"), width))
    }

    /// Returns a symbol named exactly `name` of the default width.
    ///
    /// Uniqueness among named symbols is the caller's responsibility; they
    /// never alias generated ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedName`] if `name` contains [`GENERATED_SIGIL`].
    pub fn new_named_value(&self, name: &str) -> Result<SymValue> {
        self.new_named_value_of(name, self.width)
    }

    /// Returns a symbol named exactly `name` of `width` bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedName`] if `name` contains [`GENERATED_SIGIL`].
    pub fn new_named_value_of(&self, name: &str, width: u32) -> Result<SymValue> {
        Self::check_name(name)?;
        Ok(SymValue::symbol(name, width))
    }

    /// Resets the general and memory counters to zero.
    ///
    /// The output counter keeps running so that words written to the output
    /// stream stay distinct across resets; see
    /// [`reset_output_stream`](Self::reset_output_stream).
    pub fn reset(&mut self) {
        self.general = 0;
        self.memory = 0;
    }

    /// Resets the output-stream counter to zero.
    pub fn reset_output_stream(&mut self) {
        self.output = 0;
    }

    /// Returns the current (general, memory, output) counter values.
    #[must_use]
    pub const fn counters(&self) -> (u64, u64, u64) {
        (self.general, self.memory, self.output)
    }

    /// Returns the terminal-address symbol `x` of `width` bits.
    #[must_use]
    pub fn term_address(width: u32) -> SymValue {
        SymValue::symbol(TERM_ADDRESS_SYMBOL, width)
    }

    /// Checks if `value` is the terminal-address symbol.
    #[must_use]
    pub fn is_term_address(value: &SymValue) -> bool {
        value.symbol_name() == Some(TERM_ADDRESS_SYMBOL)
    }

    /// Returns the undefined-value symbol `Bottom` of `width` bits.
    #[must_use]
    pub fn bottom(width: u32) -> SymValue {
        SymValue::symbol(BOTTOM_SYMBOL, width)
    }

    /// Checks if `value` is the undefined-value symbol.
    #[must_use]
    pub fn is_bottom(value: &SymValue) -> bool {
        value.symbol_name() == Some(BOTTOM_SYMBOL)
    }
}
