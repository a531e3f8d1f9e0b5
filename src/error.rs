use thiserror::Error;

macro_rules! malformed_config {
    // Single string version
    ($line:expr, $msg:expr) => {
        crate::Error::MalformedConfig {
            line: $line,
            message: $msg.to_string(),
        }
    };

    // Format string with arguments version
    ($line:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::MalformedConfig {
            line: $line,
            message: format!($fmt, $($arg)*),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure is reported to the immediate caller. The engine performs no retry, back-off or
/// fallback of its own; deciding whether a query is worth repeating is left to the exploration
/// scheduler that drives it.
///
/// # Error Categories
///
/// ## Algebra Errors
/// - [`Error::InvalidRange`] - Inverted or out-of-bounds bit/byte extraction indices
/// - [`Error::WidthMismatch`] - Operands of different bit-widths combined
/// - [`Error::Empty`] - Empty operand list (e.g. concatenation of nothing)
///
/// ## Solver Errors
/// - [`Error::UnsupportedFeature`] - Model enumeration over functions or arrays
/// - [`Error::SolverUnavailable`] - Backend failure, timeout or `unknown` verdict
///
/// ## Input Errors
/// - [`Error::MalformedConfig`] - Predefined-constraint line without an expression
/// - [`Error::InvalidLayout`] - Inconsistent binary layout descriptor
/// - [`Error::LayoutAlreadyInstalled`] - Second installation of the process-wide layout
/// - [`Error::ReservedName`] - Caller-supplied symbol name inside the generated namespace
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// # Examples
///
/// ```rust
/// use concolic_sym::{symbolic::{algebra, SymValue}, Error};
///
/// let value = SymValue::concrete(0xffu32, 8);
/// match algebra::extract(&value, 3, 5) {
///     Err(Error::InvalidRange { high, low, width }) => {
///         assert_eq!((high, low, width), (3, 5, 8));
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Algebra errors
    /// A bit or byte range does not fit the value it is applied to.
    ///
    /// Raised when `high < low`, when either index lies outside the operand's
    /// width, or when a halving operation is applied to an odd width.
    #[error("Invalid bit range [{high}:{low}] for a {width}-bit value")]
    InvalidRange {
        /// The requested upper bit index (inclusive)
        high: u32,
        /// The requested lower bit index (inclusive)
        low: u32,
        /// The width of the operand
        width: u32,
    },

    /// Two operands that must share a bit-width do not.
    #[error("Width mismatch - expected {expected} bits, found {found}")]
    WidthMismatch {
        /// The width required by the operation
        expected: u32,
        /// The width that was supplied
        found: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    // Solver errors
    /// The backend produced a model this engine cannot soundly process.
    ///
    /// Model enumeration builds blocking clauses over constant declarations
    /// only; a model that interprets uninterpreted functions or arrays cannot
    /// be excluded that way and is rejected with this error.
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// The solver backend failed to decide a query.
    ///
    /// Covers backend errors, timeouts, resource exhaustion and `unknown`
    /// verdicts. The message carries the backend's own reason when available.
    #[error("Solver unavailable: {0}")]
    SolverUnavailable(String),

    // Input errors
    /// A predefined-constraint line could not be parsed.
    ///
    /// # Fields
    ///
    /// * `line` - 1-based line number in the constraint source
    /// * `message` - Description of what was malformed
    #[error("Malformed constraint config - line {line}: {message}")]
    MalformedConfig {
        /// The 1-based line number of the offending line
        line: usize,
        /// The message to be printed for the MalformedConfig error
        message: String,
    },

    /// The binary layout descriptor is internally inconsistent.
    #[error("Invalid binary layout: {0}")]
    InvalidLayout(String),

    /// The process-wide binary layout has already been installed.
    ///
    /// The layout is immutable once populated; a second loader run must use
    /// its own [`BinaryLayout`](crate::memory::BinaryLayout) value instead.
    #[error("The binary layout has already been installed")]
    LayoutAlreadyInstalled,

    /// A caller-supplied symbol name could alias a generated one.
    ///
    /// Names containing [`GENERATED_SIGIL`](crate::symbolic::GENERATED_SIGIL) are reserved for
    /// symbols allocated from the factory counters and for the output-stream root.
    #[error("Symbol name `{0}` is reserved for generated symbols")]
    ReservedName(String),

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
