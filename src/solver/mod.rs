//! Constraint solver facade.
//!
//! The interpreter asks two kinds of questions at branch points and assertion
//! checks: *is this path feasible, and with which inputs?* and *which distinct
//! values can this expression take?*. [`ConstraintSolver`] answers both on top
//! of a pluggable backend:
//!
//! - [`ConstraintSolver::check_satisfiable`] - satisfiability with a witness
//! - [`ConstraintSolver::enumerate_models`] - up to N distinct models, found by
//!   asserting a blocking clause after each one
//! - [`ConstraintSolver::models`] - the same enumeration as a lazy iterator
//!
//! # Backends
//!
//! A backend implements [`SolverBackend`], which opens [`SolverSession`]s. A
//! session is an incremental solver context that lives for the duration of
//! one facade call and is released when dropped, on every exit path. The
//! rest of the crate never sees backend types; formulas cross the boundary as
//! [`BvExpr`] only.
//!
//! With the `z3` feature (enabled by default) the [`Z3Backend`] is available.
//!
//! # Failure Handling
//!
//! Backend errors, timeouts and `unknown` verdicts surface as
//! [`Error::SolverUnavailable`]. No call is retried.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "z3")]
//! # fn main() -> concolic_sym::Result<()> {
//! use concolic_sym::{
//!     solver::{ConstraintSolver, Z3Backend},
//!     symbolic::{algebra, SymValue},
//! };
//!
//! let solver = ConstraintSolver::new(Z3Backend::new());
//! let x = SymValue::symbol("x", 8);
//! let in_range = algebra::compare(
//!     concolic_sym::symbolic::CmpOp::ULt,
//!     &x,
//!     &SymValue::concrete(2u32, 8),
//! )?;
//!
//! let models = solver.enumerate_models(&[in_range], 5)?;
//! assert_eq!(models.len(), 2);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "z3"))]
//! # fn main() {}
//! ```

mod model;
#[cfg(feature = "z3")]
mod z3_backend;

pub use model::Model;
#[cfg(feature = "z3")]
pub use z3_backend::{Z3Backend, Z3Session};

use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    config::EngineConfig,
    symbolic::{BinaryOp, BvExpr, CmpOp, Declaration, SymValue},
    Error, Result,
};

/// Outcome of a satisfiability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Satisfiability {
    /// The constraints hold under the contained assignment.
    Satisfiable(Model),
    /// No assignment satisfies the constraints.
    Unsatisfiable,
}

impl Satisfiability {
    /// Checks if the constraints were satisfiable.
    #[must_use]
    pub const fn is_satisfiable(&self) -> bool {
        matches!(self, Self::Satisfiable(_))
    }

    /// Returns the witness, if satisfiable.
    #[must_use]
    pub const fn model(&self) -> Option<&Model> {
        match self {
            Self::Satisfiable(model) => Some(model),
            Self::Unsatisfiable => None,
        }
    }

    /// Consumes the outcome, returning the witness if satisfiable.
    #[must_use]
    pub fn into_model(self) -> Option<Model> {
        match self {
            Self::Satisfiable(model) => Some(model),
            Self::Unsatisfiable => None,
        }
    }
}

/// A solver that can open incremental sessions.
pub trait SolverBackend {
    /// The session type; may borrow from the backend.
    type Session<'a>: SolverSession
    where
        Self: 'a;

    /// Returns a short name for logging.
    fn name(&self) -> &'static str;

    /// Opens a fresh session with no assertions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SolverUnavailable`] if the backend cannot create one.
    fn open_session(&self) -> Result<Self::Session<'_>>;
}

/// An incremental solver context.
///
/// Assertions accumulate until the session is dropped.
pub trait SolverSession {
    /// Adds a 1-bit predicate that must hold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SolverUnavailable`] if the backend rejects the term.
    fn assert(&mut self, predicate: &BvExpr) -> Result<()>;

    /// Decides the conjunction of all assertions so far.
    ///
    /// # Arguments
    ///
    /// * `declarations` - The free names of the asserted formulas. A
    ///   satisfying model assigns every [`Declaration::Constant`] among them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SolverUnavailable`] on backend failure, timeout or an
    /// `unknown` verdict.
    fn check(&mut self, declarations: &[Declaration]) -> Result<Satisfiability>;
}

/// Satisfiability and model enumeration over a [`SolverBackend`].
#[derive(Debug, Clone)]
pub struct ConstraintSolver<B> {
    backend: B,
    model_limit: usize,
}

impl<B: SolverBackend> ConstraintSolver<B> {
    /// Creates a facade with the default model limit of 10.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, &EngineConfig::default())
    }

    /// Creates a facade using the model limit of `config`.
    #[must_use]
    pub fn with_config(backend: B, config: &EngineConfig) -> Self {
        Self {
            backend,
            model_limit: config.model_limit,
        }
    }

    /// Returns the backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the default enumeration bound used by [`enumerate`](Self::enumerate).
    #[must_use]
    pub const fn model_limit(&self) -> usize {
        self.model_limit
    }

    /// Decides whether all `predicates` can hold at once.
    ///
    /// # Arguments
    ///
    /// * `predicates` - 1-bit values, all required to be 1.
    ///
    /// # Returns
    ///
    /// [`Satisfiability::Satisfiable`] with a witness assigning every symbol
    /// the predicates mention, or [`Satisfiability::Unsatisfiable`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if a predicate is not 1 bit wide or a
    /// name is used at two widths, [`Error::UnsupportedFeature`] if a name is
    /// used with two sorts of one width, or [`Error::SolverUnavailable`] if
    /// the backend fails to decide.
    pub fn check_satisfiable(&self, predicates: &[SymValue]) -> Result<Satisfiability> {
        let (mut session, declarations) = self.prepare(predicates)?;
        let outcome = session.check(&declarations)?;
        debug!(
            "{}: {} predicates over {} symbols are {}",
            self.backend.name(),
            predicates.len(),
            declarations.len(),
            if outcome.is_satisfiable() {
                "satisfiable"
            } else {
                "unsatisfiable"
            }
        );
        Ok(outcome)
    }

    /// Returns up to `max_count` distinct models of `predicates`.
    ///
    /// After each model a blocking clause `OR(symbol_i != value_i)` is
    /// asserted, so every model differs from all earlier ones in at least one
    /// symbol. Enumeration stops at `max_count` models (`0` = unbounded) or
    /// when the constraints become unsatisfiable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFeature`] if the predicates are satisfiable
    /// and mention an uninterpreted function or array, plus the errors of
    /// [`check_satisfiable`](Self::check_satisfiable).
    pub fn enumerate_models(&self, predicates: &[SymValue], max_count: usize) -> Result<Vec<Model>> {
        self.models(predicates, max_count)?.collect()
    }

    /// [`enumerate_models`](Self::enumerate_models) bounded by the configured
    /// model limit.
    ///
    /// # Errors
    ///
    /// See [`enumerate_models`](Self::enumerate_models).
    pub fn enumerate(&self, predicates: &[SymValue]) -> Result<Vec<Model>> {
        self.enumerate_models(predicates, self.model_limit)
    }

    /// Lazily enumerates up to `max_count` distinct models (`0` = unbounded).
    ///
    /// The iterator owns one session, released when the iterator is dropped.
    /// It yields at most one `Err`, after which it is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] for a non-predicate, or
    /// [`Error::SolverUnavailable`] if no session can be opened.
    pub fn models(&self, predicates: &[SymValue], max_count: usize) -> Result<ModelEnumerator<'_, B>> {
        let (session, declarations) = self.prepare(predicates)?;
        debug!(
            "{}: enumerating up to {} models over {} symbols",
            self.backend.name(),
            max_count,
            declarations.len()
        );
        Ok(ModelEnumerator {
            session,
            declarations,
            remaining: (max_count > 0).then_some(max_count),
            done: false,
        })
    }

    fn prepare(&self, predicates: &[SymValue]) -> Result<(B::Session<'_>, Vec<Declaration>)> {
        let mut exprs = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            if predicate.width() != 1 {
                return Err(Error::WidthMismatch {
                    expected: 1,
                    found: predicate.width(),
                });
            }
            // Literal true adds nothing
            if predicate.as_u64() != Some(1) {
                exprs.push(predicate.to_expr());
            }
        }

        let declarations = collect_declarations(&exprs)?;
        let mut session = self.backend.open_session()?;
        for expr in &exprs {
            session.assert(expr)?;
        }
        Ok((session, declarations))
    }
}

/// Merges the declarations of all predicates, one per name.
///
/// A name used with two different sorts would leave one of them out of the
/// model and the blocking clause, so it is rejected.
fn collect_declarations(exprs: &[BvExpr]) -> Result<Vec<Declaration>> {
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut declarations: Vec<Declaration> = Vec::new();
    for expr in exprs {
        for declaration in expr.declarations() {
            match by_name.get(declaration.name()) {
                None => {
                    by_name.insert(declaration.name().to_string(), declarations.len());
                    declarations.push(declaration);
                }
                Some(&index) if declarations[index] == declaration => {}
                Some(&index) => {
                    let first = &declarations[index];
                    warn!(
                        "`{}` is declared as both {first:?} and {declaration:?}",
                        declaration.name()
                    );
                    if first.width() != declaration.width() {
                        return Err(Error::WidthMismatch {
                            expected: first.width(),
                            found: declaration.width(),
                        });
                    }
                    return Err(Error::UnsupportedFeature(format!(
                        "`{}` used with two different sorts",
                        declaration.name()
                    )));
                }
            }
        }
    }
    Ok(declarations)
}

/// Lazy model enumeration, created by [`ConstraintSolver::models`].
pub struct ModelEnumerator<'a, B: SolverBackend + 'a> {
    session: B::Session<'a>,
    declarations: Vec<Declaration>,
    remaining: Option<usize>,
    done: bool,
}

impl<B: SolverBackend> ModelEnumerator<'_, B> {
    fn blocking_clause(&self, model: &Model) -> BvExpr {
        let clause = self
            .declarations
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::Constant { name, width } => model.get(name).map(|value| {
                    BvExpr::compare(
                        CmpOp::Ne,
                        BvExpr::symbol(name.clone(), *width),
                        value.to_expr(),
                    )
                }),
                _ => None,
            })
            .reduce(|acc, differs| BvExpr::binary(BinaryOp::Or, acc, differs));
        clause.unwrap_or_else(|| BvExpr::boolean(false))
    }

    fn advance(&mut self) -> Result<Option<Model>> {
        let Satisfiability::Satisfiable(model) = self.session.check(&self.declarations)? else {
            return Ok(None);
        };

        if let Some(declaration) = self.declarations.iter().find(|d| !d.is_constant()) {
            let kind = match declaration {
                Declaration::Function { .. } => "uninterpreted function",
                _ => "array",
            };
            warn!(
                "refusing to enumerate models over {kind} `{}`",
                declaration.name()
            );
            return Err(Error::UnsupportedFeature(format!(
                "model enumeration over {kind} `{}`",
                declaration.name()
            )));
        }

        let clause = self.blocking_clause(&model);
        self.session.assert(&clause)?;
        debug!("enumerated model {{{model}}}");
        Ok(Some(model))
    }
}

impl<B: SolverBackend> Iterator for ModelEnumerator<'_, B> {
    type Item = Result<Model>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.remaining == Some(0) {
            return None;
        }
        match self.advance() {
            Ok(Some(model)) => {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                Some(Ok(model))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        solver::{ConstraintSolver, Satisfiability},
        symbolic::{algebra, BvExpr, CmpOp, SymValue},
        test::{ExhaustiveBackend, UnavailableBackend},
        EngineConfig, Error,
    };

    fn c(value: u64) -> SymValue {
        SymValue::concrete(value, 8)
    }

    #[test]
    fn test_check_satisfiable_with_witness() {
        let solver = ConstraintSolver::new(ExhaustiveBackend::default());
        let x = SymValue::symbol("x", 8);
        let p = algebra::equal(&algebra::add(&x, &c(3)).unwrap(), &c(10)).unwrap();
        let outcome = solver.check_satisfiable(&[p]).unwrap();
        let model = outcome.model().unwrap();
        assert_eq!(model.get("x"), Some(&c(7)));
    }

    #[test]
    fn test_check_unsatisfiable() {
        let solver = ConstraintSolver::new(ExhaustiveBackend::default());
        let x = SymValue::symbol("x", 8);
        let p = algebra::compare(CmpOp::ULt, &x, &c(4)).unwrap();
        let q = algebra::compare(CmpOp::UGt, &x, &c(10)).unwrap();
        assert_eq!(
            solver.check_satisfiable(&[p, q]).unwrap(),
            Satisfiability::Unsatisfiable
        );
        assert_eq!(
            solver.check_satisfiable(&[SymValue::boolean(false)]).unwrap(),
            Satisfiability::Unsatisfiable
        );
    }

    #[test]
    fn test_empty_conjunction_is_satisfiable() {
        let solver = ConstraintSolver::new(ExhaustiveBackend::default());
        let outcome = solver.check_satisfiable(&[]).unwrap();
        assert_eq!(outcome.into_model().map(|m| m.len()), Some(0));
    }

    #[test]
    fn test_non_predicate_rejected() {
        let solver = ConstraintSolver::new(ExhaustiveBackend::default());
        assert!(matches!(
            solver.check_satisfiable(&[c(1)]),
            Err(Error::WidthMismatch {
                expected: 1,
                found: 8
            })
        ));
    }

    #[test]
    fn test_name_with_two_sorts_rejected() {
        let solver = ConstraintSolver::new(ExhaustiveBackend::default());
        let narrow = algebra::equal(&SymValue::symbol("x", 8), &c(1)).unwrap();
        let wide = algebra::equal(
            &SymValue::symbol("x", 16),
            &SymValue::concrete(2u32, 16),
        )
        .unwrap();
        assert!(matches!(
            solver.check_satisfiable(&[narrow.clone(), wide]),
            Err(Error::WidthMismatch {
                expected: 8,
                found: 16
            })
        ));

        let f = SymValue::from_expr(&BvExpr::apply("x", vec![c(0).to_expr()], 8));
        let applied = algebra::equal(&f, &c(3)).unwrap();
        assert!(matches!(
            solver.enumerate_models(&[narrow.clone(), applied], 4),
            Err(Error::UnsupportedFeature(_))
        ));

        // The same symbol twice is one declaration
        let again = algebra::compare(CmpOp::ULt, &SymValue::symbol("x", 8), &c(4)).unwrap();
        let models = solver.enumerate_models(&[narrow, again], 4).unwrap();
        assert_eq!(models.len(), 1);
    }

    #[test]
    fn test_enumeration_stops_at_unsat() {
        let solver = ConstraintSolver::new(ExhaustiveBackend::default());
        let x = SymValue::symbol("x", 8);
        let p = algebra::compare(CmpOp::ULt, &x, &c(2)).unwrap();
        let models = solver.enumerate_models(&[p], 5).unwrap();
        assert_eq!(models.len(), 2);
        assert_ne!(models[0], models[1]);
    }

    #[test]
    fn test_enumeration_bounded() {
        let solver = ConstraintSolver::new(ExhaustiveBackend::default());
        let x = SymValue::symbol("x", 8);
        let p = algebra::compare(CmpOp::ULt, &x, &c(100)).unwrap();
        assert_eq!(solver.enumerate_models(&[p.clone()], 3).unwrap().len(), 3);

        let limited = ConstraintSolver::with_config(
            ExhaustiveBackend::default(),
            &EngineConfig::default().with_model_limit(4),
        );
        assert_eq!(limited.enumerate(&[p.clone()]).unwrap().len(), 4);
        assert_eq!(solver.enumerate_models(&[p], 0).unwrap().len(), 100);
    }

    #[test]
    fn test_enumeration_without_symbols_yields_one_model() {
        let solver = ConstraintSolver::new(ExhaustiveBackend::default());
        let models = solver.enumerate_models(&[SymValue::boolean(true)], 5).unwrap();
        assert_eq!(models.len(), 1);
        assert!(models[0].is_empty());
    }

    #[test]
    fn test_enumeration_rejects_uninterpreted_functions() {
        let solver = ConstraintSolver::new(ExhaustiveBackend::default());
        let f = SymValue::from_expr(&BvExpr::apply("f", vec![BvExpr::symbol("a", 4)], 4));
        let p = algebra::equal(&f, &SymValue::concrete(0u32, 4)).unwrap();
        assert!(matches!(
            solver.enumerate_models(&[p.clone()], 5),
            Err(Error::UnsupportedFeature(_))
        ));

        // Plain satisfiability is fine
        assert!(solver.check_satisfiable(&[p]).unwrap().is_satisfiable());
    }

    #[test]
    fn test_unsat_with_arrays_is_not_an_error() {
        let solver = ConstraintSolver::new(ExhaustiveBackend::default());
        let read = SymValue::from_expr(&BvExpr::select("mem", BvExpr::symbol("p", 4), 4));
        let p = algebra::equal(&read, &SymValue::concrete(0u32, 4)).unwrap();
        let q = algebra::not_equal(&read, &SymValue::concrete(0u32, 4)).unwrap();
        assert!(solver.enumerate_models(&[p, q], 5).unwrap().is_empty());
    }

    #[test]
    fn test_iterator_is_lazy_and_fused_after_error() {
        let solver = ConstraintSolver::new(UnavailableBackend);
        let x = SymValue::symbol("x", 8);
        let p = algebra::equal(&x, &c(1)).unwrap();
        let mut models = solver.models(&[p], 0).unwrap();
        assert!(matches!(models.next(), Some(Err(Error::SolverUnavailable(_)))));
        assert!(models.next().is_none());
    }

    #[test]
    fn test_solver_failure_propagates() {
        let solver = ConstraintSolver::new(UnavailableBackend);
        let x = SymValue::symbol("x", 8);
        let p = algebra::equal(&x, &c(1)).unwrap();
        assert!(matches!(
            solver.check_satisfiable(&[p]),
            Err(Error::SolverUnavailable(_))
        ));
    }
}
