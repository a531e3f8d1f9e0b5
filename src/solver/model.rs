//! Satisfying assignments returned by the solver.

use std::{
    collections::{btree_map, BTreeMap, HashMap},
    fmt,
};

use num_bigint::BigUint;

use crate::symbolic::SymValue;

/// A satisfying assignment: symbol name to concrete value.
///
/// Only bitvector constants are assigned; interpretations of uninterpreted
/// functions and arrays are not represented. Entries are kept in name order.
///
/// # Examples
///
/// ```rust
/// use concolic_sym::{solver::Model, symbolic::{algebra, SymValue}};
///
/// let mut model = Model::new();
/// model.insert("a", SymValue::concrete(3u32, 8));
///
/// let a = SymValue::symbol("a", 8);
/// let sum = algebra::add(&a, &SymValue::concrete(1u32, 8))?;
/// assert_eq!(model.evaluate(&sum), Some(SymValue::concrete(4u32, 8)));
/// assert_eq!(model.to_string(), "a: 0x3");
/// # Ok::<(), concolic_sym::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    assignments: BTreeMap<String, SymValue>,
}

impl Model {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `value` to the symbol `name`.
    ///
    /// Backends call this while reading a solver model; `value` is expected to
    /// be concrete.
    pub fn insert(&mut self, name: impl Into<String>, value: SymValue) {
        debug_assert!(value.is_concrete(), "model values must be concrete");
        self.assignments.insert(name.into(), value);
    }

    /// Returns the value assigned to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SymValue> {
        self.assignments.get(name)
    }

    /// Returns the number of assigned symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Checks if no symbol is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Iterates over assignments in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, SymValue> {
        self.assignments.iter()
    }

    /// Evaluates `value` under this assignment.
    ///
    /// # Returns
    ///
    /// The concrete result, or `None` if `value` depends on a symbol the model
    /// does not assign or on an uninterpreted function or array.
    #[must_use]
    pub fn evaluate(&self, value: &SymValue) -> Option<SymValue> {
        match value {
            SymValue::Concrete { .. } => Some(value.clone()),
            SymValue::Expression { width, expr } => {
                let bindings: HashMap<String, BigUint> = self
                    .assignments
                    .iter()
                    .filter_map(|(name, value)| {
                        value.as_biguint().map(|v| (name.clone(), v.clone()))
                    })
                    .collect();
                expr.evaluate(&bindings)
                    .map(|result| SymValue::concrete(result, *width))
            }
        }
    }
}

impl<'a> IntoIterator for &'a Model {
    type Item = (&'a String, &'a SymValue);
    type IntoIter = btree_map::Iter<'a, String, SymValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}
