//! Join of symbolic values at control-flow merge points.
//!
//! When the exploration scheduler unions two execution states, every storage
//! location holding different values on the two paths is joined with
//! [`merge_values`]. The join is coarse. A symbolic value is kept as is. A
//! concrete value is kept only if it is a known instruction address or agrees
//! on both paths; otherwise it widens to a fresh unconstrained symbol. The
//! merged state over-approximates both paths.

use std::{collections::HashSet, hash::BuildHasher};

use log::trace;
use num_traits::ToPrimitive;

use crate::symbolic::{factory::SymbolFactory, value::SymValue};

/// Joins the values `lhs` and `rhs` that one location holds on two paths.
///
/// # Arguments
///
/// * `lhs` - The value on the already-explored path.
/// * `rhs` - The value on the incoming path.
/// * `instantiated` - Concrete addresses known to be instruction addresses.
/// * `factory` - Source of the fresh symbol used when widening.
///
/// # Returns
///
/// 1. `rhs` if it is symbolic.
/// 2. `rhs` if it is concrete and its value is in `instantiated`.
/// 3. `rhs` if `lhs` is concrete and equal to it.
/// 4. Otherwise a fresh general symbol of `rhs`'s width.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashSet;
/// use concolic_sym::symbolic::{merge_values, SymValue, SymbolFactory};
///
/// let mut factory = SymbolFactory::new(64);
/// let instantiated = HashSet::from([0x401000u64]);
///
/// let a = SymValue::concrete(5u32, 64);
/// let b = SymValue::concrete(7u32, 64);
/// let merged = merge_values(&a, &b, &instantiated, &mut factory);
/// assert!(merged.is_symbolic());
/// ```
pub fn merge_values<S: BuildHasher>(
    lhs: &SymValue,
    rhs: &SymValue,
    instantiated: &HashSet<u64, S>,
    factory: &mut SymbolFactory,
) -> SymValue {
    let SymValue::Concrete { value, width } = rhs else {
        return rhs.clone();
    };

    if value.to_u64().is_some_and(|addr| instantiated.contains(&addr)) {
        return rhs.clone();
    }

    if let SymValue::Concrete { value: lhs_value, .. } = lhs {
        if lhs_value == value {
            return rhs.clone();
        }
    }

    let fresh = factory.new_value_of(*width);
    trace!("widened {lhs} / {rhs} to {fresh}");
    fresh
}
