//! Shared test fixtures.
//!
//! Solver backends that need no native library, so facade behavior can be
//! tested with any feature set.

use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::{
    solver::{Model, Satisfiability, SolverBackend, SolverSession},
    symbolic::{BvExpr, Declaration, SymValue},
    Error, Result,
};

/// Brute-force backend that tries every assignment in increasing order.
///
/// The first declared constant occupies the least significant bits of the
/// search counter. Uninterpreted function applications and array reads are
/// replaced by zero.
#[derive(Debug, Clone)]
pub struct ExhaustiveBackend {
    pub max_bits: u32,
}

impl Default for ExhaustiveBackend {
    fn default() -> Self {
        Self { max_bits: 16 }
    }
}

impl SolverBackend for ExhaustiveBackend {
    type Session<'a> = ExhaustiveSession;

    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn open_session(&self) -> Result<Self::Session<'_>> {
        Ok(ExhaustiveSession {
            max_bits: self.max_bits,
            assertions: Vec::new(),
        })
    }
}

pub struct ExhaustiveSession {
    max_bits: u32,
    assertions: Vec<BvExpr>,
}

impl SolverSession for ExhaustiveSession {
    fn assert(&mut self, predicate: &BvExpr) -> Result<()> {
        self.assertions.push(erase_uninterpreted(predicate));
        Ok(())
    }

    fn check(&mut self, declarations: &[Declaration]) -> Result<Satisfiability> {
        let constants: Vec<(&str, u32)> = declarations
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::Constant { name, width } => Some((name.as_ref(), *width)),
                _ => None,
            })
            .collect();

        let total_bits: u32 = constants.iter().map(|(_, width)| width).sum();
        if total_bits > self.max_bits {
            return Err(Error::SolverUnavailable(format!(
                "search space of {total_bits} bits exceeds {}",
                self.max_bits
            )));
        }

        let mut candidate = BigUint::zero();
        let end = BigUint::one() << total_bits;
        while candidate < end {
            let mut bindings = HashMap::new();
            let mut rest = candidate.clone();
            for (name, width) in &constants {
                let mask = (BigUint::one() << *width) - 1u32;
                bindings.insert((*name).to_string(), &rest & &mask);
                rest >>= *width;
            }

            let mut holds = true;
            for assertion in &self.assertions {
                let value = assertion.evaluate(&bindings).ok_or_else(|| {
                    Error::SolverUnavailable(format!("cannot evaluate `{assertion}`"))
                })?;
                if value.is_zero() {
                    holds = false;
                    break;
                }
            }

            if holds {
                let mut model = Model::new();
                for (name, width) in &constants {
                    model.insert(*name, SymValue::concrete(bindings[*name].clone(), *width));
                }
                return Ok(Satisfiability::Satisfiable(model));
            }
            candidate += 1u32;
        }
        Ok(Satisfiability::Unsatisfiable)
    }
}

fn erase_uninterpreted(expr: &BvExpr) -> BvExpr {
    match expr {
        BvExpr::Apply { width, .. } | BvExpr::Select { width, .. } => BvExpr::zero(*width),
        BvExpr::Const { .. } | BvExpr::Symbol { .. } => expr.clone(),
        BvExpr::Unary { op, operand } => BvExpr::unary(*op, erase_uninterpreted(operand)),
        BvExpr::Binary { op, lhs, rhs } => {
            BvExpr::binary(*op, erase_uninterpreted(lhs), erase_uninterpreted(rhs))
        }
        BvExpr::Compare { op, lhs, rhs } => {
            BvExpr::compare(*op, erase_uninterpreted(lhs), erase_uninterpreted(rhs))
        }
        BvExpr::Extract { high, low, operand } => {
            BvExpr::extract(*high, *low, erase_uninterpreted(operand))
        }
        BvExpr::Concat(parts) => BvExpr::Concat(parts.iter().map(erase_uninterpreted).collect()),
        BvExpr::ZeroExt { bits, operand } => BvExpr::zero_ext(*bits, erase_uninterpreted(operand)),
        BvExpr::SignExt { bits, operand } => BvExpr::sign_ext(*bits, erase_uninterpreted(operand)),
    }
}

/// Backend whose every check fails, as a crashed or timed-out solver would.
#[derive(Debug, Clone, Copy)]
pub struct UnavailableBackend;

impl SolverBackend for UnavailableBackend {
    type Session<'a> = UnavailableBackend;

    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn open_session(&self) -> Result<Self::Session<'_>> {
        Ok(UnavailableBackend)
    }
}

impl SolverSession for UnavailableBackend {
    fn assert(&mut self, _predicate: &BvExpr) -> Result<()> {
        Ok(())
    }

    fn check(&mut self, _declarations: &[Declaration]) -> Result<Satisfiability> {
        Err(Error::SolverUnavailable("backend offline".to_string()))
    }
}
