//! Engine integration tests.
//!
//! These tests exercise the public API the way an instruction interpreter
//! does:
//! 1. Allocate symbols for unknown inputs
//! 2. Compute register and flag values through the algebra
//! 3. Merge diverging states
//! 4. Ask a solver for feasible inputs through a custom backend
//! 5. Load predefined constraints for unmodelled calls

use std::collections::{HashMap, HashSet};

use num_bigint::BigUint;
use num_traits::One;

use concolic_sym::{
    prelude::*,
    symbolic::{BOTTOM_SYMBOL, OUTPUT_STREAM_SYMBOL, TERM_ADDRESS_SYMBOL},
};

/// Brute-force backend over at most 12 bits of symbolic input, enough to show
/// that the facade works with any `SolverBackend`.
struct BruteForce;

struct BruteForceSession {
    assertions: Vec<BvExpr>,
}

impl SolverBackend for BruteForce {
    type Session<'a> = BruteForceSession;

    fn name(&self) -> &'static str {
        "brute-force"
    }

    fn open_session(&self) -> Result<Self::Session<'_>> {
        Ok(BruteForceSession {
            assertions: Vec::new(),
        })
    }
}

impl SolverSession for BruteForceSession {
    fn assert(&mut self, predicate: &BvExpr) -> Result<()> {
        self.assertions.push(predicate.clone());
        Ok(())
    }

    fn check(&mut self, declarations: &[Declaration]) -> Result<Satisfiability> {
        let constants: Vec<(&str, u32)> = declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::Constant { name, width } => Some((name.as_ref(), *width)),
                _ => None,
            })
            .collect();
        let total: u32 = constants.iter().map(|(_, w)| w).sum();
        if total > 12 {
            return Err(Error::SolverUnavailable("search space too large".into()));
        }

        for candidate in 0u64..(1 << total) {
            let mut bindings = HashMap::new();
            let mut shift = 0;
            for (name, width) in &constants {
                let value = (candidate >> shift) & ((1 << width) - 1);
                bindings.insert((*name).to_string(), BigUint::from(value));
                shift += width;
            }
            let holds = self.assertions.iter().all(|assertion| {
                assertion
                    .evaluate(&bindings)
                    .is_some_and(|value| value.is_one())
            });
            if holds {
                let mut model = Model::new();
                for (name, width) in &constants {
                    model.insert(*name, SymValue::concrete(bindings[*name].clone(), *width));
                }
                return Ok(Satisfiability::Satisfiable(model));
            }
        }
        Ok(Satisfiability::Unsatisfiable)
    }
}

fn c(value: u64, width: u32) -> SymValue {
    SymValue::concrete(value, width)
}

#[test]
fn test_concrete_arithmetic_wraps() -> Result<()> {
    let pairs = [(0u64, 1u64), (0xff, 1), (0x80, 0x80), (0x7f, 0xff), (3, 200)];
    for (a, b) in pairs {
        let sum = algebra::add(&c(a, 8), &c(b, 8))?;
        let diff = algebra::sub(&c(a, 8), &c(b, 8))?;
        assert_eq!(sum.as_u64(), Some(u64::from((a as u8).wrapping_add(b as u8))));
        assert_eq!(diff.as_u64(), Some(u64::from((a as u8).wrapping_sub(b as u8))));
    }

    let max = c(u64::MAX, 64);
    assert_eq!(algebra::add(&max, &c(1, 64))?.as_u64(), Some(0));
    assert_eq!(algebra::sub(&c(0, 64), &c(1, 64))?.as_u64(), Some(u64::MAX));
    Ok(())
}

#[test]
fn test_single_bit_extraction_roundtrip() -> Result<()> {
    let mut symbols = SymbolFactory::new(32);
    let x = symbols.new_value();
    let y = symbols.new_value_of(16);

    let values = [
        x.clone(),
        algebra::add(&x, &c(0x40, 32))?,
        algebra::zero_extend(&y, 16)?,
        algebra::sign_extend(&y, 16)?,
        algebra::concat(&[y.clone(), algebra::lower_half(&x)?])?,
        c(0xdead_beef, 32),
    ];
    for value in values {
        let bits: Vec<SymValue> = (0..32)
            .rev()
            .map(|i| algebra::bit_at(&value, i))
            .collect::<Result<_>>()?;
        assert_eq!(algebra::concat(&bits)?, value, "roundtrip of {value}");
    }
    Ok(())
}

#[test]
fn test_symbol_uniqueness_and_reset() {
    let mut symbols = SymbolFactory::new(64);
    let first: Vec<SymValue> = (0..100).map(|_| symbols.new_value()).collect();
    let memory: Vec<SymValue> = (0..30).map(|_| symbols.new_memory_value()).collect();

    let mut names = HashSet::new();
    for value in first.iter().chain(&memory) {
        assert!(names.insert(value.symbol_name().unwrap().to_string()));
    }
    assert!(!names.contains(TERM_ADDRESS_SYMBOL));
    assert!(!names.contains(BOTTOM_SYMBOL));
    assert!(!names.contains(OUTPUT_STREAM_SYMBOL));

    symbols.reset();
    let again: Vec<SymValue> = (0..100).map(|_| symbols.new_value()).collect();
    assert_eq!(first, again);
}

#[test]
fn test_register_names_never_alias_fresh_symbols() -> Result<()> {
    let mut symbols = SymbolFactory::new(64);
    let registers = ["rax", "rbx", "rcx", "rdx", "rsi", "rdi", "rsp", "rbp", "stdout"];
    let named = registers
        .iter()
        .map(|name| symbols.new_named_value(name))
        .collect::<Result<HashSet<_>>>()?;
    let stream = symbols.new_output_value();

    // Walks past the letters of every register above (`rsp` is the last)
    for _ in 0..13_000 {
        let fresh = symbols.new_value();
        assert!(!named.contains(&fresh), "{fresh} aliases a register");
        assert_ne!(fresh, stream);
    }
    assert!(matches!(
        symbols.new_named_value("v#rax"),
        Err(Error::ReservedName(_))
    ));
    Ok(())
}

#[test]
fn test_flag_computation() -> Result<()> {
    // cmp al, 0x10 ; jb
    let al = SymValue::symbol("al", 8);
    let diff = algebra::sub(&al, &c(0x10, 8))?;
    let zf = algebra::equal(&diff, &c(0, 8))?;
    let sf = algebra::most_significant_bit(&diff);
    let cf = algebra::compare(CmpOp::ULt, &al, &c(0x10, 8))?;
    let pf = algebra::xnor_reduce(&algebra::extract(&diff, 7, 0)?);
    for flag in [&zf, &sf, &cf, &pf] {
        assert_eq!(flag.width(), 1);
    }

    // Every flag agrees with the concrete computation once `al` is bound
    for al_value in [0u64, 0x0f, 0x10, 0x11, 0x90] {
        let bound = |flag: &SymValue| {
            algebra::substitute(flag, &al, &c(al_value, 8)).map(|v| v.as_u64())
        };
        let d = (al_value as u8).wrapping_sub(0x10);
        assert_eq!(bound(&zf)?, Some(u64::from(d == 0)));
        assert_eq!(bound(&sf)?, Some(u64::from(d >> 7)));
        assert_eq!(bound(&cf)?, Some(u64::from(al_value < 0x10)));
        assert_eq!(bound(&pf)?, Some(u64::from(d.count_ones() % 2 == 0)));
    }
    Ok(())
}

#[test]
fn test_merge_cases() {
    let mut symbols = SymbolFactory::new(64);
    let instantiated = HashSet::from([0x40_1000u64]);
    let s = SymValue::symbol("s", 64);

    // Symbolic incoming value is kept
    assert_eq!(merge_values(&c(1, 64), &s, &instantiated, &mut symbols), s);
    // Known instruction address is kept
    let target = c(0x40_1000, 64);
    assert_eq!(
        merge_values(&c(0x40_2000, 64), &target, &instantiated, &mut symbols),
        target
    );
    // Agreement is kept
    assert_eq!(
        merge_values(&c(5, 64), &c(5, 64), &instantiated, &mut symbols),
        c(5, 64)
    );
    // Disagreement widens
    let widened = merge_values(&c(5, 64), &c(7, 64), &instantiated, &mut symbols);
    assert!(widened.is_symbolic());
    assert_eq!(widened.width(), 64);
    assert_ne!(
        widened,
        merge_values(&c(5, 64), &c(7, 64), &instantiated, &mut symbols)
    );
}

#[test]
fn test_custom_backend_enumeration() -> Result<()> {
    let solver = ConstraintSolver::new(BruteForce);
    let x = SymValue::symbol("x", 8);
    let below_two = algebra::compare(CmpOp::ULt, &x, &c(2, 8))?;

    let models = solver.enumerate_models(&[below_two], 5)?;
    assert_eq!(models.len(), 2);
    let mut values: Vec<u64> = models
        .iter()
        .map(|m| m.get("x").and_then(SymValue::as_u64).unwrap())
        .collect();
    values.sort_unstable();
    assert_eq!(values, [0, 1]);
    Ok(())
}

#[test]
fn test_path_predicate_feasibility() -> Result<()> {
    let solver = ConstraintSolver::new(BruteForce);
    let x = SymValue::symbol("x", 8);

    // if (x + 3 == 10) taken, then `x > 8` is infeasible on this path
    let taken = algebra::equal(&algebra::add(&x, &c(3, 8))?, &c(10, 8))?;
    let path = algebra::combine(Relation::And, &SymValue::boolean(true), &taken)?;
    let witness = solver.check_satisfiable(&[path.clone()])?.into_model().unwrap();
    assert_eq!(witness.get("x"), Some(&c(7, 8)));

    let beyond = algebra::greater(&x, &c(8, 8))?;
    let extended = algebra::combine(Relation::And, &path, &beyond)?;
    assert_eq!(
        solver.check_satisfiable(&[extended])?,
        Satisfiability::Unsatisfiable
    );
    Ok(())
}

#[test]
fn test_predefined_constraints_example() -> Result<()> {
    let constraints = PredefinedConstraints::parse("memcpy x > 0\nmemcpy y < 10\nstrlen z != 0\n")?;
    assert_eq!(constraints.len(), 2);
    assert_eq!(
        constraints.get("memcpy"),
        Some(&["x > 0".to_string(), "y < 10".to_string()][..])
    );
    assert_eq!(constraints.get("strlen"), Some(&["z != 0".to_string()][..]));

    let tabbed = PredefinedConstraints::parse("foo\tx > 3\nfoo y < 2\n")?;
    assert_eq!(
        tabbed.get("foo"),
        Some(&["x > 3".to_string(), "y < 2".to_string()][..])
    );
    Ok(())
}
