//! Z3 backend for the constraint solver facade.
//!
//! Translates [`BvExpr`] trees to Z3's AST and reads models back per
//! declaration. Every session owns a fresh [`z3::Solver`] on the calling
//! thread's Z3 context, so sessions are independent and are released when
//! dropped.
//!
//! Only available when compiled with the `z3` feature (on by default).
//!
//! ## Installation
//!
//! ```bash
//! # Link against the system library
//! apt-get install libz3-dev  # Linux
//! brew install z3            # macOS
//!
//! # Or build Z3 from source
//! cargo build --features bundled-z3
//! ```

use log::{debug, warn};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use z3::{
    ast::{Array, Ast, Bool, BV},
    FuncDecl, Params, SatResult, Solver, Sort,
};

use crate::{
    config::EngineConfig,
    solver::{Model, Satisfiability, SolverBackend, SolverSession},
    symbolic::{BinaryOp, BvExpr, CmpOp, Declaration, SymValue, UnaryOp},
    Error, Result,
};

/// Z3-based [`SolverBackend`].
///
/// The backend itself is only configuration; Z3 state lives in the sessions
/// it opens.
///
/// # Example
///
/// ```rust,no_run
/// use concolic_sym::{solver::{ConstraintSolver, Z3Backend}, EngineConfig};
///
/// let config = EngineConfig::default().with_solver_timeout_ms(5_000);
/// let solver = ConstraintSolver::with_config(Z3Backend::from_config(&config), &config);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Z3Backend {
    timeout_ms: u64,
}

impl Z3Backend {
    /// Creates a backend without a query timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self { timeout_ms: 0 }
    }

    /// Creates a backend with a per-query timeout in milliseconds (0 = none).
    #[must_use]
    pub const fn with_timeout_ms(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    /// Creates a backend using the solver timeout of `config`.
    #[must_use]
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self::with_timeout_ms(config.solver_timeout_ms)
    }

    /// Returns the per-query timeout in milliseconds (0 = none).
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}

impl SolverBackend for Z3Backend {
    type Session<'a> = Z3Session;

    fn name(&self) -> &'static str {
        "z3"
    }

    fn open_session(&self) -> Result<Self::Session<'_>> {
        let solver = Solver::new();
        if self.timeout_ms > 0 {
            let mut params = Params::new();
            params.set_u32("timeout", u32::try_from(self.timeout_ms).unwrap_or(u32::MAX));
            solver.set_params(&params);
        }
        Ok(Z3Session { solver })
    }
}

/// A Z3 solver holding the assertions of one facade call.
pub struct Z3Session {
    solver: Solver,
}

/// Builds a bitvector literal, in 64-bit chunks above 64 bits.
fn literal(value: &BigUint, width: u32) -> BV {
    if width <= 64 {
        return BV::from_u64(value.to_u64().unwrap_or_default(), width);
    }
    let digits = value.to_u64_digits();
    let digit = |i: u32| digits.get(i as usize).copied().unwrap_or_default();
    let chunks = width.div_ceil(64);
    let mut acc = BV::from_u64(digit(chunks - 1), width - 64 * (chunks - 1));
    for i in (0..chunks - 1).rev() {
        acc = acc.concat(&BV::from_u64(digit(i), 64));
    }
    acc
}

fn bit(value: bool) -> BV {
    BV::from_u64(u64::from(value), 1)
}

/// Translates an expression to Z3's bitvector AST.
fn translate(expr: &BvExpr) -> Result<BV> {
    Ok(match expr {
        BvExpr::Const { value, width } => literal(value, *width),
        BvExpr::Symbol { name, width } => BV::new_const(&**name, *width),
        BvExpr::Unary { op, operand } => {
            let operand = translate(operand)?;
            match op {
                UnaryOp::Not => operand.bvnot(),
                UnaryOp::Neg => operand.bvneg(),
            }
        }
        BvExpr::Binary { op, lhs, rhs } => {
            let left = translate(lhs)?;
            let right = translate(rhs)?;
            match op {
                BinaryOp::Add => left.bvadd(&right),
                BinaryOp::Sub => left.bvsub(&right),
                BinaryOp::Mul => left.bvmul(&right),
                BinaryOp::UDiv => left.bvudiv(&right),
                BinaryOp::URem => left.bvurem(&right),
                BinaryOp::SDiv => left.bvsdiv(&right),
                BinaryOp::SRem => left.bvsrem(&right),
                BinaryOp::And => left.bvand(&right),
                BinaryOp::Or => left.bvor(&right),
                BinaryOp::Xor => left.bvxor(&right),
                BinaryOp::Shl => left.bvshl(&right),
                BinaryOp::LShr => left.bvlshr(&right),
                BinaryOp::AShr => left.bvashr(&right),
            }
        }
        // Comparisons return 1 or 0
        BvExpr::Compare { .. } => translate_bool(expr)?.ite(&bit(true), &bit(false)),
        BvExpr::Extract { high, low, operand } => translate(operand)?.extract(*high, *low),
        BvExpr::Concat(parts) => {
            let mut parts = parts.iter();
            let first = parts.next().ok_or(Error::Empty)?;
            let mut acc = translate(first)?;
            for part in parts {
                acc = acc.concat(&translate(part)?);
            }
            acc
        }
        BvExpr::ZeroExt { bits, operand } => translate(operand)?.zero_ext(*bits),
        BvExpr::SignExt { bits, operand } => translate(operand)?.sign_ext(*bits),
        BvExpr::Apply { func, args, width } => {
            let domain: Vec<Sort> = args.iter().map(|arg| Sort::bitvector(arg.width())).collect();
            let domain: Vec<&Sort> = domain.iter().collect();
            let decl = FuncDecl::new(&**func, &domain, &Sort::bitvector(*width));

            let args = args.iter().map(translate).collect::<Result<Vec<_>>>()?;
            let args: Vec<&dyn Ast> = args.iter().map(|arg| arg as &dyn Ast).collect();
            decl.apply(&args).as_bv().ok_or_else(|| {
                Error::SolverUnavailable(format!("`{func}` did not translate to a bitvector"))
            })?
        }
        BvExpr::Select {
            array,
            index,
            width,
        } => {
            let memory = Array::new_const(
                &**array,
                &Sort::bitvector(index.width()),
                &Sort::bitvector(*width),
            );
            memory.select(&translate(index)?).as_bv().ok_or_else(|| {
                Error::SolverUnavailable(format!("`{array}` read did not translate to a bitvector"))
            })?
        }
    })
}

/// Translates a 1-bit predicate to a Z3 boolean.
///
/// Comparisons and 1-bit connectives map to native Z3 booleans; any other
/// 1-bit term is compared against 1.
fn translate_bool(expr: &BvExpr) -> Result<Bool> {
    Ok(match expr {
        BvExpr::Compare { op, lhs, rhs } => {
            let left = translate(lhs)?;
            let right = translate(rhs)?;
            match op {
                CmpOp::Eq => left.eq(&right),
                CmpOp::Ne => left.eq(&right).not(),
                CmpOp::SLt => left.bvslt(&right),
                CmpOp::SGt => left.bvsgt(&right),
                CmpOp::SLe => left.bvsle(&right),
                CmpOp::SGe => left.bvsge(&right),
                CmpOp::ULt => left.bvult(&right),
                CmpOp::UGt => left.bvugt(&right),
                CmpOp::ULe => left.bvule(&right),
                CmpOp::UGe => left.bvuge(&right),
            }
        }
        BvExpr::Const { value, width: 1 } => Bool::from_bool(value.bit(0)),
        BvExpr::Unary {
            op: UnaryOp::Not,
            operand,
        } if operand.width() == 1 => translate_bool(operand)?.not(),
        BvExpr::Binary {
            op: BinaryOp::And,
            lhs,
            rhs,
        } if lhs.width() == 1 => Bool::and(&[translate_bool(lhs)?, translate_bool(rhs)?]),
        BvExpr::Binary {
            op: BinaryOp::Or,
            lhs,
            rhs,
        } if lhs.width() == 1 => Bool::or(&[translate_bool(lhs)?, translate_bool(rhs)?]),
        other => translate(other)?.eq(&bit(true)),
    })
}

/// Reads the value of constant `name`, in 64-bit chunks above 64 bits.
fn read_value(model: &z3::Model, name: &str, width: u32) -> Result<BigUint> {
    let unreadable = || Error::SolverUnavailable(format!("no model value for `{name}`"));
    let value = model
        .eval(&BV::new_const(name, width), true)
        .ok_or_else(unreadable)?;

    if width <= 64 {
        return value.as_u64().map(BigUint::from).ok_or_else(unreadable);
    }
    let mut result = BigUint::default();
    for low in (0..width).step_by(64) {
        let high = (low + 63).min(width - 1);
        let chunk = value
            .extract(high, low)
            .simplify()
            .as_u64()
            .ok_or_else(unreadable)?;
        result |= BigUint::from(chunk) << low;
    }
    Ok(result)
}

impl SolverSession for Z3Session {
    fn assert(&mut self, predicate: &BvExpr) -> Result<()> {
        self.solver.assert(translate_bool(predicate)?);
        Ok(())
    }

    fn check(&mut self, declarations: &[Declaration]) -> Result<Satisfiability> {
        match self.solver.check() {
            SatResult::Sat => {
                let Some(z3_model) = self.solver.get_model() else {
                    return Err(Error::SolverUnavailable(
                        "sat verdict without a model".to_string(),
                    ));
                };
                let mut model = Model::new();
                for declaration in declarations {
                    if let Declaration::Constant { name, width } = declaration {
                        let value = read_value(&z3_model, name, *width)?;
                        model.insert(&**name, SymValue::concrete(value, *width));
                    }
                }
                debug!("z3: sat with {{{model}}}");
                Ok(Satisfiability::Satisfiable(model))
            }
            SatResult::Unsat => Ok(Satisfiability::Unsatisfiable),
            SatResult::Unknown => {
                let reason = self
                    .solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "unknown".to_string());
                warn!("z3 could not decide the query: {reason}");
                Err(Error::SolverUnavailable(reason))
            }
        }
    }
}
