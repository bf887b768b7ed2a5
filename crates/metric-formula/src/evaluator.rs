//! Formula evaluator
//!
//! Walks a parsed tree against caller-supplied variable values. What happens
//! for a missing variable or a zero divisor is decided by the caller.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use ahash::AHashMap;

use crate::ast::{Expr, Formula, Operator};
use crate::error::{FormulaError, FormulaResult, Phase};
use crate::options::FormulaOptions;
use crate::policy;

/// Source of variable values during evaluation
pub trait VariableSource {
    /// `None` if the name is absent, `Some(None)` if present without a value
    fn lookup(&self, name: &str) -> Option<Option<f64>>;
}

impl<S: BuildHasher> VariableSource for HashMap<String, f64, S> {
    fn lookup(&self, name: &str) -> Option<Option<f64>> {
        self.get(name).map(|value| Some(*value))
    }
}

impl<S: BuildHasher> VariableSource for HashMap<String, Option<f64>, S> {
    fn lookup(&self, name: &str) -> Option<Option<f64>> {
        self.get(name).copied()
    }
}

impl VariableSource for AHashMap<String, f64> {
    fn lookup(&self, name: &str) -> Option<Option<f64>> {
        self.get(name).map(|value| Some(*value))
    }
}

impl VariableSource for AHashMap<String, Option<f64>> {
    fn lookup(&self, name: &str) -> Option<Option<f64>> {
        self.get(name).copied()
    }
}

impl VariableSource for BTreeMap<String, f64> {
    fn lookup(&self, name: &str) -> Option<Option<f64>> {
        self.get(name).map(|value| Some(*value))
    }
}

impl VariableSource for BTreeMap<String, Option<f64>> {
    fn lookup(&self, name: &str) -> Option<Option<f64>> {
        self.get(name).copied()
    }
}

impl<T: VariableSource + ?Sized> VariableSource for &T {
    fn lookup(&self, name: &str) -> Option<Option<f64>> {
        (**self).lookup(name)
    }
}

/// Evaluate a tree; a missing variable is an error and division by zero yields 0
///
/// # Example
/// ```rust
/// use std::collections::HashMap;
/// use metric_formula::{evaluate, parse};
///
/// let formula = parse("(a + b) / b").unwrap();
/// let vars = HashMap::from([("a".to_string(), 1.0), ("b".to_string(), 2.0)]);
/// assert_eq!(evaluate(&formula, &vars).unwrap(), 1.5);
/// ```
pub fn evaluate<V: VariableSource + ?Sized>(expr: &Expr, variables: &V) -> FormulaResult<f64> {
    Evaluator::new().evaluate(expr, variables)
}

/// Evaluate a tree, asking `missing` for variables absent from the mapping
///
/// A `None` from `missing` counts as 0. Division by zero yields 0.
pub fn evaluate_or_else<V, M>(expr: &Expr, variables: &V, missing: M) -> FormulaResult<f64>
where
    V: VariableSource + ?Sized,
    M: FnMut(&str) -> Option<f64>,
{
    Evaluator::new().evaluate_or_else(expr, variables, missing)
}

/// Evaluate a tree with explicit missing-variable and divide-by-zero policies
///
/// `divide_by_zero` receives `(dividend, divisor)` whenever a divisor is zero
/// and its result replaces the quotient.
pub fn evaluate_with<V, M, D>(
    expr: &Expr,
    variables: &V,
    missing: M,
    divide_by_zero: D,
) -> FormulaResult<f64>
where
    V: VariableSource + ?Sized,
    M: FnMut(&str) -> Option<f64>,
    D: FnMut(f64, f64) -> f64,
{
    Evaluator::new().evaluate_with(expr, variables, missing, divide_by_zero)
}

/// Formula evaluator
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    options: FormulaOptions,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FormulaOptions) -> Self {
        Self { options }
    }

    pub fn evaluate<V: VariableSource + ?Sized>(
        &self,
        expr: &Expr,
        variables: &V,
    ) -> FormulaResult<f64> {
        self.eval_node(
            expr,
            variables,
            &mut |name: &str| Err(FormulaError::MissingVariable(name.to_string())),
            &mut policy::zero,
            0,
        )
    }

    pub fn evaluate_or_else<V, M>(&self, expr: &Expr, variables: &V, missing: M) -> FormulaResult<f64>
    where
        V: VariableSource + ?Sized,
        M: FnMut(&str) -> Option<f64>,
    {
        self.evaluate_with(expr, variables, missing, policy::zero)
    }

    pub fn evaluate_with<V, M, D>(
        &self,
        expr: &Expr,
        variables: &V,
        mut missing: M,
        mut divide_by_zero: D,
    ) -> FormulaResult<f64>
    where
        V: VariableSource + ?Sized,
        M: FnMut(&str) -> Option<f64>,
        D: FnMut(f64, f64) -> f64,
    {
        self.eval_node(
            expr,
            variables,
            &mut |name: &str| Ok(missing(name).unwrap_or(0.0)),
            &mut divide_by_zero,
            0,
        )
    }

    fn eval_node<V, M, D>(
        &self,
        expr: &Expr,
        variables: &V,
        missing: &mut M,
        divide_by_zero: &mut D,
        depth: usize,
    ) -> FormulaResult<f64>
    where
        V: VariableSource + ?Sized,
        M: FnMut(&str) -> FormulaResult<f64>,
        D: FnMut(f64, f64) -> f64,
    {
        if depth > self.options.max_depth {
            return Err(FormulaError::RecursionLimit {
                limit: self.options.max_depth,
                phase: Phase::Evaluate,
            });
        }

        match expr {
            Expr::Constant { value, .. } => Ok(*value),

            Expr::Variable(name) => match variables.lookup(name) {
                Some(value) => Ok(value.unwrap_or(0.0)),
                None => {
                    log::debug!("Variable '{name}' not in mapping, using fallback");
                    missing(name)
                }
            },

            Expr::Binary {
                op, left, right, ..
            } => {
                // Left first: callbacks may have side effects
                let left = self.eval_node(left, variables, missing, divide_by_zero, depth + 1)?;
                let right = self.eval_node(right, variables, missing, divide_by_zero, depth + 1)?;

                if *op == Operator::Divide && right == 0.0 {
                    log::debug!("Division by zero in {expr}, applying policy");
                    return Ok(divide_by_zero(left, right));
                }

                Ok(op.apply(left, right))
            }
        }
    }
}

impl Formula {
    /// See [`evaluate`]
    pub fn evaluate<V: VariableSource + ?Sized>(&self, variables: &V) -> FormulaResult<f64> {
        evaluate(self.expr(), variables)
    }

    /// See [`evaluate_or_else`]
    pub fn evaluate_or_else<V, M>(&self, variables: &V, missing: M) -> FormulaResult<f64>
    where
        V: VariableSource + ?Sized,
        M: FnMut(&str) -> Option<f64>,
    {
        evaluate_or_else(self.expr(), variables, missing)
    }

    /// See [`evaluate_with`]
    pub fn evaluate_with<V, M, D>(
        &self,
        variables: &V,
        missing: M,
        divide_by_zero: D,
    ) -> FormulaResult<f64>
    where
        V: VariableSource + ?Sized,
        M: FnMut(&str) -> Option<f64>,
        D: FnMut(f64, f64) -> f64,
    {
        evaluate_with(self.expr(), variables, missing, divide_by_zero)
    }
}
