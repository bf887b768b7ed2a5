//! # metric-formula
//!
//! Arithmetic formula engine for user-authored metric formulas.
//!
//! This crate provides:
//! - Formula parsing (text → tree) with `+ - * /`, parentheses, numbers,
//!   percentages and named variables
//! - Pre-substitution of variable names that contain operator characters
//! - Evaluation (tree → `f64`) with caller-chosen policies for missing
//!   variables and division by zero
//!
//! A formula is parsed once and can be evaluated any number of times against
//! different variable values.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use metric_formula::{evaluate, parse};
//!
//! let formula = parse("(a+b)-1.0 - (-50%) - b + (a+b)/b").unwrap();
//!
//! let mut vars = HashMap::new();
//! vars.insert("a".to_string(), 1.0);
//! vars.insert("b".to_string(), 2.0);
//! assert_eq!(evaluate(&formula, &vars).unwrap(), 2.0);
//!
//! vars.insert("a".to_string(), 2.0);
//! vars.insert("b".to_string(), 10.5);
//! assert!((evaluate(&formula, &vars).unwrap() - 2.69047).abs() < 1e-5);
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod literal;
pub mod options;
pub mod parser;
pub mod policy;
mod precedence;
pub mod substitution;

pub use ast::{Expr, Formula, Operator, Source};
pub use error::{FormulaError, FormulaResult, Phase};
pub use evaluator::{evaluate, evaluate_or_else, evaluate_with, Evaluator, VariableSource};
pub use options::{FormulaOptions, DEFAULT_MAX_DEPTH};
pub use parser::{parse, Parser};
pub use substitution::parse_with_variables;
