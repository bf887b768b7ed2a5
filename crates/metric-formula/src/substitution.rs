//! Variable pre-substitution
//!
//! Metric names such as `GMV(excl. refunds)` or `cost-per-click` collide with
//! operator characters. Before parsing, every known name is replaced in the
//! formula with a placeholder (`v1`, `v2`, ...) that the scanner reads as a
//! plain variable, and the placeholder values are added to the caller's map.
//!
//! Matching is case-insensitive: the formula is uppercased first, so any text
//! that is not a known name reaches the parser uppercased. Replacement is by
//! substring without word boundaries; a short name inside an unrelated longer
//! word is replaced too, unless that longer word is itself a known name.

use std::collections::HashMap;
use std::hash::BuildHasher;

use ahash::AHashMap;

use crate::ast::Formula;
use crate::error::FormulaResult;
use crate::literal;
use crate::parser::Parser;

/// Parse a formula whose variable names may contain special characters
///
/// On success the caller's map gains one entry per placeholder, so the same
/// map can be passed straight to evaluation.
///
/// # Example
/// ```rust
/// use std::collections::HashMap;
/// use metric_formula::{evaluate, parse_with_variables};
///
/// let mut vars = HashMap::new();
/// vars.insert("cost-per-click".to_string(), 0.25);
/// vars.insert("clicks".to_string(), 400.0);
///
/// let formula = parse_with_variables("Cost-Per-Click * clicks", &mut vars).unwrap();
/// assert_eq!(evaluate(&formula, &vars).unwrap(), 100.0);
/// ```
pub fn parse_with_variables<V: Clone, S: BuildHasher>(
    formula: &str,
    variables: &mut HashMap<String, V, S>,
) -> FormulaResult<Formula> {
    Parser::new().parse_with_variables(formula, variables)
}

impl Parser {
    /// Parse a formula after replacing known variable names with placeholders
    pub fn parse_with_variables<V: Clone, S: BuildHasher>(
        &self,
        formula: &str,
        variables: &mut HashMap<String, V, S>,
    ) -> FormulaResult<Formula> {
        if variables.is_empty() {
            return self.parse(formula);
        }

        // Longest first, so a name is never split by a shorter name it contains
        let mut names: Vec<&String> = variables
            .keys()
            .filter(|name| !name.trim().is_empty() && !literal::is_number(name))
            .collect();
        names.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });

        let mut rewritten = formula.to_uppercase();
        let mut mapping = AHashMap::with_capacity(names.len());
        let mut placeholder_values = Vec::with_capacity(names.len());

        for (index, name) in names.into_iter().enumerate() {
            let placeholder = format!("v{}", index + 1);
            rewritten = rewritten.replace(&name.to_uppercase(), &placeholder);
            log::trace!("Substituted variable '{name}' with '{placeholder}'");

            placeholder_values.push((placeholder.clone(), variables[name].clone()));
            mapping.insert(name.clone(), placeholder);
        }

        let expr = self.parse_text(&rewritten)?;
        variables.extend(placeholder_values);

        Ok(Formula::new(expr, formula.to_string()).with_variable_mapping(mapping))
    }
}
