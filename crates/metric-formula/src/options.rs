//! Parse and evaluation options

/// Default nesting limit shared by the parser and the evaluator
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Options for parsing and evaluating formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaOptions {
    /// Maximum recursion depth (default: 1000). The root call is depth 0.
    pub max_depth: usize,
}

impl FormulaOptions {
    /// Options with a custom depth limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for FormulaOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
