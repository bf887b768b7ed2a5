//! Formula expression tree types

use std::fmt;
use std::ops::{Deref, Range};
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

use crate::error::{FormulaError, FormulaResult};

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Source character for this operator
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// `*` and `/` bind tighter than `+` and `-`
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Operator::Multiply | Operator::Divide)
    }

    /// Plain double arithmetic. Division by zero is the evaluator's business.
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            Operator::Divide => left / right,
        }
    }
}

impl TryFrom<char> for Operator {
    type Error = FormulaError;

    fn try_from(c: char) -> FormulaResult<Self> {
        match c {
            '+' => Ok(Operator::Add),
            '-' => Ok(Operator::Subtract),
            '*' => Ok(Operator::Multiply),
            '/' => Ok(Operator::Divide),
            other => Err(FormulaError::InvalidExpression(format!(
                "unknown operator '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The slice of formula text a node was parsed from
///
/// Every node of one parse shares the same buffer and only records its byte
/// range, so a tree holds the formula text once however deep it is.
#[derive(Clone)]
pub struct Source {
    text: Arc<str>,
    span: Range<usize>,
}

impl Source {
    pub(crate) fn new(text: Arc<str>, span: Range<usize>) -> Self {
        Self { text, span }
    }

    pub fn as_str(&self) -> &str {
        &self.text[self.span.clone()]
    }

    /// Byte range of this slice in the normalized formula text
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The whole normalized formula text this slice points into
    pub fn buffer(&self) -> &Arc<str> {
        &self.text
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Self::from(text.to_string())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        let span = 0..text.len();
        Self::new(text.into(), span)
    }
}

impl Deref for Source {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Source {}

impl PartialEq<str> for Source {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Source {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Source {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Source {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Source::from)
    }
}

/// Formula expression tree
///
/// Leaves are constants and variables; every composite node has exactly two
/// children. Source text is kept for display only and never affects evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// Numeric or percentage literal, already normalized (`50%` is `0.5`)
    Constant { value: f64, source: Source },
    /// Reference resolved at evaluation time
    Variable(String),
    /// Binary operation
    Binary {
        op: Operator,
        left: Box<Expr>,
        right: Box<Expr>,
        source: Source,
    },
}

impl Expr {
    pub fn constant<S: Into<Source>>(value: f64, source: S) -> Self {
        Expr::Constant {
            value,
            source: source.into(),
        }
    }

    pub fn variable<S: Into<String>>(name: S) -> Self {
        Expr::Variable(name.into())
    }

    pub fn binary<S: Into<Source>>(op: Operator, left: Expr, right: Expr, source: S) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            source: source.into(),
        }
    }

    /// Formula text this node was parsed from
    pub fn source(&self) -> &str {
        match self {
            Expr::Constant { source, .. } | Expr::Binary { source, .. } => source.as_str(),
            Expr::Variable(name) => name,
        }
    }

    /// Number of levels in the tree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        match self {
            Expr::Constant { .. } | Expr::Variable(_) => 1,
            Expr::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Distinct variable names in order of first appearance, left to right
    pub fn variables(&self) -> Vec<&str> {
        let mut seen = AHashSet::new();
        let mut names = Vec::new();
        self.collect_variables(&mut seen, &mut names);
        names
    }

    fn collect_variables<'a>(&'a self, seen: &mut AHashSet<&'a str>, names: &mut Vec<&'a str>) {
        match self {
            Expr::Constant { .. } => {}
            Expr::Variable(name) => {
                if seen.insert(name.as_str()) {
                    names.push(name.as_str());
                }
            }
            Expr::Binary { left, right, .. } => {
                left.collect_variables(seen, names);
                right.collect_variables(seen, names);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant { value, .. } => write!(f, "{value}"),
            Expr::Variable(name) => write!(f, "{name}"),
            Expr::Binary {
                op, left, right, ..
            } => write!(f, "({left} {op} {right})"),
        }
    }
}

/// A parsed formula: the tree root plus what the parser learned about its variables
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Formula {
    expr: Expr,
    text: String,
    variable_mapping: AHashMap<String, String>,
}

impl Formula {
    pub(crate) fn new(expr: Expr, text: String) -> Self {
        Self {
            expr,
            text,
            variable_mapping: AHashMap::new(),
        }
    }

    pub(crate) fn with_variable_mapping(mut self, mapping: AHashMap<String, String>) -> Self {
        self.variable_mapping = mapping;
        self
    }

    /// Root of the expression tree
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }

    /// The formula text as given to the parser
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Original variable name → generated placeholder
    ///
    /// Empty unless the formula came from [`crate::parse_with_variables`].
    pub fn variable_mapping(&self) -> &AHashMap<String, String> {
        &self.variable_mapping
    }

    /// Placeholder generated for an original variable name
    pub fn placeholder(&self, name: &str) -> Option<&str> {
        self.variable_mapping.get(name).map(String::as_str)
    }
}

impl Deref for Formula {
    type Target = Expr;

    fn deref(&self) -> &Expr {
        &self.expr
    }
}

impl AsRef<Expr> for Formula {
    fn as_ref(&self) -> &Expr {
        &self.expr
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_operator_from_char() {
        assert_eq!(Operator::try_from('+').unwrap(), Operator::Add);
        assert_eq!(Operator::try_from('/').unwrap(), Operator::Divide);
        assert!(matches!(
            Operator::try_from('^'),
            Err(FormulaError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_operator_precedence_level() {
        assert!(Operator::Multiply.is_multiplicative());
        assert!(Operator::Divide.is_multiplicative());
        assert!(!Operator::Add.is_multiplicative());
        assert!(!Operator::Subtract.is_multiplicative());
    }

    #[test]
    fn test_variables_in_order() {
        // (a + b) * a - c
        let expr = Expr::binary(
            Operator::Subtract,
            Expr::binary(
                Operator::Multiply,
                Expr::binary(
                    Operator::Add,
                    Expr::variable("a"),
                    Expr::variable("b"),
                    "a+b",
                ),
                Expr::variable("a"),
                "(a+b)*a",
            ),
            Expr::variable("c"),
            "(a+b)*a-c",
        );
        assert_eq!(expr.variables(), vec!["a", "b", "c"]);
        assert_eq!(expr.depth(), 4);
        assert_eq!(expr.source(), "(a+b)*a-c");
        assert_eq!(expr.to_string(), "(((a + b) * a) - c)");
    }

    #[test]
    fn test_constant_has_no_variables() {
        let expr = Expr::constant(0.5, "50%");
        assert!(expr.variables().is_empty());
        assert_eq!(expr.source(), "50%");
        assert_eq!(expr.to_string(), "0.5");
    }

    #[test]
    fn test_sources_share_one_buffer() {
        let text: Arc<str> = Arc::from("a+b");
        let left = Source::new(text.clone(), 0..1);
        let whole = Source::new(text.clone(), 0..3);

        assert_eq!(left, "a");
        assert_eq!(whole.as_str(), "a+b");
        assert!(Arc::ptr_eq(left.buffer(), whole.buffer()));

        // Equality looks at the slice, not the buffer
        assert_eq!(Source::new(Arc::from(" a "), 1..2), Source::from("a"));
    }
}
