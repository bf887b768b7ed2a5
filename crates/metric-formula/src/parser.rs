//! Formula parser
//!
//! A scanner over the normalized formula: literals and variable names become
//! leaves, and each parenthesized group collects a flat operand/operator
//! sequence that [`crate::precedence`] resolves `*` `/` before `+` `-`.
//! Groups still being scanned are kept on an explicit stack, so nesting
//! grows the heap rather than the call stack.

use std::mem;
use std::ops::Range;
use std::sync::Arc;

use ahash::AHashMap;

use crate::ast::{Expr, Formula, Operator, Source};
use crate::error::{FormulaError, FormulaResult, Phase};
use crate::literal;
use crate::options::FormulaOptions;
use crate::precedence::{self, char_position, Segment};

/// Parse a formula string into a tree
///
/// # Example
/// ```rust
/// use metric_formula::parse;
///
/// let formula = parse("(2+3)*4").unwrap();
/// let formula = parse("revenue * (1 - 15%)").unwrap();
/// ```
pub fn parse(formula: &str) -> FormulaResult<Formula> {
    Parser::new().parse(formula)
}

/// Formula parser
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: FormulaOptions,
}

/// What a stretch of formula text turned out to be
enum Fragment {
    /// A literal or variable, with its trimmed byte range
    Leaf(Expr, Range<usize>),
    /// Operators or brackets: the trimmed range still has to be scanned
    Group(Range<usize>),
}

/// A group whose contents are being scanned
struct Group {
    /// Trimmed contents
    range: Range<usize>,
    /// Contents plus brackets; equal to `range` for the whole formula
    span: Range<usize>,
    depth: usize,
    segments: Vec<Segment>,
    /// Start of the text not yet assigned to a segment
    begin: usize,
}

impl Group {
    fn new(range: Range<usize>, span: Range<usize>, depth: usize) -> Self {
        Self {
            begin: range.start,
            range,
            span,
            depth,
            segments: Vec::new(),
        }
    }

    /// Parse the text from `begin` up to `end` as an operand, unless it is blank
    fn push_pending(&mut self, parser: &Parser, text: &Arc<str>, end: usize) -> FormulaResult<()> {
        let range = self.begin..end;
        if text[range.clone()].trim().is_empty() {
            return Ok(());
        }

        match parser.fragment(text, range, self.depth + 1)? {
            Fragment::Leaf(expr, span) => {
                self.segments.push(Segment::operand(expr, span));
                Ok(())
            }
            // Pending text holds neither brackets nor operators
            Fragment::Group(span) => Err(FormulaError::malformed(
                char_position(text, span.start),
                "missing operator",
            )),
        }
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FormulaOptions) -> Self {
        Self { options }
    }

    /// Parse a formula string into a tree
    pub fn parse(&self, formula: &str) -> FormulaResult<Formula> {
        let expr = self.parse_text(formula)?;
        Ok(Formula::new(expr, formula.to_string()))
    }

    /// Normalize full-width brackets and parse
    pub(crate) fn parse_text(&self, formula: &str) -> FormulaResult<Expr> {
        let text: Arc<str> = normalize_brackets(formula).into();
        self.parse_normalized(&text).map_err(|e| {
            log::debug!("Failed to parse formula '{formula}': {e}");
            e
        })
    }

    fn parse_normalized(&self, text: &Arc<str>) -> FormulaResult<Expr> {
        let range = match self.fragment(text, 0..text.len(), 0)? {
            Fragment::Leaf(expr, _) => return Ok(expr),
            Fragment::Group(range) => range,
        };

        let closing = match_brackets(text);
        let mut open: Vec<Group> = Vec::new();
        let mut current = Group::new(range.clone(), range, 0);
        let mut i = current.range.start;

        loop {
            let c = match text[i..current.range.end].chars().next() {
                Some(c) => c,
                None => {
                    let end = current.range.end;
                    current.push_pending(self, text, end)?;

                    let Group {
                        range,
                        span,
                        segments,
                        ..
                    } = current;
                    let expr = precedence::combine(text, range.start, segments)?;

                    current = match open.pop() {
                        Some(parent) => parent,
                        None => return Ok(expr),
                    };
                    current.segments.push(Segment::operand(expr, span.clone()));
                    i = span.end;
                    current.begin = i;
                    continue;
                }
            };

            match c {
                '(' => {
                    current.push_pending(self, text, i)?;

                    let close = match closing.get(&i) {
                        Some(&close) => close,
                        None => {
                            return Err(FormulaError::malformed(
                                char_position(text, i),
                                "unmatched '('",
                            ))
                        }
                    };
                    let span = i..close + 1;

                    match self.fragment(text, i + 1..close, current.depth + 1)? {
                        Fragment::Leaf(expr, _) => {
                            current.segments.push(Segment::operand(expr, span));
                            i = close + 1;
                            current.begin = i;
                        }
                        Fragment::Group(range) => {
                            i = range.start;
                            let inner = Group::new(range, span, current.depth + 1);
                            open.push(mem::replace(&mut current, inner));
                        }
                    }
                }
                // A group's range stops short of its own `)`
                ')' => {
                    return Err(FormulaError::malformed(
                        char_position(text, i),
                        "unmatched ')'",
                    ));
                }
                '*' | '/' | '+' | '-' => {
                    current.push_pending(self, text, i)?;
                    current
                        .segments
                        .push(Segment::operator(Operator::try_from(c)?, i..i + 1));

                    i += 1;
                    current.begin = i;
                }
                _ => i += c.len_utf8(),
            }
        }
    }

    /// Classify the text in `range` as a leaf or a group still to be scanned
    fn fragment(
        &self,
        text: &Arc<str>,
        range: Range<usize>,
        depth: usize,
    ) -> FormulaResult<Fragment> {
        if depth > self.options.max_depth {
            return Err(FormulaError::RecursionLimit {
                limit: self.options.max_depth,
                phase: Phase::Parse,
            });
        }

        let raw = &text[range.clone()];
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FormulaError::malformed(
                char_position(text, range.end),
                "empty expression",
            ));
        }

        let start = range.start + (raw.len() - raw.trim_start().len());
        let span = start..start + trimmed.len();

        // 12.31
        if let Some(value) = literal::parse_number(trimmed) {
            let source = Source::new(text.clone(), span.clone());
            return Ok(Fragment::Leaf(Expr::constant(value, source), span));
        }

        // -20.22%
        if let Some(value) = literal::parse_percent(trimmed) {
            let source = Source::new(text.clone(), span.clone());
            return Ok(Fragment::Leaf(Expr::constant(value, source), span));
        }

        if trimmed.contains(literal::is_special) {
            return Ok(Fragment::Group(span));
        }

        if let Some(reason) = literal::reject_bare_token(trimmed) {
            return Err(FormulaError::malformed(
                char_position(text, start),
                format!("{reason} in '{trimmed}'"),
            ));
        }
        Ok(Fragment::Leaf(Expr::variable(trimmed), span))
    }

}

/// Replace full-width brackets with their ASCII forms
pub(crate) fn normalize_brackets(formula: &str) -> String {
    formula.replace('（', "(").replace('）', ")")
}

/// Byte index of the matching `)` for every `(` that has one
fn match_brackets(text: &str) -> AHashMap<usize, usize> {
    let mut pairs = AHashMap::new();
    let mut open = Vec::new();
    for (i, c) in text.char_indices() {
        match c {
            '(' => open.push(i),
            ')' => {
                if let Some(start) = open.pop() {
                    pairs.insert(start, i);
                }
            }
            _ => {}
        }
    }
    pairs
}
