//! Precedence resolution over a flat operand/operator sequence
//!
//! The scanner produces `operand (operator operand)*`. Multiplicative operators
//! are folded in a first left-to-right sweep, which leaves a sequence of terms
//! joined only by `+` and `-`; a second sweep folds those left to right.

use std::ops::Range;
use std::sync::Arc;

use crate::ast::{Expr, Operator, Source};
use crate::error::{FormulaError, FormulaResult};

/// One item of the flat sequence built by the scanner
#[derive(Debug)]
pub(crate) enum SegmentKind {
    Operand(Expr),
    Operator(Operator),
}

/// A segment plus the byte span it covers in the normalized formula
#[derive(Debug)]
pub(crate) struct Segment {
    pub kind: SegmentKind,
    pub span: Range<usize>,
}

impl Segment {
    pub fn operand(expr: Expr, span: Range<usize>) -> Self {
        Self {
            kind: SegmentKind::Operand(expr),
            span,
        }
    }

    pub fn operator(op: Operator, span: Range<usize>) -> Self {
        Self {
            kind: SegmentKind::Operator(op),
            span,
        }
    }
}

/// An operand with the byte span of the text it was built from
struct Spanned {
    expr: Expr,
    span: Range<usize>,
}

/// Character position of a byte index within `text`
pub(crate) fn char_position(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// Combine a scanned sequence into a single tree
///
/// `text` is the whole normalized formula and `start` the byte index of the
/// fragment the segments were scanned from. Spans are byte ranges into `text`.
pub(crate) fn combine(
    text: &Arc<str>,
    start: usize,
    segments: Vec<Segment>,
) -> FormulaResult<Expr> {
    let (first, rest) = validate(text, start, segments)?;

    if rest.is_empty() {
        return Ok(first.expr);
    }

    // Pass 1: fold `*` and `/` into the running operand
    let mut terms = Vec::with_capacity(rest.len() + 1);
    let mut additive_ops = Vec::with_capacity(rest.len());
    let mut running = first;

    for (op, operand) in rest {
        if op.is_multiplicative() {
            running = join(text, op, running, operand);
        } else {
            terms.push(running);
            additive_ops.push(op);
            running = operand;
        }
    }
    terms.push(running);

    // Pass 2: fold `+` and `-` left to right
    let mut terms = terms.into_iter();
    let mut acc = match terms.next() {
        Some(term) => term,
        None => {
            return Err(FormulaError::malformed(
                char_position(text, start),
                "empty expression",
            ))
        }
    };
    for (op, term) in additive_ops.into_iter().zip(terms) {
        acc = join(text, op, acc, term);
    }

    Ok(acc.expr)
}

fn join(text: &Arc<str>, op: Operator, left: Spanned, right: Spanned) -> Spanned {
    let span = left.span.start..right.span.end;
    Spanned {
        expr: Expr::binary(
            op,
            left.expr,
            right.expr,
            Source::new(text.clone(), span.clone()),
        ),
        span,
    }
}

/// Check strict alternation and split into the leading operand and the
/// `(operator, operand)` pairs that follow it
fn validate(
    text: &str,
    start: usize,
    segments: Vec<Segment>,
) -> FormulaResult<(Spanned, Vec<(Operator, Spanned)>)> {
    let position = |span: &Range<usize>| char_position(text, span.start);

    let mut iter = segments.into_iter();
    let first = match iter.next() {
        Some(Segment {
            kind: SegmentKind::Operand(expr),
            span,
        }) => Spanned { expr, span },
        Some(Segment {
            kind: SegmentKind::Operator(op),
            span,
        }) => {
            return Err(FormulaError::malformed(
                position(&span),
                format!("operator '{op}' is missing its left operand"),
            ))
        }
        None => {
            return Err(FormulaError::malformed(
                char_position(text, start),
                "empty expression",
            ))
        }
    };

    let mut rest = Vec::new();
    while let Some(segment) = iter.next() {
        let (op, op_span) = match segment.kind {
            SegmentKind::Operator(op) => (op, segment.span),
            SegmentKind::Operand(_) => {
                return Err(FormulaError::malformed(
                    position(&segment.span),
                    "missing operator",
                ))
            }
        };

        match iter.next() {
            Some(Segment {
                kind: SegmentKind::Operand(expr),
                span,
            }) => rest.push((op, Spanned { expr, span })),
            Some(Segment {
                kind: SegmentKind::Operator(next),
                span,
            }) => {
                return Err(FormulaError::malformed(
                    position(&span),
                    format!("unexpected operator '{next}' after '{op}'"),
                ))
            }
            None => {
                return Err(FormulaError::malformed(
                    position(&op_span),
                    format!("operator '{op}' is missing its right operand"),
                ))
            }
        }
    }

    Ok((first, rest))
}
