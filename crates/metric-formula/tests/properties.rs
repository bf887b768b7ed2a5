//! Property-based tests (proptest)

use std::collections::HashMap;

use metric_formula::{evaluate, parse};
use proptest::prelude::*;

/// Operands 1..=9 joined by random operators, e.g. `3 * 7 - 2 / 5`
fn flat_formula() -> impl Strategy<Value = (Vec<u8>, Vec<char>)> {
    (1usize..12).prop_flat_map(|len| {
        (
            prop::collection::vec(1u8..=9, len + 1),
            prop::collection::vec(prop::sample::select(vec!['+', '-', '*', '/']), len),
        )
    })
}

fn render(operands: &[u8], ops: &[char]) -> String {
    let mut text = operands[0].to_string();
    for (op, operand) in ops.iter().zip(&operands[1..]) {
        text.push_str(&format!(" {op} {operand}"));
    }
    text
}

/// Standard precedence: each product chain left to right, then the sum left to right
fn reference(operands: &[u8], ops: &[char]) -> f64 {
    let mut sum = 0.0;
    let mut sign = '+';
    let mut product = f64::from(operands[0]);

    let finish = |sign: char, product: f64, sum: &mut f64| match sign {
        '+' => *sum += product,
        _ => *sum -= product,
    };

    let mut first = true;
    for (op, operand) in ops.iter().zip(&operands[1..]) {
        let value = f64::from(*operand);
        match op {
            '*' => product *= value,
            '/' => product /= value,
            _ => {
                if first {
                    sum = product;
                    first = false;
                } else {
                    finish(sign, product, &mut sum);
                }
                sign = *op;
                product = value;
            }
        }
    }
    if first {
        product
    } else {
        finish(sign, product, &mut sum);
        sum
    }
}

proptest! {
    /// Parser should not panic on arbitrary input
    #[test]
    fn parse_never_panics(s in ".*") {
        let _ = parse(&s);
    }

    /// Operator soup never panics either
    #[test]
    fn parse_never_panics_on_operators(s in "[0-9a-c()（）+*/. %-]{0,40}") {
        let _ = parse(&s);
    }

    /// Flat arithmetic follows standard precedence and left associativity
    #[test]
    fn matches_reference_precedence((operands, ops) in flat_formula()) {
        let text = render(&operands, &ops);
        let formula = parse(&text).unwrap();
        let vars: HashMap<String, f64> = HashMap::new();
        prop_assert_eq!(evaluate(&formula, &vars).unwrap(), reference(&operands, &ops), "formula: {}", text);
    }

    /// Wrapping a formula in parentheses does not change its value
    #[test]
    fn redundant_parentheses((operands, ops) in flat_formula()) {
        let text = render(&operands, &ops);
        let vars: HashMap<String, f64> = HashMap::new();
        let plain = evaluate(&parse(&text).unwrap(), &vars).unwrap();
        let wrapped = evaluate(&parse(&format!("(({text}))")).unwrap(), &vars).unwrap();
        prop_assert_eq!(plain, wrapped);
    }

    /// Parsing is deterministic
    #[test]
    fn parse_is_deterministic(s in "[a-c0-9+*/() -]{1,30}") {
        prop_assert_eq!(parse(&s), parse(&s));
    }

    /// Variables and literals are interchangeable
    #[test]
    fn variables_match_literals((operands, ops) in flat_formula()) {
        let names: Vec<String> = (0..operands.len()).map(|i| format!("x{i}")).collect();
        let with_names = render_names(&names, &ops);
        let vars: HashMap<String, f64> = names
            .iter()
            .cloned()
            .zip(operands.iter().map(|n| f64::from(*n)))
            .collect();

        let by_name = evaluate(&parse(&with_names).unwrap(), &vars).unwrap();
        let by_value = evaluate(&parse(&render(&operands, &ops)).unwrap(), &vars).unwrap();
        prop_assert_eq!(by_name, by_value);
    }
}

fn render_names(names: &[String], ops: &[char]) -> String {
    let mut text = names[0].clone();
    for (op, name) in ops.iter().zip(&names[1..]) {
        text.push_str(&format!("{op}{name}"));
    }
    text
}
