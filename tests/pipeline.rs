use postfix_calc::{
    calculate, convert, convert_tokens,
    convert::{UnclosedParenError, UnmatchedParenError},
    eval::{InvalidTokenError, StackUnderflowError},
    evaluate,
};

/// Substitutes single digits for the operand letters of `expr`.
fn digits(expr: &str, values: &[(char, char)]) -> String {
    expr.chars()
        .map(|c| {
            values
                .iter()
                .find(|(name, _)| *name == c)
                .map_or(c, |(_, digit)| *digit)
        })
        .collect()
}

fn run(expr: &str) -> i64 {
    let postfix = convert(expr).unwrap_or_else(|e| panic!("converting {expr:?} failed: {e:?}"));
    let tokens: Vec<String> = postfix.chars().map(String::from).collect();
    evaluate(&tokens).unwrap_or_else(|e| panic!("evaluating {postfix:?} failed: {e:?}"))
}

#[test]
fn converted_expressions_match_direct_arithmetic() {
    let cases: &[(&str, i64)] = &[
        ("1+2*3", 7),
        ("(1+2)*3", 9),
        ("9-4-3", 2),
        ("8/2/2", 2),
        ("2^3^2", 512),
        ("(2^3)^2", 64),
        ("7/2", 3),
        ("9-2*3+4", 7),
        ("2*(3+4)*5", 70),
        ("((9))", 9),
        ("1+2^3*4-5", 28),
        ("(8-2)/(1+2)^2", 0),
        ("6/(3-1)^2", 1),
        ("5", 5),
    ];
    for (expr, expected) in cases {
        assert_eq!(run(expr), *expected, "{expr}");
    }
}

#[test]
fn spec_conversions() {
    assert_eq!(convert("a+b*c").unwrap(), "abc*+");
    assert_eq!(convert("(a+b)*c").unwrap(), "ab+c*");

    let pow = digits("a^b^c", &[('a', '2'), ('b', '3'), ('c', '2')]);
    assert_eq!(run(&pow), 2_i64.pow(3_u32.pow(2)));

    let sub = digits("a-b-c", &[('a', '9'), ('b', '5'), ('c', '1')]);
    assert_eq!(run(&sub), (9 - 5) - 1);
}

#[test]
fn repeated_calls_are_identical() {
    let expr = "3+4*(2-1)^2";
    assert_eq!(convert(expr).unwrap(), convert(expr).unwrap());

    let tokens = ["-7", "2", "/"];
    assert_eq!(evaluate(&tokens).unwrap(), -4);
    assert_eq!(evaluate(&tokens).unwrap(), -4);
}

#[test]
fn multi_digit_pipeline() {
    assert_eq!(
        convert_tokens("12*(30+4)").unwrap(),
        vec!["12", "30", "4", "+", "*"]
    );
    assert_eq!(calculate("12*(30+4)").unwrap(), 408);
    assert_eq!(calculate("100 - 20 - 30").unwrap(), 50);
    assert_eq!(calculate("0-7/2").unwrap(), -3);
    assert_eq!(calculate("2^10").unwrap(), 1024);
}

#[test]
fn malformed_input_is_reported() {
    assert!(
        calculate("(1+2")
            .unwrap_err()
            .downcast_ref::<UnclosedParenError>()
            .is_some()
    );
    assert!(
        calculate("1+2)")
            .unwrap_err()
            .downcast_ref::<UnmatchedParenError>()
            .is_some()
    );
    assert!(
        calculate("1++2")
            .unwrap_err()
            .downcast_ref::<StackUnderflowError>()
            .is_some()
    );
    assert!(
        calculate("x+1")
            .unwrap_err()
            .downcast_ref::<InvalidTokenError>()
            .is_some()
    );
}
