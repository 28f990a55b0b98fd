#![no_main]

use accessexpr::{AccessEvaluator, AccessExpression, Authorizations};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let auths = Authorizations::of(["A", "B", "a&b", "x\"y"]).unwrap();
    let evaluator = AccessEvaluator::new(&auths);

    // Reading the text and walking the cached tree must agree.
    let fused = evaluator.can_access_bytes(data);
    if let Ok(expression) = AccessExpression::of_bytes(data) {
        expression.parse().unwrap();
        assert_eq!(evaluator.can_access_expression(&expression), fused);
    } else {
        assert!(fused.is_err());
    }
});
