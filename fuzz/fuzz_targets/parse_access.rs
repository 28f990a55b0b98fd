#![no_main]

use accessexpr::{AccessParser, Error};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let parser = AccessParser::default();
    let validated = parser.validate_bytes(data);

    if let Err(Error::InvalidExpression { offset, .. }) = &validated {
        assert!(*offset <= data.len());
    }

    // Anything that validates is UTF-8, parses, and normalizes to a fixed point.
    if validated.is_ok() {
        let text = std::str::from_utf8(data).unwrap();
        let normalized = parser.parse(text).unwrap().normalize();
        let again = parser.parse(&normalized).unwrap().normalize();
        assert_eq!(normalized, again);
    }
});
